use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::domain::{InvoiceId, InvoiceQuery};
use super::query::InvoiceQueryService;
use super::repository::InvoiceRepository;
use crate::error::AppError;
use crate::workflows::identity::current_member;

pub fn invoice_router<R>(service: Arc<InvoiceQueryService<R>>) -> Router
where
    R: InvoiceRepository + 'static,
{
    Router::new()
        .route("/api/v1/invoices", get(list_handler::<R>))
        .route("/api/v1/invoices/:invoice_id", get(invoice_handler::<R>))
        .with_state(service)
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<InvoiceQueryService<R>>>,
    headers: HeaderMap,
    Query(query): Query<InvoiceQuery>,
) -> Response
where
    R: InvoiceRepository + 'static,
{
    let staff_id = match current_member(&headers) {
        Ok(member_id) => member_id,
        Err(response) => return response,
    };

    match service.list(&staff_id, &query) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn invoice_handler<R>(
    State(service): State<Arc<InvoiceQueryService<R>>>,
    headers: HeaderMap,
    Path(invoice_id): Path<u64>,
) -> Response
where
    R: InvoiceRepository + 'static,
{
    if let Err(response) = current_member(&headers) {
        return response;
    }

    match service.get(InvoiceId(invoice_id)) {
        Ok(invoice) => (StatusCode::OK, Json(invoice)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
