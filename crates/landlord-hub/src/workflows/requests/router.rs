use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use super::domain::{ContractId, MemberId, RequestDraft, RequestId, UpdateRequest};
use super::notifications::Notifier;
use super::repository::RequestStore;
use super::service::RequestWorkflowService;
use crate::error::AppError;
use crate::workflows::identity::current_member;

/// Router builder exposing request, contact and contract endpoints. Every route requires the
/// caller header; reads are not scoped further than that.
pub fn request_router<S, N>(service: Arc<RequestWorkflowService<S, N>>) -> Router
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/requests",
            axum::routing::post(send_handler::<S, N>).patch(respond_handler::<S, N>),
        )
        .route("/api/v1/requests/:request_id", get(request_handler::<S, N>))
        .route(
            "/api/v1/members/:member_id/contacts",
            get(contacts_handler::<S, N>),
        )
        .route(
            "/api/v1/contracts/:contract_id",
            get(contract_handler::<S, N>),
        )
        .with_state(service)
}

pub(crate) async fn respond_handler<S, N>(
    State(service): State<Arc<RequestWorkflowService<S, N>>>,
    headers: HeaderMap,
    Json(update): Json<UpdateRequest>,
) -> Response
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
{
    let member_id = match current_member(&headers) {
        Ok(member_id) => member_id,
        Err(response) => return response,
    };

    match service.respond(&member_id, update).await {
        Ok(id) => (StatusCode::OK, Json(json!({ "id": id }))).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn send_handler<S, N>(
    State(service): State<Arc<RequestWorkflowService<S, N>>>,
    headers: HeaderMap,
    Json(draft): Json<RequestDraft>,
) -> Response
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
{
    let sender_id = match current_member(&headers) {
        Ok(member_id) => member_id,
        Err(response) => return response,
    };

    match service.send(&sender_id, draft).await {
        Ok(view) => (StatusCode::CREATED, Json(view)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn request_handler<S, N>(
    State(service): State<Arc<RequestWorkflowService<S, N>>>,
    headers: HeaderMap,
    Path(request_id): Path<String>,
) -> Response
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
{
    if let Err(response) = current_member(&headers) {
        return response;
    }

    match service.get(&RequestId(request_id)) {
        Ok(view) => (StatusCode::OK, Json(view)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn contacts_handler<S, N>(
    State(service): State<Arc<RequestWorkflowService<S, N>>>,
    headers: HeaderMap,
    Path(member_id): Path<String>,
) -> Response
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
{
    if let Err(response) = current_member(&headers) {
        return response;
    }

    match service.contacts_for(&MemberId(member_id)) {
        Ok(contacts) => (StatusCode::OK, Json(contacts)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}

pub(crate) async fn contract_handler<S, N>(
    State(service): State<Arc<RequestWorkflowService<S, N>>>,
    headers: HeaderMap,
    Path(contract_id): Path<String>,
) -> Response
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
{
    if let Err(response) = current_member(&headers) {
        return response;
    }

    match service.contract(&ContractId(contract_id)) {
        Ok(contract) => (StatusCode::OK, Json(contract)).into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
