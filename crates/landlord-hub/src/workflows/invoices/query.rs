use std::cmp::Reverse;
use std::sync::Arc;

use tracing::debug;

use super::domain::{Invoice, InvoiceId, InvoicePage, InvoiceQuery};
use super::repository::InvoiceRepository;
use crate::workflows::persistence::RepositoryError;
use crate::workflows::requests::domain::MemberId;

/// Read-side service for landlord invoice listings.
pub struct InvoiceQueryService<R> {
    repository: Arc<R>,
}

impl<R> InvoiceQueryService<R>
where
    R: InvoiceRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Newest invoices first; `total` counts every match before pagination.
    pub fn list(
        &self,
        staff_id: &MemberId,
        query: &InvoiceQuery,
    ) -> Result<InvoicePage, InvoiceQueryError> {
        let mut matches: Vec<Invoice> = self
            .repository
            .for_owner(staff_id)?
            .into_iter()
            .filter(|invoice| query.matches(invoice))
            .collect();
        matches.sort_by_key(|invoice| (Reverse(invoice.created_at), invoice.id));

        let total = matches.len();
        let data = matches
            .iter()
            .skip(query.offset())
            .take(query.page_size())
            .map(Invoice::summary)
            .collect::<Vec<_>>();

        debug!(staff_id = %staff_id, total, returned = data.len(), "invoice page built");
        Ok(InvoicePage { total, data })
    }

    pub fn get(&self, id: InvoiceId) -> Result<Invoice, InvoiceQueryError> {
        let invoice = self
            .repository
            .fetch(id)?
            .ok_or_else(|| RepositoryError::not_found("invoice", id.0))?;
        Ok(invoice)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InvoiceQueryError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
