use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use super::domain::{Invoice, InvoiceId};
use crate::workflows::persistence::RepositoryError;
use crate::workflows::requests::domain::MemberId;

/// Read access to invoices, scoped by the owning landlord.
pub trait InvoiceRepository: Send + Sync {
    /// Every invoice billed on units of properties owned by `owner_id`.
    fn for_owner(&self, owner_id: &MemberId) -> Result<Vec<Invoice>, RepositoryError>;
    fn fetch(&self, id: InvoiceId) -> Result<Option<Invoice>, RepositoryError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryInvoiceStore {
    invoices: Arc<Mutex<BTreeMap<InvoiceId, Invoice>>>,
}

impl InMemoryInvoiceStore {
    pub fn insert(&self, invoice: Invoice) -> Result<(), RepositoryError> {
        let mut guard = self
            .invoices
            .lock()
            .map_err(|_| RepositoryError::Unavailable("invoice store lock poisoned".to_string()))?;
        if guard.contains_key(&invoice.id) {
            return Err(RepositoryError::conflict("invoice", invoice.id.0));
        }
        guard.insert(invoice.id, invoice);
        Ok(())
    }
}

impl InvoiceRepository for InMemoryInvoiceStore {
    fn for_owner(&self, owner_id: &MemberId) -> Result<Vec<Invoice>, RepositoryError> {
        let guard = self
            .invoices
            .lock()
            .map_err(|_| RepositoryError::Unavailable("invoice store lock poisoned".to_string()))?;
        Ok(guard
            .values()
            .filter(|invoice| &invoice.owner_id == owner_id)
            .cloned()
            .collect())
    }

    fn fetch(&self, id: InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        let guard = self
            .invoices
            .lock()
            .map_err(|_| RepositoryError::Unavailable("invoice store lock poisoned".to_string()))?;
        Ok(guard.get(&id).cloned())
    }
}
