use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use super::domain::{
    Contract, ContractId, ContractStatus, MemberContact, MemberId, MemberReceiveRequest, Request,
    RequestId, RequestStatus,
};
use super::repository::{RequestStore, RequestUnitOfWork};
use crate::workflows::persistence::RepositoryError;

#[derive(Debug, Default, Clone)]
struct StoreState {
    requests: HashMap<RequestId, Request>,
    responses: BTreeMap<(RequestId, MemberId), MemberReceiveRequest>,
    contracts: HashMap<ContractId, Contract>,
    contacts: Vec<MemberContact>,
}

/// Process-local store. Transactions hold the lock for their whole duration and work on a
/// staged copy, so a failed closure leaves no trace. Reads borrow the live state directly.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRequestStore {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Contracts are created by the leasing flow; this registers one directly.
    pub fn seed_contract(&self, contract: Contract) -> Result<(), RepositoryError> {
        self.transaction(|uow| uow.insert_contract(contract))
    }
}

impl RequestStore for InMemoryRequestStore {
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn RequestUnitOfWork) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("request store lock poisoned".to_string()))?;

        let mut staged = guard.clone();
        let output = work(&mut staged)?;
        *guard = staged;
        Ok(output)
    }

    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn RequestUnitOfWork) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let guard = self
            .state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("request store lock poisoned".to_string()))?;
        work(&*guard)
    }
}

fn response_key(request_id: &RequestId, member_id: &MemberId) -> String {
    format!("{request_id}/{member_id}")
}

impl RequestUnitOfWork for StoreState {
    fn request(&self, id: &RequestId) -> Result<Request, RepositoryError> {
        self.requests
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("request", id))
    }

    fn insert_request(&mut self, request: Request) -> Result<(), RepositoryError> {
        if self.requests.contains_key(&request.id) {
            return Err(RepositoryError::conflict("request", &request.id));
        }
        self.requests.insert(request.id.clone(), request);
        Ok(())
    }

    fn update_request_status(
        &mut self,
        id: &RequestId,
        status: RequestStatus,
    ) -> Result<Request, RepositoryError> {
        let request = self
            .requests
            .get_mut(id)
            .ok_or_else(|| RepositoryError::not_found("request", id))?;
        request.status = status;
        Ok(request.clone())
    }

    fn responses(
        &self,
        request_id: &RequestId,
    ) -> Result<Vec<MemberReceiveRequest>, RepositoryError> {
        Ok(self
            .responses
            .values()
            .filter(|row| &row.request_id == request_id)
            .cloned()
            .collect())
    }

    fn insert_response(&mut self, row: MemberReceiveRequest) -> Result<(), RepositoryError> {
        let key = (row.request_id.clone(), row.member_id.clone());
        if self.responses.contains_key(&key) {
            return Err(RepositoryError::conflict(
                "request recipient",
                response_key(&row.request_id, &row.member_id),
            ));
        }
        self.responses.insert(key, row);
        Ok(())
    }

    fn update_response(
        &mut self,
        request_id: &RequestId,
        member_id: &MemberId,
        status: RequestStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<MemberReceiveRequest, RepositoryError> {
        let row = self
            .responses
            .get_mut(&(request_id.clone(), member_id.clone()))
            .ok_or_else(|| {
                RepositoryError::not_found("request recipient", response_key(request_id, member_id))
            })?;
        row.status = status;
        row.responded_at = Some(responded_at);
        Ok(row.clone())
    }

    fn contract(&self, id: &ContractId) -> Result<Contract, RepositoryError> {
        self.contracts
            .get(id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("contract", id))
    }

    fn insert_contract(&mut self, contract: Contract) -> Result<(), RepositoryError> {
        if self.contracts.contains_key(&contract.id) {
            return Err(RepositoryError::conflict("contract", &contract.id));
        }
        self.contracts.insert(contract.id.clone(), contract);
        Ok(())
    }

    fn update_contract(
        &mut self,
        id: &ContractId,
        status: ContractStatus,
        termination_date: Option<DateTime<Utc>>,
    ) -> Result<Contract, RepositoryError> {
        let contract = self
            .contracts
            .get_mut(id)
            .ok_or_else(|| RepositoryError::not_found("contract", id))?;
        contract.status = status;
        contract.termination_date = termination_date;
        Ok(contract.clone())
    }

    fn create_contact(&mut self, contact: MemberContact) -> Result<MemberContact, RepositoryError> {
        self.contacts.push(contact.clone());
        Ok(contact)
    }

    fn contacts_for(&self, member_id: &MemberId) -> Result<Vec<MemberContact>, RepositoryError> {
        Ok(self
            .contacts
            .iter()
            .filter(|contact| {
                &contact.contact_id == member_id || &contact.contact_with_id == member_id
            })
            .cloned()
            .collect())
    }
}
