use chrono::{DateTime, Utc};

use super::domain::{
    Contract, ContractId, ContractStatus, MemberContact, MemberId, MemberReceiveRequest, Request,
    RequestId, RequestStatus,
};
use crate::workflows::persistence::RepositoryError;

/// Operations available inside a single atomic unit of work.
///
/// Every mutation made through the handle is committed together when the enclosing
/// [`RequestStore::transaction`] closure returns `Ok`, and discarded when it returns `Err`.
pub trait RequestUnitOfWork {
    fn request(&self, id: &RequestId) -> Result<Request, RepositoryError>;
    fn insert_request(&mut self, request: Request) -> Result<(), RepositoryError>;
    fn update_request_status(
        &mut self,
        id: &RequestId,
        status: RequestStatus,
    ) -> Result<Request, RepositoryError>;

    /// All response rows for a request, ordered by member id.
    fn responses(&self, request_id: &RequestId)
        -> Result<Vec<MemberReceiveRequest>, RepositoryError>;
    fn insert_response(&mut self, row: MemberReceiveRequest) -> Result<(), RepositoryError>;
    /// Update by the `(request_id, member_id)` composite key.
    fn update_response(
        &mut self,
        request_id: &RequestId,
        member_id: &MemberId,
        status: RequestStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<MemberReceiveRequest, RepositoryError>;

    fn contract(&self, id: &ContractId) -> Result<Contract, RepositoryError>;
    fn insert_contract(&mut self, contract: Contract) -> Result<(), RepositoryError>;
    fn update_contract(
        &mut self,
        id: &ContractId,
        status: ContractStatus,
        termination_date: Option<DateTime<Utc>>,
    ) -> Result<Contract, RepositoryError>;

    fn create_contact(&mut self, contact: MemberContact) -> Result<MemberContact, RepositoryError>;
    fn contacts_for(&self, member_id: &MemberId) -> Result<Vec<MemberContact>, RepositoryError>;
}

/// Storage abstraction so the workflow can be exercised in isolation.
///
/// Implementations must run `work` serializably: no other transaction may observe or interleave
/// with its reads and writes.
pub trait RequestStore: Send + Sync {
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn RequestUnitOfWork) -> Result<T, E>,
        E: From<RepositoryError>;

    /// Read-only access. Defaults to a transaction; stores with a cheaper snapshot override it.
    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn RequestUnitOfWork) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.transaction(|uow| work(&*uow))
    }
}
