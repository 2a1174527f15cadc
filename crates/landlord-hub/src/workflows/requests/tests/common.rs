use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::Value;

use crate::config::NotificationConfig;
use crate::workflows::persistence::RepositoryError;
use crate::workflows::requests::domain::{
    Contract, ContractId, ContractStatus, MemberContact, MemberId, MemberReceiveRequest, Request,
    RequestCategory, RequestId, RequestStatus, ResponseStatus, UpdateRequest,
};
use crate::workflows::requests::notifications::{Notification, NotificationError, Notifier};
use crate::workflows::requests::repository::{RequestStore, RequestUnitOfWork};
use crate::workflows::requests::service::RequestWorkflowService;
use crate::workflows::requests::store::InMemoryRequestStore;

pub(super) fn landlord() -> MemberId {
    MemberId::from("landlord-1")
}

pub(super) fn tenant_a() -> MemberId {
    MemberId::from("tenant-a")
}

pub(super) fn tenant_b() -> MemberId {
    MemberId::from("tenant-b")
}

pub(super) fn request_id() -> RequestId {
    RequestId::from("req-1")
}

pub(super) fn contract_id() -> ContractId {
    ContractId::from("contract-1")
}

pub(super) fn notification_config() -> NotificationConfig {
    NotificationConfig {
        timeout: Duration::from_millis(100),
    }
}

fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn active_contract() -> Contract {
    Contract {
        id: contract_id(),
        landlord_id: landlord(),
        tenant_id: tenant_a(),
        unit_id: "unit-101".to_string(),
        status: ContractStatus::Active,
        start_date: NaiveDate::from_ymd_opt(2024, 6, 1).expect("valid date"),
        termination_date: None,
    }
}

pub(super) fn accept(id: RequestId) -> UpdateRequest {
    UpdateRequest {
        id,
        status: ResponseStatus::Accepted,
    }
}

pub(super) fn reject(id: RequestId) -> UpdateRequest {
    UpdateRequest {
        id,
        status: ResponseStatus::Rejected,
    }
}

/// Seed a pending request from the landlord with one pending row per recipient.
pub(super) fn seed_request<S: RequestStore>(
    store: &S,
    category: RequestCategory,
    contract_id: Option<ContractId>,
    recipients: &[MemberId],
) -> RequestId {
    let id = request_id();
    store
        .transaction(|uow| {
            uow.insert_request(Request {
                id: id.clone(),
                sender_id: landlord(),
                category,
                status: RequestStatus::Pending,
                title: "Shared request".to_string(),
                contract_id,
                created_at: created_at(),
            })?;
            for member_id in recipients {
                uow.insert_response(MemberReceiveRequest {
                    request_id: id.clone(),
                    member_id: member_id.clone(),
                    status: RequestStatus::Pending,
                    responded_at: None,
                })?;
            }
            Ok::<_, RepositoryError>(())
        })
        .expect("seed request");
    id
}

pub(super) fn seeded_store(category: RequestCategory) -> InMemoryRequestStore {
    let store = InMemoryRequestStore::new();
    store
        .seed_contract(active_contract())
        .expect("seed contract");
    let contract = category.requires_contract().then(contract_id);
    seed_request(&store, category, contract, &[tenant_a(), tenant_b()]);
    store
}

pub(super) fn build_service(
    category: RequestCategory,
) -> (
    RequestWorkflowService<InMemoryRequestStore, RecordingNotifier>,
    Arc<InMemoryRequestStore>,
    Arc<RecordingNotifier>,
) {
    let store = Arc::new(seeded_store(category));
    let notifier = Arc::new(RecordingNotifier::default());
    let service =
        RequestWorkflowService::new(store.clone(), notifier.clone(), &notification_config());
    (service, store, notifier)
}

pub(super) fn request_status<S: RequestStore>(store: &S, id: &RequestId) -> RequestStatus {
    store
        .transaction(|uow| uow.request(id))
        .expect("request present")
        .status
}

pub(super) fn response_status<S: RequestStore>(
    store: &S,
    id: &RequestId,
    member_id: &MemberId,
) -> RequestStatus {
    store
        .transaction(|uow| uow.responses(id))
        .expect("responses readable")
        .into_iter()
        .find(|row| &row.member_id == member_id)
        .expect("recipient row present")
        .status
}

pub(super) fn contacts<S: RequestStore>(store: &S, member_id: &MemberId) -> Vec<MemberContact> {
    store
        .transaction(|uow| uow.contacts_for(member_id))
        .expect("contacts readable")
}

pub(super) fn contract<S: RequestStore>(store: &S) -> Contract {
    store
        .transaction(|uow| uow.contract(&contract_id()))
        .expect("contract present")
}

/// Records every notification; fails for the configured recipients.
#[derive(Default)]
pub(super) struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
    failing: BTreeSet<MemberId>,
}

impl RecordingNotifier {
    pub(super) fn failing_for(recipients: &[MemberId]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: recipients.iter().cloned().collect(),
        }
    }

    pub(super) fn sent(&self) -> Vec<Notification> {
        let mut sent = self.sent.lock().expect("notifier mutex poisoned").clone();
        sent.sort_by(|left, right| left.recipient_id.cmp(&right.recipient_id));
        sent
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_notification(&self, notification: Notification) -> Result<(), NotificationError> {
        if self.failing.contains(&notification.recipient_id) {
            return Err(NotificationError::Transport(format!(
                "push endpoint gone for {}",
                notification.recipient_id
            )));
        }
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

/// Never answers within the configured timeout.
pub(super) struct StalledNotifier;

#[async_trait]
impl Notifier for StalledNotifier {
    async fn send_notification(&self, _notification: Notification) -> Result<(), NotificationError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(())
    }
}

/// Panics inside the notification task.
pub(super) struct PanickingNotifier;

#[async_trait]
impl Notifier for PanickingNotifier {
    async fn send_notification(&self, _notification: Notification) -> Result<(), NotificationError> {
        panic!("push client bug");
    }
}

pub(super) struct UnavailableStore;

impl RequestStore for UnavailableStore {
    fn transaction<T, E, F>(&self, _work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn RequestUnitOfWork) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }
}

/// Serves reads from an in-memory store and refuses every transaction.
#[derive(Default)]
pub(super) struct ReadOnlyStore {
    pub(super) inner: InMemoryRequestStore,
}

impl RequestStore for ReadOnlyStore {
    fn transaction<T, E, F>(&self, _work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn RequestUnitOfWork) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("replica is read-only".to_string()).into())
    }

    fn read<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&dyn RequestUnitOfWork) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.inner.read(work)
    }
}

/// Delegates to an in-memory store but fails every contract write.
#[derive(Default)]
pub(super) struct ContractWriteFailureStore {
    pub(super) inner: InMemoryRequestStore,
}

impl RequestStore for ContractWriteFailureStore {
    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut dyn RequestUnitOfWork) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        self.inner
            .transaction(|uow| work(&mut FailingContractWrites { inner: uow }))
    }
}

struct FailingContractWrites<'a> {
    inner: &'a mut dyn RequestUnitOfWork,
}

impl RequestUnitOfWork for FailingContractWrites<'_> {
    fn request(&self, id: &RequestId) -> Result<Request, RepositoryError> {
        self.inner.request(id)
    }

    fn insert_request(&mut self, request: Request) -> Result<(), RepositoryError> {
        self.inner.insert_request(request)
    }

    fn update_request_status(
        &mut self,
        id: &RequestId,
        status: RequestStatus,
    ) -> Result<Request, RepositoryError> {
        self.inner.update_request_status(id, status)
    }

    fn responses(
        &self,
        request_id: &RequestId,
    ) -> Result<Vec<MemberReceiveRequest>, RepositoryError> {
        self.inner.responses(request_id)
    }

    fn insert_response(&mut self, row: MemberReceiveRequest) -> Result<(), RepositoryError> {
        self.inner.insert_response(row)
    }

    fn update_response(
        &mut self,
        request_id: &RequestId,
        member_id: &MemberId,
        status: RequestStatus,
        responded_at: DateTime<Utc>,
    ) -> Result<MemberReceiveRequest, RepositoryError> {
        self.inner
            .update_response(request_id, member_id, status, responded_at)
    }

    fn contract(&self, id: &ContractId) -> Result<Contract, RepositoryError> {
        self.inner.contract(id)
    }

    fn insert_contract(&mut self, contract: Contract) -> Result<(), RepositoryError> {
        self.inner.insert_contract(contract)
    }

    fn update_contract(
        &mut self,
        _id: &ContractId,
        _status: ContractStatus,
        _termination_date: Option<DateTime<Utc>>,
    ) -> Result<Contract, RepositoryError> {
        Err(RepositoryError::Unavailable("contract table locked".to_string()))
    }

    fn create_contact(&mut self, contact: MemberContact) -> Result<MemberContact, RepositoryError> {
        self.inner.create_contact(contact)
    }

    fn contacts_for(&self, member_id: &MemberId) -> Result<Vec<MemberContact>, RepositoryError> {
        self.inner.contacts_for(member_id)
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
