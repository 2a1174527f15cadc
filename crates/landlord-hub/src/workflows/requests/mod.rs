//! Shared requests (maintenance, rental invitations, contract terminations) and the
//! workflow that resolves them from individual recipient responses.
//!
//! A response is recorded, the overall status is recomputed from every recipient's answer,
//! and an acceptance cascades into contacts and contract updates inside the same unit of work.
//! Recipients are notified afterwards on a best-effort basis.

pub mod aggregation;
pub mod domain;
pub mod effects;
pub mod notifications;
pub mod repository;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use aggregation::aggregate_status;
pub use domain::{
    ContactType, Contract, ContractId, ContractStatus, MemberContact, MemberId,
    MemberReceiveRequest, Request, RequestCategory, RequestDraft, RequestId, RequestStatus,
    RequestView, ResponseStatus, UpdateRequest,
};
pub use effects::{AcceptanceEffect, AppliedEffects};
pub use notifications::{
    DispatchReport, Notification, NotificationDispatcher, NotificationError, Notifier,
    RequestNotice,
};
pub use repository::{RequestStore, RequestUnitOfWork};
pub use router::request_router;
pub use service::{RequestServiceError, RequestWorkflowService, Resolution};
pub use store::InMemoryRequestStore;
