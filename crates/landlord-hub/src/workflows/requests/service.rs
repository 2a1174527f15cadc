use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info};

use super::aggregation::aggregate_status;
use super::domain::{
    Contract, ContractId, ContractStatus, MemberContact, MemberId, MemberReceiveRequest, Request,
    RequestDraft, RequestId, RequestStatus, RequestView, UpdateRequest,
};
use super::effects::{apply_acceptance, AppliedEffects};
use super::notifications::{NotificationDispatcher, Notifier, RequestNotice};
use super::repository::RequestStore;
use crate::config::NotificationConfig;
use crate::workflows::persistence::RepositoryError;

/// Result of the transactional part of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Resolution {
    /// Responses are still open; the request stays pending.
    Unresolved,
    /// The request was already resolved; the response was recorded without changing the outcome.
    Unchanged,
    Resolved {
        status: RequestStatus,
        recipients: Vec<MemberId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        effects: Option<AppliedEffects>,
    },
}

/// Service resolving shared requests from individual recipient responses.
pub struct RequestWorkflowService<S, N> {
    store: Arc<S>,
    dispatcher: NotificationDispatcher<N>,
}

impl<S, N> RequestWorkflowService<S, N>
where
    S: RequestStore + 'static,
    N: Notifier + 'static,
{
    pub fn new(store: Arc<S>, notifier: Arc<N>, config: &NotificationConfig) -> Self {
        Self {
            store,
            dispatcher: NotificationDispatcher::new(notifier, config),
        }
    }

    /// Record `member_id`'s response and resolve the request when the outcome is settled.
    ///
    /// Notifications go out only after the resolution commits and never affect the result.
    pub async fn respond(
        &self,
        member_id: &MemberId,
        update: UpdateRequest,
    ) -> Result<RequestId, RequestServiceError> {
        let resolution = self.resolve(member_id, &update)?;

        if let Resolution::Resolved {
            status, recipients, ..
        } = &resolution
        {
            self.dispatcher
                .fan_out(RequestNotice::StatusUpdated(*status), &update.id, recipients)
                .await;
        }

        Ok(update.id)
    }

    /// Transactional part of [`respond`](Self::respond): response write, aggregate read and
    /// side effects commit together or not at all.
    pub fn resolve(
        &self,
        member_id: &MemberId,
        update: &UpdateRequest,
    ) -> Result<Resolution, RequestServiceError> {
        let now = Utc::now();
        let response_status = RequestStatus::from(update.status);

        let resolution = self.store.transaction(|uow| {
            let request = uow.request(&update.id)?;
            let recorded = uow
                .responses(&update.id)?
                .into_iter()
                .find(|row| &row.member_id == member_id)
                .ok_or_else(|| {
                    RepositoryError::not_found(
                        "request recipient",
                        format!("{}/{}", update.id, member_id),
                    )
                })?;

            if request.status.is_terminal() && recorded.status == response_status {
                return Ok(Resolution::Unchanged);
            }

            uow.update_response(&update.id, member_id, response_status, now)?;

            let responses = uow.responses(&update.id)?;
            let aggregate = aggregate_status(responses.iter().map(|row| row.status));

            if request.status.is_terminal() {
                // Late answers are kept only while the settled outcome still holds.
                if aggregate == Some(request.status) {
                    return Ok(Resolution::Unchanged);
                }
                return Err(RequestServiceError::AlreadyResolved {
                    id: request.id,
                    status: request.status,
                });
            }

            let Some(status) = aggregate else {
                return Ok(Resolution::Unresolved);
            };

            let request = uow.update_request_status(&update.id, status)?;
            let effects = match status {
                RequestStatus::Accepted => Some(apply_acceptance(uow, &request, member_id, now)?),
                _ => None,
            };

            Ok::<_, RequestServiceError>(Resolution::Resolved {
                status,
                recipients: responses.into_iter().map(|row| row.member_id).collect(),
                effects,
            })
        })?;

        match &resolution {
            Resolution::Resolved { status, .. } => info!(
                request_id = %update.id,
                member_id = %member_id,
                status = status.label(),
                "request resolved"
            ),
            other => debug!(
                request_id = %update.id,
                member_id = %member_id,
                resolution = ?other,
                "request response recorded"
            ),
        }

        Ok(resolution)
    }

    /// Create a pending request with one pending response row per recipient.
    pub async fn send(
        &self,
        sender_id: &MemberId,
        draft: RequestDraft,
    ) -> Result<RequestView, RequestServiceError> {
        validate_draft(sender_id, &draft)?;

        let RequestDraft {
            category,
            title,
            recipients,
            contract_id,
        } = draft;

        if category.requires_contract() && contract_id.is_none() {
            return Err(RequestServiceError::InvalidDraft(format!(
                "{} requests must reference a contract",
                category.label()
            )));
        }

        let request = Request {
            id: RequestId::generate(),
            sender_id: sender_id.clone(),
            category,
            status: RequestStatus::Pending,
            title: title.trim().to_string(),
            contract_id,
            created_at: Utc::now(),
        };

        let view = self.store.transaction(|uow| {
            if let Some(contract_id) = &request.contract_id {
                let contract = uow.contract(contract_id)?;
                if contract.status != ContractStatus::Active {
                    return Err(RequestServiceError::InvalidDraft(format!(
                        "contract {contract_id} is not active"
                    )));
                }
            }
            uow.insert_request(request.clone())?;
            for member_id in &recipients {
                uow.insert_response(MemberReceiveRequest {
                    request_id: request.id.clone(),
                    member_id: member_id.clone(),
                    status: RequestStatus::Pending,
                    responded_at: None,
                })?;
            }
            let responses = uow.responses(&request.id)?;
            Ok::<_, RequestServiceError>(RequestView { request, responses })
        })?;

        info!(
            request_id = %view.request.id,
            sender_id = %sender_id,
            category = view.request.category.label(),
            recipients = view.responses.len(),
            "request sent"
        );

        self.dispatcher
            .fan_out(RequestNotice::Received, &view.request.id, &view.recipients())
            .await;

        Ok(view)
    }

    /// Fetch a request with every recipient's current response.
    pub fn get(&self, id: &RequestId) -> Result<RequestView, RequestServiceError> {
        let view = self.store.read(|uow| {
            let request = uow.request(id)?;
            let responses = uow.responses(id)?;
            Ok::<_, RepositoryError>(RequestView { request, responses })
        })?;
        Ok(view)
    }

    pub fn contacts_for(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<MemberContact>, RequestServiceError> {
        let contacts = self.store.read(|uow| uow.contacts_for(member_id))?;
        Ok(contacts)
    }

    pub fn contract(&self, id: &ContractId) -> Result<Contract, RequestServiceError> {
        let contract = self.store.read(|uow| uow.contract(id))?;
        Ok(contract)
    }
}

fn validate_draft(sender_id: &MemberId, draft: &RequestDraft) -> Result<(), RequestServiceError> {
    if draft.title.trim().is_empty() {
        return Err(RequestServiceError::InvalidDraft(
            "title must not be blank".to_string(),
        ));
    }
    if draft.recipients.is_empty() {
        return Err(RequestServiceError::InvalidDraft(
            "at least one recipient is required".to_string(),
        ));
    }
    if draft.recipients.contains(sender_id) {
        return Err(RequestServiceError::InvalidDraft(
            "sender cannot be a recipient".to_string(),
        ));
    }

    let mut seen = BTreeSet::new();
    if let Some(duplicate) = draft.recipients.iter().find(|member| !seen.insert(*member)) {
        return Err(RepositoryError::conflict("request recipient", duplicate).into());
    }

    Ok(())
}

/// Error raised by the request workflow.
#[derive(Debug, thiserror::Error)]
pub enum RequestServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("request {id} was already resolved as {status}")]
    AlreadyResolved { id: RequestId, status: RequestStatus },
    #[error("invalid request: {0}")]
    InvalidDraft(String),
    #[error("request {0} has no linked contract")]
    MissingContract(RequestId),
}
