use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    ContactType, Contract, ContractStatus, MemberContact, MemberId, Request, RequestCategory,
};
use super::repository::RequestUnitOfWork;
use super::service::RequestServiceError;

/// Category-specific work performed once a request is accepted by every recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptanceEffect {
    None,
    ExpireContract,
}

impl RequestCategory {
    pub fn acceptance_effect(self) -> AcceptanceEffect {
        match self {
            RequestCategory::TerminateContract => AcceptanceEffect::ExpireContract,
            RequestCategory::Maintenance | RequestCategory::RentalInvitation => {
                AcceptanceEffect::None
            }
        }
    }
}

/// Records written while applying an acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedEffects {
    pub contact: MemberContact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expired_contract: Option<Contract>,
}

/// Runs inside the resolving transaction; any error aborts the whole resolution.
pub(crate) fn apply_acceptance(
    uow: &mut dyn RequestUnitOfWork,
    request: &Request,
    resolver: &MemberId,
    now: DateTime<Utc>,
) -> Result<AppliedEffects, RequestServiceError> {
    let contact = uow.create_contact(MemberContact {
        contact_type: ContactType::Tenant,
        contact_id: resolver.clone(),
        contact_with_id: request.sender_id.clone(),
        created_at: now,
    })?;

    let expired_contract = match request.category.acceptance_effect() {
        AcceptanceEffect::None => None,
        AcceptanceEffect::ExpireContract => {
            let contract_id = request
                .contract_id
                .as_ref()
                .ok_or_else(|| RequestServiceError::MissingContract(request.id.clone()))?;
            Some(uow.update_contract(contract_id, ContractStatus::Expired, Some(now))?)
        }
    };

    Ok(AppliedEffects {
        contact,
        expired_contract,
    })
}
