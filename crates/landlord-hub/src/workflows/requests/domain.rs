use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier for a landlord, tenant or staff member.
    MemberId
);
string_id!(
    /// Identifier for a request shared with one or more recipients.
    RequestId
);
string_id!(
    /// Identifier for a rental contract.
    ContractId
);

impl RequestId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

/// Lifecycle of both the aggregate request and each recipient's response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Accepted => "Accepted",
            Self::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A recipient's answer. Only resolved answers can be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    Accepted,
    Rejected,
}

impl From<ResponseStatus> for RequestStatus {
    fn from(value: ResponseStatus) -> Self {
        match value {
            ResponseStatus::Accepted => RequestStatus::Accepted,
            ResponseStatus::Rejected => RequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestCategory {
    Maintenance,
    RentalInvitation,
    TerminateContract,
}

impl RequestCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Maintenance => "Maintenance",
            Self::RentalInvitation => "Rental invitation",
            Self::TerminateContract => "Terminate contract",
        }
    }

    pub fn requires_contract(self) -> bool {
        matches!(self, Self::TerminateContract)
    }
}

/// A workflow item requiring acceptance from one or more recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub sender_id: MemberId,
    pub category: RequestCategory,
    pub status: RequestStatus,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<ContractId>,
    pub created_at: DateTime<Utc>,
}

/// One recipient's response record; `(request_id, member_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberReceiveRequest {
    pub request_id: RequestId,
    pub member_id: MemberId,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responded_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    Pending,
    Active,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    pub id: ContractId,
    pub landlord_id: MemberId,
    pub tenant_id: MemberId,
    pub unit_id: String,
    pub status: ContractStatus,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContactType {
    Tenant,
    Landlord,
}

/// Relationship between two members recorded when a request is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberContact {
    #[serde(rename = "type")]
    pub contact_type: ContactType,
    pub contact_id: MemberId,
    pub contact_with_id: MemberId,
    pub created_at: DateTime<Utc>,
}

/// Inbound status update from one recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub id: RequestId,
    pub status: ResponseStatus,
}

/// Payload for sending a new request to recipients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDraft {
    pub category: RequestCategory,
    pub title: String,
    pub recipients: Vec<MemberId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_id: Option<ContractId>,
}

/// Request together with every recipient's current response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestView {
    #[serde(flatten)]
    pub request: Request,
    pub responses: Vec<MemberReceiveRequest>,
}

impl RequestView {
    pub fn recipients(&self) -> Vec<MemberId> {
        self.responses
            .iter()
            .map(|response| response.member_id.clone())
            .collect()
    }
}
