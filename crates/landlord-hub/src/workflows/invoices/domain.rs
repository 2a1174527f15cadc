use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::requests::domain::MemberId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvoiceId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Unpaid,
    Paid,
    Overdue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceCategory {
    Rent,
    Utilities,
    Maintenance,
    Deposit,
}

/// Billed line; amounts are stored in cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    pub unit_price_cents: u64,
    pub quantity: u32,
}

impl InvoiceItem {
    pub fn line_total_cents(&self) -> u64 {
        self.unit_price_cents.saturating_mul(u64::from(self.quantity))
    }
}

/// Invoice issued to a member for a unit of a landlord's property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    pub category: InvoiceCategory,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub owner_id: MemberId,
    pub property_id: String,
    pub unit_id: String,
    pub unit_name: String,
    pub member_id: MemberId,
    pub member_name: String,
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    pub fn total_cents(&self) -> u64 {
        self.items
            .iter()
            .map(InvoiceItem::line_total_cents)
            .fold(0, u64::saturating_add)
    }

    pub fn summary(&self) -> InvoiceSummary {
        InvoiceSummary {
            id: self.id,
            category: self.category,
            status: self.status,
            due_date: self.due_date,
            created_at: self.created_at,
            unit_name: self.unit_name.clone(),
            member_name: self.member_name.clone(),
            total_cents: self.total_cents(),
        }
    }
}

/// List row without line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceSummary {
    pub id: InvoiceId,
    pub category: InvoiceCategory,
    pub status: InvoiceStatus,
    pub due_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub unit_name: String,
    pub member_name: String,
    pub total_cents: u64,
}

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;

/// Filters and pagination accepted by the invoice listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InvoiceQuery {
    #[serde(default)]
    pub take: Option<usize>,
    #[serde(default)]
    pub skip: Option<usize>,
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub unit_id: Option<String>,
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
    #[serde(default)]
    pub member_id: Option<MemberId>,
}

impl InvoiceQuery {
    pub fn page_size(&self) -> usize {
        self.take.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> usize {
        self.skip.unwrap_or(0)
    }

    pub fn matches(&self, invoice: &Invoice) -> bool {
        self.property_id
            .as_ref()
            .map_or(true, |property| &invoice.property_id == property)
            && self
                .unit_id
                .as_ref()
                .map_or(true, |unit| &invoice.unit_id == unit)
            && self.status.map_or(true, |status| invoice.status == status)
            && self
                .member_id
                .as_ref()
                .map_or(true, |member| &invoice.member_id == member)
    }
}

/// One page of results plus the unpaginated match count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoicePage {
    pub total: usize,
    pub data: Vec<InvoiceSummary>,
}
