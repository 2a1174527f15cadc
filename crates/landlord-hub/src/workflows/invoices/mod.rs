//! Landlord-facing invoice listings.

pub mod domain;
pub mod query;
pub mod repository;
pub mod router;

pub use domain::{
    Invoice, InvoiceCategory, InvoiceId, InvoiceItem, InvoicePage, InvoiceQuery, InvoiceStatus,
    InvoiceSummary,
};
pub use query::{InvoiceQueryError, InvoiceQueryService};
pub use repository::{InMemoryInvoiceStore, InvoiceRepository};
pub use router::invoice_router;
