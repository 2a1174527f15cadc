pub mod identity;
pub mod invoices;
pub mod persistence;
pub mod requests;

pub use persistence::RepositoryError;
