//! Framework-agnostic ledger logic: the entity store, its persistence,
//! read-only views, export/import and notifications.

/// Derived views: totals, material usage, site filters
pub mod aggregation;
/// Tabular, archive and report exports
pub mod export;
/// Persisted single-writer store
pub mod ledger;
/// Outcome-logged SMS dispatch
pub mod notify;
/// HTTP implementation of the SMS provider
pub mod sms;
/// JSON snapshot export and import
pub mod snapshot;
/// Key/value durable storage
pub mod storage;
/// In-memory collections and CRUD
pub mod store;
/// Column-per-field projection of collections
pub mod tables;
/// Field constraints
pub mod validation;
