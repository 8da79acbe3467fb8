//! Entity module - Contains all SeaORM entity definitions for the database.
//! The ledger itself is stored as a single JSON value in `app_state`; the
//! notification dispatcher appends its outcome records to `notification_log`.

pub mod app_state;
pub mod notification_log;

// Re-export specific types to avoid conflicts
pub use app_state::{Column as AppStateColumn, Entity as AppState, Model as AppStateModel};
pub use notification_log::{
    Column as NotificationLogColumn, Entity as NotificationLog, Model as NotificationLogModel,
};
