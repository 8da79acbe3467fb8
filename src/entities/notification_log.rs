//! Notification log entity - one row per SMS dispatch attempt.
//!
//! Rows are append-only. `status` is `"sent"` or `"failed"`; a sent row carries
//! the provider's message id, a failed row carries the error text.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Outcome status stored for a sent message
pub const STATUS_SENT: &str = "sent";
/// Outcome status stored for a failed attempt
pub const STATUS_FAILED: &str = "failed";

/// Notification outcome database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification_log")]
pub struct Model {
    /// Unique identifier for the outcome record
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Number the message was addressed to
    pub destination: String,
    /// Optional employee label sent along with the message
    pub employee_name: Option<String>,
    /// Trimmed message body
    #[sea_orm(column_type = "Text")]
    pub message: String,
    /// `"sent"` or `"failed"`
    pub status: String,
    /// Provider-assigned id for sent messages
    pub provider_message_id: Option<String>,
    /// Error text for failed attempts
    pub error: Option<String>,
    /// When the attempt was made
    pub created_at: DateTimeUtc,
}

/// `NotificationLog` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// True when the provider accepted the message.
    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.status == STATUS_SENT
    }
}
