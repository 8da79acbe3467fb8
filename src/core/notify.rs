//! Notification dispatcher: one SMS per call, one outcome row per attempt.
//!
//! There is no queue and no retry. The provider is called exactly once and the
//! outcome is appended to `notification_log` whether it succeeded or not.

use crate::{
    entities::{NotificationLog, notification_log},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect,
    Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

/// What is handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Destination number
    pub phone_number: String,
    /// Trimmed message body
    pub message: String,
    /// Optional employee label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
}

/// What the provider answered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationResponse {
    /// Whether the provider accepted the message
    pub success: bool,
    /// Provider-assigned id when accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_message_id: Option<String>,
    /// Provider error text when rejected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl NotificationResponse {
    /// An accepted message.
    #[must_use]
    pub fn sent(provider_message_id: impl Into<String>) -> Self {
        Self {
            success: true,
            provider_message_id: Some(provider_message_id.into()),
            error: None,
        }
    }

    /// A rejected message.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            provider_message_id: None,
            error: Some(error.into()),
        }
    }
}

/// Something that can deliver a text message.
///
/// A rejection by the provider is an `Ok` response with `success: false`;
/// `Err` is reserved for not reaching the provider at all.
pub trait SmsProvider: Send + Sync {
    /// Sends one message.
    fn send(
        &self,
        request: &NotificationRequest,
    ) -> impl Future<Output = Result<NotificationResponse>> + Send;
}

/// Sends notifications to a fixed destination and records every outcome.
#[derive(Debug)]
pub struct Dispatcher<P> {
    provider: P,
    db: DatabaseConnection,
    destination: String,
}

impl<P: SmsProvider> Dispatcher<P> {
    /// Creates a dispatcher sending to `destination`.
    pub fn new(provider: P, db: DatabaseConnection, destination: impl Into<String>) -> Self {
        Self {
            provider,
            db,
            destination: destination.into(),
        }
    }

    /// Number every message goes to.
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Sends `message` and appends the outcome to the log.
    ///
    /// # Errors
    /// * [`Error::Validation`] - blank message; nothing is sent or recorded
    /// * [`Error::Config`] - no destination configured; nothing is sent or recorded
    /// * [`Error::Notification`] - the provider rejected the message or could not
    ///   be reached; a `failed` row has been recorded
    #[instrument(skip(self, message))]
    pub async fn dispatch(
        &self,
        message: &str,
        employee_name: Option<&str>,
    ) -> Result<notification_log::Model> {
        let body = message.trim();
        if body.is_empty() {
            return Err(Error::validation("message", "must not be empty"));
        }
        if self.destination.trim().is_empty() {
            return Err(Error::Config {
                message: "No notification destination configured".to_string(),
            });
        }

        let attempted_at = Utc::now();
        let request = NotificationRequest {
            phone_number: self.destination.clone(),
            message: body.to_string(),
            employee_name: employee_name.map(str::to_string),
        };

        let outcome = match self.provider.send(&request).await {
            Ok(response) if response.success => Ok(response.provider_message_id),
            Ok(response) => Err(response
                .error
                .unwrap_or_else(|| "Provider rejected the message".to_string())),
            Err(e) => Err(e.to_string()),
        };

        let (status, provider_message_id, error) = match &outcome {
            Ok(id) => (notification_log::STATUS_SENT, id.clone(), None),
            Err(message) => (notification_log::STATUS_FAILED, None, Some(message.clone())),
        };
        let row = notification_log::ActiveModel {
            destination: Set(request.phone_number),
            employee_name: Set(request.employee_name),
            message: Set(request.message),
            status: Set(status.to_string()),
            provider_message_id: Set(provider_message_id),
            error: Set(error),
            created_at: Set(attempted_at),
            ..Default::default()
        };
        let saved = row.insert(&self.db).await?;

        match outcome {
            Ok(_) => {
                info!("Notification {} sent", saved.id);
                Ok(saved)
            }
            Err(message) => {
                warn!("Notification {} failed: {message}", saved.id);
                Err(Error::Notification { message })
            }
        }
    }
}

/// The latest `limit` outcome rows, newest first. Rows are append-only, so id
/// order is attempt order.
pub async fn recent_outcomes<C>(db: &C, limit: u64) -> Result<Vec<notification_log::Model>>
where
    C: ConnectionTrait,
{
    let rows = NotificationLog::find()
        .order_by_desc(notification_log::Column::Id)
        .limit(limit)
        .all(db)
        .await?;
    Ok(rows)
}
