//! Durable key/value storage on top of the `app_state` table.
//!
//! The ledger keeps its whole state under a single key; reads happen once at
//! startup and writes after every mutation. Concurrent writers are not
//! coordinated: the last write wins.

use crate::{
    entities::{AppState, app_state},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use tracing::{debug, instrument};

/// Reads the value stored under `key`.
///
/// # Returns
/// * `Ok(Some(value))` - A value has been written before
/// * `Ok(None)` - Nothing stored yet
pub async fn load_value<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let state = AppState::find()
        .filter(app_state::Column::Key.eq(key))
        .one(db)
        .await?;

    Ok(state.map(|s| s.value))
}

/// Writes `value` under `key`, inserting the row on first use.
#[instrument(skip(db, value), fields(bytes = value.len()))]
pub async fn save_value<C>(db: &C, key: &str, value: String) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now();

    let existing = AppState::find()
        .filter(app_state::Column::Key.eq(key))
        .one(db)
        .await?;

    if let Some(state) = existing {
        let mut active_model: app_state::ActiveModel = state.into();
        active_model.value = Set(value);
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_state = app_state::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            updated_at: Set(now),
            ..Default::default()
        };
        new_state.insert(db).await?;
    }

    debug!("Stored value under {key}");
    Ok(())
}
