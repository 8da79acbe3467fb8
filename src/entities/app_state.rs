//! Application state entity - durable key/value storage.
//!
//! The whole entity store lives in one row of this table, serialized as JSON under
//! a namespaced key. Keeping it key/value means a process can host several
//! independent ledgers by giving each its own key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Application state database model - one persisted value per key
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "app_state")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Namespaced storage key (e.g., `"site-ledger/store"`)
    #[sea_orm(unique)]
    pub key: String,
    /// Serialized value
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When the value was last written
    pub updated_at: DateTimeUtc,
}

/// `AppState` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
