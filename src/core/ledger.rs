//! The persisted, single-writer entity store.
//!
//! A [`Ledger`] owns the database connection and the in-memory [`EntityStore`].
//! It is built explicitly and handed to whoever needs it; there is no global
//! instance. Every mutation runs under one async mutex, is applied to a copy of
//! the store, written to durable storage, and only then swapped in. A failed
//! write therefore leaves both memory and storage as they were.

use crate::{
    core::{
        snapshot::{self, ImportReport},
        storage,
        store::{EntityStore, MutationOutcome, Recordable},
    },
    errors::{Error, Result},
    models::Record,
};
use sea_orm::DatabaseConnection;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// Entity store backed by a key in the `app_state` table.
#[derive(Debug)]
pub struct Ledger {
    db: DatabaseConnection,
    storage_key: String,
    store: Mutex<EntityStore>,
}

impl Ledger {
    /// Loads the store persisted under `storage_key`, or starts empty.
    ///
    /// # Errors
    /// Fails if the database cannot be read or the stored value is not a valid
    /// store; the data is left in place rather than overwritten.
    #[instrument(skip(db))]
    pub async fn open(db: DatabaseConnection, storage_key: &str) -> Result<Self> {
        let store = match storage::load_value(&db, storage_key).await? {
            Some(raw) => serde_json::from_str::<EntityStore>(&raw).map_err(|e| Error::Storage {
                message: format!("Stored value under {storage_key} is unreadable: {e}"),
            })?,
            None => {
                info!("Nothing stored under {storage_key}; starting with an empty ledger");
                EntityStore::default()
            }
        };

        info!(
            "Opened ledger {storage_key} with {} records",
            store.total_records()
        );
        Ok(Self {
            db,
            storage_key: storage_key.to_string(),
            store: Mutex::new(store),
        })
    }

    /// Connection used for persistence.
    #[must_use]
    pub const fn database(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Key the store is persisted under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    async fn persist(&self, store: &EntityStore) -> Result<()> {
        let raw = serde_json::to_string(store)?;
        storage::save_value(&self.db, &self.storage_key, raw).await
    }

    /// Validates and adds a record, then persists the store.
    pub async fn add<T: Recordable>(&self, data: T) -> Result<Record<T>> {
        let mut store = self.store.lock().await;
        let mut next = store.clone();
        let record = next.add(data)?;
        self.persist(&next).await?;
        *store = next;
        Ok(record)
    }

    /// Replaces the record with the same id. Not-found is reported, not an error,
    /// and does not touch storage.
    pub async fn update<T: Recordable>(&self, record: Record<T>) -> Result<MutationOutcome> {
        let mut store = self.store.lock().await;
        let mut next = store.clone();
        let outcome = next.update(record)?;
        if outcome.is_applied() {
            self.persist(&next).await?;
            *store = next;
        }
        Ok(outcome)
    }

    /// Deletes the record with `id`. Join rows referring to it are kept.
    pub async fn delete<T: Recordable>(&self, id: &str) -> Result<MutationOutcome> {
        let mut store = self.store.lock().await;
        let mut next = store.clone();
        let outcome = next.delete::<T>(id);
        if outcome.is_applied() {
            self.persist(&next).await?;
            *store = next;
        }
        Ok(outcome)
    }

    /// Empties every collection.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<()> {
        let mut store = self.store.lock().await;
        let next = EntityStore::default();
        self.persist(&next).await?;
        *store = next;
        warn!("Ledger {} reset", self.storage_key);
        Ok(())
    }

    /// Restores collections from a structured snapshot file.
    ///
    /// Files without a `.json` extension are rejected before parsing. A file that
    /// does not parse leaves the ledger untouched. Otherwise each collection
    /// present in the snapshot replaces the current one; see [`ImportReport`].
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn import(&self, file_name: &str, bytes: &[u8]) -> Result<ImportReport> {
        let document = snapshot::parse_import(file_name, bytes)?;

        let mut store = self.store.lock().await;
        let mut next = store.clone();
        let report = snapshot::apply_snapshot(&mut next, &document);

        if report.applied_count() > 0 {
            self.persist(&next).await?;
            *store = next;
        }
        info!(
            "Imported {file_name}: {} of {} collections applied",
            report.applied_count(),
            report.outcomes.len()
        );
        Ok(report)
    }

    /// Runs `f` against the current state.
    pub async fn read<R>(&self, f: impl FnOnce(&EntityStore) -> R) -> R {
        let store = self.store.lock().await;
        f(&store)
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> EntityStore {
        self.store.lock().await.clone()
    }
}
