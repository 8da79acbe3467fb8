//! Structured-document snapshot: JSON export and import of every collection.
//!
//! The export always carries all ten collection keys, even when empty. Import is
//! best-effort per collection: a key that is present and decodes replaces that
//! collection wholesale, anything else leaves it alone. Only a file that fails to
//! parse at all is rejected outright.

use crate::{
    core::{
        export::{ExportContext, ExportMetadata},
        store::{EntityStore, Recordable},
    },
    errors::{Error, Result},
    models::{
        Collection, Document, Employee, Material, Record, SalaryRecord, Site, SiteDocument,
        SiteEmployee, SiteMaterial, SiteTask, Transaction,
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{
    collections::{BTreeMap, HashSet},
    path::Path,
};
use tracing::{debug, info, instrument, warn};

/// Format version written into `app_settings.version`.
pub const SNAPSHOT_VERSION: &str = "1.0";

/// The only extension accepted on import.
pub const SNAPSHOT_EXTENSION: &str = "json";

/// `app_settings` block of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    /// Dark theme flag
    pub dark_mode: bool,
    /// Locale tag
    pub language: String,
    /// Snapshot format version
    pub version: String,
    /// Export time in milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Version of the exporting application
    pub app_version: String,
}

/// A complete exported snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// Owner id
    pub user_id: String,
    /// Export time
    pub exported_on: DateTime<Utc>,
    /// The ten collections, one top-level key each
    #[serde(flatten)]
    pub collections: EntityStore,
    /// Presentation settings and format version
    pub app_settings: AppSettings,
    /// Totals computed at export time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<ExportMetadata>,
    /// Opaque rendered images keyed by name
    #[serde(
        rename = "dashboardScreenshots",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dashboard_screenshots: Option<BTreeMap<String, String>>,
}

impl SnapshotDocument {
    /// Captures `store` with metadata computed from it.
    #[must_use]
    pub fn capture(store: &EntityStore, context: &ExportContext) -> Self {
        Self {
            user_id: context.user_id.clone(),
            exported_on: context.exported_on,
            collections: store.clone(),
            app_settings: AppSettings {
                dark_mode: context.dark_mode,
                language: context.language.clone(),
                version: SNAPSHOT_VERSION.to_string(),
                timestamp: context.exported_on.timestamp_millis(),
                app_version: context.app_version.clone(),
            },
            meta_data: Some(ExportMetadata::compute(store)),
            dashboard_screenshots: None,
        }
    }

    /// Attaches rendered screenshots; they are carried through untouched.
    #[must_use]
    pub fn with_screenshots(mut self, screenshots: BTreeMap<String, String>) -> Self {
        self.dashboard_screenshots = Some(screenshots);
        self
    }

    /// Encodes the document as pretty-printed JSON.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Exports `store` as a structured snapshot.
#[instrument(skip_all, fields(records = store.total_records()))]
pub fn export_json(store: &EntityStore, context: &ExportContext) -> Result<Vec<u8>> {
    let bytes = SnapshotDocument::capture(store, context).to_json()?;
    info!(
        "Exported {} records as structured snapshot ({} bytes)",
        store.total_records(),
        bytes.len()
    );
    Ok(bytes)
}

/// A parsed snapshot file whose collections have not been decoded yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDocument {
    fields: Map<String, Value>,
}

impl ImportDocument {
    /// `exported_on` as written in the file, if it is a string.
    #[must_use]
    pub fn exported_on(&self) -> Option<&str> {
        self.fields.get("exported_on").and_then(Value::as_str)
    }

    /// `user_id` as written in the file, if it is a string.
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.fields.get("user_id").and_then(Value::as_str)
    }

    fn collection(&self, collection: Collection) -> Option<&Value> {
        self.fields
            .get(collection.key())
            .filter(|value| !value.is_null())
    }
}

/// Checks the extension and parses `bytes` as a JSON object.
///
/// # Errors
/// * [`Error::UnsupportedFormat`] - the name does not end in `.json`; the bytes
///   are not read
/// * [`Error::ImportFailed`] - the bytes are not JSON or the root is not an object
pub fn parse_import(file_name: &str, bytes: &[u8]) -> Result<ImportDocument> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if extension != SNAPSHOT_EXTENSION {
        warn!("Rejected {file_name}: unsupported import format");
        return Err(Error::UnsupportedFormat { extension });
    }

    let value: Value = serde_json::from_slice(bytes).map_err(|e| Error::ImportFailed {
        message: e.to_string(),
    })?;
    let Value::Object(fields) = value else {
        return Err(Error::ImportFailed {
            message: "snapshot root is not an object".to_string(),
        });
    };

    Ok(ImportDocument { fields })
}

/// What happened to one collection during an import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionOutcome {
    /// Which collection
    pub collection: Collection,
    /// Whether the collection was replaced
    pub applied: bool,
    /// Records now in the collection when applied, otherwise 0
    pub records: usize,
    /// Why it was skipped, or a warning about what was applied
    pub reason: Option<String>,
}

/// Per-collection result of an import, in snapshot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Export timestamp found in the file
    pub exported_on: Option<String>,
    /// One entry per collection
    pub outcomes: Vec<CollectionOutcome>,
}

impl ImportReport {
    /// Number of collections that were replaced.
    #[must_use]
    pub fn applied_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.applied).count()
    }

    /// Outcome for `collection`.
    #[must_use]
    pub fn outcome(&self, collection: Collection) -> Option<&CollectionOutcome> {
        self.outcomes.iter().find(|o| o.collection == collection)
    }
}

fn replace_collection<T: Recordable>(
    store: &mut EntityStore,
    document: &ImportDocument,
) -> CollectionOutcome {
    let collection = T::COLLECTION;
    let Some(value) = document.collection(collection) else {
        return CollectionOutcome {
            collection,
            applied: false,
            records: 0,
            reason: Some("absent from snapshot".to_string()),
        };
    };

    match Vec::<Record<T>>::deserialize(value) {
        Ok(records) => {
            let invalid = records.iter().filter(|r| r.data.validate().is_err()).count();
            let duplicates = {
                let mut seen = HashSet::new();
                records.iter().filter(|r| !seen.insert(r.id.as_str())).count()
            };
            let count = records.len();
            *T::records_mut(store) = records;

            let mut problems = Vec::new();
            if invalid > 0 {
                problems.push(format!("{invalid} records fail validation"));
            }
            if duplicates > 0 {
                problems.push(format!("{duplicates} duplicate ids"));
            }
            let reason = (!problems.is_empty()).then(|| problems.join("; "));
            if let Some(reason) = &reason {
                warn!("Imported {collection} with {reason}");
            } else {
                debug!("Replaced {collection} with {count} records");
            }
            CollectionOutcome {
                collection,
                applied: true,
                records: count,
                reason,
            }
        }
        Err(e) => {
            warn!("Skipped {collection}: {e}");
            CollectionOutcome {
                collection,
                applied: false,
                records: 0,
                reason: Some(format!("unreadable: {e}")),
            }
        }
    }
}

/// Replaces every collection present in `document`; the rest stay as they were.
pub fn apply_snapshot(store: &mut EntityStore, document: &ImportDocument) -> ImportReport {
    let outcomes = Collection::ALL
        .iter()
        .map(|&collection| match collection {
            Collection::Transactions => replace_collection::<Transaction>(store, document),
            Collection::Employees => replace_collection::<Employee>(store, document),
            Collection::Materials => replace_collection::<Material>(store, document),
            Collection::Sites => replace_collection::<Site>(store, document),
            Collection::SiteEmployees => replace_collection::<SiteEmployee>(store, document),
            Collection::SiteMaterials => replace_collection::<SiteMaterial>(store, document),
            Collection::SiteTasks => replace_collection::<SiteTask>(store, document),
            Collection::SiteDocuments => replace_collection::<SiteDocument>(store, document),
            Collection::Documents => replace_collection::<Document>(store, document),
            Collection::SalaryRecords => replace_collection::<SalaryRecord>(store, document),
        })
        .collect();

    ImportReport {
        exported_on: document.exported_on().map(str::to_string),
        outcomes,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::aggregation;
    use crate::test_utils::{employee, export_context, populated_store, transaction};
    use proptest::prelude::*;

    fn round_trip(store: &EntityStore) -> (EntityStore, ImportReport) {
        let bytes = export_json(store, &export_context()).unwrap();
        let document = parse_import("backup.json", &bytes).unwrap();
        let mut restored = EntityStore::new();
        let report = apply_snapshot(&mut restored, &document);
        (restored, report)
    }

    #[test]
    fn test_export_then_import_restores_every_collection() {
        let store = populated_store();
        let (restored, report) = round_trip(&store);

        assert_eq!(restored, store);
        assert_eq!(report.applied_count(), Collection::ALL.len());
        assert!(report.outcomes.iter().all(|o| o.reason.is_none()));
    }

    #[test]
    fn test_material_usage_survives_round_trip() {
        let store = populated_store();
        let (restored, _) = round_trip(&store);

        assert_eq!(
            aggregation::material_usage(&restored),
            aggregation::material_usage(&store)
        );
    }

    #[test]
    fn test_export_contains_every_key_even_when_empty() {
        let bytes = export_json(&EntityStore::new(), &export_context()).unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        for collection in Collection::ALL {
            assert_eq!(value[collection.key()], Value::Array(Vec::new()));
        }
        assert_eq!(value["app_settings"]["version"], SNAPSHOT_VERSION);
        assert_eq!(value["meta_data"]["totalRecords"], 0);
        assert!(value["user_id"].is_string());
        assert!(value.get("dashboardScreenshots").is_none());
    }

    #[test]
    fn test_screenshots_are_carried_through() {
        let shots = BTreeMap::from([(
            "dashboard".to_string(),
            "data:image/png;base64,AAAA".to_string(),
        )]);
        let document =
            SnapshotDocument::capture(&EntityStore::new(), &export_context()).with_screenshots(shots);

        let value: Value = serde_json::from_slice(&document.to_json().unwrap()).unwrap();
        assert_eq!(
            value["dashboardScreenshots"]["dashboard"],
            "data:image/png;base64,AAAA"
        );
    }

    #[test]
    fn test_missing_key_leaves_collection_untouched() {
        let mut store = EntityStore::new();
        store.add(transaction("Old Stock", 10.0, 1.0)).unwrap();
        let worker = store.add(employee("Ana")).unwrap();

        let snapshot = serde_json::json!({
            "transactions": [
                {"id": "t-1", "materialName": "Copper Wire", "amount": 500.0, "quantity": 10.0, "date": "2024-03-01"}
            ]
        });
        let document = parse_import("partial.json", snapshot.to_string().as_bytes()).unwrap();
        let report = apply_snapshot(&mut store, &document);

        assert_eq!(store.transactions.len(), 1);
        assert_eq!(store.transactions[0].id, "t-1");
        assert_eq!(store.employees.len(), 1);
        assert_eq!(store.employees[0].id, worker.id);

        let employees = report.outcome(Collection::Employees).unwrap();
        assert!(!employees.applied);
        assert_eq!(employees.reason.as_deref(), Some("absent from snapshot"));
        assert_eq!(report.applied_count(), 1);
    }

    #[test]
    fn test_invalid_json_is_import_failed() {
        let result = parse_import("backup.json", b"{\"transactions\": [");
        assert!(matches!(result, Err(Error::ImportFailed { .. })));

        let result = parse_import("backup.json", b"[1, 2, 3]");
        assert!(matches!(result, Err(Error::ImportFailed { .. })));
    }

    #[test]
    fn test_extension_is_checked_before_parsing() {
        let result = parse_import("backup.xlsx", b"{}");
        assert!(matches!(
            result,
            Err(Error::UnsupportedFormat { extension }) if extension == "xlsx"
        ));

        assert!(matches!(
            parse_import("backup", b"{}"),
            Err(Error::UnsupportedFormat { .. })
        ));
        assert!(parse_import("BACKUP.JSON", b"{}").is_ok());
    }

    #[test]
    fn test_undecodable_collection_is_skipped_with_reason() {
        let mut store = populated_store();
        let before = store.sites.clone();

        let snapshot = serde_json::json!({
            "sites": "not a list",
            "employees": [],
            "materials": null
        });
        let document = parse_import("odd.json", snapshot.to_string().as_bytes()).unwrap();
        let report = apply_snapshot(&mut store, &document);

        let sites = report.outcome(Collection::Sites).unwrap();
        assert!(!sites.applied);
        assert!(sites.reason.as_ref().unwrap().starts_with("unreadable"));
        assert_eq!(store.sites, before);

        // An explicit empty list is a real replacement
        assert!(report.outcome(Collection::Employees).unwrap().applied);
        assert!(store.employees.is_empty());

        // null counts as absent
        assert!(!report.outcome(Collection::Materials).unwrap().applied);
        assert!(!store.materials.is_empty());
    }

    #[test]
    fn test_invalid_records_are_applied_with_warning() {
        let mut store = EntityStore::new();
        let snapshot = serde_json::json!({
            "exported_on": "2024-03-01T00:00:00Z",
            "transactions": [
                {"id": "t-1", "materialName": "Copper Wire", "amount": -5.0, "quantity": 1.0, "date": "2024-03-01"}
            ]
        });
        let document = parse_import("backup.json", snapshot.to_string().as_bytes()).unwrap();
        let report = apply_snapshot(&mut store, &document);

        let outcome = report.outcome(Collection::Transactions).unwrap();
        assert!(outcome.applied);
        assert_eq!(outcome.records, 1);
        assert_eq!(outcome.reason.as_deref(), Some("1 records fail validation"));
        assert_eq!(store.transactions.len(), 1);
        assert_eq!(report.exported_on.as_deref(), Some("2024-03-01T00:00:00Z"));
    }

    #[test]
    fn test_duplicate_ids_are_reported() {
        let mut store = EntityStore::new();
        let snapshot = serde_json::json!({
            "transactions": [
                {"id": "t-1", "materialName": "Copper Wire", "amount": 5.0, "quantity": 1.0, "date": "2024-03-01"},
                {"id": "t-1", "materialName": "Conduit", "amount": 7.0, "quantity": 2.0, "date": "2024-03-02"},
                {"id": "t-2", "materialName": "Breaker", "amount": -1.0, "quantity": 1.0, "date": "2024-03-03"}
            ]
        });
        let document = parse_import("backup.json", snapshot.to_string().as_bytes()).unwrap();
        let report = apply_snapshot(&mut store, &document);

        let outcome = report.outcome(Collection::Transactions).unwrap();
        assert!(outcome.applied);
        assert_eq!(outcome.records, 3);
        assert_eq!(
            outcome.reason.as_deref(),
            Some("1 records fail validation; 1 duplicate ids")
        );
    }

    proptest! {
        #[test]
        fn prop_fractional_amounts_survive_round_trip(
            rows in prop::collection::vec((1e-6f64..1e9, 1e-6f64..1e6), 1..30)
        ) {
            let mut store = EntityStore::new();
            for &(amount, quantity) in &rows {
                store.add(transaction("Copper Wire", amount, quantity)).unwrap();
            }
            // Values that do not fit in few decimal digits
            store.add(transaction("Conduit", 1_705_464.07 / 7.0, 1.0 / 7.0)).unwrap();

            let (restored, _) = round_trip(&store);

            prop_assert_eq!(restored.transactions.len(), store.transactions.len());
            for (back, original) in restored.transactions.iter().zip(&store.transactions) {
                prop_assert_eq!(back.amount.to_bits(), original.amount.to_bits());
                prop_assert_eq!(back.quantity.to_bits(), original.quantity.to_bits());
            }
            prop_assert_eq!(restored, store);
        }
    }
}
