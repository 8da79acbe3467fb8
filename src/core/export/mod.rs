//! Export formats other than the structured snapshot.
//!
//! All of them read a whole [`EntityStore`] plus an [`ExportContext`] and return
//! the encoded file as bytes; writing the bytes somewhere is up to the caller.

/// Compressed archive of one CSV per non-empty collection
pub mod archive;
/// Human-readable paginated report
pub mod report;
/// Spreadsheet workbook with one sheet per collection
pub mod tabular;

use crate::{
    config::settings::Settings,
    core::{
        aggregation::{self, MaterialUsage},
        snapshot::SNAPSHOT_VERSION,
        store::EntityStore,
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Who exported, when, and with which presentation settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportContext {
    /// Owner id
    pub user_id: String,
    /// Dark theme flag
    pub dark_mode: bool,
    /// Locale tag
    pub language: String,
    /// Application version string
    pub app_version: String,
    /// Export time
    pub exported_on: DateTime<Utc>,
}

impl ExportContext {
    /// Context for an export happening at `exported_on`.
    #[must_use]
    pub fn from_settings(settings: &Settings, exported_on: DateTime<Utc>) -> Self {
        Self {
            user_id: settings.user_id.clone(),
            dark_mode: settings.app.dark_mode,
            language: settings.app.language.clone(),
            app_version: settings.app.app_version.clone(),
            exported_on,
        }
    }
}

/// Totals computed at export time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    /// Sum of transaction amounts
    pub total_cost: f64,
    /// Records across all collections
    pub total_records: usize,
    /// Records per collection, keyed by snapshot key
    pub record_counts: BTreeMap<String, usize>,
    /// Per-material roll-up
    pub material_usage: Vec<MaterialUsage>,
}

impl ExportMetadata {
    /// Computes the totals for `store`.
    #[must_use]
    pub fn compute(store: &EntityStore) -> Self {
        Self {
            total_cost: aggregation::total_cost(store),
            total_records: store.total_records(),
            record_counts: store
                .record_counts()
                .into_iter()
                .map(|(collection, count)| (collection.key().to_string(), count))
                .collect(),
            material_usage: aggregation::material_usage(store),
        }
    }
}

/// Field/value pairs shared by the metadata sheet, `metadata.csv` and the
/// report summary.
#[must_use]
pub fn metadata_rows(store: &EntityStore, context: &ExportContext) -> Vec<(String, String)> {
    let mut rows = vec![
        ("Exported On".to_string(), context.exported_on.to_rfc3339()),
        ("User".to_string(), context.user_id.clone()),
        ("Format Version".to_string(), SNAPSHOT_VERSION.to_string()),
        ("App Version".to_string(), context.app_version.clone()),
        (
            "Total Cost".to_string(),
            format_amount(aggregation::total_cost(store)),
        ),
        ("Total Records".to_string(), store.total_records().to_string()),
    ];
    rows.extend(
        store
            .record_counts()
            .into_iter()
            .map(|(collection, count)| (collection.sheet_name().to_string(), count.to_string())),
    );
    rows
}

/// Formats a money amount like `$1,234.50` (or `-$5.00`).
#[must_use]
pub fn format_amount(amount: f64) -> String {
    let formatted = format!("{:.2}", amount.abs());
    let (whole, cents) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}
