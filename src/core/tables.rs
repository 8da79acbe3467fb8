//! Column-per-field projection of each collection.
//!
//! The tabular, delimited-archive and paginated-report exports all consume
//! [`Table`]s, so a collection's columns are defined exactly once. Headers are the
//! snapshot field names.

use crate::{
    core::store::EntityStore,
    models::{Collection, Record},
};
use chrono::{DateTime, NaiveDate, Utc};
use std::{borrow::Cow, fmt};

/// One cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Free text, dates and enum labels
    Text(String),
    /// Amounts, quantities, sizes
    Number(f64),
    /// Absent optional field
    Empty,
}

impl Cell {
    fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    fn optional(value: Option<&String>) -> Self {
        value.map_or(Self::Empty, |v| Self::Text(v.clone()))
    }

    fn date(value: NaiveDate) -> Self {
        Self::Text(value.format("%Y-%m-%d").to_string())
    }

    fn optional_date(value: Option<NaiveDate>) -> Self {
        value.map_or(Self::Empty, Self::date)
    }

    fn timestamp(value: DateTime<Utc>) -> Self {
        Self::Text(value.to_rfc3339())
    }

    /// True for [`Cell::Empty`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
            Self::Empty => Ok(()),
        }
    }
}

/// Shortens `text` to at most `limit` characters.
///
/// A data URL longer than the limit becomes `[data:<media type>, <n> chars]`.
/// Other long text keeps its head and notes the full length.
#[must_use]
pub fn abbreviate(text: &str, limit: usize) -> Cow<'_, str> {
    let chars = text.chars().count();
    if chars <= limit {
        return Cow::Borrowed(text);
    }

    let media_type = text
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .map(|(media, _)| media)
        .filter(|media| media.len() <= 64);
    if let Some(media) = media_type {
        return Cow::Owned(format!("[data:{media}, {chars} chars]"));
    }

    let suffix = format!("... [{chars} chars]");
    let head: String = text
        .chars()
        .take(limit.saturating_sub(suffix.len()))
        .collect();
    Cow::Owned(head + &suffix)
}

/// A collection laid out as header + rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Source collection
    pub collection: Collection,
    /// Field names, one per column
    pub columns: &'static [&'static str],
    /// One row per record, same width as `columns`
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// True when the collection has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

const TRANSACTION_COLUMNS: &[&str] = &["id", "materialName", "amount", "quantity", "date"];
const EMPLOYEE_COLUMNS: &[&str] = &["id", "name", "siteLocation", "startDate", "endDate", "notes"];
const MATERIAL_COLUMNS: &[&str] = &[
    "id",
    "materialName",
    "quantity",
    "unit",
    "site",
    "createdAt",
    "updatedAt",
];
const SITE_COLUMNS: &[&str] = &["id", "name", "location", "status", "startDate"];
const SITE_EMPLOYEE_COLUMNS: &[&str] = &[
    "id",
    "siteId",
    "employeeId",
    "role",
    "shift",
    "contact",
    "startDate",
];
const SITE_MATERIAL_COLUMNS: &[&str] = &[
    "id",
    "siteId",
    "materialName",
    "quantity",
    "deliveryDate",
    "supplier",
    "notes",
];
const SITE_TASK_COLUMNS: &[&str] = &[
    "id",
    "siteId",
    "title",
    "description",
    "status",
    "assignedTo",
    "startDate",
];
const SITE_DOCUMENT_COLUMNS: &[&str] = &["id", "siteId", "documentId", "uploadDate", "type"];
const DOCUMENT_COLUMNS: &[&str] = &[
    "id",
    "title",
    "description",
    "fileUrl",
    "fileType",
    "fileSize",
    "uploadDate",
];
const SALARY_RECORD_COLUMNS: &[&str] = &[
    "id",
    "employeeName",
    "salaryPaid",
    "screenshot",
    "date",
    "time",
];

fn project<T>(records: &[Record<T>], row: impl Fn(&Record<T>) -> Vec<Cell>) -> Vec<Vec<Cell>> {
    records.iter().map(row).collect()
}

/// Projects `collection` of `store` into a [`Table`].
#[must_use]
pub fn table_for(store: &EntityStore, collection: Collection) -> Table {
    let (columns, rows) = match collection {
        Collection::Transactions => (
            TRANSACTION_COLUMNS,
            project(&store.transactions, |r| {
                vec![
                    Cell::text(&r.id),
                    Cell::text(&r.material_name),
                    Cell::Number(r.amount),
                    Cell::Number(r.quantity),
                    Cell::date(r.date),
                ]
            }),
        ),
        Collection::Employees => (
            EMPLOYEE_COLUMNS,
            project(&store.employees, |r| {
                vec![
                    Cell::text(&r.id),
                    Cell::text(&r.name),
                    Cell::text(&r.site_location),
                    Cell::date(r.start_date),
                    Cell::optional_date(r.end_date),
                    Cell::optional(r.notes.as_ref()),
                ]
            }),
        ),
        Collection::Materials => (
            MATERIAL_COLUMNS,
            project(&store.materials, |r| {
                vec![
                    Cell::text(&r.id),
                    Cell::text(&r.material_name),
                    Cell::Number(r.quantity),
                    Cell::optional(r.unit.as_ref()),
                    Cell::text(&r.site),
                    Cell::timestamp(r.created_at),
                    Cell::timestamp(r.updated_at),
                ]
            }),
        ),
        Collection::Sites => (
            SITE_COLUMNS,
            project(&store.sites, |r| {
                vec![
                    Cell::text(&r.id),
                    Cell::text(&r.name),
                    Cell::text(&r.location),
                    Cell::text(r.status.to_string()),
                    Cell::date(r.start_date),
                ]
            }),
        ),
        Collection::SiteEmployees => (
            SITE_EMPLOYEE_COLUMNS,
            project(&store.site_employees, |r| {
                vec![
                    Cell::text(&r.id),
                    Cell::text(&r.site_id),
                    Cell::text(&r.employee_id),
                    Cell::text(&r.role),
                    Cell::text(&r.shift),
                    Cell::optional(r.contact.as_ref()),
                    Cell::date(r.start_date),
                ]
            }),
        ),
        Collection::SiteMaterials => (
            SITE_MATERIAL_COLUMNS,
            project(&store.site_materials, |r| {
                vec![
                    Cell::text(&r.id),
                    Cell::text(&r.site_id),
                    Cell::text(&r.material_name),
                    Cell::Number(r.quantity),
                    Cell::date(r.delivery_date),
                    Cell::optional(r.supplier.as_ref()),
                    Cell::optional(r.notes.as_ref()),
                ]
            }),
        ),
        Collection::SiteTasks => (
            SITE_TASK_COLUMNS,
            project(&store.site_tasks, |r| {
                vec![
                    Cell::text(&r.id),
                    Cell::text(&r.site_id),
                    Cell::text(&r.title),
                    Cell::optional(r.description.as_ref()),
                    Cell::text(r.status.to_string()),
                    Cell::optional(r.assigned_to.as_ref()),
                    Cell::date(r.start_date),
                ]
            }),
        ),
        Collection::SiteDocuments => (
            SITE_DOCUMENT_COLUMNS,
            project(&store.site_documents, |r| {
                vec![
                    Cell::text(&r.id),
                    Cell::text(&r.site_id),
                    Cell::text(&r.document_id),
                    Cell::timestamp(r.upload_date),
                    Cell::text(&r.kind),
                ]
            }),
        ),
        Collection::Documents => (
            DOCUMENT_COLUMNS,
            project(&store.documents, |r| {
                // Precision loss only above 2^53 bytes
                #[allow(clippy::cast_precision_loss)]
                let file_size = r.file_size as f64;
                vec![
                    Cell::text(&r.id),
                    Cell::text(&r.title),
                    Cell::text(&r.description),
                    Cell::text(&r.file_url),
                    Cell::text(&r.file_type),
                    Cell::Number(file_size),
                    Cell::timestamp(r.upload_date),
                ]
            }),
        ),
        Collection::SalaryRecords => (
            SALARY_RECORD_COLUMNS,
            project(&store.salary_records, |r| {
                vec![
                    Cell::text(&r.id),
                    Cell::text(&r.employee_name),
                    Cell::Number(r.salary_paid),
                    Cell::optional(r.screenshot.as_ref()),
                    Cell::date(r.date),
                    Cell::Text(r.time.format("%H:%M:%S").to_string()),
                ]
            }),
        ),
    };

    Table {
        collection,
        columns,
        rows,
    }
}

/// Tables for every collection, in snapshot order, including empty ones.
#[must_use]
pub fn all_tables(store: &EntityStore) -> Vec<Table> {
    Collection::ALL
        .iter()
        .map(|&collection| table_for(store, collection))
        .collect()
}

/// Turns a camelCase field name into a label: `materialName` → `Material Name`.
#[must_use]
pub fn humanize(field: &str) -> String {
    let mut label = String::with_capacity(field.len() + 4);
    for (i, ch) in field.chars().enumerate() {
        if i == 0 {
            label.extend(ch.to_uppercase());
        } else if ch.is_uppercase() {
            label.push(' ');
            label.push(ch);
        } else {
            label.push(ch);
        }
    }
    label
}
