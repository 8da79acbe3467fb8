//! Domain records tracked by the ledger.
//!
//! Each record kind is a plain serde struct whose field names match the snapshot
//! format (`materialName`, `siteId`, ...). Stored records are wrapped in [`Record`],
//! which adds the generated identifier and serializes flat next to the fields.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, ops::Deref};

/// A stored record: the generated id plus the record's own fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<T> {
    /// Unique within its collection, never reused
    pub id: String,
    /// The record's fields
    #[serde(flatten)]
    pub data: T,
}

impl<T> Deref for Record<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

/// Names the ten collections held by the store.
///
/// Every loop over "all collections" goes through [`Collection::ALL`] and an
/// exhaustive `match`, so a new variant must be handled everywhere before the
/// crate compiles again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Collection {
    /// Material purchases
    Transactions,
    /// Workforce
    Employees,
    /// Global material inventory
    Materials,
    /// Job sites
    Sites,
    /// Site ↔ employee assignments
    SiteEmployees,
    /// Site-scoped delivery log
    SiteMaterials,
    /// Site work items
    SiteTasks,
    /// Site ↔ document links
    SiteDocuments,
    /// Uploaded documents
    Documents,
    /// Salary payments
    SalaryRecords,
}

impl Collection {
    /// All collections in snapshot order.
    pub const ALL: [Self; 10] = [
        Self::Transactions,
        Self::Employees,
        Self::Materials,
        Self::Sites,
        Self::SiteEmployees,
        Self::SiteMaterials,
        Self::SiteTasks,
        Self::SiteDocuments,
        Self::Documents,
        Self::SalaryRecords,
    ];

    /// Key used in the structured snapshot and the persisted store.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Transactions => "transactions",
            Self::Employees => "employees",
            Self::Materials => "materials",
            Self::Sites => "sites",
            Self::SiteEmployees => "siteEmployees",
            Self::SiteMaterials => "siteMaterials",
            Self::SiteTasks => "siteTasks",
            Self::SiteDocuments => "siteDocuments",
            Self::Documents => "documents",
            Self::SalaryRecords => "salaryRecords",
        }
    }

    /// Worksheet name in the tabular export; also the report section title.
    #[must_use]
    pub const fn sheet_name(self) -> &'static str {
        match self {
            Self::Transactions => "Transactions",
            Self::Employees => "Employees",
            Self::Materials => "Materials",
            Self::Sites => "Sites",
            Self::SiteEmployees => "Site Employees",
            Self::SiteMaterials => "Site Materials",
            Self::SiteTasks => "Site Tasks",
            Self::SiteDocuments => "Site Documents",
            Self::Documents => "Documents",
            Self::SalaryRecords => "Salary Records",
        }
    }

    /// File name inside the delimited archive.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Transactions => "transactions.csv",
            Self::Employees => "employees.csv",
            Self::Materials => "materials.csv",
            Self::Sites => "sites.csv",
            Self::SiteEmployees => "site_employees.csv",
            Self::SiteMaterials => "site_materials.csv",
            Self::SiteTasks => "site_tasks.csv",
            Self::SiteDocuments => "site_documents.csv",
            Self::Documents => "documents.csv",
            Self::SalaryRecords => "salary_records.csv",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A material purchase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Free-text material name; grouping is case-sensitive
    pub material_name: String,
    /// Total paid, always positive
    pub amount: f64,
    /// Units bought, always positive
    pub quantity: f64,
    /// Purchase date
    pub date: NaiveDate,
}

/// A member of the workforce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Display name; salary records refer to employees by this string
    pub name: String,
    /// Where the employee usually works
    pub site_location: String,
    /// First day of employment
    pub start_date: NaiveDate,
    /// Last day, never before `start_date`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// An entry in the global material inventory.
///
/// `created_at` and `updated_at` are owned by the store: whatever the caller
/// passes is replaced on add, and `updated_at` moves forward on every update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// Material name
    pub material_name: String,
    /// Units in stock
    pub quantity: f64,
    /// Unit label (m, kg, pcs)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Site the stock is kept at
    pub site: String,
    /// Set once when the record is added
    pub created_at: DateTime<Utc>,
    /// Refreshed on every update
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle of a job site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    /// Work in progress
    #[default]
    Active,
    /// Temporarily stopped
    Paused,
    /// Done
    Completed,
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        })
    }
}

/// A job site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    /// Site name
    pub name: String,
    /// Address or description of the location
    pub location: String,
    /// Current status
    pub status: SiteStatus,
    /// When work started
    pub start_date: NaiveDate,
}

/// Assignment of an employee to a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteEmployee {
    /// Site id
    pub site_id: String,
    /// Employee id
    pub employee_id: String,
    /// Role on this site
    pub role: String,
    /// Shift label
    pub shift: String,
    /// Contact number for this assignment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    /// First day on site
    pub start_date: NaiveDate,
}

/// A delivery to a site. Independent of the global [`Material`] inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMaterial {
    /// Site id
    pub site_id: String,
    /// Delivered material
    pub material_name: String,
    /// Delivered quantity
    pub quantity: f64,
    /// Delivery date
    pub delivery_date: NaiveDate,
    /// Supplier name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    /// Free-form notes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Progress of a site task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started
    #[default]
    Pending,
    /// Being worked on
    InProgress,
    /// Finished
    Completed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
        })
    }
}

/// A work item on a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteTask {
    /// Site id
    pub site_id: String,
    /// Short title
    pub title: String,
    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current status
    pub status: TaskStatus,
    /// Employee id of the assignee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    /// Planned start
    pub start_date: NaiveDate,
}

/// An uploaded document. `file_url` may embed the file as a data URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Title
    pub title: String,
    /// Description, may be empty
    #[serde(default)]
    pub description: String,
    /// Link or data URL
    pub file_url: String,
    /// MIME type
    pub file_type: String,
    /// Size in bytes
    pub file_size: u64,
    /// Upload time
    pub upload_date: DateTime<Utc>,
}

/// Link between a site and a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteDocument {
    /// Site id
    pub site_id: String,
    /// Document id
    pub document_id: String,
    /// When the link was made
    pub upload_date: DateTime<Utc>,
    /// Document category on this site (permit, plan, invoice...)
    #[serde(rename = "type")]
    pub kind: String,
}

/// A salary payment.
///
/// `employee_name` is free text, matched against [`Employee::name`] without
/// regard to case. Renaming an employee orphans their salary history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryRecord {
    /// Name of the paid employee
    pub employee_name: String,
    /// Amount paid
    pub salary_paid: f64,
    /// Payment proof, usually a data URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
    /// Payment date
    pub date: NaiveDate,
    /// Payment time
    pub time: NaiveTime,
}
