//! In-memory entity store.
//!
//! Holds the ten collections and implements add/update/delete for any record kind
//! through the [`Recordable`] trait. This layer is synchronous and knows nothing
//! about persistence; [`crate::core::ledger::Ledger`] wraps it with locking and
//! durable writes.

use crate::{
    core::validation::Validate,
    errors::Result,
    models::{
        Collection, Document, Employee, Material, Record, SalaryRecord, Site, SiteDocument,
        SiteEmployee, SiteMaterial, SiteTask, Transaction,
    },
};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::{collections::HashSet, fmt::Debug};
use tracing::{debug, warn};

/// Result of an update or delete addressed by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The record was found and changed
    Applied,
    /// No record carries that id; nothing changed
    NotFound,
}

impl MutationOutcome {
    /// True when the store was changed.
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// A record kind that lives in one of the store's collections.
pub trait Recordable:
    Validate + Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The collection holding this kind
    const COLLECTION: Collection;

    /// Shared access to the collection
    fn records(store: &EntityStore) -> &Vec<Record<Self>>;

    /// Exclusive access to the collection
    fn records_mut(store: &mut EntityStore) -> &mut Vec<Record<Self>>;

    /// Called once before a new record is stored.
    fn on_create(&mut self, _now: DateTime<Utc>) {}

    /// Called before `self` replaces `previous`.
    fn on_update(&mut self, _previous: &Self, _now: DateTime<Utc>) {}
}

/// All collections, in snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityStore {
    /// Material purchases
    pub transactions: Vec<Record<Transaction>>,
    /// Workforce
    pub employees: Vec<Record<Employee>>,
    /// Inventory
    pub materials: Vec<Record<Material>>,
    /// Job sites
    pub sites: Vec<Record<Site>>,
    /// Site assignments
    pub site_employees: Vec<Record<SiteEmployee>>,
    /// Site deliveries
    pub site_materials: Vec<Record<SiteMaterial>>,
    /// Site tasks
    pub site_tasks: Vec<Record<SiteTask>>,
    /// Site document links
    pub site_documents: Vec<Record<SiteDocument>>,
    /// Documents
    pub documents: Vec<Record<Document>>,
    /// Salary payments
    pub salary_records: Vec<Record<SalaryRecord>>,
}

/// Generates a fresh record id.
#[must_use]
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl EntityStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates `data`, assigns a fresh id and appends it to its collection.
    ///
    /// Identical field values added twice produce two distinct records.
    pub fn add<T: Recordable>(&mut self, data: T) -> Result<Record<T>> {
        self.add_at(data, Utc::now())
    }

    /// [`EntityStore::add`] with an explicit clock reading.
    pub fn add_at<T: Recordable>(&mut self, mut data: T, now: DateTime<Utc>) -> Result<Record<T>> {
        data.validate()?;
        data.on_create(now);

        let record = Record {
            id: new_record_id(),
            data,
        };
        T::records_mut(self).push(record.clone());
        debug!("Added {} record {}", T::COLLECTION, record.id);
        Ok(record)
    }

    /// Replaces the record carrying `record.id`.
    ///
    /// Validation failures are errors. A missing id is reported as
    /// [`MutationOutcome::NotFound`] and leaves the store unchanged.
    pub fn update<T: Recordable>(&mut self, record: Record<T>) -> Result<MutationOutcome> {
        self.update_at(record, Utc::now())
    }

    /// [`EntityStore::update`] with an explicit clock reading.
    pub fn update_at<T: Recordable>(
        &mut self,
        mut record: Record<T>,
        now: DateTime<Utc>,
    ) -> Result<MutationOutcome> {
        record.data.validate()?;

        let Some(slot) = T::records_mut(self)
            .iter_mut()
            .find(|existing| existing.id == record.id)
        else {
            warn!(
                "Update of {} record {} ignored: no such id",
                T::COLLECTION,
                record.id
            );
            return Ok(MutationOutcome::NotFound);
        };

        record.data.on_update(&slot.data, now);
        *slot = record;
        debug!("Updated {} record {}", T::COLLECTION, slot.id);
        Ok(MutationOutcome::Applied)
    }

    /// Removes the record with `id`. Related join rows are left in place.
    pub fn delete<T: Recordable>(&mut self, id: &str) -> MutationOutcome {
        let records = T::records_mut(self);
        let before = records.len();
        records.retain(|record| record.id != id);

        if records.len() == before {
            warn!("Delete of {} record {id} ignored: no such id", T::COLLECTION);
            MutationOutcome::NotFound
        } else {
            debug!("Deleted {} record {id}", T::COLLECTION);
            MutationOutcome::Applied
        }
    }

    /// Looks a record up by id.
    #[must_use]
    pub fn get<T: Recordable>(&self, id: &str) -> Option<&Record<T>> {
        T::records(self).iter().find(|record| record.id == id)
    }

    /// All records of one kind, in insertion order.
    #[must_use]
    pub fn records<T: Recordable>(&self) -> &[Record<T>] {
        T::records(self)
    }

    /// Number of records in `collection`.
    #[must_use]
    pub fn count(&self, collection: Collection) -> usize {
        match collection {
            Collection::Transactions => self.transactions.len(),
            Collection::Employees => self.employees.len(),
            Collection::Materials => self.materials.len(),
            Collection::Sites => self.sites.len(),
            Collection::SiteEmployees => self.site_employees.len(),
            Collection::SiteMaterials => self.site_materials.len(),
            Collection::SiteTasks => self.site_tasks.len(),
            Collection::SiteDocuments => self.site_documents.len(),
            Collection::Documents => self.documents.len(),
            Collection::SalaryRecords => self.salary_records.len(),
        }
    }

    /// Per-collection record counts in snapshot order.
    #[must_use]
    pub fn record_counts(&self) -> Vec<(Collection, usize)> {
        Collection::ALL
            .iter()
            .map(|&collection| (collection, self.count(collection)))
            .collect()
    }

    /// Records across every collection.
    #[must_use]
    pub fn total_records(&self) -> usize {
        Collection::ALL.iter().map(|&c| self.count(c)).sum()
    }

    /// Empties one collection.
    pub fn clear_collection(&mut self, collection: Collection) {
        match collection {
            Collection::Transactions => self.transactions.clear(),
            Collection::Employees => self.employees.clear(),
            Collection::Materials => self.materials.clear(),
            Collection::Sites => self.sites.clear(),
            Collection::SiteEmployees => self.site_employees.clear(),
            Collection::SiteMaterials => self.site_materials.clear(),
            Collection::SiteTasks => self.site_tasks.clear(),
            Collection::SiteDocuments => self.site_documents.clear(),
            Collection::Documents => self.documents.clear(),
            Collection::SalaryRecords => self.salary_records.clear(),
        }
    }

    /// Empties every collection.
    pub fn clear(&mut self) {
        for collection in Collection::ALL {
            self.clear_collection(collection);
        }
    }

    /// Join rows whose referenced site, employee or document no longer exists.
    ///
    /// Deletes never cascade, so these accumulate over time.
    #[must_use]
    pub fn orphaned_rows(&self) -> OrphanReport {
        let sites: HashSet<&str> = self.sites.iter().map(|r| r.id.as_str()).collect();
        let employees: HashSet<&str> = self.employees.iter().map(|r| r.id.as_str()).collect();
        let documents: HashSet<&str> = self.documents.iter().map(|r| r.id.as_str()).collect();

        OrphanReport {
            site_employees: self
                .site_employees
                .iter()
                .filter(|r| {
                    !sites.contains(r.site_id.as_str())
                        || !employees.contains(r.employee_id.as_str())
                })
                .map(|r| r.id.clone())
                .collect(),
            site_materials: self
                .site_materials
                .iter()
                .filter(|r| !sites.contains(r.site_id.as_str()))
                .map(|r| r.id.clone())
                .collect(),
            site_tasks: self
                .site_tasks
                .iter()
                .filter(|r| !sites.contains(r.site_id.as_str()))
                .map(|r| r.id.clone())
                .collect(),
            site_documents: self
                .site_documents
                .iter()
                .filter(|r| {
                    !sites.contains(r.site_id.as_str())
                        || !documents.contains(r.document_id.as_str())
                })
                .map(|r| r.id.clone())
                .collect(),
        }
    }
}

/// Ids of join rows pointing at records that no longer exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrphanReport {
    /// Assignments with a missing site or employee
    pub site_employees: Vec<String>,
    /// Deliveries with a missing site
    pub site_materials: Vec<String>,
    /// Tasks with a missing site
    pub site_tasks: Vec<String>,
    /// Links with a missing site or document
    pub site_documents: Vec<String>,
}

impl OrphanReport {
    /// Total orphaned rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.site_employees.len()
            + self.site_materials.len()
            + self.site_tasks.len()
            + self.site_documents.len()
    }

    /// True when every join row resolves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Recordable for Transaction {
    const COLLECTION: Collection = Collection::Transactions;

    fn records(store: &EntityStore) -> &Vec<Record<Self>> {
        &store.transactions
    }

    fn records_mut(store: &mut EntityStore) -> &mut Vec<Record<Self>> {
        &mut store.transactions
    }
}

impl Recordable for Employee {
    const COLLECTION: Collection = Collection::Employees;

    fn records(store: &EntityStore) -> &Vec<Record<Self>> {
        &store.employees
    }

    fn records_mut(store: &mut EntityStore) -> &mut Vec<Record<Self>> {
        &mut store.employees
    }
}

impl Recordable for Material {
    const COLLECTION: Collection = Collection::Materials;

    fn records(store: &EntityStore) -> &Vec<Record<Self>> {
        &store.materials
    }

    fn records_mut(store: &mut EntityStore) -> &mut Vec<Record<Self>> {
        &mut store.materials
    }

    fn on_create(&mut self, now: DateTime<Utc>) {
        self.created_at = now;
        self.updated_at = now;
    }

    fn on_update(&mut self, previous: &Self, now: DateTime<Utc>) {
        self.created_at = previous.created_at;
        // updatedAt must strictly increase even if the clock did not move
        self.updated_at = if now > previous.updated_at {
            now
        } else {
            previous.updated_at + TimeDelta::microseconds(1)
        };
    }
}

impl Recordable for Site {
    const COLLECTION: Collection = Collection::Sites;

    fn records(store: &EntityStore) -> &Vec<Record<Self>> {
        &store.sites
    }

    fn records_mut(store: &mut EntityStore) -> &mut Vec<Record<Self>> {
        &mut store.sites
    }
}

impl Recordable for SiteEmployee {
    const COLLECTION: Collection = Collection::SiteEmployees;

    fn records(store: &EntityStore) -> &Vec<Record<Self>> {
        &store.site_employees
    }

    fn records_mut(store: &mut EntityStore) -> &mut Vec<Record<Self>> {
        &mut store.site_employees
    }
}

impl Recordable for SiteMaterial {
    const COLLECTION: Collection = Collection::SiteMaterials;

    fn records(store: &EntityStore) -> &Vec<Record<Self>> {
        &store.site_materials
    }

    fn records_mut(store: &mut EntityStore) -> &mut Vec<Record<Self>> {
        &mut store.site_materials
    }
}

impl Recordable for SiteTask {
    const COLLECTION: Collection = Collection::SiteTasks;

    fn records(store: &EntityStore) -> &Vec<Record<Self>> {
        &store.site_tasks
    }

    fn records_mut(store: &mut EntityStore) -> &mut Vec<Record<Self>> {
        &mut store.site_tasks
    }
}

impl Recordable for SiteDocument {
    const COLLECTION: Collection = Collection::SiteDocuments;

    fn records(store: &EntityStore) -> &Vec<Record<Self>> {
        &store.site_documents
    }

    fn records_mut(store: &mut EntityStore) -> &mut Vec<Record<Self>> {
        &mut store.site_documents
    }
}

impl Recordable for Document {
    const COLLECTION: Collection = Collection::Documents;

    fn records(store: &EntityStore) -> &Vec<Record<Self>> {
        &store.documents
    }

    fn records_mut(store: &mut EntityStore) -> &mut Vec<Record<Self>> {
        &mut store.documents
    }
}

impl Recordable for SalaryRecord {
    const COLLECTION: Collection = Collection::SalaryRecords;

    fn records(store: &EntityStore) -> &Vec<Record<Self>> {
        &store.salary_records
    }

    fn records_mut(store: &mut EntityStore) -> &mut Vec<Record<Self>> {
        &mut store.salary_records
    }
}
