//! Shared test utilities for the ledger.
//!
//! Database setup plus record builders with sensible defaults. Builders return
//! plain record data; add them through an `EntityStore` or a `Ledger`.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{export::ExportContext, ledger::Ledger, store::EntityStore},
    errors::Result,
    models::{
        Document, Employee, Material, SalaryRecord, Site, SiteDocument, SiteEmployee,
        SiteMaterial, SiteStatus, SiteTask, TaskStatus, Transaction,
    },
};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all database-backed tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Opens an empty ledger on a fresh in-memory database.
pub async fn setup_ledger() -> Result<Ledger> {
    let db = setup_test_db().await?;
    Ledger::open(db, "test/store").await
}

/// Shorthand for a calendar date.
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn timestamp(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 9, 30, 0).unwrap()
}

/// A purchase dated 2024-03-01.
pub fn transaction(material_name: &str, amount: f64, quantity: f64) -> Transaction {
    Transaction {
        material_name: material_name.to_string(),
        amount,
        quantity,
        date: date(2024, 3, 1),
    }
}

/// An employee at "Main Yard" since 2024-01-01, still employed.
pub fn employee(name: &str) -> Employee {
    Employee {
        name: name.to_string(),
        site_location: "Main Yard".to_string(),
        start_date: date(2024, 1, 1),
        end_date: None,
        notes: None,
    }
}

/// An inventory entry; timestamps are filled in by the store.
pub fn material(material_name: &str, quantity: f64, site: &str) -> Material {
    Material {
        material_name: material_name.to_string(),
        quantity,
        unit: Some("pcs".to_string()),
        site: site.to_string(),
        ..Material::default()
    }
}

/// An active site started 2024-02-01.
pub fn site(name: &str) -> Site {
    Site {
        name: name.to_string(),
        location: format!("{name} Road 1"),
        status: SiteStatus::Active,
        start_date: date(2024, 2, 1),
    }
}

/// A pending, unassigned task.
pub fn site_task(site_id: &str, title: &str) -> SiteTask {
    SiteTask {
        site_id: site_id.to_string(),
        title: title.to_string(),
        description: None,
        status: TaskStatus::Pending,
        assigned_to: None,
        start_date: date(2024, 3, 4),
    }
}

/// A delivery on 2024-03-02 without supplier.
pub fn site_material(site_id: &str, material_name: &str, quantity: f64) -> SiteMaterial {
    SiteMaterial {
        site_id: site_id.to_string(),
        material_name: material_name.to_string(),
        quantity,
        delivery_date: date(2024, 3, 2),
        supplier: None,
        notes: None,
    }
}

/// A payment made 2024-03-31 at 17:00.
pub fn salary_record(employee_name: &str, salary_paid: f64) -> SalaryRecord {
    SalaryRecord {
        employee_name: employee_name.to_string(),
        salary_paid,
        screenshot: None,
        date: date(2024, 3, 31),
        time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
    }
}

/// A document uploaded 2024-02-10 with the given link or data URL.
pub fn document(file_url: &str) -> Document {
    Document {
        title: "Site photo".to_string(),
        description: String::new(),
        file_url: file_url.to_string(),
        file_type: "application/octet-stream".to_string(),
        file_size: u64::try_from(file_url.len()).unwrap(),
        upload_date: timestamp(2024, 2, 10),
    }
}

/// Export context with fixed values.
pub fn export_context() -> ExportContext {
    ExportContext {
        user_id: "test-user".to_string(),
        dark_mode: false,
        language: "en".to_string(),
        app_version: "0.0.0-test".to_string(),
        exported_on: timestamp(2024, 4, 1),
    }
}

/// A store with at least one record in every collection and every join row
/// pointing at an existing record.
pub fn populated_store() -> EntityStore {
    let mut store = EntityStore::new();

    store.add(transaction("Copper Wire", 500.0, 10.0)).unwrap();
    store.add(transaction("Copper Wire", 300.0, 5.0)).unwrap();
    store.add(transaction("Breaker", 45.5, 3.0)).unwrap();

    let ana = store.add(employee("Ana Lima")).unwrap();
    let mut bo = employee("Bo Chen");
    bo.end_date = Some(date(2024, 6, 30));
    bo.notes = Some("Seasonal".to_string());
    store.add(bo).unwrap();

    store
        .add_at(material("Conduit", 40.0, "North Yard"), timestamp(2024, 3, 1))
        .unwrap();

    let north = store.add(site("North Yard")).unwrap();
    store
        .add(SiteEmployee {
            site_id: north.id.clone(),
            employee_id: ana.id.clone(),
            role: "Electrician".to_string(),
            shift: "Day".to_string(),
            contact: Some("+15550100".to_string()),
            start_date: date(2024, 2, 5),
        })
        .unwrap();

    let mut delivery = site_material(&north.id, "Conduit", 20.0);
    delivery.supplier = Some("Acme Supply".to_string());
    store.add(delivery).unwrap();

    let mut task = site_task(&north.id, "Pull cable");
    task.status = TaskStatus::InProgress;
    task.assigned_to = Some(ana.id.clone());
    store.add(task).unwrap();

    let permit = store
        .add(Document {
            title: "Building permit".to_string(),
            description: String::new(),
            file_url: "data:application/pdf;base64,JVBERi0=".to_string(),
            file_type: "application/pdf".to_string(),
            file_size: 2048,
            upload_date: timestamp(2024, 2, 10),
        })
        .unwrap();
    store
        .add(SiteDocument {
            site_id: north.id.clone(),
            document_id: permit.id.clone(),
            upload_date: timestamp(2024, 2, 11),
            kind: "permit".to_string(),
        })
        .unwrap();

    store.add(salary_record("Ana Lima", 1200.0)).unwrap();

    store
}
