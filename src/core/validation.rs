//! Field constraints checked before a record reaches the store.
//!
//! A record that fails validation is rejected whole; the store is not touched.

use crate::{
    errors::{Error, Result},
    models::{
        Document, Employee, Material, SalaryRecord, Site, SiteDocument, SiteEmployee,
        SiteMaterial, SiteTask, Transaction,
    },
};

/// Field-level constraints of a record kind.
pub trait Validate {
    /// Returns the first violated constraint, if any.
    fn validate(&self) -> Result<()>;
}

fn require_text(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "must not be empty"));
    }
    Ok(())
}

fn require_positive(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::validation(
            field,
            format!("must be a positive number, got {value}"),
        ));
    }
    Ok(())
}

fn require_non_negative(field: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(Error::validation(
            field,
            format!("must not be negative, got {value}"),
        ));
    }
    Ok(())
}

impl Validate for Transaction {
    fn validate(&self) -> Result<()> {
        require_text("materialName", &self.material_name)?;
        require_positive("amount", self.amount)?;
        require_positive("quantity", self.quantity)
    }
}

impl Validate for Employee {
    fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_text("siteLocation", &self.site_location)?;
        if let Some(end_date) = self.end_date
            && end_date < self.start_date
        {
            return Err(Error::validation(
                "endDate",
                format!("{end_date} is before start date {}", self.start_date),
            ));
        }
        Ok(())
    }
}

impl Validate for Material {
    fn validate(&self) -> Result<()> {
        require_text("materialName", &self.material_name)?;
        require_text("site", &self.site)?;
        require_non_negative("quantity", self.quantity)
    }
}

impl Validate for Site {
    fn validate(&self) -> Result<()> {
        require_text("name", &self.name)?;
        require_text("location", &self.location)
    }
}

impl Validate for SiteEmployee {
    fn validate(&self) -> Result<()> {
        require_text("siteId", &self.site_id)?;
        require_text("employeeId", &self.employee_id)?;
        require_text("role", &self.role)?;
        require_text("shift", &self.shift)
    }
}

impl Validate for SiteMaterial {
    fn validate(&self) -> Result<()> {
        require_text("siteId", &self.site_id)?;
        require_text("materialName", &self.material_name)?;
        require_positive("quantity", self.quantity)
    }
}

impl Validate for SiteTask {
    fn validate(&self) -> Result<()> {
        require_text("siteId", &self.site_id)?;
        require_text("title", &self.title)
    }
}

impl Validate for Document {
    fn validate(&self) -> Result<()> {
        require_text("title", &self.title)?;
        require_text("fileUrl", &self.file_url)?;
        require_text("fileType", &self.file_type)
    }
}

impl Validate for SiteDocument {
    fn validate(&self) -> Result<()> {
        require_text("siteId", &self.site_id)?;
        require_text("documentId", &self.document_id)?;
        require_text("type", &self.kind)
    }
}

impl Validate for SalaryRecord {
    fn validate(&self) -> Result<()> {
        require_text("employeeName", &self.employee_name)?;
        require_positive("salaryPaid", self.salary_paid)
    }
}
