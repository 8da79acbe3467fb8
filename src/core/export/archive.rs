//! Delimited archive: one CSV per non-empty collection plus `metadata.csv`, zipped.
//!
//! Unlike the structured snapshot, empty collections are left out of the archive.

use crate::{
    core::{
        export::{ExportContext, metadata_rows},
        store::EntityStore,
        tables::{Table, all_tables},
    },
    errors::{Error, Result},
};
use std::io::{Cursor, Write};
use tracing::{debug, info, instrument};
use zip::{ZipWriter, write::SimpleFileOptions};

/// Name of the metadata file inside the archive.
pub const METADATA_FILE: &str = "metadata.csv";

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer.into_inner().map_err(|e| Error::Export {
        message: format!("Could not flush CSV: {e}"),
    })
}

/// Encodes a table as CSV with a header row.
pub fn table_csv(table: &Table) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(ToString::to_string))?;
    }
    finish_csv(writer)
}

fn metadata_csv(store: &EntityStore, context: &ExportContext) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["field", "value"])?;
    for (field, value) in metadata_rows(store, context) {
        writer.write_record([field, value])?;
    }
    finish_csv(writer)
}

/// Builds the zip archive in memory.
#[instrument(skip_all, fields(records = store.total_records()))]
pub fn export_archive(store: &EntityStore, context: &ExportContext) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut files = 0;
    for table in all_tables(store).iter().filter(|t| !t.is_empty()) {
        zip.start_file(table.collection.file_name(), options)?;
        zip.write_all(&table_csv(table)?)?;
        debug!(
            "Wrote {} ({} rows)",
            table.collection.file_name(),
            table.rows.len()
        );
        files += 1;
    }

    zip.start_file(METADATA_FILE, options)?;
    zip.write_all(&metadata_csv(store, context)?)?;
    zip.finish()?;

    info!("Exported archive with {files} collection files");
    Ok(buffer.into_inner())
}
