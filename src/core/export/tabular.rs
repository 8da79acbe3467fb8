//! Spreadsheet workbook: one sheet per collection plus `Export Metadata`.

use crate::{
    core::{
        export::{ExportContext, metadata_rows},
        store::EntityStore,
        tables::{Cell, Table, abbreviate, all_tables},
    },
    errors::Result,
    models::Collection,
};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::{info, instrument};

/// Longest string a worksheet cell accepts.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Name of the trailing metadata sheet.
pub const METADATA_SHEET: &str = "Export Metadata";

/// Sheet names in workbook order.
#[must_use]
pub fn sheet_names() -> Vec<&'static str> {
    Collection::ALL
        .iter()
        .map(|c| c.sheet_name())
        .chain(std::iter::once(METADATA_SHEET))
        .collect()
}

fn write_table(sheet: &mut Worksheet, table: &Table, header: &Format) -> Result<()> {
    for (col, name) in (0u16..).zip(table.columns) {
        sheet.write_string_with_format(0, col, *name, header)?;
    }

    for (row, cells) in (1u32..).zip(&table.rows) {
        for (col, cell) in (0u16..).zip(cells) {
            match cell {
                Cell::Text(text) => {
                    sheet.write_string(row, col, abbreviate(text, MAX_CELL_CHARS).as_ref())?;
                }
                Cell::Number(number) => {
                    sheet.write_number(row, col, *number)?;
                }
                Cell::Empty => {}
            }
        }
    }
    Ok(())
}

/// Builds the workbook in memory. Empty collections still get a sheet with
/// just the header row.
#[instrument(skip_all, fields(records = store.total_records()))]
pub fn export_workbook(store: &EntityStore, context: &ExportContext) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    for table in all_tables(store) {
        let sheet = workbook.add_worksheet();
        sheet.set_name(table.collection.sheet_name())?;
        write_table(sheet, &table, &header)?;
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name(METADATA_SHEET)?;
    sheet.write_string_with_format(0, 0, "Field", &header)?;
    sheet.write_string_with_format(0, 1, "Value", &header)?;
    for (row, (field, value)) in (1u32..).zip(metadata_rows(store, context)) {
        sheet.write_string(row, 0, field)?;
        sheet.write_string(row, 1, value)?;
    }

    let bytes = workbook.save_to_buffer()?;
    info!("Exported workbook ({} bytes)", bytes.len());
    Ok(bytes)
}
