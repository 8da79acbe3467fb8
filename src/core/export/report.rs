//! Paginated, human-readable report.
//!
//! Layout works like a printer: a vertical cursor in millimetres moves down an A4
//! page as lines are placed, and a new page starts once the next line (or the
//! next record block) would pass [`CONTENT_LIMIT_MM`]. The result is kept as
//! structured pages so callers can render it however they like;
//! [`Report::render_text`] produces the plain-text form.

use crate::core::{
    aggregation,
    export::{ExportContext, format_amount, metadata_rows},
    store::EntityStore,
    tables::{Cell, Table, abbreviate, all_tables, humanize},
};
use tracing::{info, instrument};

/// Where the first line of every page sits.
pub const TOP_MARGIN_MM: f32 = 20.0;

/// Nothing is placed below this line.
pub const CONTENT_LIMIT_MM: f32 = 270.0;

/// Visual weight of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    /// Report title
    Title,
    /// Section heading
    Heading,
    /// Ordinary text
    Body,
    /// Vertical gap
    Spacer,
}

impl LineStyle {
    /// Vertical space the line takes up.
    #[must_use]
    pub const fn height_mm(self) -> f32 {
        match self {
            Self::Title => 14.0,
            Self::Heading => 10.0,
            Self::Body => 6.0,
            Self::Spacer => 4.0,
        }
    }
}

/// One placed line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLine {
    /// Visual weight
    pub style: LineStyle,
    /// Content; empty for spacers
    pub text: String,
}

/// One page of placed lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportPage {
    /// Lines top to bottom
    pub lines: Vec<ReportLine>,
}

impl ReportPage {
    /// Cursor position after the last line.
    #[must_use]
    pub fn bottom_mm(&self) -> f32 {
        TOP_MARGIN_MM + self.lines.iter().map(|l| l.style.height_mm()).sum::<f32>()
    }
}

/// A laid-out report.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Pages in order; never empty
    pub pages: Vec<ReportPage>,
}

impl Report {
    /// Plain text: pages separated by form feeds, each ending in a
    /// `Page i of n` footer.
    #[must_use]
    pub fn render_text(&self) -> String {
        let total = self.pages.len();
        self.pages
            .iter()
            .enumerate()
            .map(|(i, page)| {
                let mut text = String::new();
                for line in &page.lines {
                    match line.style {
                        LineStyle::Title => {
                            text.push_str(&line.text.to_uppercase());
                            text.push('\n');
                            text.push_str(&"=".repeat(line.text.chars().count()));
                        }
                        LineStyle::Heading => {
                            text.push_str(&line.text);
                            text.push('\n');
                            text.push_str(&"-".repeat(line.text.chars().count()));
                        }
                        LineStyle::Body | LineStyle::Spacer => text.push_str(&line.text),
                    }
                    text.push('\n');
                }
                text.push_str(&format!("\nPage {} of {total}\n", i + 1));
                text
            })
            .collect::<Vec<_>>()
            .join("\u{c}")
    }
}

struct Layout {
    pages: Vec<ReportPage>,
    current: ReportPage,
    cursor: f32,
}

impl Layout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: ReportPage::default(),
            cursor: TOP_MARGIN_MM,
        }
    }

    fn at_top(&self) -> bool {
        self.current.lines.is_empty()
    }

    fn new_page(&mut self) {
        if self.at_top() {
            return;
        }
        self.pages.push(std::mem::take(&mut self.current));
        self.cursor = TOP_MARGIN_MM;
    }

    fn line(&mut self, style: LineStyle, text: impl Into<String>) {
        if self.cursor + style.height_mm() > CONTENT_LIMIT_MM {
            self.new_page();
        }
        // Spacers are dropped at the top of a page
        if style == LineStyle::Spacer && self.at_top() {
            return;
        }
        self.current.lines.push(ReportLine {
            style,
            text: text.into(),
        });
        self.cursor += style.height_mm();
    }

    /// Places `lines` on one page unless the block is taller than a page.
    fn block(&mut self, lines: Vec<(LineStyle, String)>) {
        let height: f32 = lines.iter().map(|(style, _)| style.height_mm()).sum();
        if self.cursor + height > CONTENT_LIMIT_MM {
            self.new_page();
        }
        for (style, text) in lines {
            self.line(style, text);
        }
    }

    fn finish(mut self) -> Vec<ReportPage> {
        if !self.at_top() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

fn summary_page(layout: &mut Layout, store: &EntityStore, context: &ExportContext) {
    layout.line(LineStyle::Title, "Site Ledger Report");
    layout.line(LineStyle::Spacer, "");
    for (field, value) in metadata_rows(store, context) {
        layout.line(LineStyle::Body, format!("{field}: {value}"));
    }

    let orphans = store.orphaned_rows();
    if !orphans.is_empty() {
        layout.line(LineStyle::Spacer, "");
        layout.line(
            LineStyle::Body,
            format!("Join rows with a missing site, employee or document: {}", orphans.len()),
        );
    }
}

fn material_usage_section(layout: &mut Layout, store: &EntityStore) {
    layout.line(LineStyle::Heading, "Material Usage");
    let usage = aggregation::material_usage(store);
    if usage.is_empty() {
        layout.line(LineStyle::Body, "No transactions recorded.");
        return;
    }

    layout.line(
        LineStyle::Body,
        format!(
            "{:<28} {:>10} {:>14} {:>12}",
            "Material", "Quantity", "Total Cost", "Avg Cost"
        ),
    );
    for row in usage {
        layout.line(
            LineStyle::Body,
            format!(
                "{:<28} {:>10} {:>14} {:>12}",
                row.material_name,
                row.total_quantity,
                format_amount(row.total_cost),
                format_amount(row.average_cost)
            ),
        );
    }
}

/// Longer values, such as embedded files, are shortened in record blocks.
const MAX_VALUE_CHARS: usize = 120;

fn record_block(table: &Table, row: &[Cell]) -> Vec<(LineStyle, String)> {
    let mut lines: Vec<(LineStyle, String)> = table
        .columns
        .iter()
        .zip(row)
        .filter(|(_, cell)| !cell.is_empty())
        .map(|(column, cell)| {
            let value = cell.to_string();
            let value = abbreviate(&value, MAX_VALUE_CHARS);
            (LineStyle::Body, format!("{}: {value}", humanize(column)))
        })
        .collect();
    lines.push((LineStyle::Spacer, String::new()));
    lines
}

fn collection_section(layout: &mut Layout, table: &Table) {
    let mut rows = table.rows.iter();
    let Some(first) = rows.next() else {
        return;
    };

    // Keep the heading on the same page as the first record
    let mut opening = vec![(
        LineStyle::Heading,
        format!("{} ({})", table.collection.sheet_name(), table.rows.len()),
    )];
    opening.extend(record_block(table, first));
    layout.block(opening);

    for row in rows {
        layout.block(record_block(table, row));
    }
}

/// Lays out the report: summary page, material usage, then one section per
/// non-empty collection.
#[must_use]
pub fn build_report(store: &EntityStore, context: &ExportContext) -> Report {
    let mut layout = Layout::new();
    summary_page(&mut layout, store, context);

    layout.new_page();
    material_usage_section(&mut layout, store);

    for table in all_tables(store) {
        collection_section(&mut layout, &table);
    }

    Report {
        pages: layout.finish(),
    }
}

/// Renders the report as UTF-8 text.
#[instrument(skip_all, fields(records = store.total_records()))]
pub fn export_report(store: &EntityStore, context: &ExportContext) -> Vec<u8> {
    let report = build_report(store, context);
    info!("Exported report with {} pages", report.pages.len());
    report.render_text().into_bytes()
}
