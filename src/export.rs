use std::io::Write;

use chrono::FixedOffset;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};
use serde_json::Value;
use thiserror::Error;

use crate::catalog::{record_id, FieldKind, Record, Resource};
use crate::dates;
use crate::search::stringify;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf error: {0}")]
    Pdf(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Pdf => "pdf",
        }
    }
}

/// Cell text for one field of a record, dates in `DD/MM/YYYY`
pub fn display_cell(record: &Record, name: &str, kind: FieldKind, offset: FixedOffset) -> String {
    match record.get(name) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) if kind == FieldKind::Date => dates::to_display_date(s, offset),
        Some(value) => stringify(value),
    }
}

fn header(resource: &Resource) -> Vec<String> {
    let mut header = vec!["ID".to_string()];
    header.extend(resource.fields.iter().map(|f| f.label.to_string()));
    header
}

fn row(record: &Record, resource: &Resource, offset: FixedOffset) -> Vec<String> {
    let mut row = vec![record_id(record).unwrap_or_default()];
    row.extend(resource.fields.iter().map(|f| display_cell(record, f.name, f.kind, offset)));
    row
}

/// Write the records as CSV, one column per declared field plus the id
pub fn write_csv<W: Write>(
    writer: W,
    resource: &Resource,
    records: &[&Record],
    offset: FixedOffset,
) -> Result<usize, ExportError> {
    let mut csv = csv::Writer::from_writer(writer);

    csv.write_record(header(resource))?;
    for record in records {
        csv.write_record(row(record, resource, offset))?;
    }

    csv.flush()?;
    Ok(records.len())
}

pub fn write_json<W: Write>(mut writer: W, records: &[&Record]) -> Result<usize, ExportError> {
    serde_json::to_writer_pretty(&mut writer, records)?;
    writeln!(writer)?;
    Ok(records.len())
}

// Landscape A4, millimetres
const PAGE_WIDTH: f32 = 297.0;
const PAGE_HEIGHT: f32 = 210.0;
const MARGIN: f32 = 10.0;
const LINE_HEIGHT: f32 = 6.0;
const FONT_SIZE: f32 = 8.0;
const TITLE_SIZE: f32 = 14.0;
const PT_TO_MM: f32 = 0.3528;

fn pdf_error(err: impl std::fmt::Display) -> ExportError {
    ExportError::Pdf(err.to_string())
}

/// Cut a cell to what fits its column, Helvetica glyphs averaging half an em
fn fit(cell: &str, column_width: f32) -> String {
    let max_chars = (column_width / (FONT_SIZE * 0.5 * PT_TO_MM)).floor() as usize;
    if cell.chars().count() <= max_chars {
        return cell.to_string();
    }
    let kept: String = cell.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn draw_row(layer: &PdfLayerReference, cells: &[String], y: f32, column_width: f32, font: &IndirectFontRef) {
    for (i, cell) in cells.iter().enumerate() {
        let x = MARGIN + column_width * i as f32;
        layer.use_text(fit(cell, column_width), FONT_SIZE, Mm(x), Mm(y), font);
    }
}

/// Write the records as a paged PDF table with the same columns as the CSV.
/// The label header is repeated on every page.
pub fn write_pdf<W: Write>(
    mut writer: W,
    resource: &Resource,
    records: &[&Record],
    offset: FixedOffset,
) -> Result<usize, ExportError> {
    let (doc, page, layer) = PdfDocument::new(resource.name, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Table");
    let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_error)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_error)?;

    let header = header(resource);
    let column_width = (PAGE_WIDTH - 2.0 * MARGIN) / header.len() as f32;

    let mut current = doc.get_page(page).get_layer(layer);
    let title_y = PAGE_HEIGHT - MARGIN - TITLE_SIZE * PT_TO_MM;
    current.use_text(resource.name, TITLE_SIZE, Mm(MARGIN), Mm(title_y), &bold);
    let mut y = title_y - 2.0 * LINE_HEIGHT;
    draw_row(&current, &header, y, column_width, &bold);
    y -= LINE_HEIGHT;

    for record in records {
        if y < MARGIN {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Table");
            current = doc.get_page(page).get_layer(layer);
            y = PAGE_HEIGHT - MARGIN - LINE_HEIGHT;
            draw_row(&current, &header, y, column_width, &bold);
            y -= LINE_HEIGHT;
        }
        draw_row(&current, &row(record, resource, offset), y, column_width, &font);
        y -= LINE_HEIGHT;
    }

    let bytes = doc.save_to_bytes().map_err(pdf_error)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(records.len())
}

pub fn write<W: Write>(
    format: ExportFormat,
    writer: W,
    resource: &Resource,
    records: &[&Record],
    offset: FixedOffset,
) -> Result<usize, ExportError> {
    match format {
        ExportFormat::Csv => write_csv(writer, resource, records, offset),
        ExportFormat::Json => write_json(writer, records),
        ExportFormat::Pdf => write_pdf(writer, resource, records, offset),
    }
}
