//! Patient report: one-page PDF summary of a classification.
//!
//! Field order is fixed: title, name, age, prediction, confidence,
//! specialist, explanation. PDF generation via `printpdf`.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::Local;
use printpdf::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::care::{CareRecommendation, Label};
use crate::config::REPORT_FILE_NAME;

pub const REPORT_TITLE: &str = "Chest X-ray Disease Prediction Report";

const DISCLAIMER: &str = "This report is generated by an automated image classifier and is not \
                          a medical diagnosis. Please consult a qualified doctor.";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Report generation failed: {0}")]
    GenerationFailed(String),

    #[error("Cannot write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything printed on the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportFields {
    pub name: String,
    pub age: u32,
    pub label: Label,
    pub confidence_percent: f64,
    pub specialist: String,
    pub explanation: String,
}

impl ReportFields {
    pub fn from_recommendation(name: &str, age: u32, rec: &CareRecommendation) -> Self {
        Self {
            name: name.trim().to_string(),
            age,
            label: rec.label,
            confidence_percent: rec.confidence_percent,
            specialist: rec.specialist.clone(),
            explanation: rec.explanation.clone(),
        }
    }

    /// Text lines in print order, before wrapping.
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Patient Name: {}", self.name),
            format!("Age: {}", self.age),
            format!("Prediction: {}", self.label),
            format!("Confidence: {:.2}%", self.confidence_percent),
            format!("Recommended Specialist: {}", self.specialist),
            format!("About: {}", self.explanation),
        ]
    }
}

/// Longest patient name accepted on a report.
pub const MAX_PATIENT_NAME_CHARS: usize = 100;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const TOP_MM: f32 = 280.0;
const BOTTOM_MARGIN_MM: f32 = 15.0;
const LEFT_MM: f32 = 20.0;

/// A line of text placed on a page, before drawing.
#[derive(Debug, Clone, PartialEq)]
struct PlacedLine {
    page: usize,
    y_mm: f32,
    size: f32,
    bold: bool,
    text: String,
}

/// Top-down cursor that moves to a fresh page once the bottom margin is hit.
struct Cursor {
    page: usize,
    y_mm: f32,
    placed: Vec<PlacedLine>,
}

impl Cursor {
    fn new() -> Self {
        Self {
            page: 0,
            y_mm: TOP_MM,
            placed: Vec::new(),
        }
    }

    fn place(&mut self, text: String, size: f32, bold: bool, advance_mm: f32) {
        if self.y_mm < BOTTOM_MARGIN_MM {
            self.page += 1;
            self.y_mm = TOP_MM;
        }
        self.placed.push(PlacedLine {
            page: self.page,
            y_mm: self.y_mm,
            size,
            bold,
            text,
        });
        self.y_mm -= advance_mm;
    }

    fn gap(&mut self, mm: f32) {
        self.y_mm -= mm;
    }
}

fn layout(fields: &ReportFields, generated: &str) -> Vec<PlacedLine> {
    let mut cursor = Cursor::new();

    cursor.place(REPORT_TITLE.to_string(), 16.0, true, 12.0);

    for line in fields.lines() {
        for wrapped in wrap_text(&line, 85) {
            cursor.place(wrapped, 11.0, false, 6.0);
        }
        cursor.gap(2.0);
    }

    cursor.gap(8.0);
    cursor.place(generated.to_string(), 8.0, false, 4.5);
    for line in wrap_text(DISCLAIMER, 100) {
        cursor.place(line, 7.0, false, 3.5);
    }

    cursor.placed
}

/// Renders the report. Returns PDF bytes.
///
/// Content that does not fit continues on additional pages.
pub fn render_report(fields: &ReportFields) -> Result<Vec<u8>, ReportError> {
    let (doc, page1, layer1) =
        PdfDocument::new(REPORT_TITLE, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let mut layers = vec![doc.get_page(page1).get_layer(layer1)];
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::GenerationFailed(format!("PDF font error: {e}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::GenerationFailed(format!("PDF font error: {e}")))?;

    let generated = format!("Generated: {}", Local::now().format("%Y-%m-%d %H:%M"));
    for line in layout(fields, &generated) {
        while layers.len() <= line.page {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
            layers.push(doc.get_page(page).get_layer(layer));
        }
        let face = if line.bold { &bold } else { &font };
        layers[line.page].use_text(&line.text, line.size, Mm(LEFT_MM), Mm(line.y_mm), face);
    }
    if layers.len() > 1 {
        tracing::debug!(pages = layers.len(), "Report spans several pages");
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| ReportError::GenerationFailed(format!("PDF save error: {e}")))?;
    buf.into_inner()
        .map_err(|e| ReportError::GenerationFailed(format!("PDF buffer error: {e}")))
}

/// Writes the report into `dir`, replacing the previous one.
pub fn write_report(pdf_bytes: &[u8], dir: &Path) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(REPORT_FILE_NAME);
    std::fs::write(&path, pdf_bytes)?;
    tracing::info!(path = %path.display(), bytes = pdf_bytes.len(), "Report written");
    Ok(path)
}

/// Simple word-wrap helper for PDF text rendering. Words longer than
/// `max_chars` are split.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let max_chars = max_chars.max(1);

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for piece in chars.chunks(max_chars) {
            let piece: String = piece.iter().collect();
            let piece_len = piece.chars().count();
            let current_len = current.chars().count();
            if current_len + piece_len + 1 > max_chars && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&piece);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
