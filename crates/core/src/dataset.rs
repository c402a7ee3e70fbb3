use crate::error::OutlineError;
use crate::extractor::PdfLineExtractor;
use crate::fallback::apply_fallback_levels;
use crate::ground_truth::{GroundTruthOutline, HeadingMatcher};
use crate::ingest::{discover_pdf_files, SkippedPdf};
use crate::models::{HeadingLevel, LabeledLine};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DatasetRow {
    pub page_num: u32,
    pub text: String,
    pub font_size: f64,
    pub font_name: String,
    pub is_bold: u8,
    pub is_italic: u8,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub is_heading: u8,
    pub heading_level: Option<HeadingLevel>,
}

impl From<LabeledLine> for DatasetRow {
    fn from(row: LabeledLine) -> Self {
        let line = row.line;
        Self {
            page_num: line.page_number,
            text: line.text,
            font_size: line.font_size,
            font_name: line.font_name,
            is_bold: u8::from(line.is_bold),
            is_italic: u8::from(line.is_italic),
            x0: line.bbox.x0,
            y0: line.bbox.y0,
            x1: line.bbox.x1,
            y1: line.bbox.y1,
            is_heading: u8::from(row.heading_level.is_some()),
            heading_level: row.heading_level,
        }
    }
}

#[derive(Debug, Default)]
pub struct DatasetReport {
    pub rows_written: usize,
    pub documents: usize,
    pub skipped_files: Vec<SkippedPdf>,
}

const DATASET_COLUMNS: [&str; 12] = [
    "page_num",
    "text",
    "font_size",
    "font_name",
    "is_bold",
    "is_italic",
    "x0",
    "y0",
    "x1",
    "y1",
    "is_heading",
    "heading_level",
];

pub fn ground_truth_path(pdf: &Path) -> PathBuf {
    pdf.with_extension("json")
}

/// Ground-truth labels only; the font-size fallback runs later over the
/// whole batch.
pub fn label_document<E, M>(
    pdf: &Path,
    extractor: &E,
    matcher: &M,
) -> Result<Vec<LabeledLine>, OutlineError>
where
    E: PdfLineExtractor + ?Sized,
    M: HeadingMatcher + ?Sized,
{
    let truth_path = ground_truth_path(pdf);
    let truth = if truth_path.is_file() {
        GroundTruthOutline::load(&truth_path)?
    } else {
        warn!(path = %truth_path.display(), "ground truth missing, using font-size fallback only");
        GroundTruthOutline::default()
    };

    let rows = extractor
        .extract_lines(pdf)?
        .into_iter()
        .map(|line| {
            let heading_level = truth.match_line(line.page_number, &line.text, matcher);
            LabeledLine {
                line,
                heading_level,
            }
        })
        .collect();

    Ok(rows)
}

pub fn generate_dataset<E, M>(
    input_dir: &Path,
    output_csv: &Path,
    extractor: &E,
    matcher: &M,
) -> Result<DatasetReport, OutlineError>
where
    E: PdfLineExtractor + ?Sized,
    M: HeadingMatcher + ?Sized,
{
    let files = discover_pdf_files(input_dir)?;

    let mut report = DatasetReport::default();
    let mut rows = Vec::new();
    for path in files {
        match label_document(&path, extractor, matcher) {
            Ok(document_rows) => {
                debug!(path = %path.display(), rows = document_rows.len(), "labelled document");
                rows.extend(document_rows);
                report.documents += 1;
            }
            Err(error) => report.skipped_files.push(SkippedPdf {
                path,
                reason: error.to_string(),
            }),
        }
    }

    // Page numbers are pooled across documents when ranking sizes.
    apply_fallback_levels(&mut rows);

    if let Some(parent) = output_csv.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(output_csv)?;
    writer.write_record(DATASET_COLUMNS)?;
    for row in rows {
        writer.serialize(DatasetRow::from(row))?;
        report.rows_written += 1;
    }

    writer.flush()?;
    Ok(report)
}
