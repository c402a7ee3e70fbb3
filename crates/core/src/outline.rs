use crate::classifier::HeadingClassifier;
use crate::error::OutlineError;
use crate::extractor::PdfLineExtractor;
use crate::features::{FeatureVector, LineFeatures};
use crate::models::{DocumentOutline, HeadingLevel, LineRecord, OutlineEntry, OutlineOptions};
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct HeadingCandidate {
    pub text: String,
    pub page: u32,
    pub font_size: f64,
    pub y0: f64,
}

impl From<&LineRecord> for HeadingCandidate {
    fn from(line: &LineRecord) -> Self {
        Self {
            text: line.text.clone(),
            page: line.page_number,
            font_size: line.font_size,
            y0: line.bbox.y0,
        }
    }
}

pub struct OutlineExtractor<E, C> {
    extractor: E,
    classifier: C,
    options: OutlineOptions,
}

impl<E, C> OutlineExtractor<E, C>
where
    E: PdfLineExtractor,
    C: HeadingClassifier,
{
    pub fn new(extractor: E, classifier: C) -> Self {
        Self::with_options(extractor, classifier, OutlineOptions::default())
    }

    pub fn with_options(extractor: E, classifier: C, options: OutlineOptions) -> Self {
        Self {
            extractor,
            classifier,
            options,
        }
    }

    pub fn extract_outline(&self, path: &Path) -> Result<DocumentOutline, OutlineError> {
        let lines = self.extractor.extract_lines(path)?;
        let outline = self.outline_from_lines(&lines)?;
        debug!(
            path = %path.display(),
            lines = lines.len(),
            headings = outline.outline.len(),
            "built outline"
        );
        Ok(outline)
    }

    pub fn outline_from_lines(&self, lines: &[LineRecord]) -> Result<DocumentOutline, OutlineError> {
        if lines.is_empty() {
            return Ok(DocumentOutline::empty());
        }

        let rows: Vec<FeatureVector> = lines
            .iter()
            .map(|line| LineFeatures::from_line(line).to_vector())
            .collect();
        let flags = self.classifier.predict(&rows)?;
        if flags.len() != rows.len() {
            return Err(OutlineError::PredictionCount {
                expected: rows.len(),
                actual: flags.len(),
            });
        }

        let candidates = lines
            .iter()
            .zip(flags)
            .filter(|(_, is_heading)| *is_heading)
            .map(|(line, _)| HeadingCandidate::from(line));

        let merged = merge_fragments(candidates, &self.options);
        Ok(build_outline(merged, &self.options))
    }
}

/// Joins consecutive candidates that share page and font size and sit less
/// than `merge_gap_factor` font sizes apart vertically.
pub fn merge_fragments(
    candidates: impl IntoIterator<Item = HeadingCandidate>,
    options: &OutlineOptions,
) -> Vec<HeadingCandidate> {
    let mut merged: Vec<HeadingCandidate> = Vec::new();

    for candidate in candidates {
        if let Some(previous) = merged.last_mut() {
            let adjacent = previous.page == candidate.page
                && previous.font_size == candidate.font_size
                && (candidate.y0 - previous.y0).abs()
                    < candidate.font_size * options.merge_gap_factor;
            if adjacent {
                if !previous.text.contains(&candidate.text) {
                    previous.text.push(' ');
                    previous.text.push_str(&candidate.text);
                }
                previous.y0 = candidate.y0;
                continue;
            }
        }
        merged.push(candidate);
    }

    merged
}

#[derive(Debug, Clone, PartialEq)]
pub struct SizeLevels {
    ranked: Vec<f64>,
}

impl SizeLevels {
    pub fn from_candidates(candidates: &[HeadingCandidate], options: &OutlineOptions) -> Self {
        let mut sizes = candidates
            .iter()
            .map(|candidate| candidate.font_size)
            .collect::<Vec<_>>();
        sizes.sort_by(|left, right| right.total_cmp(left));
        sizes.dedup();
        sizes.truncate(options.max_levels.clamp(1, HeadingLevel::ALL.len()));

        Self { ranked: sizes }
    }

    pub fn level_for(&self, font_size: f64) -> HeadingLevel {
        self.ranked
            .iter()
            .position(|size| *size == font_size)
            .and_then(HeadingLevel::from_rank)
            .unwrap_or(HeadingLevel::H6)
    }
}

pub fn assign_levels(merged: &[HeadingCandidate], options: &OutlineOptions) -> Vec<OutlineEntry> {
    let levels = SizeLevels::from_candidates(merged, options);
    merged
        .iter()
        .map(|candidate| OutlineEntry {
            level: levels.level_for(candidate.font_size),
            text: candidate.text.clone(),
            page: candidate.page,
        })
        .collect()
}

pub fn build_outline(merged: Vec<HeadingCandidate>, options: &OutlineOptions) -> DocumentOutline {
    let mut seen = HashSet::new();
    let mut outline = DocumentOutline::empty();

    for entry in assign_levels(&merged, options) {
        if !seen.insert(entry.text.clone()) {
            continue;
        }
        if entry.level == HeadingLevel::H1 && outline.title.is_empty() {
            outline.title = entry.text.clone();
        }
        outline.outline.push(entry);
    }

    outline
}
