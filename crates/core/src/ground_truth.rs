use crate::error::OutlineError;
use crate::models::{HeadingLevel, MatchOptions};
use crate::similarity::similarity_ratio;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Default, Deserialize)]
struct GroundTruthDocument {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    outline: Vec<GroundTruthItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GroundTruthItem {
    #[serde(default)]
    page: Option<i64>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    level: Option<String>,
}

pub trait HeadingMatcher {
    fn is_heading_match(&self, candidate: &str, reference: &str) -> bool;
}

#[derive(Debug, Clone, Copy)]
pub struct FuzzyHeadingMatcher {
    pub threshold: f64,
}

impl Default for FuzzyHeadingMatcher {
    fn default() -> Self {
        Self::from(MatchOptions::default())
    }
}

impl From<MatchOptions> for FuzzyHeadingMatcher {
    fn from(value: MatchOptions) -> Self {
        Self {
            threshold: value.similarity_threshold,
        }
    }
}

impl HeadingMatcher for FuzzyHeadingMatcher {
    fn is_heading_match(&self, candidate: &str, reference: &str) -> bool {
        let candidate = candidate.to_lowercase();
        let reference = reference.to_lowercase();

        candidate.contains(&reference)
            || reference.contains(&candidate)
            || similarity_ratio(&candidate, &reference) > self.threshold
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundTruthOutline {
    pages: BTreeMap<u32, Vec<(String, HeadingLevel)>>,
}

impl GroundTruthOutline {
    pub fn load(path: &Path) -> Result<Self, OutlineError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, OutlineError> {
        let document: GroundTruthDocument = serde_json::from_str(raw)?;
        let mut outline = Self::default();

        let title = document.title.as_deref().unwrap_or_default().trim();
        if !title.is_empty() {
            outline.insert(1, title, HeadingLevel::H1);
        }

        for item in document.outline {
            let page = item.page.and_then(|page| u32::try_from(page).ok()).unwrap_or(0);
            let text = item.text.as_deref().unwrap_or_default().trim();
            let level = item.level.as_deref().unwrap_or_default();
            if page == 0 || text.is_empty() || level.is_empty() {
                continue;
            }

            match level.parse::<HeadingLevel>() {
                Ok(level) => outline.insert(page, text, level),
                Err(reason) => warn!(page, text, %reason, "skipping ground-truth heading"),
            }
        }

        Ok(outline)
    }

    pub fn insert(&mut self, page: u32, text: &str, level: HeadingLevel) {
        let entries = self.pages.entry(page).or_default();
        match entries.iter_mut().find(|(existing, _)| existing == text) {
            Some(entry) => entry.1 = level,
            None => entries.push((text.to_string(), level)),
        }
    }

    pub fn headings_on(&self, page: u32) -> &[(String, HeadingLevel)] {
        self.pages.get(&page).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn match_line<M: HeadingMatcher + ?Sized>(
        &self,
        page: u32,
        text: &str,
        matcher: &M,
    ) -> Option<HeadingLevel> {
        self.headings_on(page)
            .iter()
            .find(|(reference, _)| matcher.is_heading_match(text, reference))
            .map(|(_, level)| *level)
    }
}
