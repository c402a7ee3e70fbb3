use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

/// One visually distinct text line on a page. Coordinates use a top-left
/// origin, so `y0` is the top edge and grows downward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineRecord {
    pub page_number: u32,
    pub text: String,
    pub font_size: f64,
    pub font_name: String,
    pub is_bold: bool,
    pub is_italic: bool,
    pub bbox: BoundingBox,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledLine {
    pub line: LineRecord,
    pub heading_level: Option<HeadingLevel>,
}

impl LabeledLine {
    pub fn unlabeled(line: LineRecord) -> Self {
        Self {
            line,
            heading_level: None,
        }
    }

    pub fn is_heading(&self) -> bool {
        self.heading_level.is_some()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl HeadingLevel {
    pub const ALL: [HeadingLevel; 6] = [
        HeadingLevel::H1,
        HeadingLevel::H2,
        HeadingLevel::H3,
        HeadingLevel::H4,
        HeadingLevel::H5,
        HeadingLevel::H6,
    ];

    pub fn from_rank(rank: usize) -> Option<Self> {
        Self::ALL.get(rank).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
            HeadingLevel::H4 => "H4",
            HeadingLevel::H5 => "H5",
            HeadingLevel::H6 => "H6",
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeadingLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|level| level.as_str().eq_ignore_ascii_case(normalized))
            .ok_or_else(|| format!("unknown heading level: {value:?}"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub text: String,
    pub page: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DocumentOutline {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
}

impl DocumentOutline {
    pub fn empty() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    pub similarity_threshold: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.7,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OutlineOptions {
    pub merge_gap_factor: f64,
    pub max_levels: usize,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            merge_gap_factor: 1.5,
            max_levels: HeadingLevel::ALL.len(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelPaths {
    pub heading: PathBuf,
    pub level: PathBuf,
}

impl Default for ModelPaths {
    fn default() -> Self {
        Self {
            heading: PathBuf::from("models/heading_classifier.json"),
            level: PathBuf::from("models/level_classifier.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentOutline, HeadingLevel, OutlineEntry};

    #[test]
    fn heading_level_parses_case_insensitively() {
        assert_eq!("h2".parse::<HeadingLevel>(), Ok(HeadingLevel::H2));
        assert_eq!(" H6 ".parse::<HeadingLevel>(), Ok(HeadingLevel::H6));
        assert!("Title".parse::<HeadingLevel>().is_err());
        assert!("H7".parse::<HeadingLevel>().is_err());
    }

    #[test]
    fn heading_level_rank_is_bounded() {
        assert_eq!(HeadingLevel::from_rank(0), Some(HeadingLevel::H1));
        assert_eq!(HeadingLevel::from_rank(5), Some(HeadingLevel::H6));
        assert_eq!(HeadingLevel::from_rank(6), None);
    }

    #[test]
    fn outline_serializes_with_string_levels() -> Result<(), Box<dyn std::error::Error>> {
        let outline = DocumentOutline {
            title: "Report".to_string(),
            outline: vec![OutlineEntry {
                level: HeadingLevel::H1,
                text: "Report".to_string(),
                page: 1,
            }],
        };

        let json = serde_json::to_string(&outline)?;
        assert_eq!(
            json,
            r#"{"title":"Report","outline":[{"level":"H1","text":"Report","page":1}]}"#
        );
        Ok(())
    }

    #[test]
    fn empty_outline_has_empty_title() -> Result<(), Box<dyn std::error::Error>> {
        let json = serde_json::to_string(&DocumentOutline::empty())?;
        assert_eq!(json, r#"{"title":"","outline":[]}"#);
        Ok(())
    }
}
