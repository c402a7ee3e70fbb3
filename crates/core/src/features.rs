use crate::models::LineRecord;

pub const FEATURE_COUNT: usize = 10;

/// Column order expected by trained heading classifiers. Reordering requires
/// retraining.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "font_size",
    "x0",
    "y0",
    "text_length",
    "uppercase_ratio",
    "is_bold",
    "is_italic",
    "starts_with_number",
    "ends_with_colon",
    "title_case",
];

pub type FeatureVector = [f64; FEATURE_COUNT];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFeatures {
    pub font_size: f64,
    pub x0: f64,
    pub y0: f64,
    pub text_length: usize,
    pub uppercase_ratio: f64,
    pub is_bold: bool,
    pub is_italic: bool,
    pub starts_with_number: bool,
    pub ends_with_colon: bool,
    pub title_case: bool,
}

impl LineFeatures {
    pub fn build(
        text: &str,
        font_size: f64,
        x0: f64,
        y0: f64,
        is_bold: bool,
        is_italic: bool,
    ) -> Self {
        let text_length = text.chars().count();
        let uppercase = text.chars().filter(|character| character.is_uppercase()).count();

        Self {
            font_size,
            x0,
            y0,
            text_length,
            uppercase_ratio: uppercase as f64 / text_length.max(1) as f64,
            is_bold,
            is_italic,
            starts_with_number: text
                .chars()
                .next()
                .is_some_and(char::is_numeric),
            ends_with_colon: text.ends_with(':'),
            title_case: is_title_case(text),
        }
    }

    pub fn from_line(line: &LineRecord) -> Self {
        Self::build(
            &line.text,
            line.font_size,
            line.bbox.x0,
            line.bbox.y0,
            line.is_bold,
            line.is_italic,
        )
    }

    pub fn to_vector(&self) -> FeatureVector {
        [
            self.font_size,
            self.x0,
            self.y0,
            self.text_length as f64,
            self.uppercase_ratio,
            flag(self.is_bold),
            flag(self.is_italic),
            flag(self.starts_with_number),
            flag(self.ends_with_colon),
            flag(self.title_case),
        ]
    }
}

fn flag(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

pub fn is_title_case(text: &str) -> bool {
    let mut previous_cased = false;
    let mut any_cased = false;

    for character in text.chars() {
        if character.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            any_cased = true;
        } else if character.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            any_cased = true;
        } else {
            previous_cased = false;
        }
    }

    any_cased
}
