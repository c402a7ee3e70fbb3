use crate::models::{HeadingLevel, LabeledLine, LineRecord};
use std::collections::BTreeMap;

const FALLBACK_LEVELS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageFontSizes {
    pages: BTreeMap<u32, Vec<f64>>,
}

impl PageFontSizes {
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a LineRecord>) -> Self {
        let mut pages: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for line in lines {
            pages.entry(line.page_number).or_default().push(line.font_size);
        }

        for sizes in pages.values_mut() {
            sizes.sort_by(|left, right| right.total_cmp(left));
            sizes.dedup();
        }

        Self { pages }
    }

    pub fn sizes_on(&self, page: u32) -> &[f64] {
        self.pages.get(&page).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn rank(&self, page: u32, font_size: f64) -> Option<usize> {
        self.sizes_on(page).iter().position(|size| *size == font_size)
    }

    pub fn rank_level(&self, page: u32, font_size: f64) -> Option<HeadingLevel> {
        self.rank(page, font_size)
            .filter(|rank| *rank < FALLBACK_LEVELS)
            .and_then(HeadingLevel::from_rank)
    }
}

pub fn apply_fallback_levels(rows: &mut [LabeledLine]) {
    let sizes = PageFontSizes::from_lines(rows.iter().map(|row| &row.line));

    for row in rows.iter_mut().filter(|row| !row.is_heading()) {
        row.heading_level = sizes.rank_level(row.line.page_number, row.line.font_size);
    }
}
