pub mod classifier;
pub mod cmap;
pub mod dataset;
pub mod error;
pub mod extractor;
pub mod fallback;
pub mod features;
pub mod ground_truth;
pub mod ingest;
pub mod models;
pub mod outline;
pub mod similarity;

#[cfg(test)]
mod test_support;

pub use classifier::{ForestClassifier, ForestModel, HeadingClassifier, ModelBundle};
pub use dataset::{generate_dataset, label_document, DatasetReport, DatasetRow};
pub use error::OutlineError;
pub use extractor::{LopdfLineExtractor, PdfLineExtractor, PdfLines};
pub use fallback::{apply_fallback_levels, PageFontSizes};
pub use features::{FeatureVector, LineFeatures, FEATURE_COUNT, FEATURE_NAMES};
pub use ground_truth::{FuzzyHeadingMatcher, GroundTruthOutline, HeadingMatcher};
pub use ingest::{discover_pdf_files, process_folder, BatchReport, SkippedPdf};
pub use models::{
    BoundingBox, DocumentOutline, HeadingLevel, LabeledLine, LineRecord, MatchOptions,
    ModelPaths, OutlineEntry, OutlineOptions,
};
pub use outline::{
    assign_levels, build_outline, merge_fragments, HeadingCandidate, OutlineExtractor,
};
pub use similarity::similarity_ratio;
