use crate::classifier::HeadingClassifier;
use crate::error::OutlineError;
use crate::extractor::PdfLineExtractor;
use crate::models::DocumentOutline;
use crate::outline::OutlineExtractor;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

pub fn discover_pdf_files(folder: &Path) -> Result<Vec<PathBuf>, OutlineError> {
    if !folder.is_dir() {
        return Err(OutlineError::InvalidArgument(format!(
            "input folder {} is not a directory",
            folder.display()
        )));
    }

    let mut files = Vec::new();
    for item in WalkDir::new(folder).min_depth(1).max_depth(1) {
        let entry = match item {
            Ok(entry) => entry,
            Err(error) if error.depth() == 0 => return Err(std::io::Error::from(error).into()),
            Err(_) => continue,
        };
        if !entry.file_type().is_file() {
            continue;
        }

        let is_pdf = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));

        if is_pdf {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_unstable();
    Ok(files)
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPdf {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub written: Vec<PathBuf>,
    pub skipped_files: Vec<SkippedPdf>,
}

pub fn outline_path(output: &Path, pdf: &Path) -> Result<PathBuf, OutlineError> {
    let stem = pdf
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| OutlineError::MissingFileName(pdf.display().to_string()))?;
    Ok(output.join(format!("{stem}.json")))
}

pub fn write_outline(path: &Path, outline: &DocumentOutline) -> Result<(), OutlineError> {
    let mut json = serde_json::to_string_pretty(outline)?;
    json.push('\n');
    fs::write(path, json)?;
    Ok(())
}

pub fn process_folder<E, C>(
    input: &Path,
    output: &Path,
    extractor: &OutlineExtractor<E, C>,
) -> Result<BatchReport, OutlineError>
where
    E: PdfLineExtractor,
    C: HeadingClassifier,
{
    let files = discover_pdf_files(input)?;
    fs::create_dir_all(output)?;

    let mut report = BatchReport::default();
    for path in files {
        let result = outline_path(output, &path).and_then(|target| {
            let outline = extractor.extract_outline(&path)?;
            write_outline(&target, &outline)?;
            Ok(target)
        });

        match result {
            Ok(target) => {
                debug!(source = %path.display(), target = %target.display(), "wrote outline");
                report.written.push(target);
            }
            Err(error) => report.skipped_files.push(SkippedPdf {
                path,
                reason: error.to_string(),
            }),
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::{discover_pdf_files, outline_path, process_folder};
    use crate::classifier::tests::font_size_forest;
    use crate::classifier::ForestClassifier;
    use crate::extractor::LopdfLineExtractor;
    use crate::outline::OutlineExtractor;
    use crate::test_support::{write_pdf, TestLine, TestPage};
    use std::fs::{self, File};
    use std::io::Write;
    use std::path::Path;
    use tempfile::tempdir;

    fn pipeline() -> Result<OutlineExtractor<LopdfLineExtractor, ForestClassifier>, String> {
        let classifier = ForestClassifier::from_model(font_size_forest(12.0))?;
        Ok(OutlineExtractor::new(LopdfLineExtractor, classifier))
    }

    #[test]
    fn discovery_is_flat_sorted_and_case_insensitive() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let base = dir.path();
        let nested = base.join("nested");
        fs::create_dir(&nested)?;

        File::create(base.join("b.PDF")).and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(base.join("a.pdf")).and_then(|mut file| file.write_all(b"%PDF-1.4\n%fake"))?;
        File::create(base.join("notes.txt"))?;
        File::create(nested.join("c.pdf"))?;

        let files = discover_pdf_files(base)?;
        let names = files
            .iter()
            .filter_map(|path| path.file_name().and_then(|name| name.to_str()))
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a.pdf", "b.PDF"]);
        Ok(())
    }

    #[test]
    fn missing_input_folder_is_an_error() {
        assert!(discover_pdf_files(Path::new("does/not/exist")).is_err());
    }

    #[test]
    fn outline_file_takes_the_pdf_stem() -> Result<(), Box<dyn std::error::Error>> {
        let target = outline_path(Path::new("out"), Path::new("in/file01.pdf"))?;
        assert_eq!(target, Path::new("out").join("file01.json"));
        Ok(())
    }

    #[test]
    fn empty_input_folder_writes_nothing() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let output = dir.path().join("out");

        let report = process_folder(dir.path(), &output, &pipeline()?)?;

        assert!(report.written.is_empty());
        assert!(report.skipped_files.is_empty());
        assert_eq!(fs::read_dir(&output)?.count(), 0);
        Ok(())
    }

    #[test]
    fn writes_pretty_outline_json_per_pdf() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        fs::create_dir(&input)?;
        write_pdf(
            &input.join("report.pdf"),
            &[
                TestPage::new(vec![
                    TestLine::bold("Annual Report", 24.0, 72.0, 760.0),
                    TestLine::regular("Body text here", 11.0, 72.0, 700.0),
                ]),
                TestPage::new(vec![
                    TestLine::bold("1. Results", 16.0, 72.0, 760.0),
                    TestLine::regular("Numbers went up", 11.0, 72.0, 700.0),
                ]),
            ],
        )?;

        let report = process_folder(&input, &output, &pipeline()?)?;

        assert_eq!(report.written, vec![output.join("report.json")]);
        assert!(report.skipped_files.is_empty());
        let json = fs::read_to_string(output.join("report.json"))?;
        assert_eq!(
            json,
            r#"{
  "title": "Annual Report",
  "outline": [
    {
      "level": "H1",
      "text": "Annual Report",
      "page": 1
    },
    {
      "level": "H2",
      "text": "1. Results",
      "page": 2
    }
  ]
}
"#
        );
        Ok(())
    }

    #[test]
    fn text_free_pdf_gets_an_empty_outline() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        fs::create_dir(&input)?;
        write_pdf(&input.join("scan.pdf"), &[TestPage::default()])?;

        process_folder(&input, &output, &pipeline()?)?;

        let json = fs::read_to_string(output.join("scan.json"))?;
        assert_eq!(json, "{\n  \"title\": \"\",\n  \"outline\": []\n}\n");
        Ok(())
    }

    #[test]
    fn reruns_are_byte_identical_and_skip_broken_pdfs() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let input = dir.path().join("input");
        let output = dir.path().join("output");
        fs::create_dir(&input)?;
        write_pdf(
            &input.join("good.pdf"),
            &[TestPage::new(vec![
                TestLine::bold("Overview", 20.0, 72.0, 760.0),
                TestLine::regular("Details", 10.0, 72.0, 700.0),
            ])],
        )?;
        fs::write(input.join("unreadable.pdf"), b"%PDF-1.4\n%broken")?;

        let extractor = pipeline()?;
        let first = process_folder(&input, &output, &extractor)?;
        let first_json = fs::read(output.join("good.json"))?;
        let second = process_folder(&input, &output, &extractor)?;
        let second_json = fs::read(output.join("good.json"))?;

        assert_eq!(first_json, second_json);
        assert_eq!(first.written, second.written);
        assert_eq!(second.skipped_files.len(), 1);
        assert_eq!(
            second.skipped_files[0]
                .path
                .file_name()
                .and_then(|name| name.to_str()),
            Some("unreadable.pdf")
        );
        assert!(!output.join("unreadable.json").exists());
        Ok(())
    }
}
