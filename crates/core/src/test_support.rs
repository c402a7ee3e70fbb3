use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::path::Path;

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;

#[derive(Debug, Clone)]
pub struct TestLine {
    text: String,
    font: &'static str,
    size: i64,
    x: i64,
    y: i64,
}

impl TestLine {
    pub fn regular(text: &str, size: f64, x: f64, y: f64) -> Self {
        Self::with_font("F1", text, size, x, y)
    }

    pub fn bold(text: &str, size: f64, x: f64, y: f64) -> Self {
        Self::with_font("F2", text, size, x, y)
    }

    pub fn italic(text: &str, size: f64, x: f64, y: f64) -> Self {
        Self::with_font("F3", text, size, x, y)
    }

    fn with_font(font: &'static str, text: &str, size: f64, x: f64, y: f64) -> Self {
        Self {
            text: text.to_string(),
            font,
            size: size.round() as i64,
            x: x.round() as i64,
            y: y.round() as i64,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TestPage {
    lines: Vec<TestLine>,
}

impl TestPage {
    pub fn new(lines: Vec<TestLine>) -> Self {
        Self { lines }
    }
}

pub fn write_pdf(path: &Path, pages: &[TestPage]) -> Result<(), Box<dyn std::error::Error>> {
    let mut doc = Document::with_version("1.5");

    let pages_id = doc.new_object_id();
    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });
    let italic_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Oblique",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
            "F3" => italic_id,
        },
    });

    let mut page_ids = Vec::new();
    for page in pages {
        let mut operations = Vec::new();
        if !page.lines.is_empty() {
            operations.push(Operation::new("BT", vec![]));
            for line in &page.lines {
                operations.push(Operation::new(
                    "Tf",
                    vec![Object::Name(line.font.as_bytes().to_vec()), Object::Integer(line.size)],
                ));
                operations.push(Operation::new(
                    "Tm",
                    vec![
                        Object::Integer(1),
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(1),
                        Object::Integer(line.x),
                        Object::Integer(line.y),
                    ],
                ));
                operations.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(line.text.as_str())],
                ));
            }
            operations.push(Operation::new("ET", vec![]));
        }

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        page_ids.push(page_id);
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => page_ids.iter().map(|id| Object::Reference(*id)).collect::<Vec<_>>(),
            "Count" => Object::Integer(i64::try_from(page_ids.len())?),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    doc.save(path)?;
    Ok(())
}
