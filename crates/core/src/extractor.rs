use crate::cmap::ToUnicodeMap;
use crate::error::OutlineError;
use crate::models::{BoundingBox, LineRecord};
use lopdf::content::Content;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::Path;

const DEFAULT_GLYPH_WIDTH: f64 = 500.0;
const DEFAULT_PAGE_TOP: f64 = 792.0;
const ASCENT: f64 = 0.8;
const DESCENT: f64 = 0.2;
const BASELINE_TOLERANCE: f64 = 0.5;
const SPACE_GAP_RATIO: f64 = 0.15;
const TJ_SPACE_THRESHOLD: f64 = 200.0;
const FLAG_ITALIC: i64 = 1 << 6;
const FLAG_FORCE_BOLD: i64 = 1 << 18;
const MAX_PARENT_DEPTH: usize = 32;

pub trait PdfLineExtractor {
    fn extract_lines(&self, path: &Path) -> Result<Vec<LineRecord>, OutlineError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfLineExtractor;

impl LopdfLineExtractor {
    /// Opens the document and returns a lazy, page-at-a-time line iterator.
    pub fn lines(&self, path: &Path) -> Result<PdfLines, OutlineError> {
        let document = Document::load(path)
            .map_err(|error| OutlineError::PdfParse(format!("{}: {error}", path.display())))?;
        Ok(PdfLines::new(document))
    }
}

impl PdfLineExtractor for LopdfLineExtractor {
    fn extract_lines(&self, path: &Path) -> Result<Vec<LineRecord>, OutlineError> {
        self.lines(path)?.collect()
    }
}

pub struct PdfLines {
    document: Document,
    pages: std::vec::IntoIter<(u32, ObjectId)>,
    pending: VecDeque<LineRecord>,
    failed: bool,
}

impl PdfLines {
    fn new(document: Document) -> Self {
        let pages = document.get_pages().into_iter().collect::<Vec<_>>();
        Self {
            document,
            pages: pages.into_iter(),
            pending: VecDeque::new(),
            failed: false,
        }
    }
}

impl Iterator for PdfLines {
    type Item = Result<LineRecord, OutlineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.pending.pop_front() {
                return Some(Ok(line));
            }
            if self.failed {
                return None;
            }

            let (page_number, page_id) = self.pages.next()?;
            match page_lines(&self.document, page_number, page_id) {
                Ok(lines) => self.pending.extend(lines),
                Err(error) => {
                    self.failed = true;
                    return Some(Err(error));
                }
            }
        }
    }
}

fn page_lines(
    document: &Document,
    page_number: u32,
    page_id: ObjectId,
) -> Result<Vec<LineRecord>, OutlineError> {
    let fonts = page_fonts(document, page_id);
    let raw_content = document
        .get_page_content(page_id)
        .map_err(|error| OutlineError::PdfParse(format!("page {page_number}: {error}")))?;
    let content = Content::decode(&raw_content)
        .map_err(|error| OutlineError::PdfParse(format!("page {page_number}: {error}")))?;

    let mut interpreter = PageInterpreter::new(&fonts, page_number, page_top(document, page_id));
    for operation in &content.operations {
        interpreter.apply(operation.operator.as_str(), &operation.operands);
    }

    Ok(interpreter.finish())
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Matrix {
    const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    fn translation(tx: f64, ty: f64) -> Self {
        Self {
            e: tx,
            f: ty,
            ..Self::IDENTITY
        }
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        let values = operands
            .iter()
            .take(6)
            .map(number)
            .collect::<Option<Vec<_>>>()?;
        match values.as_slice() {
            [a, b, c, d, e, f] => Some(Self {
                a: *a,
                b: *b,
                c: *c,
                d: *d,
                e: *e,
                f: *f,
            }),
            _ => None,
        }
    }

    fn multiply(self, other: Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    fn vertical_scale(&self) -> f64 {
        (self.c * self.c + self.d * self.d).sqrt()
    }
}

#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font: Option<Vec<u8>>,
    font_size: f64,
    char_spacing: f64,
    word_spacing: f64,
    horizontal_scale: f64,
    leading: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scale: 1.0,
            leading: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
struct Span {
    text: String,
    x_start: f64,
    x_end: f64,
    baseline: f64,
    font_size: f64,
    font_name: String,
    is_bold: bool,
    is_italic: bool,
}

#[derive(Debug, Default)]
struct LineBuilder {
    spans: Vec<Span>,
}

impl LineBuilder {
    fn accepts(&self, baseline: f64) -> bool {
        self.spans
            .first()
            .map_or(true, |first| (first.baseline - baseline).abs() <= BASELINE_TOLERANCE)
    }

    fn push(&mut self, span: Span) {
        if self.spans.is_empty() && span.text.trim().is_empty() {
            return;
        }

        if let Some(previous) = self.spans.last_mut() {
            let gap = span.x_start - previous.x_end;
            let needs_space = gap > previous.font_size * SPACE_GAP_RATIO
                && !previous.text.ends_with(char::is_whitespace)
                && !span.text.starts_with(char::is_whitespace);
            if needs_space {
                previous.text.push(' ');
            }
        }

        self.spans.push(span);
    }

    fn push_word_break(&mut self) {
        if let Some(previous) = self.spans.last_mut() {
            if !previous.text.ends_with(char::is_whitespace) {
                previous.text.push(' ');
            }
        }
    }

    fn finish(&mut self, page_number: u32, page_top: f64) -> Option<LineRecord> {
        let spans = std::mem::take(&mut self.spans);
        let first = spans.first()?;

        let text = spans
            .iter()
            .map(|span| span.text.as_str())
            .collect::<String>()
            .trim()
            .to_string();
        if text.is_empty() {
            return None;
        }

        let x0 = spans
            .iter()
            .map(|span| span.x_start)
            .fold(f64::INFINITY, f64::min);
        let x1 = spans
            .iter()
            .map(|span| span.x_end)
            .fold(f64::NEG_INFINITY, f64::max);

        Some(LineRecord {
            page_number,
            text,
            font_size: first.font_size,
            font_name: first.font_name.clone(),
            is_bold: first.is_bold,
            is_italic: first.is_italic,
            bbox: BoundingBox {
                x0,
                y0: page_top - (first.baseline + first.font_size * ASCENT),
                x1: x1.max(x0),
                y1: page_top - (first.baseline - first.font_size * DESCENT),
            },
        })
    }
}

struct PageInterpreter<'a> {
    fonts: &'a HashMap<Vec<u8>, PdfFont>,
    page_number: u32,
    page_top: f64,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    current: LineBuilder,
    lines: Vec<LineRecord>,
}

impl<'a> PageInterpreter<'a> {
    fn new(fonts: &'a HashMap<Vec<u8>, PdfFont>, page_number: u32, page_top: f64) -> Self {
        Self {
            fonts,
            page_number,
            page_top,
            state: GraphicsState::default(),
            saved: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            current: LineBuilder::default(),
            lines: Vec::new(),
        }
    }

    fn apply(&mut self, operator: &str, operands: &[Object]) {
        match operator {
            "q" => self.saved.push(self.state.clone()),
            "Q" => {
                if let Some(state) = self.saved.pop() {
                    self.state = state;
                }
            }
            "cm" => {
                if let Some(matrix) = Matrix::from_operands(operands) {
                    self.state.ctm = matrix.multiply(self.state.ctm);
                }
            }
            "BT" => {
                self.text_matrix = Matrix::IDENTITY;
                self.line_matrix = Matrix::IDENTITY;
            }
            "ET" => self.flush_line(),
            "Tf" => {
                if let Some(Object::Name(name)) = operands.first() {
                    self.state.font = Some(name.clone());
                }
                if let Some(size) = operands.get(1).and_then(number) {
                    self.state.font_size = size;
                }
            }
            "Tc" => {
                if let Some(value) = operands.first().and_then(number) {
                    self.state.char_spacing = value;
                }
            }
            "Tw" => {
                if let Some(value) = operands.first().and_then(number) {
                    self.state.word_spacing = value;
                }
            }
            "Tz" => {
                if let Some(value) = operands.first().and_then(number) {
                    self.state.horizontal_scale = value / 100.0;
                }
            }
            "TL" => {
                if let Some(value) = operands.first().and_then(number) {
                    self.state.leading = value;
                }
            }
            "Td" => {
                if let Some((tx, ty)) = pair(operands) {
                    self.move_line(tx, ty);
                }
            }
            "TD" => {
                if let Some((tx, ty)) = pair(operands) {
                    self.state.leading = -ty;
                    self.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(matrix) = Matrix::from_operands(operands) {
                    self.text_matrix = matrix;
                    self.line_matrix = matrix;
                }
            }
            "T*" => self.next_line(),
            "Tj" => {
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => self.show(bytes),
                            other => {
                                if let Some(adjustment) = number(other) {
                                    self.adjust(adjustment);
                                }
                            }
                        }
                    }
                }
            }
            "'" => {
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.first() {
                    self.show(bytes);
                }
            }
            "\"" => {
                if let Some(value) = operands.first().and_then(number) {
                    self.state.word_spacing = value;
                }
                if let Some(value) = operands.get(1).and_then(number) {
                    self.state.char_spacing = value;
                }
                self.next_line();
                if let Some(Object::String(bytes, _)) = operands.get(2) {
                    self.show(bytes);
                }
            }
            _ => {}
        }
    }

    fn move_line(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translation(tx, ty).multiply(self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.state.leading);
    }

    fn font(&self) -> &'a PdfFont {
        self.state
            .font
            .as_ref()
            .and_then(|name| self.fonts.get(name))
            .unwrap_or(&FALLBACK_FONT)
    }

    fn show(&mut self, bytes: &[u8]) {
        let font = self.font();
        let decoded = font.decode(bytes);

        let rendering = self.text_matrix.multiply(self.state.ctm);
        let x_start = rendering.e;
        let baseline = rendering.f;
        let font_size = round_size(self.state.font_size * rendering.vertical_scale());

        let advance = (decoded.width_units / 1000.0 * self.state.font_size
            + self.state.char_spacing * decoded.glyphs as f64
            + self.state.word_spacing * decoded.spaces as f64)
            * self.state.horizontal_scale;
        self.text_matrix = Matrix::translation(advance, 0.0).multiply(self.text_matrix);
        let x_end = self.text_matrix.multiply(self.state.ctm).e;

        if decoded.text.is_empty() {
            return;
        }

        if !self.current.accepts(baseline) {
            self.flush_line();
        }

        self.current.push(Span {
            text: decoded.text,
            x_start,
            x_end,
            baseline,
            font_size,
            font_name: font.base_name.clone(),
            is_bold: font.is_bold,
            is_italic: font.is_italic,
        });
    }

    fn adjust(&mut self, adjustment: f64) {
        let shift = -adjustment / 1000.0 * self.state.font_size * self.state.horizontal_scale;
        self.text_matrix = Matrix::translation(shift, 0.0).multiply(self.text_matrix);
        if -adjustment > TJ_SPACE_THRESHOLD {
            self.current.push_word_break();
        }
    }

    fn flush_line(&mut self) {
        if let Some(line) = self.current.finish(self.page_number, self.page_top) {
            self.lines.push(line);
        }
    }

    fn finish(mut self) -> Vec<LineRecord> {
        self.flush_line();
        self.lines
    }
}

#[derive(Debug)]
struct PdfFont {
    base_name: String,
    is_bold: bool,
    is_italic: bool,
    two_byte: bool,
    first_char: u32,
    widths: Vec<f64>,
    cid_widths: BTreeMap<u32, f64>,
    missing_width: f64,
    to_unicode: Option<ToUnicodeMap>,
}

static FALLBACK_FONT: PdfFont = PdfFont {
    base_name: String::new(),
    is_bold: false,
    is_italic: false,
    two_byte: false,
    first_char: 0,
    widths: Vec::new(),
    cid_widths: BTreeMap::new(),
    missing_width: DEFAULT_GLYPH_WIDTH,
    to_unicode: None,
};

#[derive(Debug, Default, PartialEq)]
struct DecodedText {
    text: String,
    width_units: f64,
    glyphs: usize,
    spaces: usize,
}

impl PdfFont {
    fn from_dict(document: &Document, font: &Dictionary) -> Self {
        let subtype = name_value(document, font, b"Subtype").unwrap_or_default();
        let base_name = strip_subset_tag(&name_value(document, font, b"BaseFont").unwrap_or_default());
        let two_byte = subtype == "Type0";

        let descendant = if two_byte {
            dict_value(document, font, b"DescendantFonts")
                .and_then(|object| object.as_array().ok())
                .and_then(|fonts| fonts.first())
                .and_then(|object| resolve(document, object).as_dict().ok())
        } else {
            None
        };
        let metrics = descendant.unwrap_or(font);
        let descriptor = dict_value(document, metrics, b"FontDescriptor")
            .and_then(|object| object.as_dict().ok());

        let flags = descriptor
            .and_then(|descriptor| dict_value(document, descriptor, b"Flags"))
            .and_then(number)
            .map_or(0, |value| value as i64);
        let weight = descriptor
            .and_then(|descriptor| dict_value(document, descriptor, b"FontWeight"))
            .and_then(number)
            .unwrap_or(0.0);
        let lowered = base_name.to_lowercase();

        let is_bold = flags & FLAG_FORCE_BOLD != 0 || weight >= 700.0 || lowered.contains("bold");
        let is_italic = match descriptor {
            Some(_) => flags & FLAG_ITALIC != 0,
            None => lowered.contains("italic") || lowered.contains("oblique"),
        };

        let first_char = dict_value(document, font, b"FirstChar")
            .and_then(number)
            .map_or(0, |value| value.max(0.0) as u32);
        let widths = dict_value(document, font, b"Widths")
            .and_then(|object| object.as_array().ok())
            .map(|values| {
                values
                    .iter()
                    .map(|value| number(resolve(document, value)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();
        let missing_width = descriptor
            .and_then(|descriptor| dict_value(document, descriptor, b"MissingWidth"))
            .and_then(number)
            .filter(|value| *value > 0.0);

        let (cid_widths, default_cid_width) = match descendant {
            Some(cid_font) => (
                cid_widths(document, cid_font),
                dict_value(document, cid_font, b"DW").and_then(number),
            ),
            None => (BTreeMap::new(), None),
        };

        let to_unicode = match dict_value(document, font, b"ToUnicode") {
            Some(Object::Stream(stream)) => {
                let data = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                Some(ToUnicodeMap::parse(&data)).filter(|map| !map.is_empty())
            }
            _ => None,
        };

        Self {
            base_name,
            is_bold,
            is_italic,
            two_byte,
            first_char,
            widths,
            cid_widths,
            missing_width: default_cid_width
                .or(missing_width)
                .unwrap_or(if two_byte { 1000.0 } else { DEFAULT_GLYPH_WIDTH }),
            to_unicode,
        }
    }

    fn glyph_width(&self, code: u32) -> f64 {
        if self.two_byte {
            return self.cid_widths.get(&code).copied().unwrap_or(self.missing_width);
        }

        code.checked_sub(self.first_char)
            .and_then(|index| self.widths.get(index as usize))
            .copied()
            .filter(|width| *width > 0.0)
            .unwrap_or(self.missing_width)
    }

    fn decode(&self, bytes: &[u8]) -> DecodedText {
        let codes: Vec<u32> = if self.two_byte {
            bytes
                .chunks(2)
                .map(|pair| pair.iter().fold(0u32, |code, byte| (code << 8) | u32::from(*byte)))
                .collect()
        } else {
            bytes.iter().map(|byte| u32::from(*byte)).collect()
        };

        let mut decoded = DecodedText::default();
        for code in &codes {
            decoded.width_units += self.glyph_width(*code);
            decoded.glyphs += 1;
            if !self.two_byte && *code == 32 {
                decoded.spaces += 1;
            }
        }

        decoded.text = match &self.to_unicode {
            Some(map) => codes
                .iter()
                .map(|code| match map.get(*code) {
                    Some(text) => text.to_string(),
                    None => fallback_char(*code, self.two_byte).to_string(),
                })
                .collect(),
            None if self.two_byte => codes
                .iter()
                .map(|code| fallback_char(*code, true))
                .collect(),
            None => decode_text_simple(bytes),
        };

        decoded
    }
}

fn cid_widths(document: &Document, cid_font: &Dictionary) -> BTreeMap<u32, f64> {
    let mut widths = BTreeMap::new();
    let Some(entries) = dict_value(document, cid_font, b"W").and_then(|object| object.as_array().ok())
    else {
        return widths;
    };

    let entries = entries
        .iter()
        .map(|entry| resolve(document, entry))
        .collect::<Vec<_>>();
    let mut index = 0;
    while index + 1 < entries.len() {
        let Some(first) = number(entries[index]) else {
            break;
        };
        let first = first.max(0.0) as u32;

        match entries[index + 1] {
            Object::Array(values) => {
                for (offset, value) in values.iter().enumerate() {
                    if let Some(width) = number(resolve(document, value)) {
                        widths.insert(first.saturating_add(offset as u32), width);
                    }
                }
                index += 2;
            }
            other => {
                let (Some(last), Some(width)) = (number(other), entries.get(index + 2).and_then(|value| number(value)))
                else {
                    break;
                };
                let last = last.max(0.0) as u32;
                for code in first..=last.min(first.saturating_add(0xFFFF)) {
                    widths.insert(code, width);
                }
                index += 3;
            }
        }
    }

    widths
}

fn fallback_char(code: u32, two_byte: bool) -> char {
    if two_byte {
        char::from_u32(code).unwrap_or('\u{FFFD}')
    } else {
        win_ansi_char(code as u8)
    }
}

fn win_ansi_char(byte: u8) -> char {
    match byte {
        0x80 => '\u{20AC}',
        0x85 => '\u{2026}',
        0x91 => '\u{2018}',
        0x92 => '\u{2019}',
        0x93 => '\u{201C}',
        0x94 => '\u{201D}',
        0x95 => '\u{2022}',
        0x96 => '\u{2013}',
        0x97 => '\u{2014}',
        0x99 => '\u{2122}',
        other => other as char,
    }
}

fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units = bytes[2..]
            .chunks(2)
            .filter_map(|pair| match pair {
                [high, low] => Some(u16::from_be_bytes([*high, *low])),
                _ => None,
            })
            .collect::<Vec<_>>();
        return String::from_utf16_lossy(&units);
    }

    if !bytes.is_ascii() {
        if let Ok(text) = std::str::from_utf8(bytes) {
            return text.to_string();
        }
    }

    bytes.iter().map(|byte| win_ansi_char(*byte)).collect()
}

fn strip_subset_tag(name: &str) -> String {
    match name.split_once('+') {
        Some((tag, rest))
            if tag.len() == 6 && tag.chars().all(|character| character.is_ascii_uppercase()) =>
        {
            rest.to_string()
        }
        _ => name.to_string(),
    }
}

fn page_fonts(document: &Document, page_id: ObjectId) -> HashMap<Vec<u8>, PdfFont> {
    let mut fonts = HashMap::new();
    let Some(resources) =
        inherited_value(document, page_id, b"Resources").and_then(|object| object.as_dict().ok())
    else {
        return fonts;
    };
    let Some(font_resources) =
        dict_value(document, resources, b"Font").and_then(|object| object.as_dict().ok())
    else {
        return fonts;
    };

    for (name, object) in font_resources.iter() {
        if let Ok(font) = resolve(document, object).as_dict() {
            fonts.insert(name.clone(), PdfFont::from_dict(document, font));
        }
    }

    fonts
}

fn page_top(document: &Document, page_id: ObjectId) -> f64 {
    inherited_value(document, page_id, b"MediaBox")
        .and_then(|object| object.as_array().ok())
        .and_then(|values| {
            let values = values
                .iter()
                .map(|value| number(resolve(document, value)))
                .collect::<Option<Vec<_>>>()?;
            match values.as_slice() {
                [_, y0, _, y1] => Some(y0.max(*y1)),
                _ => None,
            }
        })
        .unwrap_or(DEFAULT_PAGE_TOP)
}

fn inherited_value<'a>(document: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut node = document.get_dictionary(page_id).ok();
    let mut depth = 0;

    while let Some(dictionary) = node {
        if let Some(value) = dict_value(document, dictionary, key) {
            return Some(value);
        }
        if depth >= MAX_PARENT_DEPTH {
            break;
        }
        depth += 1;
        node = dictionary
            .get(b"Parent")
            .ok()
            .and_then(|parent| parent.as_reference().ok())
            .and_then(|parent_id| document.get_dictionary(parent_id).ok());
    }

    None
}

fn resolve<'a>(document: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => document.get_object(*id).unwrap_or(object),
        _ => object,
    }
}

fn dict_value<'a>(document: &'a Document, dictionary: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dictionary.get(key).ok().map(|object| resolve(document, object))
}

fn name_value(document: &Document, dictionary: &Dictionary, key: &[u8]) -> Option<String> {
    match dict_value(document, dictionary, key) {
        Some(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(value) => Some(*value as f64),
        Object::Real(value) => Some(f64::from(*value)),
        _ => None,
    }
}

fn pair(operands: &[Object]) -> Option<(f64, f64)> {
    Some((number(operands.first()?)?, number(operands.get(1)?)?))
}

fn round_size(size: f64) -> f64 {
    (size * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::{cid_widths, strip_subset_tag, LopdfLineExtractor, PdfLineExtractor};
    use crate::test_support::{write_pdf, TestLine, TestPage};
    use lopdf::{Dictionary, Document, Object};
    use tempfile::tempdir;

    #[test]
    fn width_arrays_near_the_code_limit_saturate() {
        let document = Document::with_version("1.5");
        let mut font = Dictionary::new();
        font.set(
            "W",
            Object::Array(vec![
                Object::Integer(i64::from(u32::MAX) - 1),
                Object::Array(vec![
                    Object::Integer(500),
                    Object::Integer(600),
                    Object::Integer(700),
                ]),
                Object::Integer(3),
                Object::Integer(5),
                Object::Integer(250),
            ]),
        );

        let widths = cid_widths(&document, &font);

        assert_eq!(widths.get(&(u32::MAX - 1)), Some(&500.0));
        assert_eq!(widths.get(&u32::MAX), Some(&700.0));
        assert_eq!(widths.get(&4), Some(&250.0));
    }

    #[test]
    fn subset_tags_are_removed_from_font_names() {
        assert_eq!(strip_subset_tag("ABCDEF+Arial-BoldMT"), "Arial-BoldMT");
        assert_eq!(strip_subset_tag("Helvetica"), "Helvetica");
        assert_eq!(strip_subset_tag("abc+Font"), "abc+Font");
    }

    #[test]
    fn lines_carry_font_and_position_metadata() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("doc.pdf");
        write_pdf(
            &path,
            &[TestPage::new(vec![
                TestLine::bold("Annual Report", 24.0, 72.0, 760.0),
                TestLine::regular("Body text follows here.", 11.0, 72.0, 700.0),
            ])],
        )?;

        let lines = LopdfLineExtractor.extract_lines(&path)?;

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].page_number, 1);
        assert_eq!(lines[0].text, "Annual Report");
        assert_eq!(lines[0].font_size, 24.0);
        assert_eq!(lines[0].font_name, "Helvetica-Bold");
        assert!(lines[0].is_bold);
        assert!(!lines[0].is_italic);
        assert!((lines[0].bbox.x0 - 72.0).abs() < 1e-6);
        assert!(lines[0].bbox.x1 > lines[0].bbox.x0);
        assert!(lines[0].bbox.y0 < lines[1].bbox.y0);
        assert!(lines[0].bbox.y0 < lines[0].bbox.y1);

        assert_eq!(lines[1].font_size, 11.0);
        assert!(!lines[1].is_bold);
        Ok(())
    }

    #[test]
    fn italic_fonts_without_descriptor_use_the_name() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("doc.pdf");
        write_pdf(
            &path,
            &[TestPage::new(vec![TestLine::italic("A quote", 12.0, 72.0, 700.0)])],
        )?;

        let lines = LopdfLineExtractor.extract_lines(&path)?;
        assert_eq!(lines.len(), 1);
        assert!(lines[0].is_italic);
        Ok(())
    }

    #[test]
    fn spans_on_one_baseline_form_one_line() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("doc.pdf");
        write_pdf(
            &path,
            &[TestPage::new(vec![
                TestLine::regular("1.", 14.0, 72.0, 700.0),
                TestLine::regular("Introduction", 14.0, 100.0, 700.0),
            ])],
        )?;

        let lines = LopdfLineExtractor.extract_lines(&path)?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "1. Introduction");
        Ok(())
    }

    #[test]
    fn blank_lines_and_empty_pages_are_skipped() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("doc.pdf");
        write_pdf(
            &path,
            &[
                TestPage::new(vec![TestLine::regular("   ", 12.0, 72.0, 700.0)]),
                TestPage::new(vec![]),
                TestPage::new(vec![TestLine::regular("Third page", 12.0, 72.0, 700.0)]),
            ],
        )?;

        let lines = LopdfLineExtractor.extract_lines(&path)?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].page_number, 3);
        Ok(())
    }

    #[test]
    fn line_iterator_is_lazy_over_pages() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("doc.pdf");
        write_pdf(
            &path,
            &[
                TestPage::new(vec![TestLine::regular("First", 12.0, 72.0, 700.0)]),
                TestPage::new(vec![TestLine::regular("Second", 12.0, 72.0, 700.0)]),
            ],
        )?;

        let mut lines = LopdfLineExtractor.lines(&path)?;
        let first = lines.next().expect("first line")?;
        assert_eq!(first.text, "First");
        let second = lines.next().expect("second line")?;
        assert_eq!(second.page_number, 2);
        assert!(lines.next().is_none());
        Ok(())
    }

    #[test]
    fn unreadable_pdf_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"%PDF-1.4\n%broken")?;

        assert!(LopdfLineExtractor.extract_lines(&path).is_err());
        Ok(())
    }
}
