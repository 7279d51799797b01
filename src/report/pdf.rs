//! Renders a [`ReportLayout`] onto A4 pages with printpdf's builtin fonts.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use super::layout::{ReportLayout, ReportLine};
use super::ReportError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 14.0;
const TITLE_SIZE: f32 = 20.0;
const BODY_SIZE: f32 = 12.0;
const TABLE_SIZE: f32 = 9.0;
const PT_TO_MM: f32 = 0.3528;
/// Rough Helvetica advance width, as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.5;

struct Cursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl Cursor {
    fn advance(&mut self, font_size: f32) {
        let height = font_size * PT_TO_MM * 1.5;
        if self.y - height < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
        self.y -= height;
    }

    fn write(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }
}

fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * AVG_GLYPH_WIDTH * PT_TO_MM
}

fn max_chars(font_size: f32, width: f32) -> usize {
    ((width / (font_size * AVG_GLYPH_WIDTH * PT_TO_MM)).floor() as usize).max(1)
}

/// Breaks `text` at spaces into lines no wider than `width`; words that are
/// too long on their own are split. No characters other than the break
/// spaces are dropped.
fn wrap(text: &str, font_size: f32, width: f32) -> Vec<String> {
    let limit = max_chars(font_size, width);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split(' ') {
        let word_len = word.chars().count();
        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed <= limit {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            current_len = needed;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        let mut chars: Vec<char> = word.chars().collect();
        while chars.len() > limit {
            lines.push(chars.drain(..limit).collect());
        }
        current_len = chars.len();
        current = chars.into_iter().collect();
    }
    lines.push(current);
    lines
}

/// Left edge of a single-cell line: titles are centred, everything else
/// starts at the margin.
fn start_x(line: &ReportLine) -> f32 {
    match line {
        ReportLine::Title(title) => {
            let usable = PAGE_WIDTH - 2.0 * MARGIN;
            MARGIN + ((usable - text_width(title, TITLE_SIZE)) / 2.0).max(0.0)
        }
        _ => MARGIN,
    }
}

/// Clips a table cell to its column.
fn fit(text: &str, font_size: f32, width: f32) -> String {
    if text_width(text, font_size) <= width {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max_chars(font_size, width).saturating_sub(3)).collect();
    clipped.push_str("...");
    clipped
}

pub fn render(layout: &ReportLayout) -> Result<Vec<u8>, ReportError> {
    let (doc, page, layer) = PdfDocument::new(&layout.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ReportError::Pdf(format!("{e:?}")))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ReportError::Pdf(format!("{e:?}")))?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut cursor = Cursor {
        doc,
        layer,
        regular,
        bold,
        y: PAGE_HEIGHT - MARGIN,
    };
    let usable = PAGE_WIDTH - 2.0 * MARGIN;

    for line in &layout.lines {
        match line {
            ReportLine::Title(title) => {
                cursor.advance(TITLE_SIZE);
                cursor.write(title, TITLE_SIZE, start_x(line), true);
            }
            ReportLine::Text(text) => {
                for piece in wrap(text, BODY_SIZE, usable) {
                    cursor.advance(BODY_SIZE);
                    cursor.write(&piece, BODY_SIZE, MARGIN, false);
                }
            }
            ReportLine::Blank => cursor.advance(BODY_SIZE),
            ReportLine::Header(cells) | ReportLine::Row(cells) => {
                let bold = matches!(line, ReportLine::Header(_));
                let column = usable / cells.len().max(1) as f32;
                cursor.advance(TABLE_SIZE);
                for (i, cell) in cells.iter().enumerate() {
                    let x = MARGIN + column * i as f32;
                    cursor.write(&fit(cell, TABLE_SIZE, column - 1.0), TABLE_SIZE, x, bold);
                }
            }
            ReportLine::Signature(text) => {
                cursor.advance(BODY_SIZE);
                cursor.advance(BODY_SIZE);
                cursor.write(text, BODY_SIZE, start_x(line), false);
            }
        }
    }

    cursor
        .doc
        .save_to_bytes()
        .map_err(|e| ReportError::Pdf(format!("{e:?}")))
}
