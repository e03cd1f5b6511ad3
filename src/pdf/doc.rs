use crate::pdf::{
    BLACK, GREY, HEADER_FONT_SIZE, MARGIN_PT, PAGE_H_PT, PAGE_W_PT, RgbTriple,
};
use crate::utils::text::has_cjk;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Rect, Rgb,
};
use std::io::Cursor;
use tracing::warn;

const PT_TO_MM: f32 = 0.352_778;

/// Running header/footer content drawn on every page, first and later
/// pages identically.
#[derive(Clone)]
pub struct PageChrome {
    /// Fixed company title, centered at the top
    pub title: String,
    /// "Transportation Department - January 2025" style line
    pub subtitle: String,
    /// Generation timestamp shown bottom right
    pub printed_at: String,
}

struct FontSet {
    base: IndirectFontRef,
    bold: IndirectFontRef,
    cjk: Option<IndirectFontRef>,
}

/// Cursor-based page writer over `printpdf`. Coordinates given to it are
/// points from the top-left corner; conversion to the PDF bottom-left
/// millimetre space happens at the draw calls.
pub struct DocWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: FontSet,
    chrome: PageChrome,
    page_number: u32,
    /// Current vertical position, points from the top edge
    pub cursor: f32,
}

/// First usable baseline below the page header.
pub const CONTENT_TOP_PT: f32 = 60.0;
/// Content must stay above the footer line.
pub const CONTENT_BOTTOM_PT: f32 = PAGE_H_PT - 48.0;

impl DocWriter {
    pub fn new(
        doc_title: &str,
        chrome: PageChrome,
        cjk_font: Option<&[u8]>,
    ) -> Result<Self, printpdf::Error> {
        let (doc, page, layer) =
            PdfDocument::new(doc_title, Mm(PAGE_W_PT * PT_TO_MM), Mm(PAGE_H_PT * PT_TO_MM), "Layer 1");

        let base = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;
        let cjk = match cjk_font {
            Some(bytes) => match doc.add_external_font(Cursor::new(bytes.to_vec())) {
                Ok(font) => Some(font),
                Err(e) => {
                    warn!(error = %e, "could not register CJK font, falling back to Helvetica");
                    None
                }
            },
            None => None,
        };

        let layer = doc.get_page(page).get_layer(layer);
        let mut writer = DocWriter {
            doc,
            layer,
            fonts: FontSet { base, bold, cjk },
            chrome,
            page_number: 1,
            cursor: CONTENT_TOP_PT,
        };
        writer.draw_chrome();
        Ok(writer)
    }

    pub fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_W_PT * PT_TO_MM),
            Mm(PAGE_H_PT * PT_TO_MM),
            "Layer 1",
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.page_number += 1;
        self.cursor = CONTENT_TOP_PT;
        self.draw_chrome();
    }

    /// Start a new page unless `needed` points still fit above the
    /// footer. Returns true when a page break happened.
    pub fn ensure_space(&mut self, needed: f32) -> bool {
        if self.cursor + needed > CONTENT_BOTTOM_PT {
            self.new_page();
            true
        } else {
            false
        }
    }

    pub fn remaining_space(&self) -> f32 {
        CONTENT_BOTTOM_PT - self.cursor
    }

    fn draw_chrome(&mut self) {
        let chrome = self.chrome.clone();
        self.text_centered(&chrome.title, HEADER_FONT_SIZE, PAGE_W_PT / 2.0, 24.0, true, BLACK);
        self.text_centered(&chrome.subtitle, 10.0, PAGE_W_PT / 2.0, 42.0, true, BLACK);

        let footer_y = PAGE_H_PT - MARGIN_PT;
        let page_label = format!("Page {}", self.page_number);
        self.text(&page_label, 8.0, 40.0, footer_y, false, GREY);
        self.text_right(&chrome.printed_at, 8.0, PAGE_W_PT - 40.0, footer_y, false, GREY);
    }

    fn font_for(&self, text: &str, bold: bool) -> &IndirectFontRef {
        if has_cjk(text) {
            if let Some(cjk) = &self.fonts.cjk {
                return cjk;
            }
        }
        if bold { &self.fonts.bold } else { &self.fonts.base }
    }

    /// Draw a string with its baseline at `y` points from the top.
    pub fn text(&self, s: &str, size: f32, x: f32, y: f32, bold: bool, color: RgbTriple) {
        if s.is_empty() {
            return;
        }
        let (r, g, b) = color;
        self.layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
        self.layer.use_text(
            s,
            size,
            Mm(x * PT_TO_MM),
            Mm((PAGE_H_PT - y) * PT_TO_MM),
            self.font_for(s, bold),
        );
    }

    pub fn text_centered(&self, s: &str, size: f32, cx: f32, y: f32, bold: bool, color: RgbTriple) {
        let x = cx - text_width_pt(s, size) / 2.0;
        self.text(s, size, x, y, bold, color);
    }

    pub fn text_right(&self, s: &str, size: f32, right: f32, y: f32, bold: bool, color: RgbTriple) {
        let x = right - text_width_pt(s, size);
        self.text(s, size, x, y, bold, color);
    }

    /// Filled rectangle; `y` is the top edge in points from the top.
    pub fn fill_rect(&self, x: f32, y: f32, w: f32, h: f32, color: RgbTriple) {
        let (r, g, b) = color;
        self.layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
        let rect = Rect::new(
            Mm(x * PT_TO_MM),
            Mm((PAGE_H_PT - y - h) * PT_TO_MM),
            Mm((x + w) * PT_TO_MM),
            Mm((PAGE_H_PT - y) * PT_TO_MM),
        )
        .with_mode(PaintMode::Fill);
        self.layer.add_rect(rect);
    }

    /// Cell border; same coordinate convention as `fill_rect`.
    pub fn stroke_rect(&self, x: f32, y: f32, w: f32, h: f32) {
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        self.layer.set_outline_thickness(0.75);
        let rect = Rect::new(
            Mm(x * PT_TO_MM),
            Mm((PAGE_H_PT - y - h) * PT_TO_MM),
            Mm((x + w) * PT_TO_MM),
            Mm((PAGE_H_PT - y) * PT_TO_MM),
        )
        .with_mode(PaintMode::Stroke);
        self.layer.add_rect(rect);
    }

    pub fn finish(self) -> Result<Vec<u8>, printpdf::Error> {
        self.doc.save_to_bytes()
    }
}

/// Approximate rendered width of a string in points. Helvetica metrics
/// averaged per character class; CJK glyphs are treated as full-width.
/// Good enough for centering, right-alignment and cell wrapping.
pub fn text_width_pt(text: &str, size: f32) -> f32 {
    text.chars()
        .map(|c| {
            if ('\u{4e00}'..='\u{9fff}').contains(&c) {
                size
            } else if c == ' ' {
                size * 0.28
            } else if c.is_ascii_uppercase() || c.is_ascii_digit() {
                size * 0.6
            } else {
                size * 0.5
            }
        })
        .sum()
}

/// Greedy word wrap against the approximate width metric. Overlong
/// single words (and CJK runs, which carry no spaces) break mid-word.
pub fn wrap_text(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    let mut push_word = |lines: &mut Vec<String>, current: &mut String, word: &str| {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width_pt(&candidate, size) <= max_width {
            *current = candidate;
            return;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(current));
        }
        // Break an overlong word character by character
        let mut piece = String::new();
        for ch in word.chars() {
            piece.push(ch);
            if text_width_pt(&piece, size) > max_width && piece.chars().count() > 1 {
                piece.pop();
                lines.push(piece.clone());
                piece.clear();
                piece.push(ch);
            }
        }
        *current = piece;
    };

    for word in text.split_whitespace() {
        push_word(&mut lines, &mut current, word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap_text("Annual", 8.0, 70.0), vec!["Annual"]);
    }

    #[test]
    fn long_text_wraps_at_word_boundaries() {
        let lines = wrap_text("Chan Tai Man Wong Siu Ming", 8.0, 50.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_pt(line, 8.0) <= 50.0, "{line}");
        }
    }

    #[test]
    fn cjk_runs_break_mid_word() {
        let lines = wrap_text("陳大文陳大文陳大文陳大文", 8.0, 30.0);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(text_width_pt(line, 8.0) <= 30.0, "{line}");
        }
    }

    #[test]
    fn empty_text_yields_one_empty_line() {
        assert_eq!(wrap_text("", 8.0, 50.0), vec![""]);
    }

    #[test]
    fn cjk_glyphs_measure_full_width() {
        assert!(text_width_pt("例", 10.0) > text_width_pt("e", 10.0));
    }
}
