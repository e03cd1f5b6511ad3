pub mod calendar;
pub mod doc;
pub mod timetable;

/// A4 in PostScript points.
pub const PAGE_W_PT: f32 = 595.28;
pub const PAGE_H_PT: f32 = 841.89;
pub const MARGIN_PT: f32 = 36.0;

pub const HEADER_FONT_SIZE: f32 = 12.0;
pub const DAY_FONT_SIZE: f32 = 12.0;
pub const TIME_FONT_SIZE: f32 = 10.0;

pub type RgbTriple = (f32, f32, f32);

pub const BLACK: RgbTriple = (0.0, 0.0, 0.0);
pub const RED: RgbTriple = (1.0, 0.0, 0.0);
pub const BLUE: RgbTriple = (0.0, 0.0, 1.0);
pub const GREY: RgbTriple = (0.5, 0.5, 0.5);
/// Background of the day-name header row and out-of-month filler cells.
pub const FILLER_GREY: RgbTriple = (0.8, 0.8, 0.8);
/// Highlight for Sunday and holiday cells; identical for both reasons,
/// so double-application is a visual no-op.
pub const HIGHLIGHT_PINK: RgbTriple = (0.9882, 0.8941, 0.9255);

/// Bytes of the registered CJK font face, loaded once at startup and
/// shared across render calls. `None` means Helvetica-only output.
#[derive(Clone)]
pub struct CjkFont(pub Option<std::sync::Arc<Vec<u8>>>);

impl CjkFont {
    pub fn bytes(&self) -> Option<&[u8]> {
        self.0.as_deref().map(|v| v.as_slice())
    }
}
