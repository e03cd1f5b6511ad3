use crate::pdf::doc::{DocWriter, PageChrome, wrap_text};
use crate::pdf::{
    BLACK, DAY_FONT_SIZE, FILLER_GREY, HIGHLIGHT_PINK, PAGE_W_PT, RED, RgbTriple,
};
use crate::report::ReportError;
use crate::report::leave::LeaveGroup;
use crate::utils::text::month_year_label;
use std::collections::BTreeMap;

const COL_W: f32 = 74.0;
const GRID_X: f32 = (PAGE_W_PT - 7.0 * COL_W) / 2.0;
const HEADER_ROW_H: f32 = 16.0;
const MIN_ROW_H: f32 = 52.0;
const CELL_PAD: f32 = 3.0;
const GROUP_FONT_SIZE: f32 = 8.0;
const HOLIDAY_FONT_SIZE: f32 = 5.0;
const LINE_H: f32 = GROUP_FONT_SIZE * 1.2;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// One rendered day cell's pre-wrapped content lines.
struct CellContent {
    day: u32,
    highlight: bool,
    holiday: Option<Vec<String>>,
    group_lines: Vec<String>,
}

fn group_label(group: &LeaveGroup) -> String {
    let names: Vec<&str> = group.staff.iter().map(|s| s.staff_name.as_str()).collect();
    format!("{}: {}", names.join(", "), group.short_description)
}

fn cell_content(
    day: u32,
    weekday: usize,
    holidays: &BTreeMap<u32, String>,
    leave_groups: &BTreeMap<u32, Vec<LeaveGroup>>,
) -> CellContent {
    let text_width = COL_W - 2.0 * CELL_PAD;
    let holiday = holidays
        .get(&day)
        .map(|name| wrap_text(name, HOLIDAY_FONT_SIZE, text_width));
    let mut group_lines = Vec::new();
    if let Some(groups) = leave_groups.get(&day) {
        for group in groups {
            group_lines.extend(wrap_text(&group_label(group), GROUP_FONT_SIZE, text_width));
        }
    }
    CellContent {
        day,
        highlight: weekday == 0 || holidays.contains_key(&day),
        holiday,
        group_lines,
    }
}

fn cell_height(cell: &CellContent) -> f32 {
    let mut h = DAY_FONT_SIZE + 2.0 * CELL_PAD;
    if let Some(lines) = &cell.holiday {
        h += lines.len() as f32 * HOLIDAY_FONT_SIZE * 1.2;
    }
    h += cell.group_lines.len() as f32 * LINE_H;
    h.max(MIN_ROW_H)
}

fn draw_day_header(writer: &DocWriter, y: f32) {
    for (i, name) in DAY_NAMES.iter().enumerate() {
        let x = GRID_X + i as f32 * COL_W;
        writer.fill_rect(x, y, COL_W, HEADER_ROW_H, FILLER_GREY);
        writer.stroke_rect(x, y, COL_W, HEADER_ROW_H);
        let color: RgbTriple = if i == 0 { RED } else { BLACK };
        writer.text_centered(name, 10.0, x + COL_W / 2.0, y + 12.0, true, color);
    }
}

fn draw_cell(writer: &DocWriter, x: f32, y: f32, h: f32, cell: Option<&CellContent>) {
    match cell {
        None => {
            writer.fill_rect(x, y, COL_W, h, FILLER_GREY);
            writer.stroke_rect(x, y, COL_W, h);
        }
        Some(cell) => {
            if cell.highlight {
                writer.fill_rect(x, y, COL_W, h, HIGHLIGHT_PINK);
            }
            writer.stroke_rect(x, y, COL_W, h);

            let day_color = if cell.highlight { RED } else { BLACK };
            let mut text_y = y + CELL_PAD + DAY_FONT_SIZE;
            writer.text(
                &cell.day.to_string(),
                DAY_FONT_SIZE,
                x + CELL_PAD,
                text_y,
                true,
                day_color,
            );

            if let Some(lines) = &cell.holiday {
                for line in lines {
                    text_y += HOLIDAY_FONT_SIZE * 1.2;
                    writer.text(line, HOLIDAY_FONT_SIZE, x + CELL_PAD, text_y, false, RED);
                }
            }
            for line in &cell.group_lines {
                text_y += LINE_H;
                writer.text(line, GROUP_FONT_SIZE, x + CELL_PAD, text_y, false, BLACK);
            }
        }
    }
}

/// Render the month leave calendar as a single PDF buffer. `day_rows` is
/// the Sunday-first grid with 0 for out-of-month filler slots, which
/// render as bare grey cells with no annotations.
pub fn render_calendar_document(
    year: i32,
    month: u32,
    day_rows: &[[u32; 7]],
    leave_groups: &BTreeMap<u32, Vec<LeaveGroup>>,
    holidays: &BTreeMap<u32, String>,
    chrome: PageChrome,
    cjk_font: Option<&[u8]>,
) -> Result<Vec<u8>, ReportError> {
    let title = format!("HR Leave Calendar - {}", month_year_label(year, month));
    let mut writer = DocWriter::new(&title, chrome, cjk_font)
        .map_err(|e| ReportError::Render(e.to_string()))?;

    writer.cursor += 8.0;
    writer.text_centered(&title, 16.0, PAGE_W_PT / 2.0, writer.cursor + 16.0, true, BLACK);
    writer.cursor += 28.0;

    writer.ensure_space(HEADER_ROW_H);
    draw_day_header(&writer, writer.cursor);
    writer.cursor += HEADER_ROW_H;

    for row in day_rows {
        let cells: Vec<Option<CellContent>> = row
            .iter()
            .enumerate()
            .map(|(weekday, &day)| {
                (day != 0).then(|| cell_content(day, weekday, holidays, leave_groups))
            })
            .collect();
        let row_h = cells
            .iter()
            .flatten()
            .map(cell_height)
            .fold(MIN_ROW_H, f32::max);

        // Keep each week row whole; repeat the day-name header after a break
        if writer.ensure_space(row_h) {
            draw_day_header(&writer, writer.cursor);
            writer.cursor += HEADER_ROW_H;
        }
        let y = writer.cursor;
        for (i, cell) in cells.iter().enumerate() {
            draw_cell(&writer, GRID_X + i as f32 * COL_W, y, row_h, cell.as_ref());
        }
        writer.cursor += row_h;
    }

    writer
        .finish()
        .map_err(|e| ReportError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::grid::month_day_rows;
    use crate::report::leave::{LeaveStatus, StaffRef};

    fn chrome() -> PageChrome {
        PageChrome {
            title: "Etak Logistics Limited".to_string(),
            subtitle: "Leave Calendar - January 2025".to_string(),
            printed_at: "2025-01-15 09:30:00 AM".to_string(),
        }
    }

    fn sample_groups() -> BTreeMap<u32, Vec<LeaveGroup>> {
        let mut groups = BTreeMap::new();
        groups.insert(
            6,
            vec![LeaveGroup {
                leave_type: 2,
                status: LeaveStatus::Approved,
                short_description: "AL".to_string(),
                staff: vec![
                    StaffRef {
                        staff_code: "TR001".to_string(),
                        staff_name: "Chan Tai Man".to_string(),
                    },
                    StaffRef {
                        staff_code: "TR002".to_string(),
                        staff_name: "陳大文".to_string(),
                    },
                ],
            }],
        );
        groups
    }

    #[test]
    fn renders_a_pdf_buffer() {
        let rows = month_day_rows(2025, 1);
        let mut holidays = BTreeMap::new();
        holidays.insert(1, "The first day of January".to_string());
        let bytes = render_calendar_document(
            2025,
            1,
            &rows,
            &sample_groups(),
            &holidays,
            chrome(),
            None,
        )
        .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn empty_month_still_renders() {
        let rows = month_day_rows(2025, 2);
        let bytes = render_calendar_document(
            2025,
            2,
            &rows,
            &BTreeMap::new(),
            &BTreeMap::new(),
            chrome(),
            None,
        )
        .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn group_label_joins_names_with_code() {
        let group = LeaveGroup {
            leave_type: 7,
            status: LeaveStatus::Approved,
            short_description: "例".to_string(),
            staff: vec![
                StaffRef {
                    staff_code: "TR001".to_string(),
                    staff_name: "Chan".to_string(),
                },
                StaffRef {
                    staff_code: "TR002".to_string(),
                    staff_name: "Wong".to_string(),
                },
            ],
        };
        assert_eq!(group_label(&group), "Chan, Wong: 例");
    }
}
