use crate::pdf::doc::{CONTENT_BOTTOM_PT, CONTENT_TOP_PT, DocWriter, PageChrome, wrap_text};
use crate::pdf::{
    BLACK, BLUE, DAY_FONT_SIZE, FILLER_GREY, GREY, HIGHLIGHT_PINK, PAGE_W_PT, RED,
    TIME_FONT_SIZE,
};
use crate::report::ReportError;
use crate::report::attendance::{DayCell, EmployeeMonthSheet};
use crate::utils::text::month_year_label;

const COL_W: f32 = 74.0;
const GRID_X: f32 = (PAGE_W_PT - 7.0 * COL_W) / 2.0;
const HEADER_ROW_H: f32 = 16.0;
const MIN_ROW_H: f32 = 48.0;
const CELL_PAD: f32 = 3.0;
const TIME_LINE_H: f32 = TIME_FONT_SIZE * 1.2;
const LEAVE_FONT_SIZE: f32 = 8.0;
const SECTION_HEADER_H: f32 = 30.0;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Table-of-contents row font size: fill the available height across all
/// rows, clamped to the readable range.
pub fn toc_font_size(available_height: f32, rows: usize) -> f32 {
    if rows == 0 {
        return 10.0;
    }
    (available_height / rows as f32).clamp(6.0, 10.0)
}

fn cell_height(cell: &DayCell) -> f32 {
    let mut h = DAY_FONT_SIZE + 2.0 * CELL_PAD;
    if !cell.in_month {
        return h.max(MIN_ROW_H);
    }
    if let Some(name) = &cell.leave {
        h += wrap_text(name, LEAVE_FONT_SIZE, COL_W - 2.0 * CELL_PAD).len() as f32
            * LEAVE_FONT_SIZE
            * 1.2;
    }
    h += cell.times.len() as f32 * TIME_LINE_H;
    h.max(MIN_ROW_H)
}

fn draw_day_header(writer: &DocWriter, y: f32) {
    for (i, name) in DAY_NAMES.iter().enumerate() {
        let x = GRID_X + i as f32 * COL_W;
        writer.fill_rect(x, y, COL_W, HEADER_ROW_H, FILLER_GREY);
        writer.stroke_rect(x, y, COL_W, HEADER_ROW_H);
        let color = if i == 0 { RED } else { BLACK };
        writer.text_centered(name, 10.0, x + COL_W / 2.0, y + 12.0, true, color);
    }
}

fn draw_cell(writer: &DocWriter, x: f32, y: f32, h: f32, cell: &DayCell) {
    if !cell.in_month {
        writer.fill_rect(x, y, COL_W, h, FILLER_GREY);
        writer.stroke_rect(x, y, COL_W, h);
        if cell.day != 0 {
            writer.text(
                &cell.day.to_string(),
                DAY_FONT_SIZE,
                x + CELL_PAD,
                y + CELL_PAD + DAY_FONT_SIZE,
                false,
                GREY,
            );
        }
        return;
    }

    if cell.is_sunday || cell.holiday.is_some() {
        writer.fill_rect(x, y, COL_W, h, HIGHLIGHT_PINK);
    }
    writer.stroke_rect(x, y, COL_W, h);

    let day_color = if cell.is_sunday || cell.holiday.is_some() {
        RED
    } else {
        BLACK
    };
    let mut text_y = y + CELL_PAD + DAY_FONT_SIZE;
    writer.text(
        &cell.day.to_string(),
        DAY_FONT_SIZE,
        x + CELL_PAD,
        text_y,
        true,
        day_color,
    );

    if let Some(name) = &cell.leave {
        for line in wrap_text(name, LEAVE_FONT_SIZE, COL_W - 2.0 * CELL_PAD) {
            text_y += LEAVE_FONT_SIZE * 1.2;
            writer.text(&line, LEAVE_FONT_SIZE, x + CELL_PAD, text_y, false, RED);
        }
    }
    for time in &cell.times {
        text_y += TIME_LINE_H;
        let color = if time.sensor1 { BLUE } else { BLACK };
        writer.text(&time.text, TIME_FONT_SIZE, x + CELL_PAD, text_y, false, color);
    }
}

fn draw_toc(
    writer: &mut DocWriter,
    sheets: &[EmployeeMonthSheet],
    department_summary: &(u32, Vec<(String, u32)>),
) {
    writer.cursor += 8.0;
    writer.text_centered(
        "Table of Contents",
        14.0,
        PAGE_W_PT / 2.0,
        writer.cursor + 14.0,
        true,
        BLACK,
    );
    writer.cursor += 26.0;

    let (working_days, leave_counts) = department_summary;
    let mut summary = format!("Department Total - Working Days: {working_days}");
    if leave_counts.is_empty() {
        summary.push_str(", Leaves: None");
    } else {
        let parts: Vec<String> = leave_counts
            .iter()
            .map(|(name, count)| format!("{name}: {count}"))
            .collect();
        summary.push_str(&format!(", Leaves: {}", parts.join(", ")));
    }
    writer.text(&summary, 10.0, GRID_X, writer.cursor + 10.0, true, BLACK);
    writer.cursor += 22.0;

    let font_size = toc_font_size(writer.remaining_space(), sheets.len());
    let line_h = font_size * 1.2;
    for (i, sheet) in sheets.iter().enumerate() {
        writer.ensure_space(line_h);
        let row = format!(
            "{:02} - {} {} ({})",
            i + 1,
            sheet.employee.badge_no,
            sheet.employee.name,
            sheet.summary_label()
        );
        writer.text(&row, font_size, GRID_X, writer.cursor + font_size, false, BLACK);
        writer.cursor += line_h;
    }
}

fn draw_sheet(writer: &mut DocWriter, sheet: &EmployeeMonthSheet) {
    let row_heights: Vec<f32> = sheet
        .weeks
        .iter()
        .map(|week| week.iter().map(cell_height).fold(MIN_ROW_H, f32::max))
        .collect();
    let table_h: f32 = HEADER_ROW_H + row_heights.iter().sum::<f32>();

    // A section moves to a fresh page whole when it would fit on one;
    // oversized tables paginate by week row instead.
    let needed = SECTION_HEADER_H + table_h;
    if needed > writer.remaining_space()
        && needed <= CONTENT_BOTTOM_PT - CONTENT_TOP_PT
    {
        writer.new_page();
    }
    writer.ensure_space(SECTION_HEADER_H + HEADER_ROW_H + MIN_ROW_H);

    let header = format!("{} {}", sheet.employee.badge_no, sheet.employee.name);
    writer.cursor += 6.0;
    writer.text(&header, 12.0, GRID_X, writer.cursor + 12.0, true, BLACK);
    writer.cursor += 16.0;
    writer.text(&sheet.summary_label(), 9.0, GRID_X, writer.cursor + 9.0, false, GREY);
    writer.cursor += SECTION_HEADER_H - 22.0;

    draw_day_header(writer, writer.cursor);
    writer.cursor += HEADER_ROW_H;

    for (week, &row_h) in sheet.weeks.iter().zip(&row_heights) {
        if writer.ensure_space(row_h) {
            draw_day_header(writer, writer.cursor);
            writer.cursor += HEADER_ROW_H;
        }
        let y = writer.cursor;
        for (i, cell) in week.iter().enumerate() {
            draw_cell(writer, GRID_X + i as f32 * COL_W, y, row_h, cell);
        }
        writer.cursor += row_h;
    }
}

/// Render the department timetable as a single PDF buffer. `sheets` must
/// already be filtered to active employees in badge order; the TOC uses
/// the same ordering.
pub fn render_timetable_document(
    department: &str,
    year: i32,
    month: u32,
    sheets: &[EmployeeMonthSheet],
    include_toc: bool,
    department_summary: &(u32, Vec<(String, u32)>),
    chrome: PageChrome,
    cjk_font: Option<&[u8]>,
) -> Result<Vec<u8>, ReportError> {
    let title = format!(
        "Attendance Timetable - {} - {}",
        department,
        month_year_label(year, month)
    );
    let mut writer = DocWriter::new(&title, chrome, cjk_font)
        .map_err(|e| ReportError::Render(e.to_string()))?;

    if include_toc {
        draw_toc(&mut writer, sheets, department_summary);
        if !sheets.is_empty() {
            writer.new_page();
        }
    }

    for (i, sheet) in sheets.iter().enumerate() {
        if i > 0 {
            writer.cursor += 12.0;
        }
        draw_sheet(&mut writer, sheet);
    }

    writer
        .finish()
        .map_err(|e| ReportError::Render(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::ClockEvent;
    use crate::model::employee::Employee;
    use crate::report::attendance::group_clock_events;
    use crate::report::grid::month_grid;
    use crate::report::holidays::general_holidays;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    #[test]
    fn toc_font_fills_available_height_within_clamp() {
        assert_eq!(toc_font_size(700.0, 100), 7.0);
        assert_eq!(toc_font_size(700.0, 20), 10.0);
        assert_eq!(toc_font_size(700.0, 1000), 6.0);
    }

    #[test]
    fn toc_font_handles_empty_roster() {
        assert_eq!(toc_font_size(700.0, 0), 10.0);
    }

    fn sample_sheet() -> EmployeeMonthSheet {
        let employee = Employee {
            id: 1,
            name: "Chan Tai Man".to_string(),
            badge_no: "1823".to_string(),
        };
        let grid = month_grid(2025, 1);
        let checks = group_clock_events(vec![
            ClockEvent {
                check_time: NaiveDate::from_ymd_opt(2025, 1, 6)
                    .unwrap()
                    .and_hms_opt(8, 0, 0)
                    .unwrap(),
                sensor_id: "1".to_string(),
            },
            ClockEvent {
                check_time: NaiveDate::from_ymd_opt(2025, 1, 6)
                    .unwrap()
                    .and_hms_opt(17, 30, 0)
                    .unwrap(),
                sensor_id: "2".to_string(),
            },
        ]);
        let mut leaves = BTreeMap::new();
        leaves.insert(
            NaiveDate::from_ymd_opt(2025, 1, 13).unwrap(),
            "Annual".to_string(),
        );
        EmployeeMonthSheet::build(
            employee,
            &grid,
            Some(&checks),
            Some(&leaves),
            &general_holidays(2025),
        )
    }

    fn chrome() -> PageChrome {
        PageChrome {
            title: "Etak Logistics Limited".to_string(),
            subtitle: "Transportation - January 2025".to_string(),
            printed_at: "2025-02-01 10:00:00 AM".to_string(),
        }
    }

    #[test]
    fn renders_a_pdf_buffer_with_toc() {
        let sheets = vec![sample_sheet()];
        let summary = (1, vec![("Annual".to_string(), 1)]);
        let bytes = render_timetable_document(
            "Transportation",
            2025,
            1,
            &sheets,
            true,
            &summary,
            chrome(),
            None,
        )
        .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }

    #[test]
    fn renders_without_toc() {
        let sheets = vec![sample_sheet()];
        let summary = (1, vec![]);
        let bytes = render_timetable_document(
            "Transportation",
            2025,
            1,
            &sheets,
            false,
            &summary,
            chrome(),
            None,
        )
        .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn many_employees_paginate_without_panicking() {
        let sheets: Vec<EmployeeMonthSheet> = (0..8).map(|_| sample_sheet()).collect();
        let summary = (8, vec![("Annual".to_string(), 8)]);
        let bytes = render_timetable_document(
            "Transportation",
            2025,
            1,
            &sheets,
            true,
            &summary,
            chrome(),
            None,
        )
        .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
