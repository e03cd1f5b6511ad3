use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// One slot of the Sunday-first month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDate {
    pub date: NaiveDate,
    /// False for filler dates borrowed from the adjacent months to
    /// complete a 7-day week row.
    pub in_month: bool,
}

impl GridDate {
    /// Weekday index, 0 = Sunday .. 6 = Saturday.
    pub fn weekday_index(&self) -> u32 {
        self.date.weekday().num_days_from_sunday()
    }

    pub fn is_sunday(&self) -> bool {
        self.date.weekday() == Weekday::Sun
    }
}

/// Number of days in a month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid year-month");
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .expect("valid year-month");
    (next - first).num_days() as u32
}

/// Sunday-first week grid for a month: every row has exactly 7 slots,
/// every in-month date appears exactly once, and the row count is
/// `ceil((days_in_month + leading_offset) / 7)`.
pub fn month_grid(year: i32, month: u32) -> Vec<Vec<GridDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).expect("valid year-month");
    let leading = first.weekday().num_days_from_sunday();
    let total = days_in_month(year, month) + leading;
    let rows = total.div_ceil(7);

    let start = first - Duration::days(leading as i64);
    let mut weeks = Vec::with_capacity(rows as usize);
    let mut cursor = start;
    for _ in 0..rows {
        let mut week = Vec::with_capacity(7);
        for _ in 0..7 {
            week.push(GridDate {
                date: cursor,
                in_month: cursor.month() == month && cursor.year() == year,
            });
            cursor += Duration::days(1);
        }
        weeks.push(week);
    }
    weeks
}

/// Day-number rows in the classic month-calendar shape: out-of-month
/// slots are 0. This is what the JSON calendar view and the calendar PDF
/// table are built from.
pub fn month_day_rows(year: i32, month: u32) -> Vec<[u32; 7]> {
    month_grid(year, month)
        .iter()
        .map(|week| {
            let mut row = [0u32; 7];
            for (i, slot) in week.iter().enumerate() {
                if slot.in_month {
                    row[i] = slot.date.day();
                }
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_in_month_date_appears_exactly_once() {
        for (year, month) in [(2025, 1), (2025, 2), (2024, 2), (2026, 3), (2023, 12)] {
            let grid = month_grid(year, month);
            let mut seen = Vec::new();
            for week in &grid {
                assert_eq!(week.len(), 7);
                for slot in week {
                    if slot.in_month {
                        seen.push(slot.date.day());
                    }
                }
            }
            let n = days_in_month(year, month);
            assert_eq!(seen.len() as u32, n, "{year}-{month}");
            for d in 1..=n {
                assert!(seen.contains(&d), "{year}-{month} missing day {d}");
            }
        }
    }

    #[test]
    fn row_count_matches_ceiling_formula() {
        for (year, month) in [(2025, 1), (2025, 2), (2025, 3), (2026, 8), (2015, 2)] {
            let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
            let leading = first.weekday().num_days_from_sunday();
            let expected = (days_in_month(year, month) + leading).div_ceil(7);
            assert_eq!(month_grid(year, month).len() as u32, expected);
        }
    }

    #[test]
    fn february_2015_fits_in_four_rows() {
        // 2015-02-01 is a Sunday and February had 28 days
        assert_eq!(month_grid(2015, 2).len(), 4);
    }

    #[test]
    fn grid_starts_on_sunday_and_wraps_months() {
        let grid = month_grid(2025, 1);
        // January 2025 starts on a Wednesday; the row opens with Dec 29
        assert_eq!(
            grid[0][0].date,
            NaiveDate::from_ymd_opt(2024, 12, 29).unwrap()
        );
        assert!(!grid[0][0].in_month);
        assert!(grid[0][0].is_sunday());
        assert_eq!(grid[0][3].date.day(), 1);
        assert!(grid[0][3].in_month);
    }

    #[test]
    fn day_rows_use_zero_for_filler() {
        let rows = month_day_rows(2025, 1);
        assert_eq!(rows[0][..3], [0, 0, 0]);
        assert_eq!(rows[0][3], 1);
        let last = rows.last().unwrap();
        assert_eq!(last[6], 0); // Feb 1 slot
        assert_eq!(last[5], 31);
    }

    #[test]
    fn weekday_index_is_sunday_first() {
        let d = GridDate {
            date: NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(), // Sunday
            in_month: true,
        };
        assert_eq!(d.weekday_index(), 0);
        let d = GridDate {
            date: NaiveDate::from_ymd_opt(2025, 1, 11).unwrap(), // Saturday
            in_month: true,
        };
        assert_eq!(d.weekday_index(), 6);
    }
}
