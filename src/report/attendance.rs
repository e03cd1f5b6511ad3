use crate::model::attendance::ClockEvent;
use crate::model::employee::Employee;
use crate::model::leave::LeaveScheduleRow;
use crate::report::error::ReportError;
use crate::report::grid::{GridDate, month_grid};
use crate::report::holidays::Holiday;
use crate::utils::text::format_clock_time;
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use sqlx::MySqlPool;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::debug;

/// One deduplicated display time inside a timetable cell.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DisplayTime {
    pub text: String,
    /// Events from sensor "1" are rendered in a distinct color
    pub sensor1: bool,
}

/// The unit the grid renderer produces for the timetable: one day slot
/// with its classification flags and annotations. The holiday and Sunday
/// flags are independent; both may be set at once.
#[derive(Debug, Clone, Serialize)]
pub struct DayCell {
    pub day: u32,
    pub in_month: bool,
    /// 0 = Sunday .. 6 = Saturday
    pub weekday: u32,
    pub is_sunday: bool,
    pub holiday: Option<String>,
    pub leave: Option<String>,
    pub times: Vec<DisplayTime>,
}

/// Everything the timetable document needs for one employee.
#[derive(Debug, Clone, Serialize)]
pub struct EmployeeMonthSheet {
    pub employee: Employee,
    pub working_days: u32,
    /// (leave name, day count) in first-seen order
    pub leave_counts: Vec<(String, u32)>,
    pub weeks: Vec<Vec<DayCell>>,
}

/// Raw aggregation result for one department and month window.
#[derive(Debug, Default)]
pub struct AttendanceData {
    /// All employees of the department in badge order, including those
    /// without data (the sheet builder filters them out)
    pub employees: Vec<Employee>,
    pub checks: HashMap<u64, BTreeMap<NaiveDate, Vec<ClockEvent>>>,
    pub leaves: HashMap<u64, BTreeMap<NaiveDate, String>>,
}

impl AttendanceData {
    pub fn has_data(&self, employee_id: u64) -> bool {
        self.checks.contains_key(&employee_id) || self.leaves.contains_key(&employee_id)
    }

    /// Employees with at least one clock or leave record, badge order.
    /// Applied identically to the TOC and the document body.
    pub fn active_employees(&self) -> Vec<&Employee> {
        self.employees
            .iter()
            .filter(|e| self.has_data(e.id))
            .collect()
    }

    /// Department-wide totals for the TOC summary line: working days
    /// count clock days not covered by leave; leave counts are summed
    /// per leave name across all employees, in-month dates only.
    pub fn department_summary(&self, month: u32) -> (u32, Vec<(String, u32)>) {
        let mut working_days = 0;
        for (employee_id, days) in &self.checks {
            for date in days.keys() {
                if date.month() != month {
                    continue;
                }
                let on_leave = self
                    .leaves
                    .get(employee_id)
                    .is_some_and(|l| l.contains_key(date));
                if !on_leave {
                    working_days += 1;
                }
            }
        }

        let mut leave_counts: Vec<(String, u32)> = Vec::new();
        for days in self.leaves.values() {
            for (date, name) in days {
                if date.month() != month {
                    continue;
                }
                match leave_counts.iter_mut().find(|(n, _)| n == name) {
                    Some((_, count)) => *count += 1,
                    None => leave_counts.push((name.clone(), 1)),
                }
            }
        }
        (working_days, leave_counts)
    }
}

/// Group raw clock events by calendar date, preserving time order.
pub fn group_clock_events(events: Vec<ClockEvent>) -> BTreeMap<NaiveDate, Vec<ClockEvent>> {
    let mut daily: BTreeMap<NaiveDate, Vec<ClockEvent>> = BTreeMap::new();
    for event in events {
        daily.entry(event.check_time.date()).or_default().push(event);
    }
    daily
}

/// Collapse a day's events to display entries: two punches formatting to
/// the same displayed minute become one entry (first event wins its
/// sensor tag).
pub fn display_times(events: &[ClockEvent]) -> Vec<DisplayTime> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for event in events {
        let text = format_clock_time(&event.check_time);
        if seen.insert(text.clone()) {
            out.push(DisplayTime {
                text,
                sensor1: event.sensor_id == "1",
            });
        }
    }
    out
}

/// Expand leave ranges into a per-date name lookup restricted to the
/// grid window. Overlapping ranges resolve last-write-wins per date.
pub fn expand_leave_ranges(
    rows: &[LeaveScheduleRow],
    window: &[GridDate],
) -> BTreeMap<NaiveDate, String> {
    let mut days = BTreeMap::new();
    for row in rows {
        for slot in window {
            if row.start_day <= slot.date && slot.date <= row.end_day {
                days.insert(slot.date, row.leave_name.clone());
            }
        }
    }
    days
}

impl EmployeeMonthSheet {
    /// Assemble the per-employee sheet from the aggregated maps. Leave
    /// days take precedence over clock data in the summary counts, and
    /// out-of-month filler slots never carry annotations.
    pub fn build(
        employee: Employee,
        grid: &[Vec<GridDate>],
        checks: Option<&BTreeMap<NaiveDate, Vec<ClockEvent>>>,
        leaves: Option<&BTreeMap<NaiveDate, String>>,
        holidays: &BTreeMap<NaiveDate, Holiday>,
    ) -> Self {
        let mut working_days = 0;
        let mut leave_counts: Vec<(String, u32)> = Vec::new();
        let mut weeks = Vec::with_capacity(grid.len());

        for week in grid {
            let mut cells = Vec::with_capacity(7);
            for slot in week {
                let mut cell = DayCell {
                    day: slot.date.day(),
                    in_month: slot.in_month,
                    weekday: slot.weekday_index(),
                    is_sunday: slot.is_sunday(),
                    holiday: None,
                    leave: None,
                    times: Vec::new(),
                };

                if slot.in_month {
                    cell.holiday = holidays.get(&slot.date).map(|h| h.name.to_string());

                    if let Some(name) = leaves.and_then(|l| l.get(&slot.date)) {
                        cell.leave = Some(name.clone());
                        match leave_counts.iter_mut().find(|(n, _)| n == name) {
                            Some((_, count)) => *count += 1,
                            None => leave_counts.push((name.clone(), 1)),
                        }
                    } else if let Some(events) = checks.and_then(|c| c.get(&slot.date)) {
                        working_days += 1;
                        cell.times = display_times(events);
                    }

                    // A leave day may still show its punches
                    if cell.leave.is_some() {
                        if let Some(events) = checks.and_then(|c| c.get(&slot.date)) {
                            cell.times = display_times(events);
                        }
                    }
                }

                cells.push(cell);
            }
            weeks.push(cells);
        }

        EmployeeMonthSheet {
            employee,
            working_days,
            leave_counts,
            weeks,
        }
    }

    /// "Working Days: N, Leaves: Annual: 2, ..." label used in both the
    /// TOC row and the section header.
    pub fn summary_label(&self) -> String {
        let mut label = format!("Working Days: {}", self.working_days);
        if self.leave_counts.is_empty() {
            label.push_str(", Leaves: None");
        } else {
            let parts: Vec<String> = self
                .leave_counts
                .iter()
                .map(|(name, count)| format!("{name}: {count}"))
                .collect();
            label.push_str(&format!(", Leaves: {}", parts.join(", ")));
        }
        label
    }
}

/// Fetch one department's attendance and leave-schedule data for the
/// full grid window of a month. A missing department is an error
/// distinct from a department with nothing to report.
pub async fn fetch_attendance(
    pool: &MySqlPool,
    department: &str,
    year: i32,
    month: u32,
) -> Result<AttendanceData, ReportError> {
    let dept_id = sqlx::query_scalar::<_, u64>("SELECT id FROM departments WHERE name = ?")
        .bind(department)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ReportError::DepartmentNotFound(department.to_string()))?;

    let employees = sqlx::query_as::<_, Employee>(
        r#"
        SELECT id, name, badge_no
        FROM employees
        WHERE dept_id = ?
        ORDER BY badge_no
        "#,
    )
    .bind(dept_id)
    .fetch_all(pool)
    .await?;

    // Window covers every grid date touching the month, including the
    // adjacent-month filler days; in-month filtering happens downstream.
    let grid = month_grid(year, month);
    let window: Vec<GridDate> = grid.iter().flatten().copied().collect();
    let start = window.first().expect("grid is never empty").date;
    let end_excl = window.last().expect("grid is never empty").date + Duration::days(1);
    let start_dt = start.and_hms_opt(0, 0, 0).expect("midnight is valid");
    let end_dt = end_excl.and_hms_opt(0, 0, 0).expect("midnight is valid");

    let mut data = AttendanceData {
        employees,
        ..Default::default()
    };

    for employee in &data.employees {
        let events = sqlx::query_as::<_, ClockEvent>(
            r#"
            SELECT check_time, sensor_id
            FROM clock_events
            WHERE employee_id = ? AND check_time >= ? AND check_time < ?
            ORDER BY check_time
            "#,
        )
        .bind(employee.id)
        .bind(start_dt)
        .bind(end_dt)
        .fetch_all(pool)
        .await?;
        if !events.is_empty() {
            data.checks.insert(employee.id, group_clock_events(events));
        }

        let schedules = sqlx::query_as::<_, LeaveScheduleRow>(
            r#"
            SELECT ls.start_day, ls.end_day, lc.name AS leave_name
            FROM leave_schedules ls
            INNER JOIN leave_classes lc ON ls.leave_class_id = lc.id
            WHERE ls.employee_id = ? AND ls.start_day < ? AND ls.end_day > ?
            "#,
        )
        .bind(employee.id)
        .bind(end_excl)
        .bind(start)
        .fetch_all(pool)
        .await?;
        if !schedules.is_empty() {
            let days = expand_leave_ranges(&schedules, &window);
            if !days.is_empty() {
                data.leaves.insert(employee.id, days);
            }
        }
    }

    if data.checks.is_empty() && data.leaves.is_empty() {
        debug!(department, year, month, "no attendance or leave data");
        return Err(ReportError::NoData);
    }

    Ok(data)
}
