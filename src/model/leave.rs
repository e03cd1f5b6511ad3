use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One covered day of a leave application, joined to the staff identity.
/// The leave store keeps a master row per application (`leaves`) and one
/// detail row per covered date (`leave_dates`); queries return the join.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaveDayRow {
    pub leave_date: NaiveDate,
    pub staff_code: String,
    /// Chinese name when present, English name otherwise (resolved in SQL)
    pub staff_name: String,
    pub leave_type: i32,
    pub leave_id: u64,
}

/// Leave-schedule range row of the time-clock store, joined to the
/// leave class name. Ranges may span month boundaries.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaveScheduleRow {
    pub start_day: NaiveDate,
    pub end_day: NaiveDate,
    pub leave_name: String,
}
