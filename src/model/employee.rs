use serde::{Deserialize, Serialize};

/// Employee row of the time-clock store. `badge_no` is the number printed
/// on the staff badge and is the ordering key for timetable sections.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub badge_no: String,
}
