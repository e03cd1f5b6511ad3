use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single raw clock-in/out event from the time-clock store.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ClockEvent {
    pub check_time: NaiveDateTime,
    /// Identifier of the sensor/device that recorded the event;
    /// sensor "1" is rendered in a distinct color
    pub sensor_id: String,
}
