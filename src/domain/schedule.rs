// ==========================================
// Academic Records Core - Schedule Slot
// ==========================================
// A recurring weekly time window: (day, start, end, derived period).
// Conflict checks always compare slots by id, never by overlap math.
// ==========================================

use crate::domain::types::Period;
use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

/// A weekly schedule slot, e.g. Monday 08:00-10:00 (MORNING).
///
/// `period` is derived from `start_time` at construction and kept in sync
/// on update; it is never set independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSlot {
    pub id: i64,
    pub day_of_week: Weekday,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub period: Period,
}

impl ScheduleSlot {
    pub fn new(id: i64, day_of_week: Weekday, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            id,
            day_of_week,
            start_time,
            end_time,
            period: derive_period(start_time),
        }
    }

    /// Start must strictly precede end; slots never wrap past midnight.
    pub fn is_well_formed(&self) -> bool {
        self.start_time < self.end_time
    }

    /// Human-readable label used in conflict error messages,
    /// e.g. "Mon at 08:00".
    pub fn label(&self) -> String {
        format!("{} at {}", self.day_of_week, self.start_time.format("%H:%M"))
    }
}

/// Classify a start time into a day period.
pub fn derive_period(start_time: NaiveTime) -> Period {
    let hour = start_time.hour();
    if hour < 12 {
        Period::Morning
    } else if hour < 18 {
        Period::Afternoon
    } else {
        Period::Evening
    }
}
