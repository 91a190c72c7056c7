// ==========================================
// Academic Records Core - Class Section
// ==========================================
// A scheduled offering of a subject, taught by a professor at a given
// schedule slot, open to students of a given course, with a capacity.
//
// Invariant: 0 <= enrolled_count <= max_capacity at all times.
// enrolled_count is mutated only by the enrollment lifecycle through
// the increment/decrement entry points below (and their guarded SQL
// counterparts in the repository layer) - never written directly.
// ==========================================

use crate::domain::types::ClassStatus;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Occupancy counter violation at the capacity bound.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("class '{code}' is at capacity ({max_capacity})")]
pub struct CapacityExceeded {
    pub code: String,
    pub max_capacity: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassSection {
    pub id: i64,
    /// Unique, non-empty, case-sensitive section code.
    pub code: String,
    pub subject_id: i64,
    pub professor_id: i64,
    pub schedule_id: i64,
    pub course_id: i64,
    pub max_capacity: i64,
    pub enrolled_count: i64,
    /// Free-form semester label, e.g. "2024.1".
    pub semester: String,
    pub status: ClassStatus,
}

impl ClassSection {
    pub fn is_active(&self) -> bool {
        self.status == ClassStatus::Active
    }

    pub fn has_available_slots(&self) -> bool {
        self.enrolled_count < self.max_capacity
    }

    pub fn available_slots(&self) -> i64 {
        self.max_capacity - self.enrolled_count
    }

    /// Claim one seat. Fails at the capacity bound; never overshoots.
    pub fn increment_enrollment(&mut self) -> Result<(), CapacityExceeded> {
        if !self.has_available_slots() {
            return Err(CapacityExceeded {
                code: self.code.clone(),
                max_capacity: self.max_capacity,
            });
        }
        self.enrolled_count += 1;
        Ok(())
    }

    /// Release one seat. Floors at zero; never raises.
    pub fn decrement_enrollment(&mut self) {
        if self.enrolled_count > 0 {
            self.enrolled_count -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(enrolled: i64, max: i64) -> ClassSection {
        ClassSection {
            id: 1,
            code: "MATH101-A".to_string(),
            subject_id: 1,
            professor_id: 1,
            schedule_id: 1,
            course_id: 1,
            max_capacity: max,
            enrolled_count: enrolled,
            semester: "2024.1".to_string(),
            status: ClassStatus::Active,
        }
    }

    #[test]
    fn increment_stops_at_capacity() {
        let mut c = section(1, 2);
        assert!(c.has_available_slots());
        c.increment_enrollment().unwrap();
        assert_eq!(c.enrolled_count, 2);
        assert!(!c.has_available_slots());

        let err = c.increment_enrollment().unwrap_err();
        assert_eq!(err.max_capacity, 2);
        assert_eq!(c.enrolled_count, 2);
    }

    #[test]
    fn decrement_floors_at_zero() {
        let mut c = section(1, 5);
        c.decrement_enrollment();
        assert_eq!(c.enrolled_count, 0);
        // already drained: stays at zero, no error
        c.decrement_enrollment();
        assert_eq!(c.enrolled_count, 0);
    }

    #[test]
    fn available_slots_is_the_remaining_headroom() {
        assert_eq!(section(3, 5).available_slots(), 2);
        assert_eq!(section(5, 5).available_slots(), 0);
    }
}
