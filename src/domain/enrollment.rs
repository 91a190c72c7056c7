// ==========================================
// Academic Records Core - Enrollment
// ==========================================
// The relationship record binding one student to one class section.
// At most one ACTIVE enrollment may exist per (student, class) pair.
// ==========================================

use crate::domain::types::EnrollmentStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: i64,
    pub student_id: i64,
    pub class_id: i64,
    /// Stamped at creation, immutable afterwards.
    pub enrolled_at: DateTime<Utc>,
    pub status: EnrollmentStatus,
    /// Final grade, range [0.0, 10.0]. Filled at completion or while active.
    pub final_grade: Option<f64>,
    /// Attendance percentage, range [0.0, 100.0].
    pub attendance: Option<f64>,
    /// Set only on cancellation.
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,
}

impl Enrollment {
    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }
}

/// Grade must lie in [0, 10].
pub fn grade_in_range(grade: f64) -> bool {
    (0.0..=10.0).contains(&grade)
}

/// Attendance must lie in [0, 100].
pub fn attendance_in_range(attendance: f64) -> bool {
    (0.0..=100.0).contains(&attendance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_and_attendance_bounds() {
        assert!(grade_in_range(0.0));
        assert!(grade_in_range(10.0));
        assert!(!grade_in_range(10.01));
        assert!(!grade_in_range(-0.5));

        assert!(attendance_in_range(100.0));
        assert!(!attendance_in_range(100.5));
    }
}
