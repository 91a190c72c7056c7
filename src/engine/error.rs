// ==========================================
// Academic Records Core - Engine Errors
// ==========================================
// Closed, per-operation error enums instead of catch-by-subtype
// exception dispatch. Every business-rule rejection is raised at the
// point of detection and propagates unmodified to the boundary; no
// silent recovery, no retries.
//
// The embedding layer translates `kind()` into transport codes; the
// core never decides wire format.
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// Coarse taxonomy of engine failures, for boundary translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A referenced entity is absent.
    NotFound,
    /// A business rule rejected the mutation (clash, capacity, duplicate,
    /// cardinality guard).
    Conflict,
    /// The entity's current status disallows the operation.
    InvalidState,
    /// A supplied value is out of range or inconsistent.
    InvalidInput,
    /// Infrastructure failure below the business rules.
    Internal,
}

// ==========================================
// Class lifecycle errors
// ==========================================

#[derive(Error, Debug)]
pub enum ClassError {
    #[error("subject not found: id={0}")]
    SubjectNotFound(i64),

    #[error("professor not found: id={0}")]
    ProfessorNotFound(i64),

    #[error("schedule slot not found: id={0}")]
    ScheduleNotFound(i64),

    #[error("course not found: id={0}")]
    CourseNotFound(i64),

    #[error("class section not found: id={0}")]
    ClassNotFound(i64),

    #[error("professor '{professor}' already has an active class at {slot}")]
    ProfessorScheduleConflict { professor: String, slot: String },

    #[error("a class section with code '{0}' already exists")]
    DuplicateCode(String),

    #[error("capacity must be positive, got {0}")]
    NonPositiveCapacity(i64),

    #[error("capacity {requested} is below the current enrollment ({enrolled})")]
    InvalidCapacity { requested: i64, enrolled: i64 },

    #[error("class '{code}' still has {enrolled} enrollment(s) counted against it")]
    HasActiveEnrollments { code: String, enrolled: i64 },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ClassError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClassError::SubjectNotFound(_)
            | ClassError::ProfessorNotFound(_)
            | ClassError::ScheduleNotFound(_)
            | ClassError::CourseNotFound(_)
            | ClassError::ClassNotFound(_) => ErrorKind::NotFound,
            ClassError::ProfessorScheduleConflict { .. }
            | ClassError::DuplicateCode(_)
            | ClassError::HasActiveEnrollments { .. } => ErrorKind::Conflict,
            ClassError::NonPositiveCapacity(_) | ClassError::InvalidCapacity { .. } => {
                ErrorKind::InvalidInput
            }
            ClassError::Repository(_) => ErrorKind::Internal,
        }
    }
}

// ==========================================
// Enrollment lifecycle errors
// ==========================================

#[derive(Error, Debug)]
pub enum EnrollmentError {
    #[error("student not found: id={0}")]
    StudentNotFound(i64),

    #[error("class section not found: id={0}")]
    ClassNotFound(i64),

    #[error("enrollment not found: id={0}")]
    EnrollmentNotFound(i64),

    #[error("cannot enroll student '{name}': the student is inactive")]
    InactiveStudent { name: String },

    #[error("cannot enroll in class '{code}': status is {status}, not ACTIVE")]
    ClassNotActive { code: String, status: String },

    #[error("class '{code}' is full ({max_capacity} seats)")]
    ClassFull { code: String, max_capacity: i64 },

    #[error("student '{student}' is already enrolled in class '{code}'")]
    AlreadyEnrolled { student: String, code: String },

    #[error("student '{student}' already has an active enrollment at {slot}")]
    StudentScheduleConflict { student: String, slot: String },

    #[error("enrollment {0} is already cancelled")]
    AlreadyCancelled(i64),

    #[error("enrollment {0} is already completed")]
    AlreadyCompleted(i64),

    #[error("grades can only be updated on active enrollments; enrollment {id} is {status}")]
    NotActive { id: i64, status: String },

    #[error("grade {0} is out of range [0, 10]")]
    InvalidGrade(f64),

    #[error("attendance {0} is out of range [0, 100]")]
    InvalidAttendance(f64),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl EnrollmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnrollmentError::StudentNotFound(_)
            | EnrollmentError::ClassNotFound(_)
            | EnrollmentError::EnrollmentNotFound(_) => ErrorKind::NotFound,
            EnrollmentError::InactiveStudent { .. }
            | EnrollmentError::ClassNotActive { .. }
            | EnrollmentError::ClassFull { .. }
            | EnrollmentError::AlreadyEnrolled { .. }
            | EnrollmentError::StudentScheduleConflict { .. } => ErrorKind::Conflict,
            EnrollmentError::AlreadyCancelled(_)
            | EnrollmentError::AlreadyCompleted(_)
            | EnrollmentError::NotActive { .. } => ErrorKind::InvalidState,
            EnrollmentError::InvalidGrade(_) | EnrollmentError::InvalidAttendance(_) => {
                ErrorKind::InvalidInput
            }
            EnrollmentError::Repository(_) => ErrorKind::Internal,
        }
    }
}

// ==========================================
// Coordinator-course assignment errors
// ==========================================

#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error("coordinator not found: id={0}")]
    CoordinatorNotFound(i64),

    #[error("course not found: id={0}")]
    CourseNotFound(i64),

    #[error("cannot remove the last active coordinator of course '{course}'")]
    LastActiveCoordinator { course: String },

    #[error("coordinator {id} still manages {count} course(s)")]
    HasLinkedCourses { id: i64, count: i64 },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CoordinatorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoordinatorError::CoordinatorNotFound(_) | CoordinatorError::CourseNotFound(_) => {
                ErrorKind::NotFound
            }
            CoordinatorError::LastActiveCoordinator { .. }
            | CoordinatorError::HasLinkedCourses { .. } => ErrorKind::Conflict,
            CoordinatorError::Repository(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_taxonomy() {
        assert_eq!(ClassError::ClassNotFound(1).kind(), ErrorKind::NotFound);
        assert_eq!(
            ClassError::DuplicateCode("X".into()).kind(),
            ErrorKind::Conflict
        );
        assert_eq!(
            ClassError::InvalidCapacity {
                requested: 1,
                enrolled: 2
            }
            .kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            EnrollmentError::AlreadyCancelled(7).kind(),
            ErrorKind::InvalidState
        );
        assert_eq!(
            EnrollmentError::InvalidGrade(11.0).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            CoordinatorError::LastActiveCoordinator {
                course: "CS".into()
            }
            .kind(),
            ErrorKind::Conflict
        );
    }
}
