// ==========================================
// Academic Records Core - Engine Layer
// ==========================================
// Business rules. Engines orchestrate repositories and own every
// invariant; repositories fetch and persist.
// Red line: every rejection is a typed error variant with a reason.
// ==========================================

pub mod class_lifecycle;
pub mod conflict;
pub mod coordinator_courses;
pub mod enrollment_lifecycle;
pub mod error;

pub use class_lifecycle::{ClassLifecycle, CreateClassSection, UpdateClassSection};
pub use conflict::ScheduleConflictChecker;
pub use coordinator_courses::CoordinatorCourseAssignment;
pub use enrollment_lifecycle::EnrollmentLifecycle;
pub use error::{ClassError, CoordinatorError, EnrollmentError, ErrorKind};
