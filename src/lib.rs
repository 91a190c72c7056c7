// ==========================================
// Academic Records Core - Library Root
// ==========================================
// Enrollment and class-capacity consistency engine: class sections,
// enrollments, schedule-conflict checks and coordinator-course
// assignments over SQLite.
//
// The HTTP/controller surface is deliberately NOT part of this crate;
// embedders hold an app::AppState and call the engines directly,
// translating engine ErrorKind values into their transport's codes.
// ==========================================

// ==========================================
// Module declarations
// ==========================================

// Domain layer: entities and value types
pub mod domain;

// Repository layer: data access
pub mod repository;

// Engine layer: business rules
pub mod engine;

// Configuration
pub mod config;

// Database infrastructure (connection init / PRAGMA / schema)
pub mod db;

// Logging
pub mod logging;

// Application wiring
pub mod app;

// ==========================================
// Re-exports of core types
// ==========================================

// Domain types
pub use domain::types::{ClassStatus, EnrollmentStatus, Period};

// Domain entities
pub use domain::{
    ClassSection, Coordinator, Course, Enrollment, Professor, ScheduleSlot, Student, Subject,
};

// Engines
pub use engine::{
    ClassLifecycle, CoordinatorCourseAssignment, CreateClassSection, EnrollmentLifecycle,
    ScheduleConflictChecker, UpdateClassSection,
};

// Errors
pub use engine::{ClassError, CoordinatorError, EnrollmentError, ErrorKind};

// Application state
pub use app::AppState;

// ==========================================
// Constants
// ==========================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// System name.
pub const APP_NAME: &str = "Academic Records Core";
