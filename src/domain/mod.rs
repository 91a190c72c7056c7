// ==========================================
// Academic Records Core - Domain Layer
// ==========================================
// Entities and value types. No SQL here; persistence lives in the
// repository layer, business rules in the engine layer.
// ==========================================

pub mod class_section;
pub mod enrollment;
pub mod people;
pub mod schedule;
pub mod types;

// Re-export core entities
pub use class_section::{CapacityExceeded, ClassSection};
pub use enrollment::Enrollment;
pub use people::{Coordinator, Course, Professor, Student, Subject};
pub use schedule::{derive_period, ScheduleSlot};
pub use types::{ClassStatus, EnrollmentStatus, Period};
