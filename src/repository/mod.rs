// ==========================================
// Academic Records Core - Repository Layer
// ==========================================
// Data access over SQLite. Repositories share one connection behind
// Arc<Mutex<Connection>> and expose typed methods.
// Red line: no business logic here - engines decide, repositories fetch
// and persist.
// ==========================================

pub mod class_repo;
pub mod coordinator_repo;
pub mod enrollment_repo;
pub mod error;
pub mod lookup_repo;

pub use class_repo::ClassRepository;
pub use coordinator_repo::CoordinatorRepository;
pub use enrollment_repo::EnrollmentRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use lookup_repo::LookupRepository;
