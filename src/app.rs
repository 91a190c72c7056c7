// ==========================================
// Academic Records Core - Application State
// ==========================================
// Wires one shared SQLite connection into every repository and engine.
// The embedding application (HTTP controllers, CLI, ...) holds one
// AppState and calls the engines directly.
// ==========================================

use std::sync::{Arc, Mutex};

use crate::config::AppConfig;
use crate::engine::{
    ClassLifecycle, CoordinatorCourseAssignment, EnrollmentLifecycle, ScheduleConflictChecker,
};
use crate::repository::{
    ClassRepository, CoordinatorRepository, EnrollmentRepository, LookupRepository,
    RepositoryError, RepositoryResult,
};

/// Application state: repositories and engines over one database.
pub struct AppState {
    pub db_path: String,

    pub lookup_repo: Arc<LookupRepository>,
    pub class_repo: Arc<ClassRepository>,
    pub enrollment_repo: Arc<EnrollmentRepository>,
    pub coordinator_repo: Arc<CoordinatorRepository>,

    pub conflict_checker: Arc<ScheduleConflictChecker>,
    pub class_lifecycle: Arc<ClassLifecycle>,
    pub enrollment_lifecycle: Arc<EnrollmentLifecycle>,
    pub coordinator_courses: Arc<CoordinatorCourseAssignment>,
}

impl AppState {
    /// Open (and initialize) the database at `db_path` and wire every
    /// repository and engine over one shared connection.
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        Self::open(db_path, crate::db::DEFAULT_BUSY_TIMEOUT_MS)
    }

    pub fn with_config(config: &AppConfig) -> RepositoryResult<Self> {
        Self::open(&config.db_path, config.busy_timeout_ms)
    }

    fn open(db_path: &str, busy_timeout_ms: u64) -> RepositoryResult<Self> {
        tracing::info!(db_path, "initializing AppState");

        let conn = crate::db::open_and_init_with_timeout(db_path, busy_timeout_ms)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        let conn = Arc::new(Mutex::new(conn));

        let lookup_repo = Arc::new(LookupRepository::from_connection(conn.clone()));
        let class_repo = Arc::new(ClassRepository::from_connection(conn.clone()));
        let enrollment_repo = Arc::new(EnrollmentRepository::from_connection(conn.clone()));
        let coordinator_repo = Arc::new(CoordinatorRepository::from_connection(conn));

        let conflict_checker = Arc::new(ScheduleConflictChecker::new(
            class_repo.clone(),
            enrollment_repo.clone(),
        ));
        let class_lifecycle = Arc::new(ClassLifecycle::new(
            class_repo.clone(),
            lookup_repo.clone(),
            conflict_checker.clone(),
        ));
        let enrollment_lifecycle = Arc::new(EnrollmentLifecycle::new(
            enrollment_repo.clone(),
            class_repo.clone(),
            lookup_repo.clone(),
            conflict_checker.clone(),
        ));
        let coordinator_courses = Arc::new(CoordinatorCourseAssignment::new(
            coordinator_repo.clone(),
            lookup_repo.clone(),
        ));

        Ok(Self {
            db_path: db_path.to_string(),
            lookup_repo,
            class_repo,
            enrollment_repo,
            coordinator_repo,
            conflict_checker,
            class_lifecycle,
            enrollment_lifecycle,
            coordinator_courses,
        })
    }
}
