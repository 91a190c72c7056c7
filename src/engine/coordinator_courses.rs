// ==========================================
// Academic Records Core - Coordinator-Course Assignment Engine
// ==========================================
// Many-to-many linkage between coordinators and courses.
// Guard: a course must always retain at least one ACTIVE coordinator;
// a removal that would leave zero is rejected.
// ==========================================

use crate::domain::people::{Coordinator, Course};
use crate::engine::error::CoordinatorError;
use crate::repository::coordinator_repo::CoordinatorRepository;
use crate::repository::lookup_repo::LookupRepository;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct CoordinatorCourseAssignment {
    coordinator_repo: Arc<CoordinatorRepository>,
    lookup_repo: Arc<LookupRepository>,
}

impl CoordinatorCourseAssignment {
    pub fn new(
        coordinator_repo: Arc<CoordinatorRepository>,
        lookup_repo: Arc<LookupRepository>,
    ) -> Self {
        Self {
            coordinator_repo,
            lookup_repo,
        }
    }

    /// Link a course to a coordinator. Idempotent: linking an already
    /// linked pair is a no-op.
    #[instrument(skip(self))]
    pub fn add_course(&self, coordinator_id: i64, course_id: i64) -> Result<(), CoordinatorError> {
        self.find_coordinator(coordinator_id)?;
        self.find_course(course_id)?;

        self.coordinator_repo.link_course(coordinator_id, course_id)?;
        info!(coordinator_id, course_id, "course linked to coordinator");
        Ok(())
    }

    /// Unlink a course from a coordinator.
    ///
    /// Rejected when this coordinator is the sole remaining ACTIVE
    /// coordinator of the course.
    #[instrument(skip(self))]
    pub fn remove_course(
        &self,
        coordinator_id: i64,
        course_id: i64,
    ) -> Result<(), CoordinatorError> {
        self.find_coordinator(coordinator_id)?;
        let course = self.find_course(course_id)?;

        let active = self.coordinator_repo.find_active_by_course(course_id)?;
        if active.len() == 1 && active[0].id == coordinator_id {
            return Err(CoordinatorError::LastActiveCoordinator { course: course.name });
        }

        self.coordinator_repo
            .unlink_course(coordinator_id, course_id)?;
        info!(coordinator_id, course_id, "course unlinked from coordinator");
        Ok(())
    }

    /// Hard-delete a coordinator. Rejected while any course link remains;
    /// use `inactivate` to retire a coordinator that still manages courses.
    pub fn delete(&self, coordinator_id: i64) -> Result<(), CoordinatorError> {
        self.find_coordinator(coordinator_id)?;

        let count = self.coordinator_repo.count_links(coordinator_id)?;
        if count > 0 {
            return Err(CoordinatorError::HasLinkedCourses {
                id: coordinator_id,
                count,
            });
        }

        self.coordinator_repo.delete(coordinator_id)?;
        info!(coordinator_id, "coordinator deleted");
        Ok(())
    }

    /// Soft retire: links survive but the coordinator stops counting
    /// toward the course's active-coordinator cardinality.
    pub fn inactivate(&self, coordinator_id: i64) -> Result<(), CoordinatorError> {
        self.find_coordinator(coordinator_id)?;
        self.coordinator_repo.set_active(coordinator_id, false)?;
        Ok(())
    }

    pub fn activate(&self, coordinator_id: i64) -> Result<(), CoordinatorError> {
        self.find_coordinator(coordinator_id)?;
        self.coordinator_repo.set_active(coordinator_id, true)?;
        Ok(())
    }

    // ==========================================
    // Queries
    // ==========================================

    pub fn find_coordinator(&self, id: i64) -> Result<Coordinator, CoordinatorError> {
        self.coordinator_repo
            .find_by_id(id)?
            .ok_or(CoordinatorError::CoordinatorNotFound(id))
    }

    pub fn courses_of(&self, coordinator_id: i64) -> Result<Vec<i64>, CoordinatorError> {
        self.find_coordinator(coordinator_id)?;
        Ok(self.coordinator_repo.course_ids_of(coordinator_id)?)
    }

    pub fn count_courses(&self, coordinator_id: i64) -> Result<i64, CoordinatorError> {
        self.find_coordinator(coordinator_id)?;
        Ok(self.coordinator_repo.count_links(coordinator_id)?)
    }

    pub fn find_active_by_course(
        &self,
        course_id: i64,
    ) -> Result<Vec<Coordinator>, CoordinatorError> {
        self.find_course(course_id)?;
        Ok(self.coordinator_repo.find_active_by_course(course_id)?)
    }

    fn find_course(&self, id: i64) -> Result<Course, CoordinatorError> {
        self.lookup_repo
            .find_course(id)?
            .ok_or(CoordinatorError::CourseNotFound(id))
    }
}
