// ==========================================
// Academic Records Core - Schedule Conflict Checker
// ==========================================
// Given a (person, schedule-slot) pair, decide whether an ACTIVE
// assignment already occupies that slot: class sections for professors,
// enrollments (through their class section) for students.
//
// Pure reads, deterministic per data snapshot. Race protection is not
// this component's job - the partial unique indexes and the
// seat-claim transaction are the backstops (see db::init_schema).
// ==========================================

use crate::repository::class_repo::ClassRepository;
use crate::repository::enrollment_repo::EnrollmentRepository;
use crate::repository::error::RepositoryResult;
use std::sync::Arc;

pub struct ScheduleConflictChecker {
    class_repo: Arc<ClassRepository>,
    enrollment_repo: Arc<EnrollmentRepository>,
}

impl ScheduleConflictChecker {
    pub fn new(
        class_repo: Arc<ClassRepository>,
        enrollment_repo: Arc<EnrollmentRepository>,
    ) -> Self {
        Self {
            class_repo,
            enrollment_repo,
        }
    }

    /// True iff another ACTIVE class section assigns this professor to this
    /// slot. `exclude_class_id` skips the section being updated.
    pub fn professor_has_conflict(
        &self,
        professor_id: i64,
        schedule_id: i64,
        exclude_class_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        self.class_repo
            .has_professor_schedule_conflict(professor_id, schedule_id, exclude_class_id)
    }

    /// True iff another ACTIVE enrollment of this student sits on a class
    /// section with this slot. `exclude_enrollment_id` skips the enrollment
    /// being updated.
    pub fn student_has_conflict(
        &self,
        student_id: i64,
        schedule_id: i64,
        exclude_enrollment_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        self.enrollment_repo.has_student_schedule_conflict(
            student_id,
            schedule_id,
            exclude_enrollment_id,
        )
    }
}
