// ==========================================
// Academic Records Core - Class Lifecycle Engine
// ==========================================
// Creation, update, cancellation, completion and deletion of class
// sections. Orchestrates referenced-entity existence checks, the
// professor schedule-conflict check and code uniqueness.
//
// Fixed check order on create: existence -> schedule conflict ->
// duplicate code -> capacity. One error per failed call,
// first-detected-wins.
// ==========================================

use crate::domain::class_section::ClassSection;
use crate::domain::types::ClassStatus;
use crate::engine::conflict::ScheduleConflictChecker;
use crate::engine::error::ClassError;
use crate::repository::class_repo::ClassRepository;
use crate::repository::error::RepositoryError;
use crate::repository::lookup_repo::LookupRepository;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Input for `ClassLifecycle::create`.
#[derive(Debug, Clone)]
pub struct CreateClassSection {
    pub code: String,
    pub subject_id: i64,
    pub professor_id: i64,
    pub schedule_id: i64,
    pub course_id: i64,
    pub max_capacity: i64,
    pub semester: String,
}

/// Partial update for `ClassLifecycle::update`; `None` keeps the current
/// value.
#[derive(Debug, Clone, Default)]
pub struct UpdateClassSection {
    pub subject_id: Option<i64>,
    pub professor_id: Option<i64>,
    pub schedule_id: Option<i64>,
    pub course_id: Option<i64>,
    pub max_capacity: Option<i64>,
    pub semester: Option<String>,
}

pub struct ClassLifecycle {
    class_repo: Arc<ClassRepository>,
    lookup_repo: Arc<LookupRepository>,
    conflict_checker: Arc<ScheduleConflictChecker>,
}

impl ClassLifecycle {
    pub fn new(
        class_repo: Arc<ClassRepository>,
        lookup_repo: Arc<LookupRepository>,
        conflict_checker: Arc<ScheduleConflictChecker>,
    ) -> Self {
        Self {
            class_repo,
            lookup_repo,
            conflict_checker,
        }
    }

    // ==========================================
    // Create
    // ==========================================

    #[instrument(skip(self, request), fields(code = %request.code))]
    pub fn create(&self, request: CreateClassSection) -> Result<ClassSection, ClassError> {
        // 1. referenced entities must exist
        self.lookup_repo
            .find_subject(request.subject_id)?
            .ok_or(ClassError::SubjectNotFound(request.subject_id))?;
        let professor = self
            .lookup_repo
            .find_professor(request.professor_id)?
            .ok_or(ClassError::ProfessorNotFound(request.professor_id))?;
        let slot = self
            .lookup_repo
            .find_schedule(request.schedule_id)?
            .ok_or(ClassError::ScheduleNotFound(request.schedule_id))?;
        self.lookup_repo
            .find_course(request.course_id)?
            .ok_or(ClassError::CourseNotFound(request.course_id))?;

        // 2. the professor must be free at that slot
        if self.conflict_checker.professor_has_conflict(
            request.professor_id,
            request.schedule_id,
            None,
        )? {
            warn!(
                professor_id = request.professor_id,
                schedule_id = request.schedule_id,
                "professor schedule conflict on class creation"
            );
            return Err(ClassError::ProfessorScheduleConflict {
                professor: professor.name,
                slot: slot.label(),
            });
        }

        // 3. the section code must be unique (case-sensitive)
        if self.class_repo.exists_by_code(&request.code)? {
            return Err(ClassError::DuplicateCode(request.code));
        }

        // 4. capacity must be positive
        if request.max_capacity <= 0 {
            return Err(ClassError::NonPositiveCapacity(request.max_capacity));
        }

        let mut section = ClassSection {
            id: 0,
            code: request.code,
            subject_id: request.subject_id,
            professor_id: request.professor_id,
            schedule_id: request.schedule_id,
            course_id: request.course_id,
            max_capacity: request.max_capacity,
            enrolled_count: 0,
            semester: request.semester,
            status: ClassStatus::Active,
        };
        // a concurrent creation can slip past the read checks and land on
        // the code UNIQUE or the (professor, slot) partial index; surface
        // those as the same rejections the checks produce
        section.id = self.class_repo.insert(&section).map_err(|e| match e {
            RepositoryError::UniqueConstraintViolation(msg) => {
                if msg.contains("professor_id") {
                    ClassError::ProfessorScheduleConflict {
                        professor: professor.name.clone(),
                        slot: slot.label(),
                    }
                } else {
                    ClassError::DuplicateCode(section.code.clone())
                }
            }
            other => ClassError::Repository(other),
        })?;

        info!(
            class_id = section.id,
            code = %section.code,
            "class section created"
        );
        Ok(section)
    }

    // ==========================================
    // Update
    // ==========================================

    /// Apply a partial update. When professor or schedule changes, the
    /// conflict check is re-run excluding this section's own id.
    #[instrument(skip(self, changes))]
    pub fn update(&self, id: i64, changes: UpdateClassSection) -> Result<ClassSection, ClassError> {
        let mut section = self.find_by_id(id)?;

        let new_professor_id = changes.professor_id.unwrap_or(section.professor_id);
        let new_schedule_id = changes.schedule_id.unwrap_or(section.schedule_id);
        let professor_changed = new_professor_id != section.professor_id;
        let schedule_changed = new_schedule_id != section.schedule_id;

        let mut assignment = None;
        if professor_changed || schedule_changed {
            let professor = self
                .lookup_repo
                .find_professor(new_professor_id)?
                .ok_or(ClassError::ProfessorNotFound(new_professor_id))?;
            let slot = self
                .lookup_repo
                .find_schedule(new_schedule_id)?
                .ok_or(ClassError::ScheduleNotFound(new_schedule_id))?;

            if self.conflict_checker.professor_has_conflict(
                new_professor_id,
                new_schedule_id,
                Some(id),
            )? {
                return Err(ClassError::ProfessorScheduleConflict {
                    professor: professor.name,
                    slot: slot.label(),
                });
            }

            section.professor_id = new_professor_id;
            section.schedule_id = new_schedule_id;
            assignment = Some((professor.name, slot.label()));
        }

        if let Some(subject_id) = changes.subject_id {
            if subject_id != section.subject_id {
                self.lookup_repo
                    .find_subject(subject_id)?
                    .ok_or(ClassError::SubjectNotFound(subject_id))?;
                section.subject_id = subject_id;
            }
        }

        if let Some(course_id) = changes.course_id {
            if course_id != section.course_id {
                self.lookup_repo
                    .find_course(course_id)?
                    .ok_or(ClassError::CourseNotFound(course_id))?;
                section.course_id = course_id;
            }
        }

        if let Some(max_capacity) = changes.max_capacity {
            if max_capacity <= 0 {
                return Err(ClassError::NonPositiveCapacity(max_capacity));
            }
            // never shrink below the seats already claimed
            if max_capacity < section.enrolled_count {
                return Err(ClassError::InvalidCapacity {
                    requested: max_capacity,
                    enrolled: section.enrolled_count,
                });
            }
            section.max_capacity = max_capacity;
        }

        if let Some(semester) = changes.semester {
            section.semester = semester;
        }

        // the (professor, slot) partial index can still fire when a
        // concurrent creation took the slot after the check above
        self.class_repo.update(&section).map_err(|e| match e {
            RepositoryError::UniqueConstraintViolation(_) => {
                let (professor, slot) = assignment.clone().unwrap_or_else(|| {
                    (
                        format!("professor {}", section.professor_id),
                        format!("slot {}", section.schedule_id),
                    )
                });
                ClassError::ProfessorScheduleConflict { professor, slot }
            }
            other => ClassError::Repository(other),
        })?;
        info!(class_id = id, "class section updated");
        Ok(section)
    }

    // ==========================================
    // Status transitions
    // ==========================================

    /// ACTIVE -> CANCELLED. Re-cancelling just re-sets the terminal state.
    pub fn cancel(&self, id: i64) -> Result<(), ClassError> {
        self.find_by_id(id)?;
        self.class_repo.set_status(id, ClassStatus::Cancelled)?;
        info!(class_id = id, "class section cancelled");
        Ok(())
    }

    /// ACTIVE -> COMPLETED.
    pub fn complete(&self, id: i64) -> Result<(), ClassError> {
        self.find_by_id(id)?;
        self.class_repo.set_status(id, ClassStatus::Completed)?;
        info!(class_id = id, "class section completed");
        Ok(())
    }

    // ==========================================
    // Delete
    // ==========================================

    /// Administrative hard-delete. Never allowed while any enrollment is
    /// still counted against the section, active or not fully drained.
    pub fn delete(&self, id: i64) -> Result<(), ClassError> {
        let section = self.find_by_id(id)?;

        if section.enrolled_count > 0 {
            return Err(ClassError::HasActiveEnrollments {
                code: section.code,
                enrolled: section.enrolled_count,
            });
        }

        self.class_repo.delete(id)?;
        info!(class_id = id, "class section deleted");
        Ok(())
    }

    // ==========================================
    // Queries
    // ==========================================

    pub fn find_by_id(&self, id: i64) -> Result<ClassSection, ClassError> {
        self.class_repo
            .find_by_id(id)?
            .ok_or(ClassError::ClassNotFound(id))
    }

    pub fn find_by_code(&self, code: &str) -> Result<Option<ClassSection>, ClassError> {
        Ok(self.class_repo.find_by_code(code)?)
    }

    pub fn list_all(&self) -> Result<Vec<ClassSection>, ClassError> {
        Ok(self.class_repo.list_all()?)
    }

    pub fn list_active(&self) -> Result<Vec<ClassSection>, ClassError> {
        Ok(self.class_repo.find_all_active()?)
    }

    pub fn find_by_subject(&self, subject_id: i64) -> Result<Vec<ClassSection>, ClassError> {
        Ok(self.class_repo.find_by_subject(subject_id)?)
    }

    pub fn find_by_professor(&self, professor_id: i64) -> Result<Vec<ClassSection>, ClassError> {
        Ok(self.class_repo.find_by_professor(professor_id)?)
    }

    pub fn find_by_course(&self, course_id: i64) -> Result<Vec<ClassSection>, ClassError> {
        Ok(self.class_repo.find_by_course(course_id)?)
    }

    pub fn find_active_by_course(&self, course_id: i64) -> Result<Vec<ClassSection>, ClassError> {
        Ok(self.class_repo.find_active_by_course(course_id)?)
    }

    pub fn find_by_semester(&self, semester: &str) -> Result<Vec<ClassSection>, ClassError> {
        Ok(self.class_repo.find_by_semester(semester)?)
    }

    pub fn find_with_available_slots(&self) -> Result<Vec<ClassSection>, ClassError> {
        Ok(self.class_repo.find_active_with_available_slots()?)
    }

    pub fn find_by_course_with_slots(
        &self,
        course_id: i64,
    ) -> Result<Vec<ClassSection>, ClassError> {
        Ok(self.class_repo.find_active_by_course_with_slots(course_id)?)
    }

    pub fn count_active_by_professor(&self, professor_id: i64) -> Result<i64, ClassError> {
        Ok(self.class_repo.count_active_by_professor(professor_id)?)
    }

    pub fn count_active_by_course(&self, course_id: i64) -> Result<i64, ClassError> {
        Ok(self.class_repo.count_active_by_course(course_id)?)
    }
}
