// ==========================================
// Academic Records Core - Enrollment Lifecycle Engine
// ==========================================
// Creation, cancellation, completion, grade updates and deletion of
// enrollments. The only component that moves a class section's
// `enrolled_count`, always through the seat-coupled repository
// transactions.
//
// Create runs its checks in a fixed order:
//   1. student exists and is active
//   2. class exists and is ACTIVE
//   3. class has available slots (pre-increment read)
//   4. no duplicate ACTIVE enrollment for (student, class)
//   5. no student schedule conflict on the class's slot
//   6. insert + guarded seat claim, one transaction
// Step 3 must see the pre-increment count; step 6 is the only point of
// mutation. A claim that loses a race surfaces as ClassFull even after
// the pre-check passed.
// ==========================================

use crate::domain::enrollment::{attendance_in_range, grade_in_range, Enrollment};
use crate::domain::types::EnrollmentStatus;
use crate::engine::conflict::ScheduleConflictChecker;
use crate::engine::error::EnrollmentError;
use crate::repository::class_repo::ClassRepository;
use crate::repository::enrollment_repo::EnrollmentRepository;
use crate::repository::error::RepositoryError;
use crate::repository::lookup_repo::LookupRepository;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct EnrollmentLifecycle {
    enrollment_repo: Arc<EnrollmentRepository>,
    class_repo: Arc<ClassRepository>,
    lookup_repo: Arc<LookupRepository>,
    conflict_checker: Arc<ScheduleConflictChecker>,
}

impl EnrollmentLifecycle {
    pub fn new(
        enrollment_repo: Arc<EnrollmentRepository>,
        class_repo: Arc<ClassRepository>,
        lookup_repo: Arc<LookupRepository>,
        conflict_checker: Arc<ScheduleConflictChecker>,
    ) -> Self {
        Self {
            enrollment_repo,
            class_repo,
            lookup_repo,
            conflict_checker,
        }
    }

    // ==========================================
    // Create
    // ==========================================

    #[instrument(skip(self))]
    pub fn create(&self, student_id: i64, class_id: i64) -> Result<Enrollment, EnrollmentError> {
        // 1. student must exist and be active
        let student = self
            .lookup_repo
            .find_student(student_id)?
            .ok_or(EnrollmentError::StudentNotFound(student_id))?;
        if !student.active {
            return Err(EnrollmentError::InactiveStudent { name: student.name });
        }

        // 2. class must exist and be ACTIVE
        let section = self
            .class_repo
            .find_by_id(class_id)?
            .ok_or(EnrollmentError::ClassNotFound(class_id))?;
        if !section.is_active() {
            return Err(EnrollmentError::ClassNotActive {
                code: section.code,
                status: section.status.to_string(),
            });
        }

        // 3. class must have a free seat (pre-increment read)
        if !section.has_available_slots() {
            return Err(EnrollmentError::ClassFull {
                code: section.code,
                max_capacity: section.max_capacity,
            });
        }

        // 4. no second ACTIVE enrollment for the same (student, class)
        if self
            .enrollment_repo
            .is_student_enrolled_in_class(student_id, class_id)?
        {
            return Err(EnrollmentError::AlreadyEnrolled {
                student: student.name,
                code: section.code,
            });
        }

        // 5. the student must be free at the class's slot
        if self
            .conflict_checker
            .student_has_conflict(student_id, section.schedule_id, None)?
        {
            warn!(
                student_id,
                schedule_id = section.schedule_id,
                "student schedule conflict on enrollment"
            );
            return Err(EnrollmentError::StudentScheduleConflict {
                student: student.name,
                slot: self.slot_label(section.schedule_id),
            });
        }

        // 6. insert the ACTIVE row and claim the seat atomically
        let outcome = self
            .enrollment_repo
            .insert_active_claiming_seat(student_id, class_id, section.schedule_id, Utc::now())
            .map_err(|e| match e {
                // a concurrent submission beat us to one of the partial
                // unique indexes; the message names the colliding columns
                RepositoryError::UniqueConstraintViolation(msg) => {
                    if msg.contains("schedule_id") {
                        EnrollmentError::StudentScheduleConflict {
                            student: student.name.clone(),
                            slot: self.slot_label(section.schedule_id),
                        }
                    } else {
                        EnrollmentError::AlreadyEnrolled {
                            student: student.name.clone(),
                            code: section.code.clone(),
                        }
                    }
                }
                other => EnrollmentError::Repository(other),
            })?;

        match outcome {
            Some(enrollment) => {
                info!(
                    enrollment_id = enrollment.id,
                    student_id, class_id, "enrollment created"
                );
                Ok(enrollment)
            }
            // the pre-check passed but a racer took the last seat
            None => Err(EnrollmentError::ClassFull {
                code: section.code,
                max_capacity: section.max_capacity,
            }),
        }
    }

    // ==========================================
    // Cancel
    // ==========================================

    /// Cancel an enrollment, stamping timestamp and reason and releasing
    /// the seat on the class section.
    #[instrument(skip(self, reason))]
    pub fn cancel(&self, id: i64, reason: &str) -> Result<(), EnrollmentError> {
        let enrollment = self.find_by_id(id)?;

        if enrollment.status == EnrollmentStatus::Cancelled {
            return Err(EnrollmentError::AlreadyCancelled(id));
        }

        // the repository re-checks the status under the write lock; a
        // concurrent cancel that won the race surfaces here too
        let cancelled = self
            .enrollment_repo
            .cancel_releasing_seat(id, enrollment.class_id, Utc::now(), reason)?;
        if !cancelled {
            return Err(EnrollmentError::AlreadyCancelled(id));
        }
        info!(enrollment_id = id, "enrollment cancelled");
        Ok(())
    }

    // ==========================================
    // Complete
    // ==========================================

    /// Mark an enrollment COMPLETED with its final grade and attendance.
    ///
    /// Completion does NOT release the seat: the slot-freeing asymmetry
    /// (only cancel decrements) is deliberate and preserved.
    #[instrument(skip(self))]
    pub fn complete(&self, id: i64, grade: f64, attendance: f64) -> Result<(), EnrollmentError> {
        let enrollment = self.find_by_id(id)?;

        if enrollment.status == EnrollmentStatus::Completed {
            return Err(EnrollmentError::AlreadyCompleted(id));
        }
        validate_grade_and_attendance(grade, attendance)?;

        self.enrollment_repo.set_completed(id, grade, attendance)?;
        info!(enrollment_id = id, grade, attendance, "enrollment completed");
        Ok(())
    }

    // ==========================================
    // Grade updates
    // ==========================================

    /// In-semester grade/attendance update; only permitted while ACTIVE.
    pub fn update_grade_and_attendance(
        &self,
        id: i64,
        grade: f64,
        attendance: f64,
    ) -> Result<Enrollment, EnrollmentError> {
        let enrollment = self.find_by_id(id)?;

        if enrollment.status != EnrollmentStatus::Active {
            return Err(EnrollmentError::NotActive {
                id,
                status: enrollment.status.to_string(),
            });
        }
        validate_grade_and_attendance(grade, attendance)?;

        self.enrollment_repo
            .update_grade_and_attendance(id, grade, attendance)?;
        self.find_by_id(id)
    }

    // ==========================================
    // Delete
    // ==========================================

    /// Hard-delete an enrollment row. An ACTIVE enrollment releases its
    /// seat first (symmetric cleanup), in the same transaction as the
    /// removal; the repository decides from the status it reads under the
    /// write lock.
    #[instrument(skip(self))]
    pub fn delete(&self, id: i64) -> Result<(), EnrollmentError> {
        let enrollment = self.find_by_id(id)?;

        self.enrollment_repo
            .delete_releasing_seat(id, enrollment.class_id)?;
        info!(enrollment_id = id, "enrollment deleted");
        Ok(())
    }

    // ==========================================
    // Queries
    // ==========================================

    pub fn find_by_id(&self, id: i64) -> Result<Enrollment, EnrollmentError> {
        self.enrollment_repo
            .find_by_id(id)?
            .ok_or(EnrollmentError::EnrollmentNotFound(id))
    }

    pub fn find_by_student(&self, student_id: i64) -> Result<Vec<Enrollment>, EnrollmentError> {
        Ok(self.enrollment_repo.find_by_student(student_id)?)
    }

    /// The subjects a student is currently enrolled in.
    pub fn find_active_by_student(
        &self,
        student_id: i64,
    ) -> Result<Vec<Enrollment>, EnrollmentError> {
        Ok(self.enrollment_repo.find_active_by_student(student_id)?)
    }

    pub fn find_by_class(&self, class_id: i64) -> Result<Vec<Enrollment>, EnrollmentError> {
        Ok(self.enrollment_repo.find_by_class(class_id)?)
    }

    pub fn find_active_by_class(&self, class_id: i64) -> Result<Vec<Enrollment>, EnrollmentError> {
        Ok(self.enrollment_repo.find_active_by_class(class_id)?)
    }

    pub fn find_by_status(
        &self,
        status: EnrollmentStatus,
    ) -> Result<Vec<Enrollment>, EnrollmentError> {
        Ok(self.enrollment_repo.find_by_status(status)?)
    }

    pub fn find_by_student_and_semester(
        &self,
        student_id: i64,
        semester: &str,
    ) -> Result<Vec<Enrollment>, EnrollmentError> {
        Ok(self
            .enrollment_repo
            .find_by_student_and_semester(student_id, semester)?)
    }

    pub fn find_by_course(&self, course_id: i64) -> Result<Vec<Enrollment>, EnrollmentError> {
        Ok(self.enrollment_repo.find_by_course(course_id)?)
    }

    /// Backs the (external) student-removal guard.
    pub fn count_active_by_student(&self, student_id: i64) -> Result<i64, EnrollmentError> {
        Ok(self.enrollment_repo.count_active_by_student(student_id)?)
    }

    pub fn count_active_by_class(&self, class_id: i64) -> Result<i64, EnrollmentError> {
        Ok(self.enrollment_repo.count_active_by_class(class_id)?)
    }

    pub fn count_by_course(&self, course_id: i64) -> Result<i64, EnrollmentError> {
        Ok(self.enrollment_repo.count_by_course(course_id)?)
    }

    fn slot_label(&self, schedule_id: i64) -> String {
        match self.lookup_repo.find_schedule(schedule_id) {
            Ok(Some(slot)) => slot.label(),
            _ => format!("slot {schedule_id}"),
        }
    }
}

fn validate_grade_and_attendance(grade: f64, attendance: f64) -> Result<(), EnrollmentError> {
    if !grade_in_range(grade) {
        return Err(EnrollmentError::InvalidGrade(grade));
    }
    if !attendance_in_range(attendance) {
        return Err(EnrollmentError::InvalidAttendance(attendance));
    }
    Ok(())
}
