// ==========================================
// Academic Records Core - Enrollment Repository
// ==========================================
// CRUD and queries over the `enrollments` table, plus the transactional
// seat-claim/seat-release operations coupling an enrollment row to its
// class section's `enrolled_count`.
//
// These transactions are the ONLY writers of `enrolled_count` in the
// whole crate. The claim is a guarded UPDATE (`... AND enrolled_count <
// max_capacity`): zero affected rows means the seat went to a
// concurrent writer and the whole transaction is abandoned before the
// enrollment row exists. Releases floor at zero.
// ==========================================

use crate::domain::enrollment::Enrollment;
use crate::domain::types::EnrollmentStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::lookup_repo::conversion_error;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::sync::{Arc, Mutex, MutexGuard};

const ENROLLMENT_COLUMNS: &str = "id, student_id, class_id, enrolled_at, status, \
                                  final_grade, attendance, cancelled_at, cancellation_reason";

pub struct EnrollmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EnrollmentRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Seat-coupled transactions
    // ==========================================

    /// Insert an ACTIVE enrollment and claim one seat on the class, as one
    /// write transaction.
    ///
    /// Returns `Ok(None)` when the guarded increment touched no row, i.e.
    /// the class had no free seat at commit time (the caller's pre-check
    /// lost a race or the class is full). Nothing is persisted in that
    /// case. `schedule_id` is the class's slot, stored on the row so the
    /// (student, slot) partial unique index can reject a concurrent
    /// enrollment into a different class on the same slot.
    pub fn insert_active_claiming_seat(
        &self,
        student_id: i64,
        class_id: i64,
        schedule_id: i64,
        enrolled_at: DateTime<Utc>,
    ) -> RepositoryResult<Option<Enrollment>> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let claimed = tx.execute(
            "UPDATE classes SET enrolled_count = enrolled_count + 1 \
             WHERE id = ?1 AND enrolled_count < max_capacity",
            params![class_id],
        )?;
        if claimed == 0 {
            // no seat left; the open transaction is dropped uncommitted
            return Ok(None);
        }

        tx.execute(
            "INSERT INTO enrollments (student_id, class_id, schedule_id, enrolled_at, status) \
             VALUES (?1, ?2, ?3, ?4, 'ACTIVE')",
            params![student_id, class_id, schedule_id, enrolled_at.to_rfc3339()],
        )?;
        let id = tx.last_insert_rowid();

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        Ok(Some(Enrollment {
            id,
            student_id,
            class_id,
            enrolled_at,
            status: EnrollmentStatus::Active,
            final_grade: None,
            attendance: None,
            cancelled_at: None,
            cancellation_reason: None,
        }))
    }

    /// Mark an enrollment CANCELLED with its timestamp/reason and release
    /// its seat, as one write transaction.
    ///
    /// The status flip is guarded (`status != 'CANCELLED'`), so the seat is
    /// released exactly once however many callers race. Returns `Ok(false)`
    /// when the row was already cancelled; nothing is changed in that case.
    pub fn cancel_releasing_seat(
        &self,
        id: i64,
        class_id: i64,
        cancelled_at: DateTime<Utc>,
        reason: &str,
    ) -> RepositoryResult<bool> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let affected = tx.execute(
            "UPDATE enrollments SET status = 'CANCELLED', cancelled_at = ?2, \
             cancellation_reason = ?3 WHERE id = ?1 AND status != 'CANCELLED'",
            params![id, cancelled_at.to_rfc3339(), reason],
        )?;
        if affected == 0 {
            // already cancelled (or gone); no decrement, nothing committed
            return Ok(false);
        }

        // floor-at-zero release; tolerates a seat already drained elsewhere
        tx.execute(
            "UPDATE classes SET enrolled_count = enrolled_count - 1 \
             WHERE id = ?1 AND enrolled_count > 0",
            params![class_id],
        )?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(true)
    }

    /// Hard-delete an enrollment row, freeing the class seat in the same
    /// transaction iff the row is still ACTIVE at delete time. The status
    /// is re-read under the write lock, not trusted from the caller.
    pub fn delete_releasing_seat(&self, id: i64, class_id: i64) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let status: Option<String> = tx
            .query_row(
                "SELECT status FROM enrollments WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let status = status.ok_or_else(|| RepositoryError::NotFound {
            entity: "Enrollment".to_string(),
            id: id.to_string(),
        })?;

        if status == "ACTIVE" {
            tx.execute(
                "UPDATE classes SET enrolled_count = enrolled_count - 1 \
                 WHERE id = ?1 AND enrolled_count > 0",
                params![class_id],
            )?;
        }

        tx.execute("DELETE FROM enrollments WHERE id = ?1", params![id])?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(())
    }

    // ==========================================
    // Plain writes (no seat coupling)
    // ==========================================

    /// Completion keeps the seat counted: status flips to COMPLETED but
    /// `enrolled_count` is untouched. Only cancellation frees capacity.
    pub fn set_completed(
        &self,
        id: i64,
        grade: f64,
        attendance: f64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE enrollments SET status = 'COMPLETED', final_grade = ?2, \
             attendance = ?3 WHERE id = ?1",
            params![id, grade, attendance],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Enrollment".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub fn update_grade_and_attendance(
        &self,
        id: i64,
        grade: f64,
        attendance: f64,
    ) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE enrollments SET final_grade = ?2, attendance = ?3 WHERE id = ?1",
            params![id, grade, attendance],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Enrollment".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // Point lookups & existence checks
    // ==========================================

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Enrollment>> {
        let conn = self.get_conn()?;
        let enrollment = conn
            .query_row(
                &format!("SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE id = ?1"),
                params![id],
                map_enrollment,
            )
            .optional()?;
        Ok(enrollment)
    }

    /// True iff an ACTIVE enrollment already links this student to this
    /// class.
    pub fn is_student_enrolled_in_class(
        &self,
        student_id: i64,
        class_id: i64,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM enrollments \
             WHERE student_id = ?1 AND class_id = ?2 AND status = 'ACTIVE'",
            params![student_id, class_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// True iff another ACTIVE enrollment of this student occupies the same
    /// schedule slot (joined through its class section).
    /// `exclude_enrollment_id` skips the enrollment being updated.
    pub fn has_student_schedule_conflict(
        &self,
        student_id: i64,
        schedule_id: i64,
        exclude_enrollment_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = match exclude_enrollment_id {
            Some(exclude) => conn.query_row(
                "SELECT COUNT(*) FROM enrollments e \
                 JOIN classes c ON c.id = e.class_id \
                 WHERE e.student_id = ?1 AND c.schedule_id = ?2 \
                   AND e.status = 'ACTIVE' AND e.id != ?3",
                params![student_id, schedule_id, exclude],
                |row| row.get(0),
            )?,
            None => conn.query_row(
                "SELECT COUNT(*) FROM enrollments e \
                 JOIN classes c ON c.id = e.class_id \
                 WHERE e.student_id = ?1 AND c.schedule_id = ?2 AND e.status = 'ACTIVE'",
                params![student_id, schedule_id],
                |row| row.get(0),
            )?,
        };
        Ok(count > 0)
    }

    // ==========================================
    // List queries
    // ==========================================

    pub fn find_by_student(&self, student_id: i64) -> RepositoryResult<Vec<Enrollment>> {
        self.query_list(
            &format!("SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE student_id = ?1 ORDER BY id"),
            &[&student_id],
        )
    }

    pub fn find_active_by_student(&self, student_id: i64) -> RepositoryResult<Vec<Enrollment>> {
        self.query_list(
            &format!(
                "SELECT {ENROLLMENT_COLUMNS} FROM enrollments \
                 WHERE student_id = ?1 AND status = 'ACTIVE' ORDER BY id"
            ),
            &[&student_id],
        )
    }

    pub fn find_by_class(&self, class_id: i64) -> RepositoryResult<Vec<Enrollment>> {
        self.query_list(
            &format!("SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE class_id = ?1 ORDER BY id"),
            &[&class_id],
        )
    }

    pub fn find_active_by_class(&self, class_id: i64) -> RepositoryResult<Vec<Enrollment>> {
        self.query_list(
            &format!(
                "SELECT {ENROLLMENT_COLUMNS} FROM enrollments \
                 WHERE class_id = ?1 AND status = 'ACTIVE' ORDER BY id"
            ),
            &[&class_id],
        )
    }

    pub fn find_by_status(&self, status: EnrollmentStatus) -> RepositoryResult<Vec<Enrollment>> {
        let status = status.as_str();
        self.query_list(
            &format!("SELECT {ENROLLMENT_COLUMNS} FROM enrollments WHERE status = ?1 ORDER BY id"),
            &[&status],
        )
    }

    pub fn find_by_student_and_semester(
        &self,
        student_id: i64,
        semester: &str,
    ) -> RepositoryResult<Vec<Enrollment>> {
        self.query_list(
            &format!(
                "SELECT e.id, e.student_id, e.class_id, e.enrolled_at, e.status, \
                        e.final_grade, e.attendance, e.cancelled_at, e.cancellation_reason \
                 FROM enrollments e \
                 JOIN classes c ON c.id = e.class_id \
                 WHERE e.student_id = ?1 AND c.semester = ?2 ORDER BY e.id"
            ),
            &[&student_id, &semester],
        )
    }

    /// Enrollments of a course, joined through the course's class sections.
    pub fn find_by_course(&self, course_id: i64) -> RepositoryResult<Vec<Enrollment>> {
        self.query_list(
            &format!(
                "SELECT e.id, e.student_id, e.class_id, e.enrolled_at, e.status, \
                        e.final_grade, e.attendance, e.cancelled_at, e.cancellation_reason \
                 FROM enrollments e \
                 JOIN classes c ON c.id = e.class_id \
                 WHERE c.course_id = ?1 ORDER BY e.id"
            ),
            &[&course_id],
        )
    }

    // ==========================================
    // Counts
    // ==========================================

    pub fn count_active_by_student(&self, student_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM enrollments WHERE student_id = ?1 AND status = 'ACTIVE'",
            params![student_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn count_active_by_class(&self, class_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM enrollments WHERE class_id = ?1 AND status = 'ACTIVE'",
            params![class_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn count_by_course(&self, course_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM enrollments e \
             JOIN classes c ON c.id = e.class_id \
             WHERE c.course_id = ?1",
            params![course_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn query_list(
        &self,
        sql: &str,
        query_params: &[&dyn rusqlite::ToSql],
    ) -> RepositoryResult<Vec<Enrollment>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let enrollments = stmt
            .query_map(query_params, map_enrollment)?
            .collect::<rusqlite::Result<Vec<Enrollment>>>()?;
        Ok(enrollments)
    }
}

fn map_enrollment(row: &Row<'_>) -> rusqlite::Result<Enrollment> {
    let enrolled_at_raw: String = row.get(3)?;
    let status_raw: String = row.get(4)?;
    let cancelled_at_raw: Option<String> = row.get(7)?;

    let enrolled_at = parse_timestamp(3, &enrolled_at_raw)?;
    let status = EnrollmentStatus::parse(&status_raw)
        .ok_or_else(|| conversion_error(4, format!("unknown enrollment status '{status_raw}'")))?;
    let cancelled_at = match cancelled_at_raw {
        Some(raw) => Some(parse_timestamp(7, &raw)?),
        None => None,
    };

    Ok(Enrollment {
        id: row.get(0)?,
        student_id: row.get(1)?,
        class_id: row.get(2)?,
        enrolled_at,
        status,
        final_grade: row.get(5)?,
        attendance: row.get(6)?,
        cancelled_at,
        cancellation_reason: row.get(8)?,
    })
}

fn parse_timestamp(column: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(column, e.to_string()))
}
