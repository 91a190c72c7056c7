// ==========================================
// Academic Records Core - Class Section Repository
// ==========================================
// CRUD and queries over the `classes` table.
// Red line: repositories contain no business logic.
//
// Ownership note: `enrolled_count` is NOT writable here. The only code
// paths that mutate it are the seat-claim/seat-release transactions in
// EnrollmentRepository, so occupancy has a single mutation entry point.
// ==========================================

use crate::domain::class_section::ClassSection;
use crate::domain::types::ClassStatus;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::lookup_repo::conversion_error;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const CLASS_COLUMNS: &str = "id, code, subject_id, professor_id, schedule_id, course_id, \
                             max_capacity, enrolled_count, semester, status";

pub struct ClassRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ClassRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Writes
    // ==========================================

    /// Insert a new section and return its id. `section.id` is ignored;
    /// `enrolled_count` is persisted as given (0 for fresh sections).
    pub fn insert(&self, section: &ClassSection) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO classes \
             (code, subject_id, professor_id, schedule_id, course_id, \
              max_capacity, enrolled_count, semester, status) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                section.code,
                section.subject_id,
                section.professor_id,
                section.schedule_id,
                section.course_id,
                section.max_capacity,
                section.enrolled_count,
                section.semester,
                section.status.as_str()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Update the mutable fields of a section. `enrolled_count` is
    /// deliberately not part of the statement.
    pub fn update(&self, section: &ClassSection) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE classes SET \
             code = ?2, subject_id = ?3, professor_id = ?4, schedule_id = ?5, \
             course_id = ?6, max_capacity = ?7, semester = ?8, status = ?9 \
             WHERE id = ?1",
            params![
                section.id,
                section.code,
                section.subject_id,
                section.professor_id,
                section.schedule_id,
                section.course_id,
                section.max_capacity,
                section.semester,
                section.status.as_str()
            ],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ClassSection".to_string(),
                id: section.id.to_string(),
            });
        }
        Ok(())
    }

    pub fn set_status(&self, id: i64, status: ClassStatus) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE classes SET status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ClassSection".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM classes WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ClassSection".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // Point lookups
    // ==========================================

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<ClassSection>> {
        let conn = self.get_conn()?;
        let section = conn
            .query_row(
                &format!("SELECT {CLASS_COLUMNS} FROM classes WHERE id = ?1"),
                params![id],
                map_class,
            )
            .optional()?;
        Ok(section)
    }

    pub fn find_by_code(&self, code: &str) -> RepositoryResult<Option<ClassSection>> {
        let conn = self.get_conn()?;
        let section = conn
            .query_row(
                &format!("SELECT {CLASS_COLUMNS} FROM classes WHERE code = ?1"),
                params![code],
                map_class,
            )
            .optional()?;
        Ok(section)
    }

    /// Case-sensitive exact match (code column has no collation override).
    pub fn exists_by_code(&self, code: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM classes WHERE code = ?1",
            params![code],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // ==========================================
    // Conflict query
    // ==========================================

    /// True iff another ACTIVE section assigns the same professor to the
    /// same schedule slot. `exclude_class_id` skips the section being
    /// updated.
    pub fn has_professor_schedule_conflict(
        &self,
        professor_id: i64,
        schedule_id: i64,
        exclude_class_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = match exclude_class_id {
            Some(exclude) => conn.query_row(
                "SELECT COUNT(*) FROM classes \
                 WHERE professor_id = ?1 AND schedule_id = ?2 \
                   AND status = 'ACTIVE' AND id != ?3",
                params![professor_id, schedule_id, exclude],
                |row| row.get(0),
            )?,
            None => conn.query_row(
                "SELECT COUNT(*) FROM classes \
                 WHERE professor_id = ?1 AND schedule_id = ?2 AND status = 'ACTIVE'",
                params![professor_id, schedule_id],
                |row| row.get(0),
            )?,
        };
        Ok(count > 0)
    }

    // ==========================================
    // List queries
    // ==========================================

    pub fn list_all(&self) -> RepositoryResult<Vec<ClassSection>> {
        self.query_list(&format!("SELECT {CLASS_COLUMNS} FROM classes ORDER BY id"), &[])
    }

    pub fn find_all_active(&self) -> RepositoryResult<Vec<ClassSection>> {
        self.query_list(
            &format!("SELECT {CLASS_COLUMNS} FROM classes WHERE status = 'ACTIVE' ORDER BY id"),
            &[],
        )
    }

    pub fn find_by_subject(&self, subject_id: i64) -> RepositoryResult<Vec<ClassSection>> {
        self.query_list(
            &format!("SELECT {CLASS_COLUMNS} FROM classes WHERE subject_id = ?1 ORDER BY id"),
            &[&subject_id],
        )
    }

    pub fn find_by_professor(&self, professor_id: i64) -> RepositoryResult<Vec<ClassSection>> {
        self.query_list(
            &format!("SELECT {CLASS_COLUMNS} FROM classes WHERE professor_id = ?1 ORDER BY id"),
            &[&professor_id],
        )
    }

    pub fn find_by_course(&self, course_id: i64) -> RepositoryResult<Vec<ClassSection>> {
        self.query_list(
            &format!("SELECT {CLASS_COLUMNS} FROM classes WHERE course_id = ?1 ORDER BY id"),
            &[&course_id],
        )
    }

    pub fn find_active_by_course(&self, course_id: i64) -> RepositoryResult<Vec<ClassSection>> {
        self.query_list(
            &format!(
                "SELECT {CLASS_COLUMNS} FROM classes \
                 WHERE course_id = ?1 AND status = 'ACTIVE' ORDER BY id"
            ),
            &[&course_id],
        )
    }

    pub fn find_by_semester(&self, semester: &str) -> RepositoryResult<Vec<ClassSection>> {
        self.query_list(
            &format!("SELECT {CLASS_COLUMNS} FROM classes WHERE semester = ?1 ORDER BY id"),
            &[&semester],
        )
    }

    pub fn find_active_with_available_slots(&self) -> RepositoryResult<Vec<ClassSection>> {
        self.query_list(
            &format!(
                "SELECT {CLASS_COLUMNS} FROM classes \
                 WHERE status = 'ACTIVE' AND enrolled_count < max_capacity ORDER BY id"
            ),
            &[],
        )
    }

    pub fn find_active_by_course_with_slots(
        &self,
        course_id: i64,
    ) -> RepositoryResult<Vec<ClassSection>> {
        self.query_list(
            &format!(
                "SELECT {CLASS_COLUMNS} FROM classes \
                 WHERE course_id = ?1 AND status = 'ACTIVE' \
                   AND enrolled_count < max_capacity ORDER BY id"
            ),
            &[&course_id],
        )
    }

    // ==========================================
    // Counts
    // ==========================================

    pub fn count_active_by_professor(&self, professor_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM classes WHERE professor_id = ?1 AND status = 'ACTIVE'",
            params![professor_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn count_active_by_course(&self, course_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM classes WHERE course_id = ?1 AND status = 'ACTIVE'",
            params![course_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn count_active_by_subject(&self, subject_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM classes WHERE subject_id = ?1 AND status = 'ACTIVE'",
            params![subject_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn query_list(
        &self,
        sql: &str,
        query_params: &[&dyn rusqlite::ToSql],
    ) -> RepositoryResult<Vec<ClassSection>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let sections = stmt
            .query_map(query_params, map_class)?
            .collect::<rusqlite::Result<Vec<ClassSection>>>()?;
        Ok(sections)
    }
}

fn map_class(row: &Row<'_>) -> rusqlite::Result<ClassSection> {
    let status_raw: String = row.get(9)?;
    let status = ClassStatus::parse(&status_raw)
        .ok_or_else(|| conversion_error(9, format!("unknown class status '{status_raw}'")))?;

    Ok(ClassSection {
        id: row.get(0)?,
        code: row.get(1)?,
        subject_id: row.get(2)?,
        professor_id: row.get(3)?,
        schedule_id: row.get(4)?,
        course_id: row.get(5)?,
        max_capacity: row.get(6)?,
        enrolled_count: row.get(7)?,
        semester: row.get(8)?,
        status,
    })
}
