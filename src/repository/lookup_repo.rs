// ==========================================
// Academic Records Core - Identity/Lookup Store
// ==========================================
// Read accessors for the records the engines reference by id
// (students, professors, courses, subjects, schedule slots), plus the
// minimal write accessors needed to populate them. The full CRUD
// surface for these entities lives outside the core.
// Red line: repositories contain no business logic.
// ==========================================

use crate::domain::people::{Course, Professor, Student, Subject};
use crate::domain::schedule::ScheduleSlot;
use crate::domain::types::Period;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveTime, Weekday};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct LookupRepository {
    conn: Arc<Mutex<Connection>>,
}

impl LookupRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Students
    // ==========================================

    pub fn find_student(&self, id: i64) -> RepositoryResult<Option<Student>> {
        let conn = self.get_conn()?;
        let student = conn
            .query_row(
                "SELECT id, registration, name, email, active FROM students WHERE id = ?1",
                params![id],
                map_student,
            )
            .optional()?;
        Ok(student)
    }

    pub fn insert_student(
        &self,
        registration: &str,
        name: &str,
        email: &str,
        active: bool,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO students (registration, name, email, active) VALUES (?1, ?2, ?3, ?4)",
            params![registration, name, email, active],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn set_student_active(&self, id: i64, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE students SET active = ?2 WHERE id = ?1",
            params![id, active],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Student".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // Professors
    // ==========================================

    pub fn find_professor(&self, id: i64) -> RepositoryResult<Option<Professor>> {
        let conn = self.get_conn()?;
        let professor = conn
            .query_row(
                "SELECT id, name, email FROM professors WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Professor {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        email: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(professor)
    }

    pub fn insert_professor(&self, name: &str, email: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO professors (name, email) VALUES (?1, ?2)",
            params![name, email],
        )?;
        Ok(conn.last_insert_rowid())
    }

    // ==========================================
    // Courses
    // ==========================================

    pub fn find_course(&self, id: i64) -> RepositoryResult<Option<Course>> {
        let conn = self.get_conn()?;
        let course = conn
            .query_row(
                "SELECT id, code, name FROM courses WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Course {
                        id: row.get(0)?,
                        code: row.get(1)?,
                        name: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(course)
    }

    pub fn insert_course(&self, code: &str, name: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO courses (code, name) VALUES (?1, ?2)",
            params![code, name],
        )?;
        Ok(conn.last_insert_rowid())
    }

    // ==========================================
    // Subjects
    // ==========================================

    pub fn find_subject(&self, id: i64) -> RepositoryResult<Option<Subject>> {
        let conn = self.get_conn()?;
        let subject = conn
            .query_row(
                "SELECT id, code, name, credit_hours FROM subjects WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Subject {
                        id: row.get(0)?,
                        code: row.get(1)?,
                        name: row.get(2)?,
                        credit_hours: row.get(3)?,
                    })
                },
            )
            .optional()?;
        Ok(subject)
    }

    pub fn insert_subject(
        &self,
        code: &str,
        name: &str,
        credit_hours: i64,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO subjects (code, name, credit_hours) VALUES (?1, ?2, ?3)",
            params![code, name, credit_hours],
        )?;
        Ok(conn.last_insert_rowid())
    }

    // ==========================================
    // Schedule slots
    // ==========================================

    pub fn find_schedule(&self, id: i64) -> RepositoryResult<Option<ScheduleSlot>> {
        let conn = self.get_conn()?;
        let slot = conn
            .query_row(
                "SELECT id, day_of_week, start_time, end_time, period \
                 FROM schedules WHERE id = ?1",
                params![id],
                map_schedule,
            )
            .optional()?;
        Ok(slot)
    }

    /// Persist a slot; `period` is always stored as derived from the start
    /// time, whatever the caller put in the struct.
    pub fn insert_schedule(
        &self,
        day_of_week: Weekday,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let period = crate::domain::schedule::derive_period(start_time);
        conn.execute(
            "INSERT INTO schedules (day_of_week, start_time, end_time, period) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                day_of_week.to_string(),
                start_time.format("%H:%M").to_string(),
                end_time.format("%H:%M").to_string(),
                period.as_str()
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

fn map_student(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        registration: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        active: row.get(4)?,
    })
}

fn map_schedule(row: &Row<'_>) -> rusqlite::Result<ScheduleSlot> {
    let day_raw: String = row.get(1)?;
    let start_raw: String = row.get(2)?;
    let end_raw: String = row.get(3)?;
    let period_raw: String = row.get(4)?;

    let day_of_week = day_raw.parse::<Weekday>().map_err(|_| {
        conversion_error(1, format!("unknown day of week '{day_raw}'"))
    })?;
    let start_time = NaiveTime::parse_from_str(&start_raw, "%H:%M")
        .map_err(|e| conversion_error(2, e.to_string()))?;
    let end_time = NaiveTime::parse_from_str(&end_raw, "%H:%M")
        .map_err(|e| conversion_error(3, e.to_string()))?;
    let period = Period::parse(&period_raw)
        .ok_or_else(|| conversion_error(4, format!("unknown period '{period_raw}'")))?;

    Ok(ScheduleSlot {
        id: row.get(0)?,
        day_of_week,
        start_time,
        end_time,
        period,
    })
}

pub(crate) fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        message.into(),
    )
}
