// ==========================================
// Academic Records Core - Coordinator Repository
// ==========================================
// `coordinators` plus the `coordinator_courses` join table.
// Red line: repositories contain no business logic - the
// last-active-coordinator guard is enforced by the engine, this layer
// only answers cardinality queries.
// ==========================================

use crate::domain::people::Coordinator;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct CoordinatorRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CoordinatorRepository {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Coordinator rows
    // ==========================================

    pub fn insert(
        &self,
        registration: &str,
        name: &str,
        email: &str,
        department: Option<&str>,
        active: bool,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO coordinators (registration, name, email, department, active) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![registration, name, email, department, active],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Coordinator>> {
        let conn = self.get_conn()?;
        let coordinator = conn
            .query_row(
                "SELECT id, registration, name, email, department, active \
                 FROM coordinators WHERE id = ?1",
                params![id],
                map_coordinator,
            )
            .optional()?;
        Ok(coordinator)
    }

    pub fn set_active(&self, id: i64, active: bool) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE coordinators SET active = ?2 WHERE id = ?1",
            params![id, active],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Coordinator".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    pub fn delete(&self, id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM coordinators WHERE id = ?1", params![id])?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Coordinator".to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    // ==========================================
    // Course links
    // ==========================================

    /// Idempotent link insert; re-linking an existing pair is a no-op.
    pub fn link_course(&self, coordinator_id: i64, course_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT OR IGNORE INTO coordinator_courses (coordinator_id, course_id) \
             VALUES (?1, ?2)",
            params![coordinator_id, course_id],
        )?;
        Ok(())
    }

    pub fn unlink_course(&self, coordinator_id: i64, course_id: i64) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "DELETE FROM coordinator_courses WHERE coordinator_id = ?1 AND course_id = ?2",
            params![coordinator_id, course_id],
        )?;
        Ok(())
    }

    pub fn has_link(&self, coordinator_id: i64, course_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM coordinator_courses \
             WHERE coordinator_id = ?1 AND course_id = ?2",
            params![coordinator_id, course_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn course_ids_of(&self, coordinator_id: i64) -> RepositoryResult<Vec<i64>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT course_id FROM coordinator_courses \
             WHERE coordinator_id = ?1 ORDER BY course_id",
        )?;
        let ids = stmt
            .query_map(params![coordinator_id], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<i64>>>()?;
        Ok(ids)
    }

    pub fn count_links(&self, coordinator_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM coordinator_courses WHERE coordinator_id = ?1",
            params![coordinator_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Active coordinators currently linked to a course. Feeds the
    /// minimum-cardinality guard in the assignment engine.
    pub fn find_active_by_course(&self, course_id: i64) -> RepositoryResult<Vec<Coordinator>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT co.id, co.registration, co.name, co.email, co.department, co.active \
             FROM coordinators co \
             JOIN coordinator_courses cc ON cc.coordinator_id = co.id \
             WHERE cc.course_id = ?1 AND co.active = 1 \
             ORDER BY co.id",
        )?;
        let coordinators = stmt
            .query_map(params![course_id], map_coordinator)?
            .collect::<rusqlite::Result<Vec<Coordinator>>>()?;
        Ok(coordinators)
    }
}

fn map_coordinator(row: &Row<'_>) -> rusqlite::Result<Coordinator> {
    Ok(Coordinator {
        id: row.get(0)?,
        registration: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        department: row.get(4)?,
        active: row.get(5)?,
    })
}
