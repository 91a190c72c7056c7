// ==========================================
// Academic Records Core - SQLite Infrastructure
// ==========================================
// Goals:
// - One place for Connection::open PRAGMA behavior, so every module
//   gets foreign keys and busy_timeout instead of a random subset
// - One place for the schema, shared by the library and the tests
// ==========================================

use rusqlite::Connection;
use std::time::Duration;

/// Default busy_timeout (milliseconds). Absorbs short writer contention
/// when several connections share one database file.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Apply the unified PRAGMA set to a connection.
///
/// foreign_keys and busy_timeout are per-connection settings and must be
/// re-applied on every open.
pub fn configure_sqlite_connection(conn: &Connection, busy_timeout_ms: u64) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
    Ok(())
}

/// Open a SQLite connection with the unified configuration applied.
pub fn open_sqlite_connection(db_path: &str, busy_timeout_ms: u64) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn, busy_timeout_ms)?;
    Ok(conn)
}

/// Create all tables and indexes (idempotent).
///
/// Constraint notes:
/// - `classes` carries the occupancy invariant as a CHECK so that no code
///   path, guarded or not, can persist `enrolled_count` outside
///   [0, max_capacity].
/// - The partial unique indexes over ACTIVE rows are the race backstop for
///   the check-then-insert sequences in the engines: a concurrent duplicate
///   submission that slips past the read check fails on commit instead of
///   producing a second ACTIVE assignment for the same (person, slot) or
///   (student, class) pair.
/// - `enrollments.schedule_id` is denormalized from the class at insert
///   time so the (student_id, schedule_id) index can cover two different
///   classes sharing one slot.
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS students (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            registration    TEXT NOT NULL UNIQUE,
            name            TEXT NOT NULL,
            email           TEXT NOT NULL UNIQUE,
            active          INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS professors (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL,
            email           TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS courses (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            code            TEXT NOT NULL UNIQUE,
            name            TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS subjects (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            code            TEXT NOT NULL UNIQUE,
            name            TEXT NOT NULL,
            credit_hours    INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS schedules (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            day_of_week     TEXT NOT NULL,
            start_time      TEXT NOT NULL,
            end_time        TEXT NOT NULL,
            period          TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS classes (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            code            TEXT NOT NULL UNIQUE,
            subject_id      INTEGER NOT NULL REFERENCES subjects(id),
            professor_id    INTEGER NOT NULL REFERENCES professors(id),
            schedule_id     INTEGER NOT NULL REFERENCES schedules(id),
            course_id       INTEGER NOT NULL REFERENCES courses(id),
            max_capacity    INTEGER NOT NULL CHECK (max_capacity > 0),
            enrolled_count  INTEGER NOT NULL DEFAULT 0
                            CHECK (enrolled_count >= 0 AND enrolled_count <= max_capacity),
            semester        TEXT NOT NULL DEFAULT '',
            status          TEXT NOT NULL DEFAULT 'ACTIVE'
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_classes_active_professor_slot
            ON classes (professor_id, schedule_id)
            WHERE status = 'ACTIVE';

        CREATE TABLE IF NOT EXISTS enrollments (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id          INTEGER NOT NULL REFERENCES students(id),
            class_id            INTEGER NOT NULL REFERENCES classes(id),
            schedule_id         INTEGER NOT NULL REFERENCES schedules(id),
            enrolled_at         TEXT NOT NULL,
            status              TEXT NOT NULL DEFAULT 'ACTIVE',
            final_grade         REAL,
            attendance          REAL,
            cancelled_at        TEXT,
            cancellation_reason TEXT
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_enrollments_active_student_class
            ON enrollments (student_id, class_id)
            WHERE status = 'ACTIVE';

        CREATE UNIQUE INDEX IF NOT EXISTS idx_enrollments_active_student_slot
            ON enrollments (student_id, schedule_id)
            WHERE status = 'ACTIVE';

        CREATE INDEX IF NOT EXISTS idx_enrollments_class
            ON enrollments (class_id);
        CREATE INDEX IF NOT EXISTS idx_enrollments_student
            ON enrollments (student_id);

        CREATE TABLE IF NOT EXISTS coordinators (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            registration    TEXT NOT NULL UNIQUE,
            name            TEXT NOT NULL,
            email           TEXT NOT NULL UNIQUE,
            department      TEXT,
            active          INTEGER NOT NULL DEFAULT 1
        );

        CREATE TABLE IF NOT EXISTS coordinator_courses (
            coordinator_id  INTEGER NOT NULL REFERENCES coordinators(id),
            course_id       INTEGER NOT NULL REFERENCES courses(id),
            PRIMARY KEY (coordinator_id, course_id)
        );
        "#,
    )
}

/// Open a connection and make sure the schema exists.
pub fn open_and_init(db_path: &str) -> rusqlite::Result<Connection> {
    open_and_init_with_timeout(db_path, DEFAULT_BUSY_TIMEOUT_MS)
}

pub fn open_and_init_with_timeout(
    db_path: &str,
    busy_timeout_ms: u64,
) -> rusqlite::Result<Connection> {
    let conn = open_sqlite_connection(db_path, busy_timeout_ms)?;
    init_schema(&conn)?;
    Ok(conn)
}
