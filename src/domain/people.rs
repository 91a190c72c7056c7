// ==========================================
// Academic Records Core - Referenced Records
// ==========================================
// Students, professors, coordinators, courses and subjects.
// The core validates their existence and activity gates; their full
// CRUD surface lives in the surrounding application layer.
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub registration: String,
    pub name: String,
    pub email: String,
    /// Inactive students cannot gain new active enrollments.
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professor {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub credit_hours: i64,
}

/// A coordinator may manage several courses (many-to-many through
/// `coordinator_courses`). Inactive coordinators keep their links but
/// no longer count toward a course's active-coordinator cardinality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coordinator {
    pub id: i64,
    pub registration: String,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub active: bool,
}
