// ==========================================
// Academic Records Core - Domain Types
// ==========================================
// Status enums and the day-period classification.
// Serialized form: SCREAMING_SNAKE_CASE (matches stored form)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Class section status
// ==========================================
// No transition out of CANCELLED/COMPLETED back to ACTIVE is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassStatus {
    Active,
    Cancelled,
    Completed,
    Suspended,
}

impl ClassStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassStatus::Active => "ACTIVE",
            ClassStatus::Cancelled => "CANCELLED",
            ClassStatus::Completed => "COMPLETED",
            ClassStatus::Suspended => "SUSPENDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(ClassStatus::Active),
            "CANCELLED" => Some(ClassStatus::Cancelled),
            "COMPLETED" => Some(ClassStatus::Completed),
            "SUSPENDED" => Some(ClassStatus::Suspended),
            _ => None,
        }
    }
}

impl fmt::Display for ClassStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Enrollment status
// ==========================================
// Suspended corresponds to a locked/withdrawn semester ("trancada"):
// the enrollment is on hold but not terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnrollmentStatus {
    Active,
    Cancelled,
    Completed,
    Suspended,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "ACTIVE",
            EnrollmentStatus::Cancelled => "CANCELLED",
            EnrollmentStatus::Completed => "COMPLETED",
            EnrollmentStatus::Suspended => "SUSPENDED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(EnrollmentStatus::Active),
            "CANCELLED" => Some(EnrollmentStatus::Cancelled),
            "COMPLETED" => Some(EnrollmentStatus::Completed),
            "SUSPENDED" => Some(EnrollmentStatus::Suspended),
            _ => None,
        }
    }
}

impl fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// Day period
// ==========================================
// Derived deterministically from a slot's start time:
// before 12:00 -> Morning, before 18:00 -> Afternoon, else Evening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Period {
    Morning,
    Afternoon,
    Evening,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Morning => "MORNING",
            Period::Afternoon => "AFTERNOON",
            Period::Evening => "EVENING",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MORNING" => Some(Period::Morning),
            "AFTERNOON" => Some(Period::Afternoon),
            "EVENING" => Some(Period::Evening),
            _ => None,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
