//! Task data structures.
//!
//! This module defines the `Task` record tracked per employee per day, along
//! with its ordered `Feature` sub-records. Tasks reference employees by name
//! only; there is no referential integrity, and deleting an employee (not
//! exposed) would leave their tasks untouched.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::fields::Status;

/// A unit of assigned work with status, sub-features, and audit fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    /// Calendar day the work is logged against.
    pub date: NaiveDate,
    /// Assignee name. Free text, matched against employees by value.
    pub assigned_to: String,
    /// Prior-context note carried over from earlier work.
    #[serde(default)]
    pub previous: String,
    #[serde(default)]
    pub features: Vec<Feature>,
    pub status: Status,
    #[serde(default)]
    pub remarks: String,
    /// Support ticket reference. An empty form value is never stored.
    pub support_ticket: Option<String>,
    pub created_by: Option<String>,
    pub created_at_utc: i64,
    pub updated_by: Option<String>,
    pub updated_at_utc: i64,
}

/// A timestamped sub-item of a task.
///
/// Start/end are accepted as entered; nothing enforces end >= start or
/// non-overlap between features.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub description: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}
