//! Enumerations and field types shared across the task tracker.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task completion status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[serde(alias = "To Do")]
    ToDo,
    #[serde(alias = "In Progress")]
    InProgress,
    #[serde(alias = "Done")]
    Done,
}

impl Default for Status {
    fn default() -> Self {
        Status::ToDo
    }
}
