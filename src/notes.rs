//! The change log
//!
//! One note per create/update/delete of a tracked model

use std::fmt;

use chrono::naive::NaiveDateTime;

use crate::models::Model;

/// What happened to the instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[repr(i32)]
pub enum Action {
    /// Instance is created
    Created = 0,

    /// Instance is changed
    Changed = 1,

    /// Instance is deleted
    Deleted = 2,
}

impl Action {
    /// Numeric code as stored
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Created => write!(f, "created"),
            Action::Changed => write!(f, "changed"),
            Action::Deleted => write!(f, "deleted"),
        }
    }
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Note {
    pub id: i64,
    pub model: String,
    pub instance: String,
    pub action_type: Action,
    pub created_at: NaiveDateTime,
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.model, self.action_type, self.instance)
    }
}

impl Model for Note {
    const MODEL_NAME: &'static str = "note";
    const VERBOSE_NAME: &'static str = "Note";
    const TABLE: &'static str = "notes";
    const ORDERING: &'static str = "id DESC";

    // writing a note about a note would never end
    const TRACKED: bool = false;

    fn pk(&self) -> i64 {
        self.id
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("model", self.model.clone()),
            ("instance", self.instance.clone()),
            ("action type", self.action_type.code().to_string()),
            ("created at", self.created_at.to_string()),
        ]
    }
}
