//! Logged HTTP requests

use std::fmt;

use chrono::naive::NaiveDateTime;

use crate::models::Model;

/// A single observed HTTP request
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct RequestEntry {
    /// Entry ID
    pub id: i64,

    /// Requested path, without query string
    pub path: String,

    /// HTTP method
    pub method: String,

    /// The logged in user making the request
    pub user_id: Option<i64>,

    /// Moment the request came in
    pub date: NaiveDateTime,

    /// Ranking in the requests feed, inherited from earlier requests to the same path
    pub priority: i64,

    /// Not yet seen on the requests page
    pub is_new: bool,
}

impl fmt::Display for RequestEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.path, self.method)
    }
}

impl Model for RequestEntry {
    const MODEL_NAME: &'static str = "requestentry";
    const VERBOSE_NAME: &'static str = "Request entry";
    const TABLE: &'static str = "request_entries";
    const ORDERING: &'static str = "date DESC, id DESC";

    fn pk(&self) -> i64 {
        self.id
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("path", self.path.clone()),
            ("method", self.method.clone()),
            (
                "user",
                self.user_id.map(|id| id.to_string()).unwrap_or_default(),
            ),
            ("date", self.date.to_string()),
            ("priority", self.priority.to_string()),
            ("new request", u8::from(self.is_new).to_string()),
        ]
    }
}
