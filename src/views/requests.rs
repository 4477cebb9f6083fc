//! The request log pages
//!
//! The requests page is a shell, its script polls the feed for the list

use axum::Extension;
use axum::Json;
use axum::extract::Query;
use axum::response::Html;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;

use crate::database::Database;
use crate::requests::RequestEntry;
use crate::views::Ajax;
use crate::views::Error;
use crate::views::FormFields;
use crate::views::Record;
use crate::views::templates;

/// Number of entries in the feed
const FEED_SIZE: i64 = 10;

/// Serialized fields of a logged request
#[derive(Debug, Serialize)]
pub struct RequestEntryFields {
    path: String,
    method: String,
    user: Option<i64>,
    date: NaiveDateTime,
    priority: i64,

    /// `1` when not yet seen, `0` otherwise
    new_request: u8,
}

impl From<&RequestEntry> for RequestEntryFields {
    fn from(entry: &RequestEntry) -> Self {
        Self {
            path: entry.path.clone(),
            method: entry.method.clone(),
            user: entry.user_id,
            date: entry.date,
            priority: entry.priority,
            new_request: u8::from(entry.is_new),
        }
    }
}

/// Count of unseen entries, followed by the top of the log
type Feed = (i64, Vec<Record<RequestEntryFields>>);

#[derive(Debug, Deserialize)]
pub struct FeedParams {
    /// `yes` when the requests page has focus, marks everything as seen
    viewed: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PriorityUpdate {
    path: String,
    priority: i64,
}

#[derive(Debug, Serialize)]
pub struct PriorityUpdated {
    status: &'static str,
    updated: u64,
}

fn ajax_only(Ajax(is_ajax): Ajax) -> Result<(), Error> {
    if is_ajax {
        Ok(())
    } else {
        Err(Error::bad_request("AJAX requests only"))
    }
}

/// Show the requests page, everything logged so far counts as seen
pub async fn requests_page(
    Extension(database): Extension<Database>,
) -> Result<Html<String>, Error> {
    let seen = database
        .mark_request_entries_seen()
        .await
        .map_err(Error::internal_server_error)?;

    tracing::debug!("Marked {seen} requests as seen");

    Ok(Html(templates::requests_page()))
}

/// Unseen count and the most important logged requests
pub async fn feed(
    ajax: Ajax,
    Extension(database): Extension<Database>,
    Query(params): Query<FeedParams>,
) -> Result<Json<Feed>, Error> {
    ajax_only(ajax)?;

    let new_count = database
        .count_new_request_entries()
        .await
        .map_err(Error::internal_server_error)?;

    if params.viewed.as_deref() == Some("yes") {
        database
            .mark_request_entries_seen()
            .await
            .map_err(Error::internal_server_error)?;
    }

    let entries = database
        .find_top_request_entries(FEED_SIZE)
        .await
        .map_err(Error::internal_server_error)?;

    let records = entries
        .iter()
        .map(|entry| Record::new(entry, RequestEntryFields::from(entry)))
        .collect();

    Ok(Json((new_count, records)))
}

/// Change the priority of every logged request for a path
///
/// Negative priorities are ignored
pub async fn update_priority(
    ajax: Ajax,
    Extension(database): Extension<Database>,
    FormFields(update): FormFields<PriorityUpdate>,
) -> Result<Json<PriorityUpdated>, Error> {
    ajax_only(ajax)?;

    let updated = if update.priority >= 0 {
        database
            .update_priority_by_path(&update.path, update.priority)
            .await
            .map_err(Error::internal_server_error)?
    } else {
        0
    };

    tracing::debug!(
        "Priority of {} set to {} on {updated} requests",
        update.path,
        update.priority
    );

    Ok(Json(PriorityUpdated {
        status: "ok",
        updated,
    }))
}
