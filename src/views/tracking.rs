//! Request log middleware
//!
//! Every tracked request is stored before the handler runs. A new entry continues the priority
//! of the latest entry for the same path.

use axum::Extension;
use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::database::CreateRequestEntryValues;
use crate::database::Database;
use crate::views::CurrentUser;

/// Store the request in the request log, then run the handler
pub async fn record_request(
    Extension(database): Extension<Database>,
    current_user: Option<CurrentUser>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    if let Err(err) = store_request(&database, &path, &method, current_user.as_ref()).await {
        tracing::error!("{method} {path} could not be saved: {err}");
    } else {
        tracing::info!("{method} {path} was saved");
    }

    next.run(request).await
}

/// Leave the request out of the request log
pub async fn skip_request(request: Request, next: Next) -> Response {
    tracing::info!("{} {} wasn't saved", request.method(), request.uri().path());

    next.run(request).await
}

async fn store_request(
    database: &Database,
    path: &str,
    method: &str,
    current_user: Option<&CurrentUser>,
) -> crate::database::Result<()> {
    let priority = database
        .find_latest_request_entry_by_path(path)
        .await?
        .map_or(0, |entry| entry.priority);

    let values = CreateRequestEntryValues {
        path,
        method,
        user_id: current_user.map(|user| user.id),
        priority,
    };

    database.create_request_entry(&values).await?;

    Ok(())
}
