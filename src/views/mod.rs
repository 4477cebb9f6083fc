//! All page and AJAX endpoint setup

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::MethodRouter;
use axum::routing::get;

pub use current_user::CurrentUser;
pub use current_user::JwtKeys;
pub use request::Ajax;
pub use request::FormFields;
pub use request::PathParameters;
pub use response::Error;
pub use response::Record;

mod auth;
mod contact_form;
mod current_user;
mod home;
mod request;
mod requests;
mod response;
pub mod templates;
mod tracking;

/// Largest accepted body of the edit form, photo included
const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Whether requests to a route end up in the request log
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tracking {
    /// Log every request to the route
    Record,

    /// Never log requests to the route
    Skip,
}

/// Attach the request tracking to a route
pub fn with_tracking(method_router: MethodRouter, tracking: Tracking) -> MethodRouter {
    match tracking {
        Tracking::Record => method_router.layer(middleware::from_fn(tracking::record_request)),
        Tracking::Skip => method_router.layer(middleware::from_fn(tracking::skip_request)),
    }
}

/// Get the Axum router for all pages
pub fn router() -> Router {
    Router::new()
        .route("/", with_tracking(get(home::home_page), Tracking::Record))
        .route(
            "/requests/",
            with_tracking(get(requests::requests_page), Tracking::Record),
        )
        // polled by the requests page, logging it would flood the log
        .route(
            "/requests_ajax/",
            with_tracking(
                get(requests::feed).post(requests::update_priority),
                Tracking::Skip,
            ),
        )
        .route(
            "/form/",
            with_tracking(
                get(contact_form::edit).post(contact_form::save),
                Tracking::Record,
            )
            .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE)),
        )
        .route(
            "/login/",
            with_tracking(get(auth::login_page).post(auth::login), Tracking::Record),
        )
        .route("/logout/", with_tracking(get(auth::logout), Tracking::Record))
}
