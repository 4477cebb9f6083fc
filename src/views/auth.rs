//! Login and logout
//!
//! A successful login stores a signed token in the session cookie. Logging out rotates the
//! session ID of the user, so every token handed out before stops working.

use axum::Extension;
use axum::extract::Query;
use axum::http::header;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::Database;
use crate::password;
use crate::views::CurrentUser;
use crate::views::Error;
use crate::views::FormFields;
use crate::views::JwtKeys;
use crate::views::current_user::clear_session_cookie;
use crate::views::current_user::generate_token;
use crate::views::current_user::session_cookie;
use crate::views::templates;

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
    next: Option<String>,
}

/// Only local paths are followed after logging in
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(next) if next.starts_with('/') && !next.starts_with("//") => next,
        _ => "/",
    }
}

/// Show the login form
pub async fn login_page(Query(params): Query<LoginParams>) -> Html<String> {
    Html(templates::login_page(
        "",
        safe_next(params.next.as_deref()),
        false,
    ))
}

/// Check the credentials and start a session
pub async fn login(
    Extension(database): Extension<Database>,
    Extension(jwt_keys): Extension<JwtKeys>,
    FormFields(form): FormFields<LoginForm>,
) -> Result<Response, Error> {
    let next = safe_next(form.next.as_deref());

    let user = database
        .find_single_user_by_username(form.username.trim())
        .await
        .map_err(Error::internal_server_error)?;

    let Some(user) = user.filter(|user| password::verify(&user.hashed_password, &form.password))
    else {
        tracing::info!(r#"Failed login attempt for "{}""#, form.username);

        return Ok(Html(templates::login_page(&form.username, next, true)).into_response());
    };

    let token = generate_token(&jwt_keys, &user)?;

    tracing::info!("{user} logged in");

    Ok((
        [(header::SET_COOKIE, session_cookie(&token))],
        Redirect::to(next),
    )
        .into_response())
}

/// End the session
pub async fn logout(
    Extension(database): Extension<Database>,
    current_user: Option<CurrentUser>,
) -> Result<Response, Error> {
    if let Some(current_user) = current_user {
        database
            .rotate_session(&current_user, &Uuid::new_v4())
            .await
            .map_err(Error::internal_server_error)?;

        tracing::info!("{} logged out", current_user.username);
    }

    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/"),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!("/form/", safe_next(Some("/form/")));
        assert_eq!("/", safe_next(Some("//evil.example.com/")));
        assert_eq!("/", safe_next(Some("https://evil.example.com/")));
        assert_eq!("/", safe_next(None));
    }
}
