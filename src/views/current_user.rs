//! Current user service
//!
//! Get the current user from the request based on the session cookie

use std::convert::Infallible;
use std::ops::Deref;
use std::sync::Arc;

use axum::Extension;
use axum::RequestPartsExt;
use axum::extract::FromRequestParts;
use axum::extract::OptionalFromRequestParts;
use axum::http::request::Parts;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use axum_extra::TypedHeader;
use axum_extra::headers::Cookie;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::database::Database;
use crate::users::User;

use super::Error;

/// Name of the cookie holding the session token
pub const SESSION_COOKIE: &str = "session";

/// How long a session lasts, in seconds
const SESSION_LIFETIME: i64 = 3600;

/// The keys used for encoding/decoding JWT tokens
#[derive(Clone)]
pub struct JwtKeys {
    /// The encoding key
    encoding: EncodingKey,

    /// The decoding key
    decoding: DecodingKey,
}

impl JwtKeys {
    /// Create new encoding/decoding keys, derived from a secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// The JWT claims to identifies a user
#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    /// The user ID
    sub: i64,

    /// When does the token expire
    exp: i64,

    /// A sessions ID, used to invalidate tokens on logout
    jti: Uuid,
}

/// Current user service
#[derive(Clone)]
pub struct CurrentUser {
    /// The actual user
    user: Arc<User>,
}

impl CurrentUser {
    /// Create the current user from a user
    fn new(user: User) -> Self {
        Self {
            user: Arc::new(user),
        }
    }
}

impl Deref for CurrentUser {
    type Target = User;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

/// Generate a session token for a given user
pub fn generate_token(jwt_keys: &JwtKeys, user: &User) -> Result<String, Error> {
    use jsonwebtoken::Header;
    use jsonwebtoken::encode;

    let claims = Claims {
        sub: user.id,
        exp: chrono::Utc::now().timestamp() + SESSION_LIFETIME,
        jti: user.session_id,
    };

    encode(&Header::default(), &claims, &jwt_keys.encoding).map_err(Error::internal_server_error)
}

/// `Set-Cookie` value to start a session
pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; Max-Age={SESSION_LIFETIME}; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value to end a session
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}

/// Where to send someone who needs to log in first
pub fn login_url(next: &str) -> String {
    format!("/login/?next={}", utf8_percent_encode(next, NON_ALPHANUMERIC))
}

/// The page needs a logged in user, send the visitor to the login page
#[derive(Debug)]
pub struct LoginRequired {
    /// Page to return to after logging in
    next: String,
}

impl IntoResponse for LoginRequired {
    fn into_response(self) -> Response {
        Redirect::to(&login_url(&self.next)).into_response()
    }
}

/// Why a session could not be resolved to a user
#[derive(Debug)]
enum SessionError {
    /// No session cookie, or a stale one
    Anonymous,

    /// Something broke while looking up the user
    Internal(String),
}

async fn user_from_session(parts: &mut Parts) -> Result<User, SessionError> {
    use jsonwebtoken::Validation;
    use jsonwebtoken::decode;

    let cookie = parts
        .extract::<Option<TypedHeader<Cookie>>>()
        .await
        .map_err(|err| SessionError::Internal(err.to_string()))?;

    let Some(TypedHeader(cookie)) = cookie else {
        return Err(SessionError::Anonymous);
    };

    let Some(token) = cookie.get(SESSION_COOKIE) else {
        return Err(SessionError::Anonymous);
    };

    let Extension(jwt_keys) = parts
        .extract::<Extension<JwtKeys>>()
        .await
        .map_err(|_| SessionError::Internal("Could not get JWT keys".to_string()))?;

    let Extension(database) = parts
        .extract::<Extension<Database>>()
        .await
        .map_err(|_| SessionError::Internal("Could not get a database pool".to_string()))?;

    let validation = Validation::default();

    // Decode the user data
    let token_data = decode::<Claims>(token, &jwt_keys.decoding, &validation).map_err(|err| {
        tracing::debug!("Invalid session token: {err}");
        SessionError::Anonymous
    })?;

    let claims = token_data.claims;

    let user = database
        .find_single_user_by_id(claims.sub)
        .await
        .map_err(|err| SessionError::Internal(err.to_string()))?
        .ok_or(SessionError::Anonymous)?;

    // logging out rotates the session ID, which invalidates all earlier tokens
    if claims.jti != user.session_id {
        return Err(SessionError::Anonymous);
    }

    Ok(user)
}

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = LoginRequired;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let next = parts
            .uri
            .path_and_query()
            .map_or_else(|| parts.uri.path().to_string(), ToString::to_string);

        match user_from_session(parts).await {
            Ok(user) => Ok(CurrentUser::new(user)),
            Err(SessionError::Anonymous) => Err(LoginRequired { next }),
            Err(SessionError::Internal(err)) => {
                tracing::error!("Could not resolve the session: {err}");
                Err(LoginRequired { next })
            }
        }
    }
}

impl<S> OptionalFromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        match user_from_session(parts).await {
            Ok(user) => Ok(Some(CurrentUser::new(user))),
            Err(SessionError::Anonymous) => Ok(None),
            Err(SessionError::Internal(err)) => {
                tracing::error!("Could not resolve the session: {err}");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url() {
        assert_eq!("/login/?next=%2Fform%2F", login_url("/form/"));
        assert_eq!(
            "/login/?next=%2Fadmin%2F%3Fq%3D1",
            login_url("/admin/?q=1")
        );
    }

    #[test]
    fn test_session_cookie() {
        let cookie = session_cookie("abc");

        assert!(cookie.starts_with("session=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(clear_session_cookie().contains("Max-Age=0"));
    }
}
