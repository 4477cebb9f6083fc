//! Request helpers

use std::convert::Infallible;

use axum::extract::Form;
use axum::extract::FromRequest;
use axum::extract::FromRequestParts;
use axum::extract::Path;
use axum::extract::Request;
use axum::extract::rejection::FormRejection;
use axum::extract::rejection::PathRejection;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;

use super::Error;

/// Header set by the scripts on AJAX calls
const REQUESTED_WITH: &str = "x-requested-with";

/// Is the request an AJAX call?
pub fn is_ajax(headers: &HeaderMap) -> bool {
    headers
        .get(REQUESTED_WITH)
        .is_some_and(|value| value.as_bytes().eq_ignore_ascii_case(b"XMLHttpRequest"))
}

/// Extract whether the request is an AJAX call
#[derive(Clone, Copy, Debug)]
pub struct Ajax(pub bool);

impl<S> FromRequestParts<S> for Ajax
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(is_ajax(&parts.headers)))
    }
}

fn parse_form<F>(form: Result<Form<F>, FormRejection>) -> Result<F, Error> {
    match form {
        Ok(Form(form)) => Ok(form),
        Err(err) => match err {
            FormRejection::InvalidFormContentType(_err) => Err(Error::bad_request(
                "Missing `application/x-www-form-urlencoded` content type",
            )),
            FormRejection::FailedToDeserializeForm(err) => {
                Err(Error::bad_request("Invalid form data").with_description(err))
            }
            FormRejection::FailedToDeserializeFormBody(err) => {
                Err(Error::bad_request("Invalid form data").with_description(err))
            }
            err => Err(Error::bad_request("Unknown form error").with_description(err)),
        },
    }
}

/// Wrapper for the URL encoded form extractor
pub struct FormFields<F>(pub F);

impl<S, F> FromRequest<S> for FormFields<F>
where
    S: Send + Sync,
    F: DeserializeOwned,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let form = Form::<F>::from_request(req, state).await;

        parse_form(form).map(FormFields)
    }
}

fn parse_path<P>(path: Result<Path<P>, PathRejection>) -> Result<P, Error> {
    match path {
        Ok(Path(path)) => Ok(path),
        Err(err) => match err {
            PathRejection::FailedToDeserializePathParams(err) => {
                Err(Error::bad_request("Invalid path parameter").with_description(err))
            }
            PathRejection::MissingPathParams(err) => {
                Err(Error::bad_request("Missing path parameter").with_description(err))
            }
            err => Err(Error::bad_request("Unknown path error").with_description(err)),
        },
    }
}

/// Wrapper for the path extractor
pub struct PathParameters<P>(pub P);

impl<S, P> FromRequestParts<S> for PathParameters<P>
where
    S: Send + Sync,
    P: DeserializeOwned + Send,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let path = Path::<P>::from_request_parts(parts, state).await;

        parse_path(path).map(PathParameters)
    }
}
