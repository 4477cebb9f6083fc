//! Response helpers

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use crate::forms::FieldErrors;
use crate::models::Model;

/// A model instance, serialized with its label and primary key next to its fields
#[derive(Debug, Serialize)]
pub struct Record<F>
where
    F: Serialize,
{
    /// Label of the model, like `card.contact`
    model: String,

    /// Primary key
    pk: i64,

    /// Serialized fields
    fields: F,
}

impl<F> Record<F>
where
    F: Serialize,
{
    pub fn new<M: Model>(instance: &M, fields: F) -> Self {
        Self {
            model: M::label(),
            pk: instance.pk(),
            fields,
        }
    }
}

/// Hold data for a failed interaction
#[derive(Debug)]
pub struct Error {
    status_code: StatusCode,
    message: String,
    description: Option<String>,
    field_errors: Option<FieldErrors>,
}

impl Error {
    pub fn bad_request<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::BAD_REQUEST,
            message: message.to_string(),
            description: None,
            field_errors: None,
        }
    }

    pub fn not_found<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::NOT_FOUND,
            message: message.to_string(),
            description: None,
            field_errors: None,
        }
    }

    pub fn internal_server_error<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
            description: None,
            field_errors: None,
        }
    }

    /// Form validation failed, the response body is the map of field errors
    pub fn invalid_form(field_errors: FieldErrors) -> Self {
        Self {
            status_code: StatusCode::BAD_REQUEST,
            message: "Invalid form".to_string(),
            description: None,
            field_errors: Some(field_errors),
        }
    }

    pub fn with_description<M>(&self, description: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code: self.status_code,
            message: self.message.clone(),
            description: Some(description.to_string()),
            field_errors: self.field_errors.clone(),
        }
    }
}

#[derive(Serialize)]
struct ErrorWrapper<D>
where
    D: Serialize,
{
    error: D,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<D>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        if self.status_code.is_server_error() {
            tracing::error!("{}", self.message);
        }

        if let Some(field_errors) = self.field_errors {
            return (self.status_code, Json(field_errors)).into_response();
        }

        (
            self.status_code,
            Json(ErrorWrapper {
                error: self.message,
                description: self.description,
            }),
        )
            .into_response()
    }
}
