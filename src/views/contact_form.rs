//! The contact edit form
//!
//! Submissions are `multipart/form-data`, the photo comes in the `image` field. AJAX
//! submissions get JSON back, plain submissions a redirect or the form with its errors.

use std::collections::HashMap;

use axum::Extension;
use axum::Json;
use axum::extract::Multipart;
use axum::extract::multipart::MultipartRejection;
use axum::http::StatusCode;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use chrono::NaiveDate;
use serde::Serialize;

use crate::contacts;
use crate::contacts::Contact;
use crate::contacts::ImageChange;
use crate::contacts::Upload;
use crate::database::Database;
use crate::forms::ContactForm;
use crate::forms::FieldErrors;
use crate::media::MediaStorage;
use crate::settings::Settings;
use crate::views::Ajax;
use crate::views::CurrentUser;
use crate::views::Error;
use crate::views::Record;
use crate::views::templates;

/// Name of the file field
const IMAGE_FIELD: &str = "image";

/// Serialized fields of a saved contact
#[derive(Debug, Serialize)]
pub struct ContactFields {
    name: String,
    surname: String,
    date_of_birth: NaiveDate,
    bio: String,
    email: String,
    jabber: String,
    skype_id: String,
    other: String,

    /// Name of the photo in the media storage, empty without photo
    image: String,
    height: Option<i64>,
    width: Option<i64>,
}

impl From<&Contact> for ContactFields {
    fn from(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            surname: contact.surname.clone(),
            date_of_birth: contact.date_of_birth,
            bio: contact.bio.clone(),
            email: contact.email.clone(),
            jabber: contact.jabber.clone(),
            skype_id: contact.skype_id.clone(),
            other: contact.other.clone(),
            image: contact.image.clone().unwrap_or_default(),
            height: contact.image_height,
            width: contact.image_width,
        }
    }
}

/// Show the form, pre-filled from the current contact
pub async fn edit(
    _current_user: CurrentUser,
    Extension(database): Extension<Database>,
) -> Result<Html<String>, Error> {
    let contact = database
        .find_first_contact()
        .await
        .map_err(Error::internal_server_error)?;

    let form = contact
        .as_ref()
        .map(ContactForm::from_contact)
        .unwrap_or_default();

    Ok(Html(templates::contact_form_page(
        &form,
        &FieldErrors::new(),
        contact.as_ref().and_then(|contact| contact.image.as_deref()),
    )))
}

fn invalid_form_data<E: ToString>(err: E) -> Error {
    Error::bad_request("Invalid form data").with_description(err)
}

/// Split the submission in text fields and the uploaded photo
///
/// A file field without file name or content counts as no upload
async fn read_submission(
    mut multipart: Multipart,
) -> Result<(HashMap<String, String>, Option<Upload>), Error> {
    let mut fields = HashMap::new();
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_form_data)? {
        let Some(name) = field.name().map(ToString::to_string) else {
            continue;
        };

        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(invalid_form_data)?;

            if !file_name.is_empty() && !bytes.is_empty() {
                image = Some(Upload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
        } else {
            let value = field.text().await.map_err(invalid_form_data)?;
            fields.insert(name, value);
        }
    }

    Ok((fields, image))
}

/// Validate and save the contact
pub async fn save(
    current_user: CurrentUser,
    Ajax(is_ajax): Ajax,
    Extension(database): Extension<Database>,
    Extension(settings): Extension<Settings>,
    Extension(media): Extension<MediaStorage>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, Error> {
    let multipart = multipart.map_err(|err| {
        Error::bad_request("Missing `multipart/form-data` content type").with_description(err)
    })?;

    let (fields, image) = read_submission(multipart).await?;

    let existing = database
        .find_first_contact()
        .await
        .map_err(Error::internal_server_error)?;

    let form = ContactForm::from_fields(&fields);

    let cleaned = match form.validate(image.as_ref()) {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            tracing::debug!("Invalid contact form: {errors:?}");

            if is_ajax {
                return Err(Error::invalid_form(errors));
            }

            let page = templates::contact_form_page(
                &form,
                &errors,
                existing.as_ref().and_then(|contact| contact.image.as_deref()),
            );

            return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
        }
    };

    let image_change = match image {
        Some(upload) => ImageChange::Replace(upload),
        None if form.clear_image => ImageChange::Clear,
        None => ImageChange::Keep,
    };

    let contact = contacts::save_contact(
        &database,
        &media,
        existing.as_ref(),
        &cleaned.values(),
        image_change,
    )
    .await
    .map_err(Error::internal_server_error)?;

    tracing::info!(
        "Contact {contact} saved by {}",
        current_user.username
    );

    if !is_ajax {
        return Ok(Redirect::to("/").into_response());
    }

    if !settings.form_ajax_delay.is_zero() {
        tokio::time::sleep(settings.form_ajax_delay).await;
    }

    let records = vec![Record::new(&contact, ContactFields::from(&contact))];

    Ok(Json(records).into_response())
}
