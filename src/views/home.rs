use axum::Extension;
use axum::response::Html;

use crate::admin::AdminSite;
use crate::database::Database;
use crate::settings::Settings;
use crate::views::CurrentUser;
use crate::views::Error;
use crate::views::templates;

/// Show the contact card
pub async fn home_page(
    Extension(database): Extension<Database>,
    Extension(settings): Extension<Settings>,
    Extension(admin_site): Extension<AdminSite>,
    current_user: Option<CurrentUser>,
) -> Result<Html<String>, Error> {
    let contact = database
        .find_first_contact()
        .await
        .map_err(Error::internal_server_error)?;

    let edit_link = match (&contact, &current_user) {
        (Some(contact), Some(_)) => admin_site
            .edit_link(contact)
            .map_err(Error::internal_server_error)?,
        _ => None,
    };

    Ok(Html(templates::home_page(
        contact.as_ref(),
        current_user.as_ref().map(|user| user.username.as_str()),
        edit_link.as_deref(),
        &settings.empty_contact_text,
    )))
}
