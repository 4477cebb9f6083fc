use std::fmt::Write;

use axum::Extension;
use axum::response::Html;
use axum::response::IntoResponse;
use axum::response::Redirect;
use axum::response::Response;
use sqlx::FromRow;
use sqlx::sqlite::SqliteRow;

use crate::admin::AdminSite;
use crate::admin::ModelEntry;
use crate::contacts;
use crate::contacts::Contact;
use crate::database::Database;
use crate::media::MediaStorage;
use crate::models::Model;
use crate::notes::Note;
use crate::requests::RequestEntry;
use crate::views::CurrentUser;
use crate::views::Error;
use crate::views::PathParameters;
use crate::views::templates::admin_page;
use crate::views::templates::escape;

fn find_entry<'a>(
    admin_site: &'a AdminSite,
    app_label: &str,
    model_name: &str,
) -> Result<&'a ModelEntry, Error> {
    admin_site
        .find(app_label, model_name)
        .ok_or_else(|| Error::not_found("Unknown model"))
}

async fn find_instance<M>(database: &Database, id: i64) -> Result<M, Error>
where
    M: Model + for<'r> FromRow<'r, SqliteRow>,
{
    database
        .find_single_by_id::<M>(id)
        .await
        .map_err(Error::internal_server_error)?
        .ok_or_else(|| Error::not_found(format!("{} not found", M::VERBOSE_NAME)))
}

async fn list_rows<M>(database: &Database, entry: &ModelEntry) -> Result<String, Error>
where
    M: Model + for<'r> FromRow<'r, SqliteRow>,
{
    let instances = database
        .find_all::<M>()
        .await
        .map_err(Error::internal_server_error)?;

    let mut rows = String::new();
    for instance in &instances {
        let _ = writeln!(
            rows,
            r#"<li><a href="{}">{}</a></li>"#,
            escape(&entry.change_form_url(instance.pk())),
            escape(&instance.to_string())
        );
    }

    Ok(format!(
        "<p>{} {}</p>\n<ul>\n{rows}</ul>",
        instances.len(),
        escape(entry.verbose_name)
    ))
}

async fn instance_table<M>(database: &Database, entry: &ModelEntry, id: i64) -> Result<String, Error>
where
    M: Model + for<'r> FromRow<'r, SqliteRow>,
{
    let instance = find_instance::<M>(database, id).await?;

    let mut rows = String::new();
    for (name, value) in instance.fields() {
        let _ = writeln!(
            rows,
            "<tr><th>{}</th><td>{}</td></tr>",
            escape(name),
            escape(&value)
        );
    }

    Ok(format!(
        r#"<h3>{}</h3>
<table>
{rows}</table>
<form method="post" action="{}delete/"><input type="submit" value="Delete"></form>
<p><a href="{}">Back</a></p>"#,
        escape(&instance.to_string()),
        escape(&entry.change_form_url(id)),
        escape(&entry.change_list_url()),
    ))
}

async fn delete_instance<M>(database: &Database, id: i64) -> Result<(), Error>
where
    M: Model + for<'r> FromRow<'r, SqliteRow>,
{
    let instance = find_instance::<M>(database, id).await?;

    database
        .delete(&instance)
        .await
        .map_err(Error::internal_server_error)?;

    tracing::info!("Deleted {} {instance}", M::VERBOSE_NAME);

    Ok(())
}

/// All browsable models
pub async fn index(
    _current_user: CurrentUser,
    Extension(admin_site): Extension<AdminSite>,
) -> Html<String> {
    let mut content = String::from("<ul>\n");
    for entry in admin_site.registered() {
        let _ = writeln!(
            content,
            r#"<li><a href="{}">{}</a></li>"#,
            escape(&entry.change_list_url()),
            escape(entry.verbose_name)
        );
    }
    content.push_str("</ul>");

    Html(admin_page("Site administration", &content))
}

/// All instances of a model
pub async fn change_list(
    _current_user: CurrentUser,
    Extension(admin_site): Extension<AdminSite>,
    Extension(database): Extension<Database>,
    PathParameters((app_label, model_name)): PathParameters<(String, String)>,
) -> Result<Html<String>, Error> {
    let entry = find_entry(&admin_site, &app_label, &model_name)?;

    let content = if entry.is::<Contact>() {
        list_rows::<Contact>(&database, entry).await?
    } else if entry.is::<RequestEntry>() {
        list_rows::<RequestEntry>(&database, entry).await?
    } else if entry.is::<Note>() {
        list_rows::<Note>(&database, entry).await?
    } else {
        return Err(Error::not_found("Unknown model"));
    };

    Ok(Html(admin_page(entry.verbose_name, &content)))
}

/// A single instance of a model
pub async fn change_form(
    _current_user: CurrentUser,
    Extension(admin_site): Extension<AdminSite>,
    Extension(database): Extension<Database>,
    PathParameters((app_label, model_name, id)): PathParameters<(String, String, i64)>,
) -> Result<Html<String>, Error> {
    let entry = find_entry(&admin_site, &app_label, &model_name)?;

    let content = if entry.is::<Contact>() {
        instance_table::<Contact>(&database, entry, id).await?
    } else if entry.is::<RequestEntry>() {
        instance_table::<RequestEntry>(&database, entry, id).await?
    } else if entry.is::<Note>() {
        instance_table::<Note>(&database, entry, id).await?
    } else {
        return Err(Error::not_found("Unknown model"));
    };

    Ok(Html(admin_page(entry.verbose_name, &content)))
}

/// Delete a single instance of a model
///
/// Deleting a contact removes its photo as well
pub async fn delete(
    _current_user: CurrentUser,
    Extension(admin_site): Extension<AdminSite>,
    Extension(database): Extension<Database>,
    Extension(media): Extension<MediaStorage>,
    PathParameters((app_label, model_name, id)): PathParameters<(String, String, i64)>,
) -> Result<Response, Error> {
    let entry = find_entry(&admin_site, &app_label, &model_name)?;

    if entry.is::<Contact>() {
        let contact = find_instance::<Contact>(&database, id).await?;

        contacts::delete_contact(&database, &media, &contact)
            .await
            .map_err(Error::internal_server_error)?;

        tracing::info!("Deleted Contact {contact}");
    } else if entry.is::<RequestEntry>() {
        delete_instance::<RequestEntry>(&database, id).await?;
    } else if entry.is::<Note>() {
        delete_instance::<Note>(&database, id).await?;
    } else {
        return Err(Error::not_found("Unknown model"));
    }

    Ok(Redirect::to(&entry.change_list_url()).into_response())
}
