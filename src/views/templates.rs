//! HTML rendering of the pages

use std::fmt::Write;

use chrono::NaiveDate;

use crate::contacts::Contact;
use crate::forms::ContactForm;
use crate::forms::FieldErrors;

/// Title of every page
const SITE_TITLE: &str = "My card";

/// Escape text for use in HTML content and attribute values
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }

    escaped
}

/// Date as shown on the pages, like `Feb. 25, 1990`
pub fn display_date(date: NaiveDate) -> String {
    date.format("%b. %-d, %Y").to_string()
}

/// Public URL of a file in the media storage
pub fn media_url(name: &str) -> String {
    format!("/uploads/{name}")
}

/// Wrap the page content in the shared layout
fn layout(content: &str, scripts: &[&str]) -> String {
    let mut script_tags = String::new();
    for script in scripts {
        let _ = writeln!(script_tags, r#"<script src="{script}"></script>"#);
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{SITE_TITLE}</title>
</head>
<body>
<h1>{SITE_TITLE}</h1>
{content}
{script_tags}</body>
</html>
"#
    )
}

/// Links to the session pages
fn session_links(username: Option<&str>, next: &str) -> String {
    match username {
        Some(username) => format!(
            r#"<p class="session">{} <a href="/logout/">Logout</a></p>"#,
            escape(username)
        ),
        None => format!(
            r#"<p class="session"><a href="{}">Login</a></p>"#,
            escape(&super::current_user::login_url(next))
        ),
    }
}

/// The home page with the contact card
///
/// `edit_link` is the back-office link, only given to logged in users
pub fn home_page(
    contact: Option<&Contact>,
    username: Option<&str>,
    edit_link: Option<&str>,
    empty_contact_text: &str,
) -> String {
    let mut content = session_links(username, "/");

    match contact {
        Some(contact) => {
            content.push_str(r#"<div class="contact">"#);

            if let Some(image) = &contact.image {
                let _ = write!(
                    content,
                    r#"<img src="{}" alt="Photo" height="{}" width="{}">"#,
                    escape(&media_url(image)),
                    contact.image_height.unwrap_or_default(),
                    contact.image_width.unwrap_or_default(),
                );
            }

            let _ = write!(
                content,
                r#"
<dl>
<dt>Name</dt><dd>{name}</dd>
<dt>Last name</dt><dd>{surname}</dd>
<dt>Date of birth</dt><dd>{date_of_birth}</dd>
<dt>Bio</dt><dd>{bio}</dd>
<dt>Email</dt><dd>{email}</dd>
<dt>Jabber</dt><dd>{jabber}</dd>
<dt>Skype</dt><dd>{skype_id}</dd>
<dt>Other contacts</dt><dd>{other}</dd>
</dl>
"#,
                name = escape(&contact.name),
                surname = escape(&contact.surname),
                date_of_birth = display_date(contact.date_of_birth),
                bio = escape(&contact.bio).replace('\n', "<br>"),
                email = escape(&contact.email),
                jabber = escape(&contact.jabber),
                skype_id = escape(&contact.skype_id),
                other = escape(&contact.other).replace('\n', "<br>"),
            );

            if username.is_some() {
                content.push_str(r#"<p><a href="/form/">Edit</a>"#);
                if let Some(edit_link) = edit_link {
                    let _ = write!(content, r#" <a href="{}">(admin)</a>"#, escape(edit_link));
                }
                content.push_str("</p>");
            }

            content.push_str("</div>");
        }
        None => {
            let _ = write!(
                content,
                r#"<p class="empty">{}</p>"#,
                escape(empty_contact_text)
            );
        }
    }

    content.push_str(r#"<p><a href="/requests/">requests</a></p>"#);

    layout(&content, &[])
}

/// The requests page, the list itself is loaded by the script
pub fn requests_page() -> String {
    let content = r#"<h2>Last requests</h2>
<p>New requests: <span id="new-requests">0</span></p>
<table id="requests">
<thead><tr><th>Priority</th><th>Date</th><th>Method</th><th>Path</th><th>User</th></tr></thead>
<tbody></tbody>
</table>
<p><a href="/">Home</a></p>"#;

    layout(content, &["/static/js/requests.js"])
}

fn input(form: &ContactForm, errors: &FieldErrors, name: &str, label: &str, kind: &str) -> String {
    let value = form.value(name);

    let field = if kind == "textarea" {
        format!(
            r#"<textarea id="id_{name}" name="{name}">{}</textarea>"#,
            escape(value)
        )
    } else {
        format!(
            r#"<input id="id_{name}" type="{kind}" name="{name}" value="{}">"#,
            escape(value)
        )
    };

    format!(
        r#"<p><label for="id_{name}">{label}</label> {field}{}</p>
"#,
        error_list(errors, name)
    )
}

fn error_list(errors: &FieldErrors, name: &str) -> String {
    let Some(messages) = errors.get(name) else {
        return String::new();
    };

    let mut list = String::from(r#"<ul class="errorlist">"#);
    for message in messages {
        let _ = write!(list, "<li>{}</li>", escape(message));
    }
    list.push_str("</ul>");

    list
}

/// The contact edit form
///
/// `current_image` is the stored photo, offered for clearing
pub fn contact_form_page(
    form: &ContactForm,
    errors: &FieldErrors,
    current_image: Option<&str>,
) -> String {
    let mut content = String::from(
        r#"<form id="contact-form" method="post" action="/form/" enctype="multipart/form-data">
"#,
    );

    content.push_str(&input(form, errors, "name", "Name", "text"));
    content.push_str(&input(form, errors, "surname", "Last name", "text"));
    content.push_str(&input(form, errors, "date_of_birth", "Date of birth", "date"));
    content.push_str(&input(form, errors, "bio", "Bio", "textarea"));
    content.push_str(&input(form, errors, "email", "Email", "email"));
    content.push_str(&input(form, errors, "jabber", "Jabber", "email"));
    content.push_str(&input(form, errors, "skype_id", "Skype", "text"));
    content.push_str(&input(form, errors, "other", "Other contacts", "textarea"));

    content.push_str(r#"<p><label for="id_image">Photo</label> "#);
    if let Some(current_image) = current_image {
        let _ = write!(
            content,
            r#"Currently: <a href="{url}">{name}</a> <input type="checkbox" name="image-clear" id="image-clear_id"> <label for="image-clear_id">Clear</label><br>"#,
            url = escape(&media_url(current_image)),
            name = escape(current_image),
        );
    }
    let _ = write!(
        content,
        r#"<input id="id_image" type="file" name="image" accept="image/*">{}</p>
"#,
        error_list(errors, "image")
    );

    content.push_str(
        r#"<p><input type="submit" value="Save"> <a href="/">Cancel</a></p>
</form>"#,
    );

    layout(&content, &[])
}

/// The login form
pub fn login_page(username: &str, next: &str, failed: bool) -> String {
    let error = if failed {
        r#"<p class="errorlist">Please enter a correct username and password.</p>"#
    } else {
        ""
    };

    let content = format!(
        r#"<h2>Login</h2>
{error}
<form method="post" action="/login/">
<p><label for="id_username">Username</label> <input id="id_username" type="text" name="username" value="{username}"></p>
<p><label for="id_password">Password</label> <input id="id_password" type="password" name="password"></p>
<input type="hidden" name="next" value="{next}">
<p><input type="submit" value="Login"></p>
</form>"#,
        username = escape(username),
        next = escape(next),
    );

    layout(&content, &[])
}

/// A back-office page
pub fn admin_page(title: &str, content: &str) -> String {
    layout(
        &format!(
            r#"<p><a href="/admin/">Administration</a> | <a href="/">View site</a> | <a href="/logout/">Logout</a></p>
<h2>{}</h2>
{content}"#,
            escape(title)
        ),
        &[],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;",
            escape(r#"<b>Tom & "Jerry"</b>"#)
        );
        assert_eq!("plain", escape("plain"));
    }

    #[test]
    fn test_display_date() {
        let date = NaiveDate::from_ymd_opt(1990, 2, 5).unwrap();

        assert_eq!("Feb. 5, 1990", display_date(date));
    }

    #[test]
    fn test_empty_home_page() {
        let page = home_page(None, None, None, "Contact data no yet");

        assert!(page.contains("Contact data no yet"));
        assert!(page.contains("/login/?next=%2F"));
    }
}
