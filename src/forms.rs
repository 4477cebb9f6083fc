//! Validation of the contact edit form

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::contacts::Contact;
use crate::contacts::Upload;
use crate::database::ContactValues;
use crate::images;

/// Error messages per form field
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Longest accepted name, surname and Skype ID
const MAX_LENGTH: usize = 250;

/// Accepted date notations with the exact number of digits of their year, tried in order
const DATE_INPUT_FORMATS: [(&str, usize); 3] =
    [("%Y-%m-%d", 4), ("%m/%d/%Y", 4), ("%m/%d/%y", 2)];

const REQUIRED: &str = "This field is required.";
const INVALID_DATE: &str = "Enter a valid date.";
const INVALID_EMAIL: &str = "Enter a valid email address.";
const INVALID_IMAGE: &str = "Upload a valid image. The file you uploaded was either not an image or a corrupted image.";
const CONTRADICTORY_IMAGE: &str =
    "Please either submit a file or check the clear checkbox, not both.";

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^[-!#$%&'*+/=?^_`{}|~0-9a-z]+(?:\.[-!#$%&'*+/=?^_`{}|~0-9a-z]+)*@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+(?:[a-z]{2,63}|xn--[a-z0-9-]{1,59})$",
    )
    .expect("Valid email regex")
});

/// Is this a syntactically valid email (or Jabber) address?
pub fn is_valid_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Raw values of the contact form, as submitted or as pre-filled from a contact
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactForm {
    pub name: String,
    pub surname: String,
    pub date_of_birth: String,
    pub bio: String,
    pub email: String,
    pub jabber: String,
    pub skype_id: String,
    pub other: String,

    /// The "clear" checkbox of the photo was ticked
    pub clear_image: bool,
}

/// Validated values of the contact form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleanedContact {
    pub name: String,
    pub surname: String,
    pub date_of_birth: NaiveDate,
    pub bio: String,
    pub email: String,
    pub jabber: String,
    pub skype_id: String,
    pub other: String,
}

impl CleanedContact {
    /// Values ready to be stored
    pub fn values(&self) -> ContactValues<'_> {
        ContactValues {
            name: &self.name,
            surname: &self.surname,
            date_of_birth: self.date_of_birth,
            bio: &self.bio,
            email: &self.email,
            jabber: &self.jabber,
            skype_id: &self.skype_id,
            other: &self.other,
        }
    }
}

impl ContactForm {
    /// Collect the form from submitted fields, missing fields are empty
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let field = |name: &str| fields.get(name).cloned().unwrap_or_default();

        Self {
            name: field("name"),
            surname: field("surname"),
            date_of_birth: field("date_of_birth"),
            bio: field("bio"),
            email: field("email"),
            jabber: field("jabber"),
            skype_id: field("skype_id"),
            other: field("other"),
            clear_image: fields.contains_key("image-clear"),
        }
    }

    /// Pre-fill the form from a stored contact
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            surname: contact.surname.clone(),
            date_of_birth: contact.date_of_birth.format("%Y-%m-%d").to_string(),
            bio: contact.bio.clone(),
            email: contact.email.clone(),
            jabber: contact.jabber.clone(),
            skype_id: contact.skype_id.clone(),
            other: contact.other.clone(),
            clear_image: false,
        }
    }

    /// Raw value of a field by its name
    pub fn value(&self, name: &str) -> &str {
        match name {
            "name" => &self.name,
            "surname" => &self.surname,
            "date_of_birth" => &self.date_of_birth,
            "bio" => &self.bio,
            "email" => &self.email,
            "jabber" => &self.jabber,
            "skype_id" => &self.skype_id,
            "other" => &self.other,
            _ => "",
        }
    }

    /// Validate all fields, reporting every problem at once
    ///
    /// `image` is the uploaded photo, if any. Only its header is inspected here.
    pub fn validate(&self, image: Option<&Upload>) -> Result<CleanedContact, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = required_text(&mut errors, "name", &self.name);
        let surname = required_text(&mut errors, "surname", &self.surname);
        let skype_id = optional_text(&mut errors, "skype_id", &self.skype_id);
        let date_of_birth = date_field(&mut errors, "date_of_birth", &self.date_of_birth);
        let email = email_address(&mut errors, "email", &self.email, true);
        let jabber = email_address(&mut errors, "jabber", &self.jabber, false);

        if let Some(image) = image {
            if self.clear_image {
                add_error(&mut errors, "image", CONTRADICTORY_IMAGE);
            } else if !images::is_image(&image.bytes) {
                add_error(&mut errors, "image", INVALID_IMAGE);
            }
        }

        match (name, surname, date_of_birth, email, jabber) {
            (Some(name), Some(surname), Some(date_of_birth), Some(email), Some(jabber))
                if errors.is_empty() =>
            {
                Ok(CleanedContact {
                    name,
                    surname,
                    date_of_birth,
                    bio: self.bio.trim().to_string(),
                    email,
                    jabber,
                    skype_id,
                    other: self.other.trim().to_string(),
                })
            }
            _ => Err(errors),
        }
    }
}

fn add_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

fn check_length(errors: &mut FieldErrors, field: &str, value: &str) -> bool {
    let length = value.chars().count();

    if length > MAX_LENGTH {
        add_error(
            errors,
            field,
            &format!("Ensure this value has at most {MAX_LENGTH} characters (it has {length})."),
        );

        return false;
    }

    true
}

fn required_text(errors: &mut FieldErrors, field: &str, value: &str) -> Option<String> {
    let value = value.trim();

    if value.is_empty() {
        add_error(errors, field, REQUIRED);
        return None;
    }

    check_length(errors, field, value).then(|| value.to_string())
}

fn optional_text(errors: &mut FieldErrors, field: &str, value: &str) -> String {
    let value = value.trim();

    check_length(errors, field, value);

    value.to_string()
}

fn date_field(errors: &mut FieldErrors, field: &str, value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if value.is_empty() {
        add_error(errors, field, REQUIRED);
        return None;
    }

    let date = parse_date(value);

    if date.is_none() {
        add_error(errors, field, INVALID_DATE);
    }

    date
}

/// Parse a date in any of the accepted notations
///
/// chrono reads `%Y` as any number of digits, `02/25/16` must not become year 16
fn parse_date(value: &str) -> Option<NaiveDate> {
    DATE_INPUT_FORMATS
        .iter()
        .filter(|(format, digits)| year_part(value, format).chars().count() == *digits)
        .find_map(|(format, _)| NaiveDate::parse_from_str(value, format).ok())
}

fn year_part<'a>(value: &'a str, format: &str) -> &'a str {
    if format.starts_with("%Y") {
        value.split('-').next().unwrap_or_default()
    } else {
        value.rsplit('/').next().unwrap_or_default()
    }
}

fn email_address(errors: &mut FieldErrors, field: &str, value: &str, required: bool) -> Option<String> {
    let value = value.trim();

    if value.is_empty() {
        if required {
            add_error(errors, field, REQUIRED);
            return None;
        }

        return Some(String::new());
    }

    if !is_valid_email(value) {
        add_error(errors, field, INVALID_EMAIL);
        return None;
    }

    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::tests::png;

    fn valid_form() -> ContactForm {
        ContactForm {
            name: "Aleks".to_string(),
            surname: "Woronow".to_string(),
            date_of_birth: "2016-02-25".to_string(),
            bio: "I was born ...".to_string(),
            email: "aleks.woronow@yandex.ru".to_string(),
            jabber: "aleks@42cc.co".to_string(),
            skype_id: "aleks_woronow".to_string(),
            other: String::new(),
            clear_image: false,
        }
    }

    fn messages(errors: &FieldErrors, field: &str) -> Vec<String> {
        errors.get(field).cloned().unwrap_or_default()
    }

    #[test]
    fn test_valid_form() {
        let cleaned = valid_form().validate(None).unwrap();

        assert_eq!("Aleks", cleaned.name);
        assert_eq!(NaiveDate::from_ymd_opt(2016, 2, 25).unwrap(), cleaned.date_of_birth);
        assert_eq!("aleks@42cc.co", cleaned.jabber);
    }

    #[test]
    fn test_empty_name() {
        let form = ContactForm {
            name: String::new(),
            ..valid_form()
        };

        let errors = form.validate(None).unwrap_err();

        assert_eq!(vec!["This field is required."], messages(&errors, "name"));
        assert_eq!(1, errors.len());
    }

    #[test]
    fn test_invalid_date() {
        let form = ContactForm {
            date_of_birth: "data".to_string(),
            ..valid_form()
        };

        let errors = form.validate(None).unwrap_err();

        assert_eq!(vec!["Enter a valid date."], messages(&errors, "date_of_birth"));
    }

    #[test]
    fn test_other_date_formats() {
        let form = ContactForm {
            date_of_birth: "02/25/2016".to_string(),
            ..valid_form()
        };

        let cleaned = form.validate(None).unwrap();

        assert_eq!(NaiveDate::from_ymd_opt(2016, 2, 25).unwrap(), cleaned.date_of_birth);
    }

    #[test]
    fn test_two_digit_year() {
        let form = ContactForm {
            date_of_birth: "02/25/16".to_string(),
            ..valid_form()
        };

        let cleaned = form.validate(None).unwrap();

        assert_eq!(NaiveDate::from_ymd_opt(2016, 2, 25).unwrap(), cleaned.date_of_birth);
    }

    #[test]
    fn test_short_years_are_invalid() {
        for value in ["16-02-25", "02/25/216", "2/25/6"] {
            let form = ContactForm {
                date_of_birth: value.to_string(),
                ..valid_form()
            };

            let errors = form.validate(None).unwrap_err();

            assert_eq!(vec!["Enter a valid date."], messages(&errors, "date_of_birth"), "{value}");
        }
    }

    #[test]
    fn test_invalid_email() {
        let form = ContactForm {
            email: "aleks.woronow@ya".to_string(),
            jabber: "not a jabber".to_string(),
            ..valid_form()
        };

        let errors = form.validate(None).unwrap_err();

        assert_eq!(vec!["Enter a valid email address."], messages(&errors, "email"));
        assert_eq!(vec!["Enter a valid email address."], messages(&errors, "jabber"));
    }

    #[test]
    fn test_optional_fields() {
        let form = ContactForm {
            bio: String::new(),
            jabber: String::new(),
            skype_id: String::new(),
            ..valid_form()
        };

        let cleaned = form.validate(None).unwrap();

        assert_eq!("", cleaned.jabber);
        assert_eq!("", cleaned.skype_id);
    }

    #[test]
    fn test_everything_missing() {
        let errors = ContactForm::default().validate(None).unwrap_err();

        for field in ["name", "surname", "date_of_birth", "email"] {
            assert_eq!(vec!["This field is required."], messages(&errors, field));
        }
        assert!(!errors.contains_key("jabber"));
    }

    #[test]
    fn test_too_long() {
        let form = ContactForm {
            surname: "a".repeat(251),
            ..valid_form()
        };

        let errors = form.validate(None).unwrap_err();

        assert_eq!(
            vec!["Ensure this value has at most 250 characters (it has 251)."],
            messages(&errors, "surname")
        );
    }

    #[test]
    fn test_image_upload() {
        let image = Upload {
            file_name: "me.png".to_string(),
            bytes: png(10, 10),
        };
        assert!(valid_form().validate(Some(&image)).is_ok());

        let not_an_image = Upload {
            file_name: "me.png".to_string(),
            bytes: b"plain text".to_vec(),
        };
        let errors = valid_form().validate(Some(&not_an_image)).unwrap_err();
        assert_eq!(vec![INVALID_IMAGE], messages(&errors, "image"));

        let form = ContactForm {
            clear_image: true,
            ..valid_form()
        };
        let errors = form.validate(Some(&image)).unwrap_err();
        assert_eq!(vec![CONTRADICTORY_IMAGE], messages(&errors, "image"));
    }

    #[test]
    fn test_from_fields() {
        let fields = HashMap::from([
            ("name".to_string(), "Ivan".to_string()),
            ("image-clear".to_string(), "on".to_string()),
        ]);

        let form = ContactForm::from_fields(&fields);

        assert_eq!("Ivan", form.name);
        assert_eq!("", form.surname);
        assert!(form.clear_image);
    }
}
