//! Form types

use chrono::NaiveDate;
use uuid::Uuid;

/// Values to create a User
pub struct CreateUserValues<'a> {
    /// The initial session ID for the user
    pub session_id: &'a Uuid,

    /// The username
    pub username: &'a str,

    /// The hashed password
    pub hashed_password: &'a str,
}

/// Values to create or update a Contact
///
/// Optional fields are empty strings when not provided
#[derive(Debug)]
pub struct ContactValues<'a> {
    /// First name
    pub name: &'a str,

    /// Last name
    pub surname: &'a str,

    /// Date of birth
    pub date_of_birth: NaiveDate,

    /// Biography
    pub bio: &'a str,

    /// Email address
    pub email: &'a str,

    /// Jabber address
    pub jabber: &'a str,

    /// Skype ID
    pub skype_id: &'a str,

    /// Other contact details
    pub other: &'a str,
}

/// Values to log a request
pub struct CreateRequestEntryValues<'a> {
    /// Requested path
    pub path: &'a str,

    /// HTTP method
    pub method: &'a str,

    /// The logged in user, if any
    pub user_id: Option<i64>,

    /// Starting priority
    pub priority: i64,
}
