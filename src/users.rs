use std::fmt;

use anyhow::Result;
use chrono::naive::NaiveDateTime;
use uuid::Uuid;

use crate::database::CreateUserValues;
use crate::database::Database;
use crate::models::Model;
use crate::password::generate;
use crate::password::hash;
use crate::utils::env_var_or_else;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub session_id: Uuid,
    pub username: String,
    pub hashed_password: String,
    pub created_at: NaiveDateTime,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}

impl Model for User {
    const APP_LABEL: &'static str = "auth";
    const MODEL_NAME: &'static str = "user";
    const VERBOSE_NAME: &'static str = "User";
    const TABLE: &'static str = "users";

    fn pk(&self) -> i64 {
        self.id
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("username", self.username.clone()),
            ("created at", self.created_at.to_string()),
        ]
    }
}

/// Make sure there is a user to log in with
///
/// Credentials come from `INITIAL_USERNAME` and `INITIAL_PASSWORD`, missing ones are generated
/// and logged once
pub async fn ensure_initial_user(database: &Database) -> Result<()> {
    let user = database.find_any_single_user().await?;

    if user.is_none() {
        let username = env_var_or_else("INITIAL_USERNAME", || {
            let initial_username = String::from("admin");
            tracing::info!("`INITIAL_USERNAME` not set, using: {initial_username}");
            initial_username
        });

        let password = env_var_or_else("INITIAL_PASSWORD", || {
            let initial_password = generate();
            tracing::info!(
                "`INITIAL_PASSWORD` not set, generating new password: {initial_password}"
            );
            initial_password
        });

        let hashed_password = hash(&password)?;

        let values = CreateUserValues {
            session_id: &Uuid::new_v4(),
            username: &username,
            hashed_password: &hashed_password,
        };

        database.create_user(&values).await?;
    }

    Ok(())
}
