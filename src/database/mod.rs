//! All things related to the storage of contacts, logged requests and the change log

use core::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use sqlx::FromRow;
use sqlx::SqliteConnection;
use sqlx::SqlitePool;
use sqlx::migrate::Migrator;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::sqlite::SqliteRow;
use uuid::Uuid;

pub use Config as DatabaseConfig;
pub use form_types::*;

use crate::contacts::Contact;
use crate::contacts::ContactImage;
use crate::models::Model;
use crate::notes::Action;
use crate::requests::RequestEntry;
use crate::users::User;
use crate::utils::env_var_or_else;

mod form_types;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Storage errors
#[derive(Debug)]
pub enum Error {
    /// A connection error with the storage
    Connection(String),
}

impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Connection(error) => write!(f, "Connection error: {error}"),
        }
    }
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Database configuration
pub enum Config {
    /// Detect configuration from environment
    DetectConfig,

    /// Use existing connection
    ExistingConnection(SqlitePool),
}

/// Default location of the database
const DEFAULT_DATABASE_URL: &str = "sqlite://cardfile.db?mode=rwc";

/// SQLite storage
#[derive(Clone)]
pub struct Database {
    /// Pool of connections
    connection_pool: SqlitePool,
}

impl Database {
    /// Create a new SQLite storage
    pub async fn from_config(config: Config) -> Self {
        match config {
            Config::DetectConfig => Self::new().await,
            Config::ExistingConnection(pool) => Self::new_with_pool(pool).await,
        }
    }

    /// Create SQLite storage
    ///
    /// Use the `DATABASE_URL` environment variable
    ///
    /// Migrations will be run
    async fn new() -> Self {
        let database_connection_string =
            env_var_or_else("DATABASE_URL", || DEFAULT_DATABASE_URL.to_string());

        let options =
            SqliteConnectOptions::from_str(&database_connection_string).expect("Valid DATABASE_URL");

        let connection_pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect_with(options)
            .await
            .expect("Valid connection");

        Self::new_with_pool(connection_pool).await
    }

    /// Create SQLite storage with existing pool
    ///
    /// Migrations will be run
    async fn new_with_pool(connection_pool: SqlitePool) -> Self {
        let migration_result = MIGRATOR.run(&connection_pool).await;

        if let Err(err) = migration_result {
            panic!("Migrations could not run: {err}");
        }

        Self { connection_pool }
    }
}

impl Database {
    /// Find all rows of a model, in its default ordering
    pub async fn find_all<M>(&self) -> Result<Vec<M>>
    where
        M: Model + for<'r> FromRow<'r, SqliteRow>,
    {
        let query = format!("SELECT * FROM {} ORDER BY {}", M::TABLE, M::ORDERING);

        sqlx::query_as::<_, M>(&query)
            .fetch_all(&self.connection_pool)
            .await
            .map_err(connection_error)
    }

    /// Find a single row of a model by its ID
    pub async fn find_single_by_id<M>(&self, id: i64) -> Result<Option<M>>
    where
        M: Model + for<'r> FromRow<'r, SqliteRow>,
    {
        let query = format!("SELECT * FROM {} WHERE id = ? LIMIT 1", M::TABLE);

        sqlx::query_as::<_, M>(&query)
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await
            .map_err(connection_error)
    }

    /// Count all rows of a model
    pub async fn count<M: Model>(&self) -> Result<i64> {
        let query = format!("SELECT COUNT(*) FROM {}", M::TABLE);

        sqlx::query_scalar::<_, i64>(&query)
            .fetch_one(&self.connection_pool)
            .await
            .map_err(connection_error)
    }

    /// Delete a single row of a model
    pub async fn delete<M: Model>(&self, instance: &M) -> Result<()> {
        let query = format!("DELETE FROM {} WHERE id = ?", M::TABLE);

        let mut transaction = self.connection_pool.begin().await.map_err(connection_error)?;

        sqlx::query(&query)
            .bind(instance.pk())
            .execute(&mut *transaction)
            .await
            .map_err(connection_error)?;

        record_change(&mut transaction, instance, Action::Deleted).await?;

        transaction.commit().await.map_err(connection_error)
    }

    /// Find any single user
    pub async fn find_any_single_user(&self) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r"
            SELECT *
            FROM users
            LIMIT 1
            ",
        )
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    /// Finds a single user by its username
    pub async fn find_single_user_by_username(&self, username: &str) -> Result<Option<User>> {
        sqlx::query_as::<_, User>(
            r"
            SELECT *
            FROM users
            WHERE username = ?
            LIMIT 1
            ",
        )
        .bind(username)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    /// Finds a single user by its ID
    pub async fn find_single_user_by_id(&self, id: i64) -> Result<Option<User>> {
        self.find_single_by_id::<User>(id).await
    }

    /// Create a single user
    pub async fn create_user(&self, values: &CreateUserValues<'_>) -> Result<User> {
        let mut transaction = self.connection_pool.begin().await.map_err(connection_error)?;

        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (session_id, username, hashed_password)
            VALUES (?, ?, ?)
            RETURNING *
            ",
        )
        .bind(values.session_id)
        .bind(values.username)
        .bind(values.hashed_password)
        .fetch_one(&mut *transaction)
        .await
        .map_err(connection_error)?;

        record_change(&mut transaction, &user, Action::Created).await?;

        transaction.commit().await.map_err(connection_error)?;

        Ok(user)
    }

    /// Replace the session ID of a user, invalidating all issued tokens
    pub async fn rotate_session(&self, user: &User, session_id: &Uuid) -> Result<User> {
        let mut transaction = self.connection_pool.begin().await.map_err(connection_error)?;

        let user = sqlx::query_as::<_, User>(
            r"
            UPDATE users
            SET session_id = ?
            WHERE id = ?
            RETURNING *
            ",
        )
        .bind(session_id)
        .bind(user.id)
        .fetch_one(&mut *transaction)
        .await
        .map_err(connection_error)?;

        record_change(&mut transaction, &user, Action::Changed).await?;

        transaction.commit().await.map_err(connection_error)?;

        Ok(user)
    }

    /// Find the contact shown on the home page
    ///
    /// There can be more contacts, the first one wins
    pub async fn find_first_contact(&self) -> Result<Option<Contact>> {
        sqlx::query_as::<_, Contact>(
            r"
            SELECT *
            FROM contacts
            ORDER BY id ASC
            LIMIT 1
            ",
        )
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    /// Create a contact
    pub async fn create_contact(
        &self,
        values: &ContactValues<'_>,
        image: Option<&ContactImage>,
    ) -> Result<Contact> {
        let mut transaction = self.connection_pool.begin().await.map_err(connection_error)?;

        let contact = sqlx::query_as::<_, Contact>(
            r"
            INSERT INTO contacts (
                name, surname, date_of_birth, bio, email, jabber, skype_id, other,
                image, image_height, image_width
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            ",
        )
        .bind(values.name)
        .bind(values.surname)
        .bind(values.date_of_birth)
        .bind(values.bio)
        .bind(values.email)
        .bind(values.jabber)
        .bind(values.skype_id)
        .bind(values.other)
        .bind(image.map(|image| image.name.as_str()))
        .bind(image.map(|image| image.height))
        .bind(image.map(|image| image.width))
        .fetch_one(&mut *transaction)
        .await
        .map_err(connection_error)?;

        record_change(&mut transaction, &contact, Action::Created).await?;

        transaction.commit().await.map_err(connection_error)?;

        Ok(contact)
    }

    /// Update a contact, including its image
    pub async fn update_contact(
        &self,
        contact: &Contact,
        values: &ContactValues<'_>,
        image: Option<&ContactImage>,
    ) -> Result<Contact> {
        let mut transaction = self.connection_pool.begin().await.map_err(connection_error)?;

        let contact = sqlx::query_as::<_, Contact>(
            r"
            UPDATE contacts
            SET name = ?, surname = ?, date_of_birth = ?, bio = ?, email = ?, jabber = ?,
                skype_id = ?, other = ?, image = ?, image_height = ?, image_width = ?
            WHERE id = ?
            RETURNING *
            ",
        )
        .bind(values.name)
        .bind(values.surname)
        .bind(values.date_of_birth)
        .bind(values.bio)
        .bind(values.email)
        .bind(values.jabber)
        .bind(values.skype_id)
        .bind(values.other)
        .bind(image.map(|image| image.name.as_str()))
        .bind(image.map(|image| image.height))
        .bind(image.map(|image| image.width))
        .bind(contact.id)
        .fetch_one(&mut *transaction)
        .await
        .map_err(connection_error)?;

        record_change(&mut transaction, &contact, Action::Changed).await?;

        transaction.commit().await.map_err(connection_error)?;

        Ok(contact)
    }

    /// Find the most recent logged request for a path
    pub async fn find_latest_request_entry_by_path(
        &self,
        path: &str,
    ) -> Result<Option<RequestEntry>> {
        sqlx::query_as::<_, RequestEntry>(
            r"
            SELECT *
            FROM request_entries
            WHERE path = ?
            ORDER BY date DESC, id DESC
            LIMIT 1
            ",
        )
        .bind(path)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    /// Log a request, marked as new
    pub async fn create_request_entry(
        &self,
        values: &CreateRequestEntryValues<'_>,
    ) -> Result<RequestEntry> {
        let mut transaction = self.connection_pool.begin().await.map_err(connection_error)?;

        let request_entry = sqlx::query_as::<_, RequestEntry>(
            r"
            INSERT INTO request_entries (path, method, user_id, date, priority, is_new)
            VALUES (?, ?, ?, ?, ?, 1)
            RETURNING *
            ",
        )
        .bind(values.path)
        .bind(values.method)
        .bind(values.user_id)
        .bind(Utc::now().naive_utc())
        .bind(values.priority)
        .fetch_one(&mut *transaction)
        .await
        .map_err(connection_error)?;

        record_change(&mut transaction, &request_entry, Action::Created).await?;

        transaction.commit().await.map_err(connection_error)?;

        Ok(request_entry)
    }

    /// The logged requests with the highest priority, most recent first within a priority
    pub async fn find_top_request_entries(&self, limit: i64) -> Result<Vec<RequestEntry>> {
        sqlx::query_as::<_, RequestEntry>(
            r"
            SELECT *
            FROM request_entries
            ORDER BY priority DESC, date DESC, id DESC
            LIMIT ?
            ",
        )
        .bind(limit)
        .fetch_all(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    /// Count the logged requests not yet seen
    pub async fn count_new_request_entries(&self) -> Result<i64> {
        sqlx::query_scalar::<_, i64>(
            r"
            SELECT COUNT(*)
            FROM request_entries
            WHERE is_new = 1
            ",
        )
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)
    }

    /// Mark all new logged requests as seen
    ///
    /// Bulk update, the change log is not involved
    pub async fn mark_request_entries_seen(&self) -> Result<u64> {
        let result = sqlx::query(
            r"
            UPDATE request_entries
            SET is_new = 0
            WHERE is_new = 1
            ",
        )
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(result.rows_affected())
    }

    /// Set the priority of all logged requests for a path
    ///
    /// Bulk update, the change log is not involved. Concurrent updates: last write wins.
    pub async fn update_priority_by_path(&self, path: &str, priority: i64) -> Result<u64> {
        let result = sqlx::query(
            r"
            UPDATE request_entries
            SET priority = ?
            WHERE path = ?
            ",
        )
        .bind(priority)
        .bind(path)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(result.rows_affected())
    }
}

/// Write a note about a mutation to the change log
///
/// Models that are not tracked (the notes themselves) are skipped
async fn record_change<M: Model>(
    connection: &mut SqliteConnection,
    instance: &M,
    action: Action,
) -> Result<()> {
    if !M::TRACKED {
        return Ok(());
    }

    sqlx::query(
        r"
        INSERT INTO notes (model, instance, action_type)
        VALUES (?, ?, ?)
        ",
    )
    .bind(M::VERBOSE_NAME)
    .bind(instance.to_string())
    .bind(action)
    .execute(&mut *connection)
    .await
    .map_err(connection_error)?;

    Ok(())
}

/// Convert `SQLx` to storage connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}
