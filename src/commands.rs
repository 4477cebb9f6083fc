//! Management commands

use std::io::Write;

use anyhow::Result;

use crate::contacts::Contact;
use crate::database::Database;
use crate::models::Model;
use crate::notes::Note;
use crate::requests::RequestEntry;
use crate::users::User;

async fn count_line<M: Model>(database: &Database) -> Result<String> {
    let count = database.count::<M>().await?;

    Ok(format!("{} - {count}", M::VERBOSE_NAME))
}

/// Print every model with its number of rows
///
/// Each line goes to `out`, and prefixed with `error: ` to `err`
pub async fn show_models<O, E>(database: &Database, out: &mut O, err: &mut E) -> Result<()>
where
    O: Write,
    E: Write,
{
    let lines = [
        count_line::<Contact>(database).await?,
        count_line::<RequestEntry>(database).await?,
        count_line::<Note>(database).await?,
        count_line::<User>(database).await?,
    ];

    for line in lines {
        writeln!(out, "{line}")?;
        writeln!(err, "error: {line}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::database::ContactValues;
    use crate::database::DatabaseConfig;
    use crate::database::tests::memory_pool;

    async fn run(database: &Database) -> (String, String) {
        let mut out = Vec::new();
        let mut err = Vec::new();

        show_models(database, &mut out, &mut err).await.unwrap();

        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_show_models() {
        let database =
            Database::from_config(DatabaseConfig::ExistingConnection(memory_pool().await)).await;

        let (out, err) = run(&database).await;

        assert!(out.contains("Contact - 1"));
        assert!(out.contains("Request entry - 0"));
        assert!(out.contains("User - 0"));
        assert!(err.contains("error: Contact - 1"));

        let values = ContactValues {
            name: "Ivan",
            surname: "Ivanov",
            date_of_birth: NaiveDate::from_ymd_opt(2105, 7, 14).unwrap(),
            bio: "",
            email: "hello@i.ua",
            jabber: "42cc@khavr.com",
            skype_id: "",
            other: "",
        };
        database.create_contact(&values, None).await.unwrap();

        let (out, _err) = run(&database).await;

        assert!(out.contains("Contact - 2"));
        assert!(out.contains("Note - 1"));
    }
}
