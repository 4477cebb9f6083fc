//! The contact card
//!
//! Saving a contact runs the uploaded photo through the image normalizer, deleting a contact
//! removes its photo from the media storage

use std::fmt;

use anyhow::Result;
use chrono::NaiveDate;

use crate::database::ContactValues;
use crate::database::Database;
use crate::images;
use crate::images::Normalized;
use crate::media::MediaStorage;
use crate::models::Model;

/// The contact shown on the home page
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Contact {
    /// Contact ID
    pub id: i64,

    /// First name
    pub name: String,

    /// Last name
    pub surname: String,

    /// Date of birth
    pub date_of_birth: NaiveDate,

    /// Free form biography, can be empty
    pub bio: String,

    /// Email address
    pub email: String,

    /// Jabber address, can be empty
    pub jabber: String,

    /// Skype ID, can be empty
    pub skype_id: String,

    /// Other contact details, can be empty
    pub other: String,

    /// Name of the photo in the media storage
    pub image: Option<String>,

    /// Height of the stored photo
    pub image_height: Option<i64>,

    /// Width of the stored photo
    pub image_width: Option<i64>,
}

impl Contact {
    /// The stored photo, if any
    pub fn stored_image(&self) -> Option<ContactImage> {
        let name = self.image.clone()?;

        Some(ContactImage {
            name,
            height: self.image_height.unwrap_or_default(),
            width: self.image_width.unwrap_or_default(),
        })
    }
}

impl fmt::Display for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.surname, self.name)
    }
}

impl Model for Contact {
    const MODEL_NAME: &'static str = "contact";
    const VERBOSE_NAME: &'static str = "Contact";
    const TABLE: &'static str = "contacts";

    fn pk(&self) -> i64 {
        self.id
    }

    fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("name", self.name.clone()),
            ("surname", self.surname.clone()),
            ("date of birth", self.date_of_birth.to_string()),
            ("bio", self.bio.clone()),
            ("email", self.email.clone()),
            ("jabber", self.jabber.clone()),
            ("skype id", self.skype_id.clone()),
            ("other contact", self.other.clone()),
            ("image", self.image.clone().unwrap_or_default()),
        ]
    }
}

/// A photo as stored alongside the contact
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactImage {
    /// Name in the media storage
    pub name: String,

    /// Height in pixels
    pub height: i64,

    /// Width in pixels
    pub width: i64,
}

/// An uploaded file, not yet stored
#[derive(Clone, Debug)]
pub struct Upload {
    /// File name as provided by the client
    pub file_name: String,

    /// Raw content
    pub bytes: Vec<u8>,
}

/// What to do with the photo when saving a contact
#[derive(Debug)]
pub enum ImageChange {
    /// Keep the current photo, if any
    Keep,

    /// Remove the current photo
    Clear,

    /// Replace the current photo with a new upload
    Replace(Upload),
}

/// Save a contact, creating it when there is no existing one
///
/// A replaced photo is resized to fit the bounding box and stored as JPEG. When the upload
/// can not be decoded the contact is saved without the new photo, keeping the current one.
///
/// The previous photo is only removed from the media storage once the contact is saved. When
/// saving fails, a newly stored photo is removed again.
pub async fn save_contact(
    database: &Database,
    media: &MediaStorage,
    existing: Option<&Contact>,
    values: &ContactValues<'_>,
    image_change: ImageChange,
) -> Result<Contact> {
    let current_image = existing.and_then(Contact::stored_image);

    let (image, stored) = match image_change {
        ImageChange::Keep => (current_image.clone(), false),
        ImageChange::Clear => (None, false),
        ImageChange::Replace(upload) => {
            let file_name = upload.file_name;
            let bytes = upload.bytes;
            let normalized = tokio::task::spawn_blocking(move || images::normalize(&bytes)).await?;

            match normalized {
                Ok(normalized) => (Some(store_photo(media, &file_name, normalized).await?), true),
                Err(err) => {
                    tracing::warn!(r#"Could not decode "{file_name}", keeping current image: {err}"#);

                    (current_image.clone(), false)
                }
            }
        }
    };

    let saved = if let Some(existing) = existing {
        database
            .update_contact(existing, values, image.as_ref())
            .await
    } else {
        database.create_contact(values, image.as_ref()).await
    };

    let contact = match saved {
        Ok(contact) => contact,
        Err(err) => {
            // a photo stored under the current name has already replaced the current file
            if let Some(image) = image.as_ref().filter(|_| stored) {
                if !is_same_photo(current_image.as_ref(), image) {
                    remove_photo(media, &image.name).await;
                }
            }

            return Err(err.into());
        }
    };

    if let Some(current_image) = current_image {
        if !image.as_ref().is_some_and(|image| is_same_photo(Some(&current_image), image)) {
            remove_photo(media, &current_image.name).await;
        }
    }

    Ok(contact)
}

/// Delete a contact and its stored photo
///
/// A photo that is already gone from the media storage is not an error
pub async fn delete_contact(
    database: &Database,
    media: &MediaStorage,
    contact: &Contact,
) -> Result<()> {
    database.delete(contact).await?;

    if let Some(image) = &contact.image {
        media.delete(image).await?;
    }

    Ok(())
}

fn is_same_photo(current_image: Option<&ContactImage>, image: &ContactImage) -> bool {
    current_image.is_some_and(|current_image| current_image.name == image.name)
}

/// Remove a photo that is no longer referenced, failing to do so only leaves a stray file
async fn remove_photo(media: &MediaStorage, name: &str) {
    if let Err(err) = media.delete(name).await {
        tracing::error!("Could not remove photo {name}: {err}");
    }
}

async fn store_photo(
    media: &MediaStorage,
    file_name: &str,
    normalized: Normalized,
) -> Result<ContactImage> {
    let name = MediaStorage::photo_name(file_name);

    media.save(&name, &normalized.bytes).await?;

    tracing::debug!(
        "Stored photo {name} ({}x{})",
        normalized.width,
        normalized.height
    );

    Ok(ContactImage {
        name,
        height: i64::from(normalized.height),
        width: i64::from(normalized.width),
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    use super::*;
    use crate::database::DatabaseConfig;
    use crate::database::tests::memory_pool;
    use crate::images::tests::png;

    struct Setup {
        pool: SqlitePool,
        database: Database,
        media: MediaStorage,
        contact: Contact,
        _media_root: TempDir,
    }

    /// The seeded contact with a stored photo
    async fn setup() -> Setup {
        let pool = memory_pool().await;
        let database = Database::from_config(DatabaseConfig::ExistingConnection(pool.clone())).await;

        let media_root = tempfile::tempdir().unwrap();
        let media = MediaStorage::new(media_root.path());
        media.save("photos/old.jpg", b"old photo").await.unwrap();

        let contact = database.find_first_contact().await.unwrap().unwrap();
        let contact = Contact {
            image: Some("photos/old.jpg".to_string()),
            image_height: Some(10),
            image_width: Some(10),
            ..contact
        };

        Setup {
            pool,
            database,
            media,
            contact,
            _media_root: media_root,
        }
    }

    fn values() -> ContactValues<'static> {
        ContactValues {
            name: "Ivan",
            surname: "Ivanov",
            date_of_birth: NaiveDate::from_ymd_opt(1985, 7, 14).unwrap(),
            bio: "",
            email: "ivan@example.com",
            jabber: "",
            skype_id: "",
            other: "",
        }
    }

    fn upload(file_name: &str) -> ImageChange {
        ImageChange::Replace(Upload {
            file_name: file_name.to_string(),
            bytes: png(20, 20),
        })
    }

    #[tokio::test]
    async fn test_replace_removes_previous_photo() {
        let setup = setup().await;

        let contact = save_contact(
            &setup.database,
            &setup.media,
            Some(&setup.contact),
            &values(),
            upload("new.png"),
        )
        .await
        .unwrap();

        assert_eq!(Some("photos/new.jpg".to_string()), contact.image);
        assert!(setup.media.exists("photos/new.jpg").await);
        assert!(!setup.media.exists("photos/old.jpg").await);
    }

    #[tokio::test]
    async fn test_failed_replace_keeps_previous_photo() {
        let setup = setup().await;

        setup.pool.close().await;

        let result = save_contact(
            &setup.database,
            &setup.media,
            Some(&setup.contact),
            &values(),
            upload("new.png"),
        )
        .await;

        assert!(result.is_err());
        assert!(setup.media.exists("photos/old.jpg").await);
        assert!(!setup.media.exists("photos/new.jpg").await);
    }

    #[tokio::test]
    async fn test_failed_clear_keeps_previous_photo() {
        let setup = setup().await;

        setup.pool.close().await;

        let result = save_contact(
            &setup.database,
            &setup.media,
            Some(&setup.contact),
            &values(),
            ImageChange::Clear,
        )
        .await;

        assert!(result.is_err());
        assert!(setup.media.exists("photos/old.jpg").await);
    }
}
