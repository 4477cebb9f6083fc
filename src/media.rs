//! Media storage for uploaded files
//!
//! Files are written below a single root directory, a file with the same name is overwritten

use std::io;
use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

/// Directory below the media root for contact photos
const PHOTO_DIRECTORY: &str = "photos";

/// File system backed media storage
#[derive(Clone, Debug)]
pub struct MediaStorage {
    /// Root directory of all media
    root: PathBuf,
}

impl MediaStorage {
    /// Create media storage rooted at the given directory
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Location of a stored file on disk
    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Storage name for an uploaded photo
    ///
    /// Photos are always stored as JPEG, only the sanitized stem of the original name is kept
    pub fn photo_name(file_name: &str) -> String {
        let stem = Path::new(file_name)
            .file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or_default();

        let stem = stem
            .chars()
            .map(|ch| {
                if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                    ch
                } else {
                    '_'
                }
            })
            .collect::<String>();

        let stem = stem.trim_matches('_');

        if stem.is_empty() {
            format!("{PHOTO_DIRECTORY}/photo.jpg")
        } else {
            format!("{PHOTO_DIRECTORY}/{stem}.jpg")
        }
    }

    /// Write a file, replacing an existing one with the same name
    pub async fn save(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let path = self.path(name);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(&path, bytes).await
    }

    /// Remove a file
    ///
    /// A file that does not exist is not an error
    pub async fn delete(&self, name: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.path(name)).await {
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!("Media file {name} was already removed");

                Ok(())
            }
            result => result,
        }
    }

    /// Does the file exist?
    #[cfg(test)]
    pub async fn exists(&self, name: &str) -> bool {
        tokio::fs::try_exists(self.path(name))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_name() {
        assert_eq!("photos/me.jpg", MediaStorage::photo_name("me.png"));
        assert_eq!(
            "photos/holiday_2016.jpg",
            MediaStorage::photo_name("holiday 2016.gif")
        );
        assert_eq!("photos/passwd.jpg", MediaStorage::photo_name("../../etc/passwd"));
        assert_eq!("photos/photo.jpg", MediaStorage::photo_name(""));
        assert_eq!("photos/photo.jpg", MediaStorage::photo_name("..."));
    }

    #[tokio::test]
    async fn test_save_overwrites_and_delete_tolerates_missing() {
        let root = tempfile::tempdir().unwrap();
        let media = MediaStorage::new(root.path());

        media.save("photos/me.jpg", b"first").await.unwrap();
        media.save("photos/me.jpg", b"second").await.unwrap();

        let content = tokio::fs::read(media.path("photos/me.jpg")).await.unwrap();
        assert_eq!(b"second".to_vec(), content);

        media.delete("photos/me.jpg").await.unwrap();
        assert!(!media.exists("photos/me.jpg").await);

        // already gone
        media.delete("photos/me.jpg").await.unwrap();
    }
}
