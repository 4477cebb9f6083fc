//! Runtime settings, read from the environment

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use crate::utils::env_var_or_else;
use crate::utils::env_var_parse_or;

/// Text shown on the home page when there is no contact
pub const DEFAULT_EMPTY_CONTACT_TEXT: &str = "Contact data no yet";

/// Runtime settings
#[derive(Clone, Debug)]
pub struct Settings {
    /// Directory for uploaded files, served under `/uploads`
    pub media_root: PathBuf,

    /// Directory for bundled scripts, served under `/static`
    pub static_root: PathBuf,

    /// Text shown on the home page when there is no contact
    pub empty_contact_text: String,

    /// Artificial delay before answering an AJAX form submission
    pub form_ajax_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("uploads"),
            static_root: PathBuf::from("assets"),
            empty_contact_text: DEFAULT_EMPTY_CONTACT_TEXT.to_string(),
            form_ajax_delay: Duration::ZERO,
        }
    }
}

impl Settings {
    /// Read the settings from the environment
    ///
    /// - `MEDIA_ROOT`
    /// - `STATIC_ROOT`
    /// - `EMPTY_CONTACT_TEXT`
    /// - `FORM_AJAX_DELAY_MS`
    pub fn from_env() -> Result<Self> {
        let media_root = env_var_or_else("MEDIA_ROOT", || String::from("uploads"));
        let static_root = env_var_or_else("STATIC_ROOT", || String::from("assets"));
        let empty_contact_text = env_var_or_else("EMPTY_CONTACT_TEXT", || {
            DEFAULT_EMPTY_CONTACT_TEXT.to_string()
        });
        let form_ajax_delay = env_var_parse_or::<u64>("FORM_AJAX_DELAY_MS", 0)?;

        Ok(Self {
            media_root: PathBuf::from(media_root),
            static_root: PathBuf::from(static_root),
            empty_contact_text,
            form_ajax_delay: Duration::from_millis(form_ajax_delay),
        })
    }
}
