//! Behaviour shared by all persisted records

use std::fmt::Display;

/// A persisted record
///
/// The string representation (via [`Display`]) is what ends up in the change log and the admin
pub trait Model: Display + Send + Sync + Unpin + 'static {
    /// Application the model belongs to, first part of the admin URL
    const APP_LABEL: &'static str = "card";

    /// Lowercase model name, second part of the admin URL
    const MODEL_NAME: &'static str;

    /// Human readable model name
    const VERBOSE_NAME: &'static str;

    /// Table the rows live in
    const TABLE: &'static str;

    /// Default ordering of the rows
    const ORDERING: &'static str = "id ASC";

    /// Mutations of this model are written to the change log
    const TRACKED: bool = true;

    /// Primary key of the record
    fn pk(&self) -> i64;

    /// Field names and their display values, in declaration order
    fn fields(&self) -> Vec<(&'static str, String)>;

    /// Label used to identify the model in serialized output, like `card.contact`
    fn label() -> String {
        format!("{}.{}", Self::APP_LABEL, Self::MODEL_NAME)
    }
}
