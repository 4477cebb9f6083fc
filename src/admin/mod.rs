//! Back-office for the registered models
//!
//! The [`AdminSite`] is an explicit registry: every known model type is listed with whether it
//! can be browsed in the back-office. The edit link helper uses it to build deep links.

use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use axum::routing::post;

use crate::contacts::Contact;
use crate::models::Model;
use crate::notes::Note;
use crate::requests::RequestEntry;
use crate::users::User;
use crate::views::Tracking;
use crate::views::with_tracking;

mod views;

/// Get the Axum router for the back-office
pub fn router() -> Router {
    Router::new()
        .route("/admin/", with_tracking(get(views::index), Tracking::Record))
        .route(
            "/admin/{app}/{model}/",
            with_tracking(get(views::change_list), Tracking::Record),
        )
        .route(
            "/admin/{app}/{model}/{id}/",
            with_tracking(get(views::change_form), Tracking::Record),
        )
        .route(
            "/admin/{app}/{model}/{id}/delete/",
            with_tracking(post(views::delete), Tracking::Record),
        )
}

/// A known model type
#[derive(Clone, Debug)]
pub struct ModelEntry {
    /// Type of the model
    type_id: TypeId,

    /// Application label
    pub app_label: &'static str,

    /// Lowercase model name
    pub model_name: &'static str,

    /// Human readable model name
    pub verbose_name: &'static str,

    /// Can be browsed in the back-office
    pub browsable: bool,

    /// Get the primary key of an instance of this model
    pk: fn(&dyn Any) -> Option<i64>,
}

impl ModelEntry {
    fn of<M: Model>(browsable: bool) -> Self {
        Self {
            type_id: TypeId::of::<M>(),
            app_label: M::APP_LABEL,
            model_name: M::MODEL_NAME,
            verbose_name: M::VERBOSE_NAME,
            browsable,
            pk: |value| value.downcast_ref::<M>().map(M::pk),
        }
    }

    /// Is this the entry of the given model?
    pub fn is<M: Model>(&self) -> bool {
        self.type_id == TypeId::of::<M>()
    }

    /// Path of the change list
    pub fn change_list_url(&self) -> String {
        format!("/admin/{}/{}/", self.app_label, self.model_name)
    }

    /// Path of the change form of a single instance
    pub fn change_form_url(&self, pk: i64) -> String {
        format!("/admin/{}/{}/{pk}/", self.app_label, self.model_name)
    }
}

/// The edit link helper got something that is not a model instance
#[derive(Debug, PartialEq, Eq)]
pub struct EditLinkError;

impl std::error::Error for EditLinkError {}

impl fmt::Display for EditLinkError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Invalid type argument for edit_link, should be a model instance"
        )
    }
}

/// Registry of all known models
#[derive(Clone, Debug)]
pub struct AdminSite {
    /// Known models by type
    models: Arc<HashMap<TypeId, ModelEntry>>,
}

impl Default for AdminSite {
    fn default() -> Self {
        Self::builder()
            .register::<Contact>()
            .register::<RequestEntry>()
            .register::<Note>()
            .known::<User>()
            .build()
    }
}

impl AdminSite {
    /// Start an empty registry
    pub fn builder() -> AdminSiteBuilder {
        AdminSiteBuilder {
            models: HashMap::new(),
        }
    }

    /// All models that can be browsed, ordered by name
    pub fn registered(&self) -> Vec<&ModelEntry> {
        let mut entries = self
            .models
            .values()
            .filter(|entry| entry.browsable)
            .collect::<Vec<_>>();

        entries.sort_by_key(|entry| (entry.app_label, entry.model_name));

        entries
    }

    /// Find a browsable model by its labels
    pub fn find(&self, app_label: &str, model_name: &str) -> Option<&ModelEntry> {
        self.models.values().find(|entry| {
            entry.browsable && entry.app_label == app_label && entry.model_name == model_name
        })
    }

    /// Deep link to the back-office page of a model instance
    ///
    /// Returns `None` for model instances that can not be browsed, fails for anything that is
    /// not a model instance
    pub fn edit_link(&self, value: &dyn Any) -> Result<Option<String>, EditLinkError> {
        let entry = self.models.get(&value.type_id()).ok_or(EditLinkError)?;

        if !entry.browsable {
            tracing::debug!(
                r#"No edit link for "{}", it is not registered in the admin"#,
                entry.verbose_name
            );

            return Ok(None);
        }

        let pk = (entry.pk)(value).ok_or(EditLinkError)?;

        Ok(Some(entry.change_form_url(pk)))
    }
}

/// Builder for the [`AdminSite`]
pub struct AdminSiteBuilder {
    /// Known models by type
    models: HashMap<TypeId, ModelEntry>,
}

impl AdminSiteBuilder {
    /// Add a model that can be browsed
    pub fn register<M: Model>(mut self) -> Self {
        self.models.insert(TypeId::of::<M>(), ModelEntry::of::<M>(true));
        self
    }

    /// Add a model that is known but can not be browsed
    pub fn known<M: Model>(mut self) -> Self {
        self.models
            .insert(TypeId::of::<M>(), ModelEntry::of::<M>(false));
        self
    }

    /// Finish the registry
    pub fn build(self) -> AdminSite {
        AdminSite {
            models: Arc::new(self.models),
        }
    }
}
