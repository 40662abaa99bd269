//! Container settings.
//!
//! The parts of a container's configuration that are plain data (its name and
//! its naming conventions) can be kept outside the code and applied with
//! [`ContainerBuilder::with_settings`](crate::ContainerBuilder::with_settings).

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "config")]
use crate::{DiError, DiResult};

/// Data-only container configuration.
///
/// `conventions: None` keeps whatever the builder has; `Some(list)` replaces
/// the conventions, and an empty list disables convention lookup.
///
/// # Examples
///
/// ```rust
/// # #[cfg(feature = "config")]
/// # {
/// use ferrous_injector::ContainerSettings;
///
/// let settings = ContainerSettings::from_json_str(
///     r#"{ "name": "billing", "conventions": ["${package}.impl.${class}Impl"] }"#,
/// ).unwrap();
/// assert_eq!(settings.name.as_deref(), Some("billing"));
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct ContainerSettings {
    pub name: Option<String>,
    pub conventions: Option<Vec<String>>,
}

impl ContainerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_conventions<I, S>(mut self, conventions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conventions = Some(conventions.into_iter().map(Into::into).collect());
        self
    }

    /// Reads settings from JSON.
    #[cfg(feature = "config")]
    pub fn from_json_str(json: &str) -> DiResult<Self> {
        serde_json::from_str(json).map_err(|e| DiError::Settings(e.to_string()))
    }

    #[cfg(feature = "config")]
    pub fn to_json_string(&self) -> DiResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| DiError::Settings(e.to_string()))
    }
}
