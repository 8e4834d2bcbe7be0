//! # Stage Configuration
//!
//! Loaded once at startup from TOML. Every section has defaults, so an empty
//! file is a valid configuration.
//!
//! ```toml
//! [registry]
//! disabled = false
//! lookup_timeout_ms = 15000
//!
//! [selection]
//! unit_scope = "/selected_units"
//!
//! [render]
//! queue_capacity = 0      # 0 = unbounded
//!
//! [events]
//! capacity = 1024
//!
//! [visibility]
//! zones = true
//! tiles = false
//! regions = false
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use stage_shared::{DEFAULT_LOOKUP_TIMEOUT_MS, DEFAULT_SELECTED_UNIT_SCOPE};
use std::path::Path;
use std::time::Duration;

/// Registry connection settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    /// Do not synchronize with the registry; every update is dropped.
    pub disabled: bool,
    /// Bound for every registry lookup, in milliseconds.
    pub lookup_timeout_ms: u64,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            disabled: false,
            lookup_timeout_ms: DEFAULT_LOOKUP_TIMEOUT_MS,
        }
    }
}

impl RegistrySection {
    /// Lookup bound as a duration.
    #[must_use]
    pub const fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

/// Where unit selections come from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSection {
    /// Scope on which selected units and their probabilities arrive.
    pub unit_scope: String,
}

impl Default for SelectionSection {
    fn default() -> Self {
        Self {
            unit_scope: DEFAULT_SELECTED_UNIT_SCOPE.to_owned(),
        }
    }
}

/// Render thread settings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    /// Mutation queue capacity; `0` means unbounded.
    pub queue_capacity: usize,
}

impl RenderSection {
    /// Capacity as the render thread takes it.
    #[must_use]
    pub const fn capacity(&self) -> Option<usize> {
        match self.queue_capacity {
            0 => None,
            n => Some(n),
        }
    }
}

/// Event channel settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsSection {
    /// Events in flight before `send` starts refusing.
    pub capacity: usize,
}

impl Default for EventsSection {
    fn default() -> Self {
        Self { capacity: 1024 }
    }
}

/// Initial values of the visibility switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibilitySection {
    /// Zone outlines shown
    pub zones: bool,
    /// Tile outlines shown
    pub tiles: bool,
    /// Region outlines shown
    pub regions: bool,
}

impl Default for VisibilitySection {
    fn default() -> Self {
        Self {
            zones: true,
            tiles: false,
            regions: false,
        }
    }
}

impl VisibilitySection {
    /// Switch values in zones, tiles, regions order.
    #[must_use]
    pub const fn as_array(&self) -> [bool; 3] {
        [self.zones, self.tiles, self.regions]
    }
}

/// Complete stage configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// `[registry]`
    pub registry: RegistrySection,
    /// `[selection]`
    pub selection: SelectionSection,
    /// `[render]`
    pub render: RenderSection,
    /// `[events]`
    pub events: EventsSection,
    /// `[visibility]`
    pub visibility: VisibilitySection,
}

impl StageConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] for malformed TOML or unknown value types,
    /// [`ConfigError::InvalidValue`] when validation fails.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] when the file cannot be read, otherwise see
    /// [`StageConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), "loaded stage config");
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.registry.lookup_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "registry.lookup_timeout_ms",
                reason: "must be greater than zero".into(),
            });
        }
        let scope = &self.selection.unit_scope;
        if scope.is_empty() || !scope.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                key: "selection.unit_scope",
                reason: format!("{scope:?} is not an absolute scope"),
            });
        }
        if self.events.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "events.capacity",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = StageConfig::from_toml_str("").unwrap();
        assert_eq!(config, StageConfig::default());
        assert!(!config.registry.disabled);
        assert_eq!(config.registry.lookup_timeout(), Duration::from_secs(15));
        assert_eq!(config.selection.unit_scope, "/selected_units");
        assert_eq!(config.render.capacity(), None);
        assert_eq!(config.visibility.as_array(), [true, false, false]);
    }

    #[test]
    fn test_partial_sections() {
        let config = StageConfig::from_toml_str(
            r#"
            [registry]
            disabled = true

            [render]
            queue_capacity = 64

            [visibility]
            tiles = true
            "#,
        )
        .unwrap();
        assert!(config.registry.disabled);
        assert_eq!(config.registry.lookup_timeout_ms, 15_000);
        assert_eq!(config.render.capacity(), Some(64));
        assert_eq!(config.visibility.as_array(), [true, true, false]);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let cases = [
            ("[registry]\nlookup_timeout_ms = 0", "registry.lookup_timeout_ms"),
            ("[selection]\nunit_scope = \"\"", "selection.unit_scope"),
            ("[selection]\nunit_scope = \"selected\"", "selection.unit_scope"),
            ("[events]\ncapacity = 0", "events.capacity"),
        ];
        for (doc, expected) in cases {
            match StageConfig::from_toml_str(doc) {
                Err(ConfigError::InvalidValue { key, .. }) => assert_eq!(key, expected),
                other => panic!("{doc}: expected invalid value, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            StageConfig::from_toml_str("[registry\ndisabled = true"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            StageConfig::from_toml_str("[registry]\ndisabled = \"yes\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = StageConfig::from_file("/nonexistent/stage.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/stage.toml"));
    }
}
