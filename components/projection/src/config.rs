//! Projection configuration.

use crate::error::ProjectionError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether the identity cache may hold engine weak references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeakReferenceMode {
    /// Use weak references when the host supports them.
    #[default]
    Auto,
    /// Start in fallback mode.
    Disabled,
}

/// Tunables of one projection session.
///
/// # Examples
///
/// ```
/// use projection::{ProjectionConfig, WeakReferenceMode};
///
/// let config = ProjectionConfig::from_json_str(
///     r#"{ "event_sweep_threshold": 8, "weak_references": "disabled" }"#,
/// )
/// .unwrap();
/// assert_eq!(config.event_sweep_threshold, 8);
/// assert_eq!(config.weak_references, WeakReferenceMode::Disabled);
/// assert_eq!(config.instance_sweep_interval_ms, 10_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Minimum time between identity cache sweeps.
    pub instance_sweep_interval_ms: u64,
    /// Minimum time between event registration sweeps.
    pub event_sweep_interval_ms: u64,
    /// Number of registration entries before a sweep is considered.
    pub event_sweep_threshold: usize,
    /// Weak reference policy of the identity cache.
    pub weak_references: WeakReferenceMode,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            instance_sweep_interval_ms: 10_000,
            event_sweep_interval_ms: 10_000,
            event_sweep_threshold: 64,
            weak_references: WeakReferenceMode::Auto,
        }
    }
}

impl ProjectionConfig {
    /// Parses and validates a JSON configuration. Missing fields keep their
    /// defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ProjectionError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| ProjectionError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects zero intervals and a zero sweep threshold.
    pub fn validate(&self) -> Result<(), ProjectionError> {
        if self.instance_sweep_interval_ms == 0 {
            return Err(ProjectionError::InvalidConfig(
                "instance_sweep_interval_ms must be positive".to_string(),
            ));
        }
        if self.event_sweep_interval_ms == 0 {
            return Err(ProjectionError::InvalidConfig(
                "event_sweep_interval_ms must be positive".to_string(),
            ));
        }
        if self.event_sweep_threshold == 0 {
            return Err(ProjectionError::InvalidConfig(
                "event_sweep_threshold must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub(crate) fn instance_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.instance_sweep_interval_ms)
    }

    pub(crate) fn event_sweep_interval(&self) -> Duration {
        Duration::from_millis(self.event_sweep_interval_ms)
    }
}
