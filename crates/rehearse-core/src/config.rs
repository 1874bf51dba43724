//! Configuration surfaces
//!
//! Two layers: [`RehearsalConfig`] is process-wide (consumed from whatever
//! configuration loader the embedder uses), [`OperationOptions`] is
//! declared per marked operation at its call site.

use serde::{Deserialize, Serialize};

/// Process-wide rehearsal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RehearsalConfig {
    /// Master switch; when false the interceptor bypasses all other logic.
    pub enabled: bool,
    /// Inbound-signal key that marks a request as a rehearsal.
    pub header_name: String,
    /// Emit info-level logs for every interception decision.
    pub verbose_logging: bool,
}

impl RehearsalConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With master switch
    #[inline]
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// With signal key name
    #[inline]
    #[must_use]
    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    /// With verbose logging
    #[inline]
    #[must_use]
    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }
}

impl Default for RehearsalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            header_name: "dry-run".to_string(),
            verbose_logging: false,
        }
    }
}

/// Per-operation declaration consumed by the interceptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OperationOptions {
    /// Transactional resource to use; empty means default resolution.
    pub resource_name: String,
    /// Whether child work should inherit the marker. Informational:
    /// actual propagation requires a bridge wired into whatever pool the
    /// children run on.
    pub propagate_to_children: bool,
}

impl OperationOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With an explicit resource name
    #[inline]
    #[must_use]
    pub fn with_resource_name(mut self, name: impl Into<String>) -> Self {
        self.resource_name = name.into();
        self
    }

    /// With child propagation
    #[inline]
    #[must_use]
    pub fn with_propagate_to_children(mut self, propagate: bool) -> Self {
        self.propagate_to_children = propagate;
        self
    }
}

impl Default for OperationOptions {
    fn default() -> Self {
        Self {
            resource_name: String::new(),
            propagate_to_children: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn config_defaults() {
        let config = RehearsalConfig::new();
        assert!(config.enabled);
        assert_eq!(config.header_name, "dry-run");
        assert!(!config.verbose_logging);
    }

    #[test]
    fn config_builders() {
        let config = RehearsalConfig::new()
            .with_enabled(false)
            .with_header_name("x-rehearse")
            .with_verbose_logging(true);
        assert!(!config.enabled);
        assert_eq!(config.header_name, "x-rehearse");
        assert!(config.verbose_logging);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: RehearsalConfig = serde_json::from_str(r#"{"header-name": "x-dry"}"#).unwrap();
        assert!(config.enabled);
        assert_eq!(config.header_name, "x-dry");
    }

    #[test]
    fn options_defaults() {
        let options = OperationOptions::new();
        assert_eq!(options.resource_name, "");
        assert!(options.propagate_to_children);
    }

    #[test]
    fn options_builders() {
        let options = OperationOptions::new()
            .with_resource_name("orders-db")
            .with_propagate_to_children(false);
        assert_eq!(options.resource_name, "orders-db");
        assert!(!options.propagate_to_children);
    }
}
