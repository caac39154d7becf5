//! Query configuration via `strata-query.toml`
//!
//! Settings shared by every collection a [`Query`](crate::Query) client
//! creates. Everything has a default, so an empty file (or no file at all)
//! yields a working configuration compatible with existing stores.

use std::path::Path;

use serde::{Deserialize, Serialize};
use strata_core::{validate_name, Error, Result, DEFAULT_NAMESPACE};

/// Config file name conventionally used by applications.
pub const CONFIG_FILE_NAME: &str = "strata-query.toml";

/// Default page-size hint for key scans.
pub const DEFAULT_SCAN_COUNT: usize = 100;

/// What `Collection::set` does when the document already exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritePolicy {
    /// Overwrite silently
    #[default]
    Upsert,
    /// Fail with `AlreadyExists`
    Strict,
}

/// How `match` repairs index entries pointing at missing documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepairMode {
    /// Spawn the repair on the tokio runtime and return immediately
    #[default]
    Background,
    /// Finish the repair before returning the matches
    Inline,
}

/// Query configuration loaded from `strata-query.toml`.
///
/// # Example
///
/// ```toml
/// # Key namespace shared with other clients of the backend
/// namespace = "@upstash/query"
///
/// # Page-size hint for key scans
/// scan_count = 100
///
/// # "upsert" (default) or "strict"
/// write_policy = "upsert"
///
/// # "background" (default) or "inline"
/// repair = "background"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Leading segment of every key
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Page-size hint passed to `scan`
    #[serde(default = "default_scan_count")]
    pub scan_count: usize,
    /// Overwrite behavior of `Collection::set`
    #[serde(default)]
    pub write_policy: WritePolicy,
    /// Default repair mode for indexes
    #[serde(default)]
    pub repair: RepairMode,
    /// Trace every codec encode/decode
    #[serde(default)]
    pub codec_debug: bool,
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_scan_count() -> usize {
    DEFAULT_SCAN_COUNT
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            scan_count: default_scan_count(),
            write_policy: WritePolicy::default(),
            repair: RepairMode::default(),
            codec_debug: false,
        }
    }
}

impl QueryConfig {
    /// Check values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for an empty namespace or a zero scan count.
    pub fn validate(&self) -> Result<()> {
        validate_name("namespace", &self.namespace)?;
        if self.scan_count == 0 {
            return Err(Error::invalid_config("scan_count must be at least 1"));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Strata Query configuration
#
# Key namespace. Every key written starts with "<namespace>:collection:".
# Keep the default to share data with existing clients.
namespace = "@upstash/query"

# Page-size hint for key scans when listing a whole collection.
scan_count = 100

# Behavior of set() on an existing document:
#   "upsert" = overwrite silently (default)
#   "strict" = fail with AlreadyExists
write_policy = "upsert"

# How lookups repair index entries that point at deleted documents:
#   "background" = spawn the repair, return matches immediately (default)
#   "inline"     = finish the repair before returning
repair = "background"

# Trace every codec encode/decode at trace level.
codec_debug = false
"#
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: QueryConfig = toml::from_str(content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| {
            Error::invalid_config(format!("Config file '{}': {}", path.display(), e))
        })
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::invalid_config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_matches_existing_layout() {
        let config = QueryConfig::default();
        assert_eq!(config.namespace, "@upstash/query");
        assert_eq!(config.scan_count, DEFAULT_SCAN_COUNT);
        assert_eq!(config.write_policy, WritePolicy::Upsert);
        assert_eq!(config.repair, RepairMode::Background);
        assert!(!config.codec_debug);
    }

    #[test]
    fn test_default_toml_parses_to_default() {
        let config = QueryConfig::from_toml_str(QueryConfig::default_toml()).unwrap();
        assert_eq!(config, QueryConfig::default());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = QueryConfig::from_toml_str("").unwrap();
        assert_eq!(config, QueryConfig::default());
    }

    #[test]
    fn test_parse_strict_inline() {
        let config =
            QueryConfig::from_toml_str("write_policy = \"strict\"\nrepair = \"inline\"").unwrap();
        assert_eq!(config.write_policy, WritePolicy::Strict);
        assert_eq!(config.repair, RepairMode::Inline);
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let err = QueryConfig::from_toml_str("write_policy = \"yolo\"").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn test_zero_scan_count_rejected() {
        assert!(QueryConfig::from_toml_str("scan_count = 0").is_err());
    }

    #[test]
    fn test_empty_namespace_rejected() {
        assert!(QueryConfig::from_toml_str("namespace = \"\"").is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        let config = QueryConfig {
            namespace: "tenant-a".to_string(),
            scan_count: 7,
            write_policy: WritePolicy::Strict,
            repair: RepairMode::Inline,
            codec_debug: true,
        };
        config.write_to_file(&path).unwrap();
        assert_eq!(QueryConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = QueryConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, Error::IoError(_)));
    }
}
