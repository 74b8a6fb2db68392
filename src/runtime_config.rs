//! # Runtime Configuration Module
//!
//! Environment-driven settings for the operator tool and for services that
//! want the same knobs.
//!
//! ## Environment Variables
//!
//! | variable | default | effect |
//! |----------|---------|--------|
//! | `METAROUTE_DOC_TITLE` | `API` | `info.title` of synthesized documents |
//! | `METAROUTE_DOC_VERSION` | `1.0.0` | `info.version` of synthesized documents |
//! | `METAROUTE_LOG` | `info` | log level, or a full `EnvFilter` directive list |
//! | `METAROUTE_LOG_FORMAT` | `pretty` | `pretty` or `json` |
//!
//! ## Usage
//!
//! ```rust
//! use metaroute::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! println!("documenting {} {}", config.doc_title, config.doc_version);
//! ```
//!
//! `metaroute-doc` reads the `METAROUTE_DOC_*` variables through its
//! `--title`/`--version` flags, and explicit flags take precedence.

use std::env;

pub const ENV_DOC_TITLE: &str = "METAROUTE_DOC_TITLE";
pub const ENV_DOC_VERSION: &str = "METAROUTE_DOC_VERSION";
pub const ENV_LOG: &str = "METAROUTE_LOG";
pub const ENV_LOG_FORMAT: &str = "METAROUTE_LOG_FORMAT";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub doc_title: String,
    pub doc_version: String,
    /// Level name or `EnvFilter` directives
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            doc_title: "API".to_string(),
            doc_version: "1.0.0".to_string(),
            log_filter: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup. Unset and
    /// blank values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        RuntimeConfig {
            doc_title: get(ENV_DOC_TITLE).unwrap_or(defaults.doc_title),
            doc_version: get(ENV_DOC_VERSION).unwrap_or(defaults.doc_version),
            log_filter: get(ENV_LOG).unwrap_or(defaults.log_filter),
            log_format: get(ENV_LOG_FORMAT)
                .map(|v| LogFormat::parse(&v))
                .unwrap_or(defaults.log_format),
        }
    }
}
