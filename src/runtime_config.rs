//! # Runtime Configuration Module
//!
//! Startup configuration for a [`Service`](crate::router::Service): its root
//! path and which built-in codecs its registry carries.
//!
//! ## Environment Variables
//!
//! ### `PATHWAYS_ROOT`
//!
//! Root under which routes are registered. Default: `/`
//!
//! ### `PATHWAYS_DEFAULT_CONTENT_TYPE`
//!
//! Content type used when a request has no usable `Accept` header.
//! Default: `application/json`
//!
//! ### `PATHWAYS_CODECS`
//!
//! Comma-separated built-in codecs: `json`, `msgpack`, `postcard`.
//! Default: all three.
//!
//! ## YAML
//!
//! The same settings can be loaded from a file; missing keys take the defaults.
//!
//! ```yaml
//! root: /api
//! default_content_type: application/x-msgpack
//! codecs: [json, msgpack]
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use pathways::router::Service;
//! use pathways::runtime_config::ServiceConfig;
//!
//! let config = ServiceConfig::from_env();
//! let service = Service::from_config(&config).expect("valid codec configuration");
//! println!("Serving under {}", service.root());
//! ```

use crate::codec::{Codec, SerializerRegistry, JSON, MSGPACK, POSTCARD};
use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Service configuration loaded from the environment or a YAML file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Route root (default: `/`)
    pub root: String,
    /// Content type when the request states no preference (default: `application/json`)
    pub default_content_type: String,
    /// Built-in codec names to register (default: `json`, `msgpack`, `postcard`)
    pub codecs: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            root: "/".to_string(),
            default_content_type: JSON.to_string(),
            codecs: vec![
                "json".to_string(),
                "msgpack".to_string(),
                "postcard".to_string(),
            ],
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`ServiceConfig::from_env`] over an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            root: var("PATHWAYS_ROOT").unwrap_or(defaults.root),
            default_content_type: var("PATHWAYS_DEFAULT_CONTENT_TYPE")
                .filter(|ct| !ct.is_empty())
                .unwrap_or(defaults.default_content_type),
            codecs: var("PATHWAYS_CODECS")
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|name| !name.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or(defaults.codecs),
        }
    }

    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid YAML for this structure.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Build a registry holding only the configured codecs.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownCodec`] for a name that is not a built-in codec,
    /// [`ConfigError::UnregisteredDefault`] when none of the listed codecs
    /// serves the default content type.
    pub fn registry(&self) -> Result<SerializerRegistry, ConfigError> {
        let mut builder =
            SerializerRegistry::builder().default_content_type(self.default_content_type.as_str());
        for name in &self.codecs {
            let (content_type, codec) = match name.to_lowercase().as_str() {
                "json" => (JSON, Codec::Json),
                "msgpack" => (MSGPACK, Codec::MsgPack),
                "postcard" => (POSTCARD, Codec::Postcard),
                _ => return Err(ConfigError::UnknownCodec(name.clone())),
            };
            builder = builder.codec(content_type, codec);
        }
        let registry = builder.build()?;
        if !registry.contains(registry.default_content_type()) {
            return Err(ConfigError::UnregisteredDefault(
                self.default_content_type.clone(),
            ));
        }
        Ok(registry)
    }
}
