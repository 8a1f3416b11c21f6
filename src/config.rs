// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Provider configuration.
//!
//! Values come from an optional TOML file named by `LEASE_KUBE_CONFIG`,
//! then individual `LEASE_KUBE_*` environment variables override them.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::k8s::naming::NAMESPACE_LENGTH;
use crate::k8s::BuildSettings;
use crate::lease::validation::{validate_host, MAX_LABEL_LENGTH};

/// Environment variable naming the TOML config file.
pub const CONFIG_PATH_ENV: &str = "LEASE_KUBE_CONFIG";

pub const DEFAULT_FIELD_MANAGER: &str = "lease-kube";
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Upper bound the API server accepts for a single list page.
pub const MAX_PAGE_SIZE: u32 = 5000;

/// Longest ingress domain for which `<service>.<namespace>.<domain>` still
/// fits in a 253-character host name.
pub const MAX_INGRESS_DOMAIN_LENGTH: usize = 253 - (MAX_LABEL_LENGTH + 1 + NAMESPACE_LENGTH + 1);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidValue {
                key: "log_format".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Kubeconfig file. Inferred (in-cluster, then `~/.kube/config`) when unset.
    pub kubeconfig: Option<PathBuf>,
    /// Kubeconfig context; the current context when unset.
    pub context: Option<String>,
    /// Field manager used for server-side apply.
    pub field_manager: String,
    /// Namespaces fetched per list request during discovery.
    pub list_page_size: u32,
    /// Domain under which host-less exposures get a generated host.
    pub ingress_domain: Option<String>,
    pub ingress_class: Option<String>,
    pub log_format: LogFormat,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            context: None,
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            list_page_size: DEFAULT_PAGE_SIZE,
            ingress_domain: None,
            ingress_class: None,
            log_format: LogFormat::default(),
        }
    }
}

impl ProviderConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(path, &raw)
    }

    /// Apply `LEASE_KUBE_*` overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("LEASE_KUBE_KUBECONFIG") {
            self.kubeconfig = non_empty(v).map(PathBuf::from);
        }
        if let Some(v) = lookup("LEASE_KUBE_CONTEXT") {
            self.context = non_empty(v);
        }
        if let Some(v) = lookup("LEASE_KUBE_FIELD_MANAGER") {
            self.field_manager = v;
        }
        if let Some(v) = lookup("LEASE_KUBE_PAGE_SIZE") {
            self.list_page_size = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "LEASE_KUBE_PAGE_SIZE".to_string(),
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("LEASE_KUBE_INGRESS_DOMAIN") {
            self.ingress_domain = non_empty(v);
        }
        if let Some(v) = lookup("LEASE_KUBE_INGRESS_CLASS") {
            self.ingress_class = non_empty(v);
        }
        if let Some(v) = lookup("LEASE_KUBE_LOG_FORMAT") {
            self.log_format = v.parse()?;
        }
        Ok(())
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.list_page_size == 0 || self.list_page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "list_page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.list_page_size
            )));
        }
        if self.field_manager.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "field_manager cannot be empty".to_string(),
            ));
        }
        if let Some(domain) = &self.ingress_domain {
            if domain.len() > MAX_INGRESS_DOMAIN_LENGTH {
                return Err(ConfigError::Invalid(format!(
                    "ingress_domain must be at most {} characters, got {}",
                    MAX_INGRESS_DOMAIN_LENGTH,
                    domain.len()
                )));
            }
            validate_host(domain)
                .map_err(|e| ConfigError::Invalid(format!("ingress_domain: {}", e)))?;
        }
        Ok(())
    }

    pub fn build_settings(&self) -> BuildSettings {
        BuildSettings {
            ingress_domain: self.ingress_domain.clone(),
            ingress_class: self.ingress_class.clone(),
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Load configuration from the process environment.
pub fn load() -> Result<ProviderConfig, ConfigError> {
    load_with(|key| std::env::var(key).ok())
}

/// Load configuration using `lookup` in place of the process environment.
pub fn load_with<F>(lookup: F) -> Result<ProviderConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match lookup(CONFIG_PATH_ENV).and_then(non_empty) {
        Some(path) => ProviderConfig::from_file(Path::new(&path))?,
        None => ProviderConfig::default(),
    };
    config.apply_env(&lookup)?;
    Ok(config)
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
