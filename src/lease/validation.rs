// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Validation of manifest groups before they reach the cluster.
//!
//! Service names become Service object names inside the lease namespace, so
//! they must be RFC 1035 labels. Images and hosts are checked for shell
//! metacharacters and obviously malformed references.

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

use super::types::{ManifestGroup, ManifestService, ManifestServiceExpose, Protocol};

/// Maximum length of an RFC 1123 label.
pub const MAX_LABEL_LENGTH: usize = 63;

/// Maximum allowed length for string fields.
pub const MAX_FIELD_LENGTH: usize = 256;

/// Maximum length of a DNS host name.
const MAX_HOST_LENGTH: usize = 253;

/// Validation error types.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Image reference is invalid.
    InvalidImage(String),
    /// Name is not a valid RFC 1035 label.
    InvalidName(String),
    /// Two services share a name.
    DuplicateService(String),
    /// Exposure declares an unusable port.
    InvalidPort { service: String, port: u16 },
    /// Environment entry is not `KEY=VALUE`.
    InvalidEnv { service: String, entry: String },
    /// Two exposures publish the same port and protocol from different
    /// container ports.
    ConflictingExpose {
        service: String,
        port: u16,
        proto: Protocol,
    },
    /// Ingress host is malformed.
    InvalidHost(String),
    /// Field exceeds maximum length.
    MaxLengthExceeded { field: String, max: usize },
    /// Field is empty but required.
    EmptyField(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidImage(img) => write!(f, "Invalid image reference: {}", img),
            Self::InvalidName(name) => write!(f, "Invalid name: {}", name),
            Self::DuplicateService(name) => write!(f, "Duplicate service name: {}", name),
            Self::InvalidPort { service, port } => {
                write!(f, "Service '{}' exposes invalid port {}", service, port)
            }
            Self::InvalidEnv { service, entry } => {
                write!(f, "Service '{}' has invalid env entry: {}", service, entry)
            }
            Self::ConflictingExpose {
                service,
                port,
                proto,
            } => write!(
                f,
                "Service '{}' maps {}/{} to more than one container port",
                service, port, proto
            ),
            Self::InvalidHost(host) => write!(f, "Invalid host: {}", host),
            Self::MaxLengthExceeded { field, max } => {
                write!(f, "Field '{}' exceeds maximum length of {}", field, max)
            }
            Self::EmptyField(field) => write!(f, "Field '{}' cannot be empty", field),
        }
    }
}

impl std::error::Error for ValidationError {}

fn dns_label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z]([-a-z0-9]*[a-z0-9])?$").expect("static regex is valid")
    })
}

fn host_label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("static regex is valid")
    })
}

fn env_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.-]*$").expect("static regex is valid"))
}

/// Validate an RFC 1035 label (service names, object names).
pub fn validate_dns_label(name: &str, field_name: &str) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyField(field_name.to_string()));
    }

    if name.len() > MAX_LABEL_LENGTH {
        return Err(ValidationError::MaxLengthExceeded {
            field: field_name.to_string(),
            max: MAX_LABEL_LENGTH,
        });
    }

    if !dns_label_regex().is_match(name) {
        return Err(ValidationError::InvalidName(format!(
            "{}: '{}' must be lowercase alphanumerics or '-', starting with a letter and ending alphanumeric",
            field_name, name
        )));
    }

    Ok(())
}

/// Validate a container image reference.
///
/// Rejects shell metacharacters and invalid name formats.
pub fn validate_image(image: &str) -> Result<(), ValidationError> {
    if image.is_empty() {
        return Err(ValidationError::EmptyField("image".to_string()));
    }

    if image.len() > MAX_FIELD_LENGTH {
        return Err(ValidationError::MaxLengthExceeded {
            field: "image".to_string(),
            max: MAX_FIELD_LENGTH,
        });
    }

    let forbidden_chars = [
        ';', '&', '|', '`', '$', '(', ')', '{', '}', '<', '>', ' ', '\n', '\r', '\0',
    ];
    if let Some(ch) = forbidden_chars.iter().find(|ch| image.contains(**ch)) {
        return Err(ValidationError::InvalidImage(format!(
            "contains forbidden character: {:?}",
            ch
        )));
    }

    if image.starts_with('-') || image.starts_with('.') || image.starts_with('/') {
        return Err(ValidationError::InvalidImage(
            "name cannot start with dash, dot or slash".to_string(),
        ));
    }

    Ok(())
}

/// Validate an ingress host name.
pub fn validate_host(host: &str) -> Result<(), ValidationError> {
    if host.is_empty() || host.len() > MAX_HOST_LENGTH {
        return Err(ValidationError::InvalidHost(host.to_string()));
    }

    let labels_ok = host
        .split('.')
        .all(|label| label.len() <= MAX_LABEL_LENGTH && host_label_regex().is_match(label));
    if !labels_ok {
        return Err(ValidationError::InvalidHost(host.to_string()));
    }

    Ok(())
}

fn validate_expose(service: &str, expose: &ManifestServiceExpose) -> Result<(), ValidationError> {
    if expose.port == 0 {
        return Err(ValidationError::InvalidPort {
            service: service.to_string(),
            port: expose.port,
        });
    }

    if !expose.service.is_empty() {
        validate_dns_label(&expose.service, "expose.service")?;
    }

    for host in &expose.hosts {
        validate_host(host)?;
    }

    Ok(())
}

fn validate_service(service: &ManifestService) -> Result<(), ValidationError> {
    validate_dns_label(&service.name, "service.name")?;
    validate_image(&service.image)?;

    for entry in &service.env {
        let key = entry.split_once('=').map(|(k, _)| k).unwrap_or("");
        if !env_key_regex().is_match(key) {
            return Err(ValidationError::InvalidEnv {
                service: service.name.clone(),
                entry: entry.clone(),
            });
        }
    }

    let mut targets: HashMap<(u16, Protocol), u16> = HashMap::new();
    for expose in &service.expose {
        validate_expose(&service.name, expose)?;

        let key = (expose.effective_port(), expose.proto);
        let target = *targets.entry(key).or_insert(expose.port);
        if target != expose.port {
            return Err(ValidationError::ConflictingExpose {
                service: service.name.clone(),
                port: key.0,
                proto: key.1,
            });
        }
    }

    Ok(())
}

impl ManifestGroup {
    /// Validate all services in the group.
    ///
    /// # Errors
    /// Returns a `ValidationError` for the first offending field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.len() > MAX_FIELD_LENGTH {
            return Err(ValidationError::MaxLengthExceeded {
                field: "group.name".to_string(),
                max: MAX_FIELD_LENGTH,
            });
        }

        let mut seen = HashSet::new();
        for service in &self.services {
            validate_service(service)?;
            if !seen.insert(service.name.as_str()) {
                return Err(ValidationError::DuplicateService(service.name.clone()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod tests;
