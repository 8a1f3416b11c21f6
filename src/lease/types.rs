// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lease and manifest data model.
//!
//! These types arrive already signed and accepted upstream. They are
//! serialized verbatim into namespace annotations, so every field must
//! survive a JSON round trip unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Port whose global exposures are routed through the shared ingress layer.
pub const HTTP_PORT: u16 = 80;

/// Identifies one accepted order: tenant, deployment sequence, group and
/// order indices, and the provider that won it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LeaseId {
    /// Tenant account that owns the deployment.
    pub owner: String,
    /// Deployment sequence number.
    pub dseq: u64,
    /// Group index within the deployment.
    pub gseq: u32,
    /// Order index within the group.
    pub oseq: u32,
    /// Provider account that accepted the order.
    pub provider: String,
}

impl LeaseId {
    pub fn new(
        owner: impl Into<String>,
        dseq: u64,
        gseq: u32,
        oseq: u32,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            dseq,
            gseq,
            oseq,
            provider: provider.into(),
        }
    }
}

impl fmt::Display for LeaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}/{}",
            self.owner, self.dseq, self.gseq, self.oseq, self.provider
        )
    }
}

/// Error parsing the `owner/dseq/gseq/oseq/provider` text form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LeaseIdParseError {
    #[error("Lease id must have 5 '/'-separated parts, got {0}")]
    WrongPartCount(usize),
    #[error("Lease id field '{field}' is empty")]
    EmptyField { field: &'static str },
    #[error("Lease id field '{field}' is not a number: {value}")]
    InvalidNumber { field: &'static str, value: String },
}

impl FromStr for LeaseId {
    type Err = LeaseIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        if parts.len() != 5 {
            return Err(LeaseIdParseError::WrongPartCount(parts.len()));
        }

        let owner = non_empty(parts[0], "owner")?;
        let provider = non_empty(parts[4], "provider")?;

        Ok(Self {
            owner: owner.to_string(),
            dseq: parse_number(parts[1], "dseq")?,
            gseq: parse_number(parts[2], "gseq")?,
            oseq: parse_number(parts[3], "oseq")?,
            provider: provider.to_string(),
        })
    }
}

fn non_empty<'a>(value: &'a str, field: &'static str) -> Result<&'a str, LeaseIdParseError> {
    if value.is_empty() {
        return Err(LeaseIdParseError::EmptyField { field });
    }
    Ok(value)
}

fn parse_number<T: FromStr>(value: &str, field: &'static str) -> Result<T, LeaseIdParseError> {
    non_empty(value, field)?
        .parse()
        .map_err(|_| LeaseIdParseError::InvalidNumber {
            field,
            value: value.to_string(),
        })
}

/// Full desired state for one lease: its services in manifest order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManifestGroup {
    pub name: String,
    #[serde(default)]
    pub services: Vec<ManifestService>,
}

impl ManifestGroup {
    /// Look up a service by name.
    pub fn service(&self, name: &str) -> Option<&ManifestService> {
        self.services.iter().find(|s| s.name == name)
    }
}

/// One service of a manifest group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestService {
    /// Service name, used for the workload, service and ingress objects.
    pub name: String,
    /// Container image reference.
    pub image: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Environment entries in `KEY=VALUE` form.
    #[serde(default)]
    pub env: Vec<String>,
    #[serde(default)]
    pub unit: ResourceUnit,
    /// Replica count.
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub expose: Vec<ManifestServiceExpose>,
}

fn default_count() -> u32 {
    1
}

/// Compute resources reserved for each replica.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceUnit {
    /// CPU in millicores.
    pub cpu: u32,
    /// Memory in bytes.
    pub memory: u64,
    /// Ephemeral disk in bytes.
    #[serde(default)]
    pub disk: u64,
}

/// Transport protocol of an exposed port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Protocol {
    #[default]
    Tcp,
    Udp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared intent to make a container port reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestServiceExpose {
    /// Container-internal port.
    pub port: u16,
    /// Port seen from outside the container; 0 means same as `port`.
    #[serde(default)]
    pub external_port: u16,
    #[serde(default)]
    pub proto: Protocol,
    /// Name of another service allowed to reach this port, if restricted.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub service: String,
    /// Whether the port should be routable from outside the cluster.
    #[serde(default)]
    pub global: bool,
    /// Virtual hosts served by the ingress rule for this exposure.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
}

impl ManifestServiceExpose {
    /// `external_port` if set, otherwise `port`.
    pub fn effective_port(&self) -> u16 {
        if self.external_port == 0 {
            self.port
        } else {
            self.external_port
        }
    }
}

impl fmt::Display for ManifestServiceExpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}/{}", self.effective_port(), self.port, self.proto)?;
        if self.global {
            f.write_str(" global")?;
        }
        Ok(())
    }
}

/// A live deployment as reconstructed from cluster metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub lease_id: LeaseId,
    pub group: ManifestGroup,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
