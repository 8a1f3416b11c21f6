// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for lease-kube.

use thiserror::Error;

use crate::config::ConfigError;
use crate::k8s::{DecodeError, DeployStep, ObjectKind};
use crate::lease::{LeaseId, ValidationError};

pub type Result<T> = std::result::Result<T, Error>;

/// Failure reported by a cluster backend for a single call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClusterError {
    #[error("cluster unavailable: {0}")]
    Unavailable(String),

    #[error("{kind} '{name}' rejected: {reason}")]
    Rejected {
        kind: ObjectKind,
        name: String,
        reason: String,
    },

    #[error("{kind} '{name}' not found")]
    NotFound { kind: ObjectKind, name: String },
}

impl ClusterError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClusterError::NotFound { .. })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("platform unavailable: {0}")]
    PlatformUnavailable(String),

    #[error("lease {lease}: applying {step} failed: {source}")]
    Apply {
        lease: LeaseId,
        step: DeployStep,
        #[source]
        source: ClusterError,
    },

    #[error("namespace '{namespace}' has unreadable deployment metadata: {source}")]
    Decode {
        namespace: String,
        #[source]
        source: DecodeError,
    },

    #[error(transparent)]
    Cluster(#[from] ClusterError),

    #[error("invalid manifest: {0}")]
    InvalidManifest(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// True when the platform could not be reached at all.
    pub fn is_unavailable(&self) -> bool {
        match self {
            Error::PlatformUnavailable(_) => true,
            Error::Apply { source, .. } | Error::Cluster(source) => {
                matches!(source, ClusterError::Unavailable(_))
            }
            _ => false,
        }
    }
}
