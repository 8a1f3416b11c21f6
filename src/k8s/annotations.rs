// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Namespace annotation codec.
//!
//! The lease namespace is the only durable record of a deployment: the lease
//! id and the full manifest group are stored as JSON annotations on it and
//! read back during discovery. A lease-labelled namespace whose annotations
//! are missing or unreadable means metadata was lost out-of-band, so decoding
//! reports it instead of skipping the namespace.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::lease::{Deployment, LeaseId, ManifestGroup};

/// Annotation holding the JSON-encoded manifest group.
pub const MANIFEST_GROUP_ANNOTATION: &str = "leasekube.io/manifest-group";

/// Annotation holding the JSON-encoded lease id.
pub const LEASE_ID_ANNOTATION: &str = "leasekube.io/lease-id";

/// Failure to rebuild deployment state from namespace annotations.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("annotation '{key}' is missing")]
    Missing { key: &'static str },

    #[error("annotation '{key}' is malformed: {source}")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Annotations storing a manifest group.
pub fn encode_group(group: &ManifestGroup) -> BTreeMap<String, String> {
    let mut annotations = BTreeMap::new();
    annotations.insert(MANIFEST_GROUP_ANNOTATION.to_string(), to_json(group));
    annotations
}

/// Read the manifest group back from namespace annotations.
pub fn decode_group(annotations: &BTreeMap<String, String>) -> Result<ManifestGroup, DecodeError> {
    decode_key(annotations, MANIFEST_GROUP_ANNOTATION)
}

/// Annotations storing both the lease id and its manifest group.
pub fn encode(lid: &LeaseId, group: &ManifestGroup) -> BTreeMap<String, String> {
    let mut annotations = encode_group(group);
    annotations.insert(LEASE_ID_ANNOTATION.to_string(), to_json(lid));
    annotations
}

/// Rebuild a deployment from namespace annotations.
pub fn decode(annotations: &BTreeMap<String, String>) -> Result<Deployment, DecodeError> {
    Ok(Deployment {
        lease_id: decode_key(annotations, LEASE_ID_ANNOTATION)?,
        group: decode_group(annotations)?,
    })
}

fn decode_key<T: serde::de::DeserializeOwned>(
    annotations: &BTreeMap<String, String>,
    key: &'static str,
) -> Result<T, DecodeError> {
    let raw = annotations.get(key).ok_or(DecodeError::Missing { key })?;
    serde_json::from_str(raw).map_err(|source| DecodeError::Malformed { key, source })
}

mod sealed {
    /// Values stored in annotations.
    ///
    /// Implemented only for plain-data types whose maps, if any, have string
    /// keys and whose `Serialize` impls are derived, so JSON encoding of an
    /// implementor never fails.
    pub trait Payload: serde::Serialize {}

    impl Payload for crate::lease::LeaseId {}
    impl Payload for crate::lease::ManifestGroup {}
}

fn to_json<T: sealed::Payload>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

#[cfg(test)]
#[path = "annotations_tests.rs"]
mod tests;
