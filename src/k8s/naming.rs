// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Namespace naming and the labels that mark lease-managed objects.

use std::collections::BTreeMap;

use sha2::{Digest, Sha224};

use crate::lease::LeaseId;

/// Label present on every namespace (and pod) managed for a lease.
pub const MANAGED_LABEL: &str = "leasekube.io/managed";

/// Value of [`MANAGED_LABEL`].
pub const MANAGED_LABEL_VALUE: &str = "true";

/// Label naming the manifest service a workload belongs to.
pub const SERVICE_LABEL: &str = "leasekube.io/manifest-service";

/// Length of every lease namespace name.
pub const NAMESPACE_LENGTH: usize = 56;

/// Namespace name for a lease.
///
/// Lowercase hex SHA-224 over a length-prefixed encoding of every lease
/// field: 56 characters, always a valid RFC 1123 label. The encoding is
/// injective even when owner or provider contain separators, so distinct
/// leases only share a namespace on a SHA-224 collision.
pub fn lease_namespace(lid: &LeaseId) -> String {
    let mut hasher = Sha224::new();
    hasher.update((lid.owner.len() as u64).to_be_bytes());
    hasher.update(lid.owner.as_bytes());
    hasher.update(lid.dseq.to_be_bytes());
    hasher.update(lid.gseq.to_be_bytes());
    hasher.update(lid.oseq.to_be_bytes());
    hasher.update((lid.provider.len() as u64).to_be_bytes());
    hasher.update(lid.provider.as_bytes());
    hex::encode(hasher.finalize())
}

/// Label selector matching every lease-managed namespace.
pub fn managed_selector() -> String {
    format!("{}={}", MANAGED_LABEL, MANAGED_LABEL_VALUE)
}

/// Labels carried by the lease namespace.
pub fn managed_labels() -> BTreeMap<String, String> {
    BTreeMap::from([(MANAGED_LABEL.to_string(), MANAGED_LABEL_VALUE.to_string())])
}

/// Labels selecting the pods of one manifest service.
pub fn service_labels(service: &str) -> BTreeMap<String, String> {
    let mut labels = managed_labels();
    labels.insert(SERVICE_LABEL.to_string(), service.to_string());
    labels
}
