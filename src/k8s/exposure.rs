// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Exposure policy: which declared ports get an ingress rule.
//!
//! Only global exposures whose effective external port is 80 are routed
//! through the shared ingress layer. Everything else stays reachable through
//! the cluster-internal Service object only.

use crate::lease::{ManifestServiceExpose, HTTP_PORT};

/// Whether an exposure warrants an externally routable ingress rule.
pub fn should_expose(expose: &ManifestServiceExpose) -> bool {
    expose.global && expose.effective_port() == HTTP_PORT
}

#[cfg(test)]
#[path = "exposure_tests.rs"]
mod tests;
