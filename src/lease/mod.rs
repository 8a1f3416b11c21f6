// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lease identifiers and manifest groups.

pub mod types;
pub mod validation;

pub use types::{
    Deployment, LeaseId, LeaseIdParseError, ManifestGroup, ManifestService,
    ManifestServiceExpose, Protocol, ResourceUnit, HTTP_PORT,
};
pub use validation::ValidationError;
