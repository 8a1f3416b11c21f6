// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes object model for leases.
//!
//! Pure translation from a lease and its manifest group to namespace,
//! workload, service and ingress objects, plus the annotation codec that
//! lets a namespace describe the deployment it holds.

pub mod annotations;
pub mod builders;
pub mod exposure;
pub mod naming;
pub mod objects;
pub mod plan;

pub use annotations::DecodeError;
pub use builders::{build_ingress, build_namespace, build_service, build_workload, BuildSettings};
pub use exposure::should_expose;
pub use naming::{lease_namespace, managed_selector, MANAGED_LABEL};
pub use objects::{ClusterObject, ObjectKind, Workload};
pub use plan::{plan, DeployStep, PlannedObject};
