// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! lease-kube maps accepted compute leases onto Kubernetes.
//!
//! Each lease gets its own namespace holding one workload per manifest
//! service, a Service for services that expose ports, and an Ingress for
//! every global HTTP exposure. The namespace annotations carry the lease id
//! and manifest, so deployments are rediscovered from the cluster alone.

pub mod client;
pub mod cluster;
pub mod config;
pub mod error;
pub mod k8s;
pub mod lease;
pub mod telemetry;

pub use client::{ClientOptions, LeaseClient};
pub use cluster::{ClusterApi, DeploymentStore, KubeCluster, MemoryCluster, NamespaceStore};
pub use config::{LogFormat, ProviderConfig};
pub use error::{ClusterError, Error, Result};
pub use lease::{Deployment, LeaseId, ManifestGroup, ManifestService, ManifestServiceExpose};
