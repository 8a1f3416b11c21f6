// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Cluster access: the capability trait, its backends and the
//! namespace-backed deployment store.

pub mod api;
pub mod kube_client;
pub mod memory;
pub mod store;

pub use api::{apply_object, ClusterApi, ListQuery, NamespacePage};
pub use kube_client::KubeCluster;
pub use memory::{JournalEntry, JournalOp, MemoryCluster};
pub use store::{DeploymentStore, NamespaceStore};
