// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Capability trait over the cluster API.
//!
//! The orchestrator only ever talks to a `dyn ClusterApi`, so the kube-rs
//! backend and the in-process backend are interchangeable.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Service};
use k8s_openapi::api::networking::v1::Ingress;

use crate::error::ClusterError;
use crate::k8s::{ClusterObject, Workload};

/// Namespace list request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Comma-separated `key=value` or `key` terms, all of which must match.
    pub label_selector: Option<String>,
    /// Maximum items per page; `None` returns everything.
    pub limit: Option<u32>,
    /// Token from the previous page.
    pub continue_token: Option<String>,
}

/// One page of a namespace listing.
#[derive(Debug, Clone, Default)]
pub struct NamespacePage {
    pub items: Vec<Namespace>,
    /// Set when more items remain.
    pub continue_token: Option<String>,
}

#[async_trait]
pub trait ClusterApi: Send + Sync {
    async fn list_namespaces(&self, query: &ListQuery) -> Result<NamespacePage, ClusterError>;

    /// Fetch a namespace by name; `Ok(None)` when absent.
    async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>, ClusterError>;

    /// Create or update a namespace.
    async fn apply_namespace(&self, namespace: &Namespace) -> Result<(), ClusterError>;

    async fn apply_workload(&self, namespace: &str, workload: &Workload) -> Result<(), ClusterError>;

    async fn apply_service(&self, namespace: &str, service: &Service) -> Result<(), ClusterError>;

    async fn apply_ingress(&self, namespace: &str, ingress: &Ingress) -> Result<(), ClusterError>;

    /// Delete a namespace and everything in it.
    ///
    /// Returns `ClusterError::NotFound` when the namespace does not exist.
    async fn delete_namespace(&self, name: &str) -> Result<(), ClusterError>;
}

/// Apply any planned object through the matching trait method.
pub async fn apply_object(
    cluster: &dyn ClusterApi,
    namespace: &str,
    object: &ClusterObject,
) -> Result<(), ClusterError> {
    match object {
        ClusterObject::Namespace(ns) => cluster.apply_namespace(ns).await,
        ClusterObject::Workload(w) => cluster.apply_workload(namespace, w).await,
        ClusterObject::Service(s) => cluster.apply_service(namespace, s).await,
        ClusterObject::Ingress(i) => cluster.apply_ingress(namespace, i).await,
    }
}
