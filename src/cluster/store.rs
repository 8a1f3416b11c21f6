// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Deployment records kept in namespace metadata.
//!
//! There is no side database: a deployment exists exactly when its
//! lease-labelled namespace exists, and its manifest is read back from the
//! namespace annotations.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Namespace;

use super::api::{ClusterApi, ListQuery};
use crate::error::{ClusterError, Error, Result};
use crate::k8s::{annotations, build_namespace, lease_namespace, managed_selector};
use crate::lease::{Deployment, LeaseId, ManifestGroup};

/// Get/list/put access to deployment records.
#[async_trait]
pub trait DeploymentStore: Send + Sync {
    /// Record for one lease; `Ok(None)` when the lease has no namespace.
    async fn get(&self, lid: &LeaseId) -> Result<Option<Deployment>>;

    /// Every recorded deployment. Fails if any record is unreadable.
    async fn list(&self) -> Result<Vec<Deployment>>;

    /// Create or replace the record for a lease.
    async fn put(&self, lid: &LeaseId, group: &ManifestGroup) -> std::result::Result<(), ClusterError>;
}

/// [`DeploymentStore`] backed by lease namespaces.
pub struct NamespaceStore {
    cluster: Arc<dyn ClusterApi>,
    page_size: u32,
}

impl NamespaceStore {
    pub fn new(cluster: Arc<dyn ClusterApi>, page_size: u32) -> Self {
        Self {
            cluster,
            page_size: page_size.max(1),
        }
    }
}

#[async_trait]
impl DeploymentStore for NamespaceStore {
    async fn get(&self, lid: &LeaseId) -> Result<Option<Deployment>> {
        match self.cluster.get_namespace(&lease_namespace(lid)).await? {
            Some(ns) => decode_namespace(&ns).map(Some),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Deployment>> {
        let mut query = ListQuery {
            label_selector: Some(managed_selector()),
            limit: Some(self.page_size),
            continue_token: None,
        };

        let mut deployments = Vec::new();
        loop {
            let page = self.cluster.list_namespaces(&query).await?;
            for ns in &page.items {
                deployments.push(decode_namespace(ns)?);
            }
            match page.continue_token {
                Some(token) if !token.is_empty() => query.continue_token = Some(token),
                _ => break,
            }
        }

        Ok(deployments)
    }

    async fn put(&self, lid: &LeaseId, group: &ManifestGroup) -> std::result::Result<(), ClusterError> {
        self.cluster.apply_namespace(&build_namespace(lid, group)).await
    }
}

fn decode_namespace(ns: &Namespace) -> Result<Deployment> {
    let empty = BTreeMap::new();
    let metadata = ns.metadata.annotations.as_ref().unwrap_or(&empty);
    annotations::decode(metadata).map_err(|source| Error::Decode {
        namespace: ns.metadata.name.clone().unwrap_or_default(),
        source,
    })
}
