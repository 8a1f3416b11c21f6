// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Lease orchestration: deploy, discover and tear down lease workloads.
//!
//! Operations run strictly sequentially against the cluster. A deploy stops
//! at the first failed object and leaves what was already applied in place;
//! deploys are idempotent, so callers retry or tear down.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tracing::{debug, error, info, info_span, Instrument, Span};

use crate::cluster::{apply_object, ClusterApi, DeploymentStore, KubeCluster, NamespaceStore};
use crate::config::{ProviderConfig, DEFAULT_PAGE_SIZE};
use crate::error::{ClusterError, Error, Result};
use crate::k8s::{lease_namespace, plan, BuildSettings, ClusterObject, DeployStep, PlannedObject};
use crate::lease::{Deployment, LeaseId, ManifestGroup};

/// Tunables for a [`LeaseClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    /// Namespaces fetched per list request during discovery.
    pub page_size: u32,
    pub settings: BuildSettings,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            settings: BuildSettings::default(),
        }
    }
}

impl From<&ProviderConfig> for ClientOptions {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            page_size: config.list_page_size,
            settings: config.build_settings(),
        }
    }
}

/// Maps leases onto cluster objects through a [`ClusterApi`].
pub struct LeaseClient {
    cluster: Arc<dyn ClusterApi>,
    store: NamespaceStore,
    settings: BuildSettings,
    span: Span,
}

impl LeaseClient {
    /// Create a client. Every operation logs inside a child of `span`.
    pub fn new(cluster: Arc<dyn ClusterApi>, options: ClientOptions, span: Span) -> Self {
        Self {
            store: NamespaceStore::new(Arc::clone(&cluster), options.page_size),
            cluster,
            settings: options.settings,
            span,
        }
    }

    /// Connect to the cluster described by `config`.
    ///
    /// # Errors
    /// `Error::PlatformUnavailable` when configuration cannot be loaded or
    /// the API server does not answer.
    pub async fn connect(config: &ProviderConfig, span: Span) -> Result<Self> {
        let cluster = KubeCluster::connect(config)
            .instrument(span.clone())
            .await
            .map_err(|e| {
                span.in_scope(|| error!(error = %e, "Failed to connect to cluster"));
                e
            })?;
        Ok(Self::new(Arc::new(cluster), ClientOptions::from(config), span))
    }

    /// The ordered objects `deploy` would apply, without touching the cluster.
    pub fn render(&self, lid: &LeaseId, group: &ManifestGroup) -> Vec<PlannedObject> {
        plan(lid, group, &self.settings)
    }

    /// Apply every object of the lease, in plan order.
    ///
    /// # Errors
    /// - `Error::InvalidManifest` before anything is applied.
    /// - `Error::Apply` naming the first step that failed.
    pub async fn deploy(&self, lid: &LeaseId, group: &ManifestGroup) -> Result<()> {
        let namespace = lease_namespace(lid);
        let span = info_span!(parent: &self.span, "deploy", lease = %lid, namespace = %namespace);

        async move {
            let started = Instant::now();
            let result = self.apply_all(lid, group, &namespace).await;

            let outcome = if result.is_ok() { "ok" } else { "error" };
            counter!("lease_kube_deploy_total", "outcome" => outcome).increment(1);
            histogram!("lease_kube_deploy_seconds").record(started.elapsed().as_secs_f64());

            if result.is_ok() {
                info!(services = group.services.len(), "Lease deployed");
            }
            result
        }
        .instrument(span)
        .await
    }

    async fn apply_all(&self, lid: &LeaseId, group: &ManifestGroup, namespace: &str) -> Result<()> {
        if let Err(e) = group.validate() {
            error!(lease = %lid, error = %e, "Rejected invalid manifest group");
            return Err(Error::InvalidManifest(e));
        }

        for planned in self.render(lid, group) {
            let applied = match &planned.object {
                ClusterObject::Namespace(_) => self.store.put(lid, group).await,
                object => apply_object(self.cluster.as_ref(), namespace, object).await,
            };

            match applied {
                Ok(()) => debug!(step = %planned.step, "Applied"),
                Err(source) => {
                    log_apply_failure(lid, &planned.step, &source);
                    return Err(Error::Apply {
                        lease: lid.clone(),
                        step: planned.step,
                        source,
                    });
                }
            }
        }

        Ok(())
    }

    /// Every lease deployment found in the cluster.
    ///
    /// # Errors
    /// Fails as a whole if listing fails or any lease namespace has
    /// unreadable metadata.
    pub async fn deployments(&self) -> Result<Vec<Deployment>> {
        let span = info_span!(parent: &self.span, "deployments");

        async move {
            match self.store.list().await {
                Ok(found) => {
                    debug!(count = found.len(), "Listed lease deployments");
                    counter!("lease_kube_discovery_total", "outcome" => "ok").increment(1);
                    Ok(found)
                }
                Err(e) => {
                    match &e {
                        Error::Decode { namespace, source } => error!(
                            namespace = %namespace,
                            error = %source,
                            "Lease namespace has unreadable deployment metadata"
                        ),
                        other => error!(error = %other, "Failed to list lease namespaces"),
                    }
                    counter!("lease_kube_discovery_total", "outcome" => "error").increment(1);
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// The deployment recorded for one lease, if its namespace exists.
    pub async fn deployment(&self, lid: &LeaseId) -> Result<Option<Deployment>> {
        let span = info_span!(parent: &self.span, "deployment", lease = %lid);

        async move {
            self.store.get(lid).await.map_err(|e| {
                error!(lease = %lid, error = %e, "Failed to read lease deployment");
                e
            })
        }
        .instrument(span)
        .await
    }

    /// Delete the lease namespace and everything in it.
    ///
    /// A namespace that is already gone counts as success.
    pub async fn teardown(&self, lid: &LeaseId) -> Result<()> {
        let namespace = lease_namespace(lid);
        let span = info_span!(parent: &self.span, "teardown", lease = %lid, namespace = %namespace);

        async move {
            match self.cluster.delete_namespace(&namespace).await {
                Ok(()) => {
                    info!("Lease torn down");
                    counter!("lease_kube_teardown_total", "outcome" => "ok").increment(1);
                    Ok(())
                }
                Err(ClusterError::NotFound { .. }) => {
                    debug!("Lease namespace already absent");
                    counter!("lease_kube_teardown_total", "outcome" => "absent").increment(1);
                    Ok(())
                }
                Err(e) => {
                    error!(lease = %lid, error = %e, "Failed to delete lease namespace");
                    counter!("lease_kube_teardown_total", "outcome" => "error").increment(1);
                    Err(Error::Cluster(e))
                }
            }
        }
        .instrument(span)
        .await
    }
}

fn log_apply_failure(lid: &LeaseId, step: &DeployStep, source: &ClusterError) {
    match step {
        DeployStep::Ingress { index, port, .. } => error!(
            lease = %lid,
            service = step.service(),
            expose = *index,
            port = *port,
            error = %source,
            "Failed to apply ingress"
        ),
        _ => error!(
            lease = %lid,
            service = step.service(),
            step = %step,
            error = %source,
            "Failed to apply object"
        ),
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
