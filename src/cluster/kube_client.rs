// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! kube-rs backed [`ClusterApi`].
//!
//! Objects are written with server-side apply under a configured field
//! manager, so re-applying an unchanged object is a no-op on the server.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Service};
use k8s_openapi::api::networking::v1::Ingress;
use kube::api::{Api, DeleteParams, ListParams, Patch, PatchParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use serde::Serialize;

use super::api::{ClusterApi, ListQuery, NamespacePage};
use crate::config::ProviderConfig;
use crate::error::{ClusterError, Error, Result};
use crate::k8s::{ObjectKind, Workload};

/// Connection to a live cluster.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
    field_manager: String,
}

impl KubeCluster {
    /// Wrap an existing kube client.
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }

    /// Build a client from the configured kubeconfig (or inferred
    /// configuration) and verify the API server answers.
    pub async fn connect(config: &ProviderConfig) -> Result<Self> {
        let kube_config = load_kube_config(config).await?;
        let client = Client::try_from(kube_config)
            .map_err(|e| Error::PlatformUnavailable(format!("failed to build client: {}", e)))?;

        let cluster = Self::new(client, config.field_manager.clone());
        cluster.ping().await?;

        tracing::info!(
            field_manager = %cluster.field_manager,
            context = config.context.as_deref().unwrap_or("<current>"),
            "Connected to cluster"
        );
        Ok(cluster)
    }

    /// Cheapest authenticated call: list at most one namespace.
    pub async fn ping(&self) -> Result<()> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.list(&ListParams::default().limit(1))
            .await
            .map(|_| ())
            .map_err(|e| Error::PlatformUnavailable(e.to_string()))
    }

    async fn apply<K>(
        &self,
        api: Api<K>,
        kind: ObjectKind,
        name: Option<&String>,
        obj: &K,
    ) -> std::result::Result<(), ClusterError>
    where
        K: Clone + std::fmt::Debug + Serialize + serde::de::DeserializeOwned,
    {
        let name = name.cloned().unwrap_or_default();
        let params = PatchParams::apply(&self.field_manager).force();
        api.patch(&name, &params, &Patch::Apply(obj))
            .await
            .map(|_| ())
            .map_err(|e| map_error(e, kind, &name))
    }
}

async fn load_kube_config(config: &ProviderConfig) -> Result<Config> {
    let options = KubeConfigOptions {
        context: config.context.clone(),
        ..Default::default()
    };

    let loaded = match (&config.kubeconfig, &config.context) {
        (Some(path), _) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                Error::PlatformUnavailable(format!(
                    "failed to read kubeconfig {}: {}",
                    path.display(),
                    e
                ))
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &options)
                .await
                .map_err(|e| e.to_string())
        }
        (None, Some(_)) => Config::from_kubeconfig(&options)
            .await
            .map_err(|e| e.to_string()),
        (None, None) => Config::infer().await.map_err(|e| e.to_string()),
    };

    loaded.map_err(|e| Error::PlatformUnavailable(format!("failed to load kubeconfig: {}", e)))
}

fn map_error(err: kube::Error, kind: ObjectKind, name: &str) -> ClusterError {
    match err {
        kube::Error::Api(ae) if ae.code == 404 => ClusterError::NotFound {
            kind,
            name: name.to_string(),
        },
        kube::Error::Api(ae) if ae.code == 401 || ae.code == 403 => {
            ClusterError::Unavailable(format!("{} ({})", ae.message, ae.reason))
        }
        kube::Error::Api(ae) => ClusterError::Rejected {
            kind,
            name: name.to_string(),
            reason: format!("{}: {}", ae.reason, ae.message),
        },
        other => ClusterError::Unavailable(other.to_string()),
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn list_namespaces(&self, query: &ListQuery) -> std::result::Result<NamespacePage, ClusterError> {
        let api: Api<Namespace> = Api::all(self.client.clone());

        let mut params = ListParams::default();
        if let Some(selector) = &query.label_selector {
            params = params.labels(selector);
        }
        if let Some(limit) = query.limit {
            params = params.limit(limit);
        }
        if let Some(token) = &query.continue_token {
            params = params.continue_token(token);
        }

        let list = api
            .list(&params)
            .await
            .map_err(|e| map_error(e, ObjectKind::Namespace, ""))?;

        Ok(NamespacePage {
            continue_token: list.metadata.continue_.filter(|t| !t.is_empty()),
            items: list.items,
        })
    }

    async fn get_namespace(&self, name: &str) -> std::result::Result<Option<Namespace>, ClusterError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.get_opt(name)
            .await
            .map_err(|e| map_error(e, ObjectKind::Namespace, name))
    }

    async fn apply_namespace(&self, namespace: &Namespace) -> std::result::Result<(), ClusterError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        self.apply(api, ObjectKind::Namespace, namespace.metadata.name.as_ref(), namespace)
            .await
    }

    async fn apply_workload(&self, namespace: &str, workload: &Workload) -> std::result::Result<(), ClusterError> {
        let api: Api<Workload> = Api::namespaced(self.client.clone(), namespace);
        self.apply(api, ObjectKind::Workload, workload.metadata.name.as_ref(), workload)
            .await
    }

    async fn apply_service(&self, namespace: &str, service: &Service) -> std::result::Result<(), ClusterError> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        self.apply(api, ObjectKind::Service, service.metadata.name.as_ref(), service)
            .await
    }

    async fn apply_ingress(&self, namespace: &str, ingress: &Ingress) -> std::result::Result<(), ClusterError> {
        let api: Api<Ingress> = Api::namespaced(self.client.clone(), namespace);
        self.apply(api, ObjectKind::Ingress, ingress.metadata.name.as_ref(), ingress)
            .await
    }

    async fn delete_namespace(&self, name: &str) -> std::result::Result<(), ClusterError> {
        let api: Api<Namespace> = Api::all(self.client.clone());
        api.delete(name, &DeleteParams::background())
            .await
            .map(|_| ())
            .map_err(|e| map_error(e, ObjectKind::Namespace, name))
    }
}
