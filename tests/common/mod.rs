// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Service};
use k8s_openapi::api::networking::v1::Ingress;
use parking_lot::Mutex;
use tracing::Span;

use lease_kube::cluster::{ClusterApi, ListQuery, MemoryCluster, NamespacePage};
use lease_kube::k8s::{ObjectKind, Workload};
use lease_kube::lease::{ManifestService, ManifestServiceExpose, Protocol, ResourceUnit};
use lease_kube::{ClientOptions, ClusterError, LeaseClient, LeaseId, ManifestGroup};

pub fn lease(dseq: u64) -> LeaseId {
    LeaseId::new("tenant1", dseq, 1, 1, "provider1")
}

pub fn expose(port: u16, global: bool) -> ManifestServiceExpose {
    ManifestServiceExpose {
        port,
        external_port: 0,
        proto: Protocol::Tcp,
        service: String::new(),
        global,
        hosts: vec![],
    }
}

pub fn service(name: &str, expose: Vec<ManifestServiceExpose>) -> ManifestService {
    ManifestService {
        name: name.to_string(),
        image: "nginx:1.25".to_string(),
        args: vec![],
        env: vec!["MODE=test".to_string()],
        unit: ResourceUnit {
            cpu: 100,
            memory: 64 << 20,
            disk: 128 << 20,
        },
        count: 1,
        expose,
    }
}

/// Service A without exposures, service B with two global HTTP exposures.
pub fn two_service_group() -> ManifestGroup {
    ManifestGroup {
        name: "web".to_string(),
        services: vec![
            service("a", vec![]),
            service("b", vec![expose(80, true), expose(80, true)]),
        ],
    }
}

pub fn client_for(cluster: Arc<dyn ClusterApi>, page_size: u32) -> LeaseClient {
    let options = ClientOptions {
        page_size,
        ..Default::default()
    };
    LeaseClient::new(cluster, options, Span::none())
}

/// Which call a [`FaultyCluster`] should fail.
#[derive(Debug, Clone)]
pub enum Fault {
    /// Reject the `nth` (zero-based) apply of `kind`.
    RejectApply { kind: ObjectKind, nth: usize },
    /// Every call reports the cluster as unreachable.
    Unavailable,
    /// Namespace deletion is rejected.
    RejectDelete,
}

/// [`MemoryCluster`] wrapper that injects a single kind of failure.
pub struct FaultyCluster {
    pub inner: Arc<MemoryCluster>,
    fault: Mutex<Option<Fault>>,
    applies: Mutex<Vec<ObjectKind>>,
    lists: AtomicUsize,
}

impl FaultyCluster {
    pub fn new(inner: Arc<MemoryCluster>, fault: Fault) -> Self {
        Self::with_fault(inner, Some(fault))
    }

    /// Pass-through wrapper that only counts calls.
    pub fn healthy(inner: Arc<MemoryCluster>) -> Self {
        Self::with_fault(inner, None)
    }

    fn with_fault(inner: Arc<MemoryCluster>, fault: Option<Fault>) -> Self {
        Self {
            inner,
            fault: Mutex::new(fault),
            applies: Mutex::new(Vec::new()),
            lists: AtomicUsize::new(0),
        }
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        *self.fault.lock() = None;
    }

    /// Number of list calls seen.
    pub fn list_calls(&self) -> usize {
        self.lists.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), ClusterError> {
        match &*self.fault.lock() {
            Some(Fault::Unavailable) => Err(ClusterError::Unavailable("connection refused".to_string())),
            _ => Ok(()),
        }
    }

    fn check_apply(&self, kind: ObjectKind, name: Option<&String>) -> Result<(), ClusterError> {
        self.check_available()?;
        let mut applies = self.applies.lock();
        let seen = applies.iter().filter(|k| **k == kind).count();
        applies.push(kind);
        match &*self.fault.lock() {
            Some(Fault::RejectApply { kind: k, nth }) if *k == kind && *nth == seen => {
                Err(ClusterError::Rejected {
                    kind,
                    name: name.cloned().unwrap_or_default(),
                    reason: "admission webhook denied the request".to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl ClusterApi for FaultyCluster {
    async fn list_namespaces(&self, query: &ListQuery) -> Result<NamespacePage, ClusterError> {
        self.lists.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.inner.list_namespaces(query).await
    }

    async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>, ClusterError> {
        self.check_available()?;
        self.inner.get_namespace(name).await
    }

    async fn apply_namespace(&self, namespace: &Namespace) -> Result<(), ClusterError> {
        self.check_apply(ObjectKind::Namespace, namespace.metadata.name.as_ref())?;
        self.inner.apply_namespace(namespace).await
    }

    async fn apply_workload(&self, namespace: &str, workload: &Workload) -> Result<(), ClusterError> {
        self.check_apply(ObjectKind::Workload, workload.metadata.name.as_ref())?;
        self.inner.apply_workload(namespace, workload).await
    }

    async fn apply_service(&self, namespace: &str, service: &Service) -> Result<(), ClusterError> {
        self.check_apply(ObjectKind::Service, service.metadata.name.as_ref())?;
        self.inner.apply_service(namespace, service).await
    }

    async fn apply_ingress(&self, namespace: &str, ingress: &Ingress) -> Result<(), ClusterError> {
        self.check_apply(ObjectKind::Ingress, ingress.metadata.name.as_ref())?;
        self.inner.apply_ingress(namespace, ingress).await
    }

    async fn delete_namespace(&self, name: &str) -> Result<(), ClusterError> {
        self.check_available()?;
        if matches!(&*self.fault.lock(), Some(Fault::RejectDelete)) {
            return Err(ClusterError::Rejected {
                kind: ObjectKind::Namespace,
                name: name.to_string(),
                reason: "forbidden by policy".to_string(),
            });
        }
        self.inner.delete_namespace(name).await
    }
}
