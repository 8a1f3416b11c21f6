// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! The four object kinds a lease is realized with.

use k8s_openapi::api::core::v1::{Namespace, Service};
use k8s_openapi::api::networking::v1::Ingress;
use serde::Serialize;

/// Workload object running one manifest service's containers.
pub type Workload = k8s_openapi::api::apps::v1::Deployment;

/// Kind of a lease-owned cluster object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ObjectKind {
    Namespace,
    Workload,
    Service,
    Ingress,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectKind::Namespace => "namespace",
            ObjectKind::Workload => "workload",
            ObjectKind::Service => "service",
            ObjectKind::Ingress => "ingress",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declarative object ready to be applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClusterObject {
    Namespace(Namespace),
    Workload(Workload),
    Service(Service),
    Ingress(Ingress),
}

impl ClusterObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            ClusterObject::Namespace(_) => ObjectKind::Namespace,
            ClusterObject::Workload(_) => ObjectKind::Workload,
            ClusterObject::Service(_) => ObjectKind::Service,
            ClusterObject::Ingress(_) => ObjectKind::Ingress,
        }
    }

    /// Object name; builders always set one.
    pub fn name(&self) -> &str {
        let name = match self {
            ClusterObject::Namespace(o) => &o.metadata.name,
            ClusterObject::Workload(o) => &o.metadata.name,
            ClusterObject::Service(o) => &o.metadata.name,
            ClusterObject::Ingress(o) => &o.metadata.name,
        };
        name.as_deref().unwrap_or_default()
    }
}
