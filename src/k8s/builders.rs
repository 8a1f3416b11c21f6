// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Builders for the cluster objects that realize a lease.
//!
//! Every builder is a pure function of its inputs. Output maps are
//! `BTreeMap`s, so the same inputs always serialize identically and
//! re-applying a built object is a no-op.

use std::collections::{BTreeMap, HashSet};

use k8s_openapi::api::apps::v1::DeploymentSpec;
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, Namespace, PodSpec, PodTemplateSpec, ResourceRequirements,
    Service, ServicePort, ServiceSpec,
};
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use super::annotations;
use super::naming::{lease_namespace, managed_labels, service_labels};
use super::objects::Workload;
use crate::lease::{LeaseId, ManifestGroup, ManifestService, ManifestServiceExpose, ResourceUnit};

/// Cluster-specific knobs that shape ingress objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSettings {
    /// Domain under which host-less exposures get a generated host.
    pub ingress_domain: Option<String>,
    /// `ingressClassName` set on every ingress.
    pub ingress_class: Option<String>,
}

/// Lease namespace, labelled for discovery and annotated with the manifest.
pub fn build_namespace(lid: &LeaseId, group: &ManifestGroup) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            name: Some(lease_namespace(lid)),
            labels: Some(managed_labels()),
            annotations: Some(annotations::encode(lid, group)),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Workload running one manifest service.
pub fn build_workload(lid: &LeaseId, _group: &ManifestGroup, service: &ManifestService) -> Workload {
    let labels = service_labels(&service.name);

    let container = Container {
        name: service.name.clone(),
        image: Some(service.image.clone()),
        args: non_empty(service.args.clone()),
        env: non_empty(service.env.iter().map(String::as_str).map(env_var).collect()),
        ports: non_empty(container_ports(service)),
        resources: Some(resource_requirements(&service.unit)),
        ..Default::default()
    };

    Workload {
        metadata: ObjectMeta {
            name: Some(service.name.clone()),
            namespace: Some(lease_namespace(lid)),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            replicas: Some(i32::try_from(service.count).unwrap_or(i32::MAX)),
            selector: LabelSelector {
                match_labels: Some(labels.clone()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Cluster-internal service fronting a workload's exposed ports.
pub fn build_service(lid: &LeaseId, _group: &ManifestGroup, service: &ManifestService) -> Service {
    let labels = service_labels(&service.name);

    let mut seen = HashSet::new();
    let ports: Vec<ServicePort> = service
        .expose
        .iter()
        .filter(|e| seen.insert((e.effective_port(), e.proto)))
        .map(|e| ServicePort {
            name: Some(port_name(e.effective_port(), e)),
            port: i32::from(e.effective_port()),
            target_port: Some(IntOrString::Int(i32::from(e.port))),
            protocol: Some(e.proto.as_str().to_string()),
            ..Default::default()
        })
        .collect();

    Service {
        metadata: ObjectMeta {
            name: Some(service.name.clone()),
            namespace: Some(lease_namespace(lid)),
            labels: Some(labels.clone()),
            ..Default::default()
        },
        spec: Some(ServiceSpec {
            type_: Some("ClusterIP".to_string()),
            selector: Some(labels),
            ports: Some(ports),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Name of the ingress built for the `index`-th exposure of a service.
pub fn ingress_name(service: &ManifestService, index: usize) -> String {
    format!("{}-{}", service.name, index)
}

/// Ingress routing one exposure's HTTP traffic to the service.
///
/// One rule per declared host. Without hosts, a host under
/// `settings.ingress_domain` is generated when configured; otherwise the
/// rule matches any host.
pub fn build_ingress(
    lid: &LeaseId,
    _group: &ManifestGroup,
    service: &ManifestService,
    expose: &ManifestServiceExpose,
    index: usize,
    settings: &BuildSettings,
) -> Ingress {
    let namespace = lease_namespace(lid);

    let backend = IngressBackend {
        service: Some(IngressServiceBackend {
            name: service.name.clone(),
            port: Some(ServiceBackendPort {
                number: Some(i32::from(expose.effective_port())),
                ..Default::default()
            }),
        }),
        ..Default::default()
    };

    let http = HTTPIngressRuleValue {
        paths: vec![HTTPIngressPath {
            path: Some("/".to_string()),
            path_type: "Prefix".to_string(),
            backend,
        }],
    };

    let hosts: Vec<Option<String>> = if !expose.hosts.is_empty() {
        expose.hosts.iter().cloned().map(Some).collect()
    } else if let Some(domain) = &settings.ingress_domain {
        vec![Some(format!("{}.{}.{}", service.name, namespace, domain))]
    } else {
        vec![None]
    };

    let rules = hosts
        .into_iter()
        .map(|host| IngressRule {
            host,
            http: Some(http.clone()),
        })
        .collect();

    Ingress {
        metadata: ObjectMeta {
            name: Some(ingress_name(service, index)),
            namespace: Some(namespace),
            labels: Some(service_labels(&service.name)),
            ..Default::default()
        },
        spec: Some(IngressSpec {
            ingress_class_name: settings.ingress_class.clone(),
            rules: Some(rules),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

fn env_var(entry: &str) -> EnvVar {
    match entry.split_once('=') {
        Some((name, value)) => EnvVar {
            name: name.to_string(),
            value: Some(value.to_string()),
            ..Default::default()
        },
        None => EnvVar {
            name: entry.to_string(),
            ..Default::default()
        },
    }
}

fn container_ports(service: &ManifestService) -> Vec<ContainerPort> {
    let mut seen = HashSet::new();
    service
        .expose
        .iter()
        .filter(|e| seen.insert((e.port, e.proto)))
        .map(|e| ContainerPort {
            container_port: i32::from(e.port),
            protocol: Some(e.proto.as_str().to_string()),
            ..Default::default()
        })
        .collect()
}

fn resource_requirements(unit: &ResourceUnit) -> ResourceRequirements {
    let mut quantities = BTreeMap::new();
    if unit.cpu > 0 {
        quantities.insert("cpu".to_string(), Quantity(format!("{}m", unit.cpu)));
    }
    if unit.memory > 0 {
        quantities.insert("memory".to_string(), Quantity(unit.memory.to_string()));
    }
    if unit.disk > 0 {
        quantities.insert(
            "ephemeral-storage".to_string(),
            Quantity(unit.disk.to_string()),
        );
    }

    ResourceRequirements {
        limits: Some(quantities.clone()),
        requests: Some(quantities),
        ..Default::default()
    }
}

// IANA service names: at most 15 chars and at least one letter.
fn port_name(port: u16, expose: &ManifestServiceExpose) -> String {
    format!("p{}-{}", port, expose.proto.as_str().to_ascii_lowercase())
}

#[cfg(test)]
#[path = "builders_tests.rs"]
mod tests;
