// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Ordered apply plan for a lease.
//!
//! The plan is the namespace, then for each service in manifest order its
//! workload and, when the service declares exposures, its Service object
//! followed by one ingress per exposure that passes the exposure policy.

use std::fmt;

use serde::Serialize;

use super::builders::{
    build_ingress, build_namespace, build_service, build_workload, BuildSettings,
};
use super::exposure::should_expose;
use super::objects::ClusterObject;
use crate::lease::{LeaseId, ManifestGroup};

/// One step of a deploy, naming what was being applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum DeployStep {
    Namespace,
    Workload { service: String },
    Service { service: String },
    Ingress {
        service: String,
        /// Position of the exposure in the service's expose list.
        index: usize,
        port: u16,
    },
}

impl DeployStep {
    /// Manifest service this step belongs to, if any.
    pub fn service(&self) -> Option<&str> {
        match self {
            DeployStep::Namespace => None,
            DeployStep::Workload { service }
            | DeployStep::Service { service }
            | DeployStep::Ingress { service, .. } => Some(service),
        }
    }
}

impl fmt::Display for DeployStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeployStep::Namespace => write!(f, "namespace"),
            DeployStep::Workload { service } => write!(f, "workload '{}'", service),
            DeployStep::Service { service } => write!(f, "service '{}'", service),
            DeployStep::Ingress {
                service,
                index,
                port,
            } => write!(f, "ingress for '{}' expose #{} (port {})", service, index, port),
        }
    }
}

/// An object paired with the step that applies it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedObject {
    #[serde(flatten)]
    pub step: DeployStep,
    pub object: ClusterObject,
}

/// Every object a deploy applies, in apply order.
pub fn plan(lid: &LeaseId, group: &ManifestGroup, settings: &BuildSettings) -> Vec<PlannedObject> {
    let mut steps = vec![PlannedObject {
        step: DeployStep::Namespace,
        object: ClusterObject::Namespace(build_namespace(lid, group)),
    }];

    for service in &group.services {
        steps.push(PlannedObject {
            step: DeployStep::Workload {
                service: service.name.clone(),
            },
            object: ClusterObject::Workload(build_workload(lid, group, service)),
        });

        if service.expose.is_empty() {
            continue;
        }

        steps.push(PlannedObject {
            step: DeployStep::Service {
                service: service.name.clone(),
            },
            object: ClusterObject::Service(build_service(lid, group, service)),
        });

        for (index, expose) in service.expose.iter().enumerate() {
            if !should_expose(expose) {
                continue;
            }
            steps.push(PlannedObject {
                step: DeployStep::Ingress {
                    service: service.name.clone(),
                    index,
                    port: expose.effective_port(),
                },
                object: ClusterObject::Ingress(build_ingress(
                    lid, group, service, expose, index, settings,
                )),
            });
        }
    }

    steps
}
