// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! In-process cluster backend.
//!
//! Behaves like the API server for the calls lease-kube makes: namespaced
//! objects need their namespace, deleting a namespace removes everything in
//! it, listings honour label selectors and page with continue tokens. Every
//! mutating call is recorded in a journal so callers can check what was
//! applied and in which order.

use std::collections::BTreeMap;

use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Service};
use k8s_openapi::api::networking::v1::Ingress;
use parking_lot::Mutex;
use serde::Serialize;

use super::api::{ClusterApi, ListQuery, NamespacePage};
use crate::error::ClusterError;
use crate::k8s::{ObjectKind, Workload};

/// Mutating operation recorded in the journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalOp {
    Apply,
    Delete,
}

/// One journal record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalEntry {
    pub op: JournalOp,
    pub kind: ObjectKind,
    /// Owning namespace; the namespace's own name for namespace entries.
    pub namespace: String,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
struct NamespaceEntry {
    namespace: Namespace,
    workloads: BTreeMap<String, Workload>,
    services: BTreeMap<String, Service>,
    ingresses: BTreeMap<String, Ingress>,
}

#[derive(Debug, Default)]
struct State {
    namespaces: BTreeMap<String, NamespaceEntry>,
    journal: Vec<JournalEntry>,
}

/// [`ClusterApi`] kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryCluster {
    state: Mutex<State>,
}

impl MemoryCluster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every mutating call so far, oldest first.
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.state.lock().journal.clone()
    }

    pub fn clear_journal(&self) {
        self.state.lock().journal.clear();
    }

    /// Names of all namespaces, sorted.
    pub fn namespace_names(&self) -> Vec<String> {
        self.state.lock().namespaces.keys().cloned().collect()
    }

    pub fn namespace(&self, name: &str) -> Option<Namespace> {
        self.state
            .lock()
            .namespaces
            .get(name)
            .map(|e| e.namespace.clone())
    }

    pub fn workload(&self, namespace: &str, name: &str) -> Option<Workload> {
        self.state
            .lock()
            .namespaces
            .get(namespace)
            .and_then(|e| e.workloads.get(name).cloned())
    }

    pub fn service(&self, namespace: &str, name: &str) -> Option<Service> {
        self.state
            .lock()
            .namespaces
            .get(namespace)
            .and_then(|e| e.services.get(name).cloned())
    }

    pub fn ingress(&self, namespace: &str, name: &str) -> Option<Ingress> {
        self.state
            .lock()
            .namespaces
            .get(namespace)
            .and_then(|e| e.ingresses.get(name).cloned())
    }

    /// Number of namespaced objects of `kind` stored under `namespace`.
    pub fn object_count(&self, namespace: &str, kind: ObjectKind) -> usize {
        let state = self.state.lock();
        let Some(entry) = state.namespaces.get(namespace) else {
            return 0;
        };
        match kind {
            ObjectKind::Namespace => 1,
            ObjectKind::Workload => entry.workloads.len(),
            ObjectKind::Service => entry.services.len(),
            ObjectKind::Ingress => entry.ingresses.len(),
        }
    }

    fn apply_namespaced<F>(
        &self,
        kind: ObjectKind,
        namespace: &str,
        name: Option<&String>,
        insert: F,
    ) -> Result<(), ClusterError>
    where
        F: FnOnce(&mut NamespaceEntry, String),
    {
        let name = required_name(kind, name)?;
        let mut state = self.state.lock();
        let entry = state
            .namespaces
            .get_mut(namespace)
            .ok_or_else(|| ClusterError::NotFound {
                kind: ObjectKind::Namespace,
                name: namespace.to_string(),
            })?;
        insert(entry, name.clone());
        state.journal.push(JournalEntry {
            op: JournalOp::Apply,
            kind,
            namespace: namespace.to_string(),
            name,
        });
        Ok(())
    }
}

#[async_trait]
impl ClusterApi for MemoryCluster {
    async fn list_namespaces(&self, query: &ListQuery) -> Result<NamespacePage, ClusterError> {
        let selector = LabelSelector::parse(query.label_selector.as_deref().unwrap_or_default())?;
        let limit = query.limit.map(|l| l as usize).filter(|l| *l > 0);

        let state = self.state.lock();
        let mut matching = state
            .namespaces
            .iter()
            .filter(|(name, _)| match &query.continue_token {
                Some(token) => name.as_str() > token.as_str(),
                None => true,
            })
            .filter(|(_, e)| selector.matches(e.namespace.metadata.labels.as_ref()))
            .map(|(_, e)| e.namespace.clone());

        let items: Vec<Namespace> = match limit {
            Some(limit) => matching.by_ref().take(limit).collect(),
            None => matching.by_ref().collect(),
        };
        let continue_token = if matching.next().is_some() {
            items.last().and_then(|ns| ns.metadata.name.clone())
        } else {
            None
        };

        Ok(NamespacePage {
            items,
            continue_token,
        })
    }

    async fn get_namespace(&self, name: &str) -> Result<Option<Namespace>, ClusterError> {
        Ok(self.namespace(name))
    }

    async fn apply_namespace(&self, namespace: &Namespace) -> Result<(), ClusterError> {
        let name = required_name(ObjectKind::Namespace, namespace.metadata.name.as_ref())?;
        let mut state = self.state.lock();
        state
            .namespaces
            .entry(name.clone())
            .or_default()
            .namespace = namespace.clone();
        state.journal.push(JournalEntry {
            op: JournalOp::Apply,
            kind: ObjectKind::Namespace,
            namespace: name.clone(),
            name,
        });
        Ok(())
    }

    async fn apply_workload(&self, namespace: &str, workload: &Workload) -> Result<(), ClusterError> {
        self.apply_namespaced(
            ObjectKind::Workload,
            namespace,
            workload.metadata.name.as_ref(),
            |entry, name| {
                entry.workloads.insert(name, workload.clone());
            },
        )
    }

    async fn apply_service(&self, namespace: &str, service: &Service) -> Result<(), ClusterError> {
        self.apply_namespaced(
            ObjectKind::Service,
            namespace,
            service.metadata.name.as_ref(),
            |entry, name| {
                entry.services.insert(name, service.clone());
            },
        )
    }

    async fn apply_ingress(&self, namespace: &str, ingress: &Ingress) -> Result<(), ClusterError> {
        self.apply_namespaced(
            ObjectKind::Ingress,
            namespace,
            ingress.metadata.name.as_ref(),
            |entry, name| {
                entry.ingresses.insert(name, ingress.clone());
            },
        )
    }

    async fn delete_namespace(&self, name: &str) -> Result<(), ClusterError> {
        let mut state = self.state.lock();
        if state.namespaces.remove(name).is_none() {
            return Err(ClusterError::NotFound {
                kind: ObjectKind::Namespace,
                name: name.to_string(),
            });
        }
        state.journal.push(JournalEntry {
            op: JournalOp::Delete,
            kind: ObjectKind::Namespace,
            namespace: name.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }
}

fn required_name(kind: ObjectKind, name: Option<&String>) -> Result<String, ClusterError> {
    match name {
        Some(name) if !name.is_empty() => Ok(name.clone()),
        _ => Err(ClusterError::Rejected {
            kind,
            name: String::new(),
            reason: "metadata.name is required".to_string(),
        }),
    }
}

/// Equality-based label selector: `k=v`, `k!=v`, `k` and `!k` terms.
#[derive(Debug, Default)]
struct LabelSelector {
    terms: Vec<Term>,
}

#[derive(Debug)]
enum Term {
    Equals(String, String),
    NotEquals(String, String),
    Exists(String),
    Absent(String),
}

impl LabelSelector {
    fn parse(raw: &str) -> Result<Self, ClusterError> {
        let mut terms = Vec::new();
        for term in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let parsed = if let Some((k, v)) = term.split_once("!=") {
                Term::NotEquals(k.trim().to_string(), v.trim().to_string())
            } else if let Some((k, v)) = term.split_once("==").or_else(|| term.split_once('=')) {
                Term::Equals(k.trim().to_string(), v.trim().to_string())
            } else if let Some(k) = term.strip_prefix('!') {
                Term::Absent(k.trim().to_string())
            } else {
                Term::Exists(term.to_string())
            };

            let key = match &parsed {
                Term::Equals(k, _) | Term::NotEquals(k, _) | Term::Exists(k) | Term::Absent(k) => k,
            };
            if key.is_empty() {
                return Err(ClusterError::Rejected {
                    kind: ObjectKind::Namespace,
                    name: String::new(),
                    reason: format!("invalid label selector term '{}'", term),
                });
            }
            terms.push(parsed);
        }
        Ok(Self { terms })
    }

    fn matches(&self, labels: Option<&BTreeMap<String, String>>) -> bool {
        let get = |key: &str| labels.and_then(|l| l.get(key));
        self.terms.iter().all(|term| match term {
            Term::Equals(k, v) => get(k.as_str()) == Some(v),
            Term::NotEquals(k, v) => get(k.as_str()) != Some(v),
            Term::Exists(k) => get(k.as_str()).is_some(),
            Term::Absent(k) => get(k.as_str()).is_none(),
        })
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
