// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tests for the lease orchestrator against the in-process cluster.

use super::*;
use crate::cluster::{JournalOp, MemoryCluster};
use crate::k8s::ObjectKind;
use crate::lease::{ManifestService, ManifestServiceExpose, Protocol, ResourceUnit};

fn lid(dseq: u64) -> LeaseId {
    LeaseId::new("tenant1", dseq, 1, 1, "provider1")
}

fn service(name: &str, expose: Vec<ManifestServiceExpose>) -> ManifestService {
    ManifestService {
        name: name.to_string(),
        image: "nginx:1.25".to_string(),
        args: vec![],
        env: vec![],
        unit: ResourceUnit {
            cpu: 100,
            memory: 128 << 20,
            disk: 256 << 20,
        },
        count: 1,
        expose,
    }
}

fn global_http() -> ManifestServiceExpose {
    ManifestServiceExpose {
        port: 80,
        external_port: 0,
        proto: Protocol::Tcp,
        service: String::new(),
        global: true,
        hosts: vec![],
    }
}

fn group() -> ManifestGroup {
    ManifestGroup {
        name: "g1".to_string(),
        services: vec![service("a", vec![]), service("b", vec![global_http()])],
    }
}

fn client(cluster: &Arc<MemoryCluster>) -> LeaseClient {
    let cluster: Arc<dyn ClusterApi> = cluster.clone();
    LeaseClient::new(cluster, ClientOptions::default(), Span::none())
}

#[tokio::test]
async fn test_deploy_applies_in_plan_order() {
    let cluster = Arc::new(MemoryCluster::new());
    let client = client(&cluster);

    client.deploy(&lid(1), &group()).await.unwrap();

    let applied: Vec<(ObjectKind, String)> = cluster
        .journal()
        .into_iter()
        .map(|e| (e.kind, e.name))
        .collect();
    let ns = lease_namespace(&lid(1));
    assert_eq!(
        applied,
        vec![
            (ObjectKind::Namespace, ns),
            (ObjectKind::Workload, "a".to_string()),
            (ObjectKind::Workload, "b".to_string()),
            (ObjectKind::Service, "b".to_string()),
            (ObjectKind::Ingress, "b-0".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_render_matches_deploy() {
    let cluster = Arc::new(MemoryCluster::new());
    let client = client(&cluster);

    let rendered: Vec<(ObjectKind, String)> = client
        .render(&lid(1), &group())
        .iter()
        .map(|p| (p.object.kind(), p.object.name().to_string()))
        .collect();
    client.deploy(&lid(1), &group()).await.unwrap();
    let applied: Vec<(ObjectKind, String)> = cluster
        .journal()
        .into_iter()
        .map(|e| (e.kind, e.name))
        .collect();

    assert_eq!(rendered, applied);
}

#[tokio::test]
async fn test_invalid_manifest_applies_nothing() {
    let cluster = Arc::new(MemoryCluster::new());
    let client = client(&cluster);

    let mut bad = group();
    bad.services[1].name = "a".to_string();

    let err = client.deploy(&lid(1), &bad).await.unwrap_err();
    assert!(matches!(err, Error::InvalidManifest(_)));
    assert!(cluster.journal().is_empty());
}

#[tokio::test]
async fn test_deployment_lookup() {
    let cluster = Arc::new(MemoryCluster::new());
    let client = client(&cluster);

    assert!(client.deployment(&lid(1)).await.unwrap().is_none());

    client.deploy(&lid(1), &group()).await.unwrap();
    let found = client.deployment(&lid(1)).await.unwrap().unwrap();
    assert_eq!(found.lease_id, lid(1));
    assert_eq!(found.group, group());
}

#[tokio::test]
async fn test_deployments_lists_every_lease() {
    let cluster = Arc::new(MemoryCluster::new());
    let client = client(&cluster);

    client.deploy(&lid(1), &group()).await.unwrap();
    client.deploy(&lid(2), &group()).await.unwrap();

    let mut found: Vec<u64> = client
        .deployments()
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.lease_id.dseq)
        .collect();
    found.sort_unstable();
    assert_eq!(found, vec![1, 2]);
}

#[tokio::test]
async fn test_teardown_removes_namespace() {
    let cluster = Arc::new(MemoryCluster::new());
    let client = client(&cluster);

    client.deploy(&lid(1), &group()).await.unwrap();
    client.teardown(&lid(1)).await.unwrap();

    let ns = lease_namespace(&lid(1));
    assert!(cluster.namespace(&ns).is_none());
    assert_eq!(cluster.object_count(&ns, ObjectKind::Workload), 0);
    assert_eq!(cluster.journal().last().map(|e| e.op), Some(JournalOp::Delete));
}

#[tokio::test]
async fn test_teardown_of_unknown_lease_succeeds() {
    let cluster = Arc::new(MemoryCluster::new());
    let client = client(&cluster);

    client.teardown(&lid(42)).await.unwrap();
    assert!(cluster.journal().is_empty());
}

#[test]
fn test_options_from_config() {
    let config = ProviderConfig {
        list_page_size: 7,
        ingress_class: Some("nginx".to_string()),
        ..Default::default()
    };
    let options = ClientOptions::from(&config);
    assert_eq!(options.page_size, 7);
    assert_eq!(options.settings.ingress_class.as_deref(), Some("nginx"));
}
