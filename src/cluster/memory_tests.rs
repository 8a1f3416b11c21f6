// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tests for the in-process cluster backend.

use super::*;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

fn namespace(name: &str, labels: &[(&str, &str)]) -> Namespace {
    let labels: BTreeMap<String, String> = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    Namespace {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: if labels.is_empty() { None } else { Some(labels) },
            ..Default::default()
        },
        ..Default::default()
    }
}

fn service(name: &str) -> Service {
    Service {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn names(page: &NamespacePage) -> Vec<String> {
    page.items
        .iter()
        .filter_map(|ns| ns.metadata.name.clone())
        .collect()
}

#[tokio::test]
async fn test_namespaced_apply_requires_namespace() {
    let cluster = MemoryCluster::new();
    let err = cluster.apply_service("missing", &service("web")).await.unwrap_err();
    assert_eq!(
        err,
        ClusterError::NotFound {
            kind: ObjectKind::Namespace,
            name: "missing".to_string()
        }
    );
    assert!(cluster.journal().is_empty());
}

#[tokio::test]
async fn test_apply_without_name_is_rejected() {
    let cluster = MemoryCluster::new();
    let err = cluster.apply_namespace(&Namespace::default()).await.unwrap_err();
    assert!(matches!(err, ClusterError::Rejected { kind: ObjectKind::Namespace, .. }));
}

#[tokio::test]
async fn test_delete_cascades() {
    let cluster = MemoryCluster::new();
    cluster.apply_namespace(&namespace("ns1", &[])).await.unwrap();
    cluster.apply_service("ns1", &service("web")).await.unwrap();
    assert_eq!(cluster.object_count("ns1", ObjectKind::Service), 1);

    cluster.delete_namespace("ns1").await.unwrap();
    assert!(cluster.namespace("ns1").is_none());
    assert!(cluster.service("ns1", "web").is_none());
    assert_eq!(cluster.object_count("ns1", ObjectKind::Service), 0);

    // Re-creating the namespace does not resurrect its old contents.
    cluster.apply_namespace(&namespace("ns1", &[])).await.unwrap();
    assert!(cluster.service("ns1", "web").is_none());
}

#[tokio::test]
async fn test_delete_missing_namespace() {
    let cluster = MemoryCluster::new();
    let err = cluster.delete_namespace("ghost").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_journal_records_order() {
    let cluster = MemoryCluster::new();
    cluster.apply_namespace(&namespace("ns1", &[])).await.unwrap();
    cluster.apply_service("ns1", &service("a")).await.unwrap();
    cluster.apply_service("ns1", &service("a")).await.unwrap();
    cluster.delete_namespace("ns1").await.unwrap();

    let ops: Vec<(JournalOp, ObjectKind, String)> = cluster
        .journal()
        .into_iter()
        .map(|e| (e.op, e.kind, e.name))
        .collect();
    assert_eq!(
        ops,
        vec![
            (JournalOp::Apply, ObjectKind::Namespace, "ns1".to_string()),
            (JournalOp::Apply, ObjectKind::Service, "a".to_string()),
            (JournalOp::Apply, ObjectKind::Service, "a".to_string()),
            (JournalOp::Delete, ObjectKind::Namespace, "ns1".to_string()),
        ]
    );

    cluster.clear_journal();
    assert!(cluster.journal().is_empty());
}

#[tokio::test]
async fn test_label_selector_filters() {
    let cluster = MemoryCluster::new();
    cluster.apply_namespace(&namespace("a", &[("managed", "true")])).await.unwrap();
    cluster.apply_namespace(&namespace("b", &[("managed", "false")])).await.unwrap();
    cluster.apply_namespace(&namespace("c", &[])).await.unwrap();

    let query = |selector: &str| ListQuery {
        label_selector: Some(selector.to_string()),
        ..Default::default()
    };

    let page = cluster.list_namespaces(&query("managed=true")).await.unwrap();
    assert_eq!(names(&page), vec!["a"]);

    let page = cluster.list_namespaces(&query("managed")).await.unwrap();
    assert_eq!(names(&page), vec!["a", "b"]);

    let page = cluster.list_namespaces(&query("!managed")).await.unwrap();
    assert_eq!(names(&page), vec!["c"]);

    let page = cluster.list_namespaces(&query("managed!=true")).await.unwrap();
    assert_eq!(names(&page), vec!["b", "c"]);

    let page = cluster.list_namespaces(&ListQuery::default()).await.unwrap();
    assert_eq!(names(&page), vec!["a", "b", "c"]);
    assert!(page.continue_token.is_none());
}

#[tokio::test]
async fn test_invalid_selector_is_rejected() {
    let cluster = MemoryCluster::new();
    let query = ListQuery {
        label_selector: Some("=true".to_string()),
        ..Default::default()
    };
    assert!(cluster.list_namespaces(&query).await.is_err());
}

#[tokio::test]
async fn test_paging_with_continue_token() {
    let cluster = MemoryCluster::new();
    for name in ["n1", "n2", "n3", "n4", "n5"] {
        cluster.apply_namespace(&namespace(name, &[("managed", "true")])).await.unwrap();
    }

    let mut query = ListQuery {
        label_selector: Some("managed=true".to_string()),
        limit: Some(2),
        continue_token: None,
    };

    let mut pages = Vec::new();
    loop {
        let page = cluster.list_namespaces(&query).await.unwrap();
        pages.push(names(&page));
        match page.continue_token {
            Some(token) => query.continue_token = Some(token),
            None => break,
        }
    }

    assert_eq!(
        pages,
        vec![
            vec!["n1".to_string(), "n2".to_string()],
            vec!["n3".to_string(), "n4".to_string()],
            vec!["n5".to_string()],
        ]
    );
}

#[tokio::test]
async fn test_exact_page_has_no_continue_token() {
    let cluster = MemoryCluster::new();
    cluster.apply_namespace(&namespace("n1", &[])).await.unwrap();
    cluster.apply_namespace(&namespace("n2", &[])).await.unwrap();

    let query = ListQuery {
        limit: Some(2),
        ..Default::default()
    };
    let page = cluster.list_namespaces(&query).await.unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(page.continue_token.is_none());
}
