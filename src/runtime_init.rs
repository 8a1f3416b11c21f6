// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! Configuration loading, client setup and command bodies for lease-kube.

use std::path::Path;
use std::process::ExitCode;

use serde::Serialize;

use lease_kube::config::{self, ConfigError, ProviderConfig};
use lease_kube::k8s::{lease_namespace, plan};
use lease_kube::{Deployment, Error, LeaseClient, LeaseId, ManifestGroup};

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_USAGE: u8 = 2;
pub const EXIT_UNAVAILABLE: u8 = 3;

/// Load and validate configuration from the environment.
pub fn load_config() -> Result<ProviderConfig, ConfigError> {
    let config = config::load()?;
    config.validate()?;
    Ok(config)
}

/// Exit code for a library error.
pub fn exit_code(err: &Error) -> ExitCode {
    let code = match err {
        _ if err.is_unavailable() => EXIT_UNAVAILABLE,
        Error::InvalidManifest(_) | Error::Config(_) => EXIT_USAGE,
        _ => EXIT_FAILURE,
    };
    ExitCode::from(code)
}

pub fn parse_lease(raw: &str) -> Result<LeaseId, ExitCode> {
    raw.parse().map_err(|e| {
        eprintln!("Invalid lease id '{}': {}", raw, e);
        ExitCode::from(EXIT_USAGE)
    })
}

/// Read a manifest group; `.toml` files are TOML, everything else JSON.
pub fn read_manifest(path: &Path) -> Result<ManifestGroup, String> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let is_toml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&raw).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    } else {
        serde_json::from_str(&raw).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
    }
}

async fn connect(config: &ProviderConfig) -> Result<LeaseClient, ExitCode> {
    let span = tracing::info_span!("lease_client");
    LeaseClient::connect(config, span).await.map_err(|e| {
        eprintln!("Error: {}", e);
        exit_code(&e)
    })
}

pub async fn run_deploy(config: &ProviderConfig, raw_lease: &str, manifest: &Path, dry_run: bool) -> ExitCode {
    let lid = match parse_lease(raw_lease) {
        Ok(lid) => lid,
        Err(code) => return code,
    };
    let group = match read_manifest(manifest) {
        Ok(group) => group,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(EXIT_USAGE);
        }
    };

    if dry_run {
        if let Err(e) = group.validate() {
            eprintln!("Invalid manifest: {}", e);
            return ExitCode::from(EXIT_USAGE);
        }
        let objects = plan(&lid, &group, &config.build_settings());
        return print_json(&objects);
    }

    let client = match connect(config).await {
        Ok(client) => client,
        Err(code) => return code,
    };
    match client.deploy(&lid, &group).await {
        Ok(()) => {
            println!("Deployed {} to namespace {}", lid, lease_namespace(&lid));
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

pub async fn run_teardown(config: &ProviderConfig, raw_lease: &str) -> ExitCode {
    let lid = match parse_lease(raw_lease) {
        Ok(lid) => lid,
        Err(code) => return code,
    };
    let client = match connect(config).await {
        Ok(client) => client,
        Err(code) => return code,
    };
    match client.teardown(&lid).await {
        Ok(()) => {
            println!("Torn down {}", lid);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code(&e)
        }
    }
}

#[derive(Serialize)]
struct ListReport<'a> {
    generated_at: String,
    count: usize,
    deployments: Vec<ListEntry<'a>>,
}

#[derive(Serialize)]
struct ListEntry<'a> {
    lease: String,
    namespace: String,
    group: &'a str,
    services: Vec<&'a str>,
}

pub async fn run_list(config: &ProviderConfig, json: bool) -> ExitCode {
    let client = match connect(config).await {
        Ok(client) => client,
        Err(code) => return code,
    };
    let deployments = match client.deployments().await {
        Ok(found) => found,
        Err(e) => {
            eprintln!("Error: {}", e);
            return exit_code(&e);
        }
    };

    let entries: Vec<ListEntry<'_>> = deployments.iter().map(list_entry).collect();
    if json {
        return print_json(&ListReport {
            generated_at: chrono::Utc::now().to_rfc3339(),
            count: entries.len(),
            deployments: entries,
        });
    }

    if entries.is_empty() {
        println!("No lease deployments found");
        return ExitCode::SUCCESS;
    }
    println!("{:<40} {:<58} SERVICES", "LEASE", "NAMESPACE");
    for entry in entries {
        println!("{:<40} {:<58} {}", entry.lease, entry.namespace, entry.services.join(","));
    }
    ExitCode::SUCCESS
}

fn list_entry(deployment: &Deployment) -> ListEntry<'_> {
    ListEntry {
        lease: deployment.lease_id.to_string(),
        namespace: lease_namespace(&deployment.lease_id),
        group: &deployment.group.name,
        services: deployment.group.services.iter().map(|s| s.name.as_str()).collect(),
    }
}

pub fn run_namespace(raw_lease: &str) -> ExitCode {
    match parse_lease(raw_lease) {
        Ok(lid) => {
            println!("{}", lease_namespace(&lid));
            ExitCode::SUCCESS
        }
        Err(code) => code,
    }
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(out) => {
            println!("{}", out);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to serialize output: {}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
