// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing and help text for lease-kube.

use std::path::PathBuf;

/// Arguments of `lease-kube deploy`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployArgs {
    pub lease: String,
    pub manifest: PathBuf,
    pub dry_run: bool,
}

/// Parse `deploy` flags (everything after the command name).
pub fn parse_deploy(args: &[String]) -> Result<DeployArgs, String> {
    let mut lease = None;
    let mut manifest = None;
    let mut dry_run = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--lease" => {
                lease = Some(flag_value(args, i, "--lease")?);
                i += 2;
            }
            "--manifest" => {
                manifest = Some(PathBuf::from(flag_value(args, i, "--manifest")?));
                i += 2;
            }
            "--dry-run" => {
                dry_run = true;
                i += 1;
            }
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }

    match (lease, manifest) {
        (Some(lease), Some(manifest)) => Ok(DeployArgs {
            lease,
            manifest,
            dry_run,
        }),
        _ => Err("Usage: lease-kube deploy --lease <ID> --manifest <FILE> [--dry-run]".to_string()),
    }
}

/// Parse `teardown` flags.
pub fn parse_teardown(args: &[String]) -> Result<String, String> {
    match args {
        [flag, lease] if flag == "--lease" => Ok(lease.clone()),
        [] => Err("Usage: lease-kube teardown --lease <ID>".to_string()),
        [flag] if flag == "--lease" => Err("Missing value for --lease".to_string()),
        [other, ..] => Err(format!("Unknown argument: {}", other)),
    }
}

fn flag_value(args: &[String], i: usize, flag: &str) -> Result<String, String> {
    args.get(i + 1)
        .filter(|v| !v.starts_with("--"))
        .cloned()
        .ok_or_else(|| format!("Missing value for {}", flag))
}

/// Print general usage information.
pub fn print_usage() {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        "lease-kube - Lease to Kubernetes mapper v{}

USAGE:
    lease-kube <COMMAND> [OPTIONS]

COMMANDS:
    deploy       Deploy a lease's manifest group
    teardown     Remove every object of a lease
    list         List lease deployments found in the cluster
    namespace    Print the namespace name of a lease
    config       Manage configuration (show, defaults, validate)
    version      Show version information
    help         Show this help message

LEASE IDS:
    owner/dseq/gseq/oseq/provider

EXAMPLES:
    lease-kube deploy --lease tenant1/100/1/1/provider1 --manifest web.json
    lease-kube deploy --lease tenant1/100/1/1/provider1 --manifest web.toml --dry-run
    lease-kube teardown --lease tenant1/100/1/1/provider1
    lease-kube list --json
    lease-kube namespace tenant1/100/1/1/provider1

ENVIRONMENT:
    LEASE_KUBE_CONFIG          TOML configuration file
    LEASE_KUBE_KUBECONFIG      Kubeconfig file
    LEASE_KUBE_CONTEXT         Kubeconfig context
    LEASE_KUBE_FIELD_MANAGER   Server-side apply field manager
    LEASE_KUBE_PAGE_SIZE       Namespaces per list request
    LEASE_KUBE_INGRESS_DOMAIN  Domain for generated ingress hosts
    LEASE_KUBE_INGRESS_CLASS   Ingress class name
    LEASE_KUBE_LOG_FORMAT      Log format (text, json)
    RUST_LOG                   Log level (debug, info, warn, error)

EXIT CODES:
    0  Success
    1  Failure
    2  Configuration or usage error
    3  Cluster unavailable
",
        version
    );
}

/// Print detailed help for a specific command.
pub fn print_command_help(command: &str) {
    match command {
        "deploy" => print_deploy_help(),
        "teardown" => print_teardown_help(),
        "list" => print_list_help(),
        "namespace" => print_namespace_help(),
        "config" => print_config_help(),
        _ => {
            eprintln!(
                "No detailed help available for '{}'. Use 'lease-kube help' for general usage.",
                command
            );
        }
    }
}

fn print_deploy_help() {
    eprintln!(
        "lease-kube deploy - Deploy a lease

USAGE:
    lease-kube deploy --lease <ID> --manifest <FILE> [--dry-run]

OPTIONS:
    --lease <ID>       Lease id (owner/dseq/gseq/oseq/provider)
    --manifest <FILE>  Manifest group, JSON (.json) or TOML (.toml)
    --dry-run          Print the objects that would be applied as JSON

DESCRIPTION:
    Applies the lease namespace, then for each service its workload and,
    if it exposes ports, its service and ingresses. Stops at the first
    failure; objects already applied are kept. Re-running is safe.

EXIT CODES:
    0  Deployed
    1  An object was rejected
    2  Invalid manifest or arguments
    3  Cluster unavailable
"
    );
}

fn print_teardown_help() {
    eprintln!(
        "lease-kube teardown - Remove a lease

USAGE:
    lease-kube teardown --lease <ID>

DESCRIPTION:
    Deletes the lease namespace; the cluster removes everything inside it.
    Tearing down a lease that is not deployed succeeds.
"
    );
}

fn print_list_help() {
    eprintln!(
        "lease-kube list - List lease deployments

USAGE:
    lease-kube list [--json]

OPTIONS:
    --json  Output in JSON format
"
    );
}

fn print_namespace_help() {
    eprintln!(
        "lease-kube namespace - Print a lease's namespace

USAGE:
    lease-kube namespace <ID>
"
    );
}

fn print_config_help() {
    eprintln!(
        "lease-kube config - Manage configuration

USAGE:
    lease-kube config <SUBCOMMAND>

SUBCOMMANDS:
    show           Show current configuration
    validate       Validate configuration
    defaults       Show default configuration
"
    );
}
