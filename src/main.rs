// Copyright 2024-2026 lease-kube Contributors
// SPDX-License-Identifier: Apache-2.0

//! lease-kube entry point.
//!
//! Loads configuration, installs logging and dispatches the command.

mod cli_parser;
mod runtime_init;

use std::process::ExitCode;

use lease_kube::{telemetry, ProviderConfig};

use runtime_init::{EXIT_FAILURE, EXIT_USAGE};

#[tokio::main]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");
    let rest = args.get(2..).unwrap_or_default();

    match command {
        "help" | "--help" | "-h" => {
            if let Some(sub) = args.get(2) {
                cli_parser::print_command_help(sub);
            } else {
                cli_parser::print_usage();
            }
            ExitCode::SUCCESS
        }
        "version" | "--version" | "-V" => {
            println!("lease-kube {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        "namespace" => match rest {
            [lease] => runtime_init::run_namespace(lease),
            _ => usage_error("namespace", "Usage: lease-kube namespace <ID>"),
        },
        "config" => run_config_cmd(rest),
        "deploy" => match cli_parser::parse_deploy(rest) {
            Ok(parsed) => match init() {
                Ok(config) => {
                    runtime_init::run_deploy(&config, &parsed.lease, &parsed.manifest, parsed.dry_run)
                        .await
                }
                Err(code) => code,
            },
            Err(msg) => usage_error("deploy", &msg),
        },
        "teardown" => match cli_parser::parse_teardown(rest) {
            Ok(lease) => match init() {
                Ok(config) => runtime_init::run_teardown(&config, &lease).await,
                Err(code) => code,
            },
            Err(msg) => usage_error("teardown", &msg),
        },
        "list" => {
            let json = match rest {
                [] => false,
                [flag] if flag == "--json" => true,
                _ => return usage_error("list", "Usage: lease-kube list [--json]"),
            };
            match init() {
                Ok(config) => runtime_init::run_list(&config, json).await,
                Err(code) => code,
            }
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            cli_parser::print_usage();
            ExitCode::from(EXIT_USAGE)
        }
    }
}

/// Load configuration and install logging for commands that reach a cluster.
fn init() -> Result<ProviderConfig, ExitCode> {
    let config = runtime_init::load_config().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        ExitCode::from(EXIT_USAGE)
    })?;
    telemetry::init(config.log_format);
    Ok(config)
}

fn usage_error(command: &str, msg: &str) -> ExitCode {
    eprintln!("{}", msg);
    cli_parser::print_command_help(command);
    ExitCode::from(EXIT_USAGE)
}

fn run_config_cmd(args: &[String]) -> ExitCode {
    let sub = args.first().map(|s| s.as_str()).unwrap_or("show");
    match sub {
        "show" => match lease_kube::config::load().and_then(|config| config.to_toml()) {
            Ok(rendered) => {
                print!("{}", rendered);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                ExitCode::from(EXIT_USAGE)
            }
        },
        "defaults" => match ProviderConfig::default().to_toml() {
            Ok(rendered) => {
                print!("{}", rendered);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                ExitCode::from(EXIT_FAILURE)
            }
        },
        "validate" => match runtime_init::load_config() {
            Ok(_) => {
                println!("Configuration is valid");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                ExitCode::from(EXIT_USAGE)
            }
        },
        _ => {
            eprintln!("Unknown config subcommand: {}", sub);
            cli_parser::print_command_help("config");
            ExitCode::from(EXIT_USAGE)
        }
    }
}
