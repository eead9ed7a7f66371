// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use contentflow_config::{ContentFlowConfig, StoreBackend, load_config};
use serde_json::{Value, json};

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};

const REDACTED: &str = "***";

/// Validates the configuration file and prints a summary.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    if !config_path.exists() {
        return Err(BinError::config(format!(
            "Configuration file not found: {}",
            config_path.display()
        )));
    }

    let config = load_config(config_path)
        .map_err(|e| BinError::from(e).with_context("Configuration validation failed"))?;
    let warnings = collect_warnings(&config);

    let report = json!({
        "valid": true,
        "config_path": config_path.display().to_string(),
        "summary": summary(&config),
        "warnings": warnings,
        "config": if args.show_config { Some(redacted(&config)?) } else { None },
    });

    match args.format {
        OutputFormat::Text => print_text(&report, &warnings),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report)
                .map_err(|e| BinError::runtime(e.to_string()))?
        ),
        OutputFormat::Yaml => print!(
            "{}",
            serde_yaml::to_string(&report).map_err(|e| BinError::runtime(e.to_string()))?
        ),
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::config(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

fn summary(config: &ContentFlowConfig) -> Value {
    json!({
        "api_address": config.api.socket_addr().to_string(),
        "jwt_issuer": config.jwt.issuer,
        "jwt_audience": config.jwt.audience,
        "public_paths": config.jwt.public_paths,
        "store_backend": config.store.backend.as_str(),
        "log_level": config.logging.level.as_str(),
        "log_format": config.logging.format.as_str(),
    })
}

/// Things that load fine but are probably mistakes.
pub(crate) fn collect_warnings(config: &ContentFlowConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if config.store.backend == StoreBackend::Memory && config.store.seed_path.is_none() {
        warnings.push("Memory store has no seed file; every token will fail user lookup".into());
    }
    if let Some(seed) = &config.store.seed_path {
        if config.store.backend == StoreBackend::Memory && !seed.exists() {
            warnings.push(format!("Seed file does not exist: {}", seed.display()));
        }
    }

    let cors = &config.api.cors;
    if cors.allow_credentials && cors.allowed_origins.iter().any(|o| o == "*") {
        warnings.push("CORS credentials are ignored with a wildcard origin".into());
    }

    if !config.jwt.public_paths.iter().any(|p| p == "/health") {
        warnings.push("/health is not a public path; probes will need a token".into());
    }
    if config.jwt.audience.is_none() {
        warnings.push("jwt.audience is not set; tokens for any audience are accepted".into());
    }

    warnings
}

fn redacted(config: &ContentFlowConfig) -> BinResult<Value> {
    let mut value = serde_json::to_value(config).map_err(|e| BinError::runtime(e.to_string()))?;
    for pointer in ["/jwt/secret", "/store/service_key"] {
        if let Some(field) = value.pointer_mut(pointer) {
            if !field.is_null() {
                *field = Value::from(REDACTED);
            }
        }
    }
    Ok(value)
}

fn print_text(report: &Value, warnings: &[String]) {
    println!("✓ Configuration is valid: {}", report["config_path"].as_str().unwrap_or(""));
    println!();
    println!("Summary:");
    if let Some(summary) = report["summary"].as_object() {
        for (key, value) in summary {
            println!("  {:<15} {}", format!("{}:", key), value);
        }
    }

    if !warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in warnings {
            println!("  ⚠ {}", warning);
        }
    }

    if !report["config"].is_null() {
        println!();
        println!("Parsed configuration:");
        println!(
            "{}",
            serde_json::to_string_pretty(&report["config"])
                .unwrap_or_else(|_| "(serialization error)".to_string())
        );
    }
}
