// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gitops_e2e::bootstrap::CommandLineFlux;
use gitops_e2e::config::Config;
use gitops_e2e::kubernetes::TlsConnector;
use gitops_e2e::orchestrator::Orchestrator;
use gitops_e2e::provision::Terraform;
use gitops_e2e::secrets::{vault_base_url, AzureCliCredential, KeyVaultClient};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting Flux on AKS end-to-end run");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: terraform_dir={}, git_url={}, scenarios={}",
        config.terraform_dir.display(),
        config.git_url,
        config.scenarios.len()
    );

    let provisioner = Terraform::new(
        config.terraform_bin.clone(),
        config.terraform_dir.clone(),
        config.provision_timeout,
    );

    let vault_url = vault_base_url(&config.key_vault_name, &config.key_vault_dns_suffix)
        .context("Failed to derive the Key Vault address")?;
    let secrets = KeyVaultClient::new(
        vault_url,
        AzureCliCredential::new(config.az_bin.clone(), config.command_timeout),
    );

    let flux = CommandLineFlux::new(
        config.flux_bin.clone(),
        config.kubectl_bin.clone(),
        config.command_timeout,
    );

    let orchestrator = Orchestrator::new(
        config,
        Arc::new(provisioner),
        Arc::new(secrets),
        Arc::new(flux),
        Arc::new(TlsConnector),
    );

    let report = orchestrator.run().await.context("End-to-end run failed")?;
    info!(
        "Verified {} targets ({} pending), infrastructure destroyed: {}",
        report.verified.len(),
        report.pending().len(),
        report.destroyed
    );
    Ok(())
}
