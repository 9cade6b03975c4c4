// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{defaults, timeouts, vault};
use crate::scenario::{default_scenarios, parse_scenarios, Scenario};
use crate::wait::PollConfig;
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// End-to-end run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub terraform_dir: PathBuf,
    pub terraform_bin: String,
    pub flux_bin: String,
    pub kubectl_bin: String,
    pub az_bin: String,
    pub key_vault_name: String,
    pub key_vault_dns_suffix: String,
    /// Fleet repository the bootstrap GitRepository points at
    pub git_url: String,
    pub git_branch: String,
    /// Keep the provisioned infrastructure after the run
    pub retain_infrastructure: bool,
    /// Reuse already-applied Terraform state instead of running init/apply
    pub skip_apply: bool,
    /// Deadline for every flux/kubectl/az command
    pub command_timeout: Duration,
    /// Deadline for a single terraform command
    pub provision_timeout: Duration,
    /// Convergence poll window
    pub poll: PollConfig,
    pub scenarios: Vec<Scenario>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            terraform_dir: PathBuf::from(defaults::TERRAFORM_DIR),
            terraform_bin: defaults::TERRAFORM_BIN.to_string(),
            flux_bin: defaults::FLUX_BIN.to_string(),
            kubectl_bin: defaults::KUBECTL_BIN.to_string(),
            az_bin: defaults::AZ_BIN.to_string(),
            key_vault_name: vault::NAME.to_string(),
            key_vault_dns_suffix: vault::DNS_SUFFIX.to_string(),
            git_url: defaults::GIT_URL.to_string(),
            git_branch: defaults::GIT_BRANCH.to_string(),
            retain_infrastructure: false,
            skip_apply: false,
            command_timeout: Duration::from_secs(timeouts::COMMAND_SECS),
            provision_timeout: Duration::from_secs(timeouts::PROVISION_SECS),
            poll: PollConfig::new(
                Duration::from_secs(timeouts::POLL_TIMEOUT_SECS),
                Duration::from_secs(timeouts::POLL_INTERVAL_SECS),
            ),
            scenarios: default_scenarios(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to the defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(dir) = lookup("E2E_TERRAFORM_DIR") {
            config.terraform_dir = PathBuf::from(dir);
        }
        override_string(&lookup, "E2E_TERRAFORM_BIN", &mut config.terraform_bin);
        override_string(&lookup, "E2E_FLUX_BIN", &mut config.flux_bin);
        override_string(&lookup, "E2E_KUBECTL_BIN", &mut config.kubectl_bin);
        override_string(&lookup, "E2E_AZ_BIN", &mut config.az_bin);
        override_string(&lookup, "E2E_KEY_VAULT", &mut config.key_vault_name);
        override_string(
            &lookup,
            "E2E_KEY_VAULT_DNS_SUFFIX",
            &mut config.key_vault_dns_suffix,
        );
        override_string(&lookup, "E2E_GIT_URL", &mut config.git_url);
        override_string(&lookup, "E2E_GIT_BRANCH", &mut config.git_branch);

        if let Some(v) = lookup("E2E_RETAIN_INFRASTRUCTURE") {
            config.retain_infrastructure = v.parse().with_context(|| {
                format!("E2E_RETAIN_INFRASTRUCTURE must be a bool, got '{}'", v)
            })?;
        }
        if let Some(v) = lookup("E2E_SKIP_APPLY") {
            config.skip_apply = v
                .parse()
                .with_context(|| format!("E2E_SKIP_APPLY must be a bool, got '{}'", v))?;
        }

        if let Some(path) = lookup("E2E_SCENARIOS_FILE") {
            let yaml = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read scenarios file {}", path))?;
            config.scenarios = parse_scenarios(&yaml)
                .with_context(|| format!("Failed to parse scenarios file {}", path))?;
        }

        Ok(config)
    }
}

fn override_string(lookup: &impl Fn(&str) -> Option<String>, key: &str, target: &mut String) {
    if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
        *target = value;
    }
}
