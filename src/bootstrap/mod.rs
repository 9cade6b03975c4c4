// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Flux installation and bootstrap against the provisioned cluster.

pub mod cli;

pub use cli::{ClusterSecret, CommandLineFlux, FluxCli, PolicySpec, SourceSpec};

use crate::config::Config;
use crate::constants::flux;
use crate::error::Result;
use crate::secrets::RepositoryCredentials;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

/// Runs the install and bootstrap steps in order. The first failing step
/// aborts the whole bootstrap; nothing is retried or rolled back.
pub struct Bootstrapper {
    cli: Arc<dyn FluxCli>,
    git_url: String,
    git_branch: String,
}

impl Bootstrapper {
    pub fn new(cli: Arc<dyn FluxCli>, config: &Config) -> Self {
        Self {
            cli,
            git_url: config.git_url.clone(),
            git_branch: config.git_branch.clone(),
        }
    }

    /// Install the Flux controllers plus the image automation controllers
    #[instrument(skip(self))]
    pub async fn install(&self, kubeconfig: &Path) -> Result<()> {
        let extra: Vec<String> = flux::EXTRA_COMPONENTS
            .iter()
            .map(|c| c.to_string())
            .collect();
        info!("Installing Flux");
        self.cli.install_agent(kubeconfig, &extra).await
    }

    /// Register the fleet repository and its kustomization, then inject the credentials
    #[instrument(skip(self, credentials))]
    pub async fn bootstrap(
        &self,
        kubeconfig: &Path,
        credentials: &RepositoryCredentials,
    ) -> Result<()> {
        let source = self.source_spec(&credentials.private_key_path);
        info!("Creating GitRepository {} for {}", source.name, source.url);
        self.cli.create_source(kubeconfig, &source).await?;

        let policy = policy_spec();
        info!("Creating Kustomization {} for {}", policy.name, policy.path);
        self.cli.create_policy(kubeconfig, &policy).await?;

        for secret in cluster_secrets(&credentials.access_token) {
            info!("Creating secret {}", secret.name());
            self.cli.create_secret(kubeconfig, &secret).await?;
        }

        info!("Bootstrap complete");
        Ok(())
    }

    fn source_spec(&self, private_key_file: &Path) -> SourceSpec {
        SourceSpec {
            name: flux::BOOTSTRAP_NAME.to_string(),
            url: self.git_url.clone(),
            branch: self.git_branch.clone(),
            private_key_file: private_key_file.to_path_buf(),
            git_implementation: flux::GIT_IMPLEMENTATION.to_string(),
        }
    }
}

fn policy_spec() -> PolicySpec {
    PolicySpec {
        name: flux::BOOTSTRAP_NAME.to_string(),
        source: flux::BOOTSTRAP_NAME.to_string(),
        path: flux::SYNC_PATH.to_string(),
        prune: true,
        interval: flux::SYNC_INTERVAL.to_string(),
    }
}

fn cluster_secrets(access_token: &str) -> Vec<ClusterSecret> {
    vec![
        ClusterSecret::GitCredentials {
            name: flux::HTTPS_CREDENTIALS_NAME.to_string(),
            url: flux::HTTPS_CREDENTIALS_URL.to_string(),
            username: flux::HTTPS_CREDENTIALS_USERNAME.to_string(),
            password: access_token.to_string(),
        },
        ClusterSecret::Generic {
            namespace: flux::NAMESPACE.to_string(),
            name: flux::PAT_SECRET_NAME.to_string(),
            key: flux::PAT_SECRET_KEY.to_string(),
            value: access_token.to_string(),
        },
    ]
}
