// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Terraform-backed provisioning of the AKS cluster and its companions.

use super::Provisioner;
use crate::constants::timeouts;
use crate::error::{E2eError, Result};
use crate::process::Invocation;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

/// Failures known to be transient (provider downloads, registry hiccups)
const RETRYABLE_ERRORS: &[&str] = &[
    "connection reset by peer",
    "TLS handshake timeout",
    "Error installing provider",
    "Failed to query available provider packages",
    "timeout while waiting for plugin to start",
    "Client.Timeout exceeded while awaiting headers",
];

pub fn is_retryable(err: &E2eError) -> bool {
    match err {
        E2eError::Process { stderr, .. } => RETRYABLE_ERRORS.iter().any(|p| stderr.contains(p)),
        _ => false,
    }
}

pub struct Terraform {
    bin: String,
    dir: PathBuf,
    timeout: Duration,
    max_attempts: u32,
    retry_delay: Duration,
}

impl Terraform {
    pub fn new(bin: impl Into<String>, dir: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            bin: bin.into(),
            dir: dir.into(),
            timeout,
            max_attempts: timeouts::TERRAFORM_RETRIES,
            retry_delay: Duration::from_secs(timeouts::TERRAFORM_RETRY_DELAY_SECS),
        }
    }

    pub fn with_retries(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    fn terraform(&self) -> Invocation {
        Invocation::new(&self.bin, self.timeout).current_dir(&self.dir)
    }

    fn init_invocation(&self) -> Invocation {
        self.terraform().args(["init", "-input=false"])
    }

    fn apply_invocation(&self) -> Invocation {
        self.terraform()
            .args(["apply", "-auto-approve", "-input=false"])
    }

    fn destroy_invocation(&self) -> Invocation {
        self.terraform()
            .args(["destroy", "-auto-approve", "-input=false"])
    }

    fn output_invocation(&self, name: &str) -> Invocation {
        self.terraform()
            .args(["output", "-no-color", "-raw"])
            .arg(name)
    }

    /// Run, retrying failures that match a known-transient pattern
    async fn run_with_retries(&self, invocation: Invocation) -> Result<()> {
        let mut attempt = 1;
        loop {
            match invocation.run().await {
                Ok(_) => return Ok(()),
                Err(e) if attempt < self.max_attempts && is_retryable(&e) => {
                    warn!(
                        "'{}' failed with a retryable error (attempt {}/{}), retrying in {:?}: {}",
                        invocation.display(),
                        attempt,
                        self.max_attempts,
                        self.retry_delay,
                        e
                    );
                    attempt += 1;
                    sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[async_trait]
impl Provisioner for Terraform {
    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn apply(&self) -> Result<()> {
        info!("Running terraform init");
        self.run_with_retries(self.init_invocation()).await?;
        info!("Running terraform apply");
        self.run_with_retries(self.apply_invocation()).await
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn output(&self, name: &str) -> Result<String> {
        let output = self
            .output_invocation(name)
            .run()
            .await
            .map_err(|e| match e {
                E2eError::Process { .. } => E2eError::MissingOutput(name.to_string()),
                other => other,
            })?;

        let value = String::from_utf8_lossy(&output.stdout).to_string();
        if value.trim().is_empty() {
            return Err(E2eError::MissingOutput(name.to_string()));
        }
        Ok(value)
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn destroy(&self) -> Result<()> {
        info!("Running terraform destroy");
        self.run_with_retries(self.destroy_invocation()).await
    }
}
