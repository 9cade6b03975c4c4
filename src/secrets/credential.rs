// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Access tokens for the secret store, taken from the logged-in Azure CLI.

use crate::error::{E2eError, Result};
use crate::process::Invocation;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Source of bearer tokens for a given resource
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self, resource: &str) -> Result<String>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessToken {
    access_token: String,
}

/// Uses `az account get-access-token`, i.e. whatever identity the CLI is logged in as
pub struct AzureCliCredential {
    az_bin: String,
    timeout: Duration,
}

impl AzureCliCredential {
    pub fn new(az_bin: impl Into<String>, timeout: Duration) -> Self {
        Self {
            az_bin: az_bin.into(),
            timeout,
        }
    }
}

#[async_trait]
impl TokenProvider for AzureCliCredential {
    #[instrument(skip(self))]
    async fn token(&self, resource: &str) -> Result<String> {
        let output = Invocation::new(&self.az_bin, self.timeout)
            .args(["account", "get-access-token", "--resource", resource])
            .args(["--output", "json"])
            .run()
            .await
            .map_err(|e| E2eError::Authentication(e.to_string()))?;

        parse_access_token(&output.stdout).inspect(|_| debug!("Obtained access token"))
    }
}

fn parse_access_token(stdout: &[u8]) -> Result<String> {
    let token: AccessToken = serde_json::from_slice(stdout)
        .map_err(|e| E2eError::Authentication(format!("Unexpected az output: {}", e)))?;
    if token.access_token.is_empty() {
        return Err(E2eError::Authentication(
            "az returned an empty access token".to_string(),
        ));
    }
    Ok(token.access_token)
}
