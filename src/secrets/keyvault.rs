// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Azure Key Vault secret reads over the REST API.

use super::credential::TokenProvider;
use super::SecretStore;
use crate::constants::vault;
use crate::error::{E2eError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

/// Base address of a vault, e.g. `https://azure-e2e-shared.vault.azure.net`
pub fn vault_base_url(vault_name: &str, dns_suffix: &str) -> Result<Url> {
    Url::parse(&format!("https://{}.{}", vault_name, dns_suffix))
        .map_err(|e| E2eError::Config(format!("Invalid vault address: {}", e)))
}

#[derive(Deserialize)]
struct SecretBundle {
    value: Option<String>,
}

pub struct KeyVaultClient<T> {
    base_url: Url,
    http: reqwest::Client,
    credential: T,
}

impl<T: TokenProvider> KeyVaultClient<T> {
    pub fn new(base_url: Url, credential: T) -> Self {
        Self::with_http_client(base_url, credential, reqwest::Client::new())
    }

    pub fn with_http_client(base_url: Url, credential: T, http: reqwest::Client) -> Self {
        Self {
            base_url,
            http,
            credential,
        }
    }

    fn secret_url(&self, name: &str) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("secrets/{}", name))
            .map_err(|e| E2eError::Config(format!("Invalid secret name '{}': {}", name, e)))?;
        url.query_pairs_mut()
            .append_pair("api-version", vault::API_VERSION);
        Ok(url)
    }
}

#[async_trait]
impl<T: TokenProvider> SecretStore for KeyVaultClient<T> {
    #[instrument(skip(self), fields(vault = %self.base_url))]
    async fn get_secret(&self, name: &str) -> Result<String> {
        let token = self.credential.token(vault::RESOURCE).await?;
        let url = self.secret_url(name)?;

        let response = self.http.get(url).bearer_auth(token).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => return Err(E2eError::not_found("Key Vault secret", name)),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(E2eError::Authentication(format!(
                    "Access to secret '{}' denied ({})",
                    name,
                    response.status()
                )))
            }
            _ => {}
        }

        let bundle: SecretBundle = response.error_for_status()?.json().await?;
        debug!("Fetched secret {}", name);
        bundle
            .value
            .ok_or_else(|| E2eError::not_found("Key Vault secret value", name))
    }
}
