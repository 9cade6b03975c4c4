// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed client creation for the provisioned cluster

use crate::error::{E2eError, Result};
use crate::provision::ClusterOutputs;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as Base64;
use base64::Engine;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use tracing::{info, instrument};

const CONTEXT_NAME: &str = "e2e";

/// Builds a read client for the cluster described by the provisioning outputs
#[async_trait]
pub trait ClusterConnector: Send + Sync {
    async fn connect(&self, outputs: &ClusterOutputs) -> Result<Client>;
}

/// Connects with the client certificate and CA from the provisioning outputs
#[derive(Default)]
pub struct TlsConnector;

#[async_trait]
impl ClusterConnector for TlsConnector {
    #[instrument(skip_all, fields(host = %outputs.host))]
    async fn connect(&self, outputs: &ClusterOutputs) -> Result<Client> {
        let kubeconfig = kubeconfig_from_outputs(outputs)?;
        let client = create_client_from_kubeconfig(kubeconfig).await?;
        info!("Created Kubernetes client for {}", outputs.host);
        Ok(client)
    }
}

/// PEM material is base64 encoded for the `*-data` fields, anything else is
/// assumed to be encoded already.
fn encode_pem_data(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.starts_with("-----BEGIN") {
        Base64.encode(trimmed.as_bytes())
    } else {
        trimmed.to_string()
    }
}

/// In-memory kubeconfig with a single cluster, user and context
pub fn kubeconfig_from_outputs(outputs: &ClusterOutputs) -> Result<Kubeconfig> {
    let raw = serde_json::json!({
        "apiVersion": "v1",
        "kind": "Config",
        "clusters": [{
            "name": CONTEXT_NAME,
            "cluster": {
                "server": outputs.host.trim(),
                "certificate-authority-data": encode_pem_data(&outputs.cluster_ca_certificate),
            }
        }],
        "users": [{
            "name": CONTEXT_NAME,
            "user": {
                "client-certificate-data": encode_pem_data(&outputs.client_certificate),
                "client-key-data": encode_pem_data(&outputs.client_key),
            }
        }],
        "contexts": [{
            "name": CONTEXT_NAME,
            "context": { "cluster": CONTEXT_NAME, "user": CONTEXT_NAME }
        }],
        "current-context": CONTEXT_NAME,
    });

    serde_json::from_value(raw)
        .map_err(|e| E2eError::Kubeconfig(format!("Failed to build kubeconfig: {}", e)))
}

/// Create a Kubernetes client from a parsed kubeconfig
async fn create_client_from_kubeconfig(kubeconfig: Kubeconfig) -> Result<Client> {
    let client_config = kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| E2eError::Kubeconfig(format!("Failed to create config: {}", e)))?;

    Client::try_from(client_config)
        .map_err(|e| E2eError::Kubeconfig(format!("Failed to create client: {}", e)))
}
