// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Infrastructure provisioning and the outputs the rest of the run consumes.

pub mod terraform;

pub use terraform::Terraform;

use crate::constants::outputs;
use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use tracing::{debug, instrument};

/// Creates and tears down the test infrastructure
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn apply(&self) -> Result<()>;

    /// Named string output of the applied infrastructure
    async fn output(&self, name: &str) -> Result<String>;

    async fn destroy(&self) -> Result<()>;
}

/// Connection material for the provisioned cluster.
///
/// Values are opaque; only their presence is checked.
#[derive(Clone)]
pub struct ClusterOutputs {
    pub kubeconfig: String,
    pub host: String,
    pub client_certificate: String,
    pub client_key: String,
    pub cluster_ca_certificate: String,
    pub event_hub_connection_string: String,
}

impl ClusterOutputs {
    #[instrument(skip_all)]
    pub async fn collect(provisioner: &dyn Provisioner) -> Result<Self> {
        let outputs = ClusterOutputs {
            kubeconfig: provisioner.output(outputs::KUBE_CONFIG).await?,
            host: provisioner.output(outputs::HOST).await?,
            client_certificate: provisioner.output(outputs::CLIENT_CERTIFICATE).await?,
            client_key: provisioner.output(outputs::CLIENT_KEY).await?,
            cluster_ca_certificate: provisioner
                .output(outputs::CLUSTER_CA_CERTIFICATE)
                .await?,
            event_hub_connection_string: provisioner
                .output(outputs::EVENT_HUB_CONNECTION_STRING)
                .await?,
        };
        debug!("Collected cluster outputs for {}", outputs.host);
        Ok(outputs)
    }
}

impl fmt::Debug for ClusterOutputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterOutputs")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}
