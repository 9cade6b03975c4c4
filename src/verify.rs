// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Convergence check for a GitRepository/Kustomization pair.

use crate::error::{E2eError, Result};
use crate::types::{Conditioned, GitRepository, Kustomization};
use crate::wait::{eventually, PollConfig};
use kube::{Api, Client, Resource};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use tracing::{debug, info, instrument, warn};

/// Outcome of a successful single-attempt check.
///
/// Only an explicit `Ready=False` fails an attempt. A pair whose Ready
/// conditions are Unknown or absent still passes, reported as `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
    Ready,
    Pending,
}

impl Convergence {
    pub fn is_ready(&self) -> bool {
        matches!(self, Convergence::Ready)
    }
}

/// Reads Flux objects through a typed client and decides whether they converged
#[derive(Clone)]
pub struct ConvergenceVerifier {
    client: Client,
}

impl ConvergenceVerifier {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Single attempt: read the source, then the kustomization with the same identifier
    #[instrument(skip(self))]
    pub async fn verify(&self, namespace: &str, name: &str) -> Result<Convergence> {
        let source: GitRepository = self.get(namespace, name).await?;
        check_not_false(&source, name)?;

        let kustomization: Kustomization = self.get(namespace, name).await?;
        check_not_false(&kustomization, name)?;

        let revision = source
            .revision_selector()
            .unwrap_or_else(|| "default revision".to_string());
        if source.is_ready() && kustomization.is_ready() {
            debug!(
                "{}/{} converged on {} (applied from source {})",
                namespace,
                name,
                revision,
                kustomization.source_name()
            );
            Ok(Convergence::Ready)
        } else {
            warn!(
                "{}/{} on {} has no explicit Ready=False but is not Ready=True yet",
                namespace, name, revision
            );
            Ok(Convergence::Pending)
        }
    }

    /// Re-run `verify` at a fixed interval until it succeeds or the poll window closes
    #[instrument(skip(self, poll), fields(timeout = ?poll.timeout, interval = ?poll.interval))]
    pub async fn wait_for_convergence(
        &self,
        namespace: &str,
        name: &str,
        poll: PollConfig,
    ) -> Result<Convergence> {
        let outcome = eventually(format!("convergence of {}/{}", namespace, name), move || {
            self.verify(namespace, name)
        })
        .poll(poll)
        .await_condition()
        .await?;

        info!("{}/{} verified ({:?})", namespace, name, outcome);
        Ok(outcome)
    }

    async fn get<K>(&self, namespace: &str, name: &str) -> Result<K>
    where
        K: Resource<Scope = kube::core::NamespaceResourceScope>
            + Conditioned
            + Clone
            + DeserializeOwned
            + Debug,
        <K as Resource>::DynamicType: Default,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        api.get(name).await.map_err(|e| {
            E2eError::from_read(<K as Conditioned>::KIND, &format!("{}/{}", namespace, name), e)
        })
    }
}

fn check_not_false<K: Conditioned>(resource: &K, name: &str) -> Result<()> {
    if !resource.is_not_ready() {
        return Ok(());
    }
    let condition = resource.ready_condition();
    Err(E2eError::ConditionFalse {
        kind: K::KIND.to_string(),
        name: name.to_string(),
        reason: condition
            .and_then(|c| c.reason.clone())
            .unwrap_or_default(),
        message: condition
            .and_then(|c| c.message.clone())
            .unwrap_or_default(),
    })
}
