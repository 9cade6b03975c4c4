// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! End-to-end run: provision, bootstrap Flux, verify convergence, tear down.

use crate::bootstrap::{Bootstrapper, FluxCli};
use crate::config::Config;
use crate::constants::flux;
use crate::error::{E2eError, Result};
use crate::kubernetes::ClusterConnector;
use crate::provision::{ClusterOutputs, Provisioner};
use crate::scenario::Scenario;
use crate::secrets::{CredentialResolver, SecretStore};
use crate::verify::{Convergence, ConvergenceVerifier};
use crate::workdir::WorkDir;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Linear stages of a run; the first failing stage aborts it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Provision,
    ExtractOutputs,
    BuildClient,
    InstallAgent,
    Bootstrap,
    VerifyBaseline,
    VerifyScenarios,
    Destroy,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Provision => "provision",
            Stage::ExtractOutputs => "extract-outputs",
            Stage::BuildClient => "build-client",
            Stage::InstallAgent => "install-agent",
            Stage::Bootstrap => "bootstrap",
            Stage::VerifyBaseline => "verify-baseline",
            Stage::VerifyScenarios => "verify-scenarios",
            Stage::Destroy => "destroy",
        };
        write!(f, "{}", name)
    }
}

/// A converged GitRepository/Kustomization pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedTarget {
    pub namespace: String,
    pub name: String,
    pub convergence: Convergence,
}

/// Outcome of a successful run
#[derive(Debug, Default)]
pub struct RunReport {
    pub verified: Vec<VerifiedTarget>,
    pub destroyed: bool,
}

impl RunReport {
    pub fn verified_names(&self) -> Vec<&str> {
        self.verified.iter().map(|t| t.name.as_str()).collect()
    }

    /// Targets accepted without an explicit Ready=True
    pub fn pending(&self) -> Vec<&VerifiedTarget> {
        self.verified
            .iter()
            .filter(|t| !t.convergence.is_ready())
            .collect()
    }
}

pub struct Orchestrator {
    config: Config,
    provisioner: Arc<dyn Provisioner>,
    secrets: Arc<dyn SecretStore>,
    flux: Arc<dyn FluxCli>,
    connector: Arc<dyn ClusterConnector>,
}

impl Orchestrator {
    pub fn new(
        config: Config,
        provisioner: Arc<dyn Provisioner>,
        secrets: Arc<dyn SecretStore>,
        flux: Arc<dyn FluxCli>,
        connector: Arc<dyn ClusterConnector>,
    ) -> Self {
        Self {
            config,
            provisioner,
            secrets,
            flux,
            connector,
        }
    }

    /// Run every stage, then tear the infrastructure down unless it is retained.
    ///
    /// Teardown also runs after a failed stage. Its own failure is returned
    /// only when the stages succeeded, otherwise the stage error wins.
    #[instrument(skip(self), fields(scenarios = self.config.scenarios.len()))]
    pub async fn run(&self) -> Result<RunReport> {
        let workdir = WorkDir::new()?;
        let outcome = self.run_stages(&workdir).await;
        let teardown = self.teardown().await;

        match (outcome, teardown) {
            (Ok(mut report), Ok(destroyed)) => {
                report.destroyed = destroyed;
                info!(
                    "Run succeeded, verified: {}",
                    report.verified_names().join(", ")
                );
                Ok(report)
            }
            (Ok(_), Err(e)) => {
                error!("Run succeeded but teardown failed: {}", e);
                Err(e)
            }
            (Err(e), Ok(_)) => {
                error!("Run failed: {}", e);
                Err(e)
            }
            (Err(e), Err(teardown_err)) => {
                error!("Run failed: {}", e);
                error!("Teardown after failure also failed: {}", teardown_err);
                Err(e)
            }
        }
    }

    async fn run_stages(&self, workdir: &WorkDir) -> Result<RunReport> {
        enter(Stage::Provision);
        if self.config.skip_apply {
            warn!("Skipping apply, reusing the existing infrastructure state");
        } else {
            self.provisioner.apply().await?;
        }

        enter(Stage::ExtractOutputs);
        let outputs = ClusterOutputs::collect(self.provisioner.as_ref()).await?;

        enter(Stage::BuildClient);
        let kubeconfig = workdir.write_kubeconfig(&outputs.kubeconfig)?;
        let client = self.connector.connect(&outputs).await?;
        let verifier = ConvergenceVerifier::new(client);

        let bootstrapper = Bootstrapper::new(self.flux.clone(), &self.config);
        enter(Stage::InstallAgent);
        bootstrapper.install(&kubeconfig).await?;

        enter(Stage::Bootstrap);
        let credentials = CredentialResolver::new(self.secrets.clone())
            .resolve(workdir)
            .await?;
        bootstrapper.bootstrap(&kubeconfig, &credentials).await?;

        let mut report = RunReport::default();

        enter(Stage::VerifyBaseline);
        report
            .verified
            .push(self.verify(&verifier, flux::BOOTSTRAP_NAME).await?);

        enter(Stage::VerifyScenarios);
        report
            .verified
            .extend(self.verify_scenarios(&verifier, &self.config.scenarios).await?);

        Ok(report)
    }

    async fn verify(&self, verifier: &ConvergenceVerifier, name: &str) -> Result<VerifiedTarget> {
        let convergence = verifier
            .wait_for_convergence(flux::NAMESPACE, name, self.config.poll)
            .await?;
        Ok(VerifiedTarget {
            namespace: flux::NAMESPACE.to_string(),
            name: name.to_string(),
            convergence,
        })
    }

    /// Every scenario is checked; the first failure is returned after all ran
    async fn verify_scenarios(
        &self,
        verifier: &ConvergenceVerifier,
        scenarios: &[Scenario],
    ) -> Result<Vec<VerifiedTarget>> {
        let mut verified = Vec::with_capacity(scenarios.len());
        let mut first_failure: Option<E2eError> = None;

        for scenario in scenarios {
            let name = scenario.resource_name();
            info!("Scenario '{}': checking {}", scenario.name, name);
            match self.verify(verifier, &name).await {
                Ok(target) => verified.push(target),
                Err(e) => {
                    error!("Scenario '{}' failed: {}", scenario.name, e);
                    first_failure.get_or_insert(e);
                }
            }
        }

        match first_failure {
            Some(e) => Err(e),
            None => Ok(verified),
        }
    }

    /// Returns whether the infrastructure was destroyed
    async fn teardown(&self) -> Result<bool> {
        if self.config.retain_infrastructure {
            warn!("Retaining provisioned infrastructure, resources are left running");
            return Ok(false);
        }
        enter(Stage::Destroy);
        self.provisioner.destroy().await?;
        Ok(true)
    }
}

fn enter(stage: Stage) {
    info!(stage = %stage, "Entering stage {}", stage);
}
