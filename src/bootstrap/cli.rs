// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The flux and kubectl command line boundary.

use crate::error::Result;
use crate::process::Invocation;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

/// GitRepository registered by `flux create source git`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub name: String,
    pub url: String,
    pub branch: String,
    pub private_key_file: PathBuf,
    pub git_implementation: String,
}

/// Kustomization registered by `flux create kustomization`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySpec {
    pub name: String,
    pub source: String,
    pub path: String,
    pub prune: bool,
    pub interval: String,
}

/// Opaque credentials injected into the cluster
#[derive(Clone, PartialEq, Eq)]
pub enum ClusterSecret {
    /// `flux create secret git`
    GitCredentials {
        name: String,
        url: String,
        username: String,
        password: String,
    },
    /// `kubectl create secret generic` with a single literal
    Generic {
        namespace: String,
        name: String,
        key: String,
        value: String,
    },
}

impl ClusterSecret {
    pub fn name(&self) -> &str {
        match self {
            ClusterSecret::GitCredentials { name, .. } | ClusterSecret::Generic { name, .. } => {
                name
            }
        }
    }
}

impl fmt::Debug for ClusterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterSecret::GitCredentials {
                name,
                url,
                username,
                ..
            } => f
                .debug_struct("GitCredentials")
                .field("name", name)
                .field("url", url)
                .field("username", username)
                .finish_non_exhaustive(),
            ClusterSecret::Generic {
                namespace,
                name,
                key,
                ..
            } => f
                .debug_struct("Generic")
                .field("namespace", namespace)
                .field("name", name)
                .field("key", key)
                .finish_non_exhaustive(),
        }
    }
}

/// Operations the bootstrap performs against a cluster, one command each
#[async_trait]
pub trait FluxCli: Send + Sync {
    async fn install_agent(&self, kubeconfig: &Path, extra_components: &[String]) -> Result<()>;

    async fn create_source(&self, kubeconfig: &Path, source: &SourceSpec) -> Result<()>;

    async fn create_policy(&self, kubeconfig: &Path, policy: &PolicySpec) -> Result<()>;

    async fn create_secret(&self, kubeconfig: &Path, secret: &ClusterSecret) -> Result<()>;
}

/// Shells out to the flux and kubectl binaries. Only the exit status matters.
pub struct CommandLineFlux {
    flux_bin: String,
    kubectl_bin: String,
    timeout: Duration,
}

impl CommandLineFlux {
    pub fn new(
        flux_bin: impl Into<String>,
        kubectl_bin: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            flux_bin: flux_bin.into(),
            kubectl_bin: kubectl_bin.into(),
            timeout,
        }
    }

    fn flux(&self) -> Invocation {
        Invocation::new(&self.flux_bin, self.timeout)
    }

    pub fn install_invocation(
        &self,
        kubeconfig: &Path,
        extra_components: &[String],
    ) -> Invocation {
        let mut inv = self.flux().arg("install");
        if !extra_components.is_empty() {
            inv = inv
                .arg("--components-extra")
                .arg(extra_components.join(","));
        }
        with_kubeconfig(inv, kubeconfig)
    }

    pub fn source_invocation(&self, kubeconfig: &Path, source: &SourceSpec) -> Invocation {
        let inv = self
            .flux()
            .args(["create", "source", "git"])
            .arg(&source.name)
            .arg("--no-prompt")
            .args(["--url", source.url.as_str()])
            .args(["--branch", source.branch.as_str()])
            .arg("--private-key-file")
            .arg(source.private_key_file.to_string_lossy())
            .args(["--git-implementation", source.git_implementation.as_str()]);
        with_kubeconfig(inv, kubeconfig)
    }

    pub fn policy_invocation(&self, kubeconfig: &Path, policy: &PolicySpec) -> Invocation {
        let inv = self
            .flux()
            .args(["create", "kustomization"])
            .arg(&policy.name)
            .args(["--source", policy.source.as_str()])
            .args(["--path", policy.path.as_str()])
            .args(["--prune", if policy.prune { "true" } else { "false" }])
            .args(["--interval", policy.interval.as_str()]);
        with_kubeconfig(inv, kubeconfig)
    }

    pub fn secret_invocation(&self, kubeconfig: &Path, secret: &ClusterSecret) -> Invocation {
        let inv = match secret {
            ClusterSecret::GitCredentials {
                name,
                url,
                username,
                password,
            } => self
                .flux()
                .args(["create", "secret", "git"])
                .arg(name)
                .args(["--url", url.as_str()])
                .args(["--username", username.as_str()])
                .args(["--password", password.as_str()])
                .sensitive(password),
            ClusterSecret::Generic {
                namespace,
                name,
                key,
                value,
            } => Invocation::new(&self.kubectl_bin, self.timeout)
                .args(["--namespace", namespace.as_str()])
                .args(["create", "secret", "generic"])
                .arg(name)
                .arg("--from-literal")
                .arg(format!("{}={}", key, value))
                .sensitive(value),
        };
        with_kubeconfig(inv, kubeconfig)
    }
}

fn with_kubeconfig(inv: Invocation, kubeconfig: &Path) -> Invocation {
    inv.arg("--kubeconfig").arg(kubeconfig.to_string_lossy())
}

#[async_trait]
impl FluxCli for CommandLineFlux {
    #[instrument(skip(self))]
    async fn install_agent(&self, kubeconfig: &Path, extra_components: &[String]) -> Result<()> {
        self.install_invocation(kubeconfig, extra_components)
            .run()
            .await?;
        info!("Flux installed");
        Ok(())
    }

    #[instrument(skip(self, source), fields(source = %source.name))]
    async fn create_source(&self, kubeconfig: &Path, source: &SourceSpec) -> Result<()> {
        self.source_invocation(kubeconfig, source).run().await?;
        info!("GitRepository {} created", source.name);
        Ok(())
    }

    #[instrument(skip(self, policy), fields(kustomization = %policy.name))]
    async fn create_policy(&self, kubeconfig: &Path, policy: &PolicySpec) -> Result<()> {
        self.policy_invocation(kubeconfig, policy).run().await?;
        info!("Kustomization {} created", policy.name);
        Ok(())
    }

    #[instrument(skip(self, secret), fields(secret = %secret.name()))]
    async fn create_secret(&self, kubeconfig: &Path, secret: &ClusterSecret) -> Result<()> {
        self.secret_invocation(kubeconfig, secret).run().await?;
        info!("Secret {} created", secret.name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::E2eError;

    fn cli() -> CommandLineFlux {
        CommandLineFlux::new("../../bin/flux", "kubectl", Duration::from_secs(300))
    }

    fn kubeconfig() -> PathBuf {
        PathBuf::from("/tmp/run/kubeconfig")
    }

    #[test]
    fn test_install_args() {
        let extra = vec![
            "image-reflector-controller".to_string(),
            "image-automation-controller".to_string(),
        ];
        let inv = cli().install_invocation(&kubeconfig(), &extra);

        assert_eq!(inv.program(), "../../bin/flux");
        assert_eq!(
            inv.get_args(),
            [
                "install",
                "--components-extra",
                "image-reflector-controller,image-automation-controller",
                "--kubeconfig",
                "/tmp/run/kubeconfig",
            ]
        );
    }

    #[test]
    fn test_install_without_extra_components() {
        let inv = cli().install_invocation(&kubeconfig(), &[]);
        assert_eq!(inv.get_args(), ["install", "--kubeconfig", "/tmp/run/kubeconfig"]);
    }

    #[test]
    fn test_source_args() {
        let source = SourceSpec {
            name: "flux-system".to_string(),
            url: "ssh://git@ssh.dev.azure.com/v3/flux-azure/e2e/fleet-infra".to_string(),
            branch: "main".to_string(),
            private_key_file: PathBuf::from("/tmp/run/id_rsa"),
            git_implementation: "libgit2".to_string(),
        };
        let inv = cli().source_invocation(&kubeconfig(), &source);

        assert_eq!(
            inv.display(),
            "../../bin/flux create source git flux-system --no-prompt \
             --url ssh://git@ssh.dev.azure.com/v3/flux-azure/e2e/fleet-infra --branch main \
             --private-key-file /tmp/run/id_rsa --git-implementation libgit2 \
             --kubeconfig /tmp/run/kubeconfig"
        );
    }

    #[test]
    fn test_policy_args() {
        let policy = PolicySpec {
            name: "flux-system".to_string(),
            source: "flux-system".to_string(),
            path: "./clusters/prod".to_string(),
            prune: true,
            interval: "1m".to_string(),
        };
        let inv = cli().policy_invocation(&kubeconfig(), &policy);

        assert_eq!(
            inv.display(),
            "../../bin/flux create kustomization flux-system --source flux-system \
             --path ./clusters/prod --prune true --interval 1m --kubeconfig /tmp/run/kubeconfig"
        );
    }

    #[test]
    fn test_git_secret_masks_password() {
        let secret = ClusterSecret::GitCredentials {
            name: "https-credentials".to_string(),
            url: "https://example.com".to_string(),
            username: "git".to_string(),
            password: "pat-value".to_string(),
        };
        let inv = cli().secret_invocation(&kubeconfig(), &secret);

        assert!(inv.get_args().contains(&"pat-value".to_string()));
        assert_eq!(
            inv.display(),
            "../../bin/flux create secret git https-credentials --url https://example.com \
             --username git --password <redacted> --kubeconfig /tmp/run/kubeconfig"
        );
    }

    #[test]
    fn test_generic_secret_uses_kubectl() {
        let secret = ClusterSecret::Generic {
            namespace: "flux-system".to_string(),
            name: "azdo-pat".to_string(),
            key: "token".to_string(),
            value: "pat-value".to_string(),
        };
        let inv = cli().secret_invocation(&kubeconfig(), &secret);

        assert_eq!(inv.program(), "kubectl");
        assert_eq!(
            inv.get_args(),
            [
                "--namespace",
                "flux-system",
                "create",
                "secret",
                "generic",
                "azdo-pat",
                "--from-literal",
                "token=pat-value",
                "--kubeconfig",
                "/tmp/run/kubeconfig",
            ]
        );
    }

    #[test]
    fn test_secret_debug_hides_values() {
        let secret = ClusterSecret::Generic {
            namespace: "flux-system".to_string(),
            name: "azdo-pat".to_string(),
            key: "token".to_string(),
            value: "pat-value".to_string(),
        };
        assert!(!format!("{:?}", secret).contains("pat-value"));
    }

    #[tokio::test]
    async fn test_failing_binary_surfaces_process_error() {
        let cli = CommandLineFlux::new("false", "false", Duration::from_secs(5));

        let result = cli.install_agent(&kubeconfig(), &[]).await;
        assert!(matches!(result, Err(E2eError::Process { .. })));
    }
}
