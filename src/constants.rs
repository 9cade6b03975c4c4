// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Flux installation and bootstrap defaults
pub mod flux {
    /// Namespace the Flux controllers and bootstrap objects live in
    pub const NAMESPACE: &str = "flux-system";
    /// Name shared by the bootstrap GitRepository and Kustomization
    pub const BOOTSTRAP_NAME: &str = "flux-system";
    /// Controllers installed next to the default Flux components
    pub const EXTRA_COMPONENTS: &[&str] =
        &["image-reflector-controller", "image-automation-controller"];
    pub const GIT_IMPLEMENTATION: &str = "libgit2";
    pub const SYNC_PATH: &str = "./clusters/prod";
    pub const SYNC_INTERVAL: &str = "1m";
    /// Placeholder remote the HTTPS credentials are registered for
    pub const HTTPS_CREDENTIALS_NAME: &str = "https-credentials";
    pub const HTTPS_CREDENTIALS_URL: &str = "https://example.com";
    pub const HTTPS_CREDENTIALS_USERNAME: &str = "git";
    /// Generic secret holding the Azure DevOps personal access token
    pub const PAT_SECRET_NAME: &str = "azdo-pat";
    pub const PAT_SECRET_KEY: &str = "token";
}

/// Default external binaries and locations
pub mod defaults {
    pub const FLUX_BIN: &str = "../../bin/flux";
    pub const KUBECTL_BIN: &str = "kubectl";
    pub const TERRAFORM_BIN: &str = "terraform";
    pub const TERRAFORM_DIR: &str = "./terraform";
    pub const GIT_URL: &str = "ssh://git@ssh.dev.azure.com/v3/flux-azure/e2e/fleet-infra";
    pub const GIT_BRANCH: &str = "main";
    pub const AZ_BIN: &str = "az";
}

/// Azure Key Vault access
pub mod vault {
    pub const NAME: &str = "azure-e2e-shared";
    /// Key Vault DNS suffix of the Azure public cloud
    pub const DNS_SUFFIX: &str = "vault.azure.net";
    /// Resource the CLI access token is requested for
    pub const RESOURCE: &str = "https://vault.azure.net";
    pub const API_VERSION: &str = "7.0";
    pub const PAT_SECRET: &str = "azdo-pat";
    pub const PRIVATE_KEY_SECRET: &str = "id-rsa";
}

/// Terraform output names produced by the AKS module
pub mod outputs {
    pub const KUBE_CONFIG: &str = "aks_kube_config";
    pub const HOST: &str = "aks_host";
    pub const CLIENT_CERTIFICATE: &str = "aks_client_certificate";
    pub const CLIENT_KEY: &str = "aks_client_key";
    pub const CLUSTER_CA_CERTIFICATE: &str = "aks_cluster_ca_certificate";
    pub const EVENT_HUB_CONNECTION_STRING: &str = "event_hub_connection_string";
}

/// Deadlines
pub mod timeouts {
    /// Upper bound for every flux, kubectl and az invocation
    pub const COMMAND_SECS: u64 = 300;
    /// Total convergence poll window
    pub const POLL_TIMEOUT_SECS: u64 = 5;
    /// Convergence poll granularity
    pub const POLL_INTERVAL_SECS: u64 = 1;
    /// Upper bound for a single terraform invocation
    pub const PROVISION_SECS: u64 = 3600;
    pub const TERRAFORM_RETRIES: u32 = 3;
    pub const TERRAFORM_RETRY_DELAY_SECS: u64 = 5;
}

/// Condition type the convergence check inspects
pub const READY_CONDITION: &str = "Ready";

/// Prefix of the per-scenario GitRepository/Kustomization names
pub const SCENARIO_PREFIX: &str = "application-gitops";

/// File names inside the per-run working directory
pub mod files {
    pub const KUBECONFIG: &str = "kubeconfig";
    pub const PRIVATE_KEY: &str = "id_rsa";
}
