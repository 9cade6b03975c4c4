// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Source-reference scenarios checked after the bootstrap converged.

use crate::constants::SCENARIO_PREFIX;
use serde::{Deserialize, Serialize};

/// One (transport scheme, revision selector) pair.
///
/// The infrastructure setup pre-provisions a GitRepository/Kustomization
/// pair per scenario, named after the scheme and the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub scheme: String,
    #[serde(rename = "ref")]
    pub reference: String,
}

impl Scenario {
    pub fn new(
        name: impl Into<String>,
        scheme: impl Into<String>,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            scheme: scheme.into(),
            reference: reference.into(),
        }
    }

    /// `application-gitops-<scheme>-<ref>`, with `/` in the ref replaced by `-`
    pub fn resource_name(&self) -> String {
        format!(
            "{}-{}-{}",
            SCENARIO_PREFIX,
            self.scheme,
            normalize_ref(&self.reference)
        )
    }
}

fn normalize_ref(reference: &str) -> String {
    reference.replace('/', "-")
}

/// Branch, feature branch and tag over HTTPS
pub fn default_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new("https from 'main' branch", "https", "main"),
        Scenario::new("https from 'feature/branch' branch", "https", "feature-branch"),
        Scenario::new("https from 'v1' tag", "https", "v1-tag"),
    ]
}

/// Parse a YAML scenario table
pub fn parse_scenarios(yaml: &str) -> Result<Vec<Scenario>, serde_yaml::Error> {
    serde_yaml::from_str(yaml)
}
