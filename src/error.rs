// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Failed to obtain secret store authorizer: {0}")]
    Authentication(String),

    #[error("{kind} '{name}' not found")]
    NotFound { kind: String, name: String },

    #[error("Kubernetes API read failed: {0}")]
    TransientRead(#[from] kube::Error),

    #[error("Command '{command}' exited with {status}: {stderr}")]
    Process {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("{kind} '{name}' is not ready: {reason}: {message}")]
    ConditionFalse {
        kind: String,
        name: String,
        reason: String,
        message: String,
    },

    #[error("{operation} did not complete within {after:?}: {last_error}")]
    Timeout {
        operation: String,
        after: Duration,
        last_error: String,
    },

    #[error("Provisioning output '{0}' is missing")]
    MissingOutput(String),

    #[error("Invalid kubeconfig: {0}")]
    Kubeconfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Secret store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl E2eError {
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        E2eError::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Map a cluster read error, keeping 404s apart from every other failure
    pub fn from_read(kind: &str, name: &str, err: kube::Error) -> Self {
        match err {
            kube::Error::Api(resp) if resp.code == 404 => E2eError::not_found(kind, name),
            other => E2eError::TransientRead(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, E2eError>;
