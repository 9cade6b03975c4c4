// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deadline-bounded execution of external command line tools.

use crate::error::{E2eError, Result};
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument};

const REDACTED: &str = "<redacted>";

/// A single external command with its deadline.
///
/// Values registered with `sensitive` are masked wherever the command line
/// or its stderr is logged or returned in an error.
#[derive(Clone)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    timeout: Duration,
    sensitive: Vec<String>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout,
            sensitive: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn sensitive(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.sensitive.push(value);
        }
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    /// Command line with sensitive values masked
    pub fn display(&self) -> String {
        let line = std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ");
        self.redact(&line)
    }

    fn redact(&self, text: &str) -> String {
        self.sensitive
            .iter()
            .fold(text.to_string(), |acc, s| acc.replace(s.as_str(), REDACTED))
    }

    /// Run to completion. A non-zero exit is a `Process` error, an expired
    /// deadline kills the child and returns `Timeout`.
    #[instrument(skip(self), fields(command = %self.display()))]
    pub async fn run(&self) -> Result<Output> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }

        debug!("Running command");
        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(output) => output?,
            Err(_) => {
                return Err(E2eError::Timeout {
                    operation: self.display(),
                    after: self.timeout,
                    last_error: "process killed".to_string(),
                })
            }
        };

        if !output.status.success() {
            return Err(E2eError::Process {
                command: self.display(),
                status: output.status.to_string(),
                stderr: self.redact(String::from_utf8_lossy(&output.stderr).trim()),
            });
        }

        debug!("Command succeeded");
        Ok(output)
    }
}
