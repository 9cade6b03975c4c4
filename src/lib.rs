// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod bootstrap;
pub mod config;
pub mod constants;
pub mod error;
pub mod kubernetes;
pub mod orchestrator;
pub mod process;
pub mod provision;
pub mod scenario;
pub mod secrets;
pub mod types;
pub mod verify;
pub mod wait;
pub mod workdir;

#[cfg(test)]
pub mod test_utils;
