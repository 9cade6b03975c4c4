// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes client creation for the provisioned cluster.

pub mod client;

pub use client::{kubeconfig_from_outputs, ClusterConnector, TlsConnector};
