// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Typed Flux custom resources observed by the convergence check.

pub mod condition;
pub mod kustomization;
pub mod source;

pub use condition::{Condition, ConditionStatus};
pub use kustomization::Kustomization;
pub use source::GitRepository;

use crate::constants::READY_CONDITION;

/// A resource exposing a `status.conditions` list
pub trait Conditioned {
    const KIND: &'static str;

    fn conditions(&self) -> &[Condition];

    fn ready_condition(&self) -> Option<&Condition> {
        condition::find_status_condition(self.conditions(), READY_CONDITION)
    }

    /// Ready explicitly False
    fn is_not_ready(&self) -> bool {
        condition::is_status_condition_false(self.conditions(), READY_CONDITION)
    }

    fn is_ready(&self) -> bool {
        condition::is_status_condition_true(self.conditions(), READY_CONDITION)
    }
}
