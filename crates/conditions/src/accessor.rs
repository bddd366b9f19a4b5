//! # Status Adapter
//!
//! The capability contract a resource status must satisfy so a
//! [`ConditionManager`](crate::ConditionManager) can operate on it.
//!
//! Any status type holding a condition list, an observed generation and
//! optional annotations implements [`ResourceStatus`] once. Resources that
//! carry such a status implement [`HasConditions`] to expose it together with
//! their condition set.

use crate::condition::{Condition, ConditionType};
use crate::condition_set::ConditionSet;
use crate::manager::ConditionManager;
use std::collections::BTreeMap;

/// Accessors over the status fields the engine reads and mutates
pub trait ResourceStatus {
    /// Conditions currently recorded on the status
    fn conditions(&self) -> &[Condition];

    /// Mutable access to the condition list
    ///
    /// Only the [`ConditionManager`] should write through this; it keeps
    /// condition types unique.
    fn conditions_mut(&mut self) -> &mut Vec<Condition>;

    fn observed_generation(&self) -> i64;

    fn set_observed_generation(&mut self, generation: i64);

    fn annotations(&self) -> Option<&BTreeMap<String, String>>;

    fn annotations_mut(&mut self) -> &mut Option<BTreeMap<String, String>>;

    /// Condition of the given type, if present
    fn get_condition(&self, t: &ConditionType) -> Option<&Condition> {
        self.conditions().iter().find(|c| &c.r#type == t)
    }
}

/// A resource that carries a [`ResourceStatus`] and knows its condition set
pub trait HasConditions {
    type Status: ResourceStatus;

    fn status(&self) -> &Self::Status;

    fn status_mut(&mut self) -> &mut Self::Status;

    fn condition_set(&self) -> &ConditionSet;

    /// Manager bound to this resource's status
    fn manage(&mut self) -> ConditionManager<'_, Self::Status>
    where
        Self: Sized,
    {
        let set = self.condition_set().clone();
        ConditionManager::owned_set(set, self.status_mut())
    }

    /// Whether the top-level condition is present and True
    fn is_happy(&self) -> bool {
        self.condition_set().is_happy(self.status())
    }
}
