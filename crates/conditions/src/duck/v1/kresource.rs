//! # KResource
//!
//! A generic resource with object metadata and a [`Status`], for controllers
//! that only care about a resource's conditions.

use crate::accessor::HasConditions;
use crate::condition_set::ConditionSet;
use crate::duck::v1::Status;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Any resource reporting a [`Status`], viewed through its living condition set
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    #[schemars(skip)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: Status,
    #[serde(skip, default = "ConditionSet::living")]
    #[schemars(skip)]
    condition_set: ConditionSet,
}

impl Default for KResource {
    fn default() -> Self {
        Self {
            api_version: None,
            kind: None,
            metadata: ObjectMeta::default(),
            status: Status::default(),
            condition_set: ConditionSet::living(),
        }
    }
}

impl KResource {
    /// Whether the status reflects the current metadata generation
    pub fn is_observed(&self) -> bool {
        self.metadata
            .generation
            .is_some_and(|generation| generation == self.status.observed_generation)
    }

    /// Records the current metadata generation as observed
    pub fn observe_generation(&mut self) {
        if let Some(generation) = self.metadata.generation {
            self.status.observed_generation = generation;
        }
    }
}

impl HasConditions for KResource {
    type Status = Status;

    fn status(&self) -> &Status {
        &self.status
    }

    fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }

    fn condition_set(&self) -> &ConditionSet {
        &self.condition_set
    }
}
