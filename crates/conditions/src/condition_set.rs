//! # Condition Sets
//!
//! Declares which condition type is top-level and which types feed into it.
//!
//! A [`ConditionSet`] is an immutable value: build it once at startup, then
//! hand it to every manager that needs it. The two standard shapes are
//! [`ConditionSet::living`] (top-level `Ready`, for long-running resources) and
//! [`ConditionSet::batch`] (top-level `Succeeded`, for run-to-completion
//! resources).
//!
//! ```
//! use conditions::{ConditionSet, ConditionType};
//!
//! let set = ConditionSet::living()
//!     .with_dependents(["ConfigurationsReady", "RoutesReady"])
//!     .unwrap();
//! assert_eq!(set.top_level(), &ConditionType::READY);
//! assert_eq!(set.dependents().len(), 2);
//! ```

use crate::accessor::ResourceStatus;
use crate::condition::{Condition, ConditionSeverity, ConditionStatus, ConditionType};
use crate::manager::ConditionManager;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum length of a condition type, prefix included
pub const MAX_CONDITION_TYPE_LEN: usize = 316;

/// Kubernetes condition type pattern: optional DNS subdomain prefix, then a name
const CONDITION_TYPE_PATTERN: &str = concat!(
    r"^([a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*/)?",
    r"(([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9])$",
);

/// Construction-time validation failures of a [`ConditionSet`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConditionSetError {
    #[error("top-level condition {0} cannot also be a dependent")]
    TopLevelInDependents(ConditionType),
    #[error("condition type cannot be empty")]
    EmptyType,
    #[error("condition type {name:?} is invalid: {reason}")]
    InvalidType { name: String, reason: String },
}

/// Outcome of aggregating the dependents into the top-level condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub status: ConditionStatus,
    pub reason: String,
    pub message: String,
}

/// Top-level condition type plus its ordered, de-duplicated dependents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConditionSetConfig", into = "ConditionSetConfig")]
pub struct ConditionSet {
    top_level: ConditionType,
    dependents: Vec<ConditionType>,
}

impl ConditionSet {
    /// Builds a set, validating every type name
    ///
    /// Duplicate dependents are collapsed, keeping the first occurrence. Listing
    /// the top-level type as a dependent is rejected.
    pub fn new<I, T>(
        top_level: impl Into<ConditionType>,
        dependents: I,
    ) -> Result<Self, ConditionSetError>
    where
        I: IntoIterator<Item = T>,
        T: Into<ConditionType>,
    {
        let top_level = top_level.into();
        let pattern =
            Regex::new(CONDITION_TYPE_PATTERN).map_err(|e| ConditionSetError::InvalidType {
                name: top_level.to_string(),
                reason: format!("failed to compile condition type pattern: {e}"),
            })?;
        validate_type(&pattern, &top_level)?;

        let mut deps: Vec<ConditionType> = Vec::new();
        for dep in dependents {
            let dep = dep.into();
            validate_type(&pattern, &dep)?;
            if dep == top_level {
                return Err(ConditionSetError::TopLevelInDependents(dep));
            }
            if !deps.contains(&dep) {
                deps.push(dep);
            }
        }

        Ok(Self {
            top_level,
            dependents: deps,
        })
    }

    /// Set for long-running resources: top-level `Ready`, no dependents
    pub fn living() -> Self {
        Self {
            top_level: ConditionType::READY,
            dependents: Vec::new(),
        }
    }

    /// Set for run-to-completion resources: top-level `Succeeded`, no dependents
    pub fn batch() -> Self {
        Self {
            top_level: ConditionType::SUCCEEDED,
            dependents: Vec::new(),
        }
    }

    /// Same top-level type with additional dependents appended
    pub fn with_dependents<I, T>(&self, dependents: I) -> Result<Self, ConditionSetError>
    where
        I: IntoIterator<Item = T>,
        T: Into<ConditionType>,
    {
        let all = self
            .dependents
            .iter()
            .cloned()
            .chain(dependents.into_iter().map(Into::into))
            .collect::<Vec<_>>();
        Self::new(self.top_level.clone(), all)
    }

    pub fn top_level(&self) -> &ConditionType {
        &self.top_level
    }

    /// Dependents in declaration order
    pub fn dependents(&self) -> &[ConditionType] {
        &self.dependents
    }

    pub fn is_dependent(&self, t: &ConditionType) -> bool {
        self.dependents.contains(t)
    }

    /// Binds a manager to `status` for one reconcile pass
    pub fn manage<'a, S>(&'a self, status: &'a mut S) -> ConditionManager<'a, S>
    where
        S: ResourceStatus + ?Sized,
    {
        ConditionManager::new(self, status)
    }

    /// Condition of type `t` on `status`, if present
    pub fn get_condition<'s, S>(&self, status: &'s S, t: &ConditionType) -> Option<&'s Condition>
    where
        S: ResourceStatus + ?Sized,
    {
        status.get_condition(t)
    }

    pub fn top_level_condition<'s, S>(&self, status: &'s S) -> Option<&'s Condition>
    where
        S: ResourceStatus + ?Sized,
    {
        status.get_condition(&self.top_level)
    }

    /// True iff the top-level condition exists and is True
    pub fn is_happy<S>(&self, status: &S) -> bool
    where
        S: ResourceStatus + ?Sized,
    {
        self.top_level_condition(status).is_some_and(Condition::is_true)
    }

    /// Rolls the dependents up into a top-level outcome
    ///
    /// Returns `None` when the set has no dependents. Otherwise, scanning in
    /// declaration order and skipping `Warning` dependents:
    /// the first False dependent wins; failing that, the first Unknown or
    /// missing dependent; failing that, the outcome is True with empty
    /// reason and message.
    pub fn aggregate(&self, conditions: &[Condition]) -> Option<Aggregate> {
        if self.dependents.is_empty() {
            return None;
        }

        let mut first_unknown: Option<Aggregate> = None;
        for dep in &self.dependents {
            let Some(cond) = conditions.iter().find(|c| &c.r#type == dep) else {
                // Not initialized yet.
                first_unknown.get_or_insert_with(|| Aggregate {
                    status: ConditionStatus::Unknown,
                    reason: String::new(),
                    message: String::new(),
                });
                continue;
            };
            if cond.severity != ConditionSeverity::Error {
                continue;
            }
            match cond.status {
                ConditionStatus::False => {
                    return Some(Aggregate {
                        status: ConditionStatus::False,
                        reason: cond.reason.clone(),
                        message: cond.message.clone(),
                    });
                }
                ConditionStatus::Unknown => {
                    first_unknown.get_or_insert_with(|| Aggregate {
                        status: ConditionStatus::Unknown,
                        reason: cond.reason.clone(),
                        message: cond.message.clone(),
                    });
                }
                ConditionStatus::True => {}
            }
        }

        Some(first_unknown.unwrap_or(Aggregate {
            status: ConditionStatus::True,
            reason: String::new(),
            message: String::new(),
        }))
    }
}

fn validate_type(pattern: &Regex, t: &ConditionType) -> Result<(), ConditionSetError> {
    let name = t.as_str();
    if name.is_empty() {
        return Err(ConditionSetError::EmptyType);
    }
    if name.len() > MAX_CONDITION_TYPE_LEN {
        return Err(ConditionSetError::InvalidType {
            name: name.to_owned(),
            reason: format!("must be no more than {MAX_CONDITION_TYPE_LEN} characters"),
        });
    }
    if !pattern.is_match(name) {
        return Err(ConditionSetError::InvalidType {
            name: name.to_owned(),
            reason: "must be an optional DNS subdomain prefix and '/', followed by \
                     alphanumerics, '-', '_' or '.', starting and ending with an alphanumeric"
                .to_owned(),
        });
    }
    Ok(())
}

/// Named starting point for a condition set document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum Preset {
    /// Top-level `Ready`
    Living,
    /// Top-level `Succeeded`
    Batch,
}

/// Serialized form of a [`ConditionSet`]
///
/// ```yaml
/// topLevel: Ready
/// dependents:
///   - ConfigurationsReady
///   - RoutesReady
/// ```
///
/// `preset` may be given instead of `topLevel`; when neither is set the
/// top-level type is `Ready`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionSetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<Preset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_level: Option<ConditionType>,
    #[serde(default)]
    pub dependents: Vec<ConditionType>,
}

impl TryFrom<ConditionSetConfig> for ConditionSet {
    type Error = ConditionSetError;

    fn try_from(config: ConditionSetConfig) -> Result<Self, Self::Error> {
        let top_level = match (config.top_level, config.preset) {
            (Some(t), _) => t,
            (None, Some(Preset::Batch)) => ConditionType::SUCCEEDED,
            (None, Some(Preset::Living) | None) => ConditionType::READY,
        };
        ConditionSet::new(top_level, config.dependents)
    }
}

impl From<ConditionSet> for ConditionSetConfig {
    fn from(set: ConditionSet) -> Self {
        Self {
            preset: None,
            top_level: Some(set.top_level),
            dependents: set.dependents,
        }
    }
}
