//! # Conditions
//!
//! The condition record and its enumerations.
//!
//! A condition describes one named aspect of a resource's health. The wire
//! shape matches the Kubernetes convention (`type`, `status`, `severity`,
//! `reason`, `message`, `lastTransitionTime`), with `severity`, `reason` and
//! `message` omitted when empty.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Identifier of a condition, e.g. `Ready` or `ConfigurationsReady`
///
/// The engine fixes no vocabulary; callers define their own types.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct ConditionType(Cow<'static, str>);

impl ConditionType {
    /// Top-level type of long-running resources
    pub const READY: ConditionType = ConditionType::from_static("Ready");

    /// Top-level type of run-to-completion resources
    pub const SUCCEEDED: ConditionType = ConditionType::from_static("Succeeded");

    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ConditionType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConditionType {
    fn from(name: &str) -> Self {
        Self(Cow::Owned(name.to_owned()))
    }
}

impl From<String> for ConditionType {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl From<&ConditionType> for ConditionType {
    fn from(t: &ConditionType) -> Self {
        t.clone()
    }
}

impl PartialEq<str> for ConditionType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ConditionType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Three-valued status of a condition
///
/// `Unknown` is the initial state of every managed condition and is distinct
/// from the condition being absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

impl ConditionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ConditionStatus::True => "True",
            ConditionStatus::False => "False",
            ConditionStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ConditionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a failing condition blocks the top-level condition
///
/// Only `Error` conditions take part in aggregation. `Warning` conditions are
/// informational. An empty severity on the wire reads as `Error`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize, JsonSchema)]
pub enum ConditionSeverity {
    #[default]
    #[serde(alias = "")]
    Error,
    Warning,
}

impl ConditionSeverity {
    pub fn is_error(&self) -> bool {
        matches!(self, ConditionSeverity::Error)
    }
}

/// Condition represents one observed aspect of a resource's health
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition
    pub r#type: ConditionType,
    /// Status of the condition (True, False, Unknown)
    pub status: ConditionStatus,
    /// Severity with which to treat failures of this condition
    #[serde(default, skip_serializing_if = "ConditionSeverity::is_error")]
    pub severity: ConditionSeverity,
    /// Last time the condition's status changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,
    /// One-word CamelCase reason for the last transition
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
    /// Human-readable details about the last transition
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

impl Condition {
    pub fn new(r#type: impl Into<ConditionType>, status: ConditionStatus) -> Self {
        Self {
            r#type: r#type.into(),
            status,
            severity: ConditionSeverity::Error,
            last_transition_time: None,
            reason: String::new(),
            message: String::new(),
        }
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    #[must_use]
    pub fn with_severity(mut self, severity: ConditionSeverity) -> Self {
        self.severity = severity;
        self
    }

    #[must_use]
    pub fn with_last_transition_time(mut self, at: DateTime<Utc>) -> Self {
        self.last_transition_time = Some(at);
        self
    }

    pub fn is_true(&self) -> bool {
        self.status == ConditionStatus::True
    }

    pub fn is_false(&self) -> bool {
        self.status == ConditionStatus::False
    }

    pub fn is_unknown(&self) -> bool {
        self.status == ConditionStatus::Unknown
    }

    /// Compares everything except the transition timestamp
    pub(crate) fn same_observation(&self, other: &Condition) -> bool {
        self.r#type == other.r#type
            && self.status == other.status
            && self.severity == other.severity
            && self.reason == other.reason
            && self.message == other.message
    }
}
