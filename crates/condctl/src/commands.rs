//! # Commands
//!
//! Loads documents, applies one engine operation, renders the result.

use crate::config::OutputFormat;
use anyhow::{Context, Result};
use conditions::duck::{v1, v1beta1};
use conditions::ConditionSet;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// One operation against a loaded status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Initialize,
    MarkTrue {
        r#type: String,
        reason: Option<String>,
        message: Option<String>,
    },
    MarkFalse {
        r#type: String,
        reason: String,
        message: String,
    },
    MarkUnknown {
        r#type: String,
        reason: String,
        message: String,
    },
    Clear {
        r#type: String,
    },
}

/// Outcome of a command: what to print and whether it counts as success
#[derive(Debug)]
pub struct Outcome {
    pub output: String,
    pub success: bool,
}

impl Outcome {
    fn ok(output: String) -> Self {
        Self {
            output,
            success: true,
        }
    }
}

/// Reads a document from `path`, or stdin when `path` is `None` or `-`
///
/// YAML is a superset of JSON, so both are accepted.
pub fn load_document<T: DeserializeOwned>(path: Option<&Path>) -> Result<T> {
    let raw = match path {
        Some(p) if p != Path::new("-") => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read {}", p.display()))?,
        _ => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read document from stdin")?;
            buf
        }
    };
    parse_document(&raw)
}

pub fn parse_document<T: DeserializeOwned>(raw: &str) -> Result<T> {
    if raw.trim().is_empty() {
        return serde_yaml::from_str("{}").context("Failed to parse empty document");
    }
    serde_yaml::from_str(raw).context("Failed to parse document")
}

/// Loads the condition set, falling back to the living set without dependents
pub fn load_condition_set(path: Option<&Path>) -> Result<ConditionSet> {
    match path {
        Some(p) => {
            let set: ConditionSet = load_document(Some(p))
                .with_context(|| format!("Invalid condition set in {}", p.display()))?;
            debug!(
                "Loaded condition set: top-level={}, dependents={:?}",
                set.top_level(),
                set.dependents()
            );
            Ok(set)
        }
        None => Ok(ConditionSet::living()),
    }
}

pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(value).context("Failed to encode JSON output")
        }
        OutputFormat::Yaml => serde_yaml::to_string(value).context("Failed to encode YAML output"),
    }
}

/// Applies `op` to `status` in place
pub fn apply(set: &ConditionSet, status: &mut v1::Status, op: &Operation) {
    let mut mgr = set.manage(status);
    match op {
        Operation::Initialize => mgr.initialize_conditions(),
        Operation::MarkTrue {
            r#type,
            reason,
            message,
        } => mgr.mark_true_with_reason(
            r#type.as_str(),
            reason.clone().unwrap_or_default(),
            message.as_deref().unwrap_or_default(),
        ),
        Operation::MarkFalse {
            r#type,
            reason,
            message,
        } => mgr.mark_false(r#type.as_str(), reason.as_str(), message),
        Operation::MarkUnknown {
            r#type,
            reason,
            message,
        } => mgr.mark_unknown(r#type.as_str(), reason.as_str(), message),
        Operation::Clear { r#type } => {
            if mgr.clear_condition(r#type).is_none() {
                debug!("Condition {} was not present", r#type);
            }
        }
    }
    info!(
        "Applied {:?}; top-level {}",
        op,
        mgr.top_level_condition()
            .map_or("absent", |c| c.status.as_str())
    );
}

pub fn mutate(
    set: &ConditionSet,
    mut status: v1::Status,
    op: &Operation,
    format: OutputFormat,
) -> Result<Outcome> {
    apply(set, &mut status, op);
    Ok(Outcome::ok(render(&status, format)?))
}

pub fn get(status: &v1::Status, r#type: &str, format: OutputFormat) -> Result<Outcome> {
    match status.conditions.iter().find(|c| c.r#type == r#type) {
        Some(condition) => Ok(Outcome::ok(render(condition, format)?)),
        None => Ok(Outcome {
            output: format!("condition {} not found", r#type),
            success: false,
        }),
    }
}

pub fn happy(set: &ConditionSet, status: &v1::Status) -> Outcome {
    let happy = set.is_happy(status);
    Outcome {
        output: happy.to_string(),
        success: happy,
    }
}

pub fn narrow(set: &ConditionSet, status: &v1::Status, format: OutputFormat) -> Result<Outcome> {
    Ok(Outcome::ok(render(&status.narrow(set), format)?))
}

pub fn widen(status: &v1beta1::Status, format: OutputFormat) -> Result<Outcome> {
    Ok(Outcome::ok(render(&v1::Status::widen(status), format)?))
}

pub fn schema(format: OutputFormat) -> Result<Outcome> {
    let schema = schemars::schema_for!(v1::Status);
    Ok(Outcome::ok(render(&schema, format)?))
}
