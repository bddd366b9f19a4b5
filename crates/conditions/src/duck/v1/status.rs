//! # v1 Status
//!
//! The native status shape: full condition list, observed generation and
//! status annotations.

use crate::accessor::ResourceStatus;
use crate::condition::{Condition, ConditionType};
use crate::condition_set::ConditionSet;
use crate::duck::{self, v1beta1};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status shared by every resource kind that reports conditions
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Generation last processed by the controller
    #[serde(default, skip_serializing_if = "is_zero")]
    pub observed_generation: i64,
    /// Latest available observations of the resource's state
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
    /// Controller-owned status annotations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

#[allow(clippy::trivially_copy_pass_by_ref, reason = "serde skip_serializing_if takes a reference")]
fn is_zero(n: &i64) -> bool {
    *n == 0
}

impl ResourceStatus for Status {
    fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    fn conditions_mut(&mut self) -> &mut Vec<Condition> {
        &mut self.conditions
    }

    fn observed_generation(&self) -> i64 {
        self.observed_generation
    }

    fn set_observed_generation(&mut self, generation: i64) {
        self.observed_generation = generation;
    }

    fn annotations(&self) -> Option<&BTreeMap<String, String>> {
        self.annotations.as_ref()
    }

    fn annotations_mut(&mut self) -> &mut Option<BTreeMap<String, String>> {
        &mut self.annotations
    }
}

impl Status {
    /// Projects this status onto the v1beta1 shape
    ///
    /// The top-level condition is recomputed on a copy first, then it is the
    /// only condition kept. Dependents do not survive the projection.
    pub fn narrow(&self, set: &ConditionSet) -> v1beta1::Status {
        self.narrow_retaining(set, |_| false)
    }

    /// Like [`Status::narrow`], also keeping conditions accepted by `retain`
    pub fn narrow_retaining<P>(&self, set: &ConditionSet, retain: P) -> v1beta1::Status
    where
        P: Fn(&ConditionType) -> bool,
    {
        duck::project(self, set, retain)
    }

    /// Reads a v1beta1 status back into the native shape
    ///
    /// Lossy by construction: dependents dropped by narrowing are not
    /// reconstructed.
    pub fn widen(narrow: &v1beta1::Status) -> Self {
        duck::carry_over(narrow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::ConditionStatus;

    fn annotated() -> Status {
        Status {
            observed_generation: 42,
            conditions: Vec::new(),
            annotations: Some(BTreeMap::from([
                ("burning".to_owned(), "the".to_owned()),
                ("bridges".to_owned(), "down".to_owned()),
            ])),
        }
    }

    #[test]
    fn test_narrow_keeps_only_top_level() {
        let set = ConditionSet::living().with_dependents(["Foo"]).unwrap();
        let mut status = annotated();
        let mut mgr = set.manage(&mut status);
        mgr.initialize_conditions();
        mgr.mark_false("Foo", "bad", "for business");

        let narrow = status.narrow(&set);
        assert_eq!(narrow.conditions.len(), 1);
        let ready = &narrow.conditions[0];
        assert_eq!(ready.r#type, ConditionType::READY);
        assert_eq!(ready.status, ConditionStatus::False);
        assert_eq!(ready.reason, "bad");
        assert_eq!(narrow.observed_generation, 42);
        assert_eq!(narrow.annotations, status.annotations);
    }

    #[test]
    fn test_narrow_recomputes_stale_top_level() {
        let set = ConditionSet::living().with_dependents(["Foo"]).unwrap();
        // Written without a manager, so Ready does not reflect Foo.
        let status = Status {
            conditions: vec![
                Condition::new("Foo", ConditionStatus::False).with_reason("bad"),
                Condition::new("Ready", ConditionStatus::True),
            ],
            ..Status::default()
        };

        let narrow = status.narrow(&set);
        assert_eq!(narrow.conditions.len(), 1);
        assert!(narrow.conditions[0].is_false());
        assert_eq!(narrow.conditions[0].reason, "bad");
    }

    #[test]
    fn test_narrow_retaining_predicate() {
        let set = ConditionSet::living().with_dependents(["Foo", "Bar"]).unwrap();
        let mut status = Status::default();
        set.manage(&mut status).initialize_conditions();

        let narrow = status.narrow_retaining(&set, |t| t == "Bar");
        let types: Vec<&str> = narrow.conditions.iter().map(|c| c.r#type.as_str()).collect();
        assert_eq!(types, vec!["Bar", "Ready"]);
    }

    #[test]
    fn test_nil_annotations_stay_nil() {
        let set = ConditionSet::living();
        let status = Status {
            observed_generation: 7,
            ..Status::default()
        };
        let narrow = status.narrow(&set);
        assert!(narrow.annotations.is_none());
        assert!(narrow.conditions.is_empty());
    }

    #[test]
    fn test_widen_does_not_reconstruct_dependents() {
        let set = ConditionSet::living().with_dependents(["Foo"]).unwrap();
        let mut status = annotated();
        set.manage(&mut status).initialize_conditions();

        let wide = Status::widen(&status.narrow(&set));
        assert_eq!(wide.conditions.len(), 1);
        assert!(wide.get_condition(&"Foo".into()).is_none());
        assert_eq!(wide.observed_generation, 42);
        assert_eq!(wide.annotations, status.annotations);
    }

    #[test]
    fn test_serialized_shape() {
        let status = Status {
            observed_generation: 3,
            conditions: vec![Condition::new("Ready", ConditionStatus::True)],
            annotations: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "observedGeneration": 3,
                "conditions": [{"type": "Ready", "status": "True"}]
            })
        );
    }
}
