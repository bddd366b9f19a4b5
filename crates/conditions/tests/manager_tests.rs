//! # Condition Manager Integration Tests
//!
//! End-to-end reconcile-pass scenarios against the public API.
//!
//! These tests verify:
//! - Aggregation precedence (False over Unknown, declaration order)
//! - Happiness once every dependent is True
//! - Warning-severity isolation
//! - Narrowing to v1beta1 and back

use conditions::duck::{v1, v1beta1};
use conditions::{
    Condition, ConditionSet, ConditionSeverity, ConditionStatus, ConditionType, HasConditions,
    ResourceStatus,
};
use std::collections::BTreeMap;

fn set_abc() -> ConditionSet {
    ConditionSet::new("Ready", ["A", "B", "C"]).unwrap()
}

#[test]
fn test_end_to_end_scenario() {
    let set = ConditionSet::living().with_dependents(["Foo"]).unwrap();
    let mut status = v1::Status::default();
    let mut mgr = set.manage(&mut status);

    mgr.initialize_conditions();
    assert_eq!(mgr.get_condition("Ready").unwrap().status, ConditionStatus::Unknown);

    mgr.mark_false("Foo", "bad", "for business");
    assert_eq!(mgr.get_condition("Ready").unwrap().status, ConditionStatus::False);

    mgr.mark_true("Foo");
    assert_eq!(mgr.get_condition("Ready").unwrap().status, ConditionStatus::True);
    assert!(mgr.is_happy());
}

#[test]
fn test_false_outranks_unknown_and_first_in_order_wins() {
    let set = set_abc();
    let mut status = v1::Status::default();
    let mut mgr = set.manage(&mut status);
    mgr.initialize_conditions();

    mgr.mark_false("A", "AFailed", "a failed");
    mgr.mark_true("B");
    mgr.mark_unknown("C", "CPending", "c pending");

    let top = mgr.top_level_condition().unwrap();
    assert_eq!(top.status, ConditionStatus::False);
    assert_eq!(top.reason, "AFailed");
    assert_eq!(top.message, "a failed");
}

#[test]
fn test_all_true_is_happy() {
    let set = set_abc();
    let mut status = v1::Status::default();
    let mut mgr = set.manage(&mut status);
    mgr.initialize_conditions();
    for t in ["A", "B", "C"] {
        assert!(!mgr.is_happy());
        mgr.mark_true(t);
    }

    let top = mgr.top_level_condition().unwrap();
    assert!(mgr.is_happy());
    assert_eq!(top.status, ConditionStatus::True);
    assert!(top.reason.is_empty());
    assert!(top.message.is_empty());
}

#[test]
fn test_recovery_clears_reason() {
    let set = set_abc();
    let mut status = v1::Status::default();
    let mut mgr = set.manage(&mut status);
    mgr.initialize_conditions();
    mgr.mark_true("A");
    mgr.mark_true("B");
    mgr.mark_false("C", "Broken", "c broke");
    mgr.mark_true_with_reason("C", "Fixed", "c recovered");

    let top = mgr.top_level_condition().unwrap();
    assert!(top.is_true());
    assert!(top.reason.is_empty());
    assert_eq!(mgr.get_condition("C").unwrap().reason, "Fixed");
}

#[test]
fn test_warning_dependent_never_blocks() {
    let set = set_abc();
    let mut status = v1::Status::default();
    let mut mgr = set.manage(&mut status);
    mgr.initialize_conditions();
    mgr.set_condition(
        Condition::new("C", ConditionStatus::False)
            .with_severity(ConditionSeverity::Warning)
            .with_reason("Degraded"),
    );
    mgr.mark_true("A");
    mgr.mark_true("B");
    assert!(mgr.is_happy());

    mgr.mark_unknown("C", "Checking", "");
    assert!(mgr.is_happy());
    mgr.mark_false("C", "Degraded", "again");
    assert!(mgr.is_happy());
}

#[test]
fn test_initialize_twice_is_idempotent() {
    let set = set_abc();
    let mut status = v1::Status::default();
    set.manage(&mut status).mark_false("B", "Bad", "");

    set.manage(&mut status).initialize_conditions();
    let once = status.clone();
    set.manage(&mut status).initialize_conditions();
    assert_eq!(status, once);
}

#[test]
fn test_read_only_queries_on_shared_status() {
    let set = set_abc();
    let mut status = v1::Status::default();
    set.manage(&mut status).initialize_conditions();

    let shared = &status;
    assert!(!set.is_happy(shared));
    assert!(set.top_level_condition(shared).unwrap().is_unknown());
    assert!(set.get_condition(shared, &"B".into()).is_some());
    assert!(set.get_condition(shared, &"Z".into()).is_none());
}

#[test]
fn test_absent_is_not_unknown() {
    let set = set_abc();
    let mut status = v1::Status::default();
    let mgr = set.manage(&mut status);
    assert!(mgr.get_condition("A").is_none());
    assert!(mgr.top_level_condition().is_none());
    assert!(!mgr.is_happy());
}

#[test]
fn test_narrowing_projection() {
    let set = ConditionSet::living().with_dependents(["Foo"]).unwrap();
    let annotations = BTreeMap::from([
        ("burning".to_owned(), "the".to_owned()),
        ("bridges".to_owned(), "down".to_owned()),
    ]);
    let mut status = v1::Status {
        observed_generation: 42,
        annotations: Some(annotations.clone()),
        ..v1::Status::default()
    };
    let mut mgr = set.manage(&mut status);
    mgr.initialize_conditions();
    mgr.mark_false("Foo", "bad", "for business");

    let narrow: v1beta1::Status = status.narrow(&set);
    assert_eq!(narrow.conditions.len(), 1);
    assert_eq!(narrow.conditions[0].r#type, ConditionType::READY);
    assert!(narrow.conditions[0].is_false());
    assert_eq!(narrow.conditions[0].reason, "bad");
    assert_eq!(narrow.observed_generation, 42);
    assert_eq!(narrow.annotations, Some(annotations));
    assert!(!set.is_happy(&narrow));

    let wide = v1::Status::widen(&narrow);
    assert!(wide.get_condition(&"Foo".into()).is_none());

    set.manage(&mut status).mark_true("Foo");
    assert!(set.is_happy(&status.narrow(&set)));
}

#[test]
fn test_batch_set_on_kresource_shape() {
    let set = ConditionSet::batch().with_dependents(["Built"]).unwrap();
    let mut resource = v1::KResource::default();
    let mut mgr = set.manage(resource.status_mut());
    mgr.initialize_conditions();
    mgr.mark_true("Built");

    assert_eq!(
        mgr.top_level_condition().unwrap().r#type,
        ConditionType::SUCCEEDED
    );
    assert!(mgr.is_happy());
    // The resource's own set is the living one, whose Ready was never set.
    assert!(!resource.is_happy());
}

#[test]
fn test_condition_set_from_yaml() {
    let set: ConditionSet = serde_yaml::from_str(
        "topLevel: Ready\ndependents:\n  - ConfigurationsReady\n  - RoutesReady\n",
    )
    .unwrap();
    assert_eq!(set.dependents().len(), 2);

    let err = serde_yaml::from_str::<ConditionSet>("topLevel: Ready\ndependents: [Ready]\n");
    assert!(err.is_err());
}

#[test]
fn test_status_document_roundtrip() {
    let doc = r#"
observedGeneration: 9
annotations:
  owner: team-a
conditions:
  - type: Ready
    status: "False"
    reason: RevisionFailed
    message: revision missing
    lastTransitionTime: "2024-03-04T05:06:07Z"
  - type: Logging
    status: "True"
    severity: Warning
"#;
    let status: v1::Status = serde_yaml::from_str(doc).unwrap();
    assert_eq!(status.observed_generation(), 9);
    assert_eq!(status.conditions().len(), 2);
    assert_eq!(
        status.get_condition(&"Logging".into()).unwrap().severity,
        ConditionSeverity::Warning
    );

    let json = serde_json::to_string(&status).unwrap();
    let back: v1::Status = serde_json::from_str(&json).unwrap();
    assert_eq!(back, status);
}
