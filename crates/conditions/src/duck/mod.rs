//! # Duck Types
//!
//! Versioned status shapes shared across resource kinds.
//!
//! `v1` is the native, wide representation the engine operates on. `v1beta1`
//! is a narrower historical representation that only understood the
//! top-level condition.

pub mod v1;
pub mod v1beta1;

use crate::accessor::{HasConditions, ResourceStatus};
use crate::condition::{Condition, ConditionType};
use crate::condition_set::ConditionSet;
use tracing::trace;

// Every status shape must stay usable by the condition manager.
const _: () = {
    const fn assert_resource_status<T: ResourceStatus>() {}
    const fn assert_has_conditions<T: HasConditions>() {}
    assert_resource_status::<v1::Status>();
    assert_resource_status::<v1beta1::Status>();
    assert_has_conditions::<v1::KResource>();
};

/// Copies conditions, observed generation and annotations into a new shape
pub(crate) fn carry_over<S, T>(source: &S) -> T
where
    S: ResourceStatus + ?Sized,
    T: ResourceStatus + Default,
{
    let mut target = T::default();
    target.set_observed_generation(source.observed_generation());
    *target.annotations_mut() = source.annotations().cloned();
    *target.conditions_mut() = source.conditions().to_vec();
    target
}

/// Projects `source` onto a narrower shape
///
/// The top-level condition is recomputed on the copy when it is stale; then
/// only it and the conditions accepted by `retain` are kept.
pub(crate) fn project<S, T, P>(source: &S, set: &ConditionSet, retain: P) -> T
where
    S: ResourceStatus + ?Sized,
    T: ResourceStatus + Default,
    P: Fn(&ConditionType) -> bool,
{
    let mut target: T = carry_over(source);
    if let Some(outcome) = set.aggregate(target.conditions()) {
        let stale = set.top_level_condition(&target).is_none_or(|c| {
            c.status != outcome.status
                || c.reason != outcome.reason
                || c.message != outcome.message
        });
        if stale {
            let top = Condition::new(set.top_level().clone(), outcome.status)
                .with_reason(outcome.reason)
                .with_message(outcome.message);
            set.manage(&mut target).set_condition(top);
        }
    }

    target.conditions_mut().retain(|c| {
        let keep = &c.r#type == set.top_level() || retain(&c.r#type);
        if !keep {
            trace!("Dropping condition {} while narrowing", c.r#type);
        }
        keep
    });
    target
}
