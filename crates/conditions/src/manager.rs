//! # Condition Manager
//!
//! Mutates and queries the condition list of one bound status.
//!
//! Every mutation keeps condition types unique and the list sorted by type.
//! After a mutation of a dependent condition the top-level condition is
//! recomputed from the dependents (see [`ConditionSet::aggregate`]).
//!
//! A reconciler typically does:
//!
//! ```
//! use conditions::duck::v1::Status;
//! use conditions::{ConditionSet, ConditionStatus, ConditionType};
//!
//! let set = ConditionSet::living().with_dependents(["Foo"]).unwrap();
//! let mut status = Status::default();
//!
//! let mut mgr = set.manage(&mut status);
//! mgr.initialize_conditions();
//! mgr.mark_false("Foo", "bad", "for business");
//! assert_eq!(mgr.top_level_condition().unwrap().status, ConditionStatus::False);
//!
//! mgr.mark_true("Foo");
//! assert!(mgr.is_happy());
//! ```

use crate::accessor::ResourceStatus;
use crate::condition::{Condition, ConditionSeverity, ConditionStatus, ConditionType};
use crate::condition_set::ConditionSet;
use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::fmt;
use tracing::{debug, trace};

/// Engine bound to one [`ResourceStatus`] for the duration of a reconcile pass
///
/// The manager does no locking; callers serialize access to a given status.
pub struct ConditionManager<'a, S: ResourceStatus + ?Sized> {
    set: Cow<'a, ConditionSet>,
    status: &'a mut S,
    now: Option<DateTime<Utc>>,
}

impl<S: ResourceStatus + ?Sized> fmt::Debug for ConditionManager<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionManager")
            .field("set", &self.set)
            .field("conditions", &self.status.conditions())
            .field("now", &self.now)
            .finish()
    }
}

impl<'a, S: ResourceStatus + ?Sized> ConditionManager<'a, S> {
    pub fn new(set: &'a ConditionSet, status: &'a mut S) -> Self {
        Self {
            set: Cow::Borrowed(set),
            status,
            now: None,
        }
    }

    pub(crate) fn owned_set(set: ConditionSet, status: &'a mut S) -> Self {
        Self {
            set: Cow::Owned(set),
            status,
            now: None,
        }
    }

    /// Pins every timestamp written by this manager to `now`
    ///
    /// Conditions that change together in one pass then carry identical
    /// transition times. Without a pin, each mutating call samples the clock.
    #[must_use]
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn condition_set(&self) -> &ConditionSet {
        &self.set
    }

    pub fn status(&self) -> &S {
        &*self.status
    }

    /// Adds every condition of the set that is missing, as Unknown
    ///
    /// Conditions already present are never touched, so running this twice is
    /// the same as running it once. When the top-level condition is already
    /// True, missing dependents are added as True so it does not regress.
    pub fn initialize_conditions(&mut self) {
        let top_level = self.set.top_level().clone();
        let initial = match self.status.get_condition(&top_level) {
            Some(top) if top.is_true() => ConditionStatus::True,
            Some(_) => ConditionStatus::Unknown,
            None => {
                self.upsert(Condition::new(top_level, ConditionStatus::Unknown));
                ConditionStatus::Unknown
            }
        };

        let missing: Vec<ConditionType> = self
            .set
            .dependents()
            .iter()
            .filter(|t| self.status.get_condition(t).is_none())
            .cloned()
            .collect();
        for t in missing {
            self.upsert(Condition::new(t, initial));
        }

        self.recompute_top_level();
    }

    /// Condition of type `t`, or `None` if it has not been initialized
    pub fn get_condition(&self, t: impl AsRef<str>) -> Option<&Condition> {
        let t = t.as_ref();
        self.status.conditions().iter().find(|c| c.r#type == t)
    }

    pub fn top_level_condition(&self) -> Option<&Condition> {
        self.status.get_condition(self.set.top_level())
    }

    /// True iff the top-level condition exists and is True
    pub fn is_happy(&self) -> bool {
        self.top_level_condition().is_some_and(Condition::is_true)
    }

    /// Upserts an arbitrary condition
    ///
    /// The transition time is managed here: it is carried over when the status
    /// is unchanged and stamped otherwise. Upserting a dependent recomputes the
    /// top-level condition.
    pub fn set_condition(&mut self, condition: Condition) {
        let t = condition.r#type.clone();
        self.upsert(condition);
        if self.set.is_dependent(&t) {
            self.recompute_top_level();
        }
    }

    pub fn mark_true(&mut self, t: impl Into<ConditionType>) {
        self.mark_true_with_reason(t, "", "");
    }

    /// Marks `t` True with the given reason and message
    ///
    /// Marking the top-level type True sets it unconditionally; marking a
    /// dependent recomputes the top-level condition.
    pub fn mark_true_with_reason(
        &mut self,
        t: impl Into<ConditionType>,
        reason: impl Into<String>,
        message: impl fmt::Display,
    ) {
        let t = t.into();
        let condition = Condition::new(t.clone(), ConditionStatus::True)
            .with_severity(self.severity_of(&t))
            .with_reason(reason)
            .with_message(message.to_string());
        self.upsert(condition);

        if self.set.is_dependent(&t) {
            self.recompute_top_level();
        }
    }

    /// Marks `t` False
    ///
    /// For a dependent, the top-level condition becomes False too. Its reason
    /// comes from the first False dependent in declaration order, so mark
    /// failures in priority order if one should dominate. `message` accepts
    /// `format_args!` for formatted messages.
    pub fn mark_false(
        &mut self,
        t: impl Into<ConditionType>,
        reason: impl Into<String>,
        message: impl fmt::Display,
    ) {
        let t = t.into();
        let condition = Condition::new(t.clone(), ConditionStatus::False)
            .with_severity(self.severity_of(&t))
            .with_reason(reason)
            .with_message(message.to_string());
        self.upsert(condition);

        if self.set.is_dependent(&t) {
            self.recompute_top_level();
        }
    }

    /// Marks `t` Unknown
    ///
    /// For an Error-severity dependent, the top-level condition becomes Unknown
    /// with this reason unless some dependent is already False, in which case
    /// it stays False.
    pub fn mark_unknown(
        &mut self,
        t: impl Into<ConditionType>,
        reason: impl Into<String>,
        message: impl fmt::Display,
    ) {
        let t = t.into();
        let severity = self.severity_of(&t);
        let reason = reason.into();
        let message = message.to_string();
        let condition = Condition::new(t.clone(), ConditionStatus::Unknown)
            .with_severity(severity)
            .with_reason(reason.clone())
            .with_message(message.clone());
        self.upsert(condition);

        if !self.set.is_dependent(&t) {
            return;
        }
        if severity.is_error() && !self.has_failed_dependent() {
            let top = Condition::new(self.set.top_level().clone(), ConditionStatus::Unknown)
                .with_reason(reason)
                .with_message(message);
            self.upsert(top);
        } else {
            self.recompute_top_level();
        }
    }

    /// Removes the condition of type `t`, returning it if it was present
    ///
    /// Removing a dependent recomputes the top-level condition; the missing
    /// dependent then counts as Unknown.
    pub fn clear_condition(&mut self, t: impl AsRef<str>) -> Option<Condition> {
        let t = t.as_ref();
        let conditions = self.status.conditions_mut();
        let idx = conditions.iter().position(|c| c.r#type == t)?;
        let removed = conditions.remove(idx);
        conditions.retain(|c| c.r#type != t);
        debug!("Cleared condition {}", removed.r#type);

        if self.set.is_dependent(&removed.r#type) {
            self.recompute_top_level();
        }
        Some(removed)
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    fn severity_of(&self, t: &ConditionType) -> ConditionSeverity {
        self.status
            .get_condition(t)
            .map_or(ConditionSeverity::Error, |c| c.severity)
    }

    fn has_failed_dependent(&self) -> bool {
        self.set.dependents().iter().any(|dep| {
            self.status
                .get_condition(dep)
                .is_some_and(|c| c.severity.is_error() && c.is_false())
        })
    }

    /// Rewrites the top-level condition from the dependents
    ///
    /// No-op for sets without dependents: their top-level condition is only
    /// driven by direct marks.
    fn recompute_top_level(&mut self) {
        let Some(outcome) = self.set.aggregate(self.status.conditions()) else {
            return;
        };
        debug!(
            top_level = %self.set.top_level(),
            status = %outcome.status,
            reason = %outcome.reason,
            "Recomputed top-level condition"
        );
        let top = Condition::new(self.set.top_level().clone(), outcome.status)
            .with_reason(outcome.reason)
            .with_message(outcome.message);
        self.upsert(top);
    }

    /// Replaces any condition of the same type, stamping the transition time
    ///
    /// Returns false when the update carried no change.
    fn upsert(&mut self, mut condition: Condition) -> bool {
        let now = self.now();
        let conditions = self.status.conditions_mut();
        let mut same_type = conditions.iter().filter(|c| c.r#type == condition.r#type);
        let existing = same_type.next().cloned();
        let duplicated = same_type.next().is_some();

        match existing {
            Some(existing) if !duplicated && existing.same_observation(&condition) => {
                trace!("Skipping no-op update of condition {}", condition.r#type);
                return false;
            }
            Some(existing) if existing.status == condition.status => {
                condition.last_transition_time = existing.last_transition_time;
            }
            Some(existing) => {
                // Never move a transition time backwards.
                let at = existing
                    .last_transition_time
                    .map_or(now, |previous| previous.max(now));
                condition.last_transition_time = Some(at);
                debug!(
                    "Condition {} transitioned {} -> {}",
                    condition.r#type, existing.status, condition.status
                );
            }
            None => {
                condition.last_transition_time = Some(now);
                debug!(
                    "Condition {} added as {}",
                    condition.r#type, condition.status
                );
            }
        }

        conditions.retain(|c| c.r#type != condition.r#type);
        conditions.push(condition);
        conditions.sort_by(|a, b| a.r#type.cmp(&b.r#type));
        true
    }
}
