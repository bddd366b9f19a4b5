//! # Conditions
//!
//! Status-condition aggregation engine for reconcilers that drive a resource
//! towards its desired state.
//!
//! ## Overview
//!
//! A resource's status carries independently updated sub-signals
//! ("conditions"). This crate rolls them up into a single top-level condition
//! (e.g. `Ready`) that consumers can poll without knowing the resource's
//! internals:
//!
//! 1. **Condition** - one timestamped (type, status, severity, reason, message) record
//! 2. **ConditionSet** - which type is top-level and which types are its dependents
//! 3. **ConditionManager** - mutates one status and recomputes the top-level condition
//! 4. **ResourceStatus** - the contract a status type implements to be managed
//!
//! The engine performs no I/O. Persisting the mutated status is the caller's
//! job.

pub mod accessor;
pub mod condition;
pub mod condition_set;
pub mod conversion;
pub mod duck;
pub mod manager;

pub use accessor::{HasConditions, ResourceStatus};
pub use condition::{Condition, ConditionSeverity, ConditionStatus, ConditionType};
pub use condition_set::{Aggregate, ConditionSet, ConditionSetConfig, ConditionSetError, Preset};
pub use conversion::{ApiVersion, ConversionError, VersionedAddressable, VersionedStatus};
pub use manager::ConditionManager;
