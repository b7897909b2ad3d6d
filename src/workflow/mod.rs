//! Leave application workflow engine.
//!
//! Applications move `PENDING_FACULTY -> PENDING_HOD -> APPROVED`, or to
//! `REJECTED` from either pending state. Every operation is gated by a single
//! `(role, capability)` policy and every status write is a compare-and-swap
//! against the store.

pub mod actor;
pub mod engine;
pub mod error;
pub mod policy;
pub mod state;
pub mod store;
pub mod summary;

#[cfg(test)]
pub(crate) mod tests;

pub use actor::Actor;
pub use engine::{LeaveRequest, LeaveWorkflow};
pub use error::WorkflowError;
pub use policy::ApplicationScope;
pub use state::LeaveAction;
pub use store::{ApplicationStore, StatusPatch, StoreError, UserDirectory};
pub use summary::ApplicationSummary;
