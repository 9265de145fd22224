//! Port contracts for the assembly lifecycle.
//!
//! Ports define infrastructure-agnostic interfaces used by assembly services:
//! the task store, the job catalog, and the replacement order sink.

pub mod catalog;
pub mod replacement;
pub mod store;

pub use catalog::{
    JobCatalog, JobCatalogError, JobCatalogResult, JobProfile, RoleTemplate, StageTemplate,
};
pub use replacement::{
    ReplacementLineItem, ReplacementOrderError, ReplacementOrderRequest, ReplacementOrderResult,
    ReplacementOrderSink,
};
pub use store::{JobMutator, TaskMutator, TaskQuery, TaskStore, TaskStoreError, TaskStoreResult};
