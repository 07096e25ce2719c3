//! Operations that drive az against configured pipelines

pub mod access;
pub mod repository;
pub mod runs;
pub mod trigger;

pub use access::{test_access, AccessReport, PipelineInfo};
pub use runs::{RunListing, RunLister};
pub use trigger::{
    is_auth_failure, AbortPredicate, RunSummary, TriggerAttemptResult, TriggerOrchestrator,
    TriggerRequest,
};
