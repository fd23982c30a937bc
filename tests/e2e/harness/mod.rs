//! E2E test harness for lxq.
//!
//! Scenarios build a tagged git history in a temporary working copy, then
//! drive a real `SnapshotAccessService` against it.

pub mod assertions;
pub mod scenario;

// Re-export commonly used types
pub use assertions::{Assertion, Query};
pub use scenario::Scenario;
