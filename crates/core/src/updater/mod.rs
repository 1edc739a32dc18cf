//! Update pipeline - reconciles the local catalog against the upstream
//! source under bounded concurrency.
//!
//! One pass enumerates upstream ids, skips the ones already present, and
//! fans the rest out to a fixed worker pool. Upstream gaps become
//! placeholder rows; transient upstream errors are logged and left for the
//! next pass. A successful pass publishes a single "db updated" event.

mod service;
mod types;

pub use service::UpdateService;
pub use types::{UpdateError, UpdateStats, UpdateStatus};
