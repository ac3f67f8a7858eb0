//! Swap status reconciliation
//!
//! Folds the order store, relay logs and matching engine into one report.

mod flags;
mod reconciler;
mod report;
pub mod timestamp;

pub use flags::StatusFlags;
pub use reconciler::{ReconcilerSettings, StatusReconciler};
pub use report::{Outcome, StatusReport};
pub use timestamp::normalize_timestamp;
