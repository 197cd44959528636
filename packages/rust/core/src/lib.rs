//! Core pipeline orchestration for regwatch.
//!
//! This crate ties together the store, source adapters, classifier,
//! deduplicator, dashboard patch, and digest into one monitoring pass
//! ([`pipeline::run_monitor`]).

pub mod dashboard;
pub mod dedup;
pub mod pipeline;

pub use dashboard::{DASHBOARD_MARKER, DashboardOutcome, patch_dashboard, patch_dashboard_html};
pub use dedup::{Admitted, TitleIndex, admit, renumber, reset_new_flags};
pub use pipeline::{
    MonitorConfig, ProgressReporter, RunSummary, SilentProgress, SourceReport, configured_sources,
    run_monitor,
};
