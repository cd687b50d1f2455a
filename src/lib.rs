//! covdiff - SimpleCov coverage diff
//!
//! A library for comparing two SimpleCov result sets with:
//! - Per-file line and branch coverage, floored to two decimals
//! - Sorted per-file diff of added, removed and changed files
//! - Markdown, console and JSON rendering with delta badges
//! - Pull request comments on GitHub

pub mod badge;
pub mod config;
pub mod coverage;
pub mod error;
pub mod notifications;
pub mod report;

pub use coverage::{
    diff, summarize, CoverageDelta, CoverageSnapshot, FileCoverageDiff, FileSummary, RawResultSet,
};
pub use error::{CoverageError, Result};
