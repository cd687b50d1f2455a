//! Coverage module
//!
//! Provides:
//! - SimpleCov result set parsing
//! - Per-file line/branch percentage summaries
//! - Set-based diff between two summaries

mod diff;
mod resultset;
mod summary;

pub use diff::*;
pub use resultset::*;
pub use summary::*;

/// Run identifier SimpleCov uses for RSpec suites
pub const DEFAULT_RUN_NAME: &str = "RSpec";
