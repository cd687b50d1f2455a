//! Notifications module
//!
//! Provides:
//! - GitHub pull request comments

mod github;

pub use github::*;
