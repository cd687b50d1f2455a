//! Coverage diff between two snapshots

use serde::Serialize;
use std::collections::BTreeSet;

use super::{CoverageSnapshot, FileSummary};
use crate::error::{CoverageError, Result};

/// Value of one metric before and after; `None` when the file is absent on that side
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoverageDelta {
    pub from: Option<f64>,
    pub to: Option<f64>,
}

impl CoverageDelta {
    pub fn is_added(&self) -> bool {
        self.from.is_none() && self.to.is_some()
    }

    pub fn is_removed(&self) -> bool {
        self.from.is_some() && self.to.is_none()
    }

    /// `to - from` when the file exists on both sides
    pub fn change(&self) -> Option<f64> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => Some(to - from),
            _ => None,
        }
    }
}

/// How one file's coverage changed between two snapshots
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileCoverageDiff {
    pub filename: String,
    pub lines: CoverageDelta,
    pub branches: CoverageDelta,
}

/// Diff two snapshots, ordered by filename.
///
/// Files whose line and branch percentages are both unchanged are omitted.
pub fn diff(from: &CoverageSnapshot, to: &CoverageSnapshot) -> Result<Vec<FileCoverageDiff>> {
    let filenames: BTreeSet<&str> = from.filenames().chain(to.filenames()).collect();

    let mut diffs = Vec::new();
    for filename in filenames {
        let old = from.get(filename);
        let new = to.get(filename);
        if is_difference(old, new) {
            diffs.push(make_diff(filename, old, new)?);
        }
    }

    tracing::debug!(
        from = from.len(),
        to = to.len(),
        changed = diffs.len(),
        "diffed coverage snapshots"
    );

    Ok(diffs)
}

fn is_difference(old: Option<&FileSummary>, new: Option<&FileSummary>) -> bool {
    match (old, new) {
        (None, None) => false,
        (Some(old), Some(new)) => old.lines != new.lines || old.branches != new.branches,
        _ => true,
    }
}

/// Build the diff entry for `filename`
pub fn make_diff(
    filename: &str,
    old: Option<&FileSummary>,
    new: Option<&FileSummary>,
) -> Result<FileCoverageDiff> {
    if old.is_none() && new.is_none() {
        return Err(CoverageError::InternalConsistency {
            filename: filename.to_string(),
        });
    }

    Ok(FileCoverageDiff {
        filename: filename.to_string(),
        lines: CoverageDelta {
            from: old.map(|f| f.lines),
            to: new.map(|f| f.lines),
        },
        branches: CoverageDelta {
            from: old.map(|f| f.branches),
            to: new.map(|f| f.branches),
        },
    })
}
