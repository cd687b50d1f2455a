//! Per-file coverage percentages

use serde::Serialize;
use std::collections::BTreeMap;

use super::{RawBranchCoverage, RawLineCoverage, RawResultSet};
use crate::error::{CoverageError, Result};

/// Line and branch coverage of a single file, in percent
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileSummary {
    pub filename: String,
    pub lines: f64,
    pub branches: f64,
}

/// Per-file summaries derived from one result set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageSnapshot {
    files: BTreeMap<String, FileSummary>,
}

impl CoverageSnapshot {
    pub fn get(&self, filename: &str) -> Option<&FileSummary> {
        self.files.get(filename)
    }

    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn files(&self) -> impl Iterator<Item = &FileSummary> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FromIterator<FileSummary> for CoverageSnapshot {
    fn from_iter<I: IntoIterator<Item = FileSummary>>(iter: I) -> Self {
        Self {
            files: iter
                .into_iter()
                .map(|f| (f.filename.clone(), f))
                .collect(),
        }
    }
}

/// Summarize the coverage recorded under `run_name`
pub fn summarize(result_set: &RawResultSet, run_name: &str) -> Result<CoverageSnapshot> {
    let run = result_set
        .get(run_name)
        .ok_or_else(|| CoverageError::MissingRun {
            run: run_name.to_string(),
            available: result_set.keys().cloned().collect::<Vec<_>>().join(", "),
        })?;

    let snapshot: CoverageSnapshot = run
        .coverage
        .iter()
        .map(|(filename, coverage)| FileSummary {
            filename: filename.clone(),
            lines: line_coverage(&coverage.lines),
            branches: branch_coverage(&coverage.branches),
        })
        .collect();

    tracing::debug!(run = run_name, files = snapshot.len(), "summarized coverage");

    Ok(snapshot)
}

/// Percentage of executable lines hit at least once
pub fn line_coverage(lines: &RawLineCoverage) -> f64 {
    let executable = lines.iter().flatten();
    let total = executable.clone().count() as u64;
    let covered = executable.filter(|&&hit| hit > 0).count() as u64;

    floor_percentage(covered, total)
}

/// Percentage of recorded branches taken at least once
pub fn branch_coverage(branches: &RawBranchCoverage) -> f64 {
    let hits = branches.values().flat_map(|branch| branch.values());
    let total = hits.clone().count() as u64;
    let covered = hits.filter(|&&hit| hit > 0).count() as u64;

    floor_percentage(covered, total)
}

/// `covered / total * 100` floored to two decimals; 100 when `total` is 0.
///
/// Computed in hundredths of a percent on integers so the result never
/// rounds up past the true ratio.
pub fn floor_percentage(covered: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }

    let hundredths = (covered as u128 * 10_000) / total as u128;
    hundredths as f64 / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::parse_result_set;

    fn branches(entries: &[(&str, &[(&str, u64)])]) -> RawBranchCoverage {
        entries
            .iter()
            .map(|(cond, branches)| {
                (
                    cond.to_string(),
                    branches.iter().map(|(b, hit)| (b.to_string(), *hit)).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn test_line_coverage_floors() {
        assert_eq!(line_coverage(&vec![Some(1), Some(0), Some(0)]), 33.33);
        assert_eq!(line_coverage(&vec![Some(1), None, Some(0), Some(3), None]), 66.66);
    }

    #[test]
    fn test_line_coverage_exact_ratios() {
        assert_eq!(line_coverage(&vec![Some(2), Some(5)]), 100.0);
        assert_eq!(line_coverage(&vec![Some(0), Some(0)]), 0.0);
        // 29 of 100 is 28.999999999999996 in naive float math
        let mut lines = vec![Some(1); 29];
        lines.extend(vec![Some(0); 71]);
        assert_eq!(line_coverage(&lines), 29.0);
    }

    #[test]
    fn test_no_executable_lines_is_fully_covered() {
        assert_eq!(line_coverage(&vec![None, None, None]), 100.0);
        assert_eq!(line_coverage(&vec![]), 100.0);
    }

    #[test]
    fn test_branch_coverage() {
        let data = branches(&[
            ("[:if, 0]", &[("[:then, 1]", 3), ("[:else, 2]", 0)]),
            ("[:case, 3]", &[("[:when, 4]", 1), ("[:else, 5]", 0)]),
        ]);
        assert_eq!(branch_coverage(&data), 50.0);
    }

    #[test]
    fn test_no_branches_is_fully_covered() {
        assert_eq!(branch_coverage(&RawBranchCoverage::new()), 100.0);
        // conditions without any recorded branch
        let data = branches(&[("[:if, 0]", &[])]);
        assert_eq!(branch_coverage(&data), 100.0);
    }

    #[test]
    fn test_summarize() {
        let json = r#"
{
  "RSpec": {
    "coverage": {
      "lib/b.rb": { "lines": [null, null], "branches": {} },
      "lib/a.rb": {
        "lines": [1, null, 0, 3, null],
        "branches": { "c1": { "b1": 1, "b2": 0, "b3": 0 } }
      }
    }
  },
  "Cucumber": { "coverage": { "lib/c.rb": { "lines": [0] } } }
}
"#;
        let result_set = parse_result_set(json).unwrap();
        let snapshot = summarize(&result_set, "RSpec").unwrap();

        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.get("lib/c.rb").is_none());

        let a = snapshot.get("lib/a.rb").unwrap();
        assert_eq!(a.lines, 66.66);
        assert_eq!(a.branches, 33.33);

        let b = snapshot.get("lib/b.rb").unwrap();
        assert_eq!(b.lines, 100.0);
        assert_eq!(b.branches, 100.0);
    }

    #[test]
    fn test_summarize_alternate_run() {
        let json = r#"{"Cucumber": {"coverage": {"lib/c.rb": {"lines": [0, 1]}}}}"#;
        let result_set = parse_result_set(json).unwrap();

        let snapshot = summarize(&result_set, "Cucumber").unwrap();
        assert_eq!(snapshot.get("lib/c.rb").unwrap().lines, 50.0);
    }

    #[test]
    fn test_summarize_missing_run() {
        let json = r#"{"Minitest": {"coverage": {}}}"#;
        let result_set = parse_result_set(json).unwrap();

        let err = summarize(&result_set, "RSpec").unwrap_err();
        match err {
            CoverageError::MissingRun { run, available } => {
                assert_eq!(run, "RSpec");
                assert_eq!(available, "Minitest");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
