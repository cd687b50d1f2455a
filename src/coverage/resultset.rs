//! SimpleCov `.resultset.json` format

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{CoverageError, Result};

/// Hit count per source line; `None` marks a non-executable line
pub type RawLineCoverage = Vec<Option<u64>>;

/// Condition id -> branch id -> hit count
pub type RawBranchCoverage = BTreeMap<String, BTreeMap<String, u64>>;

/// Raw coverage for a single source file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFileCoverage {
    pub lines: RawLineCoverage,
    /// Absent when the suite ran without branch coverage enabled
    #[serde(default)]
    pub branches: RawBranchCoverage,
}

/// Coverage recorded under one run identifier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRun {
    pub coverage: BTreeMap<String, RawFileCoverage>,
}

/// A whole result set: run identifier -> run
pub type RawResultSet = BTreeMap<String, RawRun>;

/// Load a result set from a JSON file
pub fn load_result_set(path: &Path) -> Result<RawResultSet> {
    if !path.exists() {
        return Err(CoverageError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path)?;
    let result_set = parse_result_set(&content)?;

    tracing::debug!(
        path = %path.display(),
        runs = result_set.len(),
        "loaded result set"
    );

    Ok(result_set)
}

/// Parse result set JSON from a string
pub fn parse_result_set(content: &str) -> Result<RawResultSet> {
    Ok(serde_json::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_result_set() {
        let json = r#"
{
  "RSpec": {
    "coverage": {
      "/app/lib/a.rb": {
        "lines": [1, null, 0],
        "branches": {
          "[:if, 0, 3, 4, 3, 20]": {
            "[:then, 1, 3, 4, 3, 10]": 2,
            "[:else, 2, 3, 4, 3, 20]": 0
          }
        }
      }
    },
    "timestamp": 1612345678
  }
}
"#;

        let result_set = parse_result_set(json).unwrap();
        let file = &result_set["RSpec"].coverage["/app/lib/a.rb"];

        assert_eq!(file.lines, vec![Some(1), None, Some(0)]);
        assert_eq!(file.branches.len(), 1);
        assert_eq!(file.branches.values().next().unwrap().len(), 2);
    }

    #[test]
    fn test_missing_branches_defaults_to_empty() {
        let json = r#"{"Minitest": {"coverage": {"a.rb": {"lines": [null, 4]}}}}"#;

        let result_set = parse_result_set(json).unwrap();
        assert!(result_set["Minitest"].coverage["a.rb"].branches.is_empty());
    }

    #[test]
    fn test_invalid_json() {
        let err = parse_result_set("{\"RSpec\": ").unwrap_err();
        assert!(matches!(err, CoverageError::Json(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".resultset.json");

        let err = load_result_set(&path).unwrap_err();
        assert!(matches!(err, CoverageError::NotFound { .. }));
        assert!(err.to_string().ends_with("does not exist!"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".resultset.json");
        fs::write(&path, r#"{"RSpec": {"coverage": {}}}"#).unwrap();

        let result_set = load_result_set(&path).unwrap();
        assert!(result_set["RSpec"].coverage.is_empty());
    }
}
