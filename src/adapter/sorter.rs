//! Fail-fast ordering of covering test files.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One known test file and how long it took during the initial run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestLocation {
    /// Test file path as reported in the JUnit report.
    pub file_path: String,
    /// Historical execution time in seconds.
    pub execution_time: f64,
}

impl TestLocation {
    /// Create a test location.
    pub fn new(file_path: impl Into<String>, execution_time: f64) -> Self {
        Self {
            file_path: file_path.into(),
            execution_time,
        }
    }
}

/// Error returned when a `path:seconds` pair cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected `<file>:<seconds>`, got {0:?}")]
pub struct InvalidTestLocation(pub String);

impl FromStr for TestLocation {
    type Err = InvalidTestLocation;

    /// Parse `path/to/Test.php:0.125`. The split happens on the last `:` so
    /// Windows drive letters survive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, seconds) = s
            .rsplit_once(':')
            .ok_or_else(|| InvalidTestLocation(s.to_string()))?;
        let execution_time = seconds
            .trim()
            .parse::<f64>()
            .map_err(|_| InvalidTestLocation(s.to_string()))?;
        if path.is_empty() {
            return Err(InvalidTestLocation(s.to_string()));
        }
        Ok(Self::new(path, execution_time))
    }
}

impl fmt::Display for TestLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file_path, self.execution_time)
    }
}

/// Unique test file paths, fastest first.
///
/// The first location seen for a path wins; later duplicates are dropped
/// before sorting.
pub fn order_for_fast_failing_run(tests: &[TestLocation]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(tests.len());
    let mut unique: Vec<&TestLocation> = tests
        .iter()
        .filter(|test| seen.insert(test.file_path.as_str()))
        .collect();

    unique.sort_by(|a, b| a.execution_time.total_cmp(&b.execution_time));

    unique
        .into_iter()
        .map(|test| test.file_path.clone())
        .collect()
}
