//! Pass/fail and memory signals scraped from runner output.

use std::sync::LazyLock;

use regex::Regex;

/// Outcome of one policy rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The suite passed.
    Passed,
    /// The suite failed.
    Failed,
}

/// Ordered `(pattern, verdict)` table; the first matching rule decides.
static VERDICT_POLICY: LazyLock<Vec<(Regex, Verdict)>> = LazyLock::new(|| {
    [
        (r"(?i)failures!", Verdict::Failed),
        (r"(?i)errors!", Verdict::Failed),
        // OK (5 tests, 3 assertions)
        (r"OK\s\(", Verdict::Passed),
        // OK, but incomplete, skipped, or risky tests!
        (r"OK\s?,", Verdict::Passed),
        // deprecations and similar; assertions still passed
        (r"(?i)warnings!", Verdict::Passed),
    ]
    .into_iter()
    .map(|(pattern, verdict)| {
        (
            Regex::new(pattern).expect("verdict policy pattern is valid"),
            verdict,
        )
    })
    .collect()
});

static MEMORY_USAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Memory: (\d+\.\d+)\s*MB").expect("memory usage pattern is valid")
});

/// Returned by [`memory_used_mb`] when the output reports no memory usage.
pub const UNKNOWN_MEMORY: f64 = -1.0;

/// Verdict for `output`; output matching no rule counts as failed.
pub fn verdict(output: &str) -> Verdict {
    VERDICT_POLICY
        .iter()
        .find(|(pattern, _)| pattern.is_match(output))
        .map_or(Verdict::Failed, |(_, verdict)| *verdict)
}

/// True if the runner reported a passing suite.
pub fn tests_passed(output: &str) -> bool {
    verdict(output) == Verdict::Passed
}

/// Peak memory in MB from the first `Memory: NN.NN MB` line, or [`UNKNOWN_MEMORY`].
pub fn memory_used_mb(output: &str) -> f64 {
    MEMORY_USAGE
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|value| value.as_str().parse().ok())
        .unwrap_or(UNKNOWN_MEMORY)
}
