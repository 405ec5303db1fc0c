//! Runner version parsing and feature gating.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// First Codeception release that understands `--disable-coverage-php`.
pub fn min_version_disable_coverage_php() -> Version {
    Version::from_components(&[5, 2, 0])
}

static VERSION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?(?:-([0-9A-Za-z][0-9A-Za-z.]*))?")
        .expect("version token pattern is valid")
});

/// Dotted semantic version as reported by the runner.
#[derive(Debug, Clone)]
pub struct Version {
    /// Numeric components, major first.
    pub components: Vec<u64>,
    /// Pre-release suffix without the leading `-`.
    pub pre_release: Option<String>,
    raw: String,
}

impl Version {
    /// Release version from numeric components.
    pub fn from_components(components: &[u64]) -> Self {
        let raw = components
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(".");
        Self {
            components: components.to_vec(),
            pre_release: None,
            raw,
        }
    }

    /// Extract the first version token found anywhere in `text`.
    ///
    /// `"Codeception PHP Testing Framework v4.1.22"` yields `4.1.22`.
    pub fn parse_tolerant(text: &str) -> Option<Self> {
        let caps = VERSION_TOKEN.captures(text)?;
        let mut components = Vec::with_capacity(3);
        for idx in 1..=3 {
            if let Some(part) = caps.get(idx) {
                components.push(part.as_str().parse().ok()?);
            }
        }

        Some(Self {
            components,
            pre_release: caps.get(4).map(|m| m.as_str().to_string()),
            raw: caps.get(0)?.as_str().to_string(),
        })
    }

    /// Component `idx`, with missing trailing components read as zero.
    fn component(&self, idx: usize) -> u64 {
        self.components.get(idx).copied().unwrap_or(0)
    }
}

/// Error returned when a string is not a bare version.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a version: {0:?}")]
pub struct InvalidVersion(pub String);

impl FromStr for Version {
    type Err = InvalidVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (numeric, pre_release) = match trimmed.split_once('-') {
            Some((numeric, pre)) => (numeric, Some(pre.to_string())),
            None => (trimmed, None),
        };

        let components = numeric
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| InvalidVersion(s.to_string()))?;

        Ok(Self {
            components,
            pre_release,
            raw: trimmed.to_string(),
        })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let width = self.components.len().max(other.components.len());
        for idx in 0..width {
            match self.component(idx).cmp(&other.component(idx)) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }

        match (&self.pre_release, &other.pre_release) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some(a), Some(b)) => compare_pre_release(a, b),
        }
    }
}

/// Rank of a pre-release stage: unrecognized < `dev` < `alpha` < `beta` < `RC`.
fn stage_rank(stage: &str) -> u8 {
    match stage.to_ascii_lowercase().as_str() {
        "dev" => 1,
        "alpha" | "a" => 2,
        "beta" | "b" => 3,
        "rc" => 4,
        _ => 0,
    }
}

/// Split `beta.2` / `RC1` into the stage word and its trailing counter.
fn split_stage(tag: &str) -> (&str, &str) {
    let end = tag
        .find(|ch: char| !ch.is_ascii_alphabetic())
        .unwrap_or(tag.len());
    let (stage, rest) = tag.split_at(end);
    (stage, rest.trim_start_matches('.'))
}

fn compare_pre_release(a: &str, b: &str) -> Ordering {
    let (stage_a, rest_a) = split_stage(a);
    let (stage_b, rest_b) = split_stage(b);

    stage_rank(stage_a)
        .cmp(&stage_rank(stage_b))
        .then_with(|| match (rest_a.parse::<u64>(), rest_b.parse::<u64>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => rest_a.cmp(rest_b),
        })
        .then_with(|| a.cmp(b))
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Version reported by the runner, or `Unknown` when none was recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerVersion {
    /// A version token was found.
    Known(Version),
    /// The runner output carried no recognizable version.
    Unknown,
}

impl RunnerVersion {
    /// Classify raw `--version` output.
    pub fn from_output(text: &str) -> Self {
        Version::parse_tolerant(text).map_or(Self::Unknown, Self::Known)
    }

    /// True when the version is known and at least `min`.
    pub fn supports(&self, min: &Version) -> bool {
        match self {
            Self::Known(version) => version >= min,
            Self::Unknown => false,
        }
    }
}

impl fmt::Display for RunnerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known(version) => version.fmt(f),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}
