//! Adapter and runner configuration.

use std::path::{Path, PathBuf};

use serde_yaml::{Mapping, Value};

use super::error::AdapterError;
use super::shim::InterceptorRuntime;

/// Immutable settings the adapter is constructed with.
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterConfig {
    /// Path of the `codecept` executable.
    pub executable: PathBuf,
    /// PHP interpreter used when runtime args must be passed.
    pub php_executable: PathBuf,
    /// Extra PHP runtime arguments (e.g. `-d memory_limit=1G`).
    pub runtime_args: Vec<String>,
    /// Temporary directory owned by the caller.
    pub tmp_dir: PathBuf,
    /// Where the initial run writes its JUnit report.
    pub junit_path: PathBuf,
    /// Project root the runner config belongs to.
    pub project_dir: PathBuf,
    /// Configured source directories, used to derive coverage includes.
    pub source_dirs: Vec<String>,
    /// Location of the include interceptor loaded by mutant shims.
    pub interceptor: InterceptorRuntime,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        let project_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        let tmp_dir = std::env::temp_dir().join("codeception-adapter");
        Self {
            executable: project_dir.join("vendor").join("bin").join("codecept"),
            php_executable: PathBuf::from("php"),
            runtime_args: Vec::new(),
            junit_path: tmp_dir.join("junit.xml"),
            tmp_dir,
            project_dir,
            source_dirs: vec!["src".to_string()],
            interceptor: InterceptorRuntime::default(),
        }
    }
}

impl AdapterConfig {
    /// Set the runner executable.
    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    /// Set the PHP interpreter.
    pub fn with_php_executable(mut self, php: impl Into<PathBuf>) -> Self {
        self.php_executable = php.into();
        self
    }

    /// Set PHP runtime arguments.
    pub fn with_runtime_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.runtime_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the temp directory.
    pub fn with_tmp_dir(mut self, tmp_dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = tmp_dir.into();
        self
    }

    /// Set the JUnit report path.
    pub fn with_junit_path(mut self, junit_path: impl Into<PathBuf>) -> Self {
        self.junit_path = junit_path.into();
        self
    }

    /// Set the project directory.
    pub fn with_project_dir(mut self, project_dir: impl Into<PathBuf>) -> Self {
        self.project_dir = project_dir.into();
        self
    }

    /// Set source directories.
    pub fn with_source_dirs<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    /// Set the interceptor location.
    pub fn with_interceptor(mut self, interceptor: InterceptorRuntime) -> Self {
        self.interceptor = interceptor;
        self
    }
}

/// Parsed `codeception.yml`, read through a few typed accessors.
///
/// Keys that are missing or of an unexpected type read as absent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunnerConfig {
    root: Mapping,
}

impl RunnerConfig {
    /// Default tests directory when `paths.tests` is not configured.
    pub const DEFAULT_TESTS_DIR: &'static str = "tests";

    /// Wrap an already parsed tree. Non-mapping documents read as empty.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Mapping(root) => Self { root },
            _ => Self::default(),
        }
    }

    /// Parse YAML text; `path` is only used for error reporting.
    pub fn from_yaml_str(text: &str, path: &Path) -> Result<Self, AdapterError> {
        let value: Value =
            serde_yaml::from_str(text).map_err(|source| AdapterError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_value(value))
    }

    /// Read and parse a config file.
    pub fn from_path(path: &Path) -> Result<Self, AdapterError> {
        let text = std::fs::read_to_string(path).map_err(|source| AdapterError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text, path)
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// `bootstrap`, when set to a non-empty string.
    pub fn bootstrap(&self) -> Option<&str> {
        self.get("bootstrap")
            .and_then(Value::as_str)
            .filter(|path| !path.is_empty())
    }

    /// `paths.tests`, defaulting to `tests`.
    pub fn tests_dir(&self) -> &str {
        self.get("paths")
            .and_then(|paths| paths.get("tests"))
            .and_then(Value::as_str)
            .unwrap_or(Self::DEFAULT_TESTS_DIR)
    }

    /// `coverage.include`, when the key holds a list or a single pattern.
    ///
    /// Non-string entries are skipped. An empty key reads as absent.
    pub fn coverage_include(&self) -> Option<Vec<String>> {
        let include = self.get("coverage")?.get("include")?;
        let patterns = match include {
            Value::Sequence(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Value::String(single) => vec![single.clone()],
            _ => return None,
        };
        Some(patterns)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    const CODECEPTION_YML: &str = r#"
paths:
    tests: qa
    output: qa/_output
actor_suffix: Tester
bootstrap: _bootstrap.php
coverage:
    enabled: false
    include:
        - app/*
        - lib/*.php
"#;

    #[test]
    fn builder_overrides_work() {
        let cfg = AdapterConfig::default()
            .with_executable("/usr/bin/codecept")
            .with_php_executable("/usr/bin/php8.3")
            .with_runtime_args(["-d", "memory_limit=1G"])
            .with_tmp_dir("/tmp/infection")
            .with_junit_path("/tmp/infection/junit.xml")
            .with_project_dir("/project")
            .with_source_dirs(["src", "lib"]);

        assert_eq!(cfg.executable, PathBuf::from("/usr/bin/codecept"));
        assert_eq!(cfg.php_executable, PathBuf::from("/usr/bin/php8.3"));
        assert_eq!(cfg.runtime_args, vec!["-d", "memory_limit=1G"]);
        assert_eq!(cfg.tmp_dir, PathBuf::from("/tmp/infection"));
        assert_eq!(cfg.junit_path, PathBuf::from("/tmp/infection/junit.xml"));
        assert_eq!(cfg.project_dir, PathBuf::from("/project"));
        assert_eq!(cfg.source_dirs, vec!["src", "lib"]);
    }

    #[test]
    fn reads_known_keys() {
        let cfg = RunnerConfig::from_yaml_str(CODECEPTION_YML, Path::new("codeception.yml"))
            .expect("config should parse");

        assert_eq!(cfg.bootstrap(), Some("_bootstrap.php"));
        assert_eq!(cfg.tests_dir(), "qa");
        assert_eq!(
            cfg.coverage_include(),
            Some(vec!["app/*".to_string(), "lib/*.php".to_string()])
        );
    }

    #[test]
    fn missing_keys_use_defaults() {
        let cfg = RunnerConfig::from_yaml_str("actor_suffix: Tester\n", Path::new("c.yml"))
            .expect("config should parse");

        assert_eq!(cfg.bootstrap(), None);
        assert_eq!(cfg.tests_dir(), "tests");
        assert_eq!(cfg.coverage_include(), None);
    }

    #[test]
    fn empty_and_scalar_documents_read_as_empty() {
        let empty = RunnerConfig::from_yaml_str("", Path::new("c.yml")).expect("empty parses");
        assert_eq!(empty, RunnerConfig::default());

        let scalar = RunnerConfig::from_yaml_str("just text", Path::new("c.yml"))
            .expect("scalar parses");
        assert_eq!(scalar.tests_dir(), "tests");
    }

    #[test]
    fn unexpected_types_read_as_absent() {
        let cfg = RunnerConfig::from_yaml_str(
            "bootstrap: [a, b]\npaths: nope\ncoverage:\n    include: 42\n",
            Path::new("c.yml"),
        )
        .expect("config should parse");

        assert_eq!(cfg.bootstrap(), None);
        assert_eq!(cfg.tests_dir(), "tests");
        assert_eq!(cfg.coverage_include(), None);

        let empty_include =
            RunnerConfig::from_yaml_str("coverage:\n    include:\n", Path::new("c.yml"))
                .expect("config should parse");
        assert_eq!(empty_include.coverage_include(), None);
    }

    #[test]
    fn malformed_yaml_is_a_parse_error() {
        let err = RunnerConfig::from_yaml_str("paths: [unclosed\n  - x: :", Path::new("bad.yml"))
            .expect_err("malformed yaml should fail");
        match err {
            AdapterError::ConfigParse { path, .. } => assert_eq!(path, PathBuf::from("bad.yml")),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let tmp = tempdir().expect("tempdir should be created");
        let err = RunnerConfig::from_path(&tmp.path().join("absent.yml"))
            .expect_err("absent file should fail");
        assert!(matches!(err, AdapterError::ConfigRead { .. }));
    }
}
