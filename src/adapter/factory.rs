//! Adapter construction from a `codeception.yml` on disk.

use std::path::Path;

use super::config::{AdapterConfig, RunnerConfig};
use super::error::AdapterError;
use super::framework::{ADAPTER_NAME, CodeceptionAdapter};
use super::process::{ProcessExecutor, SystemExecutor};

/// Builds [`CodeceptionAdapter`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct CodeceptionAdapterFactory;

impl CodeceptionAdapterFactory {
    /// Name of the runner binary looked up in the project.
    pub const EXECUTABLE_NAME: &'static str = "codecept";

    /// Name the adapter is registered under.
    pub fn adapter_name() -> &'static str {
        ADAPTER_NAME
    }

    /// Parse `config_path` and build an adapter that spawns real processes.
    pub fn create(
        config: AdapterConfig,
        config_path: &Path,
    ) -> Result<CodeceptionAdapter<SystemExecutor>, AdapterError> {
        Self::create_with_executor(config, config_path, SystemExecutor)
    }

    /// Same as [`create`](Self::create) with a custom executor.
    pub fn create_with_executor<E: ProcessExecutor>(
        config: AdapterConfig,
        config_path: &Path,
        executor: E,
    ) -> Result<CodeceptionAdapter<E>, AdapterError> {
        let runner_config = RunnerConfig::from_path(config_path)?;
        Ok(CodeceptionAdapter::with_executor(config, runner_config, executor))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::adapter::framework::TestFrameworkAdapter;

    #[test]
    fn creates_adapter_from_config_file() {
        let tmp = tempdir().expect("tempdir should be created");
        let config_path = tmp.path().join("codeception.yml");
        std::fs::write(&config_path, "paths:\n    tests: tests\nbootstrap: _bootstrap.php\n")
            .expect("config should be written");

        let config = AdapterConfig::default()
            .with_executable("/path/to/codecept")
            .with_tmp_dir(tmp.path())
            .with_project_dir("/path/to/project");
        let adapter =
            CodeceptionAdapterFactory::create(config, &config_path).expect("adapter should build");

        assert_eq!(adapter.name(), CodeceptionAdapterFactory::adapter_name());
        assert_eq!(
            adapter.commands().runner_config().bootstrap(),
            Some("_bootstrap.php")
        );
    }

    #[test]
    fn names_match_codeception() {
        assert_eq!(CodeceptionAdapterFactory::adapter_name(), "codeception");
        assert_eq!(CodeceptionAdapterFactory::EXECUTABLE_NAME, "codecept");
    }

    #[test]
    fn unparseable_yaml_aborts_construction() {
        let tmp = tempdir().expect("tempdir should be created");
        let config_path = tmp.path().join("codeception.yml");
        std::fs::write(&config_path, "paths: {tests: [\n").expect("config should be written");

        let result = CodeceptionAdapterFactory::create(AdapterConfig::default(), &config_path);
        assert!(matches!(result, Err(AdapterError::ConfigParse { .. })));
    }
}
