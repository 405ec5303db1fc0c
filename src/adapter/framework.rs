//! Test framework adapter contract and its Codeception implementation.

use std::sync::OnceLock;

use tracing::{debug, warn};

use super::command::{CommandBuilder, MutationDescriptor};
use super::config::{AdapterConfig, RunnerConfig};
use super::error::AdapterError;
use super::output;
use super::process::{ProcessExecutor, SystemExecutor};
use super::sorter::TestLocation;
use super::version::RunnerVersion;

/// Name the Codeception adapter is registered under.
pub const ADAPTER_NAME: &str = "codeception";

/// Interpreted result of one runner invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunVerdict {
    /// Whether the suite passed.
    pub passed: bool,
    /// Reported memory in MB, or `-1.0` when not reported.
    pub memory_used_mb: f64,
}

/// Operations the mutation engine needs from a test framework adapter.
///
/// One implementation is selected when the run is configured.
pub trait TestFrameworkAdapter {
    /// Adapter name, e.g. `codeception`.
    fn name(&self) -> &'static str;

    /// Whether the initial run produces a JUnit report.
    fn has_junit_report(&self) -> bool;

    /// Argument vector for the initial full-suite run.
    fn initial_command(
        &self,
        extra_options: &str,
        skip_coverage: bool,
    ) -> Result<Vec<String>, AdapterError>;

    /// Argument vector for one mutant run. May write files the command refers to.
    fn mutant_command(
        &self,
        coverage_tests: &[TestLocation],
        mutation: &MutationDescriptor,
        extra_options: &str,
    ) -> Result<Vec<String>, AdapterError>;

    /// Version reported by the runner. Computed at most once per adapter.
    fn runner_version(&self) -> Result<RunnerVersion, AdapterError>;

    /// Pass/fail decision for captured runner output.
    fn tests_pass(&self, output: &str) -> bool;

    /// Memory reported in the output, `-1.0` when absent.
    fn memory_used(&self, output: &str) -> f64;

    /// Both signals at once.
    fn interpret_result(&self, output: &str) -> RunVerdict {
        RunVerdict {
            passed: self.tests_pass(output),
            memory_used_mb: self.memory_used(output),
        }
    }

    /// Operator hint shown when the initial run fails.
    fn initial_tests_fail_recommendations(&self, command_line: &str) -> String;
}

/// Drives Codeception (`codecept run`).
#[derive(Debug)]
pub struct CodeceptionAdapter<E = SystemExecutor> {
    commands: CommandBuilder,
    executor: E,
    version: OnceLock<RunnerVersion>,
}

impl CodeceptionAdapter<SystemExecutor> {
    /// Adapter that spawns real processes.
    pub fn new(config: AdapterConfig, runner_config: RunnerConfig) -> Self {
        Self::with_executor(config, runner_config, SystemExecutor)
    }
}

impl<E: ProcessExecutor> CodeceptionAdapter<E> {
    /// Adapter using `executor` for the version query.
    pub fn with_executor(config: AdapterConfig, runner_config: RunnerConfig, executor: E) -> Self {
        Self {
            commands: CommandBuilder::new(config, runner_config),
            executor,
            version: OnceLock::new(),
        }
    }

    /// Underlying command builder.
    pub fn commands(&self) -> &CommandBuilder {
        &self.commands
    }

    fn resolve_version(&self) -> Result<RunnerVersion, AdapterError> {
        let argv = self.commands.version_command();
        let command = argv.join(" ");

        let output = self.executor.execute(&argv).map_err(|err| match err {
            AdapterError::ExecutableNotFound(_) => err,
            other => AdapterError::VersionResolution {
                command: command.clone(),
                message: other.to_string(),
            },
        })?;

        if !output.success() {
            let status = match output.exit_code {
                Some(code) => format!("exit code {code}"),
                None => "terminated by signal".to_string(),
            };
            return Err(AdapterError::VersionResolution {
                command,
                message: format!("{status}: {}", output.stderr.trim()),
            });
        }

        let version = RunnerVersion::from_output(&output.stdout);
        match &version {
            RunnerVersion::Known(found) => debug!(version = %found, "resolved codeception version"),
            RunnerVersion::Unknown => warn!(
                output = output.stdout.trim(),
                "unrecognized codeception version output; optional flags disabled"
            ),
        }
        Ok(version)
    }
}

impl<E: ProcessExecutor> TestFrameworkAdapter for CodeceptionAdapter<E> {
    fn name(&self) -> &'static str {
        ADAPTER_NAME
    }

    fn has_junit_report(&self) -> bool {
        true
    }

    fn initial_command(
        &self,
        extra_options: &str,
        skip_coverage: bool,
    ) -> Result<Vec<String>, AdapterError> {
        self.commands
            .build_initial_run_command(extra_options, skip_coverage, || self.runner_version())
    }

    fn mutant_command(
        &self,
        coverage_tests: &[TestLocation],
        mutation: &MutationDescriptor,
        extra_options: &str,
    ) -> Result<Vec<String>, AdapterError> {
        self.commands
            .build_mutant_run_command(coverage_tests, mutation, extra_options)
    }

    fn runner_version(&self) -> Result<RunnerVersion, AdapterError> {
        if let Some(version) = self.version.get() {
            return Ok(version.clone());
        }

        let resolved = self.resolve_version()?;
        Ok(self.version.get_or_init(|| resolved).clone())
    }

    fn tests_pass(&self, output: &str) -> bool {
        output::tests_passed(output)
    }

    fn memory_used(&self, output: &str) -> f64 {
        output::memory_used_mb(output)
    }

    fn initial_tests_fail_recommendations(&self, command_line: &str) -> String {
        format!("Check the executed command to identify the problem: {command_line}")
    }
}
