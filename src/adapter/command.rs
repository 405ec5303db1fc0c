//! Codeception command lines for the initial run and for mutant runs.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::config::{AdapterConfig, RunnerConfig};
use super::error::AdapterError;
use super::shim::ShimGenerator;
use super::sorter::{TestLocation, order_for_fast_failing_run};
use super::version::{RunnerVersion, min_version_disable_coverage_php};

/// Coverage output directory, relative to the configured output path.
pub const COVERAGE_DIR: &str = "codeception-coverage-xml";

/// Group every mutant run is restricted to.
pub const MUTANT_GROUP: &str = "infection";

const DEFAULT_ARGS_AND_OPTIONS: [&str; 2] = ["--no-colors", "--fail-fast"];

const DISABLE_COVERAGE_PHP: &str = "--disable-coverage-php";

/// One candidate change handed over by the mutation engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationDescriptor {
    /// Unique token naming this mutant's artifacts.
    pub mutation_hash: String,
    /// Path of the pristine source file.
    pub original_file_path: String,
    /// Path of the file holding the mutated source.
    pub mutated_file_path: String,
}

impl MutationDescriptor {
    /// Create a descriptor.
    pub fn new(
        mutation_hash: impl Into<String>,
        original_file_path: impl Into<String>,
        mutated_file_path: impl Into<String>,
    ) -> Self {
        Self {
            mutation_hash: mutation_hash.into(),
            original_file_path: original_file_path.into(),
            mutated_file_path: mutated_file_path.into(),
        }
    }

    fn validated_hash(&self) -> Result<&str, AdapterError> {
        let hash = self.mutation_hash.as_str();
        if hash.is_empty() || hash.contains(['/', '\\']) || hash.contains("..") {
            return Err(AdapterError::InvalidMutationHash(hash.to_string()));
        }
        Ok(hash)
    }
}

/// Launch prefix for PHP tools: the executable itself, or the interpreter
/// followed by runtime args and the executable.
#[derive(Debug, Clone)]
pub struct CommandLineBuilder {
    php_executable: PathBuf,
}

impl CommandLineBuilder {
    /// Builder launching scripts through `php_executable`.
    pub fn new(php_executable: impl Into<PathBuf>) -> Self {
        Self {
            php_executable: php_executable.into(),
        }
    }

    /// `[launch prefix..., args...]`.
    pub fn build<I>(&self, executable: &Path, runtime_args: &[String], args: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let exe = executable.to_string_lossy().to_string();
        let extension = executable
            .extension()
            .map(|ext| ext.to_string_lossy().to_ascii_lowercase());

        let mut argv = Vec::new();
        match extension.as_deref() {
            Some("bat") => {
                if !runtime_args.is_empty() {
                    warn!(
                        executable = %exe,
                        "php runtime args cannot be passed through a batch launcher; dropping them"
                    );
                }
                argv.push(exe);
            }
            Some("phar" | "php") => {
                argv.push(self.php_executable.to_string_lossy().to_string());
                argv.extend(runtime_args.iter().cloned());
                argv.push(exe);
            }
            _ if !runtime_args.is_empty() => {
                argv.push(self.php_executable.to_string_lossy().to_string());
                argv.extend(runtime_args.iter().cloned());
                argv.push(exe);
            }
            _ => argv.push(exe),
        }
        argv.extend(args);
        argv
    }
}

/// `["run", ...extra, "--no-colors", "--fail-fast"]` with empty tokens dropped.
///
/// `extra` is split on single spaces, so quoting is not interpreted.
pub fn prepare_arguments_and_options(extra_options: &str) -> Vec<String> {
    std::iter::once("run")
        .chain(extra_options.split(' '))
        .chain(DEFAULT_ARGS_AND_OPTIONS)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn stringify_array<S: AsRef<str>>(values: &[S]) -> String {
    let joined: Vec<&str> = values.iter().map(AsRef::as_ref).collect();
    format!("[{}]", joined.join(","))
}

/// Assembles Codeception argument vectors for one project.
#[derive(Debug, Clone)]
pub struct CommandBuilder {
    config: AdapterConfig,
    runner_config: RunnerConfig,
    line_builder: CommandLineBuilder,
    shim: ShimGenerator,
}

impl CommandBuilder {
    /// Builder for `config`, reading project settings from `runner_config`.
    pub fn new(config: AdapterConfig, runner_config: RunnerConfig) -> Self {
        let line_builder = CommandLineBuilder::new(&config.php_executable);
        let shim = ShimGenerator::new(&config.project_dir, config.interceptor.clone());
        Self {
            config,
            runner_config,
            line_builder,
            shim,
        }
    }

    /// Adapter settings.
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Parsed runner configuration.
    pub fn runner_config(&self) -> &RunnerConfig {
        &self.runner_config
    }

    /// `codecept --version`, without runtime args.
    pub fn version_command(&self) -> Vec<String> {
        self.line_builder
            .build(&self.config.executable, &[], ["--version".to_string()])
    }

    /// Baseline run with coverage and a JUnit report.
    ///
    /// `version` is only consulted when coverage is collected; it gates
    /// `--disable-coverage-php`.
    pub fn build_initial_run_command<F>(
        &self,
        extra_options: &str,
        skip_coverage: bool,
        version: F,
    ) -> Result<Vec<String>, AdapterError>
    where
        F: FnOnce() -> Result<RunnerVersion, AdapterError>,
    {
        let mut args = prepare_arguments_and_options(extra_options);
        args.extend([
            "--coverage-phpunit".to_string(),
            COVERAGE_DIR.to_string(),
            "--xml".to_string(),
            self.config.junit_path.to_string_lossy().to_string(),
            "-o".to_string(),
            format!("paths: output: {}", self.config.tmp_dir.display()),
            "-o".to_string(),
            format!("coverage: enabled: {}", !skip_coverage),
            "-o".to_string(),
            format!("coverage: include: {}", self.coverage_include(skip_coverage)),
            "-o".to_string(),
            "settings: shuffle: true".to_string(),
        ]);

        if !skip_coverage && version()?.supports(&min_version_disable_coverage_php()) {
            args.push(DISABLE_COVERAGE_PHP.to_string());
        }

        let argv = self
            .line_builder
            .build(&self.config.executable, &self.config.runtime_args, args);
        debug!(argv = ?argv, "built initial codeception command");
        Ok(argv)
    }

    /// Run of the covering tests against one mutant.
    ///
    /// Writes the interceptor shim before returning; regenerating the same
    /// hash replaces the same file.
    pub fn build_mutant_run_command(
        &self,
        coverage_tests: &[TestLocation],
        mutation: &MutationDescriptor,
        extra_options: &str,
    ) -> Result<Vec<String>, AdapterError> {
        let hash = mutation.validated_hash()?;
        let shim_path = self.shim_path(hash);
        let shim_arg = shim_path.to_string_lossy().to_string();
        let output_dir = self.config.tmp_dir.join(hash);

        let script = self.shim.build_interceptor_script(
            &mutation.original_file_path,
            &mutation.mutated_file_path,
            &self.runner_config,
        );
        self.persist_shim(&shim_path, &script)?;

        let test_files = order_for_fast_failing_run(coverage_tests);

        let mut args = prepare_arguments_and_options(extra_options);
        args.extend([
            "--group".to_string(),
            MUTANT_GROUP.to_string(),
            "--bootstrap".to_string(),
            shim_arg.clone(),
            "-o".to_string(),
            format!("paths: output: {}", output_dir.display()),
            "-o".to_string(),
            "coverage: enabled: false".to_string(),
            "-o".to_string(),
            format!("bootstrap: {shim_arg}"),
            "-o".to_string(),
            format!("groups: {MUTANT_GROUP}: {}", stringify_array(&test_files)),
        ]);

        let argv = self
            .line_builder
            .build(&self.config.executable, &self.config.runtime_args, args);
        debug!(hash, tests = test_files.len(), "built mutant codeception command");
        Ok(argv)
    }

    /// Path of the shim for `mutation_hash`.
    pub fn shim_path(&self, mutation_hash: &str) -> PathBuf {
        self.config
            .tmp_dir
            .join(format!("interceptor.codeception.{mutation_hash}.php"))
    }

    fn persist_shim(&self, path: &Path, script: &str) -> Result<(), AdapterError> {
        std::fs::create_dir_all(&self.config.tmp_dir)?;

        let mut file = NamedTempFile::new_in(&self.config.tmp_dir)?;
        file.write_all(script.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|err| err.error)?;

        debug!(path = %path.display(), "wrote interceptor shim");
        Ok(())
    }

    fn coverage_include(&self, skip_coverage: bool) -> String {
        if skip_coverage {
            return stringify_array::<&str>(&[]);
        }

        let patterns = self.runner_config.coverage_include().unwrap_or_else(|| {
            self.config
                .source_dirs
                .iter()
                .map(|dir| format!("{}/*.php", dir.trim_matches('/')))
                .collect()
        });
        stringify_array(&patterns)
    }
}
