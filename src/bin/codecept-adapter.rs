use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use codeception_adapter::adapter::{
    InterceptorRuntime, TestFrameworkAdapter, memory_used_mb, tests_passed,
};
use codeception_adapter::{
    AdapterConfig, CodeceptionAdapter, CodeceptionAdapterFactory, MutationDescriptor, TestLocation,
};

#[derive(Debug, Parser)]
#[command(name = "codecept-adapter")]
#[command(about = "Codeception command lines and verdicts for mutation testing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the initial coverage run command.
    Initial {
        #[command(flatten)]
        project: ProjectArgs,
        /// Extra options appended after `run`, split on spaces.
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        extra_options: String,
        /// Run without collecting coverage.
        #[arg(long)]
        skip_coverage: bool,
        /// Emit JSON output.
        #[arg(long)]
        json: bool,
    },
    /// Write the interceptor shim and print the command for one mutant.
    Mutant {
        #[command(flatten)]
        project: ProjectArgs,
        /// Mutation hash naming the shim and output directory.
        #[arg(long)]
        hash: String,
        /// Pristine source file.
        #[arg(long)]
        original: String,
        /// File holding the mutated source.
        #[arg(long)]
        mutated: String,
        /// Covering test as `<file>:<seconds>`; repeatable.
        #[arg(long = "test")]
        tests: Vec<TestLocation>,
        /// JSON array of `{"file_path", "execution_time"}` covering tests,
        /// merged with `--test`.
        #[arg(long)]
        tests_file: Option<PathBuf>,
        /// Extra options appended after `run`, split on spaces.
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        extra_options: String,
        /// Emit JSON output.
        #[arg(long)]
        json: bool,
    },
    /// Print the runner version, or `unknown`.
    Version {
        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Interpret captured runner output read from a file or stdin.
    Interpret {
        /// Output file; stdin when omitted.
        file: Option<PathBuf>,
        /// Emit JSON output.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct ProjectArgs {
    /// Path to `codeception.yml`.
    #[arg(long, default_value = "codeception.yml")]
    config: PathBuf,
    /// Codeception executable.
    #[arg(long, default_value = "vendor/bin/codecept")]
    executable: PathBuf,
    /// PHP interpreter used when runtime args are given.
    #[arg(long, default_value = "php")]
    php: PathBuf,
    /// PHP runtime argument; repeatable.
    #[arg(long = "runtime-arg", allow_hyphen_values = true)]
    runtime_args: Vec<String>,
    /// Temporary directory for shims and runner output.
    #[arg(long)]
    tmp_dir: Option<PathBuf>,
    /// JUnit report path for the initial run.
    #[arg(long)]
    junit: Option<PathBuf>,
    /// Project root.
    #[arg(long)]
    project: Option<PathBuf>,
    /// Source directory; repeatable.
    #[arg(long = "src-dir")]
    src_dirs: Vec<String>,
    /// Path of `IncludeInterceptor.php`.
    #[arg(long)]
    interceptor: Option<String>,
    /// Namespace prefix of a scoped Infection build.
    #[arg(long, default_value = "")]
    namespace_prefix: String,
}

impl ProjectArgs {
    fn adapter(self) -> Result<CodeceptionAdapter> {
        let mut config = AdapterConfig::default()
            .with_executable(self.executable)
            .with_php_executable(self.php)
            .with_runtime_args(self.runtime_args);
        if let Some(tmp_dir) = self.tmp_dir {
            let junit = tmp_dir.join("junit.xml");
            config = config.with_tmp_dir(tmp_dir).with_junit_path(junit);
        }
        if let Some(junit) = self.junit {
            config = config.with_junit_path(junit);
        }
        if let Some(project) = self.project {
            config = config.with_project_dir(project);
        }
        if !self.src_dirs.is_empty() {
            config = config.with_source_dirs(self.src_dirs);
        }
        if let Some(interceptor) = self.interceptor {
            config = config.with_interceptor(
                InterceptorRuntime::new(interceptor).with_namespace_prefix(self.namespace_prefix),
            );
        }

        CodeceptionAdapterFactory::create(config, &self.config)
            .with_context(|| format!("failed to set up adapter for {}", self.config.display()))
    }
}

fn read_test_locations(path: &Path) -> Result<Vec<TestLocation>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse test locations in {}", path.display()))
}

fn print_command(argv: &[String], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(argv)?);
    } else {
        for arg in argv {
            println!("{arg}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    let cli = Cli::parse();

    match cli.command {
        Command::Initial {
            project,
            extra_options,
            skip_coverage,
            json,
        } => {
            let adapter = project.adapter()?;
            let argv = adapter.initial_command(&extra_options, skip_coverage)?;
            print_command(&argv, json)?;
        }
        Command::Mutant {
            project,
            hash,
            original,
            mutated,
            mut tests,
            tests_file,
            extra_options,
            json,
        } => {
            if let Some(path) = tests_file {
                tests.extend(read_test_locations(&path)?);
            }
            let adapter = project.adapter()?;
            let mutation = MutationDescriptor::new(hash, original, mutated);
            let argv = adapter.mutant_command(&tests, &mutation, &extra_options)?;
            print_command(&argv, json)?;
        }
        Command::Version { project } => {
            let adapter = project.adapter()?;
            println!("{}", adapter.runner_version()?);
        }
        Command::Interpret { file, json } => {
            let output = match file {
                Some(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                None => {
                    let mut buf = String::new();
                    std::io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };

            let verdict = tests_passed(&output);
            let memory = memory_used_mb(&output);
            if json {
                let payload = serde_json::json!({
                    "passed": verdict,
                    "memory_used_mb": memory,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                println!("passed: {verdict}");
                println!("memory_used_mb: {memory:.2}");
            }
            if !verdict {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
