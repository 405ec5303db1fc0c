//! Codeception runner adapter.

pub mod command;
pub mod config;
pub mod error;
pub mod factory;
pub mod framework;
pub mod output;
pub mod process;
pub mod shim;
pub mod sorter;
pub mod version;

pub use command::{
    COVERAGE_DIR, CommandBuilder, CommandLineBuilder, MUTANT_GROUP, MutationDescriptor,
    prepare_arguments_and_options,
};
pub use config::{AdapterConfig, RunnerConfig};
pub use error::AdapterError;
pub use factory::CodeceptionAdapterFactory;
pub use framework::{ADAPTER_NAME, CodeceptionAdapter, RunVerdict, TestFrameworkAdapter};
pub use output::{UNKNOWN_MEMORY, Verdict, memory_used_mb, tests_passed};
pub use process::{ProcessExecutor, ProcessOutput, SystemExecutor};
pub use shim::{BUNDLE_ALIAS, InterceptorRuntime, ShimGenerator};
pub use sorter::{TestLocation, order_for_fast_failing_run};
pub use version::{RunnerVersion, Version, min_version_disable_coverage_php};
