//! # codeception-adapter
//!
//! Glue between a mutation-testing engine and the Codeception test runner:
//! - builds `codecept run` argument vectors for the initial coverage run and
//!   for single-mutant runs
//! - writes the bootstrap shim that swaps one source file for its mutant
//! - reads pass/fail and memory usage out of the runner's text output
//!
//! Process spawning is behind [`adapter::ProcessExecutor`]; everything else is
//! a pure transformation apart from writing the per-mutant shim.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]

pub mod adapter;

pub use adapter::{
    AdapterConfig, AdapterError, CodeceptionAdapter, CodeceptionAdapterFactory,
    MutationDescriptor, RunVerdict, RunnerConfig, RunnerVersion, TestFrameworkAdapter,
    TestLocation,
};
