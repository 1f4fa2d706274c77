//! Command line interface for bgstrip
//!
//! This module is only available when the "cli" feature is enabled.

mod backend_factory;
mod config;
#[path = "main.rs"]
mod main_impl;

pub use backend_factory::{BackendFactory, TractBackendFactory};
pub use main_impl::{
    execute, main, run, BatchArgs, Cli, CliLogFormat, CliOutputFormat, Command, ProcessingArgs,
    RemoveArgs,
};
