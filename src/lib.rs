//! @ai:module:intent Scaffold, compile, run and verify competitive programming solutions
//! @ai:module:layer application
//! @ai:module:public_api config, contest, engine, error, report, template, toolchain

pub mod config;
pub mod contest;
pub mod engine;
pub mod error;
pub mod report;
pub mod template;
pub mod toolchain;

pub use config::{RunConfig, SeepeeConfig, ToolchainConfig};
pub use contest::{ContestWorkspace, ContestWorkspaceTrait, ProblemPaths};
pub use engine::{verify, Engine, ExecutionResult, TestOutcome};
pub use error::{ConfigError, Error, Result};
pub use report::{OutputFormat, RunReport, TestReport};
pub use template::{CommandLine, CommandResolver, FileKind};
pub use toolchain::{ToolchainStatus, ToolchainValidator};
