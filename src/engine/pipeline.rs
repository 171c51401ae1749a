//! @ai:module:intent Compile a solution, run it on an input file and report the outcome
//! @ai:module:layer application
//! @ai:module:public_api Engine, ExecutionResult, Stage
//! @ai:module:stateless true

use crate::config::{RunConfig, ToolchainConfig};
use crate::engine::artifact::{executable_path, ArtifactGuard};
use crate::engine::process::{self, ProcessOutput};
use crate::engine::verify::TestOutcome;
use crate::error::Result;
use crate::template::{CommandLine, CommandResolver};
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// @ai:intent Captured output of one compile-and-run invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionResult {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl ExecutionResult {
    /// @ai:effects pure
    pub fn succeeded(stdout: String, stderr: String) -> Self {
        Self {
            stdout,
            stderr,
            success: true,
        }
    }

    /// @ai:intent Failed compile or run: stdout is discarded, only diagnostics are kept
    /// @ai:effects pure
    pub fn failed(stderr: String) -> Self {
        Self {
            stdout: String::new(),
            stderr,
            success: false,
        }
    }

    /// @ai:intent Whether this failure came from `program` not starting at all
    /// @ai:effects pure
    pub fn launch_failed(&self, program: &str) -> bool {
        !self.success && self.stderr.starts_with(&launch_failure_prefix(program))
    }
}

fn launch_failure_prefix(program: &str) -> String {
    format!("failed to launch `{program}`:")
}

/// @ai:intent Pipeline stage, used for logging transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Compiling,
    Running,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Compiling => write!(f, "compile"),
            Stage::Running => write!(f, "run"),
        }
    }
}

/// @ai:intent Compile-run-verify engine bound to one toolchain configuration
#[derive(Debug, Clone, Copy)]
pub struct Engine<'a> {
    resolver: CommandResolver<'a>,
    run: RunConfig,
}

impl<'a> Engine<'a> {
    /// @ai:intent Create an engine over an explicitly passed configuration
    /// @ai:effects pure
    pub fn new(toolchain: &'a ToolchainConfig, run: RunConfig) -> Self {
        Self {
            resolver: CommandResolver::new(toolchain),
            run,
        }
    }

    /// @ai:intent Compile `source`, run it on `input`, always delete the executable
    /// @ai:pre source and input exist
    /// @ai:post the derived executable path does not exist on return
    /// @ai:effects fs:write, io
    ///
    /// Only configuration problems are returned as `Err`, and those are detected
    /// before anything is spawned. Compile and run failures come back as an
    /// `ExecutionResult` with `success == false`.
    pub fn compile_and_run(&self, source: &Path, input: &Path) -> Result<ExecutionResult> {
        let executable = executable_path(source)?;
        let compile_cmd = self.resolver.render_compile_command(source, &executable)?;
        let run_cmd = self.resolver.render_run_command(&executable, input)?;

        let artifact = ArtifactGuard::new(executable);

        tracing::debug!("Compiling {}: {}", source.display(), compile_cmd);
        let compiled = run_stage(Stage::Compiling, &compile_cmd, None);
        if !compiled.success() {
            tracing::info!("Compilation of {} failed", source.display());
            return Ok(ExecutionResult::failed(compiled.into_diagnostics()));
        }

        tracing::debug!("Running {}: {}", artifact.path().display(), run_cmd);
        let ran = run_stage(Stage::Running, &run_cmd, self.run.timeout());
        drop(artifact);

        match ran {
            StageOutcome::Exited(output) if output.success() => {
                tracing::info!("Run of {} succeeded", source.display());
                Ok(ExecutionResult::succeeded(output.stdout, output.stderr))
            }
            failed => {
                tracing::info!("Run of {} failed", source.display());
                Ok(ExecutionResult::failed(failed.into_diagnostics()))
            }
        }
    }

    /// @ai:intent Compile, run and compare stdout against the expected text
    /// @ai:effects fs:write, io
    pub fn run_and_verify(&self, source: &Path, input: &Path, expected: &str) -> Result<TestOutcome> {
        let result = self.compile_and_run(source, input)?;
        let outcome = TestOutcome::judge(result, expected);
        tracing::info!("{}: {}", source.display(), outcome.as_str());
        Ok(outcome)
    }
}

/// @ai:intent What one stage produced: an exited process, or a launch failure
#[derive(Debug)]
enum StageOutcome {
    Exited(ProcessOutput),
    TimedOut(ProcessOutput, Duration),
    LaunchFailed(String),
}

impl StageOutcome {
    fn success(&self) -> bool {
        matches!(self, StageOutcome::Exited(output) if output.success())
    }

    /// @ai:intent Diagnostic text reported for a failed stage
    /// @ai:effects pure
    fn into_diagnostics(self) -> String {
        match self {
            StageOutcome::Exited(output) => output.stderr,
            StageOutcome::TimedOut(output, limit) => {
                let mut stderr = output.stderr;
                if !stderr.is_empty() && !stderr.ends_with('\n') {
                    stderr.push('\n');
                }
                stderr.push_str(&format!("time limit exceeded ({}s)", limit.as_secs_f64()));
                stderr
            }
            StageOutcome::LaunchFailed(message) => message,
        }
    }
}

/// @ai:intent Execute one stage, folding launch errors and timeouts into the outcome
/// @ai:effects io
fn run_stage(stage: Stage, command: &CommandLine, timeout: Option<Duration>) -> StageOutcome {
    match process::execute(command, timeout) {
        Ok(output) if output.timed_out => {
            tracing::warn!("{} stage exceeded its time limit", stage);
            StageOutcome::TimedOut(output, timeout.unwrap_or_default())
        }
        Ok(output) => {
            tracing::debug!("{} stage exited with {}", stage, output.status);
            StageOutcome::Exited(output)
        }
        Err(e) => {
            let program = if command.shell { "sh" } else { command.program.as_str() };
            tracing::debug!("{} stage could not launch `{}`: {}", stage, program, e);
            StageOutcome::LaunchFailed(format!("{} {e}", launch_failure_prefix(program)))
        }
    }
}
