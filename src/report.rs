//! @ai:module:intent Render run and test outcomes as text or JSON
//! @ai:module:layer presentation
//! @ai:module:public_api RunReport, TestReport, OutputFormat
//! @ai:module:stateless true

use crate::engine::{ExecutionResult, TestOutcome};
use serde::Serialize;
use std::fmt::Write as FmtWrite;

/// @ai:intent Supported report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// @ai:intent Outcome of `run` for one problem
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub contest: String,
    pub problem: String,
    pub timestamp: String,
    pub result: ExecutionResult,
}

/// @ai:intent Outcome of `test` for one problem
#[derive(Debug, Clone, Serialize)]
pub struct TestReport {
    pub contest: String,
    pub problem: String,
    pub timestamp: String,
    pub expected: String,
    pub outcome: TestOutcome,
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

impl RunReport {
    /// @ai:effects pure
    pub fn new(contest: &str, problem: &str, result: ExecutionResult) -> Self {
        Self {
            contest: contest.to_string(),
            problem: problem.to_string(),
            timestamp: now(),
            result,
        }
    }

    /// @ai:intent Render the report
    /// @ai:effects pure
    pub fn render(&self, format: OutputFormat) -> serde_json::Result<String> {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(self),
            OutputFormat::Text => Ok(self.to_text()),
        }
    }

    fn to_text(&self) -> String {
        let mut out = String::new();

        if self.result.success {
            writeln!(out, "Output:").unwrap();
            out.push_str(&self.result.stdout);
        } else {
            writeln!(out, "Compilation/Runtime Error:").unwrap();
            out.push_str(&self.result.stderr);
        }
        if !out.ends_with('\n') {
            out.push('\n');
        }

        out
    }
}

impl TestReport {
    /// @ai:effects pure
    pub fn new(contest: &str, problem: &str, expected: String, outcome: TestOutcome) -> Self {
        Self {
            contest: contest.to_string(),
            problem: problem.to_string(),
            timestamp: now(),
            expected,
            outcome,
        }
    }

    /// @ai:intent Render the report
    /// @ai:effects pure
    pub fn render(&self, format: OutputFormat) -> serde_json::Result<String> {
        match format {
            OutputFormat::Json => serde_json::to_string_pretty(self),
            OutputFormat::Text => Ok(self.to_text()),
        }
    }

    fn to_text(&self) -> String {
        let mut out = String::new();

        match &self.outcome {
            TestOutcome::Failed(result) => {
                writeln!(out, "Compilation/Runtime Error:").unwrap();
                out.push_str(&result.stderr);
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            TestOutcome::Passed(result) => {
                writeln!(out, "✓ Output matches expected output!").unwrap();
                out.push_str(&side_by_side(&self.expected, &result.stdout));
            }
            TestOutcome::WrongAnswer(result) => {
                writeln!(out, "✗ Output does not match expected output!").unwrap();
                out.push_str(&side_by_side(&self.expected, &result.stdout));
            }
        }

        out
    }
}

/// @ai:intent Two-column Expected/Got table, marking rows that differ
/// @ai:effects pure
fn side_by_side(expected: &str, got: &str) -> String {
    let left: Vec<&str> = expected.trim().lines().collect();
    let right: Vec<&str> = got.trim().lines().collect();
    let width = left
        .iter()
        .map(|l| l.chars().count())
        .chain(std::iter::once("Expected".len()))
        .max()
        .unwrap_or_default();

    let mut out = String::new();
    writeln!(out, "  {:<width$} | Got", "Expected").unwrap();
    writeln!(out, "  {}-+-{}", "-".repeat(width), "-".repeat(width.max(3))).unwrap();

    for i in 0..left.len().max(right.len()) {
        let l = left.get(i).copied().unwrap_or_default();
        let r = right.get(i).copied().unwrap_or_default();
        let marker = if left.get(i) == right.get(i) { ' ' } else { '!' };
        writeln!(out, "{marker} {l:<width$} | {r}").unwrap();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_side_by_side_marks_differences() {
        let table = side_by_side("1\n2\n", "1\n3\n");
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "  Expected | Got");
        assert_eq!(lines[2], "  1        | 1");
        assert_eq!(lines[3], "! 2        | 3");
    }

    #[test]
    fn test_side_by_side_pads_missing_lines() {
        let table = side_by_side("1\n2", "1");
        assert!(table.lines().last().unwrap().starts_with("! 2"));
    }

    #[test]
    fn test_run_report_text_shows_stderr_on_failure() {
        let report = RunReport::new("1850", "A", ExecutionResult::failed("error: x".to_string()));
        let text = report.render(OutputFormat::Text).unwrap();
        assert_eq!(text, "Compilation/Runtime Error:\nerror: x\n");
    }

    #[test]
    fn test_run_report_text_shows_stdout_on_success() {
        let result = ExecutionResult::succeeded("8\n".to_string(), String::new());
        let text = RunReport::new("1850", "A", result).render(OutputFormat::Text).unwrap();
        assert_eq!(text, "Output:\n8\n");
    }

    #[test]
    fn test_test_report_json_has_verdict() {
        let result = ExecutionResult::succeeded("8\n".to_string(), String::new());
        let report = TestReport::new("1850", "A", "8\n".to_string(), TestOutcome::judge(result, "8\n"));
        let json: serde_json::Value =
            serde_json::from_str(&report.render(OutputFormat::Json).unwrap()).unwrap();

        assert_eq!(json["outcome"]["verdict"], "passed");
        assert_eq!(json["outcome"]["result"]["stdout"], "8\n");
        assert_eq!(json["contest"], "1850");
    }
}
