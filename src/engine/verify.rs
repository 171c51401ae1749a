//! @ai:module:intent Compare program output against expected output
//! @ai:module:layer domain
//! @ai:module:public_api verify, TestOutcome
//! @ai:module:stateless true

use crate::engine::ExecutionResult;
use serde::Serialize;

/// @ai:intent Line-wise equality after trimming the whole text; interior whitespace is significant
/// @ai:effects pure
pub fn verify(actual: &str, expected: &str) -> bool {
    split_lines(trim_text(actual)).eq(split_lines(trim_text(expected)))
}

/// Universal newlines: `\r\n` counts as one break, and a lone `\r`, vertical
/// tab, form feed, the file/group/record separators, NEL and the Unicode
/// line/paragraph separators each end a line too.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// @ai:intent Strip leading and trailing whitespace, including the ASCII separators
/// @ai:effects pure
fn trim_text(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || ('\x1c'..='\x1f').contains(&c))
}

/// @ai:intent Split text into lines on every universal newline; no trailing empty line
/// @ai:effects pure
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = Some(text).filter(|t| !t.is_empty());

    std::iter::from_fn(move || {
        let text = rest?;
        match text.find(is_line_break) {
            Some(at) => {
                let tail = &text[at..];
                let width = if tail.starts_with("\r\n") {
                    2
                } else {
                    tail.chars().next().map_or(1, char::len_utf8)
                };
                let next = &text[at + width..];
                rest = (!next.is_empty()).then_some(next);
                Some(&text[..at])
            }
            None => {
                rest = None;
                Some(text)
            }
        }
    })
}

/// @ai:intent Outcome of running a solution against one test case
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "result", rename_all = "snake_case")]
pub enum TestOutcome {
    Passed(ExecutionResult),
    WrongAnswer(ExecutionResult),
    /// Compilation or runtime failure; expected output was not compared.
    Failed(ExecutionResult),
}

impl TestOutcome {
    /// @ai:intent Classify an execution result against the expected text
    /// @ai:effects pure
    pub fn judge(result: ExecutionResult, expected: &str) -> Self {
        if !result.success {
            Self::Failed(result)
        } else if verify(&result.stdout, expected) {
            Self::Passed(result)
        } else {
            Self::WrongAnswer(result)
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed(_))
    }

    pub fn result(&self) -> &ExecutionResult {
        match self {
            Self::Passed(r) | Self::WrongAnswer(r) | Self::Failed(r) => r,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passed(_) => "passed",
            Self::WrongAnswer(_) => "wrong answer",
            Self::Failed(_) => "failed",
        }
    }
}
