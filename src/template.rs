//! @ai:module:intent Render compile/run commands and per-problem file names from configured templates
//! @ai:module:layer domain
//! @ai:module:public_api CommandResolver, CommandLine, FileKind, check_command_template, check_naming_template
//! @ai:module:stateless true
//!
//! Command templates are split on whitespace into an argument vector, so no
//! shell is involved unless `commands.shell` asks for one. A `<` token feeds the
//! following path to the child's standard input.

use crate::config::ToolchainConfig;
use crate::error::ConfigError;
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const COMPILE_PLACEHOLDERS: &[&str] = &["compiler", "flags", "source", "executable"];
pub const RUN_PLACEHOLDERS: &[&str] = &["executable", "input"];

const FLAGS: &str = "{flags}";

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}]*)\}").expect("placeholder pattern is valid"))
}

/// @ai:intent Which per-problem file a naming template describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Source,
    Input,
    ExpectedOutput,
}

/// @ai:intent A ready-to-spawn command: program, arguments and optional stdin file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
    pub stdin: Option<PathBuf>,
    /// Run through `sh -c` with `program` holding the whole rendered line.
    pub shell: bool,
}

impl CommandLine {
    /// @ai:intent Build an argv-style command
    /// @ai:effects pure
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            stdin: None,
            shell: false,
        }
    }

    /// @ai:intent Build a command handed verbatim to the system shell
    /// @ai:effects pure
    pub fn shell(line: impl Into<String>) -> Self {
        Self {
            program: line.into(),
            args: Vec::new(),
            stdin: None,
            shell: true,
        }
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        if let Some(stdin) = &self.stdin {
            write!(f, " < {}", stdin.display())?;
        }
        Ok(())
    }
}

/// @ai:intent Verify a command template only uses, and uses all of, the allowed placeholders
/// @ai:effects pure
pub fn check_command_template(template: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    let mut seen = Vec::new();

    for caps in placeholder_regex().captures_iter(template) {
        let name = &caps[1];

        if !allowed.contains(&name) {
            return Err(ConfigError::UnknownPlaceholder {
                template: template.to_string(),
                name: name.to_string(),
            });
        }
        seen.push(name.to_string());
    }

    if let Some(missing) = allowed.iter().find(|name| !seen.iter().any(|s| s == *name)) {
        return Err(ConfigError::MissingPlaceholder {
            template: template.to_string(),
            name: missing.to_string(),
        });
    }

    if template.split_whitespace().next().is_none() {
        return Err(ConfigError::EmptyCommand {
            template: template.to_string(),
        });
    }

    Ok(())
}

/// @ai:intent Verify a naming template has exactly one positional `{}` and nothing else
/// @ai:effects pure
pub fn check_naming_template(template: &str) -> Result<(), ConfigError> {
    let mut found = 0;

    for caps in placeholder_regex().captures_iter(template) {
        let name = &caps[1];

        if !name.is_empty() {
            return Err(ConfigError::UnknownPlaceholder {
                template: template.to_string(),
                name: name.to_string(),
            });
        }
        found += 1;
    }

    if found != 1 {
        return Err(ConfigError::PlaceholderCount {
            template: template.to_string(),
            found,
        });
    }

    Ok(())
}

/// @ai:intent Substitute named placeholders in one token
/// @ai:effects pure
fn substitute(token: &str, values: &[(&str, &str)]) -> String {
    placeholder_regex()
        .replace_all(token, |caps: &regex::Captures| {
            values
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// @ai:intent Renders commands and file names against one toolchain configuration
#[derive(Debug, Clone, Copy)]
pub struct CommandResolver<'a> {
    config: &'a ToolchainConfig,
}

impl<'a> CommandResolver<'a> {
    /// @ai:effects pure
    pub fn new(config: &'a ToolchainConfig) -> Self {
        Self { config }
    }

    /// @ai:intent Render the compile command for a source/executable pair
    /// @ai:effects pure
    pub fn render_compile_command(
        &self,
        source: &Path,
        executable: &Path,
    ) -> Result<CommandLine, ConfigError> {
        let template = &self.config.commands.compile;
        check_command_template(template, COMPILE_PLACEHOLDERS)?;

        let flags = &self.config.compile.flags;
        let joined_flags = flags.join(" ");
        let source = source.display().to_string();
        let executable = executable.display().to_string();
        let values = [
            ("compiler", self.config.compile.command.as_str()),
            ("flags", joined_flags.as_str()),
            ("source", source.as_str()),
            ("executable", executable.as_str()),
        ];

        self.build(template, &values, flags)
    }

    /// @ai:intent Render the run command for an executable/input pair
    /// @ai:effects pure
    pub fn render_run_command(
        &self,
        executable: &Path,
        input: &Path,
    ) -> Result<CommandLine, ConfigError> {
        let template = &self.config.commands.run;
        check_command_template(template, RUN_PLACEHOLDERS)?;

        let executable = executable.display().to_string();
        let input = input.display().to_string();
        let values = [("executable", executable.as_str()), ("input", input.as_str())];

        self.build(template, &values, &[])
    }

    /// @ai:intent Render the file name of one per-problem file
    /// @ai:effects pure
    pub fn file_name(&self, kind: FileKind, problem: &str) -> Result<String, ConfigError> {
        let naming = &self.config.file_naming;
        let template = match kind {
            FileKind::Source => &naming.problem,
            FileKind::Input => &naming.input,
            FileKind::ExpectedOutput => &naming.output,
        };
        check_naming_template(template)?;

        Ok(template.replacen("{}", problem, 1))
    }

    fn build(
        &self,
        template: &str,
        values: &[(&str, &str)],
        flags: &[String],
    ) -> Result<CommandLine, ConfigError> {
        if self.config.commands.shell {
            return Ok(CommandLine::shell(substitute(template, values)));
        }

        let mut argv: Vec<String> = Vec::new();
        let mut stdin = None;
        let mut tokens = template.split_whitespace();

        while let Some(token) = tokens.next() {
            if token == FLAGS {
                argv.extend(flags.iter().cloned());
            } else if token == "<" {
                let target = tokens.next().ok_or_else(|| ConfigError::DanglingRedirect {
                    template: template.to_string(),
                })?;
                stdin = Some(PathBuf::from(substitute(target, values)));
            } else if let Some(target) = token.strip_prefix('<') {
                stdin = Some(PathBuf::from(substitute(target, values)));
            } else {
                argv.push(substitute(token, values));
            }
        }

        let mut argv = argv.into_iter();
        let program = argv.next().ok_or_else(|| ConfigError::EmptyCommand {
            template: template.to_string(),
        })?;

        let mut command = CommandLine::new(program, argv.collect());
        command.stdin = stdin;
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config() -> ToolchainConfig {
        let mut config = ToolchainConfig::default();
        config.compile.command = "g++".to_string();
        config.compile.flags = vec!["-std=c++17".to_string(), "-O2".to_string()];
        config
    }

    #[test]
    fn test_file_name_substitutes_letter() {
        let mut config = config();
        config.file_naming.problem = "problem_{}.cpp".to_string();
        let resolver = CommandResolver::new(&config);

        assert_eq!(
            resolver.file_name(FileKind::Source, "A").unwrap(),
            "problem_A.cpp"
        );
        assert_eq!(resolver.file_name(FileKind::Input, "B").unwrap(), "B.in");
        assert_eq!(
            resolver.file_name(FileKind::ExpectedOutput, "C").unwrap(),
            "C.out"
        );
    }

    #[test]
    fn test_file_name_rejects_wrong_placeholder_count() {
        let mut config = config();
        config.file_naming.problem = "{}_{}.cpp".to_string();
        config.file_naming.input = "input.txt".to_string();
        config.file_naming.output = "{letter}.out".to_string();
        let resolver = CommandResolver::new(&config);

        assert_eq!(
            resolver.file_name(FileKind::Source, "A"),
            Err(ConfigError::PlaceholderCount {
                template: "{}_{}.cpp".to_string(),
                found: 2,
            })
        );
        assert!(matches!(
            resolver.file_name(FileKind::Input, "A"),
            Err(ConfigError::PlaceholderCount { found: 0, .. })
        ));
        assert!(matches!(
            resolver.file_name(FileKind::ExpectedOutput, "A"),
            Err(ConfigError::UnknownPlaceholder { .. })
        ));
    }

    #[test]
    fn test_compile_command_expands_flags_into_arguments() {
        let config = config();
        let resolver = CommandResolver::new(&config);

        let cmd = resolver
            .render_compile_command(Path::new("1850/A.cpp"), Path::new("1850/A"))
            .unwrap();

        assert_eq!(cmd.program, "g++");
        assert_eq!(cmd.args, vec!["-std=c++17", "-O2", "1850/A.cpp", "-o", "1850/A"]);
        assert_eq!(cmd.stdin, None);
        assert_eq!(cmd.to_string(), "g++ -std=c++17 -O2 1850/A.cpp -o 1850/A");
    }

    #[test]
    fn test_compile_command_with_no_flags() {
        let mut config = config();
        config.compile.flags.clear();
        let resolver = CommandResolver::new(&config);

        let cmd = resolver
            .render_compile_command(Path::new("A.cpp"), Path::new("./A"))
            .unwrap();
        assert_eq!(cmd.args, vec!["A.cpp", "-o", "./A"]);
    }

    #[test]
    fn test_run_command_redirects_input() {
        let config = config();
        let resolver = CommandResolver::new(&config);

        let cmd = resolver
            .render_run_command(Path::new("1850/A"), Path::new("1850/A.in"))
            .unwrap();

        assert_eq!(cmd.program, "1850/A");
        assert!(cmd.args.is_empty());
        assert_eq!(cmd.stdin, Some(PathBuf::from("1850/A.in")));
        assert_eq!(cmd.to_string(), "1850/A < 1850/A.in");
    }

    #[test]
    fn test_run_command_with_input_as_argument() {
        let mut config = config();
        config.commands.run = "{executable} --file={input}".to_string();
        let resolver = CommandResolver::new(&config);

        let cmd = resolver
            .render_run_command(Path::new("./A"), Path::new("A.in"))
            .unwrap();
        assert_eq!(cmd.args, vec!["--file=A.in"]);
        assert_eq!(cmd.stdin, None);
    }

    #[test]
    fn test_attached_redirect() {
        let mut config = config();
        config.commands.run = "{executable} <{input}".to_string();
        let resolver = CommandResolver::new(&config);

        let cmd = resolver
            .render_run_command(Path::new("./A"), Path::new("A.in"))
            .unwrap();
        assert_eq!(cmd.stdin, Some(PathBuf::from("A.in")));
    }

    #[test]
    fn test_shell_mode_renders_single_line() {
        let mut config = config();
        config.commands.shell = true;
        let resolver = CommandResolver::new(&config);

        let cmd = resolver
            .render_compile_command(Path::new("A.cpp"), Path::new("A"))
            .unwrap();
        assert!(cmd.shell);
        assert_eq!(cmd.program, "g++ -std=c++17 -O2 A.cpp -o A");
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn test_unknown_placeholder_is_config_error() {
        let mut config = config();
        config.commands.compile = "{compiler} {flags} {source} -o {executable} {extra}".to_string();
        let resolver = CommandResolver::new(&config);

        let err = resolver
            .render_compile_command(Path::new("A.cpp"), Path::new("A"))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownPlaceholder {
                template: config.commands.compile.clone(),
                name: "extra".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_placeholder_is_config_error() {
        let mut config = config();
        config.commands.run = "{executable}".to_string();
        let resolver = CommandResolver::new(&config);

        let err = resolver
            .render_run_command(Path::new("A"), Path::new("A.in"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingPlaceholder { name, .. } if name == "input"));
    }

    #[test]
    fn test_dangling_redirect_is_config_error() {
        let mut config = config();
        config.commands.run = "{executable} {input} <".to_string();
        let resolver = CommandResolver::new(&config);

        let err = resolver
            .render_run_command(Path::new("A"), Path::new("A.in"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DanglingRedirect { .. }));
    }
}
