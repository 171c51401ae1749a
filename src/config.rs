//! @ai:module:intent Configuration structs for the contest toolchain
//! @ai:module:layer infrastructure
//! @ai:module:public_api SeepeeConfig, ToolchainConfig, CompilerConfig, CommandsConfig, FileNamingConfig, PathsConfig, RunConfig
//! @ai:module:stateless true

use crate::error::{Error, Result};
use crate::template;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default location of the persisted configuration, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "seepee.toml";

/// @ai:intent Main configuration, loaded once at startup and passed explicitly
/// @ai:effects pure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeepeeConfig {
    #[serde(flatten)]
    pub toolchain: ToolchainConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub run: RunConfig,
}

/// @ai:intent Compiler invocation, run invocation and file naming patterns
/// @ai:effects pure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolchainConfig {
    #[serde(default)]
    pub compile: CompilerConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub file_naming: FileNamingConfig,
}

/// @ai:intent Compiler executable and its ordered flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(default = "default_compiler")]
    pub command: String,
    #[serde(default = "default_flags")]
    pub flags: Vec<String>,
}

/// @ai:intent Compile and run command templates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandsConfig {
    #[serde(default = "default_compile_template")]
    pub compile: String,
    #[serde(default = "default_run_template")]
    pub run: String,
    /// Hand rendered commands to `sh -c` instead of spawning the argument vector directly.
    #[serde(default)]
    pub shell: bool,
}

/// @ai:intent Per-problem file name patterns, each with a single `{}` for the letter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNamingConfig {
    #[serde(default = "default_problem_pattern")]
    pub problem: String,
    #[serde(default = "default_input_pattern")]
    pub input: String,
    #[serde(default = "default_output_pattern")]
    pub output: String,
}

/// @ai:intent Workspace and template locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,
    #[serde(default = "default_template")]
    pub template: PathBuf,
    #[serde(default = "default_templates_dir")]
    pub templates_dir: PathBuf,
}

/// @ai:intent Limits applied to the run stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Wall-clock limit for the compiled program; 0 disables it.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            command: default_compiler(),
            flags: default_flags(),
        }
    }
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            compile: default_compile_template(),
            run: default_run_template(),
            shell: false,
        }
    }
}

impl Default for FileNamingConfig {
    fn default() -> Self {
        Self {
            problem: default_problem_pattern(),
            input: default_input_pattern(),
            output: default_output_pattern(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            workspace: default_workspace(),
            template: default_template(),
            templates_dir: default_templates_dir(),
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_compiler() -> String {
    "g++".to_string()
}

fn default_flags() -> Vec<String> {
    vec!["-std=c++17".to_string(), "-O2".to_string(), "-Wall".to_string()]
}

fn default_compile_template() -> String {
    "{compiler} {flags} {source} -o {executable}".to_string()
}

fn default_run_template() -> String {
    "{executable} < {input}".to_string()
}

fn default_problem_pattern() -> String {
    "{}.cpp".to_string()
}

fn default_input_pattern() -> String {
    "{}.in".to_string()
}

fn default_output_pattern() -> String {
    "{}.out".to_string()
}

fn default_workspace() -> PathBuf {
    PathBuf::from(".")
}

fn default_template() -> PathBuf {
    PathBuf::from("templates/template.cpp")
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

fn default_timeout_secs() -> u64 {
    10
}

impl RunConfig {
    /// @ai:intent Run-stage limit as a duration, None when disabled
    /// @ai:effects pure
    pub fn timeout(&self) -> Option<std::time::Duration> {
        (self.timeout_secs > 0).then(|| std::time::Duration::from_secs(self.timeout_secs))
    }
}

impl ToolchainConfig {
    /// @ai:intent Check every template so malformed ones fail before any process is spawned
    /// @ai:effects pure
    pub fn validate(&self) -> Result<()> {
        template::check_command_template(&self.commands.compile, template::COMPILE_PLACEHOLDERS)?;
        template::check_command_template(&self.commands.run, template::RUN_PLACEHOLDERS)?;

        for pattern in [
            &self.file_naming.problem,
            &self.file_naming.input,
            &self.file_naming.output,
        ] {
            template::check_naming_template(pattern)?;
        }

        Ok(())
    }
}

impl SeepeeConfig {
    /// @ai:intent Load configuration from a TOML file
    /// @ai:pre path exists and is readable
    /// @ai:effects fs:read
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content)?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// @ai:intent Load the given file, or the default file if present, or built-in defaults
    /// @ai:effects fs:read
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);

                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// @ai:intent Save configuration to a TOML file
    /// @ai:effects fs:write
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @ai:intent Replace the compiler executable and persist
    /// @ai:effects fs:write
    pub fn update_compiler(&mut self, compiler: &str, path: &Path) -> Result<()> {
        self.toolchain.compile.command = compiler.to_string();
        self.save(path)
    }

    /// @ai:intent Replace the compiler flags and persist
    /// @ai:effects fs:write
    pub fn update_compiler_flags(&mut self, flags: Vec<String>, path: &Path) -> Result<()> {
        self.toolchain.compile.flags = flags;
        self.save(path)
    }

    /// @ai:intent Replace the solution template path and persist
    /// @ai:effects fs:write
    pub fn update_template(&mut self, template: PathBuf, path: &Path) -> Result<()> {
        self.paths.template = template;
        self.save(path)
    }

    /// @ai:intent Replace the templates directory and persist
    /// @ai:effects fs:write
    pub fn update_templates_dir(&mut self, templates_dir: PathBuf, path: &Path) -> Result<()> {
        self.paths.templates_dir = templates_dir;
        self.save(path)
    }
}
