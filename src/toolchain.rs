//! @ai:module:intent Check that the configured compiler can be launched
//! @ai:module:layer infrastructure
//! @ai:module:public_api ToolchainValidator, ToolchainStatus
//! @ai:module:stateless true
//!
//! The pipeline reports a missing compiler the same way as a rejected source.
//! Callers use this module to tell the two apart.

use crate::config::ToolchainConfig;
use std::process::Command;

/// @ai:intent Status of toolchain validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainStatus {
    pub compiler: String,
    pub available: bool,
    /// First line the compiler printed for `--version`.
    pub version: Option<String>,
    pub install_hint: &'static str,
}

/// @ai:intent Validates that the configured tools are installed
pub struct ToolchainValidator;

impl ToolchainValidator {
    /// @ai:intent Get install hint for a compiler
    /// @ai:effects pure
    fn get_install_hint(tool: &str) -> &'static str {
        match tool {
            "g++" | "gcc" => "Install GCC: https://gcc.gnu.org/install/ (or your package manager)",
            "clang++" | "clang" => "Install Clang: https://releases.llvm.org/",
            "rustc" => "Install Rust: https://rustup.rs/",
            _ => "Check the compiler's documentation and `compile.command` in your config",
        }
    }

    /// @ai:intent Run `<tool> --version` and keep the first line of output
    /// @ai:effects io
    fn query_version(tool: &str) -> Option<String> {
        let output = Command::new(tool).arg("--version").output().ok()?;

        if !output.status.success() {
            return None;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Some(stdout.lines().next().unwrap_or_default().trim().to_string())
    }

    /// @ai:intent Validate the configured compiler and return status
    /// @ai:effects io
    pub fn validate(config: &ToolchainConfig) -> ToolchainStatus {
        let compiler = config.compile.command.clone();
        let version = Self::query_version(&compiler);

        ToolchainStatus {
            available: version.is_some(),
            install_hint: Self::get_install_hint(&compiler),
            compiler,
            version,
        }
    }

    /// @ai:intent Log a warning when the compiler is missing
    /// @ai:effects io
    pub fn log_warnings(status: &ToolchainStatus) {
        if !status.available {
            tracing::warn!(
                "Compiler '{}' not found - solutions cannot be built. {}",
                status.compiler,
                status.install_hint
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_install_hint_known_tools() {
        assert!(ToolchainValidator::get_install_hint("g++").contains("gcc.gnu.org"));
        assert!(ToolchainValidator::get_install_hint("clang++").contains("llvm"));
        assert!(ToolchainValidator::get_install_hint("tcc").contains("compile.command"));
    }

    #[test]
    fn test_missing_compiler_is_unavailable() {
        let mut config = ToolchainConfig::default();
        config.compile.command = "nonexistent_tool_xyz".to_string();

        let status = ToolchainValidator::validate(&config);
        assert!(!status.available);
        assert_eq!(status.version, None);
        assert_eq!(status.compiler, "nonexistent_tool_xyz");
    }
}
