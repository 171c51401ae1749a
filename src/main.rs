//! @ai:module:intent CLI for creating contests and running/testing solutions
//! @ai:module:layer presentation

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use seepee::{
    config::DEFAULT_CONFIG_FILE, ContestWorkspace, ContestWorkspaceTrait, Engine, ExecutionResult,
    OutputFormat, RunReport, SeepeeConfig, TestReport, ToolchainValidator,
};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "seepee")]
#[command(about = "Scaffold, compile, run and verify competitive programming solutions")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        output: PathBuf,
    },

    /// Create a contest directory and seed problem files from the template
    New {
        /// Contest identifier (directory name inside the workspace)
        contest: String,

        /// Problem letters, e.g. A B C
        #[arg(required = true)]
        problems: Vec<String>,
    },

    /// Compile and run a problem on its input file
    Run {
        contest: String,
        problem: String,

        /// Replace the input file with this file's contents first (`-` reads stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Compile, run and compare against the expected output
    Test {
        contest: String,
        problem: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: Format,
    },

    /// Save a test case (input and optional expected output)
    AddCase {
        contest: String,
        problem: String,

        /// File holding the input (`-` reads stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// File holding the expected output (`-` reads stdin)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List problems of a contest
    List { contest: String },

    /// Show or edit the configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Check that the configured compiler is installed
    Doctor,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the active configuration
    Show,
    /// Set the compiler executable
    Compiler { command: String },
    /// Set the compiler flags
    Flags {
        #[arg(allow_hyphen_values = true, trailing_var_arg = true, num_args = 0..)]
        flags: Vec<String>,
    },
    /// Set the solution template file
    Template { path: PathBuf },
    /// Set the templates directory
    TemplatesDir { path: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => OutputFormat::Text,
            Format::Json => OutputFormat::Json,
        }
    }
}

fn main() -> ExitCode {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "seepee=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match dispatch(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn dispatch(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config;

    match cli.command {
        Commands::Init { output } => init_config(output),
        Commands::New { contest, problems } => {
            let config = load_config(config_path.as_deref())?;
            new_contest(&config, &contest, &problems)
        }
        Commands::Run {
            contest,
            problem,
            input,
            format,
        } => {
            let config = load_config(config_path.as_deref())?;
            run_problem(&config, &contest, &problem, input.as_deref(), format.into())
        }
        Commands::Test {
            contest,
            problem,
            format,
        } => {
            let config = load_config(config_path.as_deref())?;
            test_problem(&config, &contest, &problem, format.into())
        }
        Commands::AddCase {
            contest,
            problem,
            input,
            output,
        } => {
            let config = load_config(config_path.as_deref())?;
            add_case(&config, &contest, &problem, &input, output.as_deref())
        }
        Commands::List { contest } => {
            let config = load_config(config_path.as_deref())?;
            list_problems(&config, &contest)
        }
        Commands::Config { action } => edit_config(config_path, action),
        Commands::Doctor => {
            let config = load_config(config_path.as_deref())?;
            doctor(&config)
        }
    }
}

/// @ai:intent Load and validate configuration, falling back to defaults
/// @ai:effects fs:read
fn load_config(path: Option<&Path>) -> Result<SeepeeConfig> {
    let config = SeepeeConfig::load_or_default(path).context("Failed to load configuration")?;
    config
        .toolchain
        .validate()
        .context("Invalid toolchain configuration")?;
    Ok(config)
}

/// @ai:intent Read a text blob from a file, or stdin for `-`
/// @ai:effects fs:read
fn read_blob(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// @ai:intent Resolve an existing contest directory
/// @ai:effects fs:read
fn existing_contest_dir(workspace: &ContestWorkspace, contest: &str) -> Result<PathBuf> {
    let dir = workspace.contest_dir(contest)?;
    if !dir.is_dir() {
        bail!("Contest directory '{}' not found!", dir.display());
    }
    Ok(dir)
}

/// @ai:intent Initialize default configuration file
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<ExitCode> {
    let config = SeepeeConfig::default();
    config.save(&output)?;
    println!("Configuration saved to {}", output.display());
    Ok(ExitCode::SUCCESS)
}

/// @ai:effects fs:write
fn new_contest(config: &SeepeeConfig, contest: &str, problems: &[String]) -> Result<ExitCode> {
    let workspace = ContestWorkspace::new(config);
    let dir = workspace.create_contest_dir(contest)?;
    let created = workspace.create_problem_files(&dir, problems)?;

    println!("Contest {} ready in {}", contest, dir.display());
    for paths in &created {
        println!("  - {}", paths.source.display());
    }
    Ok(ExitCode::SUCCESS)
}

/// @ai:intent Compile and run one problem, printing its output
/// @ai:effects fs:write, io
fn run_problem(
    config: &SeepeeConfig,
    contest: &str,
    problem: &str,
    input: Option<&Path>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let workspace = ContestWorkspace::new(config);
    let dir = existing_contest_dir(&workspace, contest)?;
    let paths = workspace.problem_paths(&dir, problem)?;

    if !paths.source.is_file() {
        bail!("Problem {} not found!", problem);
    }

    if let Some(input) = input {
        let content = read_blob(input)?;
        if !content.trim().is_empty() {
            workspace.write_input(&dir, problem, &content)?;
        }
    }
    if !paths.input.is_file() {
        bail!("Input file {} not found!", paths.input.display());
    }

    let engine = Engine::new(&config.toolchain, config.run);
    let result = engine.compile_and_run(&paths.source, &paths.input)?;
    warn_if_toolchain_missing(config, &result);

    let success = result.success;
    let report = RunReport::new(contest, problem, result);
    print!("{}", report.render(format)?);

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// @ai:intent Run one problem against its expected output
/// @ai:effects fs:write, io
fn test_problem(
    config: &SeepeeConfig,
    contest: &str,
    problem: &str,
    format: OutputFormat,
) -> Result<ExitCode> {
    let workspace = ContestWorkspace::new(config);
    let dir = existing_contest_dir(&workspace, contest)?;
    let paths = workspace.problem_paths(&dir, problem)?;

    if !paths.source.is_file() {
        bail!("Problem {} not found!", problem);
    }
    let expected = workspace
        .read_expected(&dir, problem)
        .context("Expected output file not found! Add test cases first.")?;

    let engine = Engine::new(&config.toolchain, config.run);
    let outcome = engine.run_and_verify(&paths.source, &paths.input, &expected)?;
    warn_if_toolchain_missing(config, outcome.result());

    let passed = outcome.passed();
    let report = TestReport::new(contest, problem, expected, outcome);
    print!("{}", report.render(format)?);

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// @ai:intent Tell a missing compiler apart from a rejected source
/// @ai:pre only checks the toolchain when the compiler itself could not be launched
/// @ai:effects io
fn warn_if_toolchain_missing(config: &SeepeeConfig, result: &ExecutionResult) {
    if !result.launch_failed(&config.toolchain.compile.command) {
        return;
    }
    let status = ToolchainValidator::validate(&config.toolchain);
    ToolchainValidator::log_warnings(&status);
}

/// @ai:effects fs:write
fn add_case(
    config: &SeepeeConfig,
    contest: &str,
    problem: &str,
    input: &Path,
    output: Option<&Path>,
) -> Result<ExitCode> {
    if input == Path::new("-") && output == Some(Path::new("-")) {
        bail!("Only one of --input and --output can read from stdin");
    }

    let workspace = ContestWorkspace::new(config);
    let dir = existing_contest_dir(&workspace, contest)?;
    let paths = workspace.problem_paths(&dir, problem)?;

    if !paths.source.is_file() {
        bail!("Problem {} not found!", problem);
    }

    let input_content = read_blob(input)?;
    if input_content.is_empty() {
        bail!("Input is required!");
    }
    workspace.write_input(&dir, problem, &input_content)?;

    if let Some(output) = output {
        let output_content = read_blob(output)?;
        if !output_content.is_empty() {
            workspace.write_output(&dir, problem, &output_content)?;
        }
    }

    println!("Test case saved successfully!");
    Ok(ExitCode::SUCCESS)
}

/// @ai:effects fs:read
fn list_problems(config: &SeepeeConfig, contest: &str) -> Result<ExitCode> {
    let workspace = ContestWorkspace::new(config);
    let dir = existing_contest_dir(&workspace, contest)?;

    for problem in workspace.list_problems(&dir)? {
        let paths = workspace.problem_paths(&dir, &problem)?;
        let marker = if paths.expected.is_file() { "has expected output" } else { "no expected output" };
        println!("  - {} ({})", problem, marker);
    }
    Ok(ExitCode::SUCCESS)
}

/// @ai:intent Show or update persisted configuration values
/// @ai:effects fs:write
fn edit_config(path: Option<PathBuf>, action: ConfigAction) -> Result<ExitCode> {
    let mut config = SeepeeConfig::load_or_default(path.as_deref())?;
    let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    match action {
        ConfigAction::Show => {
            print!("{}", toml::to_string_pretty(&config)?);
            return Ok(ExitCode::SUCCESS);
        }
        ConfigAction::Compiler { command } => config.update_compiler(&command, &path)?,
        ConfigAction::Flags { flags } => config.update_compiler_flags(flags, &path)?,
        ConfigAction::Template { path: template } => config.update_template(template, &path)?,
        ConfigAction::TemplatesDir { path: dir } => config.update_templates_dir(dir, &path)?,
    }

    println!("Configuration saved to {}", path.display());
    Ok(ExitCode::SUCCESS)
}

/// @ai:effects io
fn doctor(config: &SeepeeConfig) -> Result<ExitCode> {
    let status = ToolchainValidator::validate(&config.toolchain);

    if status.available {
        println!(
            "Compiler '{}' found: {}",
            status.compiler,
            status.version.as_deref().unwrap_or("unknown version")
        );
        Ok(ExitCode::SUCCESS)
    } else {
        ToolchainValidator::log_warnings(&status);
        println!("Compiler '{}' not found. {}", status.compiler, status.install_hint);
        Ok(ExitCode::FAILURE)
    }
}
