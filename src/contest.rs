//! @ai:module:intent Contest directory scaffolding and per-problem file access
//! @ai:module:layer infrastructure
//! @ai:module:public_api ContestWorkspace, ContestWorkspaceTrait, ProblemPaths
//! @ai:module:stateless true

use crate::config::SeepeeConfig;
use crate::error::{Error, Result};
use crate::template::{CommandResolver, FileKind};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// @ai:intent Resolved paths of one problem's files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemPaths {
    pub source: PathBuf,
    pub input: PathBuf,
    pub expected: PathBuf,
}

/// @ai:intent Filesystem interface the pipeline's callers rely on
pub trait ContestWorkspaceTrait {
    /// @ai:intent Resolve source, input and expected-output paths for a problem
    fn problem_paths(&self, contest_dir: &Path, problem: &str) -> Result<ProblemPaths>;

    /// @ai:intent Replace the problem's input file
    fn write_input(&self, contest_dir: &Path, problem: &str, content: &str) -> Result<PathBuf>;

    /// @ai:intent Replace the problem's expected-output file
    fn write_output(&self, contest_dir: &Path, problem: &str, content: &str) -> Result<PathBuf>;

    /// @ai:intent Read the problem's expected output
    fn read_expected(&self, contest_dir: &Path, problem: &str) -> Result<String>;
}

/// @ai:intent Contest workspace rooted at the configured workspace path
pub struct ContestWorkspace<'a> {
    config: &'a SeepeeConfig,
}

impl<'a> ContestWorkspace<'a> {
    /// @ai:effects pure
    pub fn new(config: &'a SeepeeConfig) -> Self {
        Self { config }
    }

    fn resolver(&self) -> CommandResolver<'a> {
        CommandResolver::new(&self.config.toolchain)
    }

    /// @ai:intent Directory of a contest inside the workspace
    /// @ai:post the returned path is a direct child of the workspace
    /// @ai:effects pure
    pub fn contest_dir(&self, contest: &str) -> Result<PathBuf> {
        if !is_plain_name(contest) {
            return Err(Error::InvalidContest(contest.to_string()));
        }
        Ok(self.config.paths.workspace.join(contest))
    }

    /// @ai:intent Create the contest directory if needed
    /// @ai:effects fs:write
    pub fn create_contest_dir(&self, contest: &str) -> Result<PathBuf> {
        let dir = self.contest_dir(contest)?;
        std::fs::create_dir_all(&dir)?;
        tracing::debug!("Contest directory ready: {}", dir.display());
        Ok(dir)
    }

    /// @ai:intent Seed each problem with the solution template and an empty input file
    /// @ai:post existing files are left untouched
    /// @ai:effects fs:write
    pub fn create_problem_files(&self, contest_dir: &Path, problems: &[String]) -> Result<Vec<ProblemPaths>> {
        let template = &self.config.paths.template;
        let template_exists = template.is_file();

        if !template_exists {
            tracing::warn!(
                "Template {} not found, creating empty source files",
                template.display()
            );
        }

        let mut created = Vec::with_capacity(problems.len());

        for problem in problems {
            let paths = self.problem_paths(contest_dir, problem)?;

            if !paths.source.exists() {
                if template_exists {
                    std::fs::copy(template, &paths.source)?;
                } else {
                    std::fs::File::create(&paths.source)?;
                }
                tracing::info!("Created {}", paths.source.display());
            }
            if !paths.input.exists() {
                std::fs::File::create(&paths.input)?;
            }

            created.push(paths);
        }

        Ok(created)
    }

    /// @ai:intent List problem letters whose source file exists, sorted
    /// @ai:effects fs:read
    pub fn list_problems(&self, contest_dir: &Path) -> Result<Vec<String>> {
        if !contest_dir.is_dir() {
            return Err(Error::MissingFile {
                path: contest_dir.to_path_buf(),
            });
        }

        let pattern = &self.config.toolchain.file_naming.problem;
        crate::template::check_naming_template(pattern)?;
        let (prefix, suffix) = pattern.split_once("{}").unwrap_or((pattern.as_str(), ""));

        let mut problems: Vec<String> = WalkDir::new(contest_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let name = e.file_name().to_str()?;
                let letter = name.strip_prefix(prefix)?.strip_suffix(suffix)?;
                (!letter.is_empty()).then(|| letter.to_string())
            })
            .collect();

        problems.sort();
        Ok(problems)
    }
}

/// @ai:intent A single path component that cannot escape its parent directory
/// @ai:effects pure
fn is_plain_name(name: &str) -> bool {
    !(name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']))
}

impl ContestWorkspaceTrait for ContestWorkspace<'_> {
    fn problem_paths(&self, contest_dir: &Path, problem: &str) -> Result<ProblemPaths> {
        if !is_plain_name(problem) {
            return Err(Error::InvalidProblem(problem.to_string()));
        }
        let resolver = self.resolver();

        Ok(ProblemPaths {
            source: contest_dir.join(resolver.file_name(FileKind::Source, problem)?),
            input: contest_dir.join(resolver.file_name(FileKind::Input, problem)?),
            expected: contest_dir.join(resolver.file_name(FileKind::ExpectedOutput, problem)?),
        })
    }

    fn write_input(&self, contest_dir: &Path, problem: &str, content: &str) -> Result<PathBuf> {
        let path = self.problem_paths(contest_dir, problem)?.input;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    fn write_output(&self, contest_dir: &Path, problem: &str, content: &str) -> Result<PathBuf> {
        let path = self.problem_paths(contest_dir, problem)?.expected;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    fn read_expected(&self, contest_dir: &Path, problem: &str) -> Result<String> {
        let path = self.problem_paths(contest_dir, problem)?.expected;

        if !path.is_file() {
            return Err(Error::MissingFile { path });
        }
        Ok(std::fs::read_to_string(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn config_in(temp: &TempDir) -> SeepeeConfig {
        let mut config = SeepeeConfig::default();
        config.paths.workspace = temp.path().to_path_buf();
        config.paths.template = temp.path().join("template.cpp");
        config
    }

    #[test]
    fn test_create_contest_dir_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let workspace = ContestWorkspace::new(&config);

        let dir = workspace.create_contest_dir("1850").unwrap();
        assert_eq!(dir, temp.path().join("1850"));
        assert!(dir.is_dir());
        assert_eq!(workspace.create_contest_dir("1850").unwrap(), dir);
    }

    #[test]
    fn test_create_problem_files_copies_template() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        std::fs::write(&config.paths.template, "// template\n").unwrap();
        let workspace = ContestWorkspace::new(&config);
        let dir = workspace.create_contest_dir("1850").unwrap();

        let problems = vec!["A".to_string(), "B".to_string()];
        let created = workspace.create_problem_files(&dir, &problems).unwrap();

        assert_eq!(created.len(), 2);
        assert_eq!(
            std::fs::read_to_string(dir.join("A.cpp")).unwrap(),
            "// template\n"
        );
        assert_eq!(std::fs::read_to_string(dir.join("B.in")).unwrap(), "");
    }

    #[test]
    fn test_create_problem_files_keeps_existing_source() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        std::fs::write(&config.paths.template, "// template\n").unwrap();
        let workspace = ContestWorkspace::new(&config);
        let dir = workspace.create_contest_dir("1850").unwrap();
        std::fs::write(dir.join("A.cpp"), "// my solution\n").unwrap();

        workspace
            .create_problem_files(&dir, &["A".to_string()])
            .unwrap();
        assert_eq!(
            std::fs::read_to_string(dir.join("A.cpp")).unwrap(),
            "// my solution\n"
        );
    }

    #[test]
    fn test_missing_template_creates_empty_source() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let workspace = ContestWorkspace::new(&config);
        let dir = workspace.create_contest_dir("1").unwrap();

        workspace
            .create_problem_files(&dir, &["A".to_string()])
            .unwrap();
        assert_eq!(std::fs::read_to_string(dir.join("A.cpp")).unwrap(), "");
    }

    #[test]
    fn test_problem_paths_follow_naming_templates() {
        let temp = TempDir::new().unwrap();
        let mut config = config_in(&temp);
        config.toolchain.file_naming.problem = "problem_{}.cpp".to_string();
        let workspace = ContestWorkspace::new(&config);
        let dir = temp.path().join("1850");

        let paths = workspace.problem_paths(&dir, "C").unwrap();
        assert_eq!(
            paths,
            ProblemPaths {
                source: dir.join("problem_C.cpp"),
                input: dir.join("C.in"),
                expected: dir.join("C.out"),
            }
        );
    }

    #[test]
    fn test_write_and_read_expected_output() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let workspace = ContestWorkspace::new(&config);
        let dir = workspace.create_contest_dir("1850").unwrap();

        assert!(matches!(
            workspace.read_expected(&dir, "A"),
            Err(Error::MissingFile { .. })
        ));

        workspace.write_input(&dir, "A", "2\n3\n5\n").unwrap();
        workspace.write_output(&dir, "A", "10\n").unwrap();

        assert_eq!(std::fs::read_to_string(dir.join("A.in")).unwrap(), "2\n3\n5\n");
        assert_eq!(workspace.read_expected(&dir, "A").unwrap(), "10\n");
    }

    #[test]
    fn test_list_problems_matches_source_pattern() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let workspace = ContestWorkspace::new(&config);
        let dir = workspace.create_contest_dir("1850").unwrap();

        for name in ["C.cpp", "A.cpp", "A.in", "notes.txt", "B1.cpp"] {
            std::fs::write(dir.join(name), "").unwrap();
        }

        assert_eq!(
            workspace.list_problems(&dir).unwrap(),
            vec!["A".to_string(), "B1".to_string(), "C".to_string()]
        );
    }

    #[test]
    fn test_rejects_path_like_problem_names() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let workspace = ContestWorkspace::new(&config);

        for bad in ["", "..", "../A", "a/b"] {
            assert!(matches!(
                workspace.problem_paths(temp.path(), bad),
                Err(Error::InvalidProblem(_))
            ));
        }
    }

    #[test]
    fn test_rejects_path_like_contest_names() {
        let temp = TempDir::new().unwrap();
        let config = config_in(&temp);
        let workspace = ContestWorkspace::new(&config);

        for bad in ["", ".", "..", "../x", "a/b", "a\\b"] {
            assert!(matches!(
                workspace.contest_dir(bad),
                Err(Error::InvalidContest(ref name)) if name == bad
            ));
            assert!(matches!(
                workspace.create_contest_dir(bad),
                Err(Error::InvalidContest(_))
            ));
        }
        assert_eq!(workspace.contest_dir("1850").unwrap(), temp.path().join("1850"));
    }
}
