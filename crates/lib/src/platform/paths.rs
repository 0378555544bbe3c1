//! Directory map for a packaging run.
//!
//! Every path the pipeline reads from or writes to hangs off the repository
//! root and the runtime identifier, mirroring the upstream build layout:
//!
//! ```text
//! <repo>/artifacts/<rid>/
//!   stage1/  stage1compilation/
//!   stage2/  stage2compilation/  stage2.symbols/
//!   obj/     packages/           tests/packages/
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dirs {
  pub repo_root: PathBuf,
  pub output: PathBuf,
  pub stage1: PathBuf,
  pub stage1_compilation: PathBuf,
  pub stage2: PathBuf,
  pub stage2_compilation: PathBuf,
  pub stage2_symbols: PathBuf,
  pub intermediate: PathBuf,
  pub packages: PathBuf,
  pub test_output: PathBuf,
  pub test_packages: PathBuf,
}

impl Dirs {
  /// Derive the directory map from the repo root and runtime identifier.
  pub fn new(repo_root: &Path, rid: &str) -> Self {
    let output = repo_root.join("artifacts").join(rid);
    Self::with_output(repo_root, &output)
  }

  /// Derive the directory map around an explicit output directory.
  pub fn with_output(repo_root: &Path, output: &Path) -> Self {
    let test_output = output.join("tests");
    Self {
      repo_root: repo_root.to_path_buf(),
      output: output.to_path_buf(),
      stage1: output.join("stage1"),
      stage1_compilation: output.join("stage1compilation"),
      stage2: output.join("stage2"),
      stage2_compilation: output.join("stage2compilation"),
      stage2_symbols: output.join("stage2.symbols"),
      intermediate: output.join("obj"),
      packages: output.join("packages"),
      test_packages: test_output.join("packages"),
      test_output,
    }
  }

  /// Template the version badge is stamped from.
  pub fn version_badge_template(&self) -> PathBuf {
    self
      .repo_root
      .join("resources")
      .join("images")
      .join("version_badge.svg")
  }

  /// Project file for a library project under `src/`.
  pub fn project_file(&self, project: &str) -> PathBuf {
    self.repo_root.join("src").join(project).join("project.json")
  }

  /// Shared intermediate path handed to the packaging tool.
  pub fn packaging_build_base(&self) -> PathBuf {
    self.stage2_compilation.join("forPackaging")
  }
}
