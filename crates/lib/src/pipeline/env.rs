//! Environment variable table handed to collaborator processes.
//!
//! Installer scripts and the packaging tool read build metadata from the
//! environment. Several values appear under two names because older scripts
//! still read the legacy spelling.

use std::collections::BTreeMap;
use std::path::Path;

use crate::context::{BuildContext, ContextError, keys};
use crate::version::BuildVersion;

use super::PipelineSettings;

/// Build the environment table from the context and run settings.
///
/// Requires the build version and configuration to be in the context.
pub fn common_env_vars(
  ctx: &BuildContext,
  settings: &PipelineSettings,
) -> Result<BTreeMap<String, String>, ContextError> {
  let version: &BuildVersion = ctx.get(keys::BUILD_VERSION)?;
  let configuration: &String = ctx.get(keys::CONFIGURATION)?;
  let dirs = &settings.dirs;
  let path = |p: &Path| p.to_string_lossy().to_string();

  let entries = [
    ("RID", settings.platform.rid()),
    ("OSNAME", settings.platform.os.as_str().to_string()),
    ("TFM", settings.config.tfm.clone()),
    ("REPOROOT", path(&dirs.repo_root)),
    ("OutputDir", path(&dirs.output)),
    ("Stage1Dir", path(&dirs.stage1)),
    ("Stage1CompilationDir", path(&dirs.stage1_compilation)),
    ("Stage2Dir", path(&dirs.stage2)),
    ("STAGE2_DIR", path(&dirs.stage2)),
    ("Stage2CompilationDir", path(&dirs.stage2_compilation)),
    ("PackageDir", path(&dirs.packages)),
    ("TestBinRoot", path(&dirs.test_output)),
    ("TestPackageDir", path(&dirs.test_packages)),
    ("MajorVersion", version.major.to_string()),
    ("MinorVersion", version.minor.to_string()),
    ("PatchVersion", version.patch.to_string()),
    ("CommitCountVersion", version.commit_count_string()),
    ("COMMIT_COUNT_VERSION", version.commit_count_string()),
    ("DOTNET_CLI_VERSION", version.simple_version()),
    ("DOTNET_MSI_VERSION", version.msi_version()),
    ("VersionSuffix", version.version_suffix()),
    ("CONFIGURATION", configuration.clone()),
    ("ARCHITECTURE", settings.platform.arch.as_str().to_string()),
  ];

  Ok(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}
