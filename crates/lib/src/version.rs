//! Build version descriptor and the version strings derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::consts::COMMIT_COUNT_WIDTH;

/// Version of the build being packaged.
///
/// Computed once before the pipeline starts and stored in the build context;
/// every target that needs a version string derives it from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BuildVersion {
  pub major: u32,
  pub minor: u32,
  pub patch: u32,
  pub commit_count: u32,
  /// Pre-release label such as `preview2`. Empty for a stable release.
  pub release_suffix: String,
}

impl Default for BuildVersion {
  fn default() -> Self {
    Self {
      major: 1,
      minor: 0,
      patch: 0,
      commit_count: 0,
      release_suffix: String::new(),
    }
  }
}

impl BuildVersion {
  /// Commit count zero-padded to six digits, e.g. `003102`.
  pub fn commit_count_string(&self) -> String {
    format!("{:0width$}", self.commit_count, width = COMMIT_COUNT_WIDTH)
  }

  /// Suffix appended to package versions, e.g. `preview2-003102`.
  pub fn version_suffix(&self) -> String {
    if self.release_suffix.is_empty() {
      self.commit_count_string()
    } else {
      format!("{}-{}", self.release_suffix, self.commit_count_string())
    }
  }

  /// Four-part numeric version, e.g. `1.0.0.003102`.
  pub fn simple_version(&self) -> String {
    format!(
      "{}.{}.{}.{}",
      self.major,
      self.minor,
      self.patch,
      self.commit_count_string()
    )
  }

  /// Semver-style package version, e.g. `1.0.0-preview2-003102`.
  pub fn nuget_version(&self) -> String {
    format!("{}.{}.{}-{}", self.major, self.minor, self.patch, self.version_suffix())
  }

  /// Three-part installer version.
  ///
  /// Installer versions only have 32 bits: 6 bits each for major, minor and
  /// patch, and 14 bits for the commit count. The packed value is split back
  /// out as `8.8.16` bits. Components that do not fit are truncated to their
  /// low bits, with a warning.
  pub fn msi_version(&self) -> String {
    if self.major > 0x3f || self.minor > 0x3f || self.patch > 0x3f || self.commit_count > 0x3fff {
      warn!(
        version = %self.simple_version(),
        "version components do not fit the installer version fields and are truncated"
      );
    }

    let packed: u32 = ((self.major & 0x3f) << 26)
      | ((self.minor & 0x3f) << 20)
      | ((self.patch & 0x3f) << 14)
      | (self.commit_count & 0x3fff);

    let msi_major = (packed >> 24) & 0xff;
    let msi_minor = (packed >> 16) & 0xff;
    let msi_build = packed & 0xffff;
    format!("{}.{}.{}", msi_major, msi_minor, msi_build)
  }
}

impl fmt::Display for BuildVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.nuget_version())
  }
}
