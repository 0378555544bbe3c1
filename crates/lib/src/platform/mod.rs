pub mod arch;
pub mod os;
pub mod paths;
pub mod permissions;

use arch::Arch;
use os::Os;
use std::fmt;

/// Platform a packaging run targets, combining OS and architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
  pub arch: Arch,
  pub os: Os,
}

impl Platform {
  pub fn new(arch: Arch, os: Os) -> Self {
    Self { arch, os }
  }

  /// Detect the current platform at runtime
  ///
  /// Returns `None` if the OS or architecture is not supported
  pub fn current() -> Option<Self> {
    Some(Self {
      arch: Arch::current()?,
      os: Os::current()?,
    })
  }

  /// Returns the runtime identifier (e.g., "linux-x64", "win-arm64")
  pub fn rid(&self) -> String {
    format!("{}-{}", self.os.rid_prefix(), self.arch)
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.rid())
  }
}

/// Returns the runtime identifier for the current system
///
/// Returns `None` if the current platform is not supported
pub fn current_rid() -> Option<String> {
  Platform::current().map(|p| p.rid())
}
