use std::fmt;

/// Operating system variants a packaging run can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Os {
  Linux,
  MacOs,
  Windows,
}

impl Os {
  /// Detect the current operating system at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::OS {
      "linux" => Some(Self::Linux),
      "macos" => Some(Self::MacOs),
      "windows" => Some(Self::Windows),
      _ => None,
    }
  }

  /// Returns the lowercase OS name exported to collaborator scripts
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "osx",
      Self::Windows => "windows",
    }
  }

  /// Returns the OS component of a runtime identifier
  pub fn rid_prefix(&self) -> &'static str {
    match self {
      Self::Linux => "linux",
      Self::MacOs => "osx",
      Self::Windows => "win",
    }
  }

  pub fn is_windows(&self) -> bool {
    matches!(self, Self::Windows)
  }

  /// Suffix for native executables (`.exe` on Windows, empty elsewhere)
  pub fn exe_suffix(&self) -> &'static str {
    if self.is_windows() { ".exe" } else { "" }
  }
}

impl fmt::Display for Os {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
