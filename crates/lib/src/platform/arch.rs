use std::fmt;

/// CPU architecture variants a packaging run can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
  X64,
  Arm64,
}

impl Arch {
  /// Detect the current CPU architecture at runtime
  pub fn current() -> Option<Self> {
    match std::env::consts::ARCH {
      "x86_64" => Some(Self::X64),
      "aarch64" => Some(Self::Arm64),
      _ => None,
    }
  }

  /// Returns the architecture name used in runtime identifiers
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::X64 => "x64",
      Self::Arm64 => "arm64",
    }
  }
}

impl fmt::Display for Arch {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}
