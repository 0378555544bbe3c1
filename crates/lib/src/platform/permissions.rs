//! Permission fix-up for freshly copied layout directories.
//!
//! Staged build output carries whatever modes the compiler left behind. Before
//! a layout is archived, its modes are normalised so the shipped tree is
//! predictable.
//!
//! ## Platform Behavior
//!
//! - **Unix**: Directories become 0755, regular files 0644, and files that
//!   must stay runnable (native binaries, scripts, shared libraries and named
//!   launchers) 0755
//! - **Windows**: No permission model to fix, so nothing happens

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use super::os::Os;

/// Error during the permission fix-up.
#[derive(Debug, thiserror::Error)]
pub enum PermissionError {
  #[error("failed to set permissions on {path}: {source}")]
  SetPermissions {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to inspect {path}: {source}")]
  Inspect {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to traverse directory {path}: {source}")]
  WalkDir {
    path: String,
    #[source]
    source: walkdir::Error,
  },
}

/// Mode applied to directories and executables.
pub const EXECUTABLE_MODE: u32 = 0o755;

/// Baseline mode for every regular file.
pub const FILE_MODE: u32 = 0o644;

/// How to normalise permissions after a layout copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionFixup {
  /// chmod-based fix-up. `launchers` are file names that always keep their
  /// execute bits.
  Unix { launchers: Vec<String> },
  /// Platforms without a Unix permission model.
  NoOp,
}

impl PermissionFixup {
  /// Select the fix-up for the host OS.
  pub fn for_os(os: Os, launchers: &[String]) -> Self {
    if os.is_windows() {
      Self::NoOp
    } else {
      Self::Unix {
        launchers: launchers.to_vec(),
      }
    }
  }

  /// Normalise permissions of every entry below `root`.
  pub fn apply(&self, root: &Path) -> Result<(), PermissionError> {
    match self {
      Self::NoOp => Ok(()),
      Self::Unix { launchers } => fix_tree(root, launchers),
    }
  }
}

/// Returns true if `path` must remain executable after the fix-up.
pub fn is_executable(path: &Path, launchers: &[String]) -> Result<bool, PermissionError> {
  let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();

  if launchers.iter().any(|l| l.as_str() == &*name) {
    return Ok(true);
  }

  if name.ends_with(".so") || name.contains(".so.") || name.ends_with(".dylib") {
    return Ok(true);
  }

  let mut magic = [0u8; 4];
  let read = File::open(path)
    .and_then(|mut f| f.read(&mut magic))
    .map_err(|e| PermissionError::Inspect {
      path: path.display().to_string(),
      source: e,
    })?;

  Ok(has_executable_magic(&magic[..read]))
}

/// ELF, Mach-O (thin and fat) and `#!` scripts.
fn has_executable_magic(header: &[u8]) -> bool {
  const MAGICS: &[&[u8]] = &[
    b"\x7fELF",
    &[0xfe, 0xed, 0xfa, 0xce],
    &[0xfe, 0xed, 0xfa, 0xcf],
    &[0xce, 0xfa, 0xed, 0xfe],
    &[0xcf, 0xfa, 0xed, 0xfe],
    &[0xca, 0xfe, 0xba, 0xbe],
  ];

  header.starts_with(b"#!") || MAGICS.iter().any(|m| header.starts_with(m))
}

#[cfg(unix)]
fn fix_tree(root: &Path, launchers: &[String]) -> Result<(), PermissionError> {
  use std::os::unix::fs::PermissionsExt;
  use walkdir::WalkDir;

  debug!(path = ?root, "fixing permissions");

  // Pre-order so directories are traversable before their contents
  for entry in WalkDir::new(root) {
    let entry = entry.map_err(|e| PermissionError::WalkDir {
      path: root.display().to_string(),
      source: e,
    })?;

    let file_type = entry.file_type();
    let mode = if file_type.is_dir() {
      EXECUTABLE_MODE
    } else if file_type.is_file() {
      if is_executable(entry.path(), launchers)? {
        EXECUTABLE_MODE
      } else {
        FILE_MODE
      }
    } else {
      // Symlinks point at entries that get fixed on their own
      continue;
    };

    std::fs::set_permissions(entry.path(), std::fs::Permissions::from_mode(mode)).map_err(|e| {
      PermissionError::SetPermissions {
        path: entry.path().display().to_string(),
        source: e,
      }
    })?;
  }

  Ok(())
}

#[cfg(not(unix))]
fn fix_tree(root: &Path, _launchers: &[String]) -> Result<(), PermissionError> {
  debug!(path = ?root, "no unix permission model on this host, skipping fix-up");
  Ok(())
}
