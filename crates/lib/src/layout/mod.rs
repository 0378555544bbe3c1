//! Layout directory operations.
//!
//! A layout root is a directory tree holding one packaging component. Layouts
//! are rebuilt from scratch on every run: the destination is deleted,
//! recreated and then filled from its source. Combined layouts are several
//! roots copied into one destination in order, so a path present in more
//! than one root ends up with the content of the last root copied.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum LayoutError {
  #[error("source directory does not exist: {0}")]
  MissingSource(PathBuf),

  #[error("{action} {path}: {source}")]
  Io {
    action: &'static str,
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to traverse directory {path}: {source}")]
  WalkDir {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },
}

fn io_err<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(std::io::Error) -> LayoutError + 'a {
  move |source| LayoutError::Io {
    action,
    path: path.to_path_buf(),
    source,
  }
}

/// Delete `dir` if it exists, then recreate it empty.
pub fn reset_dir(dir: &Path) -> Result<(), LayoutError> {
  if dir.exists() {
    debug!(path = ?dir, "removing existing directory");
    fs::remove_dir_all(dir).map_err(io_err("failed to remove", dir))?;
  }
  fs::create_dir_all(dir).map_err(io_err("failed to create", dir))
}

/// Recursively copy the contents of `src` into `dst`.
///
/// `dst` is created if needed. Files already present in `dst` are
/// overwritten.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<(), LayoutError> {
  if !src.is_dir() {
    return Err(LayoutError::MissingSource(src.to_path_buf()));
  }

  debug!(from = ?src, to = ?dst, "copying directory");

  for entry in WalkDir::new(src) {
    let entry = entry.map_err(|e| LayoutError::WalkDir {
      path: src.to_path_buf(),
      source: e,
    })?;

    let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
    let target = dst.join(rel);
    let file_type = entry.file_type();

    if file_type.is_dir() {
      make_room(&target, true)?;
      fs::create_dir_all(&target).map_err(io_err("failed to create", &target))?;
    } else if file_type.is_symlink() {
      make_room(&target, false)?;
      copy_symlink(entry.path(), &target)?;
    } else {
      make_room(&target, false)?;
      fs::copy(entry.path(), &target).map_err(io_err("failed to copy to", &target))?;
    }
  }

  Ok(())
}

/// Clear whatever an earlier root left at `target` so the new entry replaces
/// it instead of being written through it.
///
/// Symlinks are always removed, never followed. A real directory stays when a
/// directory is wanted; a regular file stays when a file is wanted, since
/// `fs::copy` truncates it in place.
fn make_room(target: &Path, for_dir: bool) -> Result<(), LayoutError> {
  let Ok(metadata) = target.symlink_metadata() else {
    return Ok(());
  };

  let file_type = metadata.file_type();
  if file_type.is_dir() {
    if !for_dir {
      debug!(path = ?target, "replacing directory with file");
      fs::remove_dir_all(target).map_err(io_err("failed to remove", target))?;
    }
  } else if file_type.is_symlink() || for_dir {
    debug!(path = ?target, "replacing existing entry");
    fs::remove_file(target).map_err(io_err("failed to remove", target))?;
  }
  Ok(())
}

/// Copy only the regular files directly inside `src` into `dst`.
pub fn copy_top_level_files(src: &Path, dst: &Path) -> Result<(), LayoutError> {
  if !src.is_dir() {
    return Err(LayoutError::MissingSource(src.to_path_buf()));
  }

  fs::create_dir_all(dst).map_err(io_err("failed to create", dst))?;

  for entry in fs::read_dir(src).map_err(io_err("failed to read", src))? {
    let entry = entry.map_err(io_err("failed to read", src))?;
    let path = entry.path();
    if path.is_file() {
      let target = dst.join(entry.file_name());
      fs::copy(&path, &target).map_err(io_err("failed to copy to", &target))?;
    }
  }

  Ok(())
}

/// Rebuild `dst` as the union of `roots`, copied in order.
pub fn compose(roots: &[&Path], dst: &Path) -> Result<(), LayoutError> {
  reset_dir(dst)?;
  for root in roots {
    copy_dir_recursive(root, dst)?;
  }
  Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<(), LayoutError> {
  let link = fs::read_link(src).map_err(io_err("failed to read link", src))?;
  std::os::unix::fs::symlink(&link, dst).map_err(io_err("failed to link", dst))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<(), LayoutError> {
  fs::copy(src, dst).map(|_| ()).map_err(io_err("failed to copy to", dst))
}
