//! Archive creation for combined layouts and symbol directories.
//!
//! The archive format is picked once from the host OS:
//!
//! - **Windows**: `.zip`, written in-process with deflate at the best
//!   compression level. Entries are relative to the archived directory, with
//!   no wrapping top-level folder.
//! - **Unix**: `.tar.gz`, produced by the external `tar -czf <out> -C <dir> .`
//!   so ownership and modes follow the host's tar conventions.
//!
//! An existing artifact at the output path is deleted before writing.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::execute::{CommandRunner, ExecuteError, Invocation};
use crate::platform::os::Os;

/// Deflate level used for zip entries.
const ZIP_COMPRESSION_LEVEL: i64 = 9;

#[derive(Debug, Error)]
pub enum ArchiveError {
  #[error("directory to archive does not exist: {0}")]
  MissingSource(PathBuf),

  #[error("{action} {path}: {source}")]
  Io {
    action: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to traverse directory {path}: {source}")]
  WalkDir {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
  },

  #[error("zip error: {0}")]
  Zip(#[from] zip::result::ZipError),

  #[error("archiver failed: {0}")]
  Execute(#[from] ExecuteError),
}

fn io_err<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> ArchiveError + 'a {
  move |source| ArchiveError::Io {
    action,
    path: path.to_path_buf(),
    source,
  }
}

/// Archive format for the host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Archiver {
  Zip,
  TarGz,
}

impl Archiver {
  /// Select the archiver for the host OS.
  pub fn for_os(os: Os) -> Self {
    if os.is_windows() { Self::Zip } else { Self::TarGz }
  }

  /// File extension of produced artifacts, including the leading dot.
  pub fn extension(&self) -> &'static str {
    match self {
      Self::Zip => ".zip",
      Self::TarGz => ".tar.gz",
    }
  }

  /// Archive the contents of `dir` into `artifact`.
  pub async fn archive<R: CommandRunner>(&self, dir: &Path, artifact: &Path, runner: &R) -> Result<(), ArchiveError> {
    if !dir.is_dir() {
      return Err(ArchiveError::MissingSource(dir.to_path_buf()));
    }

    prepare_artifact_path(artifact)?;

    info!(dir = ?dir, artifact = ?artifact, format = ?self, "creating archive");

    match self {
      Self::Zip => create_zip(dir, artifact),
      Self::TarGz => {
        runner.run(&tar_invocation(dir, artifact)).await?;
        Ok(())
      }
    }
  }
}

/// Delete a stale artifact and make sure its parent directory exists.
fn prepare_artifact_path(artifact: &Path) -> Result<(), ArchiveError> {
  if artifact.exists() {
    debug!(path = ?artifact, "removing existing artifact");
    fs::remove_file(artifact).map_err(io_err("failed to remove", artifact))?;
  }
  if let Some(parent) = artifact.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent).map_err(io_err("failed to create", parent))?;
  }
  Ok(())
}

/// The external archiver call for a gzip-compressed tarball.
pub fn tar_invocation(dir: &Path, artifact: &Path) -> Invocation {
  Invocation::new("tar")
    .arg("-czf")
    .path_arg(artifact)
    .arg("-C")
    .path_arg(dir)
    .arg(".")
}

/// Write every entry below `dir` into a new zip file at `artifact`.
pub fn create_zip(dir: &Path, artifact: &Path) -> Result<(), ArchiveError> {
  let file = File::create(artifact).map_err(io_err("failed to create", artifact))?;
  let mut writer = ZipWriter::new(file);

  let base_options = SimpleFileOptions::default()
    .compression_method(CompressionMethod::Deflated)
    .compression_level(Some(ZIP_COMPRESSION_LEVEL));

  for entry in WalkDir::new(dir).sort_by_file_name() {
    let entry = entry.map_err(|e| ArchiveError::WalkDir {
      path: dir.to_path_buf(),
      source: e,
    })?;

    let rel = entry.path().strip_prefix(dir).unwrap_or(entry.path());
    let name = entry_name(rel);

    // Root of the archived directory has no entry of its own
    if name.is_empty() {
      continue;
    }

    let metadata = fs::metadata(entry.path()).map_err(io_err("failed to read metadata for", entry.path()))?;
    let options = with_mode(base_options, &metadata);

    if metadata.is_dir() {
      writer.add_directory(name, options)?;
    } else {
      writer.start_file(name, options.large_file(metadata.len() >= u32::MAX as u64))?;
      let mut source = File::open(entry.path()).map_err(io_err("failed to open", entry.path()))?;
      io::copy(&mut source, &mut writer).map_err(io_err("failed to compress", entry.path()))?;
    }
  }

  writer.finish()?;
  Ok(())
}

/// Zip entry names always use forward slashes.
fn entry_name(rel: &Path) -> String {
  rel
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/")
}

#[cfg(unix)]
fn with_mode(options: SimpleFileOptions, metadata: &fs::Metadata) -> SimpleFileOptions {
  use std::os::unix::fs::PermissionsExt;
  options.unix_permissions(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn with_mode(options: SimpleFileOptions, _metadata: &fs::Metadata) -> SimpleFileOptions {
  options
}
