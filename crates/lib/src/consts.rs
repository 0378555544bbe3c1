//! Constants shared across the crate.

/// Configuration file looked up at the repository root.
pub const CONFIG_FILENAME: &str = "stagepack.toml";

/// Environment variable that turns the whole packaging run into a no-op.
pub const SKIP_PACKAGING_ENV: &str = "STAGEPACK_SKIP_PACKAGING";

/// Environment variable overriding the build configuration.
pub const CONFIGURATION_ENV: &str = "STAGEPACK_CONFIGURATION";

/// Token replaced with the version string in the badge template.
pub const VERSION_BADGE_TOKEN: &str = "ver_number";

pub const DEFAULT_CONFIGURATION: &str = "Debug";

pub const DEFAULT_TFM: &str = "dnxcore50";

pub const DEFAULT_ARCHIVE_PREFIX: &str = "dotnet-dev";

/// Width the commit count is zero-padded to in version strings.
pub const COMMIT_COUNT_WIDTH: usize = 6;

/// Library projects packed by default.
pub const DEFAULT_PROJECTS: &[&str] = &[
  // TODO(dotnet/cli#3558): restore "dotnet-compile-fsc" once it packs without a rebuild.
  "Microsoft.DotNet.Cli.Utils",
  "Microsoft.DotNet.Compiler.Common",
  "Microsoft.DotNet.Files",
  "Microsoft.DotNet.InternalAbstractions",
  "Microsoft.DotNet.ProjectModel",
  "Microsoft.DotNet.ProjectModel.Loader",
  "Microsoft.DotNet.ProjectModel.Workspaces",
  "Microsoft.Extensions.DependencyModel",
  "Microsoft.Extensions.Testing.Abstractions",
];

/// File names that must keep their execute bits after the permission fix-up.
pub const DEFAULT_LAUNCHERS: &[&str] = &["dotnet"];
