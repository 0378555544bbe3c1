//! Fixed keys under which targets publish values into the build context.

pub const BUILD_VERSION: &str = "build.version";
pub const CONFIGURATION: &str = "build.configuration";

pub const SDK_ROOT: &str = "layout.sdk";
pub const SHARED_HOST_ROOT: &str = "layout.shared_host";
pub const HOST_FXR_ROOT: &str = "layout.host_fxr";
pub const SHARED_FRAMEWORK_ROOT: &str = "layout.shared_framework";
pub const COMBINED_HOST_ROOT: &str = "layout.combined_framework_sdk_host";
pub const COMBINED_NO_HOST_ROOT: &str = "layout.combined_framework_sdk";

pub const VERSION_BADGE: &str = "artifact.version_badge";
pub const COMBINED_HOST_ARCHIVE: &str = "artifact.combined_framework_sdk_host";
pub const COMBINED_NO_HOST_ARCHIVE: &str = "artifact.combined_framework_sdk";
pub const SDK_SYMBOLS_ARCHIVE: &str = "artifact.sdk_symbols";
