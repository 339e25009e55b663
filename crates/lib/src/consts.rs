//! Default names and identifiers.

/// Configuration document looked up when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "repository.yaml";

/// Staging directory for downloads, relative to the configuration document.
pub const DEFAULT_STAGING_DIR: &str = "downloads";

/// Builder output directory, relative to the configuration document.
pub const DEFAULT_OUTPUT_DIR: &str = "repo";

/// Repository builder executable looked up on `PATH`.
pub const DEFAULT_BUILDER: &str = "debrepo";

/// User agent sent with every HTTP request.
pub const USER_AGENT: &str = concat!("debsync/", env!("CARGO_PKG_VERSION"));
