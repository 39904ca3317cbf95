// SPDX-License-Identifier: MPL-2.0
//! Centralized path management for application directories.
//!
//! This module provides a single source of truth for application data paths,
//! ensuring consistent directory usage across all components.
//!
//! # Path Resolution Order
//!
//! Paths are resolved in the following priority order:
//! 1. **Explicit override** - parameter to `_with_override()` functions (for tests)
//! 2. **CLI arguments** (`--data-dir`, `--config-dir`, `--host-store`) - set via
//!    [`init_cli_overrides`]
//! 3. **Environment variables** (`EASEL_DATA_DIR`, `EASEL_CONFIG_DIR`,
//!    `EASEL_HOST_STORE_DIR`)
//! 4. **Platform default** - via `dirs` crate (the host store has none)
//!
//! # Usage
//!
//! CLI overrides should be initialized once at startup:
//! ```ignore
//! paths::init_cli_overrides(CliOverrides { data_dir, config_dir, host_store_dir });
//! ```

use std::path::PathBuf;
use std::sync::OnceLock;

/// Application name used for directory naming.
const APP_NAME: &str = "Easel";

/// Environment variable to override the data directory.
pub const ENV_DATA_DIR: &str = "EASEL_DATA_DIR";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "EASEL_CONFIG_DIR";

/// Environment variable naming the directory of the embedding host's store.
pub const ENV_HOST_STORE_DIR: &str = "EASEL_HOST_STORE_DIR";

/// Directory overrides given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOverrides {
    pub data_dir: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,
    pub host_store_dir: Option<PathBuf>,
}

/// Global CLI overrides (set once at startup).
static CLI_OVERRIDES: OnceLock<CliOverrides> = OnceLock::new();

/// Initializes CLI overrides for the application directories.
///
/// Only the first call takes effect; later calls are ignored with a warning.
pub fn init_cli_overrides(overrides: CliOverrides) {
    if CLI_OVERRIDES.set(overrides).is_err() {
        tracing::warn!("CLI path overrides already initialized");
    }
}

fn cli_override(pick: impl Fn(&CliOverrides) -> Option<PathBuf>) -> Option<PathBuf> {
    CLI_OVERRIDES.get().and_then(pick)
}

fn env_override(var: &str) -> Option<PathBuf> {
    std::env::var(var)
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Returns the application data directory path.
///
/// This directory holds the local persistence store. User preferences are
/// stored separately in the config directory via `config::load/save`.
///
/// Platform defaults:
/// - Linux: `~/.local/share/Easel/`
/// - macOS: `~/Library/Application Support/Easel/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\Easel\`
///
/// Returns `None` if the data directory cannot be determined (rare edge case).
pub fn get_app_data_dir() -> Option<PathBuf> {
    get_app_data_dir_with_override(None)
}

/// Returns the application data directory path with an optional override.
pub fn get_app_data_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    override_path
        .or_else(|| cli_override(|o| o.data_dir.clone()))
        .or_else(|| env_override(ENV_DATA_DIR))
        .or_else(|| {
            dirs::data_dir().map(|mut path| {
                path.push(APP_NAME);
                path
            })
        })
}

/// Returns the application config directory path.
///
/// This directory is used for storing user preferences (settings.toml).
pub fn get_app_config_dir() -> Option<PathBuf> {
    get_app_config_dir_with_override(None)
}

/// Returns the application config directory path with an optional override.
pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    override_path
        .or_else(|| cli_override(|o| o.config_dir.clone()))
        .or_else(|| env_override(ENV_CONFIG_DIR))
        .or_else(|| {
            dirs::config_dir().map(|mut path| {
                path.push(APP_NAME);
                path
            })
        })
}

/// Returns the directory of the privileged host store, if an embedding host
/// provides one. There is no platform default.
pub fn get_host_store_dir() -> Option<PathBuf> {
    cli_override(|o| o.host_store_dir.clone()).or_else(|| env_override(ENV_HOST_STORE_DIR))
}

/// Returns the directory downloads are written to.
///
/// Resolution: `configured` (from `[export] output_dir`), the platform
/// downloads directory, then a `downloads` folder in the data directory,
/// then the working directory.
pub fn get_downloads_dir(configured: Option<PathBuf>) -> PathBuf {
    configured
        .or_else(dirs::download_dir)
        .or_else(|| get_app_data_dir().map(|dir| dir.join("downloads")))
        .unwrap_or_else(|| PathBuf::from("."))
}
