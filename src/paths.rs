//! XDG-style path utilities for the configuration directory.
//!
//! Prefers XDG Base Directory conventions over OS-specific locations.

use std::path::PathBuf;

/// Returns the configuration directory for lerner.
///
/// Resolution order:
/// 1. `$XDG_CONFIG_HOME/lerner` if `XDG_CONFIG_HOME` is set
/// 2. `~/.config/lerner` otherwise
///
/// Returns `None` when neither is available.
pub fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .filter(|xdg| !xdg.is_empty())
        .map(|xdg| PathBuf::from(xdg).join("lerner"))
        .or_else(|| dirs::home_dir().map(|home| home.join(".config").join("lerner")))
}
