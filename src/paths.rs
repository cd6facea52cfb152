//! Common paths for irecommend data storage
//!
//! All data is stored under ~/.config/irecommend/ on all platforms:
//! - config.toml - User configuration
//! - store.enc - Encrypted key-value store (session token, theme mode)

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

/// Get the data directory (~/.config/irecommend/)
///
/// This is consistent across all platforms for simplicity.
pub fn data_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    let dir = home.join(".config").join("irecommend");
    fs::create_dir_all(&dir).context("Failed to create irecommend directory")?;
    Ok(dir)
}

/// Get the config file path (~/.config/irecommend/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("config.toml"))
}

/// Get the encrypted store path (~/.config/irecommend/store.enc)
pub fn store_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("store.enc"))
}
