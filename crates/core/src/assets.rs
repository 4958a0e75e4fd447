//! Where flowerstore keeps its files.
//!
//! `$XDG_CONFIG_HOME/flowerstore/flowerstore.yml` holds the configuration. The data
//! directory, `$XDG_DATA_HOME/flowerstore`, holds `flowerstore.log` and the default
//! document database under `db/`.
use once_cell::sync::Lazy;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "flowerstore";
const CONFIG_FILE_NAME: &str = "flowerstore.yml";
const DEFAULT_CONFIG: &str = include_str!("../data/config.yml");

static PLATFORM_DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs::data_local_dir()
        .map(|p| p.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("~/.local/share/flowerstore"))
});

static PLATFORM_CONFIG_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs::config_dir()
        .map(|p| p.join(APP_NAME))
        .unwrap_or_else(|| PathBuf::from("~/.config/flowerstore"))
});

/// `$<var>/flowerstore` when the variable is set, `platform` otherwise.
fn xdg_dir(var: &str, platform: &Path) -> PathBuf {
    match std::env::var_os(var) {
        Some(home) if !home.is_empty() => PathBuf::from(home).join(APP_NAME),
        _ => platform.to_path_buf(),
    }
}

pub fn get_config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", &PLATFORM_CONFIG_DIR)
}

/// Config file used when no `--config` is given.
pub fn default_config_path() -> PathBuf {
    get_config_dir().join(CONFIG_FILE_NAME)
}

/// Directory for the log file and the default document database. Created if missing.
pub fn get_data_dir() -> std::io::Result<PathBuf> {
    let path = xdg_dir("XDG_DATA_HOME", &PLATFORM_DATA_DIR);
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

/// Contents written to a fresh config file.
pub fn get_default_config() -> &'static str {
    DEFAULT_CONFIG
}
