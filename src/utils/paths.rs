use std::{
    env,
    path::{Path, PathBuf},
};

use dirs::home_dir;

const DEFAULT_DIR_NAME: &str = ".budget_projection";
const HOME_ENV: &str = "BUDGET_PROJECTION_HOME";
const CONFIG_FILE: &str = "config.json";
const LEDGER_FILE: &str = "ledger.json";

/// Returns the application data directory, defaulting to `~/.budget_projection`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

pub fn ledger_file_in(base: &Path) -> PathBuf {
    base.join(LEDGER_FILE)
}
