//! Command-line options and where configuration files live.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::api::client::{DEFAULT_BASE_URL, DEFAULT_COLLECTION};

pub const THEME_FILE: &str = "theme.conf";
pub const KEYBINDS_FILE: &str = "keybinds.conf";

/// List, search, create, edit and delete user records on a REST API.
#[derive(Parser, Debug, Clone)]
#[command(name = "userdeck", version, about)]
pub struct Cli {
    /// Base URL of the API, without the collection name.
    #[arg(long, env = "USERDECK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Name of the resource collection under the base URL.
    #[arg(long, env = "USERDECK_COLLECTION", default_value = DEFAULT_COLLECTION)]
    pub collection: String,

    /// Give up on a request after this many seconds.
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    /// Directory holding theme.conf and keybinds.conf.
    #[arg(long, env = "USERDECK_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory for log files.
    #[arg(long, env = "USERDECK_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

impl Cli {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `--config-dir`, else `<config dir>/userdeck`, else the working directory.
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone().unwrap_or_else(|| {
            dirs::config_dir()
                .map(|d| d.join("userdeck"))
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }

    /// `--log-dir`, else `<local data dir>/userdeck/logs`.
    pub fn log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("userdeck")
                .join("logs")
        })
    }

    pub fn theme_path(&self) -> PathBuf {
        self.config_dir().join(THEME_FILE)
    }

    pub fn keybinds_path(&self) -> PathBuf {
        self.config_dir().join(KEYBINDS_FILE)
    }
}
