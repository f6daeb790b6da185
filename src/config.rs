//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;

pub const STORE_FILE_NAME: &str = "projects.json";
pub const SETTINGS_FILE_NAME: &str = "settings.json";
pub const HISTORY_FILE_NAME: &str = "history.html";

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "project-timer")]
#[command(about = "Track time spent per project, pausing when you go idle")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Project that is open when the daemon starts
    #[arg(long)]
    pub project: Option<String>,

    /// Directory holding the project store and settings
    #[arg(long)]
    pub storage_dir: Option<PathBuf>,

    /// Old store location, moved into the storage directory on first start
    #[arg(long)]
    pub legacy_file: Option<PathBuf>,

    /// Seconds between inactivity checks, 0 disables polling
    #[arg(long, default_value = "30")]
    pub poll_interval: u64,

    /// Open the history page in the browser when it is generated
    #[arg(long)]
    pub open_history: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// `--storage-dir`, or the platform data directory
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("project-timer")
        })
    }

    pub fn store_path(&self) -> PathBuf {
        self.storage_dir().join(STORE_FILE_NAME)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.storage_dir().join(SETTINGS_FILE_NAME)
    }

    pub fn history_path(&self) -> PathBuf {
        self.storage_dir().join(HISTORY_FILE_NAME)
    }

    /// `--legacy-file`, or `projects.json` beside the executable
    pub fn legacy_store_path(&self) -> Option<PathBuf> {
        self.legacy_file.clone().or_else(|| {
            std::env::current_exe()
                .ok()
                .and_then(|exe| exe.parent().map(|dir| dir.join(STORE_FILE_NAME)))
        })
    }
}
