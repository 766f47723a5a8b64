use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use upload_logging::LogDestination;

/// Upload files to an HTTP endpoint as multipart form posts.
#[derive(Debug, Parser)]
#[command(name = "upload-files", version, about)]
pub struct Cli {
    /// Files to upload, in order.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// RON file with upload settings.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Upload endpoint URL.
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Multipart field name for the file part.
    #[arg(long)]
    pub field_name: Option<String>,

    /// Extra form field, KEY=VALUE. Repeatable.
    #[arg(long = "field")]
    pub fields: Vec<String>,

    /// Extra request header, KEY=VALUE. Repeatable.
    #[arg(long = "header")]
    pub headers: Vec<String>,

    /// Keep cookies set by the server for later uploads.
    #[arg(long)]
    pub with_credentials: bool,

    /// Only upload the first file.
    #[arg(long)]
    pub single: bool,

    /// Accept list such as ".png,image/*".
    #[arg(long)]
    pub accept: Option<String>,

    /// Skip files of this many bytes or more.
    #[arg(long)]
    pub max_bytes: Option<u64>,

    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,

    /// Log file used by `--log file` and `--log both`.
    #[arg(long, default_value = "./upload.log")]
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
