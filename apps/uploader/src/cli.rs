use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about = "Upload files to Lago storage", long_about = None)]
pub struct Cli {
    /// Config file (defaults to the per-user uploader.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Service base URL, overriding config and LAGO_BASE_URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Access token for this run; not persisted
    #[arg(long)]
    pub token: Option<String>,

    /// MIME type for every file instead of guessing from the extension
    #[arg(long)]
    pub mime: Option<String>,

    /// Files to upload, one after another
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}
