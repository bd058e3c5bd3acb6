use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "simchat")]
#[command(about = "Interactive terminal chat with OpenAI-compatible models")]
#[command(version)]
pub struct Args {
    /// API key (overrides the environment and config file)
    #[arg(short = 'k', long = "api-key")]
    pub api_key: Option<String>,

    /// Model name
    #[arg(short = 'm', long)]
    pub model: Option<String>,

    /// Maximum attempts per request
    #[arg(short = 'r', long)]
    pub retry: Option<u32>,

    /// Directory \save writes context files to
    #[arg(short = 'd', long = "dump-dir")]
    pub dump_dir: Option<PathBuf>,

    /// Saved context file to start from
    #[arg(short = 'c', long = "cache-path")]
    pub cache_path: Option<PathBuf>,

    /// API endpoint URL
    #[arg(short = 'e', long)]
    pub endpoint: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List known model names
    Models,
}
