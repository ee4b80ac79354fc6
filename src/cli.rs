// src/cli.rs

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(
    version,
    about = "minikeep - a minimal personal notes server",
    long_about = "minikeep stores short text notes as individual .txt files and serves them over a small JSON API, optionally guarded by a shared password."
)]
pub struct Cli {
    #[arg(short, long, help = "Path to a JSON config file")]
    pub config: Option<PathBuf>,

    #[arg(short, long, help = "Port to bind (default: 8000)")]
    pub port: Option<u16>,

    #[arg(short = 'w', long, help = "Password required via the X-Password header")]
    pub password: Option<String>,

    #[arg(long, help = "Hours to keep access log records (default: 24)")]
    pub log_retention_hours: Option<u32>,

    #[arg(long, help = "Address to bind (default: 0.0.0.0)")]
    pub host: Option<String>,

    #[arg(long, help = "Directory holding the notes (default: ./data)")]
    pub data_dir: Option<PathBuf>,

    #[arg(long, help = "Directory holding access log records (default: ./log)")]
    pub log_dir: Option<PathBuf>,

    /// Format of diagnostic output on stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}
