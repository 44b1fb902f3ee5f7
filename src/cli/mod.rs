use clap::Parser;
use std::path::PathBuf;

use crate::network::client::DEFAULT_TIMEOUT_SECS;
use crate::network::transport::{DEFAULT_RELAY, DEFAULT_TOR_CHECK_URL};
use crate::resolver::DEFAULT_WORKERS;

const DEFAULT_FORMAT: &str = "plain";

#[derive(Parser, Debug)]
#[clap(name = "handlex", version)]
pub struct Args {
    /// Handles (usernames) to look for, e.g. john_doe
    #[clap(name = "HANDLES")]
    pub handles: Vec<String>,

    /// Config file to load instead of the default one
    #[clap(short, long)]
    pub config: Option<PathBuf>,

    #[clap(help_heading = "Output Options")]
    /// Directory receiving one report file per handle
    #[clap(short, long, value_parser)]
    pub output_dir: Option<PathBuf>,

    /// Report format ("plain" or "json") [default: plain]
    #[clap(help_heading = "Output Options")]
    #[clap(short, long, value_parser = validate_format)]
    pub format: Option<String>,

    /// Also probe the restricted (adult) catalog after the general one
    #[clap(help_heading = "Catalog Options")]
    #[clap(long)]
    pub restricted: bool,

    /// Read the general catalog from this TOML file instead of the built-in one
    #[clap(help_heading = "Catalog Options")]
    #[clap(long)]
    pub general_catalog: Option<PathBuf>,

    /// Read the restricted catalog from this TOML file instead of the built-in one
    #[clap(help_heading = "Catalog Options")]
    #[clap(long)]
    pub restricted_catalog: Option<PathBuf>,

    /// Route every probe through the local Tor SOCKS relay
    #[clap(help_heading = "Network Options")]
    #[clap(long)]
    pub tor: bool,

    /// Address of the Tor SOCKS relay [default: 127.0.0.1:9050]
    #[clap(help_heading = "Network Options")]
    #[clap(long)]
    pub relay: Option<String>,

    /// URL fetched through the relay to validate it before probing
    /// [default: https://check.torproject.org/]
    #[clap(help_heading = "Network Options")]
    #[clap(long)]
    pub tor_check_url: Option<String>,

    /// Skip SSL certificate verification (accept self-signed certs)
    #[clap(help_heading = "Network Options")]
    #[clap(long)]
    pub insecure: bool,

    /// Request timeout in seconds [default: 20]
    #[clap(help_heading = "Network Options")]
    #[clap(long)]
    pub timeout: Option<u64>,

    /// Number of probe workers per batch [default: 10]
    #[clap(help_heading = "Network Options")]
    #[clap(short, long)]
    pub workers: Option<usize>,

    /// File with one User-Agent per line (created with defaults when missing)
    #[clap(help_heading = "Network Options")]
    #[clap(long)]
    pub agents: Option<PathBuf>,

    /// Queue search-engine dork queries for each handle in its report
    #[clap(help_heading = "Escalation Options")]
    #[clap(long)]
    pub dork: bool,

    #[clap(help_heading = "Display Options")]
    /// Show verbose output
    #[clap(short, long)]
    pub verbose: bool,

    #[clap(help_heading = "Display Options")]
    /// Silent mode (no terminal summary)
    #[clap(long)]
    pub silent: bool,

    #[clap(help_heading = "Display Options")]
    /// No progress bar
    #[clap(long)]
    pub no_progress: bool,
}

/// Values left unset by both the command line and the config file fall back
/// to their defaults here
impl Args {
    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or(DEFAULT_FORMAT)
    }

    pub fn relay(&self) -> &str {
        self.relay.as_deref().unwrap_or(DEFAULT_RELAY)
    }

    pub fn tor_check_url(&self) -> &str {
        self.tor_check_url.as_deref().unwrap_or(DEFAULT_TOR_CHECK_URL)
    }

    pub fn timeout(&self) -> u64 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)
    }

    pub fn workers(&self) -> usize {
        self.workers.unwrap_or(DEFAULT_WORKERS)
    }
}

pub fn read_handles_from_stdin() -> anyhow::Result<Vec<String>> {
    use anyhow::Context;
    use std::io::{self, BufRead};

    let stdin = io::stdin();
    let mut handles = Vec::new();

    for line in stdin.lock().lines() {
        let handle = line.context("Failed to read line from stdin")?;
        if !handle.trim().is_empty() {
            handles.push(handle.trim().to_string());
        }
    }

    Ok(handles)
}

fn validate_format(s: &str) -> Result<String, String> {
    match s.to_lowercase().as_str() {
        "plain" | "json" => Ok(s.to_lowercase()),
        _ => Err(format!(
            "Invalid report format: {}. Allowed values are plain or json",
            s
        )),
    }
}
