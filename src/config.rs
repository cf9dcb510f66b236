//! Configuration and CLI argument handling

use std::path::PathBuf;
use clap::Parser;

use crate::{
    state::{SessionConfig, DEFAULT_REST_MINUTES, DEFAULT_VOLUME, DEFAULT_WORK_MINUTES},
    tasks::SessionDefaults,
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "focus-buddy")]
#[command(about = "A focus-session timer with work/rest cycling and ambient audio")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Default Work phase length in minutes
    #[arg(short, long, default_value_t = DEFAULT_WORK_MINUTES, value_parser = clap::value_parser!(u32).range(1..))]
    pub work: u32,

    /// Default Rest phase length in minutes
    #[arg(short, long, default_value_t = DEFAULT_REST_MINUTES, value_parser = clap::value_parser!(u32).range(1..))]
    pub rest: u32,

    /// Initial ambient volume (0-100)
    #[arg(long, default_value_t = DEFAULT_VOLUME, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub volume: u8,

    /// Audio file looped as ambience while a session runs
    #[arg(long)]
    pub ambience: Option<PathBuf>,

    /// Player binary used for ambience (mpv-compatible flags)
    #[arg(long, default_value = "mpv")]
    pub player: String,

    /// Bearer token required on session endpoints
    #[arg(long, env = "FOCUS_BUDDY_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

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

    /// What every new or discarded session starts from
    pub fn session_defaults(&self) -> SessionDefaults {
        SessionDefaults {
            config: SessionConfig::new(self.work, self.rest),
            volume: self.volume,
        }
    }
}
