use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::config::EvictionPolicy;
use super::constants::{
    ENV_ANNOUNCEMENT_INTERVAL, ENV_CACHE_MAX_ENTRIES, ENV_CONFIG, ENV_HOST, ENV_JWT_SECRET,
    ENV_NO_AUTH, ENV_PORT,
};

#[derive(Parser)]
#[command(name = "conference")]
#[command(version, about = "Conference organization backend", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Server host address
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Server port
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Disable authentication (every request acts as the local user)
    #[arg(long, global = true, env = ENV_NO_AUTH)]
    pub no_auth: bool,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// Shared secret used to verify bearer tokens
    #[arg(long, global = true, env = ENV_JWT_SECRET, hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Maximum number of cache entries
    #[arg(long, global = true, env = ENV_CACHE_MAX_ENTRIES)]
    pub cache_max_entries: Option<u64>,

    /// Cache eviction policy (tinylfu or lru)
    #[arg(long, global = true, value_parser = parse_eviction_policy)]
    pub cache_eviction_policy: Option<EvictionPolicy>,

    /// Seconds between announcement refreshes
    #[arg(long, global = true, env = ENV_ANNOUNCEMENT_INTERVAL)]
    pub announcement_interval: Option<u64>,
}

/// Parse eviction policy from CLI/env string
fn parse_eviction_policy(s: &str) -> Result<EvictionPolicy, String> {
    match s.to_lowercase().as_str() {
        "tinylfu" => Ok(EvictionPolicy::TinyLfu),
        "lru" => Ok(EvictionPolicy::Lru),
        _ => Err(format!(
            "Invalid eviction policy '{}'. Valid options: tinylfu, lru",
            s
        )),
    }
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the server (default command)
    Start,
    /// Mint a development bearer token signed with the configured secret
    Token {
        /// User id placed in the `sub` claim
        #[arg(long)]
        user: String,
        /// Email placed in the `email` claim (defaults to <user>@localhost)
        #[arg(long)]
        email: Option<String>,
    },
    /// System maintenance commands
    System {
        #[command(subcommand)]
        command: SystemCommands,
    },
}

#[derive(Subcommand, Clone, Debug)]
pub enum SystemCommands {
    /// Delete local data directory (database). Requires confirmation.
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub no_auth: bool,
    pub config: Option<PathBuf>,
    pub jwt_secret: Option<String>,
    pub cache_max_entries: Option<u64>,
    pub cache_eviction_policy: Option<EvictionPolicy>,
    pub announcement_interval: Option<u64>,
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let cli = Cli::parse();
    let config = CliConfig {
        host: cli.host,
        port: cli.port,
        no_auth: cli.no_auth,
        config: cli.config,
        jwt_secret: cli.jwt_secret,
        cache_max_entries: cli.cache_max_entries,
        cache_eviction_policy: cli.cache_eviction_policy,
        announcement_interval: cli.announcement_interval,
    };
    (config, cli.command)
}
