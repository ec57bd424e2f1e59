//! Link Unwrapper (v1)
//!
//! An HTTP service that answers for link-shortener host names and resolves
//! every request into the chain of redirects behind it.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request (Host: t.co, path /abc)
//!     ──────────▶ http server ──▶ registry lookup ──▶ chain walker
//!                                                       │
//!                           ┌───────────────────────────┘
//!                           ▼
//!                  HEAD https://{host}/{path}   (manual redirects,
//!                           │                    upstream DNS)
//!                           ▼
//!                  Location header ──▶ next registered host? ──▶ loop
//!                                                  │ no
//!                                                  ▼
//!     Client Response ◀── sanitize trace ◀──── final URL
//! ```

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use link_unwrapper::config::{self, ConfigError, UnwrapperConfig};
use link_unwrapper::lifecycle;
use link_unwrapper::observability::logging::{init_logging, LogFormat};

#[derive(Parser)]
#[command(name = "link-unwrapper")]
#[command(about = "Resolve link-shortener redirect chains over HTTP", long_about = None)]
struct Args {
    /// Path to the TOML configuration; the bundled config is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Upstream DNS server (ip:port) used for every probe
    #[arg(long)]
    upstream_dns: Option<String>,

    /// Log output format: json or pretty
    #[arg(long)]
    log_format: Option<String>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

fn load(args: &Args) -> Result<UnwrapperConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::bundled_config()?,
    };

    if let Some(dns) = &args.upstream_dns {
        config.upstream.dns = dns.clone();
    }
    if let Some(format) = &args.log_format {
        config.observability.log_format = format.clone();
    }
    if args.debug {
        config.observability.log_level = "debug".to_string();
    }

    config::validation::validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let config = load(&args)?;

    let format: LogFormat = config.observability.log_format.parse()?;
    init_logging(&config.observability.log_level, format)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        "link-unwrapper starting"
    );

    lifecycle::run(config).await?;
    Ok(())
}
