use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;

use link_unwrapper::chain::Chain;
use link_unwrapper::config;
use link_unwrapper::http::ResolutionBody;
use link_unwrapper::resolver::{HostRegistry, HttpProber};

#[derive(Parser)]
#[command(name = "unwrap-link")]
#[command(about = "Resolve a single shortened link and print its redirect trace", long_about = None)]
struct Cli {
    /// Path to the TOML configuration; the bundled config is used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log at debug level on stderr
    #[arg(long)]
    debug: bool,

    /// Shortened link, e.g. https://t.co/abc
    url: Url,
}

async fn unwrap(cli: &Cli) -> Result<bool, Box<dyn Error>> {
    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::bundled_config()?,
    };
    let registry = Arc::new(HostRegistry::from_config(&config)?);

    let host = cli.url.host_str().ok_or("URL has no host")?;
    let body = match Chain::new(registry, host, cli.url.path()) {
        Ok(chain) => {
            let trace = chain
                .with_max_hops(config.chain.max_hops)
                .run(&HttpProber)
                .await
                .sanitized();
            ResolutionBody::from(&trace)
        }
        Err(e) => ResolutionBody {
            hops: Vec::new(),
            result: None,
            error: Some((&e).into()),
        },
    };

    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(body.error.is_none())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("link_unwrapper={level},unwrap_link={level},warn").into()),
        )
        .init();

    match unwrap(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
