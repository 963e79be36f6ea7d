//! sockc-resolve Binary
//!
//! A command-line tool that parses an endpoint (host:port or URI),
//! enumerates it, and prints the resolved socket addresses.

use log::{debug, error, info};
use sockc::{Config, NetworkAddress, Result, SocketConnectable};
use std::env;
use std::path::Path;
use std::process;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting sockc-resolve v{}", env!("CARGO_PKG_VERSION"));

    // Parse command line arguments: [--config <path>] <endpoint>
    let args: Vec<String> = env::args().collect();
    let (config_path, endpoint) = match args.as_slice() {
        [_, flag, path, endpoint] if flag == "--config" => (Some(path.as_str()), endpoint),
        [_, endpoint] if !endpoint.starts_with("--") => (None, endpoint),
        _ => {
            eprintln!("Usage: sockc-resolve [--config <config.toml>] <endpoint>");
            eprintln!("  <endpoint> is host:port, [v6]:port, or a URI like https://host/");
            process::exit(2);
        }
    };

    // Load configuration
    let config = match config_path {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    debug!(
        "resolver: order={:?} max_results={} default_port={}",
        config.resolver.address_order, config.resolver.max_results, config.resolver.default_port
    );

    // Build the endpoint
    let default_port = config.resolver.default_port;
    let address = if endpoint.contains("://") {
        NetworkAddress::parse_uri(endpoint, default_port)?
    } else {
        NetworkAddress::parse(endpoint, default_port)?
    };
    info!("enumerating {}", address.to_description());

    // Drive the enumerator and print each resolved address
    let enumerator = address.enumerate()?;
    let mut count = 0usize;
    loop {
        match enumerator.next_async().await {
            Ok(Some(addr)) => {
                println!("{addr}");
                count += 1;
            }
            Ok(None) => break,
            Err(e) => {
                error!("resolution failed: {e}");
                process::exit(1);
            }
        }
    }
    info!("{count} address(es)");

    Ok(())
}

fn load_config(path: &str) -> Result<Config> {
    if !Path::new(path).exists() {
        error!("config file not found: {path}");
        process::exit(2);
    }
    let config = Config::from_file(path)?;
    config.validate()?;
    info!("loaded configuration from {path}");
    Ok(config)
}
