//! Route resolver CLI.
//!
//! # Architecture Overview
//!
//! ```text
//!   site.toml ──▶ config ──▶ lifecycle::startup ──▶ Router
//!                   ▲                                 │
//!                   │ watcher (notify)                │ resolve(path)
//!                   │                                 ▼
//!              lifecycle::reload ── swap tree ──▶ RouteTree ──▶ RouteMatch
//!                                                     │
//!                                                     ▼
//!                                          ComponentRegistry::materialize
//!                                            (memoized, coalesced loads)
//! ```

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use route_resolver::config::loader::load_config;
use route_resolver::config::watcher::ConfigWatcher;
use route_resolver::config::SiteConfig;
use route_resolver::lifecycle::startup::{bootstrap, SiteRouter};
use route_resolver::lifecycle::{reload, signals, Shutdown};
use route_resolver::observability::{logging, metrics};
use route_resolver::routing::{self, sidebar};

#[derive(Parser)]
#[command(name = "route-resolver")]
#[command(about = "Resolve site paths to lazily loaded page components", long_about = None)]
struct Cli {
    /// Path to the site manifest.
    #[arg(short, long, default_value = "site.toml")]
    config: PathBuf,

    /// Log level; overrides the manifest (RUST_LOG overrides both).
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the manifest and build the route tree
    Check,
    /// Print the route tree
    Tree,
    /// Print routes grouped by sidebar as JSON
    Sidebar,
    /// Resolve one or more paths
    Resolve {
        paths: Vec<String>,

        /// Also load the matched components
        #[arg(long)]
        load: bool,
    },
    /// Keep routes live, rebuilding on manifest changes; resolves paths read from stdin
    Watch,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config);
    let level = cli
        .log_level
        .clone()
        .or_else(|| config.as_ref().ok().map(|c| c.observability.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    logging::init(&level);

    let config = config?;
    tracing::debug!(path = %cli.config.display(), site = %config.site.name, "Manifest loaded");

    match cli.command {
        Commands::Check => {
            let router = bootstrap(&config)?;
            let tree = router.tree();
            println!(
                "ok: {} routes, {} nodes, {} components, catch-all {}",
                config.routes.len(),
                tree.len(),
                router.registry().len(),
                if tree.catch_all().is_some() { "present" } else { "absent" }
            );
        }
        Commands::Tree => {
            let tree = routing::build(&config.routes)?;
            print!("{}", tree);
        }
        Commands::Sidebar => {
            let tree = routing::build(&config.routes)?;
            println!("{}", serde_json::to_string_pretty(&sidebar::group(&tree))?);
        }
        Commands::Resolve { paths, load } => {
            let router = bootstrap(&config)?;
            for path in &paths {
                resolve_path(&router, path, load).await;
            }
        }
        Commands::Watch => watch(&cli.config, config).await?,
    }

    Ok(())
}

async fn resolve_path(router: &SiteRouter, path: &str, load: bool) {
    let navigation = match router.navigate(path) {
        Ok(navigation) => navigation,
        Err(e) => {
            println!("{} -> not found ({})", path, e);
            return;
        }
    };

    let mut line = format!(
        "{} -> {} [{}]",
        path,
        navigation.node().full_path(),
        navigation.component_key()
    );
    for (name, value) in navigation.params() {
        line.push_str(&format!(" {}={}", name, value));
    }
    let chain = navigation.chain_keys();
    if chain.len() > 1 {
        let layouts: Vec<_> = chain.iter().map(|k| k.as_str()).collect();
        line.push_str(&format!(" via {}", layouts.join(" > ")));
    }

    if load {
        match navigation.component().await {
            Ok(page) => line.push_str(&format!(" ({} bytes from {})", page.body.len(), page.path.display())),
            Err(e) => line.push_str(&format!(" (load failed: {})", e)),
        }
    }
    println!("{}", line);
}

async fn watch(manifest: &std::path::Path, config: SiteConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let router = Arc::new(bootstrap(&config)?);
    let shutdown = Shutdown::new();
    signals::spawn_ctrl_c_listener(shutdown.clone());

    let (watcher, updates) = ConfigWatcher::new(manifest);
    let _watcher = watcher.run(Duration::from_secs(config.watch.poll_interval_secs))?;
    let reloader = tokio::spawn(reload::run(Arc::clone(&router), updates, shutdown.subscribe()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stop = shutdown.subscribe();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => resolve_path(&router, line.trim(), true).await,
                None => break,
            },
            _ = stop.recv() => break,
        }
    }

    shutdown.trigger();
    let _ = reloader.await;
    tracing::info!("Shutdown complete");
    Ok(())
}
