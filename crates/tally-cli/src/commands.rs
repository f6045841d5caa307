use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use tally_fanout::FanOutRetriever;
use tally_loadgen::{LoadDriver, LoadgenConfig};
use tally_server::{FrontendConfig, FrontendServer, ServerConfig, StoreBackend, TallyServer};
use tally_store::DirCorpusStore;

use crate::cli::*;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::Frontend(args) => cmd_frontend(args).await,
        Command::Loadgen(args) => cmd_loadgen(args).await,
        Command::Count(args) => cmd_count(args).await,
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

fn server_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(bucket) = &args.bucket {
        config.corpus.bucket = bucket.clone();
    }
    if let Some(prefix) = &args.prefix {
        config.corpus.prefix = prefix.clone();
    }
    if let Some(root) = &args.dir {
        config.store = StoreBackend::Dir { root: root.clone() };
    }
    if let Some(ms) = args.fetch_timeout_ms {
        config.fetch_timeout_ms = Some(ms);
    }
    Ok(config)
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = server_config(&args)?;
    println!(
        "{} tally server on {} ({}/{})",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        config.corpus.bucket.cyan(),
        config.corpus.prefix.cyan()
    );
    let server = TallyServer::new(config)?;
    server.serve_with_shutdown(shutdown_signal()).await?;
    Ok(())
}

fn frontend_config(args: &FrontendArgs) -> anyhow::Result<FrontendConfig> {
    let mut config = match &args.config {
        Some(path) => FrontendConfig::load(path)?,
        None => FrontendConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(backend) = &args.backend {
        config.backend_url = backend.clone();
    }
    Ok(config)
}

async fn cmd_frontend(args: FrontendArgs) -> anyhow::Result<()> {
    let config = frontend_config(&args)?;
    println!(
        "{} tally frontend on {} -> {}",
        "✓".green().bold(),
        config.bind_addr.to_string().bold(),
        config.backend_url.cyan()
    );
    let frontend = FrontendServer::new(config)?;
    frontend.serve_with_shutdown(shutdown_signal()).await?;
    Ok(())
}

fn loadgen_config(args: &LoadgenArgs) -> anyhow::Result<LoadgenConfig> {
    let mut config = match &args.config {
        Some(path) => LoadgenConfig::load(path)?,
        None => LoadgenConfig::default(),
    };
    if let Some(target) = &args.target {
        config.target_url = target.clone();
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }
    if let Some(rounds) = args.rounds {
        config.rounds = rounds;
    }
    if let Some(interval_ms) = args.interval_ms {
        config.interval_ms = interval_ms;
    }
    config.validate()?;
    Ok(config)
}

async fn cmd_loadgen(args: LoadgenArgs) -> anyhow::Result<()> {
    let config = loadgen_config(&args)?;
    let driver = LoadDriver::from_config(&config)?;
    println!(
        "Driving {} with {} workers at concurrency {} ({} rounds)",
        config.target_url.bold(),
        config.workers.to_string().yellow(),
        config.concurrency.to_string().yellow(),
        if config.rounds == 0 { "unbounded".to_string() } else { config.rounds.to_string() }
    );

    tokio::select! {
        summary = driver.run_rounds(config.workers, config.rounds, config.interval()) => {
            let summary = summary?;
            let status = if summary.failed_rounds == 0 && summary.mismatched == 0 {
                "✓".green().bold()
            } else {
                "!".yellow().bold()
            };
            println!(
                "{} {} rounds, {} requests, {} failed rounds, {} mismatches",
                status,
                summary.rounds,
                summary.requests,
                summary.failed_rounds,
                summary.mismatched
            );
        }
        _ = shutdown_signal() => {
            println!("{} interrupted", "✗".red());
        }
    }
    Ok(())
}

async fn cmd_count(args: CountArgs) -> anyhow::Result<()> {
    let store = Arc::new(DirCorpusStore::new(args.dir.clone()));
    let retriever = FanOutRetriever::new(store, "");
    let matcher = tally_matcher::LineMatcher::new(&args.pattern)?;
    let corpus = retriever
        .retrieve_prefix(&args.prefix)
        .await?
        .into_result()
        .with_context(|| format!("retrieving corpus from {}", args.dir.display()))?;
    let count = matcher.count(&corpus);
    println!(
        "{} {} lines match {:?} across {} documents",
        "✓".green().bold(),
        count.to_string().bold(),
        args.pattern,
        corpus.len()
    );
    Ok(())
}
