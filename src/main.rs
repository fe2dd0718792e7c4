//! Crawler binary: wire the politeness layer, the two-tier fetcher and a
//! Postgres sink into the engine, then run until SIGINT/SIGTERM.

use anyhow::{Context, Result, bail};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

use webscout::engine::{Engine, EngineConfig};
use webscout::fetcher::dynamic::BrowserFetcher;
use webscout::fetcher::static_client::StaticFetcher;
use webscout::filter::{InDomainFilter, ProductFilter};
use webscout::processor::{PageProcessor, ScoutProcessor};
use webscout::storage::{PageSink, ScoutSink, connect_with_retry};
use webscout::{Config, DomainManager, Parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Scrape full page snapshots.
    Page,
    /// Scout product-detail URLs.
    Scout,
}

#[derive(Debug)]
struct CliOverrides {
    url: Option<String>,
    workers: Option<usize>,
    mode: Mode,
}

fn parse_args(args: impl Iterator<Item = String>) -> Result<CliOverrides> {
    let mut overrides = CliOverrides {
        url: None,
        workers: None,
        mode: Mode::Page,
    };

    let mut args = args;
    while let Some(arg) = args.next() {
        let (flag, inline_value) = match arg.split_once('=') {
            Some((flag, value)) => (flag.to_string(), Some(value.to_string())),
            None => (arg, None),
        };
        match flag.as_str() {
            "--url" => {
                overrides.url = Some(take_value(&flag, inline_value, &mut args)?);
            }
            "--workers" => {
                let raw = take_value(&flag, inline_value, &mut args)?;
                let parsed: usize = raw
                    .parse()
                    .with_context(|| format!("invalid --workers value {raw:?}"))?;
                if parsed == 0 {
                    bail!("--workers must be positive");
                }
                overrides.workers = Some(parsed);
            }
            "--mode" => {
                overrides.mode = match take_value(&flag, inline_value, &mut args)?.as_str() {
                    "page" => Mode::Page,
                    "scout" => Mode::Scout,
                    other => bail!("unknown mode {other:?}, expected 'page' or 'scout'"),
                };
            }
            other => bail!("unknown flag {other:?}"),
        }
    }

    Ok(overrides)
}

fn take_value(
    flag: &str,
    inline: Option<String>,
    args: &mut impl Iterator<Item = String>,
) -> Result<String> {
    match inline.or_else(|| args.next()) {
        Some(value) => Ok(value),
        None => bail!("missing value for {flag}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = Config::from_env()?;
    let cli = parse_args(std::env::args().skip(1))?;
    if let Some(url) = cli.url {
        config.start_url = url;
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }

    // Fatal when the store never comes up; nonzero exit via the error.
    let pool = connect_with_retry(&config.database_url).await?;

    let engine_config = EngineConfig {
        workers: config.workers,
        batch_size: config.batch_size,
        rate_limit: config.rate_limit,
        limit: None,
    };

    let domains = Arc::new(DomainManager::new(
        &config.user_agent,
        engine_config.rate_limit,
    )?);
    let static_fetcher = StaticFetcher::new(&config.user_agent)
        .context("failed to build http client")?;
    let dynamic_fetcher = BrowserFetcher::new(true);
    let parser = Arc::new(Parser::new(
        static_fetcher,
        dynamic_fetcher,
        Arc::clone(&domains),
    ));

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("shutdown signal received, draining");
        let _ = cancel_tx.send(true);
    });

    let seeds = vec![config.start_url.clone()];

    info!(mode = ?cli.mode, url = %config.start_url, workers = config.workers, "starting crawler");
    match cli.mode {
        Mode::Page => {
            let filter = InDomainFilter::new(&config.start_url)
                .context("start URL has no usable host")?;
            let processor = PageProcessor::new(parser, filter);
            let sink = PageSink::new(pool);
            Engine::new(engine_config, processor, sink, domains)
                .run(cancel_rx, seeds)
                .await;
        }
        Mode::Scout => {
            let processor = ScoutProcessor::new(parser, ProductFilter);
            let sink = ScoutSink::new(pool);
            Engine::new(engine_config, processor, sink, domains)
                .run(cancel_rx, seeds)
                .await;
        }
    }

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut term = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            Ok(term) => term,
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
