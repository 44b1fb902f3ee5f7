use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod config;
mod error;
mod escalation;
mod handle;
mod network;
mod output;
mod progress;
mod resolver;

use catalog::{CatalogKind, CatalogSource};
use cli::{read_handles_from_stdin, Args};
use config::Config;
use escalation::{DorkHandoff, Escalation};
use handle::Handle;
use network::{AgentPool, DirectTransport, HttpClientConfig, OnionTransport, Transport};
use output::{create_formatter, print_batch_summary, print_run_summary, Reporter, RunSummary};
use progress::ProgressManager;
use resolver::{Resolver, ResolverSettings};

/// Sets up the stderr log writer; `RUST_LOG` overrides the verbosity flag
fn init_tracing(verbose: bool) {
    let default = if verbose { "handlex=debug" } else { "handlex=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn build_transport(args: &Args) -> Result<Box<dyn Transport>> {
    let client_config = HttpClientConfig {
        timeout: args.timeout(),
        insecure: args.insecure,
        proxy: None,
    };

    if args.tor {
        let transport = OnionTransport::connect(&client_config, args.relay(), args.tor_check_url())
            .await
            .context("Refusing to probe without the anonymizing relay")?;
        info!(relay = transport.relay(), "probing through onion transport");
        return Ok(Box::new(transport));
    }

    let transport =
        DirectTransport::new(&client_config).context("Failed to build the HTTP client")?;
    Ok(Box::new(transport))
}

fn load_agents(args: &Args) -> Result<AgentPool> {
    match args.agents.clone().or_else(Config::default_agents_path) {
        Some(path) => AgentPool::load_or_init(&path)
            .with_context(|| format!("Failed to load user agents from {}", path.display())),
        None => {
            warn!("no config directory available, using built-in user agents");
            Ok(AgentPool::builtin())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = Args::parse();

    let config = Config::load(&args)?;
    config.apply_to_args(&mut args);

    init_tracing(args.verbose);
    config::validate(&args)?;

    // Collect handles either from arguments or stdin
    let raw_handles = if args.handles.is_empty() {
        read_handles_from_stdin()?
    } else {
        args.handles.clone()
    };

    if raw_handles.is_empty() {
        if !args.silent {
            eprintln!("No handles provided. Please specify handles or pipe them through stdin.");
        }
        return Ok(());
    }

    let handles = raw_handles
        .iter()
        .map(|raw| Handle::parse(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let agents = Arc::new(load_agents(&args)?);
    debug!(agents = agents.len(), "user-agent pool ready");

    let transport = build_transport(&args).await?;
    let resolver = Resolver::new(
        transport,
        agents,
        ResolverSettings {
            workers: args.workers(),
            timeout: Duration::from_secs(args.timeout()),
        },
    );
    let anonymized = resolver.is_anonymized();

    let progress = ProgressManager::new(args.no_progress || args.silent);
    let output_dir = args.output_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let formatter = create_formatter(args.format());

    let mut catalogs = vec![(
        CatalogKind::General,
        CatalogSource::from_option(args.general_catalog.clone()),
    )];
    if args.restricted {
        catalogs.push((
            CatalogKind::Restricted,
            CatalogSource::from_option(args.restricted_catalog.clone()),
        ));
    }

    for handle in &handles {
        let reporter = Reporter::new(&output_dir, handle, formatter.clone());
        let mut batches = Vec::with_capacity(catalogs.len());

        for (kind, source) in &catalogs {
            let batch = resolver
                .resolve(handle, *kind, source, &progress)
                .await
                .with_context(|| {
                    format!("Failed to resolve '{}' over the {} catalog", handle, kind)
                })?;

            reporter.write_batch(handle, &batch, anonymized)?;
            if !args.silent {
                print_batch_summary(handle, &batch, anonymized);
            }
            batches.push(batch);
        }

        let summary = RunSummary::from_batches(&batches);
        reporter.write_run(handle, &summary)?;
        if !args.silent {
            print_run_summary(handle, &summary);
        }

        if args.dork {
            DorkHandoff::new(&reporter).escalate(handle)?;
        }

        info!(handle = %handle, report = %reporter.path().display(), "report written");
    }

    Ok(())
}
