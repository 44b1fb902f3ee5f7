use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task;
use tracing::{debug, error, info, warn};

mod partition;
mod probe;
mod results;

pub use results::{BatchOutcomes, BatchResult};

use partition::partition;
use results::ResultSet;

use crate::catalog::{Catalog, CatalogKind, CatalogSource, SiteTarget};
use crate::error::Result;
use crate::handle::Handle;
use crate::network::client::DEFAULT_TIMEOUT_SECS;
use crate::network::{AgentPool, Transport};
use crate::progress::ProgressManager;
use probe::{probe_partition, ProbeContext, WorkerReport};

/// Default size of the worker pool
pub const DEFAULT_WORKERS: usize = 10;

/// Pool size and per-request timeout for a batch
#[derive(Debug, Clone, Copy)]
pub struct ResolverSettings {
    pub workers: usize,
    pub timeout: Duration,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Runs batches of presence probes for a handle over one catalog at a time.
///
/// Each batch gets its own `ResultSet`, a fresh pool of `workers` tasks, and is
/// complete only once every task has been joined.
pub struct Resolver {
    transport: Box<dyn Transport>,
    agents: Arc<AgentPool>,
    settings: ResolverSettings,
}

impl Resolver {
    pub fn new(
        transport: Box<dyn Transport>,
        agents: Arc<AgentPool>,
        settings: ResolverSettings,
    ) -> Self {
        Resolver {
            transport,
            agents,
            settings,
        }
    }

    pub fn is_anonymized(&self) -> bool {
        self.transport.is_anonymized()
    }

    /// Loads the catalog, then runs one batch over it
    pub async fn resolve(
        &self,
        handle: &Handle,
        kind: CatalogKind,
        source: &CatalogSource,
        progress: &ProgressManager,
    ) -> Result<BatchResult> {
        let catalog = Catalog::load(kind, source)?;
        debug!(catalog = %kind, sites = catalog.len(), "catalog ready");
        self.run_batch(handle, &catalog, progress).await
    }

    pub async fn run_batch(
        &self,
        handle: &Handle,
        catalog: &Catalog,
        progress: &ProgressManager,
    ) -> Result<BatchResult> {
        self.run_targets(catalog.kind(), handle, catalog.targets(handle), progress)
            .await
    }

    async fn run_targets(
        &self,
        kind: CatalogKind,
        handle: &Handle,
        targets: Vec<SiteTarget>,
        progress: &ProgressManager,
    ) -> Result<BatchResult> {
        let matcher = handle.matcher()?;
        let results = Arc::new(ResultSet::new());
        let total = targets.len();
        let bar = progress.create_batch_bar(kind.label(), total);

        info!(
            catalog = %kind,
            handle = %handle,
            sites = total,
            workers = self.settings.workers,
            "starting batch"
        );

        let started = Instant::now();
        let mut tasks = Vec::with_capacity(self.settings.workers);

        for chunk in partition(&targets, self.settings.workers) {
            let ctx = ProbeContext {
                transport: self.transport.clone_box(),
                agents: Arc::clone(&self.agents),
                matcher: matcher.clone(),
                results: Arc::clone(&results),
                timeout: self.settings.timeout,
                bar: bar.clone(),
            };

            tasks.push(task::spawn(probe_partition(chunk.to_vec(), ctx)));
        }

        let mut slowest = Duration::ZERO;
        for joined in join_all(tasks).await {
            match joined {
                Ok(WorkerReport {
                    probed,
                    slowest: worker_slowest,
                }) => {
                    debug!(catalog = %kind, probed, "worker finished");
                    slowest = slowest.max(worker_slowest);
                }
                Err(e) => error!(catalog = %kind, "probe worker failed: {}", e),
            }
        }
        let elapsed = started.elapsed();

        let outcomes = results.drain();
        let mut dropped = results.dropped();

        let accounted = outcomes.recorded() + dropped;
        if accounted < total {
            warn!(
                catalog = %kind,
                missing = total - accounted,
                "targets left unprobed by a failed worker, counting them as dropped"
            );
            dropped = total - outcomes.recorded();
        }

        bar.finish_with_message(format!("{} confirmed", outcomes.confirmed.len()));

        let result = BatchResult {
            catalog: kind,
            confirmed_count: outcomes.confirmed.len(),
            elapsed_seconds: elapsed.as_secs_f64(),
            probed: total,
            dropped,
            slowest_probe_seconds: slowest.as_secs_f64(),
            outcomes,
        };

        info!(
            catalog = %kind,
            confirmed = result.confirmed_count,
            unconfirmed = result.outcomes.unconfirmed.len(),
            manual_review = result.outcomes.manual_review.len(),
            dropped = result.dropped,
            elapsed = result.elapsed_seconds,
            "batch finished"
        );

        Ok(result)
    }
}
