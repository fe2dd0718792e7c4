//! The crawl engine: a worker pool over a shared worklist, a results
//! stream into a batching storage task, and clean shutdown.
//!
//! The engine is generic over the item type `T` so the same machinery
//! drives full-page scraping (`T = PageData`) and product scouting
//! (`T = UrlQueueItem`).

use futures::future::join_all;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc, watch};
use tracing::{debug, info, warn};

use crate::domain_manager::DomainManager;
use crate::processor::Processor;
use crate::storage::Sink;
use crate::visited::VisitedSet;

/// Worklist capacity, in batches of URLs.
const WORKLIST_CAPACITY: usize = 100;

/// Storage worker flush interval.
const FLUSH_INTERVAL: Duration = Duration::from_secs(2);

/// Engine knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of concurrent crawl workers.
    pub workers: usize,
    /// Sink batch size; also sizes the results channel (2x).
    pub batch_size: usize,
    /// Per-host token-bucket refill interval the politeness layer was
    /// built with.
    pub rate_limit: Duration,
    /// Optional cap on processed pages. `None` keeps the crawl open-ended
    /// (the web has no natural end); the run then terminates only by
    /// cancellation.
    pub limit: Option<usize>,
}

/// Orchestrates the crawl for one `run` lifetime.
pub struct Engine<T, P, S> {
    config: EngineConfig,
    processor: Arc<P>,
    sink: Arc<S>,
    visited: Arc<VisitedSet>,
    domains: Arc<DomainManager>,
    _item: PhantomData<fn() -> T>,
}

impl<T, P, S> Engine<T, P, S>
where
    T: Send + 'static,
    P: Processor<T> + 'static,
    S: Sink<T> + 'static,
{
    pub fn new(config: EngineConfig, processor: P, sink: S, domains: Arc<DomainManager>) -> Self {
        Self {
            config,
            processor: Arc::new(processor),
            sink: Arc::new(sink),
            visited: Arc::new(VisitedSet::new()),
            domains,
            _item: PhantomData,
        }
    }

    /// Run until cancelled: start the storage worker and the crawl
    /// workers, seed the worklist, and wait for every task to return.
    ///
    /// Guarantees on cancellation: no further worklist pops, the storage
    /// worker flushes buffered items once more, and all tasks have
    /// returned before this function does. Items still in the results
    /// channel at that point may be lost; that is the documented
    /// at-most-once trade-off.
    pub async fn run(&self, shutdown: watch::Receiver<bool>, seeds: Vec<String>) {
        let (work_tx, work_rx) = mpsc::channel::<Vec<String>>(WORKLIST_CAPACITY);
        let work_rx = Arc::new(Mutex::new(work_rx));
        let (result_tx, result_rx) = mpsc::channel::<T>(self.config.batch_size.max(1) * 2);

        // Run-scoped stop signal. External cancellation is forwarded into
        // it; a worker hitting the page limit raises it too, so workers
        // parked on the worklist still wake up and exit.
        let (stop_tx, stop_rx) = watch::channel(false);
        let stop_tx = Arc::new(stop_tx);
        {
            let stop_tx = Arc::clone(&stop_tx);
            let mut shutdown = shutdown;
            tokio::spawn(async move {
                while shutdown.changed().await.is_ok() {
                    if *shutdown.borrow() {
                        let _ = stop_tx.send(true);
                        return;
                    }
                }
            });
        }

        let mut handles = Vec::with_capacity(self.config.workers + 1);

        handles.push(tokio::spawn(storage_worker(
            Arc::clone(&self.sink),
            result_rx,
            stop_rx.clone(),
            self.config.batch_size,
        )));

        let processed = Arc::new(AtomicUsize::new(0));
        for id in 0..self.config.workers {
            let ctx = WorkerContext {
                processor: Arc::clone(&self.processor),
                visited: Arc::clone(&self.visited),
                domains: Arc::clone(&self.domains),
                work_tx: work_tx.clone(),
                work_rx: Arc::clone(&work_rx),
                results: result_tx.clone(),
                stop: Arc::clone(&stop_tx),
                stopped: stop_rx.clone(),
                processed: Arc::clone(&processed),
                limit: self.config.limit,
            };
            handles.push(tokio::spawn(crawl_worker(id, ctx)));
        }
        // Workers hold their own sender clones; dropping ours lets the
        // storage worker observe end-of-stream once they all exit.
        drop(result_tx);

        if work_tx.send(seeds).await.is_err() {
            warn!("worklist closed before seeding");
        }

        info!(workers = self.config.workers, "engine started");
        join_all(handles).await;
        info!(
            pages = processed.load(Ordering::Relaxed),
            "engine stopped"
        );
    }
}

/// Everything one crawl worker needs; built per spawned worker.
struct WorkerContext<T, P> {
    processor: Arc<P>,
    visited: Arc<VisitedSet>,
    domains: Arc<DomainManager>,
    work_tx: mpsc::Sender<Vec<String>>,
    work_rx: Arc<Mutex<mpsc::Receiver<Vec<String>>>>,
    results: mpsc::Sender<T>,
    stop: Arc<watch::Sender<bool>>,
    stopped: watch::Receiver<bool>,
    processed: Arc<AtomicUsize>,
    limit: Option<usize>,
}

/// One crawl worker: pop a batch, run every URL through the politeness
/// gate and the processor, fan items out to storage and links back into
/// the worklist.
async fn crawl_worker<T, P>(id: usize, mut ctx: WorkerContext<T, P>)
where
    T: Send + 'static,
    P: Processor<T>,
{
    loop {
        let batch = {
            let mut rx = ctx.work_rx.lock().await;
            tokio::select! {
                _ = ctx.stopped.changed() => None,
                batch = rx.recv() => batch,
            }
        };
        let Some(batch) = batch else {
            debug!(worker = id, "worker exiting");
            return;
        };

        for link in batch {
            let url = link.trim();
            if url.is_empty() {
                continue;
            }
            if *ctx.stopped.borrow() {
                return;
            }
            if let Some(limit) = ctx.limit
                && ctx.processed.load(Ordering::Relaxed) >= limit
            {
                info!(worker = id, limit, "page limit reached, stopping the run");
                let _ = ctx.stop.send(true);
                return;
            }

            // Claim the URL before any network I/O so no other worker can
            // double-crawl it.
            if ctx.visited.seen_or_insert(url) {
                continue;
            }
            if !ctx.domains.is_allowed(url).await {
                debug!(worker = id, url, "disallowed by robots.txt");
                continue;
            }
            tokio::select! {
                _ = ctx.stopped.changed() => return,
                () = ctx.domains.wait(url) => {}
            }

            info!(worker = id, url, "crawling");
            let outcome = match ctx.processor.process(url).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(worker = id, url, error = %e, "processing failed, skipping");
                    continue;
                }
            };
            ctx.processed.fetch_add(1, Ordering::Relaxed);

            for item in outcome.items {
                // Blocking here is the natural backpressure point.
                if ctx.results.send(item).await.is_err() {
                    debug!(worker = id, "results channel closed, worker exiting");
                    return;
                }
            }

            if !outcome.outbound.is_empty() {
                debug!(
                    worker = id,
                    url,
                    links = outcome.outbound.len(),
                    "queueing outbound links"
                );
                // Posted as an independent task so a full worklist can
                // never stall this worker.
                let tx = ctx.work_tx.clone();
                let links = outcome.outbound;
                tokio::spawn(async move {
                    let _ = tx.send(links).await;
                });
            }
        }
    }
}

/// Storage worker: buffer items, flush on batch size, on the interval
/// tick, and once more on cancellation or end-of-stream.
async fn storage_worker<T, S>(
    sink: Arc<S>,
    mut results: mpsc::Receiver<T>,
    mut stopped: watch::Receiver<bool>,
    batch_size: usize,
) where
    T: Send,
    S: Sink<T>,
{
    let mut buffer: Vec<T> = Vec::with_capacity(batch_size);
    let mut ticker = tokio::time::interval(FLUSH_INTERVAL);

    loop {
        tokio::select! {
            _ = stopped.changed() => {
                flush(sink.as_ref(), &mut buffer).await;
                debug!("storage worker exiting on shutdown");
                return;
            }
            maybe_item = results.recv() => match maybe_item {
                Some(item) => {
                    buffer.push(item);
                    if buffer.len() >= batch_size {
                        flush(sink.as_ref(), &mut buffer).await;
                    }
                }
                None => {
                    flush(sink.as_ref(), &mut buffer).await;
                    debug!("storage worker exiting, results stream ended");
                    return;
                }
            },
            _ = ticker.tick() => {
                flush(sink.as_ref(), &mut buffer).await;
            }
        }
    }
}

/// Save and clear the buffer. A failed save is logged and the batch
/// dropped; retrying is deliberately not this layer's job.
async fn flush<T, S: Sink<T>>(sink: &S, buffer: &mut Vec<T>) {
    if buffer.is_empty() {
        return;
    }
    let batch: Vec<T> = buffer.drain(..).collect();
    match sink.save(&batch).await {
        Ok(()) => info!(size = batch.len(), "saved batch"),
        Err(e) => warn!(size = batch.len(), error = %e, "batch save failed, dropping"),
    }
}
