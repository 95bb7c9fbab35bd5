//! # Worker Pool
//!
//! Bounded-concurrency execution of upload jobs.
//!
//! ## Overview
//!
//! - `worker_count` workers (at least one), each running one job at a time
//! - Idle workers register a private job channel in a shared idle queue
//! - A single dispatcher reads the job queue and, per job, waits for any idle
//!   worker and hands the job over
//!
//! A job is only ever given to an idle worker, so at most `worker_count`
//! jobs run at once however deep the job queue gets. There is no fairness
//! between workers.
//!
//! Stopping cancels the pool token, whose children are the workers' quit
//! tokens. A job already running finishes; jobs still queued are dropped,
//! which releases their tickets.

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::job::{Job, JobHandler};
use crate::worker::Worker;

pub struct WorkerPool {
    worker_count: usize,
    shutdown: CancellationToken,
    workers: Vec<JoinHandle<()>>,
    dispatcher: JoinHandle<()>,
}

impl WorkerPool {
    /// Spawn the workers and the dispatcher reading from `jobs`
    pub fn start(worker_count: usize, jobs: mpsc::Receiver<Job>, handler: Arc<dyn JobHandler>) -> Self {
        let worker_count = worker_count.max(1);
        let shutdown = CancellationToken::new();
        let (idle_tx, idle_rx) = mpsc::channel(worker_count);

        let workers = (0..worker_count)
            .map(|i| {
                let worker = Worker::new(
                    format!("worker-{}", i),
                    Arc::clone(&handler),
                    idle_tx.clone(),
                    shutdown.child_token(),
                );
                tokio::spawn(worker.run())
            })
            .collect();

        let dispatcher = tokio::spawn(dispatch(jobs, idle_rx, shutdown.clone()));

        info!(workers = worker_count, "Started worker pool");
        Self {
            worker_count,
            shutdown,
            workers,
            dispatcher,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    /// Stop every worker and the dispatcher, waiting for running jobs to finish
    pub async fn stop(self) {
        self.shutdown.cancel();

        for worker in self.workers {
            if let Err(e) = worker.await {
                warn!(error = %e, "Worker task ended abnormally");
            }
        }
        if let Err(e) = self.dispatcher.await {
            warn!(error = %e, "Dispatcher task ended abnormally");
        }

        info!("Stopped worker pool");
    }
}

async fn dispatch(
    mut jobs: mpsc::Receiver<Job>,
    mut idle: mpsc::Receiver<mpsc::Sender<Job>>,
    shutdown: CancellationToken,
) {
    loop {
        let mut job = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            job = jobs.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        // Offer the job to idle workers until one accepts it.
        loop {
            let worker = tokio::select! {
                biased;
                _ = shutdown.cancelled() => return,
                worker = idle.recv() => match worker {
                    Some(worker) => worker,
                    None => return,
                },
            };

            match worker.send(job).await {
                Ok(()) => break,
                Err(mpsc::error::SendError(returned)) => {
                    debug!(path = %returned.relative_path, "Skipping stale worker registration");
                    job = returned;
                }
            }
        }
    }

    debug!("Dispatcher stopped");
}
