//! Pool worker

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::asset::SyncOutcome;
use crate::job::{Job, JobHandler};

/// Executes one job at a time
///
/// While idle, the worker's private job channel sits in the pool's idle
/// queue. The dispatcher takes it out to hand over exactly one job, and the
/// worker puts it back once that job is done.
pub(crate) struct Worker {
    name: String,
    handler: Arc<dyn JobHandler>,
    idle: mpsc::Sender<mpsc::Sender<Job>>,
    quit: CancellationToken,
}

impl Worker {
    pub(crate) fn new(
        name: String,
        handler: Arc<dyn JobHandler>,
        idle: mpsc::Sender<mpsc::Sender<Job>>,
        quit: CancellationToken,
    ) -> Self {
        Self {
            name,
            handler,
            idle,
            quit,
        }
    }

    pub(crate) async fn run(self) {
        info!(worker = %self.name, "Starting worker");
        let (job_tx, mut job_rx) = mpsc::channel::<Job>(1);

        loop {
            tokio::select! {
                biased;
                _ = self.quit.cancelled() => break,
                registered = self.idle.send(job_tx.clone()) => {
                    if registered.is_err() {
                        break;
                    }
                }
            }

            tokio::select! {
                biased;
                job = job_rx.recv() => match job {
                    Some(job) => self.process(job).await,
                    None => break,
                },
                _ = self.quit.cancelled() => break,
            }
        }

        debug!(worker = %self.name, "Stopped worker");
    }

    async fn process(&self, job: Job) {
        info!(worker = %self.name, path = %job.relative_path, "Got a job");

        match self.handler.handle(&job.relative_path, &job.info).await {
            Ok(SyncOutcome::Uploaded(entry)) => info!(
                worker = %self.name,
                path = %job.relative_path,
                file_id = %entry.remote_id,
                "Job done"
            ),
            Ok(outcome) => debug!(
                worker = %self.name,
                path = %job.relative_path,
                outcome = ?outcome,
                "Job skipped"
            ),
            Err(e) => error!(
                worker = %self.name,
                path = %job.relative_path,
                error = %e,
                "Failed to sync asset"
            ),
        }
    }
}
