//! Upload jobs and outstanding-job accounting

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

use crate::asset::SyncOutcome;
use crate::error::Result;
use crate::path::PathInfo;

/// Work executed by a pool worker for each job
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, path: &str, info: &PathInfo) -> Result<SyncOutcome>;
}

/// One discovered file waiting to be synced
///
/// Holds a [`JobTicket`]; dropping the job, processed or not, signals its
/// completion to the submitter.
#[derive(Debug)]
pub struct Job {
    pub relative_path: String,
    pub info: PathInfo,
    _ticket: JobTicket,
}

impl Job {
    pub fn new(relative_path: impl Into<String>, info: PathInfo, ticket: JobTicket) -> Self {
        Self {
            relative_path: relative_path.into(),
            info,
            _ticket: ticket,
        }
    }
}

/// Counter of submitted jobs that have not signalled completion yet
#[derive(Debug, Clone)]
pub struct OutstandingJobs {
    count: Arc<watch::Sender<usize>>,
}

impl OutstandingJobs {
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self {
            count: Arc::new(count),
        }
    }

    /// Count one more outstanding job until the returned ticket is dropped
    pub fn ticket(&self) -> JobTicket {
        self.count.send_modify(|count| *count += 1);
        JobTicket {
            count: Arc::clone(&self.count),
        }
    }

    pub fn count(&self) -> usize {
        *self.count.borrow()
    }

    /// Wait until every ticket handed out so far has been dropped
    pub async fn wait_idle(&self) {
        let mut updates = self.count.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = updates.wait_for(|count| *count == 0).await;
    }
}

impl Default for OutstandingJobs {
    fn default() -> Self {
        Self::new()
    }
}

/// Completion signal for one job
#[derive(Debug)]
pub struct JobTicket {
    count: Arc<watch::Sender<usize>>,
}

impl Drop for JobTicket {
    fn drop(&mut self) {
        self.count
            .send_modify(|count| *count = count.saturating_sub(1));
    }
}
