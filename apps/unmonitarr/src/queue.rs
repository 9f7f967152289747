//! Job definitions and the in-process job queue
//!
//! The queue is an unbounded FIFO shared by every producer (scheduler,
//! webhook handlers) and drained by the single worker loop.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::Notify;

use crate::error::WorkerError;

/// A managed catalog type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Category {
    /// Radarr
    #[serde(rename = "radarr")]
    Movies,
    /// Sonarr
    #[serde(rename = "sonarr")]
    Series,
}

impl Category {
    /// Every category the system knows about, enabled or not
    pub const ALL: [Category; 2] = [Category::Movies, Category::Series];

    /// Name of the service backing this category
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Movies => "radarr",
            Category::Series => "sonarr",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = WorkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "radarr" | "movies" | "movie" => Ok(Category::Movies),
            "sonarr" | "series" | "tv" => Ok(Category::Series),
            _ => Err(WorkerError::UnknownCategory(s.to_string())),
        }
    }
}

/// What caused a job to be queued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Scheduler,
    Webhook,
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Scheduler => f.write_str("scheduler"),
            Trigger::Webhook => f.write_str("webhook"),
        }
    }
}

/// One reconciliation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub category: Category,
    pub trigger: Trigger,
}

impl Job {
    pub fn new(category: Category, trigger: Trigger) -> Self {
        Self { category, trigger }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (triggered_by={})", self.category, self.trigger)
    }
}

#[derive(Debug, Default)]
struct Inner {
    jobs: Mutex<VecDeque<Job>>,
    available: Notify,
}

/// Unbounded, ordered, thread-safe job queue
///
/// Cloning yields another handle to the same queue. No deduplication: the
/// same job may be queued any number of times and each copy runs.
#[derive(Debug, Clone, Default)]
pub struct JobQueue {
    inner: Arc<Inner>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job to the tail; never blocks, never drops
    pub fn enqueue(&self, job: Job) {
        tracing::debug!(job = %job, "Queuing job");
        self.jobs().push_back(job);
        self.inner.available.notify_one();
    }

    /// Wait until a job is available and remove it from the head
    pub async fn dequeue(&self) -> Job {
        loop {
            if let Some(job) = self.try_dequeue() {
                return job;
            }
            self.inner.available.notified().await;
        }
    }

    /// Remove the head job if there is one
    pub fn try_dequeue(&self) -> Option<Job> {
        self.jobs().pop_front()
    }

    pub fn len(&self) -> usize {
        self.jobs().len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs().is_empty()
    }

    // A panic while holding this lock cannot leave the deque half-updated.
    fn jobs(&self) -> MutexGuard<'_, VecDeque<Job>> {
        self.inner
            .jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
