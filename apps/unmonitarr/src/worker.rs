//! Worker loop
//!
//! Drains the job queue one job at a time, serializing runs per category via
//! [`CategoryLocks`]. A failing or panicking handler only fails its own job.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinError;

use crate::error::{WorkerError, WorkerResult};
use crate::jobs::{JobHandler, ReconcileResult};
use crate::locks::CategoryLocks;
use crate::queue::{Category, Job, JobQueue};

/// Handlers by category; only enabled categories are registered
pub type HandlerRegistry = HashMap<Category, Arc<dyn JobHandler>>;

/// The only consumer of the job queue
#[derive(Clone)]
pub struct Worker {
    queue: JobQueue,
    locks: Arc<CategoryLocks>,
    handlers: HandlerRegistry,
}

impl Worker {
    pub fn new(queue: JobQueue, locks: Arc<CategoryLocks>) -> Self {
        Self {
            queue,
            locks,
            handlers: HashMap::new(),
        }
    }

    /// Register the handler for a category, replacing any previous one
    pub fn with_handler(mut self, category: Category, handler: Arc<dyn JobHandler>) -> Self {
        self.handlers.insert(category, handler);
        self
    }

    pub fn handles(&self, category: Category) -> bool {
        self.handlers.contains_key(&category)
    }

    /// Process jobs for the lifetime of the process
    pub async fn run(self) {
        let mut categories: Vec<_> = self.handlers.keys().map(Category::as_str).collect();
        categories.sort_unstable();
        tracing::info!(handlers = ?categories, "Job worker started and waiting for jobs");

        loop {
            let job = self.queue.dequeue().await;
            self.process(job).await;
        }
    }

    /// Run one job and log its outcome; never fails
    pub async fn process(&self, job: Job) {
        match self.dispatch(job).await {
            Ok(result) => {
                tracing::info!(
                    category = %job.category,
                    triggered_by = %job.trigger,
                    assessed = result.assessed,
                    managed = result.managed(),
                    "Completed {} job",
                    job.category
                );
            }
            Err(e) => {
                tracing::error!(
                    category = %job.category,
                    triggered_by = %job.trigger,
                    "Error processing {} job",
                    job.category
                );
                e.log();
            }
        }
    }

    /// Run the category's handler while holding the category lock
    pub async fn dispatch(&self, job: Job) -> WorkerResult<ReconcileResult> {
        let handler = self
            .handlers
            .get(&job.category)
            .cloned()
            .ok_or(WorkerError::NoHandler(job.category))?;

        let _guard = self
            .locks
            .acquire(job.category)
            .await
            .ok_or_else(|| WorkerError::Internal(format!("no lock for category {}", job.category)))?;

        tracing::info!(
            category = %job.category,
            triggered_by = %job.trigger,
            "Starting {} job",
            job.category
        );

        let trigger = job.trigger;
        tokio::spawn(async move { handler.run(trigger).await })
            .await
            .map_err(|e| join_error(job.category, e))?
    }
}

fn join_error(category: Category, err: JoinError) -> WorkerError {
    if err.is_panic() {
        WorkerError::HandlerPanicked {
            category,
            message: panic_message(err.into_panic()),
        }
    } else {
        WorkerError::Internal(format!("{category} job was cancelled"))
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::Trigger;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records calls and how many runs overlapped
    #[derive(Default)]
    struct Probe {
        calls: Mutex<Vec<Trigger>>,
        active: AtomicUsize,
        max_active: AtomicUsize,
    }

    struct ProbeHandler {
        probe: Arc<Probe>,
        hold: Duration,
    }

    #[async_trait]
    impl JobHandler for ProbeHandler {
        async fn run(&self, trigger: Trigger) -> WorkerResult<ReconcileResult> {
            let active = self.probe.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.probe.max_active.fetch_max(active, Ordering::SeqCst);
            tokio::time::sleep(self.hold).await;
            self.probe.calls.lock().unwrap().push(trigger);
            self.probe.active.fetch_sub(1, Ordering::SeqCst);
            Ok(ReconcileResult {
                assessed: 1,
                ..ReconcileResult::default()
            })
        }
    }

    struct FailingHandler;

    #[async_trait]
    impl JobHandler for FailingHandler {
        async fn run(&self, _trigger: Trigger) -> WorkerResult<ReconcileResult> {
            Err(WorkerError::tag_creation("auto-unmonitored", "boom"))
        }
    }

    struct PanickingHandler;

    #[async_trait]
    impl JobHandler for PanickingHandler {
        async fn run(&self, _trigger: Trigger) -> WorkerResult<ReconcileResult> {
            panic!("catalog returned nonsense");
        }
    }

    fn probe_handler(probe: &Arc<Probe>, hold_ms: u64) -> Arc<dyn JobHandler> {
        Arc::new(ProbeHandler {
            probe: Arc::clone(probe),
            hold: Duration::from_millis(hold_ms),
        })
    }

    #[tokio::test]
    async fn test_dispatch_runs_registered_handler() {
        let probe = Arc::new(Probe::default());
        let worker = Worker::new(JobQueue::new(), Arc::new(CategoryLocks::new()))
            .with_handler(Category::Movies, probe_handler(&probe, 0));

        let result = worker
            .dispatch(Job::new(Category::Movies, Trigger::Webhook))
            .await
            .unwrap();

        assert_eq!(result.assessed, 1);
        assert_eq!(*probe.calls.lock().unwrap(), vec![Trigger::Webhook]);
    }

    #[tokio::test]
    async fn test_missing_handler_is_rejected() {
        let worker = Worker::new(JobQueue::new(), Arc::new(CategoryLocks::new()));
        let err = worker
            .dispatch(Job::new(Category::Series, Trigger::Scheduler))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::NoHandler(Category::Series)));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let locks = Arc::new(CategoryLocks::new());
        let worker = Worker::new(JobQueue::new(), Arc::clone(&locks))
            .with_handler(Category::Movies, Arc::new(PanickingHandler));

        let err = worker
            .dispatch(Job::new(Category::Movies, Trigger::Webhook))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkerError::HandlerPanicked { category: Category::Movies, ref message }
                if message == "catalog returned nonsense"
        ));
        assert!(!locks.is_locked(Category::Movies));
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_loop() {
        let queue = JobQueue::new();
        let probe = Arc::new(Probe::default());
        let worker = Worker::new(queue.clone(), Arc::new(CategoryLocks::new()))
            .with_handler(Category::Movies, Arc::new(FailingHandler))
            .with_handler(Category::Series, probe_handler(&probe, 0));

        queue.enqueue(Job::new(Category::Movies, Trigger::Webhook));
        queue.enqueue(Job::new(Category::Series, Trigger::Scheduler));
        let handle = tokio::spawn(worker.run());

        tokio::time::timeout(Duration::from_secs(2), async {
            while probe.calls.lock().unwrap().is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("series job should run after the failing movies job");

        assert!(!handle.is_finished());
        handle.abort();
    }

    #[tokio::test]
    async fn test_same_category_never_overlaps() {
        let queue = JobQueue::new();
        let locks = Arc::new(CategoryLocks::new());
        let probe = Arc::new(Probe::default());
        let worker = Worker::new(queue.clone(), Arc::clone(&locks))
            .with_handler(Category::Series, probe_handler(&probe, 30));

        // Two consumers sharing one lock set
        let first = tokio::spawn(worker.clone().run());
        let second = tokio::spawn(worker.run());
        for _ in 0..4 {
            queue.enqueue(Job::new(Category::Series, Trigger::Webhook));
        }

        tokio::time::timeout(Duration::from_secs(5), async {
            while probe.calls.lock().unwrap().len() < 4 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("all jobs should finish");

        assert_eq!(probe.max_active.load(Ordering::SeqCst), 1);
        first.abort();
        second.abort();
    }

    #[tokio::test]
    async fn test_different_categories_may_overlap() {
        let queue = JobQueue::new();
        let probe = Arc::new(Probe::default());
        let worker = Worker::new(queue.clone(), Arc::new(CategoryLocks::new()))
            .with_handler(Category::Movies, probe_handler(&probe, 100))
            .with_handler(Category::Series, probe_handler(&probe, 100));

        let first = tokio::spawn(worker.clone().run());
        let second = tokio::spawn(worker.run());
        queue.enqueue(Job::new(Category::Movies, Trigger::Webhook));
        queue.enqueue(Job::new(Category::Series, Trigger::Webhook));

        tokio::time::timeout(Duration::from_secs(5), async {
            while probe.calls.lock().unwrap().len() < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("both jobs should finish");

        assert_eq!(probe.max_active.load(Ordering::SeqCst), 2);
        first.abort();
        second.abort();
    }

    #[test]
    fn test_panic_message_extraction() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new("owned".to_string())), "owned");
        assert_eq!(panic_message(Box::new(42)), "unknown panic");
    }
}
