//! Periodic job producer

use std::time::Duration;

use crate::queue::{Category, Job, JobQueue, Trigger};

/// Enqueues one job per enabled category every interval
#[derive(Debug, Clone)]
pub struct Scheduler {
    queue: JobQueue,
    categories: Vec<Category>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(queue: JobQueue, categories: Vec<Category>, interval: Duration) -> Self {
        Self {
            queue,
            categories,
            interval,
        }
    }

    /// Enqueue this tick's jobs and return how many were queued
    pub fn tick(&self) -> usize {
        for category in &self.categories {
            self.queue.enqueue(Job::new(*category, Trigger::Scheduler));
        }
        self.categories.len()
    }

    /// Tick immediately, then after every interval, forever
    pub async fn run(self) {
        tracing::info!(
            interval_minutes = self.interval.as_secs() / 60,
            "Scheduler started"
        );
        if self.categories.is_empty() {
            tracing::warn!("No categories enabled! Check ENABLE_RADARR / ENABLE_SONARR and credentials");
        }

        loop {
            let queued = self.tick();
            tracing::debug!(
                queued,
                sleep_secs = self.interval.as_secs(),
                "Scheduler sleeping"
            );
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_tick_enqueues_one_job_per_category() {
        let queue = JobQueue::new();
        let scheduler = Scheduler::new(
            queue.clone(),
            vec![Category::Movies, Category::Series],
            Duration::from_secs(60),
        );

        assert_eq!(scheduler.tick(), 2);
        assert_eq!(
            queue.try_dequeue(),
            Some(Job::new(Category::Movies, Trigger::Scheduler))
        );
        assert_eq!(
            queue.try_dequeue(),
            Some(Job::new(Category::Series, Trigger::Scheduler))
        );
        assert!(queue.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_every_interval() {
        let queue = JobQueue::new();
        let scheduler = Scheduler::new(
            queue.clone(),
            vec![Category::Series],
            Duration::from_secs(30 * 60),
        );
        let handle = tokio::spawn(scheduler.run());

        // First tick happens right away
        tokio::task::yield_now().await;
        assert_eq!(queue.len(), 1);

        tokio::time::sleep(Duration::from_secs(29 * 60)).await;
        assert_eq!(queue.len(), 1);

        tokio::time::sleep(Duration::from_secs(2 * 60)).await;
        assert_eq!(queue.len(), 2);

        tokio::time::sleep(Duration::from_secs(30 * 60)).await;
        assert_eq!(queue.len(), 3);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn test_no_categories_warns_and_enqueues_nothing() {
        let queue = JobQueue::new();
        let scheduler = Scheduler::new(queue.clone(), vec![], Duration::from_secs(60));
        let handle = tokio::spawn(scheduler.run());

        tokio::time::sleep(Duration::from_secs(300)).await;

        assert!(queue.is_empty());
        assert!(logs_contain("No categories enabled"));
        assert!(!handle.is_finished());
        handle.abort();
    }
}
