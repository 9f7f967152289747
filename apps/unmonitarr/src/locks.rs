//! One exclusive lock per category

use std::collections::HashMap;

use tokio::sync::{Mutex, MutexGuard};

use crate::queue::Category;

/// Serializes reconciliation runs per category
///
/// Built once for every known category and never resized, so a lookup can
/// only miss for a category that does not exist.
#[derive(Debug)]
pub struct CategoryLocks {
    locks: HashMap<Category, Mutex<()>>,
}

impl CategoryLocks {
    pub fn new() -> Self {
        Self {
            locks: Category::ALL
                .into_iter()
                .map(|category| (category, Mutex::new(())))
                .collect(),
        }
    }

    /// Wait for exclusive access to a category; released when the guard drops
    pub async fn acquire(&self, category: Category) -> Option<MutexGuard<'_, ()>> {
        match self.locks.get(&category) {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }

    /// Whether a run for this category currently holds the lock
    pub fn is_locked(&self, category: Category) -> bool {
        self.locks
            .get(&category)
            .is_some_and(|lock| lock.try_lock().is_err())
    }

    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.locks.keys().copied()
    }
}

impl Default for CategoryLocks {
    fn default() -> Self {
        Self::new()
    }
}
