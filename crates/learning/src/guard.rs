use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

/// In-process set of paths with a recalculation in flight.
#[derive(Debug, Clone, Default)]
pub struct PathGuards {
    held: Arc<Mutex<HashSet<String>>>,
}

/// Releases its path when dropped.
#[derive(Debug)]
pub struct PathGuard {
    held: Arc<Mutex<HashSet<String>>>,
    path_id: String,
}

impl PathGuards {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `path_id`, or `None` when another task already holds it.
    #[must_use]
    pub fn try_acquire(&self, path_id: &str) -> Option<PathGuard> {
        let mut held = lock(&self.held);
        if !held.insert(path_id.to_string()) {
            return None;
        }
        Some(PathGuard {
            held: Arc::clone(&self.held),
            path_id: path_id.to_string(),
        })
    }
}

impl PathGuard {
    #[must_use]
    pub fn path_id(&self) -> &str {
        &self.path_id
    }
}

impl Drop for PathGuard {
    fn drop(&mut self) {
        lock(&self.held).remove(&self.path_id);
    }
}

// A panic while holding the set cannot leave it half-updated.
fn lock(held: &Mutex<HashSet<String>>) -> MutexGuard<'_, HashSet<String>> {
    held.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
