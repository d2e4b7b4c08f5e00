//! Single-flight guard for per-project consistency runs.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

/// Set of projects with a run in flight.
#[derive(Debug, Clone, Default)]
pub struct RunRegistry {
    active: Arc<Mutex<HashSet<Uuid>>>,
}

/// Held for the duration of one run; releases the project on drop.
#[derive(Debug)]
pub struct RunPermit {
    active: Arc<Mutex<HashSet<Uuid>>>,
    project_id: Uuid,
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `project_id` without waiting. `None` if a run already holds it.
    pub fn try_acquire(&self, project_id: Uuid) -> Option<RunPermit> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(project_id) {
            return None;
        }
        Some(RunPermit {
            active: Arc::clone(&self.active),
            project_id,
        })
    }

    pub fn is_running(&self, project_id: Uuid) -> bool {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&project_id)
    }
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.project_id);
    }
}
