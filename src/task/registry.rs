// ABOUTME: Concurrency-safe registry of a task's secondary execs.
// ABOUTME: Every operation is one critical section; iteration works on snapshots.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use super::error::TaskError;
use crate::exec::ShimExec;
use crate::types::{ExecId, TaskId};

/// Map from exec ID to exec, safe to share between concurrent callers.
#[derive(Default)]
pub struct ExecRegistry {
    execs: RwLock<HashMap<ExecId, Arc<dyn ShimExec>>>,
}

impl ExecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `exec` if its ID is free and `admit` allows it.
    ///
    /// `admit` runs while the registry is locked for writing, so no other
    /// insert or removal can interleave with the check.
    pub fn insert_checked(
        &self,
        task: &TaskId,
        exec: Arc<dyn ShimExec>,
        admit: impl FnOnce() -> Result<(), TaskError>,
    ) -> Result<(), TaskError> {
        let mut execs = self.execs.write();
        admit()?;
        match execs.entry(exec.id().clone()) {
            Entry::Occupied(entry) => Err(TaskError::AlreadyExists {
                task: task.clone(),
                exec: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(exec);
                Ok(())
            }
        }
    }

    pub fn get(&self, id: &ExecId) -> Option<Arc<dyn ShimExec>> {
        self.execs.read().get(id).cloned()
    }

    pub fn contains(&self, id: &ExecId) -> bool {
        self.execs.read().contains_key(id)
    }

    pub fn remove(&self, id: &ExecId) -> Option<Arc<dyn ShimExec>> {
        self.execs.write().remove(id)
    }

    /// All registered execs at one instant. The lock is released on return.
    pub fn snapshot(&self) -> Vec<Arc<dyn ShimExec>> {
        self.execs.read().values().cloned().collect()
    }

    /// First registered exec that has not exited, if any.
    pub fn first_active(&self) -> Option<Arc<dyn ShimExec>> {
        self.execs
            .read()
            .values()
            .find(|exec| !exec.state().is_exited())
            .cloned()
    }

    /// Drop every entry, returning how many there were.
    pub fn clear(&self) -> usize {
        let mut execs = self.execs.write();
        let count = execs.len();
        execs.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.execs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.execs.read().is_empty()
    }
}

impl std::fmt::Debug for ExecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let execs = self.execs.read();
        f.debug_set().entries(execs.keys()).finish()
    }
}
