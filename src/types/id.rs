// ABOUTME: Phantom-typed identifiers for compile-time type safety.
// ABOUTME: Keeps task IDs and exec IDs from being swapped by accident.

use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

/// What an [`Id`] identifies. Only used as a type parameter.
pub trait IdKind {
    /// Name shown in `Debug` output.
    const NAME: &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExecMarker;

impl IdKind for TaskMarker {
    const NAME: &'static str = "TaskId";
}

impl IdKind for ExecMarker {
    const NAME: &'static str = "ExecId";
}

/// A string identifier tagged with the kind of thing it names.
///
/// A `TaskId` cannot be passed where an `ExecId` is expected. Serializes as
/// the bare string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent, bound = "")]
#[must_use = "IDs reference resources and should not be ignored"]
pub struct Id<K> {
    value: String,
    #[serde(skip)]
    kind: PhantomData<K>,
}

impl<K> Id<K> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            kind: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }
}

impl Id<ExecMarker> {
    /// The reserved ID of a task's init exec (the empty string).
    pub fn init() -> Self {
        Self::new(String::new())
    }

    /// Whether this ID addresses the init exec.
    pub fn is_init(&self) -> bool {
        self.value.is_empty()
    }
}

impl<K: IdKind> std::fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple(K::NAME).field(&self.value).finish()
    }
}

impl<K> std::fmt::Display for Id<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

impl<K> From<&str> for Id<K> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<K> From<String> for Id<K> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

pub type TaskId = Id<TaskMarker>;
pub type ExecId = Id<ExecMarker>;
