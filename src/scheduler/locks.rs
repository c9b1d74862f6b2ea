//! Per-conversation serialization.
//!
//! Scheduler and evaluator decisions read conversation-scoped counters, so
//! work for one conversation must not interleave. Distinct conversations
//! still run in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily created async mutex per conversation id.
#[derive(Debug, Default)]
pub struct ConversationLocks {
    locks: std::sync::Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ConversationLocks {
    /// Create an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `conversation_id`.
    ///
    /// The returned guard releases the conversation when dropped.
    pub async fn acquire(&self, conversation_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self
                .locks
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            Arc::clone(table.entry(conversation_id.to_owned()).or_default())
        };
        lock.lock_owned().await
    }

    /// Drop the entry of a conversation nobody is holding or waiting on.
    ///
    /// Returns `true` if the entry was removed.
    pub fn release_idle(&self, conversation_id: &str) -> bool {
        let mut table = self
            .locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let idle = table
            .get(conversation_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if idle {
            table.remove(conversation_id);
        }
        idle
    }

    /// Number of tracked conversations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Whether no conversation is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
