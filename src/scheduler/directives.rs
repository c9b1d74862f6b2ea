//! Pending `send_after` directives.
//!
//! Holds at most one pending directive per conversation. Directives are
//! drained by [`DirectiveRegistry::due`] once their fire time passes, or
//! cancelled when a human reply resolves the conversation first.
//! Cancellation is idempotent: cancelling a fired, cancelled or unknown
//! directive is a no-op.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A scheduled automated reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Directive {
    /// Unique directive identifier.
    pub id: String,
    /// Conversation the reply belongs to.
    pub conversation_id: String,
    /// Template chosen for the reply, if already selected.
    pub template_id: Option<String>,
    /// Earliest instant the reply may be sent.
    pub fire_at: DateTime<Utc>,
}

/// In-process registry of pending directives keyed by conversation.
#[derive(Debug, Default)]
pub struct DirectiveRegistry {
    pending: Mutex<HashMap<String, Directive>>,
}

impl DirectiveRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directive firing at `fire_at`, replacing any directive
    /// still pending for the same conversation.
    pub async fn enqueue(
        &self,
        conversation_id: &str,
        template_id: Option<String>,
        fire_at: DateTime<Utc>,
    ) -> Directive {
        let directive = Directive {
            id: Uuid::new_v4().to_string(),
            conversation_id: conversation_id.to_owned(),
            template_id,
            fire_at,
        };

        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.insert(conversation_id.to_owned(), directive.clone()) {
            debug!(
                conversation_id,
                replaced = %previous.id,
                "replaced pending directive"
            );
        }
        directive
    }

    /// Register a directive firing `delay_minutes` after `now`.
    pub async fn enqueue_after(
        &self,
        conversation_id: &str,
        template_id: Option<String>,
        delay_minutes: i64,
        now: DateTime<Utc>,
    ) -> Directive {
        let fire_at = now + chrono::Duration::minutes(delay_minutes.max(0));
        self.enqueue(conversation_id, template_id, fire_at).await
    }

    /// Cancel the pending directive of `conversation_id`.
    ///
    /// Returns the cancelled directive, or `None` when nothing was pending.
    pub async fn cancel(&self, conversation_id: &str) -> Option<Directive> {
        let removed = self.pending.lock().await.remove(conversation_id);
        match &removed {
            Some(directive) => info!(
                conversation_id,
                directive_id = %directive.id,
                "cancelled pending directive"
            ),
            None => debug!(conversation_id, "no pending directive to cancel"),
        }
        removed
    }

    /// Drain directives whose fire time is at or before `now`, earliest
    /// first.
    pub async fn due(&self, now: DateTime<Utc>) -> Vec<Directive> {
        let mut pending = self.pending.lock().await;
        let due_ids: Vec<String> = pending
            .iter()
            .filter(|(_, d)| d.fire_at <= now)
            .map(|(conversation_id, _)| conversation_id.clone())
            .collect();

        let mut fired: Vec<Directive> = due_ids
            .iter()
            .filter_map(|conversation_id| pending.remove(conversation_id))
            .collect();
        fired.sort_by(|a, b| a.fire_at.cmp(&b.fire_at).then_with(|| a.id.cmp(&b.id)));
        fired
    }

    /// Pending directive for `conversation_id`, if any.
    pub async fn get(&self, conversation_id: &str) -> Option<Directive> {
        self.pending.lock().await.get(conversation_id).cloned()
    }

    /// Number of pending directives.
    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Whether no directive is pending.
    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }
}

/// Spawn a task that drains due directives every `tick` and forwards them
/// to `sink` until `cancel` fires.
#[must_use]
pub fn spawn_directive_pump(
    registry: Arc<DirectiveRegistry>,
    tick: Duration,
    sink: mpsc::Sender<Directive>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(tick);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("directive pump shutting down");
                    break;
                }
                _ = interval.tick() => {
                    for directive in registry.due(Utc::now()).await {
                        if sink.send(directive).await.is_err() {
                            warn!("directive receiver dropped, stopping pump");
                            return;
                        }
                    }
                }
            }
        }
    })
}
