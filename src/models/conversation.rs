//! Runtime conversation inputs supplied by upstream collaborators.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::catalog::ResponseTrigger;

/// Inbound tenant message, already classified by trigger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InboundEvent {
    /// Conversation the message belongs to.
    pub conversation_id: String,
    /// Detected trigger.
    pub trigger: ResponseTrigger,
    /// Raw message text, when available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Conversation-scoped counters consulted by the scheduler.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    /// Automated replies already sent in this conversation.
    #[serde(default)]
    pub attempts_so_far: i64,
    /// Whether the current instant falls inside business hours.
    #[serde(default)]
    pub is_business_hours: bool,
}

/// Snapshot of facts about a conversation used for escalation decisions.
///
/// Defaults describe a quiet conversation with neutral sentiment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationFacts {
    /// Minutes since an agent (human or automated) last replied.
    #[serde(default)]
    pub elapsed_minutes_since_last_agent_reply: i64,
    /// Sentiment on a 0 (hostile) to 100 (delighted) scale.
    #[serde(default = "neutral_sentiment")]
    pub sentiment_score: u8,
    /// Resolution attempts so far.
    #[serde(default)]
    pub attempt_count: i64,
    /// Watched keywords found in the conversation.
    #[serde(default)]
    pub matched_keywords: BTreeSet<String>,
    /// Whether the request needs human judgment.
    #[serde(default)]
    pub is_complex_request: bool,
    /// Optional 0–100 complexity estimate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity_score: Option<u8>,
}

fn neutral_sentiment() -> u8 {
    50
}

impl Default for ConversationFacts {
    fn default() -> Self {
        Self {
            elapsed_minutes_since_last_agent_reply: 0,
            sentiment_score: neutral_sentiment(),
            attempt_count: 0,
            matched_keywords: BTreeSet::new(),
            is_complex_request: false,
            complexity_score: None,
        }
    }
}
