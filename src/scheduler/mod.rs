//! Automated reply scheduling.
//!
//! [`ResponseScheduler::schedule`] turns an inbound event, the governing
//! settings and the conversation counters into a [`ScheduleDecision`].
//! It never waits: `send_after` directives are handed to the
//! [`directives::DirectiveRegistry`] (or any external queue) to fire later.

pub mod business_hours;
pub mod directives;
pub mod locks;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::conversation::{ConversationState, InboundEvent};
use crate::models::settings::ResponseSettings;

/// What to do with an inbound message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum ScheduleDecision {
    /// The trigger is not governed by the policy.
    Skip,
    /// Automation is restricted to business hours and the office is closed.
    DeferToNextBusinessWindow,
    /// The conversation used up its automated attempts; escalate instead.
    SkipMaxAttemptsReached,
    /// Send an automated reply after the configured delay.
    SendAfter {
        /// Minutes to wait before sending.
        #[serde(rename = "delayMinutes")]
        delay_minutes: i64,
    },
}

impl ScheduleDecision {
    /// Whether the decision dispatches a reply.
    #[must_use]
    pub fn sends(self) -> bool {
        matches!(self, Self::SendAfter { .. })
    }
}

/// Decides whether and when automated replies go out.
pub struct ResponseScheduler;

impl ResponseScheduler {
    /// Decide how to answer `event`.
    ///
    /// Short-circuits, in order:
    /// 1. Trigger not in `settings.triggers` → `Skip`.
    /// 2. Business-hours-only policy outside business hours →
    ///    `DeferToNextBusinessWindow`.
    /// 3. `attempts_so_far >= max_attempts` → `SkipMaxAttemptsReached`.
    /// 4. Otherwise → `SendAfter(delay_minutes)`.
    ///
    /// A pure function of its inputs: repeated calls with the same values
    /// yield the same decision, so callers may retry freely.
    #[must_use]
    pub fn schedule(
        event: &InboundEvent,
        settings: &ResponseSettings,
        state: &ConversationState,
    ) -> ScheduleDecision {
        let decision = if !settings.governs(event.trigger) {
            ScheduleDecision::Skip
        } else if settings.business_hours_only && !state.is_business_hours {
            ScheduleDecision::DeferToNextBusinessWindow
        } else if state.attempts_so_far >= settings.max_attempts {
            ScheduleDecision::SkipMaxAttemptsReached
        } else {
            ScheduleDecision::SendAfter {
                delay_minutes: settings.delay_minutes,
            }
        };

        debug!(
            conversation_id = %event.conversation_id,
            trigger = %event.trigger,
            ?decision,
            "schedule decision"
        );
        decision
    }
}
