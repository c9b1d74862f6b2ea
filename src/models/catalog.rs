//! Static rule catalog: triggers, escalation conditions, actions,
//! priorities and the tone/style presets offered to operators.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Category of inbound tenant message a response policy may govern.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ResponseTrigger {
    /// Messages received outside business hours.
    AfterHours,
    /// Frequently asked questions.
    CommonQuestions,
    /// Maintenance requests.
    MaintenanceRequests,
    /// Rent payment and billing questions.
    PaymentInquiries,
    /// Lease terms and policy questions.
    LeaseQuestions,
    /// Urgent matters.
    EmergencySituations,
}

impl ResponseTrigger {
    /// Every trigger, in catalog order.
    pub const ALL: [Self; 6] = [
        Self::AfterHours,
        Self::CommonQuestions,
        Self::MaintenanceRequests,
        Self::PaymentInquiries,
        Self::LeaseQuestions,
        Self::EmergencySituations,
    ];

    /// Wire name (`snake_case`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AfterHours => "after_hours",
            Self::CommonQuestions => "common_questions",
            Self::MaintenanceRequests => "maintenance_requests",
            Self::PaymentInquiries => "payment_inquiries",
            Self::LeaseQuestions => "lease_questions",
            Self::EmergencySituations => "emergency_situations",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }

    /// Operator-facing label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::AfterHours => "After Hours",
            Self::CommonQuestions => "Common Questions",
            Self::MaintenanceRequests => "Maintenance Requests",
            Self::PaymentInquiries => "Payment Inquiries",
            Self::LeaseQuestions => "Lease Questions",
            Self::EmergencySituations => "Emergency Situations",
        }
    }

    /// One-line description shown next to the label.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::AfterHours => "Respond to messages received outside business hours",
            Self::CommonQuestions => "Handle frequently asked questions automatically",
            Self::MaintenanceRequests => "Process and acknowledge maintenance requests",
            Self::PaymentInquiries => "Respond to rent payment and billing questions",
            Self::LeaseQuestions => "Answer questions about lease terms and policies",
            Self::EmergencySituations => "Provide immediate response for urgent matters",
        }
    }
}

impl Display for ResponseTrigger {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit a rule threshold is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdUnit {
    /// Elapsed minutes, unbounded above.
    Minutes,
    /// Score on a 0–100 scale.
    Points,
}

impl ThresholdUnit {
    /// Largest accepted threshold for this unit, if bounded.
    #[must_use]
    pub fn max(self) -> Option<i64> {
        match self {
            Self::Minutes => None,
            Self::Points => Some(100),
        }
    }
}

/// Condition under which a conversation is handed to a human.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EscalationCondition {
    /// No agent reply within `threshold` minutes.
    NoResponseAfterTime,
    /// Negativity (`100 - sentiment`) at or above `threshold`.
    NegativeSentiment,
    /// Request flagged as needing human judgment.
    ComplexRequest,
    /// One or more watched keywords were mentioned.
    SpecificKeywords,
    /// Repeated failed resolution attempts.
    MultipleAttempts,
}

impl EscalationCondition {
    /// Every supported condition, in catalog order.
    pub const ALL: [Self; 5] = [
        Self::NoResponseAfterTime,
        Self::NegativeSentiment,
        Self::ComplexRequest,
        Self::SpecificKeywords,
        Self::MultipleAttempts,
    ];

    /// Wire name (`snake_case`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoResponseAfterTime => "no_response_after_time",
            Self::NegativeSentiment => "negative_sentiment",
            Self::ComplexRequest => "complex_request",
            Self::SpecificKeywords => "specific_keywords",
            Self::MultipleAttempts => "multiple_attempts",
        }
    }

    /// Parse a wire name.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == value)
    }

    /// Threshold unit for this condition family.
    ///
    /// Only the time-based condition counts minutes; everything else is
    /// scored in points.
    #[must_use]
    pub fn unit(self) -> ThresholdUnit {
        match self {
            Self::NoResponseAfterTime => ThresholdUnit::Minutes,
            _ => ThresholdUnit::Points,
        }
    }

    /// Operator-facing label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::NoResponseAfterTime => "No Response After Time",
            Self::NegativeSentiment => "Negative Sentiment",
            Self::ComplexRequest => "Complex Request",
            Self::SpecificKeywords => "Specific Keywords",
            Self::MultipleAttempts => "Multiple Attempts",
        }
    }

    /// One-line description shown next to the label.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::NoResponseAfterTime => {
                "Escalate if tenant doesn't respond within specified time"
            }
            Self::NegativeSentiment => "Escalate when negative sentiment is detected",
            Self::ComplexRequest => "Escalate requests that require human judgment",
            Self::SpecificKeywords => "Escalate when certain keywords are mentioned",
            Self::MultipleAttempts => "Escalate after multiple failed resolution attempts",
        }
    }
}

impl Display for EscalationCondition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Condition stored on a rule.
///
/// Settings are persisted as opaque JSON by an external collaborator, so a
/// rule may carry a condition name this build does not know. It is kept
/// verbatim (and round-trips unchanged) instead of failing the whole
/// settings document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleCondition {
    /// A supported condition.
    Known(EscalationCondition),
    /// An unrecognized condition name.
    Unrecognized(String),
}

impl RuleCondition {
    /// The supported condition, if any.
    #[must_use]
    pub fn known(&self) -> Option<EscalationCondition> {
        match self {
            Self::Known(c) => Some(*c),
            Self::Unrecognized(_) => None,
        }
    }

    /// Wire name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(c) => c.as_str(),
            Self::Unrecognized(raw) => raw,
        }
    }
}

impl From<String> for RuleCondition {
    fn from(value: String) -> Self {
        EscalationCondition::parse(&value).map_or(Self::Unrecognized(value), Self::Known)
    }
}

impl From<RuleCondition> for String {
    fn from(value: RuleCondition) -> Self {
        match value {
            RuleCondition::Known(c) => c.as_str().to_owned(),
            RuleCondition::Unrecognized(raw) => raw,
        }
    }
}

impl From<EscalationCondition> for RuleCondition {
    fn from(value: EscalationCondition) -> Self {
        Self::Known(value)
    }
}

impl Display for RuleCondition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens when an escalation rule fires.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EscalationAction {
    /// Hand the conversation to a human agent.
    EscalateToHuman,
    /// Notify the property manager.
    NotifyManager,
    /// Open a ticket in the ticketing system.
    CreateTicket,
}

impl EscalationAction {
    /// Wire name (`snake_case`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EscalateToHuman => "escalate_to_human",
            Self::NotifyManager => "notify_manager",
            Self::CreateTicket => "create_ticket",
        }
    }
}

impl Display for EscalationAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Escalation priority. Ordering is `Low < Medium < High`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum EscalationPriority {
    /// Low urgency.
    Low,
    /// Medium urgency.
    Medium,
    /// High urgency.
    High,
}

impl EscalationPriority {
    /// Wire name (`snake_case`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl Display for EscalationPriority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Voice of automated replies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationTone {
    /// Professional and business-like.
    Formal,
    /// Warm and approachable.
    Friendly,
    /// Relaxed and conversational.
    Casual,
}

impl CommunicationTone {
    /// Every tone, in catalog order.
    pub const ALL: [Self; 3] = [Self::Formal, Self::Friendly, Self::Casual];

    /// Wire name (`snake_case`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Formal => "formal",
            Self::Friendly => "friendly",
            Self::Casual => "casual",
        }
    }

    /// Operator-facing label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Formal => "Formal",
            Self::Friendly => "Friendly",
            Self::Casual => "Casual",
        }
    }

    /// One-line description shown next to the label.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Formal => "Professional and business-like communication",
            Self::Friendly => "Warm and approachable communication",
            Self::Casual => "Relaxed and conversational communication",
        }
    }
}

/// Length and framing of automated replies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum CommunicationStyle {
    /// Brief and to the point.
    Concise,
    /// Comprehensive and thorough.
    Detailed,
    /// Understanding and supportive.
    Empathetic,
}

impl CommunicationStyle {
    /// Every style, in catalog order.
    pub const ALL: [Self; 3] = [Self::Concise, Self::Detailed, Self::Empathetic];

    /// Wire name (`snake_case`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Concise => "concise",
            Self::Detailed => "detailed",
            Self::Empathetic => "empathetic",
        }
    }

    /// Operator-facing label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Concise => "Concise",
            Self::Detailed => "Detailed",
            Self::Empathetic => "Empathetic",
        }
    }

    /// One-line description shown next to the label.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Concise => "Brief and to-the-point responses",
            Self::Detailed => "Comprehensive and thorough responses",
            Self::Empathetic => "Understanding and supportive responses",
        }
    }
}

/// Tone and style preference with optional free-form instructions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ToneStyle {
    /// Selected tone.
    pub tone: CommunicationTone,
    /// Selected style.
    pub style: CommunicationStyle,
    /// Extra drafting instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
}

impl Default for ToneStyle {
    fn default() -> Self {
        Self {
            tone: CommunicationTone::Friendly,
            style: CommunicationStyle::Detailed,
            custom_instructions: None,
        }
    }
}

impl ToneStyle {
    /// Copy of `self` with `patch` applied. Blank instructions clear them.
    #[must_use]
    pub fn apply(&self, patch: &ToneStylePatch) -> Self {
        let custom_instructions = match &patch.custom_instructions {
            Some(text) => Some(text.trim()).filter(|t| !t.is_empty()).map(str::to_owned),
            None => self.custom_instructions.clone(),
        };
        Self {
            tone: patch.tone.unwrap_or(self.tone),
            style: patch.style.unwrap_or(self.style),
            custom_instructions,
        }
    }

    /// Preview reply for the selected combination.
    #[must_use]
    pub fn example(&self) -> &'static str {
        example_reply(self.tone, self.style)
    }
}

/// Partial update of a [`ToneStyle`]; absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ToneStylePatch {
    /// New tone.
    #[serde(default)]
    pub tone: Option<CommunicationTone>,
    /// New style.
    #[serde(default)]
    pub style: Option<CommunicationStyle>,
    /// New instructions; an empty string clears them.
    #[serde(default)]
    pub custom_instructions: Option<String>,
}

/// One selectable catalog value with its operator-facing text.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Wire name.
    pub value: &'static str,
    /// Short label.
    pub label: &'static str,
    /// One-line description.
    pub description: &'static str,
}

/// Everything an operator chooses from when configuring replies.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RuleCatalog {
    /// Response triggers.
    pub triggers: Vec<CatalogEntry>,
    /// Escalation conditions.
    pub conditions: Vec<CatalogEntry>,
    /// Reply tones.
    pub tones: Vec<CatalogEntry>,
    /// Reply styles.
    pub styles: Vec<CatalogEntry>,
}

impl RuleCatalog {
    /// The full catalog, in catalog order.
    #[must_use]
    pub fn build() -> Self {
        Self {
            triggers: ResponseTrigger::ALL
                .into_iter()
                .map(|t| entry(t.as_str(), t.label(), t.description()))
                .collect(),
            conditions: EscalationCondition::ALL
                .into_iter()
                .map(|c| entry(c.as_str(), c.label(), c.description()))
                .collect(),
            tones: CommunicationTone::ALL
                .into_iter()
                .map(|t| entry(t.as_str(), t.label(), t.description()))
                .collect(),
            styles: CommunicationStyle::ALL
                .into_iter()
                .map(|s| entry(s.as_str(), s.label(), s.description()))
                .collect(),
        }
    }
}

fn entry(value: &'static str, label: &'static str, description: &'static str) -> CatalogEntry {
    CatalogEntry {
        value,
        label,
        description,
    }
}

/// Sample reply for a tone/style combination, used to preview drafts.
#[must_use]
pub fn example_reply(tone: CommunicationTone, style: CommunicationStyle) -> &'static str {
    use CommunicationStyle::{Concise, Detailed, Empathetic};
    use CommunicationTone::{Casual, Formal, Friendly};

    match (tone, style) {
        (Formal, Concise) => "Request received. Maintenance scheduled for tomorrow 2-4 PM.",
        (Formal, Detailed) => {
            "Thank you for contacting us regarding your maintenance request. Our maintenance \
             team will contact you within 24 hours to schedule a convenient appointment time."
        }
        (Formal, Empathetic) => {
            "Thank you for bringing this maintenance issue to our attention. We understand how \
             inconvenient this can be and will address it promptly."
        }
        (Friendly, Concise) => {
            "Hi! Got your request - we'll get someone over to fix that tomorrow between 2-4 PM."
        }
        (Friendly, Detailed) => {
            "Hi there! Thanks for reaching out. We've got your maintenance request and our team \
             will give you a call within 24 hours to set up a time that works for you."
        }
        (Friendly, Empathetic) => {
            "Hi there! I completely understand how frustrating this is. We'll get it fixed for \
             you as quickly as possible."
        }
        (Casual, Concise) => {
            "Hey! Maintenance request received - someone will be over tomorrow 2-4 PM."
        }
        (Casual, Detailed) => {
            "Hey! Got your maintenance request. Our maintenance guy will reach out within the \
             next day or so to figure out a good time."
        }
        (Casual, Empathetic) => {
            "Hey! That sounds super annoying - I totally get it. We'll get someone over there \
             ASAP."
        }
    }
}
