//! Route handlers for the `/ai/communication` API.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::actor::actor_from_headers;
use super::AppState;
use crate::models::catalog::{
    example_reply, CommunicationStyle, CommunicationTone, ResponseTrigger, RuleCatalog, ToneStyle,
    ToneStylePatch,
};
use crate::models::conversation::{ConversationFacts, ConversationState, InboundEvent};
use crate::models::settings::{EscalationRule, ResponseSettings, SettingsPatch};
use crate::models::template::{CommunicationTemplate, TemplateStatus};
use crate::orchestrator::{InboundOutcome, NewTemplate};
use crate::policy::evaluator::{EscalationEvaluator, EscalationOutcome};
use crate::policy::settings::ResponsePolicy;
use crate::scheduler::directives::Directive;
use crate::scheduler::{ResponseScheduler, ScheduleDecision};
use crate::Result;

type Shared = State<Arc<AppState>>;

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}

/// `GET /ai/communication/settings`
pub async fn get_settings(State(state): Shared) -> Json<ResponseSettings> {
    Json(state.service.settings().await)
}

/// `PUT /ai/communication/settings`
pub async fn update_settings(
    State(state): Shared,
    headers: HeaderMap,
    Json(patch): Json<SettingsPatch>,
) -> Result<Json<ResponseSettings>> {
    let actor = actor_from_headers(&headers)?;
    Ok(Json(state.service.update_settings(&patch, &actor).await?))
}

/// `POST /ai/communication/settings/validate`
pub async fn validate_settings(Json(settings): Json<ResponseSettings>) -> Result<Json<ResponseSettings>> {
    Ok(Json(ResponsePolicy::validate(settings)?))
}

/// `GET /ai/communication/catalog`
pub async fn catalog() -> Json<RuleCatalog> {
    Json(RuleCatalog::build())
}

/// Tone/style preference plus the preview reply of every combination.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToneStyleView {
    #[serde(flatten)]
    tone_style: ToneStyle,
    example: &'static str,
    examples: BTreeMap<CommunicationTone, BTreeMap<CommunicationStyle, &'static str>>,
}

impl From<ToneStyle> for ToneStyleView {
    fn from(tone_style: ToneStyle) -> Self {
        let examples = CommunicationTone::ALL
            .into_iter()
            .map(|tone| {
                let by_style = CommunicationStyle::ALL
                    .into_iter()
                    .map(|style| (style, example_reply(tone, style)))
                    .collect();
                (tone, by_style)
            })
            .collect();
        Self {
            example: tone_style.example(),
            tone_style,
            examples,
        }
    }
}

/// `GET /ai/communication/tone-style`
pub async fn get_tone_style(State(state): Shared) -> Result<Json<ToneStyleView>> {
    Ok(Json(state.service.tone_style().await?.into()))
}

/// `PUT /ai/communication/tone-style`
pub async fn update_tone_style(
    State(state): Shared,
    headers: HeaderMap,
    Json(patch): Json<ToneStylePatch>,
) -> Result<Json<ToneStyleView>> {
    let actor = actor_from_headers(&headers)?;
    Ok(Json(state.service.update_tone_style(&patch, &actor).await?.into()))
}

/// Body of `POST /ai/communication/schedule`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    event: InboundEvent,
    #[serde(default)]
    state: ConversationState,
    /// Settings to decide against; the stored settings when absent.
    #[serde(default)]
    settings: Option<ResponseSettings>,
}

/// `POST /ai/communication/schedule`
pub async fn schedule(State(state): Shared, Json(req): Json<ScheduleRequest>) -> Result<Json<ScheduleDecision>> {
    let settings = match req.settings {
        Some(settings) => ResponsePolicy::validate(settings)?,
        None => state.service.settings().await,
    };
    Ok(Json(ResponseScheduler::schedule(&req.event, &settings, &req.state)))
}

/// Body of `POST /ai/communication/evaluate`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    facts: ConversationFacts,
    /// Rules to evaluate; the stored rules when absent.
    #[serde(default)]
    rules: Option<Vec<EscalationRule>>,
}

/// `POST /ai/communication/evaluate`
pub async fn evaluate(State(state): Shared, Json(req): Json<EvaluateRequest>) -> Json<EscalationOutcome> {
    let rules = match req.rules {
        Some(rules) => rules,
        None => state.service.settings().await.escalation_rules,
    };
    Json(EscalationEvaluator::evaluate(&rules, &req.facts))
}

/// Body of `POST /ai/communication/conversations/{id}/messages`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundRequest {
    trigger: ResponseTrigger,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    attempts_so_far: i64,
}

/// `POST /ai/communication/conversations/{id}/messages`
pub async fn inbound_message(
    State(state): Shared,
    Path(conversation_id): Path<String>,
    Json(req): Json<InboundRequest>,
) -> Result<Json<InboundOutcome>> {
    let event = InboundEvent {
        conversation_id,
        trigger: req.trigger,
        message: req.message,
    };
    let outcome = state
        .service
        .process_inbound(&event, req.attempts_so_far, Utc::now())
        .await?;
    Ok(Json(outcome))
}

/// Body of `POST /ai/communication/conversations/{id}/escalation-check`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscalationCheckRequest {
    #[serde(default)]
    facts: ConversationFacts,
    #[serde(default)]
    message: Option<String>,
}

/// `POST /ai/communication/conversations/{id}/escalation-check`
pub async fn escalation_check(
    State(state): Shared,
    Path(conversation_id): Path<String>,
    Json(req): Json<EscalationCheckRequest>,
) -> Result<Json<EscalationOutcome>> {
    let outcome = state
        .service
        .check_escalation(&conversation_id, req.facts, req.message.as_deref(), Utc::now())
        .await?;
    Ok(Json(outcome))
}

/// Response of `POST /ai/communication/conversations/{id}/resolve`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResponse {
    cancelled: Option<Directive>,
}

/// `POST /ai/communication/conversations/{id}/resolve`
pub async fn resolve_conversation(
    State(state): Shared,
    Path(conversation_id): Path<String>,
) -> Json<ResolveResponse> {
    let cancelled = state.service.conversation_resolved(&conversation_id).await;
    Json(ResolveResponse { cancelled })
}

/// `GET /ai/communication/templates/pending`
pub async fn pending_templates(State(state): Shared) -> Result<Json<Vec<CommunicationTemplate>>> {
    Ok(Json(state.service.pending_templates().await?))
}

/// `POST /ai/communication/templates`
pub async fn create_template(
    State(state): Shared,
    headers: HeaderMap,
    Json(draft): Json<NewTemplate>,
) -> Result<(StatusCode, Json<CommunicationTemplate>)> {
    let actor = actor_from_headers(&headers)?;
    let template = state.service.create_template(draft, &actor).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// `GET /ai/communication/templates/{id}`
pub async fn get_template(State(state): Shared, Path(id): Path<String>) -> Result<Json<CommunicationTemplate>> {
    Ok(Json(state.service.template(&id).await?))
}

/// `GET /ai/communication/templates/{id}/actions`
pub async fn review_actions(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Vec<TemplateStatus>>> {
    let actor = actor_from_headers(&headers)?;
    Ok(Json(state.service.review_actions(&id, &actor).await?))
}

/// `POST /ai/communication/templates/{id}/submit`
pub async fn submit_template(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<CommunicationTemplate>> {
    let actor = actor_from_headers(&headers)?;
    Ok(Json(state.service.submit_template(&id, &actor).await?))
}

/// Body of the approve endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ApproveRequest {
    #[serde(default)]
    comments: Option<String>,
}

/// `POST /ai/communication/templates/{id}/approve`
pub async fn approve_template(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<ApproveRequest>,
) -> Result<Json<CommunicationTemplate>> {
    let actor = actor_from_headers(&headers)?;
    let template = state
        .service
        .approve_template(&id, &actor, req.comments.as_deref())
        .await?;
    Ok(Json(template))
}

/// Body of the reject endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    reason: Option<String>,
}

/// `POST /ai/communication/templates/{id}/reject`
pub async fn reject_template(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<RejectRequest>,
) -> Result<Json<CommunicationTemplate>> {
    let actor = actor_from_headers(&headers)?;
    let reason = req.reason.unwrap_or_default();
    Ok(Json(state.service.reject_template(&id, &actor, &reason).await?))
}

/// Body of the resubmit endpoint.
#[derive(Debug, Deserialize)]
pub struct ResubmitRequest {
    content: String,
}

/// `POST /ai/communication/templates/{id}/resubmit`
pub async fn resubmit_template(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(req): Json<ResubmitRequest>,
) -> Result<(StatusCode, Json<CommunicationTemplate>)> {
    let actor = actor_from_headers(&headers)?;
    let template = state
        .service
        .resubmit_template(&id, &req.content, &actor)
        .await?;
    Ok((StatusCode::CREATED, Json(template)))
}
