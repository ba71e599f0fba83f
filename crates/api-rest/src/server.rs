//! Router, application state, and request handlers.
//!
//! One router serves both the standalone `solace-api-rest` binary and the
//! workspace's main `solace-run` binary, so the two cannot drift apart.

use axum::{
    extract::{Path as AxumPath, State},
    http::{HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use std::convert::Infallible;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;

use api_shared::auth::{validate_api_key, ApiKeyError};
use api_shared::{
    parse_role, BackfillRes, ComplianceReportRes, ConversationMetaDto, ConversationRes,
    CreateConversationReq, CreateConversationRes, HealthRes, HealthService, ListConversationsRes,
    MessageDto, NudgeCandidateDto, NudgeCandidatesRes, PostMessageReq, PostMessageRes,
    RetentionSweepRes,
};
use solace_core::backfill::BackfillService;
use solace_core::config::{nudge_quiet_hours_from_env_value, retention_days_from_env_value};
use solace_core::constants::{DEFAULT_CHAT_DATA_DIR, SERVER_MIN_CLEAN_CHARS};
use solace_core::nudge::NudgeService;
use solace_core::report::ComplianceService;
use solace_core::repositories::conversations::{list_conversations, ConversationService};
use solace_core::retention::RetentionService;
use solace_core::{
    ChatError, CoreConfig, FallbackPolicy, Message, MessageDisposition, PatternSet, Sanitiser,
};
use solace_types::Language;

use crate::events::{ConversationEvent, EventBus};
use crate::safety::{DisabledClassifier, HttpClassifier, SafetyClassifier};

/// Application state shared across REST API handlers.
///
/// Contains the resolved configuration, the server-side sanitiser, the live
/// update bus, and the safety-classifier collaborator.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<CoreConfig>,
    pub sanitiser: Sanitiser,
    pub events: EventBus,
    pub classifier: Arc<dyn SafetyClassifier>,
}

impl AppState {
    /// Builds state from a resolved configuration.
    ///
    /// The classifier comes from `SOLACE_CLASSIFIER_URL`; without it the
    /// disabled (always-safe) classifier is used.
    pub fn new(cfg: Arc<CoreConfig>) -> anyhow::Result<Self> {
        let patterns = match cfg.extra_pattern_file() {
            Some(path) => PatternSet::from_file(path)?,
            None => PatternSet::default_set(),
        };
        let sanitiser = Sanitiser::new(patterns, cfg.fallback_policy(), SERVER_MIN_CLEAN_CHARS);

        let classifier: Arc<dyn SafetyClassifier> = match std::env::var("SOLACE_CLASSIFIER_URL") {
            Ok(url) if !url.trim().is_empty() => Arc::new(HttpClassifier::new(url)),
            _ => Arc::new(DisabledClassifier),
        };

        Ok(Self {
            cfg,
            sanitiser,
            events: EventBus::new(),
            classifier,
        })
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_all_conversations,
        create_conversation,
        get_conversation,
        post_message,
        admin_sanitise,
        compliance_report,
        retention_sweep,
        nudge_candidates,
    ),
    components(schemas(
        HealthRes,
        ListConversationsRes,
        ConversationMetaDto,
        ConversationRes,
        CreateConversationReq,
        CreateConversationRes,
        MessageDto,
        PostMessageReq,
        PostMessageRes,
        BackfillRes,
        ComplianceReportRes,
        RetentionSweepRes,
        NudgeCandidateDto,
        NudgeCandidatesRes,
    ))
)]
pub struct ApiDoc;

/// Resolves the core configuration from the environment.
///
/// Reads `SOLACE_DATA_DIR`, `SOLACE_RETENTION_DAYS`, `SOLACE_NUDGE_QUIET_HOURS`,
/// `SOLACE_FALLBACK_POLICY`, and `SOLACE_PATTERN_FILE`, creating the data
/// directory when it does not exist yet. Called once at startup by both
/// binaries.
pub fn resolve_core_config() -> anyhow::Result<Arc<CoreConfig>> {
    let chat_data_dir =
        std::env::var("SOLACE_DATA_DIR").unwrap_or_else(|_| DEFAULT_CHAT_DATA_DIR.into());
    let chat_data_path = PathBuf::from(&chat_data_dir);
    std::fs::create_dir_all(&chat_data_path)?;

    let retention_days = retention_days_from_env_value(std::env::var("SOLACE_RETENTION_DAYS").ok())?;
    let nudge_quiet_hours =
        nudge_quiet_hours_from_env_value(std::env::var("SOLACE_NUDGE_QUIET_HOURS").ok())?;

    let fallback_policy = match std::env::var("SOLACE_FALLBACK_POLICY") {
        Ok(value) if !value.trim().is_empty() => FallbackPolicy::parse(&value)?,
        _ => FallbackPolicy::FailOpen,
    };

    let extra_pattern_file = std::env::var("SOLACE_PATTERN_FILE").ok().map(PathBuf::from);

    Ok(Arc::new(CoreConfig::new(
        chat_data_path,
        retention_days,
        nudge_quiet_hours,
        fallback_policy,
        extra_pattern_file,
    )?))
}

/// Builds the REST router over the given state.
pub fn build_router(state: AppState) -> Router {
    use utoipa_swagger_ui::SwaggerUi;

    Router::new()
        .route("/health", get(health))
        .route("/conversations", get(list_all_conversations))
        .route("/conversations", post(create_conversation))
        .route("/conversations/:id", get(get_conversation))
        .route("/conversations/:id/messages", post(post_message))
        .route("/conversations/:id/stream", get(stream_conversation))
        .route("/admin/sanitise", post(admin_sanitise))
        .route("/admin/reports/compliance", get(compliance_report))
        .route("/admin/retention/sweep", post(retention_sweep))
        .route("/admin/nudges/candidates", get(nudge_candidates))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Checks the admin API key from the `x-api-key` header.
fn require_api_key(headers: &HeaderMap) -> Result<(), (StatusCode, &'static str)> {
    let provided = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    match validate_api_key(provided) {
        Ok(()) => Ok(()),
        Err(ApiKeyError::NotConfigured) => {
            tracing::error!("API_KEY not set in environment");
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
        Err(ApiKeyError::Invalid) => Err((StatusCode::UNAUTHORIZED, "Invalid API key")),
    }
}

fn conversation_res(conversation: solace_core::Conversation) -> ConversationRes {
    ConversationRes {
        meta: meta_dto(conversation.meta),
        messages: conversation.messages.into_iter().map(MessageDto::from).collect(),
    }
}

fn meta_dto(meta: solace_core::ConversationMeta) -> ConversationMetaDto {
    ConversationMetaDto {
        conversation_id: meta.conversation_id,
        owner: meta.owner,
        language: meta.language.tag().to_owned(),
        created_at: meta.created_at.to_rfc3339(),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Returns the current health status of the Solace service.
/// This endpoint is used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/conversations",
    responses(
        (status = 200, description = "List of conversations", body = ListConversationsRes),
        (status = 401, description = "Invalid API key"),
        (status = 500, description = "Internal server error")
    )
)]
/// List all conversations (admin).
///
/// Requires the admin API key. Returns metadata only; message logs are
/// fetched per conversation.
#[axum::debug_handler]
async fn list_all_conversations(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ListConversationsRes>, (StatusCode, &'static str)> {
    require_api_key(&headers)?;

    let conversations = list_conversations(&state.cfg)
        .into_iter()
        .map(meta_dto)
        .collect();
    Ok(Json(ListConversationsRes { conversations }))
}

#[utoipa::path(
    post,
    path = "/conversations",
    request_body = CreateConversationReq,
    responses(
        (status = 200, description = "Conversation created", body = CreateConversationRes),
        (status = 400, description = "Bad request"),
        (status = 500, description = "Internal server error")
    )
)]
/// Create a new conversation for an owner identity.
#[axum::debug_handler]
async fn create_conversation(
    State(state): State<AppState>,
    Json(req): Json<CreateConversationReq>,
) -> Result<Json<CreateConversationRes>, (StatusCode, &'static str)> {
    let language = match req.language.as_deref() {
        Some(tag) => match Language::parse(tag) {
            Ok(language) => language,
            Err(e) => {
                tracing::error!("Invalid language tag: {:?}", e);
                return Err((StatusCode::BAD_REQUEST, "Invalid language tag"));
            }
        },
        None => Language::default(),
    };

    match ConversationService::new(state.cfg.clone()).initialise(req.owner, language) {
        Ok(service) => Ok(Json(CreateConversationRes {
            conversation_id: service.conversation_id().to_string(),
        })),
        Err(ChatError::InvalidInput(e)) => {
            tracing::error!("Invalid conversation owner: {}", e);
            Err((StatusCode::BAD_REQUEST, "Invalid owner identity"))
        }
        Err(e) => {
            tracing::error!("Initialise conversation error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/conversations/{id}",
    responses(
        (status = 200, description = "Canonical conversation", body = ConversationRes),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Conversation not found"),
        (status = 500, description = "Internal server error")
    )
)]
/// Fetch the canonical conversation by id.
///
/// This is the authoritative read used by clients to recover from a suspect
/// streaming delivery.
#[axum::debug_handler]
async fn get_conversation(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<ConversationRes>, (StatusCode, &'static str)> {
    let service = match ConversationService::open(state.cfg.clone(), &id) {
        Ok(service) => service,
        Err(ChatError::ConversationNotFound(_)) => {
            return Err((StatusCode::NOT_FOUND, "Conversation not found"));
        }
        Err(e) => {
            tracing::error!("Invalid conversation id: {:?}", e);
            return Err((StatusCode::BAD_REQUEST, "Invalid conversation id"));
        }
    };

    match service.read() {
        Ok(conversation) => Ok(Json(conversation_res(conversation))),
        Err(e) => {
            tracing::error!("Read conversation error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/conversations/{id}/messages",
    request_body = PostMessageReq,
    responses(
        (status = 200, description = "Message appended", body = PostMessageRes),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Conversation not found"),
        (status = 422, description = "Message suppressed by safety policy"),
        (status = 500, description = "Internal server error")
    )
)]
/// Append a message to a conversation.
///
/// Assistant text passes the server-side pre-persist pass first: the
/// deterministic leakage filter, then the safety classifier. Classifier
/// failure is logged and treated as safe - the deterministic filter remains
/// the line of defence. The stored message is broadcast to live subscribers.
#[axum::debug_handler]
async fn post_message(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    headers: HeaderMap,
    Json(req): Json<PostMessageReq>,
) -> Result<Json<PostMessageRes>, (StatusCode, &'static str)> {
    let role = match parse_role(&req.role) {
        Some(role) => role,
        None => return Err((StatusCode::BAD_REQUEST, "Invalid role")),
    };

    // Assistant turns come from the trusted agent integration, not end users
    if role == solace_core::Role::Assistant {
        require_api_key(&headers)?;
    }

    let service = match ConversationService::open(state.cfg.clone(), &id) {
        Ok(service) => service,
        Err(ChatError::ConversationNotFound(_)) => {
            return Err((StatusCode::NOT_FOUND, "Conversation not found"));
        }
        Err(e) => {
            tracing::error!("Invalid conversation id: {:?}", e);
            return Err((StatusCode::BAD_REQUEST, "Invalid conversation id"));
        }
    };

    let language = match service.read() {
        Ok(conversation) => conversation.meta.language,
        Err(e) => {
            tracing::error!("Read conversation error: {:?}", e);
            return Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"));
        }
    };

    let mut message = Message::text(role, req.content, Utc::now());
    let mut altered = false;

    if message.is_assistant() {
        match state.sanitiser.sanitise_message(&mut message, language) {
            MessageDisposition::Unchanged => {}
            MessageDisposition::Rewritten => altered = true,
            MessageDisposition::Suppressed => {
                return Err((
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "Message suppressed by safety policy",
                ));
            }
        }

        if let Some(text) = message.content_str().map(str::to_owned) {
            match state.classifier.review(&text).await {
                Ok(verdict) if !verdict.safe => {
                    let substitute = verdict
                        .substitute
                        .unwrap_or_else(|| solace_core::fallback_sentence(language).to_owned());
                    message.content = serde_json::Value::String(substitute);
                    altered = true;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "safety classifier unavailable; storing filtered text");
                }
            }
        }
    }

    match service.append_message(message) {
        Ok(stored) => {
            let dto = MessageDto::from(stored);
            state.events.publish(ConversationEvent {
                conversation_id: id,
                messages: vec![dto.clone()],
            });
            Ok(Json(PostMessageRes {
                message: dto,
                altered,
            }))
        }
        Err(e) => {
            tracing::error!("Append message error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

/// SSE stream of live updates for one conversation.
///
/// Delivers each append as a JSON batch of messages. The stream carries no
/// history; clients fetch the canonical conversation first and then follow
/// the stream.
async fn stream_conversation(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Sse<impl futures_util::Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    use async_stream::stream;

    let mut rx = state.events.subscribe();
    let stream = stream! {
        while let Ok(event) = rx.recv().await {
            if event.conversation_id != id {
                continue;
            }
            yield Ok(Event::default()
                .json_data(&event.messages)
                .unwrap_or_else(|_| Event::default().data("[]")));
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::new())
}

#[utoipa::path(
    post,
    path = "/admin/sanitise",
    responses(
        (status = 200, description = "Backfill complete", body = BackfillRes),
        (status = 401, description = "Invalid API key"),
        (status = 500, description = "Internal server error")
    )
)]
/// Re-apply the current filter to every stored conversation (admin).
#[axum::debug_handler]
async fn admin_sanitise(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BackfillRes>, (StatusCode, &'static str)> {
    require_api_key(&headers)?;

    let service = BackfillService::new(state.cfg.clone(), state.sanitiser.clone());
    match service.run() {
        Ok(outcome) => Ok(Json(BackfillRes {
            conversations: outcome.conversations,
            rewritten: outcome.rewritten,
            suppressed: outcome.suppressed,
        })),
        Err(e) => {
            tracing::error!("Backfill error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/admin/reports/compliance",
    responses(
        (status = 200, description = "Compliance report", body = ComplianceReportRes),
        (status = 401, description = "Invalid API key"),
        (status = 500, description = "Internal server error")
    )
)]
/// Aggregate a compliance report over the store (admin).
#[axum::debug_handler]
async fn compliance_report(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ComplianceReportRes>, (StatusCode, &'static str)> {
    require_api_key(&headers)?;

    let service = ComplianceService::new(state.cfg.clone(), state.sanitiser.clone());
    match service.generate(Utc::now()) {
        Ok(report) => Ok(Json(report.into())),
        Err(e) => {
            tracing::error!("Compliance report error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    post,
    path = "/admin/retention/sweep",
    responses(
        (status = 200, description = "Sweep complete", body = RetentionSweepRes),
        (status = 401, description = "Invalid API key"),
        (status = 500, description = "Internal server error")
    )
)]
/// Delete conversations past the retention window (admin).
#[axum::debug_handler]
async fn retention_sweep(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RetentionSweepRes>, (StatusCode, &'static str)> {
    require_api_key(&headers)?;

    let service = RetentionService::new(state.cfg.clone());
    match service.sweep(Utc::now()) {
        Ok(outcome) => Ok(Json(RetentionSweepRes {
            examined: outcome.examined,
            removed: outcome.removed,
        })),
        Err(e) => {
            tracing::error!("Retention sweep error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/admin/nudges/candidates",
    responses(
        (status = 200, description = "Quiet conversations due a check-in", body = NudgeCandidatesRes),
        (status = 401, description = "Invalid API key"),
        (status = 500, description = "Internal server error")
    )
)]
/// List conversations due a proactive check-in (admin).
#[axum::debug_handler]
async fn nudge_candidates(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<NudgeCandidatesRes>, (StatusCode, &'static str)> {
    require_api_key(&headers)?;

    let service = NudgeService::new(state.cfg.clone());
    match service.candidates(Utc::now()) {
        Ok(candidates) => Ok(Json(NudgeCandidatesRes {
            candidates: candidates
                .into_iter()
                .map(|c| NudgeCandidateDto {
                    conversation_id: c.conversation_id,
                    owner: c.owner,
                    language: c.language.tag().to_owned(),
                    template: c.template,
                })
                .collect(),
        })),
        Err(e) => {
            tracing::error!("Nudge candidates error: {:?}", e);
            Err((StatusCode::INTERNAL_SERVER_ERROR, "Internal error"))
        }
    }
}
