//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for agent chat, knowledge base questions and
//! similarity search. Chat requests are independent of each other; no
//! conversation state is kept between them.

use super::session::tools_with_knowledge;
use crate::agent::{Agent, ToolCallRecord};
use crate::cli::Output;
use crate::config::Settings;
use crate::knowledge::KnowledgeBase;
use crate::rag::{ContextBuilder, ContextChunk, RagEngine};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared application state.
struct AppState {
    agent: Agent,
    knowledge: KnowledgeBase,
    engine: RagEngine,
    min_score: f32,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: &Settings) -> anyhow::Result<()> {
    let knowledge = KnowledgeBase::open(settings)?;
    let engine = RagEngine::from_settings(settings, knowledge.vector_store(), knowledge.embedder())?;
    let agent = Agent::from_settings(settings, tools_with_knowledge(settings, &knowledge).await?)?;

    if !agent.is_ready() {
        Output::warning("OPENAI_API_KEY is not set; model requests will fail.");
    }

    let state = Arc::new(AppState {
        agent,
        knowledge,
        engine,
        min_score: settings.knowledge.min_score,
    });

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Aide API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Tools", "GET  /tools");
    Output::kv("Chat", "POST /chat");
    Output::kv("Ask (RAG)", "POST /ask");
    Output::kv("Search", "POST /search");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tools", get(tools))
        .route("/chat", post(chat))
        .route("/ask", post(ask))
        .route("/search", post(search))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
    tool_calls: Vec<ToolCallRecord>,
}

#[derive(Deserialize)]
struct AskRequest {
    question: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    sources: Vec<ContextChunk>,
}

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    min_score: Option<f32>,
}

fn default_limit() -> usize {
    5
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<ContextChunk>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(error: impl std::fmt::Display) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok", "ready": state.agent.is_ready() }))
}

async fn tools(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(serde_json::json!({ "tools": state.agent.tool_names() }))
}

async fn chat(State(state): State<Arc<AppState>>, Json(req): Json<ChatRequest>) -> Response {
    info!("POST /chat");
    match state.agent.run(&req.message).await {
        Ok(response) => Json(ChatResponse {
            response: response.content,
            tool_calls: response.tool_calls,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> Response {
    info!("POST /ask");
    match state.engine.ask(&req.question).await {
        Ok(response) => Json(AskResponse {
            answer: response.answer,
            sources: response.sources,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

async fn search(State(state): State<Arc<AppState>>, Json(req): Json<SearchRequest>) -> Response {
    let builder = ContextBuilder::new(state.knowledge.vector_store(), state.knowledge.embedder())
        .with_max_chunks(req.limit)
        .with_min_score(req.min_score.unwrap_or(state.min_score));

    match builder.build(&req.query).await {
        Ok(results) => Json(SearchResponse { results }).into_response(),
        Err(e) => error_response(e),
    }
}
