use crate::{
    app::{AppError, QuestionService},
    config::Config,
    qa::{QaDocument, QuestionSubmission},
    ranking::SimilarQuestion,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::signal;

#[derive(Clone)]
pub struct SharedState {
    service: Arc<QuestionService>,
    config: Arc<Config>,
}

impl SharedState {
    pub fn new(config: Config, service: QuestionService) -> Self {
        Self {
            service: Arc::new(service),
            config: Arc::new(config),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {err}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                log::error!("failed to install signal handler: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    log::warn!("shutting down");
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/questions/similar", post(similar))
        .route("/api/questions/answer", post(answer))
        .route("/api/questions/history", post(history))
        .route("/api/questions/:id", get(get_question))
        .route("/api/config", get(get_config))
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(Arc::new(state))
}

async fn start_app(state: SharedState, addr: &str) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("listening on {addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn start_daemon(state: SharedState, addr: &str) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async { start_app(state, addr).await })
}

#[derive(Debug)]
struct HttpError(AppError);

// Tell axum how to convert `AppError` into a response.
impl IntoResponse for HttpError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            AppError::NotFound(_) => axum::http::StatusCode::NOT_FOUND,
            AppError::InvalidSubmission(_) => {
                log::warn!("{}", self.0);
                axum::http::StatusCode::BAD_REQUEST
            }
            AppError::Translate(_) => {
                log::error!("{self:?}");
                axum::http::StatusCode::BAD_GATEWAY
            }
            // a bad embedding comes from the provider, never from the client
            AppError::Rank(_)
            | AppError::Embedding(_)
            | AppError::Store(_)
            | AppError::Other(_) => {
                log::error!("{self:?}");
                axum::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({"error": self.0.to_string()}))).into_response()
    }
}

impl<E> From<E> for HttpError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

async fn similar(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<QuestionSubmission>,
) -> Result<Json<Vec<SimilarQuestion>>, HttpError> {
    log::debug!("payload: {payload:?}");

    let service = state.service.clone();
    tokio::task::block_in_place(move || service.submit(payload))
        .map(Json)
        .map_err(Into::into)
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AnswerRequest {
    pub id: u64,
    pub answer: String,
}

async fn answer(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<AnswerRequest>,
) -> Result<Json<QaDocument>, HttpError> {
    let service = state.service.clone();
    tokio::task::block_in_place(move || service.answer(payload.id, &payload.answer))
        .map(Json)
        .map_err(Into::into)
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HistoryRequest {
    pub mentor_nickname: String,
}

async fn history(
    State(state): State<Arc<SharedState>>,
    Json(payload): Json<HistoryRequest>,
) -> Result<Json<Vec<QaDocument>>, HttpError> {
    let service = state.service.clone();
    tokio::task::block_in_place(move || service.history(&payload.mentor_nickname))
        .map(Json)
        .map_err(Into::into)
}

async fn get_question(
    State(state): State<Arc<SharedState>>,
    Path(id): Path<u64>,
) -> Result<Json<QaDocument>, HttpError> {
    let service = state.service.clone();
    tokio::task::block_in_place(move || service.get(id))
        .map(Json)
        .map_err(Into::into)
}

async fn get_config(State(state): State<Arc<SharedState>>) -> Json<Config> {
    let mut config = state.config.as_ref().clone();
    if config.translation.api_key.is_some() {
        config.translation.api_key = Some("[REDACTED]".to_string());
    }
    Json(config)
}
