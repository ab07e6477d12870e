//! Smart Desk Web Server
//!
//! Axum-based REST API for the Smart Desk tracker.
//!
//! Security features:
//! - Bearer token authentication against Supabase Auth or static API keys
//!   (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Upload size limit on multipart routes
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{debug, error, info, warn};

use smartdesk_core::ai::{self, AIBackend, AIClient};
use smartdesk_core::{Authenticator, Config, Error, Mailer, Store};

mod handlers;
mod scheduler;

pub use scheduler::{next_run, start_digest_scheduler, Cadence};

/// Maximum file upload size (8 MB)
pub const MAX_UPLOAD_SIZE: usize = 8 * 1024 * 1024;

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
        }
    }
}

/// Shared application state
pub struct AppState {
    pub config: ServerConfig,
    pub store: Option<Store>,
    pub ai: Option<AIClient>,
    pub authenticator: Authenticator,
    /// Default look-ahead for `GET /api/documents?upcoming=true`
    pub expiry_months: u32,
}

impl AppState {
    /// Build every client from configuration, logging what is missing
    pub fn from_config(config: &Config, server: ServerConfig) -> Self {
        let store = Store::from_config(&config.supabase);
        match &store {
            Some(_) => info!(tables = ?config.supabase.tables, "Supabase datastore configured"),
            None => warn!("Supabase not configured (set SUPABASE_URL and a key); record routes will fail"),
        }

        let ai = AIClient::from_config(&config.openai);
        match &ai {
            Some(client) => info!(host = %client.host(), model = %client.model(), "AI backend configured"),
            None => info!("AI backend not configured (set OPENAI_API_KEY to enable extraction)"),
        }

        Self {
            config: server,
            store,
            ai,
            authenticator: Authenticator::from_config(config),
            expiry_months: config.documents.expiry_months,
        }
    }

    /// The datastore, or a not-configured error naming the attempted action
    pub fn store(&self, action: &str) -> Result<&Store, AppError> {
        self.store.as_ref().ok_or_else(|| {
            AppError::from(Error::NotConfigured(format!(
                "Supabase is not configured. Unable to {}.",
                action
            )))
        })
    }

    /// The model client, or a not-configured error naming the input kind
    pub fn ai(&self, input: &str) -> Result<&AIClient, AppError> {
        self.ai
            .as_ref()
            .ok_or_else(|| AppError::from(ai::not_configured(input)))
    }
}

/// Authentication middleware - validates the bearer token on protected routes
///
/// Fails closed: with neither Supabase nor API keys configured every
/// protected route answers 500.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    if !state.authenticator.is_configured() {
        return AppError::from(Error::NotConfigured(
            "Supabase auth is not configured.".to_string(),
        ))
        .into_response();
    }

    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);

    let Some(token) = token else {
        warn!(path = %request.uri().path(), "Unauthorized request - missing token");
        return AppError::unauthorized("Missing auth token").into_response();
    };

    match state.authenticator.verify(&token).await {
        Ok(user) => {
            debug!(user = %user.id, path = %request.uri().path(), "Authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => {
            warn!(path = %request.uri().path(), error = %e, "Unauthorized request");
            AppError::from(e).into_response()
        }
    }
}

/// Success envelope: `{"data": ...}`
#[derive(Serialize)]
pub struct Data<T> {
    pub data: T,
}

/// Wrap a value in the success envelope
pub fn data<T: Serialize>(value: T) -> Json<Data<T>> {
    Json(Data { data: value })
}

/// Create the application router
pub fn create_router(state: AppState, static_dir: Option<&str>) -> Router {
    let config = state.config.clone();
    let state = Arc::new(state);

    let protected = Router::new()
        // Transactions
        .route(
            "/transactions",
            get(handlers::list_transactions).post(handlers::create_transaction),
        )
        .route(
            "/transactions/:id",
            put(handlers::update_transaction).delete(handlers::delete_transaction),
        )
        .route("/insights", get(handlers::get_insights))
        // Budgets
        .route(
            "/budgets",
            get(handlers::list_budgets).post(handlers::upsert_budget),
        )
        .route("/budgets/:id", delete(handlers::delete_budget))
        // Documents
        .route(
            "/documents",
            get(handlers::list_documents).post(handlers::create_document),
        )
        .route("/documents/batch", post(handlers::create_documents_batch))
        .route(
            "/documents/:id",
            put(handlers::update_document).delete(handlers::delete_document),
        )
        // Policies
        .route(
            "/policies",
            get(handlers::list_policies).post(handlers::create_policy),
        )
        .route("/policies/insights", get(handlers::get_policy_insights))
        .route("/policies/batch", post(handlers::create_policies_batch))
        .route(
            "/policies/:id",
            put(handlers::update_policy).delete(handlers::delete_policy),
        )
        // Extraction
        .route("/ai/extract", post(handlers::extract_transactions))
        .route("/ai/text", post(handlers::extract_from_text))
        .route("/ai/documents", post(handlers::extract_documents))
        .route("/ai/policies", post(handlers::extract_policies))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/meta", get(handlers::meta))
        .merge(protected);

    // Build CORS layer
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    let mut app = Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ));

    // Serve the client bundle, falling back to index.html for client routes
    if let Some(dir) = static_dir {
        let index = std::path::Path::new(dir).join("index.html");
        app = app.fallback_service(ServeDir::new(dir).fallback(ServeFile::new(index)));
    }

    app
}

/// Start the server
pub async fn serve(
    config: Config,
    host: &str,
    static_dir: Option<&str>,
    server: ServerConfig,
) -> anyhow::Result<()> {
    if !server.require_auth {
        warn!("Authentication disabled - do not expose to network!");
    }

    let state = AppState::from_config(&config, server);

    check_ai_connection(state.ai.as_ref()).await;

    // Digests need both a datastore and a mailer
    match (&state.store, Mailer::from_config(&config.mailer)) {
        (Some(store), Some(mailer)) => {
            start_digest_scheduler(store.clone(), mailer, config.documents.expiry_months);
        }
        (None, _) => warn!("Digest scheduler skipped: Supabase env vars are missing."),
        (_, None) => warn!("Digest scheduler skipped: mailer env vars are missing."),
    }

    let app = create_router(state, static_dir);
    let addr = format!("{}:{}", host, config.port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log AI backend connection status
async fn check_ai_connection(ai: Option<&AIClient>) {
    let Some(client) = ai else {
        return;
    };
    if client.health_check().await {
        info!(host = %client.host(), model = %client.model(), "AI backend connected");
    } else {
        warn!(host = %client.host(), "AI backend configured but not responding");
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn new(status: StatusCode, msg: &str) -> Self {
        Self {
            status,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_request(msg: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn unauthorized(msg: &str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    fn from_core(core: &Error) -> Self {
        let status =
            StatusCode::from_u16(core.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = match core {
            Error::Http(_) | Error::Json(_) | Error::Mail(_) => {
                "An internal error occurred".to_string()
            }
            Error::Datastore { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self::new(status, &message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(status = %self.status, error = %err, "Request failed");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();

        if let Some(core) = err.downcast_ref::<Error>() {
            let mut app = Self::from_core(core);
            if app.status.is_server_error() {
                app.internal = Some(err);
            }
            return app;
        }

        if let Some(rejection) = err.downcast_ref::<JsonRejection>() {
            return Self::new(rejection.status(), &rejection.body_text());
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
