//! HTTP surface: the Telegram webhook plus the two endpoints that register
//! and remove it.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::bot::{self, BotContext};
use crate::config::Config;
use crate::telegram::types::Update;
use crate::telegram::TelegramApi;

pub const WEBHOOK_PATH: &str = "/endpoint";
pub const REGISTER_PATH: &str = "/registerWebhook";
pub const UNREGISTER_PATH: &str = "/unRegisterWebhook";

pub const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

#[derive(Clone)]
pub struct AppState {
    pub bot: BotContext,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, api: Arc<dyn TelegramApi>) -> Self {
        Self {
            bot: BotContext::new(api),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            WEBHOOK_PATH,
            post(receive_update).route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_secret,
            )),
        )
        .route(REGISTER_PATH, post(register_webhook))
        .route(UNREGISTER_PATH, post(unregister_webhook))
        .with_state(state)
}

/// Serve until Ctrl-C
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.config.server.listen_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
            }
            info!("Shutting down");
        })
        .await
        .context("Server error")?;

    Ok(())
}

async fn require_secret(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let provided = request
        .headers()
        .get(SECRET_HEADER)
        .and_then(|v| v.to_str().ok());

    if provided != Some(state.config.telegram.webhook_secret.as_str()) {
        warn!("Rejected webhook call with missing or wrong secret");
        return (StatusCode::FORBIDDEN, "Unauthorized\n").into_response();
    }

    next.run(request).await
}

async fn receive_update(State(state): State<AppState>, body: Bytes) -> Response {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Webhook body is not JSON: {}", e);
            return (StatusCode::BAD_REQUEST, "Invalid JSON\n").into_response();
        }
    };

    match serde_json::from_value::<Update>(raw.clone()) {
        Ok(update) => {
            debug!(
                "Received update {} ({:?})",
                update.update_id,
                update.update_type()
            );
            bot::dispatch(&state.bot, update).await;
        }
        Err(e) => warn!("Ignoring malformed update: {}", e),
    }

    // Echo what was received; Telegram only looks at the status code.
    let echo = serde_json::to_string_pretty(&raw).unwrap_or_default();
    ([(header::CONTENT_TYPE, "application/json")], echo).into_response()
}

/// `<proto>://<host>` of the current request, preferring the configured URL
fn public_base_url(config: &Config, headers: &HeaderMap) -> Option<String> {
    if let Some(url) = &config.server.public_url {
        return Some(url.trim_end_matches('/').to_string());
    }

    let host = headers.get(header::HOST)?.to_str().ok()?;
    let proto = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("https");
    Some(format!("{}://{}", proto, host))
}

async fn register_webhook(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(base) = public_base_url(&state.config, &headers) else {
        error!("Cannot register webhook: no public URL configured and no Host header");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Error: cannot determine public URL",
        )
            .into_response();
    };
    let url = format!("{}{}", base, WEBHOOK_PATH);

    match state
        .bot
        .api
        .set_webhook(&url, Some(&state.config.telegram.webhook_secret))
        .await
    {
        Ok(_) => {
            info!("Webhook registered at {}", url);
            (StatusCode::OK, "Webhook registered.").into_response()
        }
        Err(e) => {
            error!("Failed to register webhook at {}: {}", url, e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)).into_response()
        }
    }
}

async fn unregister_webhook(State(state): State<AppState>) -> Response {
    match state.bot.api.set_webhook("", None).await {
        Ok(_) => {
            info!("Webhook unregistered");
            (StatusCode::OK, "Webhook unregistered.").into_response()
        }
        Err(e) => {
            error!("Failed to unregister webhook: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Error: {}", e)).into_response()
        }
    }
}
