use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::debug;

pub type Params = Map<String, Value>;

/// Errors never include the request URL: it carries the bot token and, for
/// `setWebhook`, the webhook secret.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {method} failed")]
    Transport {
        method: String,
        #[source]
        source: reqwest::Error,
    },
    #[error(
        "API call {method} failed ({}): {} (response: {envelope})",
        .error_code.unwrap_or_default(),
        .description.as_deref().unwrap_or("no description")
    )]
    Rejected {
        method: String,
        error_code: Option<i64>,
        description: Option<String>,
        /// Raw `{ok, error_code, description, ...}` body
        envelope: Value,
    },
    #[error("unexpected result from {method}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    result: Value,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    error_code: Option<i64>,
}

fn unwrap_envelope(method: &str, body: Value) -> Result<Value, ApiError> {
    let envelope: Envelope = match serde_json::from_value(body.clone()) {
        Ok(envelope) => envelope,
        Err(source) => {
            return Err(ApiError::Decode {
                method: method.to_string(),
                source,
            })
        }
    };

    if envelope.ok {
        Ok(envelope.result)
    } else {
        Err(ApiError::Rejected {
            method: method.to_string(),
            error_code: envelope.error_code,
            description: envelope.description,
            envelope: body,
        })
    }
}

/// Query-string pairs for a Bot API call. Nulls are dropped, strings go
/// through untouched and everything else is sent JSON-encoded.
pub fn encode_params(params: &Params) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key.clone(), s.clone())),
            other => Some((key.clone(), other.to_string())),
        })
        .collect()
}

fn into_params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

fn decode<T: DeserializeOwned>(method: &str, result: Value) -> Result<T, ApiError> {
    serde_json::from_value(result).map_err(|source| ApiError::Decode {
        method: method.to_string(),
        source,
    })
}

/// The Telegram Bot API as seen by the handlers and the webhook server.
///
/// Only [`TelegramApi::call`] talks to the network; the typed methods build
/// their parameter maps on top of it.
#[async_trait]
pub trait TelegramApi: Send + Sync {
    async fn call(&self, method: &str, params: Params) -> Result<Value, ApiError>;

    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_markup: Option<Value>,
    ) -> Result<Value, ApiError> {
        self.call(
            "sendMessage",
            into_params(json!({
                "chat_id": chat_id,
                "text": text,
                "reply_markup": reply_markup,
            })),
        )
        .await
    }

    async fn answer_callback_query(&self, callback_query_id: &str) -> Result<bool, ApiError> {
        let result = self
            .call(
                "answerCallbackQuery",
                into_params(json!({ "callback_query_id": callback_query_id })),
            )
            .await?;
        decode("answerCallbackQuery", result)
    }

    /// Register `url` as the webhook. An empty `url` removes the webhook, and
    /// in that case no secret is sent.
    async fn set_webhook(&self, url: &str, secret_token: Option<&str>) -> Result<bool, ApiError> {
        let mut params = Params::new();
        params.insert("url".to_string(), Value::from(url));
        if !url.is_empty() {
            if let Some(secret) = secret_token {
                params.insert("secret_token".to_string(), Value::from(secret));
            }
        }

        let result = self.call("setWebhook", params).await?;
        decode("setWebhook", result)
    }

    async fn get_webhook_info(&self) -> Result<Value, ApiError> {
        self.call("getWebhookInfo", Params::new()).await
    }
}

/// HTTP implementation against `<api_url>/bot<token>/<method>`.
pub struct BotApi {
    client: reqwest::Client,
    api_url: String,
    token: String,
}

impl BotApi {
    pub fn new(api_url: &str, token: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_url, self.token, method)
    }
}

#[async_trait]
impl TelegramApi for BotApi {
    async fn call(&self, method: &str, params: Params) -> Result<Value, ApiError> {
        let query = encode_params(&params);

        // The URL embeds the token, so only the method is logged.
        debug!("Calling Telegram API method {} ({} params)", method, query.len());

        let transport = |source: reqwest::Error| ApiError::Transport {
            method: method.to_string(),
            source: source.without_url(),
        };

        let body: Value = self
            .client
            .get(self.method_url(method))
            .query(&query)
            .send()
            .await
            .map_err(transport)?
            .json()
            .await
            .map_err(transport)?;

        unwrap_envelope(method, body)
    }
}
