use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::Result;
use futures::FutureExt;
use tracing::{debug, error};

use crate::handlers;
use crate::telegram::types::{Update, UpdateKind, UpdateType};
use crate::telegram::TelegramApi;

/// What every handler gets to work with
#[derive(Clone)]
pub struct BotContext {
    pub api: Arc<dyn TelegramApi>,
}

impl BotContext {
    pub fn new(api: Arc<dyn TelegramApi>) -> Self {
        Self { api }
    }
}

/// Run the handler registered for the update's kind, at most once.
///
/// Handler errors and panics stop here: they are logged and the caller always
/// gets control back. Returns the kind that was handled, `None` when the
/// update carried nothing the bot recognizes.
pub async fn dispatch(ctx: &BotContext, update: Update) -> Option<UpdateType> {
    let update_id = update.update_id;
    let Some(kind) = update.kind else {
        debug!("Update {} has no recognized payload, ignoring", update_id);
        return None;
    };
    let update_type = kind.update_type();

    debug!("Dispatching update {} as {}", update_id, update_type);

    match AssertUnwindSafe(route(ctx, kind)).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            error!(
                "Error handling {} update {}: {:#}",
                update_type, update_id, e
            );
        }
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(
                "Handler for {} update {} panicked: {}",
                update_type, update_id, reason
            );
        }
    }

    Some(update_type)
}

async fn route(ctx: &BotContext, kind: UpdateKind) -> Result<()> {
    match kind {
        UpdateKind::Message(msg) => handlers::message::handle(ctx, &msg).await,
        UpdateKind::InlineQuery(query) => handlers::inline_query::handle(ctx, &query).await,
        UpdateKind::CallbackQuery(query) => handlers::callback_query::handle(ctx, &query).await,
        other => handlers::ignore(other.update_type()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::message::HELP_TEXT;
    use crate::telegram::testing::RecordingApi;
    use serde_json::{json, Value};

    fn update(value: Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    fn context(api: &Arc<RecordingApi>) -> BotContext {
        BotContext::new(api.clone())
    }

    #[tokio::test]
    async fn test_help_scenario() {
        let api = Arc::new(RecordingApi::new());

        let handled = dispatch(
            &context(&api),
            update(json!({
                "message": {"text": "/help", "chat": {"id": 1}, "from": {"id": 1, "first_name": "A"}}
            })),
        )
        .await;

        assert_eq!(handled, Some(UpdateType::Message));
        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].method, "sendMessage");
        assert_eq!(calls[0].param("chat_id"), Some(&json!(1)));
        assert_eq!(calls[0].param("text"), Some(&json!(HELP_TEXT)));
    }

    #[tokio::test]
    async fn test_each_kind_reaches_its_handler_once() {
        let cases = [
            (
                json!({"message": {"text": "hi", "chat": {"id": 4}}}),
                UpdateType::Message,
                Some("sendMessage"),
            ),
            (
                json!({"inline_query": {
                    "id": "q", "from": {"id": 4, "first_name": "B"},
                    "location": {"latitude": 1.0, "longitude": 2.0}
                }}),
                UpdateType::InlineQuery,
                Some("sendMessage"),
            ),
            (
                json!({"callback_query": {"id": "c", "from": {"id": 4, "first_name": "B"}}}),
                UpdateType::CallbackQuery,
                Some("answerCallbackQuery"),
            ),
            (
                json!({"edited_message": {"text": "/help", "chat": {"id": 4}}}),
                UpdateType::EditedMessage,
                None,
            ),
            (
                json!({"chat_join_request": {"chat": {"id": 4}}}),
                UpdateType::ChatJoinRequest,
                None,
            ),
        ];

        for (body, expected_type, expected_call) in cases {
            let api = Arc::new(RecordingApi::new());
            let handled = dispatch(&context(&api), update(body)).await;

            assert_eq!(handled, Some(expected_type));
            let methods: Vec<String> = api.calls().into_iter().map(|c| c.method).collect();
            match expected_call {
                Some(method) => assert_eq!(methods, vec![method.to_string()], "{}", expected_type),
                None => assert!(methods.is_empty(), "{}", expected_type),
            }
        }
    }

    #[tokio::test]
    async fn test_only_first_populated_field_is_handled() {
        let api = Arc::new(RecordingApi::new());

        let handled = dispatch(
            &context(&api),
            update(json!({
                "inline_query": {
                    "id": "q", "from": {"id": 8, "first_name": "B"},
                    "location": {"latitude": 1.0, "longitude": 2.0}
                },
                "message": {"text": "/help", "chat": {"id": 1}}
            })),
        )
        .await;

        assert_eq!(handled, Some(UpdateType::Message));
        assert_eq!(api.calls().len(), 1);
        assert_eq!(api.calls()[0].param("chat_id"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_unrecognized_update_invokes_nothing() {
        let api = Arc::new(RecordingApi::new());

        let handled = dispatch(&context(&api), update(json!({"update_id": 3}))).await;

        assert_eq!(handled, None);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_handler_error_is_contained() {
        let api = Arc::new(RecordingApi::rejecting());

        let handled = dispatch(
            &context(&api),
            update(json!({"message": {"text": "/help", "chat": {"id": 1}}})),
        )
        .await;

        assert_eq!(handled, Some(UpdateType::Message));
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_handler_panic_is_contained() {
        let api = Arc::new(RecordingApi::panicking());

        let handled = dispatch(
            &context(&api),
            update(json!({"callback_query": {"id": "c", "from": {"id": 4, "first_name": "B"}}})),
        )
        .await;

        assert_eq!(handled, Some(UpdateType::CallbackQuery));
    }
}
