use anyhow::Result;
use tracing::{debug, info};

use crate::bot::BotContext;
use crate::telegram::types::InlineQuery;
use crate::telegram::TelegramApi;

/// Only location-bearing queries get an answer; everything else is skipped.
pub async fn handle(ctx: &BotContext, query: &InlineQuery) -> Result<()> {
    let Some(location) = query.location else {
        debug!("Inline query {} carries no location, skipping", query.id);
        return Ok(());
    };

    info!("Inline query {} from user {} with location", query.id, query.from.id);

    let text = format!(
        "Received your location: Latitude {}, Longitude {}",
        location.latitude, location.longitude
    );
    ctx.api.send_message(query.from.id, &text, None).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telegram::testing::RecordingApi;
    use crate::telegram::types::{Location, User};
    use serde_json::json;
    use std::sync::Arc;

    fn query(location: Option<Location>) -> InlineQuery {
        InlineQuery {
            id: "q1".to_string(),
            from: User {
                id: 555,
                is_bot: false,
                first_name: "Q".to_string(),
                last_name: None,
                username: None,
                language_code: None,
            },
            query: String::new(),
            offset: String::new(),
            location,
        }
    }

    #[tokio::test]
    async fn test_location_is_echoed_to_sender() {
        let api = Arc::new(RecordingApi::new());
        let ctx = BotContext::new(api.clone());

        let loc = Location {
            latitude: 52.5,
            longitude: 13.25,
            horizontal_accuracy: None,
            live_period: None,
        };
        handle(&ctx, &query(Some(loc))).await.unwrap();

        let calls = api.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].param("chat_id"), Some(&json!(555)));
        assert_eq!(
            calls[0].param("text"),
            Some(&json!("Received your location: Latitude 52.5, Longitude 13.25"))
        );
    }

    #[tokio::test]
    async fn test_query_without_location_is_ignored() {
        let api = Arc::new(RecordingApi::new());
        let ctx = BotContext::new(api.clone());

        handle(&ctx, &query(None)).await.unwrap();

        assert!(api.calls().is_empty());
    }
}
