use anyhow::Result;
use serde_json::{json, Value};
use tracing::info;

use crate::bot::BotContext;
use crate::handlers::location;
use crate::telegram::types::Message;
use crate::telegram::TelegramApi;

pub const HELP_TEXT: &str = "Available commands:
/help - Show this help message
/start - Start the bot
/change_location - Change your location";

pub const CHANGE_LOCATION_TEXT: &str = "Please send your new location.";

/// One-time reply keyboard with a single location-request button
fn location_keyboard() -> Value {
    json!({
        "keyboard": [[{ "text": "Send Location", "request_location": true }]],
        "resize_keyboard": true,
        "one_time_keyboard": true,
    })
}

pub fn greeting(first_name: Option<&str>) -> String {
    format!(
        "Hello, {}! Welcome to the bot. Use /help to see available commands.",
        first_name.unwrap_or("there")
    )
}

pub async fn handle(ctx: &BotContext, msg: &Message) -> Result<()> {
    let chat_id = msg.chat.id;
    let text = msg.text().unwrap_or_default();

    info!(
        "Message {} in chat {}: {:?}",
        msg.message_id, chat_id, text
    );

    match text {
        "/help" => {
            ctx.api.send_message(chat_id, HELP_TEXT, None).await?;
        }
        "/change_location" => {
            ctx.api
                .send_message(chat_id, CHANGE_LOCATION_TEXT, Some(location_keyboard()))
                .await?;
        }
        _ => match &msg.location {
            Some(loc) => location::handle(ctx, chat_id, loc).await?,
            None => {
                let name = msg.from.as_ref().map(|u| u.first_name.as_str());
                ctx.api.send_message(chat_id, &greeting(name), None).await?;
            }
        },
    }

    Ok(())
}
