use anyhow::Result;
use tracing::info;

use crate::bot::BotContext;
use crate::telegram::types::CallbackQuery;
use crate::telegram::TelegramApi;

/// Acknowledge the button press so the client stops showing a spinner.
pub async fn handle(ctx: &BotContext, query: &CallbackQuery) -> Result<()> {
    info!(
        "Callback query {} from user {}: {:?}",
        query.id, query.from.id, query.data
    );
    ctx.api.answer_callback_query(&query.id).await?;
    Ok(())
}
