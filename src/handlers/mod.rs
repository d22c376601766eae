//! One handler per update kind that has behavior. Handlers return errors
//! instead of logging them; the dispatcher is the single place that does.

pub mod callback_query;
pub mod inline_query;
pub mod location;
pub mod message;

use tracing::debug;

use crate::telegram::types::UpdateType;

/// Handler for update kinds the bot receives but does not act on
pub fn ignore(update_type: UpdateType) -> anyhow::Result<()> {
    debug!("No action for {} update", update_type);
    Ok(())
}
