pub mod api;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use api::{BotApi, TelegramApi};
