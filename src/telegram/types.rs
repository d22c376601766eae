//! Update envelope and the payload types the handlers read.
//!
//! Telegram populates exactly one optional field per update. Decoding walks
//! [`UpdateType::ALL`] in order and keeps the first field that is present and
//! not `null`, so the result is a single [`UpdateKind`] variant.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateType {
    Message,
    EditedMessage,
    ChannelPost,
    EditedChannelPost,
    BusinessConnection,
    BusinessMessage,
    EditedBusinessMessage,
    DeletedBusinessMessages,
    MessageReaction,
    MessageReactionCount,
    InlineQuery,
    ChosenInlineResult,
    CallbackQuery,
    ShippingQuery,
    PreCheckoutQuery,
    Poll,
    PollAnswer,
    MyChatMember,
    ChatMember,
    ChatJoinRequest,
    ChatBoost,
    RemovedChatBoost,
}

impl UpdateType {
    /// Registration order. The first populated field in this order wins.
    pub const ALL: [UpdateType; 22] = [
        UpdateType::Message,
        UpdateType::EditedMessage,
        UpdateType::ChannelPost,
        UpdateType::EditedChannelPost,
        UpdateType::BusinessConnection,
        UpdateType::BusinessMessage,
        UpdateType::EditedBusinessMessage,
        UpdateType::DeletedBusinessMessages,
        UpdateType::MessageReaction,
        UpdateType::MessageReactionCount,
        UpdateType::InlineQuery,
        UpdateType::ChosenInlineResult,
        UpdateType::CallbackQuery,
        UpdateType::ShippingQuery,
        UpdateType::PreCheckoutQuery,
        UpdateType::Poll,
        UpdateType::PollAnswer,
        UpdateType::MyChatMember,
        UpdateType::ChatMember,
        UpdateType::ChatJoinRequest,
        UpdateType::ChatBoost,
        UpdateType::RemovedChatBoost,
    ];

    /// Field name in the Bot API update object
    pub fn field_name(self) -> &'static str {
        match self {
            UpdateType::Message => "message",
            UpdateType::EditedMessage => "edited_message",
            UpdateType::ChannelPost => "channel_post",
            UpdateType::EditedChannelPost => "edited_channel_post",
            UpdateType::BusinessConnection => "business_connection",
            UpdateType::BusinessMessage => "business_message",
            UpdateType::EditedBusinessMessage => "edited_business_message",
            UpdateType::DeletedBusinessMessages => "deleted_business_messages",
            UpdateType::MessageReaction => "message_reaction",
            UpdateType::MessageReactionCount => "message_reaction_count",
            UpdateType::InlineQuery => "inline_query",
            UpdateType::ChosenInlineResult => "chosen_inline_result",
            UpdateType::CallbackQuery => "callback_query",
            UpdateType::ShippingQuery => "shipping_query",
            UpdateType::PreCheckoutQuery => "pre_checkout_query",
            UpdateType::Poll => "poll",
            UpdateType::PollAnswer => "poll_answer",
            UpdateType::MyChatMember => "my_chat_member",
            UpdateType::ChatMember => "chat_member",
            UpdateType::ChatJoinRequest => "chat_join_request",
            UpdateType::ChatBoost => "chat_boost",
            UpdateType::RemovedChatBoost => "removed_chat_boost",
        }
    }
}

impl std::fmt::Display for UpdateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.field_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum UpdateKind {
    Message(Message),
    EditedMessage(Message),
    ChannelPost(Message),
    EditedChannelPost(Message),
    BusinessConnection(Value),
    BusinessMessage(Message),
    EditedBusinessMessage(Message),
    DeletedBusinessMessages(Value),
    MessageReaction(Value),
    MessageReactionCount(Value),
    InlineQuery(InlineQuery),
    ChosenInlineResult(ChosenInlineResult),
    CallbackQuery(CallbackQuery),
    ShippingQuery(Value),
    PreCheckoutQuery(Value),
    Poll(Value),
    PollAnswer(Value),
    MyChatMember(Value),
    ChatMember(Value),
    ChatJoinRequest(Value),
    ChatBoost(Value),
    RemovedChatBoost(Value),
}

impl UpdateKind {
    pub fn update_type(&self) -> UpdateType {
        match self {
            UpdateKind::Message(_) => UpdateType::Message,
            UpdateKind::EditedMessage(_) => UpdateType::EditedMessage,
            UpdateKind::ChannelPost(_) => UpdateType::ChannelPost,
            UpdateKind::EditedChannelPost(_) => UpdateType::EditedChannelPost,
            UpdateKind::BusinessConnection(_) => UpdateType::BusinessConnection,
            UpdateKind::BusinessMessage(_) => UpdateType::BusinessMessage,
            UpdateKind::EditedBusinessMessage(_) => UpdateType::EditedBusinessMessage,
            UpdateKind::DeletedBusinessMessages(_) => UpdateType::DeletedBusinessMessages,
            UpdateKind::MessageReaction(_) => UpdateType::MessageReaction,
            UpdateKind::MessageReactionCount(_) => UpdateType::MessageReactionCount,
            UpdateKind::InlineQuery(_) => UpdateType::InlineQuery,
            UpdateKind::ChosenInlineResult(_) => UpdateType::ChosenInlineResult,
            UpdateKind::CallbackQuery(_) => UpdateType::CallbackQuery,
            UpdateKind::ShippingQuery(_) => UpdateType::ShippingQuery,
            UpdateKind::PreCheckoutQuery(_) => UpdateType::PreCheckoutQuery,
            UpdateKind::Poll(_) => UpdateType::Poll,
            UpdateKind::PollAnswer(_) => UpdateType::PollAnswer,
            UpdateKind::MyChatMember(_) => UpdateType::MyChatMember,
            UpdateKind::ChatMember(_) => UpdateType::ChatMember,
            UpdateKind::ChatJoinRequest(_) => UpdateType::ChatJoinRequest,
            UpdateKind::ChatBoost(_) => UpdateType::ChatBoost,
            UpdateKind::RemovedChatBoost(_) => UpdateType::RemovedChatBoost,
        }
    }

    fn from_payload(ty: UpdateType, payload: Value) -> serde_json::Result<Self> {
        use serde_json::from_value as typed;

        Ok(match ty {
            UpdateType::Message => UpdateKind::Message(typed(payload)?),
            UpdateType::EditedMessage => UpdateKind::EditedMessage(typed(payload)?),
            UpdateType::ChannelPost => UpdateKind::ChannelPost(typed(payload)?),
            UpdateType::EditedChannelPost => UpdateKind::EditedChannelPost(typed(payload)?),
            UpdateType::BusinessConnection => UpdateKind::BusinessConnection(payload),
            UpdateType::BusinessMessage => UpdateKind::BusinessMessage(typed(payload)?),
            UpdateType::EditedBusinessMessage => {
                UpdateKind::EditedBusinessMessage(typed(payload)?)
            }
            UpdateType::DeletedBusinessMessages => UpdateKind::DeletedBusinessMessages(payload),
            UpdateType::MessageReaction => UpdateKind::MessageReaction(payload),
            UpdateType::MessageReactionCount => UpdateKind::MessageReactionCount(payload),
            UpdateType::InlineQuery => UpdateKind::InlineQuery(typed(payload)?),
            UpdateType::ChosenInlineResult => UpdateKind::ChosenInlineResult(typed(payload)?),
            UpdateType::CallbackQuery => UpdateKind::CallbackQuery(typed(payload)?),
            UpdateType::ShippingQuery => UpdateKind::ShippingQuery(payload),
            UpdateType::PreCheckoutQuery => UpdateKind::PreCheckoutQuery(payload),
            UpdateType::Poll => UpdateKind::Poll(payload),
            UpdateType::PollAnswer => UpdateKind::PollAnswer(payload),
            UpdateType::MyChatMember => UpdateKind::MyChatMember(payload),
            UpdateType::ChatMember => UpdateKind::ChatMember(payload),
            UpdateType::ChatJoinRequest => UpdateKind::ChatJoinRequest(payload),
            UpdateType::ChatBoost => UpdateKind::ChatBoost(payload),
            UpdateType::RemovedChatBoost => UpdateKind::RemovedChatBoost(payload),
        })
    }
}

/// An inbound update. `kind` is `None` when no recognized field is populated.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub update_id: i64,
    pub kind: Option<UpdateKind>,
}

impl Update {
    pub fn update_type(&self) -> Option<UpdateType> {
        self.kind.as_ref().map(UpdateKind::update_type)
    }

    fn from_object(mut object: Map<String, Value>) -> serde_json::Result<Self> {
        let update_id = object
            .get("update_id")
            .and_then(Value::as_i64)
            .unwrap_or_default();

        let populated = UpdateType::ALL.into_iter().find_map(|ty| {
            match object.remove(ty.field_name()) {
                None | Some(Value::Null) => None,
                Some(payload) => Some((ty, payload)),
            }
        });

        let kind = match populated {
            Some((ty, payload)) => Some(
                UpdateKind::from_payload(ty, payload)
                    .map_err(|e| serde_json::Error::custom(format!("{}: {}", ty, e)))?,
            ),
            None => None,
        };

        Ok(Self { update_id, kind })
    }
}

impl<'de> Deserialize<'de> for Update {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let object = Map::deserialize(deserializer)?;
        Update::from_object(object).map_err(D::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[allow(dead_code)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub language_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[allow(dead_code)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[allow(dead_code)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    /// Radius of uncertainty in meters
    #[serde(default)]
    pub horizontal_accuracy: Option<f64>,
    #[serde(default)]
    pub live_period: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[allow(dead_code)]
pub struct Message {
    #[serde(default)]
    pub message_id: i64,
    #[serde(default)]
    pub date: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl Message {
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[allow(dead_code)]
pub struct InlineQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub offset: String,
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[allow(dead_code)]
pub struct ChosenInlineResult {
    pub result_id: String,
    pub from: User,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[allow(dead_code)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Value>,
}
