//! Wire types for the chatbot backend.
//!
//! ```text
//! POST {base}/chatbot/respond   {"chatbot_id": "...", "message": "..."}
//!                            -> {"reply": "...", "meta": {"confidence": 0.9}}
//! GET  {base}/chatbot/{id}   -> ChatbotInfo
//! POST {base}/chatbot/create    CreateChatbotRequest -> CreateChatbotResponse
//! ```

#[cfg(test)]
#[path = "protocol_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};

use crate::error::WidgetError;

/// Shown whenever an exchange fails. Raw error text never reaches the visitor.
pub const APOLOGY: &str = "Sorry, I'm having trouble connecting right now. Please try again later.";

/// Shown when the endpoint succeeds but returns no usable `reply`.
pub const EMPTY_REPLY_FALLBACK: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RespondRequest {
    pub chatbot_id: String,
    pub message: String,
}

impl RespondRequest {
    #[must_use]
    pub fn new(chatbot_id: &str, message: &str) -> Self {
        Self { chatbot_id: chatbot_id.to_owned(), message: message.to_owned() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RespondResponse {
    #[serde(default)]
    pub reply: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ReplyMeta>,
}

impl RespondResponse {
    /// Text to render as the bot turn, falling back when `reply` is absent or blank.
    #[must_use]
    pub fn reply_text(&self) -> &str {
        match self.reply.as_deref() {
            Some(reply) if !reply.trim().is_empty() => reply,
            _ => EMPTY_REPLY_FALLBACK,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub q: String,
    pub a: String,
}

/// Public description of a chatbot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatbotInfo {
    pub chatbot_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub faqs: Vec<Faq>,
}

/// Voice the generated chatbot answers in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Friendly,
    Professional,
    Casual,
}

impl Tone {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Friendly => "friendly",
            Self::Professional => "professional",
            Self::Casual => "casual",
        }
    }
}

/// Business profile a new chatbot is generated from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateChatbotRequest {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub faqs: Vec<Faq>,
}

impl CreateChatbotRequest {
    #[must_use]
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.trim().to_owned(),
            description: description.trim().to_owned(),
            website_url: None,
            tone: Tone::default(),
            faqs: Vec::new(),
        }
    }
}

/// Profile as stored by the backend, echoed back on creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    #[serde(default)]
    pub tone: String,
    #[serde(default)]
    pub faqs: Vec<Faq>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_display_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateChatbotResponse {
    pub chatbot_id: String,
    pub embed_script_url: String,
    pub created_at: String,
    pub config: BusinessInfo,
}

/// Decode a reply body, mapping serde failures into the protocol error class.
///
/// # Errors
///
/// Returns [`WidgetError::Decode`] if `body` is not a JSON object of the expected shape.
pub fn parse_respond_body(body: &str) -> Result<RespondResponse, WidgetError> {
    serde_json::from_str(body).map_err(|e| WidgetError::Decode(e.to_string()))
}

/// Map a non-success HTTP status into an error; 2xx passes through.
///
/// # Errors
///
/// Returns [`WidgetError::Status`] for anything outside `200..300`.
pub fn check_status(status: u16) -> Result<(), WidgetError> {
    if (200..300).contains(&status) { Ok(()) } else { Err(WidgetError::Status { status }) }
}
