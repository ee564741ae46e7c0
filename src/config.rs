//! Widget configuration.
//!
//! `WidgetOptions` is the loose, all-optional shape a host page hands over
//! (camelCase, as written in JS). `WidgetConfig::from_options` is the single
//! place defaults are applied; everything downstream sees a complete,
//! immutable `WidgetConfig`.

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::WidgetError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.example.com";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_FOCUS_DELAY_MS: u64 = 300;

/// Visual theme. Only applied as a class modifier on the container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

/// Corner of the viewport the toggle button is pinned to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
}

impl Position {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
        }
    }
}

/// Options as supplied by the host page or the auto-discovery scan.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetOptions {
    #[serde(default)]
    pub chatbot_id: Option<String>,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub theme: Option<Theme>,
    #[serde(default)]
    pub position: Option<Position>,
    /// Request timeout in milliseconds; `0` disables it.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,
}

impl WidgetOptions {
    /// Options carrying only the required id.
    #[must_use]
    pub fn for_chatbot(chatbot_id: impl Into<String>) -> Self {
        Self { chatbot_id: Some(chatbot_id.into()), ..Self::default() }
    }

    /// Parse options from the JSON form a host page passes to the constructor.
    ///
    /// `null` yields empty options, so a missing argument surfaces as
    /// [`WidgetError::MissingChatbotId`] once defaults are applied.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::InvalidOption`] when the JSON does not match.
    pub fn from_json(raw: &str) -> Result<Self, WidgetError> {
        serde_json::from_str::<Option<Self>>(raw)
            .map(Option::unwrap_or_default)
            .map_err(|e| WidgetError::InvalidOption { name: "options", reason: e.to_string() })
    }
}

/// Complete configuration for one widget instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetConfig {
    pub chatbot_id: String,
    pub api_base_url: String,
    pub theme: Theme,
    pub position: Position,
    /// `None` means no widget-level timeout.
    pub request_timeout: Option<Duration>,
    pub focus_delay: Duration,
}

impl WidgetConfig {
    /// Config for `chatbot_id` with every other field at its default.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::MissingChatbotId`] if the id is blank.
    pub fn new(chatbot_id: impl Into<String>) -> Result<Self, WidgetError> {
        Self::from_options(WidgetOptions::for_chatbot(chatbot_id))
    }

    /// Apply defaults to host-supplied options.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::MissingChatbotId`] if `chatbotId` is absent or blank.
    pub fn from_options(options: WidgetOptions) -> Result<Self, WidgetError> {
        let chatbot_id = options
            .chatbot_id
            .map(|id| id.trim().to_owned())
            .filter(|id| !id.is_empty())
            .ok_or(WidgetError::MissingChatbotId)?;

        let api_base_url = options
            .api_base_url
            .as_deref()
            .map(normalize_base_url)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());

        let request_timeout = match options.request_timeout_ms.unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS) {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        };

        Ok(Self {
            chatbot_id,
            api_base_url,
            theme: options.theme.unwrap_or_default(),
            position: options.position.unwrap_or_default(),
            request_timeout,
            focus_delay: Duration::from_millis(DEFAULT_FOCUS_DELAY_MS),
        })
    }

    /// Full URL of the reply endpoint.
    #[must_use]
    pub fn respond_url(&self) -> String {
        format!("{}/chatbot/respond", self.api_base_url)
    }

    /// Full URL of the chatbot info endpoint.
    #[must_use]
    pub fn info_url(&self) -> String {
        format!("{}/chatbot/{}", self.api_base_url, self.chatbot_id)
    }
}

/// Trim whitespace and trailing slashes so paths can be appended directly.
#[must_use]
pub fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}
