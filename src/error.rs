//! Error taxonomy for the widget.
//!
//! Configuration errors are fatal to the one instance being constructed.
//! Transport and protocol errors are recoverable: the controller turns them
//! into a single apology turn and the widget stays interactive.

/// Error returned by widget construction, host bindings and reply transports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    /// `chatbotId` was absent or blank.
    #[error("chatbotId is required")]
    MissingChatbotId,
    /// A widget with this id is already mounted on the page.
    #[error("a widget for chatbot `{0}` is already mounted")]
    DuplicateChatbotId(String),
    /// An option value could not be interpreted.
    #[error("invalid widget option `{name}`: {reason}")]
    InvalidOption { name: &'static str, reason: String },
    /// The reply endpoint could not be reached.
    #[error("reply request failed: {0}")]
    Transport(String),
    /// The reply endpoint did not answer within the configured timeout.
    #[error("reply request timed out")]
    Timeout,
    /// The reply endpoint answered with a non-success status.
    #[error("reply endpoint returned HTTP {status}")]
    Status { status: u16 },
    /// The reply body was not valid JSON of the expected shape.
    #[error("malformed reply body: {0}")]
    Decode(String),
    /// The host document refused a DOM operation.
    #[error("host document error: {0}")]
    Dom(String),
    /// wasm-bindgen output could not be assembled into `widget.js`.
    #[error("widget bundle failed: {0}")]
    Bundle(String),
}

impl WidgetError {
    /// Whether this error is a configuration problem rather than a failed exchange.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Self::MissingChatbotId | Self::DuplicateChatbotId(_) | Self::InvalidOption { .. }
        )
    }
}
