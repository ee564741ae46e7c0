//! Shared stylesheet, injected once per document.
//!
//! Every selector and keyframe name carries the `chatbot-` prefix so the
//! widget cannot collide with host page styles.

use crate::error::WidgetError;
use crate::host::HostDocument;

/// Sentinel id of the injected `<style>` element.
pub const STYLE_ELEMENT_ID: &str = "chatbot-widget-styles";

pub const CONTAINER_CLASS: &str = "chatbot-widget";
pub const TOGGLE_CLASS: &str = "chatbot-toggle";
pub const WINDOW_CLASS: &str = "chatbot-window";
pub const HEADER_CLASS: &str = "chatbot-header";
pub const TITLE_CLASS: &str = "chatbot-title";
pub const CLOSE_CLASS: &str = "chatbot-close";
pub const MESSAGES_CLASS: &str = "chatbot-messages";
pub const MESSAGE_CLASS: &str = "chatbot-message";
pub const INPUT_AREA_CLASS: &str = "chatbot-input-area";
pub const INPUT_CLASS: &str = "chatbot-input";
pub const SEND_CLASS: &str = "chatbot-send";
pub const LOADING_CLASS: &str = "chatbot-loading";
pub const LOADING_DOTS_CLASS: &str = "chatbot-loading-dots";
pub const LOADING_DOT_CLASS: &str = "chatbot-loading-dot";
pub const OPEN_CLASS: &str = "chatbot-open";

pub const TITLE_TEXT: &str = "Chat with us";
pub const INPUT_PLACEHOLDER: &str = "Type your message...";
pub const SEND_LABEL: &str = "Send";
pub const TYPING_LABEL: &str = "Typing";
pub const TOGGLE_ICON: &str = "💬";
pub const CLOSE_ICON: &str = "✕";

/// Inject the stylesheet unless a previous widget already did.
///
/// Returns `true` when this call performed the injection.
///
/// # Errors
///
/// Propagates host document failures.
pub fn ensure_styles<D: HostDocument>(doc: &D) -> Result<bool, WidgetError> {
    if doc.has_element(STYLE_ELEMENT_ID) {
        return Ok(false);
    }
    doc.inject_style(STYLE_ELEMENT_ID, STYLESHEET)?;
    Ok(true)
}

pub const STYLESHEET: &str = r"
.chatbot-widget {
  position: fixed;
  bottom: 20px;
  z-index: 9999;
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
}
.chatbot-widget--bottom-right { right: 20px; }
.chatbot-widget--bottom-left { left: 20px; }
.chatbot-toggle {
  width: 60px;
  height: 60px;
  border-radius: 50%;
  background: linear-gradient(135deg, #8b5cf6, #a855f7);
  border: none;
  color: white;
  cursor: pointer;
  box-shadow: 0 8px 32px rgba(139, 92, 246, 0.3);
  transition: all 0.3s ease;
  display: flex;
  align-items: center;
  justify-content: center;
  font-size: 24px;
}
.chatbot-toggle:hover {
  transform: scale(1.1);
  box-shadow: 0 12px 40px rgba(139, 92, 246, 0.4);
}
.chatbot-window {
  position: absolute;
  bottom: 80px;
  width: 350px;
  height: 500px;
  background: white;
  border-radius: 16px;
  box-shadow: 0 20px 60px rgba(0, 0, 0, 0.15);
  border: 1px solid #e5e7eb;
  display: none;
  flex-direction: column;
  overflow: hidden;
}
.chatbot-widget--bottom-right .chatbot-window { right: 0; }
.chatbot-widget--bottom-left .chatbot-window { left: 0; }
.chatbot-window.chatbot-open {
  display: flex;
  animation: chatbot-slide-up 0.3s ease-out;
}
@keyframes chatbot-slide-up {
  from { opacity: 0; transform: translateY(20px); }
  to { opacity: 1; transform: translateY(0); }
}
.chatbot-header {
  background: linear-gradient(135deg, #8b5cf6, #a855f7);
  color: white;
  padding: 16px;
  display: flex;
  align-items: center;
  justify-content: space-between;
}
.chatbot-title { font-weight: 600; font-size: 16px; }
.chatbot-close {
  background: none;
  border: none;
  color: white;
  cursor: pointer;
  padding: 4px;
  border-radius: 4px;
  opacity: 0.8;
  font-size: 20px;
  line-height: 1;
}
.chatbot-close:hover { opacity: 1; background: rgba(255, 255, 255, 0.1); }
.chatbot-messages {
  flex: 1;
  padding: 16px;
  overflow-y: auto;
  display: flex;
  flex-direction: column;
  gap: 12px;
  background: #f9fafb;
}
.chatbot-message {
  padding: 12px 16px;
  border-radius: 12px;
  max-width: 80%;
  word-wrap: break-word;
  line-height: 1.4;
  font-size: 14px;
}
.chatbot-message.chatbot-message--user {
  background: #8b5cf6;
  color: white;
  align-self: flex-end;
  border-bottom-right-radius: 4px;
}
.chatbot-message.chatbot-message--bot {
  background: white;
  color: #374151;
  align-self: flex-start;
  border: 1px solid #e5e7eb;
  border-bottom-left-radius: 4px;
}
.chatbot-input-area {
  padding: 16px;
  border-top: 1px solid #e5e7eb;
  background: white;
  display: flex;
  gap: 8px;
}
.chatbot-input {
  flex: 1;
  padding: 12px;
  border: 1px solid #d1d5db;
  border-radius: 8px;
  font-size: 14px;
  outline: none;
  transition: border-color 0.2s;
}
.chatbot-input:focus { border-color: #8b5cf6; }
.chatbot-send {
  padding: 12px 16px;
  background: #8b5cf6;
  color: white;
  border: none;
  border-radius: 8px;
  cursor: pointer;
  font-size: 14px;
  font-weight: 500;
  transition: background-color 0.2s;
}
.chatbot-send:hover { background: #7c3aed; }
.chatbot-send:disabled { background: #d1d5db; cursor: not-allowed; }
.chatbot-loading {
  display: flex;
  align-items: center;
  gap: 4px;
  color: #6b7280;
  font-size: 14px;
  padding: 12px 16px;
}
.chatbot-loading-dots { display: flex; gap: 2px; }
.chatbot-loading-dot {
  width: 4px;
  height: 4px;
  background: #6b7280;
  border-radius: 50%;
  animation: chatbot-pulse 1.4s infinite ease-in-out;
}
.chatbot-loading-dot:nth-child(1) { animation-delay: -0.32s; }
.chatbot-loading-dot:nth-child(2) { animation-delay: -0.16s; }
@keyframes chatbot-pulse {
  0%, 80%, 100% { opacity: 0.3; }
  40% { opacity: 1; }
}
.chatbot-widget--dark .chatbot-messages { background: #111827; }
.chatbot-widget--dark .chatbot-message.chatbot-message--bot {
  background: #1f2937;
  color: #e5e7eb;
  border-color: #374151;
}
.chatbot-widget--dark .chatbot-input-area { background: #1f2937; border-top-color: #374151; }
@media (max-width: 480px) {
  .chatbot-window {
    width: calc(100vw - 40px);
    height: calc(100vh - 120px);
  }
}
";

/// Class list for the container element.
#[must_use]
pub fn container_classes(config: &crate::config::WidgetConfig) -> String {
    format!(
        "{CONTAINER_CLASS} {CONTAINER_CLASS}--{} {CONTAINER_CLASS}--{}",
        config.position.as_str(),
        config.theme.as_str()
    )
}

/// Class list for a rendered message.
#[must_use]
pub fn message_classes(sender: crate::message::Sender) -> String {
    format!("{MESSAGE_CLASS} {MESSAGE_CLASS}--{}", sender.as_str())
}
