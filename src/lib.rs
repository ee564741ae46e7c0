//! # chatbot-widget
//!
//! Embeddable floating chat widget for generated chatbots. A page drops in
//!
//! ```html
//! <script src="https://bots.example.com/widget.js" data-chatbot-id="abc123"></script>
//! ```
//!
//! and gets a toggle button in a screen corner that opens a small chat panel
//! talking to `POST {api}/chatbot/respond`.
//!
//! The controller (`widget`) is host-agnostic: it drives a `host::Surface`
//! and a `transport::ReplyClient`. With the `browser` feature the crate
//! compiles to a WASM module that binds those seams to the DOM and `fetch`;
//! the default `native` feature provides a `reqwest` client and an in-memory
//! host for tests and the companion CLI.
//!
//! The page-facing `widget.js` is built in two steps:
//!
//! ```text
//! wasm-pack build --target no-modules --no-typescript --out-name chatbot_widget -- --no-default-features --features browser
//! chatbot-cli bundle --pkg-dir pkg --out-dir dist
//! ```
//!
//! `dist/` then holds `widget.js` and `chatbot_widget_bg.wasm`, served side by side.

pub mod bundle;
pub mod config;
pub mod discovery;
pub mod embed;
pub mod error;
pub mod headless;
pub mod host;
pub mod message;
pub mod protocol;
pub mod registry;
pub mod styles;
pub mod transport;
pub mod widget;

#[cfg(feature = "browser")]
pub mod web;

pub use config::{Position, Theme, WidgetConfig, WidgetOptions};
pub use error::WidgetError;
pub use message::{ChatMessage, Sender, Transcript};
pub use registry::WidgetRegistry;
pub use transport::ReplyClient;
pub use widget::{ChatWidget, PanelState, SendOutcome};
