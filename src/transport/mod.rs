//! Reply transports.
//!
//! `ReplyClient` is the one network seam of the widget: a single POST per
//! accepted message. The browser build talks through `gloo-net`; native
//! builds (CLI, tests) through `reqwest`.

#[cfg(feature = "browser")]
pub mod fetch;
#[cfg(feature = "native")]
pub mod http;

use crate::error::WidgetError;
use crate::protocol::{RespondRequest, RespondResponse};

/// Exchanges one user message for one reply.
///
/// Futures are not required to be `Send`; the widget runs on a single thread.
#[async_trait::async_trait(?Send)]
pub trait ReplyClient {
    /// POST `request` to the reply endpoint.
    ///
    /// # Errors
    ///
    /// Transport failures, timeouts, non-2xx statuses and malformed bodies.
    async fn respond(&self, request: &RespondRequest) -> Result<RespondResponse, WidgetError>;
}
