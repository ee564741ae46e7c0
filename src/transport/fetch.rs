//! Browser reply client over `gloo-net` (the page's `fetch`).

use std::time::Duration;

use futures::future::{Either, select};

use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::protocol::{RespondRequest, RespondResponse, check_status, parse_respond_body};

use super::ReplyClient;

pub struct FetchReplyClient {
    respond_url: String,
    timeout: Option<Duration>,
}

impl FetchReplyClient {
    #[must_use]
    pub fn new(config: &WidgetConfig) -> Self {
        Self { respond_url: config.respond_url(), timeout: config.request_timeout }
    }

    async fn exchange(&self, request: &RespondRequest) -> Result<RespondResponse, WidgetError> {
        let response = gloo_net::http::Request::post(&self.respond_url)
            .json(request)
            .map_err(|e| WidgetError::Transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| WidgetError::Transport(e.to_string()))?;

        check_status(response.status())?;
        let body = response.text().await.map_err(|e| WidgetError::Transport(e.to_string()))?;
        parse_respond_body(&body)
    }
}

#[async_trait::async_trait(?Send)]
impl ReplyClient for FetchReplyClient {
    async fn respond(&self, request: &RespondRequest) -> Result<RespondResponse, WidgetError> {
        let Some(timeout) = self.timeout else {
            return self.exchange(request).await;
        };

        // The underlying fetch is not aborted on timeout; its result is dropped.
        let exchange = Box::pin(self.exchange(request));
        let timer = Box::pin(gloo_timers::future::sleep(timeout));
        match select(exchange, timer).await {
            Either::Left((result, _)) => result,
            Either::Right(((), _)) => Err(WidgetError::Timeout),
        }
    }
}
