//! Native clients over `reqwest`.
//!
//! `HttpReplyClient` is bound to one chatbot and backs the widget; `ChatbotApi`
//! covers calls made before a chatbot id exists.

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::{DEFAULT_API_BASE_URL, WidgetConfig, normalize_base_url};
use crate::error::WidgetError;
use crate::protocol::{
    ChatbotInfo, CreateChatbotRequest, CreateChatbotResponse, RespondRequest, RespondResponse, check_status,
    parse_respond_body,
};

use super::ReplyClient;

pub struct HttpReplyClient {
    http: reqwest::Client,
    respond_url: String,
    info_url: String,
}

impl HttpReplyClient {
    /// Build a client for the endpoint and timeout in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Transport`] if the HTTP client fails to build.
    pub fn new(config: &WidgetConfig) -> Result<Self, WidgetError> {
        Ok(Self {
            http: build_http(config.request_timeout)?,
            respond_url: config.respond_url(),
            info_url: config.info_url(),
        })
    }

    /// Fetch the public description of the configured chatbot.
    ///
    /// # Errors
    ///
    /// Same classes as [`ReplyClient::respond`].
    pub async fn chatbot_info(&self) -> Result<ChatbotInfo, WidgetError> {
        let response = self.http.get(&self.info_url).send().await.map_err(map_reqwest)?;
        decode_json(response).await
    }
}

#[async_trait::async_trait(?Send)]
impl ReplyClient for HttpReplyClient {
    async fn respond(&self, request: &RespondRequest) -> Result<RespondResponse, WidgetError> {
        let response = self
            .http
            .post(&self.respond_url)
            .json(request)
            .send()
            .await
            .map_err(map_reqwest)?;

        check_status(response.status().as_u16())?;
        let body = response.text().await.map_err(map_reqwest)?;
        parse_respond_body(&body)
    }
}

/// Chatbot management endpoints.
pub struct ChatbotApi {
    http: reqwest::Client,
    base_url: String,
}

impl ChatbotApi {
    /// Client for `api_base_url`; a blank base falls back to the default origin.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Transport`] if the HTTP client fails to build.
    pub fn new(api_base_url: &str, timeout: Option<Duration>) -> Result<Self, WidgetError> {
        let base_url = match normalize_base_url(api_base_url) {
            base if base.is_empty() => DEFAULT_API_BASE_URL.to_owned(),
            base => base,
        };
        Ok(Self { http: build_http(timeout)?, base_url })
    }

    #[must_use]
    pub fn create_url(&self) -> String {
        format!("{}/chatbot/create", self.base_url)
    }

    /// Generate a chatbot from a business profile.
    ///
    /// # Errors
    ///
    /// Transport failures, timeouts, non-2xx statuses and malformed bodies.
    pub async fn create_chatbot(&self, request: &CreateChatbotRequest) -> Result<CreateChatbotResponse, WidgetError> {
        log::info!("creating chatbot {:?} at {}", request.name, self.base_url);
        let response = self
            .http
            .post(self.create_url())
            .json(request)
            .send()
            .await
            .map_err(map_reqwest)?;
        decode_json(response).await
    }
}

fn build_http(timeout: Option<Duration>) -> Result<reqwest::Client, WidgetError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| WidgetError::Transport(e.to_string()))
}

async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, WidgetError> {
    check_status(response.status().as_u16())?;
    let body = response.text().await.map_err(map_reqwest)?;
    serde_json::from_str(&body).map_err(|e| WidgetError::Decode(e.to_string()))
}

fn map_reqwest(e: reqwest::Error) -> WidgetError {
    if e.is_timeout() { WidgetError::Timeout } else { WidgetError::Transport(e.to_string()) }
}
