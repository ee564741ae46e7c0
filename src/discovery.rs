//! Auto-discovery of `<script data-chatbot-id>` declarations.
//!
//! The host page declares a widget with
//!
//! ```html
//! <script src="https://bots.example.com/widget.js" data-chatbot-id="abc123"></script>
//! ```
//!
//! and optionally `data-api-url` to point the widget at another backend.
//! The API base is resolved as: `data-api-url`, then the directory the
//! script was served from, then the default origin.

#[cfg(test)]
#[path = "discovery_test.rs"]
mod tests;

use std::rc::Rc;

use url::Url;

use crate::config::{DEFAULT_API_BASE_URL, WidgetConfig, WidgetOptions, normalize_base_url};
use crate::error::WidgetError;
use crate::host::{Executor, HostDocument};
use crate::registry::WidgetRegistry;
use crate::transport::ReplyClient;
use crate::widget::ChatWidget;

pub const CHATBOT_ID_ATTR: &str = "data-chatbot-id";
pub const API_URL_ATTR: &str = "data-api-url";

/// Attributes read from one declaring `<script>` element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptDeclaration {
    pub chatbot_id: Option<String>,
    pub api_url: Option<String>,
    pub src: Option<String>,
}

impl ScriptDeclaration {
    #[must_use]
    pub fn new(chatbot_id: &str) -> Self {
        Self { chatbot_id: Some(chatbot_id.to_owned()), ..Self::default() }
    }

    #[must_use]
    pub fn with_src(mut self, src: &str) -> Self {
        self.src = Some(src.to_owned());
        self
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: &str) -> Self {
        self.api_url = Some(api_url.to_owned());
        self
    }

    /// Widget options for this declaration, or `None` if it carries no usable id.
    #[must_use]
    pub fn options(&self) -> Option<WidgetOptions> {
        let id = self.chatbot_id.as_deref().map(str::trim).filter(|id| !id.is_empty())?;
        Some(WidgetOptions { api_base_url: Some(self.api_base_url()), ..WidgetOptions::for_chatbot(id) })
    }

    /// API base URL in precedence order: override attribute, script directory, default.
    #[must_use]
    pub fn api_base_url(&self) -> String {
        if let Some(url) = self.api_url.as_deref().map(normalize_base_url).filter(|u| !u.is_empty()) {
            return url;
        }
        if let Some(dir) = self.src.as_deref().and_then(script_directory) {
            return dir;
        }
        DEFAULT_API_BASE_URL.to_owned()
    }
}

/// Directory an http(s) script was served from, with query and fragment dropped.
///
/// `https://bots.test/v1/widget.js?v=2` → `https://bots.test/v1`. Relative or
/// non-http sources have no usable directory.
#[must_use]
pub fn script_directory(src: &str) -> Option<String> {
    let dir = match Url::parse(src.trim()).and_then(|url| url.join(".")) {
        Ok(dir) => dir,
        Err(e) => {
            log::debug!("script src {src:?} has no directory: {e}");
            return None;
        }
    };
    if !matches!(dir.scheme(), "http" | "https") {
        return None;
    }
    Some(dir.as_str().trim_end_matches('/').to_owned())
}

/// Mount one widget per declaration whose id is not already registered.
///
/// Safe to call repeatedly. A declaration that fails to mount is logged and
/// skipped so it cannot block the rest of the page. Returns the ids mounted
/// by this call.
pub fn mount_declared<D, C, F>(
    doc: &D,
    registry: &mut WidgetRegistry<D::Surface, C>,
    executor: &Rc<dyn Executor>,
    mut make_client: F,
) -> Vec<String>
where
    D: HostDocument,
    C: ReplyClient + 'static,
    F: FnMut(&WidgetConfig) -> Result<C, WidgetError>,
{
    let mut mounted = Vec::new();
    for declaration in doc.script_declarations() {
        let Some(options) = declaration.options() else {
            log::debug!("skipping script declaration without chatbot id");
            continue;
        };
        let config = match WidgetConfig::from_options(options) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("invalid chatbot declaration: {e}");
                continue;
            }
        };
        if registry.contains(&config.chatbot_id) {
            continue;
        }

        let id = config.chatbot_id.clone();
        let result = make_client(&config)
            .and_then(|client| ChatWidget::mount(doc, registry, config, client, Rc::clone(executor)));
        match result {
            Ok(_) => mounted.push(id),
            Err(e) => log::warn!("chatbot {id} failed to mount: {e}"),
        }
    }
    mounted
}
