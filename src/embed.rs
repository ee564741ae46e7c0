//! Copy-paste snippets that embed a chatbot on a customer site.
//!
//! Three flavors: the one-line script tag (auto-discovery), an iframe
//! pointing at the hosted widget page, and manual construction for hosts that
//! need control over when the widget mounts. Script URLs are expected to
//! point at the bundle built by `crate::bundle`.

#[cfg(test)]
#[path = "embed_test.rs"]
mod tests;

use crate::bundle::READY_PROMISE;
use crate::discovery::{CHATBOT_ID_ATTR, script_directory};

pub const IFRAME_WIDTH: u32 = 400;
pub const IFRAME_HEIGHT: u32 = 600;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbedKind {
    Script,
    Iframe,
    Manual,
}

/// Inputs shared by every snippet flavor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmbedSnippets {
    pub chatbot_id: String,
    /// Absolute URL of the compiled `widget.js`.
    pub script_url: String,
    /// Origin hosting `widget.html` for the iframe flavor.
    pub site_origin: String,
}

impl EmbedSnippets {
    #[must_use]
    pub fn new(chatbot_id: &str, script_url: &str, site_origin: &str) -> Self {
        Self {
            chatbot_id: chatbot_id.to_owned(),
            script_url: script_url.to_owned(),
            site_origin: site_origin.trim_end_matches('/').to_owned(),
        }
    }

    #[must_use]
    pub fn render(&self, kind: EmbedKind) -> String {
        match kind {
            EmbedKind::Script => self.script_tag(),
            EmbedKind::Iframe => self.iframe(),
            EmbedKind::Manual => self.manual(),
        }
    }

    /// `<script src=".." data-chatbot-id=".."></script>`
    #[must_use]
    pub fn script_tag(&self) -> String {
        format!(
            r#"<script src="{}" {CHATBOT_ID_ATTR}="{}"></script>"#,
            escape_html(&self.script_url),
            escape_html(&self.chatbot_id)
        )
    }

    #[must_use]
    pub fn iframe(&self) -> String {
        let src = format!("{}/widget.html?id={}", self.site_origin, urlencoding::encode(&self.chatbot_id));
        format!(
            "<iframe\n  src=\"{}\"\n  width=\"{IFRAME_WIDTH}\"\n  height=\"{IFRAME_HEIGHT}\"\n  frameborder=\"0\"\n  title=\"Chatbot Widget\"\n></iframe>",
            escape_html(&src)
        )
    }

    /// Script include followed by a `new ChatbotWidget(..)` call that waits
    /// for the module to finish loading.
    #[must_use]
    pub fn manual(&self) -> String {
        let api_base = script_directory(&self.script_url).unwrap_or_default();
        format!(
            "<!-- Load the widget script -->\n\
             <script src=\"{}\"></script>\n\
             \n\
             <!-- Mount the widget once the script has loaded -->\n\
             <script>\n  \
             window.{READY_PROMISE}.then(function (ChatbotWidget) {{\n    \
             new ChatbotWidget({{\n      \
             chatbotId: {},\n      \
             apiBaseUrl: {}\n    \
             }});\n  \
             }});\n\
             </script>",
            escape_html(&self.script_url),
            js_string(&self.chatbot_id),
            js_string(&api_base)
        )
    }
}

/// Escape text for use inside an HTML attribute or element body.
#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON string literal, with `<` escaped so it cannot close the surrounding `<script>`.
pub(crate) fn js_string(raw: &str) -> String {
    serde_json::Value::from(raw).to_string().replace('<', "\\u003c")
}
