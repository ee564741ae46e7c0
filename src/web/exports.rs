//! JS surface of the embeddable script.
//!
//! The page sees exactly two names: the `ChatbotWidget` class for manual
//! embedding and `chatbotInstances()` for introspection. Auto-discovery runs
//! from the module start function.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::config::{WidgetConfig, WidgetOptions};
use crate::discovery;
use crate::host::{Executor, LocalTask};
use crate::registry::WidgetRegistry;
use crate::transport::fetch::FetchReplyClient;
use crate::widget::{ChatWidget, SendOutcome};

use super::{BrowserDocument, BrowserSurface};

pub type BrowserWidget = ChatWidget<BrowserSurface, FetchReplyClient>;
pub type BrowserRegistry = WidgetRegistry<BrowserSurface, FetchReplyClient>;

thread_local! {
    static PAGE_WIDGETS: RefCell<BrowserRegistry> = RefCell::new(WidgetRegistry::default());
}

/// Run `f` against the page's widget registry.
///
/// Do not call back into the registry from inside `f`.
pub fn with_registry<R>(f: impl FnOnce(&mut BrowserRegistry) -> R) -> R {
    PAGE_WIDGETS.with(|widgets| f(&mut widgets.borrow_mut()))
}

/// Spawns onto the browser microtask queue.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserExecutor;

impl Executor for BrowserExecutor {
    fn spawn(&self, task: LocalTask) {
        wasm_bindgen_futures::spawn_local(task);
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&JsValue::from_str(&format!("chatbot widget logging unavailable: {e}")));
    }

    let doc = match BrowserDocument::current() {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("chatbot widget not started: {e}");
            return;
        }
    };

    if !doc.is_loading() {
        bootstrap_page();
        return;
    }

    let on_ready = Closure::once_into_js(bootstrap_page);
    if let Err(e) = doc.raw().add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref()) {
        log::warn!("failed to wait for DOMContentLoaded: {e:?}");
    }
}

/// Mount a widget for every undeclared `<script data-chatbot-id>` on the page.
pub fn bootstrap_page() {
    let doc = match BrowserDocument::current() {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("chatbot auto-discovery skipped: {e}");
            return;
        }
    };

    let executor: Rc<dyn Executor> = Rc::new(BrowserExecutor);
    let mounted = with_registry(|registry| {
        discovery::mount_declared(&doc, registry, &executor, |config| Ok(FetchReplyClient::new(config)))
    });
    if !mounted.is_empty() {
        log::info!("chatbot auto-discovery mounted {}", mounted.join(", "));
    }
}

/// Manually embedded widget.
#[wasm_bindgen(js_name = ChatbotWidget)]
pub struct JsChatbotWidget {
    widget: BrowserWidget,
}

#[wasm_bindgen(js_class = ChatbotWidget)]
impl JsChatbotWidget {
    /// `new ChatbotWidget({ chatbotId, apiBaseUrl?, theme?, position?, requestTimeoutMs? })`
    ///
    /// # Errors
    ///
    /// Throws if `chatbotId` is missing, already mounted, or the page has no body.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<JsChatbotWidget, JsError> {
        let options = if options.is_undefined() || options.is_null() {
            WidgetOptions::default()
        } else {
            let raw = js_sys::JSON::stringify(&options)
                .map_err(|_| JsError::new("widget options must be a plain object"))?
                .as_string()
                .ok_or_else(|| JsError::new("widget options must be a plain object"))?;
            WidgetOptions::from_json(&raw)?
        };
        let config = WidgetConfig::from_options(options)?;
        let doc = BrowserDocument::current()?;
        let client = FetchReplyClient::new(&config);
        let executor: Rc<dyn Executor> = Rc::new(BrowserExecutor);
        let widget = with_registry(|registry| ChatWidget::mount(&doc, registry, config, client, executor))?;
        Ok(Self { widget })
    }

    pub fn open(&self) {
        self.widget.open();
    }

    pub fn close(&self) {
        self.widget.close();
    }

    pub fn toggle(&self) {
        self.widget.toggle();
    }

    /// Send the input's text; resolves to `"ignored"`, `"replied"` or `"failed"`.
    #[wasm_bindgen(js_name = sendMessage)]
    pub fn send_message(&self) -> js_sys::Promise {
        let widget = self.widget.clone();
        wasm_bindgen_futures::future_to_promise(async move {
            let outcome = match widget.send_message().await {
                SendOutcome::Ignored => "ignored",
                SendOutcome::Replied => "replied",
                SendOutcome::Failed => "failed",
            };
            Ok(JsValue::from_str(outcome))
        })
    }

    #[wasm_bindgen(getter, js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.widget.is_open()
    }

    #[wasm_bindgen(getter, js_name = chatbotId)]
    pub fn chatbot_id(&self) -> String {
        self.widget.chatbot_id().to_owned()
    }
}

/// Ids of every widget mounted on this page.
#[wasm_bindgen(js_name = chatbotInstances)]
pub fn chatbot_instances() -> js_sys::Array {
    with_registry(|registry| registry.ids().map(JsValue::from_str).collect())
}
