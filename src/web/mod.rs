//! Browser host binding over `web-sys`.
//!
//! All DOM is built programmatically and every event listener is attached to
//! an element the surface owns, so chatbot ids never end up inside markup or
//! inline handlers. Listeners are removed when the surface is dropped.

mod exports;

pub use exports::{BrowserExecutor, BrowserRegistry, BrowserWidget, bootstrap_page, with_registry};

use std::cell::RefCell;
use std::time::Duration;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Event, EventTarget, HtmlButtonElement, HtmlInputElement, KeyboardEvent, Node};

use crate::config::WidgetConfig;
use crate::discovery::{API_URL_ATTR, CHATBOT_ID_ATTR, ScriptDeclaration};
use crate::error::WidgetError;
use crate::host::{EventHandler, HostDocument, Surface, UiEvent};
use crate::message::ChatMessage;
use crate::styles;

fn dom_err(value: JsValue) -> WidgetError {
    WidgetError::Dom(format!("{value:?}"))
}

fn cast_err(what: &str) -> WidgetError {
    WidgetError::Dom(format!("element is not a {what}"))
}

/// The page the widget script was loaded into.
pub struct BrowserDocument {
    document: Document,
}

impl BrowserDocument {
    /// The current window's document.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Dom`] outside a browser window.
    pub fn current() -> Result<Self, WidgetError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| WidgetError::Dom("no window document".to_owned()))?;
        Ok(Self { document })
    }

    /// Whether the document is still parsing.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.document.ready_state() == "loading"
    }

    pub(crate) fn raw(&self) -> &Document {
        &self.document
    }

    fn element(&self, tag: &str, class: &str, text: Option<&str>) -> Result<Element, WidgetError> {
        let el = self.document.create_element(tag).map_err(dom_err)?;
        el.set_class_name(class);
        if text.is_some() {
            el.set_text_content(text);
        }
        Ok(el)
    }
}

impl HostDocument for BrowserDocument {
    type Surface = BrowserSurface;

    fn has_element(&self, id: &str) -> bool {
        self.document.get_element_by_id(id).is_some()
    }

    fn inject_style(&self, id: &str, css: &str) -> Result<(), WidgetError> {
        let style = self.document.create_element("style").map_err(dom_err)?;
        style.set_id(id);
        style.set_text_content(Some(css));
        let parent: Node = match self.document.head() {
            Some(head) => head.into(),
            None => self
                .document
                .document_element()
                .ok_or_else(|| WidgetError::Dom("document has no root element".to_owned()))?
                .into(),
        };
        parent.append_child(&style).map_err(dom_err)?;
        Ok(())
    }

    fn mount_surface(&self, config: &WidgetConfig) -> Result<BrowserSurface, WidgetError> {
        let body = self.document.body().ok_or_else(|| WidgetError::Dom("document has no body".to_owned()))?;

        let container = self.element("div", &styles::container_classes(config), None)?;
        container.set_attribute(CHATBOT_ID_ATTR, &config.chatbot_id).map_err(dom_err)?;

        let toggle = self.element("button", styles::TOGGLE_CLASS, Some(styles::TOGGLE_ICON))?;
        toggle.set_attribute("type", "button").map_err(dom_err)?;
        toggle.set_attribute("aria-label", styles::TITLE_TEXT).map_err(dom_err)?;

        let window = self.element("div", styles::WINDOW_CLASS, None)?;
        let header = self.element("div", styles::HEADER_CLASS, None)?;
        let title = self.element("div", styles::TITLE_CLASS, Some(styles::TITLE_TEXT))?;
        let close = self.element("button", styles::CLOSE_CLASS, Some(styles::CLOSE_ICON))?;
        close.set_attribute("type", "button").map_err(dom_err)?;
        close.set_attribute("aria-label", "Close chat").map_err(dom_err)?;
        header.append_child(&title).map_err(dom_err)?;
        header.append_child(&close).map_err(dom_err)?;

        let messages = self.element("div", styles::MESSAGES_CLASS, None)?;

        let input_area = self.element("div", styles::INPUT_AREA_CLASS, None)?;
        let input = self
            .element("input", styles::INPUT_CLASS, None)?
            .dyn_into::<HtmlInputElement>()
            .map_err(|_| cast_err("input"))?;
        input.set_type("text");
        input.set_placeholder(styles::INPUT_PLACEHOLDER);
        let send = self
            .element("button", styles::SEND_CLASS, Some(styles::SEND_LABEL))?
            .dyn_into::<HtmlButtonElement>()
            .map_err(|_| cast_err("button"))?;
        send.set_type("button");
        input_area.append_child(&input).map_err(dom_err)?;
        input_area.append_child(&send).map_err(dom_err)?;

        window.append_child(&header).map_err(dom_err)?;
        window.append_child(&messages).map_err(dom_err)?;
        window.append_child(&input_area).map_err(dom_err)?;
        container.append_child(&toggle).map_err(dom_err)?;
        container.append_child(&window).map_err(dom_err)?;
        body.append_child(&container).map_err(dom_err)?;

        Ok(BrowserSurface {
            document: self.document.clone(),
            container,
            toggle,
            window,
            close,
            messages,
            input,
            send,
            typing: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
        })
    }

    fn script_declarations(&self) -> Vec<ScriptDeclaration> {
        let selector = format!("script[{CHATBOT_ID_ATTR}]");
        let nodes = match self.document.query_selector_all(&selector) {
            Ok(nodes) => nodes,
            Err(e) => {
                log::warn!("chatbot script scan failed: {e:?}");
                return Vec::new();
            }
        };

        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_ref::<Element>().map(declaration_of))
            .collect()
    }
}

fn declaration_of(el: &Element) -> ScriptDeclaration {
    ScriptDeclaration {
        chatbot_id: el.get_attribute(CHATBOT_ID_ATTR),
        api_url: el.get_attribute(API_URL_ATTR),
        src: el.dyn_ref::<web_sys::HtmlScriptElement>().map(web_sys::HtmlScriptElement::src),
    }
}

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

impl Drop for Listener {
    fn drop(&mut self) {
        if let Err(e) = self
            .target
            .remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref())
        {
            log::debug!("failed to detach {} listener: {e:?}", self.kind);
        }
    }
}

/// One widget's DOM subtree.
pub struct BrowserSurface {
    document: Document,
    container: Element,
    toggle: Element,
    window: Element,
    close: Element,
    messages: Element,
    input: HtmlInputElement,
    send: HtmlButtonElement,
    typing: RefCell<Option<Element>>,
    listeners: RefCell<Vec<Listener>>,
}

impl BrowserSurface {
    fn listen(
        &self,
        target: &EventTarget,
        kind: &'static str,
        mut on_event: impl FnMut(Event) + 'static,
    ) -> Result<(), WidgetError> {
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| on_event(event));
        target
            .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
            .map_err(dom_err)?;
        self.listeners.borrow_mut().push(Listener { target: target.clone(), kind, closure });
        Ok(())
    }

    fn typing_indicator(&self) -> Result<Element, WidgetError> {
        let loading = self.document.create_element("div").map_err(dom_err)?;
        loading.set_class_name(styles::LOADING_CLASS);
        let label = self.document.create_element("span").map_err(dom_err)?;
        label.set_text_content(Some(styles::TYPING_LABEL));
        let dots = self.document.create_element("div").map_err(dom_err)?;
        dots.set_class_name(styles::LOADING_DOTS_CLASS);
        for _ in 0..3 {
            let dot = self.document.create_element("div").map_err(dom_err)?;
            dot.set_class_name(styles::LOADING_DOT_CLASS);
            dots.append_child(&dot).map_err(dom_err)?;
        }
        loading.append_child(&label).map_err(dom_err)?;
        loading.append_child(&dots).map_err(dom_err)?;
        Ok(loading)
    }
}

fn key_of(event: &Event) -> Option<String> {
    event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key)
}

impl Surface for BrowserSurface {
    fn set_open(&self, open: bool) {
        let classes = self.window.class_list();
        let result = if open { classes.add_1(styles::OPEN_CLASS) } else { classes.remove_1(styles::OPEN_CLASS) };
        if let Err(e) = result {
            log::warn!("failed to update panel class: {e:?}");
        }
    }

    fn focus_input_after(&self, delay: Duration) {
        let input = self.input.clone();
        let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        gloo_timers::callback::Timeout::new(millis, move || {
            if let Err(e) = input.focus() {
                log::debug!("input focus failed: {e:?}");
            }
        })
        .forget();
    }

    fn input_value(&self) -> String {
        self.input.value()
    }

    fn clear_input(&self) {
        self.input.set_value("");
    }

    fn append_message(&self, message: &ChatMessage) {
        let result = self.document.create_element("div").and_then(|el| {
            el.set_class_name(&styles::message_classes(message.sender));
            el.set_text_content(Some(&message.text));
            self.messages.append_child(&el)
        });
        if let Err(e) = result {
            log::warn!("failed to render message: {e:?}");
        }
    }

    fn show_typing(&self) {
        let appended = self.typing_indicator().and_then(|el| {
            self.messages.append_child(&el).map_err(dom_err)?;
            Ok(el)
        });
        match appended {
            Ok(el) => {
                if let Some(stale) = self.typing.borrow_mut().replace(el) {
                    stale.remove();
                }
            }
            Err(e) => log::warn!("failed to show typing indicator: {e}"),
        }
    }

    fn hide_typing(&self) {
        if let Some(el) = self.typing.borrow_mut().take() {
            el.remove();
        }
    }

    fn set_busy(&self, busy: bool) {
        self.send.set_disabled(busy);
    }

    fn scroll_to_bottom(&self) {
        self.messages.set_scroll_top(self.messages.scroll_height());
    }

    fn bind(&self, handler: EventHandler) -> Result<(), WidgetError> {
        let controls: [(&Element, &'static str, UiEvent); 3] = [
            (&self.toggle, "click", UiEvent::ToggleClicked),
            (&self.close, "click", UiEvent::CloseClicked),
            (self.send.as_ref(), "click", UiEvent::SendClicked),
        ];
        for (element, kind, event) in controls {
            let handler = handler.clone();
            self.listen(element.as_ref(), kind, move |_| handler(event.clone()))?;
        }

        let on_input_key = handler.clone();
        self.listen(self.input.as_ref(), "keydown", move |event| {
            if let Some(key) = key_of(&event) {
                on_input_key(UiEvent::InputKey(key));
            }
        })?;

        let container: Node = self.container.clone().into();
        let on_pointer = handler.clone();
        self.listen(self.document.as_ref(), "click", move |event| {
            let target = event.target();
            let node = target.as_ref().and_then(|t| t.dyn_ref::<Node>());
            on_pointer(UiEvent::DocumentPointer { inside: container.contains(node) });
        })?;

        self.listen(self.document.as_ref(), "keydown", move |event| {
            if let Some(key) = key_of(&event) {
                handler(UiEvent::DocumentKey(key));
            }
        })?;
        Ok(())
    }

    fn detach(&self) {
        self.listeners.borrow_mut().clear();
        self.container.remove();
    }
}

