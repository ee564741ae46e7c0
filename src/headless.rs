//! In-memory host binding.
//!
//! Stands in for a browser page: records stylesheet injections and mounted
//! surfaces, and lets callers type into a surface's input or fire UI events
//! at it. Used by the test suite and by the CLI's interactive `chat`.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::config::WidgetConfig;
use crate::discovery::ScriptDeclaration;
use crate::error::WidgetError;
use crate::host::{EventHandler, HostDocument, Surface, UiEvent};
use crate::message::ChatMessage;

#[derive(Default)]
struct DocumentState {
    style_ids: Vec<String>,
    mounted: Vec<String>,
    scripts: Vec<ScriptDeclaration>,
    refuse_listeners: bool,
}

/// A page with a head, a body and some declaring `<script>` tags.
#[derive(Clone, Default)]
pub struct HeadlessDocument {
    state: Rc<RefCell<DocumentState>>,
}

impl HeadlessDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `<script data-chatbot-id>` declaration to the page.
    pub fn add_script(&self, declaration: ScriptDeclaration) {
        self.state.borrow_mut().scripts.push(declaration);
    }

    /// Make every later `Surface::bind` fail, as a page that rejects listeners would.
    pub fn refuse_listeners(&self, refuse: bool) {
        self.state.borrow_mut().refuse_listeners = refuse;
    }

    /// Number of `<style>` elements injected so far.
    #[must_use]
    pub fn style_count(&self) -> usize {
        self.state.borrow().style_ids.len()
    }

    /// Chatbot ids of the surfaces currently in the body, in mount order.
    #[must_use]
    pub fn mounted_ids(&self) -> Vec<String> {
        self.state.borrow().mounted.clone()
    }
}

impl HostDocument for HeadlessDocument {
    type Surface = HeadlessSurface;

    fn has_element(&self, id: &str) -> bool {
        self.state.borrow().style_ids.iter().any(|s| s == id)
    }

    fn inject_style(&self, id: &str, _css: &str) -> Result<(), WidgetError> {
        self.state.borrow_mut().style_ids.push(id.to_owned());
        Ok(())
    }

    fn mount_surface(&self, config: &WidgetConfig) -> Result<Self::Surface, WidgetError> {
        self.state.borrow_mut().mounted.push(config.chatbot_id.clone());
        Ok(HeadlessSurface {
            document: Rc::clone(&self.state),
            chatbot_id: config.chatbot_id.clone(),
            ..HeadlessSurface::default()
        })
    }

    fn script_declarations(&self) -> Vec<ScriptDeclaration> {
        self.state.borrow().scripts.clone()
    }
}

#[derive(Default)]
struct SurfaceState {
    open: bool,
    input: String,
    rendered: Vec<ChatMessage>,
    typing: bool,
    busy: bool,
    focus_requests: Vec<Duration>,
    scrolls: usize,
    detached: bool,
}

/// A widget subtree. Clones share state, so a caller can keep a handle
/// while the controller owns another.
#[derive(Clone, Default)]
pub struct HeadlessSurface {
    state: Rc<RefCell<SurfaceState>>,
    handler: Rc<RefCell<Option<EventHandler>>>,
    document: Rc<RefCell<DocumentState>>,
    chatbot_id: String,
}

impl HeadlessSurface {
    /// Replace the input field's text, as a visitor typing would.
    pub fn set_input(&self, text: &str) {
        text.clone_into(&mut self.state.borrow_mut().input);
    }

    /// Deliver `event` to the bound handler. Returns `false` if nothing is bound.
    pub fn fire(&self, event: UiEvent) -> bool {
        let handler = self.handler.borrow().clone();
        match handler {
            Some(handler) => {
                handler(event);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.borrow().open
    }

    #[must_use]
    pub fn input(&self) -> String {
        self.state.borrow().input.clone()
    }

    /// Messages appended to the message list, in render order.
    #[must_use]
    pub fn rendered(&self) -> Vec<ChatMessage> {
        self.state.borrow().rendered.clone()
    }

    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.state.borrow().typing
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.state.borrow().busy
    }

    #[must_use]
    pub fn focus_requests(&self) -> Vec<Duration> {
        self.state.borrow().focus_requests.clone()
    }

    #[must_use]
    pub fn scroll_count(&self) -> usize {
        self.state.borrow().scrolls
    }

    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.state.borrow().detached
    }
}

impl Surface for HeadlessSurface {
    fn set_open(&self, open: bool) {
        self.state.borrow_mut().open = open;
    }

    fn focus_input_after(&self, delay: Duration) {
        self.state.borrow_mut().focus_requests.push(delay);
    }

    fn input_value(&self) -> String {
        self.input()
    }

    fn clear_input(&self) {
        self.state.borrow_mut().input.clear();
    }

    fn append_message(&self, message: &ChatMessage) {
        self.state.borrow_mut().rendered.push(message.clone());
    }

    fn show_typing(&self) {
        self.state.borrow_mut().typing = true;
    }

    fn hide_typing(&self) {
        self.state.borrow_mut().typing = false;
    }

    fn set_busy(&self, busy: bool) {
        self.state.borrow_mut().busy = busy;
    }

    fn scroll_to_bottom(&self) {
        self.state.borrow_mut().scrolls += 1;
    }

    fn bind(&self, handler: EventHandler) -> Result<(), WidgetError> {
        if self.document.borrow().refuse_listeners {
            return Err(WidgetError::Dom("addEventListener rejected".to_owned()));
        }
        *self.handler.borrow_mut() = Some(handler);
        Ok(())
    }

    fn detach(&self) {
        *self.handler.borrow_mut() = None;
        self.state.borrow_mut().detached = true;
        let mut document = self.document.borrow_mut();
        if let Some(at) = document.mounted.iter().position(|id| *id == self.chatbot_id) {
            document.mounted.remove(at);
        }
    }
}
