//! Widget controller: open/close state machine and the send protocol.
//!
//! DESIGN
//! ======
//! One `ChatWidget` owns one surface, one reply client and one transcript.
//! Handles are cheap clones of an `Rc`; the surface's event handler holds a
//! `Weak` so dropping every handle tears the controller down.
//!
//! SENDS
//! =====
//! At most one reply is outstanding per widget. A send accepted while idle
//! sets the in-flight flag before its first suspension point; any send issued
//! while the flag is set returns `SendOutcome::Ignored` without touching the
//! input. The flag is cleared by a drop guard, so it resets on success, on
//! failure, and when the send task itself is dropped mid-flight.

#[cfg(test)]
#[path = "widget_test.rs"]
mod tests;

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::host::{EventHandler, Executor, HostDocument, Surface, UiEvent};
use crate::message::{ChatMessage, Transcript};
use crate::protocol::{APOLOGY, RespondRequest, RespondResponse};
use crate::registry::WidgetRegistry;
use crate::styles;
use crate::transport::ReplyClient;

/// Whether the chat panel is visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Closed,
    Open,
}

/// Result of a `send_message` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendOutcome {
    /// Empty input or a reply already in flight; nothing happened.
    Ignored,
    /// The endpoint answered and its reply was appended.
    Replied,
    /// The exchange failed and the apology was appended.
    Failed,
}

#[derive(Default)]
struct WidgetState {
    panel: PanelState,
    in_flight: bool,
    transcript: Transcript,
}

struct Inner<S, C> {
    config: WidgetConfig,
    surface: S,
    client: C,
    executor: Rc<dyn Executor>,
    state: RefCell<WidgetState>,
}

/// Handle to a mounted widget.
pub struct ChatWidget<S, C> {
    inner: Rc<Inner<S, C>>,
}

impl<S, C> Clone for ChatWidget<S, C> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<S, C> ChatWidget<S, C>
where
    S: Surface + 'static,
    C: ReplyClient + 'static,
{
    /// Mount a widget into `doc` and register it under its chatbot id.
    ///
    /// Injects the shared stylesheet if no earlier widget did, builds the
    /// surface, renders the greeting and binds event handlers.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::DuplicateChatbotId`] if `registry` already holds
    /// this id, or a host error if the DOM cannot be built. A surface that was
    /// appended but could not be bound is detached again.
    pub fn mount<D>(
        doc: &D,
        registry: &mut WidgetRegistry<S, C>,
        config: WidgetConfig,
        client: C,
        executor: Rc<dyn Executor>,
    ) -> Result<Self, WidgetError>
    where
        D: HostDocument<Surface = S>,
    {
        if registry.contains(&config.chatbot_id) {
            return Err(WidgetError::DuplicateChatbotId(config.chatbot_id));
        }

        if styles::ensure_styles(doc)? {
            log::debug!("chatbot widget stylesheet injected");
        }
        let surface = doc.mount_surface(&config)?;

        let widget = Self {
            inner: Rc::new(Inner { config, surface, client, executor, state: RefCell::new(WidgetState::default()) }),
        };

        for message in widget.inner.state.borrow().transcript.messages() {
            widget.inner.surface.append_message(message);
        }
        if let Err(e) = widget.inner.surface.bind(widget.event_handler()) {
            widget.inner.surface.detach();
            return Err(e);
        }
        if let Err(e) = registry.insert(widget.clone()) {
            widget.inner.surface.detach();
            return Err(e);
        }

        log::info!(
            "chatbot widget mounted: id={} api={} position={}",
            widget.inner.config.chatbot_id,
            widget.inner.config.api_base_url,
            widget.inner.config.position.as_str()
        );
        Ok(widget)
    }

    fn event_handler(&self) -> EventHandler {
        let weak = Rc::downgrade(&self.inner);
        Rc::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                ChatWidget { inner }.dispatch(event);
            }
        })
    }

    /// Route one UI event through the state machine.
    pub fn dispatch(&self, event: UiEvent) {
        match event {
            UiEvent::ToggleClicked => self.toggle(),
            UiEvent::CloseClicked => self.close(),
            UiEvent::SendClicked => self.spawn_send(),
            UiEvent::InputKey(key) => {
                if key == "Enter" {
                    self.spawn_send();
                }
            }
            UiEvent::DocumentPointer { inside } => {
                if !inside {
                    self.close();
                }
            }
            UiEvent::DocumentKey(key) => {
                if key == "Escape" {
                    self.close();
                }
            }
        }
    }

    pub fn toggle(&self) {
        match self.panel_state() {
            PanelState::Closed => self.open(),
            PanelState::Open => self.close(),
        }
    }

    /// Closed → Open. Focus moves to the input once the slide-in settles.
    pub fn open(&self) {
        if !self.set_panel(PanelState::Open) {
            return;
        }
        self.inner.surface.set_open(true);
        self.inner.surface.focus_input_after(self.inner.config.focus_delay);
    }

    /// Open → Closed. A pending reply keeps running and lands in the hidden transcript.
    pub fn close(&self) {
        if !self.set_panel(PanelState::Closed) {
            return;
        }
        self.inner.surface.set_open(false);
    }

    fn set_panel(&self, next: PanelState) -> bool {
        let mut state = self.inner.state.borrow_mut();
        if state.panel == next {
            return false;
        }
        state.panel = next;
        log::debug!("chatbot {} panel {next:?}", self.inner.config.chatbot_id);
        true
    }

    /// Run `send_message` on the executor, detached from the caller.
    pub fn spawn_send(&self) {
        let widget = self.clone();
        self.inner.executor.spawn(Box::pin(async move {
            widget.send_message().await;
        }));
    }

    /// Send the current input text and append the reply.
    ///
    /// Never fails: transport and protocol errors become the apology turn.
    pub async fn send_message(&self) -> SendOutcome {
        let Some(text) = self.begin_send() else {
            return SendOutcome::Ignored;
        };
        let guard = InFlightGuard { inner: &*self.inner };

        let request = RespondRequest::new(&self.inner.config.chatbot_id, &text);
        let result = self.inner.client.respond(&request).await;
        guard.complete(result)
    }

    fn begin_send(&self) -> Option<String> {
        let surface = &self.inner.surface;
        let message = {
            let mut state = self.inner.state.borrow_mut();
            if state.in_flight {
                return None;
            }
            let text = surface.input_value().trim().to_owned();
            if text.is_empty() {
                return None;
            }
            state.in_flight = true;
            state.transcript.push(ChatMessage::user(text)).clone()
        };

        surface.clear_input();
        surface.append_message(&message);
        surface.scroll_to_bottom();
        surface.show_typing();
        surface.set_busy(true);
        surface.scroll_to_bottom();
        Some(message.text)
    }

    #[must_use]
    pub fn config(&self) -> &WidgetConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn chatbot_id(&self) -> &str {
        &self.inner.config.chatbot_id
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.inner.surface
    }

    #[must_use]
    pub fn client(&self) -> &C {
        &self.inner.client
    }

    #[must_use]
    pub fn panel_state(&self) -> PanelState {
        self.inner.state.borrow().panel
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.panel_state() == PanelState::Open
    }

    /// Whether a reply is currently outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().in_flight
    }

    /// Snapshot of the transcript, greeting included.
    #[must_use]
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.inner.state.borrow().transcript.messages().to_vec()
    }
}

/// Clears the in-flight flag and the typing indicator when dropped.
struct InFlightGuard<'a, S: Surface, C> {
    inner: &'a Inner<S, C>,
}

impl<S: Surface, C> InFlightGuard<'_, S, C> {
    fn complete(self, result: Result<RespondResponse, WidgetError>) -> SendOutcome {
        let (text, outcome) = match result {
            Ok(response) => (response.reply_text().to_owned(), SendOutcome::Replied),
            Err(e) => {
                log::warn!("chatbot {} reply failed: {e}", self.inner.config.chatbot_id);
                (APOLOGY.to_owned(), SendOutcome::Failed)
            }
        };

        self.inner.surface.hide_typing();
        let message = self.inner.state.borrow_mut().transcript.push(ChatMessage::bot(text)).clone();
        self.inner.surface.append_message(&message);
        self.inner.surface.scroll_to_bottom();
        outcome
    }
}

impl<S: Surface, C> Drop for InFlightGuard<'_, S, C> {
    fn drop(&mut self) {
        self.inner.surface.hide_typing();
        self.inner.surface.set_busy(false);
        self.inner.state.borrow_mut().in_flight = false;
    }
}
