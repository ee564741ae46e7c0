//! Seams between the controller and the page it lives in.
//!
//! DESIGN
//! ======
//! The controller never touches the DOM directly. A `HostDocument` covers the
//! document-wide concerns (stylesheet, mounting, script discovery) and hands
//! out one `Surface` per widget: the widget's own subtree. The browser binding
//! implements both with `web-sys`; the headless binding keeps everything in
//! memory so the state machine can be driven natively.

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::time::Duration;

use crate::config::WidgetConfig;
use crate::discovery::ScriptDeclaration;
use crate::error::WidgetError;
use crate::message::ChatMessage;

/// User interaction forwarded from a surface to its controller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    ToggleClicked,
    CloseClicked,
    SendClicked,
    /// Key pressed while the text input has focus.
    InputKey(String),
    /// Pointer interaction anywhere in the document.
    DocumentPointer { inside: bool },
    /// Key pressed anywhere in the document.
    DocumentKey(String),
}

/// Callback a surface invokes for every bound UI event.
pub type EventHandler = Rc<dyn Fn(UiEvent)>;

/// The widget's own rendered subtree.
///
/// Rendering calls are infallible from the controller's point of view; a
/// binding that hits a DOM error logs it and carries on.
pub trait Surface {
    fn set_open(&self, open: bool);
    /// Move focus to the text input once `delay` has elapsed.
    fn focus_input_after(&self, delay: Duration);
    fn input_value(&self) -> String;
    fn clear_input(&self);
    fn append_message(&self, message: &ChatMessage);
    fn show_typing(&self);
    /// Remove the typing indicator if present.
    fn hide_typing(&self);
    /// Disable or re-enable the send control while a reply is pending.
    fn set_busy(&self, busy: bool);
    fn scroll_to_bottom(&self);
    /// Attach `handler` to the surface's controls and to the document.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Dom`] if a listener cannot be attached.
    fn bind(&self, handler: EventHandler) -> Result<(), WidgetError>;
    /// Remove the subtree from the page and drop any bound listeners.
    fn detach(&self);
}

/// The page a widget is mounted into.
pub trait HostDocument {
    type Surface: Surface + 'static;

    fn has_element(&self, id: &str) -> bool;

    /// Append a `<style id=..>` element to the document head.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Dom`] if the element cannot be created.
    fn inject_style(&self, id: &str, css: &str) -> Result<(), WidgetError>;

    /// Build the widget subtree for `config` and append it to the body.
    ///
    /// # Errors
    ///
    /// Returns [`WidgetError::Dom`] if the subtree cannot be built.
    fn mount_surface(&self, config: &WidgetConfig) -> Result<Self::Surface, WidgetError>;

    /// Every `<script data-chatbot-id>` declaration on the page, in document order.
    fn script_declarations(&self) -> Vec<ScriptDeclaration>;
}

pub type LocalTask = Pin<Box<dyn Future<Output = ()>>>;

/// Runs send tasks started from UI events on the current thread.
pub trait Executor {
    fn spawn(&self, task: LocalTask);
}

/// Spawns onto the enclosing `tokio::task::LocalSet`.
#[cfg(feature = "native")]
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioLocalExecutor;

#[cfg(feature = "native")]
impl Executor for TokioLocalExecutor {
    fn spawn(&self, task: LocalTask) {
        drop(tokio::task::spawn_local(task));
    }
}
