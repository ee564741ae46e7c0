//! Mounted widgets keyed by chatbot id.
//!
//! A registry is an ordinary value owned by whoever mounts widgets. The
//! browser binding keeps one per page behind `web::with_registry`.
//! Entries are never removed; a widget whose DOM the host deletes stays
//! registered for the page's lifetime.

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;

use std::collections::BTreeMap;

use crate::error::WidgetError;
use crate::host::Surface;
use crate::transport::ReplyClient;
use crate::widget::ChatWidget;

pub struct WidgetRegistry<S, C> {
    widgets: BTreeMap<String, ChatWidget<S, C>>,
}

impl<S, C> Default for WidgetRegistry<S, C> {
    fn default() -> Self {
        Self { widgets: BTreeMap::new() }
    }
}

impl<S, C> WidgetRegistry<S, C>
where
    S: Surface + 'static,
    C: ReplyClient + 'static,
{
    #[must_use]
    pub fn contains(&self, chatbot_id: &str) -> bool {
        self.widgets.contains_key(chatbot_id)
    }

    #[must_use]
    pub fn get(&self, chatbot_id: &str) -> Option<&ChatWidget<S, C>> {
        self.widgets.get(chatbot_id)
    }

    /// Mounted ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.widgets.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    pub(crate) fn insert(&mut self, widget: ChatWidget<S, C>) -> Result<(), WidgetError> {
        let id = widget.chatbot_id().to_owned();
        if self.widgets.contains_key(&id) {
            return Err(WidgetError::DuplicateChatbotId(id));
        }
        self.widgets.insert(id, widget);
        Ok(())
    }
}
