use super::*;
use crate::config::WidgetConfig;
use crate::headless::{HeadlessDocument, HeadlessSurface};
use crate::host::TokioLocalExecutor;
use crate::protocol::{RespondRequest, RespondResponse};
use std::rc::Rc;

struct NoopClient;

#[async_trait::async_trait(?Send)]
impl ReplyClient for NoopClient {
    async fn respond(&self, _request: &RespondRequest) -> Result<RespondResponse, WidgetError> {
        Ok(RespondResponse::default())
    }
}

fn mount(doc: &HeadlessDocument, registry: &mut WidgetRegistry<HeadlessSurface, NoopClient>, id: &str) {
    let config = WidgetConfig::new(id).unwrap();
    ChatWidget::mount(doc, registry, config, NoopClient, Rc::new(TokioLocalExecutor)).unwrap();
}

#[test]
fn empty_by_default() {
    let registry: WidgetRegistry<HeadlessSurface, NoopClient> = WidgetRegistry::default();
    assert!(registry.is_empty());
    assert!(registry.get("a").is_none());
}

#[test]
fn ids_are_sorted_and_unique() {
    let doc = HeadlessDocument::new();
    let mut registry = WidgetRegistry::default();
    mount(&doc, &mut registry, "zeta");
    mount(&doc, &mut registry, "alpha");

    assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["alpha", "zeta"]);
    assert!(registry.contains("zeta"));
    assert_eq!(registry.get("alpha").map(ChatWidget::chatbot_id), Some("alpha"));
}

#[test]
fn insert_rejects_duplicates() {
    let doc = HeadlessDocument::new();
    let mut registry = WidgetRegistry::default();
    mount(&doc, &mut registry, "a");

    let widget = registry.get("a").cloned().unwrap();
    assert_eq!(registry.insert(widget), Err(WidgetError::DuplicateChatbotId("a".to_owned())));
    assert_eq!(registry.len(), 1);
}

#[test]
fn dropping_every_handle_but_the_registry_keeps_widget_alive() {
    let doc = HeadlessDocument::new();
    let mut registry = WidgetRegistry::default();
    mount(&doc, &mut registry, "a");

    let surface = registry.get("a").map(|w| w.surface().clone()).unwrap();
    assert!(surface.fire(crate::host::UiEvent::ToggleClicked));
    assert!(registry.get("a").is_some_and(ChatWidget::is_open));
}
