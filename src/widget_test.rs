use super::*;
use crate::config::{DEFAULT_API_BASE_URL, Position, Theme};
use crate::headless::{HeadlessDocument, HeadlessSurface};
use crate::host::TokioLocalExecutor;
use crate::message::{GREETING, Sender};
use crate::protocol::EMPTY_REPLY_FALLBACK;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::LocalSet;

// =============================================================
// Test doubles
// =============================================================

#[derive(Default)]
struct MockClient {
    calls: RefCell<Vec<RespondRequest>>,
    replies: RefCell<VecDeque<Result<RespondResponse, WidgetError>>>,
    gate: Option<Rc<Notify>>,
}

impl MockClient {
    fn scripted(replies: Vec<Result<RespondResponse, WidgetError>>) -> Self {
        Self { replies: RefCell::new(replies.into()), ..Self::default() }
    }

    fn gated(gate: Rc<Notify>) -> Self {
        Self { gate: Some(gate), ..Self::default() }
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

#[async_trait::async_trait(?Send)]
impl ReplyClient for MockClient {
    async fn respond(&self, request: &RespondRequest) -> Result<RespondResponse, WidgetError> {
        self.calls.borrow_mut().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        let scripted = self.replies.borrow_mut().pop_front();
        scripted.unwrap_or_else(|| Ok(reply(&format!("echo: {}", request.message))))
    }
}

type TestWidget = ChatWidget<HeadlessSurface, MockClient>;

fn reply(text: &str) -> RespondResponse {
    RespondResponse { reply: Some(text.to_owned()), meta: None }
}

fn mount(
    doc: &HeadlessDocument,
    registry: &mut WidgetRegistry<HeadlessSurface, MockClient>,
    id: &str,
    client: MockClient,
) -> TestWidget {
    let config = WidgetConfig::new(id).unwrap();
    ChatWidget::mount(doc, registry, config, client, Rc::new(TokioLocalExecutor)).unwrap()
}

fn mount_one(client: MockClient) -> TestWidget {
    let doc = HeadlessDocument::new();
    let mut registry = WidgetRegistry::default();
    mount(&doc, &mut registry, "abc123", client)
}

fn turns(widget: &TestWidget) -> Vec<(Sender, String)> {
    widget.transcript().into_iter().map(|m| (m.sender, m.text)).collect()
}

// =============================================================
// Construction
// =============================================================

#[test]
fn mount_with_id_only_uses_defaults_and_starts_closed() {
    let widget = mount_one(MockClient::default());
    let cfg = widget.config();
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.position, Position::BottomRight);
    assert_eq!(cfg.theme, Theme::Light);
    assert_eq!(widget.panel_state(), PanelState::Closed);
    assert!(!widget.surface().is_open());
    assert!(!widget.is_loading());
}

#[test]
fn mount_renders_greeting() {
    let widget = mount_one(MockClient::default());
    assert_eq!(turns(&widget), vec![(Sender::Bot, GREETING.to_owned())]);
    assert_eq!(widget.surface().rendered().len(), 1);
}

#[test]
fn stylesheet_injected_once_for_many_widgets() {
    let doc = HeadlessDocument::new();
    let mut registry = WidgetRegistry::default();
    for id in ["a", "b", "c", "d"] {
        mount(&doc, &mut registry, id, MockClient::default());
    }
    assert_eq!(doc.style_count(), 1);
    assert_eq!(doc.mounted_ids(), vec!["a", "b", "c", "d"]);
    assert_eq!(registry.len(), 4);
}

#[test]
fn duplicate_id_is_rejected_before_touching_the_page() {
    let doc = HeadlessDocument::new();
    let mut registry = WidgetRegistry::default();
    mount(&doc, &mut registry, "a", MockClient::default());

    let config = WidgetConfig::new("a").unwrap();
    let result = ChatWidget::mount(&doc, &mut registry, config, MockClient::default(), Rc::new(TokioLocalExecutor));
    assert!(matches!(result, Err(WidgetError::DuplicateChatbotId(id)) if id == "a"));
    assert_eq!(doc.mounted_ids(), vec!["a"]);
}

#[test]
fn failed_bind_leaves_no_subtree_behind() {
    let doc = HeadlessDocument::new();
    let mut registry = WidgetRegistry::default();
    doc.refuse_listeners(true);

    let config = WidgetConfig::new("a").unwrap();
    let result = ChatWidget::mount(&doc, &mut registry, config, MockClient::default(), Rc::new(TokioLocalExecutor));
    assert!(matches!(result, Err(WidgetError::Dom(_))));
    assert!(doc.mounted_ids().is_empty());
    assert!(registry.is_empty());

    doc.refuse_listeners(false);
    mount(&doc, &mut registry, "a", MockClient::default());
    assert_eq!(doc.mounted_ids(), vec!["a"]);
    assert_eq!(registry.len(), 1);
}

#[test]
fn detached_surface_leaves_the_page_and_stops_delivering() {
    let doc = HeadlessDocument::new();
    let config = WidgetConfig::new("a").unwrap();
    let surface = doc.mount_surface(&config).unwrap();
    surface.bind(Rc::new(|_: UiEvent| {})).unwrap();

    surface.detach();
    assert!(surface.is_detached());
    assert!(doc.mounted_ids().is_empty());
    assert!(!surface.fire(UiEvent::ToggleClicked));
}

// =============================================================
// Panel state machine
// =============================================================

#[test]
fn toggle_alternates_open_and_closed() {
    let widget = mount_one(MockClient::default());
    widget.toggle();
    assert_eq!(widget.panel_state(), PanelState::Open);
    assert!(widget.surface().is_open());
    widget.toggle();
    assert_eq!(widget.panel_state(), PanelState::Closed);
    assert!(!widget.surface().is_open());
}

#[test]
fn open_schedules_delayed_focus() {
    let widget = mount_one(MockClient::default());
    widget.open();
    widget.open();
    assert_eq!(widget.surface().focus_requests(), vec![Duration::from_millis(300)]);
}

#[test]
fn outside_pointer_and_escape_only_close() {
    let widget = mount_one(MockClient::default());

    widget.dispatch(UiEvent::DocumentPointer { inside: false });
    widget.dispatch(UiEvent::DocumentKey("Escape".to_owned()));
    assert_eq!(widget.panel_state(), PanelState::Closed);

    widget.open();
    widget.dispatch(UiEvent::DocumentPointer { inside: false });
    assert_eq!(widget.panel_state(), PanelState::Closed);

    widget.open();
    widget.dispatch(UiEvent::DocumentKey("Escape".to_owned()));
    assert_eq!(widget.panel_state(), PanelState::Closed);
}

#[test]
fn inside_pointer_and_other_keys_keep_panel_open() {
    let widget = mount_one(MockClient::default());
    widget.open();
    widget.dispatch(UiEvent::DocumentPointer { inside: true });
    widget.dispatch(UiEvent::DocumentKey("a".to_owned()));
    assert!(widget.is_open());
}

#[test]
fn surface_events_reach_the_controller() {
    let widget = mount_one(MockClient::default());
    let surface = widget.surface().clone();
    assert!(surface.fire(UiEvent::ToggleClicked));
    assert!(widget.is_open());
    assert!(surface.fire(UiEvent::CloseClicked));
    assert!(!widget.is_open());
}

#[test]
fn events_after_teardown_are_ignored() {
    let surface = {
        let widget = mount_one(MockClient::default());
        widget.surface().clone()
    };
    assert!(surface.fire(UiEvent::ToggleClicked));
    assert!(!surface.is_open());
}

// =============================================================
// Send protocol
// =============================================================

#[tokio::test]
async fn successful_send_appends_user_then_bot() {
    let widget = mount_one(MockClient::scripted(vec![Ok(reply("9 to 6"))]));
    widget.open();
    widget.surface().set_input("What are your hours?");

    assert_eq!(widget.send_message().await, SendOutcome::Replied);

    assert_eq!(
        turns(&widget),
        vec![
            (Sender::Bot, GREETING.to_owned()),
            (Sender::User, "What are your hours?".to_owned()),
            (Sender::Bot, "9 to 6".to_owned()),
        ]
    );
    assert_eq!(widget.surface().rendered().len(), 3);
    assert_eq!(widget.surface().input(), "");
    assert!(!widget.is_loading());
    assert!(!widget.surface().is_typing());
    assert!(!widget.surface().is_busy());
}

#[tokio::test]
async fn request_carries_id_and_trimmed_text() {
    let widget = mount_one(MockClient::default());
    widget.surface().set_input("   hello  ");
    widget.send_message().await;

    let calls = widget.client().calls.borrow().clone();
    assert_eq!(calls, vec![RespondRequest::new("abc123", "hello")]);
}

#[tokio::test]
async fn transcript_order_matches_call_order() {
    let widget = mount_one(MockClient::default());
    for text in ["one", "two", "three"] {
        widget.surface().set_input(text);
        assert_eq!(widget.send_message().await, SendOutcome::Replied);
    }

    let senders: Vec<Sender> = widget.transcript().iter().skip(1).map(|m| m.sender).collect();
    assert_eq!(senders, vec![Sender::User, Sender::Bot, Sender::User, Sender::Bot, Sender::User, Sender::Bot]);
    let texts: Vec<String> = widget.transcript().into_iter().skip(1).map(|m| m.text).collect();
    assert_eq!(texts, vec!["one", "echo: one", "two", "echo: two", "three", "echo: three"]);
}

#[tokio::test]
async fn blank_input_is_ignored() {
    let widget = mount_one(MockClient::default());
    widget.surface().set_input("   ");
    assert_eq!(widget.send_message().await, SendOutcome::Ignored);
    assert_eq!(widget.client().call_count(), 0);
    assert_eq!(widget.transcript().len(), 1);
}

#[tokio::test]
async fn second_send_while_in_flight_is_ignored() {
    LocalSet::new()
        .run_until(async {
            let gate = Rc::new(Notify::new());
            let widget = mount_one(MockClient::gated(Rc::clone(&gate)));

            widget.surface().set_input("first");
            let first = tokio::task::spawn_local({
                let widget = widget.clone();
                async move { widget.send_message().await }
            });
            while widget.client().call_count() == 0 {
                tokio::task::yield_now().await;
            }
            assert!(widget.is_loading());
            assert!(widget.surface().is_typing());
            assert!(widget.surface().is_busy());

            widget.surface().set_input("second");
            assert_eq!(widget.send_message().await, SendOutcome::Ignored);
            assert_eq!(widget.surface().input(), "second");

            gate.notify_one();
            assert_eq!(first.await.unwrap(), SendOutcome::Replied);
            assert_eq!(widget.client().call_count(), 1);
            assert!(!widget.is_loading());
        })
        .await;
}

#[tokio::test]
async fn server_error_downgrades_to_apology() {
    let widget = mount_one(MockClient::scripted(vec![Err(WidgetError::Status { status: 500 })]));
    widget.surface().set_input("hello");

    assert_eq!(widget.send_message().await, SendOutcome::Failed);

    let last = widget.transcript().last().cloned().unwrap();
    assert_eq!(last.sender, Sender::Bot);
    assert_eq!(last.text, APOLOGY);
    assert!(!widget.is_loading());
    assert!(!widget.surface().is_typing());
    assert!(!widget.surface().is_busy());
}

#[tokio::test]
async fn network_error_then_success_recovers() {
    let widget = mount_one(MockClient::scripted(vec![
        Err(WidgetError::Transport("connection refused".to_owned())),
        Ok(reply("back online")),
    ]));

    widget.surface().set_input("hello");
    assert_eq!(widget.send_message().await, SendOutcome::Failed);
    assert_eq!(widget.transcript().last().map(|m| m.text.clone()), Some(APOLOGY.to_owned()));

    widget.surface().set_input("again");
    assert_eq!(widget.send_message().await, SendOutcome::Replied);
    assert_eq!(widget.transcript().last().map(|m| m.text.clone()), Some("back online".to_owned()));
    assert!(widget.transcript().iter().all(|m| !m.text.contains("connection refused")));
}

#[tokio::test]
async fn empty_reply_uses_fallback_text() {
    let widget = mount_one(MockClient::scripted(vec![Ok(RespondResponse::default())]));
    widget.surface().set_input("hello");
    assert_eq!(widget.send_message().await, SendOutcome::Replied);
    assert_eq!(widget.transcript().last().map(|m| m.text.clone()), Some(EMPTY_REPLY_FALLBACK.to_owned()));
}

#[tokio::test]
async fn reply_lands_in_hidden_transcript_after_close() {
    LocalSet::new()
        .run_until(async {
            let gate = Rc::new(Notify::new());
            let widget = mount_one(MockClient::gated(Rc::clone(&gate)));
            widget.open();
            widget.surface().set_input("hello");

            let pending = tokio::task::spawn_local({
                let widget = widget.clone();
                async move { widget.send_message().await }
            });
            while widget.client().call_count() == 0 {
                tokio::task::yield_now().await;
            }

            widget.close();
            assert!(!widget.is_open());
            gate.notify_one();
            assert_eq!(pending.await.unwrap(), SendOutcome::Replied);

            assert!(!widget.is_open());
            assert_eq!(widget.transcript().len(), 3);
        })
        .await;
}

#[tokio::test]
async fn dropped_send_clears_in_flight_state() {
    let gate = Rc::new(Notify::new());
    let widget = mount_one(MockClient::gated(gate));
    widget.surface().set_input("hello");

    let timed_out = tokio::time::timeout(Duration::from_millis(20), widget.send_message()).await;
    assert!(timed_out.is_err());

    assert!(!widget.is_loading());
    assert!(!widget.surface().is_typing());
    assert!(!widget.surface().is_busy());
    assert_eq!(widget.transcript().last().map(|m| m.sender), Some(Sender::User));
}

#[tokio::test]
async fn every_append_scrolls_to_bottom() {
    let widget = mount_one(MockClient::default());
    let before = widget.surface().scroll_count();
    widget.surface().set_input("hello");
    widget.send_message().await;
    assert_eq!(widget.surface().scroll_count() - before, 3);
}

#[tokio::test]
async fn send_button_and_enter_key_spawn_sends() {
    LocalSet::new()
        .run_until(async {
            let widget = mount_one(MockClient::default());
            let surface = widget.surface().clone();

            surface.set_input("via button");
            surface.fire(UiEvent::SendClicked);
            while widget.transcript().len() < 3 {
                tokio::task::yield_now().await;
            }

            surface.set_input("via enter");
            surface.fire(UiEvent::InputKey("Enter".to_owned()));
            while widget.transcript().len() < 5 {
                tokio::task::yield_now().await;
            }

            surface.set_input("not sent");
            surface.fire(UiEvent::InputKey("a".to_owned()));
            tokio::task::yield_now().await;

            assert_eq!(widget.client().call_count(), 2);
            assert_eq!(surface.input(), "not sent");
        })
        .await;
}
