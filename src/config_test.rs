use super::*;

#[test]
fn new_applies_documented_defaults() {
    let cfg = WidgetConfig::new("abc123").unwrap();
    assert_eq!(cfg.chatbot_id, "abc123");
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.theme, Theme::Light);
    assert_eq!(cfg.position, Position::BottomRight);
    assert_eq!(cfg.request_timeout, Some(Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS)));
    assert_eq!(cfg.focus_delay, Duration::from_millis(DEFAULT_FOCUS_DELAY_MS));
}

#[test]
fn missing_or_blank_id_is_rejected() {
    assert_eq!(WidgetConfig::from_options(WidgetOptions::default()), Err(WidgetError::MissingChatbotId));
    assert_eq!(WidgetConfig::new("   "), Err(WidgetError::MissingChatbotId));
}

#[test]
fn id_is_trimmed() {
    let cfg = WidgetConfig::new("  bot-1 ").unwrap();
    assert_eq!(cfg.chatbot_id, "bot-1");
}

#[test]
fn base_url_trailing_slash_is_trimmed() {
    let opts = WidgetOptions {
        api_base_url: Some("https://bots.test/api/".to_owned()),
        ..WidgetOptions::for_chatbot("x")
    };
    let cfg = WidgetConfig::from_options(opts).unwrap();
    assert_eq!(cfg.api_base_url, "https://bots.test/api");
    assert_eq!(cfg.respond_url(), "https://bots.test/api/chatbot/respond");
    assert_eq!(cfg.info_url(), "https://bots.test/api/chatbot/x");
}

#[test]
fn blank_base_url_falls_back_to_default() {
    let opts = WidgetOptions { api_base_url: Some("  ".to_owned()), ..WidgetOptions::for_chatbot("x") };
    let cfg = WidgetConfig::from_options(opts).unwrap();
    assert_eq!(cfg.api_base_url, DEFAULT_API_BASE_URL);
}

#[test]
fn zero_timeout_disables_widget_timeout() {
    let opts = WidgetOptions { request_timeout_ms: Some(0), ..WidgetOptions::for_chatbot("x") };
    let cfg = WidgetConfig::from_options(opts).unwrap();
    assert_eq!(cfg.request_timeout, None);
}

#[test]
fn from_json_reads_camel_case_options() {
    let opts = WidgetOptions::from_json(
        r#"{"chatbotId":"b1","apiBaseUrl":"https://x.test","theme":"dark","position":"bottom-left","requestTimeoutMs":5000}"#,
    )
    .unwrap();
    let cfg = WidgetConfig::from_options(opts).unwrap();
    assert_eq!(cfg.chatbot_id, "b1");
    assert_eq!(cfg.api_base_url, "https://x.test");
    assert_eq!(cfg.theme, Theme::Dark);
    assert_eq!(cfg.position, Position::BottomLeft);
    assert_eq!(cfg.request_timeout, Some(Duration::from_secs(5)));
}

#[test]
fn from_json_rejects_unknown_position() {
    let err = WidgetOptions::from_json(r#"{"chatbotId":"b1","position":"top-left"}"#).unwrap_err();
    assert!(err.to_string().contains("invalid widget option"));
    assert!(err.is_config());
}

#[test]
fn null_options_report_missing_id() {
    let opts = WidgetOptions::from_json("null").unwrap();
    assert_eq!(opts, WidgetOptions::default());

    let err = WidgetConfig::from_options(opts).unwrap_err();
    assert_eq!(err, WidgetError::MissingChatbotId);
    assert_eq!(err.to_string(), "chatbotId is required");
}

#[test]
fn non_object_options_are_invalid() {
    let err = WidgetOptions::from_json("42").unwrap_err();
    assert!(matches!(err, WidgetError::InvalidOption { name: "options", .. }));
}
