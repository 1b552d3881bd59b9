use std::{
    collections::HashMap,
    io::{Read, Write},
    net::TcpStream,
    thread,
    time::Duration,
};

use alpine_backdrop::relay::{
    ContactForm, ContactRelay, DEFAULT_SMTP_HOST, Email, INTERNAL_ERROR, Mailer,
    REQUIRED_FIELDS, RelayConfig, RelayError, ResponseBody, SUCCESS, SmtpSettings,
    build_message, handle_contact, route,
};
use tiny_http::Method;

use crate::common::test_utils::{FailingTransport, RecordingTransport};
mod common;

const VALID: &str = r#"{"name":"N","email":"e@x","subject":"S","message":"M"}"#;

#[test]
fn should_forward_and_acknowledge_valid_message() {
    let transport = RecordingTransport::default();
    let config = RelayConfig::default();

    let response = handle_contact(VALID, &transport, &config);

    assert_eq!(response.status, 200);
    assert_eq!(
        response.body,
        Some(ResponseBody::Message {
            message: SUCCESS.to_string()
        })
    );
    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, config.operator);
    assert_eq!(sent[0].from, "\"N\" <e@x>");
    assert_eq!(sent[0].subject, "[BETA-TECH] S");
    assert_eq!(sent[0].text, "M");
    assert_eq!(sent[1].to, "e@x");
    assert_eq!(sent[1].subject, "Thanks for contacting BETA TECH LABS");
    assert!(sent[1].text.starts_with("Hi N,"));
}

#[test]
fn should_reject_missing_fields() {
    let transport = RecordingTransport::default();
    let body = r#"{"name":"N","email":"e@x","message":"M"}"#;

    let response = handle_contact(body, &transport, &RelayConfig::default());

    assert_eq!(response.status, 400);
    assert_eq!(response.json(), format!("{{\"error\":\"{}\"}}", REQUIRED_FIELDS));
    assert!(transport.sent().is_empty());
}

#[test]
fn should_reject_empty_fields() {
    let transport = RecordingTransport::default();
    let body = r#"{"name":"N","email":"","subject":"S","message":"M"}"#;
    assert_eq!(handle_contact(body, &transport, &RelayConfig::default()).status, 400);
    assert!(transport.sent().is_empty());
}

#[test]
fn should_reject_malformed_bodies() {
    let transport = RecordingTransport::default();
    let config = RelayConfig::default();
    assert_eq!(handle_contact("not json", &transport, &config).status, 400);
    assert_eq!(handle_contact("", &transport, &config).status, 400);
    let wrong_types = r#"{"name":5,"email":"e@x","subject":"S","message":"M"}"#;
    assert_eq!(handle_contact(wrong_types, &transport, &config).status, 400);
    assert!(transport.sent().is_empty());
}

#[test]
fn should_answer_500_when_mail_fails() {
    let response = handle_contact(VALID, &FailingTransport, &RelayConfig::default());
    assert_eq!(response.status, 500);
    assert_eq!(
        response.body,
        Some(ResponseBody::Error {
            error: INTERNAL_ERROR.to_string()
        })
    );
}

#[test]
fn should_route_only_the_contact_endpoint() {
    let transport = RecordingTransport::default();
    let config = RelayConfig::default();

    let preflight = route(&Method::Options, "/api/contact", "", &transport, &config);
    assert_eq!(preflight.status, 204);
    assert_eq!(preflight.json(), "");

    assert_eq!(route(&Method::Get, "/api/contact", "", &transport, &config).status, 404);
    assert_eq!(route(&Method::Post, "/api/other", VALID, &transport, &config).status, 404);
    assert_eq!(
        route(&Method::Post, "/api/contact?source=footer", VALID, &transport, &config).status,
        200
    );
    assert_eq!(transport.sent().len(), 2);
}

#[test]
fn should_read_settings_from_lookup() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("PORT", "8080"),
        ("CONTACT_OPERATOR", "hello@example.com"),
    ]);
    let config = RelayConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
    assert_eq!(config.port, 8080);
    assert_eq!(config.operator, "hello@example.com");
    assert_eq!(config.brand, RelayConfig::default().brand);

    let invalid = RelayConfig::from_lookup(|key| (key == "PORT").then(|| "http".to_string()));
    assert_eq!(invalid.port, 3000);
}

#[test]
fn should_default_operator_to_smtp_account() {
    let env: HashMap<&str, &str> = HashMap::from([("EMAIL_USERNAME", "desk@example.com")]);
    let config = RelayConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()));
    assert_eq!(config.operator, "desk@example.com");
}

#[test]
fn should_dry_run_without_smtp_credentials() {
    let mailer = Mailer::from_lookup(|_| None).expect("dry run needs no setup");
    assert!(mailer.is_dry_run());

    let only_user =
        Mailer::from_lookup(|key| (key == "EMAIL_USERNAME").then(|| "u@example.com".to_string()))
            .expect("dry run needs no setup");
    assert!(only_user.is_dry_run());
}

#[test]
fn should_send_over_smtp_when_credentials_are_set() {
    let env: HashMap<&str, &str> = HashMap::from([
        ("EMAIL_USERNAME", "desk@example.com"),
        ("EMAIL_PASSWORD", "secret"),
        ("SMTP_PORT", "2525"),
    ]);
    let lookup = |key: &str| env.get(key).map(|v| v.to_string());

    let settings = SmtpSettings::from_lookup(lookup).expect("credentials are set");
    assert_eq!(settings.host, DEFAULT_SMTP_HOST);
    assert_eq!(settings.port, Some(2525));
    assert!(!format!("{:?}", settings).contains("secret"));

    let mailer = Mailer::from_lookup(lookup).expect("smtp relay builds without connecting");
    assert!(!mailer.is_dry_run());
}

#[test]
fn should_build_plain_text_messages_for_both_mails() {
    let form = ContactForm {
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        subject: "Hello".to_string(),
        message: "Hi there".to_string(),
    };
    let config = RelayConfig {
        operator: "desk@example.com".to_string(),
        ..RelayConfig::default()
    };
    for email in [form.notification(&config), form.acknowledgement(&config)] {
        let message = build_message(&email).expect("valid addresses");
        let formatted = String::from_utf8_lossy(&message.formatted()).to_string();
        assert!(formatted.contains(&email.subject), "{}", formatted);
        assert!(formatted.contains("text/plain"), "{}", formatted);
    }
}

#[test]
fn should_report_invalid_addresses_as_transport_errors() {
    let email = Email {
        from: "desk@example.com".to_string(),
        to: "not an address".to_string(),
        subject: "S".to_string(),
        text: "M".to_string(),
    };
    assert!(matches!(build_message(&email), Err(RelayError::Transport(_))));
}

#[test]
fn should_serve_contact_requests_over_http() {
    let transport = RecordingTransport::default();
    let config = RelayConfig {
        port: 0,
        ..RelayConfig::default()
    };
    let relay = ContactRelay::bind(config, transport.clone()).expect("relay binds to a free port");
    let port = relay.local_port();
    let server = thread::spawn(move || relay.serve_one());

    let mut stream = TcpStream::connect(("127.0.0.1", port)).expect("relay accepts connections");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("read timeout");
    write!(
        stream,
        "POST /api/contact HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        VALID.len(),
        VALID
    )
    .expect("request written");

    let mut response = String::new();
    stream.read_to_string(&mut response).expect("response read");
    assert!(response.starts_with("HTTP/1.1 200"), "{}", response);
    assert!(response.contains("Access-Control-Allow-Origin: *"));
    assert!(response.contains(SUCCESS));

    assert!(server.join().expect("server thread").is_ok());
    assert_eq!(transport.sent().len(), 2);
}
