//! Contact-form relay.
//!
//! `POST /api/contact` takes `{name, email, subject, message}` as JSON, forwards the message
//! to the site operator and sends an acknowledgement back to the sender. Mail delivery goes
//! through a [`MailTransport`]: [`SmtpMailer`] delivers over authenticated SMTP, while
//! [`LogTransport`] only logs the mails and serves as a dry run when no credentials are set.

use std::io::{Cursor, Read};

use lettre::{
    Message, SmtpTransport,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use serde::{Deserialize, Serialize};
use tiny_http::{Header, Method, Request, Response, Server};

pub const CONTACT_ROUTE: &str = "/api/contact";
pub const REQUIRED_FIELDS: &str = "All fields are required";
pub const INTERNAL_ERROR: &str = "Internal server error";
pub const SUCCESS: &str = "Message and confirmation sent successfully!";

/// Request bodies are cut off after this many bytes.
pub const MAX_BODY_BYTES: u64 = 64 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Failed to bind to {address}: {error}")]
    Bind { address: String, error: String },
    #[error("Mail transport failed: {0}")]
    Transport(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Relay settings, read from `CONTACT_OPERATOR`, `CONTACT_BRAND`, `CONTACT_HOST` and `PORT`.
/// Without `CONTACT_OPERATOR` the SMTP account in `EMAIL_USERNAME` is the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Mailbox receiving the submissions and sending the acknowledgements.
    pub operator: String,
    pub brand: String,
    /// Prefix of forwarded subjects, written as `[tag]`.
    pub subject_tag: String,
    pub host: String,
    pub port: u16,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            operator: "contact@localhost".to_string(),
            brand: "BETA TECH LABS".to_string(),
            subject_tag: "BETA-TECH".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or invalid values keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let port = match lookup("PORT") {
            Some(port) => port.parse().unwrap_or_else(|_| {
                log::warn!("Invalid PORT {:?}, using {}", port, defaults.port);
                defaults.port
            }),
            None => defaults.port,
        };
        Self {
            operator: lookup("CONTACT_OPERATOR")
                .or_else(|| lookup("EMAIL_USERNAME"))
                .unwrap_or(defaults.operator),
            brand: lookup("CONTACT_BRAND").unwrap_or(defaults.brand),
            subject_tag: defaults.subject_tag,
            host: lookup("CONTACT_HOST").unwrap_or(defaults.host),
            port,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactForm {
    /// Every field must be present and non-empty.
    pub fn is_complete(&self) -> bool {
        [&self.name, &self.email, &self.subject, &self.message]
            .iter()
            .all(|field| !field.is_empty())
    }

    pub fn notification(&self, config: &RelayConfig) -> Email {
        Email {
            from: format!("\"{}\" <{}>", self.name, self.email),
            to: config.operator.clone(),
            subject: format!("[{}] {}", config.subject_tag, self.subject),
            text: self.message.clone(),
        }
    }

    pub fn acknowledgement(&self, config: &RelayConfig) -> Email {
        Email {
            from: format!("\"{}\" <{}>", config.brand, config.operator),
            to: self.email.clone(),
            subject: format!("Thanks for contacting {}", config.brand),
            text: format!(
                "Hi {},\n\nThanks for reaching out to {}. We'll get back to you shortly.\n\nBest regards,\n{}",
                self.name, config.brand, config.brand
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text: String,
}

pub trait MailTransport {
    fn send(&self, email: &Email) -> Result<(), RelayError>;
}

/// Writes every mail to the log instead of delivering it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransport;

impl MailTransport for LogTransport {
    fn send(&self, email: &Email) -> Result<(), RelayError> {
        log::info!(
            "Mail from {} to {}: {} ({} bytes)",
            email.from,
            email.to,
            email.subject,
            email.text.len()
        );
        Ok(())
    }
}

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// SMTP account, read from `EMAIL_USERNAME`, `EMAIL_PASSWORD`, `SMTP_HOST` and `SMTP_PORT`.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub username: String,
    pub password: String,
    pub host: String,
    /// `None` uses 465, the implicit-TLS submission port.
    pub port: Option<u16>,
}

impl std::fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("username", &self.username)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl SmtpSettings {
    /// `None` unless both a non-empty username and password are set.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let username = lookup("EMAIL_USERNAME").filter(|v| !v.is_empty())?;
        let password = lookup("EMAIL_PASSWORD").filter(|v| !v.is_empty())?;
        let port = match lookup("SMTP_PORT") {
            Some(port) => match port.parse() {
                Ok(port) => Some(port),
                Err(_) => {
                    log::warn!("Invalid SMTP_PORT {:?}, using the default", port);
                    None
                }
            },
            None => None,
        };
        Some(Self {
            username,
            password,
            host: lookup("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
            port,
        })
    }
}

fn mailbox(address: &str) -> Result<Mailbox, RelayError> {
    address
        .parse()
        .map_err(|e| RelayError::Transport(format!("invalid address {:?}: {}", address, e)))
}

/// Plain-text MIME message for `email`.
pub fn build_message(email: &Email) -> Result<Message, RelayError> {
    Message::builder()
        .from(mailbox(&email.from)?)
        .to(mailbox(&email.to)?)
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_PLAIN)
        .body(email.text.clone())
        .map_err(|e| RelayError::Transport(e.to_string()))
}

/// Delivers mail through an authenticated SMTP relay over TLS.
pub struct SmtpMailer {
    transport: SmtpTransport,
    host: String,
}

impl SmtpMailer {
    /// Prepares the relay; no connection is made until the first mail is sent.
    pub fn new(settings: &SmtpSettings) -> Result<Self, RelayError> {
        let mut builder = SmtpTransport::relay(&settings.host)
            .map_err(|e| RelayError::Transport(e.to_string()))?
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ));
        if let Some(port) = settings.port {
            builder = builder.port(port);
        }
        Ok(Self {
            transport: builder.build(),
            host: settings.host.clone(),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

impl MailTransport for SmtpMailer {
    fn send(&self, email: &Email) -> Result<(), RelayError> {
        let message = build_message(email)?;
        lettre::Transport::send(&self.transport, &message)
            .map_err(|e| RelayError::Transport(e.to_string()))?;
        log::debug!("Mail to {} sent via {}", email.to, self.host);
        Ok(())
    }
}

/// The transport the relay binary runs with.
pub enum Mailer {
    Smtp(SmtpMailer),
    DryRun(LogTransport),
}

impl Mailer {
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// SMTP when credentials are configured, otherwise a logging dry run.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RelayError> {
        match SmtpSettings::from_lookup(lookup) {
            Some(settings) => Ok(Mailer::Smtp(SmtpMailer::new(&settings)?)),
            None => {
                log::warn!(
                    "EMAIL_USERNAME or EMAIL_PASSWORD not set, contact mails will only be logged"
                );
                Ok(Mailer::DryRun(LogTransport))
            }
        }
    }

    pub fn is_dry_run(&self) -> bool {
        matches!(self, Mailer::DryRun(_))
    }
}

impl MailTransport for Mailer {
    fn send(&self, email: &Email) -> Result<(), RelayError> {
        match self {
            Mailer::Smtp(smtp) => smtp.send(email),
            Mailer::DryRun(log) => log.send(email),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Message { message: String },
    Error { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayResponse {
    pub status: u16,
    pub body: Option<ResponseBody>,
}

impl RelayResponse {
    pub fn message(status: u16, message: &str) -> Self {
        Self {
            status,
            body: Some(ResponseBody::Message {
                message: message.to_string(),
            }),
        }
    }

    pub fn error(status: u16, error: &str) -> Self {
        Self {
            status,
            body: Some(ResponseBody::Error {
                error: error.to_string(),
            }),
        }
    }

    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    pub fn json(&self) -> String {
        self.body
            .as_ref()
            .and_then(|body| serde_json::to_string(body).ok())
            .unwrap_or_default()
    }
}

/// Validates a submission and relays it. Both mails must go out for a success response.
pub fn handle_contact(
    body: &str,
    transport: &dyn MailTransport,
    config: &RelayConfig,
) -> RelayResponse {
    let form: ContactForm = match serde_json::from_str(body) {
        Ok(form) => form,
        Err(e) => {
            log::debug!("Rejecting contact body: {}", e);
            return RelayResponse::error(400, REQUIRED_FIELDS);
        }
    };
    if !form.is_complete() {
        return RelayResponse::error(400, REQUIRED_FIELDS);
    }

    let sent = transport
        .send(&form.notification(config))
        .and_then(|_| transport.send(&form.acknowledgement(config)));
    match sent {
        Ok(()) => RelayResponse::message(200, SUCCESS),
        Err(e) => {
            log::error!("Email sending failed: {}", e);
            RelayResponse::error(500, INTERNAL_ERROR)
        }
    }
}

/// Dispatches one request. The query string is ignored.
pub fn route(
    method: &Method,
    url: &str,
    body: &str,
    transport: &dyn MailTransport,
    config: &RelayConfig,
) -> RelayResponse {
    let path = url.split('?').next().unwrap_or(url);
    match (method, path) {
        (Method::Post, CONTACT_ROUTE) => handle_contact(body, transport, config),
        (Method::Options, CONTACT_ROUTE) => RelayResponse::empty(204),
        _ => RelayResponse::error(404, "Not found"),
    }
}

fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

fn to_http(response: &RelayResponse) -> Response<Cursor<Vec<u8>>> {
    let headers = [
        header("Content-Type", "application/json"),
        header("Access-Control-Allow-Origin", "*"),
        header("Access-Control-Allow-Methods", "POST, OPTIONS"),
        header("Access-Control-Allow-Headers", "Content-Type"),
    ];
    headers.into_iter().flatten().fold(
        Response::from_string(response.json()).with_status_code(response.status),
        |http, header| http.with_header(header),
    )
}

/// Blocking HTTP server around [`route`].
pub struct ContactRelay<T: MailTransport> {
    server: Server,
    transport: T,
    config: RelayConfig,
}

impl<T: MailTransport> ContactRelay<T> {
    pub fn bind(config: RelayConfig, transport: T) -> Result<Self, RelayError> {
        let address = format!("{}:{}", config.host, config.port);
        let server = Server::http(&address).map_err(|e| RelayError::Bind {
            address: address.clone(),
            error: e.to_string(),
        })?;
        Ok(Self {
            server,
            transport,
            config,
        })
    }

    /// The bound port; differs from the configured one when that was 0.
    pub fn local_port(&self) -> u16 {
        self.server
            .server_addr()
            .to_ip()
            .map(|addr| addr.port())
            .unwrap_or(self.config.port)
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Blocks for the next request and answers it.
    pub fn serve_one(&self) -> Result<(), RelayError> {
        let request = self.server.recv()?;
        self.handle_request(request)
    }

    /// Serves requests until the process ends. Failed requests are logged and skipped.
    pub fn run(&self) {
        loop {
            if let Err(e) = self.serve_one() {
                log::error!("Contact relay error: {}", e);
            }
        }
    }

    fn handle_request(&self, mut request: Request) -> Result<(), RelayError> {
        let mut body = String::new();
        request
            .as_reader()
            .take(MAX_BODY_BYTES)
            .read_to_string(&mut body)?;
        let response = route(
            request.method(),
            request.url(),
            &body,
            &self.transport,
            &self.config,
        );
        log::info!(
            "{} {} -> {}",
            request.method(),
            request.url(),
            response.status
        );
        request.respond(to_http(&response))?;
        Ok(())
    }
}
