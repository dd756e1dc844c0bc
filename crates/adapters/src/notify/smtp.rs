// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! E-mail delivery over SMTP
//!
//! Subject and body are minijinja templates rendered against the outcome.
//! Available variables: `job`, `severity`, `state`, `short_message`,
//! `detailed_message`, `failure`.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vigil_core::{NotifyError, Notifier, Outcome};

pub const DEFAULT_SUBJECT: &str = "[ALERT] {{ short_message }}";
pub const DEFAULT_BODY: &str = "{{ detailed_message }}";

/// Errors building an SMTP notifier
#[derive(Debug, Error)]
pub enum SmtpError {
    #[error("invalid email address {address}: {reason}")]
    Address { address: String, reason: String },
    #[error("transport setup failed: {0}")]
    Transport(String),
    #[error("invalid template: {0}")]
    Template(String),
    #[error("no recipients configured")]
    NoRecipients,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpConfig {
    #[serde(default = "default_from")]
    pub from: String,
    pub to: Vec<String>,
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub starttls: bool,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_subject")]
    pub subject: String,
    #[serde(default = "default_body")]
    pub body: String,
}

fn default_from() -> String {
    "Vigil <vigil@localhost>".to_string()
}

fn default_server() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    25
}

fn default_subject() -> String {
    DEFAULT_SUBJECT.to_string()
}

fn default_body() -> String {
    DEFAULT_BODY.to_string()
}

impl SmtpConfig {
    pub fn new(to: impl Into<String>) -> Self {
        Self {
            from: default_from(),
            to: vec![to.into()],
            server: default_server(),
            port: default_port(),
            starttls: false,
            username: None,
            password: None,
            subject: default_subject(),
            body: default_body(),
        }
    }
}

/// Rendered message text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub subject: String,
    pub body: String,
}

pub struct SmtpNotifier {
    config: SmtpConfig,
    from: Mailbox,
    to: Vec<Mailbox>,
    env: Environment<'static>,
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpNotifier {
    /// Validate addresses and templates and build the transport.
    ///
    /// No connection is made until the first delivery.
    pub fn new(config: SmtpConfig) -> Result<Self, SmtpError> {
        if config.to.is_empty() {
            return Err(SmtpError::NoRecipients);
        }
        let from = parse_mailbox(&config.from)?;
        let to = config
            .to
            .iter()
            .map(|a| parse_mailbox(a))
            .collect::<Result<Vec<_>, _>>()?;

        let env = Environment::new();
        for template in [&config.subject, &config.body] {
            env.template_from_str(template)
                .map_err(|e| SmtpError::Template(e.to_string()))?;
        }

        let builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.server)
                .map_err(|e| SmtpError::Transport(e.to_string()))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.server)
        };
        let mut builder = builder.port(config.port);
        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        let transport = builder.build();

        tracing::debug!(server = %config.server, port = config.port, "smtp notifier ready");
        Ok(Self {
            config,
            from,
            to,
            env,
            transport,
        })
    }

    pub fn config(&self) -> &SmtpConfig {
        &self.config
    }

    pub fn render(&self, job: &str, outcome: &Outcome) -> Result<Rendered, NotifyError> {
        let ctx = context! {
            job => job,
            severity => outcome.severity.to_string(),
            state => outcome.state,
            short_message => &outcome.short_message,
            detailed_message => &outcome.detailed_message,
            failure => outcome.failure.as_ref().map(|f| f.to_string()),
        };
        let render = |template: &str| {
            self.env
                .render_str(template, &ctx)
                .map_err(|e| NotifyError::Template(e.to_string()))
        };
        Ok(Rendered {
            // header values must stay on one line
            subject: render(&self.config.subject)?.replace(['\r', '\n'], " "),
            body: render(&self.config.body)?,
        })
    }

    pub fn message(&self, rendered: Rendered) -> Result<Message, NotifyError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(rendered.subject)
            .header(ContentType::TEXT_PLAIN);
        for to in &self.to {
            builder = builder.to(to.clone());
        }
        builder
            .body(rendered.body)
            .map_err(|e| NotifyError::Delivery(e.to_string()))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, SmtpError> {
    address.parse().map_err(|e: lettre::address::AddressError| SmtpError::Address {
        address: address.to_string(),
        reason: e.to_string(),
    })
}

#[async_trait]
impl Notifier for SmtpNotifier {
    fn name(&self) -> String {
        format!("smtp:{}", self.config.to.join(","))
    }

    async fn notify(&self, job: &str, outcome: &Outcome) -> Result<(), NotifyError> {
        let message = self.message(self.render(job, outcome)?)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "smtp_tests.rs"]
mod tests;
