//! Outgoing email: message type, transports and the background dispatch queue.

mod queue;
mod sendgrid;
pub mod templates;

use async_trait::async_trait;
use tracing::info;

pub use queue::MailQueue;
pub use sendgrid::SendGridMailer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &Email) -> anyhow::Result<()>;
}

/// Writes mail to the log instead of delivering it. Used when no provider key is configured.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: &Email) -> anyhow::Result<()> {
        info!(to = %email.to, subject = %email.subject, body = %email.text, "mail (not delivered)");
        Ok(())
    }
}
