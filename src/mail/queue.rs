use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use super::{Email, Mailer};

/// Fire-and-forget handle to the mail worker.
///
/// `enqueue` never blocks and never fails from the caller's point of view;
/// delivery errors are only logged by the worker.
#[derive(Clone)]
pub struct MailQueue {
    tx: mpsc::UnboundedSender<Email>,
}

impl MailQueue {
    /// Spawns the worker task on the current tokio runtime.
    pub fn spawn(mailer: Arc<dyn Mailer>) -> Self {
        let (queue, mut rx) = Self::channel();
        tokio::spawn(async move {
            while let Some(email) = rx.recv().await {
                match mailer.send(&email).await {
                    Ok(()) => debug!(to = %email.to, subject = %email.subject, "mail sent"),
                    Err(e) => error!(error = ?e, to = %email.to, subject = %email.subject, "mail delivery failed"),
                }
            }
            debug!("mail worker stopped");
        });
        queue
    }

    /// Queue plus the raw receiving end, without a worker.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Email>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn enqueue(&self, email: Email) {
        if let Err(e) = self.tx.send(email) {
            warn!(to = %e.0.to, "mail worker is gone; dropping message");
        }
    }
}
