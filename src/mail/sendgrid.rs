use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::{Email, Mailer};
use crate::config::MailConfig;

const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

pub struct SendGridMailer {
    client: Client,
    api_key: String,
    from_email: String,
    from_name: String,
}

impl SendGridMailer {
    pub fn new(api_key: String, cfg: &MailConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            api_key,
            from_email: cfg.from_email.clone(),
            from_name: cfg.from_name.clone(),
        })
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, email: &Email) -> anyhow::Result<()> {
        let body = json!({
            "personalizations": [{ "to": [{ "email": email.to }] }],
            "from": { "email": self.from_email, "name": self.from_name },
            "subject": email.subject,
            "content": [
                { "type": "text/plain", "value": email.text },
                { "type": "text/html", "value": email.html },
            ],
        });

        let resp = self
            .client
            .post(SENDGRID_URL)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("sendgrid request")?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            anyhow::bail!("sendgrid returned {status}: {detail}");
        }
        Ok(())
    }
}
