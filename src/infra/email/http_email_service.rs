use crate::domain::ports::EmailService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, error};
use base64::{Engine as _, engine::general_purpose};

const FROM_ALIAS: &str = "checkin";

/// Hands mail off to the relay behind `MAIL_SERVICE_URL`.
pub struct HttpEmailService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpEmailService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct Attachment<'a> {
    filename: &'a str,
    content_base64: String,
}

#[derive(Serialize)]
struct OutgoingMail<'a> {
    from_alias: &'a str,
    to_addr: &'a str,
    subject: &'a str,
    html_body: &'a str,
    attachments: Vec<Attachment<'a>>,
}

impl<'a> OutgoingMail<'a> {
    fn new(
        to_addr: &'a str,
        subject: &'a str,
        html_body: &'a str,
        attachment_name: Option<&'a str>,
        attachment_data: Option<&[u8]>,
    ) -> Self {
        let attachments = match (attachment_name, attachment_data) {
            (Some(filename), Some(data)) => vec![Attachment {
                filename,
                content_base64: general_purpose::STANDARD.encode(data),
            }],
            _ => Vec::new(),
        };

        Self {
            from_alias: FROM_ALIAS,
            to_addr,
            subject,
            html_body,
            attachments,
        }
    }
}

#[async_trait]
impl EmailService for HttpEmailService {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        attachment_data: Option<&[u8]>
    ) -> Result<(), AppError> {
        let mail = OutgoingMail::new(recipient, subject, html_body, attachment_name, attachment_data);

        let res = self.client.post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&mail)
            .send()
            .await
            .map_err(|e| {
                let msg = format!("Mail relay connection error: {}", e);
                error!("{}", msg);
                AppError::InternalWithMsg(msg)
            })?;

        let status = res.status();
        if !status.is_success() {
            let text = res.text().await.unwrap_or_default();
            let msg = format!("Mail relay rejected message. Status: {}, Body: {}", status, text);
            error!("{}", msg);
            return Err(AppError::InternalWithMsg(msg));
        }

        debug!(recipient, "Mail accepted by relay");
        Ok(())
    }
}
