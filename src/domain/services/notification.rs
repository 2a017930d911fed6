use std::sync::Arc;
use tera::{Context, Tera};
use tracing::{error, info};
use crate::domain::{models::attendee::Attendee, ports::EmailService, services::qr_image::render_png};
use crate::error::AppError;

pub const QR_EMAIL_TEMPLATE: &str = "qr_email.html";
pub const QR_ATTACHMENT_NAME: &str = "checkin-qr.png";

/// Renders and sends the "here is your QR code" mail.
pub struct NotificationService {
    email: Arc<dyn EmailService>,
    templates: Arc<Tera>,
}

/// `redemption_url` is only encoded into the attached PNG; the body links the
/// image, never the redemption endpoint, since a GET there checks the attendee in.
pub struct QrMail<'a> {
    pub attendee: &'a Attendee,
    pub event_name: &'a str,
    pub redemption_url: &'a str,
    pub qr_image_url: &'a str,
}

impl NotificationService {
    pub fn new(email: Arc<dyn EmailService>, templates: Arc<Tera>) -> Self {
        Self { email, templates }
    }

    pub fn render_qr_mail(&self, mail: &QrMail<'_>) -> Result<String, AppError> {
        let mut context = Context::new();
        context.insert("user_name", &mail.attendee.name);
        context.insert("event_name", mail.event_name);
        context.insert("qr_image_url", mail.qr_image_url);

        self.templates.render(QR_EMAIL_TEMPLATE, &context).map_err(|e| {
            error!("Tera render error: {:?}", e);
            AppError::InternalWithMsg(format!("Tera render error: {:?}", e))
        })
    }

    pub async fn send_qr_mail(&self, mail: QrMail<'_>) -> Result<(), AppError> {
        let html = self.render_qr_mail(&mail)?;
        let png = render_png(mail.redemption_url)?;
        let subject = format!("Your check-in QR code for {}", mail.event_name);
        self.email
            .send(&mail.attendee.email, &subject, &html, Some(QR_ATTACHMENT_NAME), Some(&png))
            .await?;
        info!(attendee_id = %mail.attendee.id, "QR code email sent");
        Ok(())
    }
}
