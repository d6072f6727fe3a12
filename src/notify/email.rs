use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::{debug, info};

use crate::config::MailSettings;
use crate::error::RunError;
use crate::notify::Notifier;

#[derive(Debug)]
struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
    self_addressed: bool,
}

/// Mail notifier over SMTP with STARTTLS. Without sender credentials in the
/// environment every send is a silent no-op, so the watcher can run before
/// mail is set up.
#[derive(Debug)]
pub struct EmailNotifier {
    mailer: Option<Mailer>,
}

impl EmailNotifier {
    pub fn new(settings: Option<MailSettings>) -> Result<Self, RunError> {
        let Some(settings) = settings else {
            return Ok(Self { mailer: None });
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.server)
            .map_err(|e| RunError::Config(format!("invalid SMTP_SERVER {}: {e}", settings.server)))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.sender.clone(),
                settings.password.clone(),
            ))
            .build();

        let from = format!("Fundgrube Notifier <{}>", settings.sender)
            .parse()
            .map_err(|e| RunError::Config(format!("invalid MAIL_SENDER: {e}")))?;
        let to = settings
            .receiver
            .parse()
            .map_err(|e| RunError::Config(format!("invalid MAIL_RECEIVER: {e}")))?;

        Ok(Self {
            mailer: Some(Mailer {
                transport,
                from,
                to,
                self_addressed: settings.sender == settings.receiver,
            }),
        })
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<(), RunError> {
        let Some(mailer) = &self.mailer else {
            debug!("mail not set up, dropping notification {subject:?}");
            return Ok(());
        };

        // A shared inbox needs the prefix to tell these mails apart.
        let subject = if mailer.self_addressed {
            format!("Fundgrube: {subject}")
        } else {
            subject.to_string()
        };

        debug!("mail message:\n{body}");
        let message = Message::builder()
            .from(mailer.from.clone())
            .to(mailer.to.clone())
            .subject(subject)
            .header(header::ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| RunError::Send(format!("build mail: {e}")))?;

        mailer
            .transport
            .send(message)
            .await
            .map_err(|e| RunError::Send(format!("smtp: {e}")))?;
        info!("mail sent");
        Ok(())
    }
}
