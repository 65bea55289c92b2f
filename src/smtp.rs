//! SMTP delivery via lettre.
//!
//! Wrap [`SmtpMailer`] in a [`BackgroundMailer`](crate::mailer::BackgroundMailer)
//! so delivery happens off the request path:
//!
//! ```rust,ignore
//! use warden::mailer::BackgroundMailer;
//! use warden::smtp::SmtpMailer;
//!
//! let smtp = SmtpMailer::relay("smtp.example.com", "user".into(), "pass".into())?;
//! let mailer = BackgroundMailer::new(smtp);
//! ```

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::AuthError;
use crate::mailer::{Mailer, OutgoingMail};

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Connects to a relay over TLS with the given credentials.
    pub fn relay(host: &str, username: String, password: String) -> Result<Self, AuthError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(host)
            .map_err(|e| AuthError::Mail(e.to_string()))?
            .credentials(Credentials::new(username, password))
            .build();
        Ok(Self { transport })
    }

    /// Uses a pre-built transport, e.g. one with custom TLS or pool
    /// settings.
    pub fn with_transport(transport: AsyncSmtpTransport<Tokio1Executor>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), AuthError> {
        let body = format!("{}\n\n{}\n", mail.message, mail.link);

        let message = Message::builder()
            .from(
                mail.from
                    .parse()
                    .map_err(|e| AuthError::Mail(format!("invalid from address: {e}")))?,
            )
            .to(mail
                .to
                .parse()
                .map_err(|e| AuthError::Mail(format!("invalid to address: {e}")))?)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| AuthError::Mail(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AuthError::Mail(e.to_string()))?;

        Ok(())
    }
}
