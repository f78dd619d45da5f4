use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::EmailOptions;
use crate::error::Error;

/// A message that has been composed but not yet addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub subject: String,
    pub html: String,
}

/// Mail delivery as seen by the monitor: compose, then send to a list of
/// recipients. Transport setup and teardown stay behind this trait.
#[async_trait]
pub trait Mailer: Send + Sync {
    fn compose_message(&self, subject: &str, html: &str) -> Draft {
        Draft {
            subject: subject.to_string(),
            html: html.to_string(),
        }
    }

    async fn send_secure(&self, draft: Draft, recipients: &[Address]) -> Result<(), Error>;
}

/// SMTP delivery over STARTTLS with login credentials.
///
/// The transport is built without a connection pool, so every send opens
/// its own connection and closes it once the message is accepted.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// # Errors
    ///
    /// Returns [`Error::Smtp`] if the relay parameters are invalid, or
    /// [`Error::Address`] if no sender mailbox can be derived from the
    /// username and alias.
    pub fn new(options: &EmailOptions) -> Result<Self, Error> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&options.smtp_domain)?
            .port(options.port)
            .credentials(Credentials::new(
                options.username.clone(),
                options.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            from: sender(&options.username, options.alias.as_deref())?,
        })
    }

    fn build_message(&self, draft: Draft, recipients: &[Address]) -> Result<Message, Error> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(draft.subject);
        for recipient in recipients {
            builder = builder.to(Mailbox::new(None, recipient.clone()));
        }

        Ok(builder.multipart(MultiPart::alternative().singlepart(SinglePart::html(draft.html)))?)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send_secure(&self, draft: Draft, recipients: &[Address]) -> Result<(), Error> {
        let message = self.build_message(draft, recipients)?;
        self.transport.send(message).await?;
        Ok(())
    }
}

/// The alias is used as-is when it is a full mailbox (`Name <addr>` or a bare
/// address), otherwise it becomes the display name of the username address.
fn sender(username: &str, alias: Option<&str>) -> Result<Mailbox, Error> {
    if let Some(mailbox) = alias.and_then(|alias| alias.parse::<Mailbox>().ok()) {
        return Ok(mailbox);
    }
    let address: Address = username.parse()?;
    Ok(Mailbox::new(alias.map(ToString::to_string), address))
}
