use lettre::Address;
use log::info;

use crate::error::Error;
use crate::mailer::Mailer;
use crate::tracker::Transition;

/// Sends one email per transition to the full recipient list.
pub struct Notifier<M> {
    mailer: M,
    recipients: Vec<Address>,
}

impl<M: Mailer> Notifier<M> {
    pub fn new(mailer: M, recipients: Vec<Address>) -> Self {
        Self { mailer, recipients }
    }

    /// # Errors
    ///
    /// Returns whatever the mailer reports. Nothing is retried.
    pub async fn notify(&self, url: &str, transition: Transition) -> Result<(), Error> {
        let subject = format!("{transition}: {url}");
        info!("Sending email \"{subject}\" to {} recipients", self.recipients.len());

        let draft = self.mailer.compose_message(&subject, "");
        self.mailer.send_secure(draft, &self.recipients).await?;

        info!("Sent email successfully");
        Ok(())
    }
}
