use async_trait::async_trait;
use log::{error, info};
use reqwest::Client;
use std::time::Duration;

use crate::error::Error;

/// Reachability check for a single target.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn is_url_up(&self, url: &str) -> bool;
}

/// Probes targets with a single HTTP GET.
///
/// By default only a transport failure marks a target as down: a server that
/// answers with a 500 is still reachable. Set `require_success_status` to
/// also require a 2xx status.
pub struct HttpProber {
    client: Client,
    require_success_status: bool,
}

impl HttpProber {
    /// # Errors
    ///
    /// Returns [`Error::HttpRequest`] if the HTTP client cannot be built.
    pub fn new(timeout: Option<Duration>, require_success_status: bool) -> Result<Self, Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            require_success_status,
        })
    }

    async fn get(&self, url: &str) -> Result<reqwest::StatusCode, Error> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        // Drain the body so a connection dropped mid-response counts as a failure
        response.bytes().await?;
        Ok(status)
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn is_url_up(&self, url: &str) -> bool {
        info!("GET: {url}");
        match self.get(url).await {
            Ok(status) if self.require_success_status && !status.is_success() => {
                error!("GET {url} returned {status}");
                false
            }
            Ok(status) => {
                info!("GET: {url} succeeded with {status}");
                true
            }
            Err(e) => {
                error!("Failed to GET {url}: {e}");
                false
            }
        }
    }
}
