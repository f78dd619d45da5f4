//! Polls a list of URLs and emails a fixed recipient list whenever a URL
//! goes down or comes back up.

pub mod config;
pub mod error;
pub mod logging;
pub mod mailer;
pub mod notifier;
pub mod prober;
pub mod tracker;
pub mod worker;

pub use config::Config;
pub use error::Error;
pub use worker::{Monitor, PassSummary, monitor_websites};
