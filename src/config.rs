use lettre::Address;
use log::warn;
use std::{fmt, path::PathBuf, str::FromStr, time::Duration};
use url::Url;

use crate::error::Error;

const DEFAULT_CHECK_INTERVAL_SECS: u64 = 300;
const DEFAULT_LOG_FILE: &str = "logs/log";

#[derive(Debug, Clone)]
pub struct Config {
    pub check: CheckOptions,
    pub email: EmailOptions,
    pub recipients: Vec<Address>,
}

#[derive(Debug, Clone)]
pub struct CheckOptions {
    pub interval_secs: u64,
    pub timeout_secs: Option<u64>,
    /// Treat non-2xx responses as DOWN instead of only transport failures.
    pub require_success_status: bool,
    /// Targets in configuration order, duplicates removed.
    pub urls: Vec<String>,
}

#[derive(Clone)]
pub struct EmailOptions {
    pub smtp_domain: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub alias: Option<String>,
}

impl fmt::Debug for EmailOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailOptions")
            .field("smtp_domain", &self.smtp_domain)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("alias", &self.alias)
            .finish()
    }
}

impl CheckOptions {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    /// Reads the configuration from the process environment. Call
    /// [`load_dotenv`] first to pick up a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when a required variable is missing or a value
    /// is malformed, or the underlying parse error for bad URLs and addresses.
    pub fn load() -> Result<Config, Error> {
        Self::from_vars(|name| dotenvy::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`].
    pub fn from_vars<F>(var: F) -> Result<Config, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interval_secs = match optional(&var, "CHECK_INTERVAL_SECONDS") {
            Some(raw) => parse_number("CHECK_INTERVAL_SECONDS", &raw)?,
            None => DEFAULT_CHECK_INTERVAL_SECS,
        };
        if interval_secs == 0 {
            return Err(Error::Config(
                "CHECK_INTERVAL_SECONDS must be greater than zero".to_string(),
            ));
        }

        let timeout_secs = optional(&var, "CHECK_TIMEOUT_SECONDS")
            .map(|raw| parse_number("CHECK_TIMEOUT_SECONDS", &raw))
            .transpose()?;

        let require_success_status = optional(&var, "CHECK_REQUIRE_SUCCESS_STATUS")
            .map(|raw| parse_bool("CHECK_REQUIRE_SUCCESS_STATUS", &raw))
            .transpose()?
            .unwrap_or(false);

        let urls = parse_urls(&required(&var, "CHECK_URLS")?)?;
        let recipients = split_list(&required(&var, "NOTIFY_EMAILS")?)
            .map(Address::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        if recipients.is_empty() {
            return Err(Error::Config("NOTIFY_EMAILS has no recipients".to_string()));
        }

        let email = EmailOptions {
            smtp_domain: required(&var, "EMAIL_SMTP_DOMAIN")?,
            port: parse_number("EMAIL_PORT", &required(&var, "EMAIL_PORT")?)?,
            username: required(&var, "EMAIL_USERNAME")?,
            password: required(&var, "EMAIL_PASSWORD")?,
            alias: optional(&var, "EMAIL_ALIAS"),
        };

        Ok(Config {
            check: CheckOptions {
                interval_secs,
                timeout_secs,
                require_success_status,
                urls,
            },
            email,
            recipients,
        })
    }
}

/// Loads `.env` from the working directory into the process environment.
///
/// # Errors
///
/// Returns [`Error::DotEnv`] when the file exists but cannot be read or parsed.
pub fn load_dotenv() -> Result<(), Error> {
    ignore_missing(dotenvy::dotenv())
}

// The variables may come from the shell alone
fn ignore_missing<T>(result: Result<T, dotenvy::Error>) -> Result<(), Error> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Log file location, read on its own so logging can start before the rest
/// of the configuration is validated.
#[must_use]
pub fn log_file() -> PathBuf {
    dotenvy::var("LOG_FILE")
        .ok()
        .filter(|path| !path.trim().is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_LOG_FILE), PathBuf::from)
}

fn parse_urls(raw: &str) -> Result<Vec<String>, Error> {
    let mut urls: Vec<String> = Vec::new();
    for entry in split_list(raw) {
        let url = Url::parse(entry)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Unsupported scheme in CHECK_URLS entry {entry}"
            )));
        }
        if urls.iter().any(|known| known == entry) {
            warn!("Ignoring duplicate CHECK_URLS entry {entry}");
        } else {
            urls.push(entry.to_string());
        }
    }

    if urls.is_empty() {
        return Err(Error::Config("CHECK_URLS has no targets".to_string()));
    }
    Ok(urls)
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split('|').map(str::trim).filter(|entry| !entry.is_empty())
}

fn required<F>(var: &F, name: &str) -> Result<String, Error>
where
    F: Fn(&str) -> Option<String>,
{
    optional(var, name).ok_or_else(|| Error::Config(format!("{name} environment variable not set")))
}

fn optional<F>(var: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    var(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_number<T>(name: &str, raw: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.parse()
        .map_err(|e| Error::Config(format!("{name} must be a number, got {raw:?}: {e}")))
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, Error> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{name} must be a boolean, got {raw:?}"))),
    }
}
