use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{FixedOffset, Offset, Utc};

use crate::services::gateway::DEFAULT_BASE_URL;
use crate::utils::error::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub session_file: PathBuf,
    pub request_timeout: Duration,
    pub booking_close_delay: Duration,
    pub display_offset: FixedOffset,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            session_file: PathBuf::from(".flight-session.json"),
            request_timeout: Duration::from_secs(10),
            booking_close_delay: Duration::from_secs(3),
            display_offset: Utc.fix(),
        }
    }
}

impl ClientConfig {
    /// Load `.env` (if any) and read the `FLIGHT_*` variables over the defaults.
    pub fn from_env() -> ClientResult<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientResult<Self> {
        let mut config = ClientConfig::default();

        if let Some(url) = lookup("FLIGHT_API_URL").filter(|url| !url.trim().is_empty()) {
            config.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(path) = lookup("FLIGHT_SESSION_FILE").filter(|path| !path.trim().is_empty()) {
            config.session_file = PathBuf::from(path.trim());
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "FLIGHT_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "FLIGHT_BOOKING_CLOSE_SECS")? {
            config.booking_close_delay = Duration::from_secs(secs);
        }
        if let Some(minutes) = parse_var::<i32>(&lookup, "FLIGHT_DISPLAY_UTC_OFFSET_MINUTES")? {
            config.display_offset = minutes
                .checked_mul(60)
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| {
                    ClientError::Config(format!(
                        "FLIGHT_DISPLAY_UTC_OFFSET_MINUTES out of range: {}",
                        minutes
                    ))
                })?;
        }

        Ok(config)
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> ClientResult<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ClientError::Config(format!("{} must be a number, got {:?}", key, raw))),
    }
}
