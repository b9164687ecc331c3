use crate::controller::{DEFAULT_LIST_PATH, FormOptions};
use crate::dates::ReferenceZone;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_API_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_OFFSET_MINUTES: i32 = 9 * 60;
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub api_url: String,
    pub api_timeout: Duration,
    pub zone: ReferenceZone,
    pub list_path: String,
    pub initial_date: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let offset_minutes = parse_or(&lookup, "DIARY_UTC_OFFSET_MINUTES", DEFAULT_OFFSET_MINUTES);
        let zone = ReferenceZone::from_offset_minutes(offset_minutes).unwrap_or_else(|| {
            warn!(offset_minutes, "utc offset out of range, using +09:00");
            ReferenceZone::default()
        });

        Self {
            port: parse_or(&lookup, "PORT", DEFAULT_PORT),
            api_url: lookup("DIARY_API_URL")
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            api_timeout: Duration::from_secs(parse_or(
                &lookup,
                "DIARY_API_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )),
            zone,
            list_path: lookup("DIARY_LIST_PATH")
                .filter(|value| value.starts_with('/'))
                .unwrap_or_else(|| DEFAULT_LIST_PATH.to_string()),
            initial_date: lookup("DIARY_INITIAL_DATE").filter(|value| !value.is_empty()),
        }
    }

    pub fn form_options(&self) -> FormOptions {
        FormOptions {
            zone: self.zone,
            list_path: self.list_path.clone(),
            initial_date: self.initial_date.clone(),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %value, "ignoring malformed setting");
            default
        }),
        None => default,
    }
}
