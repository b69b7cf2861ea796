//! Runtime configuration read from the environment and an optional `.env` file.

use std::env;
use std::path::PathBuf;

use binroute_core::DistanceMetric;
use binroute_core::model::PhoneNumber;
use binroute_provider_twilio::TwilioCredentials;

#[derive(Debug, Clone)]
pub(crate) struct AppConfig {
    pub providers: ProvidersConfig,
    pub distance: DistanceMetric,
    pub workers_file: Option<PathBuf>,
    pub telemetry: TelemetryConfig,
}

/// Credentials for the external services. `None` disables the service.
#[derive(Debug, Clone, Default)]
pub(crate) struct ProvidersConfig {
    pub google_api_key: Option<String>,
    pub twilio: Option<TwilioCredentials>,
}

#[derive(Debug, Clone)]
pub(crate) struct TelemetryConfig {
    pub log_level: String,
    pub log_file: PathBuf,
}

#[derive(thiserror::Error, Debug)]
pub(crate) enum ConfigError {
    #[error("BINROUTE_DISTANCE must be `planar` or `haversine`: {0}")]
    InvalidDistance(String),
}

impl AppConfig {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source; empty values count as unset.
    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let distance = match var("BINROUTE_DISTANCE") {
            Some(raw) => raw.parse().map_err(ConfigError::InvalidDistance)?,
            None => DistanceMetric::default(),
        };

        let twilio = match (
            var("TWILIO_ACCOUNT_SID"),
            var("TWILIO_AUTH_TOKEN"),
            var("TWILIO_PHONE_NUMBER"),
        ) {
            (Some(account_sid), Some(auth_token), Some(from)) => Some(TwilioCredentials {
                account_sid,
                auth_token,
                from: PhoneNumber(from),
            }),
            _ => None,
        };

        Ok(Self {
            providers: ProvidersConfig {
                google_api_key: var("GMAPS_API_KEY"),
                twilio,
            },
            distance,
            workers_file: var("BINROUTE_WORKERS_FILE").map(PathBuf::from),
            telemetry: TelemetryConfig {
                log_level: var("BINROUTE_LOG_LEVEL").unwrap_or_else(|| "info".to_owned()),
                log_file: var("BINROUTE_LOG_FILE")
                    .map_or_else(|| PathBuf::from("binroute.log"), PathBuf::from),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_env_missing() {
        let config = load(&[]).expect("config loads with defaults");

        assert_eq!(config.distance, DistanceMetric::Planar);
        assert!(config.providers.google_api_key.is_none());
        assert!(config.providers.twilio.is_none());
        assert!(config.workers_file.is_none());
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.log_file, PathBuf::from("binroute.log"));
    }

    #[test]
    fn reads_credentials_and_overrides() {
        let config = load(&[
            ("GMAPS_API_KEY", "maps-key"),
            ("TWILIO_ACCOUNT_SID", "AC1"),
            ("TWILIO_AUTH_TOKEN", "token"),
            ("TWILIO_PHONE_NUMBER", "+15005550006"),
            ("BINROUTE_DISTANCE", "haversine"),
            ("BINROUTE_WORKERS_FILE", "workers.csv"),
            ("BINROUTE_LOG_LEVEL", "debug"),
        ])
        .expect("config loads");

        assert_eq!(config.providers.google_api_key.as_deref(), Some("maps-key"));
        let twilio = config.providers.twilio.expect("twilio configured");
        assert_eq!(twilio.account_sid, "AC1");
        assert_eq!(twilio.from, PhoneNumber("+15005550006".to_owned()));
        assert_eq!(config.distance, DistanceMetric::Haversine);
        assert_eq!(config.workers_file, Some(PathBuf::from("workers.csv")));
        assert_eq!(config.telemetry.log_level, "debug");
    }

    #[test]
    fn partial_twilio_credentials_disable_sms() {
        let config = load(&[("TWILIO_ACCOUNT_SID", "AC1"), ("TWILIO_AUTH_TOKEN", "  ")])
            .expect("config loads");

        assert!(config.providers.twilio.is_none());
    }

    #[test]
    fn rejects_unknown_distance_metric() {
        assert!(matches!(
            load(&[("BINROUTE_DISTANCE", "manhattan")]),
            Err(ConfigError::InvalidDistance(_))
        ));
    }
}
