//! Client configuration.
//!
//! Read from `payroll-graphql.toml` and overlaid with the `HASURA_*`
//! environment variables the Hasura tooling already uses, so the same file
//! works against local, staging and production endpoints.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::retry::RetryConfig;

/// Canonical config file name.
pub const CONFIG_FILE_NAME: &str = "payroll-graphql.toml";

pub const ENV_ENDPOINT: &str = "HASURA_GRAPHQL_ENDPOINT";
pub const ENV_WS_ENDPOINT: &str = "HASURA_GRAPHQL_WS_ENDPOINT";
pub const ENV_ADMIN_SECRET: &str = "HASURA_GRAPHQL_ADMIN_SECRET";
pub const ENV_BEARER_TOKEN: &str = "HASURA_BEARER_TOKEN";
pub const ENV_ROLE: &str = "HASURA_ROLE";
pub const ENV_USER_ID: &str = "HASURA_USER_ID";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClientConfig {
    #[serde(default)]
    pub endpoint: EndpointSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub subscriptions: SubscriptionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointSettings {
    #[serde(default = "default_endpoint_url")]
    pub url: String,
    /// Derived from `url` when unset.
    #[serde(default)]
    pub ws_url: Option<String>,
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            url: default_endpoint_url(),
            ws_url: None,
        }
    }
}

impl EndpointSettings {
    /// WebSocket URL for subscriptions: `ws_url`, or `url` with the scheme
    /// swapped (`http` → `ws`, `https` → `wss`).
    pub fn websocket_url(&self) -> Result<String> {
        if let Some(ws_url) = &self.ws_url {
            return Ok(ws_url.clone());
        }
        if let Some(rest) = self.url.strip_prefix("https://") {
            Ok(format!("wss://{rest}"))
        } else if let Some(rest) = self.url.strip_prefix("http://") {
            Ok(format!("ws://{rest}"))
        } else {
            Err(Error::Config(format!(
                "cannot derive a websocket url from {}",
                self.url
            )))
        }
    }
}

/// Request headers sent on every HTTP request and in the WebSocket
/// `connection_init` payload.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AuthSettings {
    #[serde(default)]
    pub admin_secret: Option<String>,
    #[serde(default)]
    pub bearer_token: Option<String>,
    /// `x-hasura-role`; only honoured by Hasura together with an admin
    /// secret or a JWT that allows the role.
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl AuthSettings {
    pub fn is_anonymous(&self) -> bool {
        self.admin_secret.is_none() && self.bearer_token.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    #[serde(default = "default_retry_delays_secs")]
    pub retry_delays_secs: Vec<u64>,
    /// Mutations are not idempotent; resend them only when asked to.
    #[serde(default = "default_false")]
    pub retry_mutations: bool,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            retry_delays_secs: default_retry_delays_secs(),
            retry_mutations: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionSettings {
    #[serde(default = "default_connection_init_timeout_secs")]
    pub connection_init_timeout_secs: u64,
    /// Payloads buffered per subscription before the socket reader waits.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for SubscriptionSettings {
    fn default() -> Self {
        Self {
            connection_init_timeout_secs: default_connection_init_timeout_secs(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

impl SubscriptionSettings {
    pub fn connection_init_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_init_timeout_secs)
    }
}

impl ClientConfig {
    /// Shorthand for a config pointing at `url` with everything else default.
    pub fn for_endpoint(url: impl Into<String>) -> Self {
        Self {
            endpoint: EndpointSettings {
                url: url.into(),
                ws_url: None,
            },
            ..Default::default()
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(e.to_string()))
    }

    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Overlay the `HASURA_*` environment variables. Returns whether any
    /// value changed.
    pub fn apply_env(&mut self) -> bool {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Overlay values from `lookup`, keyed by the `HASURA_*` variable names.
    /// Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> bool {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut changed = false;

        if let Some(url) = get(ENV_ENDPOINT) {
            changed |= self.endpoint.url != url;
            self.endpoint.url = url;
        }
        for (key, slot) in [
            (ENV_WS_ENDPOINT, &mut self.endpoint.ws_url),
            (ENV_ADMIN_SECRET, &mut self.auth.admin_secret),
            (ENV_BEARER_TOKEN, &mut self.auth.bearer_token),
            (ENV_ROLE, &mut self.auth.role),
            (ENV_USER_ID, &mut self.auth.user_id),
        ] {
            if let Some(value) = get(key) {
                changed |= slot.as_deref() != Some(value.as_str());
                *slot = Some(value);
            }
        }
        changed
    }

    pub fn validate(&self) -> Result<()> {
        let url = &self.endpoint.url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "endpoint.url must be an http(s) url, got {url:?}"
            )));
        }
        if let Some(ws_url) = &self.endpoint.ws_url {
            if !(ws_url.starts_with("ws://") || ws_url.starts_with("wss://")) {
                return Err(Error::Config(format!(
                    "endpoint.ws_url must be a ws(s) url, got {ws_url:?}"
                )));
            }
        }
        if self.http.timeout_secs == 0 {
            return Err(Error::Config("http.timeout_secs must be positive".into()));
        }
        if self.http.max_retries > 0 && self.http.retry_delays_secs.is_empty() {
            return Err(Error::Config(
                "http.retry_delays_secs must not be empty when retries are enabled".into(),
            ));
        }
        if self.subscriptions.channel_capacity == 0 {
            return Err(Error::Config(
                "subscriptions.channel_capacity must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.http.max_retries,
            delays: self
                .http
                .retry_delays_secs
                .iter()
                .copied()
                .map(Duration::from_secs)
                .collect(),
        }
    }
}

fn default_false() -> bool {
    false
}
fn default_endpoint_url() -> String {
    "http://localhost:8080/v1/graphql".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> usize {
    3
}
fn default_retry_delays_secs() -> Vec<u64> {
    vec![1, 2, 4]
}
fn default_connection_init_timeout_secs() -> u64 {
    10
}
fn default_channel_capacity() -> usize {
    64
}
