use std::env::VarError;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_CONCURRENCY: usize = 15;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_SCOPE: &str = "iscapi offline_access";

/// Credentials for the password-grant token exchange.
#[derive(Clone)]
pub struct Credentials {
    /// Raw value of the `Authorization` header on the token request.
    pub client_auth: String,
    pub username: String,
    pub password: String,
    pub scope: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

/// Path suffixes of the vendor endpoints, appended to `base_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub token: String,
    pub catalog: String,
    pub product: String,
    pub price: String,
    pub inventory: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            token: "/identity/connect/token".to_string(),
            catalog: "/api/v1/catalogPages".to_string(),
            product: "/api/v2/products".to_string(),
            price: "/api/v1/realtimepricing".to_string(),
            inventory: "/api/v1/realtimeinventory".to_string(),
        }
    }
}

/// Everything a run needs to talk to the vendor. Built once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Vendor origin without a trailing slash, e.g. `https://shop.example.com`.
    pub base_url: String,
    pub endpoints: Endpoints,
    pub credentials: Credentials,
    pub concurrency: usize,
    pub request_timeout: Duration,
}

impl Config {
    pub fn new(base_url: &str, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            endpoints: Endpoints::default(),
            credentials,
            concurrency: DEFAULT_CONCURRENCY,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        build_config(|key| std::env::var(key))
    }

    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoints.token)
    }

    pub fn catalog_url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoints.catalog)
    }

    pub fn product_url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoints.product)
    }

    pub fn price_url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoints.price)
    }

    pub fn inventory_url(&self) -> String {
        format!("{}{}", self.base_url, self.endpoints.inventory)
    }
}

fn build_config<F>(lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        match lookup(var) {
            Ok(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ConfigError::MissingEnvVar(var.to_string())),
        }
    };

    let or_default =
        |var: &str, default: &str| -> String { lookup(var).unwrap_or_else(|_| default.to_string()) };

    let parse_usize = |var: &str, default: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .trim()
                .parse::<usize>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    };

    let parse_u64 = |var: &str, default: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(default),
        }
    };

    let base_url = require("REMOTE_BASE_URL")?;
    let credentials = Credentials {
        client_auth: require("CLIENT_AUTH")?,
        username: require("REMOTE_USERNAME")?,
        password: require("REMOTE_PASSWORD")?,
        scope: or_default("REMOTE_TOKEN_SCOPE", DEFAULT_SCOPE),
    };

    let defaults = Endpoints::default();
    let endpoints = Endpoints {
        token: or_default("REMOTE_TOKEN_PATH", &defaults.token),
        catalog: or_default("REMOTE_CATALOG_API_PATH", &defaults.catalog),
        product: or_default("REMOTE_PRODUCT_API_PATH", &defaults.product),
        price: or_default("REMOTE_PRICE_API_PATH", &defaults.price),
        inventory: or_default("REMOTE_INVENTORY_API_PATH", &defaults.inventory),
    };

    let concurrency = parse_usize("SPIDER_CONCURRENCY", DEFAULT_CONCURRENCY)?;
    if concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "SPIDER_CONCURRENCY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let timeout_secs = parse_u64("SPIDER_REQUEST_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;

    let mut config = Config::new(&base_url, credentials);
    config.endpoints = endpoints;
    config.concurrency = concurrency;
    config.request_timeout = Duration::from_secs(timeout_secs);
    Ok(config)
}
