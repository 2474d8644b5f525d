use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building [`crate::Config`] from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Failure of the token exchange. Always fatal for a run.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token endpoint returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("token response has no access_token field")]
    MissingToken,
}

/// Failure of a single vendor API call.
///
/// These never leave the per-item fetcher: a catalog failure drops the item,
/// any other failure nulls the fields that call would have filled.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),

    #[error("could not decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    /// `true` when the vendor rejected the bearer token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Status(s) if *s == reqwest::StatusCode::UNAUTHORIZED)
    }
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read input file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse input csv {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("input csv {path} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report csv error on {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Fatal errors that abort a whole run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("cannot build http client: {0}")]
    Client(#[source] reqwest::Error),
}
