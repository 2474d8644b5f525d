pub mod api;
pub mod auth;
pub mod config;
pub mod dedup;
pub mod error;
pub mod fetch;
pub mod gate;
pub mod input;
pub mod pipeline;
pub mod report;
pub mod row;

pub use auth::{AccessToken, authenticate};
pub use config::{Config, Credentials, Endpoints};
pub use error::{ApiError, AuthError, ConfigError, InputError, ReportError, RunError};
pub use fetch::{FetchOutcome, fetch_product, normalize_path};
pub use gate::ConcurrencyGate;
pub use pipeline::{RunOptions, RunSummary, run};
pub use report::{Report, WriteMode};
pub use row::OutputRow;
