//! Route Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("path must not be empty")]
    EmptyPath,

    #[error("path must start with '/': {0}")]
    MissingLeadingSlash(String),

    #[error("rate limit window must be at least 1ms")]
    ZeroRateLimitWindow,

    #[error("rate limit must allow at least one request per window")]
    ZeroRateLimit,
}
