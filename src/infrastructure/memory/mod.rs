//! In-Memory 实现

pub mod rate_limiter;

pub use rate_limiter::{Decision, FixedWindowRateLimiter};
