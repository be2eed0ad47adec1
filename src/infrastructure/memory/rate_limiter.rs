//! In-Memory Rate Limiter
//!
//! 固定窗口计数器，按调用方标识分别计数

use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::domain::RateLimit;

/// 超过该数量的调用方记录时顺带清理已过期窗口
const PURGE_THRESHOLD: usize = 10_000;

struct Window {
    started_at: Instant,
    count: u64,
}

/// 限流判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u64 },
    Limited { retry_after: Duration },
}

/// 固定窗口限流器
pub struct FixedWindowRateLimiter {
    window: Duration,
    limit: u64,
    windows: DashMap<String, Window>,
}

impl FixedWindowRateLimiter {
    pub fn new(rate_limit: RateLimit) -> Self {
        Self {
            window: rate_limit.window(),
            limit: rate_limit.limit,
            windows: DashMap::new(),
        }
    }

    /// 为调用方消耗一次配额
    pub fn try_acquire(&self, caller: &str) -> Decision {
        self.try_acquire_at(caller, Instant::now())
    }

    fn try_acquire_at(&self, caller: &str, now: Instant) -> Decision {
        if self.windows.len() > PURGE_THRESHOLD {
            self.purge_expired(now);
        }

        let mut entry = self.windows.entry(caller.to_string()).or_insert_with(|| Window {
            started_at: now,
            count: 0,
        });
        let window = entry.value_mut();

        if now.duration_since(window.started_at) >= self.window {
            window.started_at = now;
            window.count = 0;
        }

        if window.count >= self.limit {
            let elapsed = now.duration_since(window.started_at);
            return Decision::Limited {
                retry_after: self.window.saturating_sub(elapsed),
            };
        }

        window.count += 1;
        Decision::Allowed {
            remaining: self.limit - window.count,
        }
    }

    /// 清理已过期的窗口
    pub fn purge_expired(&self, now: Instant) {
        let window = self.window;
        self.windows
            .retain(|_, w| now.duration_since(w.started_at) < window);
    }

    pub fn tracked_callers(&self) -> usize {
        self.windows.len()
    }
}
