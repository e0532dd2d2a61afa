use std::num::NonZeroU32;

use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::keyed::DashMapStateStore;
use governor::RateLimiter;

use crate::error::{AuthError, AuthResult};

/// Bucket capacity and refill rate, shared by every client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    requests_per_minute: NonZeroU32,
    burst: NonZeroU32,
}

impl Quota {
    /// Refills at `requests_per_minute / 60` tokens per second up to `burst`.
    pub fn per_minute(requests_per_minute: u32, burst: u32) -> AuthResult<Self> {
        match (NonZeroU32::new(requests_per_minute), NonZeroU32::new(burst)) {
            (Some(requests_per_minute), Some(burst)) => Ok(Self {
                requests_per_minute,
                burst,
            }),
            _ => Err(AuthError::Internal(
                "rate limit and burst must both be positive".to_string(),
            )),
        }
    }

    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute.get()
    }

    pub fn burst(&self) -> u32 {
        self.burst.get()
    }

    fn to_governor(self) -> governor::Quota {
        governor::Quota::per_minute(self.requests_per_minute).allow_burst(self.burst)
    }
}

type KeyedLimiter<C> =
    RateLimiter<String, DashMapStateStore<String>, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// One lazily created token bucket per client key.
///
/// Buckets live in governor's `DashMap` state store. The admission check for
/// a key runs while that key's shard guard is held, so a concurrent
/// [`purge_idle`](Self::purge_idle) can never drop a bucket mid-decision.
pub struct RateLimitRegistry<C: Clock = DefaultClock> {
    limiter: KeyedLimiter<C>,
    quota: Quota,
}

impl RateLimitRegistry {
    pub fn new(quota: Quota) -> Self {
        Self::with_clock(quota, DefaultClock::default())
    }
}

impl<C: Clock> RateLimitRegistry<C> {
    /// Registry driven by `clock`; tests pass a `FakeRelativeClock`.
    pub fn with_clock(quota: Quota, clock: C) -> Self {
        Self {
            limiter: RateLimiter::new(quota.to_governor(), DashMapStateStore::default(), clock),
            quota,
        }
    }

    pub fn quota(&self) -> Quota {
        self.quota
    }

    /// Admits the request if `client_key` has a token left, consuming it.
    pub fn allow(&self, client_key: &str) -> bool {
        self.limiter.check_key(&client_key.to_owned()).is_ok()
    }

    /// Number of clients currently tracked.
    pub fn len(&self) -> usize {
        self.limiter.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiter.is_empty()
    }

    /// Drops buckets that have fully refilled. A new bucket starts full, so
    /// dropping these does not change any future decision.
    ///
    /// Returns how many entries were removed.
    pub fn purge_idle(&self) -> usize {
        let before = self.limiter.len();
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        let remaining = self.limiter.len();
        let removed = before.saturating_sub(remaining);
        if removed > 0 {
            tracing::debug!("Purged {removed} idle rate limiters, {remaining} remaining");
        }
        removed
    }
}
