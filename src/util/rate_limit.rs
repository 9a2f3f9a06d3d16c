//! Rate limiting utilities

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::num::NonZeroU32;

/// Chat messages a single connection may relay per second
pub const CHAT_RATE_LIMIT: u32 = 5;

/// Chat limiter owned by one connection's reader loop
pub struct ChatRateLimiter {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl ChatRateLimiter {
    /// Allow a burst of `messages` followed by `messages` per second
    pub fn per_second(messages: u32) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(messages).unwrap_or(NonZeroU32::MIN));
        Self {
            limiter: RateLimiter::direct(quota),
        }
    }

    /// Returns true if the next chat message may be relayed
    pub fn check(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for ChatRateLimiter {
    fn default() -> Self {
        Self::per_second(CHAT_RATE_LIMIT)
    }
}
