// src/ratelimit.rs
//! Token bucket for outbound registry calls. The budget is explicit state
//! (capacity + refill interval) owned by whichever client it is injected
//! into; there is no ambient global limiter.

use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct TokenBucket {
    capacity: u32,
    refill_every: Duration,
    inner: Mutex<BucketState>,
}

#[derive(Debug)]
struct BucketState {
    tokens: u32,
    last_refill: Instant,
}

impl TokenBucket {
    /// A bucket that starts full and regains one token per `refill_every`.
    pub fn new(capacity: u32, refill_every: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            refill_every: refill_every.max(Duration::from_millis(1)),
            inner: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    /// Take one token if available. Non-blocking; callers map an empty
    /// bucket to their own back-off or 429.
    pub fn try_acquire(&self) -> bool {
        self.try_acquire_at(Instant::now())
    }

    fn try_acquire_at(&self, now: Instant) -> bool {
        let mut st = self.inner.lock().expect("token bucket mutex poisoned");
        self.refill_at(&mut st, now);
        if st.tokens > 0 {
            st.tokens -= 1;
            true
        } else {
            false
        }
    }

    fn refill_at(&self, st: &mut BucketState, now: Instant) {
        if st.tokens >= self.capacity {
            st.last_refill = now;
            return;
        }
        let elapsed = now.saturating_duration_since(st.last_refill);
        let ticks = (elapsed.as_millis() / self.refill_every.as_millis()) as u64;
        if ticks == 0 {
            return;
        }
        let needed = u64::from(self.capacity - st.tokens);
        if ticks >= needed {
            st.tokens = self.capacity;
            st.last_refill = now;
        } else {
            st.tokens += ticks as u32;
            st.last_refill += self.refill_every * (ticks as u32);
        }
    }

    /// Currently available tokens (after a refill pass).
    pub fn available(&self) -> u32 {
        let mut st = self.inner.lock().expect("token bucket mutex poisoned");
        self.refill_at(&mut st, Instant::now());
        st.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_starts_full_and_drains() {
        let b = TokenBucket::new(3, Duration::from_secs(60));
        assert_eq!(b.available(), 3);
        assert!(b.try_acquire());
        assert!(b.try_acquire());
        assert!(b.try_acquire());
        assert!(!b.try_acquire(), "empty bucket must reject");
    }

    #[test]
    fn tokens_come_back_after_the_refill_interval() {
        let b = TokenBucket::new(2, Duration::from_secs(10));
        let start = Instant::now();
        assert!(b.try_acquire_at(start));
        assert!(b.try_acquire_at(start));
        assert!(!b.try_acquire_at(start + Duration::from_secs(9)));

        // One interval elapsed: exactly one token.
        assert!(b.try_acquire_at(start + Duration::from_secs(19)));
        assert!(!b.try_acquire_at(start + Duration::from_secs(19)));

        // A long idle stretch refills to capacity, not beyond.
        assert!(b.try_acquire_at(start + Duration::from_secs(500)));
        assert!(b.try_acquire_at(start + Duration::from_secs(500)));
        assert!(!b.try_acquire_at(start + Duration::from_secs(500)));
    }

    #[test]
    fn zero_capacity_is_bumped_to_one() {
        let b = TokenBucket::new(0, Duration::from_secs(1));
        assert!(b.try_acquire());
        assert!(!b.try_acquire());
    }
}
