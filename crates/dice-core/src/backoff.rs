//! Jittered retry backoff for transient store/document-backend errors.
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    attempt: u32,
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            max,
            attempt: 0,
        }
    }

    /// Duration to wait before the next retry, advancing the attempt
    /// counter. Jitter is derived from the attempt count itself so callers
    /// without access to a shared PRNG still get spread-out retries.
    pub fn next_delay(&mut self) -> Duration {
        let exp = self.base.saturating_mul(1 << self.attempt.min(10));
        let capped = exp.min(self.max);
        self.attempt += 1;
        let jitter_frac = ((self.attempt as u64 * 2654435761) % 1000) as f64 / 1000.0;
        capped.mul_f64(0.5 + jitter_frac * 0.5)
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(50), Duration::from_secs(5))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_but_stay_capped() {
        let mut b = Backoff::new(Duration::from_millis(10), Duration::from_millis(100));
        let mut last = Duration::ZERO;
        for _ in 0..20 {
            let d = b.next_delay();
            assert!(d <= Duration::from_millis(100));
            last = d;
        }
        assert!(last <= Duration::from_millis(100));
    }
}
