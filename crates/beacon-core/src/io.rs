//! Time and randomness abstractions.
//!
//! TigerStyle: non-deterministic inputs go through injectable traits.
//!
//! The registries are time-dependent (lease expiry, eviction) and the peer
//! sampler is randomized, so both concerns go through injectable traits.
//! Production code uses [`WallClock`] and [`StdRngProvider`]; tests drive
//! time explicitly with [`ManualClock`] and seed the RNG for reproducible
//! sampling. Registry code never calls `SystemTime::now()` directly.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Instant, SystemTime, UNIX_EPOCH};

/// Shared time source.
///
/// Provides two readings: wall-clock milliseconds since the Unix epoch
/// (stored in records, compared against lease timeouts) and a monotonic
/// nanosecond reading (used for the DOWN-peer age check). Implementations
/// must be safe for concurrent reads.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current wall-clock time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> u64;

    /// Monotonic reading in nanoseconds.
    fn now_nanos(&self) -> u64;
}

/// Production clock backed by the system time sources.
#[derive(Debug)]
pub struct WallClock {
    /// Anchor for the monotonic reading.
    origin: Instant,
}

impl WallClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for WallClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    fn now_nanos(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Manually advanced clock for tests.
///
/// Holds a single millisecond counter; the nanosecond reading is derived
/// from it so that wall-time and monotonic comparisons stay coherent when
/// tests jump the clock forward.
#[derive(Debug)]
pub struct ManualClock {
    time_ms: AtomicU64,
}

impl ManualClock {
    pub fn new(initial_ms: u64) -> Self {
        Self {
            time_ms: AtomicU64::new(initial_ms),
        }
    }

    /// Advance the clock by the given number of milliseconds.
    pub fn advance(&self, ms: u64) {
        self.time_ms.fetch_add(ms, Ordering::SeqCst);
    }

    /// Set the clock to an absolute millisecond value.
    pub fn set(&self, ms: u64) {
        self.time_ms.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.time_ms.load(Ordering::SeqCst)
    }

    fn now_nanos(&self) -> u64 {
        self.now_ms().saturating_mul(1_000_000)
    }
}

/// Random number source for the weighted peer sampler.
///
/// Not cryptographically secure; used for gossip target selection only.
pub trait RngProvider: Send + Sync + fmt::Debug {
    /// Next raw 64-bit value.
    fn next_u64(&self) -> u64;

    /// Uniform value in `[min, max)`. Panics if `min >= max`.
    fn gen_range(&self, min: u64, max: u64) -> u64 {
        assert!(min < max, "gen_range requires min < max");
        min + self.next_u64() % (max - min)
    }

    /// Uniform value in `[0, 1)`.
    fn next_f64(&self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

/// Lock-free xorshift64* generator.
///
/// State advances through an atomic compare-exchange loop so concurrent
/// callers never observe a torn update.
#[derive(Debug)]
pub struct StdRngProvider {
    state: AtomicU64,
}

impl StdRngProvider {
    /// Seed from the system clock.
    pub fn new() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0x9E3779B97F4A7C15);
        Self::with_seed(seed | 1)
    }

    /// Fixed seed, for reproducible tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            state: AtomicU64::new(seed.max(1)),
        }
    }
}

impl Default for StdRngProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RngProvider for StdRngProvider {
    fn next_u64(&self) -> u64 {
        let mut current = self.state.load(Ordering::Relaxed);
        loop {
            let mut x = current;
            x ^= x >> 12;
            x ^= x << 25;
            x ^= x >> 27;
            match self
                .state
                .compare_exchange_weak(current, x, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return x.wrapping_mul(0x2545F4914F6CDD1D),
                Err(observed) => current = observed,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_clock_now_ms() {
        let clock = WallClock::new();
        let now = clock.now_ms();
        // After 2020.
        assert!(now > 1_577_836_800_000);
        assert!(clock.now_ms() >= now);
    }

    #[test]
    fn test_wall_clock_nanos_monotonic() {
        let clock = WallClock::new();
        let a = clock.now_nanos();
        let b = clock.now_nanos();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_advance_and_set() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_ms(), 1_000);

        clock.advance(500);
        assert_eq!(clock.now_ms(), 1_500);
        assert_eq!(clock.now_nanos(), 1_500 * 1_000_000);

        clock.set(10);
        assert_eq!(clock.now_ms(), 10);
    }

    #[test]
    fn test_rng_deterministic_with_seed() {
        let a = StdRngProvider::with_seed(42);
        let b = StdRngProvider::with_seed(42);
        for _ in 0..16 {
            assert_eq!(a.next_u64(), b.next_u64());
        }
    }

    #[test]
    fn test_rng_gen_range_bounds() {
        let rng = StdRngProvider::with_seed(7);
        for _ in 0..1_000 {
            let v = rng.gen_range(1, 6);
            assert!((1..6).contains(&v));
        }
    }

    #[test]
    #[should_panic(expected = "min < max")]
    fn test_rng_gen_range_rejects_empty_range() {
        StdRngProvider::with_seed(7).gen_range(5, 5);
    }
}
