use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Length of one refill interval.
pub const REFILL_INTERVAL: Duration = Duration::from_secs(60);

/// Lock-free token bucket refilled to capacity at the start of every interval.
///
/// The refill window index and the remaining tokens share one atomic word
/// (window in the high half, tokens in the low half) so a consume attempt is a
/// single compare-and-swap.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: u32,
    origin: Duration,
    state: AtomicU64,
}

impl TokenBucket {
    /// Creates a full bucket whose first interval starts at `now`.
    #[must_use]
    pub const fn new(capacity: u32, now: Duration) -> Self {
        Self {
            capacity,
            origin: now,
            state: AtomicU64::new(pack(0, capacity)),
        }
    }

    /// Maximum tokens held per interval.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Attempts to take one token, refilling first if a new interval began.
    pub fn try_consume(&self, now: Duration) -> bool {
        let window = self.window_at(now);
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |packed| {
                let (stored_window, tokens) = self.refilled(unpack(packed), window);
                tokens
                    .checked_sub(1)
                    .map(|remaining| pack(stored_window, remaining))
            })
            .is_ok()
    }

    /// Tokens that a consume attempt at `now` could draw on.
    #[must_use]
    pub fn available(&self, now: Duration) -> u32 {
        let window = self.window_at(now);
        let (_, tokens) = self.refilled(unpack(self.state.load(Ordering::Acquire)), window);
        tokens
    }

    fn window_at(&self, now: Duration) -> u32 {
        let elapsed = now.saturating_sub(self.origin).as_secs();
        u32::try_from(elapsed / REFILL_INTERVAL.as_secs()).unwrap_or(u32::MAX)
    }

    fn refilled(&self, (stored_window, tokens): (u32, u32), window: u32) -> (u32, u32) {
        if window > stored_window {
            (window, self.capacity)
        } else {
            (stored_window, tokens)
        }
    }
}

const fn pack(window: u32, tokens: u32) -> u64 {
    ((window as u64) << 32) | tokens as u64
}

const fn unpack(packed: u64) -> (u32, u32) {
    ((packed >> 32) as u32, packed as u32)
}
