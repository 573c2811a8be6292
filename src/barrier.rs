use core::fmt;
use core::sync::atomic::{AtomicU32, AtomicU64, Ordering as Memord};

use log::{debug, trace};

use crate::error::InvalidState;
use crate::system::{futex_wait, futex_wake_all};

// bits 0..32: outstanding completions
// bits 32..63: threads blocked in `wait`
// bit 63: count has reached zero with a waiter present
const COUNT: u64 = 0xFFFF_FFFF;
const WAITER: u64 = 1 << 32;
const WAITERS: u64 = 0x7FFF_FFFF << 32;
const SATISFIED: u64 = 1 << 63;

/// Largest count a `TaskBarrier` can track
pub const MAX_COUNT: u32 = (1 << 31) - 1;

#[inline] fn count(s: u64) -> u32 { (s & COUNT) as u32 }

#[inline] fn waiters(s: u64) -> u32 { ((s & WAITERS) >> 32) as u32 }

/// Task completion barrier
///
/// Tracks a number of outstanding units of work. Each calls `signal_done` once when it
/// finishes; `wait` blocks until none are left. Once the count has reached zero with a
/// waiter present the barrier is spent and refuses further `add`s.
pub struct TaskBarrier {
    state: AtomicU64,
    // bumped when the barrier becomes satisfied; blocked waiters sleep on it
    seq: AtomicU32,
}

impl TaskBarrier {
    /// Make a barrier expecting `n` completions.
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds [`MAX_COUNT`].
    #[inline] pub const fn new(n: u32) -> Self {
        assert!(n <= MAX_COUNT, "barrier count out of range");
        TaskBarrier { state: AtomicU64::new(n as u64), seq: AtomicU32::new(0) }
    }

    /// Outstanding completions at the moment of the call.
    #[inline] pub fn count(&self) -> u32 { count(self.state.load(Memord::Acquire)) }

    /// Threads that have blocked in `wait` so far.
    #[inline] pub fn waiters(&self) -> u32 { waiters(self.state.load(Memord::Acquire)) }

    /// Whether the count has reached zero while waited upon.
    #[inline] pub fn is_satisfied(&self) -> bool {
        self.state.load(Memord::Acquire) & SATISFIED != 0
    }

    /// Adjust the outstanding count by `delta`.
    ///
    /// Waiters are released if this brings the count to zero. Fails, leaving the count as
    /// it was, if the result would be negative or too large, or if the barrier is already
    /// satisfied.
    pub fn add(&self, delta: i32) -> Result<(), InvalidState> {
        let mut s = self.state.load(Memord::Relaxed);
        let (old, new) = loop {
            if s & SATISFIED != 0 { return Err(InvalidState::Satisfied) }
            let count = count(s);
            let n = i64::from(count) + i64::from(delta);
            if n < 0 { return Err(InvalidState::NegativeCount { count, delta }) }
            if n > i64::from(MAX_COUNT) {
                return Err(InvalidState::CountOverflow { count, delta });
            }
            let next = Self::settle(s & !COUNT | n as u64);
            match self.state.compare_exchange_weak(s, next, Memord::AcqRel, Memord::Relaxed) {
                Ok(_) => break (s, next),
                Err(x) => s = x,
            }
        };
        debug!("task barrier count {} -> {}", count(old), count(new));
        if new & SATISFIED != 0 { self.release(waiters(new)) }
        Ok(())
    }

    /// Signal that one unit of work has finished.
    ///
    /// Fails if no completions are outstanding.
    pub fn signal_done(&self) -> Result<(), InvalidState> {
        let mut s = self.state.load(Memord::Relaxed);
        let new = loop {
            if count(s) == 0 { return Err(InvalidState::ExcessDone) }
            // count > 0, so SATISFIED is clear
            let next = Self::settle(s - 1);
            match self.state.compare_exchange_weak(s, next, Memord::AcqRel, Memord::Relaxed) {
                Ok(_) => break next,
                Err(x) => s = x,
            }
        };
        if new & SATISFIED != 0 { self.release(waiters(new)) }
        Ok(())
    }

    /// Block until the count reaches zero.
    ///
    /// Returns at once if it is zero already.
    pub fn wait(&self) {
        let mut s = self.state.load(Memord::Acquire);
        loop {
            if s & SATISFIED != 0 { return }
            let next = if count(s) == 0 { s | SATISFIED } else { s + WAITER };
            match self.state.compare_exchange(s, next, Memord::AcqRel, Memord::Acquire) {
                Ok(_) if next & SATISFIED != 0 => {
                    trace!("task barrier satisfied");
                    return;
                },
                Ok(_) => break,
                Err(x) => s = x,
            }
        }
        // Registered as a waiter: the transition to zero sets SATISFIED before bumping `seq`.
        loop {
            let seq = self.seq.load(Memord::Acquire);
            if self.state.load(Memord::Acquire) & SATISFIED != 0 { return }
            futex_wait(&self.seq, seq);
        }
    }

    // A count of zero with waiters blocked is terminal.
    #[inline] fn settle(s: u64) -> u64 {
        if count(s) == 0 && waiters(s) > 0 { s | SATISFIED } else { s }
    }

    #[inline] fn release(&self, n: u32) {
        trace!("task barrier satisfied; waking {} waiters", n);
        self.seq.fetch_add(1, Memord::Release);
        futex_wake_all(&self.seq);
    }
}

impl fmt::Debug for TaskBarrier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = self.state.load(Memord::Relaxed);
        f.debug_struct("TaskBarrier")
            .field("count", &count(s))
            .field("waiters", &waiters(s))
            .field("satisfied", &(s & SATISFIED != 0))
            .finish()
    }
}
