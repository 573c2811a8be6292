use core::ops::Deref;

use log::error;

use crate::barrier::TaskBarrier;
use crate::error::InvalidState;

/// Outstanding completion owed to a `TaskBarrier`
///
/// Signals the barrier exactly once: on `done`, or else when dropped. Dropping covers
/// every way out of a unit of work, unwinding included, so a task that panics still lets
/// `wait` return.
///
/// `B` is anything that derefs to the barrier, e.g. `&TaskBarrier` for scoped threads or
/// `Arc<TaskBarrier>` for detached ones.
#[derive(Debug)]
#[must_use = "dropping a `Pending` signals completion at once"]
pub struct Pending<B: Deref<Target = TaskBarrier>> {
    barrier: Option<B>,
}

impl<B: Deref<Target = TaskBarrier>> Pending<B> {
    /// Take on a completion the barrier already counts.
    #[inline] pub fn new(barrier: B) -> Self { Pending { barrier: Some(barrier) } }

    /// Count one more completion and take it on.
    #[inline] pub fn register(barrier: B) -> Result<Self, InvalidState> {
        barrier.add(1)?;
        Ok(Pending::new(barrier))
    }

    /// Signal completion now, returning any misuse rather than logging it.
    pub fn done(mut self) -> Result<(), InvalidState> {
        match self.barrier.take() {
            Some(barrier) => barrier.signal_done(),
            None => Ok(()),
        }
    }
}

impl<B: Deref<Target = TaskBarrier>> Drop for Pending<B> {
    fn drop(&mut self) {
        if let Some(barrier) = self.barrier.take() {
            if let Err(e) = barrier.signal_done() {
                error!("task barrier: {}", e);
            }
        }
    }
}

impl TaskBarrier {
    /// Take on one of the completions this barrier already counts.
    #[inline] pub fn claim(&self) -> Pending<&Self> { Pending::new(self) }

    /// Count one more completion and take it on.
    #[inline] pub fn register(&self) -> Result<Pending<&Self>, InvalidState> {
        Pending::register(self)
    }
}
