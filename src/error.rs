use thiserror::Error;

/// Misuse of a [`TaskBarrier`](crate::TaskBarrier)
///
/// Every variant is a bug in the caller; none is worth retrying.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidState {
    /// `add` would take the count below zero.
    #[error("negative barrier count: {count} + ({delta})")]
    NegativeCount {
        /// Count before the call.
        count: u32,
        /// Requested adjustment.
        delta: i32,
    },

    /// `add` would take the count past `MAX_COUNT`.
    #[error("barrier count overflow: {count} + {delta}")]
    CountOverflow {
        /// Count before the call.
        count: u32,
        /// Requested adjustment.
        delta: i32,
    },

    /// A waiter has already been released; the barrier cannot be rearmed.
    #[error("barrier already satisfied")]
    Satisfied,

    /// More completions signalled than were counted.
    #[error("completion signalled with no outstanding tasks")]
    ExcessDone,
}
