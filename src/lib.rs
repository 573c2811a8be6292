//! Task completion barrier
//!
//! A [`TaskBarrier`] counts units of work that have yet to finish and lets any number of
//! threads block until that count reaches zero. Each unit of work holds a [`Pending`]
//! obligation, which signals the barrier when dropped, so a panicking task still reports
//! back.
//!
//! ```ignore
//! let barrier = Arc::new(TaskBarrier::new(2));
//! for msg in ["Hello", "World"] {
//!     let pending = Pending::new(Arc::clone(&barrier));
//!     thread::spawn(move || {
//!         let _pending = pending;
//!         println!("{}", msg);
//!     });
//! }
//! barrier.wait();
//! ```

#![no_std]

#![deny(missing_debug_implementations)]

#[cfg(test)] extern crate std;

#[cfg(target_os = "linux")] mod linux;
#[cfg(target_os = "linux")] use crate::linux as system;

#[cfg(not(target_os = "linux"))]
compile_error!("task-barrier supports only Linux");

mod barrier;
mod error;
mod pending;

pub use barrier::*;
pub use error::*;
pub use pending::*;
