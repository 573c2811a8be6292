use core::ptr;
use core::sync::atomic::AtomicU32;

use libc::{FUTEX_PRIVATE_FLAG, FUTEX_WAIT, FUTEX_WAKE, SYS_futex};

// Sleep while `*f == val`. May return early (EAGAIN, EINTR, spurious); callers re-check.
#[inline]
pub fn futex_wait(f: &AtomicU32, val: u32) { unsafe {
    libc::syscall(SYS_futex, f as *const AtomicU32, FUTEX_WAIT | FUTEX_PRIVATE_FLAG, val,
                  ptr::null::<libc::timespec>());
} }

#[inline]
pub fn futex_wake_all(f: &AtomicU32) { unsafe {
    libc::syscall(SYS_futex, f as *const AtomicU32, FUTEX_WAKE | FUTEX_PRIVATE_FLAG,
                  libc::c_int::MAX);
} }
