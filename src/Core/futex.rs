//! Blocking-wait primitive for the queues' signal words.
//!
//! Linux gets a real futex. Elsewhere the wait degrades to a short sleep,
//! which costs wakeup latency but never correctness: every caller re-checks
//! its condition in a loop.

use std::sync::atomic::{AtomicU32, Ordering};

/// Sleep until `word` moves away from `expected` (or a spurious wakeup).
#[cfg(target_os = "linux")]
pub fn wait(word: &AtomicU32, expected: u32) {
    use std::ptr;

    // Skip the syscall when the word already moved on.
    if word.load(Ordering::Acquire) != expected {
        return;
    }

    unsafe {
        libc::syscall(
            libc::SYS_futex,
            word as *const AtomicU32 as *const u32,
            libc::FUTEX_WAIT | libc::FUTEX_PRIVATE_FLAG,
            expected,
            ptr::null::<libc::timespec>(),
            ptr::null::<u32>(),
            0u32,
        );
    }
}

/// Wake one waiter sleeping on `word`.
#[cfg(target_os = "linux")]
pub fn wake_one(word: &AtomicU32) {
    unsafe {
        libc::syscall(
            libc::SYS_futex,
            word as *const AtomicU32 as *const u32,
            libc::FUTEX_WAKE | libc::FUTEX_PRIVATE_FLAG,
            1,
            std::ptr::null::<libc::timespec>(),
            std::ptr::null::<u32>(),
            0u32,
        );
    }
}

#[cfg(not(target_os = "linux"))]
pub fn wait(word: &AtomicU32, expected: u32) {
    if word.load(Ordering::Acquire) == expected {
        std::thread::sleep(std::time::Duration::from_millis(1));
    }
}

#[cfg(not(target_os = "linux"))]
pub fn wake_one(_word: &AtomicU32) {}
