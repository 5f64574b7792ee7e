//! Fast timing utilities using direct clock_gettime calls
//!
//! Every IO is bracketed by two [`FastInstant::now`] reads, so the clock read
//! is on the hot path. The deadline check only needs millisecond accuracy and
//! uses the coarse clock instead.

use std::time::Duration;

/// Monotonic timestamp read with clock_gettime
///
/// Resolution: nanoseconds (CLOCK_MONOTONIC) or about a millisecond
/// (CLOCK_MONOTONIC_COARSE).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FastInstant {
    nanos: u64,
}

#[inline(always)]
fn read_clock(clock: libc::clockid_t) -> FastInstant {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };

    // SAFETY: ts is a valid timespec; monotonic clocks cannot fail on Linux
    unsafe {
        libc::clock_gettime(clock, &mut ts);
    }

    FastInstant {
        nanos: (ts.tv_sec as u64) * 1_000_000_000 + (ts.tv_nsec as u64),
    }
}

impl FastInstant {
    /// Current time from CLOCK_MONOTONIC
    #[inline(always)]
    pub fn now() -> Self {
        read_clock(libc::CLOCK_MONOTONIC)
    }

    /// Current time from CLOCK_MONOTONIC_COARSE
    #[inline(always)]
    pub fn now_coarse() -> Self {
        read_clock(libc::CLOCK_MONOTONIC_COARSE)
    }

    /// Instant `duration` after this one
    #[inline]
    pub fn add_duration(&self, duration: Duration) -> Self {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        Self {
            nanos: self.nanos.saturating_add(nanos),
        }
    }

    /// Seconds since an earlier instant as f64
    #[inline(always)]
    pub fn secs_since(&self, earlier: FastInstant) -> f64 {
        self.nanos.saturating_sub(earlier.nanos) as f64 * 1e-9
    }
}
