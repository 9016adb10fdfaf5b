//! Conversions between timeouts in seconds and SP805 reload values.
//!
//! The SP805 counts the reload value down twice before resetting: the end of
//! the first pass raises the interrupt, the end of the second pass (if the
//! interrupt is still pending) asserts reset. A requested timeout therefore
//! programs half its length into `WDTLOAD`.

use crate::error::{Sp805Error, Sp805Result};
use crate::regs::{LOAD_MAX, LOAD_MIN};

/// Result of converting a requested timeout into a reload value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSetting {
    /// Value to program into `WDTLOAD`.
    pub reload: u32,
    /// Timeout the reload value actually gives, in whole seconds.
    pub effective_secs: u32,
}

/// Compute the reload value for `timeout_secs` on a clock of `rate_hz`.
///
/// The result is clamped to `[LOAD_MIN, LOAD_MAX]`, so the effective timeout
/// may be shorter or longer than requested. It is rounded to the nearest
/// second (ties up) and never reported as zero.
///
/// # Errors
///
/// Returns [`Sp805Error::InvalidClockRate`] if `rate_hz` is zero.
pub fn compute_reload(timeout_secs: u32, rate_hz: u64) -> Sp805Result<ReloadSetting> {
    if rate_hz == 0 {
        return Err(Sp805Error::InvalidClockRate);
    }

    let load = (rate_hz / 2)
        .saturating_mul(u64::from(timeout_secs))
        .saturating_sub(1)
        .clamp(u64::from(LOAD_MIN), u64::from(LOAD_MAX));
    let reload = u32::try_from(load).unwrap_or(LOAD_MAX);

    Ok(ReloadSetting {
        reload,
        effective_secs: effective_timeout(reload, rate_hz),
    })
}

/// Whole-second timeout produced by `reload` on a clock of `rate_hz`.
///
/// A zero rate reports zero.
#[must_use]
pub fn effective_timeout(reload: u32, rate_hz: u64) -> u32 {
    // (reload + 1) * 2 fits in 34 bits.
    let ticks = (u64::from(reload) + 1) * 2;
    let Some(secs) = ticks.saturating_add(rate_hz / 2).checked_div(rate_hz) else {
        return 0;
    };
    u32::try_from(secs).unwrap_or(u32::MAX).max(1)
}

/// Seconds until reset given a snapshot of the counter.
///
/// `value` is the count left in the current pass. While the interrupt is not
/// yet raised a full second pass of `reload + 1` ticks is still to come.
/// Truncates; a zero rate reports zero.
#[must_use]
pub fn compute_time_left(value: u32, reload: u32, interrupt_raised: bool, rate_hz: u64) -> u32 {
    let mut ticks = u64::from(value);
    if !interrupt_raised {
        ticks += u64::from(reload) + 1;
    }
    ticks
        .checked_div(rate_hz)
        .map_or(0, |secs| u32::try_from(secs).unwrap_or(u32::MAX))
}
