//! Clock collaborator.

use std::sync::Arc;

use crate::error::Sp805Result;

/// The clock feeding the SP805 counter.
///
/// `enable` and `disable` may sleep; the driver never calls them with its
/// register lock held. Calls are balanced: every successful `enable` is
/// followed by exactly one `disable`.
pub trait Clock: Send + Sync {
    /// Current tick rate in Hz.
    fn rate_hz(&self) -> u64;

    /// Prepare and enable the clock.
    ///
    /// # Errors
    ///
    /// Returns [`Sp805Error::ClockEnable`](crate::Sp805Error::ClockEnable) if
    /// the clock cannot be enabled.
    fn enable(&self) -> Sp805Result<()>;

    /// Disable and unprepare the clock.
    fn disable(&self);
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn rate_hz(&self) -> u64 {
        (**self).rate_hz()
    }

    fn enable(&self) -> Sp805Result<()> {
        (**self).enable()
    }

    fn disable(&self) {
        (**self).disable();
    }
}
