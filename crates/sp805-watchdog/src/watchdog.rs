//! Operations a watchdog exposes to the watchdog framework.
//!
//! The framework drives a device exclusively through [`WatchdogOps`] and
//! advertises its capabilities from the static [`WatchdogInfo`].

use crate::error::Sp805Result;

/// Capability flags advertised to the framework.
///
/// Bit values match the Linux `WDIOF_*` options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WatchdogOptions(u32);

impl WatchdogOptions {
    /// The timeout can be changed at runtime.
    pub const SETTIMEOUT: Self = Self(0x0080);
    /// Closing the control surface only stops the watchdog after a magic
    /// character was written.
    pub const MAGICCLOSE: Self = Self(0x0100);
    /// The device supports keepalive pings.
    pub const KEEPALIVEPING: Self = Self(0x8000);

    /// No options.
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Union of two option sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether every option in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for WatchdogOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// Static description of a watchdog device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogInfo {
    /// Identity string reported to userspace.
    pub identity: &'static str,
    /// Supported options.
    pub options: WatchdogOptions,
}

/// Identity and capabilities of the SP805 driver.
pub static SP805_INFO: WatchdogInfo = WatchdogInfo {
    identity: "sp805-wdt",
    options: WatchdogOptions::MAGICCLOSE
        .union(WatchdogOptions::SETTIMEOUT)
        .union(WatchdogOptions::KEEPALIVEPING),
};

/// Operations a watchdog driver provides to the framework.
///
/// The framework may call any of these concurrently from different threads.
/// None of them is called from interrupt context.
pub trait WatchdogOps: Send + Sync {
    /// Start the countdown with interrupt and reset enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the device cannot be armed; it stays stopped.
    fn start(&self) -> Sp805Result<()>;

    /// Stop the countdown.
    ///
    /// # Errors
    ///
    /// Implementation-defined; the SP805 never fails to stop.
    fn stop(&self) -> Sp805Result<()>;

    /// Restart the first countdown pass from the full reload value.
    ///
    /// # Errors
    ///
    /// Implementation-defined; the SP805 never fails to ping.
    fn ping(&self) -> Sp805Result<()>;

    /// Stage a new timeout, returning the effective timeout in seconds.
    ///
    /// The effective timeout may differ from the request. It takes effect
    /// on the next `start` or `ping`.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout cannot be computed.
    fn set_timeout(&self, timeout_secs: u32) -> Sp805Result<u32>;

    /// Seconds left until the device resets the system.
    fn time_left(&self) -> u32;
}
