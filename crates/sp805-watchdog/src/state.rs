//! Arm state and early-warning events.

/// Whether the driver has the countdown running.
///
/// "About to reset" is not a separate state: it is an `Armed` watchdog whose
/// raw interrupt status is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u32)]
pub enum ArmState {
    /// Counter stopped, clock released.
    #[default]
    Stopped = 0,
    /// Counter running with interrupt and reset enabled.
    Armed = 1,
}

impl ArmState {
    /// Whether the countdown is running.
    #[must_use]
    pub fn is_armed(self) -> bool {
        matches!(self, Self::Armed)
    }

    /// Get the state as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stopped => "Stopped",
            Self::Armed => "Armed",
        }
    }
}

impl core::fmt::Display for ArmState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Notification raised by the early-warning path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogEvent {
    /// First pass expired; the next expiry resets the system.
    AboutToReset,
    /// The pending reset was cancelled by a ping, a restart, or out of band.
    ResetAverted,
}

impl WatchdogEvent {
    /// Get the event as a string slice.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AboutToReset => "Watchdog is about to reboot system",
            Self::ResetAverted => "Watchdog reboot averted",
        }
    }
}

impl core::fmt::Display for WatchdogEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Observer for [`WatchdogEvent`]s.
///
/// May be invoked from interrupt context: it must not block or allocate.
/// No driver lock is held while it runs, so it may query the watchdog.
pub type EventCallback = Box<dyn Fn(WatchdogEvent) + Send + Sync>;
