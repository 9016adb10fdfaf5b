//! Error types for SP805 watchdog operations.
//!
//! Attach-time failures (register mapping, clock lookup, interrupt binding,
//! framework registration) abort attachment. At runtime only the clock can
//! fail, and only while arming.

use thiserror::Error;

/// Errors that can occur while attaching or driving an SP805 watchdog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Sp805Error {
    /// The register block could not be mapped.
    #[error("Register mapping failed: {0}")]
    RegisterMap(String),

    /// The watchdog clock could not be resolved.
    #[error("Clock not found: {0}")]
    ClockLookup(String),

    /// The watchdog clock could not be enabled.
    #[error("Clock enable failed: {0}")]
    ClockEnable(String),

    /// The clock reports a rate of zero ticks per second.
    #[error("Clock rate is zero")]
    InvalidClockRate,

    /// No interrupt line is described for the device.
    #[error("No interrupt line available")]
    IrqUnavailable,

    /// The interrupt line could not be bound to the handler.
    #[error("IRQ {irq} request failed: {reason}")]
    IrqRequest {
        /// Interrupt number that was requested.
        irq: u32,
        /// Reason reported by the dispatcher.
        reason: String,
    },

    /// The watchdog framework refused the device.
    #[error("Watchdog registration failed: {0}")]
    Registration(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

impl Sp805Error {
    /// Create a register mapping error.
    #[must_use]
    pub fn register_map(msg: impl Into<String>) -> Self {
        Self::RegisterMap(msg.into())
    }

    /// Create a clock lookup error.
    #[must_use]
    pub fn clock_lookup(msg: impl Into<String>) -> Self {
        Self::ClockLookup(msg.into())
    }

    /// Create a clock enable error.
    #[must_use]
    pub fn clock_enable(msg: impl Into<String>) -> Self {
        Self::ClockEnable(msg.into())
    }

    /// Create an interrupt request error.
    #[must_use]
    pub fn irq_request(irq: u32, reason: impl Into<String>) -> Self {
        Self::IrqRequest {
            irq,
            reason: reason.into(),
        }
    }

    /// Create a registration error.
    #[must_use]
    pub fn registration(msg: impl Into<String>) -> Self {
        Self::Registration(msg.into())
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Whether this error can only happen while attaching the device.
    #[must_use]
    pub fn is_attach_failure(&self) -> bool {
        matches!(
            self,
            Self::RegisterMap(_)
                | Self::ClockLookup(_)
                | Self::IrqUnavailable
                | Self::IrqRequest { .. }
                | Self::Registration(_)
        )
    }
}

/// A specialized `Result` type for SP805 watchdog operations.
pub type Sp805Result<T> = std::result::Result<T, Sp805Error>;
