//! Configuration for SP805 watchdog attachment.

use serde::{Deserialize, Serialize};

use crate::error::{Sp805Error, Sp805Result};

/// Default watchdog timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u32 = 60;

/// Default name the interrupt line is requested under.
pub const DEFAULT_IRQ_NAME: &str = "sp805_wis";

/// SP805 driver configuration.
///
/// Passed to [`Sp805Device::attach`](crate::lifecycle::Sp805Device::attach)
/// once per device; nothing here is process-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sp805Config {
    /// Timeout staged at attach, in seconds.
    ///
    /// Default: 60s.
    pub default_timeout_secs: u32,

    /// Keep the watchdog running after the control surface is released.
    ///
    /// Handed to the watchdog framework at registration.
    pub nowayout: bool,

    /// Name the interrupt line is requested under.
    pub irq_name: String,
}

impl Sp805Config {
    /// Create a new configuration with the specified default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if `timeout_secs` is zero.
    pub fn new(timeout_secs: u32) -> Sp805Result<Self> {
        let config = Self {
            default_timeout_secs: timeout_secs,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> Sp805ConfigBuilder {
        Sp805ConfigBuilder::default()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Sp805Result<()> {
        if self.default_timeout_secs == 0 {
            return Err(Sp805Error::invalid_configuration(
                "default_timeout_secs must be greater than 0",
            ));
        }
        if self.irq_name.trim().is_empty() {
            return Err(Sp805Error::invalid_configuration(
                "irq_name must not be empty",
            ));
        }
        Ok(())
    }
}

impl Default for Sp805Config {
    fn default() -> Self {
        Self {
            default_timeout_secs: DEFAULT_TIMEOUT_SECS,
            nowayout: false,
            irq_name: DEFAULT_IRQ_NAME.to_string(),
        }
    }
}

/// Builder for `Sp805Config`.
#[derive(Debug, Default)]
pub struct Sp805ConfigBuilder {
    config: Sp805Config,
}

impl Sp805ConfigBuilder {
    /// Set the default timeout in seconds.
    #[must_use]
    pub fn default_timeout_secs(mut self, secs: u32) -> Self {
        self.config.default_timeout_secs = secs;
        self
    }

    /// Set the no-way-out flag.
    #[must_use]
    pub fn nowayout(mut self, nowayout: bool) -> Self {
        self.config.nowayout = nowayout;
        self
    }

    /// Set the interrupt line name.
    #[must_use]
    pub fn irq_name(mut self, name: impl Into<String>) -> Self {
        self.config.irq_name = name.into();
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Sp805Result<Sp805Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
