//! Collaborators the driver registers with: the watchdog framework and the
//! interrupt dispatcher.

use std::sync::Arc;

use crate::error::Sp805Result;
use crate::watchdog::{WatchdogInfo, WatchdogOps};

/// Identifier the framework hands out for a registered watchdog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchdogHandle(pub u32);

impl core::fmt::Display for WatchdogHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "watchdog{}", self.0)
    }
}

/// The generic watchdog framework.
///
/// Owns the control surface (open/close/keepalive requests) and with it the
/// active flag: whether userspace currently expects the watchdog to count.
pub trait WatchdogFramework: Send + Sync {
    /// Register a watchdog device.
    ///
    /// # Errors
    ///
    /// Returns [`Sp805Error::Registration`](crate::Sp805Error::Registration)
    /// if the framework refuses the device.
    fn register(
        &self,
        info: &'static WatchdogInfo,
        ops: Arc<dyn WatchdogOps>,
        nowayout: bool,
    ) -> Sp805Result<WatchdogHandle>;

    /// Remove a registered watchdog.
    fn unregister(&self, handle: WatchdogHandle);

    /// Whether the watchdog is expected to be counting.
    fn is_active(&self, handle: WatchdogHandle) -> bool;
}

/// Outcome of an interrupt handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqReturn {
    /// The interrupt was not raised by this device.
    None,
    /// The interrupt was serviced.
    Handled,
}

/// Per-device interrupt handler.
///
/// Called in interrupt context: must not block or allocate.
pub trait InterruptHandler: Send + Sync {
    /// Service interrupt `irq`.
    fn handle_irq(&self, irq: u32) -> IrqReturn;
}

/// Platform interrupt dispatch.
pub trait IrqDispatcher: Send + Sync {
    /// Bind `handler` to interrupt line `irq`.
    ///
    /// # Errors
    ///
    /// Returns [`Sp805Error::IrqRequest`](crate::Sp805Error::IrqRequest) if
    /// the line cannot be bound.
    fn request_irq(
        &self,
        irq: u32,
        name: &str,
        handler: Arc<dyn InterruptHandler>,
    ) -> Sp805Result<()>;

    /// Unbind whatever handler is bound to `irq`.
    fn free_irq(&self, irq: u32);
}
