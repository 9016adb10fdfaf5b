//! Attach/detach and suspend/resume of an SP805 device.
//!
//! Attach order: map registers, resolve the clock, build the watchdog and
//! stage the default timeout, register with the framework, bind the
//! interrupt. Each step that fails releases what the earlier steps acquired,
//! stopping the countdown if the framework started it in the meantime.
//! Detach runs in reverse when the [`Sp805Device`] is dropped.

use std::sync::Arc;

use crate::clock::Clock;
use crate::config::Sp805Config;
use crate::device::Sp805Watchdog;
use crate::error::{Sp805Error, Sp805Result};
use crate::framework::{InterruptHandler, IrqDispatcher, WatchdogFramework, WatchdogHandle};
use crate::regs::RegisterIo;
use crate::state::{EventCallback, WatchdogEvent};
use crate::watchdog::{SP805_INFO, WatchdogOps};

/// What the bus layer knows about one SP805 instance.
pub trait ResourceProvider {
    /// Mapped register window type.
    type Io: RegisterIo + 'static;
    /// Clock type.
    type Clock: Clock + 'static;

    /// Device name used in log output.
    fn name(&self) -> &str;

    /// Map the register window.
    ///
    /// # Errors
    ///
    /// Returns [`Sp805Error::RegisterMap`] if the window cannot be mapped.
    fn map_registers(&self) -> Sp805Result<Self::Io>;

    /// Look up the counter clock.
    ///
    /// # Errors
    ///
    /// Returns [`Sp805Error::ClockLookup`] if no clock is described.
    fn clock(&self) -> Sp805Result<Self::Clock>;

    /// First interrupt line of the device, if described.
    fn irq(&self) -> Option<u32>;
}

/// An attached SP805: registered with the framework, interrupt bound.
///
/// Dropping it detaches the device.
pub struct Sp805Device<R: RegisterIo + 'static, C: Clock + 'static> {
    watchdog: Arc<Sp805Watchdog<R, C>>,
    framework: Arc<dyn WatchdogFramework>,
    irqs: Arc<dyn IrqDispatcher>,
    handle: WatchdogHandle,
    irq: u32,
    name: String,
}

impl<R: RegisterIo + 'static, C: Clock + 'static> Sp805Device<R, C> {
    /// Attach the device described by `provider`.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error. Nothing stays registered or
    /// bound on failure.
    pub fn attach<P>(
        provider: &P,
        framework: Arc<dyn WatchdogFramework>,
        irqs: Arc<dyn IrqDispatcher>,
        config: &Sp805Config,
    ) -> Sp805Result<Self>
    where
        P: ResourceProvider<Io = R, Clock = C>,
    {
        Self::attach_inner(provider, framework, irqs, config, None)
    }

    /// Attach the device and deliver its early-warning events to `callback`.
    ///
    /// # Errors
    ///
    /// As for [`attach`](Self::attach).
    pub fn attach_with_event_callback<P>(
        provider: &P,
        framework: Arc<dyn WatchdogFramework>,
        irqs: Arc<dyn IrqDispatcher>,
        config: &Sp805Config,
        callback: impl Fn(WatchdogEvent) + Send + Sync + 'static,
    ) -> Sp805Result<Self>
    where
        P: ResourceProvider<Io = R, Clock = C>,
    {
        Self::attach_inner(provider, framework, irqs, config, Some(Box::new(callback)))
    }

    fn attach_inner<P>(
        provider: &P,
        framework: Arc<dyn WatchdogFramework>,
        irqs: Arc<dyn IrqDispatcher>,
        config: &Sp805Config,
        callback: Option<EventCallback>,
    ) -> Sp805Result<Self>
    where
        P: ResourceProvider<Io = R, Clock = C>,
    {
        let name = provider.name().to_string();
        let result = Self::acquire(provider, framework, irqs, config, callback, &name);
        if let Err(err) = &result {
            tracing::error!(device = %name, error = %err, "probe failed");
        }
        result
    }

    fn acquire<P>(
        provider: &P,
        framework: Arc<dyn WatchdogFramework>,
        irqs: Arc<dyn IrqDispatcher>,
        config: &Sp805Config,
        callback: Option<EventCallback>,
        name: &str,
    ) -> Sp805Result<Self>
    where
        P: ResourceProvider<Io = R, Clock = C>,
    {
        config.validate()?;

        let io = provider.map_registers()?;
        let clock = provider
            .clock()
            .inspect_err(|_| tracing::warn!(device = %name, "clock not found"))?;

        let mut watchdog = Sp805Watchdog::new(io, clock);
        if let Some(callback) = callback {
            watchdog.set_event_callback(callback);
        }
        watchdog.set_timeout(config.default_timeout_secs)?;
        let watchdog = Arc::new(watchdog);

        let ops: Arc<dyn WatchdogOps> = Arc::clone(&watchdog) as Arc<dyn WatchdogOps>;
        let handle = framework
            .register(&SP805_INFO, ops, config.nowayout)
            .inspect_err(|err| {
                tracing::error!(device = %name, error = %err, "watchdog registration failed");
            })?;

        // Once registered the framework may start the device at any time, so
        // every later failure stops it before unregistering.
        let Some(irq) = provider.irq() else {
            tracing::error!(device = %name, "failed to get IRQ");
            watchdog.stop();
            framework.unregister(handle);
            return Err(Sp805Error::IrqUnavailable);
        };

        let handler: Arc<dyn InterruptHandler> = Arc::clone(&watchdog) as Arc<dyn InterruptHandler>;
        if let Err(err) = irqs.request_irq(irq, &config.irq_name, handler) {
            tracing::error!(device = %name, irq, "IRQ request fail");
            watchdog.stop();
            framework.unregister(handle);
            return Err(err);
        }

        tracing::info!(
            device = %name,
            %handle,
            irq,
            timeout_secs = watchdog.timeout(),
            "registration successful"
        );

        Ok(Self {
            watchdog,
            framework,
            irqs,
            handle,
            irq,
            name: name.to_string(),
        })
    }

    /// Detach the device.
    ///
    /// Equivalent to dropping it.
    pub fn detach(self) {
        drop(self);
    }

    /// Stop the countdown for system suspend, if the framework has it active.
    pub fn suspend(&self) {
        if self.framework.is_active(self.handle) {
            self.watchdog.stop();
        }
    }

    /// Restart the countdown after system resume, if the framework has it
    /// active.
    ///
    /// # Errors
    ///
    /// Returns the error from [`Sp805Watchdog::start`]; there is no retry.
    pub fn resume(&self) -> Sp805Result<()> {
        if self.framework.is_active(self.handle) {
            self.watchdog.start()?;
        }
        Ok(())
    }

    /// The watchdog core.
    #[must_use]
    pub fn watchdog(&self) -> &Arc<Sp805Watchdog<R, C>> {
        &self.watchdog
    }

    /// Framework handle.
    #[must_use]
    pub fn handle(&self) -> WatchdogHandle {
        self.handle
    }

    /// Bound interrupt line.
    #[must_use]
    pub fn irq(&self) -> u32 {
        self.irq
    }
}

impl<R: RegisterIo + 'static, C: Clock + 'static> Drop for Sp805Device<R, C> {
    fn drop(&mut self) {
        // Keyed on the driver's own arm state; a no-op when already stopped.
        self.watchdog.stop();
        self.framework.unregister(self.handle);
        self.irqs.free_irq(self.irq);
        tracing::info!(device = %self.name, handle = %self.handle, "detached");
    }
}

impl<R: RegisterIo + 'static, C: Clock + 'static> core::fmt::Debug for Sp805Device<R, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sp805Device")
            .field("name", &self.name)
            .field("handle", &self.handle)
            .field("irq", &self.irq)
            .field("watchdog", &self.watchdog)
            .finish_non_exhaustive()
    }
}
