//! SP805 arm/disarm state machine and first-stage interrupt handler.
//!
//! # Locking
//!
//! Two locks with different jobs:
//!
//! - a spinlock around the register block, the staged reload value and the
//!   warning latch. The interrupt handler takes it, so critical sections are
//!   a handful of register accesses and nothing under it sleeps or allocates.
//! - a sleeping mutex around the arm state, held across clock
//!   enable/disable. Only `start` and `stop` take it.
//!
//! The clock is always enabled before the spinlock is taken, so a clock
//! failure leaves the hardware untouched.
//!
//! # Counting
//!
//! ```text
//! Stopped ──start()──► Armed ─┬─ first pass ends ─► interrupt raised
//!    ▲                   │    │                          │
//!    └─────stop()────────┘    └◄──── ping()/start() ─────┤
//!                                                        ▼
//!                                        second pass ends: reset
//! ```

use parking_lot::Mutex;

use crate::clock::Clock;
use crate::error::Sp805Result;
use crate::framework::{InterruptHandler, IrqReturn};
use crate::regs::{INT_ENABLE, LOAD_MAX, RESET_ENABLE, RegisterIo, Sp805Registers};
use crate::state::{ArmState, EventCallback, WatchdogEvent};
use crate::timeout::{compute_reload, compute_time_left};
use crate::watchdog::WatchdogOps;

/// State guarded by the register spinlock.
#[derive(Debug)]
struct Shared<R> {
    regs: Sp805Registers<R>,
    reload: u32,
    timeout_secs: u32,
    warning_raised: bool,
}

/// One SP805 watchdog instance.
///
/// Created with the counter stopped and no timeout staged; call
/// [`set_timeout`](Self::set_timeout) before the first
/// [`start`](Self::start).
pub struct Sp805Watchdog<R, C> {
    shared: spin::Mutex<Shared<R>>,
    arm_state: Mutex<ArmState>,
    clock: C,
    on_event: Option<EventCallback>,
}

impl<R: RegisterIo, C: Clock> Sp805Watchdog<R, C> {
    /// Take ownership of a mapped register block and its clock.
    #[must_use]
    pub fn new(io: R, clock: C) -> Self {
        Self {
            shared: spin::Mutex::new(Shared {
                regs: Sp805Registers::new(io),
                reload: LOAD_MAX,
                timeout_secs: 0,
                warning_raised: false,
            }),
            arm_state: Mutex::new(ArmState::Stopped),
            clock,
            on_event: None,
        }
    }

    /// Deliver early-warning events to `callback` as well as the log.
    #[must_use]
    pub fn with_event_callback(
        mut self,
        callback: impl Fn(WatchdogEvent) + Send + Sync + 'static,
    ) -> Self {
        self.set_event_callback(Box::new(callback));
        self
    }

    pub(crate) fn set_event_callback(&mut self, callback: EventCallback) {
        self.on_event = Some(callback);
    }

    /// Enable the clock and start counting from the staged reload value.
    ///
    /// Clears a latched warning. Starting an armed watchdog restarts the
    /// countdown without touching the clock again.
    ///
    /// # Errors
    ///
    /// Returns the clock's error if it cannot be enabled; the hardware is not
    /// touched and the watchdog stays stopped.
    pub fn start(&self) -> Sp805Result<()> {
        let averted = {
            let mut arm_state = self.arm_state.lock();
            if !arm_state.is_armed() {
                self.clock
                    .enable()
                    .inspect_err(|err| tracing::error!(error = %err, "clock enable fail"))?;
            }

            let averted = self.program(true);
            *arm_state = ArmState::Armed;
            averted
        };

        tracing::debug!(reload = self.reload_value(), "watchdog armed");
        if averted {
            self.notify(WatchdogEvent::ResetAverted);
        }
        Ok(())
    }

    /// Disable interrupt and reset, then release the clock.
    ///
    /// Stopping a stopped watchdog does nothing.
    pub fn stop(&self) {
        let mut arm_state = self.arm_state.lock();
        if !arm_state.is_armed() {
            return;
        }

        {
            let mut shared = self.shared.lock();
            let mut regs = shared.regs.unlock();
            regs.set_control(0);
        }
        self.clock.disable();
        *arm_state = ArmState::Stopped;
        tracing::debug!("watchdog stopped");
    }

    /// Restart the first countdown pass from the staged reload value.
    ///
    /// Leaves the clock and the enable bits alone. Clears a latched warning.
    pub fn ping(&self) {
        if self.program(false) {
            self.notify(WatchdogEvent::ResetAverted);
        }
    }

    /// Stage a new timeout and return the effective one.
    ///
    /// The hardware is not reprogrammed until the next `start` or `ping`.
    ///
    /// # Errors
    ///
    /// Returns [`Sp805Error::InvalidClockRate`](crate::Sp805Error::InvalidClockRate)
    /// if the clock reports a zero rate; the staged value is left unchanged.
    pub fn set_timeout(&self, timeout_secs: u32) -> Sp805Result<u32> {
        let rate_hz = self.clock.rate_hz();
        let setting = compute_reload(timeout_secs, rate_hz)?;
        {
            let mut shared = self.shared.lock();
            shared.reload = setting.reload;
            shared.timeout_secs = setting.effective_secs;
        }
        tracing::debug!(
            requested = timeout_secs,
            effective = setting.effective_secs,
            reload = setting.reload,
            rate_hz,
            "timeout staged"
        );
        Ok(setting.effective_secs)
    }

    /// Seconds until the watchdog resets the system if not pinged.
    #[must_use]
    pub fn time_left(&self) -> u32 {
        let rate_hz = self.clock.rate_hz();
        let (value, reload, raised) = {
            let shared = self.shared.lock();
            (
                shared.regs.value(),
                shared.reload,
                shared.regs.raw_interrupt(),
            )
        };
        compute_time_left(value, reload, raised, rate_hz)
    }

    /// Service the first-stage interrupt.
    ///
    /// Latches the warning on the first observation of the raised status bit
    /// and reports it once; a cleared status bit clears the latch.
    pub fn handle_interrupt(&self) -> IrqReturn {
        let event = {
            let mut shared = self.shared.lock();
            let raised = shared.regs.raw_interrupt();
            if raised && !shared.warning_raised {
                shared.warning_raised = true;
                Some(WatchdogEvent::AboutToReset)
            } else if raised {
                None
            } else {
                shared.warning_raised = false;
                Some(WatchdogEvent::ResetAverted)
            }
        };

        if let Some(event) = event {
            self.notify(event);
        }
        IrqReturn::Handled
    }

    /// Effective timeout in seconds.
    #[must_use]
    pub fn timeout(&self) -> u32 {
        self.shared.lock().timeout_secs
    }

    /// Staged reload value.
    #[must_use]
    pub fn reload_value(&self) -> u32 {
        self.shared.lock().reload
    }

    /// Whether the first-stage interrupt has been observed and not yet
    /// acknowledged.
    #[must_use]
    pub fn warning_raised(&self) -> bool {
        self.shared.lock().warning_raised
    }

    /// Current arm state.
    #[must_use]
    pub fn state(&self) -> ArmState {
        *self.arm_state.lock()
    }

    /// Unlock, reload, clear the interrupt and, when arming, enable interrupt
    /// and reset. Clears the warning latch and returns whether it was set.
    ///
    /// Callers notify after releasing their own locks.
    fn program(&self, arm: bool) -> bool {
        let mut shared = self.shared.lock();
        let reload = shared.reload;
        {
            let mut regs = shared.regs.unlock();
            regs.set_load(reload);
            regs.clear_interrupt();
            if arm {
                regs.set_control(INT_ENABLE | RESET_ENABLE);
            }
        }
        core::mem::take(&mut shared.warning_raised)
    }

    fn notify(&self, event: WatchdogEvent) {
        match event {
            WatchdogEvent::AboutToReset => tracing::error!("{event}"),
            WatchdogEvent::ResetAverted => tracing::warn!("{event}"),
        }
        if let Some(callback) = &self.on_event {
            callback(event);
        }
    }
}

impl<R: RegisterIo, C: Clock> WatchdogOps for Sp805Watchdog<R, C> {
    fn start(&self) -> Sp805Result<()> {
        Sp805Watchdog::start(self)
    }

    fn stop(&self) -> Sp805Result<()> {
        Sp805Watchdog::stop(self);
        Ok(())
    }

    fn ping(&self) -> Sp805Result<()> {
        Sp805Watchdog::ping(self);
        Ok(())
    }

    fn set_timeout(&self, timeout_secs: u32) -> Sp805Result<u32> {
        Sp805Watchdog::set_timeout(self, timeout_secs)
    }

    fn time_left(&self) -> u32 {
        Sp805Watchdog::time_left(self)
    }
}

impl<R: RegisterIo, C: Clock> InterruptHandler for Sp805Watchdog<R, C> {
    fn handle_irq(&self, _irq: u32) -> IrqReturn {
        self.handle_interrupt()
    }
}

impl<R, C> core::fmt::Debug for Sp805Watchdog<R, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Sp805Watchdog")
            .field("arm_state", &*self.arm_state.lock())
            .field("has_event_callback", &self.on_event.is_some())
            .finish_non_exhaustive()
    }
}
