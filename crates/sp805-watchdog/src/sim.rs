//! Hardware-free SP805 and clock models.
//!
//! [`SimulatedSp805`] models the register file closely enough to exercise
//! the driver end to end: the write gate drops writes while locked, the
//! counter reloads on a load write or interrupt clear, and
//! [`advance`](SimulatedSp805::advance) runs the two-pass countdown, raising
//! the interrupt after the first pass and asserting reset after the second.
//!
//! Both models are cheap handles over shared state, so a test can keep one
//! clone while the driver owns another.

use std::sync::Arc;

use parking_lot::Mutex;
use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use crate::clock::Clock;
use crate::error::{Sp805Error, Sp805Result};
use crate::regs::{
    INT_ENABLE, INT_MASK, RESET_ENABLE, RegisterIo, UNLOCK_KEY, WDTCONTROL, WDTINTCLR, WDTLOAD,
    WDTLOCK, WDTMIS, WDTRIS, WDTVALUE,
};

/// Register file of the modelled device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Sp805Model {
    load: u32,
    value: u32,
    control: u32,
    raw_interrupt: bool,
    locked: bool,
    reset_asserted: bool,
    writes: u32,
    dropped_writes: u32,
}

impl Sp805Model {
    const fn reset_state() -> Self {
        // Out of reset the SP805 is locked with a full-scale load.
        Self {
            load: u32::MAX,
            value: u32::MAX,
            control: 0,
            raw_interrupt: false,
            locked: true,
            reset_asserted: false,
            writes: 0,
            dropped_writes: 0,
        }
    }

    fn counting(&self) -> bool {
        self.control & INT_ENABLE != 0 && !self.reset_asserted
    }

    fn read(&self, offset: usize) -> u32 {
        match offset {
            WDTLOAD => self.load,
            WDTVALUE => self.value,
            WDTCONTROL => self.control,
            WDTRIS => u32::from(self.raw_interrupt),
            WDTMIS => u32::from(self.raw_interrupt && self.control & INT_ENABLE != 0),
            WDTLOCK => u32::from(self.locked),
            _ => 0,
        }
    }

    fn write(&mut self, offset: usize, value: u32) {
        self.writes = self.writes.saturating_add(1);
        if offset == WDTLOCK {
            self.locked = value != UNLOCK_KEY;
            return;
        }
        if self.locked {
            self.dropped_writes = self.dropped_writes.saturating_add(1);
            return;
        }

        match offset {
            WDTLOAD => {
                self.load = value;
                self.value = value;
            }
            WDTCONTROL => {
                let was_enabled = self.control & INT_ENABLE != 0;
                self.control = value & (INT_ENABLE | RESET_ENABLE);
                if !was_enabled && self.control & INT_ENABLE != 0 {
                    self.value = self.load;
                }
            }
            WDTINTCLR => {
                self.raw_interrupt = false;
                self.value = self.load;
            }
            _ => {}
        }
    }

    fn advance(&mut self, ticks: u64) {
        let mut remaining = ticks;
        while remaining > 0 && self.counting() {
            // A pass of `value` lasts `value + 1` ticks; the counter expires
            // on the tick after it reads zero.
            let to_expiry = u64::from(self.value) + 1;
            if remaining < to_expiry {
                // `remaining` is below a u32-sized count here.
                self.value = self
                    .value
                    .saturating_sub(u32::try_from(remaining).unwrap_or(u32::MAX));
                return;
            }
            remaining -= to_expiry;
            self.expire();

            if self.raw_interrupt && self.control & RESET_ENABLE == 0 {
                // Nothing left to change but the count: skip whole passes.
                remaining %= u64::from(self.load) + 1;
            }
        }
    }

    fn expire(&mut self) {
        if self.raw_interrupt && self.control & RESET_ENABLE != 0 {
            self.reset_asserted = true;
            tracing::debug!("simulated SP805 asserted reset");
            return;
        }
        self.raw_interrupt = true;
        self.value = self.load;
    }
}

/// Simulated SP805 register block.
#[derive(Debug, Clone)]
pub struct SimulatedSp805 {
    model: Arc<Mutex<Sp805Model>>,
}

impl SimulatedSp805 {
    /// A device in its power-on state: locked, stopped, full-scale load.
    #[must_use]
    pub fn new() -> Self {
        Self {
            model: Arc::new(Mutex::new(Sp805Model::reset_state())),
        }
    }

    /// Run the counter for `ticks` clock ticks.
    pub fn advance(&self, ticks: u64) {
        self.model.lock().advance(ticks);
    }

    /// Programmed reload value.
    #[must_use]
    pub fn load(&self) -> u32 {
        self.model.lock().load
    }

    /// Current counter value.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.model.lock().value
    }

    /// Control register contents.
    #[must_use]
    pub fn control(&self) -> u32 {
        self.model.lock().control
    }

    /// Raw interrupt status.
    #[must_use]
    pub fn raw_interrupt(&self) -> bool {
        self.model.lock().raw_interrupt
    }

    /// Whether the write gate is closed.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.model.lock().locked
    }

    /// Whether the second pass expired with reset enabled.
    #[must_use]
    pub fn reset_asserted(&self) -> bool {
        self.model.lock().reset_asserted
    }

    /// Whether the counter is running.
    #[must_use]
    pub fn is_counting(&self) -> bool {
        self.model.lock().counting()
    }

    /// Total register writes, including dropped ones.
    #[must_use]
    pub fn write_count(&self) -> u32 {
        self.model.lock().writes
    }

    /// Writes dropped because the gate was closed.
    #[must_use]
    pub fn dropped_writes(&self) -> u32 {
        self.model.lock().dropped_writes
    }

    /// Clear the raw interrupt without going through the write gate, as
    /// another agent on the bus might.
    pub fn clear_interrupt_out_of_band(&self) {
        let mut model = self.model.lock();
        model.raw_interrupt = false;
        model.value = model.load;
    }
}

impl Default for SimulatedSp805 {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterIo for SimulatedSp805 {
    fn read32(&self, offset: usize) -> u32 {
        self.model.lock().read(offset)
    }

    fn write32(&mut self, offset: usize, value: u32) {
        self.model.lock().write(offset, value);
    }
}

#[derive(Debug)]
struct ClockState {
    rate_hz: AtomicU32,
    enabled: AtomicBool,
    fail_next_enable: AtomicBool,
    enable_count: AtomicU32,
    disable_count: AtomicU32,
}

/// Simulated fixed-rate clock with failure injection.
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    state: Arc<ClockState>,
}

impl SimulatedClock {
    /// A disabled clock running at `rate_hz`.
    #[must_use]
    pub fn new(rate_hz: u32) -> Self {
        Self {
            state: Arc::new(ClockState {
                rate_hz: AtomicU32::new(rate_hz),
                enabled: AtomicBool::new(false),
                fail_next_enable: AtomicBool::new(false),
                enable_count: AtomicU32::new(0),
                disable_count: AtomicU32::new(0),
            }),
        }
    }

    /// Change the reported rate.
    pub fn set_rate_hz(&self, rate_hz: u32) {
        self.state.rate_hz.store(rate_hz, Ordering::Release);
    }

    /// Make the next `enable` call fail.
    pub fn fail_next_enable(&self) {
        self.state.fail_next_enable.store(true, Ordering::Release);
    }

    /// Whether the clock is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state.enabled.load(Ordering::Acquire)
    }

    /// Successful `enable` calls so far.
    #[must_use]
    pub fn enable_count(&self) -> u32 {
        self.state.enable_count.load(Ordering::Acquire)
    }

    /// `disable` calls so far.
    #[must_use]
    pub fn disable_count(&self) -> u32 {
        self.state.disable_count.load(Ordering::Acquire)
    }
}

impl Clock for SimulatedClock {
    fn rate_hz(&self) -> u64 {
        u64::from(self.state.rate_hz.load(Ordering::Acquire))
    }

    fn enable(&self) -> Sp805Result<()> {
        if self.state.fail_next_enable.swap(false, Ordering::AcqRel) {
            return Err(Sp805Error::clock_enable("simulated enable failure"));
        }
        self.state.enabled.store(true, Ordering::Release);
        self.state.enable_count.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn disable(&self) {
        self.state.enabled.store(false, Ordering::Release);
        self.state.disable_count.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regs::LOCK_KEY;

    #[test]
    fn test_locked_writes_are_dropped() {
        let mut hw = SimulatedSp805::new();
        hw.write32(WDTLOAD, 10);
        assert_eq!(hw.load(), u32::MAX);
        assert_eq!(hw.dropped_writes(), 1);

        hw.write32(WDTLOCK, UNLOCK_KEY);
        hw.write32(WDTLOAD, 10);
        hw.write32(WDTLOCK, LOCK_KEY);
        assert_eq!(hw.load(), 10);
        assert!(hw.is_locked());
        assert_eq!(hw.read32(WDTLOCK), 1);
    }

    #[test]
    fn test_two_pass_countdown() {
        let mut hw = SimulatedSp805::new();
        hw.write32(WDTLOCK, UNLOCK_KEY);
        hw.write32(WDTLOAD, 9);
        hw.write32(WDTCONTROL, INT_ENABLE | RESET_ENABLE);
        hw.write32(WDTLOCK, LOCK_KEY);

        hw.advance(9);
        assert_eq!(hw.value(), 0);
        assert!(!hw.raw_interrupt());

        hw.advance(1);
        assert!(hw.raw_interrupt());
        assert_eq!(hw.read32(WDTMIS), 1);
        assert_eq!(hw.value(), 9);
        assert!(!hw.reset_asserted());

        hw.advance(10);
        assert!(hw.reset_asserted());
        assert!(!hw.is_counting());
    }

    #[test]
    fn test_interrupt_without_reset_keeps_counting() {
        let mut hw = SimulatedSp805::new();
        hw.write32(WDTLOCK, UNLOCK_KEY);
        hw.write32(WDTLOAD, 9);
        hw.write32(WDTCONTROL, INT_ENABLE);

        hw.advance(1_000_003);
        assert!(hw.raw_interrupt());
        assert!(!hw.reset_asserted());
        assert!(hw.is_counting());
    }

    #[test]
    fn test_clock_failure_injection() {
        let clock = SimulatedClock::new(1000);
        clock.fail_next_enable();
        assert!(clock.enable().is_err());
        assert!(!clock.is_enabled());
        assert!(clock.enable().is_ok());
        assert!(clock.is_enabled());
        assert_eq!(clock.enable_count(), 1);
    }
}
