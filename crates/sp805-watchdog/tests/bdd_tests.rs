//! BDD tests for SP805 watchdog scenarios.
//!
//! Feature: sp805_watchdog.feature

#![cfg(test)]

mod common;

use std::sync::Arc;

use common::{FakeBus, FakeFramework, FakeIrqs, TestResult, WDT_IRQ, attach};
use parking_lot::Mutex;
use sp805_watchdog::prelude::*;
use sp805_watchdog::regs::{INT_ENABLE, LOAD_MIN, RESET_ENABLE};

mod countdown_scenarios {
    use super::*;

    /// Scenario: Sixty second timeout on a 1 kHz clock
    #[test]
    fn scenario_sixty_seconds_at_one_kilohertz() -> TestResult {
        let hw = SimulatedSp805::new();
        let wdt = Sp805Watchdog::new(hw.clone(), SimulatedClock::new(1000));

        assert_eq!(wdt.set_timeout(60)?, 60);
        wdt.start()?;
        assert_eq!(hw.load(), 29_999);

        hw.advance(10_000);
        assert_eq!(wdt.time_left(), 49);

        wdt.ping();
        assert_eq!(wdt.time_left(), 59);
        Ok(())
    }

    /// Scenario: A zero timeout is clamped to the shortest countdown
    #[test]
    fn scenario_zero_timeout_is_clamped() -> TestResult {
        let hw = SimulatedSp805::new();
        let wdt = Sp805Watchdog::new(hw.clone(), SimulatedClock::new(1000));

        let effective = wdt.set_timeout(0)?;
        assert!(effective >= 1);
        wdt.start()?;
        assert_eq!(hw.load(), LOAD_MIN);
        Ok(())
    }

    /// Scenario: An unserviced watchdog warns and then resets
    #[test]
    fn scenario_unserviced_watchdog_resets() -> TestResult {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let hw = SimulatedSp805::new();
        let wdt = Sp805Watchdog::new(hw.clone(), SimulatedClock::new(1000))
            .with_event_callback(move |event| sink.lock().push(event));
        wdt.set_timeout(60)?;
        wdt.start()?;

        hw.advance(30_000);
        assert!(hw.raw_interrupt());
        wdt.handle_interrupt();
        assert_eq!(*events.lock(), vec![WatchdogEvent::AboutToReset]);
        assert_eq!(wdt.time_left(), 29);

        hw.advance(30_000);
        assert!(hw.reset_asserted());
        Ok(())
    }

    /// Scenario: A ping during the second pass averts the reset
    #[test]
    fn scenario_ping_in_second_pass_averts_reset() -> TestResult {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let hw = SimulatedSp805::new();
        let wdt = Sp805Watchdog::new(hw.clone(), SimulatedClock::new(1000))
            .with_event_callback(move |event| sink.lock().push(event));
        wdt.set_timeout(60)?;
        wdt.start()?;

        hw.advance(30_000);
        wdt.handle_interrupt();
        hw.advance(29_000);
        wdt.ping();
        hw.advance(29_000);

        assert!(!hw.reset_asserted());
        assert!(!hw.raw_interrupt());
        assert_eq!(
            *events.lock(),
            vec![WatchdogEvent::AboutToReset, WatchdogEvent::ResetAverted]
        );
        Ok(())
    }

    /// Scenario: Stopping a stopped watchdog does nothing
    #[test]
    fn scenario_stop_while_stopped() -> TestResult {
        let hw = SimulatedSp805::new();
        let clock = SimulatedClock::new(1000);
        let wdt = Sp805Watchdog::new(hw.clone(), clock.clone());
        wdt.set_timeout(60)?;

        wdt.stop();
        assert_eq!(wdt.state(), ArmState::Stopped);
        assert_eq!(hw.write_count(), 0);
        assert_eq!(clock.disable_count(), 0);
        Ok(())
    }

    /// Scenario: A new timeout takes effect on the next ping
    #[test]
    fn scenario_timeout_change_applies_on_ping() -> TestResult {
        let hw = SimulatedSp805::new();
        let wdt = Sp805Watchdog::new(hw.clone(), SimulatedClock::new(1000));
        wdt.set_timeout(60)?;
        wdt.start()?;

        wdt.set_timeout(20)?;
        assert_eq!(hw.load(), 29_999);
        wdt.ping();
        assert_eq!(hw.load(), 9_999);
        assert_eq!(wdt.time_left(), 19);
        Ok(())
    }
}

mod power_management_scenarios {
    use super::*;

    /// Scenario: Suspend stops an active watchdog and resume restarts it
    #[test]
    fn scenario_suspend_resume_restores_countdown() -> TestResult {
        let bus = FakeBus::new();
        let framework = FakeFramework::new();
        let irqs = FakeIrqs::new();
        let device = attach(&bus, &framework, &irqs)?;
        framework.open(device.handle())?;

        bus.hw.advance(10_000);
        device.suspend();
        assert_eq!(bus.hw.control(), 0);
        assert!(!bus.clock.is_enabled());

        device.resume()?;
        assert_eq!(bus.hw.control(), INT_ENABLE | RESET_ENABLE);
        assert_eq!(bus.hw.value(), device.watchdog().reload_value());
        assert!(bus.clock.is_enabled());
        Ok(())
    }

    /// Scenario: Suspend and resume leave an inactive watchdog alone
    #[test]
    fn scenario_suspend_resume_inactive_watchdog() -> TestResult {
        let bus = FakeBus::new();
        let framework = FakeFramework::new();
        let irqs = FakeIrqs::new();
        let device = attach(&bus, &framework, &irqs)?;

        device.suspend();
        device.resume()?;
        assert_eq!(device.watchdog().state(), ArmState::Stopped);
        assert_eq!(bus.clock.enable_count(), 0);
        Ok(())
    }

    /// Scenario: Resume reports a clock failure
    #[test]
    fn scenario_resume_clock_failure() -> TestResult {
        let bus = FakeBus::new();
        let framework = FakeFramework::new();
        let irqs = FakeIrqs::new();
        let device = attach(&bus, &framework, &irqs)?;
        framework.open(device.handle())?;

        device.suspend();
        bus.clock.fail_next_enable();
        let result = device.resume();
        assert!(matches!(result, Err(Sp805Error::ClockEnable(_))));
        assert_eq!(device.watchdog().state(), ArmState::Stopped);
        Ok(())
    }
}

mod interrupt_scenarios {
    use super::*;

    /// Scenario: The bound interrupt reaches the watchdog
    #[test]
    fn scenario_interrupt_delivered_through_dispatcher() -> TestResult {
        let bus = FakeBus::new();
        let framework = FakeFramework::new();
        let irqs = FakeIrqs::new();
        let device = attach(&bus, &framework, &irqs)?;
        framework.open(device.handle())?;

        bus.hw.advance(u64::from(device.watchdog().reload_value()) + 1);
        assert_eq!(irqs.fire(WDT_IRQ), Some(IrqReturn::Handled));
        assert!(device.watchdog().warning_raised());

        framework.keepalive(device.handle())?;
        assert!(!device.watchdog().warning_raised());
        Ok(())
    }
}
