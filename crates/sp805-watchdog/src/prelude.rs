//! Prelude for sp805-watchdog.
//!
//! This module re-exports the most commonly used types for convenient importing.
//!
//! # Example
//!
//! ```rust
//! use sp805_watchdog::prelude::*;
//!
//! let wdt = Sp805Watchdog::new(SimulatedSp805::new(), SimulatedClock::new(1000));
//! wdt.set_timeout(60).expect("non-zero rate");
//! wdt.start().expect("clock enables");
//! wdt.ping();
//! ```

pub use crate::clock::Clock;
pub use crate::config::{Sp805Config, Sp805ConfigBuilder};
pub use crate::device::Sp805Watchdog;
pub use crate::error::{Sp805Error, Sp805Result};
pub use crate::framework::{
    InterruptHandler, IrqDispatcher, IrqReturn, WatchdogFramework, WatchdogHandle,
};
pub use crate::lifecycle::{ResourceProvider, Sp805Device};
pub use crate::regs::RegisterIo;
pub use crate::sim::{SimulatedClock, SimulatedSp805};
pub use crate::state::{ArmState, WatchdogEvent};
pub use crate::watchdog::{SP805_INFO, WatchdogInfo, WatchdogOps, WatchdogOptions};
