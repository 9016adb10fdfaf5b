//! # sp805-watchdog
//!
//! Driver core for the ARM SP805 watchdog.
//!
//! The SP805 counts a 32-bit reload value down twice. The end of the first
//! pass raises an interrupt; if the interrupt is still pending at the end of
//! the second pass the device resets the system. Software keeps the system
//! alive by reloading the counter ("pinging") before that happens.
//!
//! This crate provides:
//! - [`Sp805Registers`] - the register block behind its lock/unlock write gate
//! - [`compute_reload`] / [`compute_time_left`] - timeout arithmetic
//! - [`Sp805Watchdog`] - arm/disarm state machine and interrupt handler
//! - [`Sp805Device`] - attach/detach and suspend/resume against the
//!   framework, clock and interrupt collaborators
//! - [`SimulatedSp805`] / [`SimulatedClock`] - hardware-free models
//!
//! ## Concurrency
//!
//! Every entry point may be called concurrently. The interrupt path only
//! takes a spinlock held for a few register accesses; clock enable/disable
//! happens outside it.
//!
//! ## Example
//!
//! ```rust
//! use sp805_watchdog::prelude::*;
//!
//! let hw = SimulatedSp805::new();
//! let wdt = Sp805Watchdog::new(hw.clone(), SimulatedClock::new(1000));
//!
//! // 60s total: two passes of 30s each.
//! assert_eq!(wdt.set_timeout(60).expect("non-zero rate"), 60);
//! wdt.start().expect("clock enables");
//! assert_eq!(hw.load(), 29_999);
//!
//! hw.advance(10_000);
//! wdt.ping();
//! assert_eq!(wdt.time_left(), 59);
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod clock;
pub mod config;
pub mod device;
pub mod error;
pub mod framework;
pub mod lifecycle;
#[expect(unsafe_code, reason = "volatile access to device memory")]
pub mod mmio;
pub mod prelude;
pub mod regs;
pub mod sim;
pub mod state;
pub mod timeout;
pub mod watchdog;

pub use clock::Clock;
pub use config::{Sp805Config, Sp805ConfigBuilder};
pub use device::Sp805Watchdog;
pub use error::{Sp805Error, Sp805Result};
pub use framework::{
    InterruptHandler, IrqDispatcher, IrqReturn, WatchdogFramework, WatchdogHandle,
};
pub use lifecycle::{ResourceProvider, Sp805Device};
pub use mmio::MmioRegion;
pub use regs::{RegisterIo, Sp805Registers, UnlockedRegs};
pub use sim::{SimulatedClock, SimulatedSp805};
pub use state::{ArmState, EventCallback, WatchdogEvent};
pub use timeout::{ReloadSetting, compute_reload, compute_time_left, effective_timeout};
pub use watchdog::{SP805_INFO, WatchdogInfo, WatchdogOps, WatchdogOptions};
