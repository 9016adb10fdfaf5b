//! Fake collaborators shared by the integration suites.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use parking_lot::Mutex;
use sp805_watchdog::prelude::*;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Interrupt line the fake bus describes.
pub const WDT_IRQ: u32 = 42;

/// Clock rate used by most tests.
pub const RATE_HZ: u32 = 1000;

struct Registration {
    info: &'static WatchdogInfo,
    ops: Arc<dyn WatchdogOps>,
    nowayout: bool,
}

/// Watchdog framework that keeps registrations in memory and lets tests play
/// the part of userspace.
#[derive(Default)]
pub struct FakeFramework {
    next_id: AtomicU32,
    refuse: AtomicBool,
    registrations: Mutex<HashMap<WatchdogHandle, Registration>>,
    active: Mutex<HashSet<WatchdogHandle>>,
}

impl FakeFramework {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refuse_registration(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }

    pub fn is_registered(&self, handle: WatchdogHandle) -> bool {
        self.registrations.lock().contains_key(&handle)
    }

    pub fn registered_count(&self) -> usize {
        self.registrations.lock().len()
    }

    pub fn identity(&self, handle: WatchdogHandle) -> Option<&'static str> {
        self.registrations.lock().get(&handle).map(|r| r.info.identity)
    }

    pub fn nowayout(&self, handle: WatchdogHandle) -> Option<bool> {
        self.registrations.lock().get(&handle).map(|r| r.nowayout)
    }

    fn ops(&self, handle: WatchdogHandle) -> Sp805Result<Arc<dyn WatchdogOps>> {
        self.registrations
            .lock()
            .get(&handle)
            .map(|r| Arc::clone(&r.ops))
            .ok_or_else(|| Sp805Error::registration("unknown handle"))
    }

    /// Userspace opens the control surface: start and mark active.
    pub fn open(&self, handle: WatchdogHandle) -> Sp805Result<()> {
        self.ops(handle)?.start()?;
        self.active.lock().insert(handle);
        Ok(())
    }

    /// Userspace keepalive.
    pub fn keepalive(&self, handle: WatchdogHandle) -> Sp805Result<()> {
        self.ops(handle)?.ping()
    }

    /// Userspace sets a timeout; returns what the driver made of it.
    pub fn set_timeout(&self, handle: WatchdogHandle, secs: u32) -> Sp805Result<u32> {
        self.ops(handle)?.set_timeout(secs)
    }

    /// Userspace queries the time left.
    pub fn time_left(&self, handle: WatchdogHandle) -> Sp805Result<u32> {
        Ok(self.ops(handle)?.time_left())
    }

    /// Userspace closes the control surface. Stops only after a magic close
    /// and only if no-way-out is off.
    pub fn close(&self, handle: WatchdogHandle, magic: bool) -> Sp805Result<()> {
        let ops = self.ops(handle)?;
        let nowayout = self.nowayout(handle).unwrap_or(true);
        if magic && !nowayout {
            ops.stop()?;
            self.active.lock().remove(&handle);
        }
        Ok(())
    }

    pub fn set_active(&self, handle: WatchdogHandle, active: bool) {
        let mut set = self.active.lock();
        if active {
            set.insert(handle);
        } else {
            set.remove(&handle);
        }
    }
}

impl WatchdogFramework for FakeFramework {
    fn register(
        &self,
        info: &'static WatchdogInfo,
        ops: Arc<dyn WatchdogOps>,
        nowayout: bool,
    ) -> Sp805Result<WatchdogHandle> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(Sp805Error::registration("framework refused"));
        }
        let handle = WatchdogHandle(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.registrations.lock().insert(
            handle,
            Registration {
                info,
                ops,
                nowayout,
            },
        );
        Ok(handle)
    }

    fn unregister(&self, handle: WatchdogHandle) {
        self.registrations.lock().remove(&handle);
        self.active.lock().remove(&handle);
    }

    fn is_active(&self, handle: WatchdogHandle) -> bool {
        self.active.lock().contains(&handle)
    }
}

/// Interrupt dispatcher with a handler table tests can fire into.
#[derive(Default)]
pub struct FakeIrqs {
    refuse: AtomicBool,
    handlers: Mutex<HashMap<u32, (String, Arc<dyn InterruptHandler>)>>,
}

impl FakeIrqs {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn refuse_requests(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }

    pub fn is_bound(&self, irq: u32) -> bool {
        self.handlers.lock().contains_key(&irq)
    }

    pub fn bound_name(&self, irq: u32) -> Option<String> {
        self.handlers.lock().get(&irq).map(|(name, _)| name.clone())
    }

    /// Deliver interrupt `irq`; `None` if nothing is bound.
    pub fn fire(&self, irq: u32) -> Option<IrqReturn> {
        let handler = self
            .handlers
            .lock()
            .get(&irq)
            .map(|(_, handler)| Arc::clone(handler));
        handler.map(|h| h.handle_irq(irq))
    }
}

impl IrqDispatcher for FakeIrqs {
    fn request_irq(
        &self,
        irq: u32,
        name: &str,
        handler: Arc<dyn InterruptHandler>,
    ) -> Sp805Result<()> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(Sp805Error::irq_request(irq, "line busy"));
        }
        self.handlers
            .lock()
            .insert(irq, (name.to_string(), handler));
        Ok(())
    }

    fn free_irq(&self, irq: u32) {
        self.handlers.lock().remove(&irq);
    }
}

/// Bus-side description of one simulated SP805.
#[derive(Debug, Clone)]
pub struct FakeBus {
    pub hw: SimulatedSp805,
    pub clock: SimulatedClock,
    pub irq: Option<u32>,
    pub fail_map: bool,
    pub missing_clock: bool,
}

impl FakeBus {
    pub fn new() -> Self {
        Self {
            hw: SimulatedSp805::new(),
            clock: SimulatedClock::new(RATE_HZ),
            irq: Some(WDT_IRQ),
            fail_map: false,
            missing_clock: false,
        }
    }
}

impl ResourceProvider for FakeBus {
    type Io = SimulatedSp805;
    type Clock = SimulatedClock;

    fn name(&self) -> &str {
        "fake-sp805"
    }

    fn map_registers(&self) -> Sp805Result<SimulatedSp805> {
        if self.fail_map {
            return Err(Sp805Error::register_map("resource busy"));
        }
        Ok(self.hw.clone())
    }

    fn clock(&self) -> Sp805Result<SimulatedClock> {
        if self.missing_clock {
            return Err(Sp805Error::clock_lookup("apb_pclk"));
        }
        Ok(self.clock.clone())
    }

    fn irq(&self) -> Option<u32> {
        self.irq
    }
}

pub type SimDevice = Sp805Device<SimulatedSp805, SimulatedClock>;

/// Attach `bus` with the default configuration.
pub fn attach(
    bus: &FakeBus,
    framework: &Arc<FakeFramework>,
    irqs: &Arc<FakeIrqs>,
) -> Sp805Result<SimDevice> {
    let framework = Arc::clone(framework) as Arc<dyn WatchdogFramework>;
    let irqs = Arc::clone(irqs) as Arc<dyn IrqDispatcher>;
    Sp805Device::attach(bus, framework, irqs, &Sp805Config::default())
}
