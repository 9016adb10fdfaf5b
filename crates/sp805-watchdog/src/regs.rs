//! SP805 register block and the lock/unlock write gate.
//!
//! The load, control and interrupt-clear registers only accept writes after
//! the unlock key has been written to `WDTLOCK`. [`Sp805Registers::unlock`]
//! hands out an [`UnlockedRegs`] guard; dropping the guard writes the lock
//! sentinel and reads `WDTLOCK` back so posted writes reach the device before
//! the caller continues.

/// Load register: value the counter restarts from.
pub const WDTLOAD: usize = 0x000;
/// Current counter value.
pub const WDTVALUE: usize = 0x004;
/// Control register.
pub const WDTCONTROL: usize = 0x008;
/// Interrupt clear register (any write clears).
pub const WDTINTCLR: usize = 0x00C;
/// Raw interrupt status.
pub const WDTRIS: usize = 0x010;
/// Masked interrupt status.
pub const WDTMIS: usize = 0x014;
/// Lock register.
pub const WDTLOCK: usize = 0xC00;

/// Size of the register window in bytes.
pub const REGISTER_WINDOW: usize = 0x1000;

/// Control bit: interrupt enable, also starts the counter.
pub const INT_ENABLE: u32 = 1 << 0;
/// Control bit: reset output enable.
pub const RESET_ENABLE: u32 = 1 << 1;
/// Interrupt status bit in `WDTRIS`/`WDTMIS`.
pub const INT_MASK: u32 = 1 << 0;

/// Key that opens the write gate.
pub const UNLOCK_KEY: u32 = 0x1ACC_E551;
/// Any other value closes it; this is the one the driver writes.
pub const LOCK_KEY: u32 = 0x0000_0001;

/// Smallest programmable reload value.
pub const LOAD_MIN: u32 = 0x0000_0001;
/// Largest programmable reload value.
pub const LOAD_MAX: u32 = 0xFFFF_FFFF;

/// 32-bit access to a mapped register window.
///
/// Offsets are byte offsets from the start of the window. Implementations
/// must not reorder accesses.
pub trait RegisterIo: Send {
    /// Read the 32-bit register at `offset`.
    fn read32(&self, offset: usize) -> u32;

    /// Write the 32-bit register at `offset`.
    fn write32(&mut self, offset: usize, value: u32);
}

/// Typed view over an SP805 register window.
#[derive(Debug)]
pub struct Sp805Registers<R> {
    io: R,
}

impl<R: RegisterIo> Sp805Registers<R> {
    /// Wrap a mapped register window.
    #[must_use]
    pub fn new(io: R) -> Self {
        Self { io }
    }

    /// Open the write gate.
    ///
    /// The gate closes again when the returned guard is dropped.
    pub fn unlock(&mut self) -> UnlockedRegs<'_, R> {
        self.io.write32(WDTLOCK, UNLOCK_KEY);
        UnlockedRegs { regs: self }
    }

    /// Close the write gate and flush posted writes.
    pub fn lock(&mut self) {
        self.io.write32(WDTLOCK, LOCK_KEY);
        // Read back so the writes above have landed before we return.
        let _ = self.io.read32(WDTLOCK);
    }

    /// Whether the write gate is currently closed.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.io.read32(WDTLOCK) & 1 != 0
    }

    /// Programmed reload value.
    #[must_use]
    pub fn load(&self) -> u32 {
        self.io.read32(WDTLOAD)
    }

    /// Ticks left in the current countdown pass.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.io.read32(WDTVALUE)
    }

    /// Control register contents.
    #[must_use]
    pub fn control(&self) -> u32 {
        self.io.read32(WDTCONTROL)
    }

    /// Whether the first-stage interrupt is raised, regardless of masking.
    #[must_use]
    pub fn raw_interrupt(&self) -> bool {
        self.io.read32(WDTRIS) & INT_MASK != 0
    }

    /// Whether the first-stage interrupt is raised and enabled.
    #[must_use]
    pub fn masked_interrupt(&self) -> bool {
        self.io.read32(WDTMIS) & INT_MASK != 0
    }

    /// Borrow the underlying window.
    #[must_use]
    pub fn io(&self) -> &R {
        &self.io
    }
}

/// Write access to the gated registers.
///
/// Exists only while the gate is open; dropping it re-locks the block.
#[derive(Debug)]
pub struct UnlockedRegs<'a, R: RegisterIo> {
    regs: &'a mut Sp805Registers<R>,
}

impl<R: RegisterIo> UnlockedRegs<'_, R> {
    /// Program the reload value; the counter restarts from it.
    pub fn set_load(&mut self, load: u32) {
        self.regs.io.write32(WDTLOAD, load);
    }

    /// Clear a pending first-stage interrupt.
    pub fn clear_interrupt(&mut self) {
        self.regs.io.write32(WDTINTCLR, INT_MASK);
    }

    /// Write the control register.
    pub fn set_control(&mut self, control: u32) {
        self.regs.io.write32(WDTCONTROL, control);
    }
}

impl<R: RegisterIo> Drop for UnlockedRegs<'_, R> {
    fn drop(&mut self) {
        self.regs.lock();
    }
}
