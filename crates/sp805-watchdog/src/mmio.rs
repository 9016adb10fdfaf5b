//! Volatile access to a memory-mapped register window.

use core::ptr::NonNull;

use crate::error::{Sp805Error, Sp805Result};
use crate::regs::{REGISTER_WINDOW, RegisterIo};

/// A mapped MMIO window owned by one device.
///
/// Out-of-window or misaligned offsets read as zero and drop writes, with a
/// warning; the register layout is fixed so this only triggers on driver bugs.
#[derive(Debug)]
pub struct MmioRegion {
    base: NonNull<u32>,
    len: usize,
}

// SAFETY: the region is exclusively owned by one device and every access goes
// through the device's lock.
unsafe impl Send for MmioRegion {}

impl MmioRegion {
    /// Wrap an already-mapped register window.
    ///
    /// # Safety
    ///
    /// `base` must point to `len` bytes of device memory that stay mapped for
    /// the lifetime of the region and are not accessed through any other
    /// alias.
    ///
    /// # Errors
    ///
    /// Returns an error if `base` is null or not 4-byte aligned, or the
    /// window is shorter than [`REGISTER_WINDOW`].
    pub unsafe fn from_raw(base: *mut u8, len: usize) -> Sp805Result<Self> {
        let base = NonNull::new(base.cast::<u32>())
            .ok_or_else(|| Sp805Error::register_map("null base address"))?;
        if base.as_ptr().is_aligned() && len >= REGISTER_WINDOW {
            Ok(Self { base, len })
        } else {
            Err(Sp805Error::register_map(format!(
                "unusable window {:p}+{len:#x}",
                base.as_ptr()
            )))
        }
    }

    /// Length of the window in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn register(&self, offset: usize) -> Option<*mut u32> {
        let end = offset.checked_add(4)?;
        if end > self.len || offset % 4 != 0 {
            tracing::warn!(offset, len = self.len, "register access outside window");
            return None;
        }
        Some(self.base.as_ptr().wrapping_add(offset / 4))
    }
}

impl RegisterIo for MmioRegion {
    fn read32(&self, offset: usize) -> u32 {
        match self.register(offset) {
            // SAFETY: `register` checked the offset against the window the
            // caller of `from_raw` vouched for.
            Some(ptr) => unsafe { ptr.read_volatile() },
            None => 0,
        }
    }

    fn write32(&mut self, offset: usize, value: u32) {
        if let Some(ptr) = self.register(offset) {
            // SAFETY: as in `read32`.
            unsafe { ptr.write_volatile(value) };
        }
    }
}
