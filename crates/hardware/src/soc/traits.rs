//! Memory-mapped register interface.
//!
//! A [`Device`] answers loads and stores at offsets relative to the base
//! of its region. Width-specific accessors keep the caller's access size
//! visible to the device, which matters for byte-laned registers such as
//! the CLIC's `mintthresh`.

/// A region of memory-mapped registers.
///
/// Implementors are `Send + Sync` so one view per hart can live on that
/// hart's thread.
pub trait Device: Send + Sync {
    /// Short name used in logs (`"CLIC"`).
    fn name(&self) -> &str;

    /// `(base, size)` of the region in bytes.
    fn address_range(&self) -> (u64, u64);

    /// 1-byte load.
    fn read_u8(&mut self, offset: u64) -> u8;
    /// 2-byte little-endian load.
    fn read_u16(&mut self, offset: u64) -> u16;
    /// 4-byte little-endian load.
    fn read_u32(&mut self, offset: u64) -> u32;

    /// 8-byte load. Defaults to two word loads, low word first.
    fn read_u64(&mut self, offset: u64) -> u64 {
        let lo = u64::from(self.read_u32(offset));
        let hi = u64::from(self.read_u32(offset + 4));
        lo | (hi << 32)
    }

    /// 1-byte store.
    fn write_u8(&mut self, offset: u64, val: u8);
    /// 2-byte little-endian store.
    fn write_u16(&mut self, offset: u64, val: u16);
    /// 4-byte little-endian store.
    fn write_u32(&mut self, offset: u64, val: u32);

    /// 8-byte store. Defaults to two word stores, low word first.
    fn write_u64(&mut self, offset: u64, val: u64) {
        self.write_u32(offset, val as u32);
        self.write_u32(offset + 4, (val >> 32) as u32);
    }

    /// Stores `data` one byte at a time.
    fn write_bytes(&mut self, offset: u64, data: &[u8]) {
        for (addr, &byte) in (offset..).zip(data) {
            self.write_u8(addr, byte);
        }
    }

    /// Returns true if the absolute address `addr` is inside the region.
    fn contains(&self, addr: u64) -> bool {
        let (base, size) = self.address_range();
        addr.checked_sub(base).is_some_and(|off| off < size)
    }
}
