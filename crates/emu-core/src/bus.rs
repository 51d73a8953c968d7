//! Processor-visible address space.

/// What the processor sees on its address and data lines.
///
/// Implementations decode the address and route the access to RAM, chip
/// registers or the cartridge. Reads take `&mut self` because reading a
/// register can change state (strobes, bank switches, latch clears).
pub trait Bus {
    fn read(&mut self, address: u16) -> u8;

    fn write(&mut self, address: u16, value: u8);
}
