// LCDC layer DMA descriptor.
// One descriptor whose `next` points at itself: the layer re-fetches the
// same frame every refresh without the CPU. Must stay put for as long as
// the layer is enabled, hence the caller owns it.

use crate::drivers::lcdc::regmap::layer;

#[repr(C, align(8))]
#[derive(Debug, Default)]
pub struct DmaDescriptor {
    pub addr: u32,
    pub ctrl: u32,
    pub next: u32,
    reserved: u32,
}

impl DmaDescriptor {
    pub const fn new() -> Self {
        Self {
            addr: 0,
            ctrl: 0,
            next: 0,
            reserved: 0,
        }
    }

    /// Bus address of this descriptor.
    pub fn bus_addr(&self) -> u32 {
        self as *const Self as usize as u32
    }

    /// Points the descriptor at `addr` and links it to itself. Returns the
    /// descriptor address for the layer's NEXT register.
    pub fn link_self(&mut self, addr: u32) -> u32 {
        self.addr = addr;
        self.ctrl = layer::DFETCH;
        self.next = self.bus_addr();
        self.reserved = 0;
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout() {
        assert_eq!(core::mem::size_of::<DmaDescriptor>(), 16);
        assert_eq!(core::mem::align_of::<DmaDescriptor>(), 8);
    }

    #[test]
    fn self_linked() {
        let mut d = DmaDescriptor::new();
        let next = d.link_self(0x2000_0400);
        assert_eq!(d.addr, 0x2000_0400);
        assert_eq!(d.ctrl, layer::DFETCH);
        assert_eq!(d.next, next);
        assert_eq!(next, d.bus_addr());
        assert_eq!(next % 8, 0);
    }
}
