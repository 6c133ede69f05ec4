// Memory-mapped LCDC/XLCDC access.
// Plain volatile 32-bit loads/stores at `base + offset`; no caching, no
// read-back of write-only registers.

use core::ptr;

use super::regmap::{self, ATTRS_SIP, RegisterMap};
use super::{Axis, DisplayController, Layer, Reg, Signals, clut_word};

pub struct Mmio {
    base: usize,
    map: &'static RegisterMap,
}

impl Mmio {
    /// # Safety
    /// `base` must be the controller's register block described by `map`,
    /// and nothing else may drive it while this value lives.
    pub const unsafe fn new(base: usize, map: &'static RegisterMap) -> Self {
        Self { base, map }
    }

    #[inline]
    fn read(&self, off: u32) -> u32 {
        // SAFETY: in-range register of the block handed to `new`
        unsafe { ptr::read_volatile((self.base + off as usize) as *const u32) }
    }

    #[inline]
    fn write(&mut self, off: u32, value: u32) {
        // SAFETY: as above
        unsafe { ptr::write_volatile((self.base + off as usize) as *mut u32, value) }
    }
}

impl DisplayController for Mmio {
    fn map(&self) -> &'static RegisterMap {
        self.map
    }

    fn write_config(&mut self, reg: Reg, value: u32) {
        match self.map.offset(reg) {
            Some(off) => self.write(off, value),
            None => log::warn!("lcdc: {} has no {:?}", self.map.name, reg),
        }
    }

    fn read_config(&mut self, reg: Reg) -> u32 {
        self.map.offset(reg).map_or(0, |off| self.read(off))
    }

    fn read_status(&mut self) -> Signals {
        let mut s = Signals::from_bits_truncate(self.read(regmap::SR));
        // SR bit 31 is reserved; fold the attribute SIP in there
        s.remove(Signals::ATTR_BUSY);
        if let Some(attrs) = self.map.attr_status {
            if self.read(attrs) & ATTRS_SIP != 0 {
                s.insert(Signals::ATTR_BUSY);
            }
        }
        s
    }

    fn enable(&mut self, signals: Signals) {
        self.write(regmap::EN, signals.bits());
    }

    fn disable(&mut self, signals: Signals) {
        self.write(regmap::DIS, signals.bits());
    }

    fn set_clut(&mut self, layer: Layer, palette: &[u8]) {
        let Some(base) = self.map.layer(layer).clut else {
            log::warn!("lcdc: {} has no {:?} CLUT", self.map.name, layer);
            return;
        };
        for (i, entry) in palette.chunks_exact(4).enumerate() {
            self.write(base + 4 * i as u32, clut_word(entry));
        }
    }

    fn set_scaler_coefficients(&mut self, axis: Axis, table: &[u32]) {
        let Some((x, y)) = self.map.coefficients else {
            return;
        };
        let first = match axis {
            Axis::Horizontal => x,
            Axis::Vertical => y,
        };
        for (i, &c) in table.iter().enumerate() {
            self.write_config(Reg::LayerCfg(Layer::Heo, first + i as u8), c);
        }
    }
}
