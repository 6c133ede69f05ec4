// LCDC / XLCDC display controller interface.
//
// The compositor talks in logical registers (`Reg`) and controller signals;
// a `RegisterMap` turns those into offsets and bit values for one
// controller generation. `Mmio` is the real thing, `fake::FakeLcdc` a
// recording stand-in for host tests.

#[cfg(test)]
pub mod fake;
pub mod mmio;
pub mod regmap;

pub use mmio::Mmio;
pub use regmap::{RegisterMap, SAM9X7_XLCDC, SAM9X60_LCDC, SAMA5D2_LCDC, SyncPolicy};

bitflags::bitflags! {
    /// Enable/disable request and status bits (LCDC_EN, LCDC_DIS, LCDC_SR).
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Signals: u32 {
        /// pixel clock
        const CLOCK = 1 << 0;
        /// horizontal/vertical timing engine
        const SYNC = 1 << 1;
        /// DISP signal
        const DISPLAY = 1 << 2;
        /// backlight PWM
        const PWM = 1 << 3;
        /// clock domain synchronization in progress, status only
        const SYNC_BUSY = 1 << 4;
        /// XLCDC scan-out; its status bit clears once running
        const SCAN = 1 << 5;
        /// XLCDC MIPI DSI command mode
        const SERIAL = 1 << 6;
        /// XLCDC attribute update pending (LCDC_ATTRS.SIP), status only
        const ATTR_BUSY = 1 << 31;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Base,
    /// high-end overlay; the only layer with a scaler
    Heo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Generation {
    /// SAMA5D2 / SAM9X60 LCDC
    Lcdc,
    /// SAM9X7 XLCDC
    Xlcdc,
}

/// Logical register ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reg {
    /// LCDC_CFGn, timing engine
    Cfg(u8),
    /// per-layer CFGn
    LayerCfg(Layer, u8),
    /// channel enable (LCDC CHER) or layer enable (XLCDC EN)
    LayerEnable(Layer),
    /// frame buffer address (LCDC ADDR, XLCDC FBA)
    LayerAddr(Layer),
    /// DMA control, LCDC only
    LayerCtrl(Layer),
    /// next DMA descriptor, LCDC only
    LayerNext(Layer),
    /// XLCDC attribute update (ATTRE)
    AttrUpdate,
}

/// Register-level capability the compositor drives.
pub trait DisplayController {
    fn map(&self) -> &'static RegisterMap;

    fn write_config(&mut self, reg: Reg, value: u32);

    fn read_config(&mut self, reg: Reg) -> u32;

    fn read_status(&mut self) -> Signals;

    fn enable(&mut self, signals: Signals);

    fn disable(&mut self, signals: Signals);

    /// Loads BGRx palette entries as `b | g << 8 | r << 16`.
    fn set_clut(&mut self, layer: Layer, palette: &[u8]);

    fn set_scaler_coefficients(&mut self, axis: Axis, table: &[u32]);
}

/// Packs one BGRx palette entry into a CLUT word.
#[inline]
pub fn clut_word(entry: &[u8]) -> u32 {
    entry[0] as u32 | (entry[1] as u32) << 8 | (entry[2] as u32) << 16
}
