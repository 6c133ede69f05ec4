// Register offsets and bit fields per controller generation.
//
// Offsets are relative to the controller base. Only the registers the
// splash path touches are listed.

use smol_logo::PixelFormat;

use super::{Generation, Layer, Reg};

pub const CFG0: u32 = 0x00;
pub const EN: u32 = 0x20;
pub const DIS: u32 = 0x24;
pub const SR: u32 = 0x28;

// XLCDC_ATTRS.SIP
pub const ATTRS_SIP: u32 = 1 << 31;

// ── Bit fields ──────────────────────────────────────────────────────────

pub mod cfg0 {
    pub const CLKPOL: u32 = 1 << 0;
    pub const CLKBYP: u32 = 1 << 1; // XLCDC
    pub const CLKPWMSEL: u32 = 1 << 3;
    pub const CGDISBASE: u32 = 1 << 8;
    pub const CGDISHEO: u32 = 1 << 11;
    pub const CGDISPP: u32 = 1 << 13;
    pub const CLKDIV_MAX: u32 = 0xff;

    pub const fn clkdiv(x: u32) -> u32 {
        (x << 16) & 0x00ff_0000
    }
}

pub mod cfg1 {
    pub const fn hspw(x: u32) -> u32 {
        x & 0x3ff
    }
    pub const fn vspw(x: u32) -> u32 {
        (x << 16) & 0x03ff_0000
    }
}

pub mod cfg2 {
    pub const fn vfpw(x: u32) -> u32 {
        x & 0x3ff
    }
    pub const fn vbpw(x: u32) -> u32 {
        (x << 16) & 0x03ff_0000
    }
}

pub mod cfg3 {
    pub const fn hfpw(x: u32) -> u32 {
        x & 0x3ff
    }
    pub const fn hbpw(x: u32) -> u32 {
        (x << 16) & 0x03ff_0000
    }
}

pub mod cfg4 {
    pub const fn ppl(x: u32) -> u32 {
        x & 0x7ff
    }
    pub const fn rpf(x: u32) -> u32 {
        (x << 16) & 0x07ff_0000
    }
}

pub mod cfg5 {
    pub const HSPOL: u32 = 1 << 0;
    pub const VSPOL: u32 = 1 << 1;
    pub const VSPDLYS: u32 = 1 << 2;
    pub const DISPDLY: u32 = 1 << 7;
    pub const OUTPUT_16BPP: u32 = 1 << 8;
    pub const OUTPUT_DPI_24BPP: u32 = 5 << 8; // XLCDC
    pub const DPI: u32 = 1 << 11; // XLCDC

    pub const fn guardtime(x: u32) -> u32 {
        (x << 16) & 0x00ff_0000
    }
}

pub mod cfg6 {
    pub const PWMPOL: u32 = 1 << 4;
    pub const PWMCVAL_MASK: u32 = 0xff << 8;

    pub const fn pwmps(x: u32) -> u32 {
        x & 0x7
    }
    pub const fn pwmcval(x: u32) -> u32 {
        (x << 8) & PWMCVAL_MASK
    }
}

pub mod layer {
    // LCDC CHER
    pub const CH: u32 = 1 << 0;
    pub const UPDATE: u32 = 1 << 1;
    // XLCDC EN
    pub const ENABLE: u32 = 1 << 0;
    // LCDC CTRL
    pub const DFETCH: u32 = 1 << 0;
    // LCDC HEOCFG0
    pub const ROT: u32 = 1 << 12;
    // CFG1 colour lookup enable
    pub const CLUTEN: u32 = 1 << 0;
    // LCDC HEOCFG12
    pub const GAEN: u32 = 1 << 5;
    pub const OVR: u32 = 1 << 7;
    pub const DMA: u32 = 1 << 8;
    // XLCDC HEOCFG12
    pub const XDMA: u32 = 1 << 0;
    // LCDC HEOCFG13
    pub const SCAL: u32 = 1 << 31;
    pub const FACTOR_MASK: u32 = 0x3fff;

    pub const fn ga(x: u32) -> u32 {
        (x & 0xff) << 16
    }
    // XLCDC HEOCFG0
    pub const fn blen(x: u32) -> u32 {
        x << 4
    }
    pub const fn blencc(x: u32) -> u32 {
        x << 8
    }
    pub const fn pos(x: u32, y: u32) -> u32 {
        (x & 0x7ff) | (y & 0x7ff) << 16
    }
    pub const fn size(w: u32, h: u32) -> u32 {
        (w.wrapping_sub(1) & 0x7ff) | (h.wrapping_sub(1) & 0x7ff) << 16
    }
    pub const fn rgb(c: u32) -> u32 {
        c & 0x00ff_ffff
    }
}

// XLCDC HEOCFG23..31
pub mod scaler {
    pub const VXSYEN: u32 = 1 << 0;
    pub const VXSCEN: u32 = 1 << 1;
    pub const HXSYEN: u32 = 1 << 4;
    pub const HXSCEN: u32 = 1 << 5;
    pub const VXSYBICU: u32 = 1 << 6;
    pub const VXSCBICU: u32 = 1 << 22;
    pub const HXSYBICU: u32 = 1 << 5;
    pub const HXSCBICU: u32 = 1 << 21;

    pub const fn vxsycfg(x: u32) -> u32 {
        x & 0x3
    }
    pub const fn vxsccfg(x: u32) -> u32 {
        (x & 0x3) << 16
    }
    pub const fn hxsycfg(x: u32) -> u32 {
        x & 0x3
    }
    pub const fn hxsccfg(x: u32) -> u32 {
        (x & 0x3) << 16
    }
}

// ── Tables ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncPolicy {
    /// wait for SYNC_BUSY to clear before every register write (LCDC)
    BeforeWrite,
    /// wait for SYNC_BUSY to clear after every register write (XLCDC)
    AfterWrite,
}

/// Absolute offsets of one layer's registers.
#[derive(Clone, Copy, Debug)]
pub struct LayerBlock {
    pub enable: u32,
    pub addr: u32,
    pub ctrl: Option<u32>,
    pub next: Option<u32>,
    pub cfg: u32,
    pub clut: Option<u32>,
    // ATTRE bit for this layer (XLCDC)
    pub attr: u32,
}

/// CFG1 input mode per pixel format.
#[derive(Clone, Copy, Debug)]
pub struct FormatCodes {
    pub argb8888: u32,
    pub rgb888_packed: u32,
    pub rgb1555: u32,
    pub rgb565: u32,
    pub clut8: u32,
    pub clut4: u32,
    pub clut1: u32,
}

impl FormatCodes {
    pub fn mode(&self, format: PixelFormat) -> u32 {
        match format {
            PixelFormat::Argb8888 => self.argb8888,
            PixelFormat::Rgb888Packed => self.rgb888_packed,
            PixelFormat::Rgb1555 => self.rgb1555,
            PixelFormat::Rgb565 => self.rgb565,
            PixelFormat::Clut8 => self.clut8 | layer::CLUTEN,
            PixelFormat::Clut4 => self.clut4 | layer::CLUTEN,
            PixelFormat::Clut1 => self.clut1 | layer::CLUTEN,
        }
    }
}

/// Fixed parts of the timing engine programming.
#[derive(Clone, Copy, Debug)]
pub struct TimingProfile {
    /// the divider field holds `div - clkdiv_bias`
    pub clkdiv_bias: u32,
    pub cfg0: u32,
    /// CFG0 when the serializer supplies the pixel clock; `None` if the
    /// controller cannot bypass its divider
    pub cfg0_bypass: Option<u32>,
    /// VBPW holds `vbp - 1` instead of `vbp`
    pub vbp_minus_one: bool,
    pub cfg5: u32,
    /// CFG6 without the compare value
    pub cfg6: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct RegisterMap {
    pub name: &'static str,
    pub generation: Generation,
    pub sync: SyncPolicy,
    pub base: LayerBlock,
    pub heo: LayerBlock,
    pub attr_update: Option<u32>,
    pub attr_status: Option<u32>,
    pub formats: FormatCodes,
    /// base layer CFG1
    pub base_mode: u32,
    pub heo_cfg0: u32,
    /// HEOCFG12, layer DMA path
    pub heo_dma: u32,
    /// value written to the layer enable register to apply staged config
    pub commit: u32,
    /// HEOCFG index of the first horizontal / vertical phase coefficient
    pub coefficients: Option<(u8, u8)>,
    pub timing: TimingProfile,
}

impl RegisterMap {
    pub fn layer(&self, layer: Layer) -> &LayerBlock {
        match layer {
            Layer::Base => &self.base,
            Layer::Heo => &self.heo,
        }
    }

    /// Offset for a logical register; `None` if this generation lacks it.
    pub fn offset(&self, reg: Reg) -> Option<u32> {
        match reg {
            Reg::Cfg(i) => Some(CFG0 + 4 * i as u32),
            Reg::LayerCfg(l, i) => Some(self.layer(l).cfg + 4 * i as u32),
            Reg::LayerEnable(l) => Some(self.layer(l).enable),
            Reg::LayerAddr(l) => Some(self.layer(l).addr),
            Reg::LayerCtrl(l) => self.layer(l).ctrl,
            Reg::LayerNext(l) => self.layer(l).next,
            Reg::AttrUpdate => self.attr_update,
        }
    }

    /// Layers fetch through a DMA descriptor chain (LCDC).
    pub fn uses_descriptors(&self) -> bool {
        self.heo.next.is_some()
    }

    pub fn has_scan_stage(&self) -> bool {
        self.generation == Generation::Xlcdc
    }

    pub fn has_serial_stage(&self) -> bool {
        self.generation == Generation::Xlcdc
    }
}

const LCDC_FORMATS: FormatCodes = FormatCodes {
    argb8888: 12 << 4,
    rgb888_packed: 10 << 4,
    rgb1555: 4 << 4,
    rgb565: 3 << 4,
    clut8: 3 << 8,
    clut4: 2 << 8,
    clut1: 0,
};

const LCDC_TIMING: TimingProfile = TimingProfile {
    clkdiv_bias: 2,
    cfg0: cfg0::CGDISPP | cfg0::CGDISHEO | cfg0::CGDISBASE | cfg0::CLKPWMSEL,
    cfg0_bypass: None,
    vbp_minus_one: false,
    cfg5: cfg5::guardtime(0)
        | cfg5::OUTPUT_16BPP
        | cfg5::DISPDLY
        | cfg5::VSPDLYS
        | cfg5::VSPOL
        | cfg5::HSPOL,
    cfg6: cfg6::pwmps(6),
};

const fn lcdc_layer(base: u32, cfg: u32, clut: Option<u32>) -> LayerBlock {
    LayerBlock {
        enable: base,
        addr: base + 0x20,
        ctrl: Some(base + 0x24),
        next: Some(base + 0x28),
        cfg: base + cfg,
        clut,
        attr: 0,
    }
}

const fn lcdc(name: &'static str, base: u32, heo: u32) -> RegisterMap {
    RegisterMap {
        name,
        generation: Generation::Lcdc,
        sync: SyncPolicy::BeforeWrite,
        base: lcdc_layer(base, 0x2c, None),
        heo: lcdc_layer(heo, 0x4c, Some(0x1200)),
        attr_update: None,
        attr_status: None,
        formats: LCDC_FORMATS,
        base_mode: LCDC_FORMATS.rgb565,
        heo_cfg0: layer::ROT,
        heo_dma: layer::ga(0xff) | layer::DMA | layer::OVR | layer::GAEN,
        commit: layer::UPDATE | layer::CH,
        coefficients: Some((17, 33)),
        timing: LCDC_TIMING,
    }
}

pub const SAMA5D2_LCDC: RegisterMap = lcdc("sama5d2-lcdc", 0x40, 0x340);
pub const SAM9X60_LCDC: RegisterMap = lcdc("sam9x60-lcdc", 0x60, 0x360);

const XLCDC_FORMATS: FormatCodes = FormatCodes {
    argb8888: 0x12 << 4,
    rgb888_packed: 0x10 << 4,
    rgb1555: 4 << 4,
    rgb565: 3 << 4,
    clut8: 3 << 8,
    clut4: 2 << 8,
    clut1: 0,
};

pub const SAM9X7_XLCDC: RegisterMap = RegisterMap {
    name: "sam9x7-xlcdc",
    generation: Generation::Xlcdc,
    sync: SyncPolicy::AfterWrite,
    base: LayerBlock {
        enable: 0x70,
        addr: 0x78,
        ctrl: None,
        next: None,
        cfg: 0x7c,
        clut: Some(0x700),
        attr: 1 << 0,
    },
    heo: LayerBlock {
        enable: 0x370,
        addr: 0x378,
        ctrl: None,
        next: None,
        cfg: 0x390,
        clut: Some(0x1300),
        attr: 1 << 3,
    },
    attr_update: Some(0x3c),
    attr_status: Some(0x40),
    formats: XLCDC_FORMATS,
    base_mode: XLCDC_FORMATS.rgb888_packed,
    heo_cfg0: layer::blen(4) | layer::blencc(1),
    heo_dma: layer::XDMA,
    commit: layer::ENABLE,
    coefficients: None,
    timing: TimingProfile {
        clkdiv_bias: 0,
        cfg0: cfg0::CLKPWMSEL | cfg0::CLKPOL,
        cfg0_bypass: Some(cfg0::CLKPWMSEL | cfg0::CLKBYP | cfg0::CLKPOL),
        vbp_minus_one: true,
        cfg5: cfg5::guardtime(0)
            | cfg5::DPI
            | cfg5::OUTPUT_DPI_24BPP
            | cfg5::DISPDLY
            | cfg5::VSPDLYS
            | cfg5::VSPOL
            | cfg5::HSPOL,
        cfg6: cfg6::PWMPOL | cfg6::pwmps(6),
    },
};
