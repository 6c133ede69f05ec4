// Panel timing as the controller's timing engine consumes it.
// All widths in pixel clocks / lines; the timing registers take most of
// them minus one, see display::Compositor::program_timing.

use embedded_graphics_core::geometry::Size;

// 11-bit PPL/RPF and layer size fields
pub const MAX_ACTIVE: u16 = 2048;
// 10-bit pulse/porch fields
pub const MAX_PORCH: u16 = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PanelGeometry {
    pub width: u16,
    pub height: u16,
    pub refresh_hz: u32,
    pub hfp: u16,
    pub hbp: u16,
    pub hpw: u16,
    pub vfp: u16,
    pub vbp: u16,
    pub vpw: u16,
}

impl PanelGeometry {
    pub const fn size(&self) -> Size {
        Size::new(self.width as u32, self.height as u32)
    }

    pub const fn htotal(&self) -> u32 {
        self.hpw as u32 + self.hbp as u32 + self.width as u32 + self.hfp as u32
    }

    pub const fn vtotal(&self) -> u32 {
        self.vpw as u32 + self.vbp as u32 + self.height as u32 + self.vfp as u32
    }

    /// Pixel clock the panel needs at its refresh rate.
    pub fn pixel_rate_hz(&self) -> Option<u32> {
        self.refresh_hz
            .checked_mul(self.htotal())?
            .checked_mul(self.vtotal())
    }

    /// Rejects values the timing registers cannot hold.
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.width == 0 || self.height == 0 {
            return Err("panel: empty active area");
        }
        if self.width > MAX_ACTIVE || self.height > MAX_ACTIVE {
            return Err("panel: active area exceeds 2048");
        }
        if self.hpw == 0 || self.vpw == 0 || self.hfp == 0 || self.vfp == 0 || self.hbp == 0 {
            return Err("panel: pulse width or porch is zero");
        }
        let porches = [self.hfp, self.hbp, self.hpw, self.vfp, self.vbp, self.vpw];
        if porches.iter().any(|&p| p > MAX_PORCH) {
            return Err("panel: porch exceeds 1024");
        }
        if self.refresh_hz == 0 || self.pixel_rate_hz().is_none() {
            return Err("panel: bad refresh rate");
        }
        Ok(())
    }
}

/// 800x480 @ 60 Hz, 7" RGB panel
pub const PANEL_800X480: PanelGeometry = PanelGeometry {
    width: 800,
    height: 480,
    refresh_hz: 60,
    hfp: 88,
    hbp: 40,
    hpw: 5,
    vfp: 23,
    vbp: 1,
    vpw: 5,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_rate() {
        // (800 + 88 + 40 + 5) * (480 + 23 + 1 + 5) * 60
        assert_eq!(PANEL_800X480.pixel_rate_hz(), Some(933 * 509 * 60));
        assert_eq!(PANEL_800X480.size(), Size::new(800, 480));
        assert!(PANEL_800X480.validate().is_ok());
    }

    #[test]
    fn rejects_unprogrammable_timing() {
        let mut p = PANEL_800X480;
        p.hpw = 0;
        assert!(p.validate().is_err());

        let mut p = PANEL_800X480;
        p.width = 4096;
        assert!(p.validate().is_err());

        let mut p = PANEL_800X480;
        p.refresh_hz = u32::MAX;
        assert!(p.validate().is_err());
    }
}
