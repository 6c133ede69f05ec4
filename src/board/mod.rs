//! Board configuration for the boot splash.
//!
//! Everything here is `const` data handed to the compositor: panel timing,
//! how the panel is attached, how the backlight is driven and where/how
//! the logo is placed. Nothing is probed at runtime.

pub mod panel;

pub use panel::{MAX_ACTIVE, PANEL_800X480, PanelGeometry};

use crate::drivers::lcdc::{RegisterMap, SAM9X7_XLCDC, SAMA5D2_LCDC};
use crate::kernel::poll::PollBudget;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputInterface {
    /// Parallel RGB, pixel clock from the controller divider
    Parallel,
    /// LVDS serializer; pixel clock bypasses the divider
    Lvds,
    /// MIPI DSI; needs the command-mode stage
    MipiDsi,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BacklightKind {
    /// Controller PWM output (LCDC_CFG6 compare value)
    Pwm,
    /// Plain on/off GPIO
    Gpio,
}

/// How layer register writes take effect.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommitMode {
    /// Stage everything, apply with a single commit.
    #[default]
    Deferred,
    /// Commit after every layer register write.
    Immediate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogoConfig {
    // upscale in eighths: size * (8 + scale) / 8, 0 = native
    pub scale: u8,
    pub brightness: u8,
    // before the first non-zero brightness
    pub backlight_delay_ms: u32,
    // 0xRRGGBB for the base layer and the overlay default colour
    pub base_color: u32,
    pub commit: CommitMode,
}

impl LogoConfig {
    pub const DEFAULT: Self = Self {
        scale: 0,
        brightness: 0xff,
        backlight_delay_ms: 0,
        base_color: 0x00_00_00,
        commit: CommitMode::Deferred,
    };
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BoardConfig {
    pub name: &'static str,
    pub panel: PanelGeometry,
    /// Controller source clock, from the clock tree.
    pub clock_hz: u32,
    pub regs: &'static RegisterMap,
    pub output: OutputInterface,
    pub backlight: BacklightKind,
    pub logo: LogoConfig,
    pub poll: PollBudget,
}

impl BoardConfig {
    /// SAM9X75 evaluation board: XLCDC, 7" RGB panel, backlight on PC21.
    pub const SAM9X75_EB: Self = Self {
        name: "sam9x75-eb",
        panel: PANEL_800X480,
        clock_hz: 200_000_000,
        regs: &SAM9X7_XLCDC,
        output: OutputInterface::Parallel,
        backlight: BacklightKind::Gpio,
        logo: LogoConfig {
            scale: 0,
            brightness: 0xff,
            backlight_delay_ms: 100,
            base_color: 0x00_00_00,
            commit: CommitMode::Deferred,
        },
        poll: PollBudget::Unbounded,
    };

    /// SAMA5D2 Xplained Ultra with the 7" RGB display module.
    pub const SAMA5D2_XULT: Self = Self {
        name: "sama5d2-xult",
        panel: PANEL_800X480,
        clock_hz: 166_000_000,
        regs: &SAMA5D2_LCDC,
        output: OutputInterface::Parallel,
        backlight: BacklightKind::Pwm,
        logo: LogoConfig {
            scale: 0,
            brightness: 0xe0,
            backlight_delay_ms: 0,
            base_color: 0x00_00_00,
            commit: CommitMode::Deferred,
        },
        poll: PollBudget::Unbounded,
    };

    pub fn validate(&self) -> Result<(), &'static str> {
        self.panel.validate()?;
        if self.clock_hz == 0 {
            return Err("board: no controller clock");
        }
        if self.output == OutputInterface::MipiDsi && !self.regs.has_serial_stage() {
            return Err("board: controller has no DSI command stage");
        }
        Ok(())
    }
}
