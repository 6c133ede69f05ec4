//! Boot splash compositor.
//!
//! `Compositor` owns the controller for the duration of the splash and is
//! the only thing that writes to it. It keeps the controller state, the
//! scaler chosen for the controller generation, the backlight and the
//! overlay's DMA descriptor.
//!
//! Two layers are used: the base layer shows a flat colour, the overlay
//! (HEO) shows the logo, centred and optionally upscaled.
//!
//! Every register write honours the controller's sync policy: LCDC waits
//! for clock domain sync before writing, XLCDC after. Layer registers are
//! either staged and applied with one commit (`CommitMode::Deferred`) or
//! committed one by one (`CommitMode::Immediate`).

pub mod dma;
pub mod placement;
pub mod scaler;
pub mod sequencer;

pub use dma::DmaDescriptor;
pub use placement::{LayerPlacement, centered, compute_placement, scaled_size};
pub use scaler::{PhaseTableScaler, RatioScaler, RegisterSink, ScalerStrategy};
pub use sequencer::{ControllerState, Stage};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_graphics_core::geometry::Size;
use smol_logo::NormalizedImage;

use crate::board::{BacklightKind, BoardConfig, CommitMode, OutputInterface};
use crate::drivers::backlight::Backlight;
use crate::drivers::lcdc::regmap::{cfg0, cfg1, cfg2, cfg3, cfg4, cfg6, layer};
use crate::drivers::lcdc::{Axis, DisplayController, Generation, Layer, Reg, Signals, SyncPolicy};
use crate::error::SplashError;
use crate::kernel::{Condition, poll_until};

static PHASE_TABLE: PhaseTableScaler = PhaseTableScaler;
static RATIO: RatioScaler = RatioScaler;

/// Timing engine words, CFG0..CFG6. CFG6 only with a PWM backlight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimingWords {
    pub cfg: [u32; 6],
    pub cfg6: Option<u32>,
}

pub struct Compositor<'d, C, P> {
    ctrl: C,
    board: &'d BoardConfig,
    scaler: &'d dyn ScalerStrategy,
    backlight: Backlight<P>,
    dma: &'d mut DmaDescriptor,
    state: ControllerState,
    // commit mode of the layer being programmed
    mode: CommitMode,
    // backlight has been driven non-zero since bring-up
    lit: bool,
}

impl<'d, C: DisplayController, P: OutputPin> Compositor<'d, C, P> {
    /// Takes over `ctrl`. The descriptor must outlive the overlay, since
    /// the LCDC keeps fetching through it.
    pub fn new(
        ctrl: C,
        board: &'d BoardConfig,
        backlight: Backlight<P>,
        dma: &'d mut DmaDescriptor,
    ) -> Result<Self, SplashError> {
        board.validate()?;
        if ctrl.map().name != board.regs.name {
            return Err(SplashError::Config("lcdc: controller does not match board"));
        }
        if backlight.kind() != board.backlight {
            return Err(SplashError::Config("backlight: wiring does not match board"));
        }

        let scaler: &'d dyn ScalerStrategy = match ctrl.map().generation {
            Generation::Lcdc => &PHASE_TABLE,
            Generation::Xlcdc => &RATIO,
        };
        log::info!(
            "lcdc: {} on {}, {} scaler",
            ctrl.map().name,
            board.name,
            scaler.name()
        );

        Ok(Self {
            ctrl,
            board,
            scaler,
            backlight,
            dma,
            state: ControllerState::Off,
            mode: board.logo.commit,
            lit: false,
        })
    }

    /// Replaces the generation's default scaler.
    pub fn with_scaler(mut self, scaler: &'d dyn ScalerStrategy) -> Self {
        self.scaler = scaler;
        self
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn board(&self) -> &BoardConfig {
        self.board
    }

    pub fn scaler(&self) -> &dyn ScalerStrategy {
        self.scaler
    }

    pub fn controller(&self) -> &C {
        &self.ctrl
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.ctrl
    }

    /// Hands the controller back. The overlay keeps running.
    pub fn release(self) -> C {
        self.ctrl
    }

    // ── Register access ─────────────────────────────────────────────────

    fn wait(&mut self, cond: Condition) -> Result<(), SplashError> {
        let budget = self.board.poll;
        let state = self.state;
        poll_until(&mut self.ctrl, cond, budget)
            .map(|_| ())
            .map_err(|timeout| SplashError::Timeout { state, timeout })
    }

    fn sync_before(&mut self) -> Result<(), SplashError> {
        if self.ctrl.map().sync == SyncPolicy::BeforeWrite {
            self.wait(Condition::clear(Signals::SYNC_BUSY))?;
        }
        Ok(())
    }

    fn sync_after(&mut self) -> Result<(), SplashError> {
        if self.ctrl.map().sync == SyncPolicy::AfterWrite {
            self.wait(Condition::clear(Signals::SYNC_BUSY))?;
        }
        Ok(())
    }

    fn write(&mut self, reg: Reg, value: u32) -> Result<(), SplashError> {
        self.sync_before()?;
        self.ctrl.write_config(reg, value);
        self.sync_after()
    }

    // layer register write, committed at once in immediate mode
    fn layer_write(&mut self, layer: Layer, reg: Reg, value: u32) -> Result<(), SplashError> {
        self.write(reg, value)?;
        if self.mode == CommitMode::Immediate {
            self.commit(layer)?;
        }
        Ok(())
    }

    fn layer_cfg_write(&mut self, layer: Layer, index: u8, value: u32) -> Result<(), SplashError> {
        self.layer_write(layer, Reg::LayerCfg(layer, index), value)
    }

    /// Applies the staged configuration of `layer`.
    pub fn commit(&mut self, layer: Layer) -> Result<(), SplashError> {
        let map = self.ctrl.map();
        self.write(Reg::LayerEnable(layer), map.commit)?;
        if map.attr_update.is_some() {
            self.write(Reg::AttrUpdate, map.layer(layer).attr)?;
            self.wait(Condition::clear(Signals::ATTR_BUSY))?;
        }
        log::trace!("lcdc: commit {:?}", layer);
        Ok(())
    }

    // ── Timing engine ───────────────────────────────────────────────────

    /// Divider from the controller clock to the panel pixel rate, rounded
    /// to nearest.
    pub fn clock_divider(&self) -> Result<u32, SplashError> {
        let pixel = self
            .board
            .panel
            .pixel_rate_hz()
            .ok_or(SplashError::Config("panel: bad refresh rate"))?;
        let clock = self.board.clock_hz;

        let mut div = clock / pixel;
        if clock % pixel > pixel / 2 {
            div += 1;
        }

        let bias = self.ctrl.map().timing.clkdiv_bias;
        if div < bias.max(1) || div - bias > cfg0::CLKDIV_MAX {
            return Err(SplashError::Config("lcdc: pixel clock out of divider range"));
        }
        Ok(div)
    }

    pub fn timing_words(&self) -> Result<TimingWords, SplashError> {
        let p = &self.board.panel;
        let t = &self.ctrl.map().timing;

        let clock = if self.board.output == OutputInterface::Lvds {
            t.cfg0_bypass
                .ok_or(SplashError::Config("lcdc: no clock bypass for LVDS"))?
        } else {
            t.cfg0 | cfg0::clkdiv(self.clock_divider()? - t.clkdiv_bias)
        };
        let vbp = if t.vbp_minus_one {
            p.vbp.saturating_sub(1)
        } else {
            p.vbp
        };
        let minus_one = |v: u16| v.saturating_sub(1) as u32;

        let cfg = [
            clock,
            cfg1::vspw(minus_one(p.vpw)) | cfg1::hspw(minus_one(p.hpw)),
            cfg2::vbpw(vbp as u32) | cfg2::vfpw(minus_one(p.vfp)),
            cfg3::hbpw(minus_one(p.hbp)) | cfg3::hfpw(minus_one(p.hfp)),
            cfg4::rpf(minus_one(p.height)) | cfg4::ppl(minus_one(p.width)),
            t.cfg5,
        ];
        let cfg6 = match self.board.backlight {
            BacklightKind::Pwm => Some(t.cfg6 | cfg6::pwmcval(0)),
            BacklightKind::Gpio => None,
        };
        Ok(TimingWords { cfg, cfg6 })
    }

    /// Loads the timing engine. The controller must be off.
    pub fn program_timing(&mut self) -> Result<(), SplashError> {
        let words = self.timing_words()?;
        for (i, v) in words.cfg.into_iter().enumerate() {
            self.write(Reg::Cfg(i as u8), v)?;
        }
        if let Some(v) = words.cfg6 {
            self.write(Reg::Cfg(6), v)?;
        }
        log::debug!(
            "lcdc: timing {}x{} @ {} Hz",
            self.board.panel.width,
            self.board.panel.height,
            self.board.panel.refresh_hz
        );
        Ok(())
    }

    // ── Layers ──────────────────────────────────────────────────────────

    /// Base layer: flat `logo.base_color` over the whole panel.
    pub fn show_base(&mut self, mode: CommitMode) -> Result<(), SplashError> {
        let map = self.ctrl.map();
        let color = layer::rgb(self.board.logo.base_color);
        self.mode = mode;

        self.layer_cfg_write(Layer::Base, 1, map.base_mode)?;
        self.layer_cfg_write(Layer::Base, 3, color)?;
        if map.generation == Generation::Xlcdc {
            self.layer_cfg_write(Layer::Base, 4, 0)?;
        }
        if mode == CommitMode::Deferred {
            self.commit(Layer::Base)?;
        }
        Ok(())
    }

    pub fn place(&self, image: &NormalizedImage<'_>) -> LayerPlacement {
        self.placement_for(Size::new(image.width as u32, image.height as u32))
    }

    /// Placement of a `size` logo on this board's panel.
    pub fn placement_for(&self, size: Size) -> LayerPlacement {
        compute_placement(
            size,
            self.board.panel.size(),
            self.board.logo.scale,
            self.scaler,
        )
    }

    /// Programs the overlay with `image` at `placement`.
    pub fn show_layer(
        &mut self,
        image: &NormalizedImage<'_>,
        placement: &LayerPlacement,
        mode: CommitMode,
    ) -> Result<(), SplashError> {
        placement.validate()?;
        if !self.is_running() {
            return Err(SplashError::Config("lcdc: controller not running"));
        }

        let map = self.ctrl.map();
        let heo = Layer::Heo;
        let origin = image.origin_ptr() as usize as u32;
        self.mode = mode;

        self.layer_cfg_write(heo, 0, map.heo_cfg0)?;
        self.layer_cfg_write(heo, 1, map.formats.mode(image.format))?;
        self.layer_cfg_write(
            heo,
            2,
            layer::pos(placement.position.x as u32, placement.position.y as u32),
        )?;
        self.layer_cfg_write(
            heo,
            3,
            layer::size(placement.scaled.width, placement.scaled.height),
        )?;
        self.layer_cfg_write(
            heo,
            4,
            layer::size(placement.source.width, placement.source.height),
        )?;
        if image.stride != 0 {
            self.layer_cfg_write(heo, 5, image.stride as u32)?;
        }
        self.layer_cfg_write(heo, 9, layer::rgb(self.board.logo.base_color))?;

        if image.format.is_clut() {
            self.sync_before()?;
            self.ctrl.set_clut(heo, image.palette);
            self.sync_after()?;
        }
        if placement.scaling {
            let scaler = self.scaler;
            scaler.program(self, placement)?;
        }

        self.layer_write(heo, Reg::LayerAddr(heo), origin)?;
        if map.uses_descriptors() {
            let next = self.dma.link_self(origin);
            self.layer_write(heo, Reg::LayerCtrl(heo), layer::DFETCH)?;
            self.layer_write(heo, Reg::LayerNext(heo), next)?;
        }
        self.layer_cfg_write(heo, 12, map.heo_dma)?;

        if mode == CommitMode::Deferred {
            self.commit(heo)?;
        }

        log::info!(
            "lcdc: logo {}x{} {:?} at ({}, {}) as {}x{}",
            placement.source.width,
            placement.source.height,
            image.format,
            placement.position.x,
            placement.position.y,
            placement.scaled.width,
            placement.scaled.height
        );
        Ok(())
    }

    // ── Backlight ───────────────────────────────────────────────────────

    pub fn set_backlight(&mut self, level: u8) -> Result<(), SplashError> {
        // only the PWM compare value goes through the controller
        let pwm = self.backlight.kind() == BacklightKind::Pwm;
        if pwm {
            self.sync_before()?;
        }
        self.backlight.set(&mut self.ctrl, level)?;
        if pwm {
            self.sync_after()?;
        }
        if level != 0 {
            self.lit = true;
        }
        Ok(())
    }

    // waits out the panel power-up delay before the first non-zero level
    fn light<D: DelayNs>(&mut self, level: u8, delay: &mut D) -> Result<(), SplashError> {
        let ms = self.board.logo.backlight_delay_ms;
        if level != 0 && !self.lit && ms > 0 {
            log::debug!("lcdc: backlight in {} ms", ms);
            delay.delay_ms(ms);
        }
        self.set_backlight(level)
    }

    // ── Sequences ───────────────────────────────────────────────────────

    /// Full controller start: off, timing, on, dark, base colour.
    pub fn init(&mut self) -> Result<(), SplashError> {
        // reject unusable timing before touching the running controller
        self.timing_words()?;

        self.tear_down()?;
        self.program_timing()?;
        self.bring_up()?;
        self.set_backlight(0)?;
        self.show_base(self.board.logo.commit)
    }

    /// Shows `image` centred on the panel and lights the backlight.
    pub fn display<D: DelayNs>(
        &mut self,
        image: &NormalizedImage<'_>,
        delay: &mut D,
    ) -> Result<LayerPlacement, SplashError> {
        let placement = self.place(image);
        placement.validate()?;

        self.show_layer(image, &placement, self.board.logo.commit)?;
        self.light(self.board.logo.brightness, delay)?;
        Ok(placement)
    }
}

impl<C: DisplayController, P: OutputPin> RegisterSink for Compositor<'_, C, P> {
    fn layer_cfg(&mut self, index: u8, value: u32) -> Result<(), SplashError> {
        self.layer_cfg_write(Layer::Heo, index, value)
    }

    fn coefficients(&mut self, axis: Axis, table: &[u32]) -> Result<(), SplashError> {
        self.sync_before()?;
        self.ctrl.set_scaler_coefficients(axis, table);
        self.sync_after()
    }
}
