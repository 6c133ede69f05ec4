// Controller bring-up and tear-down.
//
// Stages come up strictly in order, each one requested through LCDC_EN and
// acknowledged in LCDC_SR before the next:
//
//   Clock -> Sync -> Display -> Scan -> Serial -> Pwm
//
// Scan exists on XLCDC only and acknowledges by its status bit clearing.
// Serial is the DSI command stage, Pwm the controller backlight output;
// both are skipped when the board does not use them. Tear-down walks the
// same list backwards through LCDC_DIS.

use core::fmt;

use embedded_hal::digital::OutputPin;

use super::Compositor;
use crate::board::{BacklightKind, OutputInterface};
use crate::drivers::lcdc::{DisplayController, RegisterMap, Signals};
use crate::error::SplashError;
use crate::kernel::{Condition, Level};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControllerState {
    #[default]
    Off,
    ClockEnabled,
    SyncEnabled,
    DisplayEnabled,
    ScanEnabled,
    SerialEnabled,
    PwmEnabled,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ControllerState::Off => "off",
            ControllerState::ClockEnabled => "clock",
            ControllerState::SyncEnabled => "sync",
            ControllerState::DisplayEnabled => "display",
            ControllerState::ScanEnabled => "scan",
            ControllerState::SerialEnabled => "serial",
            ControllerState::PwmEnabled => "pwm",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Clock,
    Sync,
    Display,
    Scan,
    Serial,
    Pwm,
}

impl Stage {
    pub const ORDER: [Stage; 6] = [
        Stage::Clock,
        Stage::Sync,
        Stage::Display,
        Stage::Scan,
        Stage::Serial,
        Stage::Pwm,
    ];

    pub const fn signal(self) -> Signals {
        match self {
            Stage::Clock => Signals::CLOCK,
            Stage::Sync => Signals::SYNC,
            Stage::Display => Signals::DISPLAY,
            Stage::Scan => Signals::SCAN,
            Stage::Serial => Signals::SERIAL,
            Stage::Pwm => Signals::PWM,
        }
    }

    /// State once this stage is acknowledged.
    pub const fn reached(self) -> ControllerState {
        match self {
            Stage::Clock => ControllerState::ClockEnabled,
            Stage::Sync => ControllerState::SyncEnabled,
            Stage::Display => ControllerState::DisplayEnabled,
            Stage::Scan => ControllerState::ScanEnabled,
            Stage::Serial => ControllerState::SerialEnabled,
            Stage::Pwm => ControllerState::PwmEnabled,
        }
    }

    /// Status level that acknowledges an enable request.
    pub const fn enabled_level(self) -> Level {
        match self {
            Stage::Scan => Level::Clear,
            _ => Level::Set,
        }
    }

    pub fn applies(self, map: &RegisterMap, output: OutputInterface, backlight: BacklightKind) -> bool {
        match self {
            Stage::Scan => map.has_scan_stage(),
            Stage::Serial => output == OutputInterface::MipiDsi && map.has_serial_stage(),
            Stage::Pwm => backlight == BacklightKind::Pwm,
            _ => true,
        }
    }
}

/// Stages this controller and board go through, in bring-up order.
pub fn stages(
    map: &'static RegisterMap,
    output: OutputInterface,
    backlight: BacklightKind,
) -> impl DoubleEndedIterator<Item = Stage> {
    Stage::ORDER
        .into_iter()
        .filter(move |s| s.applies(map, output, backlight))
}

/// State of a fully running controller.
pub fn running_state(
    map: &'static RegisterMap,
    output: OutputInterface,
    backlight: BacklightKind,
) -> ControllerState {
    stages(map, output, backlight)
        .last()
        .map_or(ControllerState::Off, Stage::reached)
}

// state left once `stage` is disabled again
fn state_below(
    stage: Stage,
    map: &'static RegisterMap,
    output: OutputInterface,
    backlight: BacklightKind,
) -> ControllerState {
    stages(map, output, backlight)
        .take_while(|s| *s != stage)
        .last()
        .map_or(ControllerState::Off, Stage::reached)
}

impl<C: DisplayController, P: OutputPin> Compositor<'_, C, P> {
    pub fn is_running(&self) -> bool {
        self.state != ControllerState::Off
            && self.state == running_state(self.ctrl.map(), self.board.output, self.board.backlight)
    }

    /// Enables every stage in order, waiting for each acknowledgement.
    pub fn bring_up(&mut self) -> Result<(), SplashError> {
        let (map, output, backlight) = (self.ctrl.map(), self.board.output, self.board.backlight);
        for stage in stages(map, output, backlight) {
            self.request(stage, true)?;
            self.state = stage.reached();
            log::debug!("lcdc: {:?} up, state {}", stage, self.state);
        }
        Ok(())
    }

    /// Disables every stage in reverse order. Ends in `Off`.
    pub fn tear_down(&mut self) -> Result<(), SplashError> {
        let (map, output, backlight) = (self.ctrl.map(), self.board.output, self.board.backlight);
        for stage in stages(map, output, backlight).rev() {
            self.request(stage, false)?;
            self.state = state_below(stage, map, output, backlight);
            log::debug!("lcdc: {:?} down, state {}", stage, self.state);
        }
        self.lit = false;
        Ok(())
    }

    fn request(&mut self, stage: Stage, on: bool) -> Result<(), SplashError> {
        let signal = stage.signal();
        self.sync_before()?;
        if on {
            self.ctrl.enable(signal);
        } else {
            self.ctrl.disable(signal);
        }
        self.sync_after()?;

        let level = if on {
            stage.enabled_level()
        } else {
            stage.enabled_level().opposite()
        };
        self.wait(Condition {
            signals: signal,
            level,
        })
    }
}
