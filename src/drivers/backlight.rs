// Panel backlight.
// Either the controller's own PWM output (compare value in LCDC_CFG6) or
// an on/off GPIO, depending on how the board wires it.

use core::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

use super::lcdc::regmap::cfg6;
use super::lcdc::{DisplayController, Reg};
use crate::board::BacklightKind;

pub enum Backlight<P> {
    Pwm,
    Gpio(P),
}

impl<P: OutputPin> Backlight<P> {
    pub fn kind(&self) -> BacklightKind {
        match self {
            Backlight::Pwm => BacklightKind::Pwm,
            Backlight::Gpio(_) => BacklightKind::Gpio,
        }
    }

    /// 0..=255 duty on PWM; any non-zero level turns a GPIO backlight on.
    pub fn set<C>(&mut self, ctrl: &mut C, level: u8) -> Result<(), &'static str>
    where
        C: DisplayController + ?Sized,
    {
        match self {
            Backlight::Pwm => {
                let cfg = ctrl.read_config(Reg::Cfg(6)) & !cfg6::PWMCVAL_MASK;
                ctrl.write_config(Reg::Cfg(6), cfg | cfg6::pwmcval(level as u32));
            }
            Backlight::Gpio(pin) => {
                let res = if level != 0 {
                    pin.set_high()
                } else {
                    pin.set_low()
                };
                res.map_err(|_| "backlight: gpio write failed")?;
            }
        }
        log::debug!("lcdc: backlight {}", level);
        Ok(())
    }
}

/// Pin type for boards whose backlight is on the controller PWM.
pub struct NoPin;

impl ErrorType for NoPin {
    type Error = Infallible;
}

impl OutputPin for NoPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::drivers::lcdc::SAMA5D2_LCDC;
    use crate::drivers::lcdc::fake::FakeLcdc;

    /// Records the last level driven.
    #[derive(Default)]
    pub struct TestPin {
        pub high: Option<bool>,
        pub fail: bool,
    }

    #[derive(Debug)]
    pub struct PinFault;

    impl embedded_hal::digital::Error for PinFault {
        fn kind(&self) -> embedded_hal::digital::ErrorKind {
            embedded_hal::digital::ErrorKind::Other
        }
    }

    impl ErrorType for TestPin {
        type Error = PinFault;
    }

    impl OutputPin for TestPin {
        fn set_low(&mut self) -> Result<(), PinFault> {
            if self.fail {
                return Err(PinFault);
            }
            self.high = Some(false);
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), PinFault> {
            if self.fail {
                return Err(PinFault);
            }
            self.high = Some(true);
            Ok(())
        }
    }

    #[test]
    fn pwm_keeps_prescaler_bits() {
        let mut ctrl = FakeLcdc::new(&SAMA5D2_LCDC);
        ctrl.write_config(Reg::Cfg(6), cfg6::PWMPOL | cfg6::pwmps(6) | cfg6::pwmcval(0x12));

        let mut bl: Backlight<NoPin> = Backlight::Pwm;
        bl.set(&mut ctrl, 0xc0).unwrap();
        assert_eq!(
            ctrl.written(Reg::Cfg(6)),
            Some(cfg6::PWMPOL | cfg6::pwmps(6) | 0xc000)
        );
        assert_eq!(bl.kind(), BacklightKind::Pwm);
    }

    #[test]
    fn gpio_is_on_for_any_level() {
        let mut ctrl = FakeLcdc::new(&SAMA5D2_LCDC);
        let mut bl = Backlight::Gpio(TestPin::default());

        bl.set(&mut ctrl, 1).unwrap();
        let Backlight::Gpio(pin) = &bl else { unreachable!() };
        assert_eq!(pin.high, Some(true));

        bl.set(&mut ctrl, 0).unwrap();
        let Backlight::Gpio(pin) = &bl else { unreachable!() };
        assert_eq!(pin.high, Some(false));

        // never touches the controller
        assert!(ctrl.ops.is_empty());
    }

    #[test]
    fn gpio_error_is_reported() {
        let mut ctrl = FakeLcdc::new(&SAMA5D2_LCDC);
        let mut bl = Backlight::Gpio(TestPin {
            high: None,
            fail: true,
        });
        assert!(bl.set(&mut ctrl, 0xff).is_err());
    }
}
