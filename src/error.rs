// Splash failures.
// None of these is retried: the splash is abandoned and boot continues.
// Format and geometry errors are raised before the frame touches any
// register.

use core::fmt;

use smol_logo::{BmpError, GeometryError, RleError};

use crate::display::ControllerState;
use crate::kernel::PollTimeout;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplashError {
    Rle(RleError),
    Bmp(BmpError),
    Geometry(GeometryError),
    /// controller never acknowledged; `state` is the last one reached
    Timeout {
        state: ControllerState,
        timeout: PollTimeout,
    },
    Config(&'static str),
}

impl From<RleError> for SplashError {
    fn from(e: RleError) -> Self {
        SplashError::Rle(e)
    }
}

impl From<BmpError> for SplashError {
    fn from(e: BmpError) -> Self {
        SplashError::Bmp(e)
    }
}

impl From<GeometryError> for SplashError {
    fn from(e: GeometryError) -> Self {
        SplashError::Geometry(e)
    }
}

impl From<&'static str> for SplashError {
    fn from(e: &'static str) -> Self {
        SplashError::Config(e)
    }
}

impl fmt::Display for SplashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplashError::Rle(e) => write!(f, "{}", e),
            SplashError::Bmp(e) => write!(f, "{}", e),
            SplashError::Geometry(e) => write!(f, "layer: {}", e),
            SplashError::Timeout { state, timeout } => {
                write!(f, "lcdc: {} in state {}", timeout, state)
            }
            SplashError::Config(msg) => f.write_str(msg),
        }
    }
}
