// boot splash for Microchip LCDC / XLCDC display controllers

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod display;
pub mod drivers;
pub mod error;
pub mod kernel;
pub mod splash;

pub use board::BoardConfig;
pub use display::{Compositor, ControllerState, DmaDescriptor, LayerPlacement};
pub use error::SplashError;
pub use splash::{load_image, show_logo};
