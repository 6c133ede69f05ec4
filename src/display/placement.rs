// Where the logo lands on the panel: scaled size, centred position and
// the scaler factors for that size.

use embedded_graphics_core::geometry::{Point, Size};
use embedded_graphics_core::primitives::Rectangle;
use smol_logo::GeometryError;

use super::scaler::ScalerStrategy;
use crate::board::MAX_ACTIVE;
use crate::drivers::lcdc::Axis;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerPlacement {
    pub source: Size,
    pub scaled: Size,
    pub position: Point,
    pub x_factor: u32,
    pub y_factor: u32,
    pub scaling: bool,
}

impl LayerPlacement {
    /// Panel area covered, before clipping to the panel.
    pub fn area(&self) -> Rectangle {
        Rectangle::new(self.position, self.scaled)
    }

    /// Layer size fields are 11 bits wide.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let max = MAX_ACTIVE as u32;
        for s in [self.source, self.scaled] {
            if s.width == 0 || s.height == 0 || s.width > max || s.height > max {
                return Err(GeometryError::TooLarge {
                    width: s.width as i32,
                    height: s.height as i32,
                });
            }
        }
        Ok(())
    }
}

/// `size * (8 + scale) / 8`, or `size` unchanged for scale 0.
pub fn scaled_size(size: Size, scale: u8) -> Size {
    if scale == 0 {
        return size;
    }
    let k = 8 + scale as u32;
    Size::new(size.width * k / 8, size.height * k / 8)
}

// offset along one axis; an oversized layer sits at 0 and is clipped
fn center(panel: u32, scaled: u32) -> i32 {
    if scaled >= panel {
        0
    } else {
        ((panel - scaled) / 2) as i32
    }
}

pub fn centered(panel: Size, scaled: Size) -> Point {
    Point::new(center(panel.width, scaled.width), center(panel.height, scaled.height))
}

pub fn compute_placement(
    image: Size,
    panel: Size,
    scale: u8,
    scaler: &dyn ScalerStrategy,
) -> LayerPlacement {
    let scaled = scaled_size(image, scale);
    let scaling = scaled != image;
    let (x_factor, y_factor) = if scaling {
        (
            scaler.factor(image.width, scaled.width, Axis::Horizontal),
            scaler.factor(image.height, scaled.height, Axis::Vertical),
        )
    } else {
        (0, 0)
    };

    LayerPlacement {
        source: image,
        scaled,
        position: centered(panel, scaled),
        x_factor,
        y_factor,
        scaling,
    }
}
