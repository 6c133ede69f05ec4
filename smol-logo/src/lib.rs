// smol-logo: minimal no_std codecs for boot splash images.
// rle: "RLE." token stream decoder, plus the reference encoder
// bmp: BMP container interpreter; picks a layer pixel format, computes
//      row geometry for scan-out and normalizes packed-pixel bit order

#![cfg_attr(not(test), no_std)]

pub mod bmp;
pub mod rle;

pub use bmp::{BmpError, BmpInfo, GeometryError, NormalizedImage, PixelFormat, RowOrder, inspect, interpret};
pub use rle::{Decoded, RleError, decode};
