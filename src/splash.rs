// Boot logo pipeline.
//
// blob -> (RLE decode into scratch) -> BMP inspect -> placement check
//      -> BMP interpret -> controller init if needed -> overlay -> backlight
//
// Everything that can reject the logo runs before the first register
// write, so a bad logo leaves the display untouched. Errors are logged
// once here and handed back; the caller boots on without a splash.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_graphics_core::geometry::Size;
use smol_logo::bmp::{self, NormalizedImage};
use smol_logo::rle;

use crate::display::{Compositor, LayerPlacement};
use crate::drivers::lcdc::DisplayController;
use crate::error::SplashError;

/// Turns a logo blob into a scan-out ready image.
///
/// An RLE stream is decoded into `scratch` and interpreted there. Anything
/// else is taken as a BMP container, cut to the size its header declares
/// and interpreted in place. Packed-pixel bit order is fixed up in
/// whichever buffer holds the image.
pub fn load_image<'b>(
    blob: &'b mut [u8],
    scratch: &'b mut [u8],
) -> Result<NormalizedImage<'b>, SplashError> {
    let bytes = unpack(blob, scratch)?;
    Ok(bmp::interpret(bytes)?)
}

// The BMP bytes of `blob`: decoded into `scratch`, or the blob itself.
fn unpack<'b>(blob: &'b mut [u8], scratch: &'b mut [u8]) -> Result<&'b mut [u8], SplashError> {
    if rle::is_rle(blob) {
        let decoded = rle::decode(blob, scratch)?;
        log::debug!("splash: rle {} -> {} bytes", blob.len(), decoded.len());
        return Ok(decoded.into_mut());
    }

    let len = bmp::bmp_size(blob).map_or(blob.len(), |n| blob.len().min(n as usize));
    Ok(&mut blob[..len])
}

/// Shows the logo in `blob`, bringing the controller up first if it is
/// not running yet.
pub fn show_logo<C, P, D>(
    comp: &mut Compositor<'_, C, P>,
    blob: &mut [u8],
    scratch: &mut [u8],
    delay: &mut D,
) -> Result<LayerPlacement, SplashError>
where
    C: DisplayController,
    P: OutputPin,
    D: DelayNs,
{
    let res = render(comp, blob, scratch, delay);
    match &res {
        Ok(p) => log::info!(
            "splash: shown {}x{} at ({}, {})",
            p.scaled.width,
            p.scaled.height,
            p.position.x,
            p.position.y
        ),
        Err(e) => log::warn!("splash: {}", e),
    }
    res
}

fn render<C, P, D>(
    comp: &mut Compositor<'_, C, P>,
    blob: &mut [u8],
    scratch: &mut [u8],
    delay: &mut D,
) -> Result<LayerPlacement, SplashError>
where
    C: DisplayController,
    P: OutputPin,
    D: DelayNs,
{
    // placement is checked before interpret rewrites packed pixels in place
    let bytes = unpack(blob, scratch)?;
    let info = bmp::inspect(bytes)?;
    let size = Size::new(info.layout.width as u32, info.layout.height as u32);
    comp.placement_for(size).validate()?;
    let image = bmp::interpret(bytes)?;

    if !comp.is_running() {
        comp.init()?;
    }
    comp.display(&image, delay)
}
