// BMP container interpreter for scan-out layers.
//
// Picks a layer pixel format from bit depth + compression, computes the
// row geometry the layer fetch needs and rewrites packed-pixel bytes in
// place for the controller's bit order. No pixel is copied or converted.
//
// Fetch model: the layer reads `row_bytes`, then adds the signed stride
// to its fetch address. Rows come out bottom-to-top on screen.

use core::fmt;

pub const FILE_HEADER_LEN: usize = 14;
pub const HEADER_LEN: usize = 54;

const OFF_SIZE: usize = 2;
const OFF_PIXELS: usize = 10;
const OFF_INFO_SIZE: usize = 14;
const OFF_WIDTH: usize = 18;
const OFF_HEIGHT: usize = 22;
const OFF_PLANES: usize = 26;
const OFF_BPP: usize = 28;
const OFF_COMPRESSION: usize = 30;
const OFF_COLORS_USED: usize = 46;
const OFF_MASKS: usize = 54;

pub const BI_RGB: u32 = 0;
pub const BI_BITFIELDS: u32 = 3;

const MASKS_ARGB8888: ColorMasks = ColorMasks::new(0x00ff_0000, 0x0000_ff00, 0x0000_00ff);
const MASKS_RGB1555: ColorMasks = ColorMasks::new(0x7c00, 0x03e0, 0x001f);
const MASKS_RGB565: ColorMasks = ColorMasks::new(0xf800, 0x07e0, 0x001f);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorMasks {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
}

impl ColorMasks {
    pub const fn new(red: u32, green: u32, blue: u32) -> Self {
        Self { red, green, blue }
    }
}

impl fmt::Display for ColorMasks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r={:#x} g={:#x} b={:#x}", self.red, self.green, self.blue)
    }
}

/// Layer pixel format selected for an image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    Argb8888,
    Rgb888Packed,
    Rgb1555,
    Rgb565,
    Clut8,
    Clut4,
    Clut1,
}

impl PixelFormat {
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            PixelFormat::Argb8888 => 32,
            PixelFormat::Rgb888Packed => 24,
            PixelFormat::Rgb1555 | PixelFormat::Rgb565 => 16,
            PixelFormat::Clut8 => 8,
            PixelFormat::Clut4 => 4,
            PixelFormat::Clut1 => 1,
        }
    }

    /// Palette entries the format indexes; 0 for true colour.
    pub const fn clut_entries(self) -> usize {
        match self {
            PixelFormat::Clut8 => 256,
            PixelFormat::Clut4 => 16,
            PixelFormat::Clut1 => 2,
            _ => 0,
        }
    }

    pub const fn is_clut(self) -> bool {
        self.clut_entries() != 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowOrder {
    /// positive height, first stored row is the bottom of the picture
    BottomUp,
    /// negative height
    TopDown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeometryError {
    NonPositiveWidth { width: i32 },
    ZeroHeight,
    TooLarge { width: i32, height: i32 },
    Overflow,
    PixelsOutOfBounds { end: usize, len: usize },
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            GeometryError::NonPositiveWidth { width } => write!(f, "width {} not positive", width),
            GeometryError::ZeroHeight => f.write_str("zero height"),
            GeometryError::TooLarge { width, height } => {
                write!(f, "{}x{} exceeds layer limits", width, height)
            }
            GeometryError::Overflow => f.write_str("stride arithmetic overflows"),
            GeometryError::PixelsOutOfBounds { end, len } => {
                write!(f, "pixel data ends at {} but buffer holds {}", end, len)
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BmpError {
    BadSignature,
    Truncated {
        needed: usize,
        available: usize,
    },
    Unsupported {
        bits_per_pixel: u16,
        compression: u32,
        masks: Option<ColorMasks>,
    },
    Geometry(GeometryError),
}

impl From<GeometryError> for BmpError {
    fn from(e: GeometryError) -> Self {
        BmpError::Geometry(e)
    }
}

impl fmt::Display for BmpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BmpError::BadSignature => f.write_str("bmp: no 'BM' signature"),
            BmpError::Truncated { needed, available } => {
                write!(f, "bmp: header needs {} bytes, have {}", needed, available)
            }
            BmpError::Unsupported {
                bits_per_pixel,
                compression,
                masks: Some(m),
            } => write!(
                f,
                "bmp: unsupported {} bpp, compression {}, masks {}",
                bits_per_pixel, compression, m
            ),
            BmpError::Unsupported {
                bits_per_pixel,
                compression,
                masks: None,
            } => write!(
                f,
                "bmp: unsupported {} bpp, compression {}",
                bits_per_pixel, compression
            ),
            BmpError::Geometry(e) => write!(f, "bmp: {}", e),
        }
    }
}

fn le16(b: &[u8], off: usize) -> u16 {
    u16::from_le_bytes([b[off], b[off + 1]])
}

fn le32(b: &[u8], off: usize) -> u32 {
    u32::from_le_bytes([b[off], b[off + 1], b[off + 2], b[off + 3]])
}

/// Container size from the file header, if `bytes` is a BMP.
pub fn bmp_size(bytes: &[u8]) -> Option<u32> {
    if bytes.len() < OFF_SIZE + 4 || &bytes[..2] != b"BM" {
        return None;
    }
    Some(le32(bytes, OFF_SIZE))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BmpHeader {
    pub file_size: u32,
    pub pixel_offset: u32,
    pub header_size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    pub colors_used: u32,
    /// Present only for BITFIELDS images.
    pub masks: Option<ColorMasks>,
}

impl BmpHeader {
    pub fn parse(buf: &[u8]) -> Result<Self, BmpError> {
        if buf.len() < 2 || &buf[..2] != b"BM" {
            return Err(BmpError::BadSignature);
        }
        if buf.len() < HEADER_LEN {
            return Err(BmpError::Truncated {
                needed: HEADER_LEN,
                available: buf.len(),
            });
        }

        let compression = le32(buf, OFF_COMPRESSION);
        let masks = if compression == BI_BITFIELDS {
            if buf.len() < OFF_MASKS + 12 {
                return Err(BmpError::Truncated {
                    needed: OFF_MASKS + 12,
                    available: buf.len(),
                });
            }
            Some(ColorMasks::new(
                le32(buf, OFF_MASKS),
                le32(buf, OFF_MASKS + 4),
                le32(buf, OFF_MASKS + 8),
            ))
        } else {
            None
        };

        Ok(Self {
            file_size: le32(buf, OFF_SIZE),
            pixel_offset: le32(buf, OFF_PIXELS),
            header_size: le32(buf, OFF_INFO_SIZE),
            width: le32(buf, OFF_WIDTH) as i32,
            height: le32(buf, OFF_HEIGHT) as i32,
            planes: le16(buf, OFF_PLANES),
            bits_per_pixel: le16(buf, OFF_BPP),
            compression,
            colors_used: le32(buf, OFF_COLORS_USED),
            masks,
        })
    }

    pub fn pixel_format(&self) -> Result<PixelFormat, BmpError> {
        let rgb = self.compression == BI_RGB;
        let format = match (self.bits_per_pixel, self.masks) {
            (32, _) if rgb => Some(PixelFormat::Argb8888),
            (32, Some(MASKS_ARGB8888)) => Some(PixelFormat::Argb8888),
            (24, _) if rgb => Some(PixelFormat::Rgb888Packed),
            (16, _) if rgb => Some(PixelFormat::Rgb1555),
            (16, Some(MASKS_RGB1555)) => Some(PixelFormat::Rgb1555),
            (16, Some(MASKS_RGB565)) => Some(PixelFormat::Rgb565),
            (8, _) if rgb => Some(PixelFormat::Clut8),
            (4, _) if rgb => Some(PixelFormat::Clut4),
            (1, _) if rgb => Some(PixelFormat::Clut1),
            _ => None,
        };

        format.ok_or_else(|| {
            if matches!(self.bits_per_pixel, 1 | 4 | 8) && !rgb {
                log::warn!(
                    "bmp: {} bpp palette image with compression {}, only uncompressed is shown",
                    self.bits_per_pixel,
                    self.compression
                );
            }
            let err = BmpError::Unsupported {
                bits_per_pixel: self.bits_per_pixel,
                compression: self.compression,
                masks: self.masks,
            };
            log::warn!("{}", err);
            err
        })
    }

    pub fn row_order(&self) -> RowOrder {
        if self.height < 0 {
            RowOrder::TopDown
        } else {
            RowOrder::BottomUp
        }
    }
}

/// Row geometry for one image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowLayout {
    pub width: u16,
    pub height: u16,
    pub row_bytes: usize,
    pub row_padding: usize,
    pub origin: usize,
    pub stride: i32,
}

impl RowLayout {
    pub fn new(hdr: &BmpHeader, format: PixelFormat) -> Result<Self, GeometryError> {
        if hdr.width <= 0 {
            return Err(GeometryError::NonPositiveWidth { width: hdr.width });
        }
        if hdr.height == 0 {
            return Err(GeometryError::ZeroHeight);
        }

        let too_large = GeometryError::TooLarge {
            width: hdr.width,
            height: hdr.height,
        };
        let width = u16::try_from(hdr.width).map_err(|_| too_large)?;
        let height = u16::try_from(hdr.height.unsigned_abs()).map_err(|_| too_large)?;

        let bits = (width as usize)
            .checked_mul(format.bits_per_pixel() as usize)
            .ok_or(GeometryError::Overflow)?;
        let row_bytes = bits.div_ceil(8);
        let row_padding = (4 - row_bytes % 4) % 4;
        let row_stride = row_bytes + row_padding;

        let (origin, stride) = match hdr.row_order() {
            RowOrder::BottomUp => (0, row_padding as isize),
            RowOrder::TopDown => {
                let origin = row_stride
                    .checked_mul(height as usize - 1)
                    .ok_or(GeometryError::Overflow)?;
                let back = row_bytes
                    .checked_mul(2)
                    .and_then(|b| b.checked_add(row_padding))
                    .and_then(|b| isize::try_from(b).ok())
                    .ok_or(GeometryError::Overflow)?;
                (origin, -back)
            }
        };
        let stride = i32::try_from(stride).map_err(|_| GeometryError::Overflow)?;

        Ok(Self {
            width,
            height,
            row_bytes,
            row_padding,
            origin,
            stride,
        })
    }

    pub fn row_stride(&self) -> usize {
        self.row_bytes + self.row_padding
    }

    /// Bytes covered by all stored rows, padding included.
    pub fn region(&self) -> Result<usize, GeometryError> {
        self.row_stride()
            .checked_mul(self.height as usize)
            .ok_or(GeometryError::Overflow)
    }
}

// ── Bit order ───────────────────────────────────────────────────────────

const NIBBLE_REVERSE: [u8; 16] = [
    0x0, 0x8, 0x4, 0xc, 0x2, 0xa, 0x6, 0xe, 0x1, 0x9, 0x5, 0xd, 0x3, 0xb, 0x7, 0xf,
];

/// Mirror the bits of a byte (bit 0 <-> bit 7).
#[inline]
pub fn reverse_bits(b: u8) -> u8 {
    NIBBLE_REVERSE[(b & 0xf) as usize] << 4 | NIBBLE_REVERSE[(b >> 4) as usize]
}

#[inline]
pub fn swap_nibbles(b: u8) -> u8 {
    (b << 4) | (b >> 4)
}

/// Rewrites packed 1bpp/4bpp bytes into the layer's bit order; other
/// formats are left untouched.
pub fn fix_bit_order(pixels: &mut [u8], format: PixelFormat) {
    let f: fn(u8) -> u8 = match format {
        PixelFormat::Clut1 => reverse_bits,
        PixelFormat::Clut4 => swap_nibbles,
        _ => return,
    };
    for b in pixels.iter_mut() {
        *b = f(*b);
    }
}

// ── Interpretation ──────────────────────────────────────────────────────

/// A BMP resolved into what a scan-out layer needs.
#[derive(Clone, Copy, Debug)]
pub struct NormalizedImage<'a> {
    pub format: PixelFormat,
    /// All stored rows, padding included.
    pub pixels: &'a [u8],
    /// BGRx entries, at most `format.clut_entries()`.
    pub palette: &'a [u8],
    pub width: u16,
    pub height: u16,
    pub row_bytes: usize,
    pub row_padding: usize,
    /// Offset in `pixels` of the first fetched row.
    pub origin: usize,
    /// Added to the fetch address after each row.
    pub stride: i32,
    pub row_order: RowOrder,
    /// Width does not fill the last packed byte (odd 4bpp, 1bpp not /8).
    pub misaligned: bool,
}

impl<'a> NormalizedImage<'a> {
    pub fn row_stride(&self) -> usize {
        self.row_bytes + self.row_padding
    }

    /// Address of the first fetched row.
    pub fn origin_ptr(&self) -> *const u8 {
        self.pixels.as_ptr().wrapping_add(self.origin)
    }

    /// Rows in the order the layer fetches them (bottom row of the picture
    /// first).
    pub fn fetch_rows(&self) -> FetchRows<'a> {
        FetchRows {
            pixels: self.pixels,
            at: self.origin as isize,
            row_bytes: self.row_bytes,
            step: self.row_bytes as isize + self.stride as isize,
            remaining: self.height,
        }
    }
}

pub struct FetchRows<'a> {
    pixels: &'a [u8],
    at: isize,
    row_bytes: usize,
    step: isize,
    remaining: u16,
}

impl<'a> Iterator for FetchRows<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.remaining == 0 {
            return None;
        }
        let start = usize::try_from(self.at).ok()?;
        let row = self.pixels.get(start..start + self.row_bytes)?;
        self.at += self.step;
        self.remaining -= 1;
        Some(row)
    }
}

/// Everything `interpret` checks, without touching the pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BmpInfo {
    pub header: BmpHeader,
    pub format: PixelFormat,
    pub layout: RowLayout,
    /// Pixel region, padding included.
    pub pixels: (usize, usize),
}

/// Validates a BMP without modifying it.
pub fn inspect(buf: &[u8]) -> Result<BmpInfo, BmpError> {
    let header = BmpHeader::parse(buf)?;
    let format = header.pixel_format()?;
    let layout = RowLayout::new(&header, format)?;

    let start = header.pixel_offset as usize;
    let end = start
        .checked_add(layout.region()?)
        .ok_or(GeometryError::Overflow)?;
    if end > buf.len() {
        return Err(GeometryError::PixelsOutOfBounds {
            end,
            len: buf.len(),
        }
        .into());
    }

    Ok(BmpInfo {
        header,
        format,
        layout,
        pixels: (start, end),
    })
}

/// Interprets a BMP in place: validates it, fixes packed-pixel bit order
/// and returns the layer view. On error `buf` is untouched; on success
/// 1 and 4 bpp pixels have been rewritten, so a second call on the same
/// buffer undoes the fix-up.
pub fn interpret(buf: &mut [u8]) -> Result<NormalizedImage<'_>, BmpError> {
    let BmpInfo {
        header: hdr,
        format,
        layout,
        pixels: (start, end),
    } = inspect(buf)?;

    let misaligned = match format {
        PixelFormat::Clut4 => layout.width % 2 != 0,
        PixelFormat::Clut1 => layout.width % 8 != 0,
        _ => false,
    };
    if misaligned {
        log::warn!(
            "bmp: width {} does not fill a whole byte at {} bpp",
            layout.width,
            format.bits_per_pixel()
        );
    }

    fix_bit_order(&mut buf[start..end], format);

    let buf: &[u8] = buf;
    let pal_start = (hdr.header_size as usize).saturating_add(FILE_HEADER_LEN);
    let pal_end = start.min(pal_start.saturating_add(format.clut_entries() * 4));
    let palette = buf.get(pal_start..pal_end).unwrap_or(&[]);

    log::debug!(
        "bmp: {}x{} {:?} {:?} row={}+{} stride={}",
        layout.width,
        layout.height,
        format,
        hdr.row_order(),
        layout.row_bytes,
        layout.row_padding,
        layout.stride
    );

    Ok(NormalizedImage {
        format,
        pixels: &buf[start..end],
        palette,
        width: layout.width,
        height: layout.height,
        row_bytes: layout.row_bytes,
        row_padding: layout.row_padding,
        origin: layout.origin,
        stride: layout.stride,
        row_order: hdr.row_order(),
        misaligned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(
        width: i32,
        height: i32,
        bpp: u16,
        compression: u32,
        masks: Option<[u32; 3]>,
        palette: &[u8],
        pixels: &[u8],
    ) -> Vec<u8> {
        let mut extra = Vec::new();
        if let Some(m) = masks {
            for v in m {
                extra.extend_from_slice(&v.to_le_bytes());
            }
        }
        let offset = (HEADER_LEN + extra.len() + palette.len()) as u32;
        let size = offset + pixels.len() as u32;

        let mut b = Vec::new();
        b.extend_from_slice(b"BM");
        b.extend_from_slice(&size.to_le_bytes());
        b.extend_from_slice(&[0; 4]);
        b.extend_from_slice(&offset.to_le_bytes());
        b.extend_from_slice(&40u32.to_le_bytes());
        b.extend_from_slice(&width.to_le_bytes());
        b.extend_from_slice(&height.to_le_bytes());
        b.extend_from_slice(&1u16.to_le_bytes());
        b.extend_from_slice(&bpp.to_le_bytes());
        b.extend_from_slice(&compression.to_le_bytes());
        b.extend_from_slice(&[0; 20]);
        assert_eq!(b.len(), HEADER_LEN);
        b.extend_from_slice(&extra);
        b.extend_from_slice(palette);
        b.extend_from_slice(pixels);
        b
    }

    #[test]
    fn bit_order_transforms_are_involutions() {
        for b in 0..=255u8 {
            assert_eq!(reverse_bits(reverse_bits(b)), b);
            assert_eq!(swap_nibbles(swap_nibbles(b)), b);
            assert_eq!(reverse_bits(b), b.reverse_bits());
        }
        assert_eq!(reverse_bits(0x01), 0x80);
        assert_eq!(swap_nibbles(0x12), 0x21);
    }

    #[test]
    fn size_probe() {
        let img = build(2, 2, 24, BI_RGB, None, &[], &[0; 16]);
        assert_eq!(bmp_size(&img), Some(img.len() as u32));
        assert_eq!(bmp_size(b"RLE.\0\0\0\0"), None);
        assert_eq!(bmp_size(b"BM"), None);
    }

    #[test]
    fn format_dispatch() {
        let cases: &[(u16, u32, Option<[u32; 3]>, PixelFormat)] = &[
            (32, BI_RGB, None, PixelFormat::Argb8888),
            (32, BI_BITFIELDS, Some([0xff0000, 0xff00, 0xff]), PixelFormat::Argb8888),
            (24, BI_RGB, None, PixelFormat::Rgb888Packed),
            (16, BI_RGB, None, PixelFormat::Rgb1555),
            (16, BI_BITFIELDS, Some([0x7c00, 0x03e0, 0x001f]), PixelFormat::Rgb1555),
            (16, BI_BITFIELDS, Some([0xf800, 0x07e0, 0x001f]), PixelFormat::Rgb565),
            (8, BI_RGB, None, PixelFormat::Clut8),
            (4, BI_RGB, None, PixelFormat::Clut4),
            (1, BI_RGB, None, PixelFormat::Clut1),
        ];
        for &(bpp, comp, masks, want) in cases {
            let img = build(8, 1, bpp, comp, masks, &[], &[0; 32]);
            assert_eq!(BmpHeader::parse(&img).unwrap().pixel_format(), Ok(want));
        }
    }

    #[test]
    fn rejects_unknown_16bpp_masks_with_diagnostics() {
        let mut img = build(4, 1, 16, BI_BITFIELDS, Some([0x00ff, 0xff00, 0]), &[], &[0; 8]);
        let err = interpret(&mut img).unwrap_err();
        assert_eq!(
            err,
            BmpError::Unsupported {
                bits_per_pixel: 16,
                compression: BI_BITFIELDS,
                masks: Some(ColorMasks::new(0x00ff, 0xff00, 0)),
            }
        );
    }

    #[test]
    fn rejects_other_depths_and_32bpp_masks() {
        let mut img = build(4, 1, 2, BI_RGB, None, &[], &[0; 4]);
        assert!(matches!(
            interpret(&mut img),
            Err(BmpError::Unsupported { bits_per_pixel: 2, masks: None, .. })
        ));

        let mut img = build(1, 1, 32, BI_BITFIELDS, Some([0xff, 0xff00, 0xff0000]), &[], &[0; 4]);
        assert!(matches!(
            interpret(&mut img),
            Err(BmpError::Unsupported { bits_per_pixel: 32, masks: Some(_), .. })
        ));

        // palette depths must be uncompressed
        let mut img = build(4, 1, 8, 1, None, &[], &[0; 4]);
        assert!(matches!(
            interpret(&mut img),
            Err(BmpError::Unsupported { bits_per_pixel: 8, compression: 1, masks: None })
        ));
        let mut img = build(8, 1, 4, 2, None, &[], &[0; 4]);
        assert!(matches!(
            interpret(&mut img),
            Err(BmpError::Unsupported { bits_per_pixel: 4, compression: 2, masks: None })
        ));
    }

    #[test]
    fn signature_and_truncation() {
        let mut img = build(1, 1, 24, BI_RGB, None, &[], &[0; 4]);
        img[0] = b'X';
        assert_eq!(interpret(&mut img).unwrap_err(), BmpError::BadSignature);

        let mut short = b"BM\0\0\0\0".to_vec();
        assert_eq!(
            interpret(&mut short).unwrap_err(),
            BmpError::Truncated {
                needed: HEADER_LEN,
                available: 6
            }
        );
    }

    #[test]
    fn geometry_is_validated_before_fixup() {
        let mut img = build(0, 1, 24, BI_RGB, None, &[], &[]);
        assert_eq!(
            interpret(&mut img).unwrap_err(),
            BmpError::Geometry(GeometryError::NonPositiveWidth { width: 0 })
        );

        let mut img = build(1, 0, 24, BI_RGB, None, &[], &[]);
        assert_eq!(
            interpret(&mut img).unwrap_err(),
            BmpError::Geometry(GeometryError::ZeroHeight)
        );

        let mut img = build(70_000, 1, 24, BI_RGB, None, &[], &[]);
        assert!(matches!(
            interpret(&mut img),
            Err(BmpError::Geometry(GeometryError::TooLarge { .. }))
        ));

        // 1bpp, 8 wide, 4 rows need 16 bytes; supply 8
        let mut img = build(8, 4, 1, BI_RGB, None, &[0; 8], &[0x01; 8]);
        let before = img.clone();
        assert!(matches!(
            interpret(&mut img),
            Err(BmpError::Geometry(GeometryError::PixelsOutOfBounds { .. }))
        ));
        assert_eq!(img, before);
    }

    #[test]
    fn packed_rows_and_padding() {
        // 4bpp, width 5: 3 row bytes + 1 padding, odd width flagged
        let mut img = build(5, 2, 4, BI_RGB, None, &[0; 64], &[0x12, 0x34, 0x50, 0, 0xab, 0xcd, 0xe0, 0]);
        let n = interpret(&mut img).unwrap();
        assert_eq!(n.format, PixelFormat::Clut4);
        assert_eq!((n.row_bytes, n.row_padding, n.row_stride()), (3, 1, 4));
        assert!(n.misaligned);
        assert_eq!(n.palette.len(), 64);
        assert_eq!(n.pixels, &[0x21, 0x43, 0x05, 0, 0xba, 0xdc, 0x0e, 0]);

        // 1bpp, width 12: 2 row bytes + 2 padding
        let mut img = build(12, 1, 1, BI_RGB, None, &[0; 8], &[0x01, 0x80, 0xff, 0xff]);
        let n = interpret(&mut img).unwrap();
        assert_eq!((n.row_bytes, n.row_padding), (2, 2));
        assert!(n.misaligned);
        assert_eq!(n.palette.len(), 8);
        // fix-up covers the padding too
        assert_eq!(n.pixels, &[0x80, 0x01, 0xff, 0xff]);

        // 24bpp, width 10: 30 + 2
        let mut img = build(10, 1, 24, BI_RGB, None, &[], &[0; 32]);
        let n = interpret(&mut img).unwrap();
        assert_eq!((n.row_bytes, n.row_padding), (30, 2));
        assert!(!n.misaligned);
        assert!(n.palette.is_empty());
    }

    #[test]
    fn palette_clipped_to_format_entries() {
        let mut img = build(8, 1, 1, BI_RGB, None, &[0x11; 32], &[0; 4]);
        let n = interpret(&mut img).unwrap();
        assert_eq!(n.palette.len(), 8);
    }

    #[test]
    fn row_order_resolves_to_same_screen() {
        const W: i32 = 10;
        const H: usize = 20;
        let stride = 32; // 30 bytes + 2 padding

        // visual row r (top = 0) is filled with r + 1
        let mut bottom_up = vec![0u8; stride * H];
        let mut top_down = vec![0u8; stride * H];
        for r in 0..H {
            let v = r as u8 + 1;
            top_down[r * stride..r * stride + 30].fill(v);
            let m = H - 1 - r;
            bottom_up[m * stride..m * stride + 30].fill(v);
        }

        let mut a = build(W, H as i32, 24, BI_RGB, None, &[], &bottom_up);
        let mut b = build(W, -(H as i32), 24, BI_RGB, None, &[], &top_down);
        let a = interpret(&mut a).unwrap();
        let b = interpret(&mut b).unwrap();

        assert_eq!((a.row_order, a.origin, a.stride), (RowOrder::BottomUp, 0, 2));
        assert_eq!(
            (b.row_order, b.origin, b.stride),
            (RowOrder::TopDown, stride * (H - 1), -62)
        );

        let fa: Vec<&[u8]> = a.fetch_rows().collect();
        let fb: Vec<&[u8]> = b.fetch_rows().collect();
        assert_eq!(fa.len(), H);
        assert_eq!(fa, fb);
        // fetched first = bottom of the picture
        assert!(fa[0].iter().all(|&p| p == H as u8));
        assert!(fa[H - 1].iter().all(|&p| p == 1));
    }
}
