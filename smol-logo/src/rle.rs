// "RLE." boot-logo codec.
// Stream: 4-byte magic, 4-byte decoded length, then tokens. Both header
// words are composed from bytes 3,2,1,0 of their field; existing logo
// assets depend on this exact composition.
//
// Token header, byte 0:
//   bit 7     extend: one more length byte follows (up to 4 header bytes)
//   bit 6     repeat
//   bit 5     word pattern   (repeat only)
//   bit 4     alpha pattern  (repeat only)
//   low bits  top length chunk: 6 bits literal, 4 bits repeat
// Extension bytes carry 7 length bits each; the chunk from the previous
// byte is shifted left by 7 before the next one is OR-ed in.
//
// Words are written to the output in target order (little-endian), so a
// word pattern reproduces its four source bytes verbatim.

use core::fmt;
use core::ops::{Deref, DerefMut};

pub const MAGIC: u32 = 0x2E45_4C52; // "RLE."
pub const HEADER_LEN: usize = 8;

const OFF_MAGIC: usize = 0;
const OFF_LENGTH: usize = 4;

const F_EXT: u8 = 0x80;
const F_REPEAT: u8 = 0x40;
const F_WORD: u8 = 0x20;
const F_ALPHA: u8 = 0x10;

const LEN_LITERAL_BITS: u32 = 6;
const LEN_REPEAT_BITS: u32 = 4;
const EXT_MASK: u8 = 0x7F;
const MAX_HEADER_BYTES: usize = 4;

pub const MAX_LITERAL_LEN: u32 = 0x7FF_FFFF; // 27 bits
pub const MAX_REPEAT_LEN: u32 = 0x1FF_FFFF; // 25 bits (alpha mode compiled in)

// shortest runs worth a repeat token in the encoder
const MIN_BYTE_RUN: usize = 3;
const MIN_WORD_RUN: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RleError {
    // stream holds no token after the 8-byte header
    TooShort { len: usize },
    BadMagic { found: u32 },
    OutputTooSmall { needed: usize, capacity: usize },
    // input ran out (mid-token or between tokens) before the declared length
    Truncated { offset: usize, written: usize, declared: u32 },
    // a token would write past the declared length
    Overrun { offset: usize, written: usize, declared: u32 },
    // encoder: run or stream length not representable
    LengthTooLarge { len: usize },
    // encoder: a stream needs at least one token
    EmptyInput,
}

impl fmt::Display for RleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            RleError::TooShort { len } => write!(f, "rle: stream too short ({} bytes)", len),
            RleError::BadMagic { found } => {
                write!(f, "rle: bad header {:#010x} (want {:#010x})", found, MAGIC)
            }
            RleError::OutputTooSmall { needed, capacity } => {
                write!(f, "rle: need {} bytes, buffer holds {}", needed, capacity)
            }
            RleError::Truncated {
                offset,
                written,
                declared,
            } => write!(
                f,
                "rle: stream ends at {:#x} after {} of {} bytes",
                offset, written, declared
            ),
            RleError::Overrun {
                offset,
                written,
                declared,
            } => write!(
                f,
                "rle: token at {:#x} overruns declared length ({} of {} written)",
                offset, written, declared
            ),
            RleError::LengthTooLarge { len } => write!(f, "rle: length {} not encodable", len),
            RleError::EmptyInput => f.write_str("rle: nothing to encode"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Literal,
    Byte,
    Word,
    Alpha,
}

impl Kind {
    const fn flags(self) -> u8 {
        match self {
            Kind::Literal => 0,
            Kind::Byte => F_REPEAT,
            Kind::Word => F_REPEAT | F_WORD,
            Kind::Alpha => F_REPEAT | F_ALPHA,
        }
    }

    const fn len_bits(self) -> u32 {
        match self {
            Kind::Literal => LEN_LITERAL_BITS,
            _ => LEN_REPEAT_BITS,
        }
    }

    pub const fn max_len(self) -> u32 {
        match self {
            Kind::Literal => MAX_LITERAL_LEN,
            _ => MAX_REPEAT_LEN,
        }
    }
}

/// One parsed token header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: Kind,
    pub len: u32,
    /// Header bytes consumed (1..=4).
    pub header_len: usize,
}

impl Token {
    // input bytes following the header
    pub fn payload_len(&self) -> usize {
        let len = self.len as usize;
        match self.kind {
            Kind::Literal => len,
            Kind::Byte => 1,
            Kind::Word => 4,
            Kind::Alpha => 1 + 3 * len,
        }
    }

    // output bytes produced
    pub fn output_len(&self) -> usize {
        let len = self.len as usize;
        match self.kind {
            Kind::Literal | Kind::Byte => len,
            Kind::Word | Kind::Alpha => 4 * len,
        }
    }
}

// b3<<24 | b2<<16 | b1<<8 | b0, the composition used by every stored word
#[inline]
fn compose(b3: u8, b2: u8, b1: u8, b0: u8) -> u32 {
    (b3 as u32) << 24 | (b2 as u32) << 16 | (b1 as u32) << 8 | b0 as u32
}

#[inline]
fn word_at(buf: &[u8], off: usize) -> Option<u32> {
    let b = buf.get(off..off.checked_add(4)?)?;
    Some(compose(b[3], b[2], b[1], b[0]))
}

#[inline]
fn store_word(dst: &mut [u8], w: u32) {
    dst[0] = w as u8;
    dst[1] = (w >> 8) as u8;
    dst[2] = (w >> 16) as u8;
    dst[3] = (w >> 24) as u8;
}

/// True if `stream` starts with the "RLE." magic.
pub fn is_rle(stream: &[u8]) -> bool {
    word_at(stream, OFF_MAGIC) == Some(MAGIC)
}

/// Validates the stream header and returns the declared decoded length.
pub fn declared_len(stream: &[u8]) -> Result<u32, RleError> {
    if stream.len() <= HEADER_LEN {
        return Err(RleError::TooShort { len: stream.len() });
    }
    let magic = word_at(stream, OFF_MAGIC).unwrap_or(0);
    if magic != MAGIC {
        return Err(RleError::BadMagic { found: magic });
    }
    Ok(word_at(stream, OFF_LENGTH).unwrap_or(0))
}

/// Parses the token header at `off`; `None` if the header is cut short.
pub fn parse_token(stream: &[u8], off: usize) -> Option<Token> {
    let b0 = *stream.get(off)?;

    let kind = if b0 & F_REPEAT == 0 {
        Kind::Literal
    } else if b0 & F_WORD != 0 {
        Kind::Word
    } else if b0 & F_ALPHA != 0 {
        Kind::Alpha
    } else {
        Kind::Byte
    };

    let mask = ((1u32 << kind.len_bits()) - 1) as u8;
    let mut len = (b0 & mask) as u32;
    let mut header_len = 1;
    let mut extend = b0 & F_EXT != 0;

    // the 4th header byte's own extend bit is ignored
    while extend && header_len < MAX_HEADER_BYTES {
        let b = *stream.get(off + header_len)?;
        len = (len << 7) | (b & EXT_MASK) as u32;
        extend = b & F_EXT != 0;
        header_len += 1;
    }

    Some(Token {
        kind,
        len,
        header_len,
    })
}

/// Decompressed bytes, exactly the declared length, borrowed from the
/// caller's scratch buffer.
pub struct Decoded<'a> {
    data: &'a mut [u8],
}

impl<'a> Decoded<'a> {
    pub fn into_mut(self) -> &'a mut [u8] {
        self.data
    }
}

impl Deref for Decoded<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.data
    }
}

impl DerefMut for Decoded<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        self.data
    }
}

/// Decodes `stream` into `out`. On success exactly the declared number of
/// bytes has been written and the returned view covers exactly those bytes.
pub fn decode<'a>(stream: &[u8], out: &'a mut [u8]) -> Result<Decoded<'a>, RleError> {
    let declared = declared_len(stream)?;
    let target = declared as usize;

    if target > out.len() {
        return Err(RleError::OutputTooSmall {
            needed: target,
            capacity: out.len(),
        });
    }
    let out = &mut out[..target];

    let mut off = HEADER_LEN;
    let mut total = 0usize;

    while total < target {
        let truncated = RleError::Truncated {
            offset: off,
            written: total,
            declared,
        };

        let token = parse_token(stream, off).ok_or(truncated)?;
        let produced = token.output_len();
        log::trace!(
            "rle: {:#x}: {:?} len={} hdr={}",
            off,
            token.kind,
            token.len,
            token.header_len
        );

        if produced > target - total {
            return Err(RleError::Overrun {
                offset: off,
                written: total,
                declared,
            });
        }

        let payload = off + token.header_len;
        let consumed = token.payload_len();
        let src = stream
            .get(payload..payload + consumed)
            .ok_or(truncated)?;
        let dst = &mut out[total..total + produced];

        match token.kind {
            Kind::Literal => dst.copy_from_slice(src),
            Kind::Byte => dst.fill(src[0]),
            Kind::Word => {
                let w = compose(src[3], src[2], src[1], src[0]);
                for px in dst.chunks_exact_mut(4) {
                    store_word(px, w);
                }
            }
            Kind::Alpha => {
                let shared = src[0];
                for (px, rgb) in dst.chunks_exact_mut(4).zip(src[1..].chunks_exact(3)) {
                    store_word(px, compose(rgb[0], rgb[1], rgb[2], shared));
                }
            }
        }

        off = payload + consumed;
        total += produced;
    }

    log::debug!("rle: {} -> {} bytes", off, total);
    Ok(Decoded { data: out })
}

// ── Encoder ─────────────────────────────────────────────────────────────

/// Worst-case encoded size for `n` input bytes.
pub const fn max_encoded_len(n: usize) -> usize {
    HEADER_LEN + n + n / 32 + 8
}

/// Writes a token header for `len` into `out`, shortest form first.
/// Returns the header length.
pub fn write_token_header(kind: Kind, len: u32, out: &mut [u8]) -> Result<usize, RleError> {
    if len > kind.max_len() {
        return Err(RleError::LengthTooLarge { len: len as usize });
    }

    let bits = kind.len_bits();
    let mut k = 1;
    while k < MAX_HEADER_BYTES && (len >> (bits + 7 * (k as u32 - 1))) != 0 {
        k += 1;
    }

    let capacity = out.len();
    let hdr = out.get_mut(..k).ok_or(RleError::OutputTooSmall {
        needed: k,
        capacity,
    })?;

    let mask = ((1u32 << bits) - 1) as u8;
    let ext = if k > 1 { F_EXT } else { 0 };
    hdr[0] = kind.flags() | ext | ((len >> (7 * (k as u32 - 1))) as u8 & mask);
    for (i, b) in hdr.iter_mut().enumerate().skip(1) {
        let shift = 7 * (k - 1 - i) as u32;
        let ext = if i < k - 1 { F_EXT } else { 0 };
        *b = ext | ((len >> shift) as u8 & EXT_MASK);
    }

    Ok(k)
}

struct Writer<'a> {
    out: &'a mut [u8],
    pos: usize,
}

impl Writer<'_> {
    fn slot(&mut self, n: usize) -> Result<&mut [u8], RleError> {
        let capacity = self.out.len();
        let start = self.pos;
        self.pos += n;
        self.out
            .get_mut(start..start + n)
            .ok_or(RleError::OutputTooSmall {
                needed: start + n,
                capacity,
            })
    }

    fn bytes(&mut self, src: &[u8]) -> Result<(), RleError> {
        self.slot(src.len())?.copy_from_slice(src);
        Ok(())
    }

    fn word(&mut self, w: u32) -> Result<(), RleError> {
        store_word(self.slot(4)?, w);
        Ok(())
    }

    fn header(&mut self, kind: Kind, len: usize) -> Result<(), RleError> {
        let capacity = self.out.len();
        let tail = self.out.get_mut(self.pos..).ok_or(RleError::OutputTooSmall {
            needed: self.pos + 1,
            capacity,
        })?;
        self.pos += write_token_header(kind, len as u32, tail)?;
        Ok(())
    }

    fn literal(&mut self, mut src: &[u8]) -> Result<(), RleError> {
        while !src.is_empty() {
            let n = src.len().min(MAX_LITERAL_LEN as usize);
            self.header(Kind::Literal, n)?;
            self.bytes(&src[..n])?;
            src = &src[n..];
        }
        Ok(())
    }
}

fn byte_run(data: &[u8], at: usize) -> usize {
    let b = data[at];
    data[at..]
        .iter()
        .take(MAX_REPEAT_LEN as usize)
        .take_while(|&&x| x == b)
        .count()
}

fn word_run(data: &[u8], at: usize) -> usize {
    let Some(first) = data.get(at..at + 4) else {
        return 0;
    };
    data[at..]
        .chunks_exact(4)
        .take(MAX_REPEAT_LEN as usize)
        .take_while(|w| *w == first)
        .count()
}

/// Reference encoder: literal runs, byte repeats and word repeats.
/// Returns the number of bytes written to `out`. Empty input is refused,
/// since a header-only stream does not decode.
pub fn encode(data: &[u8], out: &mut [u8]) -> Result<usize, RleError> {
    if data.is_empty() {
        return Err(RleError::EmptyInput);
    }
    let declared = u32::try_from(data.len())
        .map_err(|_| RleError::LengthTooLarge { len: data.len() })?;

    let mut w = Writer { out, pos: 0 };
    w.word(MAGIC)?;
    w.word(declared)?;

    let mut i = 0;
    let mut lit_start = 0;
    while i < data.len() {
        let run = byte_run(data, i);
        if run >= MIN_BYTE_RUN {
            w.literal(&data[lit_start..i])?;
            w.header(Kind::Byte, run)?;
            w.bytes(&data[i..i + 1])?;
            i += run;
            lit_start = i;
            continue;
        }

        let words = word_run(data, i);
        if words >= MIN_WORD_RUN {
            w.literal(&data[lit_start..i])?;
            w.header(Kind::Word, words)?;
            w.bytes(&data[i..i + 4])?;
            i += 4 * words;
            lit_start = i;
            continue;
        }

        i += 1;
    }
    w.literal(&data[lit_start..])?;

    Ok(w.pos)
}
