// Overlay scaler programming.
//
// Two fixed-point schemes, one per controller generation:
//   PhaseTableScaler  LCDC: 8-phase polyphase filter with fixed upscaling
//                     coefficients, factor derived from (size - 1) with a
//                     phase offset, clamped so the last tap stays inside
//                     the source row
//   RatioScaler       XLCDC: plain src/dst ratio in 1.20 fixed point,
//                     bicubic filters for luma and chroma
// Both only ever upscale here: the logo is scaled by (8 + n) / 8.

use super::placement::LayerPlacement;
use crate::drivers::lcdc::Axis;
use crate::drivers::lcdc::regmap::{layer, scaler as bits};
use crate::error::SplashError;

/// Register writes a scaler needs. The compositor implements this so the
/// writes follow its sync and commit rules.
pub trait RegisterSink {
    /// HEOCFGn
    fn layer_cfg(&mut self, index: u8, value: u32) -> Result<(), SplashError>;

    fn coefficients(&mut self, axis: Axis, table: &[u32]) -> Result<(), SplashError>;
}

pub trait ScalerStrategy {
    fn name(&self) -> &'static str;

    fn factor(&self, src: u32, dst: u32, axis: Axis) -> u32;

    fn program(
        &self,
        sink: &mut dyn RegisterSink,
        placement: &LayerPlacement,
    ) -> Result<(), SplashError>;
}

// ── LCDC ────────────────────────────────────────────────────────────────

pub const XPHIDEF: u32 = 4;
pub const YPHIDEF: u32 = 4;

// upscaling taps, HEOCFG17..32 / HEOCFG33..40
pub const X_COEFFICIENTS: [u32; 16] = [
    0xf74949f7, 0x00000000, 0xf55f33fb, 0x000000fe,
    0xf5701efe, 0x000000ff, 0xf87c0dff, 0x00000000,
    0x00800000, 0x00000000, 0x0d7cf800, 0x000000ff,
    0x1e70f5ff, 0x000000fe, 0x335ff5fe, 0x000000fb,
];

pub const Y_COEFFICIENTS: [u32; 8] = [
    0x00004040, 0x00075920, 0x00056f0c, 0x00027b03,
    0x00008000, 0x00037b02, 0x000c6f05, 0x00205907,
];

/// `256 * (8 * (src - 1) - phidef) / (dst - 1)`, minus one if the last
/// fetch `(factor * (dst - 1) + 256 * phidef) / 2048` would land past
/// `src - 1`. Degenerate sizes (dst <= 1, src - 1 below the phase offset)
/// give 0.
pub fn phase_factor(src: u32, dst: u32, phidef: u32) -> u32 {
    if src == 0 || dst <= 1 {
        return 0;
    }
    let src1 = src as i64 - 1;
    let dst1 = dst as i64 - 1;
    let phidef = phidef as i64;

    let mut factor = (256 * (8 * src1 - phidef) / dst1).max(0);
    let last = (factor * dst1 + 256 * phidef) / 2048;
    if last > src1 && factor > 0 {
        factor -= 1;
    }
    factor as u32
}

pub struct PhaseTableScaler;

impl ScalerStrategy for PhaseTableScaler {
    fn name(&self) -> &'static str {
        "phase-table"
    }

    fn factor(&self, src: u32, dst: u32, axis: Axis) -> u32 {
        let phidef = match axis {
            Axis::Horizontal => XPHIDEF,
            Axis::Vertical => YPHIDEF,
        };
        phase_factor(src, dst, phidef)
    }

    fn program(
        &self,
        sink: &mut dyn RegisterSink,
        placement: &LayerPlacement,
    ) -> Result<(), SplashError> {
        sink.coefficients(Axis::Horizontal, &X_COEFFICIENTS)?;
        sink.coefficients(Axis::Vertical, &Y_COEFFICIENTS)?;
        sink.layer_cfg(
            13,
            layer::SCAL
                | (placement.y_factor & layer::FACTOR_MASK) << 16
                | (placement.x_factor & layer::FACTOR_MASK),
        )
    }
}

// ── XLCDC ───────────────────────────────────────────────────────────────

pub struct RatioScaler;

impl ScalerStrategy for RatioScaler {
    fn name(&self) -> &'static str {
        "ratio"
    }

    fn factor(&self, src: u32, dst: u32, _axis: Axis) -> u32 {
        if dst == 0 {
            return 0;
        }
        ((1u64 << 20) * src as u64 / dst as u64) as u32
    }

    fn program(
        &self,
        sink: &mut dyn RegisterSink,
        placement: &LayerPlacement,
    ) -> Result<(), SplashError> {
        let (x, y) = (placement.x_factor, placement.y_factor);

        sink.layer_cfg(23, bits::HXSCEN | bits::HXSYEN | bits::VXSCEN | bits::VXSYEN)?;
        // luma, chroma
        sink.layer_cfg(24, y)?;
        sink.layer_cfg(25, y)?;
        sink.layer_cfg(26, x)?;
        sink.layer_cfg(27, x)?;
        // phase offsets
        sink.layer_cfg(28, 0)?;
        sink.layer_cfg(29, 0)?;
        sink.layer_cfg(
            30,
            bits::VXSCBICU | bits::vxsccfg(1) | bits::VXSYBICU | bits::vxsycfg(1),
        )?;
        sink.layer_cfg(
            31,
            bits::HXSCBICU | bits::hxsccfg(1) | bits::HXSYBICU | bits::hxsycfg(1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics_core::geometry::Size;

    use crate::display::placement::compute_placement;

    #[derive(Default)]
    struct Recorder {
        cfg: Vec<(u8, u32)>,
        tables: Vec<(Axis, usize)>,
    }

    impl RegisterSink for Recorder {
        fn layer_cfg(&mut self, index: u8, value: u32) -> Result<(), SplashError> {
            self.cfg.push((index, value));
            Ok(())
        }

        fn coefficients(&mut self, axis: Axis, table: &[u32]) -> Result<(), SplashError> {
            self.tables.push((axis, table.len()));
            Ok(())
        }
    }

    #[test]
    fn phase_factor_known_values() {
        // 256 * (8 * 399 - 4) / 499
        assert_eq!(phase_factor(400, 500, 4), 1635);
        assert_eq!(phase_factor(2, 3, 4), 512);
        assert_eq!(phase_factor(100, 100, 4), 2037);
    }

    #[test]
    fn phase_factor_stays_inside_source() {
        for src in 2..120u32 {
            for dst in src..src * 3 {
                let f = phase_factor(src, dst, XPHIDEF) as u64;
                let last = (f * (dst as u64 - 1) + 256 * XPHIDEF as u64) / 2048;
                assert!(last <= src as u64 - 1, "src={} dst={}", src, dst);
            }
        }
    }

    #[test]
    fn phase_factor_degenerate_sizes() {
        assert_eq!(phase_factor(1, 1, 4), 0);
        assert_eq!(phase_factor(5, 0, 4), 0);
        // src - 1 smaller than the phase offset
        assert_eq!(phase_factor(1, 2, 4), 0);
    }

    #[test]
    fn ratio_factor() {
        assert_eq!(RatioScaler.factor(400, 500, Axis::Horizontal), 838_860);
        assert_eq!(RatioScaler.factor(8, 8, Axis::Vertical), 1 << 20);
        assert_eq!(RatioScaler.factor(8, 0, Axis::Vertical), 0);
    }

    #[test]
    fn phase_table_programming() {
        let p = compute_placement(Size::new(400, 300), Size::new(800, 480), 2, &PhaseTableScaler);
        let mut rec = Recorder::default();
        PhaseTableScaler.program(&mut rec, &p).unwrap();

        assert_eq!(rec.tables, [(Axis::Horizontal, 16), (Axis::Vertical, 8)]);
        assert_eq!(rec.cfg.len(), 1);
        let (idx, v) = rec.cfg[0];
        assert_eq!(idx, 13);
        assert_eq!(v & layer::SCAL, layer::SCAL);
        assert_eq!(v & 0x3fff, p.x_factor);
        assert_eq!((v >> 16) & 0x3fff, p.y_factor);
    }

    #[test]
    fn ratio_programming() {
        let p = compute_placement(Size::new(400, 300), Size::new(800, 480), 2, &RatioScaler);
        let mut rec = Recorder::default();
        RatioScaler.program(&mut rec, &p).unwrap();

        let idx: Vec<u8> = rec.cfg.iter().map(|(i, _)| *i).collect();
        assert_eq!(idx, (23..=31).collect::<Vec<u8>>());
        assert_eq!(rec.cfg[1].1, p.y_factor);
        assert_eq!(rec.cfg[3].1, p.x_factor);
        assert!(rec.tables.is_empty());
    }
}
