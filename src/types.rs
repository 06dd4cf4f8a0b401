//! Core type definitions for the coefficient-domain transcoder.
//!
//! These match the semantics of libjpeg's parameter structures but with
//! idiomatic Rust design; the codec boundary translates to and from the
//! C representations.

use crate::consts::{DCTSIZE, DCTSIZE2, STD_CHROMINANCE_QUANT_TBL, STD_LUMINANCE_QUANT_TBL};

/// A single 8x8 block of quantized DCT coefficients, natural order.
pub type DctBlock = [i16; DCTSIZE2];

/// Color space of the encoded JPEG data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorSpace {
    /// Unknown/unspecified color space
    #[default]
    Unknown,
    /// Grayscale (1 component)
    Grayscale,
    /// RGB stored without subsampling (rare in JPEG files)
    Rgb,
    /// YCbCr (3 components, the common case)
    YCbCr,
    /// CMYK (4 components)
    Cmyk,
    /// YCCK (4 components)
    Ycck,
}

impl ColorSpace {
    /// Number of components this color space carries.
    pub const fn num_components(self) -> usize {
        match self {
            ColorSpace::Unknown => 0,
            ColorSpace::Grayscale => 1,
            ColorSpace::Rgb | ColorSpace::YCbCr => 3,
            ColorSpace::Cmyk | ColorSpace::Ycck => 4,
        }
    }
}

/// Per-component parameters carried alongside the coefficient grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentInfo {
    /// Component identifier as it appears in SOF (1=Y, 2=Cb, 3=Cr for YCbCr)
    pub component_id: u16,
    /// Horizontal sampling factor (1-4)
    pub h_samp_factor: u8,
    /// Vertical sampling factor (1-4)
    pub v_samp_factor: u8,
    /// Quantization table slot (0-3)
    pub quant_tbl_no: u8,
}

impl ComponentInfo {
    /// Swap the sampling factors, as the transposing transforms require.
    pub fn transposed(self) -> Self {
        Self {
            h_samp_factor: self.v_samp_factor,
            v_samp_factor: self.h_samp_factor,
            ..self
        }
    }
}

/// A quantization table with 64 values in natural order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantTable {
    /// Quantization values in natural (row-major) order
    pub values: [u16; DCTSIZE2],
}

impl QuantTable {
    /// Create a new quantization table from values.
    pub const fn new(values: [u16; DCTSIZE2]) -> Self {
        Self { values }
    }

    /// Create from a base table scaled by a percentage factor
    /// (100 = use table as-is), clamped the way jpeg_add_quant_table does.
    pub fn scaled(base: &[u16; DCTSIZE2], scale_factor: u32, force_baseline: bool) -> Self {
        let mut values = [0u16; DCTSIZE2];
        for i in 0..DCTSIZE2 {
            let mut temp = ((base[i] as u32) * scale_factor + 50) / 100;
            if temp == 0 {
                temp = 1;
            }
            if temp > 32767 {
                temp = 32767;
            }
            if force_baseline && temp > 255 {
                temp = 255;
            }
            values[i] = temp as u16;
        }
        Self { values }
    }

    /// The standard Annex K table for the given slot kind, scaled to a
    /// 0-100 quality rating. Slot 0 gets the luminance table, every other
    /// slot the chrominance table, matching jpeg_set_quality.
    pub fn for_quality(slot: usize, quality: i32) -> Self {
        let base = if slot == 0 {
            &STD_LUMINANCE_QUANT_TBL
        } else {
            &STD_CHROMINANCE_QUANT_TBL
        };
        Self::scaled(base, quality_scaling(quality) as u32, true)
    }

    /// Transpose the table across the main diagonal (used when the block
    /// grid itself is transposed).
    pub fn transposed(&self) -> Self {
        let mut values = [0u16; DCTSIZE2];
        for row in 0..DCTSIZE {
            for col in 0..DCTSIZE {
                values[col * DCTSIZE + row] = self.values[row * DCTSIZE + col];
            }
        }
        Self { values }
    }
}

/// Restart-marker interval, in MCU rows or in MCUs (blocks). The two
/// units are mutually exclusive; the blocks form overrides a prior rows
/// request, matching the `-restart N[B]` switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartInterval {
    /// `-restart N`: one restart marker every N MCU rows.
    Rows(u16),
    /// `-restart NB`: one restart marker every N MCUs.
    Blocks(u16),
}

impl RestartInterval {
    /// Parse an `N` or `NB` restart specification (0..=65535).
    pub fn parse(spec: &str) -> Option<RestartInterval> {
        let (digits, blocks) = match spec.strip_suffix(['b', 'B']) {
            Some(rest) => (rest, true),
            None => (spec, false),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let value: u16 = digits.parse().ok()?;
        Some(if blocks {
            RestartInterval::Blocks(value)
        } else {
            RestartInterval::Rows(value)
        })
    }
}

/// Convert a 0-100 quality rating into a table scaling percentage,
/// the standard IJG curve (jpeg_quality_scaling).
pub fn quality_scaling(quality: i32) -> i32 {
    let quality = quality.clamp(1, 100);
    if quality < 50 {
        5000 / quality
    } else {
        200 - quality * 2
    }
}

/// Clamp a requested quality rating into the accepted 0-100 range.
pub fn clamp_quality(quality: i32) -> i32 {
    quality.clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_curve_matches_ijg() {
        assert_eq!(quality_scaling(50), 100);
        assert_eq!(quality_scaling(100), 0);
        assert_eq!(quality_scaling(75), 50);
        assert_eq!(quality_scaling(25), 200);
        assert_eq!(quality_scaling(1), 5000);
        // out-of-range ratings behave like the extremes
        assert_eq!(quality_scaling(0), 5000);
        assert_eq!(quality_scaling(400), 0);
    }

    #[test]
    fn clamp_quality_bounds() {
        assert_eq!(clamp_quality(-5), 0);
        assert_eq!(clamp_quality(101), 100);
        assert_eq!(clamp_quality(85), 85);
    }

    #[test]
    fn quant_table_scaling() {
        let base = [16u16; DCTSIZE2];

        let scaled = QuantTable::scaled(&base, 100, false);
        assert_eq!(scaled.values, base);

        let scaled = QuantTable::scaled(&base, 200, false);
        assert_eq!(scaled.values[0], 32);

        let scaled = QuantTable::scaled(&base, 50, false);
        assert_eq!(scaled.values[0], 8);

        // scale factor 0 clamps to the minimum legal quantizer
        let scaled = QuantTable::scaled(&base, 0, false);
        assert_eq!(scaled.values[0], 1);

        let high = [1000u16; DCTSIZE2];
        let scaled = QuantTable::scaled(&high, 100, true);
        assert_eq!(scaled.values[0], 255);
    }

    #[test]
    fn for_quality_picks_slot_table() {
        let luma = QuantTable::for_quality(0, 50);
        let chroma = QuantTable::for_quality(1, 50);
        assert_eq!(luma.values, STD_LUMINANCE_QUANT_TBL);
        assert_eq!(chroma.values, STD_CHROMINANCE_QUANT_TBL);
        // slots beyond 1 also take the chrominance table
        assert_eq!(QuantTable::for_quality(3, 50).values, chroma.values);
    }

    #[test]
    fn transpose_is_involutive() {
        let mut values = [0u16; DCTSIZE2];
        for (i, v) in values.iter_mut().enumerate() {
            *v = i as u16 + 1;
        }
        let table = QuantTable::new(values);
        let twice = table.transposed().transposed();
        assert_eq!(table, twice);
        assert_eq!(table.transposed().values[1], values[DCTSIZE]);
    }

    #[test]
    fn restart_interval_parsing() {
        assert_eq!(RestartInterval::parse("4"), Some(RestartInterval::Rows(4)));
        assert_eq!(
            RestartInterval::parse("12B"),
            Some(RestartInterval::Blocks(12))
        );
        assert_eq!(
            RestartInterval::parse("12b"),
            Some(RestartInterval::Blocks(12))
        );
        assert_eq!(RestartInterval::parse(""), None);
        assert_eq!(RestartInterval::parse("B"), None);
        assert_eq!(RestartInterval::parse("12x"), None);
        assert_eq!(RestartInterval::parse("70000"), None);
    }

    #[test]
    fn transposed_component_swaps_factors() {
        let comp = ComponentInfo {
            component_id: 1,
            h_samp_factor: 2,
            v_samp_factor: 1,
            quant_tbl_no: 0,
        };
        let t = comp.transposed();
        assert_eq!(t.h_samp_factor, 1);
        assert_eq!(t.v_samp_factor, 2);
        assert_eq!(t.component_id, 1);
    }
}
