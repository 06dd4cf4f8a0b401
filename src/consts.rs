//! Shared constants: DCT geometry, JPEG marker codes, base quantization tables.
//!
//! Reference: ITU-T T.81 Annex K, libjpeg jcparam.c

/// The basic DCT block is 8x8 samples.
pub const DCTSIZE: usize = 8;

/// Number of coefficients in one DCT block (64).
pub const DCTSIZE2: usize = DCTSIZE * DCTSIZE;

/// Quantization table slots available in a JPEG stream (0..3).
pub const NUM_QUANT_TBLS: usize = 4;

/// DC level of a neutral (flat mid-gray) block. Samples are level-shifted
/// by 128 before the DCT, so an all-zero coefficient block decodes to a
/// uniform neutral field in every component.
pub const NEUTRAL_DC: i16 = 0;

/// SOI marker bytes (start of image).
pub const SOI: [u8; 2] = [0xFF, 0xD8];

/// APP1 marker bytes (EXIF segment).
pub const APP1: [u8; 2] = [0xFF, 0xE1];

/// COM marker code.
pub const JPEG_COM: u8 = 0xFE;

/// APP0 marker code; APPn is `JPEG_APP0 + n`.
pub const JPEG_APP0: u8 = 0xE0;

/// Identification prefix of an ICC profile APP2 segment.
pub const ICC_PREFIX: &[u8; 12] = b"ICC_PROFILE\0";

/// ICC APP2 overhead: prefix + sequence number + marker count.
pub const ICC_OVERHEAD: usize = ICC_PREFIX.len() + 2;

/// Payload bytes available per ICC APP2 segment (65533 max segment payload).
pub const ICC_CHUNK: usize = 65533 - ICC_OVERHEAD;

/// Standard luminance quantization table (Annex K), natural order.
/// Scaled by the quality curve in [`crate::types::QuantTable::for_quality`].
pub const STD_LUMINANCE_QUANT_TBL: [u16; DCTSIZE2] = [
    16, 11, 10, 16, 24, 40, 51, 61, //
    12, 12, 14, 19, 26, 58, 60, 55, //
    14, 13, 16, 24, 40, 57, 69, 56, //
    14, 17, 22, 29, 51, 87, 80, 62, //
    18, 22, 37, 56, 68, 109, 103, 77, //
    24, 35, 55, 64, 81, 104, 113, 92, //
    49, 64, 78, 87, 103, 121, 120, 101, //
    72, 92, 95, 98, 112, 100, 103, 99,
];

/// Standard chrominance quantization table (Annex K), natural order.
pub const STD_CHROMINANCE_QUANT_TBL: [u16; DCTSIZE2] = [
    17, 18, 24, 47, 99, 99, 99, 99, //
    18, 21, 26, 66, 99, 99, 99, 99, //
    24, 26, 56, 99, 99, 99, 99, 99, //
    47, 66, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99, //
    99, 99, 99, 99, 99, 99, 99, 99,
];
