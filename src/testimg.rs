//! Test support: synthetic coefficient images and codec round-trip
//! helpers. Not part of the stable API.

use crate::codec::{Decoder, Encoder, SinkHandle};
use crate::coef::CoefImage;
use crate::consts::NUM_QUANT_TBLS;
use crate::error::Result;
use crate::marker::{CopyMarkers, SavedMarker};
use crate::types::{ColorSpace, ComponentInfo, QuantTable};

/// Component layout of a 4:2:0 YCbCr image.
pub fn ycbcr_420_components() -> Vec<ComponentInfo> {
    vec![
        ComponentInfo {
            component_id: 1,
            h_samp_factor: 2,
            v_samp_factor: 2,
            quant_tbl_no: 0,
        },
        ComponentInfo {
            component_id: 2,
            h_samp_factor: 1,
            v_samp_factor: 1,
            quant_tbl_no: 1,
        },
        ComponentInfo {
            component_id: 3,
            h_samp_factor: 1,
            v_samp_factor: 1,
            quant_tbl_no: 1,
        },
    ]
}

/// Component layout of a grayscale image.
pub fn gray_components() -> Vec<ComponentInfo> {
    vec![ComponentInfo {
        component_id: 1,
        h_samp_factor: 1,
        v_samp_factor: 1,
        quant_tbl_no: 0,
    }]
}

/// Flat quantization tables in slots 0 and 1.
pub fn flat_tables() -> [Option<QuantTable>; NUM_QUANT_TBLS] {
    let mut tables: [Option<QuantTable>; NUM_QUANT_TBLS] = Default::default();
    tables[0] = Some(QuantTable::new([16; 64]));
    tables[1] = Some(QuantTable::new([17; 64]));
    tables
}

/// A synthetic image whose blocks are sparsely patterned by position, with
/// coefficient magnitudes small enough for baseline entropy coding.
pub fn synthetic(width: u32, height: u32, components: &[ComponentInfo]) -> CoefImage {
    let color_space = if components.len() == 1 {
        ColorSpace::Grayscale
    } else {
        ColorSpace::YCbCr
    };
    let mut img = CoefImage::new(width, height, color_space, components, flat_tables());
    for (ci, plane) in img.components.iter_mut().enumerate() {
        for y in 0..plane.height_in_blocks {
            for x in 0..plane.width_in_blocks {
                let mut block = [0i16; 64];
                block[0] = ((x as i16 * 7 + y as i16 * 11 + ci as i16 * 5) % 63) - 31;
                block[1] = ((x as i16 * 3 + y as i16) % 17) - 8;
                block[8] = ((y as i16 * 5 + x as i16) % 13) - 6;
                block[9] = ((x as i16 + y as i16 + ci as i16) % 7) - 3;
                plane.set_block(x, y, block);
            }
        }
    }
    img
}

/// Encode a coefficient image to JPEG bytes, optionally emitting extra
/// markers after the frame headers.
pub fn encode_with_markers(img: &CoefImage, markers: &[SavedMarker]) -> Result<Vec<u8>> {
    let mut encoder = Encoder::new(SinkHandle::null(), 0, None, None);
    encoder.defaults_for(img);
    encoder.sync_image(img)?;
    encoder.set_optimize_coding(false);
    encoder.set_progressive(false);
    encoder.start(img)?;
    for marker in markers {
        encoder.write_marker(marker);
    }
    encoder.fill_and_finish(img)?;
    Ok(encoder.bytes().to_vec())
}

/// Encode a coefficient image to JPEG bytes.
pub fn encode(img: &CoefImage) -> Result<Vec<u8>> {
    encode_with_markers(img, &[])
}

/// Decode JPEG bytes back into a coefficient image, retaining markers per
/// the given copy mode.
pub fn decode(bytes: &[u8], copy: CopyMarkers) -> Result<(CoefImage, Vec<SavedMarker>)> {
    let mut decoder = Decoder::from_bytes(bytes, SinkHandle::null(), copy);
    decoder.read_header();
    let img = decoder.read_coefficients()?;
    let markers = decoder.saved_markers();
    decoder.finish();
    Ok((img, markers))
}
