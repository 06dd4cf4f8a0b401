//! Codec-boundary round trips: synthetic coefficient images pushed
//! through the real encoder and decoder.

use jpegtran_oxide::testimg::{
    decode, encode, encode_with_markers, gray_components, synthetic, ycbcr_420_components,
};
use jpegtran_oxide::{CopyMarkers, SavedMarker};

#[test]
fn coefficients_survive_a_round_trip() {
    let img = synthetic(64, 48, &ycbcr_420_components());
    let bytes = encode(&img).unwrap();
    assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);

    let (decoded, _) = decode(&bytes, CopyMarkers::None).unwrap();
    assert_eq!((decoded.width, decoded.height), (64, 48));
    assert_eq!(decoded.components.len(), 3);
    for (ci, (a, b)) in img
        .components
        .iter()
        .zip(decoded.components.iter())
        .enumerate()
    {
        assert_eq!(a.info, b.info, "component {} info", ci);
        assert_eq!(a.width_in_blocks, b.width_in_blocks);
        assert_eq!(a.height_in_blocks, b.height_in_blocks);
        assert_eq!(a.blocks, b.blocks, "component {} blocks", ci);
    }
    assert_eq!(img.quant_tables, decoded.quant_tables);
}

#[test]
fn unaligned_dimensions_round_trip() {
    // 100x100 leaves partial iMCUs on both edges
    let img = synthetic(100, 100, &ycbcr_420_components());
    let bytes = encode(&img).unwrap();
    let (decoded, _) = decode(&bytes, CopyMarkers::None).unwrap();
    assert_eq!(decoded.components[0].width_in_blocks, 13);
    assert_eq!(decoded.components[1].width_in_blocks, 7);
    for (a, b) in img.components.iter().zip(decoded.components.iter()) {
        assert_eq!(a.blocks, b.blocks);
    }
}

#[test]
fn grayscale_round_trip() {
    let img = synthetic(40, 24, &gray_components());
    let bytes = encode(&img).unwrap();
    let (decoded, _) = decode(&bytes, CopyMarkers::None).unwrap();
    assert_eq!(decoded.components.len(), 1);
    assert_eq!(decoded.components[0].blocks, img.components[0].blocks);
}

#[test]
fn encoding_is_deterministic() {
    let img = synthetic(64, 64, &ycbcr_420_components());
    let first = encode(&img).unwrap();
    let second = encode(&img).unwrap();
    assert_eq!(first, second);
}

#[test]
fn markers_round_trip_per_copy_mode() {
    let img = synthetic(32, 32, &ycbcr_420_components());
    let comment = SavedMarker {
        marker: 0xFE,
        data: b"a test comment".to_vec(),
    };
    let app1 = SavedMarker {
        marker: 0xE1,
        data: b"Exif\0\0II*\0".to_vec(),
    };
    let bytes = encode_with_markers(&img, &[comment.clone(), app1.clone()]).unwrap();

    let (_, markers) = decode(&bytes, CopyMarkers::All).unwrap();
    assert!(markers.contains(&comment));
    assert!(markers.contains(&app1));

    let (_, markers) = decode(&bytes, CopyMarkers::Comments).unwrap();
    assert!(markers.contains(&comment));
    assert!(!markers.iter().any(|m| m.marker == 0xE1));

    let (_, markers) = decode(&bytes, CopyMarkers::None).unwrap();
    assert!(markers.is_empty());
}
