//! Marker copy policy: which auxiliary segments survive a transcode.
//!
//! Pure classification, mirroring jpegtran's jcopy_markers_setup /
//! jcopy_markers_execute pair: a save rule tells the decoder which
//! segments to retain while parsing the header, a keep rule decides which
//! retained segments are re-emitted on the destination.

use crate::consts::{ICC_PREFIX, JPEG_APP0, JPEG_COM};

/// Which non-essential markers to copy from source to destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyMarkers {
    /// Copy no extra markers.
    None,
    /// Copy only comment (COM) markers. The jpegtran default.
    #[default]
    Comments,
    /// Copy only the ICC profile (APP2) markers.
    Icc,
    /// Copy all extra markers.
    All,
    /// Copy all extra markers except the ICC profile.
    AllExceptIcc,
}

impl CopyMarkers {
    /// Demote the mode when an explicit ICC override is supplied, so a
    /// copied profile never duplicates the override.
    pub fn with_icc_override(self) -> Self {
        match self {
            CopyMarkers::All => CopyMarkers::AllExceptIcc,
            CopyMarkers::Icc => CopyMarkers::None,
            other => other,
        }
    }

    /// Should COM segments be retained while reading the source?
    pub(crate) fn saves_comments(self) -> bool {
        !matches!(self, CopyMarkers::None | CopyMarkers::Icc)
    }

    /// Should APPn segments be retained while reading the source?
    pub(crate) fn saves_app(self, n: u8) -> bool {
        match self {
            CopyMarkers::All | CopyMarkers::AllExceptIcc => true,
            CopyMarkers::Icc => n == 2,
            CopyMarkers::None | CopyMarkers::Comments => false,
        }
    }

    /// Should a retained segment be re-emitted on the destination?
    ///
    /// JFIF APP0 and Adobe APP14 segments are skipped when the encoder
    /// will regenerate them itself.
    pub(crate) fn keeps(self, marker: &SavedMarker, writes_jfif: bool, writes_adobe: bool) -> bool {
        if self == CopyMarkers::Icc && !marker.is_icc_profile() {
            return false;
        }
        if self == CopyMarkers::AllExceptIcc && marker.is_icc_profile() {
            return false;
        }
        if writes_jfif && marker.is_jfif() {
            return false;
        }
        if writes_adobe && marker.is_adobe() {
            return false;
        }
        true
    }
}

/// One auxiliary segment retained from the source stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedMarker {
    /// Full marker code (0xFE for COM, 0xE0 + n for APPn).
    pub marker: u8,
    /// Segment payload, without the marker and length bytes.
    pub data: Vec<u8>,
}

impl SavedMarker {
    /// True for an APP2 segment carrying a piece of an ICC profile.
    pub fn is_icc_profile(&self) -> bool {
        self.marker == JPEG_APP0 + 2 && self.data.starts_with(ICC_PREFIX)
    }

    /// True for the JFIF APP0 segment.
    pub fn is_jfif(&self) -> bool {
        self.marker == JPEG_APP0 && self.data.starts_with(b"JFIF")
    }

    /// True for the Adobe APP14 segment.
    pub fn is_adobe(&self) -> bool {
        self.marker == JPEG_APP0 + 14 && self.data.starts_with(b"Adobe")
    }

    /// True for a COM segment.
    pub fn is_comment(&self) -> bool {
        self.marker == JPEG_COM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn icc_marker() -> SavedMarker {
        let mut data = ICC_PREFIX.to_vec();
        data.extend_from_slice(&[1, 1, 0xDE, 0xAD]);
        SavedMarker {
            marker: JPEG_APP0 + 2,
            data,
        }
    }

    fn exif_marker() -> SavedMarker {
        SavedMarker {
            marker: JPEG_APP0 + 1,
            data: b"Exif\0\0II*\0".to_vec(),
        }
    }

    fn comment() -> SavedMarker {
        SavedMarker {
            marker: JPEG_COM,
            data: b"hello".to_vec(),
        }
    }

    #[test]
    fn save_rules() {
        assert!(!CopyMarkers::None.saves_comments());
        assert!(CopyMarkers::Comments.saves_comments());
        assert!(!CopyMarkers::Icc.saves_comments());
        assert!(CopyMarkers::All.saves_comments());

        assert!(!CopyMarkers::Comments.saves_app(1));
        assert!(CopyMarkers::Icc.saves_app(2));
        assert!(!CopyMarkers::Icc.saves_app(1));
        for n in 0..16 {
            assert!(CopyMarkers::All.saves_app(n));
            assert!(CopyMarkers::AllExceptIcc.saves_app(n));
        }
    }

    #[test]
    fn keep_rules() {
        let icc = icc_marker();
        let exif = exif_marker();
        let com = comment();

        assert!(CopyMarkers::All.keeps(&icc, false, false));
        assert!(CopyMarkers::All.keeps(&exif, false, false));
        assert!(CopyMarkers::All.keeps(&com, false, false));

        assert!(CopyMarkers::Icc.keeps(&icc, false, false));
        assert!(!CopyMarkers::Icc.keeps(&exif, false, false));
        assert!(!CopyMarkers::Icc.keeps(&com, false, false));

        assert!(!CopyMarkers::AllExceptIcc.keeps(&icc, false, false));
        assert!(CopyMarkers::AllExceptIcc.keeps(&exif, false, false));
    }

    #[test]
    fn regenerated_segments_are_skipped() {
        let jfif = SavedMarker {
            marker: JPEG_APP0,
            data: b"JFIF\0\x01\x01".to_vec(),
        };
        let adobe = SavedMarker {
            marker: JPEG_APP0 + 14,
            data: b"Adobe\0".to_vec(),
        };
        assert!(!CopyMarkers::All.keeps(&jfif, true, false));
        assert!(CopyMarkers::All.keeps(&jfif, false, false));
        assert!(!CopyMarkers::All.keeps(&adobe, false, true));
        // a non-JFIF APP0 is kept even when a JFIF header is written
        let app0 = SavedMarker {
            marker: JPEG_APP0,
            data: b"AVI1".to_vec(),
        };
        assert!(CopyMarkers::All.keeps(&app0, true, false));
    }

    #[test]
    fn icc_override_demotes_mode() {
        assert_eq!(CopyMarkers::All.with_icc_override(), CopyMarkers::AllExceptIcc);
        assert_eq!(CopyMarkers::Icc.with_icc_override(), CopyMarkers::None);
        assert_eq!(
            CopyMarkers::Comments.with_icc_override(),
            CopyMarkers::Comments
        );
        assert_eq!(CopyMarkers::None.with_icc_override(), CopyMarkers::None);
    }

    #[test]
    fn icc_detection_requires_prefix() {
        let icc = icc_marker();
        assert!(icc.is_icc_profile());
        let not_icc = SavedMarker {
            marker: JPEG_APP0 + 2,
            data: b"MPF\0".to_vec(),
        };
        assert!(!not_icc.is_icc_profile());
        assert!(comment().is_comment());
    }
}
