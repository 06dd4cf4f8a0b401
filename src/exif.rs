//! Byte-level EXIF stitcher: concatenates the EXIF segment of one file
//! onto the image-scan bytes of another.
//!
//! This is a fixed format-stitch, not a transform: the EXIF source is
//! accepted only if it begins with SOI immediately followed by an APP1
//! segment, whose big-endian length prefix delimits the payload. On any
//! mismatch or short read the routine degrades to a plain rename of the
//! image file onto the output path.

use std::fs;
use std::path::Path;

use crate::consts::{APP1, SOI};
use crate::error::{Error, Result};

/// What the stitcher ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Splice {
    /// The EXIF segment was prepended to the image's scan bytes.
    Merged,
    /// No usable EXIF segment; the image was moved to the output as-is.
    PassedThrough,
}

/// Splice the EXIF APP1 segment of `exif_source` onto the image data of
/// `image`, writing the result to `output`. `image` is consumed (moved)
/// in the pass-through case, matching the original tool's rename
/// semantics.
pub fn splice_exif(exif_source: &Path, image: &Path, output: &Path) -> Result<Splice> {
    let exif_payload = read_exif_payload(exif_source)?;

    let image_data = fs::read(image).map_err(|e| Error::io(image, e))?;
    match exif_payload {
        Some(payload) if image_data.len() > 2 => {
            let segment_len = (payload.len() + 2) as u16;
            let mut out = Vec::with_capacity(image_data.len() + payload.len() + 6);
            out.extend_from_slice(&SOI);
            out.extend_from_slice(&APP1);
            out.extend_from_slice(&segment_len.to_be_bytes());
            out.extend_from_slice(&payload);
            out.extend_from_slice(&image_data[2..]);
            fs::write(output, out).map_err(|e| Error::io(output, e))?;
            Ok(Splice::Merged)
        }
        _ => {
            rename_or_copy(image, output)?;
            Ok(Splice::PassedThrough)
        }
    }
}

/// The APP1 payload of a file starting with SOI + APP1, if well-formed.
fn read_exif_payload(path: &Path) -> Result<Option<Vec<u8>>> {
    let data = fs::read(path).map_err(|e| Error::io(path, e))?;
    if data.len() < 6 || data[0..2] != SOI || data[2..4] != APP1 {
        return Ok(None);
    }
    let declared = u16::from_be_bytes([data[4], data[5]]) as usize;
    // the length field covers itself
    if declared < 2 {
        return Ok(None);
    }
    let payload_len = declared - 2;
    if payload_len == 0 || data.len() < 6 + payload_len {
        return Ok(None);
    }
    Ok(Some(data[6..6 + payload_len].to_vec()))
}

/// Rename falling back to copy+remove across filesystems.
fn rename_or_copy(from: &Path, to: &Path) -> Result<()> {
    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(libc::EXDEV) => {
            fs::copy(from, to).map_err(|e| Error::io(to, e))?;
            fs::remove_file(from).map_err(|e| Error::io(from, e))?;
            Ok(())
        }
        Err(e) => Err(Error::io(from, e)),
    }
}
