//! Transform selection: folds per-flag requests into one validated
//! [`TransformSpec`] and parses `WxH+X+Y` geometry parameters.
//!
//! Mirrors the option surface of jpegtran (`-crop`, `-drop`, `-flip`,
//! `-grayscale`, `-perfect`, `-rotate`, `-transpose`, `-transverse`,
//! `-trim`, `-wipe`) as a single-pass fold over typed requests; the
//! result is an immutable configuration value for the whole invocation.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A rectangular region request, `WxH+X+Y` with width/height optional.
///
/// Omitted offsets default to 0; omitted dimensions mean "to the image
/// edge" (or, for drop, "taken from the drop image").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    /// Requested width in samples, if given.
    pub width: Option<u32>,
    /// Requested height in samples, if given.
    pub height: Option<u32>,
    /// Left offset in samples (non-negative).
    pub x: u32,
    /// Top offset in samples (non-negative).
    pub y: u32,
}

impl Region {
    /// Parse a `WxH+X+Y` specification. Width and height are each
    /// optional; the `+X+Y` pair is optional but indivisible.
    pub fn parse(spec: &str) -> Result<Region> {
        let bad = || Error::BadGeometry(spec.to_string());
        let mut rest = spec;
        if rest.is_empty() {
            return Err(bad());
        }

        let mut region = Region::default();
        if rest.starts_with(|c: char| c.is_ascii_digit()) {
            let (value, tail) = take_number(rest).ok_or_else(bad)?;
            region.width = Some(value);
            rest = tail;
        }
        if let Some(tail) = rest.strip_prefix(['x', 'X']) {
            let (value, tail) = take_number(tail).ok_or_else(bad)?;
            region.height = Some(value);
            rest = tail;
        }
        if let Some(tail) = rest.strip_prefix('+') {
            let (x, tail) = take_number(tail).ok_or_else(bad)?;
            let tail = tail.strip_prefix('+').ok_or_else(bad)?;
            let (y, tail) = take_number(tail).ok_or_else(bad)?;
            region.x = x;
            region.y = y;
            rest = tail;
        }
        if !rest.is_empty() {
            return Err(bad());
        }
        Ok(region)
    }
}

fn take_number(s: &str) -> Option<(u32, &str)> {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    let value = s[..end].parse().ok()?;
    Some((value, &s[end..]))
}

/// Rotation amount, degrees clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// 90 degrees clockwise.
    Rotate90,
    /// 180 degrees.
    Rotate180,
    /// 270 degrees clockwise.
    Rotate270,
}

/// One transform-related option flag, as it would arrive from a command
/// line or a caller-built option list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformRequest<'a> {
    /// `-crop WxH+X+Y`
    Crop(&'a str),
    /// `-wipe WxH+X+Y`
    Wipe(&'a str),
    /// `-drop +X+Y file` (width/height must not be given; they are taken
    /// from the drop image)
    Drop {
        /// Geometry of the insertion point, offsets only.
        at: &'a str,
        /// Path of the image to drop in.
        path: &'a Path,
    },
    /// `-rotate {90|180|270}`
    Rotate(Rotation),
    /// `-flip horizontal`
    FlipHorizontal,
    /// `-flip vertical`
    FlipVertical,
    /// `-transpose`
    Transpose,
    /// `-transverse`
    Transverse,
    /// `-grayscale`
    Grayscale,
    /// `-trim`
    Trim,
    /// `-perfect`
    Perfect,
}

/// The geometric transform in effect for an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransformKind {
    /// No geometric change (recompression only).
    #[default]
    None,
    /// Horizontal mirror.
    FlipH,
    /// Vertical mirror.
    FlipV,
    /// Transpose across the upper-left-to-lower-right axis.
    Transpose,
    /// Transpose across the upper-right-to-lower-left axis.
    Transverse,
    /// Rotate 90 degrees clockwise.
    Rot90,
    /// Rotate 180 degrees.
    Rot180,
    /// Rotate 270 degrees clockwise.
    Rot270,
    /// Crop to a rectangular region.
    Crop,
    /// Gray out a rectangular region.
    Wipe,
    /// Insert another image's blocks into a rectangular region.
    Drop,
}

impl TransformKind {
    /// True for the transforms that swap the image axes.
    pub fn transposes(self) -> bool {
        matches!(
            self,
            TransformKind::Transpose
                | TransformKind::Transverse
                | TransformKind::Rot90
                | TransformKind::Rot270
        )
    }
}

/// How non-transformable edge blocks are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgePolicy {
    /// Pass stale edge blocks through unchanged (legacy default).
    Allow,
    /// Drop the offending edge rows/columns from the output dimensions.
    Trim,
    /// Fail with [`Error::NonTransformableEdge`] before writing anything.
    Perfect,
}

/// The folded, validated transform configuration for one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransformSpec {
    /// Active geometric transform.
    pub kind: TransformKind,
    /// Region parameter for Crop/Wipe/Drop.
    pub region: Option<Region>,
    /// Source image for Drop.
    pub drop_path: Option<PathBuf>,
    /// Reduce to grayscale before the geometric transform.
    pub grayscale: bool,
    /// Trim non-transformable edges (with Drop: requantize the drop file).
    pub trim: bool,
    /// Demand a perfectly lossless transform.
    pub perfect: bool,
}

impl TransformSpec {
    /// A no-op transform (pure recompression).
    pub fn none() -> Self {
        Self::default()
    }

    /// True when a geometric transform or grayscale reduction is active.
    pub fn is_active(&self) -> bool {
        self.kind != TransformKind::None || self.grayscale
    }

    /// Resolved edge-block policy. Trim satisfies Perfect: trimmed output
    /// has no silently-stale edge blocks left to object to.
    pub fn edge_policy(&self) -> EdgePolicy {
        if self.trim {
            EdgePolicy::Trim
        } else if self.perfect {
            EdgePolicy::Perfect
        } else {
            EdgePolicy::Allow
        }
    }

    /// Fold a sequence of requests (repeated flags) into one spec.
    ///
    /// Fails with [`Error::ConflictingTransform`] if two different
    /// geometric transforms are requested (repeating the same one is
    /// accepted, as in jpegtran), or with [`Error::BadGeometry`] on a
    /// malformed region parameter.
    pub fn from_requests(requests: &[TransformRequest<'_>]) -> Result<TransformSpec> {
        let mut spec = TransformSpec::default();
        for request in requests {
            match request {
                TransformRequest::Crop(geometry) => {
                    spec.set_region(Region::parse(geometry)?)?;
                    spec.select(TransformKind::Crop)?;
                }
                TransformRequest::Wipe(geometry) => {
                    spec.set_region(Region::parse(geometry)?)?;
                    spec.select(TransformKind::Wipe)?;
                }
                TransformRequest::Drop { at, path } => {
                    let region = Region::parse(at)?;
                    if region.width.is_some() || region.height.is_some() {
                        // drop dimensions come from the drop image itself
                        return Err(Error::BadGeometry(at.to_string()));
                    }
                    spec.set_region(region)?;
                    spec.select(TransformKind::Drop)?;
                    spec.drop_path = Some(path.to_path_buf());
                }
                TransformRequest::Rotate(Rotation::Rotate90) => {
                    spec.select(TransformKind::Rot90)?;
                }
                TransformRequest::Rotate(Rotation::Rotate180) => {
                    spec.select(TransformKind::Rot180)?;
                }
                TransformRequest::Rotate(Rotation::Rotate270) => {
                    spec.select(TransformKind::Rot270)?;
                }
                TransformRequest::FlipHorizontal => spec.select(TransformKind::FlipH)?,
                TransformRequest::FlipVertical => spec.select(TransformKind::FlipV)?,
                TransformRequest::Transpose => spec.select(TransformKind::Transpose)?,
                TransformRequest::Transverse => spec.select(TransformKind::Transverse)?,
                TransformRequest::Grayscale => spec.grayscale = true,
                TransformRequest::Trim => spec.trim = true,
                TransformRequest::Perfect => spec.perfect = true,
            }
        }
        Ok(spec)
    }

    fn select(&mut self, kind: TransformKind) -> Result<()> {
        if self.kind == TransformKind::None || self.kind == kind {
            self.kind = kind;
            Ok(())
        } else {
            Err(Error::ConflictingTransform)
        }
    }

    fn set_region(&mut self, region: Region) -> Result<()> {
        if self.region.is_some() {
            // reject multiple crop/drop/wipe requests
            return Err(Error::ConflictingTransform);
        }
        self.region = Some(region);
        Ok(())
    }
}
