//! # jpegtran-oxide
//!
//! Lossless coefficient-domain JPEG transforms and recompression on top
//! of mozjpeg's codec primitives.
//!
//! Geometric transforms (crop, rotate, flip, transpose, transverse,
//! region wipe, image drop, grayscale reduction) operate directly on the
//! quantized DCT coefficient blocks; the image is never decoded to
//! pixels. Recompression re-optimizes the entropy coding (Huffman
//! optimization, progressive scan scheduling, arithmetic coding) and can
//! requantize to a quality rating, while preserving auxiliary markers per
//! a copy policy.
//!
//! ## Recompress a file
//!
//! ```no_run
//! use std::path::Path;
//! use jpegtran_oxide::transcode;
//!
//! let outcome = transcode(
//!     Path::new("input.jpg"),
//!     Path::new("output.jpg"),
//!     Path::new("output.log"),
//!     85,    // quality
//!     true,  // progressive
//!     true,  // optimize Huffman tables
//!     false, // verbose
//! );
//! std::process::exit(outcome.exit_code());
//! ```
//!
//! ## Lossless transform
//!
//! ```no_run
//! use std::path::Path;
//! use jpegtran_oxide::{transform, CopyMarkers, Options, Rotation, TransformRequest};
//!
//! let options = Options {
//!     copy: CopyMarkers::All,
//!     optimize: true,
//!     ..Options::default()
//! };
//! let outcome = transform(
//!     Path::new("portrait.jpg"),
//!     Path::new("rotated.jpg"),
//!     Path::new("rotated.log"),
//!     &[TransformRequest::Rotate(Rotation::Rotate90), TransformRequest::Trim],
//!     &options,
//! );
//! assert!(outcome.is_success());
//! ```
//!
//! ## Outcomes and the log
//!
//! Every invocation yields a tri-state [`Outcome`] (success /
//! success-with-warnings / failure) mapping onto the 0/2/1 exit-code
//! convention, and writes human-readable diagnostics to the caller's log
//! path regardless of the result. The library never panics across its
//! public boundary: abrupt codec failures are captured at a per-invocation
//! recovery point and every acquired resource (streams, codec contexts)
//! is released on all exit paths.

#![warn(missing_docs)]

mod codec;

pub mod coef;
pub mod consts;
pub mod engine;
pub mod error;
pub mod exif;
pub mod marker;
#[cfg(unix)]
pub mod pipe;
pub mod recompress;
pub mod transform;
pub mod types;

/// Test support (synthetic images, codec round-trips); not a stable API.
#[doc(hidden)]
pub mod testimg;

pub use coef::{CoefImage, ComponentPlane};
pub use error::{Error, Outcome, Result};
pub use exif::{splice_exif, Splice};
pub use marker::{CopyMarkers, SavedMarker};
#[cfg(unix)]
pub use pipe::create_pipe;
pub use recompress::{parse_max_memory, recompress, transcode, transform, Options};
pub use transform::{
    EdgePolicy, Region, Rotation, TransformKind, TransformRequest, TransformSpec,
};
pub use types::{
    clamp_quality, quality_scaling, ColorSpace, ComponentInfo, DctBlock, QuantTable,
    RestartInterval,
};
