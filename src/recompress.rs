//! The recompression controller: drives decode-to-coefficients, the
//! optional coefficient-domain transform, and re-encode-from-coefficients.
//!
//! One invocation owns a bounded resource set (log sink, input bytes,
//! source/destination codec contexts, optional drop-source context, the
//! codec-allocated output buffer). Every resource is an ownership-scoped
//! guard with idempotent release, and a single `catch_unwind` recovery
//! point converts the codec's abrupt `error_exit` into the standard
//! Failure outcome after the guards have swept. The destination file is
//! only written once the whole pipeline has finished, so a failing
//! transform never leaves a partially-written destination behind.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use crate::codec::{CodecPanic, Decoder, Encoder, LogSink, SinkHandle};
use crate::engine;
use crate::error::{Error, Outcome, Result};
use crate::marker::CopyMarkers;
use crate::transform::{TransformRequest, TransformSpec};
use crate::types::RestartInterval;

/// Recompression options for one invocation.
///
/// Defaults match jpegtran: copy comment markers, baseline Huffman
/// output, no limits, lossless (no requantization).
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Requantize to this quality rating (0-100, clamped; standard IJG
    /// table scaling). `None` keeps the source tables bit-exactly.
    pub quality: Option<i32>,
    /// Optimize entropy-coding parameters (`-optimize`).
    pub optimize: bool,
    /// Emit a progressive scan script (`-progressive`).
    pub progressive: bool,
    /// Use arithmetic entropy coding (`-arithmetic`).
    pub arithmetic: bool,
    /// Which auxiliary markers to copy (`-copy`).
    pub copy: CopyMarkers,
    /// Embed the ICC profile read from this file (`-icc FILE`); any
    /// copied profile markers are suppressed so it is never duplicated.
    pub icc_file: Option<PathBuf>,
    /// Memory ceiling for each codec context, in bytes (`-maxmemory`).
    pub max_memory: Option<i64>,
    /// Abort if the source has more scans than this; 0 means unlimited
    /// (`-maxscans`).
    pub max_scans: u32,
    /// Restart marker interval (`-restart N[B]`).
    pub restart: Option<RestartInterval>,
    /// Treat accumulated codec warnings as fatal (`-strict`).
    pub strict: bool,
    /// Emit coarse progress lines to the log (`-report`).
    pub report: bool,
    /// Trace verbosity; each `-verbose` increments it, and any nonzero
    /// value prints the one-time banner.
    pub verbose: u32,
}

/// Parse a `-maxmemory N[m]` argument into bytes (N is in kilobytes,
/// with an `m`/`M` suffix meaning megabytes).
pub fn parse_max_memory(spec: &str) -> Option<i64> {
    let (digits, mega) = match spec.strip_suffix(['m', 'M']) {
        Some(rest) => (rest, true),
        None => (spec, false),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: i64 = digits.parse().ok()?;
    Some(value * if mega { 1_000_000 } else { 1_000 })
}

/// Pure recompression of `input` into `output`: all markers copied, no
/// geometric transform. This is the classic reencode entry point.
///
/// Diagnostics land in `log`; the returned [`Outcome`] maps onto the
/// 0/2/1 exit-code convention.
pub fn transcode(
    input: &Path,
    output: &Path,
    log: &Path,
    quality: i32,
    progressive: bool,
    optimize: bool,
    verbose: bool,
) -> Outcome {
    let options = Options {
        quality: Some(quality),
        progressive,
        optimize,
        copy: CopyMarkers::All,
        verbose: verbose as u32,
        ..Options::default()
    };
    recompress(input, output, log, &options, &TransformSpec::none())
}

/// The full jpegtran-style pipeline: folds `requests` into a transform
/// spec, then recompresses with it.
pub fn transform(
    input: &Path,
    output: &Path,
    log: &Path,
    requests: &[TransformRequest<'_>],
    options: &Options,
) -> Outcome {
    let mut sink = match LogSink::create(log) {
        Ok(sink) => sink,
        Err(e) => return Outcome::Failure(e),
    };
    let handle = SinkHandle(&mut *sink);
    // Validation-layer errors surface before any image resource is touched.
    let spec = match TransformSpec::from_requests(requests) {
        Ok(spec) => spec,
        Err(e) => {
            handle.log(&e.to_string());
            return Outcome::Failure(e);
        }
    };
    run(input, output, handle, options, &spec)
}

/// Recompress with an already-validated transform spec.
pub fn recompress(
    input: &Path,
    output: &Path,
    log: &Path,
    options: &Options,
    spec: &TransformSpec,
) -> Outcome {
    let mut sink = match LogSink::create(log) {
        Ok(sink) => sink,
        Err(e) => return Outcome::Failure(e),
    };
    let handle = SinkHandle(&mut *sink);
    run(input, output, handle, options, spec)
}

fn run(
    input: &Path,
    output: &Path,
    handle: SinkHandle,
    options: &Options,
    spec: &TransformSpec,
) -> Outcome {
    match run_guarded(input, output, handle, options, spec) {
        Ok(warnings) => {
            let outcome = Outcome::from_warnings(warnings, options.strict);
            if let Outcome::Failure(e) = &outcome {
                handle.log(&e.to_string());
            }
            outcome
        }
        Err(e) => {
            // codec fatals were already written to the log by the handler
            if !matches!(e, Error::CodecFatal(_)) {
                handle.log(&e.to_string());
            }
            Outcome::Failure(e)
        }
    }
}

fn run_guarded(
    input: &Path,
    output: &Path,
    handle: SinkHandle,
    options: &Options,
    spec: &TransformSpec,
) -> Result<u64> {
    let icc = match &options.icc_file {
        Some(path) => Some(std::fs::read(path).map_err(|e| Error::io(path, e))?),
        None => None,
    };
    let copy = if icc.is_some() {
        options.copy.with_icc_override()
    } else {
        options.copy
    };

    // The recovery point: an abrupt codec exit unwinds to here, after the
    // context guards inside the closure have already released everything
    // they own.
    let phase = panic::catch_unwind(AssertUnwindSafe(|| {
        codec_phase(input, handle, options, spec, copy, icc.as_deref())
    }));
    let (bytes, warnings) = match phase {
        Ok(result) => result?,
        Err(payload) => return Err(translate_panic(payload)),
    };

    std::fs::write(output, &bytes).map_err(|e| {
        // never leave a truncated destination behind
        let _ = std::fs::remove_file(output);
        Error::io(output, e)
    })?;
    Ok(warnings)
}

fn codec_phase(
    input: &Path,
    handle: SinkHandle,
    options: &Options,
    spec: &TransformSpec,
    copy: CopyMarkers,
    icc: Option<&[u8]>,
) -> Result<(Vec<u8>, u64)> {
    let trace_level = options.verbose as i32;
    if options.verbose > 0 {
        handle.log(&format!(
            "{} version {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        ));
        handle.log("coefficient-domain JPEG transcoder on mozjpeg");
    }

    let read_progress =
        (options.max_scans > 0 || options.report).then_some((options.max_scans, options.report));
    let mut decoder = Decoder::open(
        input,
        handle,
        trace_level,
        options.max_memory,
        copy,
        read_progress,
    )?;
    decoder.read_header();

    let mut drop_decoder = match &spec.drop_path {
        Some(path) => {
            let mut dropped = Decoder::open(
                path,
                handle,
                trace_level,
                options.max_memory,
                CopyMarkers::None,
                None,
            )?;
            dropped.read_header();
            Some(dropped)
        }
        None => None,
    };

    // Plan against header information only, so a perfect-policy failure
    // happens before any coefficients are materialized.
    let src_header = decoder.header_image();
    let drop_header = drop_decoder.as_ref().map(|d| d.header_image());
    let plan = engine::plan(spec, &src_header, drop_header.as_ref())?;

    let src_img = decoder.read_coefficients()?;
    let drop_img = match &mut drop_decoder {
        Some(dropped) => Some(dropped.read_coefficients()?),
        None => None,
    };

    let mut img = engine::execute(src_img, drop_img.as_ref(), &plan)?;
    if let Some(quality) = options.quality {
        engine::requantize_to_quality(&mut img, quality)?;
    }

    let write_progress = options.report.then_some((0, true));
    let mut encoder = Encoder::new(handle, trace_level, options.max_memory, write_progress);
    encoder.copy_critical_parameters(&decoder);
    encoder.sync_image(&img)?;
    encoder.set_optimize_coding(options.optimize);
    encoder.set_arithmetic(options.arithmetic);
    encoder.set_progressive(options.progressive);
    if let Some(restart) = options.restart {
        encoder.set_restart_interval(restart);
    }

    encoder.start(&img)?;
    // Profile segments and other markers must precede scan data.
    let writes_jfif = encoder.writes_jfif();
    let writes_adobe = encoder.writes_adobe();
    for marker in decoder.saved_markers() {
        if copy.keeps(&marker, writes_jfif, writes_adobe) {
            encoder.write_marker(&marker);
        }
    }
    if let Some(profile) = icc {
        encoder.write_icc_profile(profile);
    }
    encoder.fill_and_finish(&img)?;

    decoder.finish();
    if let Some(dropped) = &mut drop_decoder {
        dropped.finish();
    }

    let warnings = decoder.warnings()
        + encoder.warnings()
        + drop_decoder.as_ref().map_or(0, |d| d.warnings());
    let bytes = encoder.bytes().to_vec();
    Ok((bytes, warnings))
}

fn translate_panic(payload: Box<dyn Any + Send>) -> Error {
    match payload.downcast::<CodecPanic>() {
        Ok(codec) => Error::CodecFatal(codec.0),
        Err(other) => {
            let message = other
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| other.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unexpected internal failure".to_string());
            Error::CodecFatal(message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_memory_parsing() {
        assert_eq!(parse_max_memory("4096"), Some(4_096_000));
        assert_eq!(parse_max_memory("40m"), Some(40_000_000));
        assert_eq!(parse_max_memory("40M"), Some(40_000_000));
        assert_eq!(parse_max_memory(""), None);
        assert_eq!(parse_max_memory("m"), None);
        assert_eq!(parse_max_memory("4x"), None);
    }

    #[test]
    fn default_options_match_jpegtran() {
        let options = Options::default();
        assert_eq!(options.copy, CopyMarkers::Comments);
        assert_eq!(options.quality, None);
        assert!(!options.optimize && !options.progressive && !options.strict);
        assert_eq!(options.max_scans, 0);
    }

    #[test]
    fn translate_panic_recovers_codec_message() {
        let payload: Box<dyn Any + Send> = Box::new(CodecPanic("Bogus marker length".into()));
        match translate_panic(payload) {
            Error::CodecFatal(msg) => assert_eq!(msg, "Bogus marker length"),
            other => panic!("unexpected {:?}", other),
        }

        let payload: Box<dyn Any + Send> = Box::new("plain panic");
        assert!(matches!(translate_panic(payload), Error::CodecFatal(_)));
    }
}
