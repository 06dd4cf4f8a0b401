//! The mozjpeg-sys codec boundary.
//!
//! Wraps the C library's compress/decompress contexts in ownership-scoped
//! guards with idempotent release, and translates its abrupt `error_exit`
//! convention into Rust control flow: the installed handler logs the
//! formatted message and panics with a [`CodecPanic`] payload, which
//! unwinds through the C frames (mozjpeg-sys is built with its default
//! `unwinding` feature) and is caught at the invocation's single recovery
//! point in the controller. Warnings go through the library's standard
//! `emit_message` counting; everything user-visible lands in the log sink
//! reachable from `client_data`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::mem;
use std::panic;
use std::path::Path;
use std::ptr;

use libc::{c_int, c_long, c_uint, c_ulong};
use mozjpeg_sys::{
    boolean, jpeg_alloc_quant_table, jpeg_c_set_int_param, jpeg_common_struct,
    jpeg_compress_struct, jpeg_copy_critical_parameters,
    jpeg_create_compress, jpeg_create_decompress, jpeg_decompress_struct,
    jpeg_destroy_compress, jpeg_destroy_decompress, jpeg_error_mgr, jpeg_finish_compress,
    jpeg_finish_decompress, jpeg_mem_dest, jpeg_mem_src, jpeg_progress_mgr, jpeg_read_coefficients,
    jpeg_read_header, jpeg_save_markers, jpeg_set_colorspace, jpeg_set_defaults,
    jpeg_simple_progression, jpeg_std_error, jpeg_write_coefficients, jpeg_write_marker,
    jvirt_barray_control, J_COLOR_SPACE, JCP_FASTEST, JINT_COMPRESS_PROFILE, JPOOL_IMAGE,
};

use crate::coef::{ceil_div, CoefImage, ComponentPlane};
use crate::consts::{ICC_CHUNK, ICC_PREFIX, JPEG_APP0, JPEG_COM, NUM_QUANT_TBLS};
use crate::error::{Error, Result};
use crate::marker::{CopyMarkers, SavedMarker};
use crate::types::{ColorSpace, ComponentInfo, QuantTable, RestartInterval};

/// Panic payload carried out of a codec `error_exit`; the recovery point
/// downcasts it back into [`Error::CodecFatal`].
pub(crate) struct CodecPanic(pub String);

/// The invocation's diagnostic log. Writes are best-effort; a failing log
/// write must never take down the pipeline.
pub(crate) struct LogSink {
    out: Option<BufWriter<File>>,
}

impl LogSink {
    pub fn create(path: &Path) -> Result<Box<LogSink>> {
        let file = File::create(path).map_err(|e| Error::io(path, e))?;
        Ok(Box::new(LogSink {
            out: Some(BufWriter::new(file)),
        }))
    }

    /// A sink that swallows everything (used by header probes and tests).
    pub fn discard() -> Box<LogSink> {
        Box::new(LogSink { out: None })
    }

    pub fn write_line(&mut self, line: &str) {
        if let Some(out) = &mut self.out {
            let _ = writeln!(out, "{}", line);
            let _ = out.flush();
        }
    }
}

/// Copyable raw handle to the invocation's log sink, shared with the codec
/// callbacks through `client_data`. All writes go through this handle so
/// the callbacks and the controller never hold overlapping borrows.
#[derive(Clone, Copy)]
pub(crate) struct SinkHandle(pub *mut LogSink);

impl SinkHandle {
    pub fn null() -> Self {
        SinkHandle(ptr::null_mut())
    }

    pub fn log(&self, line: &str) {
        unsafe {
            if let Some(sink) = self.0.as_mut() {
                sink.write_line(line);
            }
        }
    }
}

/// Format the library's pending message for a context.
unsafe fn format_message(cinfo: &mut jpeg_common_struct) -> String {
    let err = cinfo.err;
    if err.is_null() {
        return "unknown codec error".to_string();
    }
    match (*err).format_message {
        Some(format) => {
            // JMSG_LENGTH_MAX is 200; the binding's parameter type is
            // narrower, so hand it a window into a full-size buffer.
            let buffer = [0u8; 200];
            format(cinfo, &*(buffer.as_ptr() as *const [u8; 80]));
            let len = buffer.iter().position(|&b| b == 0).unwrap_or(buffer.len());
            String::from_utf8_lossy(&buffer[..len]).into_owned()
        }
        None => "unknown codec error".to_string(),
    }
}

unsafe extern "C-unwind" fn error_exit(cinfo: &mut jpeg_common_struct) {
    let message = format_message(cinfo);
    SinkHandle(cinfo.client_data.cast()).log(&message);
    panic::panic_any(CodecPanic(message));
}

unsafe extern "C-unwind" fn output_message(cinfo: &mut jpeg_common_struct) {
    let message = format_message(cinfo);
    SinkHandle(cinfo.client_data.cast()).log(&message);
}

fn error_manager(trace_level: i32) -> Box<jpeg_error_mgr> {
    unsafe {
        let mut err = Box::new(mem::zeroed::<jpeg_error_mgr>());
        jpeg_std_error(&mut err);
        err.error_exit = Some(error_exit);
        err.output_message = Some(output_message);
        err.trace_level = trace_level as c_int;
        err
    }
}

/// Progress monitor state: the fail-fast scan guard and coarse `-report`
/// style progress lines. The base struct must stay the first field so the
/// library's `progress` pointer doubles as a pointer to this.
#[repr(C)]
pub(crate) struct Progress {
    base: jpeg_progress_mgr,
    max_scans: u32,
    report: bool,
    last_decile: i32,
}

impl Progress {
    fn new(max_scans: u32, report: bool) -> Box<Progress> {
        Box::new(Progress {
            base: jpeg_progress_mgr {
                progress_monitor: Some(progress_monitor),
                pass_counter: 0,
                pass_limit: 0,
                completed_passes: 0,
                total_passes: 0,
            },
            max_scans,
            report,
            last_decile: -1,
        })
    }
}

unsafe extern "C-unwind" fn progress_monitor(cinfo: &mut jpeg_common_struct) {
    if cinfo.progress.is_null() {
        return;
    }
    let progress = &mut *(cinfo.progress as *mut Progress);
    if progress.max_scans != 0 && cinfo.is_decompressor != 0 {
        let dinfo = &*(cinfo as *mut jpeg_common_struct).cast::<jpeg_decompress_struct>();
        let scan = dinfo.input_scan_number.max(0) as u32;
        if scan > progress.max_scans {
            let message = format!(
                "scan number {} exceeds maximum scans ({})",
                scan, progress.max_scans
            );
            SinkHandle(cinfo.client_data.cast()).log(&message);
            panic::panic_any(CodecPanic(message));
        }
    }
    if progress.report {
        let pass_limit = progress.base.pass_limit.max(1);
        let total = (progress.base.total_passes.max(1) as i64) * pass_limit as i64;
        let done = progress.base.completed_passes as i64 * pass_limit as i64
            + progress.base.pass_counter as i64;
        let decile = ((done * 10) / total).clamp(0, 10) as i32;
        if decile != progress.last_decile {
            progress.last_decile = decile;
            SinkHandle(cinfo.client_data.cast()).log(&format!(
                "pass {}/{}: {}%",
                progress.base.completed_passes + 1,
                progress.base.total_passes.max(1),
                decile * 10
            ));
        }
    }
}

fn color_space_from_sys(cs: J_COLOR_SPACE) -> ColorSpace {
    match cs {
        J_COLOR_SPACE::JCS_GRAYSCALE => ColorSpace::Grayscale,
        J_COLOR_SPACE::JCS_RGB => ColorSpace::Rgb,
        J_COLOR_SPACE::JCS_YCbCr => ColorSpace::YCbCr,
        J_COLOR_SPACE::JCS_CMYK => ColorSpace::Cmyk,
        J_COLOR_SPACE::JCS_YCCK => ColorSpace::Ycck,
        _ => ColorSpace::Unknown,
    }
}

fn color_space_to_sys(cs: ColorSpace) -> J_COLOR_SPACE {
    match cs {
        ColorSpace::Grayscale => J_COLOR_SPACE::JCS_GRAYSCALE,
        ColorSpace::Rgb => J_COLOR_SPACE::JCS_RGB,
        ColorSpace::YCbCr => J_COLOR_SPACE::JCS_YCbCr,
        ColorSpace::Cmyk => J_COLOR_SPACE::JCS_CMYK,
        ColorSpace::Ycck => J_COLOR_SPACE::JCS_YCCK,
        ColorSpace::Unknown => J_COLOR_SPACE::JCS_UNKNOWN,
    }
}

/// Decompression context guard: owns the input bytes, the error manager
/// and the optional progress monitor; destroys the context exactly once
/// on every exit path.
pub(crate) struct Decoder {
    cinfo: Box<jpeg_decompress_struct>,
    _err: Box<jpeg_error_mgr>,
    _progress: Option<Box<Progress>>,
    _input: Box<[u8]>,
    finished: bool,
}

impl Decoder {
    /// Open `path`, wire up error/progress handling and the marker save
    /// rules, ready for [`Decoder::read_header`].
    pub fn open(
        path: &Path,
        sink: SinkHandle,
        trace_level: i32,
        max_memory: Option<i64>,
        copy: CopyMarkers,
        progress: Option<(u32, bool)>,
    ) -> Result<Decoder> {
        let input = std::fs::read(path)
            .map_err(|e| Error::io(path, e))?
            .into_boxed_slice();
        Ok(Self::from_vec(input, sink, trace_level, max_memory, copy, progress))
    }

    /// Same as [`Decoder::open`] but over in-memory bytes.
    pub fn from_bytes(
        bytes: &[u8],
        sink: SinkHandle,
        copy: CopyMarkers,
    ) -> Decoder {
        Self::from_vec(bytes.to_vec().into_boxed_slice(), sink, 0, None, copy, None)
    }

    fn from_vec(
        input: Box<[u8]>,
        sink: SinkHandle,
        trace_level: i32,
        max_memory: Option<i64>,
        copy: CopyMarkers,
        progress: Option<(u32, bool)>,
    ) -> Decoder {
        unsafe {
            let mut err = error_manager(trace_level);
            let mut cinfo = Box::new(mem::zeroed::<jpeg_decompress_struct>());
            cinfo.common.err = &mut *err;
            jpeg_create_decompress(&mut *cinfo);
            cinfo.common.client_data = sink.0.cast();
            if let Some(limit) = max_memory {
                (*cinfo.common.mem).max_memory_to_use = limit as c_long;
            }
            let mut progress = progress.map(|(scans, report)| Progress::new(scans, report));
            if let Some(p) = &mut progress {
                cinfo.common.progress = &mut p.base;
            }
            jpeg_mem_src(&mut cinfo, input.as_ptr(), input.len() as c_ulong);
            if copy.saves_comments() {
                jpeg_save_markers(&mut cinfo, JPEG_COM as c_int, 0xFFFF);
            }
            for n in 0..16 {
                if copy.saves_app(n) {
                    jpeg_save_markers(&mut cinfo, (JPEG_APP0 + n) as c_int, 0xFFFF);
                }
            }
            Decoder {
                cinfo,
                _err: err,
                _progress: progress,
                _input: input,
                finished: false,
            }
        }
    }

    /// Parse the source header (markers, frame parameters, tables).
    pub fn read_header(&mut self) {
        unsafe {
            jpeg_read_header(&mut self.cinfo, 1);
        }
    }

    /// The image layout known after the header: dimensions, components,
    /// quantization tables. Planes carry no coefficient data yet.
    pub fn header_image(&self) -> CoefImage {
        unsafe {
            let c = &*self.cinfo;
            let mut quant_tables: [Option<QuantTable>; NUM_QUANT_TBLS] = Default::default();
            for (slot, table) in quant_tables.iter_mut().enumerate() {
                let table_ptr = c.quant_tbl_ptrs[slot];
                if !table_ptr.is_null() {
                    *table = Some(QuantTable::new((*table_ptr).quantval));
                }
            }
            let components = (0..c.num_components.max(0) as usize)
                .map(|ci| {
                    let comp = &*c.comp_info.add(ci);
                    ComponentPlane {
                        info: ComponentInfo {
                            component_id: comp.component_id as u16,
                            h_samp_factor: comp.h_samp_factor as u8,
                            v_samp_factor: comp.v_samp_factor as u8,
                            quant_tbl_no: comp.quant_tbl_no as u8,
                        },
                        width_in_blocks: comp.width_in_blocks,
                        height_in_blocks: comp.height_in_blocks,
                        blocks: Vec::new(),
                    }
                })
                .collect();
            CoefImage {
                width: c.image_width,
                height: c.image_height,
                color_space: color_space_from_sys(c.jpeg_color_space),
                quant_tables,
                components,
            }
        }
    }

    /// Materialize the source's coefficient arrays into an owned image.
    pub fn read_coefficients(&mut self) -> Result<CoefImage> {
        unsafe {
            let coef_arrays = jpeg_read_coefficients(&mut self.cinfo);
            if coef_arrays.is_null() {
                return Err(Error::CodecFatal(
                    "failed to read source coefficients".to_string(),
                ));
            }
            let access = (*self.cinfo.common.mem)
                .access_virt_barray
                .ok_or_else(|| Error::CodecFatal("memory manager not initialized".to_string()))?;
            let mut img = self.header_image();
            for ci in 0..img.components.len() {
                let plane = &mut img.components[ci];
                plane.blocks =
                    vec![[0i16; 64]; (plane.width_in_blocks * plane.height_in_blocks) as usize];
                let barray = *coef_arrays.add(ci);
                for row in 0..plane.height_in_blocks {
                    let rows = access(&mut self.cinfo.common, barray, row, 1, 0);
                    let blocks =
                        std::slice::from_raw_parts(*rows, plane.width_in_blocks as usize);
                    let offset = (row * plane.width_in_blocks) as usize;
                    plane.blocks[offset..offset + blocks.len()].copy_from_slice(blocks);
                }
            }
            Ok(img)
        }
    }

    /// Auxiliary segments retained per the marker save rules.
    pub fn saved_markers(&self) -> Vec<SavedMarker> {
        unsafe {
            let mut markers = Vec::new();
            let mut node = self.cinfo.marker_list;
            while !node.is_null() {
                let m = &*node;
                let data = if m.data.is_null() || m.data_length == 0 {
                    Vec::new()
                } else {
                    std::slice::from_raw_parts(m.data, m.data_length as usize).to_vec()
                };
                markers.push(SavedMarker {
                    marker: m.marker,
                    data,
                });
                node = m.next;
            }
            markers
        }
    }

    /// Recoverable-anomaly count accumulated by this context so far.
    pub fn warnings(&self) -> u64 {
        unsafe { (*self.cinfo.common.err).num_warnings.max(0) as u64 }
    }

    /// Finish the input side; safe to call once all coefficients are read.
    pub fn finish(&mut self) {
        if !self.finished {
            self.finished = true;
            unsafe {
                jpeg_finish_decompress(&mut self.cinfo);
            }
        }
    }
}

impl Drop for Decoder {
    fn drop(&mut self) {
        unsafe {
            jpeg_destroy_decompress(&mut self.cinfo);
        }
    }
}

/// Stable home for the mem-dest buffer pointer; the library holds the
/// addresses of these fields until the compressor finishes.
struct MemDest {
    buf: *mut u8,
    size: c_ulong,
}

/// Compression context guard. The codec-allocated output buffer is freed
/// with `libc::free` on drop regardless of how far the pipeline got.
pub(crate) struct Encoder {
    cinfo: Box<jpeg_compress_struct>,
    _err: Box<jpeg_error_mgr>,
    _progress: Option<Box<Progress>>,
    mem_dest: Box<MemDest>,
    coef_ptrs: Vec<*mut jvirt_barray_control>,
}

impl Encoder {
    pub fn new(
        sink: SinkHandle,
        trace_level: i32,
        max_memory: Option<i64>,
        progress: Option<(u32, bool)>,
    ) -> Encoder {
        unsafe {
            let mut err = error_manager(trace_level);
            let mut cinfo = Box::new(mem::zeroed::<jpeg_compress_struct>());
            cinfo.common.err = &mut *err;
            jpeg_create_compress(&mut *cinfo);
            cinfo.common.client_data = sink.0.cast();
            if let Some(limit) = max_memory {
                (*cinfo.common.mem).max_memory_to_use = limit as c_long;
            }
            let mut progress = progress.map(|(scans, report)| Progress::new(scans, report));
            if let Some(p) = &mut progress {
                cinfo.common.progress = &mut p.base;
            }
            // Pin plain libjpeg-turbo behavior; the mozjpeg extensions
            // (trellis, scan optimization) do not apply to a coefficient
            // transcode and must not leak into jpeg_set_defaults.
            jpeg_c_set_int_param(&mut cinfo, JINT_COMPRESS_PROFILE, JCP_FASTEST as c_int);
            let mut mem_dest = Box::new(MemDest {
                buf: ptr::null_mut(),
                size: 0,
            });
            jpeg_mem_dest(&mut cinfo, &mut mem_dest.buf, &mut mem_dest.size);
            Encoder {
                cinfo,
                _err: err,
                _progress: progress,
                mem_dest,
                coef_ptrs: Vec::new(),
            }
        }
    }

    /// Copy critical parameters (dimensions, sampling, color space,
    /// tables, JFIF versioning) from a parsed source.
    pub fn copy_critical_parameters(&mut self, src: &Decoder) {
        unsafe {
            jpeg_copy_critical_parameters(&src.cinfo, &mut self.cinfo);
        }
    }

    /// Initialize parameters from scratch for a synthesized image.
    pub fn defaults_for(&mut self, img: &CoefImage) {
        unsafe {
            let c = &mut *self.cinfo;
            c.image_width = img.width;
            c.image_height = img.height;
            c.input_components = img.components.len() as c_int;
            c.in_color_space = color_space_to_sys(img.color_space);
            jpeg_set_defaults(c);
            jpeg_set_colorspace(c, color_space_to_sys(img.color_space));
        }
    }

    /// Make the destination descriptor agree with the (possibly
    /// transformed) image: dimensions, color space, per-component
    /// sampling factors and quantization tables.
    pub fn sync_image(&mut self, img: &CoefImage) -> Result<()> {
        unsafe {
            let c = &mut *self.cinfo;
            c.image_width = img.width;
            c.image_height = img.height;
            let target = color_space_to_sys(img.color_space);
            if c.jpeg_color_space != target {
                jpeg_set_colorspace(c, target);
            }
            if c.num_components.max(0) as usize != img.components.len() {
                return Err(Error::CodecFatal(format!(
                    "component count mismatch: {} in descriptor, {} in image",
                    c.num_components,
                    img.components.len()
                )));
            }
            for (ci, plane) in img.components.iter().enumerate() {
                let comp = &mut *c.comp_info.add(ci);
                comp.component_id = plane.info.component_id as c_int;
                comp.h_samp_factor = plane.info.h_samp_factor as c_int;
                comp.v_samp_factor = plane.info.v_samp_factor as c_int;
                comp.quant_tbl_no = plane.info.quant_tbl_no as c_int;
            }
            for slot in 0..NUM_QUANT_TBLS {
                if let Some(table) = &img.quant_tables[slot] {
                    if c.quant_tbl_ptrs[slot].is_null() {
                        c.quant_tbl_ptrs[slot] = jpeg_alloc_quant_table(&mut c.common);
                    }
                    (*c.quant_tbl_ptrs[slot]).quantval = table.values;
                }
            }
        }
        Ok(())
    }

    pub fn set_optimize_coding(&mut self, on: bool) {
        self.cinfo.optimize_coding = on as boolean;
    }

    pub fn set_arithmetic(&mut self, on: bool) {
        self.cinfo.arith_code = on as boolean;
    }

    /// Simple progression when on; an explicit single-scan baseline
    /// script otherwise.
    pub fn set_progressive(&mut self, on: bool) {
        unsafe {
            if on {
                jpeg_simple_progression(&mut self.cinfo);
            } else {
                self.cinfo.num_scans = 0;
                self.cinfo.scan_info = ptr::null();
            }
        }
    }

    pub fn set_restart_interval(&mut self, restart: RestartInterval) {
        match restart {
            RestartInterval::Rows(rows) => {
                self.cinfo.restart_in_rows = rows as c_int;
            }
            RestartInterval::Blocks(blocks) => {
                self.cinfo.restart_interval = blocks as c_uint;
                self.cinfo.restart_in_rows = 0;
            }
        }
    }

    /// Will the encoder emit a JFIF APP0 of its own?
    pub fn writes_jfif(&self) -> bool {
        self.cinfo.write_JFIF_header != 0
    }

    /// Will the encoder emit an Adobe APP14 of its own?
    pub fn writes_adobe(&self) -> bool {
        self.cinfo.write_Adobe_marker != 0
    }

    /// Allocate the destination coefficient arrays (iMCU padded,
    /// pre-zeroed) and start the compressor. No scan data is written yet;
    /// markers may follow until [`Encoder::fill_and_finish`].
    pub fn start(&mut self, img: &CoefImage) -> Result<()> {
        unsafe {
            let request = (*self.cinfo.common.mem)
                .request_virt_barray
                .ok_or_else(|| Error::CodecFatal("memory manager not initialized".to_string()))?;
            let mut ptrs = Vec::with_capacity(img.components.len());
            for plane in &img.components {
                let h = plane.info.h_samp_factor as u32;
                let v = plane.info.v_samp_factor as u32;
                let padded_w = ceil_div(plane.width_in_blocks.max(1), h) * h;
                let padded_h = ceil_div(plane.height_in_blocks.max(1), v) * v;
                ptrs.push(request(
                    &mut self.cinfo.common,
                    JPOOL_IMAGE,
                    1,
                    padded_w,
                    padded_h,
                    v,
                ));
            }
            self.coef_ptrs = ptrs;
            jpeg_write_coefficients(&mut self.cinfo, self.coef_ptrs.as_mut_ptr());
        }
        Ok(())
    }

    /// Re-emit one retained auxiliary segment.
    pub fn write_marker(&mut self, marker: &SavedMarker) {
        unsafe {
            jpeg_write_marker(
                &mut self.cinfo,
                marker.marker as c_int,
                marker.data.as_ptr(),
                marker.data.len() as c_uint,
            );
        }
    }

    /// Embed an ICC profile as chunked APP2 segments.
    pub fn write_icc_profile(&mut self, icc: &[u8]) {
        let chunks: Vec<&[u8]> = icc.chunks(ICC_CHUNK).collect();
        let num_markers = chunks.len() as u8;
        for (index, chunk) in chunks.iter().enumerate() {
            let mut data = Vec::with_capacity(ICC_PREFIX.len() + 2 + chunk.len());
            data.extend_from_slice(ICC_PREFIX);
            data.push(index as u8 + 1);
            data.push(num_markers);
            data.extend_from_slice(chunk);
            self.write_marker(&SavedMarker {
                marker: JPEG_APP0 + 2,
                data,
            });
        }
    }

    /// Copy the image's blocks into the destination arrays and run the
    /// entropy-coding passes.
    pub fn fill_and_finish(&mut self, img: &CoefImage) -> Result<()> {
        unsafe {
            let access = (*self.cinfo.common.mem)
                .access_virt_barray
                .ok_or_else(|| Error::CodecFatal("memory manager not initialized".to_string()))?;
            for (ci, plane) in img.components.iter().enumerate() {
                let barray = self.coef_ptrs[ci];
                for row in 0..plane.height_in_blocks {
                    let rows = access(&mut self.cinfo.common, barray, row, 1, 1);
                    let dst =
                        std::slice::from_raw_parts_mut(*rows, plane.width_in_blocks as usize);
                    let offset = (row * plane.width_in_blocks) as usize;
                    dst.copy_from_slice(&plane.blocks[offset..offset + dst.len()]);
                }
            }
            jpeg_finish_compress(&mut self.cinfo);
        }
        Ok(())
    }

    /// The finished JPEG stream (valid after [`Encoder::fill_and_finish`]).
    pub fn bytes(&self) -> &[u8] {
        unsafe {
            if self.mem_dest.buf.is_null() || self.mem_dest.size == 0 {
                &[]
            } else {
                std::slice::from_raw_parts(self.mem_dest.buf, self.mem_dest.size as usize)
            }
        }
    }

    /// Recoverable-anomaly count accumulated by this context so far.
    pub fn warnings(&self) -> u64 {
        unsafe { (*self.cinfo.common.err).num_warnings.max(0) as u64 }
    }
}

impl Drop for Encoder {
    fn drop(&mut self) {
        unsafe {
            jpeg_destroy_compress(&mut self.cinfo);
            if !self.mem_dest.buf.is_null() {
                libc::free(self.mem_dest.buf.cast());
                self.mem_dest.buf = ptr::null_mut();
                self.mem_dest.size = 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_space_round_trip() {
        for cs in [
            ColorSpace::Grayscale,
            ColorSpace::Rgb,
            ColorSpace::YCbCr,
            ColorSpace::Cmyk,
            ColorSpace::Ycck,
        ] {
            assert_eq!(color_space_from_sys(color_space_to_sys(cs)), cs);
        }
        assert_eq!(
            color_space_from_sys(J_COLOR_SPACE::JCS_EXT_RGBA),
            ColorSpace::Unknown
        );
    }

    #[test]
    fn icc_chunking_layout() {
        // chunk layout is pure arithmetic; verify the boundaries without
        // driving the compressor
        let profile = vec![0xAB; ICC_CHUNK + 10];
        let chunks: Vec<&[u8]> = profile.chunks(ICC_CHUNK).collect();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].len(), ICC_CHUNK);
        assert_eq!(chunks[1].len(), 10);
    }
}
