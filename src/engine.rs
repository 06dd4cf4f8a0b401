//! The coefficient transform engine.
//!
//! Geometric transforms are pure permutations of 8x8 coefficient blocks
//! combined with fixed per-transform sign adjustments; no sample data is
//! ever decoded. Planning happens against header information only, so a
//! transform that cannot be performed losslessly under the perfect policy
//! fails before any coefficients are read or output written.
//!
//! Block-content identities (held as invariants and cross-checked in the
//! tests): Rot90 = Transpose . FlipV, Rot180 = FlipH . FlipV,
//! Rot270 = Transpose . FlipH, Transverse = Transpose . Rot180.

use crate::coef::{ceil_div, CoefImage};
use crate::consts::{DCTSIZE, NEUTRAL_DC, NUM_QUANT_TBLS};
use crate::error::{Error, Result};
use crate::transform::{EdgePolicy, TransformKind, TransformSpec};
use crate::types::{clamp_quality, DctBlock, QuantTable};

/// Resolved geometry for one transform invocation: output dimensions,
/// iMCU-aligned region, and the drop requantization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    kind: TransformKind,
    grayscale: bool,
    /// Output dimensions after transposition and trimming.
    pub output_width: u32,
    /// Output dimensions after transposition and trimming.
    pub output_height: u32,
    // Region position in iMCU units (crop/wipe/drop).
    x_crop_offset: u32,
    y_crop_offset: u32,
    // Region extent in iMCU units (wipe/drop).
    region_imcu_w: u32,
    region_imcu_h: u32,
    requantize_drop: bool,
}

/// Validate the requested transform against the source (and drop) header
/// and compute the output geometry.
///
/// `src` and `drop` only need header information (dimensions, sampling
/// factors, quantization tables); coefficient data is not consulted.
pub fn plan(spec: &TransformSpec, src: &CoefImage, drop: Option<&CoefImage>) -> Result<Plan> {
    // Grayscale reduction happens before the geometric transform, so the
    // effective grid is the single-component one when it is requested.
    let (mcu_w, mcu_h) = if spec.grayscale {
        (DCTSIZE as u32, DCTSIZE as u32)
    } else {
        (src.mcu_width(), src.mcu_height())
    };
    let transposes = spec.kind.transposes();
    let (mut out_w, mut out_h) = if transposes {
        (src.height, src.width)
    } else {
        (src.width, src.height)
    };
    // iMCU geometry of the *output* image.
    let (out_mcu_w, out_mcu_h) = if transposes { (mcu_h, mcu_w) } else { (mcu_w, mcu_h) };

    let mut plan = Plan {
        kind: spec.kind,
        grayscale: spec.grayscale,
        output_width: out_w,
        output_height: out_h,
        x_crop_offset: 0,
        y_crop_offset: 0,
        region_imcu_w: 0,
        region_imcu_h: 0,
        requantize_drop: false,
    };

    match spec.kind {
        TransformKind::Crop => {
            let region = spec.region.unwrap_or_default();
            let (x, y) = (region.x, region.y);
            if x >= out_w || y >= out_h {
                return Err(bad_region(&spec.kind, &region));
            }
            let w = region.width.unwrap_or(out_w - x);
            let h = region.height.unwrap_or(out_h - y);
            if w == 0 || h == 0 || w > out_w - x || h > out_h - y {
                return Err(bad_region(&spec.kind, &region));
            }
            // Align the corner down to an iMCU boundary; the region grows
            // by the adjustment so it still covers the request.
            let xa = x - x % mcu_w;
            let ya = y - y % mcu_h;
            out_w = w + (x - xa);
            out_h = h + (y - ya);
            plan.x_crop_offset = xa / mcu_w;
            plan.y_crop_offset = ya / mcu_h;
        }
        TransformKind::Wipe => {
            let region = spec.region.unwrap_or_default();
            let (x, y) = (region.x, region.y);
            if x >= out_w || y >= out_h {
                return Err(bad_region(&spec.kind, &region));
            }
            let w = region.width.unwrap_or(out_w - x);
            let h = region.height.unwrap_or(out_h - y);
            if w == 0 || h == 0 || w > out_w - x || h > out_h - y {
                return Err(bad_region(&spec.kind, &region));
            }
            // The effective region expands outward to whole iMCUs.
            let xa = x - x % mcu_w;
            let ya = y - y % mcu_h;
            plan.x_crop_offset = xa / mcu_w;
            plan.y_crop_offset = ya / mcu_h;
            plan.region_imcu_w = ceil_div(w + (x - xa), mcu_w)
                .min(ceil_div(out_w, mcu_w) - plan.x_crop_offset);
            plan.region_imcu_h = ceil_div(h + (y - ya), mcu_h)
                .min(ceil_div(out_h, mcu_h) - plan.y_crop_offset);
        }
        TransformKind::Drop => {
            let drop_img = drop.ok_or_else(|| {
                Error::DropSizeMismatch("no drop image supplied".to_string())
            })?;
            let region = spec.region.unwrap_or_default();
            // Align the insertion point *up* so the effective region never
            // starts before the requested position.
            let xa = ceil_div(region.x, mcu_w) * mcu_w;
            let ya = ceil_div(region.y, mcu_h) * mcu_h;
            if xa >= out_w || ya >= out_h {
                return Err(bad_region(&spec.kind, &region));
            }
            let (dx, dy) = (xa - region.x, ya - region.y);
            plan.x_crop_offset = xa / mcu_w;
            plan.y_crop_offset = ya / mcu_h;
            plan.region_imcu_w = if drop_img.width <= dx {
                0
            } else {
                ceil_div(drop_img.width - dx, mcu_w)
                    .min(ceil_div(out_w, mcu_w) - plan.x_crop_offset)
            };
            plan.region_imcu_h = if drop_img.height <= dy {
                0
            } else {
                ceil_div(drop_img.height - dy, mcu_h)
                    .min(ceil_div(out_h, mcu_h) - plan.y_crop_offset)
            };
            plan.requantize_drop = spec.trim;
            check_drop_compatibility(src, drop_img, spec.grayscale, plan.requantize_drop)?;
        }
        _ => {}
    }

    match spec.edge_policy() {
        EdgePolicy::Perfect => {
            if !is_perfect(spec.kind, src.width, src.height, mcu_w, mcu_h) {
                return Err(Error::NonTransformableEdge);
            }
        }
        EdgePolicy::Trim => {
            let (trim_w, trim_h) = match spec.kind {
                TransformKind::FlipH | TransformKind::Rot90 => (true, false),
                TransformKind::FlipV | TransformKind::Rot270 => (false, true),
                TransformKind::Rot180 | TransformKind::Transverse => (true, true),
                _ => (false, false),
            };
            if trim_w {
                let rem = out_w % out_mcu_w;
                if rem > 0 && out_w > rem {
                    out_w -= rem;
                }
            }
            if trim_h {
                let rem = out_h % out_mcu_h;
                if rem > 0 && out_h > rem {
                    out_h -= rem;
                }
            }
        }
        EdgePolicy::Allow => {}
    }

    plan.output_width = out_w;
    plan.output_height = out_h;
    Ok(plan)
}

fn bad_region(kind: &TransformKind, region: &crate::transform::Region) -> Error {
    Error::BadGeometry(format!(
        "{:?} region {}x{}+{}+{} does not fit the image",
        kind,
        region.width.map_or("*".to_string(), |w| w.to_string()),
        region.height.map_or("*".to_string(), |h| h.to_string()),
        region.x,
        region.y
    ))
}

/// True when the transform moves no partial edge blocks
/// (jtransform_perfect_transform).
fn is_perfect(kind: TransformKind, width: u32, height: u32, mcu_w: u32, mcu_h: u32) -> bool {
    match kind {
        TransformKind::FlipH | TransformKind::Rot270 => width % mcu_w == 0,
        TransformKind::FlipV | TransformKind::Rot90 => height % mcu_h == 0,
        TransformKind::Rot180 | TransformKind::Transverse => {
            width % mcu_w == 0 && height % mcu_h == 0
        }
        _ => true,
    }
}

fn check_drop_compatibility(
    src: &CoefImage,
    drop: &CoefImage,
    grayscale: bool,
    requantize: bool,
) -> Result<()> {
    let shared = if grayscale {
        1
    } else {
        src.components.len().min(drop.components.len())
    };
    let (src_h, src_v) = (src.max_h_samp(), src.max_v_samp());
    let (drop_h, drop_v) = (drop.max_h_samp(), drop.max_v_samp());
    for ci in 0..shared {
        let s = src.components[ci].info;
        let d = drop.components[ci].info;
        if d.h_samp_factor as u32 * src_h != s.h_samp_factor as u32 * drop_h
            || d.v_samp_factor as u32 * src_v != s.v_samp_factor as u32 * drop_v
        {
            return Err(Error::DropSizeMismatch(format!(
                "component {} sampling factors {}x{} do not match {}x{}",
                ci, d.h_samp_factor, d.v_samp_factor, s.h_samp_factor, s.v_samp_factor
            )));
        }
        let src_table = src.quant_table_for(ci);
        let drop_table = drop.quant_table_for(ci);
        match (src_table, drop_table) {
            (Some(s_tbl), Some(d_tbl)) => {
                if !requantize && s_tbl.values != d_tbl.values {
                    return Err(Error::DropSizeMismatch(format!(
                        "component {} quantization tables differ (use trim to requantize)",
                        ci
                    )));
                }
            }
            _ => {
                return Err(Error::DropSizeMismatch(format!(
                    "component {} has no quantization table",
                    ci
                )));
            }
        }
    }
    Ok(())
}

/// Execute the planned transform, consuming the source image.
pub fn execute(
    src: CoefImage,
    drop: Option<&CoefImage>,
    plan: &Plan,
) -> Result<CoefImage> {
    let mut img = src;
    if plan.grayscale {
        img.force_grayscale();
    }
    let img = match plan.kind {
        TransformKind::None => img,
        TransformKind::FlipH => flip_h(&img, plan),
        TransformKind::FlipV => flip_v(&img, plan),
        TransformKind::Transpose => transpose(&img, plan),
        TransformKind::Transverse => transverse(&img, plan),
        TransformKind::Rot90 => rot90(&img, plan),
        TransformKind::Rot180 => rot180(&img, plan),
        TransformKind::Rot270 => rot270(&img, plan),
        TransformKind::Crop => crop(&img, plan),
        TransformKind::Wipe => {
            let mut img = img;
            wipe(&mut img, plan);
            img
        }
        TransformKind::Drop => {
            let mut img = img;
            let drop_img = drop.ok_or_else(|| {
                Error::DropSizeMismatch("no drop image supplied".to_string())
            })?;
            drop_into(&mut img, drop_img, plan)?;
            img
        }
    };
    Ok(img)
}

/// Requantize every coefficient to the Annex K tables scaled for the given
/// quality rating, installing the new tables on the image. Out-of-range
/// ratings clamp to 0..=100 first.
pub fn requantize_to_quality(img: &mut CoefImage, quality: i32) -> Result<()> {
    let quality = clamp_quality(quality);
    let mut new_tables: [Option<QuantTable>; NUM_QUANT_TBLS] = Default::default();
    for slot in 0..NUM_QUANT_TBLS {
        if img.quant_tables[slot].is_some() {
            new_tables[slot] = Some(QuantTable::for_quality(slot, quality));
        }
    }
    for ci in 0..img.components.len() {
        let slot = img.components[ci].info.quant_tbl_no as usize;
        let from = img.quant_tables[slot].ok_or_else(|| {
            Error::CodecFatal(format!("component {} has no quantization table", ci))
        })?;
        let to = new_tables[slot].ok_or_else(|| {
            Error::CodecFatal(format!("component {} has no quantization table", ci))
        })?;
        for block in &mut img.components[ci].blocks {
            requantize_block(block, &from, &to);
        }
    }
    img.quant_tables = new_tables;
    Ok(())
}

/// Rescale one block from one quantization table to another with
/// symmetric (round-half-away-from-zero) rounding.
fn requantize_block(block: &mut DctBlock, from: &QuantTable, to: &QuantTable) {
    for k in 0..block.len() {
        let dequantized = block[k] as i32 * from.values[k] as i32;
        let q = to.values[k] as i32;
        let v = if dequantized < 0 {
            -((-dequantized + q / 2) / q)
        } else {
            (dequantized + q / 2) / q
        };
        block[k] = v.clamp(i16::MIN as i32, i16::MAX as i32) as i16;
    }
}

// Block-content primitives. A horizontal pixel mirror negates the odd
// horizontal frequencies, a vertical mirror the odd vertical ones, and a
// transposition swaps the frequency axes.

fn flip_h_block(block: &DctBlock) -> DctBlock {
    let mut out = *block;
    for row in 0..DCTSIZE {
        for col in (1..DCTSIZE).step_by(2) {
            out[row * DCTSIZE + col] = -out[row * DCTSIZE + col];
        }
    }
    out
}

fn flip_v_block(block: &DctBlock) -> DctBlock {
    let mut out = *block;
    for row in (1..DCTSIZE).step_by(2) {
        for col in 0..DCTSIZE {
            out[row * DCTSIZE + col] = -out[row * DCTSIZE + col];
        }
    }
    out
}

fn transpose_block(block: &DctBlock) -> DctBlock {
    let mut out = [0i16; 64];
    for row in 0..DCTSIZE {
        for col in 0..DCTSIZE {
            out[col * DCTSIZE + row] = block[row * DCTSIZE + col];
        }
    }
    out
}

fn rot90_block(block: &DctBlock) -> DctBlock {
    transpose_block(&flip_v_block(block))
}

fn rot180_block(block: &DctBlock) -> DctBlock {
    flip_h_block(&flip_v_block(block))
}

fn rot270_block(block: &DctBlock) -> DctBlock {
    transpose_block(&flip_h_block(block))
}

// Per-component counts of blocks covered by *whole* iMCUs; only these can
// be mirrored losslessly.

fn full_width_blocks(img: &CoefImage, ci: usize) -> u32 {
    (img.width / img.mcu_width()) * img.components[ci].info.h_samp_factor as u32
}

fn full_height_blocks(img: &CoefImage, ci: usize) -> u32 {
    (img.height / img.mcu_height()) * img.components[ci].info.v_samp_factor as u32
}

/// Allocate the output image for a transform, transposing sampling factors
/// and quantization tables when the axes swap.
fn output_image(src: &CoefImage, plan: &Plan) -> CoefImage {
    let transposes = plan.kind.transposes();
    let infos: Vec<_> = src
        .components
        .iter()
        .map(|c| {
            if transposes {
                c.info.transposed()
            } else {
                c.info
            }
        })
        .collect();
    let mut tables = src.quant_tables;
    if transposes {
        for table in tables.iter_mut().flatten() {
            *table = table.transposed();
        }
    }
    CoefImage::new(
        plan.output_width,
        plan.output_height,
        src.color_space,
        &infos,
        tables,
    )
}

fn flip_h(src: &CoefImage, plan: &Plan) -> CoefImage {
    let mut out = output_image(src, plan);
    for ci in 0..src.components.len() {
        let wb_full = full_width_blocks(src, ci);
        let (plane, src_plane) = (&mut out.components[ci], &src.components[ci]);
        for y in 0..plane.height_in_blocks {
            for x in 0..plane.width_in_blocks {
                let block = if x < wb_full {
                    flip_h_block(src_plane.block(wb_full - 1 - x, y))
                } else {
                    // partial iMCU at the right edge: passed through in place
                    *src_plane.block(x, y)
                };
                plane.set_block(x, y, block);
            }
        }
    }
    out
}

fn flip_v(src: &CoefImage, plan: &Plan) -> CoefImage {
    let mut out = output_image(src, plan);
    for ci in 0..src.components.len() {
        let hb_full = full_height_blocks(src, ci);
        let (plane, src_plane) = (&mut out.components[ci], &src.components[ci]);
        for y in 0..plane.height_in_blocks {
            for x in 0..plane.width_in_blocks {
                let block = if y < hb_full {
                    flip_v_block(src_plane.block(x, hb_full - 1 - y))
                } else {
                    *src_plane.block(x, y)
                };
                plane.set_block(x, y, block);
            }
        }
    }
    out
}

fn transpose(src: &CoefImage, plan: &Plan) -> CoefImage {
    let mut out = output_image(src, plan);
    for ci in 0..src.components.len() {
        let (plane, src_plane) = (&mut out.components[ci], &src.components[ci]);
        for y in 0..plane.height_in_blocks {
            for x in 0..plane.width_in_blocks {
                plane.set_block(x, y, transpose_block(src_plane.block(y, x)));
            }
        }
    }
    out
}

fn rot90(src: &CoefImage, plan: &Plan) -> CoefImage {
    let mut out = output_image(src, plan);
    for ci in 0..src.components.len() {
        let hb_full = full_height_blocks(src, ci);
        let (plane, src_plane) = (&mut out.components[ci], &src.components[ci]);
        for y in 0..plane.height_in_blocks {
            for x in 0..plane.width_in_blocks {
                // The partial bottom iMCU row of the source lands at the
                // output right edge; it is transposed but not mirrored.
                let block = if x < hb_full {
                    rot90_block(src_plane.block(y, hb_full - 1 - x))
                } else {
                    transpose_block(src_plane.block(y, x))
                };
                plane.set_block(x, y, block);
            }
        }
    }
    out
}

fn rot270(src: &CoefImage, plan: &Plan) -> CoefImage {
    let mut out = output_image(src, plan);
    for ci in 0..src.components.len() {
        let wb_full = full_width_blocks(src, ci);
        let (plane, src_plane) = (&mut out.components[ci], &src.components[ci]);
        for y in 0..plane.height_in_blocks {
            for x in 0..plane.width_in_blocks {
                let block = if y < wb_full {
                    rot270_block(src_plane.block(wb_full - 1 - y, x))
                } else {
                    transpose_block(src_plane.block(y, x))
                };
                plane.set_block(x, y, block);
            }
        }
    }
    out
}

fn rot180(src: &CoefImage, plan: &Plan) -> CoefImage {
    let mut out = output_image(src, plan);
    for ci in 0..src.components.len() {
        let wb_full = full_width_blocks(src, ci);
        let hb_full = full_height_blocks(src, ci);
        let (plane, src_plane) = (&mut out.components[ci], &src.components[ci]);
        for y in 0..plane.height_in_blocks {
            for x in 0..plane.width_in_blocks {
                let mirror_x = x < wb_full;
                let mirror_y = y < hb_full;
                let sx = if mirror_x { wb_full - 1 - x } else { x };
                let sy = if mirror_y { hb_full - 1 - y } else { y };
                let mut block = *src_plane.block(sx, sy);
                if mirror_x {
                    block = flip_h_block(&block);
                }
                if mirror_y {
                    block = flip_v_block(&block);
                }
                plane.set_block(x, y, block);
            }
        }
    }
    out
}

fn transverse(src: &CoefImage, plan: &Plan) -> CoefImage {
    let mut out = output_image(src, plan);
    for ci in 0..src.components.len() {
        let wb_full = full_width_blocks(src, ci);
        let hb_full = full_height_blocks(src, ci);
        let (plane, src_plane) = (&mut out.components[ci], &src.components[ci]);
        for y in 0..plane.height_in_blocks {
            for x in 0..plane.width_in_blocks {
                let mirror_x = y < wb_full;
                let mirror_y = x < hb_full;
                let sx = if mirror_x { wb_full - 1 - y } else { y };
                let sy = if mirror_y { hb_full - 1 - x } else { x };
                let mut block = *src_plane.block(sx, sy);
                if mirror_x {
                    block = flip_h_block(&block);
                }
                if mirror_y {
                    block = flip_v_block(&block);
                }
                plane.set_block(x, y, transpose_block(&block));
            }
        }
    }
    out
}

fn crop(src: &CoefImage, plan: &Plan) -> CoefImage {
    let mut out = output_image(src, plan);
    for ci in 0..src.components.len() {
        let info = src.components[ci].info;
        let x0 = plan.x_crop_offset * info.h_samp_factor as u32;
        let y0 = plan.y_crop_offset * info.v_samp_factor as u32;
        let (plane, src_plane) = (&mut out.components[ci], &src.components[ci]);
        for y in 0..plane.height_in_blocks {
            for x in 0..plane.width_in_blocks {
                plane.set_block(x, y, *src_plane.block(x0 + x, y0 + y));
            }
        }
    }
    out
}

fn wipe(img: &mut CoefImage, plan: &Plan) {
    for plane in &mut img.components {
        let info = plane.info;
        let x0 = plan.x_crop_offset * info.h_samp_factor as u32;
        let y0 = plan.y_crop_offset * info.v_samp_factor as u32;
        let wb = (plan.region_imcu_w * info.h_samp_factor as u32)
            .min(plane.width_in_blocks.saturating_sub(x0));
        let hb = (plan.region_imcu_h * info.v_samp_factor as u32)
            .min(plane.height_in_blocks.saturating_sub(y0));
        let mut neutral: DctBlock = [0; 64];
        neutral[0] = NEUTRAL_DC;
        for y in y0..y0 + hb {
            for x in x0..x0 + wb {
                plane.set_block(x, y, neutral);
            }
        }
    }
}

fn drop_into(img: &mut CoefImage, drop: &CoefImage, plan: &Plan) -> Result<()> {
    let shared = img.components.len().min(drop.components.len());
    for ci in 0..shared {
        let from_table = drop.quant_table_for(ci).copied();
        let to_table = img.quant_table_for(ci).copied();
        let info = img.components[ci].info;
        let x0 = plan.x_crop_offset * info.h_samp_factor as u32;
        let y0 = plan.y_crop_offset * info.v_samp_factor as u32;
        let drop_plane = &drop.components[ci];
        let plane = &mut img.components[ci];
        let wb = (plan.region_imcu_w * info.h_samp_factor as u32)
            .min(plane.width_in_blocks.saturating_sub(x0))
            .min(drop_plane.width_in_blocks);
        let hb = (plan.region_imcu_h * info.v_samp_factor as u32)
            .min(plane.height_in_blocks.saturating_sub(y0))
            .min(drop_plane.height_in_blocks);
        for y in 0..hb {
            for x in 0..wb {
                let mut block = *drop_plane.block(x, y);
                if plan.requantize_drop {
                    let (from, to) = match (&from_table, &to_table) {
                        (Some(f), Some(t)) => (f, t),
                        _ => {
                            return Err(Error::DropSizeMismatch(format!(
                                "component {} has no quantization table",
                                ci
                            )))
                        }
                    };
                    requantize_block(&mut block, from, to);
                }
                plane.set_block(x0 + x, y0 + y, block);
            }
        }
    }
    Ok(())
}
