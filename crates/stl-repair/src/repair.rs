//! Zero-normal repair: scan, recompute, patch, and commit.
//!
//! Only the 12 normal bytes of a repaired record are rewritten. Every other
//! byte of the file, including the header, vertices, attribute fields, and any
//! trailing fragment, is carried over unchanged. Files needing no repair are
//! never written.

use std::path::Path;

use nalgebra::Vector3;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::StlResult;
use crate::io::{load_stl_bytes, write_stl_bytes};
use crate::normal::{is_degenerate_normal, is_undefined_normal, recompute_normal};
use crate::scan::{record_count, trailing_bytes, RecordScanner};
use crate::types::{
    encode_normal, RepairOptions, StlHeader, TriangleRecord, ValidationMode, HEADER_SIZE,
    NORMAL_SIZE, RECORD_SIZE,
};
use crate::validate::check_triangle_count;

/// A replacement normal for one record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalPatch {
    /// Zero-based record index.
    pub index: usize,

    /// Byte offset of the record (and of its normal) in the file.
    pub offset: usize,

    /// Recomputed unit normal. NaN for zero-area triangles.
    pub normal: Vector3<f32>,
}

/// All patches found in one scan, ordered by offset.
#[derive(Debug, Clone, Default)]
pub struct PatchPlan {
    pub patches: Vec<NormalPatch>,
    pub records_scanned: usize,
    pub trailing_bytes: usize,
}

impl PatchPlan {
    pub fn is_empty(&self) -> bool {
        self.patches.is_empty()
    }

    /// Patches whose recomputed normal is undefined.
    pub fn degenerate_geometry_count(&self) -> usize {
        self.patches
            .iter()
            .filter(|p| is_undefined_normal(&p.normal))
            .count()
    }
}

/// Outcome of a repair pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RepairReport {
    /// Triangle count stored in the header.
    pub declared_triangle_count: u32,

    /// Complete records examined.
    pub records_scanned: usize,

    /// Records whose zero normal was replaced.
    pub records_repaired: usize,

    /// Repaired records with zero-area geometry (NaN normal written).
    pub degenerate_geometry: usize,

    /// Ignored bytes after the last complete record.
    pub trailing_bytes: usize,

    /// Whether any record was modified. A file is written only when this is set.
    pub modified: bool,
}

impl std::fmt::Display for RepairReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if !self.modified {
            return write!(
                f,
                "{} records scanned, no zero normals",
                self.records_scanned
            );
        }
        write!(
            f,
            "{} of {} records repaired",
            self.records_repaired, self.records_scanned
        )?;
        if self.degenerate_geometry > 0 {
            write!(f, " ({} zero-area)", self.degenerate_geometry)?;
        }
        Ok(())
    }
}

fn patch_for(index: usize, offset: usize, raw: &[u8; RECORD_SIZE]) -> Option<NormalPatch> {
    let record = TriangleRecord::decode(raw);
    if !is_degenerate_normal(&record.normal) {
        return None;
    }

    let [v1, v2, v3] = record.vertices;
    Some(NormalPatch {
        index,
        offset,
        normal: recompute_normal(&v1, &v2, &v3),
    })
}

/// Find every record with a zero normal and compute its replacement.
///
/// With `parallel` the records are split across the rayon pool. The ordered
/// collect keeps the plan identical to the sequential one.
pub fn plan_patches(bytes: &[u8], parallel: bool) -> PatchPlan {
    let records_scanned = record_count(bytes.len());

    let patches: Vec<NormalPatch> = if parallel && records_scanned > 0 {
        let body = &bytes[HEADER_SIZE..HEADER_SIZE + records_scanned * RECORD_SIZE];
        body.par_chunks_exact(RECORD_SIZE)
            .enumerate()
            .filter_map(|(index, chunk)| {
                let raw: &[u8; RECORD_SIZE] = chunk.try_into().ok()?;
                patch_for(index, HEADER_SIZE + index * RECORD_SIZE, raw)
            })
            .collect()
    } else {
        RecordScanner::new(bytes)
            .enumerate()
            .filter_map(|(index, (offset, raw))| patch_for(index, offset, raw))
            .collect()
    };

    PatchPlan {
        patches,
        records_scanned,
        trailing_bytes: trailing_bytes(bytes.len()),
    }
}

/// Write the planned normals into `buf`. Returns the number of patches applied.
///
/// Patches that would fall outside the buffer are skipped.
pub fn apply_patches(buf: &mut [u8], plan: &PatchPlan) -> usize {
    let mut applied = 0;
    for patch in &plan.patches {
        let Some(end) = patch.offset.checked_add(NORMAL_SIZE) else {
            continue;
        };
        if let Some(dst) = buf.get_mut(patch.offset..end) {
            dst.copy_from_slice(&encode_normal(&patch.normal));
            debug!(
                "Record {} @ {}: normal -> [{}, {}, {}]",
                patch.index, patch.offset, patch.normal.x, patch.normal.y, patch.normal.z
            );
            applied += 1;
        }
    }
    applied
}

/// Repair an in-memory binary STL buffer.
///
/// Returns the patched copy, or `None` when nothing needed repair, along with
/// the report. The input slice is never modified.
pub fn repair_stl_bytes(
    bytes: &[u8],
    options: &RepairOptions,
) -> StlResult<(Option<Vec<u8>>, RepairReport)> {
    let header = StlHeader::parse(bytes)?;

    debug!(
        "Repair options: unit={:?} (x{}), correct_for_printing={}, validation={:?}",
        options.unit_scale,
        options.unit_scale.factor(),
        options.correct_for_printing,
        options.validation
    );

    if options.validation == ValidationMode::Strict {
        check_triangle_count(&header, bytes.len())?;
    }
    if header.looks_like_ascii() {
        debug!("Header starts with \"solid\"; treating file as binary STL");
    }

    let plan = plan_patches(bytes, options.parallel);

    if plan.trailing_bytes > 0 {
        warn!(
            "Ignoring {} trailing bytes after {} complete records",
            plan.trailing_bytes, plan.records_scanned
        );
    }
    if plan.records_scanned != header.triangle_count as usize {
        debug!(
            "Header declares {} triangles, scanned {}",
            header.triangle_count, plan.records_scanned
        );
    }

    let degenerate_geometry = plan.degenerate_geometry_count();
    if degenerate_geometry > 0 {
        warn!(
            "{} zero-area triangles received undefined (NaN) normals",
            degenerate_geometry
        );
    }

    let patched = if plan.is_empty() {
        None
    } else {
        let mut buf = bytes.to_vec();
        apply_patches(&mut buf, &plan);
        Some(buf)
    };

    let report = RepairReport {
        declared_triangle_count: header.triangle_count,
        records_scanned: plan.records_scanned,
        records_repaired: plan.patches.len(),
        degenerate_geometry,
        trailing_bytes: plan.trailing_bytes,
        modified: patched.is_some(),
    };

    Ok((patched, report))
}

/// Replace zero normals in a binary STL file on disk.
///
/// The file is read once, patched in memory, and written back in a single
/// write only if at least one record changed. Concurrent repairs of the same
/// path must be serialized by the caller.
pub fn repair_stl_normals(path: &Path, options: &RepairOptions) -> StlResult<RepairReport> {
    info!("Repairing normals in {:?}", path);

    let bytes = load_stl_bytes(path)?;
    let (patched, report) = repair_stl_bytes(&bytes, options)?;

    match patched {
        Some(buf) => {
            write_stl_bytes(path, &buf, options.write_mode)?;
            info!("{:?}: {}", path, report);
        }
        None => info!("{:?}: nothing to repair, file left untouched", path),
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(normal: [f32; 3], verts: [[f32; 3]; 3], attr: u16) -> Vec<u8> {
        let mut out = Vec::with_capacity(RECORD_SIZE);
        for v in std::iter::once(normal).chain(verts) {
            for c in v {
                out.extend_from_slice(&c.to_le_bytes());
            }
        }
        out.extend_from_slice(&attr.to_le_bytes());
        out
    }

    fn stl(records: &[Vec<u8>]) -> Vec<u8> {
        let mut bytes = vec![b' '; 80];
        bytes.extend_from_slice(&(records.len() as u32).to_le_bytes());
        for r in records {
            bytes.extend_from_slice(r);
        }
        bytes
    }

    const TRI: [[f32; 3]; 3] = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]];

    #[test]
    fn test_plan_finds_only_zero_normals() {
        let bytes = stl(&[
            record([0.0, 0.0, 1.0], TRI, 0),
            record([0.0, 0.0, 0.0], TRI, 0),
            record([0.0001, 0.0, 0.0], TRI, 0),
        ]);
        let plan = plan_patches(&bytes, false);
        assert_eq!(plan.records_scanned, 3);
        assert_eq!(plan.patches.len(), 1);
        assert_eq!(plan.patches[0].index, 1);
        assert_eq!(plan.patches[0].offset, HEADER_SIZE + RECORD_SIZE);
        assert_relative_eq!(plan.patches[0].normal.z, 1.0);
    }

    #[test]
    fn test_parallel_plan_matches_sequential() {
        let records: Vec<Vec<u8>> = (0..257)
            .map(|i| {
                let n = if i % 3 == 0 { [0.0, 0.0, 0.0] } else { [1.0, 0.0, 0.0] };
                let s = i as f32;
                record(n, [[s, 0.0, 0.0], [s + 1.0, 0.5, 0.0], [s, 2.0, 1.0]], i as u16)
            })
            .collect();
        let mut bytes = stl(&records);
        bytes.extend_from_slice(&[9u8; 13]);

        let seq = plan_patches(&bytes, false);
        let par = plan_patches(&bytes, true);
        assert_eq!(seq.patches, par.patches);
        assert_eq!(seq.records_scanned, par.records_scanned);
        assert_eq!(par.trailing_bytes, 13);
    }

    #[test]
    fn test_apply_touches_only_normal_bytes() {
        let bytes = stl(&[record([0.0, 0.0, 0.0], TRI, 0xABCD)]);
        let plan = plan_patches(&bytes, false);
        let mut buf = bytes.clone();
        assert_eq!(apply_patches(&mut buf, &plan), 1);

        assert_eq!(&buf[..HEADER_SIZE], &bytes[..HEADER_SIZE]);
        assert_eq!(&buf[HEADER_SIZE + NORMAL_SIZE..], &bytes[HEADER_SIZE + NORMAL_SIZE..]);
        assert_ne!(
            &buf[HEADER_SIZE..HEADER_SIZE + NORMAL_SIZE],
            &bytes[HEADER_SIZE..HEADER_SIZE + NORMAL_SIZE]
        );
    }

    #[test]
    fn test_apply_skips_out_of_range_patch() {
        let plan = PatchPlan {
            patches: vec![NormalPatch {
                index: 0,
                offset: 90,
                normal: Vector3::new(0.0, 0.0, 1.0),
            }],
            ..Default::default()
        };
        let mut buf = vec![0u8; 95];
        assert_eq!(apply_patches(&mut buf, &plan), 0);
        assert_eq!(buf, vec![0u8; 95]);
    }

    #[test]
    fn test_apply_skips_overflowing_offset() {
        let plan = PatchPlan {
            patches: vec![NormalPatch {
                index: 0,
                offset: usize::MAX - 4,
                normal: Vector3::new(0.0, 0.0, 1.0),
            }],
            ..Default::default()
        };
        let mut buf = vec![0u8; 134];
        assert_eq!(apply_patches(&mut buf, &plan), 0);
        assert_eq!(buf, vec![0u8; 134]);
    }

    #[test]
    fn test_solid_header_still_repaired() {
        let mut bytes = stl(&[record([0.0; 3], TRI, 0)]);
        bytes[..11].copy_from_slice(b"solid part ");
        let (patched, report) = repair_stl_bytes(&bytes, &RepairOptions::default()).unwrap();
        assert!(report.modified);
        let patched = patched.unwrap();
        assert_eq!(&patched[..HEADER_SIZE], &bytes[..HEADER_SIZE]);
    }

    #[test]
    fn test_repair_bytes_none_when_clean() {
        let bytes = stl(&[record([0.0, 0.0, 1.0], TRI, 0)]);
        let (patched, report) = repair_stl_bytes(&bytes, &RepairOptions::default()).unwrap();
        assert!(patched.is_none());
        assert!(!report.modified);
        assert_eq!(report.records_repaired, 0);
        assert_eq!(report.to_string(), "1 records scanned, no zero normals");
    }

    #[test]
    fn test_repair_bytes_counts_zero_area() {
        let line = [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]];
        let bytes = stl(&[record([0.0; 3], TRI, 0), record([0.0; 3], line, 0)]);
        let (patched, report) = repair_stl_bytes(&bytes, &RepairOptions::default()).unwrap();
        assert!(patched.is_some());
        assert_eq!(report.records_repaired, 2);
        assert_eq!(report.degenerate_geometry, 1);
        assert_eq!(report.to_string(), "2 of 2 records repaired (1 zero-area)");
    }

    #[test]
    fn test_strict_mode_rejects_bad_count() {
        let mut bytes = stl(&[record([0.0; 3], TRI, 0)]);
        bytes[80..84].copy_from_slice(&4u32.to_le_bytes());

        let strict = RepairOptions {
            validation: ValidationMode::Strict,
            ..Default::default()
        };
        assert!(repair_stl_bytes(&bytes, &strict).is_err());
        assert!(repair_stl_bytes(&bytes, &RepairOptions::default()).is_ok());
    }
}
