//! Binary STL normal repair.
//!
//! Some exporters write `(0, 0, 0)` instead of a real facet normal. This crate
//! finds those records, recomputes the normal from the triangle's vertices, and
//! patches the 12 normal bytes back into the file. Nothing else in the file is
//! touched, and a file with no zero normals is not written at all.
//!
//! - **Loading/Writing**: [`load_stl_bytes`], [`write_stl_bytes`]
//! - **Scanning**: [`RecordScanner`] walks 50-byte records after the 84-byte header
//! - **Repair**: [`repair_stl_normals`] runs the whole pipeline on a file
//! - **Inspection**: [`inspect_stl`] reports counts without modifying anything
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use stl_repair::{repair_stl_normals, RepairOptions};
//!
//! let report = repair_stl_normals(Path::new("model.stl"), &RepairOptions::default()).unwrap();
//! println!("{}", report);
//! ```

mod error;
mod types;

pub mod io;
pub mod normal;
pub mod repair;
pub mod scan;
pub mod validate;

// Re-export core types at crate root
pub use error::{StlError, StlResult};
pub use types::{
    encode_normal, RepairOptions, StlHeader, TriangleRecord, UnitScale, ValidationMode,
    WriteMode, HEADER_SIZE, NORMAL_SIZE, RECORD_SIZE,
};

// Re-export commonly used functions
pub use io::{load_stl_bytes, write_stl_bytes};
pub use normal::{is_degenerate_normal, recompute_normal};
pub use repair::{
    apply_patches, plan_patches, repair_stl_bytes, repair_stl_normals, NormalPatch, PatchPlan,
    RepairReport,
};
pub use scan::RecordScanner;
pub use validate::{check_triangle_count, inspect_stl, inspect_stl_bytes, StlReport};

impl RepairOptions {
    /// Repair the file at `path` with these options.
    pub fn repair(&self, path: impl AsRef<std::path::Path>) -> StlResult<RepairReport> {
        repair::repair_stl_normals(path.as_ref(), self)
    }
}
