//! Example: Repair Options and In-Memory Repair
//!
//! Shows how `RepairOptions` round-trips through TOML and how a buffer with
//! zero normals is repaired without touching the filesystem.
//!
//! Run with: `cargo run -p stl-repair --example repair_config`

use stl_repair::{
    inspect_stl_bytes, repair_stl_bytes, RepairOptions, UnitScale, ValidationMode, WriteMode,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // =========================================================================
    // 1. Build options programmatically and serialize to TOML
    // =========================================================================

    let options = RepairOptions {
        unit_scale: UnitScale::Millimeter,
        validation: ValidationMode::Strict,
        write_mode: WriteMode::AtomicRename,
        ..Default::default()
    };
    println!("=== TOML Output ===\n{}", options.to_toml()?);

    // =========================================================================
    // 2. Parse options from TOML; missing keys take their defaults
    // =========================================================================

    let parsed = RepairOptions::from_toml(
        r#"
        validation = "strict"
        parallel = true
        "#,
    )?;
    println!("=== Parsed Options ===\n{:#?}", parsed);

    // =========================================================================
    // 3. Repair a cube whose exporter wrote zero normals
    // =========================================================================

    let stl = create_test_cube();
    println!("\n=== Before ===\n{}", inspect_stl_bytes(&stl)?);

    let (patched, report) = repair_stl_bytes(&stl, &parsed)?;
    println!("=== Repair ===\n{}", report);

    if let Some(bytes) = patched {
        println!("\n=== After ===\n{}", inspect_stl_bytes(&bytes)?);
    }

    Ok(())
}

/// Binary STL cube with every normal left as (0, 0, 0).
fn create_test_cube() -> Vec<u8> {
    let v: [[f32; 3]; 8] = [
        [0.0, 0.0, 0.0],
        [10.0, 0.0, 0.0],
        [10.0, 10.0, 0.0],
        [0.0, 10.0, 0.0],
        [0.0, 0.0, 10.0],
        [10.0, 0.0, 10.0],
        [10.0, 10.0, 10.0],
        [0.0, 10.0, 10.0],
    ];
    let faces: [[usize; 3]; 12] = [
        [0, 2, 1],
        [0, 3, 2],
        [4, 5, 6],
        [4, 6, 7],
        [0, 1, 5],
        [0, 5, 4],
        [2, 3, 7],
        [2, 7, 6],
        [0, 4, 7],
        [0, 7, 3],
        [1, 2, 6],
        [1, 6, 5],
    ];

    let mut out = vec![0u8; 80];
    out[..10].copy_from_slice(b"zero cube ");
    out.extend_from_slice(&(faces.len() as u32).to_le_bytes());
    for face in &faces {
        out.extend_from_slice(&[0u8; 12]);
        for &i in face {
            for c in v[i] {
                out.extend_from_slice(&c.to_le_bytes());
            }
        }
        out.extend_from_slice(&0u16.to_le_bytes());
    }
    out
}
