//! Built-in tool invokers: realistic stand-ins for the solver binaries
//! named in spec.md §1 (native FEA, ngspice, VTK renderer, Open3D-style
//! fitting, STEP import). Each does real argument validation and real
//! filesystem writes under `context.job_directory`, never actual solver
//! numerics — that stays a Non-goal.

mod cad_import_step;
mod circuit_solve_ngspice;
mod echo_json;
mod fea_solve_native;
mod geometry_dsl_fit_open3d;
mod mesh_repair_watertight;
mod render_pack_vtk;

use crate::registry::ToolRegistryBuilder;
use autosage_core::Result;

/// Register every built-in tool into `builder`. Called once from the
/// gateway's bootstrap before the registry is frozen.
pub fn register_all(builder: &mut ToolRegistryBuilder) -> Result<()> {
    builder.register(echo_json::descriptor())?;
    builder.register(mesh_repair_watertight::descriptor())?;
    builder.register(geometry_dsl_fit_open3d::descriptor())?;
    builder.register(fea_solve_native::descriptor())?;
    builder.register(circuit_solve_ngspice::descriptor())?;
    builder.register(render_pack_vtk::descriptor())?;
    builder.register(cad_import_step::descriptor())?;
    Ok(())
}

/// Shared helper: write `bytes` to `relative_path` under the invocation's
/// job directory, creating parent directories as needed, and return an
/// `Artifact` (bytes/mime_type left for the engine's re-stat pass).
pub(crate) fn write_artifact(
    context: &autosage_core::execution::ExecutionContext,
    relative_path: &str,
    bytes: &[u8],
) -> std::io::Result<autosage_core::execution::Artifact> {
    let absolute = context.job_directory.join(relative_path);
    if let Some(parent) = absolute.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&absolute, bytes)?;
    let name = absolute
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(relative_path)
        .to_string();
    Ok(autosage_core::execution::Artifact {
        name,
        path: relative_path.to_string(),
        mime_type: String::new(),
        bytes: 0,
    })
}
