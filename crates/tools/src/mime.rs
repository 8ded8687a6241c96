//! Extension → MIME-type inference for re-stat'd artifacts.
//!
//! Hand-rolled against the narrow table in spec.md §4.2 step 6 rather than
//! pulled from `mime_guess` — see SPEC_FULL.md §4.2 for the rationale.

/// Infer a MIME type from a file name's extension. Falls back to
/// `application/octet-stream` for anything not in the table.
pub fn infer(file_name: &str) -> String {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "png" => "image/png",
        "tiff" => "image/tiff",
        "json" => "application/json",
        "txt" | "log" => "text/plain; charset=utf-8",
        "pvd" | "vtk" | "tet" | "obj" | "step" => "application/octet-stream",
        _ => "application/octet-stream",
    }
    .to_string()
}
