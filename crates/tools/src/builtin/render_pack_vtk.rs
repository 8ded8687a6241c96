use std::sync::Arc;

use autosage_core::execution::{ExecutionContext, ToolResult};
use autosage_core::tool::{Stability, ToolDescriptor, ToolExample};
use autosage_core::value::StructuredValue;

use crate::builtin::write_artifact;

// Minimal valid 1x1 PNG, used as a placeholder artifact payload.
const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F, 0x15, 0xC4,
    0x89, 0x00, 0x00, 0x00, 0x0A, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x00, 0x01, 0x00, 0x00,
    0x05, 0x00, 0x01, 0x0D, 0x0A, 0x2D, 0xB4, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE,
    0x42, 0x60, 0x82,
];

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "render.pack_vtk".to_string(),
        version: "1.0.0".into(),
        description: "Packs a rendered view into a PNG artifact.".into(),
        input_schema: StructuredValue::object([
            ("type".into(), StructuredValue::String("object".into())),
            (
                "properties".into(),
                StructuredValue::object([
                    ("view".into(), StructuredValue::object([("type".into(), StructuredValue::String("string".into()))])),
                    ("headless_ok".into(), StructuredValue::object([("type".into(), StructuredValue::String("boolean".into()))])),
                    ("buffer_ok".into(), StructuredValue::object([("type".into(), StructuredValue::String("boolean".into()))])),
                ]),
            ),
            ("required".into(), StructuredValue::Array(vec![])),
            ("additionalProperties".into(), StructuredValue::Bool(false)),
        ]),
        stability: Stability::Stable,
        tags: ["render".to_string()].into_iter().collect(),
        examples: vec![ToolExample {
            title: "isometric view".into(),
            input: StructuredValue::object([("view".into(), StructuredValue::String("isometric_color".into()))]),
            notes: None,
        }],
        invoker: Arc::new(invoke),
    }
}

fn invoke(input: StructuredValue, context: &ExecutionContext) -> ToolResult {
    let object = input.as_object();
    let view = object.and_then(|o| o.get("view")).and_then(|v| v.as_str()).unwrap_or("isometric_color").to_string();
    let headless_ok = object.and_then(|o| o.get("headless_ok")).and_then(|v| v.as_bool()).unwrap_or(true);
    let buffer_ok = object.and_then(|o| o.get("buffer_ok")).and_then(|v| v.as_bool()).unwrap_or(true);

    if !headless_ok {
        return ToolResult::error(
            "render.pack_vtk",
            "ERR_HEADLESS_CONTEXT_FAILED",
            "failed to acquire a headless rendering context",
        );
    }
    if !buffer_ok {
        return ToolResult::error(
            "render.pack_vtk",
            "ERR_BUFFER_EXTRACTION_FAILED",
            "failed to extract the framebuffer after render",
        );
    }

    let relative_path = format!("render/{view}.png");
    let artifact = match write_artifact(context, &relative_path, PLACEHOLDER_PNG) {
        Ok(artifact) => artifact,
        Err(e) => return ToolResult::error("render.pack_vtk", "runtime", e.to_string()),
    };

    ToolResult::ok("render.pack_vtk")
        .with_summary(format!("Rendered {view} view."))
        .with_output(StructuredValue::object([("view".to_string(), StructuredValue::String(view))]))
        .with_artifact(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use autosage_core::execution::ExecutionLimits;
    use tokio_util::sync::CancellationToken;

    fn ctx(dir: &std::path::Path) -> ExecutionContext {
        ExecutionContext {
            job_id: "job_0001".into(),
            job_directory: dir.to_path_buf(),
            request_id: None,
            limits: ExecutionLimits::default(),
            cancellation: CancellationToken::new(),
        }
    }

    #[test]
    fn headless_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let input = StructuredValue::object([("headless_ok".into(), StructuredValue::Bool(false))]);
        let result = invoke(input, &ctx(dir.path()));
        assert_eq!(result.error_code(), Some("ERR_HEADLESS_CONTEXT_FAILED"));
    }

    #[test]
    fn writes_png_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let input = StructuredValue::object([("view".into(), StructuredValue::String("isometric_color".into()))]);
        let result = invoke(input, &ctx(dir.path()));
        assert_eq!(result.artifacts.len(), 1);
        assert!(dir.path().join("render/isometric_color.png").exists());
    }
}
