use std::sync::Arc;

use autosage_core::execution::{ExecutionContext, ToolResult};
use autosage_core::tool::{Stability, ToolDescriptor, ToolExample};
use autosage_core::value::StructuredValue;

const MAX_HOLE_SIZE: f64 = 10.0;

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "mesh.repair_watertight".to_string(),
        version: "1.0.0".into(),
        description: "Validates a mesh and reports manifold/hole-size errors.".into(),
        input_schema: StructuredValue::object([
            ("type".into(), StructuredValue::String("object".into())),
            (
                "properties".into(),
                StructuredValue::object([
                    ("vertex_count".into(), StructuredValue::object([("type".into(), StructuredValue::String("number".into()))])),
                    ("face_count".into(), StructuredValue::object([("type".into(), StructuredValue::String("number".into()))])),
                    ("is_manifold".into(), StructuredValue::object([("type".into(), StructuredValue::String("boolean".into()))])),
                    ("max_hole_size".into(), StructuredValue::object([("type".into(), StructuredValue::String("number".into()))])),
                ]),
            ),
            (
                "required".into(),
                StructuredValue::Array(vec![
                    StructuredValue::String("vertex_count".into()),
                    StructuredValue::String("face_count".into()),
                ]),
            ),
            ("additionalProperties".into(), StructuredValue::Bool(false)),
        ]),
        stability: Stability::Stable,
        tags: ["meshing".to_string()].into_iter().collect(),
        examples: vec![ToolExample {
            title: "watertight mesh".into(),
            input: StructuredValue::object([
                ("vertex_count".into(), StructuredValue::Number(24.0)),
                ("face_count".into(), StructuredValue::Number(12.0)),
            ]),
            notes: None,
        }],
        invoker: Arc::new(invoke),
    }
}

fn invoke(input: StructuredValue, _context: &ExecutionContext) -> ToolResult {
    let object = input.as_object();
    let vertex_count = object.and_then(|o| o.get("vertex_count")).and_then(|v| v.as_f64()).unwrap_or(0.0);
    let face_count = object.and_then(|o| o.get("face_count")).and_then(|v| v.as_f64()).unwrap_or(0.0);
    let is_manifold = object.and_then(|o| o.get("is_manifold")).and_then(|v| v.as_bool()).unwrap_or(true);
    let max_hole_size = object.and_then(|o| o.get("max_hole_size")).and_then(|v| v.as_f64()).unwrap_or(0.0);

    if !is_manifold {
        return ToolResult::error(
            "mesh.repair_watertight",
            "ERR_NOT_WATERTIGHT",
            "mesh is not manifold: unresolved edge adjacency",
        );
    }
    if max_hole_size > MAX_HOLE_SIZE {
        return ToolResult::error(
            "mesh.repair_watertight",
            "ERR_HOLE_TOO_LARGE",
            format!("largest hole ({max_hole_size}) exceeds repairable size ({MAX_HOLE_SIZE})"),
        );
    }

    ToolResult::ok("mesh.repair_watertight")
        .with_summary("Mesh is watertight.".to_string())
        .with_output(StructuredValue::object([
            ("watertight".to_string(), StructuredValue::Bool(true)),
            ("vertex_count".to_string(), StructuredValue::Number(vertex_count)),
            ("face_count".to_string(), StructuredValue::Number(face_count)),
        ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use autosage_core::execution::ExecutionLimits;
    use tokio_util::sync::CancellationToken;

    fn ctx() -> ExecutionContext {
        ExecutionContext {
            job_id: "job_0001".into(),
            job_directory: std::env::temp_dir(),
            request_id: None,
            limits: ExecutionLimits::default(),
            cancellation: CancellationToken::new(),
        }
    }

    #[test]
    fn non_manifold_mesh_is_rejected() {
        let input = StructuredValue::object([
            ("vertex_count".into(), StructuredValue::Number(8.0)),
            ("face_count".into(), StructuredValue::Number(6.0)),
            ("is_manifold".into(), StructuredValue::Bool(false)),
        ]);
        let result = invoke(input, &ctx());
        assert_eq!(result.error_code(), Some("ERR_NOT_WATERTIGHT"));
    }

    #[test]
    fn oversized_hole_is_rejected() {
        let input = StructuredValue::object([
            ("vertex_count".into(), StructuredValue::Number(8.0)),
            ("face_count".into(), StructuredValue::Number(6.0)),
            ("max_hole_size".into(), StructuredValue::Number(50.0)),
        ]);
        let result = invoke(input, &ctx());
        assert_eq!(result.error_code(), Some("ERR_HOLE_TOO_LARGE"));
    }

    #[test]
    fn clean_mesh_passes() {
        let input = StructuredValue::object([
            ("vertex_count".into(), StructuredValue::Number(24.0)),
            ("face_count".into(), StructuredValue::Number(12.0)),
        ]);
        let result = invoke(input, &ctx());
        assert!(result.status == autosage_core::execution::ToolStatus::Ok);
    }
}
