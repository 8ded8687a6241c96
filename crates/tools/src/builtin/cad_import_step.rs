use std::sync::Arc;

use autosage_core::execution::{ExecutionContext, ToolResult};
use autosage_core::tool::{Stability, ToolDescriptor, ToolExample};
use autosage_core::value::StructuredValue;

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "cad.import_step".to_string(),
        version: "0.1.0".into(),
        description: "Validates a STEP-like payload before import.".into(),
        input_schema: StructuredValue::object([
            ("type".into(), StructuredValue::String("object".into())),
            (
                "properties".into(),
                StructuredValue::object([
                    ("payload".into(), StructuredValue::object([("type".into(), StructuredValue::String("string".into()))])),
                    ("manifold".into(), StructuredValue::object([("type".into(), StructuredValue::String("boolean".into()))])),
                ]),
            ),
            ("required".into(), StructuredValue::Array(vec![StructuredValue::String("payload".into())])),
            ("additionalProperties".into(), StructuredValue::Bool(false)),
        ]),
        stability: Stability::Experimental,
        tags: ["cad".to_string()].into_iter().collect(),
        examples: Vec::new(),
        invoker: Arc::new(invoke),
    }
}

fn invoke(input: StructuredValue, _context: &ExecutionContext) -> ToolResult {
    let object = input.as_object();
    let payload = object.and_then(|o| o.get("payload")).and_then(|v| v.as_str()).unwrap_or_default();
    let manifold = object.and_then(|o| o.get("manifold")).and_then(|v| v.as_bool()).unwrap_or(true);

    if payload.trim().is_empty() {
        return ToolResult::error("cad.import_step", "invalid_input", "payload must not be empty");
    }
    if !manifold {
        return ToolResult::error(
            "cad.import_step",
            "ERR_NON_MANIFOLD_UNRESOLVABLE",
            "STEP solid has non-manifold topology that could not be resolved",
        );
    }

    ToolResult::ok("cad.import_step")
        .with_summary("Imported STEP payload.".to_string())
        .with_output(StructuredValue::object([
            ("bytes".to_string(), StructuredValue::Number(payload.len() as f64)),
        ]))
}
