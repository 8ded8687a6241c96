use std::sync::Arc;

use autosage_core::execution::{ExecutionContext, ToolResult};
use autosage_core::tool::{Stability, ToolDescriptor, ToolExample};
use autosage_core::value::StructuredValue;

use crate::builtin::write_artifact;

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "fea.solve_native".to_string(),
        version: "0.1.0".into(),
        description: "Stand-in finite-element solve, writes solve/result.json.".into(),
        input_schema: StructuredValue::object([
            ("type".into(), StructuredValue::String("object".into())),
            (
                "properties".into(),
                StructuredValue::object([
                    ("dx".into(), StructuredValue::object([("type".into(), StructuredValue::String("number".into()))])),
                    ("load_n".into(), StructuredValue::object([("type".into(), StructuredValue::String("number".into()))])),
                ]),
            ),
            (
                "required".into(),
                StructuredValue::Array(vec![StructuredValue::String("dx".into()), StructuredValue::String("load_n".into())]),
            ),
            ("additionalProperties".into(), StructuredValue::Bool(false)),
        ]),
        stability: Stability::Experimental,
        tags: ["fea".to_string()].into_iter().collect(),
        examples: Vec::new(),
        invoker: Arc::new(invoke),
    }
}

fn invoke(input: StructuredValue, context: &ExecutionContext) -> ToolResult {
    let object = input.as_object();
    let dx = object.and_then(|o| o.get("dx")).and_then(|v| v.as_f64()).unwrap_or(0.0);
    let load_n = object.and_then(|o| o.get("load_n")).and_then(|v| v.as_f64()).unwrap_or(0.0);

    if dx <= 0.0 {
        return ToolResult::error(
            "fea.solve_native",
            "ERR_INVALID_DX",
            format!("discretization step dx must be positive, got {dx}"),
        );
    }

    // Stand-in linear response, not a real stiffness solve.
    let max_stress = load_n / dx;
    let document = StructuredValue::object([
        ("max_stress".to_string(), StructuredValue::Number(max_stress)),
        ("dx".to_string(), StructuredValue::Number(dx)),
        ("load_n".to_string(), StructuredValue::Number(load_n)),
    ]);
    let json: serde_json::Value = document.clone().into();
    let bytes = match serde_json::to_vec_pretty(&json) {
        Ok(bytes) => bytes,
        Err(e) => return ToolResult::error("fea.solve_native", "runtime", e.to_string()),
    };
    let artifact = match write_artifact(context, "solve/result.json", &bytes) {
        Ok(artifact) => artifact,
        Err(e) => return ToolResult::error("fea.solve_native", "runtime", e.to_string()),
    };

    ToolResult::ok("fea.solve_native")
        .with_summary(format!("Solved with max_stress={max_stress:.3}."))
        .with_output(document)
        .with_artifact(artifact)
}
