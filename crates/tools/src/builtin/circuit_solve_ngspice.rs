use std::sync::Arc;

use autosage_core::execution::{ExecutionContext, ToolResult};
use autosage_core::tool::{Stability, ToolDescriptor, ToolExample};
use autosage_core::value::StructuredValue;

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "circuit.solve_ngspice".to_string(),
        version: "0.1.0".into(),
        description: "Stand-in SPICE solve over a netlist.".into(),
        input_schema: StructuredValue::object([
            ("type".into(), StructuredValue::String("object".into())),
            (
                "properties".into(),
                StructuredValue::object([
                    ("netlist".into(), StructuredValue::object([("type".into(), StructuredValue::String("string".into()))])),
                    ("ngspice_available".into(), StructuredValue::object([("type".into(), StructuredValue::String("boolean".into()))])),
                ]),
            ),
            ("required".into(), StructuredValue::Array(vec![StructuredValue::String("netlist".into())])),
            ("additionalProperties".into(), StructuredValue::Bool(false)),
        ]),
        stability: Stability::Experimental,
        tags: ["circuits".to_string()].into_iter().collect(),
        examples: Vec::new(),
        invoker: Arc::new(invoke),
    }
}

fn invoke(input: StructuredValue, _context: &ExecutionContext) -> ToolResult {
    let object = input.as_object();
    let netlist = object.and_then(|o| o.get("netlist")).and_then(|v| v.as_str()).unwrap_or_default();
    let available = object
        .and_then(|o| o.get("ngspice_available"))
        .and_then(|v| v.as_bool())
        .unwrap_or(true);

    if !available {
        return ToolResult::error(
            "circuit.solve_ngspice",
            "missing_dependency",
            "ngspice binary not found on PATH",
        );
    }
    if netlist.trim().is_empty() {
        return ToolResult::error("circuit.solve_ngspice", "invalid_input", "netlist must not be empty");
    }

    let node_count = netlist.lines().filter(|l| !l.trim().is_empty()).count();
    ToolResult::ok("circuit.solve_ngspice")
        .with_summary(format!("Solved netlist with {node_count} statement(s)."))
        .with_output(StructuredValue::object([
            ("node_count".to_string(), StructuredValue::Number(node_count as f64)),
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
    fn missing_ngspice_is_reported() {
        let input = StructuredValue::object([
            ("netlist".into(), StructuredValue::String("R1 1 0 1k".into())),
            ("ngspice_available".into(), StructuredValue::Bool(false)),
        ]);
        let result = invoke(input, &ctx());
        assert_eq!(result.error_code(), Some("missing_dependency"));
    }

    #[test]
    fn solves_netlist() {
        let input = StructuredValue::object([("netlist".into(), StructuredValue::String("R1 1 0 1k\nV1 1 0 5".into()))]);
        let result = invoke(input, &ctx());
        assert!(result.status == autosage_core::execution::ToolStatus::Ok);
    }
}
