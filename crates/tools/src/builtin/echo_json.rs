use std::sync::Arc;

use autosage_core::execution::ToolResult;
use autosage_core::tool::{Stability, ToolDescriptor, ToolExample};
use autosage_core::value::StructuredValue;

/// Deterministic echo used by the Testable Properties suite: repeats
/// `message` `n` times (default 1) and reports both as `output`.
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: "echo_json".to_string(),
        version: "1.0.0".into(),
        description: "Echoes a message n times, deterministically.".into(),
        input_schema: StructuredValue::object([
            ("type".into(), StructuredValue::String("object".into())),
            (
                "properties".into(),
                StructuredValue::object([
                    (
                        "message".into(),
                        StructuredValue::object([("type".into(), StructuredValue::String("string".into()))]),
                    ),
                    (
                        "n".into(),
                        StructuredValue::object([("type".into(), StructuredValue::String("number".into()))]),
                    ),
                ]),
            ),
            ("required".into(), StructuredValue::Array(vec![StructuredValue::String("message".into())])),
            ("additionalProperties".into(), StructuredValue::Bool(false)),
        ]),
        stability: Stability::Stable,
        tags: ["debug".to_string()].into_iter().collect(),
        examples: vec![ToolExample {
            title: "repeat twice".into(),
            input: StructuredValue::object([
                ("message".into(), StructuredValue::String("hello".into())),
                ("n".into(), StructuredValue::Number(2.0)),
            ]),
            notes: None,
        }],
        invoker: Arc::new(invoke),
    }
}

fn invoke(input: StructuredValue, _context: &autosage_core::execution::ExecutionContext) -> ToolResult {
    let object = input.as_object();
    let message = object
        .and_then(|o| o.get("message"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let n = object
        .and_then(|o| o.get("n"))
        .and_then(|v| v.as_f64())
        .map(|n| n as usize)
        .unwrap_or(1);

    let repeat: Vec<StructuredValue> = std::iter::repeat(StructuredValue::String(message.clone()))
        .take(n)
        .collect();

    ToolResult::ok("echo_json")
        .with_summary(format!("Echoed message {n} time(s)."))
        .with_output(StructuredValue::object([
            ("message".to_string(), StructuredValue::String(message)),
            ("repeat".to_string(), StructuredValue::Array(repeat)),
        ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use autosage_core::execution::{ExecutionContext, ExecutionLimits};
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
    fn repeats_message_n_times() {
        let input = StructuredValue::object([
            ("message".into(), StructuredValue::String("hello".into())),
            ("n".into(), StructuredValue::Number(2.0)),
        ]);
        let result = invoke(input, &ctx());
        assert_eq!(result.summary, "Echoed message 2 time(s).");
        let output = result.output.as_object().unwrap();
        assert_eq!(output.get("message").unwrap().as_str(), Some("hello"));
        let repeat = output.get("repeat").unwrap().as_array().unwrap();
        assert_eq!(repeat.len(), 2);
    }

    #[test]
    fn defaults_n_to_one() {
        let input = StructuredValue::object([("message".into(), StructuredValue::String("x".into()))]);
        let result = invoke(input, &ctx());
        let repeat = result.output.as_object().unwrap().get("repeat").unwrap().as_array().unwrap();
        assert_eq!(repeat.len(), 1);
    }

    #[test]
    fn is_deterministic() {
        let input = StructuredValue::object([
            ("message".into(), StructuredValue::String("hi".into())),
            ("n".into(), StructuredValue::Number(3.0)),
        ]);
        let a = invoke(input.clone(), &ctx());
        let b = invoke(input, &ctx());
        assert_eq!(a.output, b.output);
        assert_eq!(a.summary, b.summary);
    }
}
