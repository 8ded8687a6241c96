//! Hand-rolled validator for the narrow schema subset `ToolDescriptor`
//! input schemas use: `{type: "object", properties, required,
//! additionalProperties}` with primitive `type` tags per property.
//!
//! This deliberately does not implement general JSON Schema (no `$ref`,
//! `oneOf`, numeric bounds, `pattern`, …) — see SPEC_FULL.md §4.2 for why
//! a full validator crate would be the wrong tool here.

use crate::value::StructuredValue;

/// Validate `input` against `schema`. Returns `Err(message)` describing
/// the first violation found.
pub fn validate(schema: &StructuredValue, input: &StructuredValue) -> Result<(), String> {
    let schema_obj = schema
        .as_object()
        .ok_or_else(|| "schema must be an object".to_string())?;

    let schema_type = schema_obj
        .get("type")
        .and_then(|v| v.as_str())
        .unwrap_or("object");
    if schema_type != "object" {
        return Err(format!("unsupported schema type: {schema_type}"));
    }

    let input_obj = input
        .as_object()
        .ok_or_else(|| "input must be an object".to_string())?;

    let properties = schema_obj.get("properties").and_then(|v| v.as_object());
    let required = schema_obj
        .get("required")
        .and_then(|v| v.as_array())
        .unwrap_or(&[]);
    let additional_properties = schema_obj
        .get("additionalProperties")
        .and_then(|v| v.as_bool())
        .unwrap_or(true);

    for key in required {
        let Some(key) = key.as_str() else {
            return Err("required entries must be strings".to_string());
        };
        if !input_obj.contains_key(key) {
            return Err(format!("missing required field: {key}"));
        }
    }

    if let Some(properties) = properties {
        for (key, value) in input_obj.iter() {
            match properties.get(key) {
                Some(prop_schema) => {
                    if let Some(expected) = prop_schema
                        .as_object()
                        .and_then(|o| o.get("type"))
                        .and_then(|v| v.as_str())
                    {
                        check_type(key, expected, value)?;
                    }
                }
                None if !additional_properties => {
                    return Err(format!("unexpected field: {key}"));
                }
                None => {}
            }
        }
    } else if !additional_properties {
        return Err("additionalProperties=false requires properties".to_string());
    }

    Ok(())
}

fn check_type(field: &str, expected: &str, value: &StructuredValue) -> Result<(), String> {
    let matches = match expected {
        "object" => value.as_object().is_some(),
        "array" => value.as_array().is_some(),
        "string" => value.as_str().is_some(),
        "number" | "integer" => value.as_f64().is_some(),
        "boolean" => value.as_bool().is_some(),
        "null" => value.is_null(),
        _ => true, // unknown type tag: don't fail closed on typos
    };
    if matches {
        Ok(())
    } else {
        Err(format!(
            "field {field}: expected {expected}, got {}",
            value.type_tag()
        ))
    }
}

/// Validate a [`crate::tool::ToolDescriptor`]'s own shape, per the
/// registry's `register()` contract: non-empty name/version/description,
/// `input_schema.type == "object"` with `properties`/`required`/
/// `additionalProperties`, and (for stable tools) at least one example
/// whose input validates against its own schema.
pub fn validate_descriptor(descriptor: &crate::tool::ToolDescriptor) -> Result<(), String> {
    if descriptor.name.trim().is_empty() {
        return Err("tool name must not be empty".to_string());
    }
    if descriptor.version.trim().is_empty() {
        return Err("tool version must not be empty".to_string());
    }
    if descriptor.description.trim().is_empty() {
        return Err("tool description must not be empty".to_string());
    }

    let schema_obj = descriptor
        .input_schema
        .as_object()
        .ok_or_else(|| "input_schema must be an object".to_string())?;
    if schema_obj.get("type").and_then(|v| v.as_str()) != Some("object") {
        return Err("input_schema.type must be \"object\"".to_string());
    }
    if schema_obj.get("properties").and_then(|v| v.as_object()).is_none() {
        return Err("input_schema.properties must be an object".to_string());
    }
    if schema_obj.get("required").and_then(|v| v.as_array()).is_none() {
        return Err("input_schema.required must be an array".to_string());
    }
    if schema_obj.get("additionalProperties").and_then(|v| v.as_bool()).is_none() {
        return Err("input_schema.additionalProperties must be a boolean".to_string());
    }

    if descriptor.stability == crate::tool::Stability::Stable {
        if descriptor.examples.is_empty() {
            return Err("stable tools must declare at least one example".to_string());
        }
        for example in &descriptor.examples {
            validate(&descriptor.input_schema, &example.input)
                .map_err(|e| format!("example \"{}\": {e}", example.title))?;
        }
    }

    Ok(())
}
