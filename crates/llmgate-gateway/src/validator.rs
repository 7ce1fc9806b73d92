//! Schema validation for model responses.
//!
//! The output contract is declarative ([`OutputSchema`]) and checked in one
//! place. Missing required fields are reported, never synthesized: the
//! parsed object is returned exactly as the model produced it, and policy
//! decisions about remediation stay with the caller.

use llmgate_core::{OutputSchema, ValidationOutcome};
use serde_json::{json, Value};

/// Validate a raw model response against the declared schema.
///
/// Total: unparsable or non-object responses are a recovered condition, not
/// an error — they yield `validation_passed = false` with the raw text
/// preserved verbatim for diagnosis.
#[must_use]
pub fn validate(raw_response: &str, schema: &OutputSchema) -> ValidationOutcome {
    match serde_json::from_str::<Value>(raw_response) {
        Ok(Value::Object(parsed)) => {
            let missing_fields: Vec<String> = schema
                .required
                .iter()
                .filter(|field| !parsed.contains_key(*field))
                .cloned()
                .collect();
            ValidationOutcome {
                validation_passed: missing_fields.is_empty(),
                data: Value::Object(parsed),
                missing_fields,
            }
        }
        _ => ValidationOutcome {
            data: json!({
                "error": "Invalid JSON response",
                "raw_response": raw_response,
            }),
            validation_passed: false,
            missing_fields: Vec::new(),
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
