//! Structural validation of raw `/generate` bodies.
//!
//! Runs on the untyped JSON value so that a missing `seed` and a `seed` of the
//! wrong type produce distinct messages instead of a generic schema error.

use serde_json::{Map, Value};

use super::GenerationRequest;
use super::error::ValidationError;

/// Validates a raw body and builds the typed request.
pub fn validate_request(body: &Value) -> Result<GenerationRequest, ValidationError> {
    let obj = body.as_object().ok_or(ValidationError::NotAnObject)?;

    let model = required_string(obj, "model")?;
    let prompt = required_string(obj, "prompt")?;
    let seed = required_integer(obj, "seed")?;

    let system_prompt = match present(obj, "systemPrompt") {
        None => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(ValidationError::WrongType {
                field: "systemPrompt",
                expected: "a string",
            });
        }
    };

    let temperature = match present(obj, "temperature") {
        None => None,
        Some(v) => {
            let t = v.as_f64().ok_or(ValidationError::WrongType {
                field: "temperature",
                expected: "a number",
            })?;
            if t != 0.0 {
                return Err(ValidationError::NonZeroTemperature { value: t });
            }
            Some(t)
        }
    };

    let max_tokens = match present(obj, "maxTokens") {
        None => None,
        Some(v) => {
            let n = integral(v)
                .filter(|n| *n > 0 && *n <= i64::from(u32::MAX))
                .ok_or(ValidationError::WrongType {
                    field: "maxTokens",
                    expected: "a positive integer",
                })?;
            Some(n as u32)
        }
    };

    Ok(GenerationRequest {
        model,
        prompt,
        system_prompt,
        temperature,
        max_tokens,
        seed,
    })
}

/// Returns the field unless it is absent or `null`.
fn present<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn required_string(
    obj: &Map<String, Value>,
    field: &'static str,
) -> Result<String, ValidationError> {
    match present(obj, field) {
        None => Err(ValidationError::MissingField { field }),
        Some(Value::String(s)) if s.is_empty() => Err(ValidationError::EmptyField { field }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ValidationError::EmptyField { field }),
    }
}

fn required_integer(obj: &Map<String, Value>, field: &'static str) -> Result<i64, ValidationError> {
    let value = present(obj, field).ok_or(ValidationError::MissingField { field })?;
    integral(value).ok_or(ValidationError::WrongType {
        field,
        expected: "an integer",
    })
}

/// Accepts JSON integers and integral floats (`12345.0`) that fit in `i64`.
fn integral(value: &Value) -> Option<i64> {
    if let Some(n) = value.as_i64() {
        return Some(n);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
