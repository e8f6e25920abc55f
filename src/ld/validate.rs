//! Structural, single-pass input validation (spec.md §4.A): no RDF
//! expansion, reasoning, or schema inference, matching the teacher's
//! `src/validate/mod.rs` discipline of an enum-of-reasons error type
//! produced by direct field checks.

use serde_json::Value;
use thiserror::Error;

use super::resource::{HttpMethod, Operation, PropertyShape, Resource};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("MISSING_ID: resource has no `id`")]
    MissingId,
    #[error("MISSING_TYPE: resource has no primary type")]
    MissingType,
    #[error("INVALID_IRI: `id` is not a string")]
    InvalidIri,
    #[error("MISSING_METHOD: operation has no `method`")]
    MissingMethod,
    #[error("MISSING_TITLE: operation has no `title`")]
    MissingTitle,
    #[error("MISSING_REQUIRED_PROPERTY: `{0}`")]
    MissingRequiredProperty(String),
    #[error("INVALID_PROPERTY_TYPE: `{0}` does not match datatype `{1}`")]
    InvalidPropertyType(String, String),
    #[error("SHACL_VIOLATION: `{0}`: {1}")]
    ShaclViolation(String, String),
}

#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<String>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// `validateResource` (spec.md §4.A).
pub fn validate_resource(node: &Resource) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();

    if node.id.is_empty() {
        outcome.errors.push(ValidationError::MissingId);
    }
    if node.primary_type().is_none() {
        outcome.errors.push(ValidationError::MissingType);
    }
    if node.context.is_none() {
        outcome
            .warnings
            .push("resource has no @context (permitted, context may be inherited)".to_string());
    }

    outcome
}

/// `validateOperation` (spec.md §4.A): also requires `method` in the
/// allowed HTTP set (enforced structurally by `HttpMethod` already being a
/// closed enum) and a non-empty `title`.
pub fn validate_operation(op: &Operation) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();
    if op.title.trim().is_empty() {
        outcome.errors.push(ValidationError::MissingTitle);
    }
    let _: HttpMethod = op.method; // method presence is enforced by the type system
    outcome
}

fn datatype_matches(value: &Value, datatype: &str) -> bool {
    match datatype {
        "string" => value.is_string(),
        "integer" => value.as_i64().is_some() || value.as_u64().is_some(),
        "decimal" => value.is_number(),
        "boolean" => value.is_boolean(),
        "datetime" => value
            .as_str()
            .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok()),
        "uri" => value
            .as_str()
            .is_some_and(|s| s.contains("://") || s.starts_with("did:") || s.starts_with("urn:")),
        _ => true,
    }
}

fn numeric(value: &Value) -> Option<f64> {
    value.as_f64()
}

fn pattern_matches(pattern: &str, s: &str) -> bool {
    // A small, dependency-free glob-style matcher is enough for the
    // SHACL-lite surface this validator covers: '*' matches any run of
    // characters, every other character must match literally.
    fn matches_from(pat: &[char], s: &[char]) -> bool {
        match pat.first() {
            None => s.is_empty(),
            Some('*') => {
                (0..=s.len()).any(|i| matches_from(&pat[1..], &s[i..]))
            }
            Some(c) => s.first() == Some(c) && matches_from(&pat[1..], &s[1..]),
        }
    }
    let pat: Vec<char> = pattern.chars().collect();
    let s: Vec<char> = s.chars().collect();
    matches_from(&pat, &s)
}

/// `validateInput` (spec.md §4.A): for each shape, a missing optional field
/// short-circuits the rest of its checks.
pub fn validate_input(payload: &Value, shapes: &[PropertyShape]) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::default();
    let obj = payload.as_object();

    for shape in shapes {
        let value = obj.and_then(|o| o.get(&shape.property));

        let value = match value {
            Some(v) => v,
            None => {
                if shape.required {
                    outcome
                        .errors
                        .push(ValidationError::MissingRequiredProperty(
                            shape.property.clone(),
                        ));
                }
                continue;
            }
        };

        if let Some(datatype) = &shape.datatype {
            if !datatype_matches(value, datatype) {
                outcome.errors.push(ValidationError::InvalidPropertyType(
                    shape.property.clone(),
                    datatype.clone(),
                ));
                continue;
            }
        }

        if let Some(min_len) = shape.min_length {
            let len = value.as_str().map(str::len).unwrap_or(0);
            if len < min_len {
                outcome.errors.push(ValidationError::ShaclViolation(
                    shape.property.clone(),
                    format!("minLength {min_len} violated (got {len})"),
                ));
            }
        }
        if let Some(max_len) = shape.max_length {
            let len = value.as_str().map(str::len).unwrap_or(0);
            if len > max_len {
                outcome.errors.push(ValidationError::ShaclViolation(
                    shape.property.clone(),
                    format!("maxLength {max_len} violated (got {len})"),
                ));
            }
        }
        if let Some(min_inc) = shape.min_inclusive {
            if let Some(n) = numeric(value) {
                if n < min_inc {
                    outcome.errors.push(ValidationError::ShaclViolation(
                        shape.property.clone(),
                        format!("minInclusive {min_inc} violated (got {n})"),
                    ));
                }
            }
        }
        if let Some(max_inc) = shape.max_inclusive {
            if let Some(n) = numeric(value) {
                if n > max_inc {
                    outcome.errors.push(ValidationError::ShaclViolation(
                        shape.property.clone(),
                        format!("maxInclusive {max_inc} violated (got {n})"),
                    ));
                }
            }
        }
        if let Some(pattern) = &shape.pattern {
            if let Some(s) = value.as_str() {
                if !pattern_matches(pattern, s) {
                    outcome.errors.push(ValidationError::ShaclViolation(
                        shape.property.clone(),
                        format!("pattern `{pattern}` violated"),
                    ));
                }
            }
        }
        if let Some(allowed) = &shape.r#in {
            if !allowed.contains(value) {
                outcome.errors.push(ValidationError::ShaclViolation(
                    shape.property.clone(),
                    "value not in allowed set".to_string(),
                ));
            }
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ld::resource::HttpMethod;
    use serde_json::json;

    #[test]
    fn missing_id_and_type_rejected() {
        let r = Resource {
            id: String::new(),
            types: vec![],
            context: None,
            operation: None,
            member: None,
            total_items: None,
            first: None,
            previous: None,
            next: None,
            last: None,
            extra: Default::default(),
        };
        let outcome = validate_resource(&r);
        assert!(outcome.errors.contains(&ValidationError::MissingId));
        assert!(outcome.errors.contains(&ValidationError::MissingType));
    }

    #[test]
    fn missing_context_is_a_warning_not_an_error() {
        let r = Resource::new("https://x/a", vec!["schema:Thing".into()]);
        let outcome = validate_resource(&r);
        assert!(outcome.is_valid());
        assert_eq!(outcome.warnings.len(), 1);
    }

    #[test]
    fn operation_requires_title() {
        let op = Operation {
            method: HttpMethod::Post,
            title: "".into(),
            expects: None,
            returns: None,
            target: None,
            constraint: None,
        };
        assert!(!validate_operation(&op).is_valid());
    }

    #[test]
    fn shacl_violation_reports_both_paths() {
        let shapes = vec![
            PropertyShape {
                property: "schema:name".into(),
                required: true,
                min_length: Some(1),
                max_length: Some(100),
                ..Default::default()
            },
            PropertyShape {
                property: "schema:price".into(),
                required: true,
                min_inclusive: Some(0.0),
                ..Default::default()
            },
        ];
        let payload = json!({ "schema:name": "", "schema:price": -1 });
        let outcome = validate_input(&payload, &shapes);
        assert_eq!(outcome.errors.len(), 2);
    }

    #[test]
    fn missing_optional_short_circuits() {
        let shapes = vec![PropertyShape {
            property: "schema:nickname".into(),
            required: false,
            min_length: Some(5),
            ..Default::default()
        }];
        let outcome = validate_input(&json!({}), &shapes);
        assert!(outcome.is_valid());
    }
}
