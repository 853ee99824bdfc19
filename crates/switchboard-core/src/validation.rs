//! Constraint validation rules.
//!
//! Two independent checks exist and the registration call composes the ones
//! it needs:
//!
//! - general rules, applied to every constraint (callback id must be a string
//!   or a pattern, unfurl must be a boolean)
//! - the action rule, applied only to `action` registrations (type must be one
//!   of [`ACTION_TYPES`])
//!
//! Every check returns a descriptive [`InvalidConstraint`] instead of
//! panicking, so callers decide when to fail.

use regex::Regex;
use serde_json::Value;

use crate::constraint::{CallbackId, Constraints};
use crate::error::{ConstraintResult, InvalidConstraint};

/// Action types an `action` registration may constrain on.
pub const ACTION_TYPES: [&str; 3] = ["select", "button", "dialog_submission"];

/// Checks a raw callback id: a string, or `{ "pattern": "<regex>" }`.
///
/// `null` is treated as "not constrained".
pub fn callback_id(raw: &Value) -> ConstraintResult<Option<CallbackId>> {
    match raw {
        Value::Null => Ok(None),
        Value::String(id) => Ok(Some(CallbackId::Exact(id.clone()))),
        Value::Object(obj) => match obj.get("pattern") {
            Some(Value::String(pattern)) => Regex::new(pattern)
                .map(|re| Some(CallbackId::Pattern(re)))
                .map_err(|e| InvalidConstraint::new(format!("invalid callback id pattern: {e}"))),
            _ => Err(not_id_or_pattern()),
        },
        _ => Err(not_id_or_pattern()),
    }
}

/// Checks a raw action type: any string is structurally valid.
pub fn kind(raw: &Value) -> ConstraintResult<Option<String>> {
    match raw {
        Value::Null => Ok(None),
        Value::String(kind) => Ok(Some(kind.clone())),
        _ => Err(InvalidConstraint::new("type must be a string")),
    }
}

/// Checks a raw unfurl flag.
pub fn unfurl(raw: &Value) -> ConstraintResult<Option<bool>> {
    match raw {
        Value::Null => Ok(None),
        Value::Bool(flag) => Ok(Some(*flag)),
        _ => Err(InvalidConstraint::new("unfurl must be a boolean")),
    }
}

/// Checks the action-specific rule on a normalized record.
pub fn action_type(constraints: &Constraints) -> ConstraintResult<()> {
    match constraints.kind.as_deref() {
        Some(kind) if !ACTION_TYPES.contains(&kind) => Err(InvalidConstraint::new(format!(
            "type must be one of {ACTION_TYPES:?}, got \"{kind}\""
        ))),
        _ => Ok(()),
    }
}

fn not_id_or_pattern() -> InvalidConstraint {
    InvalidConstraint::new("callback id must be a string or a pattern")
}
