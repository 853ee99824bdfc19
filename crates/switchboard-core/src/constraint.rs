//! Matching constraints and their normalization.
//!
//! Registration accepts a small closed set of input shapes, collected in
//! [`ConstraintInput`]:
//!
//! - a bare callback id (`"pick_color"`)
//! - a pattern ([`Regex`]) searched in the callback id
//! - a structured [`Constraints`] record
//! - a JSON value, for constraints declared as data
//!
//! [`normalize`] turns any of them into a canonical [`Constraints`] record.
//!
//! ```rust,ignore
//! use regex::Regex;
//! use switchboard_core::Constraints;
//!
//! adapter.action("pick_color", handler)?;
//! adapter.action(Regex::new("^pick_")?, handler)?;
//! adapter.action(Constraints::new().callback_id("pick_color").kind("button"), handler)?;
//! adapter.action(json!({ "callbackId": { "pattern": "^pick_" }, "unfurl": true }), handler)?;
//! ```

use regex::Regex;
use serde_json::Value;

use crate::error::{ConstraintResult, InvalidConstraint};
use crate::validation;

/// How a constraint matches the payload's `callback_id`.
#[derive(Debug, Clone)]
pub enum CallbackId {
    /// Exact, case-sensitive equality.
    Exact(String),
    /// Unanchored search; anchor the pattern to require a full match.
    Pattern(Regex),
}

impl CallbackId {
    /// Returns `true` if `callback_id` satisfies this rule.
    pub fn matches(&self, callback_id: &str) -> bool {
        match self {
            Self::Exact(id) => id == callback_id,
            Self::Pattern(re) => re.is_match(callback_id),
        }
    }
}

impl From<&str> for CallbackId {
    fn from(id: &str) -> Self {
        Self::Exact(id.to_string())
    }
}

impl From<String> for CallbackId {
    fn from(id: String) -> Self {
        Self::Exact(id)
    }
}

impl From<Regex> for CallbackId {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

/// A canonical set of matching constraints.
///
/// Every field is optional; an empty record matches every payload.
#[derive(Debug, Clone, Default)]
pub struct Constraints {
    /// Rule for the payload's `callback_id`.
    pub callback_id: Option<CallbackId>,
    /// Required type of the payload's first action.
    pub kind: Option<String>,
    /// Required app unfurl flag. `None` differs from `Some(false)`.
    pub unfurl: Option<bool>,
}

impl Constraints {
    /// Creates an empty constraint set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the callback id rule.
    pub fn callback_id(mut self, id: impl Into<CallbackId>) -> Self {
        self.callback_id = Some(id.into());
        self
    }

    /// Sets the required action type.
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Sets the required unfurl flag.
    pub fn unfurl(mut self, unfurl: bool) -> Self {
        self.unfurl = Some(unfurl);
        self
    }
}

/// The shapes accepted by `action` and `options` registrations.
#[derive(Debug, Clone)]
pub enum ConstraintInput {
    /// Nothing was supplied.
    Absent,
    /// A bare callback id.
    Id(String),
    /// A callback id pattern.
    Pattern(Regex),
    /// A structured record.
    Record(Constraints),
    /// A constraint declared as JSON data.
    Json(Value),
}

impl From<&str> for ConstraintInput {
    fn from(id: &str) -> Self {
        Self::Id(id.to_string())
    }
}

impl From<String> for ConstraintInput {
    fn from(id: String) -> Self {
        Self::Id(id)
    }
}

impl From<Regex> for ConstraintInput {
    fn from(re: Regex) -> Self {
        Self::Pattern(re)
    }
}

impl From<Constraints> for ConstraintInput {
    fn from(constraints: Constraints) -> Self {
        Self::Record(constraints)
    }
}

impl From<Value> for ConstraintInput {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl<T: Into<ConstraintInput>> From<Option<T>> for ConstraintInput {
    fn from(input: Option<T>) -> Self {
        input.map_or(Self::Absent, Into::into)
    }
}

/// Coerces a registration argument into a canonical constraint record.
///
/// Bare ids and patterns are wrapped as `{ callback_id }`; records are taken
/// as they are; JSON values go through the general validation rules.
pub fn normalize(input: ConstraintInput) -> ConstraintResult<Constraints> {
    match input {
        ConstraintInput::Absent => Err(absent()),
        ConstraintInput::Id(id) => Ok(Constraints::new().callback_id(id)),
        ConstraintInput::Pattern(re) => Ok(Constraints::new().callback_id(re)),
        ConstraintInput::Record(constraints) => Ok(constraints),
        ConstraintInput::Json(value) => normalize_json(&value),
    }
}

fn normalize_json(value: &Value) -> ConstraintResult<Constraints> {
    match value {
        Value::Null => Err(absent()),
        Value::Object(record) => {
            let raw_id = record.get("callbackId").or_else(|| record.get("callback_id"));
            Ok(Constraints {
                callback_id: raw_id.map(validation::callback_id).transpose()?.flatten(),
                kind: record.get("type").map(validation::kind).transpose()?.flatten(),
                unfurl: record.get("unfurl").map(validation::unfurl).transpose()?.flatten(),
            })
        }
        // A non-record value stands for the callback id itself.
        other => Ok(Constraints {
            callback_id: validation::callback_id(other)?,
            ..Default::default()
        }),
    }
}

fn absent() -> InvalidConstraint {
    InvalidConstraint::new("callback id cannot be absent")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_input_is_rejected() {
        let err = normalize(ConstraintInput::Absent).unwrap_err();
        assert_eq!(err.reason, "callback id cannot be absent");

        let none: Option<&str> = None;
        assert!(normalize(none.into()).is_err());
        assert!(normalize(Value::Null.into()).is_err());
    }

    #[test]
    fn test_bare_id_is_wrapped() {
        let constraints = normalize("pick_color".into()).unwrap();
        assert!(matches!(constraints.callback_id, Some(CallbackId::Exact(ref id)) if id == "pick_color"));
        assert!(constraints.kind.is_none());
        assert!(constraints.unfurl.is_none());
    }

    #[test]
    fn test_pattern_is_wrapped() {
        let constraints = normalize(Regex::new("^pick_").unwrap().into()).unwrap();
        let rule = constraints.callback_id.unwrap();
        assert!(rule.matches("pick_color"));
        assert!(!rule.matches("color_pick"));
    }

    #[test]
    fn test_record_is_taken_as_is() {
        let constraints =
            normalize(Constraints::new().callback_id("a").kind("button").unfurl(false).into())
                .unwrap();
        assert_eq!(constraints.kind.as_deref(), Some("button"));
        assert_eq!(constraints.unfurl, Some(false));
    }

    #[test]
    fn test_json_record() {
        let constraints = normalize(
            json!({ "callbackId": { "pattern": "color$" }, "type": "select", "unfurl": true })
                .into(),
        )
        .unwrap();
        assert!(constraints.callback_id.unwrap().matches("pick_color"));
        assert_eq!(constraints.kind.as_deref(), Some("select"));
        assert_eq!(constraints.unfurl, Some(true));

        let constraints = normalize(json!("pick_color").into()).unwrap();
        assert!(matches!(constraints.callback_id, Some(CallbackId::Exact(_))));

        let empty = normalize(json!({}).into()).unwrap();
        assert!(empty.callback_id.is_none());
    }

    #[test]
    fn test_json_rejects_non_string_callback_id() {
        assert!(normalize(json!(42).into()).is_err());
        assert!(normalize(json!({ "callbackId": ["a"] }).into()).is_err());
        assert!(normalize(json!({ "callbackId": { "pattern": "(" } }).into()).is_err());
        assert!(normalize(json!({ "unfurl": "yes" }).into()).is_err());
    }
}
