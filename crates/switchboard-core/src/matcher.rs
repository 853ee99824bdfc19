//! Constraint matching.
//!
//! A constraint set matches a payload when all three filters pass:
//!
//! 1. **callback id**: exact equality or unanchored pattern search
//! 2. **type**: the first action's type, only enforced when the payload
//!    carries actions
//! 3. **unfurl**: parity with the payload's unfurl flag, only enforced when
//!    the constraint states it
//!
//! An absent constraint field always passes.

use crate::constraint::Constraints;
use crate::payload::InteractionPayload;

/// Returns `true` if `payload` satisfies every filter of `constraints`.
pub fn matches(constraints: &Constraints, payload: &InteractionPayload) -> bool {
    callback_id_passes(constraints, payload)
        && type_passes(constraints, payload)
        && unfurl_passes(constraints, payload)
}

fn callback_id_passes(constraints: &Constraints, payload: &InteractionPayload) -> bool {
    constraints
        .callback_id
        .as_ref()
        .is_none_or(|rule| rule.matches(&payload.callback_id))
}

fn type_passes(constraints: &Constraints, payload: &InteractionPayload) -> bool {
    match (constraints.kind.as_deref(), payload.first_action_type()) {
        (Some(kind), Some(action_kind)) => kind == action_kind,
        // Without actions there is nothing to compare against.
        _ => true,
    }
}

fn unfurl_passes(constraints: &Constraints, payload: &InteractionPayload) -> bool {
    constraints
        .unfurl
        .is_none_or(|unfurl| unfurl == payload.is_app_unfurl())
}
