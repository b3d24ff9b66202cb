//! Admin-area guard decision.
//!
//! Consumers must not redirect while auth is still loading; otherwise a
//! fresh page load would bounce an admin to the login page before their
//! role lookup finished.

use super::reconciler::ReconcilerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Auth not resolved yet; show a loading indicator.
    Wait,
    RedirectToLogin,
    Allow,
}

/// Decide what the admin area should do for the given auth state.
#[must_use]
pub fn admin_gate(state: &ReconcilerState) -> GateDecision {
    if state.loading {
        return GateDecision::Wait;
    }
    match (&state.user, state.is_admin) {
        (Some(_), true) => GateDecision::Allow,
        _ => GateDecision::RedirectToLogin,
    }
}

#[cfg(test)]
#[path = "gate_test.rs"]
mod tests;
