//! Operator guard shared by the mutating handlers.

use crate::domain::{Error, Operator};

use super::session::SessionContext;
use super::state::HttpState;

/// Resolve the session grant into the operator capability or fail with
/// `401 unauthorized`.
pub async fn require_operator(state: &HttpState, session: &SessionContext) -> Result<Operator, Error> {
    state.access.authorize(session.grant()).await
}
