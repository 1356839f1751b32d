//! Verb-to-action mapping.
//!
//! The effective HTTP method alone decides which action runs:
//!
//! | Method   | Action   |
//! |----------|----------|
//! | `GET`    | `index`  |
//! | `PUT`    | `update` |
//! | `POST`   | `create` |
//! | `DELETE` | `delete` |
//!
//! Any other method resolves to [`Action::Invalid`], which answers
//! `405 Method Not Allowed` with an `Allow` header listing the four verbs.

use std::fmt;

use http::Method;
use tracing::debug;

use crate::server::RestResponse;

/// Named handler selected by the effective method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Index,
    Create,
    Update,
    Delete,
    /// Fallback for methods outside the action map.
    Invalid,
}

impl Action {
    /// Lower-case action name, as used for view lookup.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Index => "index",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed verb-to-action table, in declaration order.
///
/// Exactly four entries; the order is also the order of the `Allow` header.
pub static ACTION_MAP: [(Method, Action); 4] = [
    (Method::GET, Action::Index),
    (Method::PUT, Action::Update),
    (Method::POST, Action::Create),
    (Method::DELETE, Action::Delete),
];

/// Resolve the action for an effective method.
#[must_use]
pub fn resolve_action(method: &Method) -> Action {
    let action = ACTION_MAP
        .iter()
        .find(|(verb, _)| verb == method)
        .map(|(_, action)| *action)
        .unwrap_or(Action::Invalid);
    debug!(method = %method, action = %action, "Action resolved");
    action
}

/// Value of the `Allow` header sent with a 405: `GET, PUT, POST, DELETE`.
#[must_use]
pub fn allow_header() -> String {
    ACTION_MAP
        .iter()
        .map(|(verb, _)| verb.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// The `invalid` action: 405, `Allow` header, no body.
///
/// Only reachable through the dispatcher when [`resolve_action`] falls back.
pub(crate) fn invalid(response: &mut RestResponse) {
    response.status = 405;
    response.set_header("allow", allow_header());
    response.body.clear();
}
