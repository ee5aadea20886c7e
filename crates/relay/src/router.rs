//! Event classification.
//!
//! Maps the raw `(event name, payload)` pair onto exactly one [`EventKind`].
//! The rules are ordered by specificity and the first match wins; anything
//! left over is an [`RelayError::UnclassifiedEvent`], which is fatal for the
//! invocation (there is no retry).

use serde_json::Value;
use tracing::debug;

use crate::errors::RelayError;
use crate::event::EventKind;

/// Classifies an inbound webhook event.
///
/// Precedence:
///
/// 1. A payload whose `action` is `"review_requested"` is a review request,
///    regardless of the top-level event name — the sub-action is the more
///    specific signal.
/// 2. Otherwise dispatch on the event name.
/// 3. `issue_comment` events are split on whether the commented-on subject is
///    a pull request: the `issue` object carries a `pull_request` back-reference
///    exactly when it is.
pub fn classify(event_name: &str, payload: &Value) -> Result<EventKind, RelayError> {
    let action = payload
        .get("action")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if action == "review_requested" {
        debug!(event_name, "classified as a review request by sub-action");
        return Ok(EventKind::ReviewRequested);
    }

    let kind = match event_name {
        "pull_request" => EventKind::PullRequest,
        "issues" => EventKind::Issue,
        "issue_comment" => {
            if is_pull_request_comment(payload) {
                EventKind::PullRequestComment
            } else {
                EventKind::IssueComment
            }
        }
        "pull_request_review" => EventKind::Review,
        "pull_request_review_comment" => EventKind::ReviewComment,
        _ => {
            return Err(RelayError::UnclassifiedEvent {
                event_name: event_name.to_string(),
                action: action.to_string(),
            });
        }
    };

    debug!(event_name, action, ?kind, "classified inbound event");
    Ok(kind)
}

/// A comment event concerns a pull request when the subject carries a
/// non-null `pull_request` back-reference.
fn is_pull_request_comment(payload: &Value) -> bool {
    payload
        .pointer("/issue/pull_request")
        .is_some_and(|v| !v.is_null())
}
