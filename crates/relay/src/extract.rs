//! Per-variant field extraction from the raw webhook payload.
//!
//! The payload is a loosely-typed [`Value`] whose shape varies by event type;
//! every nested access here is fallible. An extractor either returns a
//! fully-populated variant record or a [`RelayError::MissingField`] naming the
//! absent field in the terms shown to humans — it never returns a
//! partially-filled record.

use serde_json::Value;

use crate::errors::RelayError;
use crate::event::{
    CommentActivity, EventKind, IssueActivity, MentionEvent, PullRequestActivity, ReviewActivity,
    ReviewCommentActivity, ReviewRequest,
};
use crate::identifiers::{IssueNumber, Login, PullRequestNumber};

/// Placeholder rendered in place of an absent or empty free-text body.
pub const NO_DESCRIPTION: &str = "no description provided";

/// Extracts the variant record for an already-classified event.
pub fn extract(kind: EventKind, payload: &Value) -> Result<MentionEvent, RelayError> {
    match kind {
        EventKind::PullRequest => extract_pull_request(payload).map(MentionEvent::PullRequest),
        EventKind::ReviewRequested => {
            extract_review_request(payload).map(MentionEvent::ReviewRequested)
        }
        EventKind::Issue => extract_issue(payload).map(MentionEvent::Issue),
        EventKind::IssueComment => extract_comment(payload).map(MentionEvent::IssueComment),
        EventKind::PullRequestComment => {
            extract_comment(payload).map(MentionEvent::PullRequestComment)
        }
        EventKind::Review => extract_review(payload).map(MentionEvent::Review),
        EventKind::ReviewComment => extract_review_comment(payload).map(MentionEvent::ReviewComment),
    }
}

// ---------------------------------------------------------------------------
// Variant extractors
// ---------------------------------------------------------------------------

fn extract_pull_request(payload: &Value) -> Result<PullRequestActivity, RelayError> {
    Ok(PullRequestActivity {
        action: required_str(payload, "/action", "event action")?,
        author: required_login(payload, "/pull_request/user/login", "pull request author login")?,
        avatar_url: optional_str(payload, "/pull_request/user/avatar_url"),
        number: PullRequestNumber::new(required_u64(
            payload,
            "/pull_request/number",
            "pull request number",
        )?),
        title: required_str(payload, "/pull_request/title", "pull request title")?,
        url: required_str(payload, "/pull_request/html_url", "pull request url")?,
    })
}

fn extract_review_request(payload: &Value) -> Result<ReviewRequest, RelayError> {
    // An individual reviewer if one was named; the requested team otherwise.
    let requested = optional_str(payload, "/requested_reviewer/login")
        .or_else(|| optional_str(payload, "/requested_team/name"))
        .and_then(Login::new)
        .ok_or_else(|| RelayError::missing("requested reviewer"))?;

    Ok(ReviewRequest {
        requested,
        requester: required_login(payload, "/sender/login", "review request sender login")?,
        number: PullRequestNumber::new(required_u64(
            payload,
            "/pull_request/number",
            "pull request number",
        )?),
        title: required_str(payload, "/pull_request/title", "pull request title")?,
        url: required_str(payload, "/pull_request/html_url", "pull request url")?,
    })
}

fn extract_issue(payload: &Value) -> Result<IssueActivity, RelayError> {
    Ok(IssueActivity {
        action: required_str(payload, "/action", "event action")?,
        author: required_login(payload, "/issue/user/login", "issue author login")?,
        avatar_url: optional_str(payload, "/issue/user/avatar_url"),
        number: IssueNumber::new(required_u64(payload, "/issue/number", "issue number")?),
        title: required_str(payload, "/issue/title", "issue title")?,
        url: required_str(payload, "/issue/html_url", "issue url")?,
        body: optional_str(payload, "/issue/body"),
    })
}

/// Shared by the issue-comment and PR-comment variants: the payload shape is
/// identical, with the subject in the `issue` object either way.
fn extract_comment(payload: &Value) -> Result<CommentActivity, RelayError> {
    let body = payload
        .pointer("/comment/body")
        .and_then(Value::as_str)
        .ok_or_else(|| RelayError::missing("comment body"))?;

    Ok(CommentActivity {
        action: required_str(payload, "/action", "event action")?,
        commenter: required_login(payload, "/comment/user/login", "comment author login")?,
        author: required_login(payload, "/issue/user/login", "issue author login")?,
        number: IssueNumber::new(required_u64(payload, "/issue/number", "issue number")?),
        title: required_str(payload, "/issue/title", "issue title")?,
        state: optional_str(payload, "/issue/state"),
        quoted_body: quote_block(body),
        comment_url: required_str(payload, "/comment/html_url", "comment url")?,
    })
}

fn extract_review(payload: &Value) -> Result<ReviewActivity, RelayError> {
    Ok(ReviewActivity {
        action: required_str(payload, "/action", "event action")?,
        reviewer: required_login(payload, "/review/user/login", "review author login")?,
        author: pull_request_author(payload)?,
        number: optional_u64(payload, "/pull_request/number").map(PullRequestNumber::new),
        title: required_str(payload, "/pull_request/title", "pull request title")?,
        url: required_str(payload, "/pull_request/html_url", "pull request url")?,
        pr_state: optional_str(payload, "/pull_request/state"),
        verdict: required_str(payload, "/review/state", "review state")?,
        body: optional_str(payload, "/review/body"),
        review_url: optional_str(payload, "/review/html_url"),
    })
}

fn extract_review_comment(payload: &Value) -> Result<ReviewCommentActivity, RelayError> {
    Ok(ReviewCommentActivity {
        action: required_str(payload, "/action", "event action")?,
        commenter: required_login(payload, "/comment/user/login", "comment author login")?,
        author: pull_request_author(payload)?,
        number: optional_u64(payload, "/pull_request/number").map(PullRequestNumber::new),
        title: required_str(payload, "/pull_request/title", "pull request title")?,
        url: required_str(payload, "/pull_request/html_url", "pull request url")?,
        pr_state: optional_str(payload, "/pull_request/state"),
        body: required_str(payload, "/comment/body", "comment body")?,
        path: optional_str(payload, "/comment/path"),
        diff_hunk: optional_str(payload, "/comment/diff_hunk"),
        comment_url: required_str(payload, "/comment/html_url", "comment url")?,
    })
}

/// The pull request author for review-shaped payloads.
///
/// Normally `pull_request.user.login`; some payload deliveries only carry the
/// author on the base branch object, so that path is kept as a fallback.
fn pull_request_author(payload: &Value) -> Result<Login, RelayError> {
    optional_str(payload, "/pull_request/user/login")
        .or_else(|| optional_str(payload, "/pull_request/base/user/login"))
        .and_then(Login::new)
        .ok_or_else(|| RelayError::missing("pull request author login"))
}

// ---------------------------------------------------------------------------
// Field helpers and text policies
// ---------------------------------------------------------------------------

fn required_str(payload: &Value, pointer: &str, field: &str) -> Result<String, RelayError> {
    payload
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RelayError::missing(field))
}

fn required_login(payload: &Value, pointer: &str, field: &str) -> Result<Login, RelayError> {
    payload
        .pointer(pointer)
        .and_then(Value::as_str)
        .and_then(Login::new)
        .ok_or_else(|| RelayError::missing(field))
}

fn required_u64(payload: &Value, pointer: &str, field: &str) -> Result<u64, RelayError> {
    payload
        .pointer(pointer)
        .and_then(Value::as_u64)
        .ok_or_else(|| RelayError::missing(field))
}

fn optional_str(payload: &Value, pointer: &str) -> Option<String> {
    payload
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn optional_u64(payload: &Value, pointer: &str) -> Option<u64> {
    payload.pointer(pointer).and_then(Value::as_u64)
}

/// Renders a comment body as a block quote: every line is individually
/// prefixed and the lines are re-joined with newlines, preserving order.
///
/// An empty body yields an empty quoted block, not an error.
pub fn quote_block(body: &str) -> String {
    body.lines()
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns the body text to show, substituting [`NO_DESCRIPTION`] for an
/// absent or empty body so no template ever renders an empty segment.
pub fn body_or_placeholder(body: Option<&str>) -> String {
    match body {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => NO_DESCRIPTION.to_string(),
    }
}
