//! The classified event model.
//!
//! [`MentionEvent`] is an explicit sum type with one variant per supported
//! `(event name, sub-action, subject shape)` combination. A variant is only
//! constructed by the extractors after every required field has been confirmed
//! present; the raw `serde_json::Value` payload never crosses that boundary.

use serde::{Deserialize, Serialize};

use crate::identifiers::{IssueNumber, Login, PullRequestNumber};

/// The variant tag produced by the router and consumed by the extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Pull request activity (opened, edited, closed, reopened, ...).
    PullRequest,
    /// A review was requested on a pull request.
    ReviewRequested,
    /// Issue activity (opened, edited, closed, ...).
    Issue,
    /// A comment on a plain issue.
    IssueComment,
    /// A comment on the issue side of a pull request.
    PullRequestComment,
    /// A pull request review was submitted.
    Review,
    /// An inline diff comment on a pull request review.
    ReviewComment,
}

// ---------------------------------------------------------------------------
// Variant records
// ---------------------------------------------------------------------------

/// Pull request opened/updated activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestActivity {
    /// The webhook sub-action ("opened", "edited", ...), used as the verb.
    pub action: String,
    /// The pull request author.
    pub author: Login,
    /// The author's avatar image URL, when the payload carries one.
    pub avatar_url: Option<String>,
    pub number: PullRequestNumber,
    pub title: String,
    pub url: String,
}

/// A review was requested from an individual (or, failing that, a team).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// The reviewer being asked: `requested_reviewer.login`, falling back to
    /// `requested_team.name` for team review requests.
    pub requested: Login,
    /// Whoever triggered the request (the payload sender).
    pub requester: Login,
    pub number: PullRequestNumber,
    pub title: String,
    pub url: String,
}

/// Issue opened/updated activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueActivity {
    pub action: String,
    /// The issue author.
    pub author: Login,
    /// The author's avatar image URL, when the payload carries one.
    pub avatar_url: Option<String>,
    pub number: IssueNumber,
    pub title: String,
    pub url: String,
    /// The issue body. `None` or empty renders as the no-description
    /// placeholder; only the "opened" template shows it at all.
    pub body: Option<String>,
}

/// A comment on an issue, or on the issue side of a pull request.
///
/// Both comment variants of [`MentionEvent`] share this record: the payload
/// shape is identical (the subject lives in the `issue` object either way)
/// and only the wording of the composed message differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentActivity {
    pub action: String,
    /// Who wrote the comment (primary actor).
    pub commenter: Login,
    /// Who opened the commented-on subject (secondary actor).
    pub author: Login,
    pub number: IssueNumber,
    pub title: String,
    /// Subject state ("open", "closed"), when present in the payload.
    pub state: Option<String>,
    /// The comment body, already block-quoted line by line. Empty when the
    /// comment body was empty — an empty quote block is valid output.
    pub quoted_body: String,
    /// Direct link to the comment.
    pub comment_url: String,
}

/// A submitted pull request review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewActivity {
    pub action: String,
    /// Who submitted the review (primary actor).
    pub reviewer: Login,
    /// The pull request author (secondary actor).
    pub author: Login,
    /// Absent when the payload carries no pull request number.
    pub number: Option<PullRequestNumber>,
    pub title: String,
    pub url: String,
    /// Pull request state ("open", "closed"), when present.
    pub pr_state: Option<String>,
    /// The review verdict: `"approved"` selects the short template with no
    /// body; anything else selects the generic template which must show it.
    pub verdict: String,
    /// The review body; shown (or replaced by the placeholder) only on the
    /// non-approved template.
    pub body: Option<String>,
    /// Direct link to the review, when present.
    pub review_url: Option<String>,
}

/// An inline diff comment on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCommentActivity {
    pub action: String,
    /// Who wrote the comment (primary actor).
    pub commenter: Login,
    /// The pull request author (secondary actor).
    pub author: Login,
    pub number: Option<PullRequestNumber>,
    pub title: String,
    pub url: String,
    pub pr_state: Option<String>,
    /// The comment body, verbatim (inline comments are shown next to their
    /// diff hunk, not as a quote block).
    pub body: String,
    /// Path of the commented file, when present.
    pub path: Option<String>,
    /// The surrounding diff hunk, when present.
    pub diff_hunk: Option<String>,
    /// Direct link to the comment.
    pub comment_url: String,
}

// ---------------------------------------------------------------------------
// The sum type
// ---------------------------------------------------------------------------

/// One fully-validated, notification-worthy event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MentionEvent {
    PullRequest(PullRequestActivity),
    ReviewRequested(ReviewRequest),
    Issue(IssueActivity),
    IssueComment(CommentActivity),
    PullRequestComment(CommentActivity),
    Review(ReviewActivity),
    ReviewComment(ReviewCommentActivity),
}

impl MentionEvent {
    /// Returns the variant tag this event was classified as.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::PullRequest(_) => EventKind::PullRequest,
            Self::ReviewRequested(_) => EventKind::ReviewRequested,
            Self::Issue(_) => EventKind::Issue,
            Self::IssueComment(_) => EventKind::IssueComment,
            Self::PullRequestComment(_) => EventKind::PullRequestComment,
            Self::Review(_) => EventKind::Review,
            Self::ReviewComment(_) => EventKind::ReviewComment,
        }
    }

    /// Returns the logins to resolve, in the positional order the composers
    /// rely on: position 0 is the primary actor, position 1 the secondary
    /// actor for the variants that have one.
    pub fn logins(&self) -> Vec<Login> {
        match self {
            Self::PullRequest(e) => vec![e.author.clone()],
            Self::ReviewRequested(e) => vec![e.requested.clone(), e.requester.clone()],
            Self::Issue(e) => vec![e.author.clone()],
            Self::IssueComment(e) | Self::PullRequestComment(e) => {
                vec![e.commenter.clone(), e.author.clone()]
            }
            Self::Review(e) => vec![e.reviewer.clone(), e.author.clone()],
            Self::ReviewComment(e) => vec![e.commenter.clone(), e.author.clone()],
        }
    }
}
