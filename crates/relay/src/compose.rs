//! Per-variant message composition.
//!
//! One pure template per [`MentionEvent`] variant: the same record and the
//! same resolved actors always compose byte-identical output — no timestamps,
//! no nonces. Wording follows the notification style users already know from
//! the templates' history; the structural segments (mentions, links, images)
//! are left to the delivery renderer.

use crate::errors::RelayError;
use crate::event::{
    CommentActivity, IssueActivity, MentionEvent, PullRequestActivity, ReviewActivity,
    ReviewCommentActivity, ReviewRequest,
};
use crate::extract::body_or_placeholder;
use crate::identifiers::{Login, RepositoryId, RunId, SlackUserId};
use crate::message::NotificationMessage;
use crate::resolve::ResolvedActors;

/// Link label used for the error notification's "current run" reference.
const JOB_TITLE: &str = "mention-relay action";

/// Composes the notification for a classified event.
pub fn compose(event: &MentionEvent, actors: &ResolvedActors) -> NotificationMessage {
    match event {
        MentionEvent::PullRequest(e) => compose_pull_request(e, actors),
        MentionEvent::ReviewRequested(e) => compose_review_request(e, actors),
        MentionEvent::Issue(e) => compose_issue(e, actors),
        MentionEvent::IssueComment(e) => compose_comment(e, actors, "issue"),
        MentionEvent::PullRequestComment(e) => compose_comment(e, actors, "pull request"),
        MentionEvent::Review(e) => compose_review(e, actors),
        MentionEvent::ReviewComment(e) => compose_review_comment(e, actors),
    }
}

// ---------------------------------------------------------------------------
// Variant templates
// ---------------------------------------------------------------------------

fn compose_pull_request(
    e: &PullRequestActivity,
    actors: &ResolvedActors,
) -> NotificationMessage {
    let author = actor_or_login(actors, 0, &e.author);
    let message = NotificationMessage::new()
        .mention(author)
        .text(format!(" has *{}* pull request ", e.action))
        .link(&e.url, format!("#{} {}", e.number, e.title))
        .text(".");
    with_avatar(message, e.avatar_url.as_deref(), &e.author)
}

fn compose_review_request(e: &ReviewRequest, actors: &ResolvedActors) -> NotificationMessage {
    let requested = actor_or_login(actors, 0, &e.requested);
    let requester = actor_or_login(actors, 1, &e.requester);
    NotificationMessage::new()
        .mention(requested)
        .text(" has been requested to review ")
        .link(&e.url, format!("#{} {}", e.number, e.title))
        .text(" by ")
        .mention(requester)
        .text(".")
}

fn compose_issue(e: &IssueActivity, actors: &ResolvedActors) -> NotificationMessage {
    let author = actor_or_login(actors, 0, &e.author);
    let message = NotificationMessage::new()
        .mention(author)
        .text(format!(" has *{}* an issue ", e.action))
        .link(&e.url, format!("#{} {}", e.number, e.title));

    // Only a freshly-opened issue shows its body; later activity is headline
    // only.
    let message = if e.action == "opened" {
        message
            .text(":")
            .line_break()
            .text(body_or_placeholder(e.body.as_deref()))
    } else {
        message.text(".")
    };
    with_avatar(message, e.avatar_url.as_deref(), &e.author)
}

fn compose_comment(
    e: &CommentActivity,
    actors: &ResolvedActors,
    subject: &str,
) -> NotificationMessage {
    let commenter = actor_or_login(actors, 0, &e.commenter);
    let author = actor_or_login(actors, 1, &e.author);
    NotificationMessage::new()
        .mention(commenter)
        .text(format!(
            " has *{}* a comment on {} ",
            e.action,
            subject_phrase(e.state.as_deref(), subject)
        ))
        .mention(author)
        .text(format!(" *#{} {}*:", e.number, e.title))
        .line_break()
        .text(&e.quoted_body)
        .line_break()
        .bare_link(&e.comment_url)
}

fn compose_review(e: &ReviewActivity, actors: &ResolvedActors) -> NotificationMessage {
    let reviewer = actor_or_login(actors, 0, &e.reviewer);
    let author = actor_or_login(actors, 1, &e.author);
    let label = subject_label(e.number.map(|n| n.as_u64()), &e.title);

    // The approved verdict gets its own short template with no body; every
    // other verdict uses the generic template and must show the body.
    if e.verdict == "approved" {
        let message = NotificationMessage::new()
            .mention(reviewer)
            .text(" has *approved* pull request ")
            .link(&e.url, label)
            .text(", created by ")
            .mention(author)
            .text(".");
        return with_trailing_link(message, e.review_url.as_deref());
    }

    let message = NotificationMessage::new()
        .mention(reviewer)
        .text(format!(
            " has *{}* a review on {} ",
            e.action,
            subject_phrase(e.pr_state.as_deref(), "pull request")
        ))
        .link(&e.url, label)
        .text(", created by ")
        .mention(author)
        .text(".")
        .line_break()
        .text(body_or_placeholder(e.body.as_deref()));
    with_trailing_link(message, e.review_url.as_deref())
}

fn compose_review_comment(
    e: &ReviewCommentActivity,
    actors: &ResolvedActors,
) -> NotificationMessage {
    let commenter = actor_or_login(actors, 0, &e.commenter);
    let author = actor_or_login(actors, 1, &e.author);
    let mut message = NotificationMessage::new()
        .mention(commenter)
        .text(format!(
            " has *{}* a review comment on {} ",
            e.action,
            subject_phrase(e.pr_state.as_deref(), "pull request")
        ))
        .link(&e.url, subject_label(e.number.map(|n| n.as_u64()), &e.title))
        .text(", created by ")
        .mention(author)
        .text(".")
        .line_break();

    if let Some(hunk) = &e.diff_hunk {
        let block = match &e.path {
            Some(path) => format!("```{path}\n{hunk}```"),
            None => format!("```\n{hunk}```"),
        };
        message = message.text(block).line_break();
    } else if let Some(path) = &e.path {
        message = message.text(format!("`{path}`")).line_break();
    }

    message
        .text(&e.body)
        .line_break()
        .bare_link(&e.comment_url)
}

// ---------------------------------------------------------------------------
// Error path
// ---------------------------------------------------------------------------

/// Composes the error notification. Never fails — this is the template of
/// last resort on the reporting path.
pub fn compose_error(error: &RelayError, run_url: Option<&str>) -> NotificationMessage {
    let message = NotificationMessage::new().text("❗ An internal error occurred in ");
    let message = match run_url {
        Some(url) => message.link(url, JOB_TITLE),
        None => message.text(JOB_TITLE),
    };
    message
        .line_break()
        .text(format!("```\n{error}\n```"))
}

/// Builds the "current run" URL shown in error notifications.
pub fn run_url(repository: &RepositoryId, run_id: &RunId) -> String {
    format!(
        "https://github.com/{}/{}/actions/runs/{}",
        repository.owner(),
        repository.name(),
        run_id
    )
}

// ---------------------------------------------------------------------------
// Template helpers
// ---------------------------------------------------------------------------

/// Positional actor lookup honouring the resolver's 1:1 alignment contract.
/// An out-of-range position can only be reached by a caller that skipped
/// `resolve`; the verbatim policy makes the login itself the right substitute.
fn actor_or_login(actors: &ResolvedActors, position: usize, login: &Login) -> SlackUserId {
    actors
        .get(position)
        .cloned()
        .unwrap_or_else(|| SlackUserId::from_login(login))
}

/// `"a *open* issue"` when the state is known, `"an issue"` / `"a pull
/// request"` otherwise.
fn subject_phrase(state: Option<&str>, subject: &str) -> String {
    match state {
        Some(state) => format!("a *{state}* {subject}"),
        None if subject == "issue" => "an issue".to_string(),
        None => format!("a {subject}"),
    }
}

/// `"#12 Fix bug"` when the subject number is known, the bare title otherwise.
fn subject_label(number: Option<u64>, title: &str) -> String {
    match number {
        Some(number) => format!("#{number} {title}"),
        None => title.to_string(),
    }
}

fn with_avatar(
    message: NotificationMessage,
    avatar_url: Option<&str>,
    author: &Login,
) -> NotificationMessage {
    match avatar_url {
        Some(url) => message.line_break().image(url, author.as_str()),
        None => message,
    }
}

fn with_trailing_link(
    message: NotificationMessage,
    url: Option<&str>,
) -> NotificationMessage {
    match url {
        Some(url) => message.line_break().bare_link(url),
        None => message,
    }
}
