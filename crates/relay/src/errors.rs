//! The error taxonomy for a single relay invocation.
//!
//! [`RelayError`] covers every way an invocation can fail. The first three
//! variants (classification, extraction, mapping) are caught once at the top
//! level of [`crate::notify::run_once`] and converted into a best-effort error
//! notification; delivery and configuration failures are terminal and only
//! logged. Adapter crates define their own error enums and convert into
//! `RelayError` at the crate boundary.

use thiserror::Error;

/// Errors that end a relay invocation.
///
/// There is no retry policy anywhere in this system: an invocation either
/// completes its single send or fails, so every variant is terminal for the
/// current run.
#[derive(Debug, Error)]
pub enum RelayError {
    /// No classification rule matched the inbound event.
    ///
    /// Produced by: the event router, after all precedence rules have been
    /// tried. Carries the raw event name and sub-action for the error
    /// notification and the diagnostic log.
    #[error("unexpected event '{event_name}' (action '{action}')")]
    UnclassifiedEvent {
        /// The `GITHUB_EVENT_NAME` value as received.
        event_name: String,
        /// The payload's `action` field, or `""` when absent.
        action: String,
    },

    /// A field required by the classified variant was absent from the payload.
    ///
    /// Produced by: the event extractors. `field` is a human-readable name
    /// ("pull request author login", "comment body"), not a JSON pointer,
    /// because it is shown verbatim in the error notification.
    #[error("can not find {field} in the event payload")]
    MissingField {
        /// Human-readable name of the absent field.
        field: String,
    },

    /// The identity-mapping file could not be fetched or parsed.
    ///
    /// Produced by: the mapping-source adapter, wrapping its own error detail.
    #[error("failed to load identity mapping from '{path}': {detail}")]
    MappingLoadFailure {
        /// Repository path of the mapping file.
        path: String,
        /// Adapter-level failure description (HTTP status, parse error, ...).
        detail: String,
    },

    /// The outbound webhook delivery failed.
    ///
    /// Produced by: the delivery adapter. When this is raised while sending
    /// the *error* notification it is not recovered further — a broken
    /// notifier cannot report its own failure, and that limitation is
    /// accepted rather than papered over.
    #[error("failed to deliver notification: {detail}")]
    DeliveryError {
        /// Transport-level failure description.
        detail: String,
    },

    /// The process configuration or runner environment is invalid.
    ///
    /// Produced at startup, before the webhook URL is known; this is the one
    /// failure that can never be reported to Slack.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        /// Description of the configuration problem.
        message: String,
    },
}

impl RelayError {
    /// Convenience constructor for [`RelayError::MissingField`].
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Returns `true` for failures that should be converted into an error
    /// notification (everything that happened *before* the send).
    pub fn is_reportable(&self) -> bool {
        matches!(
            self,
            Self::UnclassifiedEvent { .. }
                | Self::MissingField { .. }
                | Self::MappingLoadFailure { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_missing_field() {
        let err = RelayError::missing("pull request author login");
        assert_eq!(
            err.to_string(),
            "can not find pull request author login in the event payload"
        );
    }

    #[test]
    fn unclassified_event_carries_both_signals() {
        let err = RelayError::UnclassifiedEvent {
            event_name: "deployment".to_string(),
            action: "created".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("deployment"));
        assert!(text.contains("created"));
    }

    #[test]
    fn only_pre_send_failures_are_reportable() {
        assert!(RelayError::missing("x").is_reportable());
        assert!(RelayError::UnclassifiedEvent {
            event_name: "push".into(),
            action: String::new(),
        }
        .is_reportable());
        assert!(RelayError::MappingLoadFailure {
            path: ".github/mentions.toml".into(),
            detail: "404".into(),
        }
        .is_reportable());
        assert!(!RelayError::DeliveryError {
            detail: "timeout".into(),
        }
        .is_reportable());
        assert!(!RelayError::InvalidConfiguration {
            message: "missing input".into(),
        }
        .is_reportable());
    }
}
