//! The Notifier and the single-invocation pipeline.
//!
//! [`run_once`] is the only place errors are caught: classification,
//! extraction, and mapping failures are converted into a best-effort error
//! notification sent through the same [`Notifier`] as the normal path. A
//! Notifier whose transport is itself broken therefore cannot report its own
//! failure — that is an accepted limitation of the design, kept explicit here
//! rather than papered over with a second delivery channel.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::compose::{compose, compose_error};
use crate::errors::RelayError;
use crate::extract::extract;
use crate::message::NotificationMessage;
use crate::ports::{MappingSource, MessageDelivery};
use crate::resolve::resolve;
use crate::router::classify;

/// Owns the single outbound send and the error-reporting fallback.
pub struct Notifier<D> {
    delivery: D,
}

impl<D: MessageDelivery> Notifier<D> {
    pub fn new(delivery: D) -> Self {
        Self { delivery }
    }

    /// Makes exactly one delivery attempt. No retry, no backoff.
    pub async fn send(&self, message: &NotificationMessage) -> Result<(), RelayError> {
        self.delivery.deliver(message).await
    }

    /// Best-effort error report through the same delivery channel.
    ///
    /// A delivery failure here is terminal and only logged; recovering it
    /// would mean asking a broken notifier to report that it is broken.
    pub async fn report_error(&self, error: &RelayError, run_url: Option<&str>) {
        let message = compose_error(error, run_url);
        if let Err(send_error) = self.delivery.deliver(&message).await {
            warn!(error = %send_error, "failed to deliver the error notification");
        }
    }
}

/// Runs one complete relay invocation: classify → extract → resolve →
/// compose → send.
///
/// On any failure before the send, the raw inbound payload is written to the
/// diagnostic log and a best-effort error notification is attempted; the
/// original error is returned either way so the process exits with a failure
/// indication. A failure of the *primary* send is terminal and not
/// re-reported.
pub async fn run_once<M, D>(
    event_name: &str,
    payload: &Value,
    mapping_source: &M,
    notifier: &Notifier<D>,
    run_url: Option<&str>,
) -> Result<(), RelayError>
where
    M: MappingSource + ?Sized,
    D: MessageDelivery,
{
    match process(event_name, payload, mapping_source, notifier).await {
        Ok(()) => {
            info!(event_name, "notification delivered");
            Ok(())
        }
        Err(error) => {
            warn!(event_name, error = %error, "relay invocation failed");
            // The raw event is always surfaced for debugging, whether or not
            // the error notification below makes it out.
            debug!(payload = %payload, "raw inbound event payload");

            if error.is_reportable() {
                notifier.report_error(&error, run_url).await;
            }
            Err(error)
        }
    }
}

async fn process<M, D>(
    event_name: &str,
    payload: &Value,
    mapping_source: &M,
    notifier: &Notifier<D>,
) -> Result<(), RelayError>
where
    M: MappingSource + ?Sized,
    D: MessageDelivery,
{
    let kind = classify(event_name, payload)?;
    let event = extract(kind, payload)?;

    let mapping = mapping_source.load_mapping().await?;
    let logins = event.logins();
    let actors = resolve(&logins, &mapping);
    debug!(
        requested = logins.len(),
        mapped = mapping.len(),
        "resolved actors for the notification"
    );

    let message = compose(&event, &actors);
    notifier.send(&message).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;

    use crate::message::MessageSegment;
    use crate::resolve::IdentityMapping;

    #[derive(Clone)]
    struct RecordingDelivery {
        sent: Arc<Mutex<Vec<NotificationMessage>>>,
        fail: bool,
    }

    impl RecordingDelivery {
        fn new() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                fail: true,
            }
        }

        fn sent(&self) -> Vec<NotificationMessage> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageDelivery for RecordingDelivery {
        async fn deliver(&self, message: &NotificationMessage) -> Result<(), RelayError> {
            self.sent.lock().unwrap().push(message.clone());
            if self.fail {
                return Err(RelayError::DeliveryError {
                    detail: "connection refused".into(),
                });
            }
            Ok(())
        }
    }

    struct FixedMapping(IdentityMapping);

    #[async_trait]
    impl MappingSource for FixedMapping {
        async fn load_mapping(&self) -> Result<IdentityMapping, RelayError> {
            Ok(self.0.clone())
        }
    }

    struct FailingMapping;

    #[async_trait]
    impl MappingSource for FailingMapping {
        async fn load_mapping(&self) -> Result<IdentityMapping, RelayError> {
            Err(RelayError::MappingLoadFailure {
                path: ".github/mentions.toml".into(),
                detail: "not found".into(),
            })
        }
    }

    fn mapping(pairs: &[(&str, &str)]) -> FixedMapping {
        FixedMapping(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    fn mentions(message: &NotificationMessage) -> Vec<String> {
        message
            .segments()
            .iter()
            .filter_map(|s| match s {
                MessageSegment::Mention(id) => Some(id.as_str().to_string()),
                _ => None,
            })
            .collect()
    }

    fn text_of(message: &NotificationMessage) -> String {
        message
            .segments()
            .iter()
            .filter_map(|s| match s {
                MessageSegment::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn approved_review_flows_end_to_end() {
        let payload = json!({
            "action": "submitted",
            "review": {"state": "approved", "user": {"login": "alice"}},
            "pull_request": {
                "user": {"login": "bob"},
                "title": "Fix bug",
                "html_url": "https://x/1",
            },
        });
        let delivery = RecordingDelivery::new();
        let notifier = Notifier::new(delivery.clone());
        let source = mapping(&[("alice", "U1"), ("bob", "U2")]);

        run_once("pull_request_review", &payload, &source, &notifier, None)
            .await
            .unwrap();

        let sent = delivery.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(mentions(&sent[0]), vec!["U1", "U2"]);
        assert!(text_of(&sent[0]).contains("has *approved* pull request"));
    }

    #[tokio::test]
    async fn unclassified_event_sends_exactly_one_error_notification() {
        let payload = json!({"action": "created"});
        let delivery = RecordingDelivery::new();
        let notifier = Notifier::new(delivery.clone());
        let source = mapping(&[]);

        let err = run_once("deployment", &payload, &source, &notifier, None)
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::UnclassifiedEvent { .. }));
        let sent = delivery.sent();
        assert_eq!(sent.len(), 1);
        assert!(text_of(&sent[0]).contains("deployment"));
        assert!(text_of(&sent[0]).contains("An internal error occurred"));
    }

    #[tokio::test]
    async fn extraction_failure_reports_the_missing_field() {
        // A pull_request event with no pull_request object at all.
        let payload = json!({"action": "opened"});
        let delivery = RecordingDelivery::new();
        let notifier = Notifier::new(delivery.clone());
        let source = mapping(&[]);

        let err = run_once("pull_request", &payload, &source, &notifier, None)
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::MissingField { .. }));
        let sent = delivery.sent();
        assert_eq!(sent.len(), 1);
        assert!(text_of(&sent[0]).contains("can not find"));
    }

    #[tokio::test]
    async fn mapping_failure_is_reported_with_the_run_link() {
        let payload = json!({
            "action": "opened",
            "pull_request": {
                "number": 1,
                "title": "t",
                "html_url": "u",
                "user": {"login": "alice"},
            },
        });
        let delivery = RecordingDelivery::new();
        let notifier = Notifier::new(delivery.clone());

        let err = run_once(
            "pull_request",
            &payload,
            &FailingMapping,
            &notifier,
            Some("https://github.com/o/r/actions/runs/9"),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RelayError::MappingLoadFailure { .. }));
        let sent = delivery.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].segments().iter().any(|s| matches!(
            s,
            MessageSegment::Link { url, .. } if url == "https://github.com/o/r/actions/runs/9"
        )));
    }

    #[tokio::test]
    async fn primary_delivery_failure_is_terminal_and_not_re_reported() {
        let payload = json!({
            "action": "opened",
            "pull_request": {
                "number": 1,
                "title": "t",
                "html_url": "u",
                "user": {"login": "alice"},
            },
        });
        let delivery = RecordingDelivery::failing();
        let notifier = Notifier::new(delivery.clone());
        let source = mapping(&[("alice", "U1")]);

        let err = run_once("pull_request", &payload, &source, &notifier, None)
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::DeliveryError { .. }));
        // One attempt only: the failed primary send must not trigger an error
        // notification through the same broken channel.
        assert_eq!(delivery.sent().len(), 1);
    }

    #[tokio::test]
    async fn error_report_failure_keeps_the_original_error() {
        let payload = json!({"action": "created"});
        let delivery = RecordingDelivery::failing();
        let notifier = Notifier::new(delivery.clone());
        let source = mapping(&[]);

        let err = run_once("deployment", &payload, &source, &notifier, None)
            .await
            .unwrap_err();

        // The classification failure wins; the failed error send is only
        // logged.
        assert!(matches!(err, RelayError::UnclassifiedEvent { .. }));
        assert_eq!(delivery.sent().len(), 1);
    }
}
