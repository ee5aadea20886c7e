//! Action inputs and runner environment.
//!
//! Inputs arrive as `INPUT_*` environment variables using the Actions naming
//! convention: the input `slack-webhook-url` becomes `INPUT_SLACK-WEBHOOK-URL`
//! (uppercased, dashes kept). The runner hands unset optional inputs through
//! as empty strings, so empty and absent are treated the same everywhere.
//!
//! Parsing is written against an injected name → value lookup so tests never
//! touch the process environment.

use std::path::{Path, PathBuf};

use relay::{CommitSha, RelayError, RepositoryId, RunId};

/// The action's configuration surface.
#[derive(Debug, Clone)]
pub struct Inputs {
    /// Destination incoming-webhook URL.
    pub slack_webhook_url: String,
    /// Token used to read the mapping file from the repository.
    pub repo_token: String,
    /// Repository path of the mapping file (e.g. `.github/mentions.toml`).
    pub configuration_path: String,
    /// Bot display-name override.
    pub bot_name: Option<String>,
    /// Bot icon override.
    pub icon_url: Option<String>,
    /// Run identifier for the error-message link; falls back to
    /// `GITHUB_RUN_ID`.
    pub run_id: Option<RunId>,
    /// Raises the log verbosity to debug.
    pub debug: bool,
}

impl Inputs {
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, RelayError> {
        let slack_webhook_url = required_input(&lookup, "slack-webhook-url")?;
        let repo_token = required_input(&lookup, "repo-token")?;
        let configuration_path = required_input(&lookup, "configuration-path")?;
        let bot_name = optional_input(&lookup, "bot-name");
        let icon_url = optional_input(&lookup, "icon-url");

        let run_id = optional_input(&lookup, "run-id")
            .or_else(|| lookup("GITHUB_RUN_ID").filter(|value| !value.is_empty()))
            .and_then(RunId::new);

        let debug = match optional_input(&lookup, "debug-flag").as_deref() {
            None => false,
            Some("true") => true,
            Some("false") => false,
            Some(other) => {
                return Err(invalid(format!(
                    "debug-flag must be \"true\" or \"false\", got \"{other}\""
                )));
            }
        };

        Ok(Self {
            slack_webhook_url,
            repo_token,
            configuration_path,
            bot_name,
            icon_url,
            run_id,
            debug,
        })
    }
}

/// What the runner tells us about the triggering event.
#[derive(Debug, Clone)]
pub struct RunnerContext {
    pub repository: RepositoryId,
    pub sha: CommitSha,
    pub event_name: String,
    pub event_path: PathBuf,
}

impl RunnerContext {
    pub fn from_env() -> Result<Self, RelayError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, RelayError> {
        let repository = required_var(&lookup, "GITHUB_REPOSITORY")?;
        let repository = RepositoryId::parse(&repository).ok_or_else(|| {
            invalid(format!(
                "GITHUB_REPOSITORY is not in owner/repo form: \"{repository}\""
            ))
        })?;

        let sha = required_var(&lookup, "GITHUB_SHA").and_then(|value| {
            CommitSha::new(value).ok_or_else(|| invalid("GITHUB_SHA is empty".to_string()))
        })?;

        Ok(Self {
            repository,
            sha,
            event_name: required_var(&lookup, "GITHUB_EVENT_NAME")?,
            event_path: PathBuf::from(required_var(&lookup, "GITHUB_EVENT_PATH")?),
        })
    }
}

/// Reads and parses the webhook payload file the runner points us at.
pub fn read_event_payload(path: &Path) -> Result<serde_json::Value, RelayError> {
    let contents = std::fs::read_to_string(path).map_err(|error| {
        invalid(format!(
            "failed to read the event payload at {}: {error}",
            path.display()
        ))
    })?;
    serde_json::from_str(&contents).map_err(|error| {
        invalid(format!(
            "the event payload at {} is not valid JSON: {error}",
            path.display()
        ))
    })
}

// ---------------------------------------------------------------------------

fn input_name(name: &str) -> String {
    format!("INPUT_{}", name.to_ascii_uppercase())
}

fn required_input(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, RelayError> {
    lookup(&input_name(name))
        .filter(|value| !value.is_empty())
        .ok_or_else(|| invalid(format!("required input '{name}' is not set")))
}

fn optional_input(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(&input_name(name)).filter(|value| !value.is_empty())
}

fn required_var(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<String, RelayError> {
    lookup(name)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| invalid(format!("{name} is not set")))
}

fn invalid(message: String) -> RelayError {
    RelayError::InvalidConfiguration { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn complete_inputs() -> Vec<(&'static str, &'static str)> {
        vec![
            ("INPUT_SLACK-WEBHOOK-URL", "https://hooks.slack.invalid/x"),
            ("INPUT_REPO-TOKEN", "ghs_token"),
            ("INPUT_CONFIGURATION-PATH", ".github/mentions.toml"),
        ]
    }

    #[test]
    fn parses_the_minimal_required_set() {
        let inputs = Inputs::from_lookup(env(&complete_inputs())).unwrap();
        assert_eq!(inputs.slack_webhook_url, "https://hooks.slack.invalid/x");
        assert_eq!(inputs.configuration_path, ".github/mentions.toml");
        assert_eq!(inputs.bot_name, None);
        assert_eq!(inputs.run_id, None);
        assert!(!inputs.debug);
    }

    #[test]
    fn missing_required_input_is_a_configuration_error() {
        let mut pairs = complete_inputs();
        pairs.retain(|(name, _)| *name != "INPUT_REPO-TOKEN");
        let err = Inputs::from_lookup(env(&pairs)).unwrap_err();
        match err {
            RelayError::InvalidConfiguration { message } => {
                assert!(message.contains("repo-token"));
            }
            other => panic!("expected InvalidConfiguration, got {other:?}"),
        }
    }

    #[test]
    fn empty_required_input_counts_as_missing() {
        let err = Inputs::from_lookup(env(&[
            ("INPUT_SLACK-WEBHOOK-URL", ""),
            ("INPUT_REPO-TOKEN", "t"),
            ("INPUT_CONFIGURATION-PATH", "p"),
        ]))
        .unwrap_err();
        assert!(matches!(err, RelayError::InvalidConfiguration { .. }));
    }

    #[test]
    fn run_id_falls_back_to_the_runner_variable() {
        let mut pairs = complete_inputs();
        pairs.push(("GITHUB_RUN_ID", "4242"));
        let inputs = Inputs::from_lookup(env(&pairs)).unwrap();
        assert_eq!(inputs.run_id.unwrap().as_str(), "4242");
    }

    #[test]
    fn explicit_run_id_input_wins_over_the_runner_variable() {
        let mut pairs = complete_inputs();
        pairs.push(("INPUT_RUN-ID", "1111"));
        pairs.push(("GITHUB_RUN_ID", "4242"));
        let inputs = Inputs::from_lookup(env(&pairs)).unwrap();
        assert_eq!(inputs.run_id.unwrap().as_str(), "1111");
    }

    #[test]
    fn debug_flag_accepts_only_true_and_false() {
        let mut pairs = complete_inputs();
        pairs.push(("INPUT_DEBUG-FLAG", "true"));
        assert!(Inputs::from_lookup(env(&pairs)).unwrap().debug);

        let mut pairs = complete_inputs();
        pairs.push(("INPUT_DEBUG-FLAG", "yes"));
        let err = Inputs::from_lookup(env(&pairs)).unwrap_err();
        assert!(matches!(err, RelayError::InvalidConfiguration { .. }));
    }

    #[test]
    fn runner_context_parses_the_repository() {
        let context = RunnerContext::from_lookup(env(&[
            ("GITHUB_REPOSITORY", "octocat/hello-world"),
            ("GITHUB_SHA", "abc123"),
            ("GITHUB_EVENT_NAME", "pull_request"),
            ("GITHUB_EVENT_PATH", "/tmp/event.json"),
        ]))
        .unwrap();
        assert_eq!(context.repository.owner(), "octocat");
        assert_eq!(context.event_name, "pull_request");
    }

    #[test]
    fn runner_context_rejects_malformed_repository_coordinates() {
        let err = RunnerContext::from_lookup(env(&[
            ("GITHUB_REPOSITORY", "not-a-repo"),
            ("GITHUB_SHA", "abc123"),
            ("GITHUB_EVENT_NAME", "issues"),
            ("GITHUB_EVENT_PATH", "/tmp/event.json"),
        ]))
        .unwrap_err();
        assert!(matches!(err, RelayError::InvalidConfiguration { .. }));
    }

    #[test]
    fn reads_the_event_payload_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"action": "opened"}}"#).unwrap();
        let payload = read_event_payload(file.path()).unwrap();
        assert_eq!(payload["action"], "opened");
    }

    #[test]
    fn malformed_payload_files_are_configuration_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            read_event_payload(file.path()),
            Err(RelayError::InvalidConfiguration { .. })
        ));

        assert!(matches!(
            read_event_payload(Path::new("/nonexistent/event.json")),
            Err(RelayError::InvalidConfiguration { .. })
        ));
    }
}
