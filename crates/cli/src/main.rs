//! Mention-relay entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration** — read the action inputs and runner environment
//!    and validate them (see [`config`]).
//! 2. **Wire observability** — configure `tracing-subscriber` with an
//!    env-filter layer writing to stderr. All `tracing` events emitted by
//!    every crate in the workspace flow through this layer; `RUST_LOG`
//!    overrides the defaults, the `debug-flag` input lowers them.
//! 3. **Construct infrastructure** — create the concrete adapters
//!    ([`github::MappingFile`], [`slack::SlackWebhook`]) and inject them into
//!    the relay pipeline.
//! 4. **Run once** — hand the inbound event to [`relay::run_once`] and map
//!    the outcome to the process exit code. One event in, at most one
//!    notification out; there is no loop and no queue.

mod config;

use std::process::ExitCode;

use anyhow::Context as _;
use tracing::error;
use tracing_subscriber::EnvFilter;

use config::{read_event_payload, Inputs, RunnerContext};
use github::{GithubContents, MappingFile};
use slack::{DisplayOverrides, SlackWebhook};

#[tokio::main]
async fn main() -> ExitCode {
    let inputs = match Inputs::from_env() {
        Ok(inputs) => inputs,
        Err(error) => {
            // Tracing is not wired yet; this still has to reach the runner log.
            eprintln!("mention-relay: {error}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(inputs.debug);

    match run(inputs).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("mention-relay run failed: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(inputs: Inputs) -> anyhow::Result<()> {
    let context = RunnerContext::from_env()?;
    let payload = read_event_payload(&context.event_path)?;

    let contents =
        GithubContents::new(&inputs.repo_token).context("constructing the GitHub client")?;
    let mapping_source = MappingFile::new(
        contents,
        context.repository.clone(),
        &inputs.configuration_path,
        context.sha.clone(),
    );

    let delivery = SlackWebhook::new(
        &inputs.slack_webhook_url,
        DisplayOverrides {
            username: inputs.bot_name.clone(),
            icon_url: inputs.icon_url.clone(),
        },
    )
    .context("constructing the Slack client")?;
    let notifier = relay::Notifier::new(delivery);

    let run_url = inputs
        .run_id
        .as_ref()
        .map(|id| relay::run_url(&context.repository, id));

    relay::run_once(
        &context.event_name,
        &payload,
        &mapping_source,
        &notifier,
        run_url.as_deref(),
    )
    .await?;
    Ok(())
}

/// Default filter: warnings everywhere, this workspace at info — or debug when
/// the `debug-flag` input asks for it. An explicit `RUST_LOG` wins outright.
fn init_tracing(debug: bool) {
    let default = if debug {
        "warn,relay=debug,github=debug,slack=debug,cli=debug"
    } else {
        "warn,relay=info,github=info,slack=info,cli=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
