//! Mention-relay GitHub infrastructure adapter.
//!
//! Implements the [`relay::MappingSource`] port: the identity-mapping file is
//! fetched through the repository contents API using the `vnd.github.raw`
//! media type (the API serves the file body directly, so there is no base64
//! round-trip) and parsed as a TOML table of `login = "member-id"` pairs.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. All GitHub
//! API details — authentication, media types, status handling, timeouts —
//! live here; the [`relay`] crate sees only [`relay::MappingSource`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use thiserror::Error;
use tracing::debug;

use relay::{CommitSha, IdentityMapping, MappingSource, RelayError, RepositoryId};

const API_BASE_URL: &str = "https://api.github.com";

/// Asks the contents API for the raw file body instead of the JSON+base64
/// envelope.
const RAW_CONTENT_MEDIA_TYPE: &str = "application/vnd.github.raw+json";

const USER_AGENT: &str = concat!("mention-relay/", env!("CARGO_PKG_VERSION"));

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures while fetching or parsing the mapping file.
///
/// All of these propagate into [`RelayError::MappingLoadFailure`] at the port
/// boundary; the distinction matters only for the logged detail.
#[derive(Debug, Error)]
pub enum GithubError {
    /// The mapping file does not exist at the requested path/ref.
    #[error("mapping file not found (HTTP 404)")]
    NotFound,

    /// The contents API answered with a non-success status other than 404.
    #[error("contents API returned HTTP {status}")]
    Status { status: StatusCode },

    /// The request never produced a usable response.
    #[error("contents API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The file body is not a flat TOML table of string pairs.
    #[error("mapping file is not a valid login table: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A minimal contents-API client, authenticated with the workflow's repo
/// token.
pub struct GithubContents {
    client: Client,
    token: String,
}

impl GithubContents {
    pub fn new(token: impl Into<String>) -> Result<Self, GithubError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            token: token.into(),
        })
    }

    /// Fetches the raw body of `path` in `repository` at `sha`.
    pub async fn fetch_raw(
        &self,
        repository: &RepositoryId,
        path: &str,
        sha: &CommitSha,
    ) -> Result<String, GithubError> {
        let url = contents_url(repository, path);
        debug!(%url, mapping_ref = %sha, "fetching mapping file");

        let response = self
            .client
            .get(&url)
            .query(&[("ref", sha.as_str())])
            .header(header::ACCEPT, RAW_CONTENT_MEDIA_TYPE)
            .bearer_auth(&self.token)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(GithubError::NotFound),
            status if !status.is_success() => Err(GithubError::Status { status }),
            _ => Ok(response.text().await?),
        }
    }

    /// Fetches and parses the identity mapping in one step.
    pub async fn load_mapping(
        &self,
        repository: &RepositoryId,
        path: &str,
        sha: &CommitSha,
    ) -> Result<IdentityMapping, GithubError> {
        let contents = self.fetch_raw(repository, path, sha).await?;
        let mapping = parse_mapping(&contents)?;
        debug!(entries = mapping.len(), "loaded identity mapping");
        Ok(mapping)
    }
}

/// Parses the mapping file: a flat TOML table of `login = "member-id"` pairs.
pub fn parse_mapping(contents: &str) -> Result<IdentityMapping, toml::de::Error> {
    toml::from_str(contents)
}

fn contents_url(repository: &RepositoryId, path: &str) -> String {
    format!(
        "{API_BASE_URL}/repos/{}/{}/contents/{}",
        repository.owner(),
        repository.name(),
        path
    )
}

/// The mapping file at fixed coordinates, as handed to the relay pipeline.
pub struct MappingFile {
    contents: GithubContents,
    repository: RepositoryId,
    path: String,
    sha: CommitSha,
}

impl MappingFile {
    pub fn new(
        contents: GithubContents,
        repository: RepositoryId,
        path: impl Into<String>,
        sha: CommitSha,
    ) -> Self {
        Self {
            contents,
            repository,
            path: path.into(),
            sha,
        }
    }
}

#[async_trait]
impl MappingSource for MappingFile {
    async fn load_mapping(&self) -> Result<IdentityMapping, RelayError> {
        self.contents
            .load_mapping(&self.repository, &self.path, &self.sha)
            .await
            .map_err(|error| RelayError::MappingLoadFailure {
                path: self.path.clone(),
                detail: error.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_flat_login_table() {
        let mapping = parse_mapping(
            r#"
            alice = "U024BE7LH"
            bob = "U024BE7LI"
            "#,
        )
        .unwrap();
        assert_eq!(mapping.len(), 2);
        let alice = relay::Login::new("alice").unwrap();
        assert_eq!(mapping.get(&alice), Some("U024BE7LH"));
    }

    #[test]
    fn rejects_non_string_values() {
        assert!(parse_mapping("alice = 42").is_err());
        assert!(parse_mapping("[alice]\nid = \"U1\"").is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = parse_mapping("alice = ").unwrap_err();
        // The parse detail ends up in the error notification; it must say
        // something useful.
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn contents_url_targets_the_repository_path() {
        let repo = RepositoryId::parse("octocat/hello-world").unwrap();
        assert_eq!(
            contents_url(&repo, ".github/mentions.toml"),
            "https://api.github.com/repos/octocat/hello-world/contents/.github/mentions.toml"
        );
    }

    #[test]
    fn github_errors_read_well_in_notifications() {
        assert_eq!(
            GithubError::NotFound.to_string(),
            "mapping file not found (HTTP 404)"
        );
        let status = GithubError::Status {
            status: StatusCode::FORBIDDEN,
        };
        assert!(status.to_string().contains("403"));
    }
}
