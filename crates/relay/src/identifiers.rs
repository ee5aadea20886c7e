//! Newtype domain identifiers.
//!
//! Every domain concept that has an identity is represented as a distinct newtype
//! wrapping a primitive. This prevents accidentally interchanging — for example —
//! a GitHub [`Login`] with a [`SlackUserId`] even though both are strings under
//! the hood, which matters here because the whole system exists to translate one
//! into the other.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Macro for u64-wrapped newtypes (GitHub-assigned integers).
// Generates: struct (Copy), new(), as_u64(), Display.
// ---------------------------------------------------------------------------
macro_rules! u64_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(u64);

        impl $name {
            /// Creates a new identifier from a raw integer.
            pub fn new(value: u64) -> Self {
                Self(value)
            }

            /// Returns the underlying integer value.
            pub fn as_u64(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers — GitHub-integer-backed
// ---------------------------------------------------------------------------

u64_id! {
    /// The number GitHub assigned to an issue within its repository.
    IssueNumber
}

u64_id! {
    /// The number GitHub assigned to a pull request within its repository.
    ///
    /// Pull requests share the issue number space, but the two are kept as
    /// distinct types so a template can never label one as the other.
    PullRequestNumber
}

// ---------------------------------------------------------------------------
// Identifiers — String-backed
// ---------------------------------------------------------------------------

string_id! {
    /// A GitHub account login, exactly as it appears in the webhook payload.
    ///
    /// Lookups into the identity mapping are case-sensitive; no normalisation
    /// is applied anywhere.
    Login
}

string_id! {
    /// A Slack member identity (e.g. `"U024BE7LH"`), opaque to this system.
    ///
    /// Rendered as an `<@id>` mention by the Slack adapter. Under the verbatim
    /// fallback policy a [`Login`] with no mapping entry is carried through as
    /// a `SlackUserId` unchanged.
    SlackUserId
}

impl SlackUserId {
    /// Substitutes a GitHub login verbatim where no mapping entry exists.
    ///
    /// This is the resolver's documented fallback policy (see
    /// [`crate::resolve`]); the message then mentions a readable name instead
    /// of dropping the actor.
    pub fn from_login(login: &Login) -> Self {
        Self(login.as_str().to_string())
    }
}

string_id! {
    /// A Git commit SHA; the ref at which the mapping file is fetched.
    CommitSha
}

string_id! {
    /// The GitHub Actions run identifier, taken from the runner environment.
    ///
    /// Used only to build the "current run" link shown in error notifications;
    /// kept as a string because it is never interpreted numerically.
    RunId
}

// ---------------------------------------------------------------------------

/// Identifies a GitHub repository in `"owner/repo"` format.
///
/// Parsed from the `GITHUB_REPOSITORY` runner variable. The owner and name
/// halves are needed separately when building run URLs, so this type keeps the
/// split rather than re-parsing at each call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryId {
    owner: String,
    name: String,
}

impl RepositoryId {
    /// Parses `"owner/repo"` coordinates.
    ///
    /// Returns `None` unless the value contains exactly one `/` separating two
    /// non-empty halves.
    pub fn parse(value: &str) -> Option<Self> {
        let (owner, name) = value.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }

    /// Returns the repository owner (user or organisation).
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the repository name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
