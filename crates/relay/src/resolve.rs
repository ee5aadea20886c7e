//! GitHub login → Slack identity resolution.
//!
//! The mapping is materialised wholesale by the loader before resolution
//! starts; this module is pure and performs no I/O.
//!
//! ## Fallback policy
//!
//! A login with no mapping entry is substituted **verbatim** into the output.
//! This is a fixed contract, not an emergent behaviour: it guarantees the
//! output is always positionally aligned 1:1 with the requested logins, which
//! every composer relies on when it picks the primary and secondary actor.
//! The alternative — dropping unmapped actors and shortening the result — is
//! rejected; it would force every template to cope with missing positions.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::identifiers::{Login, SlackUserId};

/// The login → Slack-identity table, fetched per invocation and never mutated.
///
/// Keys are case-sensitive GitHub logins exactly as they appear in webhook
/// payloads. Deserialises directly from the mapping file's table of
/// `login = "member-id"` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityMapping {
    entries: HashMap<String, String>,
}

impl IdentityMapping {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Looks up the Slack identity mapped to `login`, if any.
    pub fn get(&self, login: &Login) -> Option<&str> {
        self.entries.get(login.as_str()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for IdentityMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// The resolved identities, positionally aligned with the requested logins:
/// position 0 is the primary actor, position 1 the secondary actor when the
/// variant has one. Length always equals the request length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedActors {
    identities: Vec<SlackUserId>,
}

impl ResolvedActors {
    /// The primary actor, absent only when no logins were requested.
    pub fn primary(&self) -> Option<&SlackUserId> {
        self.identities.first()
    }

    /// The secondary actor, for the variants that carry one.
    pub fn secondary(&self) -> Option<&SlackUserId> {
        self.identities.get(1)
    }

    pub fn get(&self, position: usize) -> Option<&SlackUserId> {
        self.identities.get(position)
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

/// Resolves each login through the mapping, in order.
///
/// Unmapped logins pass through verbatim (see the module docs); the output
/// length always equals `logins.len()` and positions are never reordered.
pub fn resolve(logins: &[Login], mapping: &IdentityMapping) -> ResolvedActors {
    let identities = logins
        .iter()
        .map(|login| match mapping.get(login) {
            Some(id) => SlackUserId::new(id).unwrap_or_else(|| SlackUserId::from_login(login)),
            None => {
                debug!(login = %login, "no mapping entry; substituting the login verbatim");
                SlackUserId::from_login(login)
            }
        })
        .collect();

    ResolvedActors { identities }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn login(value: &str) -> Login {
        Login::new(value).unwrap()
    }

    fn mapping(pairs: &[(&str, &str)]) -> IdentityMapping {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn mapped_logins_resolve_to_slack_ids() {
        let mapping = mapping(&[("alice", "U1"), ("bob", "U2")]);
        let actors = resolve(&[login("alice"), login("bob")], &mapping);
        assert_eq!(actors.primary().unwrap().as_str(), "U1");
        assert_eq!(actors.secondary().unwrap().as_str(), "U2");
    }

    #[test]
    fn unmapped_login_passes_through_verbatim() {
        // The documented fallback policy: length preserved, unmapped entries
        // unchanged, never dropped.
        let mapping = mapping(&[("alice", "U1")]);
        let actors = resolve(&[login("alice"), login("bob")], &mapping);
        assert_eq!(actors.len(), 2);
        assert_eq!(actors.primary().unwrap().as_str(), "U1");
        assert_eq!(actors.secondary().unwrap().as_str(), "bob");
    }

    #[test]
    fn lookups_are_case_sensitive() {
        let mapping = mapping(&[("Alice", "U1")]);
        let actors = resolve(&[login("alice")], &mapping);
        assert_eq!(actors.primary().unwrap().as_str(), "alice");
    }

    #[test]
    fn order_is_preserved_not_reordered() {
        let mapping = mapping(&[("a", "U-A"), ("b", "U-B"), ("c", "U-C")]);
        let actors = resolve(&[login("c"), login("a"), login("b")], &mapping);
        let ids: Vec<&str> = (0..3).map(|i| actors.get(i).unwrap().as_str()).collect();
        assert_eq!(ids, vec!["U-C", "U-A", "U-B"]);
    }

    #[test]
    fn empty_request_resolves_to_empty() {
        let actors = resolve(&[], &IdentityMapping::default());
        assert!(actors.is_empty());
        assert_eq!(actors.primary(), None);
    }
}
