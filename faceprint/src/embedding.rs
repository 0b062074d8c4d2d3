use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle for an enrolled identity, issued by the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(String);

impl IdentityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IdentityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// One enrolled face: the identity and its embedding.
#[derive(Clone, PartialEq)]
pub struct IdentityRecord {
    pub identity: IdentityId,
    pub vector: Vec<f32>,
}

impl fmt::Debug for IdentityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityRecord")
            .field("identity", &self.identity)
            .field("vector_len", &self.vector.len())
            .finish()
    }
}

/// An enrolled identity close to a query, with its cosine distance.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub identity: IdentityId,
    pub distance: f32,
}

/// Outcome of a best-match search.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// Nothing within threshold. `closest` is the smallest distance seen,
    /// or `None` if the repository was empty.
    NoMatch { closest: Option<f32> },

    /// The nearest enrolled identity, strictly within threshold.
    Match { identity: IdentityId, distance: f32 },
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Match { .. })
    }
}
