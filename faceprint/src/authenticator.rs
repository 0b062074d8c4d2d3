use std::sync::Arc;

use tracing::info;

use crate::decider::MatchDecider;
use crate::embedding::{IdentityId, MatchResult};
use crate::error::FaceprintError;

/// Resolves a face embedding to the enrolled identity it belongs to.
///
/// Establishing a session for the returned identity is the caller's job.
pub struct Authenticator {
    decider: Arc<MatchDecider>,
}

impl Authenticator {
    pub fn new(decider: Arc<MatchDecider>) -> Self {
        Self { decider }
    }

    /// Returns the identity whose enrolled face is closest to `vector`, if
    /// it is within threshold. Otherwise fails with
    /// [`FaceprintError::NotRecognized`] carrying the closest distance seen.
    pub fn authenticate(&self, vector: &[f32]) -> Result<IdentityId, FaceprintError> {
        match self.decider.find_best_match(vector)? {
            MatchResult::Match { identity, distance } => {
                info!(identity = %identity, distance, "faceprint: authenticated");
                Ok(identity)
            }
            MatchResult::NoMatch { closest } => {
                info!(
                    closest,
                    threshold = self.decider.threshold(),
                    "faceprint: face not recognized"
                );
                Err(FaceprintError::NotRecognized { closest })
            }
        }
    }
}
