use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{error, info, warn};

use crate::decider::MatchDecider;
use crate::embedding::IdentityId;
use crate::error::FaceprintError;
use crate::identity::{IdentityStore, NewIdentity};
use crate::repository::EmbeddingRepository;

/// Enrolls new identities with their face embedding.
///
/// Registration is all-or-nothing: an identity is never left without its
/// embedding. The identity store and the embedding repository are separate
/// stores, so this is done with a compensating delete rather than a shared
/// transaction.
///
/// Calls to [`Registrar::register`] are serialized by an internal gate, so
/// two near-identical faces registering at the same time cannot both pass
/// the duplicate check. The gate only covers this Registrar; every writer
/// to the same repository must go through one instance.
pub struct Registrar {
    decider: Arc<MatchDecider>,
    repo: Arc<dyn EmbeddingRepository>,
    identities: Arc<dyn IdentityStore>,
    gate: Mutex<()>,
}

impl Registrar {
    pub fn new(
        decider: Arc<MatchDecider>,
        repo: Arc<dyn EmbeddingRepository>,
        identities: Arc<dyn IdentityStore>,
    ) -> Self {
        Self {
            decider,
            repo,
            identities,
            gate: Mutex::new(()),
        }
    }

    /// Registers a new identity with `vector` as its face.
    ///
    /// Fails with [`FaceprintError::DuplicateFace`] if any enrolled face is
    /// within threshold; nothing is created in that case.
    pub fn register(
        &self,
        attrs: &NewIdentity,
        vector: &[f32],
    ) -> Result<IdentityId, FaceprintError> {
        self.decider.validate(vector)?;

        let _guard = self.gate.lock();

        if let Some(dup) = self.decider.find_duplicate(vector)? {
            info!(
                username = %attrs.username,
                matched = %dup.identity,
                distance = dup.distance,
                "faceprint: registration rejected, face already enrolled"
            );
            return Err(FaceprintError::DuplicateFace {
                identity: dup.identity,
                distance: dup.distance,
            });
        }

        let id = self.identities.create_identity(attrs)?;

        if let Err(e) = self.repo.insert(&id, vector) {
            warn!(
                identity = %id,
                error = %e,
                "faceprint: embedding insert failed, rolling back identity"
            );
            if let Err(rollback) = self.identities.delete_identity(&id) {
                error!(
                    identity = %id,
                    error = %rollback,
                    "faceprint: rollback failed, identity left without embedding"
                );
            }
            return Err(e);
        }

        info!(identity = %id, username = %attrs.username, "faceprint: registered");
        Ok(id)
    }
}
