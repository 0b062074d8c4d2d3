use std::sync::Arc;

use faceid_kv::KVStore;

use crate::authenticator::Authenticator;
use crate::config::MatchConfig;
use crate::decider::MatchDecider;
use crate::embedder::{FaceEmbedder, RawEmbedder};
use crate::embedding::IdentityId;
use crate::error::FaceprintError;
use crate::identity::{Account, IdentityStore, KvIdentityStore, NewIdentity};
use crate::registrar::Registrar;
use crate::repository::{EmbeddingRepository, KvRepository};

/// Entry point for callers: registration and login by embedding or by image.
pub struct FaceGate {
    repo: Arc<dyn EmbeddingRepository>,
    identities: Arc<dyn IdentityStore>,
    embedder: Arc<dyn FaceEmbedder>,
    decider: Arc<MatchDecider>,
    registrar: Registrar,
    authenticator: Authenticator,
}

impl FaceGate {
    /// Creates a gate over explicit collaborators. Panics if the embedder's
    /// dimension differs from `cfg.dim`.
    pub fn new(
        cfg: MatchConfig,
        repo: Arc<dyn EmbeddingRepository>,
        identities: Arc<dyn IdentityStore>,
        embedder: Arc<dyn FaceEmbedder>,
    ) -> Self {
        let decider = Arc::new(MatchDecider::new(cfg, repo.clone()));
        assert_eq!(
            embedder.dimension(),
            decider.config().dim,
            "faceprint: embedder dimension must equal MatchConfig.dim"
        );
        Self {
            registrar: Registrar::new(decider.clone(), repo.clone(), identities.clone()),
            authenticator: Authenticator::new(decider.clone()),
            repo,
            identities,
            embedder,
            decider,
        }
    }

    /// Creates a gate that keeps accounts and embeddings in one KV store
    /// under `key_prefix`, reading pre-extracted embeddings as images.
    pub fn with_kv(
        cfg: MatchConfig,
        kv: Arc<dyn KVStore>,
        key_prefix: &str,
        page_size: usize,
    ) -> Self {
        let cfg = cfg.with_defaults();
        let repo = Arc::new(
            KvRepository::new(kv.clone(), key_prefix, cfg.dim).with_page_size(page_size),
        );
        let identities = Arc::new(KvIdentityStore::new(kv, key_prefix));
        let embedder = Arc::new(RawEmbedder::new(cfg.dim));
        Self::new(cfg, repo, identities, embedder)
    }

    pub fn config(&self) -> &MatchConfig {
        self.decider.config()
    }

    /// Registers an identity with an already extracted embedding.
    pub fn register(
        &self,
        attrs: &NewIdentity,
        vector: &[f32],
    ) -> Result<IdentityId, FaceprintError> {
        self.registrar.register(attrs, vector)
    }

    /// Extracts the face in `image` and registers it.
    pub fn register_image(
        &self,
        attrs: &NewIdentity,
        image: &[u8],
    ) -> Result<IdentityId, FaceprintError> {
        let vector = self.embedder.extract(image)?;
        self.registrar.register(attrs, &vector)
    }

    /// Authenticates an already extracted embedding and returns the account.
    pub fn authenticate(&self, vector: &[f32]) -> Result<Account, FaceprintError> {
        let id = self.authenticator.authenticate(vector)?;
        // The account may have been removed since its embedding was scanned.
        self.identities
            .get_identity(&id)?
            .ok_or(FaceprintError::NotFound(id))
    }

    /// Extracts the face in `image` and authenticates it.
    pub fn authenticate_image(&self, image: &[u8]) -> Result<Account, FaceprintError> {
        let vector = self.embedder.extract(image)?;
        self.authenticate(&vector)
    }

    /// All accounts, without their embeddings.
    pub fn accounts(&self) -> Result<Vec<Account>, FaceprintError> {
        self.identities.list_identities()
    }

    /// Number of enrolled embeddings.
    pub fn enrolled(&self) -> Result<usize, FaceprintError> {
        self.repo.len()
    }
}
