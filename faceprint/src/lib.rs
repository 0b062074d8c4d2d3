//! Face embedding matching engine.
//!
//! Decides whether a face embedding duplicates an enrolled identity
//! (registration) or belongs to one (login), under a fixed cosine-distance
//! threshold.
//!
//! # Architecture
//!
//! 1. [`EmbeddingRepository`]: identity → one embedding, append-only
//! 2. [`MatchDecider`]: linear scan of the repository against a threshold
//! 3. [`Registrar`]: duplicate check, identity creation, embedding insert,
//!    rollback of the identity if the insert fails
//! 4. [`Authenticator`]: best match within threshold → identity
//!
//! Face detection and embedding extraction sit behind [`FaceEmbedder`];
//! account storage sits behind [`IdentityStore`]. [`FaceGate`] wires them
//! together.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use faceid_faceprint::{FaceGate, MatchConfig, NewIdentity};
//! use faceid_kv::MemoryStore;
//!
//! let gate = FaceGate::with_kv(
//!     MatchConfig { dim: 3, threshold: 0.35 },
//!     Arc::new(MemoryStore::new()),
//!     "faceid",
//!     256,
//! );
//! let attrs = NewIdentity { username: "alice".into(), email: "alice@example.com".into() };
//! let id = gate.register(&attrs, &[1.0, 0.0, 0.0]).unwrap();
//! assert_eq!(gate.authenticate(&[0.98, 0.1, 0.0]).unwrap().id, id);
//! ```
//!
//! # Scaling
//!
//! Every registration and login scans all N enrolled embeddings. There is
//! no index; the scan is where one would go.

mod authenticator;
mod config;
mod decider;
mod embedder;
mod embedding;
mod error;
mod gate;
mod identity;
pub mod keys;
mod registrar;
mod repository;

pub use authenticator::Authenticator;
pub use config::{MatchConfig, DEFAULT_DIM, DEFAULT_PAGE_SIZE, DEFAULT_THRESHOLD};
pub use decider::MatchDecider;
pub use embedder::{FaceEmbedder, RawEmbedder};
pub use embedding::{Candidate, IdentityId, IdentityRecord, MatchResult};
pub use error::{EmbedError, FaceprintError};
pub use gate::FaceGate;
pub use identity::{Account, IdentityStore, KvIdentityStore, NewIdentity};
pub use registrar::Registrar;
pub use repository::{EmbeddingRepository, KvRepository, RecordIter};
