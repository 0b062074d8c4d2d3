use std::sync::Arc;

use faceid_vecmath::{check_dimension, check_nondegenerate, cosine_distance};
use tracing::debug;

use crate::config::MatchConfig;
use crate::embedding::{Candidate, MatchResult};
use crate::error::FaceprintError;
use crate::repository::EmbeddingRepository;

/// Classifies a query embedding against every enrolled embedding.
///
/// Both searches are a linear scan with no index or cache, so each call
/// costs O(N) distance computations for N enrolled identities. This is the
/// main scalability limit of the engine. Any future index has to return
/// exactly what the scan returns for the same threshold.
pub struct MatchDecider {
    cfg: MatchConfig,
    repo: Arc<dyn EmbeddingRepository>,
}

impl MatchDecider {
    /// Creates a decider. Panics if the threshold is not a positive finite
    /// cosine distance, or if `cfg.dim` disagrees with the repository.
    pub fn new(cfg: MatchConfig, repo: Arc<dyn EmbeddingRepository>) -> Self {
        let cfg = cfg.with_defaults();
        assert!(
            cfg.is_valid(),
            "faceprint: threshold must be in (0, 2], got {}",
            cfg.threshold
        );
        assert_eq!(
            cfg.dim,
            repo.dimension(),
            "faceprint: MatchConfig.dim must equal the repository dimension"
        );
        Self { cfg, repo }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    pub fn threshold(&self) -> f32 {
        self.cfg.threshold
    }

    /// Validates a query vector: right dimension, finite components, non-zero norm.
    pub fn validate(&self, query: &[f32]) -> Result<(), FaceprintError> {
        check_dimension(query, self.cfg.dim)?;
        check_nondegenerate(query)?;
        Ok(())
    }

    /// Returns the first enrolled identity strictly within threshold of
    /// `query`, stopping at that record.
    ///
    /// For deduplication any close enough record disqualifies the query, so
    /// this does not look for the closest one.
    pub fn find_duplicate(&self, query: &[f32]) -> Result<Option<Candidate>, FaceprintError> {
        self.validate(query)?;
        let mut scanned = 0usize;
        for record in self.repo.scan_all() {
            let record = record?;
            scanned += 1;
            let distance = cosine_distance(query, &record.vector)?;
            if distance < self.cfg.threshold {
                debug!(
                    identity = %record.identity,
                    distance,
                    scanned,
                    "faceprint: duplicate candidate"
                );
                return Ok(Some(Candidate {
                    identity: record.identity,
                    distance,
                }));
            }
        }
        debug!(scanned, "faceprint: no duplicate");
        Ok(None)
    }

    /// Returns the closest enrolled identity if it is strictly within
    /// threshold.
    ///
    /// Ties go to the first record in scan order. When the closest record is
    /// too far, the result is [`MatchResult::NoMatch`] carrying its distance;
    /// an empty repository gives `NoMatch { closest: None }`.
    pub fn find_best_match(&self, query: &[f32]) -> Result<MatchResult, FaceprintError> {
        self.validate(query)?;
        let mut best: Option<Candidate> = None;
        let mut best_distance = f32::INFINITY;
        let mut scanned = 0usize;
        for record in self.repo.scan_all() {
            let record = record?;
            scanned += 1;
            let distance = cosine_distance(query, &record.vector)?;
            // Strict comparison against an infinite seed: NaN never wins, ties keep the first.
            if distance < best_distance {
                best_distance = distance;
                best = Some(Candidate {
                    identity: record.identity,
                    distance,
                });
            }
        }
        debug!(
            scanned,
            best = best.as_ref().map(|b| b.distance),
            "faceprint: best match scan"
        );
        Ok(match best {
            Some(b) if b.distance < self.cfg.threshold => MatchResult::Match {
                identity: b.identity,
                distance: b.distance,
            },
            Some(b) => MatchResult::NoMatch {
                closest: Some(b.distance),
            },
            None => MatchResult::NoMatch { closest: None },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::IdentityId;
    use crate::repository::KvRepository;
    use faceid_kv::{KVStore, MemoryStore};

    fn decider(threshold: f32) -> (Arc<KvRepository>, MatchDecider) {
        let repo = Arc::new(KvRepository::new(Arc::new(MemoryStore::new()), "t", 3));
        let d = MatchDecider::new(MatchConfig { dim: 3, threshold }, repo.clone());
        (repo, d)
    }

    #[test]
    fn empty_repository() {
        let (_, d) = decider(0.35);
        assert_eq!(d.find_duplicate(&[1.0, 0.0, 0.0]).unwrap(), None);
        assert_eq!(
            d.find_best_match(&[1.0, 0.0, 0.0]).unwrap(),
            MatchResult::NoMatch { closest: None }
        );
    }

    #[test]
    fn duplicate_within_threshold() {
        let (repo, d) = decider(0.35);
        repo.insert(&"a".into(), &[1.0, 0.0, 0.0]).unwrap();
        let c = d.find_duplicate(&[0.95, 0.1, 0.0]).unwrap().unwrap();
        assert_eq!(c.identity, IdentityId::new("a"));
        assert!(c.distance < 0.35);
    }

    #[test]
    fn duplicate_returns_first_in_range_not_closest() {
        let (repo, d) = decider(0.35);
        // "a" is in range but farther than "b".
        repo.insert(&"a".into(), &[0.8, 0.6, 0.0]).unwrap();
        repo.insert(&"b".into(), &[1.0, 0.0, 0.0]).unwrap();
        let c = d.find_duplicate(&[1.0, 0.0, 0.0]).unwrap().unwrap();
        assert_eq!(c.identity.as_str(), "a");

        match d.find_best_match(&[1.0, 0.0, 0.0]).unwrap() {
            MatchResult::Match { identity, .. } => assert_eq!(identity.as_str(), "b"),
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn threshold_is_exclusive() {
        let (repo, d) = decider(1.0);
        repo.insert(&"a".into(), &[1.0, 0.0, 0.0]).unwrap();
        // Orthogonal: distance exactly 1.0.
        assert_eq!(d.find_duplicate(&[0.0, 1.0, 0.0]).unwrap(), None);
        assert_eq!(
            d.find_best_match(&[0.0, 1.0, 0.0]).unwrap(),
            MatchResult::NoMatch { closest: Some(1.0) }
        );
    }

    #[test]
    fn best_match_rejected_reports_distance() {
        let (repo, d) = decider(0.35);
        repo.insert(&"a".into(), &[1.0, 0.0, 0.0]).unwrap();
        repo.insert(&"b".into(), &[0.0, 0.0, 1.0]).unwrap();
        match d.find_best_match(&[0.5, 0.5 * 3f32.sqrt(), 0.0]).unwrap() {
            MatchResult::NoMatch { closest: Some(c) } => assert!((c - 0.5).abs() < 1e-5),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn tie_goes_to_first_scanned() {
        let (repo, d) = decider(0.35);
        repo.insert(&"a".into(), &[1.0, 0.0, 0.0]).unwrap();
        repo.insert(&"b".into(), &[2.0, 0.0, 0.0]).unwrap();
        match d.find_best_match(&[1.0, 0.0, 0.0]).unwrap() {
            MatchResult::Match { identity, .. } => assert_eq!(identity.as_str(), "a"),
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn invalid_query() {
        let (repo, d) = decider(0.35);
        repo.insert(&"a".into(), &[1.0, 0.0, 0.0]).unwrap();
        assert!(matches!(
            d.find_duplicate(&[1.0, 0.0]),
            Err(FaceprintError::DimensionMismatch { expected: 3, got: 2 })
        ));
        assert!(matches!(
            d.find_best_match(&[0.0, 0.0, 0.0]),
            Err(FaceprintError::DegenerateVector)
        ));
        assert_eq!(repo.len().unwrap(), 1);
    }

    #[test]
    fn non_finite_query_rejected() {
        let (repo, d) = decider(0.35);
        repo.insert(&"a".into(), &[1.0, 0.0, 0.0]).unwrap();
        assert!(matches!(
            d.find_duplicate(&[f32::NAN, 1.0, 0.0]),
            Err(FaceprintError::NonFiniteVector)
        ));
        assert!(matches!(
            d.find_best_match(&[f32::INFINITY, 0.0, 1.0]),
            Err(FaceprintError::NonFiniteVector)
        ));
    }

    #[test]
    fn stored_nan_record_is_a_store_fault() {
        let kv = Arc::new(MemoryStore::new());
        let repo = Arc::new(KvRepository::new(kv.clone(), "t", 3));
        let d = MatchDecider::new(MatchConfig { dim: 3, threshold: 0.35 }, repo.clone());
        // Written behind the repository's back, ahead of an honest record.
        kv.set(
            &crate::keys::embedding_key("t", "a"),
            &faceid_vecmath::encode_le(&[f32::NAN, 0.0, 0.0]),
        )
        .unwrap();
        repo.insert(&"b".into(), &[1.0, 0.0, 0.0]).unwrap();

        assert!(matches!(
            d.find_best_match(&[1.0, 0.0, 0.0]),
            Err(FaceprintError::Store(_))
        ));
        assert!(matches!(
            d.find_duplicate(&[1.0, 0.0, 0.0]),
            Err(FaceprintError::Store(_))
        ));
    }

    #[test]
    #[should_panic(expected = "threshold must be in (0, 2]")]
    fn negative_threshold_panics() {
        decider(-0.5);
    }
}
