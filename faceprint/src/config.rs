/// Default embedding dimension (ArcFace).
pub const DEFAULT_DIM: usize = 512;

/// Default maximum cosine distance for two faces to count as the same person.
pub const DEFAULT_THRESHOLD: f32 = 0.35;

/// Default number of records read per repository page.
pub const DEFAULT_PAGE_SIZE: usize = 256;

/// Controls matching behavior.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Embedding dimension. Default: 512.
    pub dim: usize,

    /// Maximum cosine distance (exclusive) to treat two embeddings as the
    /// same identity. Lower is stricter: fewer false accepts, more false
    /// rejects. Default: 0.35.
    pub threshold: f32,
}

impl MatchConfig {
    pub fn with_defaults(mut self) -> Self {
        if self.dim == 0 {
            self.dim = DEFAULT_DIM;
        }
        if self.threshold == 0.0 {
            self.threshold = DEFAULT_THRESHOLD;
        }
        self
    }

    /// Checks that the threshold is usable as a cosine-distance bound.
    pub fn is_valid(&self) -> bool {
        self.dim > 0 && self.threshold.is_finite() && self.threshold > 0.0 && self.threshold <= 2.0
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            dim: DEFAULT_DIM,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_zero_fields() {
        let cfg = MatchConfig { dim: 0, threshold: 0.0 }.with_defaults();
        assert_eq!(cfg.dim, 512);
        assert_eq!(cfg.threshold, 0.35);

        let cfg = MatchConfig { dim: 128, threshold: 0.4 }.with_defaults();
        assert_eq!(cfg.dim, 128);
        assert_eq!(cfg.threshold, 0.4);
    }

    #[test]
    fn validity() {
        assert!(MatchConfig::default().is_valid());
        assert!(!MatchConfig { dim: 512, threshold: -0.1 }.is_valid());
        assert!(!MatchConfig { dim: 512, threshold: f32::NAN }.is_valid());
        assert!(!MatchConfig { dim: 512, threshold: 2.5 }.is_valid());
        assert!(!MatchConfig { dim: 0, threshold: 0.35 }.is_valid());
    }
}
