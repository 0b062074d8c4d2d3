use faceid_vecmath::decode_le;

use crate::error::EmbedError;

/// Extracts a face embedding from an image.
///
/// The implementation is responsible for finding exactly one face: zero
/// faces is [`EmbedError::NoFaceFound`], more than one is
/// [`EmbedError::MultipleFacesFound`]. The returned vector has
/// [`FaceEmbedder::dimension`] components.
///
/// # Thread Safety
///
/// Implementations must be safe for concurrent use.
pub trait FaceEmbedder: Send + Sync {
    /// Computes the embedding of the single face in `image`.
    fn extract(&self, image: &[u8]) -> Result<Vec<f32>, EmbedError>;

    /// Returns the dimensionality of the embedding vectors (e.g., 512).
    fn dimension(&self) -> usize;
}

/// Embedder for input that is already an extracted embedding in the
/// persisted layout (little-endian f32, no header).
///
/// Used when detection and extraction run in a separate process.
#[derive(Debug, Clone)]
pub struct RawEmbedder {
    dim: usize,
}

impl RawEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl FaceEmbedder for RawEmbedder {
    fn extract(&self, image: &[u8]) -> Result<Vec<f32>, EmbedError> {
        if image.is_empty() {
            return Err(EmbedError::NoFaceFound);
        }
        decode_le(image).map_err(|e| EmbedError::Extraction(e.to_string()))
    }

    fn dimension(&self) -> usize {
        self.dim
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faceid_vecmath::encode_le;

    #[test]
    fn raw_embedder_decodes() {
        let e = RawEmbedder::new(3);
        assert_eq!(e.dimension(), 3);
        let v = e.extract(&encode_le(&[0.5, -0.25, 1.0])).unwrap();
        assert_eq!(v, vec![0.5, -0.25, 1.0]);
    }

    #[test]
    fn raw_embedder_errors() {
        let e = RawEmbedder::new(3);
        assert_eq!(e.extract(&[]), Err(EmbedError::NoFaceFound));
        assert!(matches!(e.extract(&[1, 2]), Err(EmbedError::Extraction(_))));
    }
}
