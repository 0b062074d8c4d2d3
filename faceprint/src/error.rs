use thiserror::Error;

use crate::embedding::IdentityId;

/// Errors reported by the face-embedding extractor.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EmbedError {
    #[error("no face found")]
    NoFaceFound,

    #[error("exactly one face required, found {0}")]
    MultipleFacesFound(usize),

    #[error("extraction failed: {0}")]
    Extraction(String),
}

/// Errors returned by faceprint operations.
///
/// [`FaceprintError::DuplicateFace`] and [`FaceprintError::NotRecognized`]
/// are ordinary outcomes of registration and login; they carry what the
/// caller needs to explain the decision, never a stored vector.
#[derive(Debug, Error)]
pub enum FaceprintError {
    #[error("faceprint: dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("faceprint: degenerate embedding (zero norm)")]
    DegenerateVector,

    #[error("faceprint: embedding has a NaN or infinite component")]
    NonFiniteVector,

    #[error("faceprint: face already registered to {identity} (distance {distance:.4})")]
    DuplicateFace { identity: IdentityId, distance: f32 },

    #[error("faceprint: face not recognized{}", fmt_closest(.closest))]
    NotRecognized { closest: Option<f32> },

    #[error("faceprint: username already exists: {0}")]
    AlreadyExists(String),

    #[error("faceprint: identity not found: {0}")]
    NotFound(IdentityId),

    #[error("faceprint: embed error: {0}")]
    Embed(#[from] EmbedError),

    #[error("faceprint: storage error: {0}")]
    Store(String),
}

fn fmt_closest(closest: &Option<f32>) -> String {
    match closest {
        Some(d) => format!(" (closest distance {d:.4})"),
        None => " (no enrolled faces)".to_string(),
    }
}

impl From<faceid_vecmath::VecError> for FaceprintError {
    fn from(e: faceid_vecmath::VecError) -> Self {
        use faceid_vecmath::VecError;
        match e {
            VecError::DimensionMismatch { got, want } => FaceprintError::DimensionMismatch {
                expected: want,
                got,
            },
            VecError::DegenerateVector => FaceprintError::DegenerateVector,
            VecError::NonFinite(_) => FaceprintError::NonFiniteVector,
            VecError::InvalidEncoding(_) => FaceprintError::Store(e.to_string()),
        }
    }
}

impl From<faceid_kv::KVError> for FaceprintError {
    fn from(e: faceid_kv::KVError) -> Self {
        FaceprintError::Store(e.to_string())
    }
}

impl From<serde_json::Error> for FaceprintError {
    fn from(e: serde_json::Error) -> Self {
        FaceprintError::Store(e.to_string())
    }
}
