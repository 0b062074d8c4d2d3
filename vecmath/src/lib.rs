//! Vector math for face embeddings.
//!
//! Embeddings are plain `&[f32]` slices of a fixed dimension. This crate
//! computes cosine distance between them and converts them to and from the
//! persisted byte layout (little-endian IEEE-754, 4 bytes per component).

pub mod codec;
pub mod cosine;
pub mod error;

pub use codec::{decode_le, encode_le};
pub use cosine::{check_dimension, check_nondegenerate, cosine_distance};
pub use error::VecError;
