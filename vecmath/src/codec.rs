use crate::error::VecError;

/// Encode a vector as little-endian IEEE-754 f32, 4 bytes per component,
/// with no header.
pub fn encode_le(v: &[f32]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(v.len() * 4);
    for x in v {
        buf.extend_from_slice(&x.to_le_bytes());
    }
    buf
}

/// Decode bytes produced by [`encode_le`] (or by an embedding extractor
/// using the same layout).
pub fn decode_le(data: &[u8]) -> Result<Vec<f32>, VecError> {
    if data.len() % 4 != 0 {
        return Err(VecError::InvalidEncoding(data.len()));
    }
    Ok(data
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}
