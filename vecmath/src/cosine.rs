use crate::error::VecError;

/// Compute the cosine distance between two vectors.
///
/// Returns a value in `[0, 2]` where 0 means identical direction and
/// 2 means opposite direction.
///
/// Accumulates in f64, left to right in index order, so identical inputs
/// always give bit-identical results. A NaN or infinite component fails
/// with [`VecError::NonFinite`], so the result is never NaN.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f32, VecError> {
    if a.len() != b.len() {
        return Err(VecError::DimensionMismatch {
            got: b.len(),
            want: a.len(),
        });
    }
    let mut dot: f64 = 0.0;
    let mut norm_a: f64 = 0.0;
    let mut norm_b: f64 = 0.0;
    for (i, (&x, &y)) in a.iter().zip(b.iter()).enumerate() {
        if !x.is_finite() || !y.is_finite() {
            return Err(VecError::NonFinite(i));
        }
        let ai = x as f64;
        let bi = y as f64;
        dot += ai * bi;
        norm_a += ai * ai;
        norm_b += bi * bi;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return Err(VecError::DegenerateVector);
    }
    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    // Clamp to [-1, 1] to handle floating point errors.
    let similarity = similarity.clamp(-1.0, 1.0);
    Ok((1.0 - similarity) as f32)
}

/// Fails with [`VecError::DimensionMismatch`] unless `v` has exactly `dim` components.
pub fn check_dimension(v: &[f32], dim: usize) -> Result<(), VecError> {
    if v.len() != dim {
        return Err(VecError::DimensionMismatch {
            got: v.len(),
            want: dim,
        });
    }
    Ok(())
}

/// Fails with [`VecError::NonFinite`] if any component is NaN or infinite,
/// and with [`VecError::DegenerateVector`] if `v` has zero norm.
pub fn check_nondegenerate(v: &[f32]) -> Result<(), VecError> {
    if let Some(i) = v.iter().position(|x| !x.is_finite()) {
        return Err(VecError::NonFinite(i));
    }
    if v.iter().all(|&x| x == 0.0) {
        return Err(VecError::DegenerateVector);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical() {
        let d = cosine_distance(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]).unwrap();
        assert!(d.abs() < 1e-6, "identical: got {d}");
    }

    #[test]
    fn test_identical_unnormalized() {
        let v = [0.3, -1.7, 2.2, 0.01];
        let d = cosine_distance(&v, &v).unwrap();
        assert!(d.abs() < 1e-6, "self distance: got {d}");
    }

    #[test]
    fn test_orthogonal() {
        let d = cosine_distance(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]).unwrap();
        assert!((d - 1.0).abs() < 0.001, "orthogonal: got {d}");
    }

    #[test]
    fn test_opposite() {
        let d = cosine_distance(&[1.0, 0.0, 0.0], &[-1.0, 0.0, 0.0]).unwrap();
        assert!((d - 2.0).abs() < 0.001, "opposite: got {d}");
    }

    #[test]
    fn test_scale_invariant() {
        let d1 = cosine_distance(&[1.0, 2.0, 3.0], &[0.5, 0.1, 0.9]).unwrap();
        let d2 = cosine_distance(&[10.0, 20.0, 30.0], &[0.5, 0.1, 0.9]).unwrap();
        assert!((d1 - d2).abs() < 1e-6);
    }

    #[test]
    fn test_symmetric() {
        let a = [0.12, -0.4, 0.9, 0.33, -0.05];
        let b = [0.7, 0.2, -0.1, 0.5, 0.45];
        assert_eq!(
            cosine_distance(&a, &b).unwrap(),
            cosine_distance(&b, &a).unwrap()
        );
    }

    #[test]
    fn test_deterministic() {
        let a: Vec<f32> = (0..512).map(|i| ((i * 37 % 101) as f32) / 50.0 - 1.0).collect();
        let b: Vec<f32> = (0..512).map(|i| ((i * 53 % 97) as f32) / 48.0 - 1.0).collect();
        let d1 = cosine_distance(&a, &b).unwrap();
        let d2 = cosine_distance(&a, &b).unwrap();
        assert_eq!(d1.to_bits(), d2.to_bits());
    }

    #[test]
    fn test_dimension_mismatch() {
        assert_eq!(
            cosine_distance(&[1.0, 0.0], &[1.0, 0.0, 0.0]),
            Err(VecError::DimensionMismatch { got: 3, want: 2 })
        );
    }

    #[test]
    fn test_zero_vector() {
        assert_eq!(
            cosine_distance(&[0.0, 0.0, 0.0], &[1.0, 0.0, 0.0]),
            Err(VecError::DegenerateVector)
        );
        assert_eq!(
            cosine_distance(&[1.0, 0.0, 0.0], &[0.0, 0.0, 0.0]),
            Err(VecError::DegenerateVector)
        );
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(
            cosine_distance(&[1.0, f32::NAN, 0.0], &[1.0, 0.0, 0.0]),
            Err(VecError::NonFinite(1))
        );
        assert_eq!(
            cosine_distance(&[1.0, 0.0, 0.0], &[0.0, 0.0, f32::INFINITY]),
            Err(VecError::NonFinite(2))
        );
        assert_eq!(
            check_nondegenerate(&[f32::NEG_INFINITY, 1.0]),
            Err(VecError::NonFinite(0))
        );
        assert_eq!(
            check_nondegenerate(&[0.0, f32::NAN]),
            Err(VecError::NonFinite(1))
        );
    }

    #[test]
    fn test_checks() {
        assert!(check_dimension(&[1.0, 2.0], 2).is_ok());
        assert_eq!(
            check_dimension(&[1.0], 2),
            Err(VecError::DimensionMismatch { got: 1, want: 2 })
        );
        assert!(check_nondegenerate(&[0.0, -0.1]).is_ok());
        assert_eq!(
            check_nondegenerate(&[0.0, 0.0]),
            Err(VecError::DegenerateVector)
        );
    }
}
