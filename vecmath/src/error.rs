use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VecError {
    #[error("vecmath: dimension mismatch: got {got}, want {want}")]
    DimensionMismatch { got: usize, want: usize },

    #[error("vecmath: degenerate vector (zero norm)")]
    DegenerateVector,

    #[error("vecmath: non-finite component at index {0}")]
    NonFinite(usize),

    #[error("vecmath: invalid encoding: {0} bytes is not a whole number of f32 values")]
    InvalidEncoding(usize),
}
