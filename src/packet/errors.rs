use thiserror::Error;

#[derive(Debug, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("Invalid buffer: expected {expected} bytes, actual {actual} bytes")]
    InvalidBuffer { expected: usize, actual: usize },

    #[error("Bad checksum: {0}")]
    BadChecksum(String),

    #[error("Unsupported {0}")]
    Unsupported(String),
}

impl HeaderError {
    /// Shorthand for a buffer that is shorter than the fixed header
    pub(crate) fn too_short(expected: usize, actual: usize) -> Self {
        HeaderError::InvalidBuffer { expected, actual }
    }
}
