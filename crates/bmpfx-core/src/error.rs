//! Error taxonomy shared by the codec and every engine.

/// Errors produced while loading, saving, or transforming an image.
#[derive(Debug, thiserror::Error)]
pub enum BmpError {
    /// The OS refused an open, read, or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The bytes are not a supported uncompressed bitmap.
    #[error("invalid bitmap: {0}")]
    Format(String),
    /// A pixel buffer could not be reserved.
    #[error("failed to allocate {bytes} bytes for pixel data")]
    Allocation { bytes: usize },
    /// A caller-supplied argument is out of range.
    #[error("invalid parameter: {0}")]
    Parameter(String),
    /// A pipeline description could not be parsed or written.
    #[error("invalid pipeline config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BmpError>;

impl BmpError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub(crate) fn parameter(msg: impl Into<String>) -> Self {
        Self::Parameter(msg.into())
    }
}

/// Reserve a vector of exactly `len` copies of `fill`, reporting failure
/// as [`BmpError::Allocation`] instead of aborting.
pub(crate) fn try_filled<T: Clone>(len: usize, fill: T) -> Result<Vec<T>> {
    let bytes = len.saturating_mul(std::mem::size_of::<T>());
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| BmpError::Allocation { bytes })?;
    buf.resize(len, fill);
    Ok(buf)
}
