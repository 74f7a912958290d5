//! Error types for encoding and decoding TMG images.

/// Errors produced by the TMG codec.
#[derive(Debug, thiserror::Error)]
pub enum TmgError {
    /// The source bitmap could not be read or decoded.
    #[error("failed to decode source image: {0}")]
    DecodeSourceImage(String),

    /// The header is missing lines, has a bad magic or non-numeric dimensions.
    #[error("malformed container: {0}")]
    MalformedContainer(String),

    /// The payload does not decompress to the expected index stream.
    #[error("corrupt payload: {0}")]
    CorruptPayload(String),

    /// The image name cannot be stored as a single header line.
    #[error("invalid image name: {0:?}")]
    InvalidName(String),

    /// Pixel buffer does not match the declared dimensions.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TmgError>;
