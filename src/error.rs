use thiserror::Error;

/// Errors that can occur while materializing or flushing tiles.
///
/// Cache misses are not errors: they are reported as `None` / `Ok(false)` by
/// the cache and resolved by the tiled image itself.
#[derive(Debug, Clone, Error)]
pub enum TileError {
    /// Requested tile domain is not a sub-region of the backing image
    #[error("Tile domain {domain} is not inside image domain {image}")]
    DomainOutsideImage { domain: String, image: String },

    /// Tile being flushed does not cover the domain it is flushed to
    #[error("Tile covers {tile} but was flushed to {domain}")]
    TileDomainMismatch { tile: String, domain: String },

    /// Tile storage could not be allocated
    #[error("Failed to allocate tile of {points} points: {message}")]
    Allocation { points: usize, message: String },

    /// Domain is too large to be addressed in memory
    #[error("Domain {0} is too large to materialize")]
    SizeOverflow(String),

    /// Backing image reports itself as invalid
    #[error("Backing image is not valid")]
    InvalidImage,

    /// Source image could not be decoded
    #[error("Failed to decode image: {message}")]
    Decode { message: String },

    /// Output image could not be encoded
    #[error("Failed to encode image: {message}")]
    Encode { message: String },

    /// Filesystem error while loading or saving images
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TileError {
    fn from(err: std::io::Error) -> Self {
        TileError::Io(err.to_string())
    }
}
