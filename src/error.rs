//! Error type shared by every painting operation.
//!
//! All errors are local to the operation that produced them. Operations check
//! their preconditions before touching any layer, so an `Err` always means the
//! mesh was left exactly as it was.

use crate::color::ChannelSet;

/// Errors reported by isolation, compositing and the painting tools.
#[derive(Debug, thiserror::Error)]
pub enum PaintError {
    #[error("mesh has no color layers")]
    NoColorLayers,

    #[error("color layer not found: {0}")]
    LayerNotFound(String),

    #[error("color layer already exists: {0}")]
    DuplicateLayer(String),

    #[error("malformed isolation suffix in layer name {0:?}")]
    MalformedIsolation(String),

    #[error(
        "multi-to-multi transfer between different channels is not supported \
         (source {source_channels}, isolated {isolated_channels})"
    )]
    UnsupportedTransfer {
        source_channels: ChannelSet,
        isolated_channels: ChannelSet,
    },

    #[error("cannot paint: no vertices are selected and fill-all is disabled")]
    NothingSelected,

    #[error("no loops to sample")]
    NothingToSample,

    #[error("gradient line has zero length")]
    DegenerateGradient,

    #[error("palette not found: {0}")]
    PaletteNotFound(String),

    #[error("color layers hold {found} loops but the mesh has {expected}")]
    LayerSizeMismatch { expected: usize, found: usize },
}

/// Result alias used throughout the crate.
pub type Result<T, E = PaintError> = std::result::Result<T, E>;
