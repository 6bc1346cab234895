//! Error types for cowimage.

use crate::geometry::{Bounds, Point};
use thiserror::Error;

/// Result alias for cowimage operations.
pub type CowImageResult<T> = std::result::Result<T, CowImageError>;

/// Errors that can occur when constructing or operating on images.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum CowImageError {
    /// A packed pixel-format descriptor has a field outside its reserved bits.
    #[error("invalid pixel format descriptor {format:#010x}")]
    InvalidPixelFormat {
        /// The raw packed descriptor.
        format: u32,
    },
    /// The pixel format would pack several pixels into one storage unit.
    #[error(
        "format {format:#010x} needs {needed_bits} bits per pixel but the \
         storage unit holds {storage_bits}; packed pixels are not supported"
    )]
    PackedPixelsUnsupported {
        /// The raw packed descriptor.
        format: u32,
        /// Bits required by one pixel (bits per sample times samples per pixel).
        needed_bits: u32,
        /// Bits available in one storage unit.
        storage_bits: u32,
    },
    /// An adopted buffer holds fewer pixels than the requested bounds need.
    #[error("buffer too small: needed {needed} pixels, got {got}")]
    BufferTooSmall {
        /// Pixel count required by the bounds.
        needed: usize,
        /// Pixel count actually supplied.
        got: usize,
    },
    /// The allocator could not reserve space for the pixel buffer.
    #[error("allocation of {pixels} pixels failed")]
    AllocationFailed {
        /// Pixel count of the attempted allocation.
        pixels: usize,
    },
    /// A rectangle that must lie inside another one does not.
    #[error("bounds {inner:?} not contained in {outer:?}")]
    BoundsNotContained {
        /// The rectangle required to be inside.
        inner: Bounds,
        /// The rectangle required to contain it.
        outer: Bounds,
    },
    /// Two images that must share bounds do not.
    #[error("bounds mismatch: {left:?} vs {right:?}")]
    BoundsMismatch {
        /// Bounds of the first image.
        left: Bounds,
        /// Bounds of the second image.
        right: Bounds,
    },
    /// A coordinate lies outside the image bounds.
    #[error("coordinates {point:?} outside bounds {bounds:?}")]
    CoordinatesOutOfBounds {
        /// The offending coordinates.
        point: Point,
        /// The bounds they were checked against.
        bounds: Bounds,
    },
    /// A border-synthesis policy was given an empty source region.
    #[error("source region is empty, nothing to synthesize a border from")]
    EmptySource,
    /// A pointer passed to the coordinate inverse map lies outside the buffer.
    #[error("pointer outside the image buffer")]
    PointerOutOfBuffer,
    /// A pointer passed to the coordinate inverse map is not pixel-aligned.
    #[error("pointer not aligned to a pixel boundary")]
    PointerMisaligned,
    /// A matrix has a shape that cannot describe an image.
    #[error("invalid matrix shape: {rows} rows, {cols} cols")]
    InvalidMatrix {
        /// Row count of the matrix.
        rows: usize,
        /// Column count of the matrix (of the first ragged row, if any).
        cols: usize,
    },
}
