//! cowimage provides shared-buffer image containers for in-process
//! image-processing pipelines.
//!
//! An [`Image`] owns or shares one pixel allocation and exposes a
//! rectangular ROI view of it with copy-on-write semantics: `Clone` is a
//! cheap shallow copy, and mutation detaches from a shared buffer first.
//! The pixel iterators traverse exactly the ROI while skipping inter-row
//! buffer padding, the border padders (fill/mirror/tile) synthesize pixels
//! outside a source image's footprint, and the generic transforms apply a
//! per-pixel function across one or two images: the building blocks for
//! convolution-style algorithms, with optional parallelism via the `rayon`
//! feature.

pub mod format;
pub mod geometry;
pub mod image;
pub mod matrix;
pub mod pad;
mod trace;
pub mod transform;
pub mod util;

pub use format::{Pixel, PixelFormat, Sample};
pub use geometry::{Bounds, Point};
pub use image::{Image, Pixels, PixelsMut, ReleaseHook};
pub use matrix::{Matrix, RowMajorMatrix};
pub use pad::{FillPadder, MirrorPadder, TilePadder};
pub use transform::{transform, transform2};
pub use util::{CowImageError, CowImageResult};

#[cfg(feature = "rayon")]
pub use transform::rayon::{transform2_par, transform_par};
