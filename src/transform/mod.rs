//! Generic per-pixel transforms over one or two images.
//!
//! Both forms produce a new image with the input's bounds and format. The
//! per-pixel invocation order is unspecified, which permits the row-parallel
//! variants in the feature-gated [`rayon`](self::rayon) module.

use crate::format::Pixel;
use crate::image::Image;
use crate::trace::trace_event;
use crate::util::{CowImageError, CowImageResult};

#[cfg(feature = "rayon")]
pub mod rayon;

/// Applies `f` to every pixel of `image`, returning the results as a new
/// image with identical bounds.
pub fn transform<P, F>(image: &Image<P>, f: F) -> CowImageResult<Image<P>>
where
    P: Pixel,
    F: Fn(P) -> P,
{
    trace_event!("transform", pixels = image.len());
    image.convert_with(f)
}

/// Applies `f` to corresponding pixel pairs of two equal-bounds images,
/// returning the results as a new image.
///
/// Fails with [`CowImageError::BoundsMismatch`] when the bounds differ.
pub fn transform2<P, F>(first: &Image<P>, second: &Image<P>, f: F) -> CowImageResult<Image<P>>
where
    P: Pixel,
    F: Fn(P, P) -> P,
{
    if first.bounds() != second.bounds() {
        return Err(CowImageError::BoundsMismatch {
            left: first.bounds(),
            right: second.bounds(),
        });
    }
    trace_event!("transform2", pixels = first.len());

    let len = first.len();
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| CowImageError::AllocationFailed { pixels: len })?;
    for index in 0..first.height() as usize {
        let row_a = first.row(index).expect("row index within ROI height");
        let row_b = second.row(index).expect("rows agree for equal bounds");
        data.extend(row_a.iter().zip(row_b).map(|(&a, &b)| f(a, b)));
    }
    Image::from_pixels(first.bounds(), data)
}
