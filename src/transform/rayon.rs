//! Rayon-parallel transform variants (feature-gated).
//!
//! Row-parallel versions of the transforms: each thread maps whole rows, the
//! per-row results are concatenated in row order, so the output is
//! bit-identical to the sequential forms.

use rayon::prelude::*;

use crate::format::Pixel;
use crate::image::Image;
use crate::util::{CowImageError, CowImageResult};

/// Row-parallel [`transform`](crate::transform::transform).
pub fn transform_par<P, F>(image: &Image<P>, f: F) -> CowImageResult<Image<P>>
where
    P: Pixel + Send + Sync,
    F: Fn(P) -> P + Sync,
{
    let rows: Vec<Vec<P>> = (0..image.height() as usize)
        .into_par_iter()
        .map(|index| {
            let row = image.row(index).expect("row index within ROI height");
            row.iter().map(|&p| f(p)).collect()
        })
        .collect();

    collect_rows(image, rows)
}

/// Row-parallel [`transform2`](crate::transform::transform2).
pub fn transform2_par<P, F>(first: &Image<P>, second: &Image<P>, f: F) -> CowImageResult<Image<P>>
where
    P: Pixel + Send + Sync,
    F: Fn(P, P) -> P + Sync,
{
    if first.bounds() != second.bounds() {
        return Err(CowImageError::BoundsMismatch {
            left: first.bounds(),
            right: second.bounds(),
        });
    }

    let rows: Vec<Vec<P>> = (0..first.height() as usize)
        .into_par_iter()
        .map(|index| {
            let row_a = first.row(index).expect("row index within ROI height");
            let row_b = second.row(index).expect("rows agree for equal bounds");
            row_a.iter().zip(row_b).map(|(&a, &b)| f(a, b)).collect()
        })
        .collect();

    collect_rows(first, rows)
}

fn collect_rows<P: Pixel>(shape: &Image<P>, rows: Vec<Vec<P>>) -> CowImageResult<Image<P>> {
    let len = shape.len();
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| CowImageError::AllocationFailed { pixels: len })?;
    for row in rows {
        data.extend_from_slice(&row);
    }
    Image::from_pixels(shape.bounds(), data)
}
