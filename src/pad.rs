//! Border padders: synthesize pixels outside a source image's footprint.
//!
//! Each padder either builds a new image whose interior equals the source
//! and whose border follows the policy (`padded_image`), or writes only the
//! border pixels of a caller-provided destination, leaving the interior
//! untouched (`pad_image`). The destination bounds must contain the source
//! bounds; equal bounds mean there is no border to synthesize.

use crate::format::Pixel;
use crate::geometry::{Bounds, Point};
use crate::image::Image;
use crate::trace::trace_event;
use crate::util::{CowImageError, CowImageResult};

/// Pads with one constant pixel value ("constant" boundary condition).
#[derive(Clone, Copy, Debug)]
pub struct FillPadder<P: Pixel> {
    value: P,
}

/// Pads by reflecting the source across the exceeded boundary ("reflect").
///
/// The column one left of the source equals the source's first column;
/// corners reflect across both axes; wide borders fold repeatedly.
#[derive(Clone, Copy, Debug, Default)]
pub struct MirrorPadder;

/// Pads by repeating the source periodically ("wrap").
///
/// The column one left of the source equals the source's last column.
#[derive(Clone, Copy, Debug, Default)]
pub struct TilePadder;

impl<P: Pixel> FillPadder<P> {
    /// Creates a padder writing `value` into every border pixel.
    pub fn new(value: P) -> Self {
        Self { value }
    }

    /// Returns a new image on `dst_bounds`: interior equal to `src`, border
    /// filled with the constant.
    pub fn padded_image(&self, src: &Image<P>, dst_bounds: Bounds) -> CowImageResult<Image<P>> {
        require_contained(src.bounds(), dst_bounds)?;
        let value = self.value;
        padded_image_with(src, dst_bounds, |_| value)
    }

    /// Fills only the border pixels of `dst` (outside `src_bounds`) with the
    /// constant; the interior is not touched.
    pub fn pad_image(&self, dst: &mut Image<P>, src_bounds: Bounds) -> CowImageResult<()> {
        require_contained(src_bounds, dst.bounds())?;
        if dst.bounds() == src_bounds {
            return Ok(());
        }
        let value = self.value;
        pad_border_with(dst, src_bounds, |_| value)
    }
}

impl MirrorPadder {
    /// Returns a new image on `dst_bounds`: interior equal to `src`, border
    /// reflected from it.
    pub fn padded_image<P: Pixel>(
        &self,
        src: &Image<P>,
        dst_bounds: Bounds,
    ) -> CowImageResult<Image<P>> {
        require_contained(src.bounds(), dst_bounds)?;
        require_source(src.bounds(), dst_bounds)?;
        let src_bounds = src.bounds();
        padded_image_with(src, dst_bounds, |point| {
            *src.pixel(reflect_point(src_bounds, point))
                .expect("reflected point lies inside the source")
        })
    }

    /// Reflects the interior region `src_bounds` of `dst` into its border
    /// pixels; the interior is not touched.
    pub fn pad_image<P: Pixel>(&self, dst: &mut Image<P>, src_bounds: Bounds) -> CowImageResult<()> {
        require_contained(src_bounds, dst.bounds())?;
        require_source(src_bounds, dst.bounds())?;
        if dst.bounds() == src_bounds {
            return Ok(());
        }
        let interior = dst.sub_image_copy(src_bounds)?;
        pad_border_with(dst, src_bounds, |point| {
            *interior
                .pixel(reflect_point(src_bounds, point))
                .expect("reflected point lies inside the interior")
        })
    }
}

impl TilePadder {
    /// Returns a new image on `dst_bounds`: interior equal to `src`, border
    /// wrapped periodically from it.
    pub fn padded_image<P: Pixel>(
        &self,
        src: &Image<P>,
        dst_bounds: Bounds,
    ) -> CowImageResult<Image<P>> {
        require_contained(src.bounds(), dst_bounds)?;
        require_source(src.bounds(), dst_bounds)?;
        let src_bounds = src.bounds();
        padded_image_with(src, dst_bounds, |point| {
            *src.pixel(wrap_point(src_bounds, point))
                .expect("wrapped point lies inside the source")
        })
    }

    /// Wraps the interior region `src_bounds` of `dst` into its border
    /// pixels; the interior is not touched.
    pub fn pad_image<P: Pixel>(&self, dst: &mut Image<P>, src_bounds: Bounds) -> CowImageResult<()> {
        require_contained(src_bounds, dst.bounds())?;
        require_source(src_bounds, dst.bounds())?;
        if dst.bounds() == src_bounds {
            return Ok(());
        }
        let interior = dst.sub_image_copy(src_bounds)?;
        pad_border_with(dst, src_bounds, |point| {
            *interior
                .pixel(wrap_point(src_bounds, point))
                .expect("wrapped point lies inside the interior")
        })
    }
}

fn require_contained(inner: Bounds, outer: Bounds) -> CowImageResult<()> {
    if !outer.contains_bounds(&inner) {
        return Err(CowImageError::BoundsNotContained { inner, outer });
    }
    Ok(())
}

/// Mirror and tile need at least one source pixel to synthesize a border.
fn require_source(src_bounds: Bounds, dst_bounds: Bounds) -> CowImageResult<()> {
    if src_bounds.is_empty() && !dst_bounds.is_empty() {
        return Err(CowImageError::EmptySource);
    }
    Ok(())
}

/// Builds the padded image: interior rows copied from `src`, everything
/// else synthesized by `border`.
fn padded_image_with<P: Pixel>(
    src: &Image<P>,
    dst_bounds: Bounds,
    border: impl Fn(Point) -> P,
) -> CowImageResult<Image<P>> {
    let src_bounds = src.bounds();
    let len = dst_bounds.area() as usize;
    let mut data = Vec::new();
    data.try_reserve_exact(len)
        .map_err(|_| CowImageError::AllocationFailed { pixels: len })?;

    for y in dst_bounds.min.y..=dst_bounds.max.y {
        if src_bounds.is_empty() || y < src_bounds.min.y || y > src_bounds.max.y {
            for x in dst_bounds.min.x..=dst_bounds.max.x {
                data.push(border(Point::new(x, y)));
            }
        } else {
            for x in dst_bounds.min.x..src_bounds.min.x {
                data.push(border(Point::new(x, y)));
            }
            let row = src
                .row((y - src_bounds.min.y) as usize)
                .expect("interior row lies inside the source");
            data.extend_from_slice(row);
            for x in src_bounds.max.x + 1..=dst_bounds.max.x {
                data.push(border(Point::new(x, y)));
            }
        }
    }

    trace_event!("padded_image", pixels = data.len());
    Image::from_pixels(dst_bounds, data)
}

/// Overwrites the border pixels of `dst` (outside `src_bounds`) with the
/// synthesized values; copy-on-write applies to `dst`.
fn pad_border_with<P: Pixel>(
    dst: &mut Image<P>,
    src_bounds: Bounds,
    border: impl Fn(Point) -> P,
) -> CowImageResult<()> {
    dst.make_unique()?;
    let dst_bounds = dst.bounds();
    for (index, y) in (dst_bounds.min.y..=dst_bounds.max.y).enumerate() {
        let row = dst.row_mut(index).expect("row index within destination");
        if src_bounds.is_empty() || y < src_bounds.min.y || y > src_bounds.max.y {
            for (i, x) in (dst_bounds.min.x..=dst_bounds.max.x).enumerate() {
                row[i] = border(Point::new(x, y));
            }
        } else {
            for x in dst_bounds.min.x..src_bounds.min.x {
                row[(x - dst_bounds.min.x) as usize] = border(Point::new(x, y));
            }
            for x in src_bounds.max.x + 1..=dst_bounds.max.x {
                row[(x - dst_bounds.min.x) as usize] = border(Point::new(x, y));
            }
        }
    }
    Ok(())
}

/// Reflects `v` into `[min, max]`, edge pixel included, folding as needed.
fn reflect_coord(v: i32, min: i32, max: i32) -> i32 {
    let n = i64::from(max - min + 1);
    let mut offset = (i64::from(v) - i64::from(min)).rem_euclid(2 * n);
    if offset >= n {
        offset = 2 * n - 1 - offset;
    }
    min + offset as i32
}

/// Wraps `v` periodically into `[min, max]`.
fn wrap_coord(v: i32, min: i32, max: i32) -> i32 {
    let n = i64::from(max - min + 1);
    min + (i64::from(v) - i64::from(min)).rem_euclid(n) as i32
}

fn reflect_point(bounds: Bounds, point: Point) -> Point {
    Point::new(
        reflect_coord(point.x, bounds.min.x, bounds.max.x),
        reflect_coord(point.y, bounds.min.y, bounds.max.y),
    )
}

fn wrap_point(bounds: Bounds, point: Point) -> Point {
    Point::new(
        wrap_coord(point.x, bounds.min.x, bounds.max.x),
        wrap_coord(point.y, bounds.min.y, bounds.max.y),
    )
}
