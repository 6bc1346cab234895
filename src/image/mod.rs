//! Shared-buffer image containers with rectangular ROI views.
//!
//! An [`Image`] owns or shares one contiguous pixel allocation and presents a
//! rectangular region of it. `Clone` is a shallow copy: both images reference
//! the same buffer and the atomic reference count goes up by one. Mutation is
//! copy-on-write: every `&mut` pixel path first detaches from a shared
//! buffer via [`Image::make_unique`], so sharers never observe each other's
//! writes. Reads never detach.
//!
//! The buffer may be larger than the ROI; the pixels of a buffer row outside
//! the ROI's width are padding, skipped by the iterators and reported by
//! [`Image::padding`].

use std::sync::Arc;

use crate::format::{Pixel, PixelFormat, Sample};
use crate::geometry::{Bounds, Point};
use crate::matrix::RowMajorMatrix;
use crate::trace::trace_event;
use crate::util::{CowImageError, CowImageResult};

mod buffer;
mod iter;

pub use buffer::ReleaseHook;
pub use iter::{Pixels, PixelsMut};

use buffer::SharedBuffer;

/// Image container over a shared pixel buffer with an ROI view.
pub struct Image<P: Pixel> {
    /// Rectangle covered by the full allocation.
    buffer_bounds: Bounds,
    /// Logical ROI, always contained in `buffer_bounds`.
    bounds: Bounds,
    buffer: Arc<SharedBuffer<P>>,
}

impl<P: Pixel> Image<P> {
    /// An image with no pixels.
    pub fn empty() -> Self {
        Self {
            buffer_bounds: Bounds::empty(),
            bounds: Bounds::empty(),
            buffer: Arc::new(SharedBuffer::owned(Vec::new())),
        }
    }

    /// Allocates a `width` x `height` image at the origin, default-initialized.
    pub fn new(width: i32, height: i32) -> CowImageResult<Self> {
        Self::with_bounds(Bounds::with_size(Point::new(0, 0), width, height))
    }

    /// Allocates an image covering `bounds`, default-initialized.
    pub fn with_bounds(bounds: Bounds) -> CowImageResult<Self> {
        Self::filled(bounds, P::default())
    }

    /// Allocates an image covering `bounds` with every pixel set to `value`.
    pub fn filled(bounds: Bounds, value: P) -> CowImageResult<Self> {
        P::FORMAT.check_storage::<P>()?;
        let len = bounds.area() as usize;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| CowImageError::AllocationFailed { pixels: len })?;
        data.resize(len, value);
        Ok(Self::from_owned_buffer(bounds, data))
    }

    /// Copies pixels out of `pixels` into a freshly allocated image.
    ///
    /// `pixels` must hold at least `bounds.area()` values in row-major order
    /// without inter-row padding; extra values are ignored.
    pub fn from_slice(bounds: Bounds, pixels: &[P]) -> CowImageResult<Self> {
        P::FORMAT.check_storage::<P>()?;
        let needed = bounds.area() as usize;
        if pixels.len() < needed {
            return Err(CowImageError::BufferTooSmall {
                needed,
                got: pixels.len(),
            });
        }
        let mut data = Vec::new();
        data.try_reserve_exact(needed)
            .map_err(|_| CowImageError::AllocationFailed { pixels: needed })?;
        data.extend_from_slice(&pixels[..needed]);
        Ok(Self::from_owned_buffer(bounds, data))
    }

    /// Takes ownership of `pixels` as the image buffer.
    ///
    /// Same layout requirements as [`Image::from_slice`]; the memory is
    /// freed through the usual `Vec` deallocation once the last sharer drops.
    pub fn from_pixels(bounds: Bounds, pixels: Vec<P>) -> CowImageResult<Self> {
        P::FORMAT.check_storage::<P>()?;
        let needed = bounds.area() as usize;
        if pixels.len() < needed {
            return Err(CowImageError::BufferTooSmall {
                needed,
                got: pixels.len(),
            });
        }
        Ok(Self::from_owned_buffer(bounds, pixels))
    }

    /// Aliases caller memory without taking ownership.
    ///
    /// The crate never frees the memory; attach a notification with
    /// [`Image::set_release_callback`] if the owner needs to know when the
    /// last sharer is gone.
    ///
    /// # Safety
    ///
    /// `ptr` must point to `len` initialized `P` values, properly aligned,
    /// valid and not accessed through any other path for the lifetime of
    /// this image and every copy sharing its buffer.
    pub unsafe fn from_raw_parts(bounds: Bounds, ptr: *mut P, len: usize) -> CowImageResult<Self> {
        P::FORMAT.check_storage::<P>()?;
        let needed = bounds.area() as usize;
        if len < needed {
            return Err(CowImageError::BufferTooSmall { needed, got: len });
        }
        Ok(Self {
            buffer_bounds: bounds,
            bounds,
            buffer: Arc::new(SharedBuffer::foreign(ptr, len)),
        })
    }

    fn from_owned_buffer(bounds: Bounds, data: Vec<P>) -> Self {
        Self {
            buffer_bounds: bounds,
            bounds,
            buffer: Arc::new(SharedBuffer::owned(data)),
        }
    }

    /// Shared view restricted to `sub`, which must lie inside the ROI.
    ///
    /// The view references the same buffer (reference count + 1) and sees
    /// the same pixel values at every coordinate of `sub`.
    pub fn sub_image(&self, sub: Bounds) -> CowImageResult<Self> {
        if !self.bounds.contains_bounds(&sub) {
            return Err(CowImageError::BoundsNotContained {
                inner: sub,
                outer: self.bounds,
            });
        }
        Ok(Self {
            buffer_bounds: self.buffer_bounds,
            bounds: sub,
            buffer: Arc::clone(&self.buffer),
        })
    }

    /// Private copy of the region `sub`, which must lie inside the ROI.
    pub fn sub_image_copy(&self, sub: Bounds) -> CowImageResult<Self> {
        if !self.bounds.contains_bounds(&sub) {
            return Err(CowImageError::BoundsNotContained {
                inner: sub,
                outer: self.bounds,
            });
        }
        let data = self.copy_region(sub)?;
        Ok(Self::from_owned_buffer(sub, data))
    }

    /// Shared view of `row_count` ROI rows starting at row index `first_row`.
    ///
    /// Row indices are relative to the ROI's top row.
    pub fn row_band(&self, first_row: i32, row_count: i32) -> CowImageResult<Self> {
        let band = Bounds::with_size(
            Point::new(self.bounds.min.x, self.bounds.min.y + first_row),
            self.width(),
            row_count,
        );
        self.sub_image(band)
    }

    /// Full private copy of the ROI into a fresh contiguous buffer.
    ///
    /// The copy starts with a reference count of 1 and no release callback.
    pub fn deep_copy(&self) -> CowImageResult<Self> {
        let data = self.copy_region(self.bounds)?;
        Ok(Self::from_owned_buffer(self.bounds, data))
    }

    /// Element-wise format-converting copy.
    pub fn convert<Q>(&self) -> CowImageResult<Image<Q>>
    where
        P: Sample,
        Q: Sample,
    {
        self.convert_with(|p| Q::from_f64(p.to_f64()))
    }

    /// Element-wise converting copy with a numeric scale factor.
    pub fn convert_scaled<Q>(&self, scale: f64) -> CowImageResult<Image<Q>>
    where
        P: Sample,
        Q: Sample,
    {
        self.convert_with(|p| Q::from_f64(p.to_f64() * scale))
    }

    /// Per-pixel converting copy with a caller-supplied conversion.
    pub fn convert_with<Q: Pixel>(&self, mut f: impl FnMut(P) -> Q) -> CowImageResult<Image<Q>> {
        Q::FORMAT.check_storage::<Q>()?;
        let len = self.len();
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| CowImageError::AllocationFailed { pixels: len })?;
        for index in 0..self.height() as usize {
            let row = self.row(index).expect("row index within ROI height");
            data.extend(row.iter().map(|&p| f(p)));
        }
        Ok(Image::<Q>::from_owned_buffer(self.bounds, data))
    }

    /// Builds an image from a row-major numeric matrix, origin at (0, 0).
    pub fn from_matrix<M>(matrix: &M) -> CowImageResult<Self>
    where
        M: RowMajorMatrix,
        M::Elem: Sample,
        P: Sample,
    {
        let rows = matrix.rows();
        let cols = matrix.cols();
        if rows == 0 || cols == 0 {
            return Ok(Self::empty());
        }
        if rows > i32::MAX as usize || cols > i32::MAX as usize {
            return Err(CowImageError::InvalidMatrix { rows, cols });
        }
        P::FORMAT.check_storage::<P>()?;
        let len = rows * cols;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| CowImageError::AllocationFailed { pixels: len })?;
        for r in 0..rows {
            for c in 0..cols {
                data.push(P::from_f64(matrix.get(r, c).to_f64()));
            }
        }
        let bounds = Bounds::with_size(Point::new(0, 0), cols as i32, rows as i32);
        Ok(Self::from_owned_buffer(bounds, data))
    }

    /// Converts the ROI into a row-major numeric matrix.
    pub fn to_matrix<M>(&self) -> M
    where
        M: RowMajorMatrix,
        M::Elem: Sample,
        P: Sample,
    {
        M::from_fn(self.height() as usize, self.width() as usize, |r, c| {
            let row = self.row(r).expect("row index within ROI height");
            M::Elem::from_f64(row[c].to_f64())
        })
    }

    /// The packed format descriptor of this image's pixel type.
    pub fn pixel_format(&self) -> PixelFormat {
        P::FORMAT
    }

    /// The logical ROI.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The rectangle covered by the full allocation.
    pub fn buffer_bounds(&self) -> Bounds {
        self.buffer_bounds
    }

    /// ROI width in pixels.
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    /// ROI height in pixels.
    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    /// Number of pixels in the ROI.
    pub fn len(&self) -> usize {
        self.bounds.area() as usize
    }

    /// True iff the ROI contains no pixels.
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Buffer width in pixels.
    pub fn buffer_width(&self) -> i32 {
        self.buffer_bounds.width()
    }

    /// Buffer height in pixels.
    pub fn buffer_height(&self) -> i32 {
        self.buffer_bounds.height()
    }

    /// Buffer pixels per row outside the ROI's width.
    pub fn padding(&self) -> i32 {
        self.buffer_width() - self.width()
    }

    /// True iff the ROI's pixels form one contiguous run in the buffer.
    pub fn pixels_are_contiguous(&self) -> bool {
        self.padding() == 0 || self.height() <= 1
    }

    /// Number of live images sharing this buffer.
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.buffer)
    }

    /// True iff no other image shares this buffer.
    pub fn is_unique(&self) -> bool {
        self.ref_count() == 1
    }

    /// The full allocation, including pixels outside the ROI.
    pub fn buffer(&self) -> &[P] {
        self.buffer.as_slice()
    }

    /// Reference to the ROI's first pixel, `None` when empty.
    pub fn first_pixel(&self) -> Option<&P> {
        if self.is_empty() {
            return None;
        }
        Some(&self.buffer.as_slice()[self.index_of(self.bounds.min)])
    }

    /// The pixel at `point`, `None` outside the ROI.
    pub fn pixel(&self, point: Point) -> Option<&P> {
        if !self.bounds.contains(point) {
            return None;
        }
        Some(&self.buffer.as_slice()[self.index_of(point)])
    }

    /// Address of the pixel at `point`.
    ///
    /// While buffers are shared, sub-image and source agree on the address
    /// of every coordinate both can see.
    pub fn pixel_ptr(&self, point: Point) -> CowImageResult<*const P> {
        if !self.bounds.contains(point) {
            return Err(CowImageError::CoordinatesOutOfBounds {
                point,
                bounds: self.bounds,
            });
        }
        Ok(self.buffer.as_ptr().wrapping_add(self.index_of(point)))
    }

    /// Inverse of [`Image::pixel_ptr`]: maps a buffer address back to
    /// coordinates.
    ///
    /// Fails when `ptr` lies outside the allocation or is not aligned to a
    /// pixel boundary.
    pub fn coordinates(&self, ptr: *const P) -> CowImageResult<Point> {
        let base = self.buffer.as_ptr() as usize;
        let addr = ptr as usize;
        let pixel_size = std::mem::size_of::<P>();
        let span = (self.buffer_bounds.area() as usize) * pixel_size;
        if addr < base || addr >= base + span {
            return Err(CowImageError::PointerOutOfBuffer);
        }
        let byte_offset = addr - base;
        if byte_offset % pixel_size != 0 {
            return Err(CowImageError::PointerMisaligned);
        }
        let index = byte_offset / pixel_size;
        let stride = self.buffer_width() as usize;
        Ok(Point::new(
            self.buffer_bounds.min.x + (index % stride) as i32,
            self.buffer_bounds.min.y + (index / stride) as i32,
        ))
    }

    /// Contiguous slice of ROI row `index` (0 is the ROI's top row).
    pub fn row(&self, index: usize) -> Option<&[P]> {
        if index >= self.height() as usize {
            return None;
        }
        let start = self.index_of(Point::new(
            self.bounds.min.x,
            self.bounds.min.y + index as i32,
        ));
        Some(&self.buffer.as_slice()[start..start + self.width() as usize])
    }

    /// Iterator over the ROI's pixels in row-major order, skipping padding.
    pub fn pixels(&self) -> Pixels<'_, P> {
        Pixels::new(self)
    }

    /// Mutable iterator over the ROI's pixels.
    ///
    /// Detaches from a shared buffer first (copy-on-write), which can fail
    /// on allocation exhaustion.
    pub fn pixels_mut(&mut self) -> CowImageResult<PixelsMut<'_, P>> {
        self.make_unique()?;
        Ok(PixelsMut::new(self))
    }

    /// Detaches from a shared buffer by copying exactly the ROI's pixels
    /// into a fresh, exclusively owned contiguous allocation.
    ///
    /// No-op when the buffer is not shared. Afterwards the buffer covers
    /// just the ROI (`padding() == 0`) and carries no release callback.
    pub fn make_unique(&mut self) -> CowImageResult<()> {
        if self.is_unique() {
            return Ok(());
        }
        let data = self.copy_region(self.bounds)?;
        trace_event!("cow_detach", pixels = data.len());
        self.buffer = Arc::new(SharedBuffer::owned(data));
        self.buffer_bounds = self.bounds;
        Ok(())
    }

    /// Attaches the hook fired with the buffer address exactly once, when
    /// the reference count reaches zero.
    ///
    /// Intended for images aliasing externally owned memory. The hook is
    /// shared with shallow copies of this image but deliberately **not
    /// propagated** to private copies (`deep_copy`, `make_unique`,
    /// `sub_image_copy`, the converting constructors): those detach to a
    /// fresh buffer, and inheriting the hook would notify the external
    /// owner once per fan-out copy instead of exactly once.
    pub fn set_release_callback(&self, hook: impl FnOnce(*const P) + Send + 'static) {
        self.buffer.set_release(Some(Box::new(hook)));
    }

    /// Sets every ROI pixel to `value` (copy-on-write applies).
    pub fn fill(&mut self, value: P) -> CowImageResult<()> {
        self.make_unique()?;
        for index in 0..self.height() as usize {
            self.row_mut(index)
                .expect("row index within ROI height")
                .fill(value);
        }
        Ok(())
    }

    /// Mutable pixel access at `point` (copy-on-write applies).
    pub fn pixel_mut(&mut self, point: Point) -> CowImageResult<&mut P> {
        if !self.bounds.contains(point) {
            return Err(CowImageError::CoordinatesOutOfBounds {
                point,
                bounds: self.bounds,
            });
        }
        self.make_unique()?;
        let index = self.index_of(point);
        Ok(&mut self.buffer_mut()[index])
    }

    /// Translates the reported coordinate frame so the ROI starts at
    /// `new_min`; same buffer, same pixel values, no reallocation.
    pub fn moved_to(&mut self, new_min: Point) -> &mut Self {
        let dx = new_min.x - self.bounds.min.x;
        let dy = new_min.y - self.bounds.min.y;
        self.bounds = self.bounds.translated_to(new_min);
        self.buffer_bounds = self
            .buffer_bounds
            .translated_to(self.buffer_bounds.min.translated(dx, dy));
        self
    }

    /// O(1) exchange of the two images' bounds and buffer handles.
    ///
    /// Neither reference count changes and nothing is allocated.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// Buffer index of the pixel at `point`; `point` must lie in
    /// `buffer_bounds`.
    pub(crate) fn index_of(&self, point: Point) -> usize {
        let stride = self.buffer_width() as usize;
        (point.y - self.buffer_bounds.min.y) as usize * stride
            + (point.x - self.buffer_bounds.min.x) as usize
    }

    /// Whole-allocation mutable access; callers must hold the only buffer
    /// reference (run [`Image::make_unique`] first).
    pub(crate) fn buffer_mut(&mut self) -> &mut [P] {
        Arc::get_mut(&mut self.buffer)
            .expect("buffer is unique after make_unique")
            .as_mut_slice()
    }

    /// Mutable slice of ROI row `index`; same uniqueness contract as
    /// [`Image::buffer_mut`].
    pub(crate) fn row_mut(&mut self, index: usize) -> Option<&mut [P]> {
        if index >= self.height() as usize {
            return None;
        }
        let start = self.index_of(Point::new(
            self.bounds.min.x,
            self.bounds.min.y + index as i32,
        ));
        let width = self.width() as usize;
        Some(&mut self.buffer_mut()[start..start + width])
    }

    /// Copies `region` (which must lie in the buffer) into a fresh
    /// contiguous vector.
    fn copy_region(&self, region: Bounds) -> CowImageResult<Vec<P>> {
        let len = region.area() as usize;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| CowImageError::AllocationFailed { pixels: len })?;
        let width = region.width() as usize;
        let buffer = self.buffer.as_slice();
        for y in region.min.y..=region.max.y {
            let start = self.index_of(Point::new(region.min.x, y));
            data.extend_from_slice(&buffer[start..start + width]);
        }
        Ok(data)
    }
}

/// Shallow copy: shares the buffer and bumps the reference count.
impl<P: Pixel> Clone for Image<P> {
    fn clone(&self) -> Self {
        Self {
            buffer_bounds: self.buffer_bounds,
            bounds: self.bounds,
            buffer: Arc::clone(&self.buffer),
        }
    }
}

/// Value equality: same bounds, same format, same visible pixels. Buffer
/// identity and sharing are irrelevant.
impl<P: Pixel> PartialEq for Image<P> {
    fn eq(&self, other: &Self) -> bool {
        self.bounds == other.bounds && self.pixels().eq(other.pixels())
    }
}

impl<P: Pixel> std::fmt::Debug for Image<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("bounds", &self.bounds)
            .field("buffer_bounds", &self.buffer_bounds)
            .field("format", &P::FORMAT)
            .field("ref_count", &self.ref_count())
            .field("owns_memory", &self.buffer.owns_memory())
            .finish()
    }
}

impl<'a, P: Pixel> IntoIterator for &'a Image<P> {
    type Item = &'a P;
    type IntoIter = Pixels<'a, P>;

    fn into_iter(self) -> Pixels<'a, P> {
        self.pixels()
    }
}
