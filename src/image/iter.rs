//! Forward iterators over exactly the pixels of an image's ROI.
//!
//! Both iterators walk the ROI in row-major order and skip the inter-row
//! padding that belongs to the larger buffer. Bulk advance (`nth`) resolves
//! by row/column arithmetic in constant time instead of repeated stepping.
//! Exhaustion is the end sentinel: once `next` returns `None` the iterator
//! stays exhausted, and `ExactSizeIterator::len` reports the remaining count
//! without traversal.

use crate::format::Pixel;
use crate::geometry::Point;
use crate::image::Image;

/// Iterator over shared references to the ROI's pixels.
///
/// Holds a non-owning back-reference to its image for introspection
/// ([`Pixels::image`], [`Pixels::coordinates`]); the borrow it carries is
/// what keeps the buffer from being reallocated or dropped underneath it.
#[derive(Clone)]
pub struct Pixels<'a, P: Pixel> {
    image: &'a Image<P>,
    slice: &'a [P],
    /// Absolute index of the current pixel in the buffer.
    offset: usize,
    /// Absolute index one past the current row's last ROI pixel.
    row_end: usize,
    /// Absolute index one past the last ROI pixel of the last row.
    end: usize,
    /// Absolute index of the ROI's first pixel.
    first: usize,
    /// Contiguous pixels per row (ROI width).
    run: usize,
    /// Buffer pixels skipped between consecutive rows.
    padding: usize,
    /// Total ROI pixel count.
    total: usize,
}

impl<'a, P: Pixel> Pixels<'a, P> {
    pub(crate) fn new(image: &'a Image<P>) -> Self {
        let slice = image.buffer();
        if image.is_empty() {
            return Self {
                image,
                slice,
                offset: 0,
                row_end: 0,
                end: 0,
                first: 0,
                run: 0,
                padding: 0,
                total: 0,
            };
        }
        let stride = image.buffer_width() as usize;
        let run = image.width() as usize;
        let rows = image.height() as usize;
        let first = image.index_of(image.bounds().min);
        Self {
            image,
            slice,
            offset: first,
            row_end: first + run,
            end: first + (rows - 1) * stride + run,
            first,
            run,
            padding: stride - run,
            total: run * rows,
        }
    }

    fn stride(&self) -> usize {
        self.run + self.padding
    }

    /// Pixels consumed so far.
    fn consumed(&self) -> usize {
        if self.offset == self.end {
            return self.total;
        }
        let rel = self.offset - self.first;
        (rel / self.stride()) * self.run + rel % self.stride()
    }

    /// The image this iterator traverses.
    pub fn image(&self) -> &'a Image<P> {
        self.image
    }

    /// Coordinates of the pixel `next` would yield, `None` once exhausted.
    pub fn coordinates(&self) -> Option<Point> {
        if self.offset == self.end {
            return None;
        }
        let rel = self.offset - self.first;
        let min = self.image.bounds().min;
        Some(Point::new(
            min.x + (rel % self.stride()) as i32,
            min.y + (rel / self.stride()) as i32,
        ))
    }
}

/// Position equality; only meaningful between iterators of the same image.
impl<P: Pixel> PartialEq for Pixels<'_, P> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.slice.as_ptr(), other.slice.as_ptr()) && self.offset == other.offset
    }
}

impl<P: Pixel> std::fmt::Debug for Pixels<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pixels")
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}

impl<'a, P: Pixel> Iterator for Pixels<'a, P> {
    type Item = &'a P;

    fn next(&mut self) -> Option<&'a P> {
        if self.offset == self.end {
            return None;
        }
        let pixel = &self.slice[self.offset];
        self.offset += 1;
        if self.offset == self.row_end && self.offset != self.end {
            self.offset += self.padding;
            self.row_end = self.offset + self.run;
        }
        Some(pixel)
    }

    fn nth(&mut self, n: usize) -> Option<&'a P> {
        let consumed = self.consumed();
        if n >= self.total - consumed {
            self.offset = self.end;
            return None;
        }
        let target = consumed + n;
        let row_start = self.first + (target / self.run) * self.stride();
        self.offset = row_start + target % self.run;
        self.row_end = row_start + self.run;
        self.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.consumed();
        (left, Some(left))
    }
}

impl<P: Pixel> ExactSizeIterator for Pixels<'_, P> {}
impl<P: Pixel> std::iter::FusedIterator for Pixels<'_, P> {}

/// Iterator over mutable references to the ROI's pixels.
///
/// Created by [`Image::pixels_mut`], which detaches a shared buffer first
/// (copy-on-write). Implemented by slice splitting, so it carries no image
/// back-reference; [`PixelsMut::coordinates`] is still available.
pub struct PixelsMut<'a, P: Pixel> {
    /// Buffer tail from the current pixel through the last row's end.
    rest: &'a mut [P],
    /// Pixels remaining in the current row.
    in_row: usize,
    /// Full rows after the current one.
    rows_left: usize,
    run: usize,
    padding: usize,
    consumed: usize,
    total: usize,
    origin: Point,
}

impl<'a, P: Pixel> PixelsMut<'a, P> {
    pub(crate) fn new(image: &'a mut Image<P>) -> Self {
        if image.is_empty() {
            return Self {
                rest: &mut [],
                in_row: 0,
                rows_left: 0,
                run: 0,
                padding: 0,
                consumed: 0,
                total: 0,
                origin: Point::new(0, 0),
            };
        }
        let stride = image.buffer_width() as usize;
        let run = image.width() as usize;
        let rows = image.height() as usize;
        let origin = image.bounds().min;
        let first = image.index_of(origin);
        let end = first + (rows - 1) * stride + run;
        let rest = &mut image.buffer_mut()[first..end];
        Self {
            rest,
            in_row: run,
            rows_left: rows - 1,
            run,
            padding: stride - run,
            consumed: 0,
            total: run * rows,
            origin,
        }
    }

    /// Coordinates of the pixel `next` would yield, `None` once exhausted.
    pub fn coordinates(&self) -> Option<Point> {
        if self.consumed >= self.total {
            return None;
        }
        Some(Point::new(
            self.origin.x + (self.consumed % self.run) as i32,
            self.origin.y + (self.consumed / self.run) as i32,
        ))
    }
}

impl<'a, P: Pixel> Iterator for PixelsMut<'a, P> {
    type Item = &'a mut P;

    fn next(&mut self) -> Option<&'a mut P> {
        if self.in_row == 0 {
            if self.rows_left == 0 {
                return None;
            }
            self.rows_left -= 1;
            self.in_row = self.run;
            let rest = std::mem::take(&mut self.rest);
            self.rest = &mut rest[self.padding..];
        }
        let rest = std::mem::take(&mut self.rest);
        let (head, tail) = rest.split_first_mut()?;
        self.rest = tail;
        self.in_row -= 1;
        self.consumed += 1;
        Some(head)
    }

    fn nth(&mut self, n: usize) -> Option<&'a mut P> {
        if n >= self.total - self.consumed {
            self.rest = &mut [];
            self.in_row = 0;
            self.rows_left = 0;
            self.consumed = self.total;
            return None;
        }
        if n > 0 {
            let skip = if n < self.in_row {
                self.in_row -= n;
                n
            } else {
                let ahead = n - self.in_row;
                let rows = ahead / self.run;
                let col = ahead % self.run;
                let skip =
                    self.in_row + self.padding + rows * (self.run + self.padding) + col;
                self.rows_left -= rows + 1;
                self.in_row = self.run - col;
                skip
            };
            let rest = std::mem::take(&mut self.rest);
            self.rest = &mut rest[skip..];
            self.consumed += n;
        }
        self.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.consumed;
        (left, Some(left))
    }
}

impl<P: Pixel> ExactSizeIterator for PixelsMut<'_, P> {}
impl<P: Pixel> std::iter::FusedIterator for PixelsMut<'_, P> {}
