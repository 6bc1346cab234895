//! Axis-aligned points and rectangles on the integer pixel grid.
//!
//! `Bounds` stores an inclusive min/max coordinate pair: a single pixel has
//! `min == max`, and the rectangle is empty iff `min > max` on either axis.
//! Widths and heights are derived, never stored.

/// Integer pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
}

impl Point {
    /// Creates a point from its coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns this point translated by `(dx, dy)`.
    pub const fn translated(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Inclusive axis-aligned rectangle of pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Bounds {
    /// Smallest contained coordinates.
    pub min: Point,
    /// Largest contained coordinates.
    pub max: Point,
}

impl Bounds {
    /// Creates bounds from inclusive corner points.
    pub const fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// Creates bounds with the given origin and size.
    ///
    /// Zero or negative sizes produce empty bounds.
    pub const fn with_size(min: Point, width: i32, height: i32) -> Self {
        Self {
            min,
            max: Point::new(min.x + width - 1, min.y + height - 1),
        }
    }

    /// Canonical empty bounds at the origin.
    pub const fn empty() -> Self {
        Self {
            min: Point::new(0, 0),
            max: Point::new(-1, -1),
        }
    }

    /// True iff the rectangle contains no pixels.
    pub const fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Number of pixel columns (0 when empty).
    pub const fn width(&self) -> i32 {
        if self.is_empty() {
            0
        } else {
            self.max.x - self.min.x + 1
        }
    }

    /// Number of pixel rows (0 when empty).
    pub const fn height(&self) -> i32 {
        if self.is_empty() {
            0
        } else {
            self.max.y - self.min.y + 1
        }
    }

    /// Number of contained pixels.
    pub const fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    /// True iff `point` lies inside the rectangle.
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    /// True iff `other` lies fully inside the rectangle (empty bounds always do).
    pub const fn contains_bounds(&self, other: &Bounds) -> bool {
        other.is_empty()
            || (self.contains(other.min) && self.contains(other.max))
    }

    /// Returns same-size bounds whose minimum corner is `new_min`.
    pub const fn translated_to(&self, new_min: Point) -> Self {
        let dx = new_min.x - self.min.x;
        let dy = new_min.y - self.min.y;
        Self {
            min: new_min,
            max: Point::new(self.max.x + dx, self.max.y + dy),
        }
    }

    /// Returns these bounds grown outward by `border` pixels on every side.
    pub const fn grown(&self, border: i32) -> Self {
        Self {
            min: Point::new(self.min.x - border, self.min.y - border),
            max: Point::new(self.max.x + border, self.max.y + border),
        }
    }
}
