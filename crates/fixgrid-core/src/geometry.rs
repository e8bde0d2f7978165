#![forbid(unsafe_code)]

//! Geometric primitives in table-local pixel space.
//!
//! Host pointer events arrive in client coordinates. [`Direction`] is the one
//! place where mirrored (right-to-left) layouts are handled: it maps client
//! points into *logical* table-local points whose x axis always grows from the
//! table's inline-start edge, and back again. Everything downstream works in
//! logical space only.

use serde::{Deserialize, Serialize};

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - origin`.
    #[inline]
    #[must_use]
    pub const fn delta_from(self, origin: Point) -> (i32, i32) {
        (
            self.x.saturating_sub(origin.x),
            self.y.saturating_sub(origin.y),
        )
    }
}

/// A rectangle for table bounds, viewport regions, and hit testing.
///
/// Edges follow the half-open convention: `x..x + width`, `y..y + height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(extent(self.width))
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(extent(self.height))
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

/// Inline direction of the table layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Columns run from the left edge of the table.
    #[default]
    Ltr,
    /// Columns run from the right edge of the table (mirrored).
    Rtl,
}

impl Direction {
    /// Map a client-space point into logical table-local space.
    ///
    /// Logical x is measured from the inline-start edge of `bounds`; logical y
    /// from its top edge. Under [`Direction::Rtl`] the inline-start edge is the
    /// right edge, so x is mirrored.
    #[inline]
    #[must_use]
    pub const fn to_logical(self, client: Point, bounds: Rect) -> Point {
        let x = match self {
            Self::Ltr => client.x.saturating_sub(bounds.x),
            Self::Rtl => bounds.right().saturating_sub(client.x),
        };
        Point::new(x, client.y.saturating_sub(bounds.y))
    }

    /// Inverse of [`to_logical`](Self::to_logical).
    #[inline]
    #[must_use]
    pub const fn to_client(self, logical: Point, bounds: Rect) -> Point {
        let x = match self {
            Self::Ltr => bounds.x.saturating_add(logical.x),
            Self::Rtl => bounds.right().saturating_sub(logical.x),
        };
        Point::new(x, bounds.y.saturating_add(logical.y))
    }

    /// Map a logical horizontal delta to a client-space delta.
    #[inline]
    #[must_use]
    pub const fn client_dx(self, logical_dx: i32) -> i32 {
        match self {
            Self::Ltr => logical_dx,
            Self::Rtl => logical_dx.saturating_neg(),
        }
    }

    /// Whether this is the mirrored layout.
    #[inline]
    #[must_use]
    pub const fn is_rtl(self) -> bool {
        matches!(self, Self::Rtl)
    }
}

/// Offset of a pointer relative to the table's content origin.
///
/// Converts `client` into logical space, adds the horizontal scroll offset,
/// and clamps the result to `[0, total_scroll_width]`.
/// For hosts that map raw pointer positions themselves; the column
/// controller resolves hits through `fixgrid_columns::offset::hit_test`.
#[must_use]
pub fn content_offset(
    client: Point,
    bounds: Rect,
    direction: Direction,
    scroll_x: u32,
    total_scroll_width: u32,
) -> u32 {
    let logical = direction.to_logical(client, bounds);
    let offset = i64::from(logical.x) + i64::from(scroll_x);
    offset.clamp(0, i64::from(total_scroll_width)) as u32
}

#[inline]
const fn extent(len: u32) -> i32 {
    if len > i32::MAX as u32 {
        i32::MAX
    } else {
        len as i32
    }
}
