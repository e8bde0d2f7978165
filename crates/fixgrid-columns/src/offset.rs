#![forbid(unsafe_code)]

//! Pointer-to-column resolution.
//!
//! Works on *logical* table-local points (see
//! [`Direction::to_logical`](fixgrid_core::geometry::Direction::to_logical)),
//! so nothing here knows about mirrored layouts.
//!
//! The table's inline axis is split into three regions:
//!
//! ```text
//! 0 ── fixed_left_width ── fixed_right_start ── viewport_width
//! │  FixedLeft          │  Scrollable (+scroll_x) │  FixedRight │
//! ```
//!
//! A point is first mapped into its group's own coordinate space (only the
//! scrollable group is shifted by `scroll_x`), then matched against column
//! extents within that group.

use fixgrid_core::geometry::Point;

use crate::column::ColumnGroup;
use crate::store::LayoutSnapshot;

/// Result of hit-testing a point against the column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnHit {
    /// Display index of the column.
    pub index: usize,
    pub group: ColumnGroup,
    /// Position within the group's coordinate space.
    pub group_x: i32,
    /// Distance from the column's inline-start edge.
    pub within: u32,
    /// The point lies in the header row.
    pub in_header: bool,
    /// The point lies on the column's resize handle (resizable columns only).
    pub on_resize_handle: bool,
}

/// Map a logical x into `(group, x within group)`.
///
/// Returns `None` outside `[0, viewport_width)`.
#[must_use]
pub fn group_position(logical_x: i32, snapshot: &LayoutSnapshot) -> Option<(ColumnGroup, i32)> {
    let x = u32::try_from(logical_x).ok()?;
    if x >= snapshot.viewport_width {
        return None;
    }
    if x < snapshot.fixed_left_width {
        return Some((ColumnGroup::FixedLeft, logical_x));
    }
    let right_start = snapshot.fixed_right_start();
    if snapshot.fixed_right_width > 0 && x >= right_start {
        return Some((ColumnGroup::FixedRight, to_i32(x - right_start)));
    }
    let scrolled = i64::from(x - snapshot.fixed_left_width) + i64::from(snapshot.scroll_x);
    Some((ColumnGroup::Scrollable, scrolled.min(i64::from(i32::MAX)) as i32))
}

/// Column covering `group_x` within `group`, with the offset into it.
#[must_use]
pub fn column_at(snapshot: &LayoutSnapshot, group: ColumnGroup, group_x: i32) -> Option<(usize, u32)> {
    let x = u32::try_from(group_x).ok()?;
    let range = snapshot.group_range(group);
    let start = range.start;
    snapshot
        .group(group)
        .iter()
        .position(|layout| x >= layout.left && x < layout.right())
        .map(|i| (start + i, x - snapshot.columns()[start + i].left))
}

/// Resolve a logical point to a column and whether it grabs a resize handle.
///
/// With `header_only`, points below the header row miss. The resize band is
/// the last `handle_width` pixels of a resizable column.
#[must_use]
pub fn hit_test(
    point: Point,
    snapshot: &LayoutSnapshot,
    handle_width: u32,
    header_only: bool,
) -> Option<ColumnHit> {
    let y = u32::try_from(point.y).ok()?;
    if y >= snapshot.viewport_height {
        return None;
    }
    let in_header = y < snapshot.header_height;
    if header_only && !in_header {
        return None;
    }
    let (group, group_x) = group_position(point.x, snapshot)?;
    let (index, within) = column_at(snapshot, group, group_x)?;
    let column = &snapshot.columns()[index].column;
    let on_resize_handle =
        column.is_resizable() && within >= column.width.saturating_sub(handle_width);
    Some(ColumnHit {
        index,
        group,
        group_x,
        within,
        in_header,
        on_resize_handle,
    })
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
