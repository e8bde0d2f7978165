#![forbid(unsafe_code)]

//! Gesture commit: final widths, reorder slots, and the emitted events.
//!
//! Resize: `new_width = clamp(original_width + offset, min_width, max_width)`.
//!
//! Reorder: the dragged column's *leading edge* (trailing edge when moving
//! toward the inline end, start edge when moving toward the inline start) is
//! compared with the midpoints of the columns it travels over, in their
//! original positions. Every midpoint crossed moves the insertion slot one
//! column further. Only columns of the dragged column's group participate.
//! All comparisons are done on doubled coordinates, so odd widths never
//! round.

use fixgrid_core::event::CancelReason;
use serde::{Deserialize, Serialize};

use crate::column::{Column, ColumnKey};
use crate::config::ReorderTieBreak;
use crate::drag::DragKind;
use crate::store::{ColumnLayout, LayoutSnapshot};

/// Event emitted to the host at gesture boundaries.
///
/// A completed gesture emits exactly one `ResizeEnd` or `ReorderEnd`; a
/// cancelled one emits `Cancelled` and never a terminal `*End`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ColumnEvent {
    ResizeStart {
        column_key: ColumnKey,
    },
    ResizeEnd {
        new_width: u32,
        column_key: ColumnKey,
    },
    ReorderStart {
        column_key: ColumnKey,
    },
    ReorderEnd(ColumnReorderEnd),
    Cancelled {
        column_key: ColumnKey,
        kind: DragKind,
        reason: CancelReason,
    },
}

impl ColumnEvent {
    /// Whether this event completes a gesture.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ResizeEnd { .. } | Self::ReorderEnd(_))
    }
}

/// Payload of a completed reorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnReorderEnd {
    /// Group neighbor preceding the dropped column, if any.
    pub column_before: Option<ColumnKey>,
    /// Group neighbor following the dropped column, if any.
    pub column_after: Option<ColumnKey>,
    /// The dragged column.
    pub reorder_column: ColumnKey,
    /// Every column key in the resulting display order.
    pub order: Vec<ColumnKey>,
}

/// Live displacement of one column during a reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnShift {
    pub column_key: ColumnKey,
    /// Logical horizontal displacement from the column's resting position.
    pub dx: i32,
}

/// Live state of an in-flight reorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReorderPreview {
    pub column_key: ColumnKey,
    pub offset: i32,
    /// Display index before the gesture.
    pub from_index: usize,
    /// Display index the column would land on if released now.
    pub target_index: usize,
    /// Displacement of every column in the dragged column's group.
    pub shifts: Vec<ColumnShift>,
}

/// Width a resize with `offset` commits to.
#[must_use]
pub fn resized_width(column: &Column, offset: i32) -> u32 {
    column.clamp(i64::from(column.width) + i64::from(offset))
}

/// Terminal event for a finished resize.
#[must_use]
pub fn commit_resize(column: &Column, offset: i32) -> ColumnEvent {
    ColumnEvent::ResizeEnd {
        new_width: resized_width(column, offset),
        column_key: column.key.clone(),
    }
}

/// Insertion slot, as an index within `group`, for dragging `group[dragged]`
/// by `offset`.
#[must_use]
pub fn reorder_target(
    group: &[ColumnLayout],
    dragged: usize,
    offset: i32,
    tie_break: ReorderTieBreak,
) -> usize {
    let Some(moving) = group.get(dragged) else {
        return dragged;
    };
    let offset = i64::from(offset);
    let crosses = |lead2: i64, mid2: i64, forward: bool| {
        let passed = if forward { lead2 > mid2 } else { lead2 < mid2 };
        passed || (lead2 == mid2 && tie_break == ReorderTieBreak::TowardTravel)
    };
    let midpoint2 = |layout: &ColumnLayout| 2 * i64::from(layout.left) + i64::from(layout.column.width);

    let mut target = dragged;
    if offset > 0 {
        let lead2 = 2 * (i64::from(moving.right()) + offset);
        for (j, other) in group.iter().enumerate().skip(dragged + 1) {
            if !crosses(lead2, midpoint2(other), true) {
                break;
            }
            target = j;
        }
    } else if offset < 0 {
        let lead2 = 2 * (i64::from(moving.left) + offset);
        for (j, other) in group.iter().enumerate().take(dragged).rev() {
            if !crosses(lead2, midpoint2(other), false) {
                break;
            }
            target = j;
        }
    }
    target
}

/// Live reorder state for dragging `key` by `offset` in `snapshot`.
#[must_use]
pub fn reorder_preview(
    snapshot: &LayoutSnapshot,
    key: &ColumnKey,
    offset: i32,
    tie_break: ReorderTieBreak,
) -> Option<ReorderPreview> {
    let from_index = snapshot.column_index(key)?;
    let layout = &snapshot.columns()[from_index];
    let range = snapshot.group_range(layout.group);
    let group = snapshot.group(layout.group);
    let local = from_index - range.start;
    let target = reorder_target(group, local, offset, tie_break);
    let width = i32::try_from(layout.column.width).unwrap_or(i32::MAX);

    let shifts = group
        .iter()
        .enumerate()
        .map(|(j, other)| {
            let dx = if j == local {
                offset
            } else if local < j && j <= target {
                -width
            } else if target <= j && j < local {
                width
            } else {
                0
            };
            ColumnShift {
                column_key: other.column.key.clone(),
                dx,
            }
        })
        .collect();

    Some(ReorderPreview {
        column_key: key.clone(),
        offset,
        from_index,
        target_index: range.start + target,
        shifts,
    })
}

/// Terminal payload for releasing a reorder of `key` at `offset`.
#[must_use]
pub fn commit_reorder(
    snapshot: &LayoutSnapshot,
    key: &ColumnKey,
    offset: i32,
    tie_break: ReorderTieBreak,
) -> Option<ColumnReorderEnd> {
    let preview = reorder_preview(snapshot, key, offset, tie_break)?;
    let range = snapshot.group_range(snapshot.columns()[preview.from_index].group);

    let mut order = snapshot.order();
    let moved = order.remove(preview.from_index);
    order.insert(preview.target_index, moved);

    let column_before = (preview.target_index > range.start)
        .then(|| order[preview.target_index - 1].clone());
    let column_after = (preview.target_index + 1 < range.end)
        .then(|| order[preview.target_index + 1].clone());

    Some(ColumnReorderEnd {
        column_before,
        column_after,
        reorder_column: key.clone(),
        order,
    })
}
