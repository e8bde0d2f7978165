#![forbid(unsafe_code)]

//! Pointer-driven column interaction controller.
//!
//! [`TableInteraction`] is the single entry point a host feeds pointer events
//! into. It resolves presses against the current layout, drives the
//! [`DragTracker`], and on release commits through the layout store and
//! returns the terminal [`ColumnEvent`].
//!
//! ```text
//! Down  ─ hit_test ─> begin (ResizeStart / ReorderStart)
//! Move  ─────────────> update (no event)
//! Up    ─ update ────> end ─ commit ─> ResizeEnd / ReorderEnd
//! Leave / Cancel ────> cancel ─> Cancelled
//! ```
//!
//! Client positions are mirrored into logical space once, on entry, using the
//! snapshot's [`Direction`](fixgrid_core::geometry::Direction). Commits are
//! computed against the snapshot captured when the gesture began, so the
//! original width and column order are the ones the user grabbed.
//!
//! Rejected transitions (a second press during a gesture, a store that
//! refuses the commit) are logged and produce no event.

use std::sync::Arc;

use fixgrid_core::event::{CancelReason, PointerEvent, PointerPhase};
use fixgrid_core::geometry::{Point, Rect};

use crate::column::{ColumnGroup, ColumnKey};
use crate::commit::{
    ColumnEvent, ReorderPreview, commit_reorder, commit_resize, reorder_preview, resized_width,
};
use crate::config::{CommitPolicy, InteractionConfig};
use crate::drag::{DragKind, DragSample, DragSession, DragStart, DragTracker, DragUpdate};
use crate::offset::hit_test;
use crate::store::{Action, LayoutSnapshot, TableStore};

/// Live state of the gesture in flight, for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GesturePreview {
    /// A resize; `width` is the clamped width the column would commit to.
    Resize { column_key: ColumnKey, width: u32 },
    /// A reorder with per-column displacement.
    Reorder(ReorderPreview),
}

#[derive(Debug)]
struct Gesture {
    origin: Arc<LayoutSnapshot>,
    index: usize,
}

/// Column resize/reorder controller for one table instance.
#[derive(Debug)]
pub struct TableInteraction {
    config: InteractionConfig,
    bounds: Rect,
    tracker: DragTracker,
    gesture: Option<Gesture>,
}

impl TableInteraction {
    /// Create a controller for a table occupying `bounds` in client space.
    #[must_use]
    pub fn new(config: InteractionConfig, bounds: Rect) -> Self {
        Self {
            config,
            bounds,
            tracker: DragTracker::new(),
            gesture: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Client-space rectangle of the table.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Update the table's client-space rectangle (after layout or scroll of
    /// the page). Takes effect for the next event.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    /// Whether a gesture is in flight.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.tracker.is_active()
    }

    /// The active drag session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        self.tracker.session()
    }

    /// Feed one pointer event. Returns the event to report to the host, if
    /// any.
    pub fn handle(&mut self, event: &PointerEvent, store: &mut TableStore) -> Option<ColumnEvent> {
        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "column_pointer",
            phase = ?event.phase,
            pointer = event.pointer_id,
            x = event.position.x,
            y = event.position.y,
        )
        .entered();

        match event.phase {
            PointerPhase::Down => self.press(event, &store.snapshot()),
            PointerPhase::Move => {
                self.track(event, &store.snapshot());
                None
            }
            PointerPhase::Up => self.release(event, store),
            PointerPhase::Leave if !self.config.cancel_on_leave => None,
            PointerPhase::Leave | PointerPhase::Cancel => {
                if !self.owns(event) {
                    return None;
                }
                self.cancel(event.cancel_reason()?)
            }
        }
    }

    /// Abandon the gesture in flight (unmount, escape, external reset).
    ///
    /// Emits [`ColumnEvent::Cancelled`]; never a terminal event.
    pub fn cancel(&mut self, reason: CancelReason) -> Option<ColumnEvent> {
        self.gesture = None;
        let session = self.tracker.cancel_drag(reason)?;
        Some(ColumnEvent::Cancelled {
            column_key: session.column_key,
            kind: session.kind,
            reason,
        })
    }

    /// Live state of the gesture in flight.
    #[must_use]
    pub fn preview(&self) -> Option<GesturePreview> {
        let session = self.tracker.session()?;
        let gesture = self.gesture.as_ref()?;
        match session.kind {
            DragKind::Resize => {
                let column = &gesture.origin.columns()[gesture.index].column;
                Some(GesturePreview::Resize {
                    column_key: column.key.clone(),
                    width: resized_width(column, session.offset),
                })
            }
            DragKind::Reorder => reorder_preview(
                &gesture.origin,
                &session.column_key,
                session.offset,
                self.config.tie_break,
            )
            .map(GesturePreview::Reorder),
        }
    }

    fn logical(&self, event: &PointerEvent, snapshot: &LayoutSnapshot) -> Point {
        snapshot.direction.to_logical(event.position, self.bounds)
    }

    fn owns(&self, event: &PointerEvent) -> bool {
        self.tracker
            .session()
            .is_some_and(|session| session.pointer_id == event.pointer_id)
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn press(&mut self, event: &PointerEvent, snapshot: &Arc<LayoutSnapshot>) -> Option<ColumnEvent> {
        if !event.is_primary_press() {
            return None;
        }
        let point = self.logical(event, snapshot);
        let hit = hit_test(
            point,
            snapshot,
            self.config.resize_handle_width,
            self.config.header_only,
        )?;
        let column = &snapshot.columns()[hit.index].column;
        let kind = if hit.on_resize_handle {
            DragKind::Resize
        } else if column.is_reorderable() {
            DragKind::Reorder
        } else {
            return None;
        };

        let mut start = DragStart::new(column.key.clone(), point, kind).pointer_id(event.pointer_id);
        if kind == DragKind::Reorder && hit.group == ColumnGroup::Scrollable {
            start = start.follow_scroll(snapshot.scroll_x);
        }
        if let Err(err) = self.tracker.begin(start) {
            fixgrid_core::warn!(column = %column.key, error = %err, "column drag rejected");
            return None;
        }
        self.gesture = Some(Gesture {
            origin: Arc::clone(snapshot),
            index: hit.index,
        });

        fixgrid_core::debug!(column = %column.key, kind = ?kind, "column drag started");
        let column_key = column.key.clone();
        Some(match kind {
            DragKind::Resize => ColumnEvent::ResizeStart { column_key },
            DragKind::Reorder => ColumnEvent::ReorderStart { column_key },
        })
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn track(&mut self, event: &PointerEvent, snapshot: &LayoutSnapshot) -> DragUpdate {
        let sample = DragSample {
            pointer_id: event.pointer_id,
            position: self.logical(event, snapshot),
            scroll_x: snapshot.scroll_x,
        };
        let viewport = Rect::from_size(snapshot.viewport_width, snapshot.viewport_height);
        let update = self.tracker.update_drag(sample, viewport);
        if let DragUpdate::Ignored(reason) = update {
            fixgrid_core::trace!(reason = ?reason, "drag sample ignored");
        }
        update
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn release(&mut self, event: &PointerEvent, store: &mut TableStore) -> Option<ColumnEvent> {
        if !self.owns(event) {
            return None;
        }
        self.track(event, &store.snapshot());
        let session = self.tracker.end_drag().ok()?;
        let gesture = self.gesture.take()?;

        let (emitted, action) = match session.kind {
            DragKind::Resize => {
                let column = &gesture.origin.columns()[gesture.index].column;
                let action = Action::ColumnResize {
                    key: column.key.clone(),
                    width: resized_width(column, session.offset),
                };
                (commit_resize(column, session.offset), action)
            }
            DragKind::Reorder => {
                let end = commit_reorder(
                    &gesture.origin,
                    &session.column_key,
                    session.offset,
                    self.config.tie_break,
                )?;
                let action = Action::ColumnReorder {
                    order: end.order.clone(),
                };
                (ColumnEvent::ReorderEnd(end), action)
            }
        };

        fixgrid_core::debug!(
            column = %session.column_key,
            offset = session.offset,
            "column drag committed"
        );
        if self.config.commit_policy == CommitPolicy::ApplyToStore {
            if let Err(err) = store.dispatch(action) {
                fixgrid_core::warn!(error = %err, "store rejected column commit");
            }
        }
        Some(emitted)
    }
}
