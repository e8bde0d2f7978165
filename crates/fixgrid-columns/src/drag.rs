#![forbid(unsafe_code)]

//! Drag session tracking for column gestures.
//!
//! [`DragTracker`] owns the transient state of at most one gesture:
//!
//! ```text
//! Idle ── begin_drag ──> Active ── end_drag ────> Idle
//!                          │   └── cancel_drag ──> Idle
//!                          └── update_drag (stays Active)
//! ```
//!
//! # Invariants
//!
//! 1. At most one session exists. `begin_drag` while active is rejected with
//!    [`DragError::Conflict`]; the new gesture is not queued.
//! 2. `update_drag` never changes state; it only moves the current offset of
//!    an active session, and is a recorded no-op for samples outside the
//!    viewport bounds or from another pointer.
//! 3. `end_drag` returns the last computed offset and clears the session.
//! 4. `cancel_drag` clears the session and discards its offset.
//!
//! Positions are logical (direction-normalized) and table-local. For a
//! session that follows scrolling, horizontal scroll performed mid-gesture
//! is added to the displacement so the dragged column stays under the
//! pointer in content space.

use std::fmt;

use fixgrid_core::event::CancelReason;
use fixgrid_core::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::column::ColumnKey;

/// What a gesture does to its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragKind {
    Resize,
    Reorder,
}

/// Parameters for starting a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragStart {
    pub column_key: ColumnKey,
    pub kind: DragKind,
    pub origin: Point,
    pub pointer_id: u32,
    /// Horizontal scroll at gesture start, when the session follows scroll.
    pub scroll_origin: Option<u32>,
}

impl DragStart {
    /// Start parameters for the primary pointer with no scroll following.
    pub fn new(column_key: impl Into<ColumnKey>, origin: Point, kind: DragKind) -> Self {
        Self {
            column_key: column_key.into(),
            kind,
            origin,
            pointer_id: 1,
            scroll_origin: None,
        }
    }

    /// Set the pointer that owns the session.
    #[must_use]
    pub fn pointer_id(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    /// Follow horizontal scrolling, starting from `scroll_x`.
    #[must_use]
    pub fn follow_scroll(mut self, scroll_x: u32) -> Self {
        self.scroll_origin = Some(scroll_x);
        self
    }
}

/// One position report for an active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragSample {
    pub pointer_id: u32,
    pub position: Point,
    /// Current horizontal scroll; ignored unless the session follows scroll.
    pub scroll_x: u32,
}

impl DragSample {
    /// Sample from the primary pointer with no scroll.
    #[must_use]
    pub const fn at(position: Point) -> Self {
        Self {
            pointer_id: 1,
            position,
            scroll_x: 0,
        }
    }
}

/// State of one in-flight gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub column_key: ColumnKey,
    pub kind: DragKind,
    pub pointer_id: u32,
    /// Position at gesture start.
    pub origin: Point,
    /// Last accepted position.
    pub current: Point,
    /// Horizontal displacement from the origin, scroll included.
    pub offset: i32,
    pub scroll_origin: Option<u32>,
}

/// Why an update was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragIgnoreReason {
    /// No session is active.
    Idle,
    /// The sample came from a pointer that does not own the session.
    PointerMismatch,
    /// The sample lies outside the viewport bounds.
    OutOfViewport,
}

/// Outcome of [`DragTracker::update_drag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragUpdate {
    /// The session offset moved (possibly by zero).
    Moved { offset: i32, delta: i32 },
    /// The sample was dropped; the session is unchanged.
    Ignored(DragIgnoreReason),
}

/// Rejected tracker transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragError {
    /// A session for `active` is already in progress.
    Conflict { active: ColumnKey },
    /// No session is active.
    NotActive,
}

impl fmt::Display for DragError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict { active } => {
                write!(f, "a drag of column {active} is already in progress")
            }
            Self::NotActive => write!(f, "no drag in progress"),
        }
    }
}

impl std::error::Error for DragError {}

/// Owner of the (at most one) active drag session of a table.
#[derive(Debug, Default)]
pub struct DragTracker {
    session: Option<DragSession>,
    transitions: u64,
}

impl DragTracker {
    /// Create an idle tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a session is active.
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// The active session, if any.
    #[must_use]
    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Number of state transitions (begin/end/cancel) so far.
    #[must_use]
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    /// Start a session for `column_key` at `origin` with the primary pointer.
    pub fn begin_drag(
        &mut self,
        column_key: impl Into<ColumnKey>,
        origin: Point,
        kind: DragKind,
    ) -> Result<&DragSession, DragError> {
        self.begin(DragStart::new(column_key, origin, kind))
    }

    /// Start a session. Fails with [`DragError::Conflict`] while one is active.
    pub fn begin(&mut self, start: DragStart) -> Result<&DragSession, DragError> {
        if let Some(active) = &self.session {
            return Err(DragError::Conflict {
                active: active.column_key.clone(),
            });
        }
        self.transitions = self.transitions.saturating_add(1);
        Ok(self.session.insert(DragSession {
            column_key: start.column_key,
            kind: start.kind,
            pointer_id: start.pointer_id,
            origin: start.origin,
            current: start.origin,
            offset: 0,
            scroll_origin: start.scroll_origin,
        }))
    }

    /// Report a new pointer position. Samples outside `bounds` are ignored.
    pub fn update_drag(&mut self, sample: DragSample, bounds: Rect) -> DragUpdate {
        let Some(session) = self.session.as_mut() else {
            return DragUpdate::Ignored(DragIgnoreReason::Idle);
        };
        if sample.pointer_id != session.pointer_id {
            return DragUpdate::Ignored(DragIgnoreReason::PointerMismatch);
        }
        if !bounds.contains(sample.position) {
            return DragUpdate::Ignored(DragIgnoreReason::OutOfViewport);
        }
        let (dx, _) = sample.position.delta_from(session.origin);
        let scrolled = session.scroll_origin.map_or(0, |origin| {
            let diff = i64::from(sample.scroll_x) - i64::from(origin);
            diff.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
        });
        let offset = dx.saturating_add(scrolled);
        let delta = offset.saturating_sub(session.offset);
        session.current = sample.position;
        session.offset = offset;
        DragUpdate::Moved { offset, delta }
    }

    /// Finish the active session, returning it with its last offset.
    pub fn end_drag(&mut self) -> Result<DragSession, DragError> {
        let session = self.session.take().ok_or(DragError::NotActive)?;
        self.transitions = self.transitions.saturating_add(1);
        Ok(session)
    }

    /// Abandon the active session. Returns `None` when idle.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn cancel_drag(&mut self, reason: CancelReason) -> Option<DragSession> {
        let session = self.session.take()?;
        self.transitions = self.transitions.saturating_add(1);
        fixgrid_core::debug!(
            column = %session.column_key,
            reason = ?reason,
            "drag cancelled"
        );
        Some(session)
    }
}
