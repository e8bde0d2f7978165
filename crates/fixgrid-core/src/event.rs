#![forbid(unsafe_code)]

//! Canonical pointer event types.
//!
//! Hosts translate their native mouse/touch/pen events into [`PointerEvent`]
//! values. Design decisions:
//! - Positions are client-space pixels; direction handling happens later.
//! - `pointer_id` distinguishes concurrent touches; zero is reserved.
//! - `PointerButtons` use bitflags, mirroring the DOM `buttons` mask.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Device that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// Phase of a pointer event within a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerPhase {
    /// Button pressed or touch started.
    Down,
    /// Pointer moved.
    Move,
    /// Button released or touch ended.
    Up,
    /// The platform aborted the pointer stream (e.g. touch cancel).
    Cancel,
    /// The pointer left the table's surface.
    Leave,
}

bitflags! {
    /// Buttons held during a pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PointerButtons: u8 {
        /// Primary button (left mouse, touch contact, pen tip).
        const PRIMARY   = 0b0001;
        /// Secondary button (right mouse).
        const SECONDARY = 0b0010;
        /// Auxiliary button (middle mouse).
        const AUXILIARY = 0b0100;
    }
}

/// Why an in-flight gesture was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    /// Pointer left the table surface.
    PointerLeave,
    /// The platform cancelled the pointer stream.
    PointerCancel,
    /// Escape key pressed.
    EscapeKey,
    /// The table is being torn down.
    Unmount,
    /// An external reset was requested.
    Reset,
}

/// One pointer event in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// Identifier of the pointer. Must be non-zero.
    pub pointer_id: u32,
    /// Device kind.
    pub kind: PointerKind,
    /// Gesture phase.
    pub phase: PointerPhase,
    /// Client-space position.
    pub position: Point,
    /// Buttons held when the event fired.
    pub buttons: PointerButtons,
}

impl PointerEvent {
    /// Create a mouse event for the primary pointer.
    #[must_use]
    pub const fn new(phase: PointerPhase, x: i32, y: i32) -> Self {
        Self {
            pointer_id: 1,
            kind: PointerKind::Mouse,
            phase,
            position: Point::new(x, y),
            buttons: match phase {
                PointerPhase::Down | PointerPhase::Move => PointerButtons::PRIMARY,
                _ => PointerButtons::empty(),
            },
        }
    }

    /// Shorthand for a primary-button press.
    #[must_use]
    pub const fn down(x: i32, y: i32) -> Self {
        Self::new(PointerPhase::Down, x, y)
    }

    /// Shorthand for a move with the primary button held.
    #[must_use]
    pub const fn moved(x: i32, y: i32) -> Self {
        Self::new(PointerPhase::Move, x, y)
    }

    /// Shorthand for a release.
    #[must_use]
    pub const fn up(x: i32, y: i32) -> Self {
        Self::new(PointerPhase::Up, x, y)
    }

    /// Set the pointer id.
    #[must_use]
    pub const fn with_pointer_id(mut self, pointer_id: u32) -> Self {
        self.pointer_id = pointer_id;
        self
    }

    /// Set the device kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: PointerKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the button mask.
    #[must_use]
    pub const fn with_buttons(mut self, buttons: PointerButtons) -> Self {
        self.buttons = buttons;
        self
    }

    /// Whether this press can start a gesture.
    ///
    /// Mouse presses must use the primary button; touch and pen contacts
    /// always qualify.
    #[must_use]
    pub const fn is_primary_press(&self) -> bool {
        if !matches!(self.phase, PointerPhase::Down) || self.pointer_id == 0 {
            return false;
        }
        match self.kind {
            PointerKind::Mouse => self.buttons.contains(PointerButtons::PRIMARY),
            PointerKind::Touch | PointerKind::Pen => true,
        }
    }

    /// Cancel reason implied by this event's phase, if any.
    #[must_use]
    pub const fn cancel_reason(&self) -> Option<CancelReason> {
        match self.phase {
            PointerPhase::Cancel => Some(CancelReason::PointerCancel),
            PointerPhase::Leave => Some(CancelReason::PointerLeave),
            _ => None,
        }
    }
}
