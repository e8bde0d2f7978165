#![forbid(unsafe_code)]

//! Column model: keys, capability flags, width bounds, and groups.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Unique identifier of a column within one table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnKey(String);

impl ColumnKey {
    /// Create a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ColumnKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<String> for ColumnKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

bitflags! {
    /// Interaction capabilities and pinning of a column.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColumnFlags: u8 {
        /// The trailing edge of the header can be dragged to resize.
        const RESIZABLE   = 0b0001;
        /// The header can be dragged to reorder within its group.
        const REORDERABLE = 0b0010;
        /// Pinned to the inline-start edge; does not scroll horizontally.
        const FIXED       = 0b0100;
        /// Pinned to the inline-end edge; does not scroll horizontally.
        const FIXED_RIGHT = 0b1000;
    }
}

impl Default for ColumnFlags {
    fn default() -> Self {
        Self::RESIZABLE | Self::REORDERABLE
    }
}

/// Horizontal group a column belongs to.
///
/// Groups are laid out in declaration order: fixed-left, scrollable,
/// fixed-right. Reordering never moves a column across groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnGroup {
    FixedLeft,
    Scrollable,
    FixedRight,
}

/// A column definition.
///
/// Invariant (enforced by the layout store): `min_width <= width <= max_width`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: ColumnKey,
    pub width: u32,
    pub min_width: u32,
    pub max_width: u32,
    pub flags: ColumnFlags,
}

impl Column {
    /// Create a resizable, reorderable column with unbounded width.
    pub fn new(key: impl Into<ColumnKey>, width: u32) -> Self {
        Self {
            key: key.into(),
            width,
            min_width: 0,
            max_width: u32::MAX,
            flags: ColumnFlags::default(),
        }
    }

    /// Set the minimum width.
    #[must_use]
    pub fn min_width(mut self, min_width: u32) -> Self {
        self.min_width = min_width;
        self
    }

    /// Set the maximum width.
    #[must_use]
    pub fn max_width(mut self, max_width: u32) -> Self {
        self.max_width = max_width;
        self
    }

    /// Replace the capability flags.
    #[must_use]
    pub fn flags(mut self, flags: ColumnFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Enable or disable resizing.
    #[must_use]
    pub fn resizable(mut self, resizable: bool) -> Self {
        self.flags.set(ColumnFlags::RESIZABLE, resizable);
        self
    }

    /// Enable or disable reordering.
    #[must_use]
    pub fn reorderable(mut self, reorderable: bool) -> Self {
        self.flags.set(ColumnFlags::REORDERABLE, reorderable);
        self
    }

    /// Pin to the inline-start edge.
    #[must_use]
    pub fn fixed(mut self) -> Self {
        self.flags.remove(ColumnFlags::FIXED_RIGHT);
        self.flags.insert(ColumnFlags::FIXED);
        self
    }

    /// Pin to the inline-end edge.
    #[must_use]
    pub fn fixed_right(mut self) -> Self {
        self.flags.remove(ColumnFlags::FIXED);
        self.flags.insert(ColumnFlags::FIXED_RIGHT);
        self
    }

    /// Group this column is laid out in.
    ///
    /// `FIXED` wins if both pin flags are set.
    #[must_use]
    pub fn group(&self) -> ColumnGroup {
        if self.flags.contains(ColumnFlags::FIXED) {
            ColumnGroup::FixedLeft
        } else if self.flags.contains(ColumnFlags::FIXED_RIGHT) {
            ColumnGroup::FixedRight
        } else {
            ColumnGroup::Scrollable
        }
    }

    #[must_use]
    pub fn is_resizable(&self) -> bool {
        self.flags.contains(ColumnFlags::RESIZABLE)
    }

    #[must_use]
    pub fn is_reorderable(&self) -> bool {
        self.flags.contains(ColumnFlags::REORDERABLE)
    }

    /// Clamp `width` into this column's bounds.
    #[must_use]
    pub fn clamp(&self, width: i64) -> u32 {
        clamp_width(width, self.min_width, self.max_width)
    }
}

/// Clamp a candidate width into `[min_width, max_width]`.
///
/// Accepts a signed candidate so callers can pass `width + delta` without
/// pre-checking for underflow. If `min_width > max_width` the result is
/// `max_width`.
#[must_use]
pub fn clamp_width(width: i64, min_width: u32, max_width: u32) -> u32 {
    let clamped = width.max(i64::from(min_width)).min(i64::from(max_width));
    // In range of u32 after clamping against two u32 bounds.
    clamped.max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_resizable_and_reorderable() {
        let col = Column::new("a", 100);
        assert!(col.is_resizable());
        assert!(col.is_reorderable());
        assert_eq!(col.group(), ColumnGroup::Scrollable);
        assert_eq!(col.min_width, 0);
        assert_eq!(col.max_width, u32::MAX);
    }

    #[test]
    fn pinning_is_exclusive() {
        let col = Column::new("a", 10).fixed().fixed_right();
        assert_eq!(col.group(), ColumnGroup::FixedRight);
        let col = Column::new("a", 10).fixed_right().fixed();
        assert_eq!(col.group(), ColumnGroup::FixedLeft);
    }

    #[test]
    fn capability_toggles() {
        let col = Column::new("a", 10).resizable(false).reorderable(false);
        assert!(!col.is_resizable());
        assert!(!col.is_reorderable());
        assert!(col.flags.is_empty());
    }

    #[test]
    fn clamp_respects_bounds() {
        let col = Column::new("a", 100).min_width(50).max_width(200);
        assert_eq!(col.clamp(130), 130);
        assert_eq!(col.clamp(250), 200);
        assert_eq!(col.clamp(10), 50);
        assert_eq!(col.clamp(-40), 50);
    }

    #[test]
    fn clamp_with_inverted_bounds_yields_max() {
        assert_eq!(clamp_width(10, 80, 40), 40);
    }

    #[test]
    fn key_display_and_conversions() {
        let key = ColumnKey::from("price");
        assert_eq!(key.to_string(), "price");
        assert_eq!(key, ColumnKey::new(String::from("price")));
        assert_eq!(key.as_str(), "price");
    }
}
