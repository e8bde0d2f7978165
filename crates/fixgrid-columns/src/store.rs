#![forbid(unsafe_code)]

//! Layout store: the single writer of derived table layout state.
//!
//! [`TableStore`] consumes a primitive [`Action`] stream and publishes
//! immutable [`LayoutSnapshot`]s behind an [`Arc`]. A reader holding a
//! snapshot keeps a consistent view of every field until it asks for a new
//! one; the store never mutates a published snapshot.
//!
//! # Recompute policy
//!
//! Each action marks a [`Dirty`] set and only those parts are rebuilt:
//!
//! | Dirty | Rebuilt |
//! |-------|---------|
//! | `ROWS` | row offsets (incrementally for single-row height changes) |
//! | `COLUMNS` | column order, group partition, column positions |
//! | `VIEWPORT`, `SCROLL` | scroll bounds, clamped scroll, first visible row |
//!
//! Parts that are not dirty are shared with the previous snapshot. An action
//! that changes nothing leaves the published snapshot (and its version)
//! untouched.
//!
//! `PropChange` is diffed against the props the host sent last time, not
//! against live state: a committed width or order, a user scroll, or a row
//! height change survives a re-render with unchanged props.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Fallback |
//! |---------|-------|----------|
//! | [`LayoutError::DuplicateColumnKey`] | Two columns share a key | Action rejected, state unchanged |
//! | [`LayoutError::InvalidWidthBounds`] | `min_width > max_width` | Action rejected, state unchanged |
//! | [`LayoutError::ZeroRowHeight`] | Row height of 0 | Action rejected, state unchanged |
//! | [`LayoutError::UnknownColumn`] | Resize of a missing key | Action rejected, state unchanged |
//! | [`LayoutError::NotAPermutation`] | Reorder keys do not match columns | Action rejected, state unchanged |
//! | Scroll past bounds | Any scroll action | Clamped to `[0, max]` |

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use bitflags::bitflags;
use fixgrid_core::geometry::Direction;

use crate::column::{Column, ColumnGroup, ColumnKey};
use crate::rows::RowOffsets;

/// Default row height in pixels.
pub const DEFAULT_ROW_HEIGHT: u32 = 30;

/// Default header height in pixels.
pub const DEFAULT_HEADER_HEIGHT: u32 = 30;

// ---------------------------------------------------------------------------
// Props
// ---------------------------------------------------------------------------

/// Host-supplied table inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableProps {
    /// Columns in display order. Pinned columns are moved to their group.
    pub columns: Vec<Column>,
    /// Number of body rows.
    pub row_count: usize,
    /// Height of rows without an override.
    pub row_height: u32,
    /// Per-row height overrides.
    pub row_heights: BTreeMap<usize, u32>,
    /// Table width in pixels.
    pub width: u32,
    /// Table height in pixels, header included.
    pub height: u32,
    /// Header row height in pixels.
    pub header_height: u32,
    /// Controlled horizontal scroll position, applied when present.
    pub scroll_x: Option<u32>,
    /// Controlled vertical scroll position, applied when present.
    pub scroll_y: Option<u64>,
    /// Inline direction.
    pub direction: Direction,
}

impl TableProps {
    /// Props for a `width` x `height` table with no columns and no rows.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            columns: Vec::new(),
            row_count: 0,
            row_height: DEFAULT_ROW_HEIGHT,
            row_heights: BTreeMap::new(),
            width,
            height,
            header_height: DEFAULT_HEADER_HEIGHT,
            scroll_x: None,
            scroll_y: None,
            direction: Direction::Ltr,
        }
    }

    /// Set the columns.
    #[must_use]
    pub fn columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    /// Set the row count and default row height.
    #[must_use]
    pub fn rows(mut self, row_count: usize, row_height: u32) -> Self {
        self.row_count = row_count;
        self.row_height = row_height;
        self
    }

    /// Override the height of one row.
    #[must_use]
    pub fn row_height_at(mut self, index: usize, height: u32) -> Self {
        self.row_heights.insert(index, height);
        self
    }

    /// Set the header height.
    #[must_use]
    pub fn header_height(mut self, header_height: u32) -> Self {
        self.header_height = header_height;
        self
    }

    /// Set controlled scroll positions.
    #[must_use]
    pub fn scroll(mut self, scroll_x: u32, scroll_y: u64) -> Self {
        self.scroll_x = Some(scroll_x);
        self.scroll_y = Some(scroll_y);
        self
    }

    /// Set the inline direction.
    #[must_use]
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    fn validate(&self) -> Result<(), LayoutError> {
        let mut seen = HashSet::with_capacity(self.columns.len());
        for column in &self.columns {
            if !seen.insert(&column.key) {
                return Err(LayoutError::DuplicateColumnKey(column.key.clone()));
            }
            if column.min_width > column.max_width {
                return Err(LayoutError::InvalidWidthBounds {
                    key: column.key.clone(),
                    min_width: column.min_width,
                    max_width: column.max_width,
                });
            }
        }
        if self.row_height == 0 {
            return Err(LayoutError::ZeroRowHeight { index: None });
        }
        if let Some((&index, _)) = self.row_heights.iter().find(|(_, h)| **h == 0) {
            return Err(LayoutError::ZeroRowHeight { index: Some(index) });
        }
        Ok(())
    }

    fn rows_differ(&self, other: &TableProps) -> bool {
        self.row_count != other.row_count
            || self.row_height != other.row_height
            || self.row_heights != other.row_heights
    }

    fn viewport_differs(&self, other: &TableProps) -> bool {
        self.width != other.width
            || self.height != other.height
            || self.header_height != other.header_height
            || self.direction != other.direction
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Primitive state-changing actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Replace all state; scroll resets to the props' scroll or zero.
    Initialize(TableProps),
    /// New props from the host; only changed parts are recomputed.
    PropChange(TableProps),
    /// Scroll horizontally to an absolute position.
    ScrollToX(u32),
    /// Scroll vertically to an absolute position.
    ScrollToY(u64),
    /// Scroll by a relative amount.
    ScrollBy { dx: i64, dy: i64 },
    /// A continuous scroll (wheel, touch fling) began.
    ScrollStart,
    /// A continuous scroll ended.
    ScrollEnd,
    /// The table's outer size changed.
    ViewportResize { width: u32, height: u32 },
    /// One row's height changed.
    RowHeightChange { index: usize, height: u32 },
    /// Commit a column width; clamped to the column's bounds.
    ColumnResize { key: ColumnKey, width: u32 },
    /// Commit a column order; pinned columns stay in their group.
    ColumnReorder { order: Vec<ColumnKey> },
}

bitflags! {
    /// Parts of the layout invalidated by an action.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Dirty: u8 {
        const ROWS     = 0b0001;
        const COLUMNS  = 0b0010;
        const VIEWPORT = 0b0100;
        const SCROLL   = 0b1000;
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejected store actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    DuplicateColumnKey(ColumnKey),
    InvalidWidthBounds {
        key: ColumnKey,
        min_width: u32,
        max_width: u32,
    },
    ZeroRowHeight {
        index: Option<usize>,
    },
    UnknownColumn(ColumnKey),
    NotAPermutation {
        expected: usize,
        got: usize,
    },
    RowOutOfRange {
        index: usize,
        row_count: usize,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateColumnKey(key) => write!(f, "duplicate column key \"{key}\""),
            Self::InvalidWidthBounds {
                key,
                min_width,
                max_width,
            } => write!(
                f,
                "column \"{key}\" has min_width {min_width} greater than max_width {max_width}"
            ),
            Self::ZeroRowHeight { index: Some(index) } => {
                write!(f, "row {index} has zero height")
            }
            Self::ZeroRowHeight { index: None } => write!(f, "default row height must be > 0"),
            Self::UnknownColumn(key) => write!(f, "unknown column \"{key}\""),
            Self::NotAPermutation { expected, got } => write!(
                f,
                "column order must be a permutation of the {expected} current keys (got {got} keys)"
            ),
            Self::RowOutOfRange { index, row_count } => {
                write!(f, "row {index} out of range (row_count={row_count})")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A column with its resolved position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub column: Column,
    pub group: ColumnGroup,
    /// Offset of the column's inline-start edge within its group.
    pub left: u32,
}

impl ColumnLayout {
    /// Offset of the inline-end edge within the group.
    #[must_use]
    pub fn right(&self) -> u32 {
        self.left.saturating_add(self.column.width)
    }
}

/// Column partition shared between snapshots until columns change.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ColumnSet {
    columns: Vec<ColumnLayout>,
    fixed_left: Range<usize>,
    scrollable: Range<usize>,
    fixed_right: Range<usize>,
}

impl ColumnSet {
    fn build(columns: &[Column]) -> Self {
        let mut ordered: Vec<&Column> = columns.iter().collect();
        // Stable: relative order within a group is preserved.
        ordered.sort_by_key(|c| c.group());

        let mut layouts = Vec::with_capacity(ordered.len());
        let mut left = 0u32;
        let mut current = None;
        for column in ordered {
            let group = column.group();
            if current != Some(group) {
                current = Some(group);
                left = 0;
            }
            layouts.push(ColumnLayout {
                column: column.clone(),
                group,
                left,
            });
            left = left.saturating_add(column.width);
        }

        let end_of = |group: ColumnGroup| layouts.iter().filter(|l| l.group <= group).count();
        let fixed_left_end = end_of(ColumnGroup::FixedLeft);
        let scrollable_end = end_of(ColumnGroup::Scrollable);
        let total = layouts.len();
        Self {
            columns: layouts,
            fixed_left: 0..fixed_left_end,
            scrollable: fixed_left_end..scrollable_end,
            fixed_right: scrollable_end..total,
        }
    }

    fn range(&self, group: ColumnGroup) -> Range<usize> {
        match group {
            ColumnGroup::FixedLeft => self.fixed_left.clone(),
            ColumnGroup::Scrollable => self.scrollable.clone(),
            ColumnGroup::FixedRight => self.fixed_right.clone(),
        }
    }

    fn group_width(&self, group: ColumnGroup) -> u32 {
        self.columns[self.range(group)]
            .iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.column.width))
    }

    fn plain_columns(&self) -> Vec<Column> {
        self.columns.iter().map(|l| l.column.clone()).collect()
    }
}

/// Immutable, internally consistent view of the table layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutSnapshot {
    /// Bumped on every recompute.
    pub version: u64,
    pub direction: Direction,
    /// Table width, header included.
    pub viewport_width: u32,
    /// Table height, header included.
    pub viewport_height: u32,
    pub header_height: u32,
    /// Height available to body rows.
    pub body_height: u32,
    pub fixed_left_width: u32,
    pub scrollable_width: u32,
    pub fixed_right_width: u32,
    pub scroll_x: u32,
    pub scroll_y: u64,
    pub max_scroll_x: u32,
    pub max_scroll_y: u64,
    /// Total height of all body rows.
    pub content_height: u64,
    /// First row intersecting the body viewport.
    pub first_row_index: usize,
    /// Pixels of the first row hidden above the viewport.
    pub first_row_offset: u64,
    /// A continuous scroll is in progress.
    pub scrolling: bool,
    columns: Arc<ColumnSet>,
    rows: Arc<RowOffsets>,
}

impl LayoutSnapshot {
    /// All columns in display order.
    pub fn columns(&self) -> &[ColumnLayout] {
        &self.columns.columns
    }

    /// Column keys in display order.
    pub fn order(&self) -> Vec<ColumnKey> {
        self.columns().iter().map(|l| l.column.key.clone()).collect()
    }

    /// Index range of a group within [`columns`](Self::columns).
    pub fn group_range(&self, group: ColumnGroup) -> Range<usize> {
        self.columns.range(group)
    }

    /// Columns of one group.
    pub fn group(&self, group: ColumnGroup) -> &[ColumnLayout] {
        &self.columns.columns[self.columns.range(group)]
    }

    /// Display index of a column.
    pub fn column_index(&self, key: &ColumnKey) -> Option<usize> {
        self.columns().iter().position(|l| &l.column.key == key)
    }

    /// Layout of a column by key.
    pub fn column(&self, key: &ColumnKey) -> Option<&ColumnLayout> {
        self.columns().iter().find(|l| &l.column.key == key)
    }

    /// Sum of all column widths.
    pub fn total_column_width(&self) -> u32 {
        self.fixed_left_width
            .saturating_add(self.scrollable_width)
            .saturating_add(self.fixed_right_width)
    }

    /// Width of the horizontally scrolling region.
    pub fn scrollable_viewport_width(&self) -> u32 {
        self.viewport_width
            .saturating_sub(self.fixed_left_width)
            .saturating_sub(self.fixed_right_width)
    }

    /// Logical x where the fixed-right group begins.
    pub fn fixed_right_start(&self) -> u32 {
        self.viewport_width.saturating_sub(self.fixed_right_width)
    }

    /// Number of body rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Y-offset of a row's top edge in content space.
    pub fn row_offset(&self, index: usize) -> u64 {
        self.rows.offset_of(index)
    }

    /// Height of a row.
    pub fn row_height(&self, index: usize) -> Option<u32> {
        self.rows.height_of(index)
    }

    /// Rows intersecting the body viewport at the current scroll position.
    pub fn visible_rows(&self) -> Range<usize> {
        if self.rows.is_empty() {
            return 0..0;
        }
        let bottom = self.scroll_y.saturating_add(u64::from(self.body_height));
        let end = match self.rows.row_at(bottom.saturating_sub(1)) {
            Some((index, _)) if self.body_height > 0 => index + 1,
            _ => self.first_row_index,
        };
        self.first_row_index..end
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Owner of one table's layout state.
#[derive(Debug)]
pub struct TableStore {
    /// Props as last supplied by the host. Prop changes are diffed against
    /// these, never against `props`.
    host_props: TableProps,
    /// Live inputs: host props plus committed widths, orders, row heights
    /// and viewport resizes.
    props: TableProps,
    columns: Arc<ColumnSet>,
    rows: Arc<RowOffsets>,
    scroll_x: u32,
    scroll_y: u64,
    scrolling: bool,
    snapshot: Arc<LayoutSnapshot>,
}

impl TableStore {
    /// Create a store from initial props (the `Initialize` action).
    pub fn new(props: TableProps) -> Result<Self, LayoutError> {
        Self::initialize(props, 0)
    }

    fn initialize(mut props: TableProps, version: u64) -> Result<Self, LayoutError> {
        props.validate()?;
        let host_props = props.clone();
        let columns = Arc::new(ColumnSet::build(&props.columns));
        props.columns = columns.plain_columns();
        let rows = Arc::new(build_rows(&props));
        let mut store = Self {
            scroll_x: props.scroll_x.unwrap_or(0),
            scroll_y: props.scroll_y.unwrap_or(0),
            scrolling: false,
            snapshot: Arc::new(LayoutSnapshot {
                version,
                direction: props.direction,
                viewport_width: 0,
                viewport_height: 0,
                header_height: 0,
                body_height: 0,
                fixed_left_width: 0,
                scrollable_width: 0,
                fixed_right_width: 0,
                scroll_x: 0,
                scroll_y: 0,
                max_scroll_x: 0,
                max_scroll_y: 0,
                content_height: 0,
                first_row_index: 0,
                first_row_offset: 0,
                scrolling: false,
                columns: Arc::clone(&columns),
                rows: Arc::clone(&rows),
            }),
            columns,
            rows,
            host_props,
            props,
        };
        store.publish();
        Ok(store)
    }

    /// Current snapshot. Stable until the next state-changing dispatch.
    #[must_use]
    pub fn snapshot(&self) -> Arc<LayoutSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Current props as normalized by the store.
    ///
    /// Columns are listed in display order (grouped, with committed widths).
    pub fn props(&self) -> &TableProps {
        &self.props
    }

    /// Apply one action and publish a new snapshot if anything changed.
    ///
    /// Returns the set of recomputed parts; empty means the published
    /// snapshot was left untouched. A rejected action leaves all state as it
    /// was.
    pub fn dispatch(&mut self, action: Action) -> Result<Dirty, LayoutError> {
        #[cfg(feature = "tracing")]
        let _span =
            tracing::debug_span!("layout_dispatch", action = action_name(&action)).entered();

        let dirty = self.apply(action)?;
        if !dirty.is_empty() {
            self.publish();
            fixgrid_core::trace!(
                version = self.snapshot.version,
                dirty = ?dirty,
                "layout snapshot published"
            );
        }
        Ok(dirty)
    }

    fn apply(&mut self, action: Action) -> Result<Dirty, LayoutError> {
        let dirty = match action {
            Action::Initialize(props) => {
                *self = Self::initialize(props, self.snapshot.version)?;
                return Ok(Dirty::all());
            }
            Action::PropChange(props) => self.apply_props(props)?,
            Action::ScrollToX(x) => self.set_scroll(Some(x), None),
            Action::ScrollToY(y) => self.set_scroll(None, Some(y)),
            Action::ScrollBy { dx, dy } => {
                let x = i64::from(self.scroll_x)
                    .saturating_add(dx)
                    .clamp(0, i64::from(u32::MAX)) as u32;
                let y = i64::try_from(self.scroll_y)
                    .unwrap_or(i64::MAX)
                    .saturating_add(dy)
                    .max(0) as u64;
                self.set_scroll(Some(x), Some(y))
            }
            Action::ScrollStart => self.set_scrolling(true),
            Action::ScrollEnd => self.set_scrolling(false),
            Action::ViewportResize { width, height } => {
                if self.props.width == width && self.props.height == height {
                    Dirty::empty()
                } else {
                    self.props.width = width;
                    self.props.height = height;
                    Dirty::VIEWPORT | Dirty::SCROLL
                }
            }
            Action::RowHeightChange { index, height } => {
                if height == 0 {
                    return Err(LayoutError::ZeroRowHeight { index: Some(index) });
                }
                if index >= self.props.row_count {
                    return Err(LayoutError::RowOutOfRange {
                        index,
                        row_count: self.props.row_count,
                    });
                }
                self.props.row_heights.insert(index, height);
                // Copy-on-write: published snapshots keep the old offsets.
                if Arc::make_mut(&mut self.rows).set_height(index, height) {
                    Dirty::ROWS | Dirty::SCROLL
                } else {
                    Dirty::empty()
                }
            }
            Action::ColumnResize { key, width } => {
                let column = self
                    .props
                    .columns
                    .iter_mut()
                    .find(|c| c.key == key)
                    .ok_or(LayoutError::UnknownColumn(key))?;
                let width = column.clamp(i64::from(width));
                if column.width == width {
                    Dirty::empty()
                } else {
                    column.width = width;
                    self.columns = Arc::new(ColumnSet::build(&self.props.columns));
                    Dirty::COLUMNS | Dirty::SCROLL
                }
            }
            Action::ColumnReorder { order } => self.apply_order(&order)?,
        };
        Ok(dirty)
    }

    /// Apply the parts of `props` that differ from the previous host props.
    ///
    /// State the store changed on its own since then (committed widths and
    /// orders, scroll, row heights, viewport resizes) survives an unchanged
    /// re-render.
    fn apply_props(&mut self, props: TableProps) -> Result<Dirty, LayoutError> {
        props.validate()?;
        let previous = &self.host_props;
        let mut dirty = Dirty::empty();

        if props.columns != previous.columns {
            let columns = ColumnSet::build(&props.columns);
            self.props.columns = columns.plain_columns();
            self.columns = Arc::new(columns);
            dirty |= Dirty::COLUMNS | Dirty::SCROLL;
        }
        if props.rows_differ(previous) {
            self.props.row_count = props.row_count;
            self.props.row_height = props.row_height;
            self.props.row_heights = props.row_heights.clone();
            self.rows = Arc::new(build_rows(&self.props));
            dirty |= Dirty::ROWS | Dirty::SCROLL;
        }
        if props.viewport_differs(previous) {
            self.props.width = props.width;
            self.props.height = props.height;
            self.props.header_height = props.header_height;
            self.props.direction = props.direction;
            dirty |= Dirty::VIEWPORT | Dirty::SCROLL;
        }
        match props.scroll_x {
            Some(x) if props.scroll_x != previous.scroll_x && x != self.scroll_x => {
                self.scroll_x = x;
                dirty |= Dirty::SCROLL;
            }
            _ => {}
        }
        match props.scroll_y {
            Some(y) if props.scroll_y != previous.scroll_y && y != self.scroll_y => {
                self.scroll_y = y;
                dirty |= Dirty::SCROLL;
            }
            _ => {}
        }
        self.props.scroll_x = props.scroll_x;
        self.props.scroll_y = props.scroll_y;
        self.host_props = props;
        Ok(dirty)
    }

    fn apply_order(&mut self, order: &[ColumnKey]) -> Result<Dirty, LayoutError> {
        let expected = self.props.columns.len();
        let not_a_permutation = || LayoutError::NotAPermutation {
            expected,
            got: order.len(),
        };
        if order.len() != expected {
            return Err(not_a_permutation());
        }
        let mut remaining: Vec<Option<&Column>> = self.props.columns.iter().map(Some).collect();
        let mut reordered = Vec::with_capacity(expected);
        for key in order {
            let column = remaining
                .iter_mut()
                .find(|slot| slot.is_some_and(|c| &c.key == key))
                .and_then(Option::take)
                .ok_or_else(not_a_permutation)?;
            reordered.push(column.clone());
        }

        let columns = ColumnSet::build(&reordered);
        let normalized = columns.plain_columns();
        if normalized == self.props.columns {
            return Ok(Dirty::empty());
        }
        self.props.columns = normalized;
        self.columns = Arc::new(columns);
        Ok(Dirty::COLUMNS)
    }

    fn set_scroll(&mut self, x: Option<u32>, y: Option<u64>) -> Dirty {
        let mut dirty = Dirty::empty();
        match x.map(|x| x.min(self.snapshot.max_scroll_x)) {
            Some(x) if x != self.scroll_x => {
                self.scroll_x = x;
                dirty |= Dirty::SCROLL;
            }
            _ => {}
        }
        match y.map(|y| y.min(self.snapshot.max_scroll_y)) {
            Some(y) if y != self.scroll_y => {
                self.scroll_y = y;
                dirty |= Dirty::SCROLL;
            }
            _ => {}
        }
        dirty
    }

    fn set_scrolling(&mut self, scrolling: bool) -> Dirty {
        if self.scrolling == scrolling {
            Dirty::empty()
        } else {
            self.scrolling = scrolling;
            Dirty::SCROLL
        }
    }

    /// Derive scroll bounds from the staged columns/rows and publish.
    fn publish(&mut self) {
        let props = &self.props;
        let columns = &self.columns;
        let rows = &self.rows;

        let fixed_left_width = columns.group_width(ColumnGroup::FixedLeft);
        let scrollable_width = columns.group_width(ColumnGroup::Scrollable);
        let fixed_right_width = columns.group_width(ColumnGroup::FixedRight);
        let body_height = props.height.saturating_sub(props.header_height);
        let content_height = rows.total_height();

        let scroll_viewport = props
            .width
            .saturating_sub(fixed_left_width)
            .saturating_sub(fixed_right_width);
        let max_scroll_x = scrollable_width.saturating_sub(scroll_viewport);
        let max_scroll_y = content_height.saturating_sub(u64::from(body_height));
        self.scroll_x = self.scroll_x.min(max_scroll_x);
        self.scroll_y = self.scroll_y.min(max_scroll_y);

        let (first_row_index, first_row_offset) = rows.row_at(self.scroll_y).unwrap_or((0, 0));

        self.snapshot = Arc::new(LayoutSnapshot {
            version: self.snapshot.version + 1,
            direction: props.direction,
            viewport_width: props.width,
            viewport_height: props.height,
            header_height: props.header_height,
            body_height,
            fixed_left_width,
            scrollable_width,
            fixed_right_width,
            scroll_x: self.scroll_x,
            scroll_y: self.scroll_y,
            max_scroll_x,
            max_scroll_y,
            content_height,
            first_row_index,
            first_row_offset,
            scrolling: self.scrolling,
            columns: Arc::clone(columns),
            rows: Arc::clone(rows),
        });
    }
}

fn build_rows(props: &TableProps) -> RowOffsets {
    RowOffsets::new(
        props.row_count,
        props.row_height,
        props.row_heights.iter().map(|(&i, &h)| (i, h)),
    )
}

#[cfg(feature = "tracing")]
fn action_name(action: &Action) -> &'static str {
    match action {
        Action::Initialize(_) => "initialize",
        Action::PropChange(_) => "prop_change",
        Action::ScrollToX(_) => "scroll_to_x",
        Action::ScrollToY(_) => "scroll_to_y",
        Action::ScrollBy { .. } => "scroll_by",
        Action::ScrollStart => "scroll_start",
        Action::ScrollEnd => "scroll_end",
        Action::ViewportResize { .. } => "viewport_resize",
        Action::RowHeightChange { .. } => "row_height_change",
        Action::ColumnResize { .. } => "column_resize",
        Action::ColumnReorder { .. } => "column_reorder",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props() -> TableProps {
        TableProps::new(300, 130)
            .header_height(30)
            .rows(10, 20)
            .columns(vec![
                Column::new("a", 100),
                Column::new("b", 150),
                Column::new("c", 200),
            ])
    }

    fn store() -> TableStore {
        TableStore::new(props()).expect("valid props")
    }

    // --- Initialization ---

    #[test]
    fn initial_snapshot_is_derived() {
        let snap = store().snapshot();
        assert_eq!(snap.version, 1);
        assert_eq!(snap.body_height, 100);
        assert_eq!(snap.content_height, 200);
        assert_eq!(snap.max_scroll_y, 100);
        assert_eq!(snap.scrollable_width, 450);
        assert_eq!(snap.max_scroll_x, 150);
        let expected: Vec<ColumnKey> = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(snap.order(), expected);
        assert_eq!(snap.columns()[2].left, 250);
    }

    #[test]
    fn pinned_columns_are_grouped() {
        let store = TableStore::new(TableProps::new(300, 100).columns(vec![
            Column::new("a", 50),
            Column::new("r", 40).fixed_right(),
            Column::new("l", 60).fixed(),
            Column::new("b", 70),
        ]))
        .unwrap();
        let snap = store.snapshot();
        let keys: Vec<_> = snap.order().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["l", "a", "b", "r"]);
        assert_eq!(snap.group_range(ColumnGroup::FixedLeft), 0..1);
        assert_eq!(snap.group_range(ColumnGroup::Scrollable), 1..3);
        assert_eq!(snap.group_range(ColumnGroup::FixedRight), 3..4);
        assert_eq!(snap.column(&"b".into()).unwrap().left, 50);
        assert_eq!(snap.fixed_right_start(), 260);
        assert_eq!(snap.scrollable_viewport_width(), 200);
    }

    #[test]
    fn initial_scroll_is_clamped() {
        let store = TableStore::new(props().scroll(10_000, 10_000)).unwrap();
        let snap = store.snapshot();
        assert_eq!(snap.scroll_x, 150);
        assert_eq!(snap.scroll_y, 100);
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = TableStore::new(
            TableProps::new(10, 10).columns(vec![Column::new("a", 1), Column::new("a", 2)]),
        )
        .unwrap_err();
        assert_eq!(err, LayoutError::DuplicateColumnKey("a".into()));
    }

    #[test]
    fn rejects_inverted_bounds_and_zero_heights() {
        let err = TableStore::new(
            TableProps::new(10, 10).columns(vec![Column::new("a", 1).min_width(5).max_width(2)]),
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidWidthBounds { .. }));
        assert_eq!(
            TableStore::new(TableProps::new(10, 10).rows(3, 0)).unwrap_err(),
            LayoutError::ZeroRowHeight { index: None }
        );
        assert_eq!(
            TableStore::new(TableProps::new(10, 10).rows(3, 5).row_height_at(1, 0)).unwrap_err(),
            LayoutError::ZeroRowHeight { index: Some(1) }
        );
    }

    // --- Scroll ---

    #[test]
    fn scroll_to_y_updates_first_row() {
        let mut store = store();
        let dirty = store.dispatch(Action::ScrollToY(45)).unwrap();
        assert_eq!(dirty, Dirty::SCROLL);
        let snap = store.snapshot();
        assert_eq!(snap.first_row_index, 2);
        assert_eq!(snap.first_row_offset, 5);
        assert_eq!(snap.visible_rows(), 2..8);
    }

    #[test]
    fn scroll_to_y_reaches_past_u32() {
        // Four rows of u32::MAX pixels: content far taller than u32 can address.
        let mut store = TableStore::new(TableProps::new(300, 130).rows(4, u32::MAX)).unwrap();
        let target = 5_000_000_000u64;
        store.dispatch(Action::ScrollToY(target)).unwrap();
        let snap = store.snapshot();
        assert_eq!(snap.scroll_y, target);
        assert_eq!(snap.first_row_index, 1);
        assert_eq!(snap.first_row_offset, target - u64::from(u32::MAX));
    }

    #[test]
    fn scroll_by_clamps_both_ends() {
        let mut store = store();
        store.dispatch(Action::ScrollBy { dx: -50, dy: -50 }).unwrap();
        assert_eq!(store.snapshot().scroll_x, 0);
        store
            .dispatch(Action::ScrollBy {
                dx: 10_000,
                dy: 10_000,
            })
            .unwrap();
        let snap = store.snapshot();
        assert_eq!(snap.scroll_x, snap.max_scroll_x);
        assert_eq!(snap.scroll_y, snap.max_scroll_y);
    }

    #[test]
    fn noop_action_keeps_snapshot_identity() {
        let mut store = store();
        let before = store.snapshot();
        assert!(store.dispatch(Action::ScrollToX(0)).unwrap().is_empty());
        assert!(store.dispatch(Action::ScrollEnd).unwrap().is_empty());
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
    }

    #[test]
    fn scrolling_flag_round_trip() {
        let mut store = store();
        store.dispatch(Action::ScrollStart).unwrap();
        assert!(store.snapshot().scrolling);
        store.dispatch(Action::ScrollEnd).unwrap();
        assert!(!store.snapshot().scrolling);
    }

    // --- Snapshot stability ---

    #[test]
    fn held_snapshot_is_not_affected_by_later_dispatch() {
        let mut store = store();
        let held = store.snapshot();
        store
            .dispatch(Action::RowHeightChange {
                index: 0,
                height: 50,
            })
            .unwrap();
        store.dispatch(Action::ScrollToY(40)).unwrap();
        assert_eq!(held.content_height, 200);
        assert_eq!(held.row_height(0), Some(20));
        assert_eq!(held.scroll_y, 0);
        let now = store.snapshot();
        assert_eq!(now.content_height, 230);
        assert_eq!(now.row_offset(1), 50);
        assert!(now.version > held.version);
    }

    // --- Rows ---

    #[test]
    fn row_height_change_is_incremental_and_validated() {
        let mut store = store();
        assert_eq!(
            store
                .dispatch(Action::RowHeightChange { index: 3, height: 40 })
                .unwrap(),
            Dirty::ROWS | Dirty::SCROLL
        );
        assert_eq!(store.snapshot().row_offset(4), 100);
        assert_eq!(
            store.dispatch(Action::RowHeightChange { index: 10, height: 5 }),
            Err(LayoutError::RowOutOfRange {
                index: 10,
                row_count: 10
            })
        );
        assert_eq!(
            store.dispatch(Action::RowHeightChange { index: 1, height: 0 }),
            Err(LayoutError::ZeroRowHeight { index: Some(1) })
        );
    }

    #[test]
    fn shrinking_rows_clamps_scroll() {
        let mut store = store();
        store.dispatch(Action::ScrollToY(100)).unwrap();
        let dirty = store.dispatch(Action::PropChange(props().rows(6, 20))).unwrap();
        assert!(dirty.contains(Dirty::ROWS));
        let snap = store.snapshot();
        assert_eq!(snap.max_scroll_y, 20);
        assert_eq!(snap.scroll_y, 20);
    }

    // --- Prop changes ---

    #[test]
    fn prop_change_marks_only_changed_parts() {
        let mut store = store();
        let rows_before = store.snapshot();
        let dirty = store
            .dispatch(Action::PropChange(TableProps {
                width: 400,
                ..props()
            }))
            .unwrap();
        assert_eq!(dirty, Dirty::VIEWPORT | Dirty::SCROLL);
        let snap = store.snapshot();
        assert!(Arc::ptr_eq(&rows_before.rows, &snap.rows));
        assert!(Arc::ptr_eq(&rows_before.columns, &snap.columns));
        assert_eq!(snap.max_scroll_x, 50);
    }

    #[test]
    fn unchanged_scroll_prop_keeps_user_scroll() {
        let mut store = TableStore::new(props().scroll(50, 0)).unwrap();
        store.dispatch(Action::ScrollToX(120)).unwrap();
        let dirty = store
            .dispatch(Action::PropChange(props().scroll(50, 0)))
            .unwrap();
        assert!(dirty.is_empty());
        assert_eq!(store.snapshot().scroll_x, 120);

        // A changed controlled value still wins.
        store
            .dispatch(Action::PropChange(props().scroll(30, 0)))
            .unwrap();
        assert_eq!(store.snapshot().scroll_x, 30);
    }

    #[test]
    fn out_of_range_scroll_prop_is_stable_across_rerenders() {
        let mut store = TableStore::new(props().scroll(10_000, 0)).unwrap();
        let before = store.snapshot();
        assert_eq!(before.scroll_x, 150);
        let dirty = store
            .dispatch(Action::PropChange(props().scroll(10_000, 0)))
            .unwrap();
        assert!(dirty.is_empty());
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
        assert_eq!(store.snapshot().version, before.version);
    }

    #[test]
    fn committed_columns_survive_unchanged_props() {
        let mut store = store();
        store
            .dispatch(Action::ColumnResize {
                key: "a".into(),
                width: 130,
            })
            .unwrap();
        store
            .dispatch(Action::ColumnReorder {
                order: vec!["c".into(), "a".into(), "b".into()],
            })
            .unwrap();
        store
            .dispatch(Action::RowHeightChange { index: 0, height: 50 })
            .unwrap();

        assert!(store.dispatch(Action::PropChange(props())).unwrap().is_empty());
        let snap = store.snapshot();
        let keys: Vec<_> = snap.order().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["c", "a", "b"]);
        assert_eq!(snap.column(&"a".into()).unwrap().column.width, 130);
        assert_eq!(snap.row_height(0), Some(50));

        // New host columns replace the committed state.
        store
            .dispatch(Action::PropChange(props().columns(vec![
                Column::new("a", 90),
                Column::new("b", 150),
                Column::new("c", 200),
            ])))
            .unwrap();
        let keys: Vec<_> = store.snapshot().order().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(store.snapshot().columns()[0].column.width, 90);
    }

    #[test]
    fn viewport_resize_survives_unchanged_props() {
        let mut store = store();
        store
            .dispatch(Action::ViewportResize {
                width: 500,
                height: 130,
            })
            .unwrap();
        assert!(store.dispatch(Action::PropChange(props())).unwrap().is_empty());
        assert_eq!(store.snapshot().viewport_width, 500);
    }

    #[test]
    fn identical_props_are_a_noop() {
        let mut store = store();
        assert!(store.dispatch(Action::PropChange(props())).unwrap().is_empty());
    }

    #[test]
    fn invalid_prop_change_leaves_state() {
        let mut store = store();
        let before = store.snapshot();
        let bad = props().columns(vec![Column::new("x", 1), Column::new("x", 1)]);
        assert!(store.dispatch(Action::PropChange(bad)).is_err());
        assert!(Arc::ptr_eq(&before, &store.snapshot()));
        assert_eq!(store.props().columns.len(), 3);
    }

    #[test]
    fn initialize_resets_scroll_but_keeps_version_monotonic() {
        let mut store = store();
        store.dispatch(Action::ScrollToY(60)).unwrap();
        let version = store.snapshot().version;
        store.dispatch(Action::Initialize(props())).unwrap();
        let snap = store.snapshot();
        assert_eq!(snap.scroll_y, 0);
        assert!(snap.version > version);
    }

    // --- Column commits ---

    #[test]
    fn column_resize_is_clamped() {
        let mut store = TableStore::new(
            TableProps::new(300, 100)
                .columns(vec![Column::new("a", 100).min_width(50).max_width(200)]),
        )
        .unwrap();
        store
            .dispatch(Action::ColumnResize {
                key: "a".into(),
                width: 999,
            })
            .unwrap();
        assert_eq!(store.snapshot().columns()[0].column.width, 200);
        assert_eq!(
            store.dispatch(Action::ColumnResize {
                key: "zz".into(),
                width: 1,
            }),
            Err(LayoutError::UnknownColumn("zz".into()))
        );
    }

    #[test]
    fn column_reorder_requires_permutation() {
        let mut store = store();
        assert_eq!(
            store.dispatch(Action::ColumnReorder {
                order: vec!["a".into(), "b".into()],
            }),
            Err(LayoutError::NotAPermutation {
                expected: 3,
                got: 2
            })
        );
        assert!(
            store
                .dispatch(Action::ColumnReorder {
                    order: vec!["a".into(), "a".into(), "b".into()],
                })
                .is_err()
        );
        store
            .dispatch(Action::ColumnReorder {
                order: vec!["c".into(), "a".into(), "b".into()],
            })
            .unwrap();
        let snap = store.snapshot();
        assert_eq!(snap.column_index(&"c".into()), Some(0));
        assert_eq!(snap.column(&"a".into()).unwrap().left, 200);
    }

    #[test]
    fn column_reorder_keeps_pinned_columns_in_group() {
        let mut store = TableStore::new(TableProps::new(300, 100).columns(vec![
            Column::new("l", 10).fixed(),
            Column::new("a", 10),
            Column::new("b", 10),
        ]))
        .unwrap();
        store
            .dispatch(Action::ColumnReorder {
                order: vec!["b".into(), "a".into(), "l".into()],
            })
            .unwrap();
        let keys: Vec<_> = store.snapshot().order().iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, ["l", "b", "a"]);
    }

    #[test]
    fn layout_error_display() {
        assert_eq!(
            LayoutError::UnknownColumn("q".into()).to_string(),
            "unknown column \"q\""
        );
        assert_eq!(
            LayoutError::ZeroRowHeight { index: Some(4) }.to_string(),
            "row 4 has zero height"
        );
    }
}
