#![forbid(unsafe_code)]

//! Column resize and reorder for virtualized tables.
//!
//! - [`TableStore`] - single writer of derived layout state, publishing
//!   immutable [`LayoutSnapshot`]s
//! - [`DragTracker`] - the (at most one) in-flight gesture of a table
//! - [`commit`] - final widths, reorder slots, and emitted [`ColumnEvent`]s
//! - [`TableInteraction`] - pointer event entry point tying the above together
//!
//! # Example
//!
//! ```
//! use fixgrid_columns::{Column, ColumnEvent, InteractionConfig, TableInteraction, TableProps, TableStore};
//! use fixgrid_core::event::PointerEvent;
//! use fixgrid_core::geometry::Rect;
//!
//! let mut store = TableStore::new(TableProps::new(400, 200).columns(vec![
//!     Column::new("name", 100).min_width(50).max_width(200),
//!     Column::new("size", 100),
//! ]))?;
//! let mut ui = TableInteraction::new(InteractionConfig::default(), Rect::from_size(400, 200));
//!
//! // Grab the trailing edge of "name" and drag it 30px.
//! ui.handle(&PointerEvent::down(98, 10), &mut store);
//! ui.handle(&PointerEvent::moved(128, 10), &mut store);
//! let event = ui.handle(&PointerEvent::up(128, 10), &mut store);
//!
//! assert_eq!(
//!     event,
//!     Some(ColumnEvent::ResizeEnd { new_width: 130, column_key: "name".into() })
//! );
//! assert_eq!(store.snapshot().columns()[0].column.width, 130);
//! # Ok::<(), fixgrid_columns::LayoutError>(())
//! ```

pub mod column;
pub mod commit;
pub mod config;
pub mod drag;
pub mod interaction;
pub mod offset;
pub mod rows;
pub mod store;

pub use column::{Column, ColumnFlags, ColumnGroup, ColumnKey, clamp_width};
pub use commit::{ColumnEvent, ColumnReorderEnd, ColumnShift, ReorderPreview};
pub use config::{CommitPolicy, InteractionConfig, ReorderTieBreak};
pub use drag::{DragError, DragKind, DragSession, DragTracker, DragUpdate};
pub use interaction::{GesturePreview, TableInteraction};
pub use offset::{ColumnHit, hit_test};
pub use rows::RowOffsets;
pub use store::{Action, Dirty, LayoutError, LayoutSnapshot, TableProps, TableStore};
