#![forbid(unsafe_code)]

//! Interaction configuration.

/// Default width of the resize grab band at a column's trailing edge.
pub const DEFAULT_RESIZE_HANDLE_WIDTH: u32 = 6;

/// What happens to the layout store when a gesture completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommitPolicy {
    /// Apply the committed width/order to the store and emit the event.
    #[default]
    ApplyToStore,
    /// Only emit the event; the host feeds the result back as new props.
    EmitOnly,
}

/// How a reorder treats a leading edge landing exactly on a midpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReorderTieBreak {
    /// An exact tie counts as crossing in the direction of travel.
    #[default]
    TowardTravel,
    /// An exact tie leaves the column where it is.
    StayInPlace,
}

/// Configuration for column resize/reorder gestures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionConfig {
    /// Width in pixels of the resize band at each column's trailing edge
    /// (default: 6).
    pub resize_handle_width: u32,
    /// Whether completed gestures are applied to the store (default:
    /// [`CommitPolicy::ApplyToStore`]).
    pub commit_policy: CommitPolicy,
    /// Midpoint tie handling for reorders (default: toward travel).
    pub tie_break: ReorderTieBreak,
    /// Whether the pointer leaving the table cancels the gesture (default:
    /// true). Platform pointer-cancel always cancels.
    pub cancel_on_leave: bool,
    /// Whether gestures may only start on the header row (default: true).
    pub header_only: bool,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            resize_handle_width: DEFAULT_RESIZE_HANDLE_WIDTH,
            commit_policy: CommitPolicy::default(),
            tie_break: ReorderTieBreak::default(),
            cancel_on_leave: true,
            header_only: true,
        }
    }
}

impl InteractionConfig {
    /// Set the resize handle width.
    #[must_use]
    pub fn with_resize_handle_width(mut self, width: u32) -> Self {
        self.resize_handle_width = width;
        self
    }

    /// Set the commit policy.
    #[must_use]
    pub fn with_commit_policy(mut self, policy: CommitPolicy) -> Self {
        self.commit_policy = policy;
        self
    }

    /// Set the reorder tie-break rule.
    #[must_use]
    pub fn with_tie_break(mut self, tie_break: ReorderTieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// Keep gestures alive when the pointer leaves the table.
    #[must_use]
    pub fn keep_on_leave(mut self) -> Self {
        self.cancel_on_leave = false;
        self
    }

    /// Allow gestures to start anywhere in a column, not just the header.
    #[must_use]
    pub fn anywhere_in_column(mut self) -> Self {
        self.header_only = false;
        self
    }
}
