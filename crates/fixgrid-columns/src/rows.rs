#![forbid(unsafe_code)]

//! Row offsets over variable row heights.
//!
//! [`RowOffsets`] keeps one height per row in a Fenwick tree (binary indexed
//! tree) so that the y-offset of any row, the total content height, and the
//! row under a given scroll position are all O(log n). A single height change
//! is an O(log n) point update rather than a full recompute.
//!
//! # Invariants
//!
//! 1. `offset_of(i) == sum(heights[0..i])`.
//! 2. `total_height() == offset_of(len())`.
//! 3. Every stored height is non-zero, so `row_at` is well defined.

/// Fenwick tree of `u64` sums, 1-indexed internally (`tree[0]` unused).
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fenwick {
    tree: Vec<u64>,
}

impl Fenwick {
    fn from_values(values: impl ExactSizeIterator<Item = u32>) -> Self {
        let n = values.len();
        let mut tree = Vec::with_capacity(n + 1);
        tree.push(0);
        tree.extend(values.map(u64::from));
        // Parent propagation in O(n).
        for i in 1..=n {
            let parent = i + lowbit(i);
            if parent <= n {
                tree[parent] += tree[i];
            }
        }
        Self { tree }
    }

    fn len(&self) -> usize {
        self.tree.len() - 1
    }

    /// Sum of the first `count` values.
    fn prefix(&self, count: usize) -> u64 {
        let mut sum = 0;
        let mut idx = count.min(self.len());
        while idx > 0 {
            sum += self.tree[idx];
            idx -= lowbit(idx);
        }
        sum
    }

    fn add(&mut self, i: usize, delta: i64) {
        let mut idx = i + 1;
        while idx <= self.len() {
            self.tree[idx] = self.tree[idx].saturating_add_signed(delta);
            idx += lowbit(idx);
        }
    }

    /// Number of leading values whose running sum stays `<= target`.
    fn count_within(&self, target: u64) -> usize {
        let n = self.len();
        let mut pos = 0usize;
        let mut remaining = target;
        let mut step = most_significant_bit(n);
        while step > 0 {
            let next = pos + step;
            if next <= n && self.tree[next] <= remaining {
                remaining -= self.tree[next];
                pos = next;
            }
            step >>= 1;
        }
        pos
    }
}

/// Heights and offsets of every row in a table body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOffsets {
    heights: Vec<u32>,
    sums: Fenwick,
}

impl RowOffsets {
    /// Build offsets for `count` rows of `default_height`, with per-row
    /// overrides applied. Overrides past `count` are ignored.
    ///
    /// Callers guarantee non-zero heights (see [`crate::store::TableProps`]).
    pub fn new(
        count: usize,
        default_height: u32,
        overrides: impl IntoIterator<Item = (usize, u32)>,
    ) -> Self {
        let mut heights = vec![default_height; count];
        for (index, height) in overrides {
            if let Some(slot) = heights.get_mut(index) {
                *slot = height;
            }
        }
        let sums = Fenwick::from_values(heights.iter().copied());
        Self { heights, sums }
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.heights.len()
    }

    /// Whether there are no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Height of row `index`, if it exists.
    pub fn height_of(&self, index: usize) -> Option<u32> {
        self.heights.get(index).copied()
    }

    /// Y-offset of the top of row `index`. `offset_of(len())` is the total.
    pub fn offset_of(&self, index: usize) -> u64 {
        self.sums.prefix(index)
    }

    /// Total content height.
    pub fn total_height(&self) -> u64 {
        self.sums.prefix(self.len())
    }

    /// Row covering vertical content position `y`, with the distance from
    /// that row's top edge. Positions at or past the end resolve to the last
    /// row; `None` for an empty table.
    pub fn row_at(&self, y: u64) -> Option<(usize, u64)> {
        if self.is_empty() {
            return None;
        }
        let index = self.sums.count_within(y).min(self.len() - 1);
        Some((index, y.saturating_sub(self.offset_of(index))))
    }

    /// Change the height of one row. Returns `false` if nothing changed.
    pub fn set_height(&mut self, index: usize, height: u32) -> bool {
        let Some(slot) = self.heights.get_mut(index) else {
            return false;
        };
        if *slot == height {
            return false;
        }
        let delta = i64::from(height) - i64::from(*slot);
        *slot = height;
        self.sums.add(index, delta);
        true
    }
}

/// Lowest set bit of `x`. E.g., `lowbit(6) = 2`, `lowbit(4) = 4`.
#[inline]
fn lowbit(x: usize) -> usize {
    x & x.wrapping_neg()
}

/// Most significant bit that fits within `n`.
#[inline]
fn most_significant_bit(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    1 << (usize::BITS - 1 - n.leading_zeros())
}
