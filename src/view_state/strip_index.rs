//! StripIndex - O(log n) page edges via Fenwick tree
//!
//! Pages are laid out left to right with no gap, so the left edge of page `i` is the sum of
//! the widths of pages `0..i`. Widths change whenever a page changes zoom; the Fenwick tree
//! keeps both updates and edge queries logarithmic.
//!
//! # Complexity
//!
//! - `set`: O(log n)
//! - `left_of` / `right_of`: O(log n)
//! - `lower_bound`: O(log² n)
//! - `push`: O(log n) amortized
//! - `width`, `len`: O(1)

/// Prefix sums of page container widths, in whole pixels.
#[derive(Debug, Clone, Default)]
pub struct StripIndex {
    /// Fenwick tree, 0-indexed API over the `fenwick` crate's array functions.
    tree: Vec<isize>,
    /// Plain widths, for O(1) reads and deltas.
    widths: Vec<usize>,
}

impl StripIndex {
    /// Empty index with room for `capacity` pages.
    pub fn new(capacity: usize) -> Self {
        Self {
            tree: vec![0; capacity],
            widths: Vec::with_capacity(capacity),
        }
    }

    /// Index over `widths`, in page order.
    ///
    /// # Examples
    ///
    /// ```
    /// # use smartflow::view_state::strip_index::StripIndex;
    /// let index = StripIndex::from_widths([100, 200, 150]);
    /// assert_eq!(index.left_of(2), 300);
    /// assert_eq!(index.total(), 450);
    /// ```
    pub fn from_widths(widths: impl IntoIterator<Item = usize>) -> Self {
        let widths: Vec<usize> = widths.into_iter().collect();
        let mut index = Self::new(widths.len());
        for width in widths {
            index.push(width);
        }
        index
    }

    /// Number of pages.
    pub fn len(&self) -> usize {
        self.widths.len()
    }

    /// True when no page is indexed.
    pub fn is_empty(&self) -> bool {
        self.widths.is_empty()
    }

    /// Width of page `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn width(&self, index: usize) -> usize {
        self.widths[index]
    }

    /// Append a page.
    pub fn push(&mut self, width: usize) {
        let index = self.widths.len();
        self.widths.push(width);
        if index >= self.tree.len() {
            // Growing invalidates the upper tree nodes; rebuild from the plain widths.
            self.rebuild(self.tree.len().max(1) * 2);
        } else {
            fenwick::array::update(&mut self.tree, index, width as isize);
        }
    }

    fn rebuild(&mut self, capacity: usize) {
        self.tree = vec![0; capacity];
        for (index, &width) in self.widths.iter().enumerate() {
            fenwick::array::update(&mut self.tree, index, width as isize);
        }
    }

    /// Change the width of page `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn set(&mut self, index: usize, width: usize) {
        assert!(
            index < self.len(),
            "index {} out of bounds (len: {})",
            index,
            self.len()
        );
        let delta = width as isize - self.widths[index] as isize;
        self.widths[index] = width;
        if delta != 0 {
            fenwick::array::update(&mut self.tree, index, delta);
        }
    }

    /// Right edge of page `index`: sum of widths of pages `0..=index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    pub fn right_of(&self, index: usize) -> usize {
        assert!(
            index < self.len(),
            "index {} out of bounds (len: {})",
            index,
            self.len()
        );
        fenwick::array::prefix_sum(&self.tree, index).max(0) as usize
    }

    /// Left edge of page `index`: sum of widths of pages `0..index`.
    pub fn left_of(&self, index: usize) -> usize {
        match index {
            0 => 0,
            _ => self.right_of(index - 1),
        }
    }

    /// Total strip width.
    pub fn total(&self) -> usize {
        match self.len() {
            0 => 0,
            len => self.right_of(len - 1),
        }
    }

    /// Page containing horizontal strip coordinate `offset`.
    ///
    /// Returns the first index whose right edge is beyond `offset`, or `None` past the end.
    ///
    /// # Examples
    ///
    /// ```
    /// # use smartflow::view_state::strip_index::StripIndex;
    /// let index = StripIndex::from_widths([10, 20, 15]);
    /// assert_eq!(index.lower_bound(0), Some(0));
    /// assert_eq!(index.lower_bound(10), Some(1));
    /// assert_eq!(index.lower_bound(44), Some(2));
    /// assert_eq!(index.lower_bound(45), None);
    /// ```
    pub fn lower_bound(&self, offset: usize) -> Option<usize> {
        let mut left = 0;
        let mut right = self.len();
        while left < right {
            let mid = left + (right - left) / 2;
            if self.right_of(mid) > offset {
                right = mid;
            } else {
                left = mid + 1;
            }
        }
        (left < self.len()).then_some(left)
    }
}
