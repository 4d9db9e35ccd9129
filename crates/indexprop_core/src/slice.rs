//! Define shared slice and range semantics (policy + pure helpers).
//!
//! ## Notes
//! - [`IndexRange`] is a Python-like `range(start, stop, step)`: end-exclusive, any non-zero step.
//! - [`Slice`] is a `start:stop:step` triple where any field may be omitted.
//! - [`Slice::within`] expands a slice against a half-open key domain `[lo, hi)`. Bounds are **absolute keys**;
//!   a negative bound wraps from `hi` when the domain is non-negative, exactly like a negative integer key. For
//!   `lo == 0` this is identical to slicing Python's `range(0, hi)`.

use core::fmt;
use core::iter::FusedIterator;

/// Describe the slice step-zero error message.
pub const SLICE_STEP_ZERO_MSG: &str = "slice step cannot be zero";

/// Represent slice/range construction errors produced by semantic-core helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceError {
    StepZero,
}

impl SliceError {
    /// Return the canonical error message for this error.
    pub fn message(self) -> &'static str {
        match self {
            SliceError::StepZero => SLICE_STEP_ZERO_MSG,
        }
    }
}

impl fmt::Display for SliceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A `start:stop:step` slice with optional fields.
///
/// ## Examples
/// ```rust
/// use indexprop_core::Slice;
///
/// let tail = Slice::new(Some(-3), None, None);
/// let keys: Vec<i64> = tail.within(1, 11).unwrap().iter().collect();
/// assert_eq!(keys, vec![8, 9, 10]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Slice {
    pub start: Option<i64>,
    pub stop: Option<i64>,
    pub step: Option<i64>,
}

impl Slice {
    /// The `:` slice covering the whole domain.
    pub const FULL: Slice = Slice::new(None, None, None);

    /// Construct a slice from its three optional fields.
    pub const fn new(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Self {
        Self { start, stop, step }
    }

    /// Expand this slice against the half-open key domain `[lo, hi)`.
    ///
    /// ## Parameters
    /// - `lo`: first key of the domain.
    /// - `hi`: one past the last key of the domain (`hi >= lo`).
    ///
    /// ## Returns
    /// - `Ok(IndexRange)`: the keys selected, in slice order (descending for a negative step).
    /// - `Err(SliceError::StepZero)`: if the step is zero.
    ///
    /// ## Notes
    /// - Omitted fields follow Python defaults (`step = 1`; start/stop default to the ends chosen by the step sign).
    /// - Out-of-domain bounds are clamped, never rejected.
    pub fn within(&self, lo: i64, hi: i64) -> Result<IndexRange, SliceError> {
        let step = self.step.unwrap_or(1);
        if step == 0 {
            return Err(SliceError::StepZero);
        }

        let len = hi.saturating_sub(lo).max(0);
        let wraps = lo >= 0;
        let offset = |bound: i64| {
            let absolute = if wraps && bound < 0 {
                bound.saturating_add(hi)
            } else {
                bound
            };
            absolute.saturating_sub(lo)
        };

        // For negative steps the clamp window is [-1, len-1] (Python-like sentinel).
        let (lower, upper) = if step > 0 { (0, len) } else { (-1, len - 1) };

        let start = match self.start {
            Some(bound) => offset(bound).clamp(lower, upper),
            None if step > 0 => lower,
            None => upper,
        };
        let stop = match self.stop {
            Some(bound) => offset(bound).clamp(lower, upper),
            None if step > 0 => upper,
            None => lower,
        };

        Ok(IndexRange {
            start: start.saturating_add(lo),
            stop: stop.saturating_add(lo),
            step,
        })
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn field(f: &mut fmt::Formatter<'_>, value: Option<i64>) -> fmt::Result {
            match value {
                Some(v) => write!(f, "{v}"),
                None => f.write_str("None"),
            }
        }
        f.write_str("slice(")?;
        field(f, self.start)?;
        f.write_str(", ")?;
        field(f, self.stop)?;
        f.write_str(", ")?;
        field(f, self.step)?;
        f.write_str(")")
    }
}

/// A Python-like `range(start, stop, step)` over `i64`.
///
/// The step is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexRange {
    start: i64,
    stop: i64,
    step: i64,
}

impl IndexRange {
    /// Create an ascending `range(start, stop)`.
    pub const fn new(start: i64, stop: i64) -> Self {
        Self { start, stop, step: 1 }
    }

    /// Create a `range(start, stop, step)`.
    ///
    /// ## Errors
    /// - `SliceError::StepZero` if `step == 0`.
    pub const fn with_step(start: i64, stop: i64, step: i64) -> Result<Self, SliceError> {
        if step == 0 {
            return Err(SliceError::StepZero);
        }
        Ok(Self { start, stop, step })
    }

    pub const fn start(&self) -> i64 {
        self.start
    }

    pub const fn stop(&self) -> i64 {
        self.stop
    }

    pub const fn step(&self) -> i64 {
        self.step
    }

    /// Number of values the range yields.
    pub fn len(&self) -> usize {
        let (start, stop, step) = (i128::from(self.start), i128::from(self.stop), i128::from(self.step));
        let count = if step > 0 && start < stop {
            (stop - start - 1) / step + 1
        } else if step < 0 && start > stop {
            (start - stop - 1) / (-step) + 1
        } else {
            0
        };
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Return true if the range yields nothing.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether `value` is one of the values the range yields.
    pub fn contains(&self, value: i64) -> bool {
        let in_bounds = if self.step > 0 {
            self.start <= value && value < self.stop
        } else {
            self.stop < value && value <= self.start
        };
        in_bounds && (i128::from(value) - i128::from(self.start)) % i128::from(self.step) == 0
    }

    /// Iterate the range's values in order.
    pub fn iter(&self) -> IndexRangeIter {
        IndexRangeIter {
            front: self.start,
            step: self.step,
            remaining: self.len(),
        }
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.step == 1 {
            write!(f, "range({}, {})", self.start, self.stop)
        } else {
            write!(f, "range({}, {}, {})", self.start, self.stop, self.step)
        }
    }
}

impl IntoIterator for IndexRange {
    type Item = i64;
    type IntoIter = IndexRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &IndexRange {
    type Item = i64;
    type IntoIter = IndexRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over an [`IndexRange`]; restartable by calling [`IndexRange::iter`] again.
#[derive(Debug, Clone)]
pub struct IndexRangeIter {
    front: i64,
    step: i64,
    remaining: usize,
}

impl Iterator for IndexRangeIter {
    type Item = i64;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let out = self.front;
        self.remaining -= 1;
        self.front = self.front.wrapping_add(self.step);
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl DoubleEndedIterator for IndexRangeIter {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        // The value is inside the original range, so the narrowing cast cannot truncate.
        let back = i128::from(self.front) + i128::from(self.step) * self.remaining as i128;
        Some(back as i64)
    }
}

impl ExactSizeIterator for IndexRangeIter {}

impl FusedIterator for IndexRangeIter {}
