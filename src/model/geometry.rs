//! Geometry primitives shared by layout, pool and gesture code.
//!
//! [`Position`] is a 1-D range tagged with its axis. A position may be stored "inverted"
//! (`end < start`); every comparison respects the stored order of `self`, and the other
//! operand is re-oriented to match before comparing.

use std::fmt;
use std::marker::PhantomData;

/// Width and height, both non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// True if `self` is strictly wider than `other`.
    pub fn is_wider(&self, other: &Size) -> bool {
        self.width > other.width
    }

    /// True if `self` is strictly higher than `other`.
    pub fn is_higher(&self, other: &Size) -> bool {
        self.height > other.height
    }

    /// Both dimensions multiplied by `factor`, floored to whole pixels.
    pub fn scaled_floor(&self, factor: f64) -> Size {
        Size::new((self.width * factor).floor(), (self.height * factor).floor())
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A point in screen or page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Translation part of a transform.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Translate {
    /// Horizontal translation.
    pub left: f64,
    /// Vertical translation.
    pub top: f64,
}

impl Translate {
    /// Create a new translation.
    pub const fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// Axis marker for [`Position`].
pub trait Axis: fmt::Debug + Clone + Copy + PartialEq {
    /// Human-readable axis name.
    const NAME: &'static str;
}

/// Vertical axis marker: positions are `{top, bottom}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertical;

/// Horizontal axis marker: positions are `{left, right}`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal;

impl Axis for Vertical {
    const NAME: &'static str = "vertical";
}

impl Axis for Horizontal {
    const NAME: &'static str = "horizontal";
}

/// 1-D range `{start_edge, end_edge}` on axis `A`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position<A: Axis> {
    start: f64,
    end: f64,
    _axis: PhantomData<A>,
}

/// `{top, bottom}` range.
pub type VerticalPosition = Position<Vertical>;

/// `{left, right}` range.
pub type HorizontalPosition = Position<Horizontal>;

impl<A: Axis> Position<A> {
    /// Create a range from its start and end edges, in stored order.
    pub const fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            _axis: PhantomData,
        }
    }

    /// Range starting at `start` spanning `length`.
    pub fn from_length(start: f64, length: f64) -> Self {
        Self::new(start, start + length)
    }

    /// Start edge as stored.
    pub fn start(&self) -> f64 {
        self.start
    }

    /// End edge as stored.
    pub fn end(&self) -> f64 {
        self.end
    }

    /// `|end - start|`.
    pub fn length(&self) -> f64 {
        (self.end - self.start).abs()
    }

    /// True when stored as `end >= start`.
    pub fn is_normal(&self) -> bool {
        self.end >= self.start
    }

    /// Midpoint of the range.
    pub fn midpoint(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    /// Translate both edges by `delta`.
    pub fn move_by(&mut self, delta: f64) -> &mut Self {
        self.start += delta;
        self.end += delta;
        self
    }

    /// Replace both edges.
    pub fn set(&mut self, start: f64, end: f64) -> &mut Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Edge-wise equality.
    pub fn is_equal(&self, other: &Self) -> bool {
        self == other
    }

    /// `true` if `a` comes strictly before `b` in this range's orientation.
    fn before(&self, a: f64, b: f64) -> bool {
        if self.is_normal() {
            a < b
        } else {
            a > b
        }
    }

    /// `other`'s edges in this range's orientation.
    fn oriented(&self, other: &Self) -> (f64, f64) {
        if self.is_normal() == other.is_normal() {
            (other.start, other.end)
        } else {
            (other.end, other.start)
        }
    }

    /// True if the ranges share more than an edge.
    pub fn overlap(&self, other: &Self) -> bool {
        self.intersection(other).is_some()
    }

    /// Shared part of the two ranges, in `self`'s orientation.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let (other_start, other_end) = self.oriented(other);
        let (start, end) = if self.is_normal() {
            (self.start.max(other_start), self.end.min(other_end))
        } else {
            (self.start.min(other_start), self.end.max(other_end))
        };

        if self.before(start, end) {
            Some(Self::new(start, end))
        } else {
            None
        }
    }

    /// Parts of `self` not covered by `other` (zero, one or two ranges).
    ///
    /// Returns `None` when the ranges do not overlap at all.
    pub fn difference(&self, other: &Self) -> Option<Vec<Self>> {
        if !self.overlap(other) {
            return None;
        }

        let (other_start, other_end) = self.oriented(other);
        let mut parts = Vec::with_capacity(2);
        if self.before(self.start, other_start) {
            parts.push(Self::new(self.start, other_start));
        }
        if self.before(other_end, self.end) {
            parts.push(Self::new(other_end, self.end));
        }
        Some(parts)
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Self) -> bool {
        let (other_start, other_end) = self.oriented(other);
        !self.before(other_start, self.start) && !self.before(self.end, other_end)
    }
}

impl Position<Vertical> {
    /// Top edge.
    pub fn top(&self) -> f64 {
        self.start
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f64 {
        self.end
    }
}

impl Position<Horizontal> {
    /// Left edge.
    pub fn left(&self) -> f64 {
        self.start
    }

    /// Right edge.
    pub fn right(&self) -> f64 {
        self.end
    }
}

impl<A: Axis> fmt::Display for Position<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}, {}]", A::NAME, self.start, self.end)
    }
}

/// Axis-aligned rectangle built from one horizontal and one vertical range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Horizontal extent.
    pub horizontal: HorizontalPosition,
    /// Vertical extent.
    pub vertical: VerticalPosition,
}

impl Rect {
    /// Rectangle with top-left corner `origin` and the given size.
    pub fn new(origin: Point, size: Size) -> Self {
        Self {
            horizontal: HorizontalPosition::from_length(origin.x, size.width),
            vertical: VerticalPosition::from_length(origin.y, size.height),
        }
    }

    /// True if the rectangles intersect, or one lies entirely within the other.
    pub fn overlap(&self, other: &Rect) -> bool {
        let intersects =
            self.horizontal.overlap(&other.horizontal) && self.vertical.overlap(&other.vertical);
        intersects || self.contains(other) || other.contains(self)
    }

    /// True if `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Rect) -> bool {
        self.horizontal.contains(&other.horizontal) && self.vertical.contains(&other.vertical)
    }

    /// Size of the rectangle.
    pub fn size(&self) -> Size {
        Size::new(self.horizontal.length(), self.vertical.length())
    }
}
