// Copyright (c) 2024 Mike Tsao

//! Canvas-space quantities. Nothing here knows about musical time.

use core::{
    fmt::{self, Display},
    ops::{Div, Mul},
};
use derive_more::{Add, AddAssign, From, Neg, Sub, SubAssign};
use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumIter};

/// A canvas distance or coordinate, in device pixels.
#[derive(
    Add,
    AddAssign,
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    From,
    Neg,
    PartialEq,
    PartialOrd,
    Serialize,
    Sub,
    SubAssign,
)]
pub struct Px(pub f64);
#[allow(missing_docs)]
impl Px {
    pub const ZERO: Px = Px(0.0);

    pub fn max(self, other: Px) -> Px {
        Px(self.0.max(other.0))
    }

    pub fn min(self, other: Px) -> Px {
        Px(self.0.min(other.0))
    }

    pub fn clamp(self, min: Px, max: Px) -> Px {
        self.max(min).min(max)
    }

    pub fn abs(self) -> Px {
        Px(self.0.abs())
    }
}
impl Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}
impl Mul<f64> for Px {
    type Output = Px;

    fn mul(self, rhs: f64) -> Self::Output {
        Px(self.0 * rhs)
    }
}
impl Div<f64> for Px {
    type Output = Px;

    fn div(self, rhs: f64) -> Self::Output {
        Px(self.0 / rhs)
    }
}
impl Div<Px> for Px {
    type Output = f64;

    fn div(self, rhs: Px) -> Self::Output {
        self.0 / rhs.0
    }
}

/// A position on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[allow(missing_docs)]
    pub x: Px,
    #[allow(missing_docs)]
    pub y: Px,
}
impl Point {
    #[allow(missing_docs)]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x: Px(x), y: Px(y) }
    }
}

/// An axis-aligned rectangle on the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    #[allow(missing_docs)]
    pub x: Px,
    #[allow(missing_docs)]
    pub y: Px,
    #[allow(missing_docs)]
    pub width: Px,
    #[allow(missing_docs)]
    pub height: Px,
}
impl Rect {
    #[allow(missing_docs)]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: Px(x),
            y: Px(y),
            width: Px(width),
            height: Px(height),
        }
    }

    /// The rectangle spanned by two opposite corners, in either order. This is
    /// what a marquee drag produces.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let left = a.x.min(b.x);
        let top = a.y.min(b.y);
        Self {
            x: left,
            y: top,
            width: a.x.max(b.x) - left,
            height: a.y.max(b.y) - top,
        }
    }

    #[allow(missing_docs)]
    pub fn right(&self) -> Px {
        self.x + self.width
    }

    #[allow(missing_docs)]
    pub fn bottom(&self) -> Px {
        self.y + self.height
    }

    /// Two rectangles overlap iff their projections overlap on both axes.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Inclusive on the top/left edges, exclusive on the bottom/right.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

/// The four ways a keyboard nudge can move a selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, StrumDisplay)]
#[allow(missing_docs)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}
impl Direction {
    #[allow(missing_docs)]
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn px_math() {
        let a = Px(10.0);
        let b = Px(4.0);
        assert_eq!(a + b, Px(14.0));
        assert_eq!(a - b, Px(6.0));
        assert_eq!(-a, Px(-10.0));
        assert_eq!(a * 0.5, Px(5.0));
        assert_eq!(a / b, 2.5);
        assert_eq!(Px(-3.0).max(Px::ZERO), Px::ZERO);
        assert_eq!(Px(30.0).clamp(Px(0.0), Px(20.0)), Px(20.0));
    }

    #[test]
    fn rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 10.0, 10.0)));
        assert!(
            !a.overlaps(&Rect::new(10.0, 0.0, 10.0, 10.0)),
            "touching edges don't overlap"
        );
        assert!(
            !a.overlaps(&Rect::new(5.0, 20.0, 10.0, 10.0)),
            "both axes must overlap"
        );
        assert!(a.overlaps(&Rect::new(2.0, 2.0, 1.0, 1.0)), "containment overlaps");
    }

    #[test]
    fn rect_from_corners_normalizes() {
        let r = Rect::from_corners(Point::new(30.0, 5.0), Point::new(10.0, 25.0));
        assert_eq!(r, Rect::new(10.0, 5.0, 20.0, 20.0));
        assert!(r.contains(Point::new(10.0, 5.0)));
        assert!(!r.contains(Point::new(30.0, 5.0)));
    }
}
