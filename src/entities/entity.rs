// Copyright (c) 2024 Mike Tsao

use crate::types::{EntityId, Point, Px, Rect};

/// A pixel value that has a committed baseline and a working value. During a
/// drag the working value moves while the committed value stays put, so that
/// deltas are always measured from where the interaction began.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Tracked {
    committed: Px,
    working: Px,
}
impl Tracked {
    /// A value whose working and committed halves agree.
    pub fn new(value: Px) -> Self {
        Self {
            committed: value,
            working: value,
        }
    }

    /// The live value.
    pub fn working(&self) -> Px {
        self.working
    }

    /// The last confirmed value.
    pub fn committed(&self) -> Px {
        self.committed
    }

    /// Moves the live value without touching the baseline.
    pub fn set(&mut self, value: Px) {
        self.working = value;
    }

    /// Confirms the live value as the new baseline.
    pub fn commit(&mut self) {
        self.committed = self.working;
    }

    /// Abandons the live value.
    pub fn revert(&mut self) {
        self.working = self.committed;
    }

    /// True while the live value differs from the baseline.
    pub fn is_dirty(&self) -> bool {
        self.working != self.committed
    }

    /// Scales both halves by the same factor.
    pub fn rescale(&mut self, factor: f64) {
        self.working = self.working * factor;
        self.committed = self.committed * factor;
    }
}

/// A rectangle on an editor's canvas that stands for a note or a section.
#[derive(Clone, Debug, PartialEq)]
pub struct GridEntity {
    id: EntityId,
    #[allow(missing_docs)]
    pub x: Tracked,
    #[allow(missing_docs)]
    pub y: Tracked,
    #[allow(missing_docs)]
    pub width: Tracked,
    #[allow(missing_docs)]
    pub height: Px,
    #[allow(missing_docs)]
    pub selected: bool,
}
impl GridEntity {
    /// Creates an entity whose committed and live geometry agree.
    pub fn new(id: EntityId, x: Px, y: Px, width: Px, height: Px) -> Self {
        Self {
            id,
            x: Tracked::new(x),
            y: Tracked::new(y),
            width: Tracked::new(width),
            height,
            selected: false,
        }
    }

    #[allow(missing_docs)]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Live geometry.
    pub fn rect(&self) -> Rect {
        Rect {
            x: self.x.working(),
            y: self.y.working(),
            width: self.width.working(),
            height: self.height,
        }
    }

    /// Geometry as of the last completed interaction.
    pub fn committed_rect(&self) -> Rect {
        Rect {
            x: self.x.committed(),
            y: self.y.committed(),
            width: self.width.committed(),
            height: self.height,
        }
    }

    /// Copies live geometry into the baseline.
    pub fn commit(&mut self) {
        self.x.commit();
        self.y.commit();
        self.width.commit();
    }

    /// Restores the baseline geometry.
    pub fn revert(&mut self) {
        self.x.revert();
        self.y.revert();
        self.width.revert();
    }

    #[allow(missing_docs)]
    pub fn contains(&self, point: Point) -> bool {
        self.rect().contains(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_commit_and_revert() {
        let mut t = Tracked::new(Px(10.0));
        t.set(Px(30.0));
        assert_eq!(t.working(), Px(30.0));
        assert_eq!(t.committed(), Px(10.0), "baseline holds during a drag");
        assert!(t.is_dirty());
        t.commit();
        assert_eq!(t.committed(), Px(30.0));
        assert!(!t.is_dirty());
        t.set(Px(5.0));
        t.revert();
        assert_eq!(t.working(), Px(30.0));
    }

    #[test]
    fn entity_rects() {
        let mut e = GridEntity::new("a".into(), Px(0.0), Px(20.0), Px(48.0), Px(20.0));
        e.x.set(Px(96.0));
        assert_eq!(e.rect().x, Px(96.0));
        assert_eq!(e.committed_rect().x, Px(0.0));
        e.commit();
        assert_eq!(e.committed_rect(), e.rect());
    }
}
