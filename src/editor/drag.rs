// Copyright (c) 2024 Mike Tsao

use crate::{
    layers::DragBounds,
    types::{EntityId, Point, Rect},
};
use strum_macros::Display;

/// What the current pointer interaction is doing. Exactly one is active at
/// a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
#[allow(missing_docs)]
pub enum DragMode {
    #[default]
    Idle,
    Resizing,
    Repositioning,
    MarqueeSelecting,
    AdjustingVelocity,
}

/// The state of one pointer interaction, from pointer-down to pointer-up.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DragState {
    mode: DragMode,
    origin: Point,
    bounds: DragBounds,
    targets: Vec<EntityId>,
    pinned: Vec<EntityId>,
}
impl DragState {
    /// Starts a resize, reposition or velocity drag of `targets`. The bounds
    /// are fixed for the rest of the drag.
    pub fn begin(
        &mut self,
        mode: DragMode,
        origin: Point,
        bounds: DragBounds,
        targets: Vec<EntityId>,
    ) {
        *self = Self {
            mode,
            origin,
            bounds,
            targets,
            pinned: Vec::default(),
        };
    }

    /// Starts a marquee. `pinned` ids stay selected no matter where the
    /// marquee goes.
    pub fn begin_marquee(&mut self, origin: Point, pinned: Vec<EntityId>) {
        *self = Self {
            mode: DragMode::MarqueeSelecting,
            origin,
            bounds: DragBounds::default(),
            targets: Vec::default(),
            pinned,
        };
    }

    /// Returns the finished interaction and goes back to idle.
    pub fn end(&mut self) -> DragState {
        std::mem::take(self)
    }

    #[allow(missing_docs)]
    pub fn mode(&self) -> DragMode {
        self.mode
    }

    #[allow(missing_docs)]
    pub fn is_idle(&self) -> bool {
        self.mode == DragMode::Idle
    }

    /// Where the pointer went down.
    pub fn origin(&self) -> Point {
        self.origin
    }

    #[allow(missing_docs)]
    pub fn bounds(&self) -> &DragBounds {
        &self.bounds
    }

    #[allow(missing_docs)]
    pub fn targets(&self) -> &[EntityId] {
        &self.targets
    }

    #[allow(missing_docs)]
    pub fn pinned(&self) -> &[EntityId] {
        &self.pinned
    }

    /// The marquee rectangle with the pointer at `current`.
    pub fn marquee_rect(&self, current: Point) -> Rect {
        Rect::from_corners(self.origin, current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Px;

    #[test]
    fn drag_lifecycle() {
        let mut drag = DragState::default();
        assert!(drag.is_idle());

        let bounds = DragBounds {
            max_x_delta: Px(100.0),
            ..Default::default()
        };
        drag.begin(
            DragMode::Repositioning,
            Point::new(5.0, 5.0),
            bounds,
            vec!["a".into()],
        );
        assert_eq!(drag.mode(), DragMode::Repositioning);
        assert_eq!(drag.bounds().max_x_delta, Px(100.0));

        let finished = drag.end();
        assert_eq!(finished.targets(), &[EntityId::from("a")]);
        assert!(drag.is_idle());
        assert_eq!(drag.bounds(), &DragBounds::default(), "bounds are cleared");
    }

    #[test]
    fn marquee_rect_normalizes_corners() {
        let mut drag = DragState::default();
        drag.begin_marquee(Point::new(50.0, 40.0), vec![]);
        let rect = drag.marquee_rect(Point::new(10.0, 60.0));
        assert_eq!(rect, Rect::new(10.0, 40.0, 40.0, 20.0));
    }
}
