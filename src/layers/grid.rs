// Copyright (c) 2024 Mike Tsao

use super::EntityKind;
use crate::{
    conversion::Converts,
    entities::{EntityCache, GridEntity, SelectionManager},
    types::{Direction, EntityId, IdFactory, Point, Px, Rect},
};
use core::marker::PhantomData;
use derivative::Derivative;
use log::debug;
use std::rc::Rc;

/// The legal range of deltas for a whole batch of entities during one drag.
/// Computed once when the drag begins.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragBounds {
    #[allow(missing_docs)]
    pub min_x_delta: Px,
    #[allow(missing_docs)]
    pub max_x_delta: Px,
    #[allow(missing_docs)]
    pub min_y_delta: Px,
    #[allow(missing_docs)]
    pub max_y_delta: Px,
    /// How much the widest-reaching entity can grow before leaving the grid.
    pub max_width_delta: Px,
}
#[allow(missing_docs)]
impl DragBounds {
    pub fn clamp_x(&self, delta: Px) -> Px {
        delta.clamp(self.min_x_delta, self.max_x_delta)
    }

    pub fn clamp_y(&self, delta: Px) -> Px {
        delta.clamp(self.min_y_delta, self.max_y_delta)
    }

    pub fn clamp_width(&self, delta: Px) -> Px {
        delta.min(self.max_width_delta)
    }
}

/// What a marquee pass changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarqueeOutcome {
    /// Newly selected.
    pub added: Vec<EntityId>,
    /// Newly deselected.
    pub removed: Vec<EntityId>,
}
impl MarqueeOutcome {
    /// True if the pass changed anything.
    pub fn changed(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }
}

/// Owns the geometry rules for one kind of canvas entity. The entities
/// themselves live in the editor's [EntityCache]; this layer mutates them.
#[derive(Derivative)]
#[derivative(Debug(bound = ""), Default(bound = ""))]
pub struct GridLayer<K: EntityKind> {
    ids: Rc<IdFactory>,
    #[derivative(Debug = "ignore")]
    _kind: PhantomData<K>,
}
impl<K: EntityKind> GridLayer<K> {
    /// A layer that mints ids from a factory shared with other editors.
    pub fn new_with(ids: Rc<IdFactory>) -> Self {
        Self {
            ids,
            _kind: PhantomData,
        }
    }

    /// A fresh id for a new entity of this kind.
    pub fn mint_id(&self) -> EntityId {
        self.ids.mint_next(K::ID_PREFIX)
    }

    #[allow(missing_docs)]
    pub fn id_factory(&self) -> &IdFactory {
        &self.ids
    }

    /// Another handle to the id factory, for an editor opened from this one.
    pub fn shared_ids(&self) -> Rc<IdFactory> {
        Rc::clone(&self.ids)
    }

    /// Creates an entity whose top-left corner is snapped down onto the grid.
    /// It's one column wide unless `width` says otherwise, and starts out
    /// selected.
    pub fn add_new(
        &self,
        conversion: &K::Conversion,
        x: Px,
        y: Px,
        id: EntityId,
        width: Option<Px>,
    ) -> GridEntity {
        let x = conversion.round_down_to_grid_col(x).max(Px::ZERO);
        let y = conversion.round_down_to_grid_row(y).max(Px::ZERO);
        let width = width.unwrap_or_else(|| conversion.col_width());
        self.ids.notify_externally_minted_id(&id);
        let mut entity = GridEntity::new(id, x, y, width, conversion.row_height());
        entity.selected = true;
        entity
    }

    /// Resizes every entity by the same grid-rounded delta, measured from its
    /// committed width. Nothing gets narrower than one column.
    pub fn update_durations<'a>(
        &self,
        conversion: &K::Conversion,
        origin: Px,
        terminal: Px,
        entities: impl IntoIterator<Item = &'a mut GridEntity>,
    ) {
        let delta = conversion.round_to_grid_col(terminal - origin);
        let floor = conversion.col_width();
        for entity in entities {
            let width = (entity.width.committed() + delta).max(floor);
            entity.width.set(width);
        }
    }

    /// Moves every entity by the same delta from its committed position,
    /// clamping each at the grid origin.
    pub fn reposition<'a>(
        &self,
        x_delta: Px,
        y_delta: Px,
        entities: impl IntoIterator<Item = &'a mut GridEntity>,
    ) {
        for entity in entities {
            entity.x.set((entity.x.committed() + x_delta).max(Px::ZERO));
            entity.y.set((entity.y.committed() + y_delta).max(Px::ZERO));
        }
    }

    /// Confirms live geometry as the baseline for the next interaction.
    pub fn update_attribute_caches<'a>(
        &self,
        entities: impl IntoIterator<Item = &'a mut GridEntity>,
    ) {
        entities.into_iter().for_each(|e| e.commit());
    }

    /// How far the batch can move or grow before any member leaves the grid.
    pub fn drag_bounds<'a>(
        &self,
        conversion: &K::Conversion,
        entities: impl IntoIterator<Item = &'a GridEntity>,
    ) -> DragBounds {
        let rects: Vec<Rect> = entities.into_iter().map(|e| e.committed_rect()).collect();
        if rects.is_empty() {
            return DragBounds::default();
        }
        let left = rects.iter().map(|r| r.x).fold(Px(f64::MAX), Px::min);
        let top = rects.iter().map(|r| r.y).fold(Px(f64::MAX), Px::min);
        let right = rects.iter().map(|r| r.right()).fold(Px(f64::MIN), Px::max);
        let bottom = rects.iter().map(|r| r.bottom()).fold(Px(f64::MIN), Px::max);
        let headroom_x = (conversion.grid_width() - right).max(Px::ZERO);
        DragBounds {
            min_x_delta: -left,
            max_x_delta: headroom_x,
            min_y_delta: -top,
            max_y_delta: (conversion.grid_height() - bottom).max(Px::ZERO),
            max_width_delta: headroom_x,
        }
    }

    /// Whether the whole batch can move `units` grid steps without any member
    /// leaving the grid. An empty batch can't move.
    pub fn can_shift<'a>(
        &self,
        conversion: &K::Conversion,
        entities: impl IntoIterator<Item = &'a GridEntity>,
        units: usize,
        direction: Direction,
    ) -> bool {
        let rects: Vec<Rect> = entities.into_iter().map(|e| e.rect()).collect();
        if rects.is_empty() {
            return false;
        }
        let distance = Self::shift_distance(conversion, units, direction);
        // Half a pixel of slack absorbs float error from zoom rescaling.
        let slack = Px(0.5);
        match direction {
            Direction::Left => rects.iter().all(|r| r.x - distance > -slack),
            Direction::Up => rects.iter().all(|r| r.y - distance > -slack),
            Direction::Right => rects
                .iter()
                .all(|r| r.right() + distance < conversion.grid_width() + slack),
            Direction::Down => rects
                .iter()
                .all(|r| r.bottom() + distance < conversion.grid_height() + slack),
        }
    }

    /// Nudges the batch by whole grid steps. Returns false, having changed
    /// nothing, if any member would leave the grid.
    pub fn shift_by(
        &self,
        conversion: &K::Conversion,
        mut entities: Vec<&mut GridEntity>,
        units: usize,
        direction: Direction,
    ) -> bool {
        if !self.can_shift(conversion, entities.iter().map(|e| &**e), units, direction) {
            debug!("shift {direction} by {units} refused at grid boundary");
            return false;
        }
        let distance = Self::shift_distance(conversion, units, direction);
        for entity in entities.iter_mut() {
            match direction {
                Direction::Left => entity.x.set(entity.x.working() - distance),
                Direction::Right => entity.x.set(entity.x.working() + distance),
                Direction::Up => entity.y.set(entity.y.working() - distance),
                Direction::Down => entity.y.set(entity.y.working() + distance),
            }
        }
        self.update_attribute_caches(entities);
        true
    }

    fn shift_distance(conversion: &K::Conversion, units: usize, direction: Direction) -> Px {
        match direction {
            Direction::Left | Direction::Right => conversion.col_width() * units as f64,
            Direction::Up | Direction::Down => conversion.row_height() * units as f64,
        }
    }

    /// Applies a zoom change to horizontal geometry without re-snapping.
    pub fn rescale<'a>(&self, factor: f64, entities: impl IntoIterator<Item = &'a mut GridEntity>) {
        for entity in entities {
            entity.x.rescale(factor);
            entity.width.rescale(factor);
        }
    }

    /// Builds a fresh set of entities from audio-model truth. The caller
    /// replaces its [EntityCache] contents with the result.
    pub fn force_to_state(
        &self,
        source: &K::Source,
        conversion: &K::Conversion,
    ) -> Vec<GridEntity> {
        K::placements(source, conversion)
            .into_iter()
            .map(|p| {
                self.ids.notify_externally_minted_id(&p.id);
                GridEntity::new(p.id, p.x, p.y, p.width, conversion.row_height())
            })
            .collect()
    }

    /// Reconciles selection with a marquee rectangle. Overlapping entities
    /// become selected; selected entities that don't overlap become
    /// deselected unless they're `pinned` (for additive selection).
    pub fn marquee_select(
        &self,
        rect: &Rect,
        cache: &mut EntityCache,
        selection: &mut SelectionManager,
        pinned: &[EntityId],
    ) -> MarqueeOutcome {
        let mut outcome = MarqueeOutcome::default();
        for entity in cache.retrieve_all_mut() {
            let id = entity.id().clone();
            let overlaps = rect.overlaps(&entity.rect());
            if overlaps && !selection.has(&id) {
                selection.add(&id);
                entity.selected = true;
                outcome.added.push(id);
            } else if !overlaps && selection.has(&id) && !pinned.contains(&id) {
                selection.remove(&id);
                entity.selected = false;
                outcome.removed.push(id);
            }
        }
        outcome
    }

    /// The entity under the point, preferring a selected one when several
    /// overlap.
    pub fn entity_at(&self, cache: &EntityCache, point: Point) -> Option<EntityId> {
        cache
            .retrieve_all()
            .filter(|e| e.contains(point))
            .max_by(|a, b| a.selected.cmp(&b.selected).then_with(|| b.id().cmp(a.id())))
            .map(|e| e.id().clone())
    }

    /// True if the point is on the entity's right-hand resize strip.
    pub fn is_on_resize_handle(&self, entity: &GridEntity, point: Point, handle_width: Px) -> bool {
        let rect = entity.rect();
        rect.contains(point) && point.x >= rect.right() - handle_width
    }
}
