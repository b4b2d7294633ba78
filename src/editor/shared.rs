// Copyright (c) 2024 Mike Tsao

use super::{DragMode, DragState};
use crate::{
    bus::{EditorEvent, EditorKind, EventBus},
    conversion::Converts,
    entities::{EntityCache, GridEntity, SelectionManager},
    layers::{EntityKind, GridLayer},
    types::{Direction, EntityId, IdFactory, Point, Px},
};
use log::debug;
use std::rc::Rc;

/// The geometry side of an editor, shared by the arranger and the piano
/// roll. It knows nothing about the audio model; the editors reconcile
/// whatever ids it reports as changed.
#[derive(Debug)]
pub(crate) struct EditorCore<K: EntityKind> {
    pub conversion: K::Conversion,
    pub layer: GridLayer<K>,
    pub cache: EntityCache,
    pub selection: SelectionManager,
    pub drag: DragState,
    pub resize_handle_width: Px,
    bus: EventBus<EditorEvent>,
    kind: EditorKind,
}
impl<K: EntityKind> EditorCore<K> {
    pub fn new_with(
        conversion: K::Conversion,
        resize_handle_width: Px,
        bus: EventBus<EditorEvent>,
        kind: EditorKind,
        ids: Rc<IdFactory>,
    ) -> Self {
        Self {
            conversion,
            layer: GridLayer::new_with(ids),
            cache: EntityCache::default(),
            selection: SelectionManager::default(),
            drag: DragState::default(),
            resize_handle_width,
            bus,
            kind,
        }
    }

    /// Selected ids in a stable order.
    pub fn selected_ids(&self) -> Vec<EntityId> {
        let mut ids = self.selection.retrieve_all();
        ids.sort();
        ids
    }

    /// Makes `ids` the whole selection, keeping entity flags in step.
    pub fn select_only(&mut self, ids: &[EntityId]) {
        self.selection.force_to_state(ids.iter().cloned());
        self.selection.retain_existing(&self.cache);
        for entity in self.cache.retrieve_all_mut() {
            entity.selected = ids.contains(entity.id());
        }
    }

    pub fn select(&mut self, id: &EntityId) {
        self.selection.add(id);
        if let Some(entity) = self.cache.retrieve_one_mut(id) {
            entity.selected = true;
        }
    }

    pub fn deselect(&mut self, id: &EntityId) {
        self.selection.remove(id);
        if let Some(entity) = self.cache.retrieve_one_mut(id) {
            entity.selected = false;
        }
    }

    pub fn select_all(&mut self) {
        let ids = self.cache.ids();
        self.select_only(&ids);
    }

    /// Pointer tool: hit-tests and begins a resize, reposition or marquee.
    /// Returns the entity that was hit.
    pub fn begin_pointer(&mut self, point: Point, additive: bool) -> Option<EntityId> {
        let Some(id) = self.layer.entity_at(&self.cache, point) else {
            let pinned = if additive {
                self.selected_ids()
            } else {
                self.select_only(&[]);
                Vec::default()
            };
            self.drag.begin_marquee(point, pinned);
            self.publish_selection();
            return None;
        };

        if additive && self.selection.has(&id) {
            self.deselect(&id);
            self.publish_selection();
            return Some(id);
        }
        if !self.selection.has(&id) {
            if !additive {
                self.select_only(&[]);
            }
            self.select(&id);
            self.publish_selection();
        }

        let on_handle = self
            .cache
            .retrieve_one(&id)
            .map(|e| {
                self.layer
                    .is_on_resize_handle(e, point, self.resize_handle_width)
            })
            .unwrap_or_default();
        let mode = if on_handle {
            DragMode::Resizing
        } else {
            DragMode::Repositioning
        };
        let targets = self.selected_ids();
        let bounds = self
            .layer
            .drag_bounds(&self.conversion, self.cache.retrieve(&targets));
        self.drag.begin(mode, point, bounds, targets);
        Some(id)
    }

    /// Pencil tool: creates a one-column entity under the point, selected
    /// alone unless `additive`. Returns `None` outside the grid.
    pub fn create_at(&mut self, point: Point, additive: bool) -> Option<EntityId> {
        if point.x < Px::ZERO
            || point.y < Px::ZERO
            || point.x >= self.conversion.grid_width()
            || point.y >= self.conversion.grid_height()
        {
            return None;
        }
        let id = self.layer.mint_id();
        let entity = self
            .layer
            .add_new(&self.conversion, point.x, point.y, id.clone(), None);
        if !additive {
            self.select_only(&[]);
        }
        self.cache.add(entity);
        self.select(&id);
        self.publish_selection();
        Some(id)
    }

    /// Applies a pointer move to geometry or the marquee. Returns true if
    /// anything was handled.
    pub fn move_pointer(&mut self, point: Point) -> bool {
        let origin = self.drag.origin();
        match self.drag.mode() {
            DragMode::Idle | DragMode::AdjustingVelocity => false,
            DragMode::Repositioning => {
                let bounds = *self.drag.bounds();
                let dx = bounds.clamp_x(self.conversion.round_to_grid_col(point.x - origin.x));
                let dy = bounds.clamp_y(self.conversion.round_to_grid_row(point.y - origin.y));
                let targets = self.drag.targets().to_vec();
                self.layer
                    .reposition(dx, dy, self.cache.retrieve_mut(&targets));
                true
            }
            DragMode::Resizing => {
                let rounded = self.conversion.round_to_grid_col(point.x - origin.x);
                let clamped = self.drag.bounds().clamp_width(rounded);
                let delta = if clamped < rounded {
                    self.conversion.round_down_to_grid_col(clamped)
                } else {
                    clamped
                };
                let targets = self.drag.targets().to_vec();
                self.layer.update_durations(
                    &self.conversion,
                    Px::ZERO,
                    delta,
                    self.cache.retrieve_mut(&targets),
                );
                true
            }
            DragMode::MarqueeSelecting => {
                let rect = self.drag.marquee_rect(point);
                let pinned = self.drag.pinned().to_vec();
                let outcome = self.layer.marquee_select(
                    &rect,
                    &mut self.cache,
                    &mut self.selection,
                    &pinned,
                );
                if outcome.changed() {
                    self.publish_selection();
                }
                true
            }
        }
    }

    /// Commits the geometry of a finished resize or reposition and returns
    /// the ids whose geometry actually changed.
    pub fn commit_targets(&mut self, targets: &[EntityId]) -> Vec<EntityId> {
        let mut changed = Vec::default();
        for entity in self.cache.retrieve_mut(targets) {
            if entity.x.is_dirty() || entity.y.is_dirty() || entity.width.is_dirty() {
                changed.push(entity.id().clone());
            }
        }
        self.layer
            .update_attribute_caches(self.cache.retrieve_mut(targets));
        changed.sort();
        changed
    }

    /// Abandons uncommitted geometry.
    pub fn revert_targets(&mut self, targets: &[EntityId]) {
        self.cache
            .retrieve_mut(targets)
            .into_iter()
            .for_each(|e| e.revert());
    }

    /// Nudges the selection one grid step. Returns the moved ids, or nothing
    /// if the move was refused.
    pub fn shift_selected(&mut self, direction: Direction) -> Vec<EntityId> {
        let ids = self.selected_ids();
        if self
            .layer
            .shift_by(&self.conversion, self.cache.retrieve_mut(&ids), 1, direction)
        {
            ids
        } else {
            Vec::default()
        }
    }

    /// Drops the selected entities from the cache and clears the selection.
    pub fn remove_selected(&mut self) -> Vec<EntityId> {
        let ids = self.selected_ids();
        for id in &ids {
            self.cache.remove(id);
        }
        self.selection.clear();
        ids
    }

    /// Scales placed entities after a zoom change.
    pub fn apply_zoom_factor(&mut self, factor: f64) {
        self.layer.rescale(factor, self.cache.retrieve_all_mut());
    }

    /// Replaces every entity with ones built from audio-model truth, then
    /// restores the given selection.
    pub fn rebuild(&mut self, source: &K::Source, selected: &[EntityId]) {
        let entities = self.layer.force_to_state(source, &self.conversion);
        self.cache.force_to_state(entities);
        self.select_only(selected);
    }

    /// Adds entities for freshly restored audio items.
    pub fn materialize(&mut self, source: &K::Source, ids: &[EntityId]) -> Vec<GridEntity> {
        let fresh: Vec<GridEntity> = self
            .layer
            .force_to_state(source, &self.conversion)
            .into_iter()
            .filter(|e| ids.contains(e.id()))
            .collect();
        fresh.iter().for_each(|e| self.cache.add(e.clone()));
        fresh
    }

    pub fn bus(&self) -> &EventBus<EditorEvent> {
        &self.bus
    }

    pub fn publish(&self, event: EditorEvent) {
        self.bus.publish(event);
    }

    pub fn publish_selection(&self) {
        self.publish(EditorEvent::SelectionChanged {
            editor: self.kind,
            selected: self.selected_ids(),
        });
    }

    pub fn publish_state_changed(&self) {
        debug!("{} state changed", self.kind);
        self.publish(EditorEvent::StateChanged(self.kind));
    }

    pub fn publish_history(&self, can_undo: bool, can_redo: bool) {
        self.publish(EditorEvent::HistoryChanged {
            editor: self.kind,
            can_undo,
            can_redo,
        });
    }
}
