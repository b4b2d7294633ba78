// Copyright (c) 2024 Mike Tsao

use super::{DragMode, EditorCore, Edits, Tool};
use crate::{
    bus::{EditorEvent, EditorKind, EventBus},
    clipboard::Clipboard,
    conversion::{Converts, PianoRollConversion},
    engine::{Note, Section, SharedSection},
    entities::EntityCache,
    error::Result,
    history::{HistoryStack, Snapshot},
    layers::{DragBounds, NoteKind, VelocityLayer},
    reconcile::NoteReconciler,
    types::{Direction, EntityId, IdFactory, Point, Px, Quantize, Ticks},
    util::EditorSettings,
};
use log::{debug, error, info};
use std::rc::Rc;

/// Edits the notes of a lane of sections laid end to end. The grid starts at
/// the earliest section and spans through the end of the latest; a note
/// dragged across a section boundary changes sections.
///
/// Below the grid is the velocity lane, one marker per note.
#[derive(Debug)]
pub struct PianoRoll {
    core: EditorCore<NoteKind>,
    lane: Vec<SharedSection>,
    reconciler: NoteReconciler,
    velocity: VelocityLayer,
    clipboard: Clipboard<Note>,
    history: HistoryStack<Snapshot>,
}
impl PianoRoll {
    /// Opens a piano roll on `lane`. `ids` mints note ids; pass the opening
    /// arranger's so that ids stay unique across the session.
    pub fn new_with(
        lane: Vec<SharedSection>,
        settings: &EditorSettings,
        bus: EventBus<EditorEvent>,
        ids: Rc<IdFactory>,
    ) -> anyhow::Result<Self> {
        let (origin, num_bars) = Self::extent(&lane);
        let mut conversion = PianoRollConversion::new_with(&settings.piano_roll);
        conversion.set_origin(origin);
        conversion.dims_mut().set_num_bars(num_bars);
        let core = EditorCore::new_with(
            conversion,
            settings.resize_handle_width,
            bus,
            EditorKind::PianoRoll,
            ids,
        );

        let mut r = Self {
            core,
            lane,
            reconciler: NoteReconciler::new_with(settings.piano_roll.default_velocity),
            velocity: VelocityLayer::new_with(settings.piano_roll.velocity_lane_height),
            clipboard: Clipboard::default(),
            history: HistoryStack::new_with(
                Snapshot {
                    state: String::default(),
                    selected: Vec::default(),
                },
                settings.history_limit,
            ),
        };
        r.rebuild(&[]);
        r.history.clear_to(Snapshot {
            state: r.lane_state()?,
            selected: Vec::default(),
        });
        info!(
            "piano roll opened on {} sections, {num_bars} bars from {origin}",
            r.lane.len()
        );
        Ok(r)
    }

    /// Where the lane starts, and how many whole bars it takes to reach the
    /// end of its latest section.
    fn extent(lane: &[SharedSection]) -> (Ticks, usize) {
        let origin = lane
            .iter()
            .map(|s| s.borrow().start())
            .min()
            .unwrap_or_default();
        let end = lane
            .iter()
            .map(|s| s.borrow().time_range().end())
            .max()
            .unwrap_or_default();
        let span = end.saturating_sub(origin);
        (origin, span.0.div_ceil(Ticks::PER_BAR).max(1))
    }

    /// Re-reads the lane after its sections were rewritten elsewhere, such as
    /// by an arranger edit or undo. The grid follows the sections, notes that
    /// are gone lose their entities, and a changed state becomes an undo step.
    pub fn refresh(&mut self) {
        self.core.drag.end();
        let (origin, num_bars) = Self::extent(&self.lane);
        self.core.conversion.set_origin(origin);
        self.core.conversion.dims_mut().set_num_bars(num_bars);
        let selected = self.core.selected_ids();
        self.rebuild(&selected);
        self.core.publish_selection();
        self.record_history();
    }

    /// The sections being edited.
    pub fn lane(&self) -> &[SharedSection] {
        &self.lane
    }

    #[allow(missing_docs)]
    pub fn conversion(&self) -> &PianoRollConversion {
        &self.core.conversion
    }

    #[allow(missing_docs)]
    pub fn velocity(&self) -> &VelocityLayer {
        &self.velocity
    }

    #[allow(missing_docs)]
    pub fn history(&self) -> &HistoryStack<Snapshot> {
        &self.history
    }

    /// The note as the audio model has it, with its time made absolute.
    pub fn note(&self, id: &EntityId) -> Option<Note> {
        self.reconciler.lane_note(&self.lane, id)
    }

    /// The section that holds the note.
    pub fn owner_of(&self, id: &EntityId) -> Option<EntityId> {
        NoteReconciler::owner_id(&self.lane, id)
    }

    fn lane_state(&self) -> Result<String> {
        let sections: Vec<Section> = self.lane.iter().map(|s| s.borrow().clone()).collect();
        Ok(serde_json::to_string(&sections)?)
    }

    fn rebuild(&mut self, selected: &[EntityId]) {
        self.core.rebuild(&self.lane, selected);
        let markers: Vec<(EntityId, Px, f64)> = self
            .core
            .cache
            .retrieve_all()
            .filter_map(|e| {
                self.reconciler
                    .lane_note(&self.lane, e.id())
                    .map(|n| (e.id().clone(), e.x.working(), n.velocity))
            })
            .collect();
        self.velocity.force_to_state(markers);
    }

    fn add_marker(&mut self, id: &EntityId) {
        let Some(entity) = self.core.cache.retrieve_one(id) else {
            return;
        };
        if let Some(note) = self.reconciler.lane_note(&self.lane, id) {
            self.velocity.add(id, entity.x.working(), note.velocity);
        }
    }

    fn follow(&mut self, ids: &[EntityId]) {
        for entity in self.core.cache.retrieve(ids) {
            self.velocity.follow(entity);
        }
    }

    fn reconcile(&mut self, ids: &[EntityId]) {
        for id in ids {
            if let Some(entity) = self.core.cache.retrieve_one(id) {
                self.reconciler.add_note(
                    &self.lane,
                    &self.core.conversion,
                    entity,
                    self.velocity.velocity_of(id),
                );
            }
        }
    }

    /// True if every named entity, as currently placed, has a section to
    /// land in.
    fn all_placeable(&self, ids: &[EntityId]) -> bool {
        self.core.cache.retrieve(ids).into_iter().all(|e| {
            self.reconciler
                .owner_for(&self.lane, &self.core.conversion, e)
                .is_some()
        })
    }

    /// The note whose columns cover `x`, preferring a selected one.
    fn note_at_x(&self, x: Px) -> Option<EntityId> {
        self.core
            .cache
            .retrieve_all()
            .filter(|e| {
                let rect = e.rect();
                x >= rect.x && x < rect.right()
            })
            .max_by(|a, b| a.selected.cmp(&b.selected).then_with(|| b.id().cmp(a.id())))
            .map(|e| e.id().clone())
    }

    fn begin_velocity_drag(&mut self, point: Point, additive: bool) {
        let Some(id) = self.note_at_x(point.x) else {
            return;
        };
        if !self.core.selection.has(&id) {
            if !additive {
                self.core.select_only(&[]);
            }
            self.core.select(&id);
            self.core.publish_selection();
        }
        let targets = self.core.selected_ids();
        self.core.drag.begin(
            DragMode::AdjustingVelocity,
            point,
            DragBounds::default(),
            targets,
        );
    }

    fn draw_note(&mut self, point: Point, additive: bool) {
        let Some(id) = self.core.create_at(point, additive) else {
            return;
        };
        let placed = self.core.cache.retrieve_one(&id).and_then(|e| {
            self.reconciler
                .add_note(&self.lane, &self.core.conversion, e, None)
        });
        if placed.is_none() {
            debug!("no section under {point:?}; nothing drawn");
            self.core.deselect(&id);
            self.core.cache.remove(&id);
            self.core.publish_selection();
            return;
        }
        self.add_marker(&id);
        self.record_history();
    }

    fn record_history(&mut self) {
        match self.lane_state() {
            Ok(state) if self.history.current().has_state(&state) => {
                debug!("piano roll state unchanged; nothing recorded");
                self.core.publish_state_changed();
            }
            Ok(state) => {
                self.history.add_entry(Snapshot {
                    state,
                    selected: self.core.selected_ids(),
                });
                self.core.publish_state_changed();
                self.publish_history();
            }
            Err(e) => error!("couldn't snapshot the piano roll: {e:?}"),
        }
    }

    fn publish_history(&self) {
        self.core
            .publish_history(!self.history.is_at_start(), !self.history.is_at_end());
    }

    fn restore(&mut self, snapshot: Snapshot) -> anyhow::Result<()> {
        self.core.drag.end();
        let sections: Vec<Section> = serde_json::from_str(&snapshot.state)?;
        for handle in &self.lane {
            let mut handle = handle.borrow_mut();
            if let Some(section) = sections.iter().find(|s| s.id() == handle.id()) {
                handle.set_notes(section.notes().clone());
            }
        }
        self.rebuild(&snapshot.selected);
        self.core.publish_state_changed();
        self.core.publish_selection();
        self.publish_history();
        Ok(())
    }
}
impl Edits for PianoRoll {
    fn pointer_down(&mut self, point: Point, tool: Tool, additive: bool) {
        if !self.core.drag.is_idle() {
            return;
        }
        if point.y >= self.core.conversion.grid_height() {
            self.begin_velocity_drag(point, additive);
            return;
        }
        if tool == Tool::Pencil && self.core.layer.entity_at(&self.core.cache, point).is_none() {
            self.draw_note(point, additive);
            return;
        }
        self.core.begin_pointer(point, additive);
    }

    fn pointer_moved(&mut self, point: Point) {
        match self.core.drag.mode() {
            DragMode::AdjustingVelocity => {
                let origin = self.core.drag.origin();
                let targets = self.core.drag.targets().to_vec();
                self.velocity.adjust(origin.y, point.y, &targets);
                self.core.publish_state_changed();
            }
            mode => {
                if self.core.move_pointer(point) && mode != DragMode::MarqueeSelecting {
                    if mode == DragMode::Repositioning {
                        let targets = self.core.drag.targets().to_vec();
                        self.follow(&targets);
                    }
                    self.core.publish_state_changed();
                }
            }
        }
    }

    fn pointer_released(&mut self, point: Point) {
        if self.core.drag.is_idle() {
            return;
        }
        self.pointer_moved(point);
        let finished = self.core.drag.end();
        let targets = finished.targets();
        match finished.mode() {
            DragMode::Repositioning | DragMode::Resizing => {
                if !self.all_placeable(targets) {
                    debug!("{} refused; a note would leave every section", finished.mode());
                    self.core.revert_targets(targets);
                    self.follow(targets);
                    self.core.publish_state_changed();
                    return;
                }
                let changed = self.core.commit_targets(targets);
                if !changed.is_empty() {
                    self.reconcile(&changed);
                    self.record_history();
                }
            }
            DragMode::AdjustingVelocity => {
                if !self.velocity.is_dirty(targets) {
                    return;
                }
                self.velocity.commit(targets);
                self.reconcile(targets);
                self.record_history();
            }
            DragMode::MarqueeSelecting => self.core.publish_selection(),
            DragMode::Idle => {}
        }
    }

    fn shift_selected(&mut self, direction: Direction) -> bool {
        let moved = self.core.shift_selected(direction);
        if moved.is_empty() {
            return false;
        }
        if !self.all_placeable(&moved) {
            debug!("shift {direction:?} refused; a note would leave every section");
            self.core.shift_selected(direction.opposite());
            return false;
        }
        self.follow(&moved);
        self.reconcile(&moved);
        self.record_history();
        true
    }

    fn delete_selected(&mut self) -> bool {
        let removed = self.core.remove_selected();
        if removed.is_empty() {
            return false;
        }
        self.reconciler.remove_notes(&self.lane, &removed);
        removed.iter().for_each(|id| self.velocity.remove(id));
        self.core.publish_selection();
        self.record_history();
        true
    }

    fn copy_selected(&mut self) -> usize {
        let notes: Vec<Note> = self
            .core
            .selected_ids()
            .iter()
            .filter_map(|id| self.reconciler.lane_note(&self.lane, id))
            .collect();
        let count = notes.len();
        if count > 0 {
            self.clipboard.add(notes);
        }
        count
    }

    fn paste(&mut self, reference: Ticks) -> Vec<EntityId> {
        let copies = self
            .clipboard
            .produce_copy(reference, self.core.layer.id_factory());
        if copies.is_empty() {
            return Vec::default();
        }
        let landed = self.reconciler.restore_notes(&self.lane, copies);
        self.core.materialize(&self.lane, &landed);
        landed.iter().for_each(|id| self.add_marker(id));
        self.core.select_only(&landed);
        self.core.publish_selection();
        self.record_history();
        landed
    }

    fn select_all(&mut self) {
        self.core.select_all();
        self.core.publish_selection();
    }

    fn undo(&mut self) -> anyhow::Result<bool> {
        let Some(snapshot) = self.history.go_backwards().cloned() else {
            return Ok(false);
        };
        self.restore(snapshot)?;
        Ok(true)
    }

    fn redo(&mut self) -> anyhow::Result<bool> {
        let Some(snapshot) = self.history.go_forwards().cloned() else {
            return Ok(false);
        };
        self.restore(snapshot)?;
        Ok(true)
    }

    fn set_zoom(&mut self, tick_to_px_ratio: f64) -> Result<()> {
        let factor = self
            .core
            .conversion
            .dims_mut()
            .set_tick_to_px_ratio(tick_to_px_ratio)?;
        self.core.apply_zoom_factor(factor);
        self.velocity.rescale(factor);
        self.core.publish_state_changed();
        Ok(())
    }

    fn set_quantize(&mut self, quantize: Quantize) {
        self.core.conversion.dims_mut().set_quantize(quantize);
        self.core.publish_state_changed();
    }

    fn entities(&self) -> &EntityCache {
        &self.core.cache
    }

    fn selected_ids(&self) -> Vec<EntityId> {
        self.core.selected_ids()
    }

    fn drag_mode(&self) -> DragMode {
        self.core.drag.mode()
    }
}
