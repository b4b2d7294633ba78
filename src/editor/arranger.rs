// Copyright (c) 2024 Mike Tsao

use super::{DragMode, EditorCore, Edits, PianoRoll, SeekerTask, Tool};
use crate::{
    bus::{EditorEvent, EditorKind, EventBus},
    clipboard::Clipboard,
    conversion::{ArrangerConversion, Converts},
    engine::{AudioEngine, PlacedSection, PlaybackEvent, SharedSection},
    entities::EntityCache,
    error::Result,
    history::{HistoryStack, Snapshot},
    layers::SectionKind,
    reconcile::SectionReconciler,
    types::{Direction, EntityId, IdFactory, Point, Px, Quantize, Ticks},
    util::EditorSettings,
};
use log::{debug, error, info};
use std::rc::Rc;

/// Edits sections on channel rows. Owns the [AudioEngine]; piano rolls
/// opened from here edit the same sections through shared handles.
#[derive(Debug)]
pub struct Arranger {
    core: EditorCore<SectionKind>,
    engine: AudioEngine,
    reconciler: SectionReconciler,
    clipboard: Clipboard<PlacedSection>,
    history: HistoryStack<Snapshot>,
    seeker: SeekerTask,
}
impl Arranger {
    /// Opens an arranger over `engine`. An engine without channels gets the
    /// configured number of empty ones.
    pub fn new_with(
        mut engine: AudioEngine,
        settings: &EditorSettings,
        bus: EventBus<EditorEvent>,
    ) -> anyhow::Result<Self> {
        if engine.num_channels() == 0 {
            for i in 0..settings.arranger.num_channels {
                engine.add_channel(&format!("Channel {}", i + 1), "default");
            }
        }
        let mut conversion = ArrangerConversion::new_with(&settings.arranger);
        conversion.set_num_channels(engine.num_channels());
        let mut core = EditorCore::new_with(
            conversion,
            settings.resize_handle_width,
            bus,
            EditorKind::Arranger,
            Rc::new(IdFactory::default()),
        );
        core.rebuild(&engine, &[]);

        let initial = Snapshot {
            state: engine.snapshot()?,
            selected: Vec::default(),
        };
        let r = Self {
            core,
            engine,
            reconciler: SectionReconciler,
            clipboard: Clipboard::default(),
            history: HistoryStack::new_with(initial, settings.history_limit),
            seeker: SeekerTask::default(),
        };
        r.notify_existing_ids();
        info!(
            "arranger opened with {} channels and {} sections",
            r.engine.num_channels(),
            r.core.cache.len()
        );
        Ok(r)
    }

    #[allow(missing_docs)]
    pub fn engine(&self) -> &AudioEngine {
        &self.engine
    }

    #[allow(missing_docs)]
    pub fn conversion(&self) -> &ArrangerConversion {
        &self.core.conversion
    }

    #[allow(missing_docs)]
    pub fn history(&self) -> &HistoryStack<Snapshot> {
        &self.history
    }

    #[allow(missing_docs)]
    pub fn seeker(&self) -> &SeekerTask {
        &self.seeker
    }

    /// Appends a channel row.
    pub fn add_channel(&mut self, name: &str, instrument_preset: &str) -> EntityId {
        let id = self.engine.add_channel(name, instrument_preset);
        self.core
            .conversion
            .set_num_channels(self.engine.num_channels());
        self.record_history();
        id
    }

    /// Opens a piano roll on the given sections, in the order given. Ids that
    /// aren't sections are skipped; `None` if none are.
    pub fn open_piano_roll(
        &self,
        section_ids: &[EntityId],
        settings: &EditorSettings,
    ) -> anyhow::Result<Option<PianoRoll>> {
        let lane: Vec<SharedSection> = section_ids
            .iter()
            .filter_map(|id| self.engine.find_section(id))
            .map(|(_, section)| section)
            .collect();
        if lane.is_empty() {
            return Ok(None);
        }
        let piano_roll = PianoRoll::new_with(
            lane,
            settings,
            self.core.bus().clone(),
            self.core.layer.shared_ids(),
        )?;
        Ok(Some(piano_roll))
    }

    /// Re-reads the engine after edits made elsewhere, such as in a piano
    /// roll, and records the result as one undo step.
    pub fn refresh(&mut self) {
        let selected = self.core.selected_ids();
        self.core.rebuild(&self.engine, &selected);
        self.record_history();
    }

    #[allow(missing_docs)]
    pub fn play(&mut self) {
        self.engine.transport_mut().start();
        self.seeker.sync(self.engine.transport().state());
    }

    #[allow(missing_docs)]
    pub fn pause(&mut self) {
        self.engine.transport_mut().pause();
        self.seeker.sync(self.engine.transport().state());
    }

    /// Stops and rewinds.
    pub fn stop(&mut self) {
        self.engine.transport_mut().stop();
        self.seeker.sync(self.engine.transport().state());
    }

    /// One animation frame: advances the transport by `elapsed`, plays what
    /// falls in that span, and returns where to draw the seeker line.
    pub fn on_frame(
        &mut self,
        elapsed: Ticks,
        playback_events_fn: &mut dyn FnMut(usize, PlaybackEvent),
    ) -> Option<Px> {
        if !self.seeker.is_running() {
            return None;
        }
        let range = self.engine.transport_mut().advance(elapsed);
        self.engine.work(&range, playback_events_fn);
        self.seeker
            .on_frame(self.engine.transport(), &self.core.conversion)
    }

    /// Writes the entities into the engine, then snaps each entity to what
    /// the engine stored. Sections are whole bars long, so a width drawn or
    /// dragged at a finer quantize ends up on the nearest bar.
    fn reconcile(&mut self, ids: &[EntityId]) {
        for id in ids {
            let Some(entity) = self.core.cache.retrieve_one(id) else {
                continue;
            };
            if self
                .reconciler
                .add_section(&mut self.engine, &self.core.conversion, entity)
                .is_none()
            {
                continue;
            }
            let Some((_, section)) = self.engine.find_section(id) else {
                continue;
            };
            let (start, num_bars) = {
                let section = section.borrow();
                (section.start(), section.num_bars())
            };
            let x = self.core.conversion.engine_ticks_to_px(start);
            let width = self
                .core
                .conversion
                .engine_ticks_to_px(Ticks::ONE_BAR * num_bars);
            if let Some(entity) = self.core.cache.retrieve_one_mut(id) {
                entity.x.set(x);
                entity.width.set(width);
                entity.commit();
            }
        }
    }

    fn record_history(&mut self) {
        match self.engine.snapshot() {
            Ok(state) if self.history.current().has_state(&state) => {
                debug!("arranger state unchanged; nothing recorded");
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
            Err(e) => error!("couldn't snapshot the arranger: {e:?}"),
        }
    }

    fn publish_history(&self) {
        self.core
            .publish_history(!self.history.is_at_start(), !self.history.is_at_end());
    }

    fn restore(&mut self, snapshot: Snapshot) -> anyhow::Result<()> {
        self.core.drag.end();
        let state = AudioEngine::state_from_snapshot(&snapshot.state)?;
        self.engine.force_to_state(state);
        self.core
            .conversion
            .set_num_channels(self.engine.num_channels());
        self.core.rebuild(&self.engine, &snapshot.selected);
        self.notify_existing_ids();
        self.core.publish_state_changed();
        self.core.publish_selection();
        self.publish_history();
        Ok(())
    }

    fn notify_existing_ids(&self) {
        let ids = self.core.layer.id_factory();
        for (_, section) in self.engine.sections() {
            let section = section.borrow();
            ids.notify_externally_minted_id(section.id());
            section
                .notes()
                .keys()
                .for_each(|id| ids.notify_externally_minted_id(id));
        }
    }
}
impl Edits for Arranger {
    fn pointer_down(&mut self, point: Point, tool: Tool, additive: bool) {
        if !self.core.drag.is_idle() {
            return;
        }
        if tool == Tool::Pencil && self.core.layer.entity_at(&self.core.cache, point).is_none() {
            if let Some(id) = self.core.create_at(point, additive) {
                self.reconcile(&[id]);
                self.record_history();
            }
            return;
        }
        self.core.begin_pointer(point, additive);
    }

    fn pointer_moved(&mut self, point: Point) {
        if self.core.move_pointer(point) && self.core.drag.mode() != DragMode::MarqueeSelecting {
            self.core.publish_state_changed();
        }
    }

    fn pointer_released(&mut self, point: Point) {
        if self.core.drag.is_idle() {
            return;
        }
        self.core.move_pointer(point);
        let finished = self.core.drag.end();
        match finished.mode() {
            DragMode::Repositioning | DragMode::Resizing => {
                let changed = self.core.commit_targets(finished.targets());
                if !changed.is_empty() {
                    debug!("{} finished on {changed:?}", finished.mode());
                    self.reconcile(&changed);
                    self.record_history();
                }
            }
            DragMode::MarqueeSelecting => self.core.publish_selection(),
            DragMode::Idle | DragMode::AdjustingVelocity => {}
        }
    }

    fn shift_selected(&mut self, direction: Direction) -> bool {
        let moved = self.core.shift_selected(direction);
        if moved.is_empty() {
            return false;
        }
        self.reconcile(&moved);
        self.record_history();
        true
    }

    fn delete_selected(&mut self) -> bool {
        let removed = self.core.remove_selected();
        if removed.is_empty() {
            return false;
        }
        self.reconciler.remove_sections(&mut self.engine, &removed);
        self.core.publish_selection();
        self.record_history();
        true
    }

    fn copy_selected(&mut self) -> usize {
        let items: Vec<PlacedSection> = self
            .core
            .selected_ids()
            .iter()
            .filter_map(|id| self.reconciler.placed_section(&self.engine, id))
            .collect();
        let count = items.len();
        if count > 0 {
            self.clipboard.add(items);
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
        let landed = self.reconciler.restore_sections(&mut self.engine, copies);
        self.core.materialize(&self.engine, &landed);
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
