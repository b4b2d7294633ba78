// Copyright (c) 2024 Mike Tsao

use super::row_of_entity;
use crate::{
    conversion::{ArrangerConversion, Converts},
    engine::{AudioEngine, PlacedSection, Section},
    entities::GridEntity,
    types::{EntityId, Ticks},
};
use log::debug;
use std::{cell::RefCell, rc::Rc};

/// Writes arranger geometry into the [AudioEngine].
#[derive(Debug, Default)]
pub struct SectionReconciler;
impl SectionReconciler {
    /// Derives the owning channel, start and length from the entity and
    /// stores the section there, detaching it from wherever it was before.
    /// An existing section keeps its notes. Returns the channel index, or
    /// `None` (having changed nothing) if the entity's row has no channel.
    pub fn add_section(
        &self,
        engine: &mut AudioEngine,
        conversion: &ArrangerConversion,
        entity: &GridEntity,
    ) -> Option<usize> {
        let rect = entity.rect();
        let channel_index = row_of_entity(conversion, rect.y);
        if channel_index >= engine.num_channels() {
            debug!(
                "{} is on row {channel_index}, which has no channel",
                entity.id()
            );
            return None;
        }
        let start = conversion.px_to_engine_ticks(rect.x);
        let bars = conversion.px_to_ticks(rect.width) / Ticks::PER_BAR as f64;
        let num_bars = (bars.round() as usize).max(1);

        let section = match engine.take_section(entity.id()) {
            Some(existing) => {
                {
                    let mut section = existing.borrow_mut();
                    section.set_start(start);
                    section.set_num_bars(num_bars);
                }
                existing
            }
            None => Rc::new(RefCell::new(Section::new_with(
                entity.id().clone(),
                start,
                num_bars,
            ))),
        };
        if let Some(channel) = engine.channel_mut(channel_index) {
            channel.insert_section(section);
        }
        debug!("{} -> channel {channel_index} at {start}", entity.id());
        Some(channel_index)
    }

    /// Removes sections wherever they are. Ids that aren't present are
    /// ignored.
    pub fn remove_sections(&self, engine: &mut AudioEngine, ids: &[EntityId]) {
        for id in ids {
            engine.take_section(id);
        }
    }

    /// Inserts sections whose ids are known to be fresh, skipping the scan
    /// for prior occurrences. Returns the ids that landed; sections bound for
    /// a channel that doesn't exist are dropped.
    pub fn restore_sections(
        &self,
        engine: &mut AudioEngine,
        placed: Vec<PlacedSection>,
    ) -> Vec<EntityId> {
        placed
            .into_iter()
            .filter_map(|p| {
                let channel = engine.channel_mut(p.channel)?;
                let id = p.section.id().clone();
                channel.insert_section(Rc::new(RefCell::new(p.section)));
                Some(id)
            })
            .collect()
    }

    /// The section as a detached, clipboard-ready copy.
    pub fn placed_section(&self, engine: &AudioEngine, id: &EntityId) -> Option<PlacedSection> {
        engine
            .find_section(id)
            .map(|(channel, section)| PlacedSection {
                channel,
                section: section.borrow().clone(),
            })
    }
}
