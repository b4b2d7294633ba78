// Copyright (c) 2024 Mike Tsao

//! The musical events of record. [AudioEngine] owns [Channel]s, which own
//! [Section]s, which own [Note]s. The transport reads from here, and the
//! editors write here through the reconcilers.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        AudioEngine, Channel, Note, Part, PlacedSection, PlaybackEvent, PlaybackEventsFn,
        Section, SharedSection, Transport, TransportState,
    };
}

pub use {
    model::{Channel, Note, PlacedSection, Section, SharedSection},
    part::{Part, PlaybackEvent, PlaybackEventsFn},
    transport::{Transport, TransportState},
};

mod model;
mod part;
mod transport;

use crate::{
    error::Result,
    types::{EntityId, IdFactory, TimeRange},
};
use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

/// The ground truth that playback reads from. Serializes to the
/// `{ channels: [...] }` shape that snapshots and the clipboard use.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioEngine {
    channels: Vec<Channel>,

    #[serde(skip)]
    e: AudioEngineEphemerals,
}
/// Parts of [AudioEngine] that shouldn't be serialized.
#[derive(Debug, Default)]
pub struct AudioEngineEphemerals {
    transport: Transport,
    channel_ids: IdFactory,

    /// Every section handle this engine has given out, so that a section
    /// that disappears and later comes back (undo, then redo) returns as the
    /// same instance.
    issued: RefCell<FxHashMap<EntityId, Weak<RefCell<Section>>>>,
}
impl PartialEq for AudioEngine {
    fn eq(&self, other: &Self) -> bool {
        self.channels == other.channels
    }
}
impl AudioEngine {
    /// Appends a channel and returns its id.
    pub fn add_channel(&mut self, name: &str, instrument_preset: &str) -> EntityId {
        let id = self.e.channel_ids.mint_next("channel");
        self.channels
            .push(Channel::new_with(id.clone(), name, instrument_preset));
        id
    }

    /// Removes the channel at the given index, along with its sections.
    pub fn remove_channel(&mut self, index: usize) -> Option<Channel> {
        if index < self.channels.len() {
            Some(self.channels.remove(index))
        } else {
            None
        }
    }

    #[allow(missing_docs)]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    #[allow(missing_docs)]
    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    #[allow(missing_docs)]
    pub fn channel_mut(&mut self, index: usize) -> Option<&mut Channel> {
        self.channels.get_mut(index)
    }

    #[allow(missing_docs)]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// The section with this id and the index of the channel that owns it.
    pub fn find_section(&self, id: &EntityId) -> Option<(usize, SharedSection)> {
        let found = self
            .channels
            .iter()
            .enumerate()
            .find_map(|(index, channel)| channel.section(id).map(|s| (index, s)));
        if let Some((_, section)) = found.as_ref() {
            self.remember(section);
        }
        found
    }

    /// Detaches the section from whichever channel owns it.
    pub fn take_section(&mut self, id: &EntityId) -> Option<SharedSection> {
        self.channels
            .iter_mut()
            .find_map(|channel| channel.remove_section(id))
    }

    /// Every section id in every channel.
    pub fn section_ids(&self) -> Vec<EntityId> {
        self.channels
            .iter()
            .flat_map(|c| c.sections().keys().cloned())
            .collect()
    }

    /// Every section handle in every channel, each with its channel index.
    pub fn sections(&self) -> Vec<(usize, SharedSection)> {
        let sections: Vec<(usize, SharedSection)> = self
            .channels
            .iter()
            .enumerate()
            .flat_map(|(index, c)| c.sections().values().map(move |s| (index, Rc::clone(s))))
            .collect();
        sections.iter().for_each(|(_, s)| self.remember(s));
        sections
    }

    fn remember(&self, section: &SharedSection) {
        let id = section.borrow().id().clone();
        self.e.issued.borrow_mut().insert(id, Rc::downgrade(section));
    }

    /// A handle given out earlier for this id that someone still holds.
    fn reissue(&self, id: &EntityId) -> Option<SharedSection> {
        self.e.issued.borrow().get(id).and_then(Weak::upgrade)
    }

    /// The channel index and section id where a note lives.
    pub fn locate_note(&self, id: &EntityId) -> Option<(usize, EntityId)> {
        self.channels.iter().enumerate().find_map(|(index, c)| {
            c.sections().values().find_map(|s| {
                let s = s.borrow();
                if s.contains_note(id) {
                    Some((index, s.id().clone()))
                } else {
                    None
                }
            })
        })
    }

    /// Serializes the full reconcilable state.
    pub fn snapshot(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a snapshot produced by [AudioEngine::snapshot()].
    pub fn state_from_snapshot(snapshot: &str) -> Result<AudioEngine> {
        Ok(serde_json::from_str(snapshot)?)
    }

    /// Makes the model match `state`. A section whose id was handed out
    /// before, and whose handle is still held somewhere, is rewritten in place
    /// so that the handle stays valid, even if the section was missing from
    /// the model in between. Everything else is replaced.
    pub fn force_to_state(&mut self, state: AudioEngine) {
        let mut survivors: FxHashMap<EntityId, SharedSection> = self
            .channels
            .iter_mut()
            .flat_map(|c| c.take_sections())
            .collect();
        survivors.values().for_each(|s| self.remember(s));

        let mut channels = Vec::with_capacity(state.channels.len());
        for mut channel in state.channels {
            self.e.channel_ids.notify_externally_minted_id(channel.id());
            for (id, incoming) in channel.take_sections() {
                let existing = survivors.remove(&id).or_else(|| self.reissue(&id));
                let section = match existing {
                    Some(existing) if !Rc::ptr_eq(&existing, &incoming) => {
                        let contents = incoming.borrow().clone();
                        existing.borrow_mut().overwrite_with(contents);
                        existing
                    }
                    _ => incoming,
                };
                channel.insert_section(section);
            }
            channels.push(channel);
        }
        self.e
            .issued
            .borrow_mut()
            .retain(|_, handle| handle.strong_count() > 0);
        debug!(
            "forced engine to {} channels, dropped {} sections",
            channels.len(),
            survivors.len()
        );
        self.channels = channels;
    }

    /// Plays every note in every section that starts inside the range.
    /// Events are tagged with the owning channel's index.
    pub fn work(
        &self,
        range: &TimeRange,
        playback_events_fn: &mut dyn FnMut(usize, PlaybackEvent),
    ) {
        for (index, channel) in self.channels.iter().enumerate() {
            for section in channel.sections().values() {
                section
                    .borrow_mut()
                    .work(range, &mut |event| playback_events_fn(index, event));
            }
        }
    }

    #[allow(missing_docs)]
    pub fn transport(&self) -> &Transport {
        &self.e.transport
    }

    #[allow(missing_docs)]
    pub fn transport_mut(&mut self) -> &mut Transport {
        &mut self.e.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Pitch, Ticks};

    fn engine_with_one_section() -> (AudioEngine, SharedSection) {
        let mut engine = AudioEngine::default();
        engine.add_channel("Drums", "kit");
        engine.add_channel("Bass", "bass");
        let mut section = Section::new_with("section-1".into(), Ticks::ZERO, 1);
        section.insert_note(Note::new_with(
            "note-1".into(),
            Pitch::C4,
            Ticks::ONE_BEAT,
            Ticks::ONE_BEAT,
            0.5,
        ));
        let section = Rc::new(RefCell::new(section));
        engine
            .channel_mut(1)
            .unwrap()
            .insert_section(Rc::clone(&section));
        (engine, section)
    }

    #[test]
    fn lookups() {
        let (engine, _) = engine_with_one_section();
        assert_eq!(engine.num_channels(), 2);
        assert_eq!(engine.channel(0).unwrap().id().as_str(), "channel-1");
        let (index, _) = engine.find_section(&"section-1".into()).unwrap();
        assert_eq!(index, 1);
        assert!(engine.find_section(&"nope".into()).is_none());
        assert_eq!(
            engine.locate_note(&"note-1".into()),
            Some((1, EntityId::from("section-1")))
        );
        assert_eq!(engine.section_ids(), vec![EntityId::from("section-1")]);
    }

    #[test]
    fn snapshot_round_trip_keeps_handles_alive() {
        let (mut engine, handle) = engine_with_one_section();
        let snapshot = engine.snapshot().unwrap();

        handle.borrow_mut().set_start(Ticks::ONE_BAR * 3);
        handle.borrow_mut().remove_note(&"note-1".into());

        engine.force_to_state(AudioEngine::state_from_snapshot(&snapshot).unwrap());
        assert_eq!(
            handle.borrow().start(),
            Ticks::ZERO,
            "the old handle sees the restored contents"
        );
        assert!(handle.borrow().contains_note(&"note-1".into()));
        let (_, found) = engine.find_section(&"section-1".into()).unwrap();
        assert!(Rc::ptr_eq(&found, &handle));

        let again: serde_json::Value = serde_json::from_str(&engine.snapshot().unwrap()).unwrap();
        let original: serde_json::Value = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(again, original);
    }

    #[test]
    fn returning_sections_reuse_outstanding_handles() {
        let (mut engine, _) = engine_with_one_section();
        let with_section = engine.snapshot().unwrap();
        let (_, handle) = engine.find_section(&"section-1".into()).unwrap();

        let mut without = AudioEngine::default();
        without.add_channel("Drums", "kit");
        without.add_channel("Bass", "bass");
        engine.force_to_state(without);
        assert!(engine.find_section(&"section-1".into()).is_none());
        handle.borrow_mut().remove_note(&"note-1".into());

        engine.force_to_state(AudioEngine::state_from_snapshot(&with_section).unwrap());
        let (index, found) = engine.find_section(&"section-1".into()).unwrap();
        assert_eq!(index, 1);
        assert!(Rc::ptr_eq(&found, &handle), "the held handle comes back");
        assert!(handle.borrow().contains_note(&"note-1".into()));

        handle.borrow_mut().insert_note(Note::new_with(
            "note-2".into(),
            Pitch::C4,
            Ticks::ZERO,
            Ticks::ONE_BEAT,
            0.5,
        ));
        assert_eq!(
            engine.locate_note(&"note-2".into()),
            Some((1, EntityId::from("section-1")))
        );
    }

    #[test]
    fn forcing_drops_missing_sections() {
        let (mut engine, _) = engine_with_one_section();
        let mut empty = AudioEngine::default();
        empty.add_channel("Only", "piano");
        engine.force_to_state(empty);
        assert_eq!(engine.num_channels(), 1);
        assert!(engine.section_ids().is_empty());
    }

    #[test]
    fn engine_work_tags_channels() {
        let (engine, _) = engine_with_one_section();
        let mut events = Vec::default();
        engine.work(&TimeRange(Ticks::ZERO..Ticks::ONE_BAR), &mut |index, e| {
            events.push((index, e.note_id))
        });
        assert_eq!(events, vec![(1, EntityId::from("note-1"))]);
    }
}
