// Copyright (c) 2024 Mike Tsao

use super::{Part, PlaybackEventsFn};
use crate::types::{as_transport_time, EntityId, Pitch, Ticks, TimeRange};
use derivative::Derivative;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::{cell::RefCell, rc::Rc};

/// A [Section] handle that can be held by an editor while the section itself
/// moves between channels.
pub type SharedSection = Rc<RefCell<Section>>;

/// A single note. Its time is relative to the start of the owning section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    #[allow(missing_docs)]
    pub id: EntityId,
    #[allow(missing_docs)]
    pub note: Pitch,
    #[allow(missing_docs)]
    #[serde(with = "as_transport_time")]
    pub time: Ticks,
    #[allow(missing_docs)]
    #[serde(with = "as_transport_time")]
    pub duration: Ticks,
    /// 0.0..=1.0
    pub velocity: f64,
}
impl Note {
    #[allow(missing_docs)]
    pub fn new_with(
        id: EntityId,
        note: Pitch,
        time: Ticks,
        duration: Ticks,
        velocity: f64,
    ) -> Self {
        Self {
            id,
            note,
            time,
            duration,
            velocity: velocity.clamp(0.0, 1.0),
        }
    }
}

/// A time-bounded container of [Note]s belonging to one [Channel].
#[derive(Debug, Derivative, Serialize, Deserialize)]
#[derivative(PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    id: EntityId,
    #[serde(with = "as_transport_time")]
    start: Ticks,
    num_bars: usize,
    #[serde(default)]
    notes: FxHashMap<EntityId, Note>,

    #[serde(skip)]
    #[derivative(PartialEq = "ignore", Clone(clone_with = "clear_ephemerals"))]
    e: SectionEphemerals,
}
/// Parts of [Section] that shouldn't be serialized.
#[derive(Debug, Default)]
pub struct SectionEphemerals {
    /// None until the next [Section::work()] rebuilds it.
    part: Option<Part>,
}
fn clear_ephemerals(_: &SectionEphemerals) -> SectionEphemerals {
    SectionEphemerals::default()
}
impl Section {
    #[allow(missing_docs)]
    pub fn new_with(id: EntityId, start: Ticks, num_bars: usize) -> Self {
        Self {
            id,
            start,
            num_bars: num_bars.max(1),
            notes: Default::default(),
            e: Default::default(),
        }
    }

    #[allow(missing_docs)]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Gives the section a new identity. Notes keep theirs.
    pub fn set_id(&mut self, id: EntityId) {
        self.id = id;
        self.invalidate_part();
    }

    #[allow(missing_docs)]
    pub fn start(&self) -> Ticks {
        self.start
    }

    #[allow(missing_docs)]
    pub fn set_start(&mut self, start: Ticks) {
        self.start = start;
        self.invalidate_part();
    }

    #[allow(missing_docs)]
    pub fn num_bars(&self) -> usize {
        self.num_bars
    }

    /// Sections are always at least one bar long.
    pub fn set_num_bars(&mut self, num_bars: usize) {
        self.num_bars = num_bars.max(1);
    }

    /// The absolute span the section covers.
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new_with_start_and_duration(self.start, Ticks::ONE_BAR * self.num_bars)
    }

    #[allow(missing_docs)]
    pub fn notes(&self) -> &FxHashMap<EntityId, Note> {
        &self.notes
    }

    #[allow(missing_docs)]
    pub fn note(&self, id: &EntityId) -> Option<&Note> {
        self.notes.get(id)
    }

    #[allow(missing_docs)]
    pub fn contains_note(&self, id: &EntityId) -> bool {
        self.notes.contains_key(id)
    }

    /// Adds or replaces a note under its own id.
    pub fn insert_note(&mut self, note: Note) {
        self.notes.insert(note.id.clone(), note);
        self.invalidate_part();
    }

    /// Removing a note that isn't there does nothing.
    pub fn remove_note(&mut self, id: &EntityId) -> Option<Note> {
        let removed = self.notes.remove(id);
        if removed.is_some() {
            self.invalidate_part();
        }
        removed
    }

    /// Replaces every note.
    pub fn set_notes(&mut self, notes: FxHashMap<EntityId, Note>) {
        self.notes = notes;
        self.invalidate_part();
    }

    /// Takes on another section's persistent contents while keeping this
    /// instance (and therefore every handle to it) alive.
    pub fn overwrite_with(&mut self, other: Section) {
        self.id = other.id;
        self.start = other.start;
        self.num_bars = other.num_bars;
        self.notes = other.notes;
        self.invalidate_part();
    }

    /// Plays whatever notes start inside the range.
    pub fn work(&mut self, range: &TimeRange, playback_events_fn: &mut PlaybackEventsFn) {
        if self.e.part.is_none() {
            self.e.part = Some(Part::new_with(&self.id, self.start, self.notes.values()));
        }
        if let Some(part) = self.e.part.as_ref() {
            part.work(range, playback_events_fn);
        }
    }

    fn invalidate_part(&mut self) {
        self.e.part = None;
    }
}

/// A detached copy of a [Section] together with the index of the channel it
/// belongs on. This is what the arranger's clipboard holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedSection {
    #[allow(missing_docs)]
    pub channel: usize,
    #[allow(missing_docs)]
    pub section: Section,
}

/// An instrument slot owning zero or more [Section]s.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    id: EntityId,
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub instrument_preset: String,
    #[serde(default)]
    sections: FxHashMap<EntityId, SharedSection>,
}
impl Channel {
    #[allow(missing_docs)]
    pub fn new_with(id: EntityId, name: &str, instrument_preset: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            instrument_preset: instrument_preset.to_string(),
            sections: Default::default(),
        }
    }

    #[allow(missing_docs)]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    #[allow(missing_docs)]
    pub fn sections(&self) -> &FxHashMap<EntityId, SharedSection> {
        &self.sections
    }

    #[allow(missing_docs)]
    pub fn section(&self, id: &EntityId) -> Option<SharedSection> {
        self.sections.get(id).cloned()
    }

    #[allow(missing_docs)]
    pub fn contains_section(&self, id: &EntityId) -> bool {
        self.sections.contains_key(id)
    }

    /// Adds a section under its own id, replacing any with the same id.
    pub fn insert_section(&mut self, section: SharedSection) {
        let id = section.borrow().id().clone();
        self.sections.insert(id, section);
    }

    /// Removing a section that isn't there does nothing.
    pub fn remove_section(&mut self, id: &EntityId) -> Option<SharedSection> {
        self.sections.remove(id)
    }

    pub(crate) fn take_sections(&mut self) -> FxHashMap<EntityId, SharedSection> {
        std::mem::take(&mut self.sections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_shape() {
        let mut section = Section::new_with("section-1".into(), Ticks::ONE_BAR, 2);
        section.insert_note(Note::new_with(
            "note-1".into(),
            Pitch::C4,
            Ticks::ONE_BEAT,
            Ticks::ONE_SIXTEENTH,
            0.8,
        ));
        let mut channel = Channel::new_with("channel-1".into(), "Lead", "basic-synth");
        channel.insert_section(Rc::new(RefCell::new(section)));

        let json: serde_json::Value = serde_json::to_value(&channel).unwrap();
        assert_eq!(json["instrumentPreset"], "basic-synth");
        let s = &json["sections"]["section-1"];
        assert_eq!(s["start"], "1:0:0");
        assert_eq!(s["numBars"], 2);
        let n = &s["notes"]["note-1"];
        assert_eq!(n["note"], "C4");
        assert_eq!(n["time"], "0:1:0");
        assert_eq!(n["duration"], "0:0:1");
        assert_eq!(n["velocity"], 0.8);

        let back: Channel = serde_json::from_value(json).unwrap();
        assert_eq!(back, channel);
    }

    #[test]
    fn section_work_follows_note_edits() {
        let mut section = Section::new_with("s".into(), Ticks::ZERO, 1);
        let whole_bar = TimeRange(Ticks::ZERO..Ticks::ONE_BAR);
        let mut count = 0;
        section.work(&whole_bar, &mut |_| count += 1);
        assert_eq!(count, 0);

        section.insert_note(Note::new_with(
            "n".into(),
            Pitch::A4,
            Ticks::ZERO,
            Ticks::ONE_BEAT,
            1.0,
        ));
        section.work(&whole_bar, &mut |_| count += 1);
        assert_eq!(count, 1, "the part is rebuilt after an edit");

        assert!(section.remove_note(&"n".into()).is_some());
        assert!(section.remove_note(&"n".into()).is_none());
        count = 0;
        section.work(&whole_bar, &mut |_| count += 1);
        assert_eq!(count, 0);
    }

    #[test]
    fn sections_are_at_least_one_bar() {
        let mut section = Section::new_with("s".into(), Ticks::ZERO, 0);
        assert_eq!(section.num_bars(), 1);
        section.set_num_bars(0);
        assert_eq!(section.num_bars(), 1);
        assert_eq!(section.time_range().duration(), Ticks::ONE_BAR);
    }
}
