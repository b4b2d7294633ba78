// Copyright (c) 2024 Mike Tsao

use super::Note;
use crate::types::{EntityId, Pitch, Ticks, TimeRange};

/// Passes [PlaybackEvent]s to the caller. Used in [Part::work()].
pub type PlaybackEventsFn<'a> = dyn FnMut(PlaybackEvent) + 'a;

/// One note as the audio collaborator should hear it, in absolute song time.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackEvent {
    #[allow(missing_docs)]
    pub section_id: EntityId,
    #[allow(missing_docs)]
    pub note_id: EntityId,
    #[allow(missing_docs)]
    pub pitch: Pitch,
    /// Absolute start time.
    pub time: Ticks,
    #[allow(missing_docs)]
    pub duration: Ticks,
    #[allow(missing_docs)]
    pub velocity: f64,
}

/// The schedulable playback handle for one section. It is derived from the
/// section's notes and rebuilt whenever they change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Part {
    events: Vec<PlaybackEvent>,
}
impl Part {
    /// Builds a part whose events are sorted by absolute start time.
    pub fn new_with<'a>(
        section_id: &EntityId,
        start: Ticks,
        notes: impl Iterator<Item = &'a Note>,
    ) -> Self {
        let mut events: Vec<PlaybackEvent> = notes
            .map(|note| PlaybackEvent {
                section_id: section_id.clone(),
                note_id: note.id.clone(),
                pitch: note.note,
                time: start + note.time,
                duration: note.duration,
                velocity: note.velocity,
            })
            .collect();
        events.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.note_id.cmp(&b.note_id)));
        Self { events }
    }

    /// Fires the callback once for every event whose start falls inside the
    /// half-open range.
    pub fn work(&self, range: &TimeRange, playback_events_fn: &mut PlaybackEventsFn) {
        let first = self.events.partition_point(|e| e.time < range.start());
        self.events[first..]
            .iter()
            .take_while(|e| e.time < range.end())
            .for_each(|e| playback_events_fn(e.clone()));
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(id: &str, time: usize) -> Note {
        Note {
            id: id.into(),
            note: Pitch::C4,
            time: Ticks(time),
            duration: Ticks::ONE_SIXTEENTH,
            velocity: 0.5,
        }
    }

    #[test]
    fn part_fires_events_in_range() {
        let notes = [note("a", 0), note("b", 96), note("c", 192)];
        let part = Part::new_with(&"s".into(), Ticks::ONE_BAR, notes.iter());
        assert_eq!(part.len(), 3);

        let mut fired = Vec::default();
        part.work(
            &TimeRange(Ticks(768)..Ticks(768 + 192)),
            &mut |e| fired.push(e),
        );
        assert_eq!(fired.len(), 2, "the range end is exclusive");
        assert_eq!(fired[0].note_id, EntityId::from("a"));
        assert_eq!(fired[1].time, Ticks(768 + 96), "times are absolute");

        fired.clear();
        part.work(&TimeRange(Ticks(0)..Ticks(768)), &mut |e| fired.push(e));
        assert!(fired.is_empty());
    }
}
