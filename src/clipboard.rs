// Copyright (c) 2024 Mike Tsao

//! A single-slot clipboard for audio-model items.

use crate::{
    engine::{Note, PlacedSection},
    types::{IdFactory, Ticks},
};
use rustc_hash::FxHashMap;

/// Something that can be copied and pasted at a new time.
pub trait Clipped: Clone {
    /// The time that pasting anchors against.
    fn anchor(&self) -> Ticks;

    #[allow(missing_docs)]
    fn set_anchor(&mut self, time: Ticks);

    /// Replaces this item's id, and those of anything nested inside it, with
    /// freshly minted ones.
    fn refresh_ids(&mut self, ids: &IdFactory);
}

/// Notes are clipped with absolute lane times rather than section-relative
/// ones, so that a paste can cross section boundaries.
impl Clipped for Note {
    fn anchor(&self) -> Ticks {
        self.time
    }

    fn set_anchor(&mut self, time: Ticks) {
        self.time = time;
    }

    fn refresh_ids(&mut self, ids: &IdFactory) {
        self.id = ids.mint_next("note");
    }
}

impl Clipped for PlacedSection {
    fn anchor(&self) -> Ticks {
        self.section.start()
    }

    fn set_anchor(&mut self, time: Ticks) {
        self.section.set_start(time);
    }

    fn refresh_ids(&mut self, ids: &IdFactory) {
        self.section.set_id(ids.mint_next("section"));
        let notes: FxHashMap<_, _> = self
            .section
            .notes()
            .values()
            .map(|note| {
                let mut note = note.clone();
                note.refresh_ids(ids);
                (note.id.clone(), note)
            })
            .collect();
        self.section.set_notes(notes);
    }
}

/// Holds the most recently copied items. Adding replaces whatever was there.
#[derive(Debug)]
pub struct Clipboard<T: Clipped> {
    items: Vec<T>,
}
impl<T: Clipped> Default for Clipboard<T> {
    fn default() -> Self {
        Self {
            items: Default::default(),
        }
    }
}
impl<T: Clipped> Clipboard<T> {
    /// Replaces the buffer.
    pub fn add(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Copies of the buffered items with fresh ids, shifted so that the
    /// earliest lands on `reference` and the rest keep their offsets from it.
    pub fn produce_copy(&self, reference: Ticks, ids: &IdFactory) -> Vec<T> {
        let Some(earliest) = self.items.iter().map(|item| item.anchor()).min() else {
            return Vec::default();
        };
        self.items
            .iter()
            .map(|item| {
                let mut copy = item.clone();
                copy.set_anchor(reference + (item.anchor() - earliest));
                copy.refresh_ids(ids);
                copy
            })
            .collect()
    }

    #[allow(missing_docs)]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[allow(missing_docs)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[allow(missing_docs)]
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::Section,
        types::{EntityId, Pitch},
    };
    use rustc_hash::FxHashSet;

    fn note(id: &str, time: usize) -> Note {
        Note::new_with(id.into(), Pitch::C4, Ticks(time), Ticks(48), 0.5)
    }

    #[test]
    fn paste_preserves_offsets_with_fresh_ids() {
        let ids = IdFactory::new(100);
        let mut clipboard = Clipboard::default();
        clipboard.add(vec![note("note-1", 100), note("note-2", 180)]);

        let copies = clipboard.produce_copy(Ticks(500), &ids);
        assert_eq!(copies.len(), 2);
        assert_eq!(copies[0].time, Ticks(500));
        assert_eq!(copies[1].time, Ticks(580));

        let all: FxHashSet<EntityId> = copies
            .iter()
            .map(|n| n.id.clone())
            .chain(["note-1".into(), "note-2".into()])
            .collect();
        assert_eq!(all.len(), 4, "copies have distinct, new ids");
    }

    #[test]
    fn adding_replaces_and_empty_produces_nothing() {
        let ids = IdFactory::default();
        let mut clipboard = Clipboard::default();
        assert!(clipboard.produce_copy(Ticks(0), &ids).is_empty());
        clipboard.add(vec![note("a", 0), note("b", 1)]);
        clipboard.add(vec![note("c", 7)]);
        assert_eq!(clipboard.len(), 1);
        clipboard.clear();
        assert!(clipboard.is_empty());
    }

    #[test]
    fn nested_notes_get_fresh_ids_on_every_paste() {
        let ids = IdFactory::default();
        let mut section = Section::new_with("section-1".into(), Ticks::ONE_BAR, 1);
        section.insert_note(note("note-1", 0));
        section.insert_note(note("note-2", 48));
        let mut clipboard = Clipboard::default();
        clipboard.add(vec![PlacedSection {
            channel: 1,
            section,
        }]);

        let first = clipboard.produce_copy(Ticks::ONE_BAR * 4, &ids);
        let second = clipboard.produce_copy(Ticks::ONE_BAR * 8, &ids);
        assert_eq!(first[0].channel, 1);
        assert_eq!(first[0].section.start(), Ticks::ONE_BAR * 4);
        assert_eq!(second[0].section.start(), Ticks::ONE_BAR * 8);

        let mut seen = FxHashSet::default();
        for copy in first.iter().chain(second.iter()) {
            assert!(seen.insert(copy.section.id().clone()));
            assert_eq!(copy.section.notes().len(), 2);
            for (key, note) in copy.section.notes() {
                assert_eq!(key, &note.id, "map keys follow the new ids");
                assert!(seen.insert(note.id.clone()), "no id collisions");
            }
        }
        assert!(!seen.contains(&EntityId::from("note-1")));
    }
}
