// Copyright (c) 2024 Mike Tsao

use super::row_of_entity;
use crate::{
    conversion::{Converts, PianoRollConversion},
    engine::{Note, SharedSection},
    entities::GridEntity,
    types::{EntityId, Ticks},
};
use log::debug;

/// Writes piano-roll geometry into the lane of sections being edited. A
/// note belongs to whichever section's time span contains its start.
#[derive(Debug)]
pub struct NoteReconciler {
    default_velocity: f64,
}
impl Default for NoteReconciler {
    fn default() -> Self {
        Self::new_with(0.8)
    }
}
impl NoteReconciler {
    #[allow(missing_docs)]
    pub fn new_with(default_velocity: f64) -> Self {
        Self {
            default_velocity: default_velocity.clamp(0.0, 1.0),
        }
    }

    /// Derives pitch, time and duration from the entity and stores the note
    /// in its owning section, removing it from anywhere else first. Velocity
    /// comes from `velocity` if given, else from the note's prior incarnation,
    /// else the default. Returns the owner's id, or `None` (having changed
    /// nothing) if the entity is off the pitch range or outside every
    /// section.
    pub fn add_note(
        &self,
        lane: &[SharedSection],
        conversion: &PianoRollConversion,
        entity: &GridEntity,
        velocity: Option<f64>,
    ) -> Option<EntityId> {
        let rect = entity.rect();
        let time = conversion.time_at_x(rect.x);
        let Some(pitch) = conversion.pitch_at_row(row_of_entity(conversion, rect.y)) else {
            debug!("{} is off the pitch range", entity.id());
            return None;
        };
        let Some(owner) = Self::owner_of(lane, time) else {
            debug!("{} at {time} is outside every section", entity.id());
            return None;
        };
        let prior = Self::take_note(lane, entity.id());
        let duration = conversion.px_to_engine_ticks(rect.width).max(Ticks(1));
        let velocity = velocity
            .or(prior.map(|n| n.velocity))
            .unwrap_or(self.default_velocity);

        let mut owner = owner.borrow_mut();
        let relative_time = time - owner.start();
        owner.insert_note(Note::new_with(
            entity.id().clone(),
            pitch,
            relative_time,
            duration,
            velocity,
        ));
        debug!("{} -> {} as {pitch} at {relative_time}", entity.id(), owner.id());
        Some(owner.id().clone())
    }

    /// The section that would own the entity as it's currently placed.
    pub fn owner_for(
        &self,
        lane: &[SharedSection],
        conversion: &PianoRollConversion,
        entity: &GridEntity,
    ) -> Option<EntityId> {
        let rect = entity.rect();
        conversion.pitch_at_row(row_of_entity(conversion, rect.y))?;
        Self::owner_of(lane, conversion.time_at_x(rect.x)).map(|s| s.borrow().id().clone())
    }

    /// Removes notes from whichever section has them. Ids that aren't
    /// present are ignored.
    pub fn remove_notes(&self, lane: &[SharedSection], ids: &[EntityId]) {
        for id in ids {
            Self::take_note(lane, id);
        }
    }

    /// Inserts notes whose ids are known to be fresh. Their times are
    /// absolute; each goes to the section that contains it. Returns the ids
    /// that landed.
    pub fn restore_notes(&self, lane: &[SharedSection], notes: Vec<Note>) -> Vec<EntityId> {
        notes
            .into_iter()
            .filter_map(|mut note| {
                let owner = Self::owner_of(lane, note.time)?;
                let mut owner = owner.borrow_mut();
                note.time = note.time - owner.start();
                let id = note.id.clone();
                owner.insert_note(note);
                Some(id)
            })
            .collect()
    }

    /// A copy of the note with its time made absolute, ready for the
    /// clipboard.
    pub fn lane_note(&self, lane: &[SharedSection], id: &EntityId) -> Option<Note> {
        lane.iter().find_map(|section| {
            let section = section.borrow();
            section.note(id).map(|note| {
                let mut note = note.clone();
                note.time = section.start() + note.time;
                note
            })
        })
    }

    /// The id of the section holding the note.
    pub fn owner_id(lane: &[SharedSection], id: &EntityId) -> Option<EntityId> {
        lane.iter().find_map(|section| {
            let section = section.borrow();
            section.contains_note(id).then(|| section.id().clone())
        })
    }

    /// When sections overlap, the one that started most recently wins.
    fn owner_of(lane: &[SharedSection], time: Ticks) -> Option<&SharedSection> {
        lane.iter()
            .filter(|s| s.borrow().time_range().contains(&time))
            .max_by_key(|s| s.borrow().start())
    }

    fn take_note(lane: &[SharedSection], id: &EntityId) -> Option<Note> {
        lane.iter()
            .find_map(|section| section.borrow_mut().remove_note(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        engine::Section,
        types::{Pitch, Px},
    };
    use std::{cell::RefCell, rc::Rc};

    /// Two back-to-back one-bar sections starting at bar 1.
    fn lane() -> Vec<SharedSection> {
        vec![
            Rc::new(RefCell::new(Section::new_with("s1".into(), Ticks::ONE_BAR, 1))),
            Rc::new(RefCell::new(Section::new_with(
                "s2".into(),
                Ticks::ONE_BAR * 2,
                1,
            ))),
        ]
    }

    fn conversion() -> PianoRollConversion {
        let mut c = PianoRollConversion::default();
        c.set_origin(Ticks::ONE_BAR);
        c.dims_mut().set_num_bars(2);
        c
    }

    fn occurrences(lane: &[SharedSection], id: &EntityId) -> usize {
        lane.iter()
            .filter(|s| s.borrow().contains_note(id))
            .count()
    }

    #[test]
    fn notes_follow_their_position_across_sections() {
        let lane = lane();
        let c = conversion();
        let r = NoteReconciler::default();
        let row = c.row_of_pitch(Pitch::C4).unwrap();
        let mut e = GridEntity::new(
            "note-1".into(),
            c.col_width() * 2.0,
            c.row_height() * row as f64,
            c.col_width(),
            c.row_height(),
        );

        assert_eq!(r.add_note(&lane, &c, &e, Some(0.3)), Some("s1".into()));
        let note = lane[0].borrow().note(e.id()).cloned().unwrap();
        assert_eq!(note.note, Pitch::C4);
        assert_eq!(note.time, Ticks::ONE_SIXTEENTH * 2);
        assert_eq!(note.duration, Ticks::ONE_SIXTEENTH);

        e.x.set(c.x_of_time(Ticks::ONE_BAR * 2 + Ticks::ONE_BEAT));
        e.y.set(c.row_height() * (row - 1) as f64);
        assert_eq!(r.add_note(&lane, &c, &e, None), Some("s2".into()));
        assert_eq!(occurrences(&lane, e.id()), 1);
        let note = lane[1].borrow().note(e.id()).cloned().unwrap();
        assert_eq!(note.time, Ticks::ONE_BEAT, "time is relative to the owner");
        assert_eq!(note.note, Pitch(61));
        assert_eq!(note.velocity, 0.3, "velocity survives a move");
    }

    #[test]
    fn notes_outside_every_section_stay_put() {
        let lane = lane();
        let c = conversion();
        let r = NoteReconciler::default();
        let mut e = GridEntity::new("n".into(), Px::ZERO, Px::ZERO, c.col_width(), c.row_height());
        assert!(r.add_note(&lane, &c, &e, None).is_some());
        e.x.set(c.x_of_time(Ticks::ONE_BAR * 5));
        assert_eq!(r.owner_for(&lane, &c, &e), None);
        assert!(r.add_note(&lane, &c, &e, None).is_none());
        assert_eq!(occurrences(&lane, e.id()), 1);
        assert_eq!(
            lane[0].borrow().note(e.id()).unwrap().time,
            Ticks::ZERO,
            "the refused move changed nothing"
        );
    }

    #[test]
    fn default_velocity_applies_to_new_notes() {
        let lane = lane();
        let c = conversion();
        let r = NoteReconciler::new_with(0.6);
        let e = GridEntity::new("n".into(), Px::ZERO, Px::ZERO, c.col_width(), c.row_height());
        r.add_note(&lane, &c, &e, None);
        assert_eq!(lane[0].borrow().note(e.id()).unwrap().velocity, 0.6);
        assert_eq!(NoteReconciler::owner_id(&lane, e.id()), Some("s1".into()));

        r.remove_notes(&lane, &[e.id().clone()]);
        r.remove_notes(&lane, &[e.id().clone()]);
        assert_eq!(occurrences(&lane, e.id()), 0);
    }

    #[test]
    fn restored_notes_use_absolute_times() {
        let lane = lane();
        let r = NoteReconciler::default();
        let notes = vec![
            Note::new_with("a".into(), Pitch::C4, Ticks(768 + 100), Ticks(10), 1.0),
            Note::new_with("b".into(), Pitch::C4, Ticks(1536 + 100), Ticks(10), 1.0),
            Note::new_with("c".into(), Pitch::C4, Ticks(5000), Ticks(10), 1.0),
        ];
        let landed = r.restore_notes(&lane, notes);
        assert_eq!(landed, vec![EntityId::from("a"), EntityId::from("b")]);
        assert_eq!(lane[0].borrow().note(&"a".into()).unwrap().time, Ticks(100));
        assert_eq!(lane[1].borrow().note(&"b".into()).unwrap().time, Ticks(100));
        assert_eq!(
            r.lane_note(&lane, &"b".into()).unwrap().time,
            Ticks(1536 + 100)
        );
    }
}
