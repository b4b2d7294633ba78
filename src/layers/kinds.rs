// Copyright (c) 2024 Mike Tsao

use super::{EntityKind, Placement};
use crate::{
    conversion::{ArrangerConversion, Converts, PianoRollConversion},
    engine::{AudioEngine, SharedSection},
    types::Ticks,
};
use log::warn;

/// Arranger entities: one rectangle per [Section](crate::engine::Section),
/// on its channel's row.
#[derive(Debug)]
pub struct SectionKind;
impl EntityKind for SectionKind {
    const ID_PREFIX: &'static str = "section";
    type Conversion = ArrangerConversion;
    type Source = AudioEngine;

    fn placements(engine: &AudioEngine, conversion: &ArrangerConversion) -> Vec<Placement> {
        engine
            .sections()
            .into_iter()
            .map(|(index, section)| {
                let section = section.borrow();
                Placement {
                    id: section.id().clone(),
                    x: conversion.engine_ticks_to_px(section.start()),
                    y: conversion.y_of_channel(index),
                    width: conversion.engine_ticks_to_px(Ticks::ONE_BAR * section.num_bars()),
                }
            })
            .collect()
    }
}

/// Piano-roll entities: one rectangle per [Note](crate::engine::Note) in the
/// lane being edited, on its pitch's row.
#[derive(Debug)]
pub struct NoteKind;
impl EntityKind for NoteKind {
    const ID_PREFIX: &'static str = "note";
    type Conversion = PianoRollConversion;
    type Source = [SharedSection];

    fn placements(lane: &[SharedSection], conversion: &PianoRollConversion) -> Vec<Placement> {
        let mut placements = Vec::default();
        for section in lane {
            let section = section.borrow();
            for note in section.notes().values() {
                let Some(row) = conversion.row_of_pitch(note.note) else {
                    warn!("{} is outside the piano roll's range; not shown", note.note);
                    continue;
                };
                placements.push(Placement {
                    id: note.id.clone(),
                    x: conversion.x_of_time(section.start() + note.time),
                    y: conversion.row_height() * row as f64,
                    width: conversion.engine_ticks_to_px(note.duration),
                });
            }
        }
        placements
    }
}
