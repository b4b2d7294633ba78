// Copyright (c) 2024 Mike Tsao

//! Geometry of canvas entities. One generic [GridLayer] handles both sections
//! and notes; [EntityKind] is the only thing that differs between them.
//! [VelocityLayer] handles the piano roll's velocity lane.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        DragBounds, EntityKind, GridLayer, MarqueeOutcome, NoteKind, Placement, SectionKind,
        VelocityLayer, VelocityMarker,
    };
}

pub use {
    grid::{DragBounds, GridLayer, MarqueeOutcome},
    kinds::{NoteKind, SectionKind},
    velocity::{VelocityLayer, VelocityMarker},
};

mod grid;
mod kinds;
mod velocity;

use crate::{
    conversion::Converts,
    types::{EntityId, Px},
};

/// Where an entity should appear, as derived from audio-model data.
#[derive(Clone, Debug, PartialEq)]
pub struct Placement {
    #[allow(missing_docs)]
    pub id: EntityId,
    #[allow(missing_docs)]
    pub x: Px,
    #[allow(missing_docs)]
    pub y: Px,
    #[allow(missing_docs)]
    pub width: Px,
}

/// What a [GridLayer]'s entities stand for.
pub trait EntityKind {
    /// Prefix for freshly minted ids, as in `section-3`.
    const ID_PREFIX: &'static str;

    /// The grid this kind of entity lives on.
    type Conversion: Converts;

    /// The audio-model data that entities are rebuilt from.
    type Source: ?Sized;

    /// One placement per audio-model item that should be visible.
    fn placements(source: &Self::Source, conversion: &Self::Conversion) -> Vec<Placement>;
}
