// Copyright (c) 2024 Mike Tsao

//! Makes the audio model match canvas geometry. Every write replaces the id
//! wherever it currently lives, so moving an entity to another row moves its
//! audio counterpart to another owner and never leaves a copy behind.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{NoteReconciler, SectionReconciler};
}

pub use {note::NoteReconciler, section::SectionReconciler};

mod note;
mod section;

use crate::{conversion::Converts, types::Px};

/// The row an entity belongs to, judged by its vertical center so that float
/// error at a row boundary can't tip it into the neighbor.
fn row_of_entity(conversion: &impl Converts, y: Px) -> usize {
    conversion.row_at(y + conversion.row_height() * 0.5)
}
