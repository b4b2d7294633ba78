// Copyright (c) 2024 Mike Tsao

//! The two editors. Each turns pointer and keyboard input into grid
//! geometry, reconciles the result into the audio model, and records undo
//! history. [Arranger] edits sections on channels; [PianoRoll] edits the
//! notes of one or more sections.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{Arranger, DragMode, DragState, Edits, PianoRoll, SeekerTask, Tool};
}

pub use {
    arranger::Arranger,
    drag::{DragMode, DragState},
    piano_roll::PianoRoll,
    seeker::SeekerTask,
};

pub(crate) use shared::EditorCore;

mod arranger;
mod drag;
mod piano_roll;
mod seeker;
mod shared;

use crate::{
    entities::EntityCache,
    error::Result,
    types::{Direction, EntityId, Point, Quantize, Ticks},
};
use strum_macros::Display;

/// What a pointer press does on empty canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum Tool {
    /// Selects, drags and resizes.
    #[default]
    Pointer,
    /// Draws a new one-column entity.
    Pencil,
}

/// The input surface both editors share. Anything that can draw a grid and
/// forward pointer and keyboard events can drive either editor through
/// this.
pub trait Edits {
    /// Pointer pressed. `additive` is the platform's extend-selection
    /// modifier.
    fn pointer_down(&mut self, point: Point, tool: Tool, additive: bool);
    /// Pointer moved, pressed or not.
    fn pointer_moved(&mut self, point: Point);
    /// Pointer released; finishes whatever the press started.
    fn pointer_released(&mut self, point: Point);

    /// Nudges the selection one grid step. Returns false if the move was
    /// refused.
    fn shift_selected(&mut self, direction: Direction) -> bool;
    /// Deletes the selection. Returns false if nothing was selected.
    fn delete_selected(&mut self) -> bool;
    /// Copies the selection to the clipboard. Returns how many items were
    /// copied.
    fn copy_selected(&mut self) -> usize;
    /// Pastes the clipboard so that its earliest item starts at `reference`.
    /// Returns the ids of what landed, which become the selection.
    fn paste(&mut self, reference: Ticks) -> Vec<EntityId>;
    #[allow(missing_docs)]
    fn select_all(&mut self);

    /// Returns false if there was nothing to undo.
    fn undo(&mut self) -> anyhow::Result<bool>;
    /// Returns false if there was nothing to redo.
    fn redo(&mut self) -> anyhow::Result<bool>;

    /// Changes the horizontal zoom.
    fn set_zoom(&mut self, tick_to_px_ratio: f64) -> Result<()>;
    #[allow(missing_docs)]
    fn set_quantize(&mut self, quantize: Quantize);

    #[allow(missing_docs)]
    fn entities(&self) -> &EntityCache;
    /// Selected ids in a stable order.
    fn selected_ids(&self) -> Vec<EntityId>;
    #[allow(missing_docs)]
    fn drag_mode(&self) -> DragMode;

    /// Copy followed by delete.
    fn cut_selected(&mut self) -> usize {
        let copied = self.copy_selected();
        if copied > 0 {
            self.delete_selected();
        }
        copied
    }
}
