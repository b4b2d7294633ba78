// Copyright (c) 2024 Mike Tsao

//! Configuration and other odds and ends.

/// Commonly used imports.
pub mod prelude {
    pub use super::{ArrangerSettings, EditorSettings, GridSettings, HasSettings, PianoRollSettings};
}

pub use settings::{
    ArrangerSettings, ArrangerSettingsBuilder, EditorSettings, GridSettings, GridSettingsBuilder,
    HasSettings, PianoRollSettings, PianoRollSettingsBuilder,
};

mod settings;
