// Copyright (c) 2024 Mike Tsao

#![deny(missing_docs, unused_imports, unused_variables)]
#![allow(rustdoc::private_intra_doc_links)]

//! Gridsync keeps a sequencer's canvas and its audio model in agreement.
//!
//! Two editors are provided. The [Arranger](editor::Arranger) places
//! sections on channel rows; the [PianoRoll](editor::PianoRoll) places notes
//! on pitch rows within one or more sections. Both turn pointer and keyboard
//! input into grid geometry, then hand the ids that changed to a
//! [reconciler](reconcile) that rewrites the [AudioEngine](engine::AudioEngine)
//! to match. Every committed edit is recorded as a serialized snapshot, so
//! undo and redo are a matter of forcing both sides back to an earlier
//! snapshot.
//!
//! ```
//! use gridsync::prelude::*;
//!
//! let settings = EditorSettings::default();
//! let mut arranger =
//!     Arranger::new_with(AudioEngine::default(), &settings, EventBus::default()).unwrap();
//! arranger.pointer_down(Point::new(10.0, 10.0), Tool::Pencil, false);
//! assert_eq!(arranger.engine().sections().len(), 1);
//! assert!(arranger.undo().unwrap());
//! assert!(arranger.engine().sections().is_empty());
//! ```

/// A collection of imports that are useful to users of this crate. `use
/// gridsync::prelude::*;` for easier onboarding.
pub mod prelude {
    pub use super::{
        bus::{EditorEvent, EditorKind, EventBus},
        clipboard::{Clipboard, Clipped},
        conversion::prelude::*,
        editor::prelude::*,
        engine::prelude::*,
        entities::prelude::*,
        error::{GridSyncError, Result},
        history::{HistoryStack, Snapshot},
        layers::prelude::*,
        reconcile::prelude::*,
        types::prelude::*,
        util::prelude::*,
    };
}

pub use {
    editor::{Arranger, PianoRoll},
    engine::AudioEngine,
    error::{GridSyncError, Result},
};

pub mod bus;
pub mod clipboard;
pub mod conversion;
pub mod editor;
pub mod engine;
pub mod entities;
pub mod error;
pub mod history;
pub mod layers;
pub mod reconcile;
pub mod types;
pub mod util;
