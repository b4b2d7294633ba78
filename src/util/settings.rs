// Copyright (c) 2024 Mike Tsao

//! Structs that hold configuration information about the editors. Intended to
//! be serialized.

use crate::{
    error::Result,
    types::{Pitch, Px, Quantize},
};
use derivative::Derivative;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Something with persistent settings that should know when it needs saving.
pub trait HasSettings {
    /// Whether the current state of this struct has been saved to disk.
    fn has_been_saved(&self) -> bool;
    /// Call this whenever the struct changes.
    fn needs_save(&mut self);
    /// Call this after a load() or a save().
    fn mark_clean(&mut self);
}

/// The handful of numbers that a grid's geometry is derived from.
#[derive(Clone, Debug, Derivative, Builder, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(default)]
#[serde(default, rename_all = "kebab-case")]
pub struct GridSettings {
    /// Width of the visible stage.
    #[derivative(Default(value = "Px(1200.0)"))]
    pub stage_width: Px,
    /// Height of the visible stage.
    #[derivative(Default(value = "Px(600.0)"))]
    pub stage_height: Px,
    /// Pixels per tick at zoom level 1.
    #[derivative(Default(value = "0.25"))]
    pub tick_to_px_ratio: f64,
    /// Height of one channel (arranger) or one pitch (piano roll).
    #[derivative(Default(value = "Px(40.0)"))]
    pub row_height: Px,
    /// Initial grid-snapping unit.
    pub quantize: Quantize,
    /// How many bars the grid spans.
    #[derivative(Default(value = "32"))]
    pub num_bars: usize,
}

/// Arranger configuration.
#[derive(Clone, Debug, Derivative, Builder, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(default)]
#[serde(default, rename_all = "kebab-case")]
pub struct ArrangerSettings {
    #[allow(missing_docs)]
    #[derivative(Default(value = "GridSettingsBuilder::default().quantize(Quantize::Bar).build().unwrap_or_default()"))]
    pub grid: GridSettings,
    /// Number of channel rows.
    #[derivative(Default(value = "4"))]
    pub num_channels: usize,
}

/// Piano roll configuration.
#[derive(Clone, Debug, Derivative, Builder, PartialEq, Serialize, Deserialize)]
#[derivative(Default)]
#[builder(default)]
#[serde(default, rename_all = "kebab-case")]
pub struct PianoRollSettings {
    #[allow(missing_docs)]
    #[derivative(Default(value = "Self::default_grid()"))]
    pub grid: GridSettings,
    /// The pitch shown on the bottom row.
    #[derivative(Default(value = "Pitch::A0"))]
    pub lowest_pitch: Pitch,
    /// Number of pitch rows. 88 covers a piano keyboard.
    #[derivative(Default(value = "88"))]
    pub num_rows: usize,
    /// Velocity given to newly drawn notes.
    #[derivative(Default(value = "0.8"))]
    pub default_velocity: f64,
    /// Height of the velocity lane; a marker at full velocity is this tall.
    #[derivative(Default(value = "Px(100.0)"))]
    pub velocity_lane_height: Px,
}
impl PianoRollSettings {
    fn default_grid() -> GridSettings {
        GridSettings {
            tick_to_px_ratio: 1.0,
            row_height: Px(16.0),
            quantize: Quantize::Sixteenth,
            num_bars: 1,
            ..Default::default()
        }
    }
}

/// Configuration shared by an editing session.
#[derive(Clone, Debug, Derivative, Serialize, Deserialize)]
#[derivative(Default)]
#[serde(default, rename_all = "kebab-case")]
pub struct EditorSettings {
    #[allow(missing_docs)]
    pub arranger: ArrangerSettings,
    #[allow(missing_docs)]
    pub piano_roll: PianoRollSettings,
    /// Oldest history entries are dropped beyond this many. `None` keeps
    /// everything.
    #[derivative(Default(value = "Some(200)"))]
    pub history_limit: Option<usize>,
    /// How close to an entity's right edge a press starts a resize.
    #[derivative(Default(value = "Self::default_resize_handle_width()"))]
    pub resize_handle_width: Px,

    #[serde(skip)]
    has_been_saved: bool,
}
impl HasSettings for EditorSettings {
    fn has_been_saved(&self) -> bool {
        self.has_been_saved
    }

    fn needs_save(&mut self) {
        self.has_been_saved = false;
    }

    fn mark_clean(&mut self) {
        self.has_been_saved = true;
    }
}
impl EditorSettings {
    fn default_resize_handle_width() -> Px {
        Px(6.0)
    }

    /// Reads settings from JSON. Missing sections take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.mark_clean();
        Ok(settings)
    }

    /// Writes settings as JSON and marks them clean.
    pub fn to_json_string(&mut self) -> Result<String> {
        let json = serde_json::to_string_pretty(self)?;
        self.mark_clean();
        Ok(json)
    }

    /// Updates the history limit and marks the struct eligible to save.
    pub fn set_history_limit(&mut self, limit: Option<usize>) {
        if limit != self.history_limit {
            self.history_limit = limit;
            self.needs_save();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let s = EditorSettings::default();
        assert_eq!(s.arranger.grid.quantize, Quantize::Bar);
        assert_eq!(s.arranger.num_channels, 4);
        assert_eq!(s.piano_roll.grid.quantize, Quantize::Sixteenth);
        assert_eq!(s.piano_roll.num_rows, 88);
        assert_eq!(s.piano_roll.lowest_pitch, Pitch::A0);
        assert!(!s.has_been_saved());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let s = EditorSettings::from_json_str(r#"{ "history-limit": 5 }"#).unwrap();
        assert_eq!(s.history_limit, Some(5));
        assert_eq!(s.arranger, ArrangerSettings::default());
        assert!(s.has_been_saved(), "freshly loaded settings are clean");
    }

    #[test]
    fn dirty_tracking() {
        let mut s = EditorSettings::default();
        let json = s.to_json_string().unwrap();
        assert!(s.has_been_saved());
        s.set_history_limit(Some(10));
        assert!(!s.has_been_saved());

        let reloaded = EditorSettings::from_json_str(&json).unwrap();
        assert_eq!(reloaded.history_limit, Some(200));
    }

    #[test]
    fn builders() {
        let grid = GridSettingsBuilder::default()
            .num_bars(8)
            .quantize(Quantize::Quarter)
            .build()
            .unwrap();
        assert_eq!(grid.num_bars, 8);
        assert_eq!(grid.row_height, Px(40.0), "unset fields take defaults");
    }
}
