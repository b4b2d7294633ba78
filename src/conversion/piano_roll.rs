// Copyright (c) 2024 Mike Tsao

use super::{Converts, GridDimensions};
use crate::{
    types::{Pitch, Px, Quantize, Ticks},
    util::PianoRollSettings,
};
use delegate::delegate;

/// The piano roll's grid: one row per pitch with the highest pitch on top,
/// and time measured from `origin`, the start of the earliest section being
/// edited.
#[derive(Clone, Debug, PartialEq)]
pub struct PianoRollConversion {
    dims: GridDimensions,
    lowest_pitch: Pitch,
    num_rows: usize,
    origin: Ticks,
}
impl Converts for PianoRollConversion {
    delegate! {
        to self.dims {
            fn tick_to_px_ratio(&self) -> f64;
            fn quantize(&self) -> Quantize;
            fn row_height(&self) -> Px;
            fn num_bars(&self) -> usize;
        }
    }

    fn num_rows(&self) -> usize {
        self.num_rows
    }
}
impl PianoRollConversion {
    #[allow(missing_docs)]
    pub fn new_with(settings: &PianoRollSettings) -> Self {
        let lowest_pitch = settings.lowest_pitch;
        let max_rows = (Pitch::MAX.0 - lowest_pitch.0) as usize + 1;
        Self {
            dims: GridDimensions::from(&settings.grid),
            lowest_pitch,
            num_rows: settings.num_rows.clamp(1, max_rows),
            origin: Ticks::ZERO,
        }
    }

    /// The mutable grid parameters.
    pub fn dims(&self) -> &GridDimensions {
        &self.dims
    }

    /// The mutable grid parameters (mutable).
    pub fn dims_mut(&mut self) -> &mut GridDimensions {
        &mut self.dims
    }

    /// Absolute song time at x = 0.
    pub fn origin(&self) -> Ticks {
        self.origin
    }

    #[allow(missing_docs)]
    pub fn set_origin(&mut self, origin: Ticks) {
        self.origin = origin;
    }

    /// The pitch on the top row.
    pub fn highest_pitch(&self) -> Pitch {
        Pitch(self.lowest_pitch.0 + (self.num_rows - 1) as u8)
    }

    #[allow(missing_docs)]
    pub fn lowest_pitch(&self) -> Pitch {
        self.lowest_pitch
    }

    /// The pitch shown on the given row, if the row exists.
    pub fn pitch_at_row(&self, row: usize) -> Option<Pitch> {
        if row < self.num_rows {
            Some(Pitch(self.highest_pitch().0 - row as u8))
        } else {
            None
        }
    }

    /// The row showing the given pitch, if it's in range.
    pub fn row_of_pitch(&self, pitch: Pitch) -> Option<usize> {
        if pitch >= self.lowest_pitch && pitch <= self.highest_pitch() {
            Some((self.highest_pitch().0 - pitch.0) as usize)
        } else {
            None
        }
    }

    /// The x coordinate of an absolute song time.
    pub fn x_of_time(&self, time: Ticks) -> Px {
        self.engine_ticks_to_px(time.saturating_sub(self.origin))
    }

    /// The absolute song time at an x coordinate.
    pub fn time_at_x(&self, x: Px) -> Ticks {
        self.origin + self.px_to_engine_ticks(x)
    }
}
impl Default for PianoRollConversion {
    fn default() -> Self {
        Self::new_with(&PianoRollSettings::default())
    }
}
