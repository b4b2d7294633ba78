// Copyright (c) 2024 Mike Tsao

//! Pixel/tick math for the editors' grids. This is the only place where
//! canvas distances and musical time are exchanged.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{ArrangerConversion, Converts, GridDimensions, PianoRollConversion};
}

pub use {arranger::ArrangerConversion, piano_roll::PianoRollConversion};

mod arranger;
mod piano_roll;

use crate::{
    error::{GridSyncError, Result},
    types::{Px, Quantize, Ticks},
    util::GridSettings,
};

/// The capabilities an editor needs from its grid. Implementors supply the
/// handful of mutable parameters; everything else is derived from them.
pub trait Converts {
    /// Pixels per tick. The only legal conversion factor at any instant.
    fn tick_to_px_ratio(&self) -> f64;

    /// The current grid-snapping unit.
    fn quantize(&self) -> Quantize;

    /// Height of one row.
    fn row_height(&self) -> Px;

    /// How many rows the grid has.
    fn num_rows(&self) -> usize;

    /// How many bars the grid spans.
    fn num_bars(&self) -> usize;

    /// Width of one grid column, which is one quantize unit.
    fn col_width(&self) -> Px {
        self.engine_ticks_to_px(self.quantize().ticks())
    }

    /// How many columns the grid has.
    fn num_cols(&self) -> usize {
        self.num_bars() * Ticks::PER_BAR / self.quantize().ticks().0
    }

    #[allow(missing_docs)]
    fn grid_width(&self) -> Px {
        self.col_width() * self.num_cols() as f64
    }

    #[allow(missing_docs)]
    fn grid_height(&self) -> Px {
        self.row_height() * self.num_rows() as f64
    }

    /// Real-valued ticks to pixels.
    fn ticks_to_px(&self, ticks: f64) -> Px {
        Px(ticks * self.tick_to_px_ratio())
    }

    /// Pixels to real-valued ticks. The exact inverse of
    /// [ticks_to_px()](Converts::ticks_to_px).
    fn px_to_ticks(&self, px: Px) -> f64 {
        px.0 / self.tick_to_px_ratio()
    }

    #[allow(missing_docs)]
    fn engine_ticks_to_px(&self, ticks: Ticks) -> Px {
        self.ticks_to_px(ticks.as_f64())
    }

    /// Pixels to whole engine ticks. Negative positions become zero. Snap the
    /// pixel value first if it should land on the grid.
    fn px_to_engine_ticks(&self, px: Px) -> Ticks {
        Ticks(self.px_to_ticks(px).round().max(0.0) as usize)
    }

    /// Nearest multiple of the column width. Use this for drag deltas.
    fn round_to_grid_col(&self, px: Px) -> Px {
        round_to_multiple(px, self.col_width())
    }

    /// Nearest multiple of the row height. Use this for drag deltas.
    fn round_to_grid_row(&self, px: Px) -> Px {
        round_to_multiple(px, self.row_height())
    }

    /// Floor to a multiple of the column width. Use this to place new
    /// entities.
    fn round_down_to_grid_col(&self, px: Px) -> Px {
        floor_to_multiple(px, self.col_width())
    }

    /// Floor to a multiple of the row height. Use this to place new entities.
    fn round_down_to_grid_row(&self, px: Px) -> Px {
        floor_to_multiple(px, self.row_height())
    }

    /// The row under the given y coordinate. Coordinates above the grid
    /// count as row zero.
    fn row_at(&self, y: Px) -> usize {
        let row_height = self.row_height().0;
        if row_height > 0.0 {
            (y.0 / row_height).floor().max(0.0) as usize
        } else {
            0
        }
    }
}

fn round_to_multiple(px: Px, unit: Px) -> Px {
    if unit.0 > 0.0 {
        Px((px.0 / unit.0).round() * unit.0)
    } else {
        px
    }
}

fn floor_to_multiple(px: Px, unit: Px) -> Px {
    if unit.0 > 0.0 {
        Px((px.0 / unit.0).floor() * unit.0)
    } else {
        px
    }
}

/// The mutable parameters common to both editors' grids.
#[derive(Clone, Debug, PartialEq)]
pub struct GridDimensions {
    stage_width: Px,
    stage_height: Px,
    tick_to_px_ratio: f64,
    row_height: Px,
    quantize: Quantize,
    num_bars: usize,
}
impl From<&GridSettings> for GridDimensions {
    fn from(value: &GridSettings) -> Self {
        Self {
            stage_width: value.stage_width,
            stage_height: value.stage_height,
            tick_to_px_ratio: if value.tick_to_px_ratio.is_finite() && value.tick_to_px_ratio > 0.0
            {
                value.tick_to_px_ratio
            } else {
                GridSettings::default().tick_to_px_ratio
            },
            row_height: value.row_height,
            quantize: value.quantize,
            num_bars: value.num_bars.max(1),
        }
    }
}
#[allow(missing_docs)]
impl GridDimensions {
    pub fn tick_to_px_ratio(&self) -> f64 {
        self.tick_to_px_ratio
    }

    /// Changes the zoom level. Returns the factor the ratio changed by, which
    /// callers apply to every placed entity so that hand-placed positions
    /// scale rather than re-snap.
    pub fn set_tick_to_px_ratio(&mut self, ratio: f64) -> Result<f64> {
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(GridSyncError::InvalidRatio(ratio));
        }
        let factor = ratio / self.tick_to_px_ratio;
        self.tick_to_px_ratio = ratio;
        Ok(factor)
    }

    pub fn quantize(&self) -> Quantize {
        self.quantize
    }

    pub fn set_quantize(&mut self, quantize: Quantize) {
        self.quantize = quantize;
    }

    pub fn row_height(&self) -> Px {
        self.row_height
    }

    pub fn set_row_height(&mut self, row_height: Px) {
        self.row_height = row_height;
    }

    pub fn num_bars(&self) -> usize {
        self.num_bars
    }

    pub fn set_num_bars(&mut self, num_bars: usize) {
        self.num_bars = num_bars.max(1);
    }

    pub fn stage_width(&self) -> Px {
        self.stage_width
    }

    pub fn stage_height(&self) -> Px {
        self.stage_height
    }

    pub fn set_stage_size(&mut self, width: Px, height: Px) {
        self.stage_width = width;
        self.stage_height = height;
    }

    /// The ratio at which the whole grid width fits the stage.
    pub fn ratio_to_fit_stage(&self) -> f64 {
        self.stage_width.0 / (self.num_bars * Ticks::PER_BAR) as f64
    }
}
