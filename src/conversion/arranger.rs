// Copyright (c) 2024 Mike Tsao

use super::{Converts, GridDimensions};
use crate::{
    types::{Px, Quantize},
    util::ArrangerSettings,
};
use delegate::delegate;

/// The arranger's grid: one row per channel, time running left to right from
/// the start of the song.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrangerConversion {
    dims: GridDimensions,
    num_channels: usize,
}
impl Converts for ArrangerConversion {
    delegate! {
        to self.dims {
            fn tick_to_px_ratio(&self) -> f64;
            fn quantize(&self) -> Quantize;
            fn row_height(&self) -> Px;
            fn num_bars(&self) -> usize;
        }
    }

    fn num_rows(&self) -> usize {
        self.num_channels
    }
}
impl ArrangerConversion {
    #[allow(missing_docs)]
    pub fn new_with(settings: &ArrangerSettings) -> Self {
        Self {
            dims: GridDimensions::from(&settings.grid),
            num_channels: settings.num_channels,
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

    #[allow(missing_docs)]
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Called when channels are added or removed.
    pub fn set_num_channels(&mut self, num_channels: usize) {
        self.num_channels = num_channels;
    }

    /// The channel index whose row contains `y`.
    pub fn channel_at(&self, y: Px) -> usize {
        self.row_at(y)
    }

    /// The top edge of a channel's row.
    pub fn y_of_channel(&self, channel_index: usize) -> Px {
        self.row_height() * channel_index as f64
    }
}
impl Default for ArrangerConversion {
    fn default() -> Self {
        Self::new_with(&ArrangerSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Ticks;

    #[test]
    fn arranger_rows_are_channels() {
        let c = ArrangerConversion::default();
        assert_eq!(c.quantize(), Quantize::Bar);
        assert_eq!(c.col_width(), c.engine_ticks_to_px(Ticks::ONE_BAR));
        assert_eq!(c.num_cols(), 32);
        assert_eq!(c.grid_height(), c.row_height() * 4.0);
        assert_eq!(c.channel_at(c.y_of_channel(2) + Px(1.0)), 2);
    }
}
