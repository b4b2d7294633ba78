// Copyright (c) 2024 Mike Tsao

//! Handles musical time as the engine sees it: integer ticks, the
//! `bars:beats:sixteenths` transport notation, and grid quantization codes.

use crate::error::GridSyncError;
use core::{
    fmt::{self, Display},
    ops::{Mul, Range},
    str::FromStr,
};
use serde::{Deserialize, Serialize};
use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use synonym::Synonym;

/// [Ticks] is the engine-native unit of musical time. A bar of 4/4 is 768
/// ticks, so a beat is 192 and a sixteenth is 48.
#[derive(Synonym, Serialize, Deserialize)]
#[synonym(skip(Display))]
pub struct Ticks(pub usize);

#[allow(missing_docs)]
impl Ticks {
    pub const BEATS_IN_BAR: usize = 4;
    pub const SIXTEENTHS_IN_BEAT: usize = 4;
    pub const PER_BAR: usize = 768;
    pub const PER_BEAT: usize = Self::PER_BAR / Self::BEATS_IN_BAR;
    pub const PER_SIXTEENTH: usize = Self::PER_BEAT / Self::SIXTEENTHS_IN_BEAT;

    pub const ZERO: Ticks = Ticks(0);
    pub const ONE_BAR: Ticks = Ticks(Self::PER_BAR);
    pub const ONE_BEAT: Ticks = Ticks(Self::PER_BEAT);
    pub const ONE_SIXTEENTH: Ticks = Ticks(Self::PER_SIXTEENTH);

    pub const fn new_with_bars(bars: usize) -> Self {
        Self(bars * Self::PER_BAR)
    }

    pub const fn new_with_beats(beats: usize) -> Self {
        Self(beats * Self::PER_BEAT)
    }

    pub const fn new_with_sixteenths(sixteenths: usize) -> Self {
        Self(sixteenths * Self::PER_SIXTEENTH)
    }

    /// The whole number of bars that have elapsed.
    pub const fn bars(&self) -> usize {
        self.0 / Self::PER_BAR
    }

    /// The length expressed in (possibly fractional) bars.
    pub fn fractional_bars(&self) -> f64 {
        self.0 as f64 / Self::PER_BAR as f64
    }

    /// Subtraction that stops at zero rather than wrapping.
    pub const fn saturating_sub(self, rhs: Ticks) -> Ticks {
        Ticks(self.0.saturating_sub(rhs.0))
    }

    /// The value as a real number, for pixel math.
    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }
}
impl Display for Ticks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ticks", self.0)
    }
}
impl Mul<usize> for Ticks {
    type Output = Self;

    fn mul(self, rhs: usize) -> Self::Output {
        Self(self.0 * rhs)
    }
}

/// A position or duration in the transport's `bars:beats:sixteenths`
/// notation. Sixteenths may be fractional ("0:1:2.5").
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TransportTime {
    #[allow(missing_docs)]
    pub bars: usize,
    #[allow(missing_docs)]
    pub beats: usize,
    #[allow(missing_docs)]
    pub sixteenths: f64,
}
impl TransportTime {
    /// Converts to engine ticks, rounding to the nearest tick.
    pub fn to_ticks(&self) -> Ticks {
        let whole = self.bars * Ticks::PER_BAR + self.beats * Ticks::PER_BEAT;
        let fractional = (self.sixteenths * Ticks::PER_SIXTEENTH as f64).round() as usize;
        Ticks(whole + fractional)
    }
}
impl From<Ticks> for TransportTime {
    fn from(value: Ticks) -> Self {
        let bars = value.0 / Ticks::PER_BAR;
        let within_bar = value.0 % Ticks::PER_BAR;
        let beats = within_bar / Ticks::PER_BEAT;
        let within_beat = within_bar % Ticks::PER_BEAT;
        Self {
            bars,
            beats,
            sixteenths: within_beat as f64 / Ticks::PER_SIXTEENTH as f64,
        }
    }
}
impl From<TransportTime> for Ticks {
    fn from(value: TransportTime) -> Self {
        value.to_ticks()
    }
}
impl Display for TransportTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sixteenths.fract() == 0.0 {
            write!(f, "{}:{}:{}", self.bars, self.beats, self.sixteenths as usize)
        } else {
            // Three decimals keeps the rounding error far below half a tick.
            let s = format!("{:.3}", self.sixteenths);
            let s = s.trim_end_matches('0').trim_end_matches('.');
            write!(f, "{}:{}:{}", self.bars, self.beats, s)
        }
    }
}
impl FromStr for TransportTime {
    type Err = GridSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GridSyncError::InvalidTransportTime(s.to_string());
        let mut fields = s.trim().split(':');
        let bars = fields
            .next()
            .and_then(|f| f.trim().parse::<usize>().ok())
            .ok_or_else(invalid)?;
        let beats = match fields.next() {
            Some(f) => f.trim().parse::<usize>().map_err(|_| invalid())?,
            None => 0,
        };
        let sixteenths = match fields.next() {
            Some(f) => f.trim().parse::<f64>().map_err(|_| invalid())?,
            None => 0.0,
        };
        if fields.next().is_some() || !sixteenths.is_finite() || sixteenths < 0.0 {
            return Err(invalid());
        }
        Ok(Self {
            bars,
            beats,
            sixteenths,
        })
    }
}

/// Serde adapter that stores [Ticks] as a `bars:beats:sixteenths` string.
pub mod as_transport_time {
    use super::{Ticks, TransportTime};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    #[allow(missing_docs)]
    pub fn serialize<S: Serializer>(ticks: &Ticks, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&TransportTime::from(*ticks))
    }

    #[allow(missing_docs)]
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Ticks, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<TransportTime>()
            .map(|t| t.to_ticks())
            .map_err(D::Error::custom)
    }
}

/// A half-open range of [Ticks]. Its principal use is deciding which slice of
/// the song to play during [AudioEngine::work()](crate::engine::AudioEngine::work).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange(pub Range<Ticks>);
impl TimeRange {
    /// Creates a new [TimeRange] with the given absolute start and (relative)
    /// duration.
    pub fn new_with_start_and_duration(start: Ticks, duration: Ticks) -> Self {
        Self(start..(start + duration))
    }

    #[allow(missing_docs)]
    pub fn start(&self) -> Ticks {
        self.0.start
    }

    #[allow(missing_docs)]
    pub fn end(&self) -> Ticks {
        self.0.end
    }

    #[allow(missing_docs)]
    pub fn duration(&self) -> Ticks {
        self.0.end.saturating_sub(self.0.start)
    }

    #[allow(missing_docs)]
    pub fn contains(&self, item: &Ticks) -> bool {
        self.0.contains(item)
    }

    /// Returns true if this TimeRange overlaps with the given one.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.0.start < other.0.end && other.0.start < self.0.end
    }
}
impl From<Range<Ticks>> for TimeRange {
    fn from(value: Range<Ticks>) -> Self {
        Self(value)
    }
}

/// [Quantize] is the grid-snapping unit, named by the usual duration codes.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    EnumString,
    IntoStaticStr,
    StrumDisplay,
    Serialize,
    Deserialize,
)]
pub enum Quantize {
    /// One bar
    #[strum(serialize = "1m")]
    #[serde(rename = "1m")]
    Bar,
    /// minim
    #[strum(serialize = "2n")]
    #[serde(rename = "2n")]
    Half,
    /// crotchet
    #[strum(serialize = "4n")]
    #[serde(rename = "4n")]
    Quarter,
    /// quaver
    #[strum(serialize = "8n")]
    #[serde(rename = "8n")]
    Eighth,
    /// semiquaver
    #[default]
    #[strum(serialize = "16n")]
    #[serde(rename = "16n")]
    Sixteenth,
    /// demisemiquaver
    #[strum(serialize = "32n")]
    #[serde(rename = "32n")]
    ThirtySecond,
    /// Three to a half note
    #[strum(serialize = "4t")]
    #[serde(rename = "4t")]
    QuarterTriplet,
    /// Three to a quarter note
    #[strum(serialize = "8t")]
    #[serde(rename = "8t")]
    EighthTriplet,
    /// Three to an eighth note
    #[strum(serialize = "16t")]
    #[serde(rename = "16t")]
    SixteenthTriplet,
}
impl Quantize {
    /// The length of one grid cell.
    pub const fn ticks(&self) -> Ticks {
        Ticks(match self {
            Quantize::Bar => Ticks::PER_BAR,
            Quantize::Half => Ticks::PER_BAR / 2,
            Quantize::Quarter => Ticks::PER_BAR / 4,
            Quantize::Eighth => Ticks::PER_BAR / 8,
            Quantize::Sixteenth => Ticks::PER_BAR / 16,
            Quantize::ThirtySecond => Ticks::PER_BAR / 32,
            Quantize::QuarterTriplet => Ticks::PER_BAR / 6,
            Quantize::EighthTriplet => Ticks::PER_BAR / 12,
            Quantize::SixteenthTriplet => Ticks::PER_BAR / 24,
        })
    }

    /// Parses a duration code such as `"16n"`.
    pub fn from_code(code: &str) -> Result<Self, GridSyncError> {
        Self::from_str(code).map_err(|_| GridSyncError::InvalidQuantize(code.to_string()))
    }

    /// The duration code, such as `"16n"`.
    pub fn code(&self) -> &'static str {
        self.into()
    }
}
