// Copyright (c) 2024 Mike Tsao

use crate::error::GridSyncError;
use core::{fmt::Display, str::FromStr};
use serde::{Deserialize, Serialize};

/// A MIDI note number, written in scientific pitch notation. Note 0 is C-1,
/// so C4 is 60 and A4 is 69.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Pitch(pub u8);

#[allow(missing_docs)]
impl Pitch {
    pub const MAX: Pitch = Pitch(127);
    pub const A0: Pitch = Pitch(21);
    pub const C4: Pitch = Pitch(60);
    pub const A4: Pitch = Pitch(69);
    pub const C8: Pitch = Pitch(108);

    const NAMES: [&'static str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];

    /// The note name without octave, e.g. `"F#"`.
    pub fn note_name(&self) -> &'static str {
        Self::NAMES[(self.0 % 12) as usize]
    }

    pub fn octave(&self) -> i8 {
        (self.0 / 12) as i8 - 1
    }
}
impl Default for Pitch {
    fn default() -> Self {
        Self::C4
    }
}
impl Display for Pitch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{}", self.note_name(), self.octave())
    }
}
impl FromStr for Pitch {
    type Err = GridSyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GridSyncError::InvalidPitch(s.to_string());
        let mut chars = s.trim().chars().peekable();
        let semitone: i32 = match chars.next().map(|c| c.to_ascii_uppercase()) {
            Some('C') => 0,
            Some('D') => 2,
            Some('E') => 4,
            Some('F') => 5,
            Some('G') => 7,
            Some('A') => 9,
            Some('B') => 11,
            _ => return Err(invalid()),
        };
        let accidental = match chars.peek() {
            Some('#') => {
                chars.next();
                1
            }
            Some('b') => {
                chars.next();
                -1
            }
            _ => 0,
        };
        let octave: i32 = chars
            .collect::<String>()
            .parse()
            .map_err(|_| invalid())?;
        let value = (octave + 1) * 12 + semitone + accidental;
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX.0)
            .map(Pitch)
            .ok_or_else(invalid)
    }
}
impl From<Pitch> for String {
    fn from(value: Pitch) -> Self {
        value.to_string()
    }
}
impl TryFrom<String> for Pitch {
    type Error = GridSyncError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
