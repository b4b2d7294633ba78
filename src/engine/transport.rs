// Copyright (c) 2024 Mike Tsao

use crate::{
    error::Result,
    types::{Ticks, TimeRange, TransportTime},
};
use log::debug;
use strum_macros::Display;

/// The transport's play state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
pub enum TransportState {
    #[allow(missing_docs)]
    Started,
    #[allow(missing_docs)]
    Paused,
    #[allow(missing_docs)]
    #[default]
    Stopped,
}

/// [Transport] is the global clock. It keeps track of the current position in
/// the song and whether it's moving.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transport {
    state: TransportState,
    position: Ticks,
}
impl Transport {
    #[allow(missing_docs)]
    pub fn state(&self) -> TransportState {
        self.state
    }

    #[allow(missing_docs)]
    pub fn is_started(&self) -> bool {
        self.state == TransportState::Started
    }

    /// The current position in ticks.
    pub fn position(&self) -> Ticks {
        self.position
    }

    /// The current position in `bars:beats:sixteenths` form.
    pub fn position_transport_time(&self) -> TransportTime {
        TransportTime::from(self.position)
    }

    #[allow(missing_docs)]
    pub fn set_position(&mut self, position: Ticks) {
        self.position = position;
    }

    /// Sets the position from a `bars:beats:sixteenths` string.
    pub fn set_position_str(&mut self, position: &str) -> Result<()> {
        self.position = position.parse::<TransportTime>()?.to_ticks();
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn start(&mut self) {
        debug!("transport {} -> Started at {}", self.state, self.position);
        self.state = TransportState::Started;
    }

    /// Freezes the clock where it is.
    pub fn pause(&mut self) {
        if self.state == TransportState::Started {
            self.state = TransportState::Paused;
        }
    }

    /// Halts and rewinds to the start of the song.
    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
        self.position = Ticks::ZERO;
    }

    /// Advances the clock. Returns the range from the prior position to now,
    /// which is empty unless the transport is started.
    pub fn advance(&mut self, ticks: Ticks) -> TimeRange {
        let start = self.position;
        if self.is_started() {
            self.position = start + ticks;
        }
        TimeRange(start..self.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_only_moves_when_started() {
        let mut t = Transport::default();
        assert_eq!(t.state(), TransportState::Stopped);
        assert_eq!(t.advance(Ticks(100)).duration(), Ticks::ZERO);

        t.start();
        let range = t.advance(Ticks(100));
        assert_eq!(range, TimeRange(Ticks(0)..Ticks(100)));
        assert_eq!(t.position(), Ticks(100));

        t.pause();
        assert_eq!(t.state(), TransportState::Paused);
        assert!(t.advance(Ticks(100)).duration() == Ticks::ZERO);
        assert_eq!(t.position(), Ticks(100), "pause keeps the position");

        t.stop();
        assert_eq!(t.position(), Ticks::ZERO, "stop rewinds");
    }

    #[test]
    fn positions_in_both_forms() {
        let mut t = Transport::default();
        t.set_position_str("2:1:0").unwrap();
        assert_eq!(t.position(), Ticks(2 * 768 + 192));
        assert_eq!(t.position_transport_time().to_string(), "2:1:0");
        assert!(t.set_position_str("nonsense").is_err());
        assert_eq!(t.position(), Ticks(2 * 768 + 192), "bad input changes nothing");
    }
}
