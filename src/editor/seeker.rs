// Copyright (c) 2024 Mike Tsao

use crate::{
    conversion::Converts,
    engine::{Transport, TransportState},
    types::Px,
};
use log::debug;

/// The playback-position line as a cancellable per-frame task. It runs only
/// while the transport is started; pausing or stopping cancels it, after
/// which frames do nothing.
#[derive(Debug, Default)]
pub struct SeekerTask {
    is_running: bool,
    frames: usize,
    last_x: Option<Px>,
}
impl SeekerTask {
    /// Starts or cancels the task to match the transport.
    pub fn sync(&mut self, state: TransportState) {
        match state {
            TransportState::Started => self.start(),
            TransportState::Paused | TransportState::Stopped => self.cancel(),
        }
    }

    #[allow(missing_docs)]
    pub fn start(&mut self) {
        if !self.is_running {
            debug!("seeker started");
            self.is_running = true;
        }
    }

    #[allow(missing_docs)]
    pub fn cancel(&mut self) {
        if self.is_running {
            debug!("seeker cancelled after {} frames", self.frames);
            self.is_running = false;
            self.frames = 0;
        }
    }

    #[allow(missing_docs)]
    pub fn is_running(&self) -> bool {
        self.is_running
    }

    /// One animation frame. Returns where the line should be drawn, or
    /// `None` if the task isn't running.
    pub fn on_frame(&mut self, transport: &Transport, conversion: &impl Converts) -> Option<Px> {
        if !self.is_running {
            return None;
        }
        self.frames += 1;
        let x = conversion.engine_ticks_to_px(transport.position());
        self.last_x = Some(x);
        Some(x)
    }

    /// Where the line was last drawn. Survives cancellation so a paused
    /// line stays put.
    pub fn last_x(&self) -> Option<Px> {
        self.last_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{conversion::ArrangerConversion, types::Ticks};

    #[test]
    fn seeker_follows_transport_state() {
        let conversion = ArrangerConversion::default();
        let mut transport = Transport::default();
        let mut seeker = SeekerTask::default();
        assert_eq!(seeker.on_frame(&transport, &conversion), None);

        transport.start();
        seeker.sync(transport.state());
        transport.advance(Ticks::ONE_BAR);
        assert_eq!(
            seeker.on_frame(&transport, &conversion),
            Some(conversion.col_width())
        );

        transport.pause();
        seeker.sync(transport.state());
        assert!(!seeker.is_running());
        assert_eq!(seeker.on_frame(&transport, &conversion), None);
        assert_eq!(seeker.last_x(), Some(conversion.col_width()));

        transport.stop();
        seeker.sync(transport.state());
        assert!(!seeker.is_running());
    }
}
