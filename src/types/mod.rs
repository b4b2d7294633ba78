// Copyright (c) 2024 Mike Tsao

//! Common data types used throughout the system.

/// The most commonly used imports.
pub mod prelude {
    pub use super::{
        Direction, EntityId, IdFactory, Pitch, Point, Px, Quantize, Rect, Ticks, TimeRange,
        TransportTime,
    };
}

pub use {
    geometry::{Direction, Point, Px, Rect},
    pitch::Pitch,
    time::{as_transport_time, Quantize, Ticks, TimeRange, TransportTime},
    uid::{EntityId, IdFactory},
};

mod geometry;
mod pitch;
mod time;
mod uid;
