// Copyright (c) 2024 Mike Tsao

//! Typed failures. Looking up something that isn't there is never one of
//! them; those cases return `None` or do nothing.

use thiserror::Error;

/// Everything in this crate that can fail with a reason worth reporting.
#[derive(Debug, Error)]
pub enum GridSyncError {
    /// A `bars:beats:sixteenths` string couldn't be parsed.
    #[error("invalid transport time {0:?}")]
    InvalidTransportTime(String),

    /// A note name such as `C#4` couldn't be parsed, or is outside MIDI range.
    #[error("invalid pitch {0:?}")]
    InvalidPitch(String),

    /// Not one of the known duration codes (`1m`, `16n`, ...).
    #[error("invalid quantize code {0:?}")]
    InvalidQuantize(String),

    /// Zoom ratios must be finite and positive.
    #[error("tick-to-pixel ratio must be positive and finite, got {0}")]
    InvalidRatio(f64),

    /// A snapshot couldn't be written or read back.
    #[error("snapshot (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Shorthand for results whose error is [GridSyncError].
pub type Result<T> = core::result::Result<T, GridSyncError>;
