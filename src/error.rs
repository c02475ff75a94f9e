//! Errors reported while configuring an analysis or loading a signal.
//!
//! Per-frame problems are never errors: a frame of the wrong length is reported through
//! a sentinel value and a silent frame is simply classified as unvoiced. Only
//! configurations that could never produce an estimate are rejected, and they are
//! rejected before any frame is read.

use thiserror::Error;

/// Result type alias using this crate's [Error] type.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The lag search range is empty once the pitch bounds are clamped to the frame.
    ///
    /// `min_lag` comes from the maximum F0 and `max_lag` from the minimum F0, the latter
    /// limited to half of `frame_len` so that every frame holds two full periods.
    #[error("empty lag search range [{min_lag}, {max_lag}) for a frame of {frame_len} samples")]
    EmptyLagRange {
        min_lag: usize,
        max_lag: usize,
        frame_len: usize,
    },

    /// A parameter is outside of its valid domain.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error reading a WAV file.
    #[cfg(feature = "wav")]
    #[error("failed to read audio file: {0}")]
    AudioRead(#[from] hound::Error),

    /// Only single channel audio is analyzed.
    #[cfg(feature = "wav")]
    #[error("audio must be mono, got {0} channels")]
    NotMono(u16),
}
