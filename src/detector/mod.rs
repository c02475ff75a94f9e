//! Frame level analysis: windowing, similarity functions, lag search and the
//! voiced/unvoiced decision.

pub mod analyzer;
pub mod internals;
pub mod voicing;
pub mod window;

pub use analyzer::{FrameAnalyzer, PitchRange, Similarity, FRAME_SKIPPED};
pub use voicing::{FrameFeatures, VoicingThresholds};
pub use window::Window;
