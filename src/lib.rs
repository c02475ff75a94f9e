//! # Pitch Contour
//! *pitch_contour* estimates the fundamental frequency (f0) of a monophonic speech
//! signal frame by frame and decides whether each frame is voiced.
//!
//! # Pipeline
//! A [PitchPipeline][pipeline::PitchPipeline] takes a whole signal through
//!
//!   * pre-processing: moving average smoothing and two-tier center clipping,
//!   * framing: 30 ms frames every 15 ms,
//!   * frame analysis with a [FrameAnalyzer][detector::FrameAnalyzer]: windowing,
//!     a similarity function (autocorrelation, AMDF or cepstrum), a lag search within
//!     the F0 range and a voiced/unvoiced rule,
//!   * post-processing: a median filter over the contour.
//!
//! # Examples
//! ```
//! use pitch_contour::pipeline::{PipelineConfig, PitchPipeline};
//!
//! fn main() {
//!     const SAMPLE_RATE: usize = 8000;
//!
//!     // Half a second of a 200 Hz tone.
//!     let dt = 1.0 / SAMPLE_RATE as f64;
//!     let freq = 200.0;
//!     let signal: Vec<f64> = (0..SAMPLE_RATE / 2)
//!         .map(|x| 0.5 * (2.0 * std::f64::consts::PI * x as f64 * dt * freq).sin())
//!         .collect();
//!
//!     let pipeline = PitchPipeline::new(SAMPLE_RATE, &PipelineConfig::default()).unwrap();
//!     let contour = pipeline.run(&signal);
//!
//!     for f0 in contour.with_boundaries() {
//!         println!("{}", f0);
//!     }
//! }
//! ```
//!
//! A single frame can be analyzed directly:
//! ```
//! use pitch_contour::detector::{FrameAnalyzer, Window};
//!
//! let analyzer = FrameAnalyzer::<f32>::new(240, 8000, Window::Hamming, 50.0, 500.0).unwrap();
//! let mut frame = vec![0.0; 240];
//! assert_eq!(analyzer.analyze(&mut frame), 0.0);
//! ```

pub use error::{Error, Result};
pub use pipeline::{F0Contour, PipelineConfig, PitchPipeline};
pub use signal::Signal;

pub mod detector;
pub mod error;
pub mod float;
pub mod pipeline;
pub mod signal;
pub mod utils;
