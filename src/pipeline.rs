//! Signal to contour: pre-processing, framing, per-frame analysis and median filtering.

use std::io::{self, Write};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::detector::{FrameAnalyzer, FrameFeatures, Similarity, VoicingThresholds, Window};
use crate::error::{Error, Result};
use crate::float::Float;
use crate::signal::frame_starts;
use crate::utils::filters::{center_clip, in_place_moving_average, median_filter, moving_average};

/// Length of an analysis frame.
pub const FRAME_LEN_SECONDS: f64 = 0.030;
/// Distance between the starts of consecutive frames.
pub const FRAME_SHIFT_SECONDS: f64 = 0.015;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum SmoothingMode {
    /// Mean of the unfiltered neighborhood.
    #[default]
    MovingAverage,
    /// Running sum written back into the signal after every tap. See
    /// [in_place_moving_average].
    InPlace,
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Smoothing {
    /// Odd number of taps.
    pub width: usize,
    pub mode: SmoothingMode,
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing {
            width: 7,
            mode: SmoothingMode::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct CenterClipping {
    /// Fraction of the peak magnitude of the whole signal below which samples are zeroed.
    pub global_ratio: f64,
    /// Fraction of the peak magnitude of each block below which samples are zeroed.
    pub local_ratio: f64,
    /// Block length of the local pass, in samples.
    pub block_len: usize,
}

impl Default for CenterClipping {
    fn default() -> Self {
        CenterClipping {
            global_ratio: 0.05,
            local_ratio: 0.15,
            block_len: 200,
        }
    }
}

/// Stages applied to the whole signal before framing. Smoothing runs first.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct Preprocessing {
    pub smoothing: Option<Smoothing>,
    pub clipping: Option<CenterClipping>,
}

impl Default for Preprocessing {
    fn default() -> Self {
        Preprocessing {
            smoothing: Some(Smoothing::default()),
            clipping: Some(CenterClipping::default()),
        }
    }
}

impl Preprocessing {
    /// No smoothing and no clipping.
    pub fn none() -> Self {
        Preprocessing {
            smoothing: None,
            clipping: None,
        }
    }

    fn validate(&self) -> Result<()> {
        if let Some(smoothing) = &self.smoothing {
            if smoothing.width % 2 == 0 {
                return Err(Error::InvalidParameter(format!(
                    "smoothing width must be odd, got {}",
                    smoothing.width
                )));
            }
        }
        if let Some(clipping) = &self.clipping {
            if clipping.block_len == 0 {
                return Err(Error::InvalidParameter(
                    "clipping block length must be positive".into(),
                ));
            }
            if !(0.0..=1.0).contains(&clipping.global_ratio)
                || !(0.0..=1.0).contains(&clipping.local_ratio)
            {
                return Err(Error::InvalidParameter(format!(
                    "clipping ratios must lie in [0, 1], got {} and {}",
                    clipping.global_ratio, clipping.local_ratio
                )));
            }
        }
        Ok(())
    }

    /// Run the enabled stages on `signal` in place.
    pub fn apply<T: Float>(&self, signal: &mut [T]) {
        match &self.smoothing {
            Some(smoothing) => match smoothing.mode {
                SmoothingMode::MovingAverage => moving_average(signal, smoothing.width),
                SmoothingMode::InPlace => in_place_moving_average(signal, smoothing.width),
            },
            None => log::debug!("skipping smoothing"),
        }
        match &self.clipping {
            Some(clipping) => center_clip(
                signal,
                T::from_f64(clipping.global_ratio).unwrap(),
                T::from_f64(clipping.local_ratio).unwrap(),
                clipping.block_len,
            ),
            None => log::debug!("skipping center clipping"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct PipelineConfig {
    pub frame_len_seconds: f64,
    pub frame_shift_seconds: f64,
    pub window: Window,
    pub similarity: Similarity,
    pub min_f0: f64,
    pub max_f0: f64,
    pub thresholds: VoicingThresholds,
    pub preprocessing: Preprocessing,
    /// Odd width of the median filter applied to the contour. 1 disables it.
    pub median_width: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            frame_len_seconds: FRAME_LEN_SECONDS,
            frame_shift_seconds: FRAME_SHIFT_SECONDS,
            window: Window::default(),
            similarity: Similarity::default(),
            min_f0: 50.0,
            max_f0: 500.0,
            thresholds: VoicingThresholds::default(),
            preprocessing: Preprocessing::default(),
            median_width: 5,
        }
    }
}

/// Frame-by-frame pitch of a signal, in Hz, with 0 for unvoiced frames.
#[derive(Clone, Debug, PartialEq)]
pub struct F0Contour<T> {
    values: Vec<T>,
    frame_shift: usize,
    sample_rate: usize,
}

impl<T> F0Contour<T>
where
    T: Float,
{
    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn into_values(self) -> Vec<T> {
        self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of frames with a non-zero pitch.
    pub fn voiced_count(&self) -> usize {
        self.values.iter().filter(|&&f| f > T::zero()).count()
    }

    /// Time between two consecutive values, in seconds.
    pub fn frame_period(&self) -> f64 {
        self.frame_shift as f64 / self.sample_rate as f64
    }

    /// The contour bracketed by a zero at the start and at the end of the signal.
    pub fn with_boundaries(&self) -> Vec<T> {
        let mut bracketed = Vec::with_capacity(self.values.len() + 2);
        bracketed.push(T::zero());
        bracketed.extend_from_slice(&self.values);
        bracketed.push(T::zero());
        bracketed
    }

    /// Write [with_boundaries](Self::with_boundaries) to `writer`, one value per line.
    pub fn write_to<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for f0 in self.with_boundaries() {
            writeln!(writer, "{}", f0)?;
        }
        writer.flush()
    }
}

/// Splits a signal into overlapping frames, analyzes each of them and cleans up the
/// resulting contour.
#[derive(Clone, Debug)]
pub struct PitchPipeline<T>
where
    T: Float,
{
    analyzer: FrameAnalyzer<T>,
    frame_shift: usize,
    preprocessing: Preprocessing,
    median_width: usize,
}

impl<T> PitchPipeline<T>
where
    T: Float,
{
    /// Build a pipeline for signals sampled at `sample_rate`. Every configuration error
    /// is reported here, before any signal is read.
    pub fn new(sample_rate: usize, config: &PipelineConfig) -> Result<Self> {
        let rate = sample_rate as f64;
        let frame_len = (rate * config.frame_len_seconds).round() as usize;
        let frame_shift = (rate * config.frame_shift_seconds).round() as usize;
        if frame_len == 0 || frame_shift == 0 {
            return Err(Error::InvalidParameter(format!(
                "frames of {} s every {} s are empty at {} Hz",
                config.frame_len_seconds, config.frame_shift_seconds, sample_rate
            )));
        }
        if config.median_width % 2 == 0 {
            return Err(Error::InvalidParameter(format!(
                "median width must be odd, got {}",
                config.median_width
            )));
        }
        config.preprocessing.validate()?;

        let analyzer = FrameAnalyzer::new(
            frame_len,
            sample_rate,
            config.window,
            config.min_f0,
            config.max_f0,
        )?
        .with_similarity(config.similarity)
        .with_thresholds(config.thresholds);

        log::debug!(
            "pipeline: frames of {} samples every {} samples, {} similarity, median width {}",
            frame_len,
            frame_shift,
            config.similarity,
            config.median_width
        );

        Ok(PitchPipeline {
            analyzer,
            frame_shift,
            preprocessing: config.preprocessing,
            median_width: config.median_width,
        })
    }

    pub fn analyzer(&self) -> &FrameAnalyzer<T> {
        &self.analyzer
    }

    pub fn frame_len(&self) -> usize {
        self.analyzer.frame_len()
    }

    pub fn frame_shift(&self) -> usize {
        self.frame_shift
    }

    /// Copy of `signal` after smoothing and center clipping.
    pub fn preprocess(&self, signal: &[T]) -> Vec<T> {
        let mut prepared = signal.to_vec();
        self.preprocessing.apply(&mut prepared);
        prepared
    }

    /// Apply `analyze` to a copy of every complete frame of `signal` and collect the
    /// results in frame order. Frames run in parallel with the `parallel` feature.
    fn map_frames<R, F>(&self, signal: &[T], analyze: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize, &mut [T]) -> Option<R> + Send + Sync,
    {
        let frame_len = self.frame_len();
        let starts: Vec<usize> = frame_starts(signal.len(), frame_len, self.frame_shift).collect();

        #[cfg(feature = "parallel")]
        let iter = starts.into_par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = starts.into_iter();

        iter.filter_map(|start| {
            let mut frame = signal[start..start + frame_len].to_vec();
            analyze(start, &mut frame)
        })
        .collect()
    }

    /// Pitch of every complete frame of `signal`, in order, without pre- or
    /// post-processing.
    ///
    /// Frames are always cut to the analyzer's length, so the analyzer never skips one
    /// here. A skipped frame would be logged and dropped.
    pub fn raw_contour(&self, signal: &[T]) -> Vec<T> {
        self.map_frames(signal, |start, frame| {
            let f0 = self.analyzer.analyze(frame);
            if f0 < T::zero() {
                log::warn!("skipped frame at sample {}", start);
                None
            } else {
                Some(f0)
            }
        })
    }

    /// Features of every complete frame of `signal`, in order. `signal` is used as given;
    /// run [preprocess](Self::preprocess) first to see what the pipeline sees.
    pub fn frame_features(&self, signal: &[T]) -> Vec<FrameFeatures<T>> {
        self.map_frames(signal, |_, frame| self.analyzer.features(frame))
    }

    /// Full analysis: pre-process a copy of `signal`, estimate the pitch of every frame
    /// and median filter the result.
    pub fn run(&self, signal: &[T]) -> F0Contour<T> {
        let prepared = self.preprocess(signal);
        let mut values = self.raw_contour(&prepared);
        median_filter(&mut values, self.median_width);

        let contour = F0Contour {
            values,
            frame_shift: self.frame_shift,
            sample_rate: self.analyzer.sample_rate(),
        };
        log::debug!(
            "analyzed {} frames, {} voiced",
            contour.len(),
            contour.voiced_count()
        );
        contour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_geometry_from_sample_rate() {
        let pipeline = PitchPipeline::<f64>::new(8000, &PipelineConfig::default()).unwrap();
        assert_eq!(pipeline.frame_len(), 240);
        assert_eq!(pipeline.frame_shift(), 120);

        let pipeline = PitchPipeline::<f32>::new(16000, &PipelineConfig::default()).unwrap();
        assert_eq!(pipeline.frame_len(), 480);
        assert_eq!(pipeline.frame_shift(), 240);
    }

    #[test]
    fn invalid_configurations() {
        let even_median = PipelineConfig {
            median_width: 4,
            ..PipelineConfig::default()
        };
        assert!(PitchPipeline::<f64>::new(8000, &even_median).is_err());

        let even_smoothing = PipelineConfig {
            preprocessing: Preprocessing {
                smoothing: Some(Smoothing {
                    width: 6,
                    mode: SmoothingMode::MovingAverage,
                }),
                clipping: None,
            },
            ..PipelineConfig::default()
        };
        assert!(PitchPipeline::<f64>::new(8000, &even_smoothing).is_err());

        let narrow_range = PipelineConfig {
            min_f0: 400.0,
            max_f0: 450.0,
            ..PipelineConfig::default()
        };
        assert!(PitchPipeline::<f64>::new(8000, &narrow_range).is_ok());

        // Periods of 1/30 s do not fit twice in a 30 ms frame.
        let low_range = PipelineConfig {
            min_f0: 20.0,
            max_f0: 30.0,
            ..PipelineConfig::default()
        };
        assert!(matches!(
            PitchPipeline::<f64>::new(8000, &low_range),
            Err(Error::EmptyLagRange {
                min_lag: 267,
                max_lag: 120,
                frame_len: 240
            })
        ));
    }

    #[test]
    fn contour_with_boundaries() {
        let contour = F0Contour {
            values: vec![0.0, 120.0, 121.5, 0.0],
            frame_shift: 120,
            sample_rate: 8000,
        };
        assert_eq!(contour.with_boundaries(), vec![0.0, 0.0, 120.0, 121.5, 0.0, 0.0]);
        assert_eq!(contour.voiced_count(), 2);
        assert_eq!(contour.frame_period(), 0.015);

        let mut out = Vec::new();
        contour.write_to(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0\n0\n120\n121.5\n0\n0\n");
    }

    #[test]
    fn short_signal_gives_empty_contour() {
        let pipeline = PitchPipeline::<f64>::new(8000, &PipelineConfig::default()).unwrap();
        let contour = pipeline.run(&[0.1; 100]);
        assert!(contour.is_empty());
        assert_eq!(contour.with_boundaries(), vec![0.0, 0.0]);
    }

    #[test]
    fn every_complete_frame_is_analyzed() {
        let pipeline = PitchPipeline::<f64>::new(8000, &PipelineConfig::default()).unwrap();
        let signal: Vec<f64> = (0..1000)
            .map(|i| 0.5 * (2.0 * std::f64::consts::PI * 200.0 * i as f64 / 8000.0).sin())
            .collect();

        let raw = pipeline.raw_contour(&signal);
        let features = pipeline.frame_features(&signal);
        assert_eq!(raw.len(), 7);
        assert_eq!(features.len(), raw.len());
        for (f, &f0) in features.iter().zip(&raw) {
            assert_eq!(f.f0(), f0);
        }
    }

    #[test]
    fn preprocessing_runs_on_a_copy() {
        let pipeline = PitchPipeline::<f64>::new(8000, &PipelineConfig::default()).unwrap();
        let signal: Vec<f64> = (0..400).map(|i| if i % 2 == 0 { 0.01 } else { 1.0 }).collect();
        let prepared = pipeline.preprocess(&signal);
        assert_eq!(prepared.len(), signal.len());
        assert_ne!(prepared, signal);
        assert_eq!(signal[0], 0.01);
    }
}
