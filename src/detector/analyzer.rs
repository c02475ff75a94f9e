//! Frame level pitch estimation.
//!
//! A [FrameAnalyzer] owns everything that only depends on its configuration: the window
//! coefficients and the lag search range. Analyzing a frame windows it in place,
//! computes the selected similarity function, searches for the best lag within the
//! range, and applies the voicing rule to features taken from the autocorrelation.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::detector::internals::{amdf, autocorrelation, real_cepstrum, zero_crossings};
use crate::detector::voicing::{FrameFeatures, VoicingThresholds};
use crate::detector::window::{apply_window, Window};
use crate::error::{Error, Result};
use crate::float::Float;
use crate::utils::buffer::new_real_buffer;
use crate::utils::peak::{best_lag, Extremum};

/// Value returned by [FrameAnalyzer::analyze] for a frame that was skipped because its
/// length does not match the analyzer.
pub const FRAME_SKIPPED: f64 = -1.0;

/// Lag bounds of the pitch search, in samples. Lags in `min_lag..max_lag` are candidates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PitchRange {
    pub min_lag: usize,
    pub max_lag: usize,
}

impl PitchRange {
    /// Derive the lag bounds from an F0 range:
    ///
    /// > min_lag = max(2, round(sample_rate / max_f0))
    /// > max_lag = min(frame_len / 2, 1 + round(sample_rate / min_f0))
    ///
    /// Fails with [Error::EmptyLagRange] if no lag is left to search.
    pub fn new(sample_rate: usize, frame_len: usize, min_f0: f64, max_f0: f64) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidParameter("sample rate must be positive".into()));
        }
        if !(min_f0 > 0.0 && min_f0.is_finite() && max_f0.is_finite()) || max_f0 <= min_f0 {
            return Err(Error::InvalidParameter(format!(
                "pitch range must satisfy 0 < min_f0 < max_f0, got [{}, {}]",
                min_f0, max_f0
            )));
        }

        let rate = sample_rate as f64;
        // Clamped in floating point: a tiny min_f0 gives a period beyond usize.
        let min_lag = (rate / max_f0).round().max(2.0) as usize;
        let max_lag = ((rate / min_f0).round() + 1.0).min((frame_len / 2) as f64) as usize;

        if min_lag >= max_lag {
            return Err(Error::EmptyLagRange {
                min_lag,
                max_lag,
                frame_len,
            });
        }

        Ok(PitchRange { min_lag, max_lag })
    }

    pub fn lags(&self) -> Range<usize> {
        self.min_lag..self.max_lag
    }
}

/// Function whose extremum over the lag range marks the pitch period.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Similarity {
    /// Maximum of the length-normalized autocorrelation.
    #[default]
    Autocorrelation,
    /// Minimum of the average magnitude difference function.
    Amdf,
    /// Maximum of the real cepstrum.
    Cepstrum,
}

impl fmt::Display for Similarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Similarity::Autocorrelation => write!(f, "autocorrelation"),
            Similarity::Amdf => write!(f, "amdf"),
            Similarity::Cepstrum => write!(f, "cepstrum"),
        }
    }
}

impl FromStr for Similarity {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "autocorrelation" | "acf" => Ok(Similarity::Autocorrelation),
            "amdf" => Ok(Similarity::Amdf),
            "cepstrum" => Ok(Similarity::Cepstrum),
            other => Err(Error::InvalidParameter(format!(
                "unknown similarity function `{}`",
                other
            ))),
        }
    }
}

/// Estimates the pitch of frames of a fixed length.
#[derive(Clone, Debug)]
pub struct FrameAnalyzer<T>
where
    T: Float,
{
    frame_len: usize,
    sample_rate: usize,
    window_type: Window,
    window: Vec<T>,
    min_f0: f64,
    max_f0: f64,
    range: PitchRange,
    similarity: Similarity,
    thresholds: VoicingThresholds,
}

impl<T> FrameAnalyzer<T>
where
    T: Float,
{
    pub fn new(
        frame_len: usize,
        sample_rate: usize,
        window_type: Window,
        min_f0: f64,
        max_f0: f64,
    ) -> Result<Self> {
        let range = PitchRange::new(sample_rate, frame_len, min_f0, max_f0)?;
        log::debug!(
            "frame analyzer: {} samples at {} Hz, {} window, lags {}..{}",
            frame_len,
            sample_rate,
            window_type,
            range.min_lag,
            range.max_lag
        );

        Ok(FrameAnalyzer {
            frame_len,
            sample_rate,
            window_type,
            window: window_type.coefficients(frame_len),
            min_f0,
            max_f0,
            range,
            similarity: Similarity::default(),
            thresholds: VoicingThresholds::default(),
        })
    }

    pub fn with_similarity(mut self, similarity: Similarity) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn with_thresholds(mut self, thresholds: VoicingThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Change the F0 range. Only the lag bounds are recomputed. On error the analyzer
    /// keeps its previous range.
    pub fn set_f0_range(&mut self, min_f0: f64, max_f0: f64) -> Result<()> {
        self.range = PitchRange::new(self.sample_rate, self.frame_len, min_f0, max_f0)?;
        self.min_f0 = min_f0;
        self.max_f0 = max_f0;
        Ok(())
    }

    /// Change the frame length, recomputing the window and the lag bounds (the longest
    /// lag depends on the frame length). On error the analyzer is left unchanged.
    pub fn set_frame_len(&mut self, frame_len: usize) -> Result<()> {
        self.range = PitchRange::new(self.sample_rate, frame_len, self.min_f0, self.max_f0)?;
        self.frame_len = frame_len;
        self.window = self.window_type.coefficients(frame_len);
        Ok(())
    }

    pub fn set_window(&mut self, window_type: Window) {
        self.window_type = window_type;
        self.window = window_type.coefficients(self.frame_len);
    }

    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    pub fn sample_rate(&self) -> usize {
        self.sample_rate
    }

    pub fn pitch_range(&self) -> PitchRange {
        self.range
    }

    pub fn window(&self) -> &[T] {
        &self.window
    }

    pub fn similarity(&self) -> Similarity {
        self.similarity
    }

    pub fn thresholds(&self) -> &VoicingThresholds {
        &self.thresholds
    }

    /// Window `frame` in place and measure it. Returns `None` if `frame` does not hold
    /// exactly [frame_len](Self::frame_len) samples.
    pub fn features(&self, frame: &mut [T]) -> Option<FrameFeatures<T>> {
        if frame.len() != self.frame_len {
            return None;
        }
        apply_window(frame, &self.window);

        let mut r = new_real_buffer(self.range.max_lag);
        autocorrelation(frame, &mut r);

        let lag = match self.similarity {
            Similarity::Autocorrelation => best_lag(&r, self.range.lags(), Extremum::Maximum),
            Similarity::Amdf => {
                let mut s = new_real_buffer(self.range.max_lag);
                amdf(frame, &mut s);
                best_lag(&s, self.range.lags(), Extremum::Minimum)
            }
            Similarity::Cepstrum => {
                let mut c = new_real_buffer(self.range.max_lag);
                real_cepstrum(frame, &mut c);
                best_lag(&c, self.range.lags(), Extremum::Maximum)
            }
        }?;

        let sample_rate = T::from_usize(self.sample_rate).unwrap();
        let crossings = T::from_usize(zero_crossings(frame)).unwrap();
        let two = T::from_f64(2.0).unwrap();

        let mut features = FrameFeatures {
            lag,
            frequency: sample_rate / T::from_usize(lag).unwrap(),
            power_db: T::from_f64(10.0).unwrap() * r[0].log10(),
            r1norm: r[1] / r[0],
            rmaxnorm: r[lag] / r[0],
            zcr: sample_rate * crossings / (two * T::from_usize(self.frame_len - 1).unwrap()),
            voiced: false,
        };
        features.voiced = self.thresholds.is_voiced(&features);

        log::trace!(
            "zcr {:.2}\tr1norm {:.2}\trmaxnorm {:.2}\tpower {:.1} dB\tlag {}",
            features.zcr,
            features.r1norm,
            features.rmaxnorm,
            features.power_db,
            features.lag
        );

        Some(features)
    }

    /// Estimate the pitch of `frame` in Hz, or zero if the frame is unvoiced. The frame
    /// is windowed in place. A frame of the wrong length yields [FRAME_SKIPPED], which
    /// callers must not confuse with an unvoiced frame.
    pub fn analyze(&self, frame: &mut [T]) -> T {
        match self.features(frame) {
            Some(features) => features.f0(),
            None => T::from_f64(FRAME_SKIPPED).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lag_bounds() {
        // (sample_rate, min_f0, max_f0, frame_len) -> (min_lag, max_lag)
        let cases = [
            ((8000, 50.0, 500.0, 240), (16, 120)),
            ((16000, 60.0, 400.0, 480), (40, 240)),
            ((44100, 80.0, 1000.0, 1323), (44, 552)),
            ((8000, 100.0, 5000.0, 240), (2, 81)),
        ];
        for ((sample_rate, min_f0, max_f0, frame_len), (min_lag, max_lag)) in cases {
            let range = PitchRange::new(sample_rate, frame_len, min_f0, max_f0).unwrap();
            assert_eq!(range, PitchRange { min_lag, max_lag });
        }
    }

    #[test]
    fn empty_lag_range_is_rejected() {
        // 8000 / 100 = 80 > 40 / 2
        let err =
            FrameAnalyzer::<f64>::new(40, 8000, Window::Hamming, 50.0, 100.0).unwrap_err();
        assert!(matches!(
            err,
            Error::EmptyLagRange {
                min_lag: 80,
                max_lag: 20,
                frame_len: 40
            }
        ));
    }

    #[test]
    fn tiny_min_f0_is_clamped_to_the_frame() {
        let range = PitchRange::new(8000, 240, 1e-20, 500.0).unwrap();
        assert_eq!(range, PitchRange { min_lag: 16, max_lag: 120 });

        // A period longer than the frame in both bounds.
        assert!(matches!(
            PitchRange::new(8000, 240, 1e-20, 1e-10),
            Err(Error::EmptyLagRange { max_lag: 120, .. })
        ));
    }

    #[test]
    fn inverted_f0_range_is_rejected() {
        assert!(matches!(
            PitchRange::new(8000, 240, 500.0, 50.0),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            PitchRange::new(0, 240, 50.0, 500.0),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn reconfiguring_f0_range_keeps_window() {
        let mut analyzer =
            FrameAnalyzer::<f64>::new(240, 8000, Window::Hamming, 50.0, 500.0).unwrap();
        let window = analyzer.window().to_vec();

        analyzer.set_f0_range(100.0, 400.0).unwrap();
        assert_eq!(analyzer.pitch_range(), PitchRange { min_lag: 20, max_lag: 81 });
        assert_eq!(analyzer.window(), &window[..]);

        assert!(analyzer.set_f0_range(400.0, 100.0).is_err());
        assert_eq!(analyzer.pitch_range(), PitchRange { min_lag: 20, max_lag: 81 });
    }

    #[test]
    fn reconfiguring_frame_len_recomputes_window() {
        let mut analyzer =
            FrameAnalyzer::<f32>::new(240, 8000, Window::Hamming, 50.0, 500.0).unwrap();
        analyzer.set_frame_len(480).unwrap();

        assert_eq!(analyzer.frame_len(), 480);
        assert_eq!(analyzer.window().len(), 480);
        assert_eq!(analyzer.pitch_range(), PitchRange { min_lag: 16, max_lag: 161 });

        assert!(analyzer.set_frame_len(20).is_err());
        assert_eq!(analyzer.frame_len(), 480);
    }

    #[test]
    fn silent_frame_is_unvoiced() {
        let analyzer =
            FrameAnalyzer::<f64>::new(240, 8000, Window::Hamming, 50.0, 500.0).unwrap();
        let mut frame = vec![0.0; 240];
        assert_eq!(analyzer.analyze(&mut frame), 0.0);
    }

    #[test]
    fn wrong_frame_length_is_skipped() {
        let analyzer =
            FrameAnalyzer::<f64>::new(240, 8000, Window::Hamming, 50.0, 500.0).unwrap();
        let mut frame = vec![0.5; 239];
        assert!(analyzer.analyze(&mut frame) < 0.0);
        assert!(analyzer.features(&mut frame).is_none());
        // Skipped frames are not windowed.
        assert!(frame.iter().all(|&s| s == 0.5));
    }

    #[test]
    fn parse_similarity_names() {
        assert_eq!("AMDF".parse::<Similarity>().unwrap(), Similarity::Amdf);
        assert_eq!(
            "autocorrelation".parse::<Similarity>().unwrap(),
            Similarity::Autocorrelation
        );
        assert!("yin".parse::<Similarity>().is_err());
    }
}
