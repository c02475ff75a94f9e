//! A decoded mono signal and the fixed-shift framing used by the pipeline.

#[cfg(feature = "wav")]
use std::path::Path;

#[cfg(feature = "wav")]
use crate::error::{Error, Result};
use crate::float::Float;

#[derive(Clone, Debug, PartialEq)]
pub struct Signal<T> {
    pub sample_rate: usize,
    pub data: Vec<T>,
}

impl<T> Signal<T>
where
    T: Float,
{
    pub fn new(sample_rate: usize, data: Vec<T>) -> Self {
        Signal { sample_rate, data }
    }

    /// Duration of the signal in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.data.len() as f64 / self.sample_rate as f64
    }

    /// Decode a mono WAV file. Integer samples are scaled to [-1, 1).
    #[cfg(feature = "wav")]
    pub fn from_wav<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = hound::WavReader::open(path)?;
        let spec = reader.spec();
        if spec.channels != 1 {
            return Err(Error::NotMono(spec.channels));
        }

        let data = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .map(|s| s.map(|s| T::from_f32(s).unwrap()))
                .collect::<std::result::Result<Vec<T>, _>>()?,
            hound::SampleFormat::Int => {
                let full_scale = 2f64.powi(spec.bits_per_sample as i32 - 1);
                let scale = T::one() / T::from_f64(full_scale).unwrap();
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|s| T::from_i32(s).unwrap() * scale))
                    .collect::<std::result::Result<Vec<T>, _>>()?
            }
        };

        log::debug!(
            "read {} samples at {} Hz ({} bit {:?})",
            data.len(),
            spec.sample_rate,
            spec.bits_per_sample,
            spec.sample_format
        );

        Ok(Signal::new(spec.sample_rate as usize, data))
    }
}

/// Start offsets of the frames of `len` samples taken every `shift` samples from a
/// signal of `signal_len` samples. Only complete frames are produced.
pub fn frame_starts(signal_len: usize, len: usize, shift: usize) -> impl Iterator<Item = usize> {
    assert!(shift > 0, "frame shift must be positive");
    (0..)
        .step_by(shift)
        .take_while(move |start| start + len <= signal_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_complete_frames() {
        let starts: Vec<usize> = frame_starts(1000, 240, 120).collect();
        assert_eq!(starts, vec![0, 120, 240, 360, 480, 600, 720]);

        assert_eq!(frame_starts(8000, 240, 120).count(), 65);
        assert_eq!(frame_starts(8000, 240, 120).last(), Some(7680));

        // The last frame may end exactly at the end of the signal.
        assert_eq!(frame_starts(960, 240, 120).last(), Some(720));
        assert_eq!(frame_starts(959, 240, 120).last(), Some(600));
    }

    #[test]
    fn signal_shorter_than_a_frame() {
        assert_eq!(frame_starts(100, 240, 120).count(), 0);
    }

    #[test]
    fn duration() {
        let signal = Signal::new(8000, vec![0.0f32; 4000]);
        assert_eq!(signal.duration(), 0.5);
    }
}
