use crate::float::Float;

/// Thresholds of the voiced/unvoiced rule. A frame is voiced when either
///
///   * `r1norm >= r1norm` and `power_db >= power_db`, or
///   * `rmaxnorm >= rmaxnorm` and `zcr <= zcr`,
///
/// and unvoiced otherwise. The defaults assume samples in [-1, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct VoicingThresholds {
    /// Minimum normalized autocorrelation at lag 1.
    pub r1norm: f64,
    /// Minimum frame power, in dB.
    pub power_db: f64,
    /// Minimum normalized autocorrelation at the pitch lag.
    pub rmaxnorm: f64,
    /// Maximum zero crossing rate, in Hz.
    pub zcr: f64,
}

impl Default for VoicingThresholds {
    fn default() -> Self {
        VoicingThresholds {
            r1norm: 0.95,
            power_db: -48.0,
            rmaxnorm: 0.63,
            zcr: 1100.0,
        }
    }
}

impl VoicingThresholds {
    pub fn is_voiced<T: Float>(&self, features: &FrameFeatures<T>) -> bool {
        let threshold = |v: f64| T::from_f64(v).unwrap();

        let clean = features.r1norm >= threshold(self.r1norm)
            && features.power_db >= threshold(self.power_db);
        let periodic = features.rmaxnorm >= threshold(self.rmaxnorm)
            && features.zcr <= threshold(self.zcr);

        clean || periodic
    }
}

/// Everything measured on one frame to decide its pitch.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameFeatures<T>
where
    T: Float,
{
    /// Lag chosen by the lag search, in samples.
    pub lag: usize,
    /// `sample_rate / lag`, regardless of the voicing decision.
    pub frequency: T,
    /// `10 log10(r[0])`.
    pub power_db: T,
    /// `r[1] / r[0]`.
    pub r1norm: T,
    /// `r[lag] / r[0]`.
    pub rmaxnorm: T,
    /// Zero crossing rate of the windowed frame, in Hz.
    pub zcr: T,
    pub voiced: bool,
}

impl<T> FrameFeatures<T>
where
    T: Float,
{
    /// The pitch of the frame: its frequency if voiced, zero otherwise.
    pub fn f0(&self) -> T {
        if self.voiced {
            self.frequency
        } else {
            T::zero()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features(power_db: f64, r1norm: f64, rmaxnorm: f64, zcr: f64) -> FrameFeatures<f64> {
        FrameFeatures {
            lag: 40,
            frequency: 200.0,
            power_db,
            r1norm,
            rmaxnorm,
            zcr,
            voiced: false,
        }
    }

    #[test]
    fn clean_loud_frame_is_voiced() {
        let t = VoicingThresholds::default();
        assert!(t.is_voiced(&features(-20.0, 0.97, 0.1, 3000.0)));
        assert!(!t.is_voiced(&features(-60.0, 0.97, 0.1, 3000.0)));
    }

    #[test]
    fn periodic_low_zcr_frame_is_voiced() {
        let t = VoicingThresholds::default();
        assert!(t.is_voiced(&features(-70.0, 0.5, 0.7, 400.0)));
        assert!(!t.is_voiced(&features(-70.0, 0.5, 0.7, 1500.0)));
        assert!(!t.is_voiced(&features(-70.0, 0.5, 0.6, 400.0)));
    }

    #[test]
    fn thresholds_are_inclusive() {
        let t = VoicingThresholds::default();
        assert!(t.is_voiced(&features(-48.0, 0.95, 0.0, 5000.0)));
        assert!(t.is_voiced(&features(-100.0, 0.0, 0.63, 1100.0)));
    }

    #[test]
    fn custom_thresholds() {
        let t = VoicingThresholds {
            rmaxnorm: 0.9,
            ..VoicingThresholds::default()
        };
        assert!(!t.is_voiced(&features(-70.0, 0.5, 0.7, 400.0)));
    }

    #[test]
    fn unvoiced_frames_have_zero_pitch() {
        let mut f = features(-20.0, 0.99, 0.9, 300.0);
        assert_eq!(f.f0(), 0.0);
        f.voiced = true;
        assert_eq!(f.f0(), 200.0);
    }
}
