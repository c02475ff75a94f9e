//! Lag-indexed similarity functions of a single windowed frame, plus the zero crossing
//! count used by the voicing decision. Every function fills `result[k]` for
//! `k in 0..result.len()`, so the caller decides how many lags are evaluated.

use rustfft::FftPlanner;

use crate::float::Float;
use crate::utils::buffer::{
    copy_complex_to_real, copy_real_to_complex, log_modulus, new_complex_buffer,
};

/// Power substituted for `r[0]` when a frame is exactly silent, so that the normalized
/// correlations and the power in dB stay finite.
pub const SILENT_POWER: f64 = 1e-10;

/// Magnitudes below this value are clamped before taking the logarithm of a spectrum.
const LOG_FLOOR: f64 = 1e-10;

/// Compute the length-normalized autocorrelation of `signal` to `result`.
/// For a frame _x_ of _N_ samples this is
///
/// > r(k) = 1/(N-k) * sum_{i=0}^{N-k-1} x_i*x_{i+k}
///
/// so `r[0]` is the mean power of the frame. A zero `r[0]` is replaced by [SILENT_POWER].
pub fn autocorrelation<T: Float>(signal: &[T], result: &mut [T]) {
    assert!(result.len() <= signal.len());
    let n = signal.len();

    result.iter_mut().enumerate().for_each(|(k, r)| {
        let sum: T = signal[..n - k]
            .iter()
            .zip(&signal[k..])
            .map(|(&a, &b)| a * b)
            .sum();
        *r = sum / T::from_usize(n - k).unwrap();
    });

    if let Some(r0) = result.first_mut() {
        if *r0 == T::zero() {
            *r0 = T::from_f64(SILENT_POWER).unwrap();
        }
    }
}

/// Compute the average magnitude difference function of `signal` to `result`:
///
/// > s(k) = sum_{i=0}^{N-k-1} |x_i - x_{i+k}|
///
/// Lower values mean the frame is more similar to itself at lag _k_.
pub fn amdf<T: Float>(signal: &[T], result: &mut [T]) {
    assert!(result.len() <= signal.len());
    let n = signal.len();

    result.iter_mut().enumerate().for_each(|(k, s)| {
        *s = signal[..n - k]
            .iter()
            .zip(&signal[k..])
            .map(|(&a, &b)| (a - b).abs())
            .sum();
    });
}

/// Compute the real cepstrum of `signal`,
///
/// > c = IFFT(ln |FFT(x)|)
///
/// on a zero-padded buffer whose size is the next power of two that holds both the
/// frame and the requested number of quefrencies, and put the first `result.len()`
/// quefrencies in `result`.
pub fn real_cepstrum<T: Float>(signal: &[T], result: &mut [T]) {
    let size = signal.len().max(result.len()).max(1).next_power_of_two();
    let mut spectrum = new_complex_buffer(size);

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(size);
    let inv_fft = planner.plan_fft_inverse(size);

    copy_real_to_complex(signal, &mut spectrum);
    fft.process(&mut spectrum);
    log_modulus(&mut spectrum, T::from_f64(LOG_FLOOR).unwrap());
    inv_fft.process(&mut spectrum);

    // rustfft does not normalize, so the round trip is scaled by `size`.
    let normalization_const = T::one() / T::from_usize(size).unwrap();
    copy_complex_to_real(&spectrum[..result.len()], result, normalization_const);
}

/// Count sign changes between consecutive samples. A sample equal to zero counts on
/// either side, so `0 -> positive` and `0 -> negative` are crossings but `0 -> 0` is not.
pub fn zero_crossings<T: Float>(signal: &[T]) -> usize {
    let zero = T::zero();
    signal
        .windows(2)
        .filter(|w| (w[0] <= zero && w[1] > zero) || (w[0] >= zero && w[1] < zero))
        .count()
}
