use std::cmp::Ordering;

use crate::float::Float;

/// Symmetric moving average of odd `width`. Each interior sample `i`
/// (`width/2 <= i < len - width/2`) is replaced by the mean of `x[i-width/2..=i+width/2]`,
/// computed on the unfiltered input. Boundary samples are left untouched.
pub fn moving_average<T: Float>(signal: &mut [T], width: usize) {
    let half = width / 2;
    if width < 2 || signal.len() <= 2 * half {
        return;
    }
    let width_t = T::from_usize(width).unwrap();
    let source = signal.to_vec();

    source
        .windows(width)
        .zip(signal[half..].iter_mut())
        .for_each(|(win, s)| *s = win.iter().copied().sum::<T>() / width_t);
}

/// In-place variant of [moving_average]. The running sum is written back into `x[i]`
/// after every tap, so later taps (and later samples) read partially filtered values.
/// The result is a recursive smoother rather than a moving average; it is kept to
/// reproduce contours computed with the in-place loop.
pub fn in_place_moving_average<T: Float>(signal: &mut [T], width: usize) {
    let half = width / 2;
    if width < 2 || signal.len() <= 2 * half {
        return;
    }
    let width_t = T::from_usize(width).unwrap();

    for i in half..signal.len() - half {
        let mut acc = T::zero();
        for j in i - half..=i + half {
            acc = acc + signal[j] / width_t;
            signal[i] = acc;
        }
    }
}

/// Largest absolute value in `signal`.
pub fn peak_magnitude<T: Float>(signal: &[T]) -> T {
    signal.iter().fold(T::zero(), |peak, s| peak.max(s.abs()))
}

fn zero_below<T: Float>(signal: &mut [T], threshold: T) {
    signal.iter_mut().for_each(|s| {
        if s.abs() < threshold {
            *s = T::zero();
        }
    });
}

/// Two-tier center clipping. Samples whose magnitude is below `global_ratio` times the
/// peak magnitude of the whole signal are zeroed. Then, for every complete block of
/// `block_len` samples, samples below `local_ratio` times the block peak are zeroed.
/// A trailing block shorter than `block_len` only receives the global pass.
pub fn center_clip<T: Float>(signal: &mut [T], global_ratio: T, local_ratio: T, block_len: usize) {
    let threshold = global_ratio * peak_magnitude(signal);
    zero_below(signal, threshold);

    if block_len == 0 {
        return;
    }
    signal.chunks_exact_mut(block_len).for_each(|block| {
        let threshold = local_ratio * peak_magnitude(block);
        zero_below(block, threshold);
    });
}

/// Sliding median of odd `width` over `values`. Interior entries are replaced by the
/// median of their `width` neighbors in the unfiltered sequence; the first and last
/// `width/2` entries are left as they are.
pub fn median_filter<T: Float>(values: &mut [T], width: usize) {
    let half = width / 2;
    if width < 2 || values.len() <= 2 * half {
        return;
    }
    let source = values.to_vec();
    let mut sorted = Vec::with_capacity(width);

    for (win, v) in source.windows(width).zip(values[half..].iter_mut()) {
        sorted.clear();
        sorted.extend_from_slice(win);
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        *v = sorted[half];
    }
}
