use rustfft::num_complex::Complex;
use rustfft::num_traits::Zero;

use crate::float::Float;

pub fn new_real_buffer<T: Float>(size: usize) -> Vec<T> {
    vec![T::zero(); size]
}

pub fn new_complex_buffer<T: Float>(size: usize) -> Vec<Complex<T>> {
    vec![Complex::zero(); size]
}

/// Copy `input` into the real part of `output`, zeroing the imaginary part and any
/// trailing entries of `output`.
pub fn copy_real_to_complex<T: Float>(input: &[T], output: &mut [Complex<T>]) {
    assert!(input.len() <= output.len());
    input
        .iter()
        .zip(output.iter_mut())
        .for_each(|(&i, o)| *o = Complex::new(i, T::zero()));
    output[input.len()..]
        .iter_mut()
        .for_each(|o| *o = Complex::zero())
}

/// Copy the real part of `input` into `output`, scaled by `scale`. Entries of `output`
/// past the end of `input` are zeroed.
pub fn copy_complex_to_real<T: Float>(input: &[Complex<T>], output: &mut [T], scale: T) {
    assert!(input.len() <= output.len());
    input
        .iter()
        .zip(output.iter_mut())
        .for_each(|(c, o)| *o = c.re * scale);
    output[input.len()..]
        .iter_mut()
        .for_each(|o| *o = T::zero());
}

/// Replaces each complex value x in `arr` by ln(max(|x|, floor)). This function
/// modifies `arr` in place and leaves the complex component zero.
pub fn log_modulus<T: Float>(arr: &mut [Complex<T>], floor: T) {
    for s in arr {
        s.re = s.norm().max(floor).ln();
        s.im = T::zero();
    }
}

/// Compute the sum of the square of each element of `arr`.
pub fn square_sum<T: Float>(arr: &[T]) -> T {
    arr.iter().map(|&s| s * s).sum::<T>()
}
