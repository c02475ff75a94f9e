use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::float::Float;

/// Analysis window applied to every frame before its similarity function is computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Window {
    /// All coefficients equal to one.
    Rectangular,
    /// `w[i] = 0.54 - 0.46 cos(2 pi i / N)`.
    #[default]
    Hamming,
}

impl Window {
    /// Coefficients of this window for a frame of `size` samples.
    pub fn coefficients<T: Float>(self, size: usize) -> Vec<T> {
        match self {
            Window::Rectangular => vec![T::one(); size],
            Window::Hamming => {
                let a0 = T::from_f64(0.54).unwrap();
                let a1 = T::from_f64(0.46).unwrap();
                let step = T::from_f64(2.0 * std::f64::consts::PI).unwrap()
                    / T::from_usize(size).unwrap();
                (0..size)
                    .map(|i| a0 - a1 * (step * T::from_usize(i).unwrap()).cos())
                    .collect()
            }
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Window::Rectangular => write!(f, "rectangular"),
            Window::Hamming => write!(f, "hamming"),
        }
    }
}

impl FromStr for Window {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rect" | "rectangular" => Ok(Window::Rectangular),
            "hamming" => Ok(Window::Hamming),
            other => Err(Error::InvalidParameter(format!("unknown window `{}`", other))),
        }
    }
}

/// Multiply `frame` element-wise by `window`.
pub fn apply_window<T: Float>(frame: &mut [T], window: &[T]) {
    assert_eq!(frame.len(), window.len());
    frame
        .iter_mut()
        .zip(window)
        .for_each(|(x, &w)| *x = *x * w);
}
