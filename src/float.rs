//! Element types of histogram buffers.
use num_traits::Float;
use ordered_float::OrderedFloat;
use std::cmp;
use std::fmt::Debug;

/// Floating point number type that samples, weights, bin edges and histograms are made of.
///
/// Every buffer taking part in one histogram computation shares the same element type,
/// so this is picked once at the call site and the whole pipeline is monomorphized for it.
pub trait Element: Float + Debug + Default + Send + Sync + 'static {
    /// Converts a `f64` value (e.g., a user supplied range bound) to this type.
    fn from_f64_lossy(x: f64) -> Self;

    /// Widens this value to `f64`.
    fn as_f64(self) -> f64;
}
impl Element for f32 {
    fn from_f64_lossy(x: f64) -> Self {
        x as f32
    }

    fn as_f64(self) -> f64 {
        f64::from(self)
    }
}
impl Element for f64 {
    fn from_f64_lossy(x: f64) -> Self {
        x
    }

    fn as_f64(self) -> f64 {
        self
    }
}

/// NaN-propagating minimum.
pub fn min<T: Element>(x: T, y: T) -> T {
    if x.is_nan() || y.is_nan() {
        T::nan()
    } else {
        cmp::min(OrderedFloat(x), OrderedFloat(y)).into_inner()
    }
}

/// NaN-propagating maximum.
pub fn max<T: Element>(x: T, y: T) -> T {
    if x.is_nan() || y.is_nan() {
        T::nan()
    } else {
        cmp::max(OrderedFloat(x), OrderedFloat(y)).into_inner()
    }
}

/// Returns `true` if `xs` is sorted in non-decreasing order and contains no NaN.
pub fn is_non_decreasing<T: Element>(xs: &[T]) -> bool {
    xs.iter().all(|x| !x.is_nan()) && xs.windows(2).all(|w| w[0] <= w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn min_max_propagate_nan() {
        assert_eq!(min(1.0, 2.0), 1.0);
        assert_eq!(max(1.0f32, 2.0), 2.0);
        assert!(min(std::f64::NAN, 2.0).is_nan());
        assert!(max(1.0, std::f64::NAN).is_nan());
    }

    #[test]
    fn non_decreasing_works() {
        assert!(is_non_decreasing::<f64>(&[]));
        assert!(is_non_decreasing(&[0.0, 0.0, 1.0]));
        assert!(!is_non_decreasing(&[0.0, 2.0, 1.0]));
        assert!(!is_non_decreasing(&[0.0, std::f64::NAN, 1.0]));
    }
}
