//! Outermost bin edges.
use crate::float::Element;
use crate::tensor::{self, Tensor};
use crate::{ErrorKind, Result};

/// Leftmost and rightmost bin edges of one histogram dimension.
///
/// Unlike the bins in between, this range is closed on both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OuterRange {
    pub low: f64,  // inclusive
    pub high: f64, // inclusive
}

/// Determines the outer bin edges of each dimension of a `(M, N)` shaped `input`.
///
/// - If `range` is given, it is read as `[low_0, high_0, low_1, high_1, ...]`.
/// - Otherwise, if `input` has any rows, the per-column minimum and maximum are used.
/// - Otherwise every dimension defaults to `[0, 1]`.
///
/// A degenerate range (`low == high`) is widened by `0.5` on each side
/// so that every bin has a non-zero width.
///
/// # Errors
///
/// - `ErrorKind::InvalidInput` if `input` is not two-dimensional or `range` does not have `2 * N` elements
/// - `ErrorKind::InvalidRange` if a bound is not finite or `low > high`
pub fn select_outer_bin_edges<T: Element>(
    input: &Tensor<T>,
    range: Option<&[f64]>,
) -> Result<Vec<OuterRange>> {
    track_assert_eq!(input.dim(), 2, ErrorKind::InvalidInput, "expected input to have shape (M, N)");
    let n = input.shape()[1];

    let mut ranges = vec![OuterRange { low: 0.0, high: 1.0 }; n];
    if let Some(range) = range {
        track_assert_eq!(
            range.len(),
            2 * n,
            ErrorKind::InvalidInput,
            "for a {}-dimensional histogram range should have {} elements, but got {}",
            n,
            2 * n,
            range.len()
        );
        for (r, bounds) in ranges.iter_mut().zip(range.chunks(2)) {
            r.low = bounds[0];
            r.high = bounds[1];
        }
    } else if input.numel() > 0 {
        let (mins, maxs) = track!(tensor::aminmax_axis0(input))?;
        for (r, (min, max)) in ranges.iter_mut().zip(mins.into_iter().zip(maxs)) {
            r.low = min.as_f64();
            r.high = max.as_f64();
        }
    }

    for (dim, r) in ranges.iter_mut().enumerate() {
        track_assert!(
            r.low.is_finite() && r.high.is_finite(),
            ErrorKind::InvalidRange,
            "dimension {}'s range [{}, {}] is not finite",
            dim,
            r.low,
            r.high
        );
        track_assert!(
            r.low <= r.high,
            ErrorKind::InvalidRange,
            "min should not exceed max, but got min {} max {} for dimension {}",
            r.low,
            r.high,
            dim
        );

        if r.low == r.high {
            r.low -= 0.5;
            r.high += 0.5;
        }
        trace!("Outer bin edges of dimension {}: {:?}", dim, r);
    }
    Ok(ranges)
}

/// Determines the outer bin edges of the legacy fixed-range histogram.
///
/// If `min == max`, the minimum and maximum of the whole `input` are used instead.
/// If they are still equal, the range is widened by `1.0` on each side.
///
/// # Errors
///
/// If the resulting range is not finite or `min >= max`,
/// this function returns an `ErrorKind::InvalidRange` error.
pub fn histc_select_outer_bin_edges<T: Element>(
    input: &Tensor<T>,
    min: f64,
    max: f64,
) -> Result<OuterRange> {
    let mut r = OuterRange {
        low: min,
        high: max,
    };
    if r.low == r.high {
        if let Some((lo, hi)) = tensor::aminmax(input) {
            r.low = lo.as_f64();
            r.high = hi.as_f64();
        }
    }
    if r.low == r.high {
        r.low -= 1.0;
        r.high += 1.0;
    }

    track_assert!(
        r.low.is_finite() && r.high.is_finite(),
        ErrorKind::InvalidRange,
        "range of [{}, {}] is not finite",
        r.low,
        r.high
    );
    track_assert!(r.low < r.high, ErrorKind::InvalidRange, "max must be larger than min");
    trace!("Outer bin edges of histc: {:?}", r);
    Ok(r)
}
