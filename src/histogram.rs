//! Histogram entry points.
//!
//! Every function here reads its samples as `(M, N)`: `M` points in an `N`-dimensional space,
//! where `N` is the innermost dimension of the input and all other dimensions are flattened into `M`.
//! The one-dimensional variants flatten the whole input into `(numel, 1)` first.
//!
//! Bins include their left edge and exclude their right edge,
//! except for the rightmost bin of each dimension which includes both.
//! Points with any coordinate outside of the outer edges are ignored.
use crate::check;
use crate::edges;
use crate::float::Element;
use crate::kernel::{self, BinAlgorithm};
use crate::range;
use crate::tensor::{self, Tensor};
use crate::{ErrorKind, Result};
use std::num::NonZeroUsize;
use std::slice;

const DEFAULT_MIN_CHUNK_LEN: usize = 4096;

/// Histogram values and the bin edges of each dimension.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Histogram<T> {
    /// `N`-dimensional tensor of shape `(K_0, ..., K_{N-1})`.
    pub hist: Tensor<T>,

    /// `N` one-dimensional tensors, the `d`-th one holding `K_d + 1` edges.
    pub bin_edges: Vec<Tensor<T>>,
}

/// Options of histogram computations.
#[derive(Debug, Clone)]
pub struct HistogramOptions<'a, T> {
    range: Option<Vec<f64>>,
    weight: Option<&'a Tensor<T>>,
    density: bool,
    algorithm: Option<BinAlgorithm>,
    min_chunk_len: usize,
}
impl<'a, T> HistogramOptions<'a, T> {
    /// Makes a new `HistogramOptions` instance with the default settings.
    pub fn new() -> Self {
        Self {
            range: None,
            weight: None,
            density: false,
            algorithm: None,
            min_chunk_len: DEFAULT_MIN_CHUNK_LEN,
        }
    }

    /// Sets the leftmost and rightmost bin edges of each dimension as `[low_0, high_0, low_1, high_1, ...]`.
    ///
    /// Only used when bins are given as counts.
    /// By default, they are the per-dimension minimum and maximum of the input.
    pub fn range(mut self, range: Vec<f64>) -> Self {
        self.range = Some(range);
        self
    }

    /// Sets the weight of each point.
    ///
    /// The shape of `weight` must be that of the input without its innermost dimension.
    /// By default, each point has weight `1`.
    pub fn weight(mut self, weight: &'a Tensor<T>) -> Self {
        self.weight = Some(weight);
        self
    }

    /// If `true`, the result is normalized to a probability density:
    /// each count is divided by the total count and by the volume of its bin.
    pub fn density(mut self, density: bool) -> Self {
        self.density = density;
        self
    }

    /// Overrides the binning algorithm.
    ///
    /// By default, explicit bin edges are searched with `BinAlgorithm::BinarySearch`
    /// and evenly spaced ones use `BinAlgorithm::LinearInterpolationWithLocalSearch`.
    pub fn algorithm(mut self, algorithm: BinAlgorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Sets the minimum number of points each parallel task counts.
    ///
    /// Inputs with less than twice as many points are processed on the calling thread.
    /// Otherwise the points are split into at most one contiguous range per rayon thread,
    /// and the partial histograms are summed in range order.
    /// Weighted sums are therefore reproducible for a given thread pool size,
    /// but may differ in the last bits from a sequential run.
    ///
    /// The default value is `4096`.
    pub fn min_chunk_len(mut self, n: NonZeroUsize) -> Self {
        self.min_chunk_len = n.get();
        self
    }
}
impl<'a, T> Default for HistogramOptions<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes an `N`-dimensional histogram with the given bin edges, writing into `hist` and `bin_edges`.
///
/// `bins[d]` is the non-decreasing sequence of edges of dimension `d`, including the rightmost one.
/// The outputs are resized as needed and `bin_edges` receives a copy of `bins`.
///
/// # Errors
///
/// If any argument is malformed (see `check::check_inputs`), or `options` has a range,
/// this function returns an `ErrorKind::InvalidInput` error without touching the outputs.
pub fn histogramdd_out<T: Element>(
    input: &Tensor<T>,
    bins: &[Tensor<T>],
    options: &HistogramOptions<T>,
    hist: &mut Tensor<T>,
    bin_edges: &mut [Tensor<T>],
) -> Result<()> {
    track_assert!(
        options.range.is_none(),
        ErrorKind::InvalidInput,
        "range cannot be combined with explicit bin edges"
    );
    track!(check::check_inputs(input, bins, options.weight))?;
    track!(check::prepare_out(input, &check::bin_counts(bins), hist, bin_edges))?;
    track!(edges::copy_bin_edges(bins, bin_edges))?;

    let algorithm = options.algorithm.unwrap_or(BinAlgorithm::BinarySearch);
    kernel::histogramdd_kernel(
        input,
        options.weight,
        options.density,
        hist,
        bin_edges,
        algorithm,
        options.min_chunk_len,
    );
    Ok(())
}

/// Computes an `N`-dimensional histogram with the given bin edges.
pub fn histogramdd<T: Element>(
    input: &Tensor<T>,
    bins: &[Tensor<T>],
    options: &HistogramOptions<T>,
) -> Result<Histogram<T>> {
    let mut hist = Tensor::empty();
    let mut bin_edges = track!(edges::allocate_bin_edges(input))?;
    track!(histogramdd_out(input, bins, options, &mut hist, &mut bin_edges))?;
    Ok(Histogram { hist, bin_edges })
}

/// Computes an `N`-dimensional histogram with `bin_counts[d]` equal-width bins in each dimension `d`,
/// writing into `hist` and `bin_edges`.
///
/// # Errors
///
/// - `ErrorKind::InvalidInput` if any argument is malformed or a bin count is zero
/// - `ErrorKind::InvalidRange` if the outer edges are not finite or inverted
///
/// The outputs are not touched if an error occurs.
pub fn histogramdd_with_counts_out<T: Element>(
    input: &Tensor<T>,
    bin_counts: &[usize],
    options: &HistogramOptions<T>,
    hist: &mut Tensor<T>,
    bin_edges: &mut [Tensor<T>],
) -> Result<()> {
    let bins = track!(edges::histogramdd_bin_edges(
        input,
        bin_counts,
        options.range.as_ref().map(|r| &r[..])
    ))?;
    track!(check::check_inputs(input, &bins, options.weight))?;
    track!(check::prepare_out(input, &check::bin_counts(&bins), hist, bin_edges))?;
    track!(edges::copy_bin_edges(&bins, bin_edges))?;

    let algorithm = options
        .algorithm
        .unwrap_or(BinAlgorithm::LinearInterpolationWithLocalSearch);
    kernel::histogramdd_kernel(
        input,
        options.weight,
        options.density,
        hist,
        bin_edges,
        algorithm,
        options.min_chunk_len,
    );
    Ok(())
}

/// Computes an `N`-dimensional histogram with `bin_counts[d]` equal-width bins in each dimension `d`.
pub fn histogramdd_with_counts<T: Element>(
    input: &Tensor<T>,
    bin_counts: &[usize],
    options: &HistogramOptions<T>,
) -> Result<Histogram<T>> {
    let mut hist = Tensor::empty();
    let mut bin_edges = track!(edges::allocate_bin_edges(input))?;
    track!(histogramdd_with_counts_out(
        input,
        bin_counts,
        options,
        &mut hist,
        &mut bin_edges
    ))?;
    Ok(Histogram { hist, bin_edges })
}

/// Reshapes the arguments of the one-dimensional histograms to `(numel, 1)` and `(numel)`.
fn flatten_1d<T: Element>(
    input: &Tensor<T>,
    weight: Option<&Tensor<T>>,
) -> Result<(Tensor<T>, Option<Tensor<T>>)> {
    let input = track!(input.reshape(&[input.numel(), 1]))?;
    let weight = match weight {
        Some(w) => Some(track!(w.reshape(&[w.numel()]))?),
        None => None,
    };
    Ok((input, weight))
}

/// Computes a one-dimensional histogram of all elements of `input` with the given bin edges,
/// writing into `hist` and `bin_edges`.
///
/// `weight`, if any, must have as many elements as `input`.
pub fn histogram_out<T: Element>(
    input: &Tensor<T>,
    bins: &Tensor<T>,
    options: &HistogramOptions<T>,
    hist: &mut Tensor<T>,
    bin_edges: &mut Tensor<T>,
) -> Result<()> {
    let (input, weight) = track!(flatten_1d(input, options.weight))?;
    let options = HistogramOptions {
        weight: weight.as_ref(),
        ..options.clone()
    };
    track!(histogramdd_out(
        &input,
        slice::from_ref(bins),
        &options,
        hist,
        slice::from_mut(bin_edges)
    ))
}

/// Computes a one-dimensional histogram of all elements of `input` with the given bin edges.
pub fn histogram<T: Element>(
    input: &Tensor<T>,
    bins: &Tensor<T>,
    options: &HistogramOptions<T>,
) -> Result<(Tensor<T>, Tensor<T>)> {
    let mut hist = Tensor::empty();
    let mut bin_edges = Tensor::empty();
    track!(histogram_out(input, bins, options, &mut hist, &mut bin_edges))?;
    Ok((hist, bin_edges))
}

/// Computes a one-dimensional histogram of all elements of `input` with `bin_count` equal-width bins,
/// writing into `hist` and `bin_edges`.
///
/// The range, if given in `options`, must have two elements.
pub fn histogram_with_count_out<T: Element>(
    input: &Tensor<T>,
    bin_count: usize,
    options: &HistogramOptions<T>,
    hist: &mut Tensor<T>,
    bin_edges: &mut Tensor<T>,
) -> Result<()> {
    let (input, weight) = track!(flatten_1d(input, options.weight))?;
    let options = HistogramOptions {
        weight: weight.as_ref(),
        ..options.clone()
    };
    track!(histogramdd_with_counts_out(
        &input,
        &[bin_count],
        &options,
        hist,
        slice::from_mut(bin_edges)
    ))
}

/// Computes a one-dimensional histogram of all elements of `input` with `bin_count` equal-width bins.
pub fn histogram_with_count<T: Element>(
    input: &Tensor<T>,
    bin_count: usize,
    options: &HistogramOptions<T>,
) -> Result<(Tensor<T>, Tensor<T>)> {
    let mut hist = Tensor::empty();
    let mut bin_edges = Tensor::empty();
    track!(histogram_with_count_out(
        input,
        bin_count,
        options,
        &mut hist,
        &mut bin_edges
    ))?;
    Ok((hist, bin_edges))
}

/// Counts all elements of `input` into `bin_count` equal-width bins between `min` and `max`, writing into `hist`.
///
/// If `min == max`, the minimum and maximum of `input` are used instead.
/// Unlike the other functions, the bin of each element is computed arithmetically
/// without consulting the materialized edges.
///
/// # Errors
///
/// - `ErrorKind::InvalidInput` if `bin_count` is zero
/// - `ErrorKind::InvalidRange` if the range is not finite or `min >= max`
pub fn histc_out<T: Element>(
    input: &Tensor<T>,
    bin_count: usize,
    min: f64,
    max: f64,
    hist: &mut Tensor<T>,
) -> Result<()> {
    let reshaped = track!(input.reshape(&[input.numel(), 1]))?;
    let outer = track!(range::histc_select_outer_bin_edges(input, min, max))?;

    let mut bin_edges = Tensor::empty();
    track!(check::prepare_out(
        &reshaped,
        &[bin_count],
        hist,
        slice::from_mut(&mut bin_edges)
    ))?;
    tensor::linspace_into(outer.low, outer.high, bin_count + 1, &mut bin_edges);
    track!(check::check_inputs(&reshaped, slice::from_ref(&bin_edges), None))?;

    kernel::histogramdd_kernel(
        &reshaped,
        None,
        false,
        hist,
        slice::from_ref(&bin_edges),
        BinAlgorithm::LinearInterpolation,
        DEFAULT_MIN_CHUNK_LEN,
    );
    Ok(())
}

/// Counts all elements of `input` into `bin_count` equal-width bins between `min` and `max`.
pub fn histc<T: Element>(input: &Tensor<T>, bin_count: usize, min: f64, max: f64) -> Result<Tensor<T>> {
    let mut hist = Tensor::empty();
    track!(histc_out(input, bin_count, min, max, &mut hist))?;
    Ok(hist)
}
