//! Bin edge sequences.
use crate::float::Element;
use crate::range;
use crate::tensor::{self, Tensor};
use crate::{ErrorKind, Result};

/// Allocates one empty edge buffer for each dimension of `input`.
pub(crate) fn allocate_bin_edges<T: Element>(input: &Tensor<T>) -> Result<Vec<Tensor<T>>> {
    track_assert!(
        input.dim() >= 2,
        ErrorKind::InvalidInput,
        "input tensor should have at least 2 dimensions"
    );
    let n = input.shape()[input.dim() - 1];
    Ok(vec![Tensor::empty(); n])
}

/// Copies the edge sequences used for binning into the caller visible `bin_edges`.
///
/// `bin_edges` must already be shaped like `bins`.
pub(crate) fn copy_bin_edges<T: Element>(bins: &[Tensor<T>], bin_edges: &mut [Tensor<T>]) -> Result<()> {
    track_assert_eq!(bins.len(), bin_edges.len(), ErrorKind::InvalidInput);
    for (out, edges) in bin_edges.iter_mut().zip(bins) {
        track!(out.copy_from(edges))?;
    }
    Ok(())
}

/// Writes the `bin_counts[d] + 1` evenly spaced edges of each dimension `d` into `bin_edges`.
///
/// The outer edges are taken from `range` if given, otherwise from the data (see `range::select_outer_bin_edges`).
///
/// # Errors
///
/// - `ErrorKind::InvalidInput` if `input` has less than two dimensions,
///   or `bin_counts`, `bin_edges` or `range` do not match its innermost dimension
/// - `ErrorKind::InvalidRange` if the outer edges are not finite or inverted
pub fn histogramdd_bin_edges_out<T: Element>(
    input: &Tensor<T>,
    bin_counts: &[usize],
    range: Option<&[f64]>,
    bin_edges: &mut [Tensor<T>],
) -> Result<()> {
    track_assert!(
        input.dim() >= 2,
        ErrorKind::InvalidInput,
        "input tensor should have at least 2 dimensions, but got shape {:?}",
        input.shape()
    );
    let n = input.shape()[input.dim() - 1];
    let m = input.numel().checked_div(n).unwrap_or(0);
    track_assert_eq!(bin_counts.len(), n, ErrorKind::InvalidInput; bin_counts);
    track_assert_eq!(bin_edges.len(), n, ErrorKind::InvalidInput);

    let reshaped = if n == 0 {
        Tensor::zeros(&[0, 0])
    } else {
        track!(input.reshape(&[m, n]))?
    };
    let outer = track!(range::select_outer_bin_edges(&reshaped, range))?;
    for (dim, ((out, r), &count)) in bin_edges.iter_mut().zip(&outer).zip(bin_counts).enumerate() {
        tensor::linspace_into(r.low, r.high, count + 1, out);
        trace!("Materialized {} bin edges for dimension {}", count + 1, dim);
    }
    Ok(())
}

/// Returns the `bin_counts[d] + 1` evenly spaced edges of each dimension `d`.
///
/// See `histogramdd_bin_edges_out` for details.
pub fn histogramdd_bin_edges<T: Element>(
    input: &Tensor<T>,
    bin_counts: &[usize],
    range: Option<&[f64]>,
) -> Result<Vec<Tensor<T>>> {
    let mut bin_edges = track!(allocate_bin_edges(input))?;
    track!(histogramdd_bin_edges_out(input, bin_counts, range, &mut bin_edges))?;
    Ok(bin_edges)
}
