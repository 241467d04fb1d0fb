//! Argument checks and output buffer preparation.
use crate::float::{self, Element};
use crate::tensor::Tensor;
use crate::{ErrorKind, Result};

/// Checks the properties of the input, bin edges and weight tensors of a histogram.
///
/// Element types agree by construction (all of them are `Tensor<T>`), so only shapes and contents are checked.
///
/// # Errors
///
/// This function returns an `ErrorKind::InvalidInput` error if
///
/// - `input` has less than two dimensions
/// - the number of edge sequences differs from the innermost dimension `N` of `input`
/// - an edge sequence is not one-dimensional, is empty, or is not sorted in non-decreasing order
/// - `weight` does not have the shape of `input` without its innermost dimension
pub fn check_inputs<T: Element>(
    input: &Tensor<T>,
    bins: &[Tensor<T>],
    weight: Option<&Tensor<T>>,
) -> Result<()> {
    track_assert!(
        input.dim() >= 2,
        ErrorKind::InvalidInput,
        "input tensor should have at least 2 dimensions, but got {}",
        input.dim()
    );

    let n = input.shape()[input.dim() - 1];
    track_assert_eq!(
        bins.len(),
        n,
        ErrorKind::InvalidInput,
        "expected {} sequences of bin edges for a {}-dimensional histogram but got {}",
        n,
        n,
        bins.len()
    );

    for (dim, edges) in bins.iter().enumerate() {
        track_assert_eq!(
            edges.dim(),
            1,
            ErrorKind::InvalidInput,
            "bins tensor should have one dimension, but got {} dimensions in the bins tensor for dimension {}",
            edges.dim(),
            dim
        );
        track_assert!(
            edges.numel() > 0,
            ErrorKind::InvalidInput,
            "bins tensor should have at least 1 element, but got {} elements in the bins tensor for dimension {}",
            edges.numel(),
            dim
        );
        track_assert!(
            float::is_non_decreasing(edges.as_slice()),
            ErrorKind::InvalidInput,
            "bin edges should be sorted in non-decreasing order, but got {:?} for dimension {}",
            edges.as_slice(),
            dim
        );
    }

    if let Some(weight) = weight {
        let input_sizes = &input.shape()[..input.dim() - 1];
        let weight_sizes = if weight.dim() == 0 {
            &[1][..]
        } else {
            weight.shape()
        };
        track_assert_eq!(
            input_sizes,
            weight_sizes,
            ErrorKind::InvalidInput,
            "weight tensor should have the same shape as the input tensor excluding its innermost dimension, \
             but got input with shape {:?} and weight with shape {:?}",
            input.shape(),
            weight.shape()
        );
    }
    Ok(())
}

/// Returns the number of bins each edge sequence defines.
pub fn bin_counts<T: Element>(bins: &[Tensor<T>]) -> Vec<usize> {
    bins.iter().map(|b| b.numel().saturating_sub(1)).collect()
}

/// Checks the requested bin counts, then resizes `hist` to `bin_counts` and each `bin_edges[d]` to `bin_counts[d] + 1`.
///
/// Nothing is resized unless every check passes.
///
/// # Errors
///
/// If the number of bin counts or edge buffers differs from the innermost dimension of `input`,
/// or a bin count is zero, this function returns an `ErrorKind::InvalidInput` error.
pub fn prepare_out<T: Element>(
    input: &Tensor<T>,
    bin_counts: &[usize],
    hist: &mut Tensor<T>,
    bin_edges: &mut [Tensor<T>],
) -> Result<()> {
    let n = input.shape().last().copied().unwrap_or(0);
    track_assert_eq!(bin_counts.len(), n, ErrorKind::InvalidInput);
    track_assert_eq!(bin_edges.len(), n, ErrorKind::InvalidInput);

    for (dim, &count) in bin_counts.iter().enumerate() {
        track_assert!(
            count > 0,
            ErrorKind::InvalidInput,
            "bins must be > 0, but got {} for dimension {}",
            count,
            dim
        );
    }

    for (edges, &count) in bin_edges.iter_mut().zip(bin_counts) {
        edges.resize(&[count + 1]);
    }
    hist.resize(bin_counts);
    Ok(())
}
