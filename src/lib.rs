//! N-dimensional histograms.
//!
//! Samples are `(M, N)` shaped tensors holding `M` points of an `N`-dimensional space.
//! Bins are given either as explicit (possibly uneven) edge sequences per dimension,
//! or as bin counts per dimension with evenly spaced edges between a given range or the data's extrema.
//!
//! # Examples
//!
//! ```
//! use histdd::{histogramdd_with_counts, HistogramOptions, Tensor};
//!
//! # fn main() -> histdd::Result<()> {
//! let samples = Tensor::from_rows(&[[0.0, 0.0], [0.0, 0.0], [1.0, 1.0]])?;
//! let weight = Tensor::from_vec(vec![2.0, 3.0, 5.0]);
//! let options = HistogramOptions::new()
//!     .range(vec![0.0, 1.0, 0.0, 1.0])
//!     .weight(&weight);
//!
//! let h = histogramdd_with_counts(&samples, &[2, 2], &options)?;
//! assert_eq!(h.hist.as_slice(), [5.0, 0.0, 0.0, 5.0]);
//! assert_eq!(h.bin_edges[0].as_slice(), [0.0, 0.5, 1.0]);
//! # Ok(())
//! # }
//! ```
#[macro_use]
extern crate log;
#[macro_use]
extern crate trackable;

pub use self::edges::{histogramdd_bin_edges, histogramdd_bin_edges_out};
pub use self::error::{Error, ErrorKind};
pub use self::float::Element;
pub use self::histogram::{
    histc, histc_out, histogram, histogram_out, histogram_with_count, histogram_with_count_out,
    histogramdd, histogramdd_out, histogramdd_with_counts, histogramdd_with_counts_out, Histogram,
    HistogramOptions,
};
pub use self::kernel::BinAlgorithm;
pub use self::tensor::Tensor;

pub mod check;
pub mod range;
pub mod tensor;

mod edges;
mod error;
mod float;
mod histogram;
mod kernel;

/// This crate specific `Result` type.
pub type Result<T> = std::result::Result<T, Error>;
