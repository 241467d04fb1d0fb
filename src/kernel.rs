//! Histogram accumulation kernels.
use crate::float::Element;
use crate::tensor::Tensor;
use num_traits::ToPrimitive;
use rayon::prelude::*;
use std::ops::Range;

/// Algorithm used to find the bin a sample coordinate falls in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BinAlgorithm {
    /// Binary search over the bin edges.
    ///
    /// Works with arbitrary (non-decreasing) edges.
    BinarySearch,

    /// Computes the bin index arithmetically from the outer edges.
    ///
    /// Only valid for evenly spaced edges.
    /// Near bin boundaries the result may disagree with the materialized edges by rounding.
    LinearInterpolation,

    /// Like `LinearInterpolation`, but corrects the computed index
    /// by searching the edges immediately around it.
    ///
    /// For evenly spaced edges this gives the same results as `BinarySearch`.
    LinearInterpolationWithLocalSearch,
}

trait Locate<T>: Sync {
    /// Returns the bin of `x` within `edges`.
    ///
    /// `edges` has at least two elements and `edges[0] <= x <= edges[edges.len() - 1]`.
    fn locate(&self, edges: &[T], x: T) -> usize;
}

#[derive(Debug)]
struct SearchLocator;
impl<T: Element> Locate<T> for SearchLocator {
    fn locate(&self, edges: &[T], x: T) -> usize {
        let k = edges.len() - 1;
        let pos = edges.partition_point(|&e| e <= x).saturating_sub(1);

        // The rightmost bin includes its right edge.
        pos.min(k - 1)
    }
}

#[derive(Debug)]
struct LinearLocator {
    local_search: bool,
}
impl<T: Element> Locate<T> for LinearLocator {
    fn locate(&self, edges: &[T], x: T) -> usize {
        let k = edges.len() - 1;
        let (left, right) = (edges[0], edges[k]);
        let bins = T::from_f64_lossy(k as f64);

        // Halved operands keep the differences finite for any finite edges.
        let half = T::from_f64_lossy(0.5);
        let q = (x * half - left * half) / (right * half - left * half) * bins;
        let pos = if q >= bins {
            k
        } else {
            q.to_usize().unwrap_or(0)
        };
        let pos = if self.local_search {
            let lo = pos.saturating_sub(1);
            let hi = (pos + 2).min(k + 1);
            (lo + edges[lo..hi].partition_point(|&e| e <= x)).saturating_sub(1)
        } else {
            pos
        };
        pos.min(k - 1)
    }
}

/// Fills `hist` with the (weighted) counts of the points of `input`.
///
/// `input` is read as `(M, N)` where `N` is its innermost dimension.
/// `hist` and `bin_edges` must already be shaped by `check::prepare_out`.
/// Rows are split into at most one contiguous range per rayon thread (each at least `min_chunk_len` long),
/// each range counting into a private histogram; these are summed in row order afterwards.
pub(crate) fn histogramdd_kernel<T: Element>(
    input: &Tensor<T>,
    weight: Option<&Tensor<T>>,
    density: bool,
    hist: &mut Tensor<T>,
    bin_edges: &[Tensor<T>],
    algorithm: BinAlgorithm,
    min_chunk_len: usize,
) {
    let n = input.shape().last().copied().unwrap_or(0);
    let m = input.shape()[..input.dim().saturating_sub(1)]
        .iter()
        .product::<usize>();
    debug!(
        "Accumulating histogram: algorithm={:?}, points={}, dimensions={}, parallel={}",
        algorithm,
        m,
        n,
        m >= 2 * min_chunk_len.max(1)
    );

    let points = Points {
        data: input.as_slice(),
        n,
        weight: weight.map(|w| w.as_slice()),
        bin_edges,
    };
    let counts = match algorithm {
        BinAlgorithm::BinarySearch => points.accumulate(&SearchLocator, m, min_chunk_len),
        BinAlgorithm::LinearInterpolation => {
            points.accumulate(&LinearLocator { local_search: false }, m, min_chunk_len)
        }
        BinAlgorithm::LinearInterpolationWithLocalSearch => {
            points.accumulate(&LinearLocator { local_search: true }, m, min_chunk_len)
        }
    };
    hist.as_mut_slice().copy_from_slice(&counts);

    if density {
        normalize_density(hist, bin_edges);
    }
}

#[derive(Debug)]
struct Points<'a, T> {
    data: &'a [T],
    n: usize,
    weight: Option<&'a [T]>,
    bin_edges: &'a [Tensor<T>],
}
impl<'a, T: Element> Points<'a, T> {
    fn cells(&self) -> usize {
        self.bin_edges.iter().map(|e| e.numel() - 1).product()
    }

    fn accumulate<L: Locate<T>>(&self, locator: &L, m: usize, min_chunk_len: usize) -> Vec<T> {
        let tasks = row_partitions(m, min_chunk_len, rayon::current_num_threads());
        if tasks.len() <= 1 {
            return self.accumulate_rows(locator, 0..m);
        }

        let partials = tasks
            .into_par_iter()
            .map(|rows| self.accumulate_rows(locator, rows))
            .collect::<Vec<_>>();

        // Summed in row order so that the result does not depend on scheduling.
        let mut partials = partials.into_iter();
        let mut counts = partials.next().unwrap_or_else(|| vec![T::zero(); self.cells()]);
        for partial in partials {
            for (c, p) in counts.iter_mut().zip(partial) {
                *c = *c + p;
            }
        }
        counts
    }

    fn accumulate_rows<L: Locate<T>>(&self, locator: &L, rows: Range<usize>) -> Vec<T> {
        let mut counts = vec![T::zero(); self.cells()];
        'rows: for i in rows {
            let point = &self.data[i * self.n..(i + 1) * self.n];
            let mut offset = 0;
            for (&x, edges) in point.iter().zip(self.bin_edges) {
                let edges = edges.as_slice();
                let k = edges.len() - 1;
                // NaN fails both comparisons and is skipped too.
                if !(x >= edges[0] && x <= edges[k]) {
                    continue 'rows;
                }
                offset = offset * k + locator.locate(edges, x);
            }
            let w = self.weight.map_or(T::one(), |w| w[i]);
            counts[offset] = counts[offset] + w;
        }
        counts
    }
}

/// Splits `0..m` into at most `threads` contiguous ranges of at least `min_chunk_len` rows.
///
/// Each range gets its own partial histogram, so their number bounds the extra memory and merge work.
fn row_partitions(m: usize, min_chunk_len: usize, threads: usize) -> Vec<Range<usize>> {
    let min_chunk_len = min_chunk_len.max(1);
    let tasks = threads.min(m / min_chunk_len).max(1);
    let rows_per_task = (m + tasks - 1) / tasks;
    (0..tasks)
        .map(|t| (t * rows_per_task).min(m)..((t + 1) * rows_per_task).min(m))
        .collect()
}

/// Divides each cell by the total count and by the volume of its bin.
///
/// A histogram whose total is zero is filled with zeros instead.
fn normalize_density<T: Element>(hist: &mut Tensor<T>, bin_edges: &[Tensor<T>]) {
    let total = hist.sum();
    if total == T::zero() {
        hist.fill(T::zero());
        return;
    }

    let counts = bin_edges.iter().map(|e| e.numel() - 1).collect::<Vec<_>>();
    let mut index = vec![0; counts.len()];
    for v in hist.as_mut_slice() {
        let mut x = *v / total;
        for (&i, edges) in index.iter().zip(bin_edges) {
            let edges = edges.as_slice();
            x = x / (edges[i + 1] - edges[i]);
        }
        *v = x;

        for d in (0..counts.len()).rev() {
            index[d] += 1;
            if index[d] < counts[d] {
                break;
            }
            index[d] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use trackable::result::TestResult;

    const ALGORITHMS: [BinAlgorithm; 3] = [
        BinAlgorithm::BinarySearch,
        BinAlgorithm::LinearInterpolation,
        BinAlgorithm::LinearInterpolationWithLocalSearch,
    ];

    fn run<T: Element>(
        input: &Tensor<T>,
        weight: Option<&Tensor<T>>,
        density: bool,
        bin_edges: &[Tensor<T>],
        algorithm: BinAlgorithm,
        min_chunk_len: usize,
    ) -> Tensor<T> {
        let shape = bin_edges.iter().map(|e| e.numel() - 1).collect::<Vec<_>>();
        let mut hist = Tensor::zeros(&shape);
        histogramdd_kernel(input, weight, density, &mut hist, bin_edges, algorithm, min_chunk_len);
        hist
    }

    fn linspace<T: Element>(low: f64, high: f64, steps: usize) -> Tensor<T> {
        let mut out = Tensor::empty();
        tensor::linspace_into(low, high, steps, &mut out);
        out
    }

    #[test]
    fn search_locator_works() {
        let edges = [0.0, 1.0, 1.0, 3.0, 4.0];
        assert_eq!(SearchLocator.locate(&edges, 0.0), 0);
        assert_eq!(SearchLocator.locate(&edges, 0.5), 0);
        assert_eq!(SearchLocator.locate(&edges, 1.0), 2);
        assert_eq!(SearchLocator.locate(&edges, 3.5), 3);
        assert_eq!(SearchLocator.locate(&edges, 4.0), 3);
    }

    #[test]
    fn linear_locator_works() {
        let edges = [0.0, 0.25, 0.5, 0.75, 1.0];
        for &local_search in &[false, true] {
            let locator = LinearLocator { local_search };
            assert_eq!(locator.locate(&edges, 0.0), 0);
            assert_eq!(locator.locate(&edges, 0.3), 1);
            assert_eq!(locator.locate(&edges, 0.5), 2);
            assert_eq!(locator.locate(&edges, 1.0), 3);
        }
    }

    #[test]
    fn points_outside_of_any_dimension_are_dropped() -> TestResult {
        let input = track!(Tensor::from_rows(&[
            [0.5, 0.5],
            [1.5, 0.5],
            [0.5, -0.1],
            [std::f64::NAN, 0.5],
            [1.0, 1.0],
        ]))?;
        let edges = vec![linspace(0.0, 1.0, 3), linspace(0.0, 1.0, 3)];
        for &algorithm in &ALGORITHMS {
            let hist = run(&input, None, false, &edges, algorithm, 4096);
            assert_eq!(hist.as_slice(), [0.0, 0.0, 0.0, 2.0]);
        }
        Ok(())
    }

    #[test]
    fn cells_are_linearized_in_row_major_order() -> TestResult {
        let input = track!(Tensor::from_rows(&[[0.0, 2.5], [1.5, 0.0]]))?;
        let edges = vec![linspace(0.0, 2.0, 3), linspace(0.0, 3.0, 4)];
        let hist = run(&input, None, false, &edges, BinAlgorithm::BinarySearch, 4096);
        assert_eq!(hist.get(&[0, 2]), Some(1.0));
        assert_eq!(hist.get(&[1, 0]), Some(1.0));
        assert_eq!(hist.sum(), 2.0);
        Ok(())
    }

    #[test]
    fn parallel_accumulation_matches_sequential() -> TestResult {
        let mut rng = StdRng::seed_from_u64(0);
        let rows = (0..1000)
            .map(|_| [rng.gen_range(-1.0, 11.0), rng.gen_range(0.0, 1.0)])
            .collect::<Vec<_>>();
        let input = track!(Tensor::from_rows(&rows))?;
        let weight = Tensor::from_vec((0..1000).map(|i| (i % 3) as f64).collect());
        let edges = vec![linspace(0.0, 10.0, 11), linspace(0.0, 1.0, 5)];

        let sequential = run(&input, Some(&weight), false, &edges, BinAlgorithm::BinarySearch, 4096);
        let parallel = run(&input, Some(&weight), false, &edges, BinAlgorithm::BinarySearch, 7);
        assert_eq!(sequential, parallel);
        Ok(())
    }

    #[test]
    fn local_search_matches_binary_search_on_uniform_edges() -> TestResult {
        let mut rng = StdRng::seed_from_u64(1);
        for &(low, high, bins) in &[(0.0, 1.0, 10), (-3.3, 7.1, 7), (0.1, 0.7, 3), (1e-3, 1e3, 97)] {
            let mut values = (0..500).map(|_| rng.gen_range(low, high)).collect::<Vec<_>>();
            let edges = linspace(low, high, bins + 1);
            values.extend_from_slice(edges.as_slice());

            let input = track!(Tensor::new(vec![values.len(), 1], values))?;
            let edges = vec![edges];
            let expected = run(&input, None, false, &edges, BinAlgorithm::BinarySearch, 4096);
            let actual = run(
                &input,
                None,
                false,
                &edges,
                BinAlgorithm::LinearInterpolationWithLocalSearch,
                4096,
            );
            assert_eq!(expected, actual);
        }
        Ok(())
    }

    #[test]
    fn linear_locator_handles_values_near_the_float_limit() {
        let edges = (0..=10).map(|i| std::f64::MAX * (i as f64 / 10.0)).collect::<Vec<_>>();
        for &local_search in &[false, true] {
            let locator = LinearLocator { local_search };
            assert_eq!(locator.locate(&edges, std::f64::MAX), 9);
            assert_eq!(locator.locate(&edges, std::f64::MAX * 0.95), 9);
            assert_eq!(locator.locate(&edges, std::f64::MAX * 0.35), 3);
        }

        let edges = [-std::f32::MAX, 0.0, std::f32::MAX];
        for &local_search in &[false, true] {
            let locator = LinearLocator { local_search };
            assert_eq!(locator.locate(&edges, -std::f32::MAX), 0);
            assert_eq!(locator.locate(&edges, -1e37), 0);
            assert_eq!(locator.locate(&edges, 1e37), 1);
            assert_eq!(locator.locate(&edges, std::f32::MAX), 1);
        }
    }

    #[test]
    fn local_search_matches_binary_search_near_the_float_limit() -> TestResult {
        let input = track!(Tensor::from_rows(&[[1.4e308], [1.5e308], [7.6e307], [0.0]]))?;
        let edges = vec![linspace::<f64>(0.0, 1.5e308, 11)];
        for &algorithm in &ALGORITHMS {
            let hist = run(&input, None, false, &edges, algorithm, 4096);
            assert_eq!(
                hist.as_slice(),
                [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 2.0],
                "algorithm={:?}",
                algorithm
            );
        }

        let input = track!(Tensor::from_rows(&[[2e38f32], [3e38], [1e30]]))?;
        let edges = vec![linspace::<f32>(0.0, 3e38, 11)];
        for &algorithm in &ALGORITHMS {
            let hist = run(&input, None, false, &edges, algorithm, 4096);
            assert_eq!(
                hist.as_slice(),
                [1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
                "algorithm={:?}",
                algorithm
            );
        }
        Ok(())
    }

    #[test]
    fn rows_are_partitioned_into_one_range_per_thread() {
        assert_eq!(row_partitions(100, 4096, 8), [0..100]);
        assert_eq!(row_partitions(0, 4096, 8), [0..0]);
        assert_eq!(row_partitions(10_000, 4096, 8), [0..5000, 5000..10_000]);
        assert_eq!(
            row_partitions(1_000_000, 4096, 4),
            [0..250_000, 250_000..500_000, 500_000..750_000, 750_000..1_000_000]
        );
        assert_eq!(row_partitions(10, 0, 4), [0..3, 3..6, 6..9, 9..10]);
    }

    #[test]
    fn parallel_accumulation_is_reproducible() -> TestResult {
        let mut rng = StdRng::seed_from_u64(2);
        let rows = (0..5000).map(|_| [rng.gen_range(0.0, 1.0)]).collect::<Vec<_>>();
        let input = track!(Tensor::from_rows(&rows))?;
        let weight = Tensor::from_vec((0..5000).map(|_| rng.gen_range(0.0, 1e-3)).collect());
        let edges = vec![linspace(0.0, 1.0, 4)];

        let first = run(&input, Some(&weight), false, &edges, BinAlgorithm::BinarySearch, 3);
        for _ in 0..10 {
            let again = run(&input, Some(&weight), false, &edges, BinAlgorithm::BinarySearch, 3);
            assert_eq!(first, again);
        }
        Ok(())
    }

    #[test]
    fn density_integrates_to_one() -> TestResult {
        let input = track!(Tensor::from_rows(&[[0.5, 0.1], [2.5, 0.2], [2.9, 0.9], [3.0, 0.5]]))?;
        let edges = vec![
            Tensor::from_vec(vec![0.0, 1.0, 3.0]),
            Tensor::from_vec(vec![0.0, 0.25, 1.0]),
        ];
        let hist = run(&input, None, true, &edges, BinAlgorithm::BinarySearch, 4096);

        let mut integral: f64 = 0.0;
        for i in 0..2 {
            for j in 0..2 {
                let e0 = edges[0].as_slice();
                let e1 = edges[1].as_slice();
                let volume = (e0[i + 1] - e0[i]) * (e1[j + 1] - e1[j]);
                integral += hist.get(&[i, j]).unwrap_or(0.0) * volume;
            }
        }
        assert!((integral - 1.0).abs() < 1e-12, "integral={}", integral);
        assert_eq!(hist.get(&[0, 0]), Some(1.0 / 4.0 / 1.0 / 0.25));
        Ok(())
    }

    #[test]
    fn density_of_empty_histogram_is_zero() -> TestResult {
        let input = track!(Tensor::from_rows(&[[5.0], [6.0]]))?;
        let weight = Tensor::from_vec(vec![0.0, 0.0]);
        let edges = vec![linspace(0.0, 1.0, 3)];
        for w in &[None, Some(&weight)] {
            let hist = run(&input, *w, true, &edges, BinAlgorithm::BinarySearch, 4096);
            assert_eq!(hist.as_slice(), [0.0, 0.0]);
        }

        let input = track!(Tensor::from_rows(&[[0.0], [1.0]]))?;
        let weight = Tensor::from_vec(vec![0.0, 0.0]);
        let hist = run(&input, Some(&weight), true, &edges, BinAlgorithm::BinarySearch, 4096);
        assert_eq!(hist.as_slice(), [0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn zero_dimensional_points_fall_in_the_single_cell() -> TestResult {
        let input = track!(Tensor::<f64>::new(vec![3, 0], Vec::new()))?;
        let hist = run(&input, None, false, &[], BinAlgorithm::BinarySearch, 2);
        assert_eq!(hist.shape(), [] as [usize; 0]);
        assert_eq!(hist.as_slice(), [3.0]);
        Ok(())
    }
}
