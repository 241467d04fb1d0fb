//! Contiguous row-major buffers and the few reductions/generators histograms need.
use crate::float::{self, Element};
use crate::{ErrorKind, Result};

/// Dense row-major N-dimensional buffer.
///
/// A tensor with an empty shape is a scalar and holds exactly one element.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tensor<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}
impl<T: Element> Tensor<T> {
    /// # Errors
    ///
    /// If the number of elements of `data` does not match `shape`,
    /// this function returns an `ErrorKind::InvalidInput` error.
    pub fn new(shape: Vec<usize>, data: Vec<T>) -> Result<Self> {
        let numel = shape.iter().product::<usize>();
        track_assert_eq!(
            numel,
            data.len(),
            ErrorKind::InvalidInput,
            "tensor of shape {:?} needs {} elements, but got {}",
            shape,
            numel,
            data.len()
        );
        Ok(Self { shape, data })
    }

    /// Makes a zero-dimensional tensor holding `x`.
    pub fn scalar(x: T) -> Self {
        Self {
            shape: Vec::new(),
            data: vec![x],
        }
    }

    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    /// Makes a two-dimensional tensor from equally sized rows.
    ///
    /// # Errors
    ///
    /// If the rows have different lengths, this function returns an `ErrorKind::InvalidInput` error.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            track_assert_eq!(
                row.len(),
                cols,
                ErrorKind::InvalidInput,
                "row {} has {} columns, but row 0 has {}",
                i,
                row.len(),
                cols
            );
            data.extend_from_slice(row);
        }
        Ok(Self {
            shape: vec![rows.len(), cols],
            data,
        })
    }

    /// Output buffers start in this state and are resized once their final shape is known.
    pub fn empty() -> Self {
        Self {
            shape: vec![0],
            data: Vec::new(),
        }
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            shape: shape.to_vec(),
            data: vec![T::zero(); shape.iter().product()],
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn dim(&self) -> usize {
        self.shape.len()
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Returns the element at the given multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Option<T> {
        if index.len() != self.shape.len() {
            return None;
        }
        let mut offset = 0;
        for (&i, &size) in index.iter().zip(self.shape.iter()) {
            if i >= size {
                return None;
            }
            offset = offset * size + i;
        }
        self.data.get(offset).copied()
    }

    /// Returns a copy of this tensor viewed with another shape.
    ///
    /// # Errors
    ///
    /// If `shape` does not describe the same number of elements,
    /// this function returns an `ErrorKind::InvalidInput` error.
    pub fn reshape(&self, shape: &[usize]) -> Result<Self> {
        track!(Self::new(shape.to_vec(), self.data.clone()))
    }

    /// Reallocates this tensor to `shape`.
    ///
    /// The contents are unspecified afterwards.
    /// If the tensor already has the requested shape, its buffer is reused as is.
    pub fn resize(&mut self, shape: &[usize]) {
        if self.shape == shape {
            return;
        }
        self.shape = shape.to_vec();
        self.data = vec![T::zero(); shape.iter().product()];
    }

    pub fn fill(&mut self, x: T) {
        for v in &mut self.data {
            *v = x;
        }
    }

    /// Copies the elements of `src` into this tensor, keeping this tensor's shape.
    ///
    /// # Errors
    ///
    /// If the element counts differ, this function returns an `ErrorKind::InvalidInput` error.
    pub fn copy_from(&mut self, src: &Self) -> Result<()> {
        track_assert_eq!(
            self.numel(),
            src.numel(),
            ErrorKind::InvalidInput,
            "cannot copy a tensor of shape {:?} into one of shape {:?}",
            src.shape,
            self.shape
        );
        self.data.copy_from_slice(&src.data);
        Ok(())
    }

    pub fn sum(&self) -> T {
        self.data.iter().fold(T::zero(), |acc, &x| acc + x)
    }
}

/// Computes the column-wise minimum and maximum of a `(M, N)` tensor.
///
/// NaN values propagate, so a column containing NaN yields NaN bounds.
///
/// # Errors
///
/// If `input` is not two-dimensional or has no rows,
/// this function returns an `ErrorKind::InvalidInput` error.
pub fn aminmax_axis0<T: Element>(input: &Tensor<T>) -> Result<(Vec<T>, Vec<T>)> {
    track_assert_eq!(input.dim(), 2, ErrorKind::InvalidInput);
    let (m, n) = (input.shape[0], input.shape[1]);
    track_assert!(m > 0, ErrorKind::InvalidInput; m);
    if n == 0 {
        return Ok((Vec::new(), Vec::new()));
    }

    let mut mins = input.data[..n].to_vec();
    let mut maxs = mins.clone();
    for row in input.data.chunks(n).skip(1) {
        for (d, &x) in row.iter().enumerate() {
            mins[d] = float::min(mins[d], x);
            maxs[d] = float::max(maxs[d], x);
        }
    }
    Ok((mins, maxs))
}

/// Computes the minimum and maximum over all elements of `input`.
///
/// Returns `None` if `input` is empty.
pub fn aminmax<T: Element>(input: &Tensor<T>) -> Option<(T, T)> {
    let (&first, rest) = input.data.split_first()?;
    Some(rest.iter().fold((first, first), |(lo, hi), &x| {
        (float::min(lo, x), float::max(hi, x))
    }))
}

/// Writes `steps` evenly spaced values from `low` to `high` (both inclusive) into `out`.
///
/// `out` is resized to `[steps]`.
/// The first value is exactly `low` and the last one is exactly `high`.
pub fn linspace_into<T: Element>(low: f64, high: f64, steps: usize, out: &mut Tensor<T>) {
    out.resize(&[steps]);
    let low = T::from_f64_lossy(low);
    let high = T::from_f64_lossy(high);
    match steps {
        0 => {}
        1 => out.data[0] = low,
        _ => {
            let step = (high - low) / T::from_f64_lossy((steps - 1) as f64);
            let halfway = steps / 2;
            for (i, v) in out.data.iter_mut().enumerate() {
                *v = if i < halfway {
                    low + step * T::from_f64_lossy(i as f64)
                } else {
                    high - step * T::from_f64_lossy((steps - i - 1) as f64)
                };
            }
        }
    }
}
