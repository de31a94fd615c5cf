//! Gradient of a dense 2D grid of samples.
//!
//! Grids are `ndarray` arrays indexed `(row, column)`; the standard layout is
//! row-major, but any view works since every access goes through logical
//! indices. The derivative along the first axis (rows) is `dx`, along the
//! second axis (columns) it is `dy`. Samples are assumed to be unit distance
//! apart along both axes.
//!
//! Interior cells use second order central differences,
//! `(f[k + 1] - f[k - 1]) / 2`, and boundary cells use first order forward or
//! backward differences, so the result has the same shape as the input.

use ndarray::{Array2, ArrayView1, ArrayView2, ArrayViewMut1, Axis, Slice, Zip};
use rayon;

use errors::{ErrorKind, Result};
use math::Real;

/// Partial derivatives of a grid along both axes.
#[derive(Clone, Debug, PartialEq)]
pub struct Gradient<A> {
    pub dx: Array2<A>,
    pub dy: Array2<A>,
}

impl<A: Real> Gradient<A> {
    pub fn dim(&self) -> (usize, usize) {
        self.dx.dim()
    }

    /// Per-cell length of the gradient vector, `sqrt(dx^2 + dy^2)`.
    pub fn magnitude(&self) -> Array2<A> {
        Zip::from(&self.dx)
            .and(&self.dy)
            .map_collect(|&dx, &dy| dx.hypot(dy))
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct GradientOperator {
    parallel: bool,
}

impl GradientOperator {
    pub fn new() -> Self {
        GradientOperator { parallel: false }
    }

    /// Evaluate the two axis passes on the rayon pool instead of one after
    /// the other. The result is the same either way.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Computes `dx` and `dy` for `grid`.
    ///
    /// Fails with `ErrorKind::InvalidShape` when either axis has fewer than
    /// two samples, as there is no neighbour to take a one-sided difference
    /// against.
    pub fn compute<A: Real>(&self, grid: ArrayView2<A>) -> Result<Gradient<A>> {
        self.compute_with(grid, |ahead, behind| ahead - behind)
    }

    fn compute_with<T, A, F>(&self, grid: ArrayView2<T>, difference: F) -> Result<Gradient<A>>
        where T: Copy + Sync,
              A: Real,
              F: Fn(T, T) -> A + Sync
    {
        let (rows, cols) = grid.dim();
        if rows < 2 || cols < 2 {
            debug!("Refusing to differentiate a {}x{} grid", rows, cols);
            return Err(ErrorKind::InvalidShape(rows, cols).into());
        }

        // Both passes only ever read `grid`, never each other's output.
        let (dx, dy) = if self.parallel {
            rayon::join(|| differentiate(&grid, Axis(0), &difference),
                        || differentiate(&grid, Axis(1), &difference))
        } else {
            (differentiate(&grid, Axis(0), &difference),
             differentiate(&grid, Axis(1), &difference))
        };
        trace!("Computed {}x{} gradient (parallel: {})", rows, cols, self.parallel);

        Ok(Gradient { dx: dx, dy: dy })
    }
}

/// Primitive numbers whose pairwise difference can be taken without losing
/// precision before it is turned into an `f64`.
pub trait Sample: Copy + Send + Sync + 'static {
    fn difference(self, other: Self) -> f64;
}

macro_rules! integer_sample {
    ($($int:ident)*) => {
        $(
            impl Sample for $int {
                #[inline]
                fn difference(self, other: Self) -> f64 {
                    (self as i128 - other as i128) as f64
                }
            }
        )*
    }
}

integer_sample!(i8 i16 i32 i64 isize u8 u16 u32 u64 usize);

impl Sample for f32 {
    #[inline]
    fn difference(self, other: Self) -> f64 {
        self as f64 - other as f64
    }
}

impl Sample for f64 {
    #[inline]
    fn difference(self, other: Self) -> f64 {
        self - other
    }
}

/// Gradient of `grid` with the default (sequential) operator.
pub fn gradient<A: Real>(grid: ArrayView2<A>) -> Result<Gradient<A>> {
    GradientOperator::new().compute(grid)
}

/// Gradient of a grid of primitive numbers, e.g. integer heights.
///
/// Neighbours are subtracted in the sample type's full precision (128-bit
/// for integers), and only the difference is converted to `f64`, so the
/// central difference is a real division.
pub fn gradient_of<T: Sample>(grid: ArrayView2<T>) -> Result<Gradient<f64>> {
    GradientOperator::new().compute_with(grid, T::difference)
}

fn differentiate<T, A, F>(grid: &ArrayView2<T>, axis: Axis, difference: &F) -> Array2<A>
    where T: Copy,
          A: Real,
          F: Fn(T, T) -> A
{
    let len = grid.len_of(axis);
    debug_assert!(len >= 2);
    let two = A::one() + A::one();
    let mut derivative = Array2::zeros(grid.raw_dim());

    Zip::from(derivative.slice_axis_mut(axis, Slice::from(1..len - 1)))
        .and(grid.slice_axis(axis, Slice::from(2..len)))
        .and(grid.slice_axis(axis, Slice::from(..len - 2)))
        .for_each(|d, &ahead, &behind| *d = difference(ahead, behind) / two);

    one_sided(derivative.index_axis_mut(axis, 0),
              grid.index_axis(axis, 1),
              grid.index_axis(axis, 0),
              difference);
    one_sided(derivative.index_axis_mut(axis, len - 1),
              grid.index_axis(axis, len - 1),
              grid.index_axis(axis, len - 2),
              difference);
    derivative
}

#[inline]
fn one_sided<T, A, F>(derivative: ArrayViewMut1<A>,
                      ahead: ArrayView1<T>,
                      behind: ArrayView1<T>,
                      difference: &F)
    where T: Copy,
          A: Real,
          F: Fn(T, T) -> A
{
    Zip::from(derivative)
        .and(ahead)
        .and(behind)
        .for_each(|d, &ahead, &behind| *d = difference(ahead, behind));
}
