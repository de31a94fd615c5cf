use ndarray::Array2;

const EPS: f64 = 1e-4;

/// A height function defined everywhere on the `(row, column)` plane.
pub trait ScalarField2 {
    fn value_at(&self, row: f64, col: f64) -> f64;

    #[inline]
    fn gradient_at(&self, row: f64, col: f64) -> [f64; 2] {
        let drow = self.value_at(row + EPS, col) - self.value_at(row - EPS, col);
        let dcol = self.value_at(row, col + EPS) - self.value_at(row, col - EPS);
        [drow / (2.0 * EPS), dcol / (2.0 * EPS)]
    }
}

/// `a * row + b * col + c`
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Plane {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl Plane {
    pub fn new(a: f64, b: f64, c: f64) -> Self {
        Plane { a: a, b: b, c: c }
    }
}

impl ScalarField2 for Plane {
    #[inline]
    fn value_at(&self, row: f64, col: f64) -> f64 {
        self.a * row + self.b * col + self.c
    }

    #[inline]
    fn gradient_at(&self, _row: f64, _col: f64) -> [f64; 2] {
        [self.a, self.b]
    }
}

/// Samples `field` at every integer `(row, column)` of a `dim` grid.
pub fn sample<F>(field: &F, dim: (usize, usize)) -> Array2<f64>
    where F: ScalarField2 + ?Sized
{
    Array2::from_shape_fn(dim, |(row, col)| field.value_at(row as f64, col as f64))
}
