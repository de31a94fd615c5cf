use std::fmt::Debug;

use num::Float;

pub mod gradient;
pub mod scalar_field;

pub use self::gradient::{gradient, gradient_of, Gradient, GradientOperator, Sample};
pub use self::scalar_field::{sample, Plane, ScalarField2};

pub type CpuScalar = f32;

/// Element type of a differentiable grid.
pub trait Real: Float + Debug + Send + Sync + 'static {}

impl<T> Real for T where T: Float + Debug + Send + Sync + 'static {}
