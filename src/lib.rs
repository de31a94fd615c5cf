//! Central-difference gradients of heightmaps, plus the surface normals and
//! normal maps derived from them.

#![recursion_limit = "1024"]

extern crate byteorder;
#[macro_use]
extern crate error_chain;
extern crate image;
#[macro_use]
extern crate log;
extern crate ndarray;
extern crate num;
extern crate rayon;

#[cfg(test)]
extern crate rand;

pub mod errors;
pub mod heightmap;
pub mod math;
pub mod normals;

pub use errors::{Error, ErrorKind, Result, ResultExt};
pub use heightmap::{write_raw_f32, Endianness, HeightRange, Heightmap};
pub use math::{gradient, gradient_of, CpuScalar, Gradient, GradientOperator, Real, Sample};
pub use normals::{hypot, NormalSpec, SurfaceNormals};
