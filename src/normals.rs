//! Surface normals of a heightmap and their RGB normal map encoding.

use std::fmt::Debug;
use std::path::Path;

use image::{Rgb, RgbImage};
use ndarray::{Array2, ArrayView2, Zip};

use errors::{ErrorKind, Result, ResultExt};
use math::{CpuScalar, Gradient, GradientOperator};

/// Distance between neighbouring samples along the row (`xres`) and column
/// (`yres`) axes.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NormalSpec {
    pub xres: CpuScalar,
    pub yres: CpuScalar,
}

impl Default for NormalSpec {
    fn default() -> Self {
        NormalSpec {
            xres: 2.5,
            yres: 2.5,
        }
    }
}

impl NormalSpec {
    fn validate(&self) -> Result<()> {
        let valid = |res: CpuScalar| res.is_finite() && res != 0.0;
        if valid(self.xres) && valid(self.yres) {
            Ok(())
        } else {
            Err(ErrorKind::InvalidSpacing(self.xres, self.yres).into())
        }
    }
}

#[inline]
pub fn hypot(x1: CpuScalar, x2: CpuScalar) -> CpuScalar {
    (x1 * x1 + x2 * x2).sqrt()
}

/// Unit normals, one per height sample, split by component. Only built by
/// `from_heights`, so there are always at least 2x2 samples.
#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceNormals {
    x: Array2<CpuScalar>,
    y: Array2<CpuScalar>,
    z: Array2<CpuScalar>,
}

impl SurfaceNormals {
    pub fn from_heights(heights: ArrayView2<CpuScalar>,
                        spec: &NormalSpec,
                        operator: &GradientOperator)
                        -> Result<Self> {
        spec.validate()?;
        let Gradient { dx: mut x, dy: mut y } = operator.compute(heights)?;
        let mut z = Array2::zeros(x.raw_dim());

        Zip::from(&mut x)
            .and(&mut y)
            .and(&mut z)
            .for_each(|x, y, z| {
                let gx = -*x / spec.xres;
                let gy = -*y / spec.yres;
                let gz = hypot(gx, gy).atan().cos();
                let norm = (gx * gx + gy * gy + gz * gz).sqrt();
                *x = gx / norm;
                *y = gy / norm;
                *z = gz / norm;
            });

        let (rows, cols) = x.dim();
        debug!("Computed {}x{} surface normals with spacing {:?}", rows, cols, spec);
        Ok(SurfaceNormals { x: x, y: y, z: z })
    }

    pub fn dim(&self) -> (usize, usize) {
        self.x.dim()
    }

    pub fn x(&self) -> ArrayView2<CpuScalar> {
        self.x.view()
    }

    pub fn y(&self) -> ArrayView2<CpuScalar> {
        self.y.view()
    }

    pub fn z(&self) -> ArrayView2<CpuScalar> {
        self.z.view()
    }

    #[inline]
    pub fn normal_at(&self, row: usize, col: usize) -> [CpuScalar; 3] {
        [self.x[(row, col)], self.y[(row, col)], self.z[(row, col)]]
    }

    /// Encodes each normal as `0.5 * n + 0.5` per channel. The last row and
    /// column of samples are dropped, so a `rows x cols` heightmap gives a
    /// `(cols - 1) x (rows - 1)` image where pixel `(x, y)` is sample
    /// `(y, x)`.
    pub fn to_normal_map(&self) -> RgbImage {
        let (rows, cols) = self.dim();
        RgbImage::from_fn((cols - 1) as u32, (rows - 1) as u32, |x, y| {
            let [nx, ny, nz] = self.normal_at(y as usize, x as usize);
            Rgb([encode(nx), encode(ny), encode(nz)])
        })
    }

    pub fn save_normal_map<P>(&self, path: P) -> Result<()>
        where P: AsRef<Path> + Debug
    {
        let normal_map = self.to_normal_map();
        normal_map.save(path.as_ref())
            .chain_err(|| format!("Could not save normal map to {:?}", path))?;
        info!("Wrote {}x{} normal map to {:?}",
              normal_map.width(),
              normal_map.height(),
              path);
        Ok(())
    }
}

#[inline]
fn encode(component: CpuScalar) -> u8 {
    ((0.5 * component + 0.5).max(0.0).min(1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;

    use image;
    use ndarray::{arr2, Array2};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use errors::ErrorKind;
    use super::*;

    const EPS: CpuScalar = 1e-5;

    #[test]
    fn flat_surface_points_up() {
        let heights = Array2::from_elem((4, 4), 3.0);
        let normals = SurfaceNormals::from_heights(heights.view(),
                                                   &NormalSpec::default(),
                                                   &GradientOperator::new())
            .unwrap();

        assert!(normals.x.iter().all(|&v| v == 0.0));
        assert!(normals.y.iter().all(|&v| v == 0.0));
        assert!(normals.z.iter().all(|&v| v == 1.0));

        let normal_map = normals.to_normal_map();
        assert_eq!(normal_map.dimensions(), (3, 3));
        assert!(normal_map.pixels().all(|pixel| *pixel == Rgb([128, 128, 255])));
    }

    #[test]
    fn slope_along_rows_tilts_normal_backwards() {
        // dx = 2 everywhere, divided by xres = 2 gives a 45 degree slope
        let heights = Array2::from_shape_fn((3, 3), |(i, _)| 2.0 * i as CpuScalar);
        let spec = NormalSpec {
            xres: 2.0,
            yres: 1.0,
        };
        let normals = SurfaceNormals::from_heights(heights.view(), &spec, &GradientOperator::new())
            .unwrap();

        let expected_x = -1.0 / (1.5 as CpuScalar).sqrt();
        let expected_z = (0.5 as CpuScalar).sqrt() / (1.5 as CpuScalar).sqrt();
        for &x in normals.x.iter() {
            assert!((x - expected_x).abs() < EPS, "{} != {}", x, expected_x);
        }
        assert!(normals.y.iter().all(|&v| v == 0.0));
        for &z in normals.z.iter() {
            assert!((z - expected_z).abs() < EPS, "{} != {}", z, expected_z);
        }
    }

    #[test]
    fn normals_have_unit_length() {
        let mut rng = StdRng::seed_from_u64(424);
        let heights = Array2::from_shape_fn((9, 6), |_| rng.gen_range(-50.0..50.0));
        let normals = SurfaceNormals::from_heights(heights.view(),
                                                   &NormalSpec::default(),
                                                   &GradientOperator::new().parallel(true))
            .unwrap();

        for row in 0..9 {
            for col in 0..6 {
                let [x, y, z] = normals.normal_at(row, col);
                assert!(((x * x + y * y + z * z).sqrt() - 1.0).abs() < EPS);
                assert!(z > 0.0);
            }
        }
    }

    #[test]
    fn normal_map_drops_last_row_and_column() {
        let heights = arr2(&[[0.0, 0.0, 0.0, 0.0, 0.0],
                             [0.0, 1.0, 0.0, 0.0, 0.0],
                             [0.0, 0.0, 0.0, 0.0, 0.0]]);
        let normals = SurfaceNormals::from_heights(heights.view(),
                                                   &NormalSpec::default(),
                                                   &GradientOperator::new())
            .unwrap();
        let normal_map = normals.to_normal_map();
        assert_eq!(normal_map.dimensions(), (4, 2));

        // sample (0, 1) has dx = 1, so its normal leans towards -x
        let [nx, ny, nz] = normals.normal_at(0, 1);
        assert_eq!(*normal_map.get_pixel(1, 0), Rgb([encode(nx), encode(ny), encode(nz)]));
        assert!(normal_map.get_pixel(1, 0)[0] < 128);
    }

    #[test]
    fn smallest_heightmap_gives_single_pixel_map() {
        let heights = arr2(&[[0.0, 1.0], [2.0, 3.0]]);
        let normals = SurfaceNormals::from_heights(heights.view(),
                                                   &NormalSpec::default(),
                                                   &GradientOperator::new())
            .unwrap();
        assert_eq!(normals.dim(), (2, 2));

        let normal_map = normals.to_normal_map();
        assert_eq!(normal_map.dimensions(), (1, 1));
        let (x, y, z) = (normals.x()[(0, 0)], normals.y()[(0, 0)], normals.z()[(0, 0)]);
        assert_eq!(*normal_map.get_pixel(0, 0), Rgb([encode(x), encode(y), encode(z)]));
    }

    #[test]
    fn encode_clamps() {
        assert_eq!(encode(-1.0), 0);
        assert_eq!(encode(0.0), 128);
        assert_eq!(encode(1.0), 255);
        assert_eq!(encode(3.0), 255);
        assert_eq!(encode(-3.0), 0);
    }

    #[test]
    fn hypot_of_legs() {
        assert_eq!(hypot(3.0, 4.0), 5.0);
        assert_eq!(hypot(0.0, 0.0), 0.0);
    }

    #[test]
    fn spacing_must_be_finite_and_non_zero() {
        let heights = Array2::zeros((3, 3));
        for spec in &[NormalSpec { xres: 0.0, yres: 1.0 },
                      NormalSpec { xres: 1.0, yres: ::std::f32::NAN },
                      NormalSpec { xres: ::std::f32::INFINITY, yres: 1.0 }] {
            let result = SurfaceNormals::from_heights(heights.view(), spec, &GradientOperator::new());
            match *result.unwrap_err().kind() {
                ErrorKind::InvalidSpacing(..) => (),
                ref other => panic!("unexpected error kind: {}", other),
            }
        }
    }

    #[test]
    fn degenerate_heightmap_has_no_normals() {
        let heights = Array2::zeros((1, 4));
        let result = SurfaceNormals::from_heights(heights.view(),
                                                  &NormalSpec::default(),
                                                  &GradientOperator::new());
        match *result.unwrap_err().kind() {
            ErrorKind::InvalidShape(1, 4) => (),
            ref other => panic!("unexpected error kind: {}", other),
        }
    }

    #[test]
    fn saves_png() {
        let path = env::temp_dir()
            .join(format!("terrain-gradient-{}-normals.png", ::std::process::id()));
        let heights = Array2::from_shape_fn((5, 5), |(i, j)| (i * j) as CpuScalar);
        let normals = SurfaceNormals::from_heights(heights.view(),
                                                   &NormalSpec::default(),
                                                   &GradientOperator::new())
            .unwrap();
        normals.save_normal_map(&path).unwrap();

        let loaded = image::open(&path).unwrap().to_rgb8();
        fs::remove_file(&path).unwrap();
        assert_eq!(loaded, normals.to_normal_map());
    }
}
