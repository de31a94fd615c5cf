use std::fmt::Debug;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use image;
use ndarray::{Array2, ArrayView2};

use errors::{ErrorKind, Result, ResultExt};
use math::{CpuScalar, Gradient, GradientOperator};

/// Byte order of raw 32-bit float heightmap files.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

impl Default for Endianness {
    fn default() -> Self {
        Endianness::Big
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HeightRange {
    pub min: CpuScalar,
    pub max: CpuScalar,
    pub range: CpuScalar,
}

/// Elevation samples, row-major, `(row, column)` indexed.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightmap {
    heights: Array2<CpuScalar>,
}

impl Heightmap {
    pub fn new(heights: Array2<CpuScalar>) -> Result<Self> {
        if heights.is_empty() {
            return Err(ErrorKind::EmptyHeightmap.into());
        }
        Ok(Heightmap { heights: heights })
    }

    /// Reads `rows * cols` 32-bit floats stored row by row.
    pub fn from_raw_f32<P>(path: P, rows: usize, cols: usize, endianness: Endianness) -> Result<Self>
        where P: AsRef<Path> + Debug
    {
        if rows == 0 || cols == 0 {
            return Err(ErrorKind::EmptyHeightmap.into());
        }
        let num_samples = rows.checked_mul(cols)
            .and_then(|samples| samples.checked_mul(4).map(|_| samples))
            .ok_or(ErrorKind::HeightmapTooLarge(rows, cols))?;
        let num_bytes = (num_samples * 4) as u64;

        let file = File::open(path.as_ref())
            .chain_err(|| format!("Failed opening heightmap file {:?}", path))?;
        let file_len = file.metadata()
            .chain_err(|| format!("Could not stat heightmap file {:?}", path))?
            .len();
        if file_len < num_bytes {
            return Err(ErrorKind::TruncatedHeightmapFile(num_bytes, file_len).into());
        } else if file_len > num_bytes {
            error!("Found unexpected data in heightmap file; expected {} ({} x {}) values",
                   num_samples,
                   rows,
                   cols);
            return Err(ErrorKind::UnexhaustedHeightmapFile.into());
        }

        let mut reader = BufReader::new(file);
        let mut heights = Vec::with_capacity(num_samples);
        while heights.len() < num_samples {
            let value = match endianness {
                    Endianness::Big => reader.read_f32::<BigEndian>(),
                    Endianness::Little => reader.read_f32::<LittleEndian>(),
                }
                .chain_err(|| {
                    format!("Heightmap creation failed! Could not read value {} of {} from file.",
                            heights.len(),
                            num_samples)
                })?;
            heights.push(value);
        }

        let heights = Array2::from_shape_vec((rows, cols), heights)
            .chain_err(|| "Heightmap creation failed! Bad sample count.")?;
        let heightmap = Heightmap::new(heights)?;
        heightmap.log_summary();
        Ok(heightmap)
    }

    /// Loads the luminance of an image; image `y` becomes the row and `x` the
    /// column.
    pub fn from_image<P>(path: P) -> Result<Self>
        where P: AsRef<Path> + Debug
    {
        let image = image::open(path.as_ref())
            .chain_err(|| format!("Could not open heightmap image at {:?}", path))?
            .to_luma8();

        let (width, height) = image.dimensions();
        let mut heights = Array2::zeros((height as usize, width as usize));
        for (x, y, pixel) in image.enumerate_pixels() {
            heights[(y as usize, x as usize)] = pixel[0] as CpuScalar;
        }

        let heightmap = Heightmap::new(heights)?;
        heightmap.log_summary();
        Ok(heightmap)
    }

    pub fn dim(&self) -> (usize, usize) {
        self.heights.dim()
    }

    pub fn view(&self) -> ArrayView2<CpuScalar> {
        self.heights.view()
    }

    pub fn into_inner(self) -> Array2<CpuScalar> {
        self.heights
    }

    pub fn range(&self) -> HeightRange {
        let (min, max) = self.heights
            .iter()
            .fold((CpuScalar::INFINITY, CpuScalar::NEG_INFINITY),
                  |(min, max), &h| (min.min(h), max.max(h)));
        HeightRange {
            min: min,
            max: max,
            range: max - min,
        }
    }

    /// Rescales the heights into `[0, 1]`. A flat heightmap becomes all zeros.
    pub fn normalized(&self) -> Heightmap {
        let HeightRange { min, range, .. } = self.range();
        let heights = if range > 0.0 {
            self.heights.mapv(|h| (h - min) / range)
        } else {
            warn!("Normalizing a flat heightmap (all samples are {})", min);
            Array2::zeros(self.heights.raw_dim())
        };
        Heightmap { heights: heights }
    }

    /// Terrain meshes are built from square heightmaps of `2^k + 1` samples.
    pub fn validate_terrain_size(&self) -> Result<()> {
        let (rows, cols) = self.dim();
        if rows != cols {
            return Err(ErrorKind::NonSquareTerrain(rows, cols).into());
        }
        if rows < 2 || !(rows - 1).is_power_of_two() {
            return Err(ErrorKind::InvalidTerrainSize(rows).into());
        }
        Ok(())
    }

    pub fn gradient(&self, operator: &GradientOperator) -> Result<Gradient<CpuScalar>> {
        operator.compute(self.heights.view())
    }

    fn log_summary(&self) {
        let (rows, cols) = self.dim();
        let HeightRange { min, max, .. } = self.range();
        info!("Heightmap {}x{} [{}, {}]", rows, cols, min, max);
    }
}

/// Writes `grid` row by row as 32-bit floats.
pub fn write_raw_f32<P>(path: P, grid: ArrayView2<CpuScalar>, endianness: Endianness) -> Result<()>
    where P: AsRef<Path> + Debug
{
    let file = File::create(path.as_ref())
        .chain_err(|| format!("Could not create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    for &value in grid.iter() {
        match endianness {
            Endianness::Big => writer.write_f32::<BigEndian>(value)?,
            Endianness::Little => writer.write_f32::<LittleEndian>(value)?,
        }
    }
    writer.flush().chain_err(|| format!("Could not write {:?}", path))?;
    debug!("Wrote {:?} grid to {:?}", grid.dim(), path);
    Ok(())
}
