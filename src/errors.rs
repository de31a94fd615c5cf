error_chain! {
    types {
        Error, ErrorKind, ResultExt, Result;
    }

    foreign_links {
        Io(::std::io::Error);
        Image(::image::ImageError);
    }

    errors {
        InvalidShape(rows: usize, cols: usize) {
            description("Grid is too small to differentiate.")
            display("Cannot differentiate a {}x{} grid, both axes need at least 2 samples.",
                    rows,
                    cols)
        }
        InvalidSpacing(xres: f32, yres: f32) {
            description("Invalid sample spacing.")
            display("Sample spacing must be finite and non-zero, got ({}, {})", xres, yres)
        }
        EmptyHeightmap {
            description("Heightmap has no samples.")
            display("Heightmap has no samples.")
        }
        HeightmapTooLarge(rows: usize, cols: usize) {
            description("Heightmap dimensions are too large.")
            display("A {}x{} heightmap does not fit in memory.", rows, cols)
        }
        TruncatedHeightmapFile(expected: u64, actual: u64) {
            description("Less data than expected in heightmap file.")
            display("Heightmap file has {} bytes, expected {}.", actual, expected)
        }
        UnexhaustedHeightmapFile {
            description("More data than expected in heightmap file.")
            display("More data than expected in heightmap file.")
        }
        NonSquareTerrain(rows: usize, cols: usize) {
            description("Terrain heightmap must be square.")
            display("Terrain heightmap must be square, got {}x{}", rows, cols)
        }
        InvalidTerrainSize(size: usize) {
            description("Terrain heightmap size must be a power of two plus one.")
            display("Terrain heightmap size must be a power of two plus one, got {}", size)
        }
    }
}
