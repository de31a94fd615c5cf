#[macro_use]
extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate terrain_gradient;

use clap::Arg;

use terrain_gradient::{write_raw_f32, CpuScalar, Endianness, GradientOperator, Heightmap,
                       NormalSpec, Result, SurfaceNormals};

fn extent<'a, I>(values: I) -> (CpuScalar, CpuScalar)
    where I: IntoIterator<Item = &'a CpuScalar>
{
    values.into_iter()
        .fold((CpuScalar::INFINITY, CpuScalar::NEG_INFINITY),
              |(min, max), &v| (min.min(v), max.max(v)))
}

fn start_app() -> Result<()> {
    let matches = clap::App::new("Terrain gradient.")
        .version("0.1.0")
        .author("Marius C. <marius@reinfer.io>")
        .about("Differentiates heightmaps and generates normal maps.")
        .arg(Arg::with_name("input")
            .value_name("PATH")
            .help("Heightmap to load: raw 32-bit floats with --rows/--cols, an image otherwise")
            .required(true)
            .index(1))
        .arg(Arg::with_name("rows")
            .long("rows")
            .value_name("usize")
            .takes_value(true)
            .requires("cols"))
        .arg(Arg::with_name("cols")
            .long("cols")
            .value_name("usize")
            .takes_value(true)
            .requires("rows"))
        .arg(Arg::with_name("little_endian")
            .long("little-endian")
            .help("Raw heightmap and gradient files are little-endian"))
        .arg(Arg::with_name("xres")
            .long("xres")
            .value_name("f32")
            .takes_value(true))
        .arg(Arg::with_name("yres")
            .long("yres")
            .value_name("f32")
            .takes_value(true))
        .arg(Arg::with_name("normal_map")
            .long("normal-map")
            .value_name("PATH")
            .takes_value(true))
        .arg(Arg::with_name("gradient_out")
            .long("gradient-out")
            .value_name("PREFIX")
            .help("Writes PREFIX.dx.f32 and PREFIX.dy.f32")
            .takes_value(true))
        .arg(Arg::with_name("parallel")
            .long("parallel"))
        .get_matches();

    let mut normal_spec = NormalSpec::default();
    if matches.is_present("xres") {
        normal_spec.xres = value_t!(matches, "xres", f32).unwrap_or_else(|e| e.exit());
    }
    if matches.is_present("yres") {
        normal_spec.yres = value_t!(matches, "yres", f32).unwrap_or_else(|e| e.exit());
    }
    let endianness = if matches.is_present("little_endian") {
        Endianness::Little
    } else {
        Endianness::Big
    };
    let operator = GradientOperator::new().parallel(matches.is_present("parallel"));

    let input = matches.value_of("input").ok_or("Missing heightmap path.")?;
    let heightmap = if matches.is_present("rows") {
        let rows = value_t!(matches, "rows", usize).unwrap_or_else(|e| e.exit());
        let cols = value_t!(matches, "cols", usize).unwrap_or_else(|e| e.exit());
        info!("Loading {}x{} raw heightmap from {}", rows, cols, input);
        Heightmap::from_raw_f32(input, rows, cols, endianness)?
    } else {
        info!("Loading heightmap image from {}", input);
        Heightmap::from_image(input)?
    };
    if let Err(err) = heightmap.validate_terrain_size() {
        warn!("{}", err);
    }

    let gradient = heightmap.gradient(&operator)?;
    let (dx_min, dx_max) = extent(gradient.dx.iter());
    let (dy_min, dy_max) = extent(gradient.dy.iter());
    let (_, steepest) = extent(gradient.magnitude().iter());
    info!("dx in [{}, {}], dy in [{}, {}], steepest slope {}",
          dx_min,
          dx_max,
          dy_min,
          dy_max,
          steepest);

    if let Some(prefix) = matches.value_of("gradient_out") {
        write_raw_f32(format!("{}.dx.f32", prefix), gradient.dx.view(), endianness)?;
        write_raw_f32(format!("{}.dy.f32", prefix), gradient.dy.view(), endianness)?;
        info!("Wrote gradient to {}.dx.f32 and {}.dy.f32", prefix, prefix);
    }

    if let Some(path) = matches.value_of("normal_map") {
        info!("Generating normal map with {:?}", normal_spec);
        let normals = SurfaceNormals::from_heights(heightmap.view(), &normal_spec, &operator)?;
        normals.save_normal_map(path)?;
    }
    Ok(())
}

fn main() {
    let env = env_logger::Env::default().default_filter_or("info");
    if let Err(err) = env_logger::Builder::from_env(env).try_init() {
        println!("Could not initialize logger, exiting: {}", err);
    } else if let Err(err) = start_app() {
        error!("{}", err);
        for cause in err.iter().skip(1) {
            error!("caused by: {}", cause);
        }
        ::std::process::exit(1);
    }
}
