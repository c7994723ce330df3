//! mesh-denoise CLI - subdivision and bilateral denoising from the command line.
//!
//! Usage: mesh-denoise <COMMAND> [OPTIONS] <INPUT> [OUTPUT]
//!
//! Set `RUST_LOG=info` (or `debug`) to see per-pass diagnostics.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;

use mesh_denoise::algo::adjacency::{edge_count, NeighborSearch};
use mesh_denoise::algo::denoise::{bilateral_filter, BilateralOptions};
use mesh_denoise::algo::noise::{add_noise, add_normal_noise, NoiseOptions};
use mesh_denoise::algo::normals::triangle_frames;
use mesh_denoise::algo::subdivide::{self, SubdivideOptions};
use mesh_denoise::io;
use mesh_denoise::mesh::TriangleMesh;

#[derive(Parser)]
#[command(name = "mesh-denoise")]
#[command(author, version, about = "Mesh subdivision and bilateral denoising CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display mesh information
    Info {
        /// Input mesh file
        input: PathBuf,
    },

    /// Subdivide a mesh
    Subdivide {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Subdivision method
        #[arg(short, long, value_enum, default_value = "loop")]
        method: SubdivideMethod,

        /// Number of subdivision iterations
        #[arg(short, long, default_value = "1")]
        iterations: usize,
    },

    /// Optionally add noise, then apply the bilateral filter
    Denoise {
        /// Input mesh file
        input: PathBuf,

        /// Output mesh file
        output: PathBuf,

        /// Noise injected before filtering
        #[arg(short, long, value_enum, default_value = "isotropic")]
        noise: NoiseKind,

        /// Noise samples are integers in [-half_range, half_range)
        #[arg(long, default_value = "50")]
        noise_half_range: i32,

        /// Multiplier applied to each noise sample
        #[arg(long, default_value = "0.0001")]
        noise_scale: f64,

        /// Feature-preservation scale
        #[arg(long, default_value = "0.001")]
        sigma_s: f64,

        /// Spatial scale (default: estimated from a random vertex)
        #[arg(long)]
        sigma_c: Option<f64>,

        /// Number of filtering sweeps
        #[arg(short, long, default_value = "5")]
        iterations: usize,

        /// RNG seed (default: seeded from the OS)
        #[arg(long)]
        seed: Option<u64>,

        /// Use a uniform grid for neighbourhood queries
        #[arg(long)]
        grid: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum SubdivideMethod {
    /// Midpoint split, vertices keep their positions
    Linear,
    /// Loop subdivision (approximating, smooth limit surface)
    Loop,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum NoiseKind {
    /// Filter the input as-is
    None,
    /// Independent noise on every coordinate
    Isotropic,
    /// Noise along each vertex normal
    Normal,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info { input } => {
            cmd_info(&input)?;
        }

        Commands::Subdivide {
            input,
            output,
            method,
            iterations,
        } => {
            cmd_subdivide(&input, &output, method, iterations)?;
        }

        Commands::Denoise {
            input,
            output,
            noise,
            noise_half_range,
            noise_scale,
            sigma_s,
            sigma_c,
            iterations,
            seed,
            grid,
        } => {
            let noise_options = NoiseOptions::new(noise_half_range, noise_scale)?;
            let mut options = BilateralOptions::new(iterations, sigma_s)?;
            if let Some(sigma_c) = sigma_c {
                options = options.with_sigma_c(sigma_c)?;
            }
            if grid {
                options = options.with_search(NeighborSearch::Grid);
            }
            cmd_denoise(&input, &output, noise, &noise_options, &options, seed)?;
        }
    }

    Ok(())
}

fn cmd_info(input: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let mesh = io::load(input)?;

    println!("File: {}", input.display());
    println!("Vertices: {}", mesh.num_vertices());
    println!("Triangles: {}", mesh.num_triangles());
    println!("Edges: {}", edge_count(mesh.triangles()));

    let frames = triangle_frames(mesh.positions(), mesh.triangles());
    let total_area: f64 = frames.areas.iter().sum();
    let degenerate = frames.areas.iter().filter(|&&a| a == 0.0).count();
    println!("Surface area: {:.6}", total_area);
    if degenerate > 0 {
        println!("Degenerate triangles: {}", degenerate);
    }

    if let Some((center, radius)) = mesh.bounding_sphere() {
        println!(
            "Bounding sphere: center ({:.3}, {:.3}, {:.3}), radius {:.3}",
            center.x, center.y, center.z, radius
        );
    }

    Ok(())
}

fn cmd_subdivide(
    input: &PathBuf,
    output: &PathBuf,
    method: SubdivideMethod,
    iterations: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh = io::load(input)?;

    println!("Loaded: {} vertices, {} triangles", mesh.num_vertices(), mesh.num_triangles());

    let options = SubdivideOptions::new(iterations);

    let start = Instant::now();
    match method {
        SubdivideMethod::Linear => {
            println!("Applying linear subdivision ({} iterations)...", iterations);
            subdivide::linear_subdivide(&mut mesh, &options);
        }
        SubdivideMethod::Loop => {
            println!("Applying Loop subdivision ({} iterations)...", iterations);
            subdivide::loop_subdivide(&mut mesh, &options);
        }
    }
    let elapsed = start.elapsed();

    println!("Result: {} vertices, {} triangles", mesh.num_vertices(), mesh.num_triangles());
    io::save(&mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}

fn cmd_denoise(
    input: &PathBuf,
    output: &PathBuf,
    noise: NoiseKind,
    noise_options: &NoiseOptions,
    options: &BilateralOptions,
    seed: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut mesh: TriangleMesh = io::load(input)?;

    println!("Loaded: {} vertices, {} triangles", mesh.num_vertices(), mesh.num_triangles());

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    match noise {
        NoiseKind::None => {}
        NoiseKind::Isotropic => {
            println!("Adding isotropic noise...");
            add_noise(&mut mesh, noise_options, &mut rng);
        }
        NoiseKind::Normal => {
            println!("Adding normal noise...");
            mesh.capture_ground_truth();
            add_normal_noise(&mut mesh, noise_options, &mut rng);
        }
    }

    println!(
        "Applying bilateral filter ({} iterations, sigma_s={})...",
        options.iterations(),
        options.sigma_s()
    );
    let start = Instant::now();
    let report = bilateral_filter(&mut mesh, options, &mut rng);
    let elapsed = start.elapsed();

    println!("sigma_c: {:.6}", report.sigma_c);
    if report.discarded_updates > 0 {
        println!("Discarded updates: {}", report.discarded_updates);
    }
    if let Some(error) = report.error {
        println!("Error before filtering: {:.6}", error.noisy);
        println!("Error after filtering:  {:.6}", error.filtered);
        if error.skipped > 0 {
            println!("Skipped NaN vertices: {}", error.skipped);
        }
    }

    io::save(&mesh, output)?;
    println!("Saved: {} ({:.2?})", output.display(), elapsed);

    Ok(())
}
