use std::error::Error;
use std::fs;
use std::time::Instant;

use clap::Parser;

use frontier_map::cache::ChunkCache;
use frontier_map::region::RegionQuery;
use frontier_map::registry::{ResourceRegistry, TerrainRegistry};
use frontier_map::seeds::WorldSeeds;
use frontier_map::storage::{ChunkStore, FsBlobStore};
use frontier_map::world::{Layer, World, WorldConfig};

#[derive(Parser, Debug)]
#[command(name = "frontier_map")]
#[command(about = "Generate and query a seeded resource/terrain world")]
struct Args {
    /// Width of the world in cells
    #[arg(short = 'W', long, default_value = "512")]
    width: usize,

    /// Height of the world in cells
    #[arg(short = 'H', long, default_value = "512")]
    height: usize,

    /// Minimum distance between resource deposits
    #[arg(short = 'r', long, default_value = "5.0")]
    min_distance: f64,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Chunk edge length for persistence
    #[arg(long, default_value = "64")]
    chunk_size: usize,

    /// Directory for persisted chunks
    #[arg(long, default_value = "chunks")]
    out_dir: String,

    /// Resource registry JSON file (standard table if not specified)
    #[arg(long)]
    resources: Option<String>,

    /// Terrain registry JSON file (overworld key if not specified)
    #[arg(long)]
    terrain: Option<String>,

    /// Skip generation and query an existing chunk store
    #[arg(long)]
    query_only: bool,

    /// Query center x coordinate
    #[arg(long)]
    query_x: Option<usize>,

    /// Query center y coordinate
    #[arg(long)]
    query_y: Option<usize>,

    /// Query radius in cells
    #[arg(long, default_value = "10")]
    query_radius: usize,

    /// Layer to print (0-3 = stages, 4 = terrain; all layers if omitted)
    #[arg(long)]
    layer: Option<usize>,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let seed = args.seed.unwrap_or_else(rand::random);
    let seeds = WorldSeeds::from_master(seed);

    let resources = match &args.resources {
        Some(path) => ResourceRegistry::from_json(&fs::read_to_string(path)?)?,
        None => ResourceRegistry::standard(),
    };
    let terrain = match &args.terrain {
        Some(path) => TerrainRegistry::from_json(&fs::read_to_string(path)?)?,
        None => TerrainRegistry::overworld(),
    };

    let store = ChunkStore::new(FsBlobStore::new(&args.out_dir, seed));

    if !args.query_only {
        println!("Generating world with seed: {}", seed);
        println!("World size: {}x{}", args.width, args.height);
        println!(
            "Registries: {} resources, {} terrain bands",
            resources.len(),
            terrain.len()
        );

        let mut config = WorldConfig::new(args.width, args.height, args.min_distance);
        config.chunk_size = args.chunk_size;

        let world = World::generate(config, resources, terrain, seeds)?;
        println!("{}", world.stats().summary());

        println!("Composing world grid...");
        let start = Instant::now();
        let grid = world.compose();
        println!("Composed {} cells in {}ms", grid.width * grid.height, start.elapsed().as_millis());

        println!("Writing chunks to {}/world_{}...", args.out_dir, seed);
        let start = Instant::now();
        let written = store.write_all(&grid, args.chunk_size)?;
        println!("Wrote {} chunks in {}ms", written, start.elapsed().as_millis());
    }

    if args.query_only {
        let origins = store.list_origins()?;
        println!("Store {}/world_{} holds {} chunks", args.out_dir, seed, origins.len());
    }

    if let (Some(qx), Some(qy)) = (args.query_x, args.query_y) {
        let query = RegionQuery::new(&store, args.width, args.height, args.chunk_size);

        match args.layer {
            Some(idx) => {
                let layer = Layer::from_index(idx)
                    .ok_or_else(|| format!("layer must be 0-4, got {}", idx))?;
                let region = query.get_region_layer(qx, qy, args.query_radius, layer)?;
                for row in region.rows() {
                    let line: Vec<String> = row.iter().map(|id| id.to_string()).collect();
                    println!("{}", line.join(" "));
                }
            }
            None => {
                let mut cache = ChunkCache::new();
                let region = query.get_region_cached(&mut cache, qx, qy, args.query_radius)?;
                for row in region.rows() {
                    let line: Vec<String> = row
                        .iter()
                        .map(|cell| {
                            cell.iter()
                                .map(|id| id.to_string())
                                .collect::<Vec<_>>()
                                .join(",")
                        })
                        .collect();
                    println!("{}", line.join(" "));
                }
                println!("Cache: {}", cache.stats().summary());
            }
        }
    }

    Ok(())
}
