use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Args, Parser, Subcommand};

use skiff_build::{MapBuildConfig, MapBuilder, ShipPlan};
use skiff_layout::{Layout, LayoutMetadata, apply_layout, save_world};
use skiff_mesh_cpu::{mesh_chunk, write_mesh_file};
use skiff_prefab::{Connector, Prefab, PrefabEntity, PrefabLibrary};
use skiff_voxel::{Cell, Face, Palette, PaletteConfig, VoxelCoord, VoxelType, Yaw};
use skiff_world::World;

#[derive(Parser, Debug)]
#[command(
    name = "skiff",
    version,
    about = "Skiff voxel world tools",
    propagate_version = true
)]
struct Cli {
    /// Log to a file; optional path (defaults to skiff.log if omitted)
    #[arg(long, global = true, num_args = 0..=1, value_name = "PATH", default_missing_value = "skiff.log")]
    log_file: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a ship plan into a layout file
    Build(BuildArgs),

    /// Report the contents of a layout file
    Info(InfoArgs),

    /// Mesh every chunk of a layout into VMSH files
    Mesh(MeshArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Ship plan path (JSON)
    #[arg(long, value_name = "PATH")]
    plan: PathBuf,

    /// Build dimension overrides (TOML); defaults apply when omitted
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output layout path
    #[arg(long, value_name = "PATH", default_value = "layout.json")]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct InfoArgs {
    /// Layout path (JSON)
    #[arg(value_name = "LAYOUT")]
    path: PathBuf,
}

#[derive(Args, Debug)]
struct MeshArgs {
    /// Layout path (JSON)
    #[arg(value_name = "LAYOUT")]
    path: PathBuf,

    /// Directory for the per-chunk .vmsh files
    #[arg(long, value_name = "DIR", default_value = "meshes")]
    out_dir: PathBuf,

    /// Palette colour overrides (TOML)
    #[arg(long, value_name = "PATH")]
    palette: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging: to file if --log-file used; else env_logger to stderr
    if let Some(path) = cli.log_file.clone() {
        let level = match std::env::var("RUST_LOG")
            .ok()
            .unwrap_or_else(|| "info".to_string())
            .to_lowercase()
            .as_str()
        {
            "trace" => simplelog::LevelFilter::Trace,
            "debug" => simplelog::LevelFilter::Debug,
            "warn" => simplelog::LevelFilter::Warn,
            "error" => simplelog::LevelFilter::Error,
            _ => simplelog::LevelFilter::Info,
        };
        let config = simplelog::ConfigBuilder::new()
            .set_target_level(simplelog::LevelFilter::Info)
            .build();
        match fs::File::create(&path) {
            Ok(file) => {
                let _ = simplelog::WriteLogger::init(level, config, file);
            }
            Err(e) => {
                eprintln!(
                    "Failed to open log file {}: {}. Falling back to stderr.",
                    path, e
                );
                env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                    .init();
            }
        }
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let result = match cli.command {
        Command::Build(args) => run_build(args),
        Command::Info(args) => run_info(args),
        Command::Mesh(args) => run_mesh(args),
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(2);
    }
}

fn run_build(args: BuildArgs) -> Result<(), Box<dyn Error>> {
    let plan = ShipPlan::from_path(&args.plan)?;
    let config = match &args.config {
        Some(path) => MapBuildConfig::from_path(path)?,
        None => MapBuildConfig::default(),
    };
    let library = stock_library();

    let mut world = World::new();
    let built = MapBuilder::new(config).build(&mut world, &library, &plan);
    if built.skipped_assets > 0 || built.skipped_entities > 0 {
        log::warn!(
            "build skipped {} assets and {} entities",
            built.skipped_assets,
            built.skipped_entities
        );
    }
    world.prune_empty_chunks();

    let now = iso8601_utc_now();
    let layout = save_world(
        &world,
        plan.name.clone(),
        built.rooms,
        built.entities,
        built.prefab_instances,
        LayoutMetadata {
            created_at: now.clone(),
            modified_at: now,
        },
    );
    layout.write_to_path(&args.out)?;
    log::info!(
        "built {:?}: {} chunks, {} cells -> {:?}",
        plan.name,
        world.chunk_count(),
        world.total_voxels(),
        args.out
    );
    println!(
        "{}: {} rooms, {} entities, {} chunks, {} cells",
        plan.name,
        layout.rooms.len(),
        layout.entities.len(),
        layout.chunks.len(),
        world.total_voxels()
    );
    Ok(())
}

fn run_info(args: InfoArgs) -> Result<(), Box<dyn Error>> {
    let layout = Layout::read_from_path(&args.path)?;
    let mut world = World::new();
    let report = apply_layout(&mut world, &layout);

    println!("name:      {}", layout.name);
    println!("version:   {}", layout.version);
    println!(
        "bounds:    ({},{},{}) .. ({},{},{})",
        layout.bounds.min.x,
        layout.bounds.min.y,
        layout.bounds.min.z,
        layout.bounds.max.x,
        layout.bounds.max.y,
        layout.bounds.max.z
    );
    println!(
        "chunks:    {} ({} failed)",
        layout.chunks.len(),
        report.chunks_failed
    );
    println!("cells:     {}", world.total_voxels());
    println!("rooms:     {}", layout.rooms.len());
    println!("entities:  {}", layout.entities.len());
    println!("instances: {}", layout.prefab_instances.len());
    println!("modified:  {}", layout.metadata.modified_at);
    if report.degraded() {
        println!(
            "WARNING: layout is degraded; {} chunks failed to decode",
            report.chunks_failed
        );
    }
    Ok(())
}

fn run_mesh(args: MeshArgs) -> Result<(), Box<dyn Error>> {
    let layout = Layout::read_from_path(&args.path)?;
    let mut world = World::new();
    let report = apply_layout(&mut world, &layout);
    if report.degraded() {
        log::warn!(
            "{} chunks failed to decode; meshing the rest",
            report.chunks_failed
        );
    }

    let palette = match &args.palette {
        Some(path) => Palette::from_config(&PaletteConfig::from_path(path)?),
        None => Palette::default(),
    };

    fs::create_dir_all(&args.out_dir)?;
    let mut coords: Vec<_> = world
        .chunks()
        .filter(|(_, c)| !c.is_empty())
        .map(|(cc, _)| *cc)
        .collect();
    coords.sort();

    let mut meshed = 0usize;
    let mut triangles = 0usize;
    for coord in coords {
        if let Some(mesh) = mesh_chunk(&world, coord, &palette) {
            let name = format!("{}_{}_{}.vmsh", coord.cx, coord.cy, coord.cz);
            write_mesh_file(args.out_dir.join(name), &mesh.build)?;
            triangles += mesh.build.triangle_count();
            meshed += 1;
        }
    }
    println!(
        "meshed {} chunks ({} triangles) into {:?}",
        meshed, triangles, args.out_dir
    );
    Ok(())
}

/// Stock prefabs the builder can place without an authoring pipeline:
/// enough to exercise asset instancing from plans.
fn stock_library() -> PrefabLibrary {
    let mut library = PrefabLibrary::new();

    // Wall console: grate housing with a screen face and a terminal entity
    let mut console = Prefab::new("wall_console", "Wall console", "fixtures");
    for y in 0..3 {
        for x in 0..4 {
            console.set_cell(VoxelCoord::new(x, y, 0), Cell::new(VoxelType::MetalGrate, 0));
        }
    }
    for y in 1..3 {
        for x in 1..3 {
            console.set_cell(VoxelCoord::new(x, y, 1), Cell::new(VoxelType::Screen, 0));
        }
    }
    console.entities.push(PrefabEntity {
        id_hint: "terminal".to_string(),
        kind: skiff_layout::EntityKind::Terminal,
        local: VoxelCoord::new(1, 1, 1),
        yaw: Yaw::Deg0,
        status: None,
    });
    console.connectors.push(Connector {
        local: VoxelCoord::new(1, 1, 0),
        direction: Face::NegZ,
        tag: "wall_mount".to_string(),
    });
    library.insert(console);

    // Ceiling vent fan: vent ring around rotating blades
    let mut fan = Prefab::new("vent_fan", "Vent fan", "machinery");
    for z in 0..4 {
        for x in 0..4 {
            let edge = x == 0 || x == 3 || z == 0 || z == 3;
            let ty = if edge {
                VoxelType::Vent
            } else {
                VoxelType::FanBlade
            };
            fan.set_cell(VoxelCoord::new(x, 0, z), Cell::new(ty, 0));
        }
    }
    library.insert(fan);

    // Cargo crate: a solid grate box
    let mut cargo = Prefab::new("cargo_crate", "Cargo crate", "props");
    for z in 0..3 {
        for y in 0..3 {
            for x in 0..3 {
                cargo.set_cell(VoxelCoord::new(x, y, z), Cell::new(VoxelType::MetalGrate, 1));
            }
        }
    }
    library.insert(cargo);

    library
}

/// UTC timestamp without a date-time dependency; layouts only need a stable
/// ISO-8601 string.
fn iso8601_utc_now() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let (year, month, day) = civil_from_days((secs / 86_400) as i64);
    let rem = secs % 86_400;
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        rem / 3600,
        (rem / 60) % 60,
        rem % 60
    )
}

/// Days-since-epoch to civil date (Howard Hinnant's algorithm).
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn civil_dates_are_correct() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(19_723), (2024, 1, 1));
        // Leap day
        assert_eq!(civil_from_days(19_782), (2024, 2, 29));
    }

    #[test]
    fn timestamps_are_iso8601_shaped() {
        let s = iso8601_utc_now();
        assert_eq!(s.len(), 20);
        assert_eq!(&s[4..5], "-");
        assert_eq!(&s[10..11], "T");
        assert!(s.ends_with('Z'));
    }

    #[test]
    fn stock_library_resolves() {
        let library = stock_library();
        assert!(library.get("wall_console").is_some());
        assert!(library.get("vent_fan").is_some());
        assert!(library.get("cargo_crate").is_some());
        assert!(library.get("wall_console").unwrap().voxel_count() > 0);
    }
}
