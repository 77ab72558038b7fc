//! Flythrough demo: a camera approaches a LOD boundary and reports every
//! state and level change.
//!
//! Usage: cargo run --bin flythrough -- [OPTIONS]
//!
//! Options:
//!   --frames <N>      Number of frames to simulate (default: 120)
//!   --start <METERS>  Starting distance from the object (default: 1800)
//!   --end <METERS>    Final distance from the object (default: 2)
//!   --config <PATH>   Boundary config JSON (default: 3 levels around a 2m box)
//!
//! Run with RUST_LOG=debug for per-frame traversal summaries.

use std::path::PathBuf;

use glam::DVec3;
use log::{error, info};

use rktri_bounds::core::{logging, Result};
use rktri_bounds::scene::{
    BoundaryConfig, BoundaryEvent, Extents, SceneGraph, ViewConfig, ViewState,
};

fn main() {
    logging::init();

    let args: Vec<String> = std::env::args().collect();
    if let Err(e) = run(&args) {
        error!("flythrough failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let frames = parse_usize_arg(args, "--frames").unwrap_or(120).max(2);
    let start = parse_f64_arg(args, "--start").unwrap_or(1800.0);
    let end = parse_f64_arg(args, "--end").unwrap_or(2.0);

    let config = match parse_str_arg(args, "--config") {
        Some(path) => BoundaryConfig::load_sync(&PathBuf::from(path))?,
        None => BoundaryConfig::default()
            .with_extents(Extents::new(DVec3::splat(-1.0), DVec3::splat(1.0)))
            .with_levels(vec![20.0, 150.0, 600.0]),
    };
    let levels = config.levels.clone().unwrap_or_default();

    // Build the scene: one boundary at the origin with a shape per level
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let lod = graph.add_boundary(root, "lod", &BoundaryConfig {
        levels: None,
        ..config.clone()
    })?;
    let bounds = config.extents().to_aabb();
    let shape_count = levels.len().max(1);
    for i in 0..shape_count {
        graph.add_shape(lod, format!("level_{}", i), bounds)?;
    }
    graph.configure_boundary(lod, &config)?;

    graph.boundary_mut(lod)?.subscribe_all(|event| match event {
        BoundaryEvent::StateChanged { previous, current } => {
            info!("state-changed: {:?} -> {:?}", previous, current);
        }
        BoundaryEvent::LodSelected { .. } => {
            let (previous, current) = event.as_ints();
            info!("lod-selected: {} -> {}", previous, current);
        }
    });

    let view_config = ViewConfig::default();
    info!(
        "Flying from {}m to {}m over {} frames (outer {}m, inner {}m)",
        start, end, frames, view_config.outer_radius, view_config.inner_radius
    );

    let mut total_rendered = 0;
    for frame in 0..frames {
        let t = frame as f64 / (frames - 1) as f64;
        let distance = start + (end - start) * t;
        let eye = DVec3::new(0.0, 0.0, distance);
        let view = ViewState::look_at(&view_config, eye, DVec3::ZERO);

        let entries = graph.traverse(&view);
        total_rendered += entries.len();
    }

    let boundary = graph.boundary(lod)?;
    info!(
        "Done: final state {:?}, level {:?}, {} shapes rendered in total",
        boundary.state(),
        boundary.selected_level(),
        total_rendered
    );
    Ok(())
}

fn parse_f64_arg(args: &[String], flag: &str) -> Option<f64> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_usize_arg(args: &[String], flag: &str) -> Option<usize> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
}

fn parse_str_arg(args: &[String], flag: &str) -> Option<String> {
    args.iter().position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}
