use criterion::{criterion_group, criterion_main, Criterion, black_box};

use glam::{DMat4, DVec3};

use rktri_bounds::math::Aabb;
use rktri_bounds::scene::{
    BoundaryConfig, Extents, LocalTransform, SceneGraph, ViewConfig, ViewState,
};

/// A grid of LOD boundaries, each with three shapes, spread along -Z.
fn build_grid(side: usize, spacing: f64) -> SceneGraph {
    let mut graph = SceneGraph::new();
    let root = graph.root();
    let config = BoundaryConfig::default()
        .with_extents(Extents::new(DVec3::splat(-1.0), DVec3::splat(1.0)));
    let bounds = Aabb::new(DVec3::splat(-1.0), DVec3::splat(1.0));

    for x in 0..side {
        for z in 0..side {
            let lod = graph.add_boundary(root, "lod", &config).unwrap();
            let pos = DVec3::new(
                (x as f64 - side as f64 * 0.5) * spacing,
                0.0,
                -(z as f64 + 1.0) * spacing,
            );
            graph.set_transform(lod, LocalTransform::from_position(pos)).unwrap();
            for _ in 0..3 {
                graph.add_shape(lod, "shape", bounds).unwrap();
            }
            graph.set_levels(lod, vec![10.0, 100.0, 1000.0]).unwrap();
        }
    }
    graph
}

fn bench_static_camera(c: &mut Criterion) {
    let mut graph = build_grid(32, 40.0);
    let view = ViewState::from_config(&ViewConfig::default(), DMat4::IDENTITY);
    // Warm the caches
    graph.traverse(&view);
    graph.traverse(&view);

    c.bench_function("traverse_1024_static_camera", |b| {
        b.iter(|| graph.traverse(black_box(&view)))
    });
}

fn bench_moving_camera(c: &mut Criterion) {
    let mut graph = build_grid(32, 40.0);
    let config = ViewConfig::default();

    c.bench_function("traverse_1024_moving_camera", |b| {
        let mut frame = 0u32;
        b.iter(|| {
            frame += 1;
            let eye = DVec3::new((frame as f64 * 0.01).sin() * 50.0, 5.0, 0.0);
            let view = ViewState::look_at(&config, eye, eye - DVec3::Z);
            graph.traverse(black_box(&view))
        });
    });
}

fn bench_far_culled(c: &mut Criterion) {
    // Everything beyond the outer radius: only the cheap rejection runs
    let mut graph = build_grid(32, 400.0);
    let view = ViewState::from_config(
        &ViewConfig::default(),
        DMat4::from_translation(DVec3::new(0.0, 0.0, -20_000.0)),
    );

    c.bench_function("traverse_1024_outside_outer", |b| {
        b.iter(|| graph.traverse(black_box(&view)))
    });
}

criterion_group!(benches, bench_static_camera, bench_moving_camera, bench_far_culled);
criterion_main!(benches);
