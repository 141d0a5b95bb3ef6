//! Maze Probe
//!
//! Builds a small corridor maze in memory and exercises the spatial core
//! against it:
//! - BVH construction over the wall and floor triangles
//! - Random visibility rays from the player's eye, checked against a
//!   brute-force scan and timed
//! - Player-vs-wall and pickup checks while walking down a corridor
//!
//! Usage: `maze_probe [config.toml|config.ron]`

use maze_spatial::config::{Config, ConfigError, SpatialConfig};
use maze_spatial::foundation::logging::{self, debug, info, warn};
use maze_spatial::foundation::math::Vec3;
use maze_spatial::physics::{BoundingSphere, Collider, Ray, RayHit, Triangle};
use maze_spatial::spatial::{Bvh, MeshError, TraversalStats, TriangleMesh};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

// Maze layout, one character per cell: '#' wall, '.' corridor, 'k' key
const LAYOUT: [&str; 7] = [
    "#########",
    "#..k#...#",
    "#.#.#.#.#",
    "#.#...#.#",
    "#.#####.#",
    "#.......#",
    "#########",
];

// Cell geometry
const CELL_SIZE: f32 = 2.0;
const WALL_HEIGHT: f32 = 3.0;

// Player
const PLAYER_RADIUS: f32 = 0.3;
const PLAYER_HEIGHT: f32 = 1.8;
const EYE_HEIGHT: f32 = 1.6;
const WALK_STEP: f32 = 0.25;
const PICKUP_REACH: f32 = 0.75;

// Ray sampling
const RAY_COUNT: usize = 2000;
const RAY_SEED: u64 = 0x6d61_7a65;

#[derive(thiserror::Error, Debug)]
enum ProbeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Mesh(#[from] MeshError),
}

/// Cell center on the floor plane
fn cell_center(row: usize, col: usize) -> Vec3 {
    Vec3::new(
        (col as f32 + 0.5) * CELL_SIZE,
        0.0,
        (row as f32 + 0.5) * CELL_SIZE,
    )
}

fn cells(marker: char) -> impl Iterator<Item = (usize, usize)> {
    LAYOUT.iter().enumerate().flat_map(move |(row, line)| {
        line.chars()
            .enumerate()
            .filter(move |&(_, c)| c == marker)
            .map(move |(col, _)| (row, col))
    })
}

/// Two triangles of a quad, split along the `a`-`c` diagonal
fn split_quad([a, b, c, d]: [u32; 4]) -> [[u32; 3]; 2] {
    [[a, b, c], [a, c, d]]
}

/// Wall blocks as quads (four sides and a lid) plus one floor quad
fn build_maze_mesh() -> Result<TriangleMesh, MeshError> {
    let mut vertices = Vec::new();
    let mut faces: Vec<[u32; 3]> = Vec::new();

    for (row, col) in cells('#') {
        let base = vertices.len() as u32;
        let x0 = col as f32 * CELL_SIZE;
        let z0 = row as f32 * CELL_SIZE;
        let (x1, z1) = (x0 + CELL_SIZE, z0 + CELL_SIZE);

        vertices.extend_from_slice(&[
            Vec3::new(x0, 0.0, z0),
            Vec3::new(x1, 0.0, z0),
            Vec3::new(x1, 0.0, z1),
            Vec3::new(x0, 0.0, z1),
            Vec3::new(x0, WALL_HEIGHT, z0),
            Vec3::new(x1, WALL_HEIGHT, z0),
            Vec3::new(x1, WALL_HEIGHT, z1),
            Vec3::new(x0, WALL_HEIGHT, z1),
        ]);

        for quad in [[0, 1, 5, 4], [1, 2, 6, 5], [2, 3, 7, 6], [3, 0, 4, 7], [4, 5, 6, 7]] {
            faces.extend(split_quad(quad.map(|i| base + i)));
        }
    }

    let width = LAYOUT[0].len() as f32 * CELL_SIZE;
    let depth = LAYOUT.len() as f32 * CELL_SIZE;
    let base = vertices.len() as u32;
    vertices.extend_from_slice(&[
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, depth),
        Vec3::new(width, 0.0, depth),
        Vec3::new(width, 0.0, 0.0),
    ]);
    faces.extend(split_quad([base, base + 1, base + 2, base + 3]));

    TriangleMesh::from_faces(&vertices, &faces)
}

fn build_wall_colliders() -> Vec<Collider> {
    cells('#')
        .map(|(row, col)| {
            Collider::wall(
                cell_center(row, col),
                Vec3::new(CELL_SIZE, WALL_HEIGHT, CELL_SIZE),
            )
        })
        .collect()
}

/// Nearest hit by testing every triangle
fn brute_force_hit(triangles: &[Triangle], ray: &Ray) -> Option<RayHit> {
    triangles
        .iter()
        .enumerate()
        .fold(None, |closest, (index, triangle)| RayHit::nearest(closest, triangle.hit(ray, index)))
}

fn probe_visibility(bvh: &Bvh, eye: Vec3) {
    let mut rng = StdRng::seed_from_u64(RAY_SEED);
    let rays: Vec<Ray> = (0..RAY_COUNT)
        .map(|_| {
            let heading = rng.gen_range(0.0..std::f32::consts::TAU);
            let pitch = rng.gen_range(-0.4..0.4_f32);
            Ray::normalized(eye, Vec3::new(heading.cos(), pitch.sin(), heading.sin()))
        })
        .collect();

    let mut stats = TraversalStats::default();
    let mut hits = Vec::with_capacity(rays.len());
    let start = Instant::now();
    for ray in &rays {
        hits.push(bvh.intersect_ray_with_stats(ray, &mut stats));
    }
    let bvh_time = start.elapsed();

    let start = Instant::now();
    let expected: Vec<_> = rays.iter().map(|ray| brute_force_hit(bvh.triangles(), ray)).collect();
    let brute_time = start.elapsed();

    let mismatches = hits
        .iter()
        .zip(&expected)
        .filter(|(a, b)| a.map(|h| h.triangle_index) != b.map(|h| h.triangle_index))
        .count();
    if mismatches > 0 {
        warn!("{} of {} rays disagree with the brute-force scan", mismatches, rays.len());
    }

    let hit_distances: Vec<f32> = hits.iter().flatten().map(|h| h.distance).collect();
    let mean_distance = if hit_distances.is_empty() {
        0.0
    } else {
        hit_distances.iter().sum::<f32>() / hit_distances.len() as f32
    };

    info!(
        "Cast {} rays: {} hits, mean distance {:.2}",
        rays.len(),
        hit_distances.len(),
        mean_distance
    );
    info!(
        "Per ray: {:.1} nodes visited, {:.1} pruned, {:.1} triangle tests (of {})",
        stats.nodes_visited as f32 / rays.len() as f32,
        stats.nodes_pruned as f32 / rays.len() as f32,
        stats.triangle_tests as f32 / rays.len() as f32,
        bvh.triangles().len()
    );
    info!("BVH queries took {:?}, brute force took {:?}", bvh_time, brute_time);
}

fn probe_walk(walls: &[Collider], start: Vec3) {
    let keys: Vec<Collider> = cells('k')
        .map(|(row, col)| Collider::pickup(cell_center(row, col)))
        .collect();
    let mut player = Collider::player(start, PLAYER_RADIUS, PLAYER_HEIGHT);

    // Walk east along the top corridor until something blocks the way.
    loop {
        let next = player.position + Vec3::new(WALK_STEP, 0.0, 0.0);
        let candidate = Collider::player(next, PLAYER_RADIUS, PLAYER_HEIGHT);
        if let Some(wall) = walls.iter().find(|wall| candidate.overlaps(wall)) {
            info!(
                "Player blocked at x = {:.2} by wall at ({:.1}, {:.1})",
                player.position.x, wall.position.x, wall.position.z
            );
            break;
        }
        player.set_position(next);

        let reach = BoundingSphere::new(player.position, PICKUP_REACH);
        if keys.iter().any(|key| key.overlaps_sphere(&reach)) {
            info!("Key within reach at x = {:.2}", player.position.x);
        }
    }

    let eye = player.position + Vec3::new(0.0, EYE_HEIGHT, 0.0);
    let inside = walls.iter().filter(|wall| wall.contains_point(eye)).count();
    debug!("Eye point inside {} wall boxes", inside);

    let forward = Ray::new(eye, Vec3::new(1.0, 0.0, 0.0));
    let ahead = walls
        .iter()
        .filter_map(|wall| wall.intersect_ray(&forward))
        .min_by(|a, b| a.distance.total_cmp(&b.distance));
    if let Some(hit) = ahead {
        info!("Nearest wall box ahead at distance {:.2}", hit.distance);
    }
}

fn run() -> Result<(), ProbeError> {
    let config = match std::env::args().nth(1) {
        Some(path) => SpatialConfig::load_from_file(&path)?,
        None => SpatialConfig::default(),
    };
    config.validate()?;
    logging::init_with_level(&config.log_level);
    debug!("Using {:?}", config);

    let mesh = build_maze_mesh()?;
    let build_start = Instant::now();
    let bvh = Bvh::from_mesh(mesh, config.bvh);
    let stats = bvh.stats();
    info!(
        "Built BVH in {:?}: {} triangles, {} nodes, {} leaves, depth {}",
        build_start.elapsed(),
        stats.triangle_count,
        stats.node_count,
        stats.leaf_count,
        stats.max_depth
    );

    let start = cell_center(1, 1);
    probe_visibility(&bvh, start + Vec3::new(0.0, EYE_HEIGHT, 0.0));
    probe_walk(&build_wall_colliders(), start);

    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("maze_probe: {e}");
        std::process::exit(1);
    }
}
