// src/layout/helix.rs

use super::LanguageColors;
use crate::model::Repository;
use crate::scene::*;
use image::Rgb;
use std::f32::consts::PI;

/// Repositories beyond this are left out of the helix
pub const MAX_REPOS: usize = 50;

const HELIX_HEIGHT: f32 = 30.0;
const HELIX_RADIUS: f32 = 5.0;
const NUCLEOTIDES_PER_TURN: f32 = 10.0;
const TURNS: f32 = 3.0;

/// 0.005 rad per frame at 60 fps
pub const SPIN: f32 = 0.3;

const BACKGROUND: Rgb<u8> = Rgb([0x11, 0x18, 0x27]);
const FALLBACK: Rgb<u8> = Rgb([0x34, 0x98, 0xdb]);
const STRAND_A_COLOR: Rgb<u8> = Rgb([0x24, 0x63, 0xeb]);
const STRAND_B_COLOR: Rgb<u8> = Rgb([0x16, 0xa3, 0x4a]);
const NUCLEOTIDE_RADIUS: f32 = 0.4;
const RUNG_RADIUS: f32 = 0.1;
const TUBE_RADIUS: f32 = 0.2;
const SAMPLES_PER_SEGMENT: usize = 4;

/// Points on both strands, index-aligned: `b[i]` is `a[i]` turned by π about the axis
pub fn strand_points(capped: usize) -> (Vec<Vec3>, Vec<Vec3>) {
    let per_strand = capped.div_ceil(2);
    let step = HELIX_HEIGHT / (capped as f32 / 2.0);

    (0..per_strand)
        .map(|i| {
            let angle = (i as f32 / NUCLEOTIDES_PER_TURN) * 2.0 * PI * TURNS;
            let height = i as f32 * step - HELIX_HEIGHT / 2.0;
            let a = Vec3::new(angle.cos() * HELIX_RADIUS, height, angle.sin() * HELIX_RADIUS);
            let b = Vec3::new(
                (angle + PI).cos() * HELIX_RADIUS,
                height,
                (angle + PI).sin() * HELIX_RADIUS,
            );
            (a, b)
        })
        .unzip()
}

/// The repository on each side of every strand index. The first half of the
/// capped list forms strand A and the rest strand B; with an odd count the
/// slot strand B lacks repeats strand A's repository.
pub fn strand_pairs(repos: &[Repository]) -> Vec<(&Repository, &Repository)> {
    let capped = &repos[..repos.len().min(MAX_REPOS)];
    let per_strand = capped.len().div_ceil(2);
    (0..per_strand)
        .map(|i| (&capped[i], capped.get(i + per_strand).unwrap_or(&capped[i])))
        .collect()
}

/// Uniform Catmull-Rom spline through `points`, passing through each in order
pub fn catmull_rom(points: &[Vec3], samples_per_segment: usize) -> Vec<Vec3> {
    if points.len() < 2 || samples_per_segment == 0 {
        return points.to_vec();
    }
    let n = points.len();
    let mut path = Vec::with_capacity((n - 1) * samples_per_segment + 1);
    for i in 0..n - 1 {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(n - 1)];
        for s in 0..samples_per_segment {
            let t = s as f32 / samples_per_segment as f32;
            path.push(catmull_rom_point(p0, p1, p2, p3, t));
        }
    }
    path.push(points[n - 1]);
    path
}

fn catmull_rom_point(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f32) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    (p1 * 2.0
        + (p2 - p0) * t
        + (p0 * 2.0 - p1 * 5.0 + p2 * 4.0 - p3) * t2
        + (p1 * 3.0 - p0 - p2 * 3.0 + p3) * t3)
        * 0.5
}

pub fn layout_helix(repos: &[Repository], colors: &LanguageColors) -> Scene {
    let pairs = strand_pairs(repos);
    let (strand_a, strand_b) = strand_points(repos.len().min(MAX_REPOS));
    let mut group = Group::new(Layer::Helix, SPIN);

    // Every height step but the last carries a rung
    let rungs = pairs.len().saturating_sub(1);
    for (i, (repo_a, repo_b)) in pairs.iter().take(rungs).enumerate() {
        let (a, b) = (strand_a[i], strand_b[i]);
        let color_a = colors.for_repo(repo_a, FALLBACK);
        let color_b = colors.for_repo(repo_b, FALLBACK);
        group.primitives.push(Primitive::Sphere {
            center: a,
            radius: NUCLEOTIDE_RADIUS,
            color: color_a,
            glow: None,
        });
        group.primitives.push(Primitive::Sphere {
            center: b,
            radius: NUCLEOTIDE_RADIUS,
            color: color_b,
            glow: None,
        });
        group.primitives.push(Primitive::Rung {
            from: a,
            to: b,
            from_color: color_a,
            to_color: color_b,
            radius: RUNG_RADIUS,
        });
    }

    for (points, color) in [(&strand_a, STRAND_A_COLOR), (&strand_b, STRAND_B_COLOR)] {
        if points.len() >= 2 {
            group.primitives.push(Primitive::Tube {
                path: catmull_rom(points, SAMPLES_PER_SEGMENT),
                radius: TUBE_RADIUS,
                color,
                opacity: 0.8,
            });
        }
    }

    Scene {
        background: BACKGROUND,
        projection: Projection::Perspective { camera_distance: 30.0, fov_degrees: 75.0 },
        groups: vec![group],
    }
}
