// src/layout/galaxy.rs

use super::LanguageColors;
use crate::color::from_hsl;
use crate::model::Repository;
use crate::scene::*;
use image::Rgb;
use rand::Rng;
use std::f32::consts::PI;

/// Repositories beyond this are left out of the galaxy
pub const MAX_REPOS: usize = 100;

pub const DUST_COUNT: usize = 1000;
pub const DUST_RADIUS: f32 = 40.0;
const DUST_FLATTEN: f32 = 0.3;
/// Dust hue band in degrees (purple-blue)
pub const DUST_HUE: std::ops::Range<f32> = 216.0..288.0;

const ANGLE_STEP: f32 = 0.3;
const BASE_RADIUS: f32 = 2.0;
const RADIUS_STEP: f32 = 0.2;
const JITTER: f32 = 1.0;

const BASE_STAR_SIZE: f32 = 0.2;
const SIZE_PER_STAR: f32 = 0.05;
/// Upper bound on the star-count contribution to a star's size
pub const STAR_SIZE_CAP: f32 = 1.0;

// Radians per second: 0.005 rad per frame at 60 fps, scaled per layer
const STAR_SPIN: f32 = 0.06;
const DUST_SPIN: f32 = 0.03;

const BACKGROUND: Rgb<u8> = Rgb([0x09, 0x0d, 0x1f]);
const FALLBACK: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
const CORE_COLOR: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);

/// Brightness of the central sphere: 2 + 3 · (0.8 + 0.2 · sin(0.6 t))
pub const CORE_PULSE: Pulse = Pulse { base: 4.4, amplitude: 0.6, frequency: 0.6, phase: 0.0 };

/// Per-star twinkle, phase-shifted by index so stars never pulse in lockstep
pub fn twinkle(index: usize) -> Pulse {
    Pulse { base: 0.7, amplitude: 0.3, frequency: 0.9, phase: index as f32 * 0.5 }
}

/// Saturating in the star count: more stars never render smaller
pub fn star_size(stars: u32) -> f32 {
    BASE_STAR_SIZE + (stars as f32 * SIZE_PER_STAR).min(STAR_SIZE_CAP)
}

/// Position on the expanding spiral, before vertical jitter
pub fn spiral_position(index: usize) -> Vec3 {
    let angle = index as f32 * ANGLE_STEP;
    let radius = BASE_RADIUS + index as f32 * RADIUS_STEP;
    Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
}

fn dust<R: Rng + ?Sized>(rng: &mut R) -> Vec<(Vec3, Rgb<u8>)> {
    (0..DUST_COUNT)
        .map(|_| {
            let radius = rng.gen_range(0.0..DUST_RADIUS);
            let theta = rng.gen_range(0.0..2.0 * PI);
            let phi = rng.gen_range(0.0..2.0 * PI);
            let position = Vec3::new(
                radius * theta.sin() * phi.cos(),
                radius * theta.sin() * phi.sin() * DUST_FLATTEN,
                radius * theta.cos(),
            );
            let color = from_hsl(
                rng.gen_range(DUST_HUE),
                rng.gen_range(0.5..1.0),
                rng.gen_range(0.7..1.0),
            );
            (position, color)
        })
        .collect()
}

/// Stars spiral outward in list order; the dust field and vertical jitter are
/// decorative and drawn from `rng`.
pub fn layout_galaxy<R: Rng + ?Sized>(
    repos: &[Repository],
    colors: &LanguageColors,
    rng: &mut R,
) -> Scene {
    let mut dust_group = Group::new(Layer::Dust, DUST_SPIN);
    dust_group.primitives.push(Primitive::Points {
        points: dust(rng),
        size: 0.05,
        opacity: 0.8,
    });

    let mut stars = Group::new(Layer::Stars, STAR_SPIN);
    for (i, repo) in repos.iter().take(MAX_REPOS).enumerate() {
        let jitter = rng.gen_range(-JITTER..JITTER);
        stars.primitives.push(Primitive::Sphere {
            center: spiral_position(i) + Vec3::new(0.0, jitter, 0.0),
            radius: star_size(repo.star_count),
            color: colors.for_repo(repo, FALLBACK),
            glow: Some(twinkle(i)),
        });
    }

    let mut core = Group::new(Layer::Core, 0.0);
    core.primitives.push(Primitive::Sphere {
        center: Vec3::default(),
        radius: 1.0,
        color: CORE_COLOR,
        glow: Some(CORE_PULSE),
    });

    Scene {
        background: BACKGROUND,
        projection: Projection::Perspective { camera_distance: 25.0, fov_degrees: 75.0 },
        groups: vec![dust_group, stars, core],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::repo;
    use palette::{FromColor, Hsl, Srgb};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn stars_of(scene: &Scene) -> Vec<(Vec3, f32, Rgb<u8>)> {
        scene
            .group(Layer::Stars)
            .unwrap()
            .primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Sphere { center, radius, color, .. } => Some((*center, *radius, *color)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn star_size_is_monotonic_and_capped() {
        let mut previous = 0.0;
        for stars in (0..200).chain([1_000, 100_000, u32::MAX]) {
            let size = star_size(stars);
            assert!(size >= previous);
            assert!(size <= BASE_STAR_SIZE + STAR_SIZE_CAP);
            previous = size;
        }
        assert_eq!(star_size(0), BASE_STAR_SIZE);
    }

    #[test]
    fn stars_follow_spiral_with_bounded_jitter() {
        let repos: Vec<_> = (0..120).map(|i| repo(i, &format!("r{i}"), i as u32, None)).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let scene = layout_galaxy(&repos, &LanguageColors::default(), &mut rng);
        let stars = stars_of(&scene);
        assert_eq!(stars.len(), MAX_REPOS);
        for (i, (center, radius, color)) in stars.iter().enumerate() {
            let spiral = spiral_position(i);
            assert_eq!((center.x, center.z), (spiral.x, spiral.z));
            assert!(center.y.abs() <= JITTER);
            assert_eq!(*radius, star_size(i as u32));
            assert_eq!(*color, FALLBACK);
        }
    }

    #[test]
    fn deterministic_elements_repeat_across_calls() {
        let repos: Vec<_> = (0..30).map(|i| repo(i, &format!("r{i}"), 3, Some("Rust"))).collect();
        let colors = LanguageColors::default();
        let a = stars_of(&layout_galaxy(&repos, &colors, &mut StdRng::seed_from_u64(1)));
        let b = stars_of(&layout_galaxy(&repos, &colors, &mut StdRng::seed_from_u64(2)));
        for ((ca, ra, cola), (cb, rb, colb)) in a.iter().zip(&b) {
            assert_eq!((ca.x, ca.z, ra, cola), (cb.x, cb.z, rb, colb));
        }
    }

    #[test]
    fn dust_stays_in_disk_and_hue_band() {
        let scene = layout_galaxy(&[], &LanguageColors::default(), &mut StdRng::seed_from_u64(7));
        let Primitive::Points { points, .. } = &scene.group(Layer::Dust).unwrap().primitives[0] else {
            panic!("dust group holds a point field");
        };
        assert_eq!(points.len(), DUST_COUNT);
        for (p, color) in points {
            assert!(p.length() <= DUST_RADIUS + 1e-3);
            let [r, g, b] = color.0;
            // near-white particles carry too little chroma to recover a hue from u8
            if r.max(g).max(b) - r.min(g).min(b) < 30 {
                continue;
            }
            let hsl: Hsl = Hsl::from_color(Srgb::new(r, g, b).into_format::<f32>());
            let hue = hsl.hue.into_positive_degrees();
            assert!(hue > DUST_HUE.start - 4.0 && hue < DUST_HUE.end + 4.0, "hue {hue}");
        }
    }

    #[test]
    fn twinkle_phases_differ_and_core_is_fixed() {
        assert_ne!(twinkle(0).at(1.0), twinkle(1).at(1.0));
        let scene = layout_galaxy(&[], &LanguageColors::default(), &mut StdRng::seed_from_u64(0));
        let core = scene.group(Layer::Core).unwrap();
        assert_eq!(
            core.primitives[0],
            Primitive::Sphere { center: Vec3::default(), radius: 1.0, color: CORE_COLOR, glow: Some(CORE_PULSE) }
        );
        let dust = scene.group(Layer::Dust).unwrap().spin;
        let stars = scene.group(Layer::Stars).unwrap().spin;
        assert!(dust < stars);
    }
}
