// src/renderer.rs

use crate::color::{blend, scale};
use crate::error::ExportError;
use crate::scene::*;
use image::{Rgb, RgbImage};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::Path;

const STROKE: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);
/// Direction the spheres are lit from (normalized (1, 1, 1))
const LIGHT: [f32; 3] = [0.577, 0.577, 0.577];

/// Renders `frames` consecutive animation frames into `dir` as `frame_{:06}.png`
pub fn render_frames(
    scene: &Scene,
    dir: &Path,
    width: u32,
    height: u32,
    frames: u32,
    fps: u32,
) -> Result<(), ExportError> {
    std::fs::create_dir_all(dir)?;

    let bar = ProgressBar::new(frames as u64);
    if let Ok(style) = ProgressStyle::with_template("{msg} {wide_bar} {pos}/{len} ({eta})") {
        bar.set_style(style);
    }
    bar.set_message("Rendering frames");

    let fps = fps.max(1) as f32;
    (0..frames).into_par_iter().progress_with(bar.clone()).try_for_each(|i| {
        let pose = Pose::at(scene, i as f32 / fps);
        let mut image = RgbImage::new(width, height);
        render_scene(&mut image, scene, &pose);
        image.save(dir.join(format!("frame_{:06}.png", i)))?;
        Ok::<_, ExportError>(())
    })?;

    bar.finish_with_message("Frames rendered");
    Ok(())
}

/// Something drawable once its depth is known
enum Item {
    Disc { x: f32, y: f32, r: f32, color: Rgb<u8>, halo: f32 },
    Segment { a: (f32, f32), b: (f32, f32), r: f32, color: Rgb<u8>, alpha: f32 },
    Dot { x: f32, y: f32, r: f32, color: Rgb<u8>, alpha: f32 },
}

struct Camera {
    distance: f32,
    focal: f32,
    cx: f32,
    cy: f32,
}

impl Camera {
    /// Screen position, depth from the camera, and pixels per world unit
    fn project(&self, v: Vec3) -> Option<(f32, f32, f32, f32)> {
        let depth = self.distance - v.z;
        if depth <= 0.1 {
            return None;
        }
        let s = self.focal / depth;
        Some((self.cx + v.x * s, self.cy - v.y * s, depth, s))
    }
}

/// Draws one frame of `scene` at `pose` into `image`
pub fn render_scene(image: &mut RgbImage, scene: &Scene, pose: &Pose) {
    for pixel in image.pixels_mut() {
        *pixel = scene.background;
    }

    match scene.projection {
        Projection::Perspective { camera_distance, fov_degrees } => {
            let camera = Camera {
                distance: camera_distance,
                focal: (image.height() as f32 / 2.0) / (fov_degrees.to_radians() / 2.0).tan(),
                cx: image.width() as f32 / 2.0,
                cy: image.height() as f32 / 2.0,
            };
            render_spatial(image, scene, pose, &camera);
        }
        Projection::Flat { width, height } => {
            let sx = image.width() as f32 / width.max(1.0);
            let sy = image.height() as f32 / height.max(1.0);
            render_flat(image, scene, pose, sx, sy);
        }
    }
}

fn render_spatial(image: &mut RgbImage, scene: &Scene, pose: &Pose, camera: &Camera) {
    let mut items: Vec<(f32, Item)> = Vec::new();

    for (group, &angle) in scene.groups.iter().zip(&pose.rotations) {
        let place = |v: Vec3| camera.project(v.rotate_y(angle));
        for primitive in &group.primitives {
            match primitive {
                Primitive::Sphere { center, radius, color, glow } => {
                    let Some((x, y, depth, s)) = place(*center) else { continue };
                    let intensity = glow.map_or(1.0, |p| p.at(pose.seconds));
                    items.push((
                        depth,
                        Item::Disc {
                            x,
                            y,
                            r: radius * s,
                            color: scale(*color, 0.4 + 0.6 * intensity.min(1.0)),
                            halo: (intensity - 1.0).max(0.0),
                        },
                    ));
                }
                Primitive::Tube { path, radius, color, opacity } => {
                    for pair in path.windows(2) {
                        let (Some(a), Some(b)) = (place(pair[0]), place(pair[1])) else { continue };
                        items.push((
                            (a.2 + b.2) / 2.0,
                            Item::Segment {
                                a: (a.0, a.1),
                                b: (b.0, b.1),
                                r: radius * (a.3 + b.3) / 2.0,
                                color: *color,
                                alpha: *opacity,
                            },
                        ));
                    }
                }
                Primitive::Rung { from, to, from_color, to_color, radius } => {
                    let mid = (*from + *to) * 0.5;
                    for (start, color) in [(*from, *from_color), (*to, *to_color)] {
                        let (Some(a), Some(b)) = (place(start), place(mid)) else { continue };
                        items.push((
                            (a.2 + b.2) / 2.0,
                            Item::Segment {
                                a: (a.0, a.1),
                                b: (b.0, b.1),
                                r: radius * (a.3 + b.3) / 2.0,
                                color,
                                alpha: 0.6,
                            },
                        ));
                    }
                }
                Primitive::Points { points, size, opacity } => {
                    for (p, color) in points {
                        let Some((x, y, depth, s)) = place(*p) else { continue };
                        items.push((
                            depth,
                            Item::Dot { x, y, r: (size * s).max(0.5), color: *color, alpha: *opacity },
                        ));
                    }
                }
                Primitive::Tile(_) | Primitive::Label { .. } => {}
            }
        }
    }

    // Painter's algorithm: farthest first
    items.sort_by(|a, b| b.0.total_cmp(&a.0));
    for (_, item) in items {
        match item {
            Item::Disc { x, y, r, color, halo } => {
                if halo > 0.0 {
                    fill_disc(image, x, y, r * (1.0 + 0.2 * halo), color, 0.25, false);
                }
                fill_disc(image, x, y, r, color, 1.0, true);
            }
            Item::Segment { a, b, r, color, alpha } => draw_segment(image, a, b, r.max(0.5), color, alpha),
            Item::Dot { x, y, r, color, alpha } => fill_disc(image, x, y, r, color, alpha, false),
        }
    }
}

fn render_flat(image: &mut RgbImage, scene: &Scene, pose: &Pose, sx: f32, sy: f32) {
    for (i, tile) in scene.tiles().enumerate() {
        let style = pose.tile_style(i);
        let rect = Rect::new(tile.rect.x * sx, tile.rect.y * sy, tile.rect.w * sx, tile.rect.h * sy);
        let radius = tile.corner_radius * sx.min(sy);
        fill_rounded_rect(image, rect, radius, tile.fill, style.opacity, None);
        fill_rounded_rect(image, rect, radius, STROKE, style.opacity, Some(style.stroke_width));
    }
}

fn put(image: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>, alpha: f32) {
    if x < 0 || y < 0 || x >= image.width() as i64 || y >= image.height() as i64 {
        return;
    }
    let pixel = image.get_pixel_mut(x as u32, y as u32);
    *pixel = if alpha >= 1.0 { color } else { blend(*pixel, color, alpha) };
}

fn fill_disc(image: &mut RgbImage, cx: f32, cy: f32, r: f32, color: Rgb<u8>, alpha: f32, shaded: bool) {
    let r = r.max(0.5);
    let (x0, x1) = ((cx - r).floor() as i64, (cx + r).ceil() as i64);
    let (y0, y1) = ((cy - r).floor() as i64, (cy + r).ceil() as i64);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = (x as f32 + 0.5 - cx) / r;
            let dy = (y as f32 + 0.5 - cy) / r;
            let d2 = dx * dx + dy * dy;
            if d2 > 1.0 {
                continue;
            }
            let c = if shaded {
                let nz = (1.0 - d2).sqrt();
                let lambert = (dx * LIGHT[0] - dy * LIGHT[1] + nz * LIGHT[2]).max(0.0);
                scale(color, 0.35 + 0.65 * lambert)
            } else {
                color
            };
            put(image, x, y, c, alpha);
        }
    }
}

fn draw_segment(image: &mut RgbImage, a: (f32, f32), b: (f32, f32), r: f32, color: Rgb<u8>, alpha: f32) {
    let (min_x, max_x) = (a.0.min(b.0) - r, a.0.max(b.0) + r);
    let (min_y, max_y) = (a.1.min(b.1) - r, a.1.max(b.1) + r);
    let (vx, vy) = (b.0 - a.0, b.1 - a.1);
    let len2 = (vx * vx + vy * vy).max(1e-6);
    for y in min_y.floor() as i64..=max_y.ceil() as i64 {
        for x in min_x.floor() as i64..=max_x.ceil() as i64 {
            let (px, py) = (x as f32 + 0.5 - a.0, y as f32 + 0.5 - a.1);
            let t = ((px * vx + py * vy) / len2).clamp(0.0, 1.0);
            let (dx, dy) = (px - t * vx, py - t * vy);
            if dx * dx + dy * dy <= r * r {
                put(image, x, y, color, alpha);
            }
        }
    }
}

/// Fills a rounded rectangle, or only its outline when `stroke` is set
fn fill_rounded_rect(image: &mut RgbImage, rect: Rect, radius: f32, color: Rgb<u8>, alpha: f32, stroke: Option<f32>) {
    let radius = radius.min(rect.w / 2.0).min(rect.h / 2.0).max(0.0);
    let inside = |x: f32, y: f32, inset: f32| {
        let r = (radius - inset).max(0.0);
        let (l, t) = (rect.x + inset, rect.y + inset);
        let (rr, b) = (rect.x + rect.w - inset, rect.y + rect.h - inset);
        if x < l || x > rr || y < t || y > b {
            return false;
        }
        let cx = x.clamp(l + r, rr - r);
        let cy = y.clamp(t + r, b - r);
        (x - cx).powi(2) + (y - cy).powi(2) <= r * r
    };
    for y in rect.y.floor() as i64..=(rect.y + rect.h).ceil() as i64 {
        for x in rect.x.floor() as i64..=(rect.x + rect.w).ceil() as i64 {
            let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
            let hit = match stroke {
                None => inside(fx, fy, 0.0),
                Some(width) => inside(fx, fy, 0.0) && !inside(fx, fy, width),
            };
            if hit {
                put(image, x, y, color, alpha);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{helix, treemap, LanguageColors, Viewport};
    use crate::model::fixtures::repo;

    #[test]
    fn treemap_frame_paints_tiles_and_hover_is_brighter() {
        let repos = vec![repo(1, "a", 10, None), repo(2, "b", 0, None)];
        let scene = treemap::layout_treemap(&repos, &LanguageColors::default(), Viewport::new(200, 120));
        let tile = scene.tiles().next().unwrap().clone();
        let (cx, cy) = ((tile.rect.x + tile.rect.w / 2.0) as u32, (tile.rect.y + tile.rect.h / 2.0) as u32);

        let mut resting = RgbImage::new(200, 120);
        render_scene(&mut resting, &scene, &Pose::at(&scene, 0.0));
        let mut hovered = RgbImage::new(200, 120);
        render_scene(&mut hovered, &scene, &Pose::at(&scene, 0.0).with_hover(Some(0)));

        assert_eq!(*resting.get_pixel(2, 2), scene.background);
        assert_ne!(*resting.get_pixel(cx, cy), scene.background);
        assert_eq!(*hovered.get_pixel(cx, cy), tile.fill);
    }

    #[test]
    fn helix_frame_draws_something_and_rotates() {
        let repos: Vec<_> = (0..20).map(|i| repo(i, &format!("r{i}"), 0, Some("Rust"))).collect();
        let scene = helix::layout_helix(&repos, &LanguageColors::default());
        let mut a = RgbImage::new(160, 90);
        render_scene(&mut a, &scene, &Pose::at(&scene, 0.0));
        let mut b = RgbImage::new(160, 90);
        render_scene(&mut b, &scene, &Pose::at(&scene, 2.0));
        assert!(a.pixels().any(|p| *p != scene.background));
        assert_ne!(a, b);
    }

    #[test]
    fn frames_are_written_in_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let repos = vec![repo(1, "a", 0, None), repo(2, "b", 0, None), repo(3, "c", 0, None)];
        let scene = helix::layout_helix(&repos, &LanguageColors::default());
        render_frames(&scene, dir.path(), 32, 24, 3, 60).unwrap();
        for i in 0..3 {
            assert!(dir.path().join(format!("frame_{:06}.png", i)).exists());
        }
    }
}
