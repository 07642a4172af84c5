// src/scene.rs

//! Renderer-agnostic scene descriptions.
//!
//! A [`Scene`] is built once by a layout engine and never mutated. Motion is
//! expressed through [`Pose::at`], a pure function of elapsed time that the
//! host applies when it draws a frame.

use image::Rgb;
use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Rotation about the vertical (y) axis
    pub fn rotate_y(self, angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::new(self.x * cos + self.z * sin, self.y, -self.x * sin + self.z * cos)
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x + o.x, self.y + o.y, self.z + o.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, o: Vec3) -> Vec3 {
        Vec3::new(self.x - o.x, self.y - o.y, self.z - o.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        Vec3::new(self.x * s, self.y * s, self.z * s)
    }
}

/// Axis-aligned rectangle in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn area(&self) -> f32 {
        self.w.max(0.0) * self.h.max(0.0)
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.w && y >= self.y && y < self.y + self.h
    }

    /// Shrinks every side by `by`, never below zero size
    pub fn inset(&self, by: f32) -> Rect {
        let dx = by.min(self.w / 2.0);
        let dy = by.min(self.h / 2.0);
        Rect::new(self.x + dx, self.y + dy, self.w - 2.0 * dx, self.h - 2.0 * dy)
    }
}

/// Sinusoidal oscillation used for glow and twinkle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub base: f32,
    pub amplitude: f32,
    /// Radians per second
    pub frequency: f32,
    pub phase: f32,
}

impl Pulse {
    pub fn at(&self, seconds: f32) -> f32 {
        self.base + self.amplitude * (self.frequency * seconds + self.phase).sin()
    }
}

/// One leaf of the tree map
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub repo_id: u64,
    pub name: String,
    pub stars: u32,
    pub description: Option<String>,
    pub url: String,
    /// The tile's share of the canvas, gutters included
    pub cell: Rect,
    /// The drawn rectangle: `cell` minus half the padding on every side
    pub rect: Rect,
    pub corner_radius: f32,
    pub fill: Rgb<u8>,
}

impl Tile {
    /// Secondary label, present only for starred repositories
    pub fn star_label(&self) -> Option<String> {
        (self.stars > 0).then(|| format!("★ {}", self.stars))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Sphere {
        center: Vec3,
        radius: f32,
        color: Rgb<u8>,
        /// Brightness multiplier over time; `None` renders at full brightness
        glow: Option<Pulse>,
    },
    /// A smooth tube through `path`
    Tube {
        path: Vec<Vec3>,
        radius: f32,
        color: Rgb<u8>,
        opacity: f32,
    },
    /// A connector between two points, each half colored by its own end
    Rung {
        from: Vec3,
        to: Vec3,
        from_color: Rgb<u8>,
        to_color: Rgb<u8>,
        radius: f32,
    },
    Points {
        points: Vec<(Vec3, Rgb<u8>)>,
        size: f32,
        opacity: f32,
    },
    Tile(Tile),
    /// Centered text
    Label {
        x: f32,
        y: f32,
        text: String,
        size: f32,
        color: Rgb<u8>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Helix,
    Dust,
    Stars,
    Core,
    Tiles,
    Overlay,
}

/// A unit that moves as one: every primitive shares the group's rotation
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub layer: Layer,
    /// Rotation about the vertical axis, radians per second
    pub spin: f32,
    pub primitives: Vec<Primitive>,
}

impl Group {
    pub fn new(layer: Layer, spin: f32) -> Self {
        Self { layer, spin, primitives: Vec::new() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Camera on the +z axis looking at the origin
    Perspective { camera_distance: f32, fov_degrees: f32 },
    /// Primitives are already in canvas pixels
    Flat { width: f32, height: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub background: Rgb<u8>,
    pub projection: Projection,
    pub groups: Vec<Group>,
}

impl Scene {
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.groups.iter().flat_map(|g| &g.primitives).filter_map(|p| match p {
            Primitive::Tile(tile) => Some(tile),
            _ => None,
        })
    }

    /// Index (in [`Scene::tiles`] order) of the tile drawn under a canvas point
    pub fn tile_at(&self, x: f32, y: f32) -> Option<usize> {
        self.tiles().position(|t| t.rect.contains(x, y))
    }
}

/// Visual emphasis of a tree map tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileStyle {
    pub opacity: f32,
    pub stroke_width: f32,
}

impl TileStyle {
    pub const fn resting() -> Self {
        Self { opacity: 0.85, stroke_width: 1.0 }
    }

    pub const fn hovered() -> Self {
        Self { opacity: 1.0, stroke_width: 2.0 }
    }
}

/// Time-dependent state for drawing one frame of a [`Scene`]
#[derive(Debug, Clone, PartialEq)]
pub struct Pose {
    pub seconds: f32,
    /// Rotation per group, parallel to `Scene::groups`
    pub rotations: Vec<f32>,
    pub hovered_tile: Option<usize>,
}

impl Pose {
    pub fn at(scene: &Scene, seconds: f32) -> Self {
        Self {
            seconds,
            rotations: scene.groups.iter().map(|g| g.spin * seconds).collect(),
            hovered_tile: None,
        }
    }

    pub fn with_hover(mut self, tile: Option<usize>) -> Self {
        self.hovered_tile = tile;
        self
    }

    pub fn tile_style(&self, index: usize) -> TileStyle {
        if self.hovered_tile == Some(index) {
            TileStyle::hovered()
        } else {
            TileStyle::resting()
        }
    }
}

#[cfg(test)]
impl Vec3 {
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

#[cfg(test)]
impl Rect {
    /// True when the interiors intersect (shared edges do not count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        const EPS: f32 = 1e-3;
        self.x + EPS < other.x + other.w
            && other.x + EPS < self.x + self.w
            && self.y + EPS < other.y + other.h
            && other.y + EPS < self.y + self.h
    }
}

#[cfg(test)]
impl Scene {
    pub fn group(&self, layer: Layer) -> Option<&Group> {
        self.groups.iter().find(|g| g.layer == layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn rotate_y_half_turn_mirrors_xz() {
        let v = Vec3::new(3.0, 2.0, -1.0).rotate_y(PI);
        assert!((v.x + 3.0).abs() < 1e-5);
        assert!((v.y - 2.0).abs() < 1e-5);
        assert!((v.z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn pose_is_a_pure_function_of_time() {
        let scene = Scene {
            background: Rgb([0, 0, 0]),
            projection: Projection::Perspective { camera_distance: 30.0, fov_degrees: 75.0 },
            groups: vec![Group::new(Layer::Stars, 0.2), Group::new(Layer::Dust, 0.1)],
        };
        let a = Pose::at(&scene, 10.0);
        assert_eq!(a, Pose::at(&scene, 10.0));
        assert!((a.rotations[0] - 2.0).abs() < 1e-6);
        assert!((a.rotations[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn hover_changes_only_the_hovered_tile() {
        let scene = Scene {
            background: Rgb([0, 0, 0]),
            projection: Projection::Flat { width: 10.0, height: 10.0 },
            groups: Vec::new(),
        };
        let pose = Pose::at(&scene, 0.0).with_hover(Some(2));
        assert_eq!(pose.tile_style(2), TileStyle::hovered());
        assert_eq!(pose.tile_style(1), TileStyle::resting());
    }

    #[test]
    fn rect_overlap_ignores_shared_edges() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 5.0, 10.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&Rect::new(9.0, 9.0, 2.0, 2.0)));
        assert_eq!(a.inset(2.0), Rect::new(2.0, 2.0, 6.0, 6.0));
    }
}
