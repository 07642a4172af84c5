// src/layout/treemap.rs

use super::{LanguageColors, Viewport};
use crate::model::Repository;
use crate::scene::*;
use image::Rgb;

/// Gap between sibling tiles, in pixels
pub const PADDING: f32 = 4.0;
const MARGIN: f32 = 20.0;
const CORNER_RADIUS: f32 = 4.0;

/// Bucket for repositories without a primary language
pub const UNKNOWN_LANGUAGE: &str = "Unknown";

const BACKGROUND: Rgb<u8> = Rgb([0x12, 0x18, 0x28]);
const FALLBACK: Rgb<u8> = Rgb([0x88, 0x88, 0x88]);
const TITLE_COLOR: Rgb<u8> = Rgb([0xff, 0xff, 0xff]);

/// Root → primary language → repository
#[derive(Debug)]
pub struct Hierarchy<'a> {
    pub root: &'static str,
    pub languages: Vec<LanguageNode<'a>>,
}

#[derive(Debug)]
pub struct LanguageNode<'a> {
    pub name: String,
    /// Number of repositories in the bucket
    pub weight: u64,
    pub leaves: Vec<Leaf<'a>>,
}

impl LanguageNode<'_> {
    /// Area share of the bucket: the sum of its leaves
    pub fn leaf_weight(&self) -> u64 {
        self.leaves.iter().map(|l| l.weight).sum()
    }
}

#[derive(Debug)]
pub struct Leaf<'a> {
    pub repo: &'a Repository,
    /// Stars plus one, so unstarred repositories still get area
    pub weight: u64,
}

/// Groups repositories by primary language. Buckets are ordered by area,
/// largest first, with ties in first-seen order; leaves likewise.
pub fn build_hierarchy(repos: &[Repository]) -> Hierarchy<'_> {
    let mut languages: Vec<LanguageNode> = Vec::new();
    for repo in repos {
        let name = repo.language.as_deref().unwrap_or(UNKNOWN_LANGUAGE);
        let leaf = Leaf { repo, weight: repo.star_count as u64 + 1 };
        match languages.iter_mut().find(|n| n.name == name) {
            Some(node) => {
                node.weight += 1;
                node.leaves.push(leaf);
            }
            None => languages.push(LanguageNode {
                name: name.to_string(),
                weight: 1,
                leaves: vec![leaf],
            }),
        }
    }

    for node in &mut languages {
        node.leaves.sort_by(|a, b| b.weight.cmp(&a.weight));
    }
    languages.sort_by_key(|n| std::cmp::Reverse(n.leaf_weight()));

    Hierarchy { root: "GitHub", languages }
}

/// The area tiles are laid into: the viewport minus its margin
pub fn canvas(viewport: Viewport) -> Rect {
    Rect::new(
        MARGIN,
        MARGIN,
        (viewport.width - 2.0 * MARGIN).max(0.0),
        (viewport.height - 2.0 * MARGIN).max(0.0),
    )
}

pub fn layout_treemap(repos: &[Repository], colors: &LanguageColors, viewport: Viewport) -> Scene {
    let hierarchy = build_hierarchy(repos);
    let area = canvas(viewport);
    tracing::debug!(root = hierarchy.root, buckets = hierarchy.languages.len(), "tree map hierarchy");
    let mut tiles = Group::new(Layer::Tiles, 0.0);

    let bucket_weights: Vec<f64> = hierarchy.languages.iter().map(|n| n.leaf_weight() as f64).collect();
    for (node, cell) in hierarchy.languages.iter().zip(subdivide(&bucket_weights, area)) {
        tracing::trace!(language = %node.name, repos = node.weight, ?cell, "language bucket");
        let leaf_weights: Vec<f64> = node.leaves.iter().map(|l| l.weight as f64).collect();
        for (leaf, cell) in node.leaves.iter().zip(subdivide(&leaf_weights, cell)) {
            tiles.primitives.push(Primitive::Tile(Tile {
                repo_id: leaf.repo.id,
                name: leaf.repo.name.clone(),
                stars: leaf.repo.star_count,
                description: leaf.repo.description.clone(),
                url: leaf.repo.html_url.clone(),
                cell,
                rect: cell.inset(PADDING / 2.0),
                corner_radius: CORNER_RADIUS,
                fill: colors.for_repo(leaf.repo, FALLBACK),
            }));
        }
    }

    let mut overlay = Group::new(Layer::Overlay, 0.0);
    overlay.primitives.push(Primitive::Label {
        x: viewport.width / 2.0,
        y: 15.0,
        text: "Repository Tree Map".to_string(),
        size: 14.0,
        color: TITLE_COLOR,
    });

    Scene {
        background: BACKGROUND,
        projection: Projection::Flat { width: viewport.width, height: viewport.height },
        groups: vec![tiles, overlay],
    }
}

/// Splits `bounds` into one rectangle per weight, areas proportional to the
/// weights, tiling `bounds` exactly. Weights must be sorted largest first.
fn subdivide(weights: &[f64], bounds: Rect) -> Vec<Rect> {
    let total: f64 = weights.iter().sum();
    let area = bounds.area() as f64;
    if total <= 0.0 || area <= 0.0 {
        return Vec::new();
    }
    let scaled: Vec<f64> = weights.iter().map(|w| w / total * area).collect();
    squarify(&scaled, bounds.x as f64, bounds.y as f64, bounds.w as f64, bounds.h as f64)
}

/// Squarified treemap (Bruls, Huizing, van Wijk): rows grow while the worst
/// aspect ratio improves, then are laid along the shorter side.
fn squarify(areas: &[f64], mut x: f64, mut y: f64, mut w: f64, mut h: f64) -> Vec<Rect> {
    let mut result = Vec::with_capacity(areas.len());
    let mut idx = 0usize;
    let mut row_start = 0usize;
    let mut row_sum = 0.0;
    let mut row_min = f64::INFINITY;
    let mut row_max = 0.0_f64;

    while idx < areas.len() {
        if w <= 1e-9 || h <= 1e-9 {
            break;
        }
        let c = areas[idx];
        let side = w.min(h);
        let current = if row_sum > 0.0 {
            worst_aspect_ratio(row_min, row_max, row_sum, side)
        } else {
            f64::INFINITY
        };
        let next_sum = row_sum + c;
        let next_min = row_min.min(c);
        let next_max = row_max.max(c);
        let next = worst_aspect_ratio(next_min, next_max, next_sum, side);

        if row_sum <= 0.0 || next <= current {
            row_sum = next_sum;
            row_min = next_min;
            row_max = next_max;
            idx += 1;
            continue;
        }

        layout_row(&areas[row_start..idx], row_sum, false, &mut x, &mut y, &mut w, &mut h, &mut result);
        row_start = idx;
        row_sum = 0.0;
        row_min = f64::INFINITY;
        row_max = 0.0;
    }

    // The last row consumes whatever space remains
    if row_sum > 0.0 && row_start < idx {
        layout_row(&areas[row_start..idx], row_sum, true, &mut x, &mut y, &mut w, &mut h, &mut result);
    }

    result
}

#[allow(clippy::too_many_arguments)]
fn layout_row(
    row: &[f64],
    row_sum: f64,
    last: bool,
    x: &mut f64,
    y: &mut f64,
    w: &mut f64,
    h: &mut f64,
    out: &mut Vec<Rect>,
) {
    // A strip along the shorter side: horizontal when the width is shortest
    let horizontal = *w <= *h;
    let short = if horizontal { *w } else { *h };
    let mut thickness = row_sum / short;
    if last {
        thickness = if horizontal { *h } else { *w };
    }
    if !thickness.is_finite() || thickness <= 0.0 {
        return;
    }

    let mut offset = 0.0;
    for (i, &area) in row.iter().enumerate() {
        let mut length = area / thickness;
        // Absorb floating point error into the final rect of the strip
        if i == row.len() - 1 {
            length = (short - offset).max(0.0);
        }
        let rect = if horizontal {
            Rect::new((*x + offset) as f32, *y as f32, length as f32, thickness as f32)
        } else {
            Rect::new(*x as f32, (*y + offset) as f32, thickness as f32, length as f32)
        };
        out.push(rect);
        offset += length;
    }

    if horizontal {
        *y += thickness;
        *h = (*h - thickness).max(0.0);
    } else {
        *x += thickness;
        *w = (*w - thickness).max(0.0);
    }
}

fn worst_aspect_ratio(min_r: f64, max_r: f64, sum: f64, side: f64) -> f64 {
    if sum <= 0.0 || side <= 0.0 || min_r <= 0.0 || max_r <= 0.0 {
        return f64::MAX;
    }
    let side_sq = side * side;
    let sum_sq = sum * sum;
    ((side_sq * max_r) / sum_sq).max(sum_sq / (side_sq * min_r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::repo;

    fn sample() -> Vec<Repository> {
        vec![
            repo(1, "engine", 120, Some("Rust")),
            repo(2, "site", 0, Some("TypeScript")),
            repo(3, "notes", 0, None),
            repo(4, "cli", 45, Some("Rust")),
            repo(5, "dotfiles", 2, None),
            repo(6, "scraper", 9, Some("Python")),
            repo(7, "widgets", 0, Some("TypeScript")),
        ]
    }

    fn tiles(scene: &Scene) -> Vec<Tile> {
        scene.tiles().cloned().collect()
    }

    #[test]
    fn hierarchy_groups_by_language_with_unknown_bucket() {
        let repos = sample();
        let h = build_hierarchy(&repos);
        let names: Vec<_> = h.languages.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["Rust", "Python", "Unknown", "TypeScript"]);
        let unknown = &h.languages[2];
        assert_eq!(unknown.weight, 2);
        assert_eq!(unknown.leaf_weight(), 1 + 3);
        assert_eq!(h.languages[0].leaves[0].weight, 121);
    }

    #[test]
    fn cells_tile_the_canvas_without_overlap() {
        let viewport = Viewport::new(800, 500);
        let scene = layout_treemap(&sample(), &LanguageColors::default(), viewport);
        let tiles = tiles(&scene);
        assert_eq!(tiles.len(), 7);

        let area = canvas(viewport);
        let cells: f32 = tiles.iter().map(|t| t.cell.area()).sum();
        assert!((cells - area.area()).abs() < 1.0, "{cells} vs {}", area.area());

        // drawn area plus the padding gutters makes up the canvas
        let drawn: f32 = tiles.iter().map(|t| t.rect.area()).sum();
        let gutters: f32 = tiles.iter().map(|t| t.cell.area() - t.rect.area()).sum();
        assert!((drawn + gutters - area.area()).abs() < 1.0);

        for (i, a) in tiles.iter().enumerate() {
            assert!(a.cell.x >= area.x - 1e-3 && a.cell.y >= area.y - 1e-3);
            assert!(a.cell.x + a.cell.w <= area.x + area.w + 1e-2);
            assert!(a.cell.y + a.cell.h <= area.y + area.h + 1e-2);
            for b in &tiles[i + 1..] {
                assert!(!a.cell.overlaps(&b.cell), "{} overlaps {}", a.name, b.name);
            }
        }
    }

    #[test]
    fn area_is_proportional_to_stars_plus_one() {
        let repos = sample();
        let viewport = Viewport::new(1000, 700);
        let scene = layout_treemap(&repos, &LanguageColors::default(), viewport);
        let total_weight: f32 = repos.iter().map(|r| r.star_count as f32 + 1.0).sum();
        let area = canvas(viewport).area();
        for tile in scene.tiles() {
            let expected = (tile.stars as f32 + 1.0) / total_weight * area;
            assert!((tile.cell.area() - expected).abs() < 1.0, "{}", tile.name);
        }
    }

    #[test]
    fn resize_preserves_weights() {
        let repos = sample();
        let colors = LanguageColors::default();
        let small = layout_treemap(&repos, &colors, Viewport::new(400, 300));
        let large = layout_treemap(&repos, &colors, Viewport::new(1600, 900));
        let share = |scene: &Scene, viewport: Viewport| -> Vec<(u64, f32)> {
            let area = canvas(viewport).area();
            scene.tiles().map(|t| (t.repo_id, t.cell.area() / area)).collect()
        };
        let a = share(&small, Viewport::new(400, 300));
        let b = share(&large, Viewport::new(1600, 900));
        for ((id_a, sa), (id_b, sb)) in a.iter().zip(&b) {
            assert_eq!(id_a, id_b);
            assert!((sa - sb).abs() < 1e-3);
        }
    }

    #[test]
    fn labels_and_hit_testing() {
        let scene = layout_treemap(&sample(), &LanguageColors::default(), Viewport::new(800, 500));
        let tiles = tiles(&scene);
        let engine = tiles.iter().find(|t| t.name == "engine").unwrap();
        assert_eq!(engine.star_label().as_deref(), Some("★ 120"));
        assert_eq!(tiles.iter().find(|t| t.name == "site").unwrap().star_label(), None);
        assert_eq!(engine.fill, FALLBACK);

        let (cx, cy) = (engine.rect.x + engine.rect.w / 2.0, engine.rect.y + engine.rect.h / 2.0);
        let hit = scene.tile_at(cx, cy).unwrap();
        assert_eq!(tiles[hit].name, "engine");
        assert_eq!(scene.tile_at(1.0, 1.0), None);
    }

    #[test]
    fn empty_or_tiny_viewport_yields_no_tiles() {
        let colors = LanguageColors::default();
        assert_eq!(layout_treemap(&[], &colors, Viewport::new(800, 500)).tiles().count(), 0);
        assert_eq!(layout_treemap(&sample(), &colors, Viewport::new(30, 30)).tiles().count(), 0);
    }

    #[test]
    fn layout_is_deterministic() {
        let repos = sample();
        let colors = LanguageColors::default();
        let viewport = Viewport::new(640, 480);
        assert_eq!(layout_treemap(&repos, &colors, viewport), layout_treemap(&repos, &colors, viewport));
    }
}
