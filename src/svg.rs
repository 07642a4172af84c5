// src/svg.rs

//! Serializes flat scenes into standalone SVG documents.

use crate::color::hex;
use crate::scene::*;

const TEXT_COLOR: &str = "#ffffff";

/// Render a flat scene as an SVG string with explicit namespace and size.
/// Hovering a tile raises its opacity and stroke, as in the live view; the
/// tile hovered in `pose` is written with that style already applied.
pub fn render_svg(scene: &Scene, pose: &Pose, width: u32, height: u32) -> String {
    let (view_w, view_h) = match scene.projection {
        Projection::Flat { width, height } => (width, height),
        Projection::Perspective { .. } => (width as f32, height as f32),
    };
    let resting = TileStyle::resting();
    let hovered = TileStyle::hovered();

    let mut svg = String::with_capacity(1024 + scene.tiles().count() * 400);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {view_w} {view_h}" width="{width}" height="{height}" style="font-family:system-ui,-apple-system,sans-serif">"#,
    ));
    svg.push_str(&format!(
        "<style>rect.tile{{opacity:{};stroke-width:{};transition:all 200ms}}rect.tile:hover{{opacity:{};stroke-width:{}}}</style>",
        resting.opacity, resting.stroke_width, hovered.opacity, hovered.stroke_width,
    ));
    svg.push_str(&format!(
        r#"<rect width="{view_w}" height="{view_h}" fill="{}"/>"#,
        hex(scene.background)
    ));

    for (i, tile) in scene.tiles().enumerate() {
        let r = tile.rect;
        let linked = !tile.url.is_empty();
        if linked {
            svg.push_str(&format!(r#"<a href="{}">"#, escape_xml(&tile.url)));
        }
        svg.push_str(&format!(r#"<g id="repo-{}" transform="translate({},{})">"#, tile.repo_id, r.x, r.y));
        svg.push_str(&format!(
            r#"<rect class="tile" width="{}" height="{}" rx="{radius}" ry="{radius}" fill="{}" stroke="{TEXT_COLOR}"{}>"#,
            r.w,
            r.h,
            hex(tile.fill),
            inline_style(pose.tile_style(i)),
            radius = tile.corner_radius,
        ));
        let title = match &tile.description {
            Some(description) => format!("{}: {}", tile.name, description),
            None => tile.name.clone(),
        };
        svg.push_str(&format!("<title>{}</title></rect>", escape_xml(&title)));
        svg.push_str(&format!(
            r#"<text x="4" y="14" fill="{TEXT_COLOR}" font-size="10px" font-weight="bold" style="pointer-events:none">{}</text>"#,
            escape_xml(&tile.name)
        ));
        if let Some(stars) = tile.star_label() {
            svg.push_str(&format!(
                r#"<text x="4" y="26" fill="{TEXT_COLOR}" font-size="8px" opacity="0.8" style="pointer-events:none">{}</text>"#,
                escape_xml(&stars)
            ));
        }
        svg.push_str("</g>");
        if linked {
            svg.push_str("</a>");
        }
    }

    for group in &scene.groups {
        for primitive in &group.primitives {
            if let Primitive::Label { x, y, text, size, color } = primitive {
                svg.push_str(&format!(
                    r#"<text x="{x}" y="{y}" text-anchor="middle" fill="{}" font-size="{size}px" font-weight="bold">{}</text>"#,
                    hex(*color),
                    escape_xml(text)
                ));
            }
        }
    }

    svg.push_str("</svg>");
    svg
}

/// Only a non-resting style is written inline; resting tiles use the stylesheet
fn inline_style(style: TileStyle) -> String {
    if style == TileStyle::resting() {
        String::new()
    } else {
        format!(r#" style="opacity:{};stroke-width:{}""#, style.opacity, style.stroke_width)
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
