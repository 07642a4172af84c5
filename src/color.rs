// src/color.rs

use image::Rgb;
use palette::{FromColor, Hsl, Srgb};

/// Shared color for languages missing from the table
pub const DEFAULT_LANGUAGE_COLOR: Rgb<u8> = Rgb([0x82, 0x57, 0xe6]);

/// Display color for well-known languages, matching the platform's own palette
pub fn language_color(name: &str) -> Option<Rgb<u8>> {
    let rgb = match name {
        "JavaScript" => [0xf1, 0xe0, 0x5a],
        "TypeScript" => [0x31, 0x78, 0xc6],
        "HTML" => [0xe3, 0x4c, 0x26],
        "CSS" => [0x56, 0x3d, 0x7c],
        "Python" => [0x35, 0x72, 0xa5],
        "Java" => [0xb0, 0x72, 0x19],
        "Ruby" => [0x70, 0x15, 0x16],
        "PHP" => [0x4f, 0x5d, 0x95],
        "Go" => [0x00, 0xad, 0xd8],
        "C" => [0x55, 0x55, 0x55],
        "C++" => [0xf3, 0x4b, 0x7d],
        "C#" => [0x17, 0x86, 0x00],
        "Shell" => [0x89, 0xe0, 0x51],
        "Rust" => [0xde, 0xa5, 0x84],
        "Swift" => [0xff, 0xac, 0x45],
        "Kotlin" => [0xa9, 0x7b, 0xff],
        "Dart" => [0x00, 0xb4, 0xab],
        "Lua" => [0x00, 0x00, 0x80],
        "Vue" => [0x41, 0xb8, 0x83],
        "React" => [0x61, 0xda, 0xfb],
        _ => return None,
    };
    Some(Rgb(rgb))
}

/// `#rrggbb` form used by the vector export
pub fn hex(color: Rgb<u8>) -> String {
    let [r, g, b] = color.0;
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Converts an HSL triple (hue in degrees, saturation and lightness in 0..=1)
pub fn from_hsl(hue: f32, saturation: f32, lightness: f32) -> Rgb<u8> {
    let hsl: Hsl = Hsl::new(hue, saturation, lightness);
    let srgb: Srgb<f32> = Srgb::from_color(hsl);
    let (r, g, b) = srgb.into_format::<u8>().into_components();
    Rgb([r, g, b])
}

/// Scales a color's brightness, saturating at white
pub fn scale(color: Rgb<u8>, factor: f32) -> Rgb<u8> {
    let [r, g, b] = color.0;
    let f = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
    Rgb([f(r), f(g), f(b)])
}

/// Alpha-blends `top` over `bottom`
pub fn blend(bottom: Rgb<u8>, top: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let a = alpha.clamp(0.0, 1.0);
    let mix = |b: u8, t: u8| (b as f32 + (t as f32 - b as f32) * a).round() as u8;
    Rgb([
        mix(bottom.0[0], top.0[0]),
        mix(bottom.0[1], top.0[1]),
        mix(bottom.0[2], top.0[2]),
    ])
}
