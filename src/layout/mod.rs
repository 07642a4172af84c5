// src/layout/mod.rs

//! Pure layout engines: `(repositories, language colors) -> Scene`.

pub mod galaxy;
pub mod helix;
pub mod treemap;

use crate::cli::Mode;
use crate::model::{LanguageStats, Repository};
use crate::scene::Scene;
use image::Rgb;
use rand::Rng;
use std::collections::HashMap;

/// Drawing surface size in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width: width as f32, height: height as f32 }
    }
}

/// Language name to display color, derived from the aggregated stats
#[derive(Debug, Clone, Default)]
pub struct LanguageColors {
    colors: HashMap<String, Rgb<u8>>,
}

impl LanguageColors {
    pub fn from_stats(stats: &LanguageStats) -> Self {
        Self {
            colors: stats.values().map(|s| (s.name.clone(), s.color)).collect(),
        }
    }

    /// Color of a repository's primary language, or `fallback` when it has
    /// none or the language is unknown
    pub fn for_repo(&self, repo: &Repository, fallback: Rgb<u8>) -> Rgb<u8> {
        repo.language
            .as_deref()
            .and_then(|lang| self.colors.get(lang))
            .copied()
            .unwrap_or(fallback)
    }
}

/// Builds the scene for `mode`. Only the galaxy consumes `rng`.
pub fn layout<R: Rng + ?Sized>(
    mode: Mode,
    repos: &[Repository],
    colors: &LanguageColors,
    viewport: Viewport,
    rng: &mut R,
) -> Scene {
    match mode {
        Mode::Helix => helix::layout_helix(repos, colors),
        Mode::Galaxy => galaxy::layout_galaxy(repos, colors, rng),
        Mode::Treemap => treemap::layout_treemap(repos, colors, viewport),
    }
}
