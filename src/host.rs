// src/host.rs

use crate::cli::Mode;
use crate::error::ExportError;
use crate::export::{export, export_enabled, ExportKind};
use crate::layout::{layout, LanguageColors, Viewport};
use crate::model::ProfileData;
use crate::renderer::render_frames;
use crate::scene::{Pose, Scene};
use image::RgbImage;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const PLACEHOLDER: &str = "Search for a GitHub user to see their code visualization";

/// Everything one mounted mode owns: its scene and its drawing surface.
/// Dropping the view releases both, whichever path unmounted it.
pub struct ActiveView {
    mode: Mode,
    scene: Scene,
    surface: RgbImage,
    repo_count: usize,
}

impl ActiveView {
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

impl Drop for ActiveView {
    fn drop(&mut self) {
        debug!(
            mode = %self.mode,
            width = self.surface.width(),
            height = self.surface.height(),
            "released view"
        );
    }
}

pub struct VisualizationHost {
    viewport: Viewport,
    width: u32,
    height: u32,
    seed: Option<u64>,
    active: Option<ActiveView>,
}

impl VisualizationHost {
    pub fn new(width: u32, height: u32, seed: Option<u64>) -> Self {
        Self {
            viewport: Viewport::new(width, height),
            width,
            height,
            seed,
            active: None,
        }
    }

    pub fn active(&self) -> Option<&ActiveView> {
        self.active.as_ref()
    }

    /// The empty-state message, shown while nothing is mounted
    pub fn placeholder(&self) -> Option<&'static str> {
        self.active.is_none().then_some(PLACEHOLDER)
    }

    /// Mounts `mode` for `data`, releasing the previous view first.
    /// With no repositories nothing is mounted and the placeholder shows.
    pub fn mount(&mut self, mode: Mode, data: &ProfileData) -> Option<&ActiveView> {
        self.unmount();
        if data.repos.is_empty() {
            return None;
        }

        let colors = LanguageColors::from_stats(&data.languages);
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let scene = layout(mode, &data.repos, &colors, self.viewport, &mut rng);
        debug!(%mode, groups = scene.groups.len(), "mounted view");

        self.active = Some(ActiveView {
            mode,
            scene,
            surface: RgbImage::new(self.width, self.height),
            repo_count: data.repos.len(),
        });
        self.active.as_ref()
    }

    pub fn unmount(&mut self) {
        self.active = None;
    }

    /// Rebuilds the current view for a new surface size with the same data
    pub fn resize(&mut self, width: u32, height: u32, data: &ProfileData) {
        self.width = width;
        self.height = height;
        self.viewport = Viewport::new(width, height);
        if let Some(mode) = self.active.as_ref().map(ActiveView::mode) {
            self.mount(mode, data);
        }
    }

    /// Exports the current view as it looks at rest, with the tile under
    /// `hover` (if any) emphasized
    pub fn export(
        &mut self,
        kind: ExportKind,
        hover: Option<(f32, f32)>,
        dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        let view = match self.active.as_mut() {
            Some(view) if export_enabled(view.repo_count) => view,
            _ => return Err(ExportError::Unavailable),
        };
        let hovered = hover.and_then(|(x, y)| view.scene.tile_at(x, y));
        let pose = Pose::at(&view.scene, 0.0).with_hover(hovered);
        export(&view.scene, &pose, view.mode, kind, &mut view.surface, dir)
    }

    /// Renders the animation loop of the current view into `dir`. The loop
    /// borrows the view, so it always ends before the view can be released.
    pub fn animate(&self, frames: u32, fps: u32, dir: &Path) -> Result<(), ExportError> {
        let view = self.active.as_ref().ok_or(ExportError::Unavailable)?;
        render_frames(&view.scene, dir, self.width, self.height, frames, fps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{repo, user};
    use crate::model::LanguageStats;
    use crate::scene::Projection;

    fn data(n: usize) -> ProfileData {
        ProfileData {
            user: user("octocat"),
            repos: (0..n).map(|i| repo(i as u64, &format!("r{i}"), i as u32, Some("Rust"))).collect(),
            languages: LanguageStats::new(),
        }
    }

    #[test]
    fn empty_profile_shows_placeholder_and_disables_export() {
        let dir = tempfile::tempdir().unwrap();
        let mut host = VisualizationHost::new(64, 48, Some(1));
        assert!(host.mount(Mode::Helix, &data(0)).is_none());
        assert_eq!(host.placeholder(), Some(PLACEHOLDER));
        assert!(matches!(host.export(ExportKind::Raster, None, dir.path()), Err(ExportError::Unavailable)));
    }

    #[test]
    fn switching_modes_replaces_the_view() {
        let profile = data(6);
        let mut host = VisualizationHost::new(64, 48, Some(1));
        host.mount(Mode::Helix, &profile);
        assert_eq!(host.active().map(ActiveView::mode), Some(Mode::Helix));
        host.mount(Mode::Galaxy, &profile);
        assert_eq!(host.active().map(ActiveView::mode), Some(Mode::Galaxy));
        host.unmount();
        assert!(host.active().is_none());
    }

    #[test]
    fn resize_rebuilds_treemap_for_new_canvas() {
        let profile = data(4);
        let mut host = VisualizationHost::new(300, 200, None);
        host.mount(Mode::Treemap, &profile);
        host.resize(600, 400, &profile);
        let scene = host.active().unwrap().scene();
        assert_eq!(scene.projection, Projection::Flat { width: 600.0, height: 400.0 });
        assert_eq!(scene.tiles().count(), 4);
    }

    #[test]
    fn export_after_resize_uses_new_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let profile = data(3);
        let mut host = VisualizationHost::new(300, 200, None);
        host.mount(Mode::Treemap, &profile);
        host.resize(640, 480, &profile);
        assert_eq!(host.active().map(ActiveView::mode), Some(Mode::Treemap));

        let svg = host.export(ExportKind::Vector, None, &dir.path().join("640x480")).unwrap();
        let text = std::fs::read_to_string(svg).unwrap();
        assert!(text.contains(r#"viewBox="0 0 640 480" width="640" height="480""#));
    }

    #[test]
    fn export_writes_png_and_svg() {
        let dir = tempfile::tempdir().unwrap();
        let profile = data(5);
        let mut host = VisualizationHost::new(120, 80, Some(3));

        host.mount(Mode::Galaxy, &profile);
        let png = host.export(ExportKind::Raster, Some((60.0, 40.0)), dir.path()).unwrap();
        assert!(png.ends_with("code-dna-galaxy-visualization.png"));
        assert!(image::open(&png).is_ok());
        assert!(matches!(
            host.export(ExportKind::Vector, None, dir.path()),
            Err(ExportError::VectorUnsupported(Mode::Galaxy))
        ));

        host.mount(Mode::Treemap, &profile);
        let svg = host.export(ExportKind::Vector, None, dir.path()).unwrap();
        let text = std::fs::read_to_string(svg).unwrap();
        assert!(text.contains(r#"width="120" height="80""#));
    }
}
