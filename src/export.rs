// src/export.rs

use crate::cli::{ExportFormat, Mode};
use crate::error::ExportError;
use crate::renderer::render_scene;
use crate::scene::{Pose, Scene};
use crate::svg::render_svg;
use image::RgbImage;
use std::path::{Path, PathBuf};

const APP: &str = "code-dna";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Raster,
    Vector,
}

impl ExportKind {
    /// Resolves the requested format for `mode`; `None` means skip exporting
    pub fn resolve(format: ExportFormat, mode: Mode) -> Option<Self> {
        match format {
            ExportFormat::Auto if mode.is_vector() => Some(ExportKind::Vector),
            ExportFormat::Auto | ExportFormat::Png => Some(ExportKind::Raster),
            ExportFormat::Svg => Some(ExportKind::Vector),
            ExportFormat::None => None,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            ExportKind::Raster => "png",
            ExportKind::Vector => "svg",
        }
    }
}

/// `code-dna-{mode}-visualization.{png,svg}`
pub fn file_name(mode: Mode, kind: ExportKind) -> String {
    format!("{APP}-{}-visualization.{}", mode.slug(), kind.extension())
}

/// Export is only offered once at least one repository is loaded
pub fn export_enabled(repo_count: usize) -> bool {
    repo_count > 0
}

/// Writes the scene as it looks at `pose` into `dir`, returning the file path
pub fn export(
    scene: &Scene,
    pose: &Pose,
    mode: Mode,
    kind: ExportKind,
    surface: &mut RgbImage,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name(mode, kind));
    match kind {
        ExportKind::Raster => {
            render_scene(surface, scene, pose);
            surface.save(&path)?;
        }
        ExportKind::Vector => {
            if !mode.is_vector() {
                return Err(ExportError::VectorUnsupported(mode));
            }
            std::fs::write(&path, render_svg(scene, pose, surface.width(), surface.height()))?;
        }
    }
    tracing::info!(path = %path.display(), "exported visualization");
    Ok(path)
}
