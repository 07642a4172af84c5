// src/cli.rs

use clap::Parser;
use std::fmt;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// GitHub username whose repositories to visualize
    pub username: String,

    /// Directory to save exports and animation frames
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Width of the output images in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Height of the output images in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Visualization mode
    #[arg(short, long, value_enum, default_value_t = Mode::Helix)]
    pub mode: Mode,

    /// Export format for the still image. PNG output carries no text labels;
    /// use SVG for a labeled tree map
    #[arg(long, value_enum, default_value_t = ExportFormat::Auto)]
    pub export: ExportFormat,

    /// Canvas point treated as hovered in tree map exports, e.g. `--hover 300,200`
    #[arg(long, value_name = "X,Y", value_parser = parse_point)]
    pub hover: Option<(f32, f32)>,

    /// Also export at a second canvas size, rebuilding the layout, e.g. `--resize 1920x1080`
    #[arg(long, value_name = "WxH", value_parser = parse_size)]
    pub resize: Option<(u32, u32)>,

    /// Number of animation frames to render (0 disables the animation)
    #[arg(long, default_value_t = 0)]
    pub frames: u32,

    /// Frame rate used to advance the animation clock
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Seed for the decorative randomness (dust field, star jitter)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Base URL of the GitHub REST API
    #[arg(long, env = "CODE_DNA_API_URL", default_value = "https://api.github.com")]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

fn parse_pair<T: std::str::FromStr>(s: &str, sep: char, form: &str) -> Result<(T, T), String> {
    let (a, b) = s.split_once(sep).ok_or_else(|| format!("expected {form}, got `{s}`"))?;
    match (a.trim().parse(), b.trim().parse()) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        _ => Err(format!("expected {form}, got `{s}`")),
    }
}

fn parse_point(s: &str) -> Result<(f32, f32), String> {
    parse_pair(s, ',', "X,Y")
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    parse_pair(s, 'x', "WIDTHxHEIGHT")
}

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Double helix of repositories, rungs colored by primary language
    Helix,
    /// Spiral galaxy of repositories sized by stars
    Galaxy,
    /// Tree map of repositories grouped by primary language
    Treemap,
}

impl Mode {
    pub fn slug(self) -> &'static str {
        match self {
            Mode::Helix => "helix",
            Mode::Galaxy => "galaxy",
            Mode::Treemap => "treemap",
        }
    }

    /// Whether the mode renders to a scalable vector surface
    pub fn is_vector(self) -> bool {
        matches!(self, Mode::Treemap)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(clap::ValueEnum, Clone, Debug, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// SVG for the tree map, PNG for the 3D views
    Auto,
    Png,
    Svg,
    None,
}
