use std::path::PathBuf;

use clap::Parser;

use crate::{error::Result, texture::Texture};

/// wgpu's default `max_texture_dimension_2d`.
pub const MAX_DIMENSION: u32 = 8192;

#[derive(Parser, Debug, Clone)]
#[clap(about, author, version)]
pub struct Cli {
    /// Window or image width in pixels
    #[clap(long, default_value_t = 800)]
    pub width: u32,
    /// Window or image height in pixels
    #[clap(long, default_value_t = 600)]
    pub height: u32,
    /// Render a single frame to this PNG instead of opening a window
    #[clap(short, long)]
    pub output: Option<PathBuf>,
    /// Trace the PNG on the CPU instead of the GPU
    #[clap(long, requires = "output")]
    pub cpu: bool,
    /// Animation time in seconds for the single frame
    #[clap(short, long, default_value_t = 0.0)]
    pub time: f32,
}

pub enum Mode {
    Windowed,
    Gpu(PathBuf),
    Cpu(PathBuf),
}

impl Cli {
    pub fn mode(&self) -> Mode {
        match (&self.output, self.cpu) {
            (Some(path), true) => Mode::Cpu(path.clone()),
            (Some(path), false) => Mode::Gpu(path.clone()),
            (None, _) => Mode::Windowed,
        }
    }

    pub fn size(&self) -> Result<(u32, u32)> {
        Texture::check_size(self.width, self.height, MAX_DIMENSION)
    }
}
