pub mod application;
pub mod blit;
pub mod camera;
pub mod config;
pub mod cpu;
pub mod error;
pub mod headless;
pub mod ray_tracer;
pub mod renderer;
pub mod scene;
pub mod shader_types;
pub mod texture;
pub mod util;
