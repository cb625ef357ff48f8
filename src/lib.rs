pub mod animation;
pub mod application;
pub mod camera;
pub mod config;
pub mod demo;
pub mod error;
pub mod factory;
pub mod renderer;
pub mod scene;
pub mod shader;
pub mod sync;
pub mod texture;

pub use error::{Error, Result};
