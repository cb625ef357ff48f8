use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid uniform block name '{name}'")]
    MissingBlock { name: String },
    #[error("Uniform block '{name}' is declared at binding {found}, expected {expected}")]
    BindingMismatch {
        name: String,
        expected: u32,
        found: u32,
    },
    #[error("Buffer '{name}' needs {size} bytes, the device allows {limit}")]
    BufferTooLarge { name: String, size: u64, limit: u64 },
    #[error("Failed to parse shader: {0}")]
    Shader(String),
    #[error("Failed to load texture: {0}")]
    Texture(#[from] image::ImageError),
    #[error("Failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("Failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("No compatible graphics adapter")]
    AdapterUnavailable,
    #[error("Failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
}

impl Error {
    /// Core/shader contract mismatches; nothing at runtime can repair them.
    pub fn is_linkage(&self) -> bool {
        matches!(
            self,
            Error::MissingBlock { .. } | Error::BindingMismatch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
