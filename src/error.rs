use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// No adapter matched the request options.
    NoAdapter,
    RequestDevice(wgpu::RequestDeviceError),
    CreateSurface(wgpu::CreateSurfaceError),
    /// The surface is not supported by the chosen adapter.
    SurfaceConfig,
    Window(winit::error::OsError),
    BufferMap(wgpu::BufferAsyncError),
    /// Requested target exceeds the 2D texture dimension limit.
    TextureTooLarge { width: u32, height: u32, max: u32 },
    /// Readback produced fewer bytes than the target holds.
    Readback { expected: usize, actual: usize },
    Image(image::ImageError),
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAdapter => write!(f, "no compatible GPU adapter found"),
            Self::RequestDevice(e) => write!(f, "failed to request device: {e}"),
            Self::CreateSurface(e) => write!(f, "failed to create surface: {e}"),
            Self::SurfaceConfig => write!(f, "surface is incompatible with the adapter"),
            Self::Window(e) => write!(f, "failed to create window: {e}"),
            Self::BufferMap(e) => write!(f, "failed to map readback buffer: {e}"),
            Self::TextureTooLarge { width, height, max } => {
                write!(f, "{width}x{height} exceeds the {max} pixel texture limit")
            }
            Self::Readback { expected, actual } => {
                write!(f, "readback returned {actual} bytes, expected {expected}")
            }
            Self::Image(e) => write!(f, "image error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::RequestDevice(e) => Some(e),
            Self::CreateSurface(e) => Some(e),
            Self::Window(e) => Some(e),
            Self::BufferMap(e) => Some(e),
            Self::Image(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::NoAdapter
            | Self::SurfaceConfig
            | Self::TextureTooLarge { .. }
            | Self::Readback { .. } => None,
        }
    }
}

impl From<wgpu::RequestDeviceError> for Error {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        Self::RequestDevice(e)
    }
}

impl From<wgpu::CreateSurfaceError> for Error {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        Self::CreateSurface(e)
    }
}

impl From<winit::error::OsError> for Error {
    fn from(e: winit::error::OsError) -> Self {
        Self::Window(e)
    }
}

impl From<wgpu::BufferAsyncError> for Error {
    fn from(e: wgpu::BufferAsyncError) -> Self {
        Self::BufferMap(e)
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_keep_their_source() {
        let error = Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));

        assert_eq!(error.to_string(), "I/O error: missing");
        assert!(std::error::Error::source(&error).is_some());
        assert!(std::error::Error::source(&Error::NoAdapter).is_none());
    }

    #[test]
    fn size_errors_name_the_limit() {
        let error = Error::TextureTooLarge {
            width: 10000,
            height: 600,
            max: 8192,
        };
        assert_eq!(
            error.to_string(),
            "10000x600 exceeds the 8192 pixel texture limit"
        );

        let error = Error::Readback {
            expected: 16,
            actual: 8,
        };
        assert_eq!(error.to_string(), "readback returned 8 bytes, expected 16");
    }
}
